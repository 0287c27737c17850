use super::ocr_text::OcrText;
use crate::api::{ApiResult, FilePage, PageContent};
use derivative::Derivative;

pub const ZOOM_MIN: f32 = 0.5;
pub const ZOOM_MAX: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.25;

/// Image scale, bounded to [ZOOM_MIN, ZOOM_MAX] in ZOOM_STEP increments.
#[derive(Derivative, Debug, Clone, Copy, PartialEq)]
#[derivative(Default)]
pub struct Zoom {
    #[derivative(Default(value = "1.0"))]
    value: f32,
}

impl Zoom {
    pub fn value(self) -> f32 {
        self.value
    }

    pub fn percent(self) -> u32 {
        (self.value * 100.0).round() as u32
    }

    pub fn can_zoom_in(self) -> bool {
        self.value < ZOOM_MAX
    }

    pub fn can_zoom_out(self) -> bool {
        self.value > ZOOM_MIN
    }

    pub fn zoom_in(&mut self) {
        self.value = (self.value + ZOOM_STEP).min(ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.value = (self.value - ZOOM_STEP).max(ZOOM_MIN);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    ImageOnly,
    TextOnly,
    Split,
}

impl ViewMode {
    pub fn shows_image(self) -> bool {
        matches!(self, ViewMode::ImageOnly | ViewMode::Split)
    }

    pub fn shows_text(self) -> bool {
        matches!(self, ViewMode::TextOnly | ViewMode::Split)
    }

    /// image-only -> split -> text-only -> image-only
    pub fn next(self) -> Self {
        match self {
            ViewMode::ImageOnly => ViewMode::Split,
            ViewMode::Split => ViewMode::TextOnly,
            ViewMode::TextOnly => ViewMode::ImageOnly,
        }
    }

    /// Label of the toggle button, describing what it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ViewMode::ImageOnly => "Show OCR",
            ViewMode::TextOnly => "Show Image",
            ViewMode::Split => "Image Only",
        }
    }
}

/// Keys the viewer listens to while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    ArrowLeft,
    ArrowRight,
    Plus,
    Equals,
    Minus,
    Escape,
}

impl ViewerKey {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "+" => Some(ViewerKey::Plus),
            "=" => Some(ViewerKey::Equals),
            "-" => Some(ViewerKey::Minus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Close,
}

/// Overlay for browsing the pages of one listing page: which page is shown,
/// at what zoom, in which mode, and its OCR text.
#[derive(Debug, Clone)]
pub struct ViewerState {
    pages: Vec<FilePage>,
    index: usize,
    zoom: Zoom,
    mode: ViewMode,
    ocr_visible: bool,
    ocr: OcrText,
}

impl ViewerState {
    /// Open on the page with `page_number`, or the first page if absent.
    pub fn open(pages: Vec<FilePage>, page_number: u32) -> Self {
        let index = pages
            .iter()
            .position(|p| p.page_number == page_number)
            .unwrap_or(0);
        Self {
            pages,
            index,
            zoom: Zoom::default(),
            mode: ViewMode::default(),
            ocr_visible: false,
            ocr: OcrText::default(),
        }
    }

    pub fn current_page(&self) -> Option<&FilePage> {
        self.pages.get(self.index)
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn ocr(&self) -> &OcrText {
        &self.ocr
    }

    pub fn position_label(&self) -> String {
        let number = self.current_page().map(|p| p.page_number).unwrap_or(0);
        format!("Page {} of {}", number, self.pages.len())
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.pages.len()
    }

    pub fn zoom_controls_active(&self) -> bool {
        self.mode.shows_image()
    }

    fn go_to(&mut self, index: usize) -> bool {
        if index == self.index || index >= self.pages.len() {
            return false;
        }
        self.index = index;
        self.zoom = Zoom::default();
        self.mode = ViewMode::ImageOnly;
        self.ocr_visible = false;
        self.ocr.reset();
        true
    }

    pub fn previous(&mut self) -> bool {
        match self.index.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.index + 1)
    }

    pub fn zoom_in(&mut self) {
        if self.zoom_controls_active() {
            self.zoom.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.zoom_controls_active() {
            self.zoom.zoom_out();
        }
    }

    /// Advance the view mode. The first toggle on a page also returns the
    /// page id whose OCR text should now be fetched.
    pub fn toggle_ocr(&mut self) -> Option<String> {
        if !self.ocr_visible {
            self.ocr_visible = true;
            self.mode = ViewMode::Split;
            let page_id = self.current_page()?.id.clone();
            return self.ocr.request(&page_id);
        }
        self.mode = self.mode.next();
        None
    }

    pub fn retry_ocr(&mut self) -> Option<String> {
        self.ocr.retry()
    }

    pub fn apply_ocr(&mut self, page_id: &str, result: ApiResult<PageContent>) -> bool {
        self.ocr.complete(page_id, result)
    }

    pub fn handle_key(&mut self, key: ViewerKey) -> KeyOutcome {
        match key {
            ViewerKey::ArrowLeft => {
                self.previous();
            }
            ViewerKey::ArrowRight => {
                self.next();
            }
            ViewerKey::Plus | ViewerKey::Equals => self.zoom_in(),
            ViewerKey::Minus => self.zoom_out(),
            ViewerKey::Escape => return KeyOutcome::Close,
        }
        KeyOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeApi};
    use crate::api::{ApiError, DocumentApi};
    use crate::viewer::OcrStatus;

    fn pages(count: u32) -> Vec<FilePage> {
        (1..=count)
            .map(|n| FilePage {
                id: format!("page-{}", n),
                page_number: n,
                image_url: Some(format!("http://img.local/{}.png", n)),
            })
            .collect()
    }

    fn shown(viewer: &ViewerState) -> u32 {
        viewer.current_page().map(|p| p.page_number).unwrap_or(0)
    }

    #[test]
    fn test_open_defaults() {
        let viewer = ViewerState::open(pages(3), 2);
        assert_eq!(shown(&viewer), 2);
        assert_eq!(viewer.zoom().value(), 1.0);
        assert_eq!(viewer.mode(), ViewMode::ImageOnly);
        assert_eq!(viewer.ocr().status(), &OcrStatus::NotRequested);
        assert_eq!(viewer.position_label(), "Page 2 of 3");
    }

    #[test]
    fn test_open_unknown_page_falls_back_to_first() {
        let viewer = ViewerState::open(pages(3), 42);
        assert_eq!(shown(&viewer), 1);
    }

    #[test]
    fn test_zoom_stays_in_bounds() {
        let mut viewer = ViewerState::open(pages(1), 1);
        for _ in 0..20 {
            viewer.zoom_in();
        }
        assert_eq!(viewer.zoom().value(), ZOOM_MAX);
        assert!(!viewer.zoom().can_zoom_in());
        viewer.zoom_in();
        assert_eq!(viewer.zoom().value(), ZOOM_MAX);

        for _ in 0..20 {
            viewer.zoom_out();
        }
        assert_eq!(viewer.zoom().value(), ZOOM_MIN);
        viewer.zoom_out();
        assert_eq!(viewer.zoom().value(), ZOOM_MIN);
        assert_eq!(viewer.zoom().percent(), 50);
    }

    #[test]
    fn test_zoom_steps_by_quarter() {
        let mut viewer = ViewerState::open(pages(1), 1);
        viewer.zoom_in();
        assert_eq!(viewer.zoom().value(), 1.25);
        viewer.zoom_out();
        viewer.zoom_out();
        assert_eq!(viewer.zoom().value(), 0.75);
    }

    #[test]
    fn test_three_toggles_return_to_image_only() {
        let mut viewer = ViewerState::open(pages(2), 1);
        assert_eq!(viewer.toggle_ocr(), Some("page-1".to_string()));
        assert_eq!(viewer.mode(), ViewMode::Split);
        assert_eq!(viewer.toggle_ocr(), None);
        assert_eq!(viewer.mode(), ViewMode::TextOnly);
        assert_eq!(viewer.toggle_ocr(), None);
        assert_eq!(viewer.mode(), ViewMode::ImageOnly);
    }

    #[test]
    fn test_zoom_inactive_in_text_only() {
        let mut viewer = ViewerState::open(pages(1), 1);
        viewer.toggle_ocr();
        viewer.toggle_ocr();
        assert!(!viewer.zoom_controls_active());
        viewer.zoom_in();
        assert_eq!(viewer.zoom().value(), 1.0);
    }

    #[test]
    fn test_navigation_resets_view() {
        let mut viewer = ViewerState::open(pages(3), 1);
        viewer.zoom_in();
        viewer.toggle_ocr();
        viewer.apply_ocr("page-1", Ok(PageContent { content: "text".into() }));

        assert!(viewer.next());
        assert_eq!(shown(&viewer), 2);
        assert_eq!(viewer.zoom().value(), 1.0);
        assert_eq!(viewer.mode(), ViewMode::ImageOnly);
        assert_eq!(viewer.ocr().status(), &OcrStatus::NotRequested);

        viewer.zoom_out();
        assert!(viewer.previous());
        assert_eq!(viewer.zoom().value(), 1.0);
        assert_eq!(viewer.toggle_ocr(), Some("page-1".to_string()));
    }

    #[test]
    fn test_navigation_is_bounded() {
        let mut viewer = ViewerState::open(pages(2), 1);
        assert!(!viewer.previous());
        assert!(viewer.next());
        assert!(!viewer.next());
        assert_eq!(shown(&viewer), 2);
    }

    #[test]
    fn test_ocr_pending_page_offers_retry() {
        let mut viewer = ViewerState::open(pages(1), 1);
        let id = viewer.toggle_ocr().unwrap();
        viewer.apply_ocr(&id, Err(ApiError::NotFound("file page content not found".into())));
        assert_eq!(viewer.ocr().status(), &OcrStatus::NotYetProcessed);
        assert_eq!(viewer.retry_ocr(), Some(id));
    }

    #[tokio::test]
    async fn test_unprocessed_page_then_loaded_on_retry() {
        let fake = FakeApi::new();
        let mut viewer = ViewerState::open(pages(2), 1);

        let id = viewer.toggle_ocr().unwrap();
        viewer.apply_ocr(&id, fake.page_content(&id).await);
        assert_eq!(viewer.ocr().status(), &OcrStatus::NotYetProcessed);

        fake.set_content(&id, "Invoice 42");
        assert_eq!(viewer.retry_ocr(), Some(id.clone()));
        viewer.apply_ocr(&id, fake.page_content(&id).await);
        assert_eq!(
            viewer.ocr().status(),
            &OcrStatus::Loaded("Invoice 42".to_string())
        );
        assert_eq!(
            fake.calls(),
            vec![Call::PageContent(id.clone()), Call::PageContent(id)]
        );
    }

    #[test]
    fn test_stale_ocr_response_after_navigation_is_dropped() {
        let mut viewer = ViewerState::open(pages(2), 1);
        let first = viewer.toggle_ocr().unwrap();
        viewer.next();
        assert!(!viewer.apply_ocr(&first, Ok(PageContent { content: "p1".into() })));
        assert_eq!(viewer.ocr().status(), &OcrStatus::NotRequested);
    }

    #[test]
    fn test_keyboard_bindings() {
        let mut viewer = ViewerState::open(pages(3), 1);
        assert_eq!(viewer.handle_key(ViewerKey::ArrowRight), KeyOutcome::Handled);
        assert_eq!(shown(&viewer), 2);
        viewer.handle_key(ViewerKey::Plus);
        viewer.handle_key(ViewerKey::Equals);
        assert_eq!(viewer.zoom().value(), 1.5);
        viewer.handle_key(ViewerKey::Minus);
        assert_eq!(viewer.zoom().value(), 1.25);
        viewer.handle_key(ViewerKey::ArrowLeft);
        assert_eq!(shown(&viewer), 1);
        assert_eq!(viewer.handle_key(ViewerKey::Escape), KeyOutcome::Close);
    }

    #[test]
    fn test_key_text_mapping() {
        assert_eq!(ViewerKey::from_text("+"), Some(ViewerKey::Plus));
        assert_eq!(ViewerKey::from_text("="), Some(ViewerKey::Equals));
        assert_eq!(ViewerKey::from_text("-"), Some(ViewerKey::Minus));
        assert_eq!(ViewerKey::from_text("a"), None);
    }
}
