use crate::api::{ApiResult, FilePage, FileRecord, Page, PageContent, UploadTarget};
use crate::pagination::{FetchTicket, PagedCollection};
use crate::upload::{UploadError, UploadSession, UploadStage};
use crate::viewer::ViewerState;
use eframe::egui;
use std::collections::HashMap;
use std::sync::mpsc::Receiver;

/// Results delivered from the runtime to the UI thread.
pub enum AppEvent {
    FilesFetched(FetchTicket, ApiResult<Page<FileRecord>>),
    PagesFetched(String, FetchTicket, ApiResult<Page<FilePage>>),
    FilesDeleted(Vec<String>, ApiResult<()>),
    FileUrl(ApiResult<String>),
    UploadTarget(u64, Result<UploadTarget, UploadError>),
    OcrText(String, ApiResult<PageContent>),
    ImageLoaded(String, Result<DecodedImage, String>),
}

pub struct DecodedImage {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let image = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        let rgba = image.to_rgba8();
        Ok(Self {
            size: [rgba.width() as usize, rgba.height() as usize],
            rgba: rgba.into_raw(),
        })
    }
}

pub enum ImageSlot {
    Loading,
    Ready(egui::TextureHandle),
    Failed(String),
}

/// Page images by URL for the gallery currently shown.
#[derive(Default)]
pub struct ImageCache {
    slots: HashMap<String, ImageSlot>,
}

impl ImageCache {
    pub fn get(&self, url: &str) -> Option<&ImageSlot> {
        self.slots.get(url)
    }

    /// Returns true if `url` has no slot yet and should be requested now.
    /// Called every frame, so a failed URL stays failed until `forget`.
    pub fn begin(&mut self, url: &str) -> bool {
        if self.slots.contains_key(url) {
            return false;
        }
        self.slots.insert(url.to_string(), ImageSlot::Loading);
        true
    }

    /// Drop a failed slot so the next `begin` requests it again.
    pub fn forget(&mut self, url: &str) {
        if matches!(self.slots.get(url), Some(ImageSlot::Failed(_))) {
            self.slots.remove(url);
        }
    }

    /// Drop every slot whose URL is not in `urls`, releasing its texture.
    pub fn retain(&mut self, urls: &[String]) {
        self.slots.retain(|url, _| urls.contains(url));
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Ignored unless `url` is still waiting for its image.
    pub fn complete(&mut self, ctx: &egui::Context, url: String, result: Result<DecodedImage, String>) {
        if !matches!(self.slots.get(&url), Some(ImageSlot::Loading)) {
            tracing::debug!("Dropping image {}, no longer shown", url);
            return;
        }
        let slot = match result {
            Ok(decoded) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(decoded.size, &decoded.rgba);
                let handle = ctx.load_texture(url.clone(), image, egui::TextureOptions::LINEAR);
                ImageSlot::Ready(handle)
            }
            Err(e) => {
                tracing::warn!("Failed to load image {}: {}", url, e);
                ImageSlot::Failed(e)
            }
        };
        self.slots.insert(url, slot);
    }
}

/// Multi-select over file keys. Cleared by the caller after a delete.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Selection {
    keys: Vec<String>,
}

impl Selection {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn toggle(&mut self, key: &str) {
        if self.contains(key) {
            self.keys.retain(|k| k != key);
        } else {
            self.keys.push(key.to_string());
        }
    }

    pub fn all_selected(&self, visible: &[String]) -> bool {
        !visible.is_empty() && visible.iter().all(|k| self.contains(k))
    }

    /// Select every visible key, or clear if they already are all selected.
    pub fn toggle_all(&mut self, visible: &[String]) {
        if self.all_selected(visible) {
            self.keys.clear();
        } else {
            self.keys = visible.to_vec();
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// The page gallery of one file, with its viewer overlay.
pub struct PagesScreen {
    pub file_key: String,
    pub file_name: String,
    pub pages: PagedCollection<FilePage>,
    pub viewer: Option<ViewerState>,
}

pub enum Screen {
    Files,
    Pages(PagesScreen),
}

/// The upload dialog while open. `id` tells its target response apart from
/// one requested by an earlier dialog.
pub struct UploadDialog {
    pub id: u64,
    pub session: UploadSession,
    pub stage_receiver: Option<Receiver<UploadStage>>,
}

impl UploadDialog {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            session: UploadSession::default(),
            stage_receiver: None,
        }
    }

    /// Returns false when the response belongs to another dialog.
    pub fn apply_target(&mut self, id: u64, result: Result<UploadTarget, UploadError>) -> bool {
        if id != self.id {
            tracing::debug!("Dropping upload target for dialog {}", id);
            return false;
        }
        self.session.apply_target(result);
        true
    }

    pub fn drain_stages(&mut self) {
        if let Some(receiver) = &self.stage_receiver {
            self.session.apply_stages(receiver);
        }
    }
}

#[derive(Default)]
pub struct AppState {
    pub is_deleting: bool,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::TargetState;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle_row() {
        let mut selection = Selection::default();
        selection.toggle("a");
        selection.toggle("b");
        selection.toggle("a");
        assert_eq!(selection.keys(), &keys(&["b"])[..]);
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let visible = keys(&["a", "b", "c"]);
        let mut selection = Selection::default();
        selection.toggle("b");

        selection.toggle_all(&visible);
        assert!(selection.all_selected(&visible));

        selection.toggle_all(&visible);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_empty_listing_is_never_all_selected() {
        assert!(!Selection::default().all_selected(&[]));
    }

    #[test]
    fn test_image_cache_requests_once() {
        let mut cache = ImageCache::default();
        assert!(cache.begin("http://img.local/1.png"));
        assert!(!cache.begin("http://img.local/1.png"));
        assert!(matches!(cache.get("http://img.local/1.png"), Some(ImageSlot::Loading)));
    }

    #[test]
    fn test_failed_image_can_be_requested_again() {
        let ctx = egui::Context::default();
        let mut cache = ImageCache::default();
        let url = "http://img.local/1.png";
        assert!(cache.begin(url));
        cache.complete(&ctx, url.to_string(), Err("expired signature".into()));
        assert!(matches!(cache.get(url), Some(ImageSlot::Failed(_))));
        assert!(!cache.begin(url));

        cache.forget(url);
        assert!(cache.begin(url));
        cache.forget(url);
        assert!(matches!(cache.get(url), Some(ImageSlot::Loading)));
    }

    #[test]
    fn test_retain_drops_urls_no_longer_listed() {
        let ctx = egui::Context::default();
        let mut cache = ImageCache::default();
        let old = "http://img.local/1.png?sig=a";
        let kept = "http://img.local/2.png?sig=a";
        cache.begin(old);
        cache.begin(kept);

        cache.retain(&[kept.to_string()]);
        assert!(cache.get(old).is_none());
        assert!(cache.get(kept).is_some());

        cache.complete(&ctx, old.to_string(), Err("late".into()));
        assert!(cache.get(old).is_none());

        cache.clear();
        assert!(cache.get(kept).is_none());
    }

    #[test]
    fn test_target_for_earlier_dialog_is_dropped() {
        let mut dialog = UploadDialog::new(2);
        dialog.session.begin_target_request();
        let target = UploadTarget {
            upload_url: "http://s3.local/files/01J".into(),
            file_key: "01J".into(),
            bucket_name: None,
        };

        assert!(!dialog.apply_target(1, Ok(target.clone())));
        assert_eq!(dialog.session.target(), &TargetState::Requesting);

        assert!(dialog.apply_target(2, Ok(target.clone())));
        assert_eq!(dialog.session.target(), &TargetState::Ready(target));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(DecodedImage::decode(b"not an image").is_err());
    }
}
