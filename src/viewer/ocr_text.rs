use crate::api::{ApiError, ApiResult, PageContent};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OcrStatus {
    #[default]
    NotRequested,
    Loading,
    Loaded(String),
    /// The backend has no text for this page yet (HTTP 404).
    NotYetProcessed,
    Failed(ApiError),
}

/// OCR text of the page currently shown in the viewer. Fetched lazily, on
/// request, and never retried without a user action.
#[derive(Debug, Clone, Default)]
pub struct OcrText {
    page_id: Option<String>,
    status: OcrStatus,
}

impl OcrText {
    pub fn status(&self) -> &OcrStatus {
        &self.status
    }

    /// The text, once loaded.
    pub fn loaded_text(&self) -> Option<&str> {
        match &self.status {
            OcrStatus::Loaded(text) => Some(text),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns the page id to fetch, or None if this page is already
    /// loaded or loading.
    pub fn request(&mut self, page_id: &str) -> Option<String> {
        let same_page = self.page_id.as_deref() == Some(page_id);
        if same_page && matches!(self.status, OcrStatus::Loading | OcrStatus::Loaded(_)) {
            return None;
        }
        self.page_id = Some(page_id.to_string());
        self.status = OcrStatus::Loading;
        Some(page_id.to_string())
    }

    /// Manual retry after not-yet-processed or a failure.
    pub fn retry(&mut self) -> Option<String> {
        match (&self.status, &self.page_id) {
            (OcrStatus::NotYetProcessed | OcrStatus::Failed(_), Some(id)) => {
                let id = id.clone();
                self.status = OcrStatus::Loading;
                Some(id)
            }
            _ => None,
        }
    }

    /// Apply a response; dropped unless it belongs to the pending request.
    pub fn complete(&mut self, page_id: &str, result: ApiResult<PageContent>) -> bool {
        if self.page_id.as_deref() != Some(page_id) || self.status != OcrStatus::Loading {
            tracing::debug!("Dropping OCR response for page {}", page_id);
            return false;
        }
        self.status = match result {
            Ok(page) => OcrStatus::Loaded(page.content),
            Err(e) if e.is_not_found() => OcrStatus::NotYetProcessed,
            Err(e) => {
                tracing::warn!("OCR text for page {} failed: {}", page_id, e);
                OcrStatus::Failed(e)
            }
        };
        true
    }
}
