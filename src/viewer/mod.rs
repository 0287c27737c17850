mod ocr_text;
mod state;

pub use ocr_text::{OcrStatus, OcrText};
pub use state::{KeyOutcome, ViewMode, ViewerKey, ViewerState, Zoom, ZOOM_MAX, ZOOM_MIN};
