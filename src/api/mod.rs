mod client;
mod error;
#[cfg(test)]
pub mod fake;
mod types;

pub use client::{DocumentApi, HttpApi};
pub use error::{ApiError, ApiResult};
pub use types::{
    ConfirmUpload, FilePage, FileRecord, Page, PageContent, PaginationMeta, UploadTarget,
};
