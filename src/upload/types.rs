use crate::api::{ApiError, UploadTarget};
use thiserror::Error;

/// Where an upload session is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadStage {
    #[default]
    Idle,
    Transferring,
    Confirming,
    Done(Confirmation),
    Failed(UploadError),
}

impl UploadStage {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadStage::Transferring | UploadStage::Confirming)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error("Select a file and wait for the upload target first")]
    NotReady,

    #[error("Could not obtain an upload target: {0}")]
    Target(ApiError),

    #[error("Could not read the selected file: {0}")]
    Read(String),

    #[error("File transfer failed: {0}")]
    Transfer(ApiError),

    #[error("Upload confirmation failed: {0}")]
    Confirm(ApiError),
}

impl UploadError {
    /// Name of the failing stage, for display.
    pub fn stage(&self) -> &'static str {
        match self {
            UploadError::NotReady => "validation",
            UploadError::Target(_) => "upload target",
            UploadError::Read(_) => "file read",
            UploadError::Transfer(_) => "transfer",
            UploadError::Confirm(_) => "confirmation",
        }
    }
}

/// Issuance of the write target, requested once per session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TargetState {
    #[default]
    NotRequested,
    Requesting,
    Ready(UploadTarget),
    Failed(UploadError),
}

/// A server-acknowledged upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub file_key: String,
    pub file_name: String,
    /// Whether the file showed up in the listing before the settle policy ran out.
    pub visible: bool,
}
