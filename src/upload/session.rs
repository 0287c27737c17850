use super::local_file::LocalFile;
use super::types::{TargetState, UploadError, UploadStage};
use crate::api::UploadTarget;
use std::sync::mpsc::Receiver;

/// What `UploadFlow::submit` needs: an issued target and the bytes to send.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub target: UploadTarget,
    pub file: LocalFile,
}

/// State of one upload dialog, from opening until it closes.
#[derive(Debug, Default)]
pub struct UploadSession {
    target: TargetState,
    file: Option<LocalFile>,
    stage: UploadStage,
}

impl UploadSession {
    pub fn target(&self) -> &TargetState {
        &self.target
    }

    pub fn file(&self) -> Option<&LocalFile> {
        self.file.as_ref()
    }

    pub fn stage(&self) -> &UploadStage {
        &self.stage
    }

    /// Returns true if a target request should be issued now. An issued
    /// target is kept for the rest of the session.
    pub fn begin_target_request(&mut self) -> bool {
        match self.target {
            TargetState::NotRequested | TargetState::Failed(_) => {
                self.target = TargetState::Requesting;
                true
            }
            TargetState::Requesting | TargetState::Ready(_) => false,
        }
    }

    pub fn apply_target(&mut self, result: Result<UploadTarget, UploadError>) {
        self.target = match result {
            Ok(target) => {
                tracing::debug!("Upload target issued for key {}", target.file_key);
                TargetState::Ready(target)
            }
            Err(e) => {
                tracing::warn!("Upload target request failed: {}", e);
                TargetState::Failed(e)
            }
        };
    }

    pub fn select_local_file(&mut self, file: LocalFile) {
        self.file = Some(file);
        if matches!(self.stage, UploadStage::Failed(_)) {
            self.stage = UploadStage::Idle;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.stage.is_in_flight() || matches!(self.target, TargetState::Requesting)
    }

    /// The dialog can be dismissed unless bytes are on the wire. A pending
    /// target request does not hold it open.
    pub fn can_close(&self) -> bool {
        !self.stage.is_in_flight()
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, UploadStage::Done(_))
    }

    /// Submit is possible only with both an issued target and a selected file.
    pub fn can_submit(&self) -> bool {
        matches!(self.target, TargetState::Ready(_))
            && self.file.is_some()
            && !self.stage.is_in_flight()
    }

    /// Validate preconditions and move to `Transferring`.
    pub fn prepare_submit(&mut self) -> Result<SubmitRequest, UploadError> {
        if !self.can_submit() {
            return Err(UploadError::NotReady);
        }
        let (TargetState::Ready(target), Some(file)) = (&self.target, &self.file) else {
            return Err(UploadError::NotReady);
        };

        let request = SubmitRequest {
            target: target.clone(),
            file: file.clone(),
        };
        self.stage = UploadStage::Transferring;
        Ok(request)
    }

    pub fn apply_stage(&mut self, stage: UploadStage) {
        self.stage = stage;
    }

    /// Apply every stage a running submit has reported so far.
    pub fn apply_stages(&mut self, receiver: &Receiver<UploadStage>) {
        for stage in receiver.try_iter() {
            self.apply_stage(stage);
        }
    }
}
