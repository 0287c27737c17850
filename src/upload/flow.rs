use super::session::SubmitRequest;
use super::types::{Confirmation, UploadError, UploadStage};
use crate::api::{ConfirmUpload, DocumentApi, UploadTarget};
use crate::cache::{QueryCache, ResourceKey};
use derivative::Derivative;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

/// How long to wait for a confirmed file to appear in the listing before
/// invalidating it anyway.
#[derive(Derivative, Debug, Clone, PartialEq)]
#[derivative(Default)]
pub struct SettlePolicy {
    #[derivative(Default(value = "5"))]
    pub attempts: u32,
    #[derivative(Default(value = "Duration::from_millis(250)"))]
    pub initial_delay: Duration,
    #[derivative(Default(value = "2"))]
    pub factor: u32,
    /// Listing page size used when looking for the new key.
    #[derivative(Default(value = "50"))]
    pub scan_page_size: u32,
}

/// Drives request-target, transfer and confirm against the backend.
#[derive(Clone)]
pub struct UploadFlow {
    api: Arc<dyn DocumentApi>,
    cache: QueryCache,
    settle: SettlePolicy,
}

impl UploadFlow {
    pub fn new(api: Arc<dyn DocumentApi>, cache: QueryCache, settle: SettlePolicy) -> Self {
        Self { api, cache, settle }
    }

    pub async fn request_target(&self) -> Result<UploadTarget, UploadError> {
        self.api.upload_target().await.map_err(UploadError::Target)
    }

    /// Transfer the bytes, then confirm. Confirmation is never sent unless
    /// the transfer succeeded. Nothing is retried.
    pub async fn submit(
        &self,
        request: SubmitRequest,
        progress: &Sender<UploadStage>,
    ) -> Result<Confirmation, UploadError> {
        let result = self.transfer_and_confirm(request, progress).await;
        let stage = match &result {
            Ok(confirmation) => UploadStage::Done(confirmation.clone()),
            Err(e) => {
                tracing::error!("Upload failed at {}: {}", e.stage(), e);
                UploadStage::Failed(e.clone())
            }
        };
        progress.send(stage).unwrap_or_default();
        result
    }

    async fn transfer_and_confirm(
        &self,
        request: SubmitRequest,
        progress: &Sender<UploadStage>,
    ) -> Result<Confirmation, UploadError> {
        let SubmitRequest { target, file } = request;
        let file_name = file.name.clone();

        progress.send(UploadStage::Transferring).unwrap_or_default();
        tracing::info!("Transferring {} ({} bytes)", file_name, file.size());
        self.api
            .put_object(&target.upload_url, file.bytes, &file.content_type)
            .await
            .map_err(UploadError::Transfer)?;

        progress.send(UploadStage::Confirming).unwrap_or_default();
        let confirm = ConfirmUpload {
            file_name: file_name.clone(),
            file_key: target.file_key.clone(),
            bucket_name: target.bucket_name.clone(),
        };
        self.api
            .confirm_upload(&confirm)
            .await
            .map_err(UploadError::Confirm)?;
        tracing::info!("Upload of {} confirmed as {}", file_name, target.file_key);

        let visible = self.wait_until_listed(&target.file_key).await;
        self.cache.invalidate(ResourceKey::Files);

        Ok(Confirmation {
            file_key: target.file_key,
            file_name,
            visible,
        })
    }

    /// Poll the first listing page with exponential backoff until the key
    /// shows up or attempts run out.
    async fn wait_until_listed(&self, file_key: &str) -> bool {
        let mut delay = self.settle.initial_delay;
        for attempt in 1..=self.settle.attempts {
            tokio::time::sleep(delay).await;
            match self.api.list_files(1, self.settle.scan_page_size).await {
                Ok(page) if page.items.iter().any(|f| f.file_key == file_key) => {
                    tracing::debug!("{} listed after {} attempt(s)", file_key, attempt);
                    return true;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Listing while waiting for {} failed: {}", file_key, e),
            }
            delay *= self.settle.factor;
        }
        if self.settle.attempts > 0 {
            tracing::warn!("{} not listed yet, invalidating anyway", file_key);
        }
        false
    }
}
