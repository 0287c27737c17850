use super::error::{ApiError, ApiResult};
use super::types::{
    ConfirmUpload, DeleteFilesRequest, FilePage, FilePagesResponse, FileRecord, FileUrlResponse,
    FilesResponse, Page, PageContent, UploadTarget,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// The backend as seen by this client.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn list_files(&self, page_number: u32, page_size: u32) -> ApiResult<Page<FileRecord>>;

    async fn delete_files(&self, file_keys: &[String]) -> ApiResult<()>;

    async fn file_url(&self, file_key: &str) -> ApiResult<String>;

    async fn upload_target(&self) -> ApiResult<UploadTarget>;

    /// Raw byte transfer to a pre-signed URL, bypassing the API server.
    async fn put_object(&self, upload_url: &str, bytes: Vec<u8>, content_type: &str)
        -> ApiResult<()>;

    async fn confirm_upload(&self, request: &ConfirmUpload) -> ApiResult<()>;

    async fn list_file_pages(
        &self,
        file_key: &str,
        page_number: u32,
        page_size: u32,
    ) -> ApiResult<Page<FilePage>>;

    async fn page_content(&self, page_id: &str) -> ApiResult<PageContent>;

    /// Plain GET of a pre-signed URL, such as a rendered page image.
    async fn fetch_bytes(&self, url: &str) -> ApiResult<Vec<u8>>;
}

/// `DocumentApi` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Request failed with status {}: {}", status, body);
            Err(ApiError::from_status(status, body))
        }
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
        let response = Self::send(request).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DocumentApi for HttpApi {
    async fn list_files(&self, page_number: u32, page_size: u32) -> ApiResult<Page<FileRecord>> {
        tracing::debug!("Listing files page {} (size {})", page_number, page_size);
        let request = self
            .client
            .get(self.url("/v1/files"))
            .query(&[("pageNumber", page_number), ("pageSize", page_size)]);
        let response: FilesResponse = Self::json(request).await?;
        Ok(response.into())
    }

    async fn delete_files(&self, file_keys: &[String]) -> ApiResult<()> {
        tracing::info!("Deleting {} file(s)", file_keys.len());
        let request = self
            .client
            .post(self.url("/v1/files:delete"))
            .json(&DeleteFilesRequest { file_keys });
        Self::send(request).await?;
        Ok(())
    }

    async fn file_url(&self, file_key: &str) -> ApiResult<String> {
        let request = self
            .client
            .get(self.url(&format!("/v1/storage/files/{}/url", file_key)));
        let response: FileUrlResponse = Self::json(request).await?;
        if response.file_url.is_empty() {
            return Err(ApiError::NotFound(format!("no URL for file {}", file_key)));
        }
        Ok(response.file_url)
    }

    async fn upload_target(&self) -> ApiResult<UploadTarget> {
        let request = self.client.get(self.url("/v1/storage/upload-url"));
        Self::json(request).await
    }

    async fn put_object(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ApiResult<()> {
        tracing::debug!("PUT {} bytes ({}) to upload target", bytes.len(), content_type);
        let request = self
            .client
            .put(upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        Self::send(request).await?;
        Ok(())
    }

    async fn confirm_upload(&self, request: &ConfirmUpload) -> ApiResult<()> {
        let request = self
            .client
            .post(self.url("/v1/storage/confirm"))
            .json(request);
        Self::send(request).await?;
        Ok(())
    }

    async fn list_file_pages(
        &self,
        file_key: &str,
        page_number: u32,
        page_size: u32,
    ) -> ApiResult<Page<FilePage>> {
        tracing::debug!(
            "Listing pages of {} page {} (size {})",
            file_key,
            page_number,
            page_size
        );
        let request = self
            .client
            .get(self.url(&format!("/v1/files/{}/pages", file_key)))
            .query(&[("pageNumber", page_number), ("pageSize", page_size)]);
        let response: FilePagesResponse = Self::json(request).await?;
        Ok(response.into())
    }

    async fn page_content(&self, page_id: &str) -> ApiResult<PageContent> {
        let request = self
            .client
            .get(self.url(&format!("/v1/pages/{}/content", page_id)));
        Self::json(request).await
    }

    async fn fetch_bytes(&self, url: &str) -> ApiResult<Vec<u8>> {
        let response = Self::send(self.client.get(url)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
