//! In-memory `DocumentApi` used by tests.

use super::error::{ApiError, ApiResult};
use super::types::{
    ConfirmUpload, FilePage, FileRecord, Page, PageContent, PaginationMeta, UploadTarget,
};
use super::DocumentApi;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListFiles { page_number: u32, page_size: u32 },
    DeleteFiles(Vec<String>),
    FileUrl(String),
    UploadTarget,
    Put { url: String, bytes: Vec<u8>, content_type: String },
    Confirm(ConfirmUpload),
    ListFilePages { file_key: String, page_number: u32 },
    PageContent(String),
    FetchBytes(String),
}

#[derive(Default)]
struct Store {
    files: Vec<FileRecord>,
    pages: HashMap<String, Vec<FilePage>>,
    contents: HashMap<String, String>,
    pending: Vec<(FileRecord, usize)>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeApi {
    store: Mutex<Store>,
    pub fail_target: bool,
    pub fail_put: bool,
    pub fail_confirm: bool,
    pub fail_list: bool,
    /// Number of listings a confirmed file stays invisible for.
    pub confirm_lag: usize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(count: usize) -> Self {
        let api = Self::new();
        {
            let mut store = api.store.lock();
            for i in 0..count {
                store.files.push(file_record(&format!("key-{}", i), &format!("doc-{}.pdf", i)));
            }
        }
        api
    }

    pub fn add_pages(&self, file_key: &str, count: u32) {
        let mut store = self.store.lock();
        let pages = (1..=count)
            .map(|n| FilePage {
                id: format!("{}-p{}", file_key, n),
                page_number: n,
                image_url: Some(format!("http://img.local/{}/{}.png", file_key, n)),
            })
            .collect();
        store.pages.insert(file_key.to_string(), pages);
    }

    pub fn set_content(&self, page_id: &str, content: &str) {
        self.store
            .lock()
            .contents
            .insert(page_id.to_string(), content.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.store.lock().calls.clone()
    }

    fn record(&self, call: Call) {
        self.store.lock().calls.push(call);
    }
}

pub fn file_record(key: &str, name: &str) -> FileRecord {
    FileRecord {
        file_key: key.to_string(),
        file_name: name.to_string(),
        file_type: Some("application/pdf".to_string()),
        file_size: 1024,
        created_at: "2024-05-01T10:00:00Z".to_string(),
    }
}

fn slice<T: Clone>(all: &[T], page_number: u32, page_size: u32) -> Page<T> {
    let size = page_size.max(1) as usize;
    let start = (page_number.max(1) as usize - 1) * size;
    let items: Vec<T> = all.iter().skip(start).take(size).cloned().collect();
    Page {
        items,
        pagination: PaginationMeta {
            page_number: page_number.max(1),
            page_size,
            total_items: all.len() as u64,
            has_next_page: start + size < all.len(),
        },
    }
}

#[async_trait]
impl DocumentApi for FakeApi {
    async fn list_files(&self, page_number: u32, page_size: u32) -> ApiResult<Page<FileRecord>> {
        self.record(Call::ListFiles {
            page_number,
            page_size,
        });
        if self.fail_list {
            return Err(ApiError::Transport("connection refused".into()));
        }

        let mut store = self.store.lock();
        let mut visible = Vec::new();
        for (file, remaining) in std::mem::take(&mut store.pending) {
            if remaining == 0 {
                visible.push(file);
            } else {
                store.pending.push((file, remaining - 1));
            }
        }
        store.files.extend(visible);
        Ok(slice(&store.files, page_number, page_size))
    }

    async fn delete_files(&self, file_keys: &[String]) -> ApiResult<()> {
        self.record(Call::DeleteFiles(file_keys.to_vec()));
        self.store
            .lock()
            .files
            .retain(|f| !file_keys.contains(&f.file_key));
        Ok(())
    }

    async fn file_url(&self, file_key: &str) -> ApiResult<String> {
        self.record(Call::FileUrl(file_key.to_string()));
        Ok(format!("http://s3.local/files/{}", file_key))
    }

    async fn upload_target(&self) -> ApiResult<UploadTarget> {
        self.record(Call::UploadTarget);
        if self.fail_target {
            return Err(ApiError::Server {
                status: 500,
                message: "presign failed".into(),
            });
        }
        Ok(UploadTarget {
            upload_url: "http://s3.local/files/01HNEW?X-Amz-Signature=abc".into(),
            file_key: "01HNEW".into(),
            bucket_name: None,
        })
    }

    async fn put_object(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ApiResult<()> {
        self.record(Call::Put {
            url: upload_url.to_string(),
            bytes,
            content_type: content_type.to_string(),
        });
        if self.fail_put {
            return Err(ApiError::Server {
                status: 403,
                message: "SignatureDoesNotMatch".into(),
            });
        }
        Ok(())
    }

    async fn confirm_upload(&self, request: &ConfirmUpload) -> ApiResult<()> {
        self.record(Call::Confirm(request.clone()));
        if self.fail_confirm {
            return Err(ApiError::Transport("connection reset".into()));
        }
        let record = file_record(&request.file_key, &request.file_name);
        self.store.lock().pending.push((record, self.confirm_lag));
        Ok(())
    }

    async fn list_file_pages(
        &self,
        file_key: &str,
        page_number: u32,
        page_size: u32,
    ) -> ApiResult<Page<FilePage>> {
        self.record(Call::ListFilePages {
            file_key: file_key.to_string(),
            page_number,
        });
        let store = self.store.lock();
        let pages = store.pages.get(file_key).cloned().unwrap_or_default();
        Ok(slice(&pages, page_number, page_size))
    }

    async fn page_content(&self, page_id: &str) -> ApiResult<PageContent> {
        self.record(Call::PageContent(page_id.to_string()));
        match self.store.lock().contents.get(page_id) {
            Some(content) => Ok(PageContent {
                content: content.clone(),
            }),
            None => Err(ApiError::NotFound("file page content not found".into())),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> ApiResult<Vec<u8>> {
        self.record(Call::FetchBytes(url.to_string()));
        Ok(url.as_bytes().to_vec())
    }
}
