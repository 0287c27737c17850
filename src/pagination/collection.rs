use super::state::PaginationState;
use crate::api::{ApiError, ApiResult, DocumentApi, FilePage, FileRecord, Page};
use crate::cache::{QueryCache, ResourceKey};
use async_trait::async_trait;
use std::sync::Arc;

/// Something that can serve one page of a remote collection.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, page_number: u32, page_size: u32) -> ApiResult<Page<T>>;
}

/// The file listing.
#[derive(Clone)]
pub struct FileListing {
    api: Arc<dyn DocumentApi>,
}

impl FileListing {
    pub fn new(api: Arc<dyn DocumentApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource<FileRecord> for FileListing {
    async fn fetch_page(&self, page_number: u32, page_size: u32) -> ApiResult<Page<FileRecord>> {
        self.api.list_files(page_number, page_size).await
    }
}

/// The rendered pages of one file.
#[derive(Clone)]
pub struct FilePageListing {
    api: Arc<dyn DocumentApi>,
    file_key: String,
}

impl FilePageListing {
    pub fn new(api: Arc<dyn DocumentApi>, file_key: impl Into<String>) -> Self {
        Self {
            api,
            file_key: file_key.into(),
        }
    }
}

#[async_trait]
impl PageSource<FilePage> for FilePageListing {
    async fn fetch_page(&self, page_number: u32, page_size: u32) -> ApiResult<Page<FilePage>> {
        self.api
            .list_file_pages(&self.file_key, page_number, page_size)
            .await
    }
}

/// Identifies one issued request. Completions carrying anything but the
/// latest ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub page_number: u32,
    pub page_size: u32,
}

/// Client-side view of a paginated remote collection: the current page
/// number, the last page received and whether it needs refetching.
pub struct PagedCollection<T> {
    key: ResourceKey,
    cache: QueryCache,
    pagination: PaginationState,
    data: Option<Page<T>>,
    error: Option<ApiError>,
    next_seq: u64,
    in_flight: Option<u64>,
    attempted_generation: Option<u64>,
    requested: bool,
}

impl<T> PagedCollection<T> {
    pub fn new(key: ResourceKey, cache: QueryCache, page_size: u32) -> Self {
        Self {
            key,
            cache,
            pagination: PaginationState::new(page_size),
            data: None,
            error: None,
            next_seq: 0,
            in_flight: None,
            attempted_generation: None,
            requested: false,
        }
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn page(&self) -> Option<&Page<T>> {
        self.data.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.data.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True when the next read must go to the server: an explicit page
    /// change or refetch, or the cache generation moved since the last try.
    pub fn needs_fetch(&self) -> bool {
        if self.requested {
            return true;
        }
        if self.in_flight.is_some() {
            return false;
        }
        match self.attempted_generation {
            None => true,
            Some(generation) => !self.cache.is_fresh(&self.key, generation),
        }
    }

    /// Issue a new request, superseding any in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_seq += 1;
        let generation = self.cache.generation(&self.key);
        self.in_flight = Some(self.next_seq);
        self.attempted_generation = Some(generation);
        self.requested = false;
        FetchTicket {
            seq: self.next_seq,
            page_number: self.pagination.page(),
            page_size: self.pagination.page_size(),
        }
    }

    /// `begin_fetch` if the collection needs it.
    pub fn poll(&mut self) -> Option<FetchTicket> {
        if self.needs_fetch() {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    /// Apply a response. Returns false when the ticket was superseded.
    pub fn complete(&mut self, ticket: FetchTicket, result: ApiResult<Page<T>>) -> bool {
        if self.in_flight != Some(ticket.seq) {
            tracing::debug!(
                "Dropping stale response for {:?} (seq {}, latest {:?})",
                self.key,
                ticket.seq,
                self.in_flight
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let clamped = self.pagination.update_total(page.pagination.total_items);
                self.data = Some(page);
                self.error = None;
                if clamped {
                    self.requested = true;
                }
            }
            Err(e) => {
                tracing::warn!("Fetching {:?} failed: {}", self.key, e);
                self.error = Some(e);
            }
        }
        true
    }

    pub fn set_page(&mut self, page: u32) {
        if self.pagination.set_page(page) {
            self.requested = true;
        }
    }

    /// Re-issue the current page without changing it.
    pub fn refetch(&mut self) {
        self.requested = true;
    }

    /// Mark this resource stale for every holder of the cache.
    pub fn invalidate(&self) {
        self.cache.invalidate(self.key.clone());
    }

    /// Fetch the current page through `source` and apply it, awaiting inline.
    #[cfg(test)]
    pub async fn fetch<S>(&mut self, source: &S) -> ApiResult<&Page<T>>
    where
        S: PageSource<T> + ?Sized,
    {
        let ticket = self.begin_fetch();
        let result = source
            .fetch_page(ticket.page_number, ticket.page_size)
            .await;
        self.complete(ticket, result);

        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        self.data
            .as_ref()
            .ok_or_else(|| ApiError::Decode("no page received".into()))
    }
}

/// Bulk delete, then mark the file listing stale.
pub async fn delete_files(
    api: &dyn DocumentApi,
    cache: &QueryCache,
    file_keys: &[String],
) -> ApiResult<()> {
    api.delete_files(file_keys).await?;
    cache.invalidate(ResourceKey::Files);
    Ok(())
}
