mod dispatch;
mod state;
mod ui;
mod viewer_ui;

use crate::api::{DocumentApi, FileRecord};
use crate::cache::{QueryCache, ResourceKey};
use crate::pagination::{
    delete_files, FileListing, FilePageListing, PageSource, PagedCollection, PAGE_SIZE,
};
use crate::upload::{LocalFile, SettlePolicy, UploadFlow};
use crate::viewer::ViewerState;
use dispatch::Dispatcher;
use eframe::{egui, App};
use state::{
    AppEvent, AppState, DecodedImage, ImageCache, PagesScreen, Screen, Selection, UploadDialog,
};
use std::path::Path;
use std::sync::mpsc::{self as std_mpsc, Receiver};
use std::sync::Arc;
use tokio::runtime::Runtime;

pub struct OcrDesk {
    api: Arc<dyn DocumentApi>,
    api_url: String,
    cache: QueryCache,
    dispatcher: Dispatcher,
    events: Receiver<AppEvent>,
    files: PagedCollection<FileRecord>,
    selection: Selection,
    screen: Screen,
    upload: Option<UploadDialog>,
    next_dialog_id: u64,
    images: ImageCache,
    state: AppState,
}

impl OcrDesk {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        api: Arc<dyn DocumentApi>,
        api_url: String,
        runtime: Runtime,
    ) -> Self {
        tracing::info!("Initializing OCR desk");
        let cache = QueryCache::new();
        let (dispatcher, events) = Dispatcher::new(runtime, cc.egui_ctx.clone());
        Self {
            files: PagedCollection::new(ResourceKey::Files, cache.clone(), PAGE_SIZE),
            api,
            api_url,
            cache,
            dispatcher,
            events,
            selection: Selection::default(),
            screen: Screen::Files,
            upload: None,
            next_dialog_id: 0,
            images: ImageCache::default(),
            state: AppState::default(),
        }
    }

    fn upload_flow(&self) -> UploadFlow {
        UploadFlow::new(self.api.clone(), self.cache.clone(), SettlePolicy::default())
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(ctx, event);
        }
        self.drain_upload_stages();
        self.poll_fetches();

        let busy = self.files.is_loading()
            || self.state.is_deleting
            || self.upload.as_ref().is_some_and(|d| d.session.is_busy());
        if busy {
            ctx.request_repaint();
        }
    }

    fn handle_event(&mut self, ctx: &egui::Context, event: AppEvent) {
        match event {
            AppEvent::FilesFetched(ticket, result) => {
                self.files.complete(ticket, result);
            }
            AppEvent::PagesFetched(file_key, ticket, result) => match &mut self.screen {
                Screen::Pages(screen) if screen.file_key == file_key => {
                    if screen.pages.complete(ticket, result) {
                        let urls: Vec<String> = screen
                            .pages
                            .items()
                            .iter()
                            .filter_map(|p| p.image_url.clone())
                            .collect();
                        self.images.retain(&urls);
                    }
                }
                _ => tracing::debug!("Dropping pages of {}, screen changed", file_key),
            },
            AppEvent::FilesDeleted(keys, result) => {
                self.state.is_deleting = false;
                match result {
                    Ok(()) => {
                        tracing::info!("Deleted {} file(s)", keys.len());
                        self.selection.clear();
                    }
                    Err(e) => {
                        self.state.error_message = Some(format!("Failed to delete files: {}", e));
                    }
                }
            }
            AppEvent::FileUrl(result) => match result {
                Ok(url) => {
                    if let Err(e) = open::that(&url) {
                        self.state.error_message = Some(format!("Failed to open {}: {}", url, e));
                    }
                }
                Err(e) => {
                    self.state.error_message = Some(format!("Failed to resolve file URL: {}", e));
                }
            },
            AppEvent::UploadTarget(dialog_id, result) => {
                if let Some(dialog) = &mut self.upload {
                    dialog.apply_target(dialog_id, result);
                }
            }
            AppEvent::OcrText(page_id, result) => {
                if let Screen::Pages(PagesScreen {
                    viewer: Some(viewer),
                    ..
                }) = &mut self.screen
                {
                    viewer.apply_ocr(&page_id, result);
                }
            }
            AppEvent::ImageLoaded(url, result) => {
                self.images.complete(ctx, url, result);
            }
        }
    }

    fn drain_upload_stages(&mut self) {
        let Some(dialog) = &mut self.upload else {
            return;
        };
        dialog.drain_stages();
        if dialog.session.is_done() {
            tracing::info!("Upload finished, closing dialog");
            self.upload = None;
        }
    }

    fn poll_fetches(&mut self) {
        match &mut self.screen {
            Screen::Files => {
                if let Some(ticket) = self.files.poll() {
                    let source = FileListing::new(self.api.clone());
                    self.dispatcher.spawn(async move {
                        let result = source
                            .fetch_page(ticket.page_number, ticket.page_size)
                            .await;
                        AppEvent::FilesFetched(ticket, result)
                    });
                }
            }
            Screen::Pages(screen) => {
                if let Some(ticket) = screen.pages.poll() {
                    let file_key = screen.file_key.clone();
                    let source = FilePageListing::new(self.api.clone(), file_key.clone());
                    self.dispatcher.spawn(async move {
                        let result = source
                            .fetch_page(ticket.page_number, ticket.page_size)
                            .await;
                        AppEvent::PagesFetched(file_key, ticket, result)
                    });
                }
            }
        }
    }

    pub fn open_pages(&mut self, file: &FileRecord) {
        tracing::debug!("Opening pages of {}", file.file_key);
        self.images.clear();
        self.screen = Screen::Pages(PagesScreen {
            file_key: file.file_key.clone(),
            file_name: file.file_name.clone(),
            pages: PagedCollection::new(
                ResourceKey::FilePages(file.file_key.clone()),
                self.cache.clone(),
                PAGE_SIZE,
            ),
            viewer: None,
        });
    }

    pub fn refetch_pages(&mut self) {
        if let Screen::Pages(screen) = &mut self.screen {
            screen.pages.refetch();
            self.images.clear();
        }
    }

    pub fn set_pages_page(&mut self, page: u32) {
        if let Screen::Pages(screen) = &mut self.screen {
            screen.pages.set_page(page);
        }
    }

    pub fn back_to_files(&mut self) {
        self.screen = Screen::Files;
        self.images.clear();
    }

    /// Mark the file listing stale; the next frame refetches it.
    pub fn reload_files(&mut self) {
        self.files.invalidate();
    }

    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() || self.state.is_deleting {
            return;
        }
        let keys = self.selection.keys().to_vec();
        tracing::info!("Deleting files: {:?}", keys);
        self.state.is_deleting = true;
        self.state.error_message = None;

        let api = self.api.clone();
        let cache = self.cache.clone();
        self.dispatcher.spawn(async move {
            let result = delete_files(api.as_ref(), &cache, &keys).await;
            AppEvent::FilesDeleted(keys, result)
        });
    }

    pub fn show_file(&mut self, file_key: &str) {
        let api = self.api.clone();
        let file_key = file_key.to_string();
        self.dispatcher.spawn(async move {
            AppEvent::FileUrl(api.file_url(&file_key).await)
        });
    }

    pub fn open_upload_dialog(&mut self) {
        self.next_dialog_id += 1;
        self.upload = Some(UploadDialog::new(self.next_dialog_id));
        self.request_upload_target();
    }

    pub fn request_upload_target(&mut self) {
        let Some(dialog) = &mut self.upload else {
            return;
        };
        if dialog.session.begin_target_request() {
            let dialog_id = dialog.id;
            let flow = self.upload_flow();
            self.dispatcher.spawn(async move {
                AppEvent::UploadTarget(dialog_id, flow.request_target().await)
            });
        }
    }

    pub fn select_upload_file(&mut self, path: &Path) {
        let Some(dialog) = &mut self.upload else {
            return;
        };
        match LocalFile::from_path(path) {
            Ok(file) => {
                self.state.error_message = None;
                dialog.session.select_local_file(file);
            }
            Err(e) => self.state.error_message = Some(e.to_string()),
        }
    }

    pub fn submit_upload(&mut self) {
        let flow = self.upload_flow();
        let Some(dialog) = &mut self.upload else {
            return;
        };
        let request = match dialog.session.prepare_submit() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("Submit rejected: {}", e);
                return;
            }
        };

        let (sender, receiver) = std_mpsc::channel();
        dialog.stage_receiver = Some(receiver);
        self.dispatcher.spawn_detached(async move {
            flow.submit(request, &sender).await.ok();
        });
    }

    pub fn close_upload_dialog(&mut self) {
        if self.upload.as_ref().is_some_and(|d| !d.session.can_close()) {
            return;
        }
        self.upload = None;
    }

    pub fn open_viewer(&mut self, page_number: u32) {
        if let Screen::Pages(screen) = &mut self.screen {
            screen.viewer = Some(ViewerState::open(screen.pages.items().to_vec(), page_number));
        }
    }

    pub fn close_viewer(&mut self) {
        if let Screen::Pages(screen) = &mut self.screen {
            screen.viewer = None;
        }
    }

    fn fetch_ocr(&self, page_id: String) {
        let api = self.api.clone();
        self.dispatcher.spawn(async move {
            let result = api.page_content(&page_id).await;
            AppEvent::OcrText(page_id, result)
        });
    }

    pub fn retry_image(&mut self, url: &str) {
        self.images.forget(url);
    }

    pub fn request_image(&mut self, url: &str) {
        if !self.images.begin(url) {
            return;
        }
        let api = self.api.clone();
        let url = url.to_string();
        self.dispatcher.spawn(async move {
            let result = match api.fetch_bytes(&url).await {
                Ok(bytes) => DecodedImage::decode(&bytes),
                Err(e) => Err(e.to_string()),
            };
            AppEvent::ImageLoaded(url, result)
        });
    }
}

impl App for OcrDesk {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
