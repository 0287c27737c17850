use super::state::{ImageSlot, Screen};
use super::OcrDesk;
use crate::api::{FilePage, FileRecord};
use crate::pagination::PaginationState;
use crate::upload::{TargetState, UploadStage};
use crate::utils::file_size::FileSizeUtils;
use crate::utils::timestamp::format_created_at;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const ERROR: Color32 = Color32::from_rgb(220, 50, 50);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);
const THUMBNAIL_WIDTH: f32 = 140.0;

impl OcrDesk {
    pub fn render(&mut self, ctx: &egui::Context) {
        if matches!(self.screen, Screen::Files) {
            self.render_files(ctx);
        } else if self.viewer_open() {
            self.render_viewer(ctx);
        } else {
            self.render_pages(ctx);
        }

        if self.upload.is_some() {
            self.render_upload_dialog(ctx);
        }
    }

    fn render_files(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.render_footer(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.heading("Documents");
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("📤 Upload").clicked() {
                        self.open_upload_dialog();
                    }

                    let can_delete = !self.selection.is_empty() && !self.state.is_deleting;
                    ui.add_enabled_ui(can_delete, |ui| {
                        let label = if self.state.is_deleting {
                            "🗑 Deleting...".to_string()
                        } else {
                            format!("🗑 Delete ({})", self.selection.keys().len())
                        };
                        if ui.button(label).clicked() {
                            self.delete_selected();
                        }
                    });

                    if ui.button("🔄 Reload").clicked() {
                        self.reload_files();
                    }
                });
            });
            ui.add_space(10.0);

            if let Some(err) = self.files.error() {
                let message = format!("Failed to load files: {}", err);
                ui.vertical_centered(|ui| {
                    ui.colored_label(ERROR, message);
                    if ui.button("Retry").clicked() {
                        self.files.refetch();
                    }
                });
                return;
            }

            if self.files.page().is_none() {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.spinner();
                    ui.label("Loading files...");
                });
                return;
            }

            if self.files.items().is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.heading("Get started");
                    ui.label(
                        RichText::new("Upload a PDF or image to have its pages rendered and recognised")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                    ui.add_space(10.0);
                    let button = egui::Button::new("📤 Upload File").min_size(egui::vec2(200.0, 40.0));
                    if ui.add(button).clicked() {
                        self.open_upload_dialog();
                    }
                });
                return;
            }

            let files = self.files.items().to_vec();
            egui::ScrollArea::vertical()
                .max_height((ui.available_height() - 40.0).max(0.0))
                .show(ui, |ui| {
                    self.render_file_table(ui, &files);
                });

            if let Some(page) = render_pagination(ui, self.files.pagination()) {
                self.files.set_page(page);
            }
        });
    }

    fn render_file_table(&mut self, ui: &mut egui::Ui, files: &[FileRecord]) {
        let visible: Vec<String> = files.iter().map(|f| f.file_key.clone()).collect();

        egui::Grid::new("files")
            .num_columns(5)
            .striped(true)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                let mut all = self.selection.all_selected(&visible);
                if ui.checkbox(&mut all, "").changed() {
                    self.selection.toggle_all(&visible);
                }
                ui.strong("Name");
                ui.strong("Size");
                ui.strong("Uploaded");
                ui.label("");
                ui.end_row();

                for file in files {
                    let mut checked = self.selection.contains(&file.file_key);
                    if ui.checkbox(&mut checked, "").changed() {
                        self.selection.toggle(&file.file_key);
                    }
                    ui.label(&file.file_name);
                    ui.label(FileSizeUtils::format_size(file.file_size));
                    ui.label(format_created_at(&file.created_at));
                    ui.horizontal(|ui| {
                        if ui.button("Show").clicked() {
                            self.show_file(&file.file_key);
                        }
                        if ui.button("Pages").clicked() {
                            self.open_pages(file);
                        }
                    });
                    ui.end_row();
                }
            });
    }

    fn render_pages(&mut self, ctx: &egui::Context) {
        let Screen::Pages(screen) = &self.screen else {
            return;
        };
        let file_name = screen.file_name.clone();
        let pages = screen.pages.items().to_vec();
        let loaded = screen.pages.page().is_some();
        let total = screen.pages.pagination().total_items().unwrap_or(0);
        let error = screen.pages.error().map(|e| e.to_string());
        let pagination = screen.pages.pagination().clone();

        for url in pages.iter().filter_map(|p| p.image_url.as_deref()) {
            self.request_image(url);
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.render_footer(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("← Back").clicked() {
                    self.back_to_files();
                }
                ui.heading(&file_name);
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("🔄 Reload").clicked() {
                        self.refetch_pages();
                    }
                    if loaded {
                        ui.label(
                            RichText::new(format!("{} page(s)", total))
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    }
                });
            });
            ui.add_space(10.0);

            if let Some(err) = error {
                ui.vertical_centered(|ui| {
                    ui.colored_label(ERROR, format!("Failed to load pages: {}", err));
                    if ui.button("Retry").clicked() {
                        self.refetch_pages();
                    }
                });
                return;
            }

            if !loaded {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.spinner();
                    ui.label("Loading pages...");
                });
                return;
            }

            if pages.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label("No pages found");
                    ui.label(
                        RichText::new("The file may still be processing")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                    if ui.button("Retry").clicked() {
                        self.refetch_pages();
                    }
                });
                return;
            }

            let mut clicked = None;
            egui::ScrollArea::vertical()
                .max_height((ui.available_height() - 40.0).max(0.0))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for page in &pages {
                            if self.render_thumbnail(ui, page) {
                                clicked = Some(page.page_number);
                            }
                        }
                    });
                });
            if let Some(page_number) = clicked {
                self.open_viewer(page_number);
            }

            if let Some(page) = render_pagination(ui, &pagination) {
                self.set_pages_page(page);
            }
        });
    }

    fn render_thumbnail(&self, ui: &mut egui::Ui, page: &FilePage) -> bool {
        let slot = page.image_url.as_deref().and_then(|url| self.images.get(url));
        ui.vertical(|ui| {
            ui.set_width(THUMBNAIL_WIDTH);
            let clicked = match slot {
                Some(ImageSlot::Ready(texture)) => {
                    let size = texture.size_vec2();
                    let scale = THUMBNAIL_WIDTH / size.x.max(1.0);
                    ui.add(egui::ImageButton::new((texture.id(), size * scale)))
                        .clicked()
                }
                Some(ImageSlot::Loading) => {
                    ui.spinner();
                    false
                }
                Some(ImageSlot::Failed(_)) | None => {
                    let button = egui::Button::new(RichText::new("No preview").color(MUTED))
                        .min_size(egui::vec2(THUMBNAIL_WIDTH, THUMBNAIL_WIDTH * 1.3));
                    ui.add(button).clicked()
                }
            };
            ui.label(format!("Page {}", page.page_number));
            clicked
        })
        .inner
    }

    fn render_upload_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.upload else {
            return;
        };
        let target = dialog.session.target().clone();
        let stage = dialog.session.stage().clone();
        let file = dialog
            .session
            .file()
            .map(|f| (f.name.clone(), FileSizeUtils::format_size(f.size())));
        let can_close = dialog.session.can_close();
        let can_submit = dialog.session.can_submit();

        let mut retry_target = false;
        let mut picked = None;
        let mut submit = false;
        let mut close = false;

        egui::Window::new("Upload file")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(360.0);

                match &target {
                    TargetState::NotRequested | TargetState::Requesting => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Preparing upload...");
                        });
                    }
                    TargetState::Failed(e) => {
                        ui.colored_label(ERROR, e.to_string());
                        if ui.button("Retry").clicked() {
                            retry_target = true;
                        }
                    }
                    TargetState::Ready(_) => {}
                }

                ui.add_space(8.0);
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.add_enabled_ui(can_close, |ui| {
                            if ui.button("📁 Choose File").clicked() {
                                picked = FileDialog::new()
                                    .add_filter("Documents", &["pdf", "png", "jpg", "jpeg", "tiff", "tif"])
                                    .pick_file();
                            }
                        });
                        match &file {
                            Some((name, size)) => {
                                ui.label(format!("{} ({})", name, size));
                            }
                            None => {
                                ui.label(RichText::new("No file selected").color(MUTED));
                            }
                        }
                    });
                });

                ui.add_space(8.0);
                match &stage {
                    UploadStage::Transferring => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("📤 Uploading...");
                        });
                    }
                    UploadStage::Confirming => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Confirming upload...");
                        });
                    }
                    UploadStage::Failed(e) => {
                        ui.colored_label(ERROR, format!("❌ Failed during {}: {}", e.stage(), e));
                    }
                    UploadStage::Idle | UploadStage::Done(_) => {}
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(can_submit, |ui| {
                        let button = egui::Button::new(RichText::new("Upload").color(Color32::WHITE))
                            .fill(ACCENT);
                        if ui.add(button).clicked() {
                            submit = true;
                        }
                    });
                    ui.add_enabled_ui(can_close, |ui| {
                        if ui.button("Close").clicked() {
                            close = true;
                        }
                    });
                });
            });

        if retry_target {
            self.request_upload_target();
        }
        if let Some(path) = picked {
            self.select_upload_file(&path);
        }
        if submit {
            self.submit_upload();
        }
        if close {
            self.close_upload_dialog();
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("Server: {}", self.api_url)).color(MUTED));
        });
        if let Some(error) = &self.state.error_message {
            ui.vertical_centered(|ui| {
                ui.colored_label(ERROR, error);
            });
        }
        ui.add_space(5.0);
    }
}

/// Previous/next controls, hidden for a single page. Returns the page to
/// switch to.
fn render_pagination(ui: &mut egui::Ui, pagination: &PaginationState) -> Option<u32> {
    if !pagination.controls_visible() {
        return None;
    }

    let mut target = None;
    ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
        ui.horizontal(|ui| {
            ui.add_enabled_ui(pagination.has_previous(), |ui| {
                if ui.button("◀ Previous").clicked() {
                    target = Some(pagination.page() - 1);
                }
            });
            ui.label(format!(
                "Page {} of {}",
                pagination.page(),
                pagination.total_pages()
            ));
            ui.add_enabled_ui(pagination.has_next(), |ui| {
                if ui.button("Next ▶").clicked() {
                    target = Some(pagination.page() + 1);
                }
            });
        });
    });
    target
}
