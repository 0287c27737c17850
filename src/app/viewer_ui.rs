use super::state::{ImageSlot, Screen};
use super::OcrDesk;
use crate::viewer::{KeyOutcome, OcrStatus, ViewerKey, ViewerState};
use eframe::egui::{self, Color32, RichText};

const ERROR: Color32 = Color32::from_rgb(220, 50, 50);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Previous,
    Next,
    ToggleOcr,
    RetryOcr,
    ZoomIn,
    ZoomOut,
    RetryImage,
    CopyOcr,
    Close,
}

/// Viewer keys pressed this frame. Arrows and Escape come as key events,
/// `+`, `=` and `-` as text so keyboard layouts don't matter.
fn pressed_keys(ctx: &egui::Context) -> Vec<ViewerKey> {
    ctx.input(|input| {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key, pressed: true, ..
                } => match key {
                    egui::Key::ArrowLeft => Some(ViewerKey::ArrowLeft),
                    egui::Key::ArrowRight => Some(ViewerKey::ArrowRight),
                    egui::Key::Escape => Some(ViewerKey::Escape),
                    _ => None,
                },
                egui::Event::Text(text) => ViewerKey::from_text(text),
                _ => None,
            })
            .collect()
    })
}

impl OcrDesk {
    pub(super) fn viewer_open(&self) -> bool {
        matches!(&self.screen, Screen::Pages(screen) if screen.viewer.is_some())
    }

    fn viewer_mut(&mut self) -> Option<&mut ViewerState> {
        match &mut self.screen {
            Screen::Pages(screen) => screen.viewer.as_mut(),
            Screen::Files => None,
        }
    }

    pub(super) fn apply_viewer_action(&mut self, ctx: &egui::Context, action: ViewerAction) {
        let Some(viewer) = self.viewer_mut() else {
            return;
        };
        let fetch = match action {
            ViewerAction::Previous => {
                viewer.previous();
                None
            }
            ViewerAction::Next => {
                viewer.next();
                None
            }
            ViewerAction::ToggleOcr => viewer.toggle_ocr(),
            ViewerAction::RetryOcr => viewer.retry_ocr(),
            ViewerAction::ZoomIn => {
                viewer.zoom_in();
                None
            }
            ViewerAction::ZoomOut => {
                viewer.zoom_out();
                None
            }
            ViewerAction::RetryImage => {
                if let Some(url) = viewer.current_page().and_then(|p| p.image_url.clone()) {
                    self.retry_image(&url);
                }
                None
            }
            ViewerAction::CopyOcr => {
                if let Some(text) = viewer.ocr().loaded_text() {
                    ctx.output_mut(|o| o.copied_text = text.to_string());
                }
                None
            }
            ViewerAction::Close => {
                self.close_viewer();
                None
            }
        };
        if let Some(page_id) = fetch {
            self.fetch_ocr(page_id);
        }
    }

    fn handle_viewer_keys(&mut self, ctx: &egui::Context) {
        for key in pressed_keys(ctx) {
            let Some(viewer) = self.viewer_mut() else {
                return;
            };
            if viewer.handle_key(key) == KeyOutcome::Close {
                self.close_viewer();
                return;
            }
        }
    }

    pub(super) fn render_viewer(&mut self, ctx: &egui::Context) {
        self.handle_viewer_keys(ctx);
        let Some(viewer) = self.viewer_mut().cloned() else {
            return;
        };
        let image_url = viewer
            .current_page()
            .and_then(|p| p.image_url.clone());
        if viewer.mode().shows_image() {
            if let Some(url) = &image_url {
                self.request_image(url);
            }
        }

        let mut action = None;

        egui::TopBottomPanel::top("viewer_toolbar").show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.add_enabled_ui(viewer.has_previous(), |ui| {
                    if ui.button("◀").on_hover_text("Previous page").clicked() {
                        action = Some(ViewerAction::Previous);
                    }
                });
                ui.add_enabled_ui(viewer.has_next(), |ui| {
                    if ui.button("▶").on_hover_text("Next page").clicked() {
                        action = Some(ViewerAction::Next);
                    }
                });

                ui.separator();
                if ui.button(viewer.mode().toggle_label()).clicked() {
                    action = Some(ViewerAction::ToggleOcr);
                }

                if viewer.zoom_controls_active() {
                    ui.separator();
                    let zoom = viewer.zoom();
                    ui.add_enabled_ui(zoom.can_zoom_out(), |ui| {
                        if ui.button("➖").clicked() {
                            action = Some(ViewerAction::ZoomOut);
                        }
                    });
                    ui.label(format!("{}%", zoom.percent()));
                    ui.add_enabled_ui(zoom.can_zoom_in(), |ui| {
                        if ui.button("➕").clicked() {
                            action = Some(ViewerAction::ZoomIn);
                        }
                    });
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✖ Close").clicked() {
                        action = Some(ViewerAction::Close);
                    }
                });
            });
            ui.add_space(5.0);
        });

        egui::TopBottomPanel::bottom("viewer_footer").show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label(viewer.position_label());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new("← → navigate   + − zoom   Esc close").color(MUTED),
                    );
                });
            });
            ui.add_space(5.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let mode = viewer.mode();
            if mode.shows_image() && mode.shows_text() {
                ui.columns(2, |columns| {
                    let image = self.render_page_image(&mut columns[0], &viewer, image_url.as_deref());
                    let text = render_ocr_text(&mut columns[1], &viewer);
                    if let Some(clicked) = image.or(text) {
                        action = Some(clicked);
                    }
                });
            } else if mode.shows_image() {
                if let Some(clicked) = self.render_page_image(ui, &viewer, image_url.as_deref()) {
                    action = Some(clicked);
                }
            } else if let Some(clicked) = render_ocr_text(ui, &viewer) {
                action = Some(clicked);
            }
        });

        if let Some(action) = action {
            self.apply_viewer_action(ctx, action);
        }
    }

    fn render_page_image(
        &self,
        ui: &mut egui::Ui,
        viewer: &ViewerState,
        url: Option<&str>,
    ) -> Option<ViewerAction> {
        let Some(url) = url else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No image for this page").color(MUTED));
            });
            return None;
        };

        match self.images.get(url) {
            Some(ImageSlot::Ready(texture)) => {
                let size = texture.size_vec2();
                let fit = (ui.available_width() / size.x.max(1.0)).min(1.0);
                let scaled = size * fit * viewer.zoom().value();
                egui::ScrollArea::both()
                    .id_source("page_image")
                    .show(ui, |ui| {
                        ui.image((texture.id(), scaled));
                    });
            }
            Some(ImageSlot::Failed(e)) => {
                ui.colored_label(ERROR, format!("Failed to load image: {}", e));
                if ui.button("Retry").clicked() {
                    return Some(ViewerAction::RetryImage);
                }
            }
            Some(ImageSlot::Loading) | None => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
        }
        None
    }
}

fn render_ocr_text(ui: &mut egui::Ui, viewer: &ViewerState) -> Option<ViewerAction> {
    let mut action = None;
    match viewer.ocr().status() {
        OcrStatus::NotRequested | OcrStatus::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading OCR text...");
            });
        }
        OcrStatus::Loaded(text) if text.trim().is_empty() => {
            ui.label(RichText::new("No text was recognised on this page").color(MUTED));
        }
        OcrStatus::Loaded(text) => {
            if ui.button("📋 Copy").on_hover_text("Copy text to clipboard").clicked() {
                action = Some(ViewerAction::CopyOcr);
            }
            egui::ScrollArea::vertical()
                .id_source("ocr_text")
                .show(ui, |ui| {
                    ui.add(egui::Label::new(RichText::new(text).monospace()).wrap(true));
                });
        }
        OcrStatus::NotYetProcessed => {
            ui.label("OCR text is not available yet for this page.");
            if ui.button("Retry").clicked() {
                action = Some(ViewerAction::RetryOcr);
            }
        }
        OcrStatus::Failed(e) => {
            ui.colored_label(ERROR, format!("Failed to load OCR text: {}", e));
            if ui.button("Retry").clicked() {
                action = Some(ViewerAction::RetryOcr);
            }
        }
    }
    action
}
