mod api;
mod app;
mod cache;
mod config;
mod pagination;
mod upload;
mod utils;
mod viewer;

use api::HttpApi;
use app::OcrDesk;
use config::Config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_desk=debug,reqwest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });
    tracing::info!("Using backend at {}", config.api_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            tracing::error!("Failed to start async runtime: {}", e);
            e
        })?;
    let api = Arc::new(HttpApi::new(config.api_url.clone()));

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "OCR Desk",
        options,
        Box::new(move |cc| Box::new(OcrDesk::new(cc, api, config.api_url, runtime))),
    )?;
    Ok(())
}
