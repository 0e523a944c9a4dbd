#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod collab;
mod config;
mod context;
mod helpers;
mod modules;
mod theme;

use tracing_subscriber::prelude::*;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> eframe::Result {
    // Load .env before anything reads the environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caselens_ui=info,caselens_media=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    ffmpeg_the_third::init().expect("FFmpeg init failed");

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("🔍 CaseLens")
            .with_inner_size([1465.0, 965.0])
            .with_min_inner_size([900.0, 600.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "CaseLens",
        native_options,
        Box::new(|cc| Ok(Box::new(app::CaseLensApp::new(cc)))),
    )
}
