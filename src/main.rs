use anyhow::anyhow;
use clap::Parser;
use eframe::egui::ViewportBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod hn_client;
mod models;
mod query;
mod state;
mod theme;
mod views;

use crate::app::HackerNewsReaderApp;
use crate::config::Config;
use crate::hn_client::HackerNewsClient;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hn_categories=info")),
        )
        .init();

    let config = Config::parse();
    info!(api_base = %config.api_base, category = ?config.category, "starting");

    let client = HackerNewsClient::new(&config.api_base, config.timeout())?;

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([480.0, 400.0])
            .with_title("Hacker News"),
        ..Default::default()
    };

    eframe::run_native(
        "HN Categories",
        options,
        Box::new(move |cc| Ok(Box::new(HackerNewsReaderApp::new(cc, client, &config)))),
    )
    .map_err(|e| anyhow!("Failed to run the application: {e}"))
}
