mod app;
mod autohide;
mod config;
mod macros;
mod video;

use anyhow::{Context, Result};
use clap::Parser;
use common::{FrameLog, FrameLogWriter, subject};
use eframe::egui;
use std::path::PathBuf;

/// Fullscreen video player that logs when every frame is presented
#[derive(Parser, Debug)]
#[command(name = "movielog", version, about)]
struct Cli {
    /// Media file to open on launch
    media: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logger level comes from the config, so report load errors afterwards
    let (config, config_error) = match config::Config::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (config::Config::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.general.log_level.as_str()),
    )
    .init();

    log::info!("Starting movielog v{}", env!("CARGO_PKG_VERSION"));

    match config::Config::default_config_path() {
        Ok(path) if path.exists() => log::info!("Configuration: {}", path.display()),
        Ok(path) => log::info!("No config at {}, using defaults", path.display()),
        Err(e) => log::warn!("{:#}", e),
    }
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {:#}. Using defaults.", e);
    }
    log::info!("  Log level: {}", config.general.log_level);
    log::info!(
        "  Frame log: {}<subject><date>{} (queue {})",
        config.logging.base_expanded(),
        config.logging.extension,
        config.logging.queue_capacity
    );
    log::info!(
        "  Controls hide after {}s (cooldown {}s), tick {}ms",
        config.ui.hide_delay_secs,
        config.ui.min_hide_secs,
        config.ui.tick_interval_ms
    );

    video::initialize().context("Failed to initialize media backend")?;

    let subject_id = subject::load_subject_id(config.logging.subject_file_path());

    let frame_log = FrameLog::open(
        config.logging.base_expanded(),
        &config.logging.extension,
        &subject_id,
    )
    .context("Failed to open frame log")?;

    let writer = FrameLogWriter::spawn(frame_log, config.logging.queue_capacity);
    let log_handle = writer.handle();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Media Player")
            .with_inner_size([1280.0, 720.0])
            .with_fullscreen(config.ui.fullscreen),
        ..Default::default()
    };

    let ui_settings = config.ui.clone();
    let result = eframe::run_native(
        "Media Player",
        options,
        Box::new(move |cc| {
            let mut player =
                app::PlayerApp::new(&ui_settings, log_handle, Box::new(app::NativeFileDialog));
            if let Some(media) = cli.media {
                player.open_path(&cc.egui_ctx, media);
            }
            Ok(Box::new(player))
        }),
    );

    let written = writer.shutdown().context("Failed to flush frame log")?;
    log::info!("Frame log closed ({} lines written)", written);

    result.map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
