use anyhow::Context;
use crossbeam_channel::bounded;
use std::sync::Arc;
use std::thread;
use sysinfo::System;

use battle_watch::config::Config;
use battle_watch::error::{AppResult, OcrError};
use battle_watch::messaging::{write_json_lines, Announcer, Broadcaster, EventBus, LogAnnouncer};
use battle_watch::ocr::{is_end_marker, RecognizerFactory, RegionRecognizer, TesseractRecognizer};
use battle_watch::time_announcer::TimeAnnouncer;
use battle_watch::{FfmpegSampler, FrameSampler, Monitor, Region};

const LOG_TARGET_STARTUP: &str = "battle_watch::startup";

/// Initialize tracing with file rotation
///
/// Logs are written to:
/// - macOS: ~/Library/Application Support/BattleWatch/logs/
/// - Windows: %APPDATA%/BattleWatch/logs/
/// - Linux: ~/.config/BattleWatch/logs/
///
/// Log output:
/// - Debug builds: Console (stderr) + File
/// - Release builds: File only
///
/// Stdout is reserved for the JSON event stream.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("BattleWatch").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "battle-watch.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting Battle Watch v{} on ({})",
        version,
        std::env::consts::ARCH
    );
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Operating System: {} (kernel {})",
        os_name,
        kernel
    );
}

fn recognizer_factory(config: &Config) -> RecognizerFactory {
    let tessdata = config.tessdata_path.clone();
    let marker = config.end_marker.clone();

    Arc::new(move || -> Result<Box<dyn RegionRecognizer>, OcrError> {
        let recognizer = TesseractRecognizer::new(tessdata.as_deref(), &marker)?;
        Ok(Box::new(recognizer) as Box<dyn RegionRecognizer>)
    })
}

fn main() -> AppResult<()> {
    initialize_tracing();
    log_runtime_environment();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(
        "Sampling every {}ms, clear delay {}ms, streak reset after {}s",
        config.sample_interval_ms,
        config.clear_delay_ms,
        config.streak_reset_threshold_secs
    );

    let sampler = Arc::new(
        FfmpegSampler::new(config.ffmpeg_path.clone(), config.video_device.clone())
            .with_timeout(config.capture_timeout()),
    );
    let factory = recognizer_factory(&config);

    if std::env::args().nth(1).as_deref() == Some("--check") {
        return run_check(&config, sampler.as_ref(), &factory);
    }

    run(config, sampler, factory)
}

/// Monitor the feed until Ctrl+C
fn run(config: Config, sampler: Arc<FfmpegSampler>, factory: RecognizerFactory) -> AppResult<()> {
    let bus = EventBus::new();
    let (events, subscription) = bus.subscribe();

    // One JSON event per line for the overlay process
    let printer_bus = bus.clone();
    thread::Builder::new()
        .name("event-printer".to_string())
        .spawn(move || {
            if let Err(e) = write_json_lines(&events, std::io::stdout().lock()) {
                tracing::warn!("Event output closed, no longer forwarding events: {}", e);
            }
            printer_bus.unsubscribe(subscription);
        })
        .context("Failed to start event printer")?;

    let announcer: Arc<dyn Announcer> = Arc::new(LogAnnouncer);
    let broadcaster: Arc<dyn Broadcaster> = Arc::new(bus);

    let mut monitor = Monitor::from_config(
        &config,
        sampler,
        factory,
        Arc::clone(&announcer),
        Arc::clone(&broadcaster),
    );
    monitor
        .start()
        .context("Failed to start battle recognition")?;

    let mut time_announcer = if config.hourly_announcements {
        let announcer = TimeAnnouncer::start(
            monitor.engine(),
            announcer,
            broadcaster,
            config.sponsors.clone(),
        )
        .context("Failed to start time announcer")?;
        Some(announcer)
    } else {
        None
    };

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .context("Error setting Ctrl-C handler")?;

    let _ = stop_rx.recv();
    tracing::info!("Received shutdown signal (Ctrl+C).");

    if let Some(time_announcer) = time_announcer.as_mut() {
        time_announcer.stop();
    }
    monitor
        .stop()
        .context("Failed to stop battle recognition")?;

    tracing::info!("\n{}", monitor.summary());
    Ok(())
}

/// Capture one frame and print what every region reads
fn run_check(config: &Config, sampler: &dyn FrameSampler, factory: &RecognizerFactory) -> AppResult<()> {
    println!("=== Capture Check ===");
    let frame = sampler.capture_frame().context("Failed to capture frame")?;
    println!("✓ Captured frame ({} bytes)", frame.bytes.len());

    println!("=== OCR Check ===");
    let mut recognizer = factory().context("Failed to initialize OCR")?;
    for region in Region::ALL {
        match recognizer.recognize(&frame, region) {
            Ok(text) => {
                let marker = if is_end_marker(&text, &config.end_marker) {
                    "✓ end marker"
                } else {
                    "-"
                };
                println!("  {}: '{}' {}", region, text, marker);
            }
            Err(e) => println!("  {}: ✗ {}", region, e),
        }
    }
    recognizer.terminate().context("Failed to terminate OCR")?;

    Ok(())
}
