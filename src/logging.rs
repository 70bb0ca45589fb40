// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Where log lines go.
///
/// The terminal UI owns stdout, so it logs to a file in the data directory.
/// Every other mode logs to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    File,
    Stdout,
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vanguard-rs", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

fn log_level() -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.clone()))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")))
}

/// Initializes logging using the tracing subscriber.
pub fn initialize_logging(sink: LogSink) -> Result<()> {
    match sink {
        LogSink::File => {
            let directory = get_data_dir();
            std::fs::create_dir_all(&directory)?;
            let log_path = directory.join(LOG_FILE.clone());
            let log_file = std::fs::File::create(log_path)?;

            let file_subscriber = tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_target(false)
                .with_ansi(false)
                .with_filter(EnvFilter::new(log_level()));

            tracing_subscriber::registry()
                .with(file_subscriber)
                .with(ErrorLayer::default())
                .try_init()?;
        }
        LogSink::Stdout => {
            let stdout_subscriber = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(EnvFilter::new(log_level()));

            tracing_subscriber::registry()
                .with(stdout_subscriber)
                .with(ErrorLayer::default())
                .try_init()?;
        }
    }

    Ok(())
}
