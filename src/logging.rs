// src/logging.rs
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

pub const SERVER_FILTER: &str = "job_chat=info,jobchat=info,rocket::server=off";
pub const CLIENT_FILTER: &str = "warn";

/// Where a process sends its logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// stdout plus the optional JSON file
    Server,
    /// JSON file only, stdout belongs to the conversation
    Client,
}

impl LogTarget {
    pub fn default_filter(self) -> &'static str {
        match self {
            LogTarget::Server => SERVER_FILTER,
            LogTarget::Client => CLIENT_FILTER,
        }
    }

    pub fn writes_stdout(self) -> bool {
        matches!(self, LogTarget::Server)
    }
}

/// `RUST_LOG` overrides the target's default filter.
pub fn init(log_path: Option<&Path>, target: LogTarget) -> Result<()> {
    subscriber(log_path, target)?
        .try_init()
        .context("Failed to initialize logging")
}

fn subscriber(
    log_path: Option<&Path>,
    target: LogTarget,
) -> Result<impl Subscriber + Send + Sync + 'static> {
    let file_layer = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stdout_layer = target
        .writes_stdout()
        .then(|| tracing_subscriber::fmt::layer());

    Ok(Registry::default()
        .with(stdout_layer)
        .with(file_layer)
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(target.default_filter())),
        ))
}
