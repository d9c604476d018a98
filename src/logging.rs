//! Subscriber setup for the binary. Library code only emits events.

use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// Installs the global subscriber: stdout and/or an append-mode log file.
pub fn init(cfg: &Config) -> anyhow::Result<()> {
    let level = Level::from_str(&cfg.log_level)
        .with_context(|| format!("invalid log level {:?}", cfg.log_level))?;

    let stdout_layer = cfg
        .log_to_stdout
        .then(|| fmt::layer().with_target(false).with_level(true));

    let file_layer = match &cfg.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    Ok(())
}
