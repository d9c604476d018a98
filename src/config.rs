use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Startup configuration. Cloned into the server and never changed after.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the HTTP server serves files from.
    pub root: PathBuf,
    pub port: u16,
    /// `false` binds an IPv6 socket.
    pub ipv4: bool,
    /// Upper bound on concurrent workers, clamped further at startup.
    pub max_clients: usize,
    pub log_file: Option<PathBuf>,
    pub log_to_stdout: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            port: 8080,
            ipv4: true,
            max_clients: 10,
            log_file: None,
            log_to_stdout: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(s).context("invalid YAML configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
    }

    /// Loads the file named by `SIMPLE_HTTP_CONFIG` (if any), then applies
    /// the `SIMPLE_HTTP_*` environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("SIMPLE_HTTP_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(root) = std::env::var("SIMPLE_HTTP_ROOT") {
            cfg.root = PathBuf::from(root);
        }
        if let Ok(port) = std::env::var("SIMPLE_HTTP_PORT") {
            cfg.port = port
                .parse()
                .with_context(|| format!("invalid SIMPLE_HTTP_PORT {port:?}"))?;
        }
        if let Ok(v) = std::env::var("SIMPLE_HTTP_IPV6") {
            cfg.ipv4 = !matches!(v.as_str(), "1" | "true");
        }
        if let Ok(max) = std::env::var("SIMPLE_HTTP_MAX_CLIENTS") {
            cfg.max_clients = max
                .parse()
                .with_context(|| format!("invalid SIMPLE_HTTP_MAX_CLIENTS {max:?}"))?;
        }
        if let Ok(file) = std::env::var("SIMPLE_HTTP_LOG_FILE") {
            cfg.log_file = Some(PathBuf::from(file));
        }
        if let Ok(level) = std::env::var("SIMPLE_HTTP_LOG_LEVEL") {
            cfg.log_level = level;
        }

        Ok(cfg)
    }
}
