use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::pipeline::{DEFAULT_ENCODER_FILE, DEFAULT_PIPELINE_FILE};

/// Application-level constants
pub const APP_NAME: &str = "Calculadora de obesidade";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 8501;

pub const ENV_ARTIFACTS_DIR: &str = "OBESITY_CALC_ARTIFACTS_DIR";
pub const ENV_PIPELINE_FILE: &str = "OBESITY_CALC_PIPELINE_FILE";
pub const ENV_ENCODER_FILE: &str = "OBESITY_CALC_ENCODER_FILE";
pub const ENV_BIND: &str = "OBESITY_CALC_BIND";
pub const ENV_PORT: &str = "OBESITY_CALC_PORT";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "obesity_calculator=debug,tower_http=info"
    } else {
        "obesity_calculator=info"
    }
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub artifacts_dir: PathBuf,
    pub pipeline_file: String,
    pub encoder_file: String,
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("."),
            pipeline_file: DEFAULT_PIPELINE_FILE.to_string(),
            encoder_file: DEFAULT_ENCODER_FILE.to_string(),
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank or unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = get(ENV_ARTIFACTS_DIR) {
            config.artifacts_dir = PathBuf::from(dir);
        }
        if let Some(file) = get(ENV_PIPELINE_FILE) {
            config.pipeline_file = file;
        }
        if let Some(file) = get(ENV_ENCODER_FILE) {
            config.encoder_file = file;
        }
        if let Some(raw) = get(ENV_BIND) {
            match raw.parse() {
                Ok(addr) => config.bind = addr,
                Err(_) => tracing::warn!(value = %raw, "Invalid {ENV_BIND}, using {}", config.bind),
            }
        }
        if let Some(raw) = get(ENV_PORT) {
            match raw.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %raw, "Invalid {ENV_PORT}, using {}", config.port),
            }
        }
        config
    }

    pub fn pipeline_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.pipeline_file)
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.encoder_file)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
