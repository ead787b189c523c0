use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cdp::EngineEndpoint;
use crate::viewport::PaperSize;

/// Environment variables consulted after the config file. The engine names
/// follow the docker link convention for a `chrome-headless` container.
pub const ENV_ENGINE_HOST: &str = "CHROME_HEADLESS_PORT_9222_TCP_ADDR";
pub const ENV_ENGINE_PORT: &str = "CHROME_HEADLESS_PORT_9222_TCP_PORT";
pub const ENV_LISTEN_PORT: &str = "NODE_PORT";
pub const ENV_SPOOL_DIR: &str = "PRINTD_SPOOL_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub server: ServerConfig,
    pub render: RenderDefaults,
    pub timeouts: Timeouts,
    /// Upper bound on renders in flight against the engine.
    pub max_concurrent_renders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let endpoint = EngineEndpoint::default();
        Self {
            host: endpoint.host,
            port: endpoint.port,
        }
    }
}

impl EngineConfig {
    pub fn endpoint(&self) -> EngineEndpoint {
        EngineEndpoint::new(self.host.clone(), self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Where uploaded documents live for the duration of a request.
    pub spool_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8888".to_string(),
            spool_dir: std::env::temp_dir().join("printd-spool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    pub paper: PaperSize,
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    /// Largest `delay` a request may ask for.
    #[serde(with = "humantime_serde")]
    pub max_settle_delay: Duration,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            settle_delay: crate::request::DEFAULT_SETTLE_DELAY,
            max_settle_delay: crate::request::DEFAULT_MAX_SETTLE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Bound on waiting for the load event after navigating.
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    /// Bound on a single protocol round-trip.
    #[serde(with = "humantime_serde")]
    pub command: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            command: Duration::from_secs(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            server: ServerConfig::default(),
            render: RenderDefaults::default(),
            timeouts: Timeouts::default(),
            max_concurrent_renders: 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("environment variable {var}={value:?} is invalid: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0}")]
    Invalid(String),
}

impl Config {
    /// `~/.config/printd/config.toml`, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".config").join("printd").join("config.toml"))
    }

    /// Load config. Priority: explicit path > central config > defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::central_config_path() {
                Some(central) if central.is_file() => Self::from_file(&central),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_ENGINE_HOST).filter(|v| !v.trim().is_empty()) {
            self.engine.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_ENGINE_PORT) {
            self.engine.port = parse_port(ENV_ENGINE_PORT, &port)?;
        }
        if let Some(port) = lookup(ENV_LISTEN_PORT) {
            let port = parse_port(ENV_LISTEN_PORT, &port)?;
            self.server.listen = with_port(&self.server.listen, port);
        }
        if let Some(dir) = lookup(ENV_SPOOL_DIR).filter(|v| !v.trim().is_empty()) {
            self.server.spool_dir = PathBuf::from(dir.trim());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.host.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.host must not be empty".into()));
        }
        if self.engine.port == 0 {
            return Err(ConfigError::Invalid("engine.port must be non-zero".into()));
        }
        self.server
            .listen
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid(format!("server.listen {:?}: {e}", self.server.listen)))?;
        if self.max_concurrent_renders == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_renders must be at least 1".into(),
            ));
        }
        if self.timeouts.navigation.is_zero() || self.timeouts.command.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be non-zero".into()));
        }
        let paper = self.render.paper;
        let usable = |inches: f64| inches.is_finite() && inches > 0.0;
        if !(usable(paper.width_inches) && usable(paper.height_inches)) {
            return Err(ConfigError::Invalid(
                "render.paper dimensions must be positive and finite".into(),
            ));
        }
        if self.render.settle_delay > self.render.max_settle_delay {
            return Err(ConfigError::Invalid(
                "render.settle_delay must not exceed render.max_settle_delay".into(),
            ));
        }
        Ok(())
    }
}

fn parse_port(var: &'static str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::Env {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn with_port(listen: &str, port: u16) -> String {
    match listen.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{port}"),
    }
}
