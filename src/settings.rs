use std::path::{Path, PathBuf};
use std::time::Duration;

use printd_lib::{Config, PrintError};

use crate::cli::EngineArgs;

/// Flags for `serve` that override config values when present.
#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub listen: Option<String>,
    pub spool_dir: Option<PathBuf>,
    pub max_concurrent: Option<usize>,
    pub engine: EngineArgs,
}

/// Load config from a TOML file, central config, or defaults, then overlay
/// the process environment.
/// Priority: explicit path > ~/.config/printd/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, PrintError> {
    let mut cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        PrintError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.apply_env(|var| std::env::var(var).ok())
        .map_err(|e| PrintError::Config(e.to_string()))?;
    Ok(cfg)
}

/// Apply engine flags; CLI wins over environment and file.
pub fn apply_engine_args(config: &mut Config, args: &EngineArgs) {
    if let Some(host) = &args.engine_host {
        config.engine.host = host.clone();
    }
    if let Some(port) = args.engine_port {
        config.engine.port = port;
    }
    if let Some(secs) = args.nav_timeout {
        config.timeouts.navigation = Duration::from_secs(secs);
    }
}

pub fn apply_serve_overrides(config: &mut Config, overrides: &ServeOverrides) {
    apply_engine_args(config, &overrides.engine);
    if let Some(listen) = &overrides.listen {
        config.server.listen = listen.clone();
    }
    if let Some(dir) = &overrides.spool_dir {
        config.server.spool_dir = dir.clone();
    }
    if let Some(n) = overrides.max_concurrent {
        config.max_concurrent_renders = n;
    }
}

/// Validate the merged config.
pub fn validate(config: &Config, path: Option<&Path>) -> Result<(), PrintError> {
    config.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        PrintError::Config(prefix)
    })
}

/// Log effective config (verbose mode).
pub fn log_effective_config(config_path: Option<&Path>, config: &Config) {
    let source = config_path
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "defaults/built-in".to_string());
    tracing::debug!(
        source = %source,
        engine = %config.engine.endpoint(),
        listen = %config.server.listen,
        spool_dir = %config.server.spool_dir.display(),
        paper = %config.render.paper,
        settle_delay_ms = config.render.settle_delay.as_millis() as u64,
        nav_timeout_s = config.timeouts.navigation.as_secs(),
        command_timeout_s = config.timeouts.command.as_secs(),
        max_concurrent = config.max_concurrent_renders,
        "effective config"
    );
}
