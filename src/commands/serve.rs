use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use printd_lib::cdp::CdpEngine;
use printd_lib::server::{self, AppState, Spool};
use printd_lib::{PipelineOptions, PrintError, RenderPipeline};
use tokio::net::TcpListener;

use crate::cli::OutputFormat;
use crate::formatting::render_error;
use crate::settings::{apply_serve_overrides, load_config, log_effective_config, validate, ServeOverrides};

/// Run the HTTP print service until Ctrl-C.
pub async fn run_serve(config_path: Option<PathBuf>, overrides: ServeOverrides) -> ExitCode {
    match serve(config_path, overrides).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "printd serve failed");
            render_error(err, OutputFormat::Json)
        }
    }
}

async fn serve(config_path: Option<PathBuf>, overrides: ServeOverrides) -> Result<(), PrintError> {
    let mut config = load_config(config_path.as_deref())?;
    apply_serve_overrides(&mut config, &overrides);
    validate(&config, config_path.as_deref())?;
    log_effective_config(config_path.as_deref(), &config);

    let engine = CdpEngine::new(config.engine.endpoint(), config.timeouts.command)?;
    let pipeline = RenderPipeline::new(engine, PipelineOptions::from(&config));
    let spool = Spool::open(&config.server.spool_dir).await.map_err(|e| {
        PrintError::Server(format!(
            "cannot use spool directory {}: {e}",
            config.server.spool_dir.display()
        ))
    })?;
    let listener = TcpListener::bind(&config.server.listen)
        .await
        .map_err(|e| PrintError::Server(format!("cannot listen on {}: {e}", config.server.listen)))?;

    let state = Arc::new(AppState::new(pipeline, spool, config.render.clone()));
    server::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("printd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
