use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use printd_lib::cdp::CdpEngine;
use printd_lib::{
    document_uri_for, PaperSize, PipelineOptions, PrintError, PrintdOutput, RenderOutput,
    RenderPipeline, RenderRequest, PRINTD_OUTPUT_VERSION,
};
use tokio_util::sync::CancellationToken;

use crate::cli::{EngineArgs, OutputFormat};
use crate::formatting::{render_error, write_output};
use crate::settings::{apply_engine_args, load_config, log_effective_config, validate};

/// Arguments of `printd render`.
#[derive(Debug)]
pub struct RenderArgs {
    pub input: String,
    pub output: PathBuf,
    pub paper: Option<PaperSize>,
    pub delay: Option<u64>,
    pub user_agent: Option<String>,
    pub format: OutputFormat,
    pub engine: EngineArgs,
}

/// Run the render command.
pub async fn run_render(config_path: Option<PathBuf>, args: RenderArgs) -> ExitCode {
    let format = args.format;
    match render(config_path, args).await {
        Ok(body) => match write_output(&body, format) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => render_error(PrintError::Io(e), format),
        },
        Err(err) => render_error(err, format),
    }
}

async fn render(config_path: Option<PathBuf>, args: RenderArgs) -> Result<PrintdOutput, PrintError> {
    let mut config = load_config(config_path.as_deref())?;
    apply_engine_args(&mut config, &args.engine);
    validate(&config, config_path.as_deref())?;
    log_effective_config(config_path.as_deref(), &config);

    let document_uri = document_uri_for(&args.input)?;
    let paper = args.paper.unwrap_or(config.render.paper);
    let request = RenderRequest::builder(document_uri)
        .paper(paper)
        .settle_delay(
            args.delay
                .map(Duration::from_millis)
                .unwrap_or(config.render.settle_delay),
        )
        .max_settle_delay(config.render.max_settle_delay)
        .user_agent(args.user_agent)
        .build()?;

    let engine = CdpEngine::new(config.engine.endpoint(), config.timeouts.command)?;
    let pipeline = RenderPipeline::new(engine, PipelineOptions::from(&config));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling render");
            on_interrupt.cancel();
        }
    });

    let start = Instant::now();
    let pdf = pipeline.render_with_cancel(&request, &cancel).await?;
    tokio::fs::write(&args.output, &pdf).await?;

    Ok(PrintdOutput::Render(RenderOutput {
        version: PRINTD_OUTPUT_VERSION.to_string(),
        document_uri: request.document_uri().to_string(),
        output_path: args.output,
        paper: request.paper(),
        viewport: request.paper().viewport(),
        bytes: pdf.len(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    }))
}
