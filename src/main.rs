mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_render, run_serve, RenderArgs};
use settings::ServeOverrides;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Serve {
            listen,
            spool_dir,
            max_concurrent,
            engine,
        } => {
            run_serve(
                args.config,
                ServeOverrides {
                    listen,
                    spool_dir,
                    max_concurrent,
                    engine,
                },
            )
            .await
        }
        Commands::Render {
            input,
            output,
            paper,
            delay,
            user_agent,
            format,
            engine,
        } => {
            run_render(
                args.config,
                RenderArgs {
                    input,
                    output,
                    paper,
                    delay,
                    user_agent,
                    format,
                    engine,
                },
            )
            .await
        }
    }
}

/// Logs go to stderr so stdout stays a clean JSON channel. `RUST_LOG` wins
/// over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "printd=debug,printd_lib=debug" } else { "printd=info,printd_lib=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
