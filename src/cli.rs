use clap::{Parser, Subcommand, ValueEnum};
use printd_lib::PaperSize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "printd")]
#[command(
    version,
    about = "printd - Render HTML documents to PDF through headless Chrome",
    long_about = "printd\n\nDrives a remote headless Chrome over the DevTools protocol to turn HTML into PDF.\n\nModes:\n- serve: HTTP service accepting multipart uploads and answering with the PDF.\n- render: one-shot render of a local file or URL to a PDF file.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) for engine, server, render and timeout defaults; flags and environment override it"
    )]
    pub config: Option<PathBuf>,
}

/// Engine location flags shared by both subcommands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EngineArgs {
    #[arg(long, value_name = "HOST", help = "DevTools host of the Chrome instance")]
    pub engine_host: Option<String>,

    #[arg(long, value_name = "PORT", help = "DevTools port of the Chrome instance")]
    pub engine_port: Option<u16>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Seconds to wait for the document's load event"
    )]
    pub nav_timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP print service
    Serve {
        #[arg(long, value_name = "ADDR", help = "Address to listen on (e.g. 0.0.0.0:8888)")]
        listen: Option<String>,

        #[arg(
            long,
            value_name = "PATH",
            help = "Directory holding uploaded documents; must be readable by Chrome at the same path"
        )]
        spool_dir: Option<PathBuf>,

        #[arg(
            long,
            value_name = "N",
            help = "Maximum renders in flight against the engine"
        )]
        max_concurrent: Option<usize>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Render one document to a PDF file
    Render {
        #[arg(long, help = "Document to render (local path or URL)")]
        input: String,

        #[arg(long, value_name = "PDF", help = "Where to write the PDF")]
        output: PathBuf,

        #[arg(long, help = "Paper size in inches (WIDTHxHEIGHT, e.g. 8.5x11)")]
        paper: Option<PaperSize>,

        #[arg(long, value_name = "MS", help = "Milliseconds to wait after the load event")]
        delay: Option<u64>,

        #[arg(long, help = "User-Agent override for the page")]
        user_agent: Option<String>,

        #[arg(
            long,
            value_enum,
            default_value = "json",
            help = "Status output format: json or pretty"
        )]
        format: OutputFormat,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
