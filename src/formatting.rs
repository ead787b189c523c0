use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use printd_lib::{ErrorOutput, PrintError, PrintdOutput, PRINTD_OUTPUT_VERSION};

use crate::cli::OutputFormat;

/// Write a status payload to stdout in the requested format.
pub fn write_output(body: &PrintdOutput, format: OutputFormat) -> io::Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string(body)?,
        OutputFormat::Pretty if io::stdout().is_terminal() => format_pretty(body, true),
        // Non-tty: keep JSON shape for pipelines.
        OutputFormat::Pretty => serde_json::to_string_pretty(body)?,
    };
    println!("{content}");
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: PrintError, format: OutputFormat) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = PrintdOutput::Error(ErrorOutput {
        version: PRINTD_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    if let Err(write_err) = write_output(&payload, format) {
        eprintln!("Failed to write error output: {}", write_err);
    }
    ExitCode::from(2)
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &PrintdOutput, colorize: bool) -> String {
    let mut buf = String::new();
    match body {
        PrintdOutput::Render(out) => {
            writeln!(buf, "{} Rendered {}", color("[OK]", "32", colorize), out.document_uri).ok();
            writeln!(
                buf,
                "Paper: {} in (viewport {}x{} px)",
                out.paper, out.viewport.width, out.viewport.height
            )
            .ok();
            writeln!(buf, "Output: {} ({} bytes)", out.output_path.display(), out.bytes).ok();
            write!(buf, "Elapsed: {} ms", out.elapsed_ms).ok();
        }
        PrintdOutput::Error(out) => {
            let kind = out
                .error
                .kind
                .map(|k| format!(" ({k:?})"))
                .unwrap_or_default();
            writeln!(
                buf,
                "{} {}{}",
                color("[ERROR]", "31", colorize),
                out.error.message,
                kind
            )
            .ok();
            if let Some(hint) = &out.error.remediation {
                write!(buf, "Hint: {hint}").ok();
            }
        }
    }
    buf.trim_end().to_string()
}

fn color(text: &str, code: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printd_lib::{ErrorCategory, ErrorPayload, PaperSize, RenderErrorKind, RenderOutput};
    use std::path::PathBuf;

    #[test]
    fn pretty_render_lists_output_and_size() {
        let paper = PaperSize::default();
        let body = PrintdOutput::Render(RenderOutput {
            version: PRINTD_OUTPUT_VERSION.to_string(),
            document_uri: "file:///tmp/a.html".into(),
            output_path: PathBuf::from("a.pdf"),
            paper,
            viewport: paper.viewport(),
            bytes: 1200,
            elapsed_ms: 40,
        });
        let text = format_pretty(&body, false);
        assert!(text.starts_with("[OK] Rendered file:///tmp/a.html"));
        assert!(text.contains("816x1056"));
        assert!(text.contains("a.pdf (1200 bytes)"));
    }

    #[test]
    fn pretty_error_includes_kind_and_hint() {
        let body = PrintdOutput::Error(ErrorOutput {
            version: PRINTD_OUTPUT_VERSION.to_string(),
            message: None,
            error: ErrorPayload::new(ErrorCategory::Engine, "refused".into(), "start chrome")
                .with_kind(RenderErrorKind::EngineUnreachable),
        });
        let text = format_pretty(&body, false);
        assert!(text.contains("[ERROR] refused (EngineUnreachable)"));
        assert!(text.ends_with("Hint: start chrome"));
    }
}
