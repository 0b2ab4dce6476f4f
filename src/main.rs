use clap::{ArgAction, Parser};
use overwrite::{tag, Directive, ErrorKind};
use serde::Serialize;
use tracing::{debug, Level};

/// Check `overwrite` field annotations and show how they are read.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Annotations to check, e.g. "true,omitempty". Quote an empty one as "".
    #[arg(required = true)]
    annotations: Vec<String>,
    /// Print the report on a single line
    #[arg(long)]
    compact: bool,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Checked<'a> {
    annotation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    directive: Option<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Parse one annotation into a report entry.
fn check(annotation: &str) -> Checked<'_> {
    let parsed = tag::parse(annotation);
    debug!(%annotation, ?parsed, "checked");
    match parsed {
        Ok(directive) => Checked {
            annotation,
            directive: Some(directive),
            kind: None,
            error: None,
        },
        Err(e) => Checked {
            annotation,
            directive: None,
            kind: Some(e.kind()),
            error: Some(e.to_string()),
        },
    }
}

fn failed(report: &[Checked]) -> bool {
    report.iter().any(|c| c.error.is_some())
}

fn render(report: &[Checked], compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(report)
    } else {
        serde_json::to_string_pretty(report)
    }
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    // Install logging on stderr so stdout stays pure JSON.
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Check every annotation.
    let report: Vec<Checked> = args.annotations.iter().map(|a| check(a)).collect();

    // Output report.
    match render(&report, args.compact) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Cannot render report: {e}");
            std::process::exit(2);
        }
    }

    if failed(&report) {
        std::process::exit(1);
    }
}
