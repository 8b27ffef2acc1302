// ABOUTME: CLI for folio: cleans near-empty build assets and statically enhances article HTML.
// ABOUTME: Subcommands `clean` and `enhance`; logs go to stderr through tracing.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_article::{enhance_html, Options};
use folio_assets::{clean_files, DEFAULT_PATTERN};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build helpers for article pages.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Clean generated assets and enhance article HTML", long_about = None)]
struct Args {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete matched asset files whose content is at most one character.
    Clean {
        /// Glob pattern of generated assets.
        #[arg(default_value = DEFAULT_PATTERN)]
        pattern: String,
    },

    /// Add heading anchors, copy buttons and table wrappers to an article.
    Enhance {
        /// HTML file to enhance. Use "-" to read stdin.
        input: String,

        /// Output file path (default: stdout).
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// TOML file overriding enhancer options.
        #[arg(long, env = "FOLIO_CONFIG")]
        config: Option<PathBuf>,

        /// Viewport width used to decide which tables get wrapped.
        #[arg(long, default_value_t = 1024.0)]
        viewport_width: f64,

        /// Treat the input as an HTML snippet rather than a full page.
        #[arg(long)]
        fragment: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input).with_context(|| format!("reading {}", input))
}

fn run_enhance(
    input: &str,
    output: Option<&PathBuf>,
    config: Option<&PathBuf>,
    viewport_width: f64,
    fragment: bool,
) -> Result<()> {
    let opts = match config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    let html = read_input(input)?;
    let (enhanced, _summary) = enhance_html(&html, &opts, viewport_width, fragment);

    match output {
        Some(path) => {
            fs::write(path, &enhanced).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{}", enhanced),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match &args.command {
        Command::Clean { pattern } => {
            // per-file failures are logged by the cleaner and do not change the exit status
            let report = clean_files(pattern).await;
            info!(
                removed = report.removed.len(),
                kept = report.kept.len(),
                failed = report.failed.len(),
                "asset clean finished"
            );
            Ok(())
        }
        Command::Enhance {
            input,
            output,
            config,
            viewport_width,
            fragment,
        } => run_enhance(
            input,
            output.as_ref(),
            config.as_ref(),
            *viewport_width,
            *fragment,
        ),
    }
}
