//! appmeta-lint CLI
//!
//! Lints, rewrites and renders application metadata documents.

mod commands;
mod highlight;

use std::path::PathBuf;

use appmeta::{Config, Error, Format, Result, SrclibRegistry};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use crate::commands::{describe, lint_files, rewrite_files, Style, Target};

#[derive(Parser)]
#[command(name = "appmeta-lint")]
#[command(about = "Linter and rewriter for application metadata files", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// YAML configuration file (accepted formats, NDK paths)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Accepted input formats, overriding the configuration
    #[arg(long, value_delimiter = ',')]
    accept: Vec<Format>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate metadata files
    Lint {
        /// Metadata files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Skip description cross-reference checks
        #[arg(long)]
        no_xref: bool,

        /// Source-library directory to check recipe references against
        #[arg(long)]
        srclibs: Option<PathBuf>,
    },

    /// Rewrite metadata files in canonical form
    Rewrite {
        /// Metadata files to rewrite
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format (txt or yaml); defaults to each file's own format
        #[arg(long)]
        to: Option<Format>,

        /// Replace the original files
        #[arg(short, long, conflicts_with = "output_dir")]
        inplace: bool,

        /// Directory to write rewritten files into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Render the description of a metadata file
    Describe {
        /// Metadata file
        file: PathBuf,

        /// Output style
        #[arg(long, value_enum, default_value = "plain")]
        style: Style,
    },
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn load_config(path: Option<&PathBuf>, accept: Vec<Format>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if !accept.is_empty() {
        config.accepted_formats = accept;
    }
    debug!("Accepted formats: {:?}", config.accepted_formats);
    Ok(config)
}

fn exit_fatal(err: &Error) -> ! {
    eprintln!("[{}] {}", "〤".bright_red().bold(), err);
    std::process::exit(1);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let config = load_config(cli.config.as_ref(), cli.accept)?;

    match cli.command {
        Commands::Lint {
            files,
            no_xref,
            srclibs,
        } => {
            let registry = srclibs.as_deref().map(SrclibRegistry::load).transpose()?;
            match lint_files(&files, &config, !no_xref, registry.as_ref()) {
                Ok(summary) => summary.print("validated", files.len()),
                Err(err) => exit_fatal(&err),
            }
        }

        Commands::Rewrite {
            files,
            to,
            inplace,
            output_dir,
        } => {
            let target = match (inplace, output_dir) {
                (true, _) => Target::InPlace,
                (false, Some(dir)) => Target::Dir(dir),
                (false, None) => Target::Stdout,
            };
            match rewrite_files(&files, &config, to, &target) {
                Ok(summary) => {
                    if !matches!(target, Target::Stdout) {
                        summary.print("rewritten", files.len());
                    }
                }
                Err(err) => exit_fatal(&err),
            }
        }

        Commands::Describe { file, style } => match describe(&file, &config, style) {
            Ok(text) => println!("{}", text),
            Err(err) if err.is_fatal() => exit_fatal(&err),
            Err(err) => return Err(err),
        },
    }

    Ok(())
}
