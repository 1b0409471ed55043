use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chat_markup::{Config, ConfigError, Document};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::Level;

#[derive(Parser)]
#[command(name = "mrkdwn")]
#[command(about = "Convert between mrkdwn text and rich document trees")]
struct Cli {
    /// Config file (defaults to the built-in config)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse mrkdwn into a JSON document tree
    Parse {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
    },
    /// Serialize a JSON document tree to mrkdwn
    Serialize { input: Option<PathBuf> },
    /// Split mrkdwn into JSON render segments
    Segments { input: Option<PathBuf> },
    /// Convert CommonMark to mrkdwn
    Import { input: Option<PathBuf> },
    /// Print the plain-text projection of mrkdwn
    Text { input: Option<PathBuf> },
    /// Search emoji shortcodes
    Emoji {
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Error reading {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = match &cli.config {
        Some(path) => Config::try_load(path)?,
        None => Config::compiled_default().clone(),
    };

    let output = match cli.command {
        Command::Parse { input } => {
            let document = chat_markup::parse(&read_input(input.as_deref())?);
            serde_json::to_string_pretty(&document)?
        }
        Command::Serialize { input } => {
            let document: Document = serde_json::from_str(&read_input(input.as_deref())?)?;
            chat_markup::serialize_with_config(&document, &config)
        }
        Command::Segments { input } => {
            let segments = chat_markup::to_segments(&read_input(input.as_deref())?);
            serde_json::to_string_pretty(&segments)?
        }
        Command::Import { input } => {
            chat_markup::markdown_to_mrkdwn_with_config(&read_input(input.as_deref())?, &config)
        }
        Command::Text { input } => {
            chat_markup::plain_text(&chat_markup::parse(&read_input(input.as_deref())?))
        }
        Command::Emoji { query, limit } => {
            let limit = limit.unwrap_or(config.emoji.search_limit);
            chat_markup::search_emoji_with_config(&query, limit, &config)
                .into_iter()
                .map(|code| {
                    let unicode = chat_markup::resolve_emoji(code).unwrap_or_default();
                    format!("{unicode} :{code}:")
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    };
    Ok(output)
}

/// Read the input file, or stdin when no file was given.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(buf)
        }
    }
}
