//! Command-line interface for truthlens.
//!
//! Provides commands for analyzing text or images, previewing the request
//! that would be sent, and showing the resolved configuration.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::gemini::GenerateContentBody;
use crate::config;
use crate::core::{Analyzer, RequestBuilder};
use crate::domain::{image_media_type_for_extension, ImagePayload, Phase, Session};

pub mod report;

/// Message shown for uploads that are neither text nor a supported image
const UNSUPPORTED_UPLOAD: &str = "Unsupported file type. Please upload an image or text file.";

/// truthlens - Credibility analysis backed by a search-grounded model
#[derive(Parser, Debug)]
#[command(name = "truthlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Text and image inputs shared by `analyze` and `prompt`
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Text to analyze (may contain a URL)
    pub text: Option<String>,

    /// Read the text from a .txt file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Image to analyze (JPEG, PNG or WEBP); the text becomes its context
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Read the text from stdin
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze text or an image for credibility
    ///
    /// The text and image are sent to the configured model service.
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the request that would be sent, without sending it
    Prompt {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Analyze { input, json } => analyze(input, json).await,
            Commands::Prompt { input } => show_prompt(input),
            Commands::Config => show_config(),
        }
    }
}

/// Media type for a supported image file, by extension
pub fn image_media_type(path: &Path) -> Option<&'static str> {
    image_media_type_for_extension(path.extension()?.to_str()?)
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Fill a session from the command-line inputs.
///
/// Unsupported uploads put the session into the error phase instead of
/// failing outright.
fn load_session(input: InputArgs) -> Result<Session> {
    let mut session = Session::new();

    if let Some(path) = input.file {
        if !is_text_file(&path) {
            session.reject(UNSUPPORTED_UPLOAD);
            return Ok(session);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?;
        session.set_text(text);
    } else if let Some(text) = input.text {
        session.set_text(text);
    } else if input.stdin || !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        session.set_text(buffer);
    }

    if let Some(path) = input.image {
        let Some(media_type) = image_media_type(&path) else {
            session.reject(UNSUPPORTED_UPLOAD);
            return Ok(session);
        };
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        session.select_image(ImagePayload::new(media_type, bytes));
    }

    Ok(session)
}

fn fail(session: &Session) -> ! {
    eprintln!(
        "Analysis failed: {}",
        session
            .error_message()
            .unwrap_or("An error occurred while analyzing content.")
    );
    std::process::exit(1);
}

/// Analyze the input and print the report
async fn analyze(input: InputArgs, json: bool) -> Result<()> {
    let mut session = load_session(input)?;
    if session.phase() == Phase::Error {
        fail(&session);
    }

    let (ticket, request) = session.submit()?;

    let cfg = config::config()?;
    let analyzer = Analyzer::from_config(cfg);
    let outcome = analyzer.analyze_request(&request).await;
    session.complete(ticket, outcome);

    match session.phase() {
        Phase::Success => {
            if let Some(report) = session.result() {
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(report).context("Failed to encode report")?
                    );
                } else {
                    print!("{}", report::render(report));
                }
            }
            if let Some(elapsed) = session.elapsed() {
                eprintln!(
                    "\n[Analyzed in {:.1}s]",
                    elapsed.num_milliseconds() as f64 / 1000.0
                );
            }
            Ok(())
        }
        _ => fail(&session),
    }
}

/// Print the strategy and request body without sending anything
fn show_prompt(input: InputArgs) -> Result<()> {
    let mut session = load_session(input)?;
    if session.phase() == Phase::Error {
        fail(&session);
    }

    let (_, request) = session.submit()?;
    let cfg = config::config()?;
    let outbound = RequestBuilder::new(cfg.model.clone()).build(&request);
    let body = GenerateContentBody::from_request(&outbound).elide_inline_data();

    println!("Strategy: {}", outbound.strategy);
    println!("Model:    {}", outbound.model);
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&body).context("Failed to encode request body")?
    );

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("TruthLens Configuration");
    println!("=======================");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Model:");
    println!("  Name:             {}", cfg.model.model);
    println!("  API base:         {}", cfg.model.api_base);
    println!("  Temperature:      {}", cfg.model.temperature);
    println!("  Search grounding: always on");
    println!(
        "  Request timeout:  {}",
        cfg.model
            .request_timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "(transport default)".to_string())
    );
    println!();
    match (&cfg.api_key, cfg.api_key_source) {
        (Some(key), Some(source)) => println!("API key: {} (from {})", key.masked(), source),
        _ => println!(
            "API key: (missing - set {})",
            config::API_KEY_ENV_VARS.join(" or ")
        ),
    }

    Ok(())
}
