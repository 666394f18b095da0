//! Imprint CLI - detect AI-generated images from the terminal.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use imprint_core::VerificationSignals;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "Exit codes:
  0   Analysis completed (see verdict)
  1   General error
  64  Invalid configuration
  65  Not an image, or malformed service response
  66  Input file could not be read
  69  Analysis service unavailable or reported failure";

#[derive(Parser)]
#[command(name = "imprint")]
#[command(author, version, about = "AI-generated image detection", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Canned service answers for offline runs.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MockProfile {
    /// No signals set
    Clean,
    /// Watermark only
    Watermark,
    /// Watermark and valid metadata
    WatermarkMetadata,
    /// Watermark, valid metadata and ledger record
    Full,
}

impl MockProfile {
    pub fn signals(self) -> VerificationSignals {
        match self {
            Self::Clean => VerificationSignals::new(false, false, false),
            Self::Watermark => VerificationSignals::new(true, false, false),
            Self::WatermarkMetadata => VerificationSignals::new(true, true, false),
            Self::Full => VerificationSignals::new(true, true, true),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Submit an image to the analysis service and print the verdict
    Verify {
        /// Path to the image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Analysis endpoint (overrides IMPRINT_ANALYSIS_URL)
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,

        /// Request timeout in seconds (overrides IMPRINT_TIMEOUT_SECS)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Answer with canned signals instead of calling the service (for testing)
        #[arg(long, value_name = "PROFILE")]
        mock: Option<MockProfile>,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,

        /// Print nothing; report through the exit code only
        #[arg(short, long)]
        quiet: bool,
    },

    /// Score a set of signals without contacting the service
    Score {
        /// A steganographic watermark was found
        #[arg(long)]
        watermark: bool,

        /// Embedded metadata is valid
        #[arg(long)]
        metadata: bool,

        /// A matching ledger record exists
        #[arg(long)]
        ledger: bool,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the data-URI preview of an image
    Preview {
        /// Path to the image
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Verify {
            file,
            endpoint,
            timeout,
            mock,
            json,
            quiet,
        } => {
            let options = commands::verify::VerifyOptions {
                endpoint,
                timeout,
                mock,
                json,
                quiet,
            };
            commands::verify::execute(file, options).await
        }
        Commands::Score {
            watermark,
            metadata,
            ledger,
            json,
        } => commands::score::execute(VerificationSignals::new(watermark, metadata, ledger), json),
        Commands::Preview { file } => commands::preview::execute(file).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let exit = ExitCode::from_anyhow(&err);
        eprintln!("{} {}", "Error:".red().bold(), exit.message);
        std::process::exit(exit.code);
    }
}
