use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shiftlog::config::Config;
use shiftlog::error::{Error, ShiftlogErrorTrait};

// Command output uses the same locale files as the library
rust_i18n::i18n!("locales", fallback = "en");

mod commands;

use commands::{App, SenderArgs};

#[derive(Parser)]
#[command(
    name = "shiftlog",
    version,
    about = "Shift report ingestion, note sections and phrase trends",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to SHIFTLOG_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Print Prometheus metrics for this run to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a report and print the record as JSON
    Parse {
        /// Report file (stdin when omitted)
        input: Option<PathBuf>,

        /// Business day used when the report has no Day line (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,
    },

    /// Split a note into sections and print them as JSON
    Notes {
        /// Note file (stdin when omitted)
        input: Option<PathBuf>,
    },

    /// Parse a report and store it for its business day
    IngestReport {
        /// Report file (stdin when omitted)
        input: Option<PathBuf>,

        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Capture a report one figure at a time from stdin
    Guided {
        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Store a note for the current business day
    IngestNote {
        /// Note file (stdin when omitted)
        input: Option<PathBuf>,

        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Sales summary over a period
    Summary {
        /// Period spec: a day count, or months/years such as 1M or 1Y
        #[arg(default_value = "7")]
        period: String,

        /// Last day of the period (defaults to the current business day)
        #[arg(long)]
        until: Option<String>,
    },

    /// Ranked phrases and spikes for every note section
    Trends {
        /// Period spec: a day count, or months/years such as 1M or 1Y
        #[arg(default_value = "7")]
        period: String,

        /// Last day of the period (defaults to the current business day)
        #[arg(long)]
        until: Option<String>,

        /// Annotate phrases through the translation service
        #[arg(long, default_value = "false")]
        translate: bool,
    },

    /// Spiking phrases of one section against the previous period
    Spikes {
        /// Note section (incidents, staff, soldout, complaints)
        section: String,

        /// Period spec: a day count, or months/years such as 1M or 1Y
        #[arg(default_value = "7")]
        period: String,

        /// Last day of the period (defaults to the current business day)
        #[arg(long)]
        until: Option<String>,
    },

    /// Resolve a period spec to its date range
    Period {
        /// Period spec: a day count, or months/years such as 1M or 1Y
        spec: String,

        /// Last day of the period (defaults to the current business day)
        #[arg(long)]
        until: Option<String>,
    },

    /// Register chats that receive owner summaries
    SetOwners {
        /// Chat ids to add
        chats: Vec<i64>,

        #[command(flatten)]
        sender: SenderArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    shiftlog::i18n::init_from_env();
    if let Err(e) = config.validate() {
        anyhow::bail!(Error::from(e).localized_desc());
    }

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&config.logging.level, &log_format, cli.verbose)?;

    if let Err(e) = shiftlog::metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed; continuing without metrics");
    }

    tracing::debug!("shiftlog starting");

    match cli.command {
        Commands::Parse { input, day } => {
            tracing::info!(input = ?input, day = ?day, "Starting parse command");
            commands::parse(&config, input, day)?;
        }

        Commands::Notes { input } => {
            tracing::info!(input = ?input, "Starting notes command");
            commands::notes(&config, input)?;
        }

        Commands::IngestReport { input, sender } => {
            tracing::info!(input = ?input, chat = sender.chat, user = sender.user, "Starting ingest-report command");
            let app = App::open(config)?;
            commands::ingest_report(&app, input, sender)?;
        }

        Commands::Guided { sender } => {
            tracing::info!(chat = sender.chat, user = sender.user, "Starting guided command");
            let app = App::open(config)?;
            commands::guided(&app, sender)?;
        }

        Commands::IngestNote { input, sender } => {
            tracing::info!(input = ?input, chat = sender.chat, user = sender.user, "Starting ingest-note command");
            let app = App::open(config)?;
            commands::ingest_note(&app, input, sender)?;
        }

        Commands::Summary { period, until } => {
            tracing::info!(period = %period, until = ?until, "Starting summary command");
            let app = App::open(config)?;
            commands::summary(&app, &period, until)?;
        }

        Commands::Trends {
            period,
            until,
            translate,
        } => {
            tracing::info!(period = %period, until = ?until, translate, "Starting trends command");
            let app = App::open(config)?;
            commands::trends(&app, &period, until, translate).await?;
        }

        Commands::Spikes {
            section,
            period,
            until,
        } => {
            tracing::info!(section = %section, period = %period, until = ?until, "Starting spikes command");
            let app = App::open(config)?;
            commands::spikes(&app, &section, &period, until)?;
        }

        Commands::Period { spec, until } => {
            tracing::info!(spec = %spec, until = ?until, "Starting period command");
            commands::period(&config, &spec, until)?;
        }

        Commands::SetOwners { chats, sender } => {
            tracing::info!(count = chats.len(), chat = sender.chat, user = sender.user, "Starting set-owners command");
            let app = App::open(config)?;
            commands::set_owners(&app, &chats, &sender)?;
        }
    }

    if cli.metrics {
        let text = shiftlog::metrics::encode_metrics().map_err(|e| anyhow::anyhow!("{e}"))?;
        eprint!("{text}");
    }

    tracing::debug!("shiftlog completed successfully");
    Ok(())
}

fn setup_tracing(level: &str, format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("shiftlog=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("shiftlog={level},warn")))
    };

    // Logs go to stderr so stdout stays clean JSON
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
