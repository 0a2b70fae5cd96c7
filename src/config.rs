//! Command-line configuration

use std::path::{Path, PathBuf};

use clap::{Args, Parser, ValueEnum};
use jiff::Timestamp;

use storefront_pricing::fixtures::DEFAULT_FIXTURES_DIR;

/// Receipt output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Rendered receipt table.
    Table,

    /// Pricing result as JSON.
    Json,
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Storefront order pricing
#[derive(Debug, Parser)]
#[command(
    name = "storefront-pricing",
    about = "Price an order scenario against its promotion",
    long_about = None
)]
pub(crate) struct PricingConfig {
    /// Scenario name, or a path to a `.yml` scenario file
    #[arg(default_value = "weighted")]
    pub fixture: String,

    /// Directory scenario names are resolved against
    #[arg(long, env = "PRICING_FIXTURES_DIR", default_value = DEFAULT_FIXTURES_DIR)]
    pub fixtures_dir: PathBuf,

    /// Evaluate promotions at this instant (RFC 3339) instead of now
    #[arg(long)]
    pub at: Option<Timestamp>,

    /// Output format
    #[arg(short, long, env = "PRICING_OUTPUT", value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl PricingConfig {
    /// Load configuration from `.env`, the environment and CLI arguments
    pub(crate) fn load() -> Self {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::parse()
    }

    /// Path of the scenario file to load.
    pub(crate) fn fixture_path(&self) -> PathBuf {
        let fixture = Path::new(&self.fixture);

        if fixture
            .extension()
            .is_some_and(|ext| ext == "yml" || ext == "yaml")
        {
            fixture.to_path_buf()
        } else {
            self.fixtures_dir.join(format!("{}.yml", self.fixture))
        }
    }

    /// Instant promotions are evaluated at.
    pub(crate) fn evaluation_time(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}
