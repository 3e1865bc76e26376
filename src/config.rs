//! Configuration
//!
//! Settings come from CLI arguments with environment fallbacks; a `.env` file
//! is loaded first when present.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Backend connection settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Backend REST base URL
    #[arg(long, env = "API_BASE_URL", default_value = "http://localhost:8000/api")]
    pub api_base_url: String,

    /// Bearer token for the signed-in customer
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "API_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub api_timeout_seconds: u64,
}

/// Build-time feature switches.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct FeatureFlags {
    /// Offer partial (deposit) payments
    #[arg(
        long,
        env = "PARTIAL_PAYMENT_ENABLED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub partial_payment_enabled: bool,

    /// Show the cancellation policy on checkout
    #[arg(
        long,
        env = "CANCELLATION_POLICY_VISIBLE",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub cancellation_policy_visible: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            partial_payment_enabled: true,
            cancellation_policy_visible: false,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Checkout command line
#[derive(Debug, Parser)]
#[command(name = "eassy-checkout", about = "Checkout pricing and cart tools", long_about = None)]
pub struct Cli {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a cart snapshot stored in a JSON or YAML file
    Quote(QuoteArgs),

    /// Fetch the live cart from the backend and price it
    Cart(CartArgs),
}

/// Arguments for `quote`.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Snapshot file (`.json`, `.yml` or `.yaml`)
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Print the amounts as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `cart`.
#[derive(Debug, Args)]
pub struct CartArgs {
    /// Backend settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Feature switches.
    #[command(flatten)]
    pub flags: FeatureFlags,

    /// Print the amounts as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn quote_parses_snapshot_path() -> TestResult {
        let cli = Cli::try_parse_from(["eassy-checkout", "quote", "--snapshot", "cart.yml"])?;

        assert!(
            matches!(&cli.command, Command::Quote(args) if args.snapshot == PathBuf::from("cart.yml")),
            "unexpected command {:?}",
            cli.command
        );

        Ok(())
    }

    #[test]
    fn feature_flags_take_explicit_values() -> TestResult {
        let cli = Cli::try_parse_from([
            "eassy-checkout",
            "cart",
            "--api-base-url",
            "https://api.example.test",
            "--partial-payment-enabled",
            "false",
        ])?;

        let Command::Cart(args) = cli.command else {
            return Err("expected cart command".into());
        };

        assert!(!args.flags.partial_payment_enabled);
        assert_eq!(args.api.api_base_url, "https://api.example.test");

        Ok(())
    }
}
