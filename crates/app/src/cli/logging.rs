//! Logging subscriber initialisation.

use clap::{Args, ValueEnum};
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

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
pub(crate) struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        global = true,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact
    )]
    pub(crate) log_format: LogFormat,
}

impl LoggingArgs {
    /// Installs the global subscriber. Logs go to stderr so command output stays on stdout.
    pub(crate) fn init(&self) -> Result<(), String> {
        match self.log_format {
            LogFormat::Compact => init_with_layer(
                self.env_filter(),
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            ),
            LogFormat::Json => init_with_layer(
                self.env_filter(),
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            ),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", self.log_level)))
    }
}

fn init_with_layer<L>(filter: EnvFilter, fmt_layer: L) -> Result<(), String>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|error| format!("failed to initialise logging: {error}"))
}
