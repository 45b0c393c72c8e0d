use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
  #[default]
  Text,
  Json,
}

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
  /// Filter used when `RUST_LOG` is not set
  pub default_filter: String,
  pub format: LogFormat,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      default_filter: "warn,usecase=info,usecase_engine=info,usecase_lists=info".to_string(),
      format: LogFormat::Text,
    }
  }
}

/// Install the global subscriber. Logs go to stderr so stdout stays JSON.
pub fn init_logging(config: &LoggingConfig) {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr);

  // A subscriber may already be installed when embedded; keep the existing one.
  let _ = match config.format {
    LogFormat::Text => builder.try_init(),
    LogFormat::Json => builder.json().try_init(),
  };
}
