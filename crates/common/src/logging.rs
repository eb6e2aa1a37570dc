//! Provides utilities to initialize logging for applications using the SDK.
use std::env;

use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "FINSCHIA_SDK_SVC_LABEL";

/// Environment variable that enables file names in log lines when set to `1`.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Environment variable that enables line numbers in log lines when set to `1`.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,

    /// Include source file names in every event.
    with_file: bool,

    /// Include source line numbers in every event.
    with_line_number: bool,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set and file/line output taken from
    /// the environment.
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            with_file: env_flag(LOG_FILE_ENVVAR),
            with_line_number: env_flag(LOG_LINE_NUM_ENVVAR),
        }
    }

    /// Creates a new instance with the whoami string set to the provided
    /// string.
    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// Overrides whether source file names are printed.
    pub fn set_with_file(&mut self, enabled: bool) {
        self.with_file = enabled;
    }

    /// Overrides whether source line numbers are printed.
    pub fn set_with_line_number(&mut self, enabled: bool) {
        self.with_line_number = enabled;
    }

    /// The whoami string reported when logging starts.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(finschia-sdk)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// Returns `false` if a global subscriber was already installed, in which case
/// the existing one is left untouched. This makes it safe to call from every
/// test that wants log output.
pub fn init(config: LoggerConfig) -> bool {
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(config.with_file)
                .with_line_number(config.with_line_number),
        )
        .with_filter(filt);

    if tracing_subscriber::registry()
        .with(stdout_sub)
        .try_init()
        .is_err()
    {
        return false;
    }

    info!(whoami = %config.whoami, "logging started");
    true
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1")
}
