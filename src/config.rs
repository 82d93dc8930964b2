//! Run configuration: file locations and the application name.

use crate::client::APP_NAME;
use std::path::PathBuf;

/// Input file used when no argument is given.
pub const DEFAULT_INPUT: &str = "accounts.csv";

/// Token export written after a run.
pub const DEFAULT_EXPORT: &str = "tokens.json";

/// Success/failure report written after a run.
pub const DEFAULT_REPORT: &str = "report.log";

/// Debug log, appended to across runs.
pub const DEFAULT_LOG: &str = "debug.log";

/// Where a run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_path: PathBuf,
    pub export_path: PathBuf,
    pub report_path: PathBuf,
    pub log_path: PathBuf,

    /// Name the application is registered under on every account.
    pub app_name: String,
}

impl Config {
    /// Builds a config from process arguments, program name first.
    ///
    /// The first real argument, if any, is the input file. Everything else
    /// uses the defaults in the working directory.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        if let Some(input) = args.into_iter().nth(1) {
            config.input_path = PathBuf::from(input);
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_path: PathBuf::from(DEFAULT_INPUT),
            export_path: PathBuf::from(DEFAULT_EXPORT),
            report_path: PathBuf::from(DEFAULT_REPORT),
            log_path: PathBuf::from(DEFAULT_LOG),
            app_name: APP_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_without_arguments() {
        let config = Config::from_args(args(&["ds-connector-registration"]));
        assert_eq!(config, Config::default());
        assert_eq!(config.input_path, PathBuf::from("accounts.csv"));
        assert_eq!(config.app_name, APP_NAME);
    }

    #[test]
    fn test_first_argument_is_input_file() {
        let config = Config::from_args(args(&["ds-connector-registration", "batch.csv", "extra"]));
        assert_eq!(config.input_path, PathBuf::from("batch.csv"));
        assert_eq!(config.export_path, PathBuf::from("tokens.json"));
        assert_eq!(config.report_path, PathBuf::from("report.log"));
    }
}
