//! CLI configuration management
//!
//! Handles loading settings from `numerica.toml`, `NUMERICA_*` environment
//! variables and command-line flags.

use numeric_core::compare::ComparisonMode;
use numeric_core::types::{ConvergenceConfig, EngineLimits, ErrorKind, NumericError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::output::OutputFormat;
use crate::{CliError, Result};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "numerica.toml";

/// Log levels accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::Config(format!(
                "invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Settings shared by every subcommand
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Stopping tolerance
    pub tolerance: f64,
    /// Iteration budget
    pub max_iterations: usize,
    /// Error formula; inferred from a `--tolerance` literal when unset
    pub error_kind: Option<ErrorKind>,
    /// Largest accepted system dimension
    pub max_dimension: usize,
    /// Largest accepted number of interpolation nodes
    pub max_points: usize,
    /// Run comparison batteries on the rayon pool
    pub parallel: bool,
    /// Output format
    pub format: OutputFormat,
    /// Wall-clock budget per command
    pub timeout_ms: Option<u64>,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: LogLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        let convergence = ConvergenceConfig::default();
        let limits = EngineLimits::default();
        Self {
            tolerance: convergence.tolerance,
            max_iterations: convergence.max_iterations,
            error_kind: None,
            max_dimension: limits.max_dimension,
            max_points: limits.max_points,
            parallel: false,
            format: OutputFormat::Table,
            timeout_ms: None,
            log_level: LogLevel::Warn,
        }
    }
}

/// Overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Tolerance literal (`5e-6` implies relative error)
    pub tolerance: Option<String>,
    /// Iteration budget override
    pub max_iterations: Option<usize>,
    /// Error kind override
    pub error_kind: Option<String>,
    /// Force parallel comparisons
    pub parallel: bool,
    /// Output format override
    pub format: Option<String>,
    /// Timeout override
    pub timeout_ms: Option<u64>,
    /// Log level override
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("failed to parse TOML: {}", e)))
    }

    /// Apply `NUMERICA_*` variables found through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(literal) = lookup("NUMERICA_TOLERANCE") {
            self.set_tolerance(&literal)?;
        }
        if let Some(value) = lookup("NUMERICA_MAX_ITERATIONS") {
            self.max_iterations = parse_env("NUMERICA_MAX_ITERATIONS", &value)?;
        }
        if let Some(value) = lookup("NUMERICA_ERROR_KIND") {
            self.error_kind = Some(value.parse()?);
        }
        if let Some(value) = lookup("NUMERICA_MAX_DIMENSION") {
            self.max_dimension = parse_env("NUMERICA_MAX_DIMENSION", &value)?;
        }
        if let Some(value) = lookup("NUMERICA_MAX_POINTS") {
            self.max_points = parse_env("NUMERICA_MAX_POINTS", &value)?;
        }
        if let Some(value) = lookup("NUMERICA_PARALLEL") {
            self.parallel = value.eq_ignore_ascii_case("true") || value == "1";
        }
        if let Some(value) = lookup("NUMERICA_FORMAT") {
            self.format = value.parse()?;
        }
        if let Some(value) = lookup("NUMERICA_TIMEOUT_MS") {
            self.timeout_ms = Some(parse_env("NUMERICA_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = lookup("NUMERICA_LOG_LEVEL") {
            self.log_level = value.parse()?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<()> {
        if let Some(literal) = &cli.tolerance {
            self.set_tolerance(literal)?;
        }
        if let Some(max) = cli.max_iterations {
            self.max_iterations = max;
        }
        if let Some(kind) = &cli.error_kind {
            self.error_kind = Some(kind.parse()?);
        }
        if cli.parallel {
            self.parallel = true;
        }
        if let Some(format) = &cli.format {
            self.format = format.parse()?;
        }
        if let Some(ms) = cli.timeout_ms {
            self.timeout_ms = Some(ms);
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.convergence()?;
        if self.max_dimension < 2 {
            return Err(NumericError::config("max_dimension", self.max_dimension, "at least 2 (e.g. 7)").into());
        }
        if self.max_points < 2 {
            return Err(NumericError::config("max_points", self.max_points, "at least 2 (e.g. 8)").into());
        }
        if self.timeout_ms == Some(0) {
            return Err(NumericError::config("timeout_ms", 0, "a positive number of milliseconds (e.g. 5000)").into());
        }
        Ok(())
    }

    /// Convergence settings for the engines
    pub fn convergence(&self) -> std::result::Result<ConvergenceConfig, NumericError> {
        Ok(ConvergenceConfig::new(self.tolerance, self.max_iterations)?
            .with_error_kind(self.error_kind.unwrap_or_default()))
    }

    /// Size limits for the engines
    pub fn limits(&self) -> EngineLimits {
        EngineLimits {
            max_dimension: self.max_dimension,
            max_points: self.max_points,
        }
    }

    /// Comparison execution mode
    pub fn mode(&self) -> ComparisonMode {
        if self.parallel {
            ComparisonMode::Parallel
        } else {
            ComparisonMode::Sequential
        }
    }

    /// Per-command deadline
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    // A written tolerance also implies the error kind unless one was chosen.
    fn set_tolerance(&mut self, literal: &str) -> Result<()> {
        self.tolerance = literal.trim().parse().map_err(|_| {
            CliError::InvalidArgument(format!("tolerance must be a number such as 1e-6, got '{}'", literal))
        })?;
        if self.error_kind.is_none() {
            match ErrorKind::infer_from_tolerance(literal) {
                ErrorKind::Generic => {}
                inferred => self.error_kind = Some(inferred),
            }
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("environment variable {} has invalid value '{}'", name, value)))
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig> {
    let mut config = match &cli.config_file {
        Some(path) if !path.exists() => {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        Some(path) => CliConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => CliConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?,
        None => CliConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.max_dimension, 7);
        assert_eq!(config.max_points, 8);
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.mode(), ComparisonMode::Sequential);
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = CliConfig::from_toml(
            r#"
            tolerance = 1e-9
            max_iterations = 250
            error_kind = "relative"
            parallel = true
            format = "json"
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_relative_eq!(config.tolerance, 1e-9);
        assert_eq!(config.max_iterations, 250);
        assert_eq!(config.error_kind, Some(ErrorKind::Relative));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.mode(), ComparisonMode::Parallel);
        // unset keys keep their defaults
        assert_eq!(config.max_points, 8);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(matches!(CliConfig::from_toml("tolerance = [1, 2"), Err(CliError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config
            .apply_env(env(&[
                ("NUMERICA_MAX_ITERATIONS", "40"),
                ("NUMERICA_FORMAT", "json"),
                ("NUMERICA_TIMEOUT_MS", "1500"),
                ("NUMERICA_PARALLEL", "TRUE"),
            ]))
            .unwrap();
        assert_eq!(config.max_iterations, 40);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        assert!(config.parallel);
    }

    #[test]
    fn test_env_invalid_number() {
        let mut config = CliConfig::default();
        let err = config.apply_env(env(&[("NUMERICA_MAX_POINTS", "many")])).unwrap_err();
        assert!(err.to_string().contains("NUMERICA_MAX_POINTS"));
    }

    #[test]
    fn test_tolerance_literal_infers_error_kind() {
        let mut config = CliConfig::default();
        config
            .merge_with_cli(&CliArgs {
                tolerance: Some("5e-6".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.tolerance, 5e-6);
        assert_eq!(config.convergence().unwrap().error_kind, ErrorKind::Relative);

        let mut config = CliConfig::default();
        config
            .merge_with_cli(&CliArgs {
                tolerance: Some("0.001".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.error_kind, None);
    }

    #[test]
    fn test_explicit_error_kind_wins() {
        let mut config = CliConfig::default();
        config
            .merge_with_cli(&CliArgs {
                tolerance: Some("5e-6".to_string()),
                error_kind: Some("absolute".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.error_kind, Some(ErrorKind::Absolute));
    }

    #[test]
    fn test_cli_takes_precedence_over_env() {
        let mut config = CliConfig::default();
        config.apply_env(env(&[("NUMERICA_MAX_ITERATIONS", "40")])).unwrap();
        config
            .merge_with_cli(&CliArgs {
                max_iterations: Some(60),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.max_iterations, 60);
    }

    #[test]
    fn test_validate() {
        let config = CliConfig {
            tolerance: 2.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CliError::Numeric(_))));

        let config = CliConfig {
            timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CliConfig {
            max_dimension: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliArgs {
            config_file: Some(PathBuf::from("/nonexistent/numerica.toml")),
            ..Default::default()
        };
        assert!(matches!(build_config(&cli), Err(CliError::FileNotFound(_))));
    }
}
