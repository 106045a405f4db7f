use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::fs;
use std::env;
use tracing_subscriber::EnvFilter;
use crate::report::file_stem;
use crate::strategy::QuoteStrategy;

/// Largest accepted `order_size`; keeps inventory far from `i64` overflow
pub const MAX_ORDER_SIZE: i64 = 1_000_000_000;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Market and run parameters
    pub market: MarketConfig,
    /// Strategies to compare; empty means a single baseline strategy
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Export configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parameters shared by every strategy in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Fair price before the first step
    pub fair_price_start: f64,
    /// Standard deviation of the per-step fair-price increment
    pub volatility: f64,
    /// Default spread for strategies that do not set their own
    pub base_spread: f64,
    /// Units traded per fill
    pub order_size: i64,
    /// Mean number of trader orders per step
    pub lambda: f64,
    /// Number of simulation steps
    pub sim_duration: i64,
    /// Price increments used for the rolling volatility estimate
    pub rolling_window: i64,
    /// Seed for the single random stream
    pub random_seed: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            fair_price_start: 100.0,
            volatility: 0.5,
            base_spread: 1.0,
            order_size: 1,
            lambda: 5.0,
            sim_duration: 100,
            rolling_window: 20,
            random_seed: 42,
        }
    }
}

/// One quoting strategy entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    /// Falls back to `market.base_spread` when absent
    #[serde(default)]
    pub base_spread: Option<f64>,
    #[serde(default)]
    pub skew_factor: f64,
    #[serde(default)]
    pub volatility_aware: bool,
}

impl StrategyConfig {
    pub fn new<S: Into<String>>(name: S, skew_factor: f64, volatility_aware: bool) -> Self {
        Self {
            name: name.into(),
            base_spread: None,
            skew_factor,
            volatility_aware,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive list, e.g. `info,mmsim=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving CSV/JSON exports
    pub directory: PathBuf,
    /// Write one fill log CSV per strategy
    pub write_fills: bool,
    /// Write the price path and per-strategy step series CSVs
    pub write_series: bool,
    /// Write the JSON summary of all strategies
    pub write_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./output"),
            write_fills: true,
            write_series: true,
            write_summary: true,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            strategies: vec![StrategyConfig::new("baseline", 0.0, false)],
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SimConfig {
    /// Default market with the three-strategy comparison set
    pub fn comparison() -> Self {
        Self {
            strategies: vec![
                StrategyConfig::new("baseline", 0.0, false),
                StrategyConfig::new("skewed", 0.05, false),
                StrategyConfig::new("adaptive", 0.03, true),
            ],
            ..Self::default()
        }
    }

    /// Load configuration from file, falling back to defaults
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_existing_file(path)
    }

    /// Load configuration from a file that must exist
    pub fn load_from_existing_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::IoError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: SimConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables and file
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file("config.toml")?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(seed) = env_override("MMSIM_RANDOM_SEED")? {
            self.market.random_seed = seed;
        }

        if let Some(duration) = env_override("MMSIM_SIM_DURATION")? {
            self.market.sim_duration = duration;
        }

        if let Some(lambda) = env_override("MMSIM_LAMBDA")? {
            self.market.lambda = lambda;
        }

        if let Some(volatility) = env_override("MMSIM_VOLATILITY")? {
            self.market.volatility = volatility;
        }

        if let Ok(dir) = env::var("MMSIM_OUTPUT_DIR") {
            self.output.directory = PathBuf::from(dir);
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            self.logging.level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let market = &self.market;

        if !market.fair_price_start.is_finite() {
            return Err(ConfigError::validation("fair_price_start", "must be a finite number"));
        }

        non_negative("volatility", market.volatility)?;
        non_negative("base_spread", market.base_spread)?;
        non_negative("lambda", market.lambda)?;

        if market.order_size <= 0 {
            return Err(ConfigError::validation("order_size", "must be a positive integer"));
        }
        if market.order_size > MAX_ORDER_SIZE {
            return Err(ConfigError::validation(
                "order_size",
                format!("must be at most {}", MAX_ORDER_SIZE),
            ));
        }

        if market.sim_duration <= 0 {
            return Err(ConfigError::validation("sim_duration", "must be a positive integer"));
        }

        if market.rolling_window <= 0 {
            return Err(ConfigError::validation("rolling_window", "must be a positive integer"));
        }

        // Export file names are derived from strategy names, so those must
        // stay distinct too
        let mut names = HashSet::new();
        let mut stems = HashSet::new();
        for strategy in &self.strategies {
            if strategy.name.trim().is_empty() {
                return Err(ConfigError::validation("strategies.name", "cannot be empty"));
            }
            if !names.insert(strategy.name.as_str()) {
                return Err(ConfigError::validation(
                    "strategies.name",
                    format!("duplicate strategy name '{}'", strategy.name),
                ));
            }
            if !stems.insert(file_stem(&strategy.name)) {
                return Err(ConfigError::validation(
                    "strategies.name",
                    format!(
                        "strategy name '{}' maps to the same export file as another strategy",
                        strategy.name
                    ),
                ));
            }
            if let Some(spread) = strategy.base_spread {
                non_negative("strategies.base_spread", spread)?;
            }
            if !strategy.skew_factor.is_finite() {
                return Err(ConfigError::validation(
                    "strategies.skew_factor",
                    "must be a finite number",
                ));
            }
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::validation(
                "logging.level",
                format!("invalid log filter '{}': {}", self.logging.level, e),
            ));
        }

        Ok(())
    }

    /// Resolve the configured strategies into quoting policies
    pub fn strategies(&self) -> Vec<QuoteStrategy> {
        if self.strategies.is_empty() {
            return vec![QuoteStrategy::new("baseline", self.market.base_spread, 0.0)];
        }

        self.strategies
            .iter()
            .map(|s| QuoteStrategy {
                name: s.name.clone(),
                base_spread: s.base_spread.unwrap_or(self.market.base_spread),
                skew_factor: s.skew_factor,
                volatility_aware: s.volatility_aware,
            })
            .collect()
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default_config_file() -> Result<(), ConfigError> {
        let config = Self::comparison();
        config.save_to_file("config.toml")?;
        println!("Generated default configuration file: config.toml");
        Ok(())
    }
}

fn non_negative(parameter: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::validation(
            parameter,
            format!("must be a finite number >= 0, got {}", value),
        ));
    }
    Ok(())
}

fn env_override<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::ParseError(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid parameter {parameter}: {reason}")]
    ValidationError { parameter: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializeError(String),
}

impl ConfigError {
    pub fn validation<P: Into<String>, R: Into<String>>(parameter: P, reason: R) -> Self {
        Self::ValidationError {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}
