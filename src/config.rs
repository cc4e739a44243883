//! Configuration types for arb-signal-engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub liquidity: LiquidityConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Detection engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum spread (percent) for a new signal
    #[serde(default = "default_entry_threshold")]
    pub entry_threshold_percent: Decimal,

    /// Spread (percent) below which an existing signal is dropped
    #[serde(default = "default_retention_threshold")]
    pub retention_threshold_percent: Decimal,

    /// Maximum price impact (percent) tolerated on either leg
    #[serde(default = "default_impact_ceiling")]
    pub impact_ceiling_percent: Decimal,

    /// Probe size for the impact walk (quote currency on buys, base units on sells)
    #[serde(default = "default_probe_notional")]
    pub probe_notional: Decimal,

    /// Seconds between passes
    #[serde(default = "default_pass_interval")]
    pub pass_interval_seconds: u64,
}

fn default_entry_threshold() -> Decimal {
    Decimal::new(30, 1) // 3.0%
}
fn default_retention_threshold() -> Decimal {
    Decimal::new(30, 1) // 3.0%
}
fn default_impact_ceiling() -> Decimal {
    Decimal::new(15, 1) // 1.5%
}
fn default_probe_notional() -> Decimal {
    Decimal::new(100, 0)
}
fn default_pass_interval() -> u64 {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            entry_threshold_percent: default_entry_threshold(),
            retention_threshold_percent: default_retention_threshold(),
            impact_ceiling_percent: default_impact_ceiling(),
            probe_notional: default_probe_notional(),
            pass_interval_seconds: default_pass_interval(),
        }
    }
}

impl EngineConfig {
    pub fn pass_interval(&self) -> Duration {
        Duration::from_secs(self.pass_interval_seconds)
    }
}

/// Liquidity gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityConfig {
    /// Bid volume must be strictly above this
    #[serde(default)]
    pub min_bid_volume: Decimal,

    /// Ask volume must be strictly above this
    #[serde(default)]
    pub min_ask_volume: Decimal,

    /// Book levels summed when volume is derived from the book
    #[serde(default = "default_liquidity_depth")]
    pub depth: usize,
}

fn default_liquidity_depth() -> usize {
    5
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            min_bid_volume: Decimal::ZERO,
            min_ask_volume: Decimal::ZERO,
            depth: default_liquidity_depth(),
        }
    }
}

/// Risk gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Spreads above this (percent) are treated as bad data
    #[serde(default = "default_max_price_jump")]
    pub max_price_jump_percent: Decimal,

    /// Trading fee per round trip (percent)
    #[serde(default = "default_trading_fee")]
    pub trading_fee_percent: Decimal,

    /// Withdrawal fee (percent)
    #[serde(default = "default_withdrawal_fee")]
    pub withdrawal_fee_percent: Decimal,

    /// Total fee budget (percent)
    #[serde(default = "default_max_fee")]
    pub max_fee_percent: Decimal,

    /// Expected settlement time between exchanges
    #[serde(default = "default_withdrawal_minutes")]
    pub withdrawal_minutes: u32,

    /// Settlement time budget
    #[serde(default = "default_max_withdrawal_minutes")]
    pub max_withdrawal_minutes: u32,
}

fn default_max_price_jump() -> Decimal {
    Decimal::new(10, 0)
}
fn default_trading_fee() -> Decimal {
    Decimal::new(1, 1) // 0.1%
}
fn default_withdrawal_fee() -> Decimal {
    Decimal::new(2, 1) // 0.2%
}
fn default_max_fee() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}
fn default_withdrawal_minutes() -> u32 {
    30
}
fn default_max_withdrawal_minutes() -> u32 {
    60
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_price_jump_percent: default_max_price_jump(),
            trading_fee_percent: default_trading_fee(),
            withdrawal_fee_percent: default_withdrawal_fee(),
            max_fee_percent: default_max_fee(),
            withdrawal_minutes: default_withdrawal_minutes(),
            max_withdrawal_minutes: default_max_withdrawal_minutes(),
        }
    }
}

/// Signal store backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

/// Signal store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,

    /// JSON file holding the signal set (file backend)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/signals.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            path: default_store_path(),
        }
    }
}

/// Market data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// JSON snapshot written by ingestion, re-read every pass
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Levels kept when normalizing raw exchange books
    #[serde(default = "default_book_depth")]
    pub book_depth: usize,

    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("./data/market.json")
}
fn default_book_depth() -> usize {
    50
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            book_depth: default_book_depth(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Retry schedule for feed reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Random extra delay as a fraction of the current delay
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_initial_delay_ms() -> u64 {
    250
}
fn default_max_delay_ms() -> u64 {
    5_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_jitter() -> f64 {
    0.2
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_retries: default_max_retries(),
            jitter: default_jitter(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        if engine.entry_threshold_percent < Decimal::ZERO {
            return Err(invalid("engine.entry_threshold_percent", "must not be negative"));
        }
        if engine.retention_threshold_percent < Decimal::ZERO {
            return Err(invalid(
                "engine.retention_threshold_percent",
                "must not be negative",
            ));
        }
        if engine.retention_threshold_percent > engine.entry_threshold_percent {
            return Err(invalid(
                "engine.retention_threshold_percent",
                format!(
                    "{} exceeds entry threshold {}",
                    engine.retention_threshold_percent, engine.entry_threshold_percent
                ),
            ));
        }
        if engine.impact_ceiling_percent <= Decimal::ZERO {
            return Err(invalid("engine.impact_ceiling_percent", "must be positive"));
        }
        if engine.probe_notional <= Decimal::ZERO {
            return Err(invalid("engine.probe_notional", "must be positive"));
        }
        if engine.pass_interval_seconds == 0 {
            return Err(invalid("engine.pass_interval_seconds", "must be positive"));
        }
        if self.feed.book_depth == 0 {
            return Err(invalid("feed.book_depth", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.feed.backoff.jitter) {
            return Err(invalid("feed.backoff.jitter", "must be within 0..=1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [engine]
            entry_threshold_percent = 3.0
            retention_threshold_percent = 2.5
            impact_ceiling_percent = 1.5
            probe_notional = 100
            pass_interval_seconds = 10

            [liquidity]
            min_bid_volume = 0
            min_ask_volume = 0
            depth = 5

            [risk]
            max_price_jump_percent = 10
            trading_fee_percent = 0.1
            withdrawal_fee_percent = 0.2
            max_fee_percent = 0.5
            withdrawal_minutes = 30
            max_withdrawal_minutes = 60

            [store]
            kind = "file"
            path = "./data/signals.json"

            [feed]
            snapshot_path = "./data/market.json"
            book_depth = 50

            [feed.backoff]
            initial_delay_ms = 100
            max_delay_ms = 2000
            max_retries = 4
            jitter = 0.1

            [telemetry]
            metrics_port = 9090
            log_level = "debug"
            log_format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.retention_threshold_percent, dec!(2.5));
        assert_eq!(config.store.kind, StoreKind::File);
        assert_eq!(config.feed.backoff.max_retries, 4);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.entry_threshold_percent, dec!(3.0));
        assert_eq!(config.engine.retention_threshold_percent, dec!(3.0));
        assert_eq!(config.engine.impact_ceiling_percent, dec!(1.5));
        assert_eq!(config.engine.probe_notional, dec!(100));
        assert_eq!(config.engine.pass_interval(), Duration::from_secs(10));
        assert_eq!(config.liquidity.depth, 5);
        assert_eq!(config.risk.max_fee_percent, dec!(0.5));
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert_eq!(config.feed.book_depth, 50);
        assert!(config.telemetry.metrics_port.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            pass_interval_seconds = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.pass_interval_seconds, 30);
        assert_eq!(config.engine.entry_threshold_percent, dec!(3.0));
    }

    #[test]
    fn test_retention_above_entry_rejected() {
        let mut config = Config::default();
        config.engine.retention_threshold_percent = dec!(4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "engine.retention_threshold_percent",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.engine.probe_notional = dec!(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.pass_interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.feed.backoff.jitter = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_store_kind_default() {
        assert_eq!(StoreKind::default(), StoreKind::Memory);
        assert_ne!(StoreKind::Memory, StoreKind::File);
    }
}
