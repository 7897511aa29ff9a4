//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (brokerage credentials, TOTP seed) are referenced by env-var
//! name in the config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub strategy: StrategyConfig,
    pub credentials: CredentialsConfig,
    pub spread: SpreadConfig,
    pub momentum: MomentumConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    /// Delay between trading-loop iterations (chain rescans).
    pub poll_interval_secs: u64,
    /// Delay between order-status checks while waiting for a fill.
    pub order_poll_interval_secs: u64,
}

/// Which trading strategy this process runs.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    PutCreditSpread,
    CallCreditSpread,
    #[serde(rename = "high_52_week")]
    High52Week,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub username_env: String,
    pub password_env: String,
    /// Env var holding the base32 TOTP seed for MFA. Optional — some
    /// accounts use SMS challenge instead.
    #[serde(default)]
    pub mfa_auth_env: Option<String>,
}

/// Credit-spread strategy parameters. Defaults match the live values
/// the strategy has traded with.
#[derive(Debug, Deserialize, Clone)]
pub struct SpreadConfig {
    /// Expiration weekday, Monday = 0 (4 = Friday).
    pub weekday_num: u8,
    /// Days back to look for already-open positions to exclude.
    pub day_lag: i64,
    pub max_daily_open_positions: u32,
    pub iv_rank_min: f64,
    pub iv_percentile_min: f64,
    pub total_option_volume_min: f64,
    /// Unsigned target delta for the short leg.
    pub target_delta: f64,
    pub days_until_expiration_min: i64,
    pub days_until_expiration_max: i64,
    pub delta_tolerance: f64,
    pub option_volume_min: f64,
    pub option_open_interest_min: f64,
    pub max_strike_width: f64,
    pub min_percent_return: f64,
    /// Closing order priced at limit × this fraction.
    pub profit_target_percent: f64,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            weekday_num: 4,
            day_lag: 7,
            max_daily_open_positions: 1,
            iv_rank_min: 0.5,
            iv_percentile_min: 0.5,
            total_option_volume_min: 50_000.0,
            target_delta: 0.30,
            days_until_expiration_min: 30,
            days_until_expiration_max: 45,
            delta_tolerance: 0.025,
            option_volume_min: 10.0,
            option_open_interest_min: 100.0,
            max_strike_width: 1.0,
            min_percent_return: 0.3,
            profit_target_percent: 0.5,
        }
    }
}

/// 52-week-high momentum strategy parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct MomentumConfig {
    /// Day high must reach this fraction of the 52-week high to buy.
    pub percent_of_high: f64,
    /// Close at this fractional gain (0.01 = +1%).
    pub profit_target: f64,
    /// Close at this fractional loss (−0.01 = −1%).
    pub stop_loss: f64,
    /// Dollar amount of each fractional buy.
    pub order_dollars: f64,
    pub watchlist: Vec<String>,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            percent_of_high: 0.99,
            profit_target: 0.01,
            stop_loss: -0.01,
            order_dollars: 1.0,
            watchlist: vec!["MA".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// CSV trade-history file for this strategy.
    pub path: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Sanity checks on threshold parameters.
    fn validate(&self) -> Result<()> {
        let s = &self.spread;
        anyhow::ensure!(
            (0.0..=1.0).contains(&s.iv_rank_min) && (0.0..=1.0).contains(&s.iv_percentile_min),
            "iv_rank_min and iv_percentile_min must lie in [0, 1]"
        );
        anyhow::ensure!(s.target_delta > 0.0, "target_delta must be positive (unsigned)");
        anyhow::ensure!(
            s.days_until_expiration_min <= s.days_until_expiration_max,
            "days_until_expiration range is inverted"
        );
        anyhow::ensure!(s.weekday_num <= 6, "weekday_num must be 0-6 (Monday = 0)");
        anyhow::ensure!(
            (0.0..=1.0).contains(&s.profit_target_percent),
            "profit_target_percent must lie in [0, 1]"
        );
        anyhow::ensure!(
            self.momentum.stop_loss < self.momentum.profit_target,
            "momentum stop_loss must be below profit_target"
        );
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Resolve a secret env var, wrapping it so it never hits the logs.
    pub fn resolve_secret(env_name: &str) -> Result<SecretString> {
        Ok(SecretString::new(Self::resolve_env(env_name)?))
    }
}
