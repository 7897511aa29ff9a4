//! SPREADHAWK — Automated Credit-Spread Trading Agent
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the brokerage client from env-resolved credentials, and runs
//! the configured strategy loop with graceful shutdown.

use anyhow::Result;
use tracing::info;

use spreadhawk::broker::robinhood::RobinhoodClient;
use spreadhawk::config::{self, StrategyKind};
use spreadhawk::engine::momentum_trader::MomentumTrader;
use spreadhawk::engine::spread_trader::SpreadTrader;
use spreadhawk::types::OptionType;

const BANNER: &str = r#"
 ____  ____  ____  _____    _    ____  _   _    ___        ___  __
/ ___||  _ \|  _ \| ____|  / \  |  _ \| | | |  / \ \      / / |/ /
\___ \| |_) | |_) |  _|   / _ \ | | | | |_| | / _ \ \ /\ / /| ' /
 ___) |  __/|  _ <| |___ / ___ \| |_| |  _  |/ ___ \ V  V / | . \
|____/|_|   |_| \_\_____/_/   \_\____/|_| |_/_/   \_\_/\_/  |_|\_\

  High-IV Credit-Spread Trading Agent
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        strategy = ?cfg.strategy.kind,
        poll_interval_secs = cfg.agent.poll_interval_secs,
        ledger = %cfg.ledger.path,
        "SPREADHAWK starting up"
    );

    // -- Brokerage client from env-resolved credentials -------------------

    let username = config::AppConfig::resolve_env(&cfg.credentials.username_env)?;
    let password = config::AppConfig::resolve_secret(&cfg.credentials.password_env)?;
    let mfa_secret = cfg
        .credentials
        .mfa_auth_env
        .as_deref()
        .map(config::AppConfig::resolve_secret)
        .transpose()?;

    let broker = RobinhoodClient::new(username, password, mfa_secret)?;

    // -- Strategy loop -----------------------------------------------------

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let outcome = tokio::select! {
        res = run_strategy(&broker, &cfg) => res,
        _ = &mut shutdown => {
            info!("Shutdown signal received.");
            Ok(())
        }
    };

    info!("SPREADHAWK shut down.");
    outcome
}

/// Dispatch to the configured strategy. Each loop runs until shutdown.
async fn run_strategy(broker: &RobinhoodClient, cfg: &config::AppConfig) -> Result<()> {
    match cfg.strategy.kind {
        StrategyKind::PutCreditSpread => {
            SpreadTrader::new(broker, cfg, OptionType::Put).run().await
        }
        StrategyKind::CallCreditSpread => {
            SpreadTrader::new(broker, cfg, OptionType::Call).run().await
        }
        StrategyKind::High52Week => MomentumTrader::new(broker, cfg).run().await,
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("spreadhawk=info"));

    let json_logging = std::env::var("SPREADHAWK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
