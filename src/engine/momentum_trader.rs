//! 52-week-high momentum loop.
//!
//! Outside the session, seed small fractional buys into watchlist names
//! whose day high is within 1% of their 52-week high. Inside the
//! session, walk the holdings and close anything that has moved 1% in
//! either direction from its entry price.

use anyhow::Result;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::broker::Brokerage;
use crate::config::AppConfig;
use crate::engine::hours;
use crate::strategy::momentum::{self, ExitAction};

/// Drives the momentum strategy against a brokerage.
pub struct MomentumTrader<'a> {
    broker: &'a dyn Brokerage,
    config: &'a AppConfig,
}

impl<'a> MomentumTrader<'a> {
    pub fn new(broker: &'a dyn Brokerage, config: &'a AppConfig) -> Self {
        Self { broker, config }
    }

    /// Run forever: exits while the market is open, entries while it is
    /// closed.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.broker.login().await?;
            let session = self.broker.next_open_hours().await?;

            let wait = if session.contains(Utc::now()) {
                if let Err(e) = self.check_exits().await {
                    warn!(error = ?e, "Exit pass failed");
                }
                std::time::Duration::from_secs(self.config.agent.poll_interval_secs)
            } else {
                if let Err(e) = self.scan_entries().await {
                    warn!(error = ?e, "Entry pass failed");
                }
                hours::post_session_wait(&session, Utc::now(), false)
            };

            self.broker.logout().await?;
            debug!(wait_secs = wait.as_secs(), "Momentum pass done, sleeping");
            sleep(wait).await;
        }
    }

    /// Buy into watchlist names trading at their 52-week high.
    pub async fn scan_entries(&self) -> Result<u32> {
        let cfg = &self.config.momentum;
        let mut bought = 0;

        for symbol in &cfg.watchlist {
            let fundamentals = match self.broker.fundamentals(symbol).await {
                Ok(f) => f,
                Err(e) => {
                    warn!(symbol, error = ?e, "Fundamentals fetch failed, skipping");
                    continue;
                }
            };

            if !momentum::near_52_week_high(&fundamentals, cfg) {
                debug!(
                    symbol,
                    high = fundamentals.high,
                    high_52_weeks = fundamentals.high_52_weeks,
                    "Below 52-week-high threshold"
                );
                continue;
            }

            let order_id = self
                .broker
                .buy_fractional_by_price(symbol, cfg.order_dollars)
                .await?;
            info!(symbol, order_id = %order_id, dollars = cfg.order_dollars, "Momentum buy");
            bought += 1;
        }

        Ok(bought)
    }

    /// Close holdings that hit the profit target or stop loss.
    pub async fn check_exits(&self) -> Result<u32> {
        let cfg = &self.config.momentum;
        let mut closed = 0;

        for holding in self.broker.holdings().await? {
            match momentum::exit_action(&holding, cfg) {
                ExitAction::Hold => debug!(holding = %holding, "Holding"),
                action @ (ExitAction::TakeProfit | ExitAction::StopLoss) => {
                    let order_id = self
                        .broker
                        .sell_fractional_by_quantity(&holding.symbol, holding.quantity)
                        .await?;
                    info!(
                        holding = %holding,
                        order_id = %order_id,
                        ?action,
                        "Momentum exit"
                    );
                    closed += 1;
                }
            }
        }

        Ok(closed)
    }
}
