//! Credit-spread session loop.
//!
//! One process runs one spread strategy (put or call). Each session:
//! screen for high-IV tickers, drop anything with a recent open
//! position, scan each remaining chain for a candidate spread, submit
//! the best one as a good-for-day credit order, poll it to a terminal
//! state, and on a fill immediately queue the good-til-cancelled
//! closing order at the profit target and record the trade.

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::broker::Brokerage;
use crate::config::AppConfig;
use crate::data::screener::{high_iv_symbols, IvScreener};
use crate::engine::hours;
use crate::ledger;
use crate::strategy::spread;
use crate::types::{OptionType, OrderState, TimeInForce, TradeRecord};

/// Drives one credit-spread strategy against a brokerage.
pub struct SpreadTrader<'a> {
    broker: &'a dyn Brokerage,
    config: &'a AppConfig,
    option_type: OptionType,
}

impl<'a> SpreadTrader<'a> {
    pub fn new(broker: &'a dyn Brokerage, config: &'a AppConfig, option_type: OptionType) -> Self {
        Self {
            broker,
            config,
            option_type,
        }
    }

    /// Run forever: one session loop per trading day.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.broker.login().await?;
            let session = self.broker.next_open_hours().await?;
            info!(
                broker = self.broker.name(),
                option_type = %self.option_type,
                %session,
                "Session resolved"
            );

            let mut opened: u32 = 0;
            while session.contains(Utc::now())
                && opened < self.config.spread.max_daily_open_positions
            {
                let universe = match self.universe().await {
                    Ok(u) => u,
                    Err(e) => {
                        warn!(error = ?e, "Screener pass failed, retrying next interval");
                        Vec::new()
                    }
                };

                if !universe.is_empty() {
                    match self.trading_pass(&universe).await {
                        Ok(true) => opened += 1,
                        Ok(false) => debug!("No trade this pass"),
                        Err(e) => warn!(error = ?e, "Trading pass failed"),
                    }
                }

                sleep(std::time::Duration::from_secs(
                    self.config.agent.poll_interval_secs,
                ))
                .await;
            }

            self.broker.logout().await?;

            let cap_reached = opened >= self.config.spread.max_daily_open_positions;
            let wait = hours::post_session_wait(&session, Utc::now(), cap_reached);
            info!(
                opened,
                cap_reached,
                wait_secs = wait.as_secs(),
                "Session over, sleeping"
            );
            sleep(wait).await;
        }
    }

    /// High-IV tickers for this pass, from the screener.
    async fn universe(&self) -> Result<Vec<String>> {
        let screener = IvScreener::new()?;
        let rows = screener.fetch().await?;
        Ok(high_iv_symbols(&rows, &self.config.spread))
    }

    /// One scan-and-trade pass over a ticker universe.
    ///
    /// Returns `Ok(true)` when a spread was filled and recorded. A
    /// single chain failing to fetch skips that ticker rather than
    /// aborting the pass.
    pub async fn trading_pass(&self, universe: &[String]) -> Result<bool> {
        let cfg = &self.config.spread;

        let excluded = self
            .broker
            .recent_open_option_symbols(self.option_type, cfg.day_lag)
            .await
            .context("Failed to fetch recent open positions")?;

        let expiration = match hours::nearest_weekday_expiration(
            Utc::now().date_naive(),
            cfg.weekday_num,
            cfg.days_until_expiration_min,
            cfg.days_until_expiration_max,
        ) {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => {
                warn!("No matching expiration in the configured window");
                return Ok(false);
            }
        };

        let mut candidates = Vec::new();
        for symbol in universe {
            if excluded.contains(symbol) {
                debug!(symbol, "Skipping, position opened recently");
                continue;
            }

            let chain = match self
                .broker
                .option_chain(symbol, &expiration, self.option_type)
                .await
            {
                Ok(chain) => chain,
                Err(e) => {
                    warn!(symbol, error = ?e, "Chain fetch failed, skipping ticker");
                    continue;
                }
            };

            if let Some(candidate) = spread::candidate_from_chain(&chain, self.option_type, cfg) {
                debug!(
                    symbol,
                    limit = candidate.limit_price,
                    pct = candidate.expected_percent_return,
                    "Candidate found"
                );
                candidates.push(candidate);
            }
        }

        let Some(best) = spread::select_trade(candidates, cfg) else {
            return Ok(false);
        };
        info!(
            symbol = %best.short.symbol,
            expiration = %best.short.expiration_date,
            short_strike = best.short.strike_price,
            long_strike = best.long.strike_price,
            limit = best.limit_price,
            expected_pct = best.expected_percent_return,
            "Submitting credit spread"
        );

        let open_id = self
            .broker
            .place_credit_spread(&best, best.limit_price, TimeInForce::Gfd)
            .await?;

        let state = self.poll_to_terminal(&open_id).await?;
        if !state.is_filled() {
            info!(order_id = %open_id, %state, "Opening order did not fill");
            return Ok(false);
        }

        // Queue the profit-taking close as soon as the open fills.
        let close_limit = best.limit_price * cfg.profit_target_percent;
        let close_id = self
            .broker
            .place_debit_spread(&best, close_limit, TimeInForce::Gtc)
            .await?;
        info!(
            order_id = %close_id,
            limit = close_limit,
            "Closing order queued at profit target"
        );

        let record = TradeRecord::from_candidate(&best, &open_id, &close_id);
        ledger::append_trade(&record, Some(&self.config.ledger.path))?;

        Ok(true)
    }

    /// Poll an order until it reaches a terminal state.
    async fn poll_to_terminal(&self, order_id: &str) -> Result<OrderState> {
        loop {
            let state = self.broker.order_state(order_id).await?;
            debug!(order_id, %state, "Order state");
            if state.is_terminal() {
                return Ok(state);
            }
            sleep(std::time::Duration::from_secs(
                self.config.agent.order_poll_interval_secs,
            ))
            .await;
        }
    }
}
