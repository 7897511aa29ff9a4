//! Brokerage integration.
//!
//! Defines the `Brokerage` trait the trading engines run against and
//! provides the Robinhood implementation. Keeping the seam here lets
//! the engines be driven by a scripted broker in tests.

pub mod robinhood;
pub mod totp;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{
    CandidateSpread, Fundamentals, Holding, OptionQuote, OptionType, OrderState, SessionHours,
    TimeInForce,
};

/// Abstraction over the brokerage REST API.
///
/// One implementor (`RobinhoodClient`) talks to the real API; tests use
/// scripted fakes. All methods take `&self`; session state lives behind
/// interior mutability in the implementor.
#[async_trait]
pub trait Brokerage: Send + Sync {
    /// Authenticate and store a session token.
    async fn login(&self) -> Result<()>;

    /// Revoke the session token.
    async fn logout(&self) -> Result<()>;

    /// The next (or current) trading session's open/close window.
    async fn next_open_hours(&self) -> Result<SessionHours>;

    /// Day high and 52-week high for a symbol.
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals>;

    /// Full single-expiration option chain for a symbol.
    /// A symbol with no chain yields an empty vec, not an error.
    async fn option_chain(
        &self,
        symbol: &str,
        expiration_date: &str,
        option_type: OptionType,
    ) -> Result<Vec<OptionQuote>>;

    /// Symbols with a filled opening option order of the given type in
    /// the last `day_lag` days. Used to avoid doubling up on a ticker.
    async fn recent_open_option_symbols(
        &self,
        option_type: OptionType,
        day_lag: i64,
    ) -> Result<Vec<String>>;

    /// Submit the two-leg opening order (sell short leg, buy long leg)
    /// at the given net-credit limit. Returns the order id.
    async fn place_credit_spread(
        &self,
        candidate: &CandidateSpread,
        limit_price: f64,
        time_in_force: TimeInForce,
    ) -> Result<String>;

    /// Submit the two-leg closing order (buy short leg back, sell long
    /// leg) at the given net-debit limit. Returns the order id.
    async fn place_debit_spread(
        &self,
        candidate: &CandidateSpread,
        limit_price: f64,
        time_in_force: TimeInForce,
    ) -> Result<String>;

    /// Current state of a previously submitted option order.
    async fn order_state(&self, order_id: &str) -> Result<OrderState>;

    /// Current equity holdings with entry-relative percent change.
    async fn holdings(&self) -> Result<Vec<Holding>>;

    /// Market buy of a fractional dollar amount. Returns the order id.
    async fn buy_fractional_by_price(&self, symbol: &str, dollars: f64) -> Result<String>;

    /// Market sell of a fractional share quantity. Returns the order id.
    async fn sell_fractional_by_quantity(&self, symbol: &str, quantity: f64) -> Result<String>;

    /// Broker name for logging.
    fn name(&self) -> &str;
}
