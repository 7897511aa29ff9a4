//! Shared types for the SPREADHAWK bot.
//!
//! These types form the data model used across all modules: option
//! quotes and candidate spreads for the strategy layer, order states
//! for the broker layer, and the flattened trade record that lands in
//! the CSV ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Option contracts
// ---------------------------------------------------------------------------

/// Contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Lowercase wire name used by the brokerage API ("call" / "put").
    pub fn as_api_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" | "calls" => Ok(OptionType::Call),
            "put" | "puts" => Ok(OptionType::Put),
            _ => Err(anyhow::anyhow!("Unknown option type: {s}")),
        }
    }
}

/// One option contract's quote for a single polling iteration.
///
/// Sourced fresh from the brokerage each pass; carries no identity or
/// lifecycle beyond the current loop body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuote {
    pub symbol: String,
    /// Expiration date, ISO format (e.g. "2026-09-18").
    pub expiration_date: String,
    pub strike_price: f64,
    pub mark_price: f64,
    pub ask_price: f64,
    pub bid_price: f64,
    pub volume: f64,
    pub open_interest: f64,
    pub delta: f64,
    pub gamma: f64,
    pub rho: f64,
    pub theta: f64,
    pub vega: f64,
}

impl OptionQuote {
    /// Bid/ask spread of this single leg.
    pub fn bid_ask_spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }
}

impl fmt::Display for OptionQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ${:.2} mark={:.2} bid={:.2} ask={:.2} vol={:.0} oi={:.0} delta={:.3}",
            self.symbol,
            self.expiration_date,
            self.strike_price,
            self.mark_price,
            self.bid_price,
            self.ask_price,
            self.volume,
            self.open_interest,
            self.delta,
        )
    }
}

// ---------------------------------------------------------------------------
// Candidate spread
// ---------------------------------------------------------------------------

/// A two-leg credit spread candidate: short leg sold, long leg bought,
/// same type and expiration, adjacent strikes.
///
/// All derived fields are computed once at construction and the whole
/// value is discarded after the trade decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpread {
    pub option_type: OptionType,
    pub short: OptionQuote,
    pub long: OptionQuote,
    /// Distance between strikes; always positive.
    pub strike_width: f64,
    /// Net credit collected: short mark − long mark.
    pub limit_price: f64,
    /// Worst-case entry: short ask − long bid.
    pub trade_spread: f64,
    /// trade_spread / strike_width.
    pub spread_ratio: f64,
    /// Mean of the two legs' volumes.
    pub avg_volume: f64,
    /// Short delta as assignment-probability proxy × net credit.
    pub expected_dollar_return: f64,
    /// expected_dollar_return / (strike_width − limit_price).
    pub expected_percent_return: f64,
}

impl CandidateSpread {
    /// Build a candidate and compute its derived fields.
    ///
    /// Returns `None` for degenerate pairs: non-positive width, or a
    /// width equal to the net credit (max loss of zero would divide by
    /// zero in the percent-return estimate).
    pub fn build(option_type: OptionType, short: OptionQuote, long: OptionQuote) -> Option<Self> {
        let strike_width = match option_type {
            OptionType::Call => long.strike_price - short.strike_price,
            OptionType::Put => short.strike_price - long.strike_price,
        };
        if strike_width <= 0.0 {
            return None;
        }

        let limit_price = short.mark_price - long.mark_price;
        let max_loss = strike_width - limit_price;
        if max_loss == 0.0 {
            return None;
        }

        let trade_spread = short.ask_price - long.bid_price;
        let spread_ratio = trade_spread / strike_width;
        let avg_volume = (short.volume + long.volume) / 2.0;

        // Short delta doubles as a rough probability of assignment:
        // calls keep the credit with probability (1 − delta), puts with
        // probability (1 + delta) since put deltas are negative.
        let expected_dollar_return = match option_type {
            OptionType::Call => (1.0 - short.delta) * limit_price,
            OptionType::Put => (1.0 + short.delta) * limit_price,
        };
        let expected_percent_return = expected_dollar_return / max_loss;

        Some(Self {
            option_type,
            short,
            long,
            strike_width,
            limit_price,
            trade_spread,
            spread_ratio,
            avg_volume,
            expected_dollar_return,
            expected_percent_return,
        })
    }

    /// Max loss per contract (ignoring the 100x multiplier).
    pub fn max_loss(&self) -> f64 {
        self.strike_width - self.limit_price
    }
}

impl fmt::Display for CandidateSpread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} credit spread {}/{} exp {} | credit={:.2} width={:.2} E[$]={:.4} E[%]={:.1}%",
            self.short.symbol,
            self.option_type,
            self.short.strike_price,
            self.long.strike_price,
            self.short.expiration_date,
            self.limit_price,
            self.strike_width,
            self.expected_dollar_return,
            self.expected_percent_return * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Trade record (CSV ledger row)
// ---------------------------------------------------------------------------

/// Flattened candidate-spread fields plus the two order identifiers.
/// This is the only persisted state in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    /// "put credit spread" | "call credit spread"
    pub trade_type: String,
    pub expiration_date: String,
    pub short_strike_price: f64,
    pub short_mark_price: f64,
    pub short_ask_price: f64,
    pub short_bid_price: f64,
    pub short_spread: f64,
    pub short_volume: f64,
    pub short_open_interest: f64,
    pub short_delta: f64,
    pub short_gamma: f64,
    pub short_rho: f64,
    pub short_theta: f64,
    pub short_vega: f64,
    pub long_strike_price: f64,
    pub long_mark_price: f64,
    pub long_ask_price: f64,
    pub long_bid_price: f64,
    pub long_spread: f64,
    pub long_volume: f64,
    pub long_open_interest: f64,
    pub long_delta: f64,
    pub long_gamma: f64,
    pub long_rho: f64,
    pub long_theta: f64,
    pub long_vega: f64,
    pub trade_strike_width: f64,
    pub trade_limit_price: f64,
    pub trade_spread: f64,
    pub trade_spread_ratio: f64,
    pub avg_trade_volume: f64,
    pub trade_expected_dollar_return: f64,
    pub trade_expected_percent_return: f64,
    pub trade_open_id: String,
    pub trade_close_id: String,
}

/// Round to six decimal places, the ledger's numeric precision.
fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

impl TradeRecord {
    /// Flatten a filled candidate plus its order ids into a ledger row.
    pub fn from_candidate(c: &CandidateSpread, open_id: &str, close_id: &str) -> Self {
        let trade_type = match c.option_type {
            OptionType::Call => "call credit spread",
            OptionType::Put => "put credit spread",
        };
        Self {
            symbol: c.short.symbol.clone(),
            trade_type: trade_type.to_string(),
            expiration_date: c.short.expiration_date.clone(),
            short_strike_price: round6(c.short.strike_price),
            short_mark_price: round6(c.short.mark_price),
            short_ask_price: round6(c.short.ask_price),
            short_bid_price: round6(c.short.bid_price),
            short_spread: round6(c.short.bid_ask_spread()),
            short_volume: round6(c.short.volume),
            short_open_interest: round6(c.short.open_interest),
            short_delta: round6(c.short.delta),
            short_gamma: round6(c.short.gamma),
            short_rho: round6(c.short.rho),
            short_theta: round6(c.short.theta),
            short_vega: round6(c.short.vega),
            long_strike_price: round6(c.long.strike_price),
            long_mark_price: round6(c.long.mark_price),
            long_ask_price: round6(c.long.ask_price),
            long_bid_price: round6(c.long.bid_price),
            long_spread: round6(c.long.bid_ask_spread()),
            long_volume: round6(c.long.volume),
            long_open_interest: round6(c.long.open_interest),
            long_delta: round6(c.long.delta),
            long_gamma: round6(c.long.gamma),
            long_rho: round6(c.long.rho),
            long_theta: round6(c.long.theta),
            long_vega: round6(c.long.vega),
            trade_strike_width: round6(c.strike_width),
            trade_limit_price: round6(c.limit_price),
            trade_spread: round6(c.trade_spread),
            trade_spread_ratio: round6(c.spread_ratio),
            avg_trade_volume: round6(c.avg_volume),
            trade_expected_dollar_return: round6(c.expected_dollar_return),
            trade_expected_percent_return: round6(c.expected_percent_return),
            trade_open_id: open_id.to_string(),
            trade_close_id: close_id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order lifecycle state as reported by the brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    Queued,
    Unconfirmed,
    Confirmed,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
    Failed,
}

impl OrderState {
    /// Whether the order can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Filled | OrderState::Cancelled | OrderState::Rejected | OrderState::Failed
        )
    }

    pub fn is_filled(&self) -> bool {
        *self == OrderState::Filled
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderState::Queued => "queued",
            OrderState::Unconfirmed => "unconfirmed",
            OrderState::Confirmed => "confirmed",
            OrderState::PartiallyFilled => "partially_filled",
            OrderState::Filled => "filled",
            OrderState::Cancelled => "cancelled",
            OrderState::Rejected => "rejected",
            OrderState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(OrderState::Queued),
            "unconfirmed" => Ok(OrderState::Unconfirmed),
            "confirmed" => Ok(OrderState::Confirmed),
            "partially_filled" => Ok(OrderState::PartiallyFilled),
            "filled" => Ok(OrderState::Filled),
            "cancelled" | "canceled" => Ok(OrderState::Cancelled),
            "rejected" => Ok(OrderState::Rejected),
            "failed" => Ok(OrderState::Failed),
            _ => Err(anyhow::anyhow!("Unknown order state: {s}")),
        }
    }
}

/// Time-in-force for a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good for day — opening orders.
    Gfd,
    /// Good til cancelled — closing orders and momentum orders.
    Gtc,
}

impl TimeInForce {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TimeInForce::Gfd => "gfd",
            TimeInForce::Gtc => "gtc",
        }
    }
}

// ---------------------------------------------------------------------------
// Equities
// ---------------------------------------------------------------------------

/// An equity holding as reported by the brokerage account endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    /// Fractional change since entry (0.01 = +1%).
    pub percent_change: f64,
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{:.4} ({}{:.2}%)",
            self.symbol,
            self.quantity,
            if self.percent_change >= 0.0 { "+" } else { "" },
            self.percent_change * 100.0,
        )
    }
}

/// Day high and 52-week high for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub high: f64,
    pub high_52_weeks: f64,
}

// ---------------------------------------------------------------------------
// Market session
// ---------------------------------------------------------------------------

/// One trading session's open/close window, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionHours {
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl SessionHours {
    /// Whether `now` falls inside the session window.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.opens_at && now < self.closes_at
    }

    /// Seconds until the session opens. Zero if already open or past.
    pub fn seconds_until_open(&self, now: DateTime<Utc>) -> u64 {
        (self.opens_at - now).num_seconds().max(0) as u64
    }

    /// The session's trading date (UTC date of the open).
    pub fn date(&self) -> NaiveDate {
        self.opens_at.date_naive()
    }
}

impl fmt::Display for SessionHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opens {} closes {}", self.opens_at, self.closes_at)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SPREADHAWK.
#[derive(Debug, thiserror::Error)]
pub enum HawkError {
    #[error("Broker error: {0}")]
    Broker(String),

    #[error("Screener error: {0}")]
    Screener(String),

    #[error("Strategy error: {0}")]
    Strategy(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn quote(strike: f64, mark: f64, bid: f64, ask: f64, delta: f64) -> OptionQuote {
        OptionQuote {
            symbol: "XYZ".to_string(),
            expiration_date: "2026-10-16".to_string(),
            strike_price: strike,
            mark_price: mark,
            ask_price: ask,
            bid_price: bid,
            volume: 100.0,
            open_interest: 500.0,
            delta,
            gamma: 0.05,
            rho: 0.01,
            theta: -0.02,
            vega: 0.10,
        }
    }

    // -- OptionType --

    #[test]
    fn test_option_type_display_and_api_str() {
        assert_eq!(format!("{}", OptionType::Call), "call");
        assert_eq!(format!("{}", OptionType::Put), "put");
        assert_eq!(OptionType::Put.as_api_str(), "put");
    }

    #[test]
    fn test_option_type_from_str() {
        assert_eq!("call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!("PUTS".parse::<OptionType>().unwrap(), OptionType::Put);
        assert!("straddle".parse::<OptionType>().is_err());
    }

    // -- OptionQuote --

    #[test]
    fn test_quote_bid_ask_spread() {
        let q = quote(100.0, 1.50, 1.40, 1.60, 0.30);
        assert!((q.bid_ask_spread() - 0.20).abs() < 1e-10);
    }

    #[test]
    fn test_quote_display() {
        let q = quote(100.0, 1.50, 1.40, 1.60, 0.30);
        let s = format!("{q}");
        assert!(s.contains("XYZ"));
        assert!(s.contains("2026-10-16"));
    }

    // -- CandidateSpread --

    #[test]
    fn test_call_spread_math() {
        // Sell 100 call @ 1.50, buy 101 call @ 1.10, short delta 0.30
        let short = quote(100.0, 1.50, 1.40, 1.60, 0.30);
        let long = quote(101.0, 1.10, 1.00, 1.20, 0.25);
        let c = CandidateSpread::build(OptionType::Call, short, long).unwrap();

        assert!((c.strike_width - 1.0).abs() < 1e-10);
        assert!((c.limit_price - 0.40).abs() < 1e-10);
        assert!((c.trade_spread - 0.60).abs() < 1e-10); // 1.60 − 1.00
        assert!((c.spread_ratio - 0.60).abs() < 1e-10);
        assert!((c.avg_volume - 100.0).abs() < 1e-10);
        // E[$] = (1 − 0.30) × 0.40 = 0.28
        assert!((c.expected_dollar_return - 0.28).abs() < 1e-10);
        // E[%] = 0.28 / (1.0 − 0.40)
        assert!((c.expected_percent_return - 0.28 / 0.60).abs() < 1e-10);
    }

    #[test]
    fn test_put_spread_math() {
        // Sell 100 put @ 1.50 (delta −0.30), buy 99 put @ 1.10
        let short = quote(100.0, 1.50, 1.40, 1.60, -0.30);
        let long = quote(99.0, 1.10, 1.00, 1.20, -0.25);
        let c = CandidateSpread::build(OptionType::Put, short, long).unwrap();

        assert!((c.strike_width - 1.0).abs() < 1e-10);
        assert!((c.limit_price - 0.40).abs() < 1e-10);
        // E[$] = (1 + (−0.30)) × 0.40 = 0.28
        assert!((c.expected_dollar_return - 0.28).abs() < 1e-10);
        assert!((c.max_loss() - 0.60).abs() < 1e-10);
    }

    #[test]
    fn test_spread_rejects_inverted_strikes() {
        // Long strike below short strike is not a valid call spread
        let short = quote(101.0, 1.10, 1.00, 1.20, 0.25);
        let long = quote(100.0, 1.50, 1.40, 1.60, 0.30);
        assert!(CandidateSpread::build(OptionType::Call, short, long).is_none());
    }

    #[test]
    fn test_spread_rejects_zero_width() {
        let short = quote(100.0, 1.50, 1.40, 1.60, 0.30);
        let long = quote(100.0, 1.10, 1.00, 1.20, 0.25);
        assert!(CandidateSpread::build(OptionType::Call, short, long).is_none());
    }

    #[test]
    fn test_spread_rejects_zero_max_loss() {
        // Credit equal to width would divide by zero
        let short = quote(100.0, 2.10, 2.00, 2.20, 0.30);
        let long = quote(101.0, 1.10, 1.00, 1.20, 0.25);
        assert!(CandidateSpread::build(OptionType::Call, short, long).is_none());
    }

    #[test]
    fn test_spread_display() {
        let short = quote(100.0, 1.50, 1.40, 1.60, -0.30);
        let long = quote(99.0, 1.10, 1.00, 1.20, -0.25);
        let c = CandidateSpread::build(OptionType::Put, short, long).unwrap();
        let s = format!("{c}");
        assert!(s.contains("put credit spread"));
        assert!(s.contains("XYZ"));
    }

    // -- TradeRecord --

    #[test]
    fn test_trade_record_from_candidate() {
        let short = quote(100.0, 1.50, 1.40, 1.60, -0.30);
        let long = quote(99.0, 1.10, 1.00, 1.20, -0.25);
        let c = CandidateSpread::build(OptionType::Put, short, long).unwrap();
        let rec = TradeRecord::from_candidate(&c, "open-123", "close-456");

        assert_eq!(rec.symbol, "XYZ");
        assert_eq!(rec.trade_type, "put credit spread");
        assert_eq!(rec.trade_open_id, "open-123");
        assert_eq!(rec.trade_close_id, "close-456");
        assert!((rec.trade_strike_width - 1.0).abs() < 1e-10);
        assert!((rec.short_spread - 0.20).abs() < 1e-10);
    }

    #[test]
    fn test_trade_record_rounds_to_six_places() {
        let mut short = quote(100.0, 1.50, 1.40, 1.60, -0.333333333);
        short.vega = 0.123456789;
        let long = quote(99.0, 1.10, 1.00, 1.20, -0.25);
        let c = CandidateSpread::build(OptionType::Put, short, long).unwrap();
        let rec = TradeRecord::from_candidate(&c, "a", "b");
        assert!((rec.short_vega - 0.123457).abs() < 1e-12);
        assert!((rec.short_delta - (-0.333333)).abs() < 1e-12);
    }

    #[test]
    fn test_trade_record_serde_roundtrip() {
        let short = quote(100.0, 1.50, 1.40, 1.60, 0.30);
        let long = quote(101.0, 1.10, 1.00, 1.20, 0.25);
        let c = CandidateSpread::build(OptionType::Call, short, long).unwrap();
        let rec = TradeRecord::from_candidate(&c, "o", "c");
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rec);
    }

    // -- OrderState --

    #[test]
    fn test_order_state_terminal() {
        assert!(OrderState::Filled.is_terminal());
        assert!(OrderState::Cancelled.is_terminal());
        assert!(OrderState::Rejected.is_terminal());
        assert!(OrderState::Failed.is_terminal());
        assert!(!OrderState::Queued.is_terminal());
        assert!(!OrderState::Confirmed.is_terminal());
        assert!(!OrderState::PartiallyFilled.is_terminal());
    }

    #[test]
    fn test_order_state_from_str() {
        assert_eq!("filled".parse::<OrderState>().unwrap(), OrderState::Filled);
        assert_eq!("canceled".parse::<OrderState>().unwrap(), OrderState::Cancelled);
        assert_eq!("cancelled".parse::<OrderState>().unwrap(), OrderState::Cancelled);
        assert_eq!("Queued".parse::<OrderState>().unwrap(), OrderState::Queued);
        assert!("limbo".parse::<OrderState>().is_err());
    }

    #[test]
    fn test_order_state_display_roundtrip() {
        for s in [
            OrderState::Queued,
            OrderState::Unconfirmed,
            OrderState::Confirmed,
            OrderState::PartiallyFilled,
            OrderState::Filled,
            OrderState::Cancelled,
            OrderState::Rejected,
            OrderState::Failed,
        ] {
            let parsed: OrderState = format!("{s}").parse().unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn test_time_in_force_api_str() {
        assert_eq!(TimeInForce::Gfd.as_api_str(), "gfd");
        assert_eq!(TimeInForce::Gtc.as_api_str(), "gtc");
    }

    // -- Holding --

    #[test]
    fn test_holding_display() {
        let h = Holding {
            symbol: "MA".to_string(),
            quantity: 0.0123,
            percent_change: 0.015,
        };
        let s = format!("{h}");
        assert!(s.contains("MA"));
        assert!(s.contains("+1.50%"));
    }

    // -- SessionHours --

    #[test]
    fn test_session_contains() {
        let hours = SessionHours {
            opens_at: Utc.with_ymd_and_hms(2026, 8, 24, 13, 30, 0).unwrap(),
            closes_at: Utc.with_ymd_and_hms(2026, 8, 24, 20, 0, 0).unwrap(),
        };
        assert!(hours.contains(Utc.with_ymd_and_hms(2026, 8, 24, 15, 0, 0).unwrap()));
        assert!(!hours.contains(Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()));
        // Close boundary is exclusive
        assert!(!hours.contains(hours.closes_at));
        // Open boundary is inclusive
        assert!(hours.contains(hours.opens_at));
    }

    #[test]
    fn test_session_seconds_until_open() {
        let hours = SessionHours {
            opens_at: Utc.with_ymd_and_hms(2026, 8, 24, 13, 30, 0).unwrap(),
            closes_at: Utc.with_ymd_and_hms(2026, 8, 24, 20, 0, 0).unwrap(),
        };
        let before = Utc.with_ymd_and_hms(2026, 8, 24, 13, 0, 0).unwrap();
        assert_eq!(hours.seconds_until_open(before), 1800);
        let after = Utc.with_ymd_and_hms(2026, 8, 24, 14, 0, 0).unwrap();
        assert_eq!(hours.seconds_until_open(after), 0);
    }

    // -- HawkError --

    #[test]
    fn test_error_display() {
        let e = HawkError::Broker("session expired".to_string());
        assert_eq!(format!("{e}"), "Broker error: session expired");
    }
}
