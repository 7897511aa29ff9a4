//! Credit-spread candidate selection.
//!
//! A filter/rank/reduce over one expiration's option chain, re-run from
//! scratch on every polling iteration:
//!
//! 1. Short-leg candidates: delta within tolerance of the target, with
//!    minimum volume and open interest. Ties broken by maximum volume.
//! 2. Long leg: the adjacent strike on the hedging side (above for
//!    calls, below for puts).
//! 3. Derived metrics computed by `CandidateSpread::build`.
//! 4. Final cut by maximum strike width and minimum expected percent
//!    return; the highest average-volume survivor wins.

use tracing::debug;

use crate::config::SpreadConfig;
use crate::types::{CandidateSpread, OptionQuote, OptionType};

/// Select the short leg from a chain: contracts whose delta is within
/// `delta_tolerance` of the signed target delta, with volume and open
/// interest above the floors. Returns the highest-volume match.
///
/// The target is stored unsigned in config; puts carry negative deltas,
/// so the sign is applied per option type here.
pub fn select_short_leg(
    chain: &[OptionQuote],
    option_type: OptionType,
    cfg: &SpreadConfig,
) -> Option<OptionQuote> {
    let signed_target = match option_type {
        OptionType::Call => cfg.target_delta,
        OptionType::Put => -cfg.target_delta,
    };

    chain
        .iter()
        .filter(|q| (q.delta - signed_target).abs() <= cfg.delta_tolerance)
        .filter(|q| q.volume >= cfg.option_volume_min)
        .filter(|q| q.open_interest >= cfg.option_open_interest_min)
        .max_by(|a, b| a.volume.total_cmp(&b.volume))
        .cloned()
}

/// Pick the long (hedging) leg: the nearest strike strictly above the
/// short strike for calls, strictly below for puts.
pub fn select_long_leg(
    chain: &[OptionQuote],
    option_type: OptionType,
    short_strike: f64,
) -> Option<OptionQuote> {
    match option_type {
        OptionType::Call => chain
            .iter()
            .filter(|q| q.strike_price > short_strike)
            .min_by(|a, b| a.strike_price.total_cmp(&b.strike_price))
            .cloned(),
        OptionType::Put => chain
            .iter()
            .filter(|q| q.strike_price < short_strike)
            .max_by(|a, b| a.strike_price.total_cmp(&b.strike_price))
            .cloned(),
    }
}

/// Build the single candidate spread for one ticker's chain, if the
/// chain yields a valid short/long pair.
pub fn candidate_from_chain(
    chain: &[OptionQuote],
    option_type: OptionType,
    cfg: &SpreadConfig,
) -> Option<CandidateSpread> {
    if chain.is_empty() {
        return None;
    }

    let short = select_short_leg(chain, option_type, cfg)?;
    let long = select_long_leg(chain, option_type, short.strike_price)?;

    let candidate = CandidateSpread::build(option_type, short, long);
    if let Some(ref c) = candidate {
        debug!(candidate = %c, "Candidate built");
    }
    candidate
}

/// Apply the final trade filter and pick the best survivor.
///
/// Keeps candidates with strike width at or below the cap and expected
/// percent return strictly above the floor, then takes the one with the
/// highest average trade volume.
pub fn select_trade(candidates: Vec<CandidateSpread>, cfg: &SpreadConfig) -> Option<CandidateSpread> {
    candidates
        .into_iter()
        .filter(|c| c.strike_width <= cfg.max_strike_width)
        .filter(|c| c.expected_percent_return > cfg.min_percent_return)
        .max_by(|a, b| a.avg_volume.total_cmp(&b.avg_volume))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SpreadConfig {
        SpreadConfig::default()
    }

    fn q(strike: f64, mark: f64, delta: f64, volume: f64, oi: f64) -> OptionQuote {
        OptionQuote {
            symbol: "XYZ".to_string(),
            expiration_date: "2026-10-16".to_string(),
            strike_price: strike,
            mark_price: mark,
            ask_price: mark + 0.05,
            bid_price: mark - 0.05,
            volume,
            open_interest: oi,
            delta,
            gamma: 0.05,
            rho: 0.01,
            theta: -0.02,
            vega: 0.10,
        }
    }

    // -- Short leg --

    #[test]
    fn test_short_leg_put_delta_window() {
        // target 0.30 → signed −0.30, tolerance 0.025
        let chain = vec![
            q(95.0, 0.80, -0.20, 500.0, 1000.0),  // delta too far
            q(100.0, 1.20, -0.31, 500.0, 1000.0), // in window
            q(105.0, 1.90, -0.45, 900.0, 1000.0), // delta too far
        ];
        let short = select_short_leg(&chain, OptionType::Put, &cfg()).unwrap();
        assert!((short.strike_price - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_short_leg_call_delta_window() {
        let chain = vec![
            q(100.0, 1.20, 0.305, 500.0, 1000.0),
            q(105.0, 0.60, 0.15, 900.0, 1000.0),
        ];
        let short = select_short_leg(&chain, OptionType::Call, &cfg()).unwrap();
        assert!((short.strike_price - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_short_leg_ties_broken_by_volume() {
        let chain = vec![
            q(100.0, 1.20, 0.30, 200.0, 1000.0),
            q(101.0, 1.10, 0.29, 800.0, 1000.0), // both in window, more volume
        ];
        let short = select_short_leg(&chain, OptionType::Call, &cfg()).unwrap();
        assert!((short.strike_price - 101.0).abs() < 1e-10);
    }

    #[test]
    fn test_short_leg_volume_floor() {
        let chain = vec![q(100.0, 1.20, 0.30, 5.0, 1000.0)]; // volume below 10
        assert!(select_short_leg(&chain, OptionType::Call, &cfg()).is_none());
    }

    #[test]
    fn test_short_leg_open_interest_floor() {
        let chain = vec![q(100.0, 1.20, 0.30, 500.0, 50.0)]; // OI below 100
        assert!(select_short_leg(&chain, OptionType::Call, &cfg()).is_none());
    }

    // -- Long leg --

    #[test]
    fn test_long_leg_call_nearest_above() {
        let chain = vec![
            q(100.0, 1.20, 0.30, 500.0, 1000.0),
            q(101.0, 1.00, 0.25, 100.0, 1000.0),
            q(102.5, 0.80, 0.20, 100.0, 1000.0),
        ];
        let long = select_long_leg(&chain, OptionType::Call, 100.0).unwrap();
        assert!((long.strike_price - 101.0).abs() < 1e-10);
    }

    #[test]
    fn test_long_leg_put_nearest_below() {
        let chain = vec![
            q(97.5, 0.80, -0.20, 100.0, 1000.0),
            q(99.0, 1.00, -0.25, 100.0, 1000.0),
            q(100.0, 1.20, -0.30, 500.0, 1000.0),
        ];
        let long = select_long_leg(&chain, OptionType::Put, 100.0).unwrap();
        assert!((long.strike_price - 99.0).abs() < 1e-10);
    }

    #[test]
    fn test_long_leg_none_when_short_is_edge_strike() {
        let chain = vec![q(100.0, 1.20, 0.30, 500.0, 1000.0)];
        assert!(select_long_leg(&chain, OptionType::Call, 100.0).is_none());
        assert!(select_long_leg(&chain, OptionType::Put, 100.0).is_none());
    }

    // -- Candidate from chain --

    #[test]
    fn test_candidate_from_chain_put() {
        let chain = vec![
            q(99.0, 0.90, -0.25, 120.0, 800.0),
            q(100.0, 1.20, -0.30, 500.0, 1000.0),
            q(101.0, 1.60, -0.35, 300.0, 1000.0),
        ];
        let c = candidate_from_chain(&chain, OptionType::Put, &cfg()).unwrap();
        assert!((c.short.strike_price - 100.0).abs() < 1e-10);
        assert!((c.long.strike_price - 99.0).abs() < 1e-10);
        assert!((c.strike_width - 1.0).abs() < 1e-10);
        assert!((c.limit_price - 0.30).abs() < 1e-10);
    }

    #[test]
    fn test_candidate_from_empty_chain() {
        assert!(candidate_from_chain(&[], OptionType::Put, &cfg()).is_none());
    }

    #[test]
    fn test_candidate_none_without_hedging_strike() {
        // Only one strike in the chain — no long leg available
        let chain = vec![q(100.0, 1.20, -0.30, 500.0, 1000.0)];
        assert!(candidate_from_chain(&chain, OptionType::Put, &cfg()).is_none());
    }

    // -- Final selection --

    fn candidate(width: f64, pct_return: f64, avg_volume: f64) -> CandidateSpread {
        // Reverse-engineer leg prices to yield the requested metrics:
        // limit chosen so that pct = E[$]/(width − limit) with delta −0.30.
        // pct = 0.7·limit/(width − limit) → limit = pct·width/(0.7 + pct)
        let limit = pct_return * width / (0.7 + pct_return);
        let short = q(100.0, 1.0 + limit, -0.30, avg_volume, 1000.0);
        let long = q(100.0 - width, 1.0, -0.25, avg_volume, 1000.0);
        CandidateSpread::build(OptionType::Put, short, long).unwrap()
    }

    #[test]
    fn test_select_trade_filters_width() {
        let wide = candidate(2.0, 0.5, 900.0);
        let narrow = candidate(1.0, 0.5, 100.0);
        let picked = select_trade(vec![wide, narrow], &cfg()).unwrap();
        assert!((picked.strike_width - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_trade_filters_percent_return() {
        let low = candidate(1.0, 0.1, 900.0); // below 0.3 floor
        let ok = candidate(1.0, 0.5, 100.0);
        let picked = select_trade(vec![low, ok], &cfg()).unwrap();
        assert!(picked.expected_percent_return > 0.3);
    }

    #[test]
    fn test_select_trade_percent_return_floor_is_strict() {
        // Exactly at the floor is excluded (strictly greater required)
        let at_floor = candidate(1.0, 0.3, 900.0);
        assert!((at_floor.expected_percent_return - 0.3).abs() < 1e-9);
        assert!(select_trade(vec![at_floor], &cfg()).is_none());
    }

    #[test]
    fn test_select_trade_prefers_highest_avg_volume() {
        let a = candidate(1.0, 0.5, 100.0);
        let b = candidate(1.0, 0.4, 700.0);
        let c = candidate(1.0, 0.6, 300.0);
        let picked = select_trade(vec![a, b, c], &cfg()).unwrap();
        assert!((picked.avg_volume - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_trade_empty() {
        assert!(select_trade(Vec::new(), &cfg()).is_none());
    }
}
