//! 52-week-high momentum rules.
//!
//! Buy when a ticker's day high is within a configured fraction of its
//! 52-week high; close any holding that moves past the profit target or
//! stop loss. Both checks are plain threshold comparisons.

use crate::config::MomentumConfig;
use crate::types::{Fundamentals, Holding};

/// What to do with an open holding this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    Hold,
    TakeProfit,
    StopLoss,
}

/// Buy signal: day high at or above `percent_of_high` × 52-week high.
pub fn near_52_week_high(f: &Fundamentals, cfg: &MomentumConfig) -> bool {
    if f.high_52_weeks <= 0.0 {
        return false;
    }
    f.high >= cfg.percent_of_high * f.high_52_weeks
}

/// Exit rule for an open holding.
pub fn exit_action(holding: &Holding, cfg: &MomentumConfig) -> ExitAction {
    if holding.percent_change >= cfg.profit_target {
        ExitAction::TakeProfit
    } else if holding.percent_change <= cfg.stop_loss {
        ExitAction::StopLoss
    } else {
        ExitAction::Hold
    }
}
