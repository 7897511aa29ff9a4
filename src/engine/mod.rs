//! Trading engines — the session loops that tie data, strategy, broker,
//! and ledger together.

pub mod hours;
pub mod momentum_trader;
pub mod spread_trader;
