//! External market-data sources beyond the brokerage itself.
//!
//! Currently a single provider: the implied-volatility screener used to
//! build the daily ticker universe for the spread strategies.

pub mod screener;
