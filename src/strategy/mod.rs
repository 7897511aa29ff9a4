//! Strategy layer — pure threshold rules over in-memory market data.
//!
//! Credit-spread candidate selection lives in `spread`; the 52-week-high
//! momentum rules live in `momentum`. Both are side-effect free so they
//! can be unit-tested without a brokerage session.

pub mod momentum;
pub mod spread;
