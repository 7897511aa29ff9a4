//! SPREADHAWK — Automated Credit-Spread Trading Agent
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod broker;
pub mod config;
pub mod data;
pub mod engine;
pub mod ledger;
pub mod strategy;
pub mod types;
