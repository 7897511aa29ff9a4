//! Trade ledger.
//!
//! Appends filled spreads to a CSV file, one flattened `TradeRecord`
//! per row. The file is the system's only persisted state; a missing
//! file is an empty ledger. Appends deduplicate on exact row equality
//! so a re-run over the same fill is harmless.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::types::TradeRecord;

/// Default ledger file path.
const DEFAULT_LEDGER_FILE: &str = "credit_spreads.csv";

/// Load all recorded trades. A missing file yields an empty vec.
pub fn load_trades(path: Option<&str>) -> Result<Vec<TradeRecord>> {
    let path = path.unwrap_or(DEFAULT_LEDGER_FILE);

    if !Path::new(path).exists() {
        debug!(path, "No ledger file yet, starting empty");
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .context(format!("Failed to open ledger at {path}"))?;

    let mut trades = Vec::new();
    for row in reader.deserialize() {
        let record: TradeRecord =
            row.context(format!("Failed to parse ledger row in {path}"))?;
        trades.push(record);
    }

    debug!(path, trades = trades.len(), "Ledger loaded");
    Ok(trades)
}

/// Append a trade and rewrite the ledger.
///
/// The whole file is rewritten from the deduplicated in-memory set, so
/// the header stays single and an identical record is never stored
/// twice.
pub fn append_trade(record: &TradeRecord, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_LEDGER_FILE);

    let mut trades = load_trades(Some(path))?;
    if trades.contains(record) {
        info!(
            path,
            symbol = %record.symbol,
            open_id = %record.trade_open_id,
            "Trade already in ledger, skipping"
        );
        return Ok(());
    }
    trades.push(record.clone());

    // Rewrite via a sibling temp file and rename, so a crash mid-write
    // never truncates the existing history.
    let tmp = format!("{path}.tmp");
    let mut writer = csv::Writer::from_path(&tmp)
        .context(format!("Failed to open ledger for writing at {tmp}"))?;
    for trade in &trades {
        writer
            .serialize(trade)
            .context(format!("Failed to write ledger row to {tmp}"))?;
    }
    writer
        .flush()
        .context(format!("Failed to flush ledger at {tmp}"))?;
    drop(writer);
    std::fs::rename(&tmp, path)
        .context(format!("Failed to move ledger into place at {path}"))?;

    info!(
        path,
        symbol = %record.symbol,
        trade_type = %record.trade_type,
        limit = record.trade_limit_price,
        "Trade recorded"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateSpread, OptionQuote, OptionType};

    fn temp_path() -> String {
        let mut p = std::env::temp_dir();
        p.push(format!("spreadhawk_test_ledger_{}.csv", uuid::Uuid::new_v4()));
        p.to_string_lossy().to_string()
    }

    fn record(symbol: &str, open_id: &str) -> TradeRecord {
        let short = OptionQuote {
            symbol: symbol.to_string(),
            expiration_date: "2026-10-16".to_string(),
            strike_price: 100.0,
            mark_price: 1.50,
            ask_price: 1.60,
            bid_price: 1.40,
            volume: 250.0,
            open_interest: 1200.0,
            delta: -0.30,
            gamma: 0.05,
            rho: 0.01,
            theta: -0.02,
            vega: 0.10,
        };
        let mut long = short.clone();
        long.strike_price = 99.0;
        long.mark_price = 1.10;
        long.bid_price = 1.00;
        long.ask_price = 1.20;
        long.delta = -0.25;
        let c = CandidateSpread::build(OptionType::Put, short, long).unwrap();
        TradeRecord::from_candidate(&c, open_id, "close-1")
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let trades = load_trades(Some("/tmp/spreadhawk_no_such_ledger.csv")).unwrap();
        assert!(trades.is_empty());
    }

    #[test]
    fn test_append_and_load() {
        let path = temp_path();
        append_trade(&record("SPY", "open-1"), Some(&path)).unwrap();

        let trades = load_trades(Some(&path)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].symbol, "SPY");
        assert_eq!(trades[0].trade_open_id, "open-1");
        assert_eq!(trades[0].trade_type, "put credit spread");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_accumulates() {
        let path = temp_path();
        append_trade(&record("SPY", "open-1"), Some(&path)).unwrap();
        append_trade(&record("QQQ", "open-2"), Some(&path)).unwrap();

        let trades = load_trades(Some(&path)).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].symbol, "SPY");
        assert_eq!(trades[1].symbol, "QQQ");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_duplicate_append_skipped() {
        let path = temp_path();
        let rec = record("SPY", "open-1");
        append_trade(&rec, Some(&path)).unwrap();
        append_trade(&rec, Some(&path)).unwrap();

        let trades = load_trades(Some(&path)).unwrap();
        assert_eq!(trades.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_same_symbol_different_order_ids_both_kept() {
        let path = temp_path();
        append_trade(&record("SPY", "open-1"), Some(&path)).unwrap();
        append_trade(&record("SPY", "open-2"), Some(&path)).unwrap();

        let trades = load_trades(Some(&path)).unwrap();
        assert_eq!(trades.len(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_leaves_no_temp_file() {
        let path = temp_path();
        append_trade(&record("SPY", "open-1"), Some(&path)).unwrap();
        append_trade(&record("QQQ", "open-2"), Some(&path)).unwrap();

        assert!(!Path::new(&format!("{path}.tmp")).exists());
        assert_eq!(load_trades(Some(&path)).unwrap().len(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_roundtrip_preserves_numeric_fields() {
        let path = temp_path();
        let rec = record("XYZ", "open-9");
        append_trade(&rec, Some(&path)).unwrap();

        let trades = load_trades(Some(&path)).unwrap();
        assert_eq!(trades[0], rec);

        std::fs::remove_file(&path).unwrap();
    }
}
