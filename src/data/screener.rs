//! Implied-volatility screener.
//!
//! Pulls the most-active options tickers from Barchart's public
//! core-api quotes endpoint. The endpoint sits behind a cookie/XSRF
//! dance: a plain GET of the home page issues the session cookies, and
//! the `XSRF-TOKEN` cookie must be URL-decoded and echoed back as the
//! `X-XSRF-TOKEN` header on the API request.
//!
//! The feed sometimes reports IV rank in percent rather than as a
//! fraction; `normalize` rescales and then hard-validates the bounds.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::SpreadConfig;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const HOME_URL: &str = "https://www.barchart.com";
const API_URL: &str = "https://www.barchart.com/proxies/core-api/v1/quotes/get";

/// The endpoint rejects non-browser agents.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:86.0) Gecko/20100101 Firefox/86.0";

const FIELDS: &str = "symbol,symbolName,lastPrice,priceChange,percentChange,\
optionsTotalVolume,optionsWeightedImpliedVolatility,optionsImpliedVolatilityRank1y,\
optionsImpliedVolatilityPercentile1y,optionsWeightedImpliedVolatilityHigh1y,\
tradeTime,symbolCode,symbolType,hasOptions";

const LISTS: &str = "options.mostActive.us,options.mostActive.etf";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: Vec<QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    raw: RawQuote,
}

/// The `raw` block of each screener row. Only the fields the strategy
/// filters on are deserialized.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    symbol: String,
    #[serde(default)]
    last_price: Option<f64>,
    #[serde(default)]
    options_total_volume: Option<f64>,
    #[serde(default)]
    options_implied_volatility_rank1y: Option<f64>,
    #[serde(default)]
    options_implied_volatility_percentile1y: Option<f64>,
}

/// One screener row after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct IvScreenerRow {
    pub symbol: String,
    pub last_price: f64,
    pub options_total_volume: f64,
    /// 1-year IV rank, fraction in [0, 1].
    pub iv_rank_1y: f64,
    /// 1-year IV percentile, fraction in [0, 1].
    pub iv_percentile_1y: f64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Screener client. Holds a cookie-enabled HTTP session.
pub struct IvScreener {
    http: Client,
}

impl IvScreener {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client for IV screener")?;
        Ok(Self { http })
    }

    /// Fetch and normalize the current screener table.
    pub async fn fetch(&self) -> Result<Vec<IvScreenerRow>> {
        // Prime the session: the home page sets the XSRF cookie.
        let home = self
            .http
            .get(HOME_URL)
            .send()
            .await
            .context("Screener cookie request failed")?;

        let xsrf_raw = home
            .cookies()
            .find(|c| c.name() == "XSRF-TOKEN")
            .map(|c| c.value().to_string())
            .context("Screener did not set an XSRF-TOKEN cookie")?;
        let xsrf = urlencoding::decode(&xsrf_raw)
            .context("Failed to URL-decode XSRF token")?
            .into_owned();

        debug!("Screener session primed");

        let resp = self
            .http
            .get(API_URL)
            .header("X-XSRF-TOKEN", xsrf)
            .query(&[
                ("fields", FIELDS),
                ("list", LISTS),
                ("meta", "field.shortName,field.type,field.description"),
                ("hasOptions", "true"),
                ("raw", "1"),
            ])
            .send()
            .await
            .context("Screener API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Screener API error {status}: {body}");
        }

        let quotes: QuotesResponse = resp
            .json()
            .await
            .context("Failed to parse screener response")?;

        let rows = normalize(quotes.data.into_iter().map(|e| e.raw).collect())?;
        info!(rows = rows.len(), "IV screener fetched");
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Normalization & filtering
// ---------------------------------------------------------------------------

/// Clean raw screener rows.
///
/// Rows missing any filtered-on field are dropped. If the feed reports
/// IV rank in percent (max > 1) every rank is divided by 100. After
/// rescaling, rank and percentile must both lie in [0, 1] or the whole
/// batch is rejected.
fn normalize(raw: Vec<RawQuote>) -> Result<Vec<IvScreenerRow>> {
    let mut rows: Vec<IvScreenerRow> = raw
        .into_iter()
        .filter_map(|r| {
            Some(IvScreenerRow {
                symbol: r.symbol,
                last_price: r.last_price?,
                options_total_volume: r.options_total_volume?,
                iv_rank_1y: r.options_implied_volatility_rank1y?,
                iv_percentile_1y: r.options_implied_volatility_percentile1y?,
            })
        })
        .collect();

    let max_rank = rows.iter().map(|r| r.iv_rank_1y).fold(f64::MIN, f64::max);
    if max_rank > 1.0 {
        for r in &mut rows {
            r.iv_rank_1y /= 100.0;
        }
    }

    for r in &rows {
        anyhow::ensure!(
            (0.0..=1.0).contains(&r.iv_rank_1y),
            "optionsImpliedVolatilityRank1y not bounded by [0,1] for {}",
            r.symbol
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&r.iv_percentile_1y),
            "optionsImpliedVolatilityPercentile1y not bounded by [0,1] for {}",
            r.symbol
        );
    }

    Ok(rows)
}

/// The ticker universe for a spread pass: symbols whose IV rank,
/// IV percentile, and total option volume all clear the configured
/// floors.
pub fn high_iv_symbols(rows: &[IvScreenerRow], cfg: &SpreadConfig) -> Vec<String> {
    rows.iter()
        .filter(|r| r.iv_rank_1y > cfg.iv_rank_min)
        .filter(|r| r.iv_percentile_1y > cfg.iv_percentile_min)
        .filter(|r| r.options_total_volume > cfg.total_option_volume_min)
        .map(|r| r.symbol.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
