//! Robinhood private-API integration.
//!
//! OAuth password grant with a TOTP MFA code, then bearer-token calls
//! against the REST endpoints the strategies need: market hours,
//! fundamentals, option chains (instrument lookup joined with market
//! data), option orders, equity positions, and fractional orders.
//!
//! The API returns most numeric fields as strings; rows that fail to
//! parse are skipped rather than failing the whole fetch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::RwLock;
use tracing::{debug, info, warn};

use super::{totp, Brokerage};
use crate::types::{
    CandidateSpread, Fundamentals, Holding, OptionQuote, OptionType, OrderState, SessionHours,
    TimeInForce,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const API_BASE: &str = "https://api.robinhood.com";
const BROKER_NAME: &str = "robinhood";

/// OAuth client id of the public web frontend.
const CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

/// Session lifetime requested at login (24 h).
const TOKEN_EXPIRES_SECS: u64 = 86_400;

/// Equities market used for session hours (NYSE).
const MARKET_MIC: &str = "XNYS";

// ---------------------------------------------------------------------------
// API response types (Robinhood JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Generic paginated list wrapper.
#[derive(Debug, Deserialize)]
struct Paginated<T> {
    results: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketHoursPayload {
    is_open: bool,
    #[serde(default)]
    opens_at: Option<DateTime<Utc>>,
    #[serde(default)]
    closes_at: Option<DateTime<Utc>>,
    #[serde(default)]
    next_open_hours: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketPayload {
    todays_hours: String,
}

#[derive(Debug, Deserialize)]
struct FundamentalsPayload {
    #[serde(default)]
    high: Option<String>,
    #[serde(default)]
    high_52_weeks: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChainPayload {
    id: String,
}

/// Option instrument record: identity of one contract.
#[derive(Debug, Deserialize)]
struct InstrumentPayload {
    url: String,
    strike_price: String,
    expiration_date: String,
}

/// Market-data record for one contract. Prices and greeks arrive as
/// strings, volume and open interest as numbers.
#[derive(Debug, Deserialize)]
struct MarketDataPayload {
    instrument: String,
    #[serde(default)]
    mark_price: Option<String>,
    #[serde(default)]
    ask_price: Option<String>,
    #[serde(default)]
    bid_price: Option<String>,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    open_interest: Option<f64>,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    gamma: Option<String>,
    #[serde(default)]
    rho: Option<String>,
    #[serde(default)]
    theta: Option<String>,
    #[serde(default)]
    vega: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OptionOrderPayload {
    id: String,
    state: String,
}

/// A historical option order, as returned by the orders list endpoint.
#[derive(Debug, Deserialize)]
struct OptionOrderHistoryPayload {
    state: String,
    #[serde(default)]
    opening_strategy: Option<String>,
    #[serde(default)]
    chain_symbol: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PositionPayload {
    instrument: String,
    quantity: String,
    average_buy_price: String,
}

#[derive(Debug, Deserialize)]
struct EquityInstrumentPayload {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    last_trade_price: String,
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    url: String,
}

#[derive(Debug, Deserialize)]
struct EquityOrderPayload {
    id: String,
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Round a limit price to whole cents before submission.
fn round_to_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

fn parse_opt_f64(s: &Option<String>) -> Option<f64> {
    s.as_deref().and_then(|v| v.parse::<f64>().ok())
}

/// Join one instrument record with its market data into an
/// `OptionQuote`. Returns `None` when any required field is missing or
/// unparseable — partial rows are dropped, not errors.
fn join_quote(
    symbol: &str,
    instrument: &InstrumentPayload,
    data: &MarketDataPayload,
) -> Option<OptionQuote> {
    Some(OptionQuote {
        symbol: symbol.to_string(),
        expiration_date: instrument.expiration_date.clone(),
        strike_price: instrument.strike_price.parse().ok()?,
        mark_price: parse_opt_f64(&data.mark_price)?,
        ask_price: parse_opt_f64(&data.ask_price)?,
        bid_price: parse_opt_f64(&data.bid_price)?,
        volume: data.volume?,
        open_interest: data.open_interest?,
        delta: parse_opt_f64(&data.delta)?,
        gamma: parse_opt_f64(&data.gamma)?,
        rho: parse_opt_f64(&data.rho)?,
        theta: parse_opt_f64(&data.theta)?,
        vega: parse_opt_f64(&data.vega)?,
    })
}

/// Orders come back newest first, so once a page's oldest entry falls
/// before the cutoff no later page can contain an in-window fill.
fn page_past_cutoff(page: &[OptionOrderHistoryPayload], cutoff: DateTime<Utc>) -> bool {
    page.last().is_some_and(|o| o.updated_at < cutoff)
}

/// Symbols with a filled opening order of the given type within the
/// lookback window.
fn recent_open_symbols(
    orders: &[OptionOrderHistoryPayload],
    option_type: OptionType,
    day_lag: i64,
    now: DateTime<Utc>,
) -> Vec<String> {
    let cutoff = now - chrono::Duration::days(day_lag);
    let wanted = option_type.as_api_str();

    let mut symbols: Vec<String> = orders
        .iter()
        .filter(|o| o.state == "filled")
        .filter(|o| o.updated_at >= cutoff)
        .filter(|o| {
            o.opening_strategy
                .as_deref()
                .is_some_and(|s| s.contains(wanted))
        })
        .filter_map(|o| o.chain_symbol.clone())
        .collect();

    symbols.sort();
    symbols.dedup();
    symbols
}

/// Build the JSON body for a two-leg spread order.
///
/// `opening` selects open/sell-short (credit) vs close/buy-back (debit)
/// leg roles; direction and position effects flip together.
fn spread_order_body(
    candidate: &CandidateSpread,
    opening: bool,
    limit_price: f64,
    time_in_force: TimeInForce,
    account_url: &str,
) -> serde_json::Value {
    let opt = candidate.option_type.as_api_str();
    let (direction, short_side, long_side, effect) = if opening {
        ("credit", "sell", "buy", "open")
    } else {
        ("debit", "buy", "sell", "close")
    };

    serde_json::json!({
        "account": account_url,
        "direction": direction,
        "time_in_force": time_in_force.as_api_str(),
        "legs": [
            {
                "expiration_date": candidate.short.expiration_date,
                "strike": candidate.short.strike_price,
                "option_type": opt,
                "position_effect": effect,
                "side": short_side,
                "ratio_quantity": 1,
            },
            {
                "expiration_date": candidate.long.expiration_date,
                "strike": candidate.long.strike_price,
                "option_type": opt,
                "position_effect": effect,
                "side": long_side,
                "ratio_quantity": 1,
            },
        ],
        "type": "limit",
        "trigger": "immediate",
        "price": round_to_cents(limit_price),
        "quantity": 1,
        "chain_symbol": candidate.short.symbol,
        "ref_id": uuid::Uuid::new_v4().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Robinhood API client. Session token and cached account URL live
/// behind locks so the `Brokerage` methods can take `&self`.
pub struct RobinhoodClient {
    http: Client,
    username: String,
    password: SecretString,
    mfa_secret: Option<SecretString>,
    device_token: String,
    token: RwLock<Option<String>>,
    account_url: RwLock<Option<String>>,
}

impl RobinhoodClient {
    pub fn new(
        username: String,
        password: SecretString,
        mfa_secret: Option<SecretString>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("spreadhawk/0.1.0")
            .build()
            .context("Failed to build HTTP client for Robinhood")?;

        Ok(Self {
            http,
            username,
            password,
            mfa_secret,
            device_token: uuid::Uuid::new_v4().to_string(),
            token: RwLock::new(None),
            account_url: RwLock::new(None),
        })
    }

    // -- Internal helpers ------------------------------------------------

    fn bearer(&self) -> Result<String> {
        let guard = self.token.read().expect("token lock poisoned");
        let token = guard.as_ref().context("Not logged in")?;
        Ok(format!("Bearer {token}"))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .header("Authorization", self.bearer()?)
            .send()
            .await
            .with_context(|| format!("Robinhood GET {url} failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Robinhood API error {status} on {url}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse Robinhood response from {url}"))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let resp = self
            .http
            .post(url)
            .header("Authorization", self.bearer()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Robinhood POST {url} failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Robinhood API error {status} on {url}: {text}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse Robinhood response from {url}"))
    }

    /// Primary account URL, fetched once and cached for order bodies.
    async fn account(&self) -> Result<String> {
        if let Some(url) = self.account_url.read().expect("account lock poisoned").clone() {
            return Ok(url);
        }
        let accounts: Paginated<AccountPayload> =
            self.get_json(&format!("{API_BASE}/accounts/")).await?;
        let url = accounts
            .results
            .first()
            .context("No brokerage account on this login")?
            .url
            .clone();
        *self.account_url.write().expect("account lock poisoned") = Some(url.clone());
        Ok(url)
    }

    /// Chain id for an underlying symbol.
    async fn chain_id(&self, symbol: &str) -> Result<Option<String>> {
        let chains: Paginated<ChainPayload> = self
            .get_json(&format!(
                "{API_BASE}/options/chains/?equity_symbol={}",
                urlencoding::encode(symbol)
            ))
            .await?;
        Ok(chains.results.into_iter().next().map(|c| c.id))
    }

    /// All active instruments for one chain/expiration/type, following
    /// pagination.
    async fn chain_instruments(
        &self,
        chain_id: &str,
        expiration_date: &str,
        option_type: OptionType,
    ) -> Result<Vec<InstrumentPayload>> {
        let mut url = format!(
            "{API_BASE}/options/instruments/?chain_id={chain_id}\
             &expiration_dates={expiration_date}&type={}&state=active",
            option_type.as_api_str()
        );
        let mut instruments = Vec::new();
        loop {
            let page: Paginated<InstrumentPayload> = self.get_json(&url).await?;
            instruments.extend(page.results);
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(instruments)
    }
}

// ---------------------------------------------------------------------------
// Brokerage trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl Brokerage for RobinhoodClient {
    /// OAuth password-grant login with a TOTP MFA code when a seed is
    /// configured.
    async fn login(&self) -> Result<()> {
        let mut body = serde_json::json!({
            "grant_type": "password",
            "client_id": CLIENT_ID,
            "scope": "internal",
            "username": self.username,
            "password": self.password.expose_secret(),
            "expires_in": TOKEN_EXPIRES_SECS,
            "device_token": self.device_token,
            "challenge_type": "sms",
        });

        if let Some(ref seed) = self.mfa_secret {
            body["mfa_code"] = serde_json::Value::String(totp::current_code(seed)?);
        }

        let resp = self
            .http
            .post(format!("{API_BASE}/oauth2/token/"))
            .json(&body)
            .send()
            .await
            .context("Robinhood login request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Robinhood login failed {status}: {text}");
        }

        let token: TokenResponse = resp
            .json()
            .await
            .context("Failed to parse Robinhood token response")?;

        *self.token.write().expect("token lock poisoned") = Some(token.access_token);
        info!(username = %self.username, "Robinhood login successful");
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let token = self.token.write().expect("token lock poisoned").take();
        if let Some(token) = token {
            let body = serde_json::json!({
                "client_id": CLIENT_ID,
                "token": token,
            });
            // Best-effort revoke; session also expires server-side.
            if let Err(e) = self
                .http
                .post(format!("{API_BASE}/oauth2/revoke_token/"))
                .json(&body)
                .send()
                .await
            {
                warn!(error = %e, "Token revoke request failed");
            }
        }
        info!("Robinhood logout successful");
        Ok(())
    }

    /// Today's session if it is still ahead of us, otherwise follow the
    /// `next_open_hours` link until an open session is found.
    async fn next_open_hours(&self) -> Result<SessionHours> {
        let market: MarketPayload = self
            .get_json(&format!("{API_BASE}/markets/{MARKET_MIC}/"))
            .await?;

        let mut hours: MarketHoursPayload = self.get_json(&market.todays_hours).await?;

        loop {
            if hours.is_open {
                if let (Some(opens_at), Some(closes_at)) = (hours.opens_at, hours.closes_at) {
                    if closes_at > Utc::now() {
                        return Ok(SessionHours { opens_at, closes_at });
                    }
                }
            }
            let next = hours
                .next_open_hours
                .context("Market hours payload had no next_open_hours link")?;
            debug!(url = %next, "Following next_open_hours");
            hours = self.get_json(&next).await?;
        }
    }

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let payload: Paginated<FundamentalsPayload> = self
            .get_json(&format!(
                "{API_BASE}/fundamentals/?symbols={}",
                urlencoding::encode(symbol)
            ))
            .await?;

        let first = payload
            .results
            .into_iter()
            .next()
            .with_context(|| format!("No fundamentals for {symbol}"))?;

        Ok(Fundamentals {
            symbol: symbol.to_string(),
            high: parse_opt_f64(&first.high)
                .with_context(|| format!("Unparseable day high for {symbol}"))?,
            high_52_weeks: parse_opt_f64(&first.high_52_weeks)
                .with_context(|| format!("Unparseable 52-week high for {symbol}"))?,
        })
    }

    async fn option_chain(
        &self,
        symbol: &str,
        expiration_date: &str,
        option_type: OptionType,
    ) -> Result<Vec<OptionQuote>> {
        let Some(chain_id) = self.chain_id(symbol).await? else {
            debug!(symbol, "No option chain for symbol");
            return Ok(Vec::new());
        };

        let instruments = self
            .chain_instruments(&chain_id, expiration_date, option_type)
            .await?;
        if instruments.is_empty() {
            return Ok(Vec::new());
        }

        // Market data accepts a comma-separated list of instrument URLs.
        let urls: Vec<&str> = instruments.iter().map(|i| i.url.as_str()).collect();
        let mut quotes = Vec::with_capacity(instruments.len());

        for batch in urls.chunks(50) {
            let joined = batch.join(",");
            let data: Paginated<MarketDataPayload> = self
                .get_json(&format!(
                    "{API_BASE}/marketdata/options/?instruments={}",
                    urlencoding::encode(&joined)
                ))
                .await?;

            for d in &data.results {
                let Some(instrument) = instruments.iter().find(|i| i.url == d.instrument) else {
                    continue;
                };
                match join_quote(symbol, instrument, d) {
                    Some(q) => quotes.push(q),
                    None => debug!(symbol, instrument = %d.instrument, "Dropped partial quote"),
                }
            }
        }

        debug!(symbol, expiration_date, count = quotes.len(), "Option chain fetched");
        Ok(quotes)
    }

    /// Order history is paginated; follow `next` links until the pages
    /// run out or run past the lookback cutoff.
    async fn recent_open_option_symbols(
        &self,
        option_type: OptionType,
        day_lag: i64,
    ) -> Result<Vec<String>> {
        let now = Utc::now();
        let cutoff = now - chrono::Duration::days(day_lag);

        let mut url = format!("{API_BASE}/options/orders/");
        let mut orders = Vec::new();
        loop {
            let page: Paginated<OptionOrderHistoryPayload> = self.get_json(&url).await?;
            let exhausted = page_past_cutoff(&page.results, cutoff);
            orders.extend(page.results);
            match page.next {
                Some(next) if !exhausted => url = next,
                _ => break,
            }
        }

        Ok(recent_open_symbols(&orders, option_type, day_lag, now))
    }

    async fn place_credit_spread(
        &self,
        candidate: &CandidateSpread,
        limit_price: f64,
        time_in_force: TimeInForce,
    ) -> Result<String> {
        let account = self.account().await?;
        let body = spread_order_body(candidate, true, limit_price, time_in_force, &account);
        let order: OptionOrderPayload = self
            .post_json(&format!("{API_BASE}/options/orders/"), &body)
            .await?;
        info!(
            order_id = %order.id,
            symbol = %candidate.short.symbol,
            limit = round_to_cents(limit_price),
            "Credit spread order submitted"
        );
        Ok(order.id)
    }

    async fn place_debit_spread(
        &self,
        candidate: &CandidateSpread,
        limit_price: f64,
        time_in_force: TimeInForce,
    ) -> Result<String> {
        let account = self.account().await?;
        let body = spread_order_body(candidate, false, limit_price, time_in_force, &account);
        let order: OptionOrderPayload = self
            .post_json(&format!("{API_BASE}/options/orders/"), &body)
            .await?;
        info!(
            order_id = %order.id,
            symbol = %candidate.short.symbol,
            limit = round_to_cents(limit_price),
            "Debit spread order submitted"
        );
        Ok(order.id)
    }

    async fn order_state(&self, order_id: &str) -> Result<OrderState> {
        let order: OptionOrderPayload = self
            .get_json(&format!("{API_BASE}/options/orders/{order_id}/"))
            .await?;
        order.state.parse()
    }

    /// Positions joined with instrument symbols and live quotes to get
    /// entry-relative percent change.
    async fn holdings(&self) -> Result<Vec<Holding>> {
        let positions: Paginated<PositionPayload> = self
            .get_json(&format!("{API_BASE}/positions/?nonzero=true"))
            .await?;

        let mut holdings = Vec::new();
        for p in &positions.results {
            let (Ok(quantity), Ok(avg)) =
                (p.quantity.parse::<f64>(), p.average_buy_price.parse::<f64>())
            else {
                warn!(instrument = %p.instrument, "Dropped unparseable position");
                continue;
            };
            if avg <= 0.0 {
                continue;
            }

            let instrument: EquityInstrumentPayload = self.get_json(&p.instrument).await?;
            let quote: QuotePayload = self
                .get_json(&format!(
                    "{API_BASE}/quotes/{}/",
                    urlencoding::encode(&instrument.symbol)
                ))
                .await?;
            let Ok(last) = quote.last_trade_price.parse::<f64>() else {
                continue;
            };

            holdings.push(Holding {
                symbol: instrument.symbol,
                quantity,
                percent_change: (last - avg) / avg,
            });
        }
        Ok(holdings)
    }

    async fn buy_fractional_by_price(&self, symbol: &str, dollars: f64) -> Result<String> {
        let account = self.account().await?;
        let body = serde_json::json!({
            "account": account,
            "symbol": symbol,
            "side": "buy",
            "type": "market",
            "trigger": "immediate",
            "time_in_force": TimeInForce::Gtc.as_api_str(),
            "dollar_based_amount": { "amount": round_to_cents(dollars), "currency_code": "USD" },
            "extended_hours": false,
            "ref_id": uuid::Uuid::new_v4().to_string(),
        });
        let order: EquityOrderPayload = self
            .post_json(&format!("{API_BASE}/orders/"), &body)
            .await?;
        info!(order_id = %order.id, symbol, dollars, "Fractional buy submitted");
        Ok(order.id)
    }

    async fn sell_fractional_by_quantity(&self, symbol: &str, quantity: f64) -> Result<String> {
        let account = self.account().await?;
        let body = serde_json::json!({
            "account": account,
            "symbol": symbol,
            "side": "sell",
            "type": "market",
            "trigger": "immediate",
            "time_in_force": TimeInForce::Gtc.as_api_str(),
            "quantity": quantity,
            "extended_hours": false,
            "ref_id": uuid::Uuid::new_v4().to_string(),
        });
        let order: EquityOrderPayload = self
            .post_json(&format!("{API_BASE}/orders/"), &body)
            .await?;
        info!(order_id = %order.id, symbol, quantity, "Fractional sell submitted");
        Ok(order.id)
    }

    fn name(&self) -> &str {
        BROKER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
