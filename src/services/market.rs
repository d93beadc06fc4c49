//! Market listing service
//!
//! Builds the listing query, performs the HTTP request and decodes the
//! payload. Caller-supplied parameters are passed through verbatim and take
//! precedence over the defaults.

use crate::model::CoinRecord;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default listing endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://api.coinmarketcap.com/data-api/v3/cryptocurrency/listing";

/// User-Agent for listing requests
pub const USER_AGENT: &str = concat!("coin-tui/", env!("CARGO_PKG_VERSION"));

/// Timeout for a listing request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_AUX: &str = "ath,atl,high24h,low24h,num_market_pairs,cmc_rank,date_added,max_supply,circulating_supply,total_supply,volume_7d,volume_30d,self_reported_circulating_supply,self_reported_market_cap";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },
    #[error("could not decode listing: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// Query
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered query parameters for the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketQuery {
    params: Vec<(String, String)>,
}

impl Default for MarketQuery {
    fn default() -> Self {
        let params = [
            ("start", "1"),
            ("limit", "20"),
            ("sortBy", "market_cap"),
            ("sortType", "desc"),
            ("convert", "USD,BTC,ETH"),
            ("cryptoType", "all"),
            ("tagType", "all"),
            ("audited", "false"),
            ("aux", DEFAULT_AUX),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { params }
    }
}

impl MarketQuery {
    /// Replace a parameter, or append it if absent
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((key.to_string(), value)),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.set("limit", limit.to_string());
        self
    }

    /// Apply pass-through parameters on top of the current ones
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in overrides {
            self.set(key, value.clone());
        }
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a `KEY=VALUE` pass-through parameter
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Source
// ═══════════════════════════════════════════════════════════════════════════════

/// Where listing rows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketSource {
    Http { endpoint: String, query: MarketQuery },
    /// A saved listing payload on disk
    Snapshot(PathBuf),
}

impl MarketSource {
    /// Short label for the status bar
    pub fn describe(&self) -> String {
        match self {
            MarketSource::Http { endpoint, .. } => endpoint
                .split("://")
                .nth(1)
                .and_then(|rest| rest.split('/').next())
                .unwrap_or(endpoint)
                .to_string(),
            MarketSource::Snapshot(path) => format!("snapshot {}", path.display()),
        }
    }
}

/// Fetch listing rows from the source
pub fn fetch(source: &MarketSource) -> Result<Vec<CoinRecord>, FetchError> {
    match source {
        MarketSource::Http { endpoint, query } => fetch_http(endpoint, query),
        MarketSource::Snapshot(path) => load_snapshot(path),
    }
}

fn fetch_http(endpoint: &str, query: &MarketQuery) -> Result<Vec<CoinRecord>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    tracing::debug!(endpoint, params = ?query.params(), "Requesting market listing");

    let response = client.get(endpoint).query(query.params()).send()?;
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, endpoint, "Market listing request failed");
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text()?;
    decode_listing(&body)
}

/// Load a saved listing payload
pub fn load_snapshot(path: &Path) -> Result<Vec<CoinRecord>, FetchError> {
    let contents = fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_listing(&contents)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Payload
// ═══════════════════════════════════════════════════════════════════════════════

/// Accepted payload shapes: a bare array, the listing object, or either
/// wrapped in a `data` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListingPayload {
    Records(Vec<CoinRecord>),
    Listing(Listing),
    Envelope { data: Box<ListingPayload> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    crypto_currency_list: Vec<CoinRecord>,
}

impl ListingPayload {
    fn into_records(self) -> Vec<CoinRecord> {
        match self {
            ListingPayload::Records(records) => records,
            ListingPayload::Listing(listing) => listing.crypto_currency_list,
            ListingPayload::Envelope { data } => data.into_records(),
        }
    }
}

/// Decode a listing response body
pub fn decode_listing(body: &str) -> Result<Vec<CoinRecord>, FetchError> {
    let payload: ListingPayload = serde_json::from_str(body)?;
    Ok(payload.into_records())
}
