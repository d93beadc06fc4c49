//! Data models for market listings
//!
//! Mirrors the shape of the upstream listing endpoint: one record per coin,
//! each carrying a list of quote variants keyed by currency code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Currency code of the quote every record must carry
pub const USD: &str = "USD";

/// Currency code of the optional secondary quote
pub const BTC: &str = "BTC";

/// Stable identifier of a coin, numeric or textual depending on the source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoinId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinId::Numeric(id) => write!(f, "{}", id),
            CoinId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// A coin's market statistics expressed in one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteVariant {
    /// Currency code (`name` in the upstream payload)
    #[serde(rename = "name", alias = "currencyCode")]
    pub currency_code: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub percent_change_1h: Option<f64>,
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
    #[serde(default)]
    pub percent_change_7d: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
}

/// Quote variants of one record, indexed by currency code
///
/// Built once when the record is constructed. The first variant wins when
/// the source repeats a currency code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QuoteVariant>", into = "Vec<QuoteVariant>")]
pub struct QuoteIndex {
    variants: Vec<QuoteVariant>,
    by_code: HashMap<String, usize>,
}

impl QuoteIndex {
    /// Look up the variant for a currency code
    pub fn get(&self, code: &str) -> Option<&QuoteVariant> {
        self.by_code.get(code).map(|&i| &self.variants[i])
    }

    /// Currency codes in source order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.currency_code.as_str())
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl From<Vec<QuoteVariant>> for QuoteIndex {
    fn from(raw: Vec<QuoteVariant>) -> Self {
        let mut variants = Vec::with_capacity(raw.len());
        let mut by_code = HashMap::with_capacity(raw.len());

        for variant in raw {
            if by_code.contains_key(&variant.currency_code) {
                continue;
            }
            by_code.insert(variant.currency_code.clone(), variants.len());
            variants.push(variant);
        }

        Self { variants, by_code }
    }
}

impl From<QuoteIndex> for Vec<QuoteVariant> {
    fn from(index: QuoteIndex) -> Self {
        index.variants
    }
}

/// One market asset as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRecord {
    pub id: CoinId,
    /// Display rank (`cmcRank` upstream)
    #[serde(default, rename = "cmcRank", alias = "rank")]
    pub rank: Option<u32>,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub circulating_supply: f64,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default, alias = "numMarketPairs")]
    pub market_pair_count: Option<u64>,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quotes: QuoteIndex,
}

impl CoinRecord {
    /// Quote variant for the given currency code
    pub fn quote(&self, code: &str) -> Option<&QuoteVariant> {
        self.quotes.get(code)
    }

    /// The required USD quote
    pub fn usd_quote(&self) -> Option<&QuoteVariant> {
        self.quote(USD)
    }

    /// The optional BTC quote used for the secondary volume line
    pub fn btc_quote(&self) -> Option<&QuoteVariant> {
        self.quote(BTC)
    }

    /// Name and symbol for headers and messages
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }
}

/// Upstream sends `null` for amounts it does not track
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}
