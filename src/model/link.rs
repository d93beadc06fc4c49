//! URL templates for per-coin external references
//!
//! Templates use `{id}`, `{slug}` and `{symbol}` placeholders. Values come
//! from the listing source and are percent-encoded. Unknown placeholders are
//! left untouched.

use super::coin::CoinRecord;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Default detail page, keyed by slug
pub const DEFAULT_DETAIL_URL: &str = "https://coinmarketcap.com/currencies/{slug}/";

/// Default logo image, keyed by id
pub const DEFAULT_LOGO_URL: &str = "https://s2.coinmarketcap.com/static/img/coins/64x64/{id}.png";

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// A URL pattern rendered against a coin record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    pattern: String,
}

impl UrlTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Substitute the record's fields into the pattern
    pub fn render(&self, coin: &CoinRecord) -> String {
        PLACEHOLDER_REGEX
            .replace_all(&self.pattern, |caps: &Captures| match &caps[1] {
                "id" => urlencoding::encode(&coin.id.to_string()).into_owned(),
                "slug" => urlencoding::encode(&coin.slug).into_owned(),
                "symbol" => urlencoding::encode(&coin.symbol).into_owned(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}
