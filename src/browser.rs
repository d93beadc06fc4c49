//! Opening detail pages in the user's browser
//!
//! URLs are built from upstream data, so they are checked before anything
//! is launched: http(s) only, no embedded credentials and no characters a
//! platform launcher could treat as shell syntax.

use anyhow::{bail, Context, Result};
use url::Url;

const DANGEROUS_CHARS: &[char] = &[
    '`', '$', '|', ';', '&', '<', '>', '(', ')', '{', '}', '[', ']', '!', '"', '\'', '\n', '\r',
];

/// Parse a URL and reject anything unsafe to hand to a launcher
pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid URL '{}'", raw))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => bail!(
            "refusing to open URL with scheme '{}': only http and https are allowed",
            scheme
        ),
    }

    if !url.username().is_empty() || url.password().is_some() {
        bail!("refusing to open URL with embedded credentials");
    }

    if raw.chars().any(|c| DANGEROUS_CHARS.contains(&c)) {
        bail!("URL contains characters that are not allowed");
    }

    Ok(url)
}

/// Open a URL in the configured browser, `$BROWSER`, or the system default
pub fn open_url(raw: &str, configured: Option<&str>) -> Result<()> {
    let url = validate_url(raw)?;

    let browser = configured
        .map(str::to_string)
        .or_else(|| std::env::var("BROWSER").ok())
        .filter(|b| !b.trim().is_empty());

    match browser {
        Some(browser) => {
            tracing::info!(url = %url, browser = %browser, "Opening detail page");
            open::with_detached(url.as_str(), browser).context("failed to launch browser")?;
        }
        None => {
            tracing::info!(url = %url, "Opening detail page");
            open::that_detached(url.as_str()).context("failed to launch browser")?;
        }
    }

    Ok(())
}
