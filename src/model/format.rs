//! Number formatting for table cells
//!
//! Amounts use `,` grouping and exactly two decimals. USD amounts carry a
//! `$` prefix; any other currency is written as a ` CODE` suffix.

use super::coin::USD;

/// Placeholder for values that cannot be displayed
pub const MISSING: &str = "-";

/// Direction indicator for a percent change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Zero counts as up
    pub fn of(value: f64) -> Trend {
        if value >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }
}

/// A formatted percent-change cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentChange {
    /// Absolute magnitude, two decimals, with `%`
    pub text: String,
    /// `None` when the source did not provide a value
    pub trend: Option<Trend>,
}

/// Format an amount in the given currency
pub fn format_currency(value: f64, code: &str) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    let grouped = group_thousands(whole);

    if code == USD {
        format!("{}${}.{}", sign, grouped, fraction)
    } else {
        format!("{}{}.{} {}", sign, grouped, fraction, code)
    }
}

/// Format an amount the source may not provide
pub fn format_amount(value: Option<f64>, code: &str) -> String {
    match value {
        Some(v) => format_currency(v, code),
        None => MISSING.to_string(),
    }
}

/// Format a percent change as magnitude plus trend
pub fn format_percent(value: Option<f64>) -> PercentChange {
    match value.filter(|v| v.is_finite()) {
        Some(v) => PercentChange {
            text: format!("{:.2}%", v.abs()),
            trend: Some(Trend::of(v)),
        },
        None => PercentChange {
            text: MISSING.to_string(),
            trend: None,
        },
    }
}

/// Insert `,` between every group of three digits
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
