//! Coin detail overlay
//!
//! Shown when a row is activated. Lists every quote the record carries
//! together with supply figures and the detail and logo references.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::coin::{CoinRecord, USD};
use crate::model::format::{
    format_amount, format_currency, format_percent, PercentChange, Trend, MISSING,
};
use crate::model::RowActivation;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Detail overlay for an activated row
#[derive(Default)]
pub struct CoinDetailDialog;

fn label(text: &str) -> Span<'static> {
    Span::styled(format!("  {:20}", text), Style::default().fg(Color::DarkGray))
}

fn field(name: &str, value: String) -> Line<'static> {
    Line::from(vec![label(name), Span::raw(value)])
}

fn percent_span(change: PercentChange) -> Span<'static> {
    match change.trend {
        Some(Trend::Up) => Span::styled(
            format!("{} {}", Trend::Up.arrow(), change.text),
            Style::default().fg(Color::Green),
        ),
        Some(Trend::Down) => Span::styled(
            format!("{} {}", Trend::Down.arrow(), change.text),
            Style::default().fg(Color::Red),
        ),
        None => Span::styled(change.text, Style::default().fg(Color::DarkGray)),
    }
}

fn optional_amount(value: Option<f64>, symbol: &str) -> String {
    value
        .map(|v| format_currency(v, symbol))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Build the overlay body for a record
pub fn build_detail_lines(
    activation: &RowActivation,
    coin: Option<&CoinRecord>,
    logo_url: Option<&str>,
) -> Vec<Line<'static>> {
    let section = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from("")];

    let Some(coin) = coin else {
        lines.push(Line::from(Span::styled(
            format!("  {} is no longer in the listing", activation.name),
            Style::default().fg(Color::Red),
        )));
        return lines;
    };

    lines.push(Line::from(vec![
        Span::styled(
            format!("  {}", coin.name),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", coin.symbol), Style::default().fg(Color::Cyan)),
    ]));
    lines.push(Line::from(""));
    lines.push(field(
        "Rank",
        coin.rank
            .map(|r| format!("#{}", r))
            .unwrap_or_else(|| MISSING.to_string()),
    ));
    lines.push(field("Id", coin.id.to_string()));
    if let Some(pairs) = coin.market_pair_count {
        lines.push(field("Market pairs", pairs.to_string()));
    }
    if let Some(added) = coin.date_added {
        lines.push(field("Listed", added.format("%Y-%m-%d").to_string()));
    }

    // Supply
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Supply", section)));
    lines.push(field(
        "Circulating",
        format_currency(coin.circulating_supply, &coin.symbol),
    ));
    lines.push(field("Total", optional_amount(coin.total_supply, &coin.symbol)));
    lines.push(field("Max", optional_amount(coin.max_supply, &coin.symbol)));

    // Quotes, USD first
    let mut codes: Vec<&str> = coin.quotes.codes().collect();
    codes.sort_by_key(|code| *code != USD);

    for code in codes {
        let Some(quote) = coin.quote(code) else {
            continue;
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  Quote in {}", code), section)));
        lines.push(field("Price", format_amount(quote.price, code)));
        lines.push(field("Market cap", format_amount(quote.market_cap, code)));
        lines.push(field("Volume (24h)", format_amount(quote.volume_24h, code)));
        lines.push(Line::from(vec![
            label("Change 1h / 24h / 7d"),
            percent_span(format_percent(quote.percent_change_1h)),
            Span::raw("  "),
            percent_span(format_percent(quote.percent_change_24h)),
            Span::raw("  "),
            percent_span(format_percent(quote.percent_change_7d)),
        ]));
    }

    if coin.usd_quote().is_none() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  No USD quote: this coin cannot be shown in the table",
            Style::default().fg(Color::Red),
        )));
    }

    // Links
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Links", section)));
    lines.push(field("Detail page", activation.detail_url.clone()));
    if let Some(logo) = logo_url {
        lines.push(field("Logo", logo.to_string()));
    }

    lines
}

impl CoinDetailDialog {
    pub fn draw_with_coin(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        activation: &RowActivation,
        coin: Option<&CoinRecord>,
        logo_url: Option<&str>,
    ) -> Result<()> {
        let mut content = build_detail_lines(activation, coin, logo_url);
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                "  o ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Open in browser  "),
            Span::styled(
                " Esc/q ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ]));

        let (width, height) = popup_size(&content, area);
        let dialog_area = centered_popup(area, width, height);
        frame.render_widget(Clear, dialog_area);

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", activation.name))
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, dialog_area);
        Ok(())
    }
}

/// Fit the popup to its widest line, keeping a margin around it
fn popup_size(content: &[Line], area: Rect) -> (u16, u16) {
    let widest = content
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref().width())
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0);

    let width = (widest + 4).min(area.width.saturating_sub(12) as usize) as u16;
    let height = (content.len() + 2).min(area.height.saturating_sub(4) as usize) as u16;
    (width.max(30), height)
}

impl Component for CoinDetailDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => Some(Action::CloseModal),
            KeyCode::Char('o') => Some(Action::OpenInBrowser),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        // Without a record there is nothing to show
        frame.render_widget(Clear, area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::coin::CoinId;

    const RECORD: &str = r#"{
        "id": 1,
        "name": "Bitcoin",
        "symbol": "BTC",
        "slug": "bitcoin",
        "cmcRank": 1,
        "circulatingSupply": 19000000,
        "maxSupply": 21000000,
        "quotes": [
            {"name": "BTC", "price": 1.0, "volume24h": 500.0, "marketCap": 19000000.0},
            {"name": "USD", "price": 65000.0, "volume24h": 1.0, "marketCap": 2.0, "percentChange24h": -1.5}
        ]
    }"#;

    fn activation() -> RowActivation {
        RowActivation {
            id: CoinId::Numeric(1),
            name: "Bitcoin".to_string(),
            source_index: 0,
            detail_url: "https://coinmarketcap.com/currencies/bitcoin/".to_string(),
        }
    }

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_lists_usd_quote_first() {
        let coin: CoinRecord = serde_json::from_str(RECORD).unwrap();
        let body = text(&build_detail_lines(&activation(), Some(&coin), Some("logo.png")));

        let usd = body.find("Quote in USD").unwrap();
        let btc = body.find("Quote in BTC").unwrap();
        assert!(usd < btc);
        assert!(body.contains("$65,000.00"));
        assert!(body.contains("▼ 1.50%"));
        assert!(body.contains("21,000,000.00 BTC"));
        assert!(body.contains("logo.png"));
        assert!(body.contains("https://coinmarketcap.com/currencies/bitcoin/"));
    }

    #[test]
    fn test_missing_record() {
        let body = text(&build_detail_lines(&activation(), None, None));
        assert!(body.contains("Bitcoin is no longer in the listing"));
    }

    #[test]
    fn test_popup_fits_content() {
        let lines = vec![Line::from("₿ Bitcoin"), Line::from("x".repeat(50))];
        assert_eq!(popup_size(&lines, Rect::new(0, 0, 120, 40)), (54, 4));

        // Clamped to the screen with a margin
        let (width, height) = popup_size(&lines, Rect::new(0, 0, 40, 5));
        assert_eq!(width, 30);
        assert_eq!(height, 1);
    }

    #[test]
    fn test_keys() {
        let mut dialog = CoinDetailDialog;
        let key = |c| KeyEvent::new(c, crossterm::event::KeyModifiers::NONE);
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Char('o'))).unwrap(),
            Some(Action::OpenInBrowser)
        );
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::CloseModal)
        );
    }
}
