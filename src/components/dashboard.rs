//! Dashboard screen - title, market table, status line and help bar

use crate::component::Component;
use crate::components::{calculate_main_layout, MarketTableComponent};
use crate::model::table::{PageState, SortState};
use anyhow::Result;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Duration;

/// Data the dashboard needs besides the table itself
pub struct DashboardContext<'a> {
    /// Where rows come from, e.g. the endpoint host
    pub source: &'a str,
    pub total: usize,
    pub page: PageState,
    pub sort: SortState,
    pub loading: bool,
    /// How long the running fetch has taken so far
    pub elapsed: Option<Duration>,
    pub last_updated: Option<String>,
    pub error: Option<&'a str>,
    pub status_message: Option<&'a str>,
}

/// Draw the dashboard screen
pub fn draw_dashboard(
    frame: &mut Frame,
    area: Rect,
    table: &mut MarketTableComponent,
    ctx: &DashboardContext,
) -> Result<()> {
    let layout = calculate_main_layout(area);

    render_title(frame, layout.title, ctx);
    table.draw(frame, layout.table)?;
    render_status_bar(frame, layout.status, ctx);
    render_help_bar(frame, layout.help);

    Ok(())
}

fn render_title(frame: &mut Frame, area: Rect, ctx: &DashboardContext) {
    let line = Line::from(vec![
        Span::styled(
            " coin-tui ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(ctx.source.to_string(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Spans of the status line
pub fn status_spans(ctx: &DashboardContext) -> Vec<Span<'static>> {
    let mut spans = vec![];

    let page_count = ctx.page.page_count(ctx.total).max(1);
    spans.push(Span::styled(
        format!(" {} coins ", ctx.total),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!(
            "page {}/{} · {} per page",
            ctx.page.page_index + 1,
            page_count,
            ctx.page.page_size
        ),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::styled(
        format!(
            "  sort {} {}",
            ctx.sort.column.label(),
            ctx.sort.direction.arrow()
        ),
        Style::default().fg(Color::Yellow),
    ));

    if ctx.loading {
        let text = match ctx.elapsed {
            Some(elapsed) => format!("  loading… {:.1}s", elapsed.as_secs_f64()),
            None => "  loading…".to_string(),
        };
        spans.push(Span::styled(text, Style::default().fg(Color::Magenta)));
    } else if let Some(updated) = &ctx.last_updated {
        spans.push(Span::styled(
            format!("  updated {}", updated),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(error) = ctx.error {
        spans.push(Span::styled(
            format!("  Error: {} ", error),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(status) = ctx.status_message {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::Green),
        ));
    }

    spans
}

fn render_status_bar(frame: &mut Frame, area: Rect, ctx: &DashboardContext) {
    frame.render_widget(Paragraph::new(Line::from(status_spans(ctx))), area);
}

fn render_help_bar(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };

    let help_spans = vec![
        key(" q "),
        Span::raw("Quit "),
        key(" j/k "),
        Span::raw("Row "),
        key(" n/p "),
        Span::raw("Page "),
        key(" 1-9 "),
        Span::raw("Sort "),
        key(" +/- "),
        Span::raw("Page size "),
        key(" Enter "),
        Span::raw("Details "),
        key(" R "),
        Span::raw("Refresh "),
        key(" ? "),
        Span::raw("Help"),
    ];

    let help = Paragraph::new(Line::from(help_spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(help, area);
}
