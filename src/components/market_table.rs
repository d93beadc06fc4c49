//! Market table component
//!
//! Renders the current page of the table engine and maps keys and clicks to
//! table actions. Each data row is two lines high so the volume cell can
//! carry its BTC line.

use crate::action::Action;
use crate::component::Component;
use crate::model::format::{PercentChange, Trend};
use crate::model::table::{PageView, RowCells, SortState, VisibleRow};
use crate::model::{SortColumn, TableView};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

/// Lines per data row
pub const ROW_HEIGHT: u16 = 2;

const COLUMN_SPACING: u16 = 1;

const SKELETON: &str = "░░░░░░";

/// Where a click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableHit {
    Header(SortColumn),
    /// Window position of a data row
    Row(usize),
}

fn column_width(column: SortColumn) -> Constraint {
    match column {
        SortColumn::Rank => Constraint::Length(5),
        SortColumn::Name => Constraint::Fill(1),
        SortColumn::Price => Constraint::Length(16),
        SortColumn::Change1h | SortColumn::Change24h | SortColumn::Change7d => {
            Constraint::Length(9)
        }
        SortColumn::MarketCap | SortColumn::Volume24h => Constraint::Length(22),
        SortColumn::CirculatingSupply => Constraint::Length(26),
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

// ═══════════════════════════════════════════════════════════════════════════════
// Hit Testing
// ═══════════════════════════════════════════════════════════════════════════════

/// Screen geometry of the last rendered table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableLayout {
    header: Rect,
    body: Rect,
    columns: Vec<(SortColumn, Rect)>,
}

impl TableLayout {
    /// Lay out `columns` inside the table's inner area, the same way the
    /// table widget splits its width
    pub fn compute(inner: Rect, columns: &[SortColumn]) -> Self {
        let header = Rect::new(inner.x, inner.y, inner.width, inner.height.min(1));
        let body = Rect::new(
            inner.x,
            inner.y + header.height,
            inner.width,
            inner.height.saturating_sub(header.height),
        );

        let rects = Layout::horizontal(columns.iter().map(|c| column_width(*c)))
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .split(header);

        Self {
            header,
            body,
            columns: columns.iter().copied().zip(rects.iter().copied()).collect(),
        }
    }

    /// Resolve a click. `offset` is the first data row scrolled into view
    /// and `row_count` the number of data rows on the page.
    pub fn hit(&self, x: u16, y: u16, offset: usize, row_count: usize) -> Option<TableHit> {
        if contains(self.header, x, y) {
            return self
                .columns
                .iter()
                .find(|(_, rect)| x >= rect.x && x < rect.x + rect.width)
                .map(|(column, _)| TableHit::Header(*column));
        }

        if contains(self.body, x, y) {
            let position = offset + ((y - self.body.y) / ROW_HEIGHT) as usize;
            if position < row_count {
                return Some(TableHit::Row(position));
            }
        }

        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component
// ═══════════════════════════════════════════════════════════════════════════════

/// Market table with a row cursor
pub struct MarketTableComponent {
    /// Cursor position within the current window
    pub selected: usize,
    view: TableView,
    sort: SortState,
    columns: Vec<SortColumn>,
    state: TableState,
    layout: TableLayout,
}

impl Default for MarketTableComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketTableComponent {
    pub fn new() -> Self {
        Self {
            selected: 0,
            view: TableView::Loading {
                placeholder_rows: 0,
                columns: 0,
            },
            sort: SortState::default(),
            columns: Vec::new(),
            state: TableState::default(),
            layout: TableLayout::default(),
        }
    }

    /// Replace the derived view before drawing
    pub fn set_view(&mut self, view: TableView, sort: SortState, columns: Vec<SortColumn>) {
        self.view = view;
        self.sort = sort;
        self.columns = columns;
        self.clamp_selection();
    }

    pub fn row_count(&self) -> usize {
        self.view.row_count()
    }

    pub fn reset_selection(&mut self) {
        self.selected = 0;
        *self.state.offset_mut() = 0;
    }

    fn clamp_selection(&mut self) {
        let last = self.row_count().saturating_sub(1);
        if self.selected > last {
            self.selected = last;
        }
    }

    fn header_row(&self) -> Row<'static> {
        let cells = self.columns.iter().map(|column| {
            let mut label = column.label().to_string();
            if *column == self.sort.column {
                label = format!("{} {}", label, self.sort.direction.arrow());
            }
            let style = if *column == self.sort.column {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            Cell::from(aligned(Text::from(label), *column)).style(style)
        });
        Row::new(cells).height(1)
    }

    fn data_rows(&self, page: &PageView) -> Vec<Row<'static>> {
        let mut rows: Vec<Row> = page.rows.iter().map(|row| self.data_row(row)).collect();

        let blank = || Row::new(self.columns.iter().map(|_| Cell::from(""))).height(ROW_HEIGHT);
        rows.extend((0..page.empty_rows).map(|_| blank()));
        rows
    }

    fn data_row(&self, row: &VisibleRow) -> Row<'static> {
        match &row.cells {
            Ok(cells) => Row::new(
                self.columns
                    .iter()
                    .map(|column| Cell::from(cell_text(*column, cells))),
            )
            .height(ROW_HEIGHT),
            Err(err) => {
                // Placeholder row naming the problem
                let cells = self.columns.iter().map(|column| match column {
                    SortColumn::Name => Cell::from(format!("⚠ {}", err)),
                    _ => Cell::from(""),
                });
                Row::new(cells).height(ROW_HEIGHT).style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::DIM),
                )
            }
        }
    }

    fn skeleton_rows(&self, count: usize) -> Vec<Row<'static>> {
        (0..count)
            .map(|_| {
                Row::new(self.columns.iter().map(|column| {
                    Cell::from(aligned(Text::from(SKELETON), *column))
                }))
                .height(ROW_HEIGHT)
                .style(Style::default().fg(Color::DarkGray))
            })
            .collect()
    }
}

fn aligned(text: Text<'static>, column: SortColumn) -> Text<'static> {
    if column == SortColumn::Name || column == SortColumn::Rank {
        text
    } else {
        text.alignment(Alignment::Right)
    }
}

fn percent_line(change: &PercentChange) -> Line<'static> {
    match change.trend {
        Some(trend) => {
            let color = match trend {
                Trend::Up => Color::Green,
                Trend::Down => Color::Red,
            };
            Line::from(Span::styled(
                format!("{} {}", trend.arrow(), change.text),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            change.text.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

/// Text of one data cell
fn cell_text(column: SortColumn, cells: &RowCells) -> Text<'static> {
    let secondary = Style::default().fg(Color::DarkGray);

    let text = match column {
        SortColumn::Rank => Text::from(cells.rank.clone()),
        SortColumn::Name => Text::from(vec![
            Line::from(Span::styled(
                cells.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(cells.symbol.clone(), secondary)),
        ]),
        SortColumn::Price => Text::from(cells.price.clone()),
        SortColumn::Change1h => cells
            .change_1h
            .as_ref()
            .map(|c| Text::from(percent_line(c)))
            .unwrap_or_default(),
        SortColumn::Change24h => Text::from(percent_line(&cells.change_24h)),
        SortColumn::Change7d => cells
            .change_7d
            .as_ref()
            .map(|c| Text::from(percent_line(c)))
            .unwrap_or_default(),
        SortColumn::MarketCap => Text::from(cells.market_cap.clone()),
        SortColumn::Volume24h => {
            let mut lines = vec![Line::from(cells.volume.clone())];
            if let Some(btc) = &cells.volume_btc {
                lines.push(Line::from(Span::styled(btc.clone(), secondary)));
            }
            Text::from(lines)
        }
        SortColumn::CirculatingSupply => Text::from(cells.circulating_supply.clone()),
    };

    aligned(text, column)
}

impl Component for MarketTableComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ForceQuit)
            }

            // Row cursor
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextRow),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevRow),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstRow),
            KeyCode::Char('G') | KeyCode::End => Some(Action::LastRow),

            // Paging
            KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
                Some(Action::NextPage)
            }
            KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
                Some(Action::PrevPage)
            }
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::NextPageSize),
            KeyCode::Char('-') => Some(Action::PrevPageSize),
            KeyCode::Char('z') => Some(Action::OpenPageSizeDialog),

            // Sorting
            KeyCode::Char(c @ '1'..='9') => c
                .to_digit(10)
                .map(|n| Action::SortByPosition(n as usize)),

            KeyCode::Enter => Some(Action::ActivateSelected),
            KeyCode::Char('R') => Some(Action::Refresh),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(None);
        }

        let hit = self.layout.hit(
            mouse.column,
            mouse.row,
            self.state.offset(),
            self.row_count(),
        );
        let action = match hit {
            Some(TableHit::Header(column)) => Some(Action::SortBy(column)),
            Some(TableHit::Row(position)) => {
                self.selected = position;
                Some(Action::ActivateRow(position))
            }
            None => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let last = self.row_count().saturating_sub(1);
        match action {
            Action::NextRow => {
                if self.selected < last {
                    self.selected += 1;
                }
            }
            Action::PrevRow => {
                self.selected = self.selected.saturating_sub(1);
            }
            Action::FirstRow => self.selected = 0,
            Action::LastRow => self.selected = last,
            Action::NextPage
            | Action::PrevPage
            | Action::SortBy(_)
            | Action::NextPageSize
            | Action::PrevPageSize => self.reset_selection(),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let title = match &self.view {
            TableView::Loading { .. } => " Markets (loading) ".to_string(),
            TableView::Ready(page) => format!(" Markets ({}) ", page.total),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = match &self.view {
            TableView::Loading {
                placeholder_rows, ..
            } => self.skeleton_rows(*placeholder_rows),
            TableView::Ready(page) => self.data_rows(page),
        };

        let table = Table::new(rows, self.columns.iter().map(|c| column_width(*c)))
            .header(self.header_row())
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .highlight_style(Style::default().bg(Color::DarkGray));

        if self.row_count() > 0 {
            self.state.select(Some(self.selected));
        } else {
            self.state.select(None);
        }

        frame.render_stateful_widget(table, inner, &mut self.state);
        self.layout = TableLayout::compute(inner, &self.columns);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnSet;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready(rows: usize) -> TableView {
        TableView::Ready(PageView {
            rows: (0..rows)
                .map(|position| VisibleRow {
                    position,
                    source_index: position,
                    cells: Err(crate::model::table::TableError::MissingRequiredQuote {
                        coin: format!("coin-{}", position),
                    }),
                })
                .collect(),
            empty_rows: 0,
            total: rows,
            page_index: 0,
            page_count: 1,
        })
    }

    #[test]
    fn test_header_click_resolves_column() {
        let columns = ColumnSet::Basic.columns();
        let layout = TableLayout::compute(Rect::new(1, 1, 150, 30), &columns);

        // Rank is the first five cells, then one cell of spacing
        assert_eq!(layout.hit(1, 1, 0, 10), Some(TableHit::Header(SortColumn::Rank)));
        assert_eq!(layout.hit(7, 1, 0, 10), Some(TableHit::Header(SortColumn::Name)));
        assert_eq!(layout.hit(6, 1, 0, 10), None);
    }

    #[test]
    fn test_row_click_uses_two_line_rows() {
        let columns = ColumnSet::Extended.columns();
        let layout = TableLayout::compute(Rect::new(1, 1, 150, 30), &columns);

        assert_eq!(layout.hit(10, 2, 0, 10), Some(TableHit::Row(0)));
        assert_eq!(layout.hit(10, 3, 0, 10), Some(TableHit::Row(0)));
        assert_eq!(layout.hit(10, 4, 0, 10), Some(TableHit::Row(1)));
        assert_eq!(layout.hit(10, 4, 3, 10), Some(TableHit::Row(4)));
        // Padding rows below the data are not clickable
        assert_eq!(layout.hit(10, 8, 0, 3), None);
    }

    #[test]
    fn test_digit_keys_sort_by_position() {
        let mut table = MarketTableComponent::new();
        table.set_view(ready(3), SortState::default(), ColumnSet::Basic.columns());

        assert_eq!(
            table.handle_key_event(key(KeyCode::Char('3'))).unwrap(),
            Some(Action::SortByPosition(3))
        );
        assert_eq!(
            table.handle_key_event(key(KeyCode::Char('0'))).unwrap(),
            None
        );
    }

    #[test]
    fn test_cursor_stays_inside_window() {
        let mut table = MarketTableComponent::new();
        table.set_view(ready(3), SortState::default(), ColumnSet::Basic.columns());

        for _ in 0..5 {
            table.update(Action::NextRow).unwrap();
        }
        assert_eq!(table.selected, 2);

        table.update(Action::FirstRow).unwrap();
        table.update(Action::PrevRow).unwrap();
        assert_eq!(table.selected, 0);

        table.update(Action::LastRow).unwrap();
        table.set_view(ready(1), SortState::default(), ColumnSet::Basic.columns());
        assert_eq!(table.selected, 0);
    }

    #[test]
    fn test_page_change_resets_cursor() {
        let mut table = MarketTableComponent::new();
        table.set_view(ready(5), SortState::default(), ColumnSet::Basic.columns());
        table.update(Action::LastRow).unwrap();

        table.update(Action::NextPage).unwrap();
        assert_eq!(table.selected, 0);
    }

    #[test]
    fn test_key_bindings() {
        let mut table = MarketTableComponent::new();
        let cases = [
            (KeyCode::Char('n'), Action::NextPage),
            (KeyCode::Right, Action::NextPage),
            (KeyCode::Char('p'), Action::PrevPage),
            (KeyCode::Left, Action::PrevPage),
            (KeyCode::Char('+'), Action::NextPageSize),
            (KeyCode::Char('-'), Action::PrevPageSize),
            (KeyCode::Char('z'), Action::OpenPageSizeDialog),
            (KeyCode::Enter, Action::ActivateSelected),
            (KeyCode::Char('R'), Action::Refresh),
            (KeyCode::Char('q'), Action::OpenQuitDialog),
        ];
        for (code, expected) in cases {
            assert_eq!(table.handle_key_event(key(code)).unwrap(), Some(expected));
        }
    }
}
