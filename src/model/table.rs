//! Table engine - sorting, paging and cell derivation for the market table
//!
//! The engine owns the sort and page state. Rows are owned by the caller and
//! passed in on every call; the engine never mutates them. Every view is a
//! pure function of the rows and the current state:
//!
//! 1. sort the full row list (active column, then input index)
//! 2. cut the page window out of the sorted sequence
//! 3. resolve quotes and format the cells of the visible rows

use super::coin::{CoinId, CoinRecord, BTC, USD};
use super::format::{format_amount, format_currency, format_percent, PercentChange};
use super::link::{UrlTemplate, DEFAULT_DETAIL_URL, DEFAULT_LOGO_URL};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Number of skeleton rows reported while loading
pub const PLACEHOLDER_ROWS: usize = 20;

/// Default allowed page sizes
pub const DEFAULT_PAGE_SIZES: [usize; 3] = [5, 10, 25];

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The row has no USD quote, so its cells cannot be derived
    #[error("{coin} has no USD quote")]
    MissingRequiredQuote { coin: String },
    /// Unknown column, or a column the active column set does not show
    #[error("cannot sort by '{0}'")]
    InvalidSortColumn(String),
    /// Zero or a size outside the allowed set
    #[error("page size {0} is not one of the allowed sizes")]
    InvalidPageSize(usize),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Columns & State
// ═══════════════════════════════════════════════════════════════════════════════

/// Sortable table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Rank,
    Name,
    Price,
    Change1h,
    Change24h,
    Change7d,
    MarketCap,
    Volume24h,
    CirculatingSupply,
}

impl SortColumn {
    pub fn all() -> [SortColumn; 9] {
        [
            SortColumn::Rank,
            SortColumn::Name,
            SortColumn::Price,
            SortColumn::Change1h,
            SortColumn::Change24h,
            SortColumn::Change7d,
            SortColumn::MarketCap,
            SortColumn::Volume24h,
            SortColumn::CirculatingSupply,
        ]
    }

    /// Header label
    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Rank => "#",
            SortColumn::Name => "Name",
            SortColumn::Price => "Price",
            SortColumn::Change1h => "1h %",
            SortColumn::Change24h => "24h %",
            SortColumn::Change7d => "7d %",
            SortColumn::MarketCap => "Market Cap",
            SortColumn::Volume24h => "Volume(24h)",
            SortColumn::CirculatingSupply => "Circulating Supply",
        }
    }

    /// Identifier accepted by `FromStr`
    pub fn key(&self) -> &'static str {
        match self {
            SortColumn::Rank => "rank",
            SortColumn::Name => "name",
            SortColumn::Price => "price",
            SortColumn::Change1h => "1h",
            SortColumn::Change24h => "24h",
            SortColumn::Change7d => "7d",
            SortColumn::MarketCap => "market_cap",
            SortColumn::Volume24h => "volume_24h",
            SortColumn::CirculatingSupply => "circulating_supply",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, SortColumn::Name)
    }

    /// Columns only shown by the extended column set
    pub fn is_extended_only(&self) -> bool {
        matches!(self, SortColumn::Change1h | SortColumn::Change7d)
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for SortColumn {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column = match s.trim().to_ascii_lowercase().as_str() {
            "rank" | "id" | "#" | "cmcrank" | "cmc_rank" => SortColumn::Rank,
            "name" => SortColumn::Name,
            "price" => SortColumn::Price,
            "1h" | "percentchange1h" | "percent_change_1h" | "onehour" => SortColumn::Change1h,
            "24h" | "percentchange24h" | "percent_change_24h" | "oneday" | "daypercent" => {
                SortColumn::Change24h
            }
            "7d" | "percentchange7d" | "percent_change_7d" | "sevendays" => SortColumn::Change7d,
            "market_cap" | "marketcap" => SortColumn::MarketCap,
            "volume_24h" | "volume24h" | "volume" => SortColumn::Volume24h,
            "circulating_supply" | "circulatingsupply" | "supply" => {
                SortColumn::CirculatingSupply
            }
            _ => return Err(TableError::InvalidSortColumn(s.to_string())),
        };
        Ok(column)
    }
}

/// Which optional columns the table shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSet {
    /// Rank, name, price, 24h, market cap, volume, supply
    Basic,
    /// Basic plus 1h and 7d changes
    #[default]
    Extended,
}

impl ColumnSet {
    /// Visible columns in display order
    pub fn columns(&self) -> Vec<SortColumn> {
        SortColumn::all()
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }

    /// Column at a 1-based display position
    pub fn column_at(&self, position: usize) -> Option<SortColumn> {
        position
            .checked_sub(1)
            .and_then(|i| self.columns().get(i).copied())
    }

    pub fn contains(&self, column: SortColumn) -> bool {
        match self {
            ColumnSet::Basic => !column.is_extended_only(),
            ColumnSet::Extended => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::Rank,
            direction: SortDirection::Ascending,
        }
    }
}

/// Current page and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageState {
    /// Index range of the page within a sorted sequence of `total` rows
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = self.page_index.saturating_mul(self.page_size).min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }

    /// Rows missing from a short page past the first, for layout padding
    pub fn empty_rows(&self, total: usize) -> usize {
        if self.page_index == 0 {
            return 0;
        }
        self.page_index
            .saturating_add(1)
            .saturating_mul(self.page_size)
            .saturating_sub(total)
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }
}

/// Construction options for a [`TableEngine`]
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub columns: ColumnSet,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub detail_url: String,
    pub logo_url: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            columns: ColumnSet::Extended,
            page_size: 10,
            page_size_options: DEFAULT_PAGE_SIZES.to_vec(),
            detail_url: DEFAULT_DETAIL_URL.to_string(),
            logo_url: DEFAULT_LOGO_URL.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Derived View
// ═══════════════════════════════════════════════════════════════════════════════

/// Formatted cells of one visible row
#[derive(Debug, Clone, PartialEq)]
pub struct RowCells {
    pub id: CoinId,
    pub rank: String,
    pub name: String,
    pub symbol: String,
    pub price: String,
    /// `None` when the column set hides the 1h column
    pub change_1h: Option<PercentChange>,
    pub change_24h: PercentChange,
    /// `None` when the column set hides the 7d column
    pub change_7d: Option<PercentChange>,
    pub market_cap: String,
    pub volume: String,
    /// Secondary volume line, omitted when the record has no BTC quote
    pub volume_btc: Option<String>,
    pub circulating_supply: String,
    pub logo_url: String,
}

/// A row inside the current page window
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow {
    /// Position within the window
    pub position: usize,
    /// Index into the caller's row list
    pub source_index: usize,
    pub cells: Result<RowCells, TableError>,
}

/// The rows and layout information of the current page
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub rows: Vec<VisibleRow>,
    pub empty_rows: usize,
    pub total: usize,
    pub page_index: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    /// Skeleton rows shown instead of data
    Loading {
        placeholder_rows: usize,
        columns: usize,
    },
    Ready(PageView),
}

impl TableView {
    /// Number of data rows on screen
    pub fn row_count(&self) -> usize {
        match self {
            TableView::Loading { .. } => 0,
            TableView::Ready(page) => page.rows.len(),
        }
    }
}

/// Outcome of activating a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActivation {
    pub id: CoinId,
    pub name: String,
    pub source_index: usize,
    /// Canonical detail page for the caller to navigate to
    pub detail_url: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════════════════════════

/// Table engine owning sort and page state
#[derive(Debug, Clone)]
pub struct TableEngine {
    sort: SortState,
    page: PageState,
    columns: ColumnSet,
    page_size_options: Vec<usize>,
    detail_url: UrlTemplate,
    logo_url: UrlTemplate,
}

impl Default for TableEngine {
    fn default() -> Self {
        Self::new(TableOptions::default())
    }
}

impl TableEngine {
    pub fn new(options: TableOptions) -> Self {
        let mut page_size_options: Vec<usize> = options
            .page_size_options
            .into_iter()
            .filter(|size| *size > 0)
            .collect();
        let page_size = options.page_size.max(1);
        if !page_size_options.contains(&page_size) {
            page_size_options.push(page_size);
        }
        page_size_options.sort_unstable();
        page_size_options.dedup();

        Self {
            sort: SortState::default(),
            page: PageState {
                page_index: 0,
                page_size,
            },
            columns: options.columns,
            page_size_options,
            detail_url: UrlTemplate::new(options.detail_url),
            logo_url: UrlTemplate::new(options.logo_url),
        }
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    pub fn columns(&self) -> ColumnSet {
        self.columns
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting
    // ─────────────────────────────────────────────────────────────────────────

    /// Sort by `column`, flipping the direction if it is already active
    pub fn set_sort(&mut self, column: SortColumn) -> Result<SortState, TableError> {
        if !self.columns.contains(column) {
            return Err(TableError::InvalidSortColumn(column.key().to_string()));
        }

        self.sort = if self.sort.column == column {
            SortState {
                column,
                direction: self.sort.direction.flipped(),
            }
        } else {
            SortState {
                column,
                direction: SortDirection::Ascending,
            }
        };
        Ok(self.sort)
    }

    /// Sort by a column identifier such as `"price"` or `"percentChange24h"`
    pub fn set_sort_by_name(&mut self, name: &str) -> Result<SortState, TableError> {
        let column = name.parse::<SortColumn>()?;
        self.set_sort(column)
    }

    /// Apply a `COLUMN[:asc|desc]` argument as the sort state
    ///
    /// Unlike `set_sort` this never toggles: the direction defaults to
    /// ascending whatever the current state is.
    pub fn set_sort_from_arg(&mut self, arg: &str) -> Result<SortState, TableError> {
        let (name, direction) = match arg.rsplit_once(':') {
            Some((name, dir)) => match dir.trim().to_ascii_lowercase().as_str() {
                "asc" => (name, SortDirection::Ascending),
                "desc" => (name, SortDirection::Descending),
                _ => return Err(TableError::InvalidSortColumn(arg.to_string())),
            },
            None => (arg, SortDirection::Ascending),
        };

        self.set_sort_by_name(name)?;
        self.sort.direction = direction;
        Ok(self.sort)
    }

    /// Indices of `rows` in display order
    pub fn sorted_indices(&self, rows: &[CoinRecord]) -> Vec<usize> {
        let mut keyed: Vec<(usize, SortKey)> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, SortKey::of(row, self.sort.column)))
            .collect();

        let direction = self.sort.direction;
        keyed.sort_by(|(ia, a), (ib, b)| {
            let primary = match direction {
                SortDirection::Descending => a.compare_descending(b),
                SortDirection::Ascending => a.compare_descending(b).reverse(),
            };
            primary.then(ia.cmp(ib))
        });

        keyed.into_iter().map(|(i, _)| i).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Paging
    // ─────────────────────────────────────────────────────────────────────────

    /// Jump to a page; pages past the end show an empty window
    pub fn set_page(&mut self, index: usize) {
        self.page.page_index = index;
    }

    pub fn next_page(&mut self, total: usize) {
        let last = self.page.page_count(total).saturating_sub(1);
        self.page.page_index = (self.page.page_index + 1).min(last);
    }

    pub fn previous_page(&mut self) {
        self.page.page_index = self.page.page_index.saturating_sub(1);
    }

    /// Change the page size and return to the first page
    pub fn set_page_size(&mut self, size: usize) -> Result<(), TableError> {
        if size == 0 || !self.page_size_options.contains(&size) {
            return Err(TableError::InvalidPageSize(size));
        }
        self.page = PageState {
            page_index: 0,
            page_size: size,
        };
        Ok(())
    }

    /// Step to the next (or previous) allowed page size, wrapping around
    pub fn cycle_page_size(&mut self, forward: bool) -> usize {
        let count = self.page_size_options.len();
        let current = self
            .page_size_options
            .iter()
            .position(|s| *s == self.page.page_size)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        let size = self.page_size_options[next];
        self.page = PageState {
            page_index: 0,
            page_size: size,
        };
        size
    }

    /// Keep the page valid after the caller replaced the row list
    pub fn sync_row_count(&mut self, total: usize) {
        if self.page.page_index > 0 && self.page.page_index.saturating_mul(self.page.page_size) >= total
        {
            self.page.page_index = 0;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derivation
    // ─────────────────────────────────────────────────────────────────────────

    /// Derive the visible page from `rows`
    pub fn view(&self, rows: &[CoinRecord], loading: bool) -> TableView {
        if loading {
            return TableView::Loading {
                placeholder_rows: PLACEHOLDER_ROWS,
                columns: self.columns.columns().len(),
            };
        }

        let total = rows.len();
        let sorted = self.sorted_indices(rows);
        let visible = sorted[self.page.window(total)]
            .iter()
            .enumerate()
            .map(|(position, &source_index)| VisibleRow {
                position,
                source_index,
                cells: self.row_cells(&rows[source_index]),
            })
            .collect();

        TableView::Ready(PageView {
            rows: visible,
            empty_rows: self.page.empty_rows(total),
            total,
            page_index: self.page.page_index,
            page_count: self.page.page_count(total),
        })
    }

    /// Format the cells of one record
    pub fn row_cells(&self, coin: &CoinRecord) -> Result<RowCells, TableError> {
        let usd = coin
            .usd_quote()
            .ok_or_else(|| TableError::MissingRequiredQuote {
                coin: coin.display_name(),
            })?;

        let extended = self.columns == ColumnSet::Extended;

        Ok(RowCells {
            id: coin.id.clone(),
            rank: coin.rank.map(|r| r.to_string()).unwrap_or_default(),
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            price: format_amount(usd.price, USD),
            change_1h: extended.then(|| format_percent(usd.percent_change_1h)),
            change_24h: format_percent(usd.percent_change_24h),
            change_7d: extended.then(|| format_percent(usd.percent_change_7d)),
            market_cap: format_amount(usd.market_cap, USD),
            volume: format_amount(usd.volume_24h, USD),
            volume_btc: coin
                .btc_quote()
                .map(|btc| format_amount(btc.volume_24h, BTC)),
            circulating_supply: format_currency(coin.circulating_supply, &coin.symbol),
            logo_url: self.logo_url.render(coin),
        })
    }

    /// Activate the row at `position` of the current window
    ///
    /// Invokes `on_activate` once with the record and returns the detail
    /// reference. Nothing happens while loading or outside the window.
    pub fn activate<F>(
        &self,
        rows: &[CoinRecord],
        position: usize,
        loading: bool,
        mut on_activate: F,
    ) -> Option<RowActivation>
    where
        F: FnMut(&CoinRecord),
    {
        if loading {
            return None;
        }

        let sorted = self.sorted_indices(rows);
        let window = self.page.window(rows.len());
        let source_index = *sorted[window].get(position)?;
        let coin = &rows[source_index];

        on_activate(coin);

        Some(RowActivation {
            id: coin.id.clone(),
            name: coin.name.clone(),
            source_index,
            detail_url: self.detail_url.render(coin),
        })
    }

    pub fn logo_url(&self, coin: &CoinRecord) -> String {
        self.logo_url.render(coin)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sort Keys
// ═══════════════════════════════════════════════════════════════════════════════

/// Primary sort key of one row; missing values sort as the smallest
enum SortKey<'a> {
    Number(Option<f64>),
    Text { folded: String, raw: &'a str },
}

impl<'a> SortKey<'a> {
    fn of(coin: &'a CoinRecord, column: SortColumn) -> SortKey<'a> {
        if !column.is_numeric() {
            return SortKey::Text {
                folded: coin.name.to_lowercase(),
                raw: &coin.name,
            };
        }
        SortKey::Number(numeric_value(coin, column).filter(|v| !v.is_nan()))
    }

    /// Larger keys first
    fn compare_descending(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => compare_numbers(*b, *a),
            (
                SortKey::Text { folded: a, raw: ra },
                SortKey::Text { folded: b, raw: rb },
            ) => b.cmp(a).then_with(|| rb.cmp(ra)),
            _ => Ordering::Equal,
        }
    }
}

/// Value of a numeric column; `None` when the source omits it
fn numeric_value(coin: &CoinRecord, column: SortColumn) -> Option<f64> {
    let usd = coin.usd_quote();
    match column {
        SortColumn::Name => None,
        SortColumn::Rank => coin.rank.map(f64::from),
        SortColumn::Price => usd.and_then(|q| q.price),
        SortColumn::Change1h => usd.and_then(|q| q.percent_change_1h),
        SortColumn::Change24h => usd.and_then(|q| q.percent_change_24h),
        SortColumn::Change7d => usd.and_then(|q| q.percent_change_7d),
        SortColumn::MarketCap => usd.and_then(|q| q.market_cap),
        SortColumn::Volume24h => usd.and_then(|q| q.volume_24h),
        SortColumn::CirculatingSupply => Some(coin.circulating_supply),
    }
}

fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::coin::{QuoteIndex, QuoteVariant};
    use crate::model::format::MISSING;

    fn quote(code: &str, price: f64) -> QuoteVariant {
        QuoteVariant {
            currency_code: code.to_string(),
            price: Some(price),
            percent_change_1h: Some(0.5),
            percent_change_24h: Some(-1.25),
            percent_change_7d: Some(0.0),
            market_cap: Some(price * 1000.0),
            volume_24h: Some(price * 10.0),
        }
    }

    fn coin(id: u64, name: &str, usd_price: f64) -> CoinRecord {
        CoinRecord {
            id: CoinId::Numeric(id),
            rank: Some(id as u32),
            name: name.to_string(),
            symbol: name.to_uppercase(),
            slug: name.to_lowercase(),
            circulating_supply: 1000.0,
            total_supply: None,
            max_supply: None,
            market_pair_count: None,
            date_added: None,
            quotes: QuoteIndex::from(vec![quote("USD", usd_price), quote("BTC", usd_price / 2.0)]),
        }
    }

    fn without_usd(mut record: CoinRecord) -> CoinRecord {
        record.quotes = QuoteIndex::from(vec![quote("BTC", 1.0)]);
        record
    }

    fn engine(page_size: usize) -> TableEngine {
        TableEngine::new(TableOptions {
            page_size,
            ..TableOptions::default()
        })
    }

    fn visible_ids(view: &TableView) -> Vec<CoinId> {
        match view {
            TableView::Ready(page) => page
                .rows
                .iter()
                .map(|row| row.cells.as_ref().unwrap().id.clone())
                .collect(),
            TableView::Loading { .. } => panic!("expected a ready view"),
        }
    }

    fn page(view: &TableView) -> &PageView {
        match view {
            TableView::Ready(page) => page,
            TableView::Loading { .. } => panic!("expected a ready view"),
        }
    }

    fn prices(rows: &[CoinRecord], order: &[usize]) -> Vec<f64> {
        order
            .iter()
            .map(|&i| rows[i].usd_quote().unwrap().price.unwrap())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sort state
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_default_sort_is_rank_ascending() {
        let engine = TableEngine::default();
        assert_eq!(engine.sort_state(), SortState::default());
        assert_eq!(engine.sort_state().column, SortColumn::Rank);
        assert_eq!(engine.sort_state().direction, SortDirection::Ascending);
    }

    #[test]
    fn test_set_sort_toggles_once_per_call() {
        let mut engine = TableEngine::default();

        let first = engine.set_sort(SortColumn::Price).unwrap();
        assert_eq!(first.direction, SortDirection::Ascending);

        let second = engine.set_sort(SortColumn::Price).unwrap();
        assert_eq!(second.direction, SortDirection::Descending);

        let third = engine.set_sort(SortColumn::Price).unwrap();
        assert_eq!(third.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_arg_sets_direction_without_toggling() {
        let mut engine = TableEngine::default();

        let state = engine.set_sort_from_arg("rank").unwrap();
        assert_eq!(state.column, SortColumn::Rank);
        assert_eq!(state.direction, SortDirection::Ascending);

        let state = engine.set_sort_from_arg("market_cap:desc").unwrap();
        assert_eq!(state.column, SortColumn::MarketCap);
        assert_eq!(state.direction, SortDirection::Descending);

        let state = engine.set_sort_from_arg("market_cap").unwrap();
        assert_eq!(state.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_arg_rejects_bad_input() {
        let mut engine = TableEngine::default();
        engine.set_sort(SortColumn::Price).unwrap();

        assert!(engine.set_sort_from_arg("price:sideways").is_err());
        assert!(engine.set_sort_from_arg("colour:asc").is_err());
        assert_eq!(engine.sort_state().column, SortColumn::Price);
        assert_eq!(engine.sort_state().direction, SortDirection::Ascending);
    }

    #[test]
    fn test_new_column_resets_to_ascending() {
        let mut engine = TableEngine::default();
        engine.set_sort(SortColumn::Price).unwrap();
        engine.set_sort(SortColumn::Price).unwrap();

        let state = engine.set_sort(SortColumn::MarketCap).unwrap();
        assert_eq!(state.column, SortColumn::MarketCap);
        assert_eq!(state.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_invalid_sort_column_leaves_state_unchanged() {
        let mut engine = TableEngine::default();
        engine.set_sort(SortColumn::Price).unwrap();
        let before = engine.sort_state();

        let err = engine.set_sort_by_name("colour").unwrap_err();
        assert_eq!(err, TableError::InvalidSortColumn("colour".to_string()));
        assert_eq!(engine.sort_state(), before);
    }

    #[test]
    fn test_basic_column_set_rejects_extended_columns() {
        let mut engine = TableEngine::new(TableOptions {
            columns: ColumnSet::Basic,
            ..TableOptions::default()
        });

        assert!(matches!(
            engine.set_sort(SortColumn::Change7d),
            Err(TableError::InvalidSortColumn(_))
        ));
        assert_eq!(engine.sort_state(), SortState::default());
        assert!(engine.set_sort(SortColumn::Change24h).is_ok());
    }

    #[test]
    fn test_column_names_parse() {
        assert_eq!("id".parse::<SortColumn>().unwrap(), SortColumn::Rank);
        assert_eq!("cmcRank".parse::<SortColumn>().unwrap(), SortColumn::Rank);
        assert_eq!(
            "percentChange24h".parse::<SortColumn>().unwrap(),
            SortColumn::Change24h
        );
        assert_eq!(
            "marketCap".parse::<SortColumn>().unwrap(),
            SortColumn::MarketCap
        );
        for column in SortColumn::all() {
            assert_eq!(column.key().parse::<SortColumn>().unwrap(), column);
        }
    }

    #[test]
    fn test_column_sets() {
        assert_eq!(ColumnSet::Extended.columns().len(), 9);
        let basic = ColumnSet::Basic.columns();
        assert_eq!(basic.len(), 7);
        assert!(!basic.contains(&SortColumn::Change1h));
        assert!(!basic.contains(&SortColumn::Change7d));

        assert_eq!(ColumnSet::Basic.column_at(4), Some(SortColumn::Change24h));
        assert_eq!(ColumnSet::Extended.column_at(4), Some(SortColumn::Change1h));
        assert_eq!(ColumnSet::Extended.column_at(0), None);
        assert_eq!(ColumnSet::Basic.column_at(8), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_numeric_sort_is_monotonic_both_directions() {
        let rows = vec![
            coin(1, "a", 5.0),
            coin(2, "b", 1.0),
            coin(3, "c", 9.0),
            coin(4, "d", 3.0),
            coin(5, "e", 7.0),
        ];
        let mut engine = TableEngine::default();

        engine.set_sort(SortColumn::Price).unwrap();
        let ascending = prices(&rows, &engine.sorted_indices(&rows));
        assert!(ascending.windows(2).all(|w| w[0] <= w[1]));

        engine.set_sort(SortColumn::Price).unwrap();
        let descending = prices(&rows, &engine.sorted_indices(&rows));
        assert!(descending.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_equal_keys_keep_input_order_in_both_directions() {
        let rows = vec![
            coin(10, "x", 2.0),
            coin(11, "tie-first", 5.0),
            coin(12, "y", 1.0),
            coin(13, "tie-second", 5.0),
            coin(14, "tie-third", 5.0),
        ];
        let mut engine = TableEngine::default();

        engine.set_sort(SortColumn::Price).unwrap();
        let ascending = engine.sorted_indices(&rows);
        assert_eq!(ascending, vec![2, 0, 1, 3, 4]);

        engine.set_sort(SortColumn::Price).unwrap();
        let descending = engine.sorted_indices(&rows);
        assert_eq!(descending, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let rows = vec![
            coin(1, "cardano", 1.0),
            coin(2, "Bitcoin", 1.0),
            coin(3, "aave", 1.0),
        ];
        let mut engine = TableEngine::default();
        engine.set_sort(SortColumn::Name).unwrap();

        assert_eq!(engine.sorted_indices(&rows), vec![2, 1, 0]);
    }

    #[test]
    fn test_missing_values_sort_as_smallest() {
        let mut unranked = coin(9, "unranked", 1.0);
        unranked.rank = None;
        let rows = vec![coin(2, "b", 1.0), unranked, coin(1, "a", 1.0)];
        let mut engine = TableEngine::default();

        assert_eq!(engine.sorted_indices(&rows), vec![1, 2, 0]);

        engine.set_sort(SortColumn::Rank).unwrap();
        assert_eq!(engine.sorted_indices(&rows), vec![0, 2, 1]);
    }

    /// Record with explicit values for every numeric column
    fn valued(
        id: u64,
        rank: Option<u32>,
        usd: [Option<f64>; 6],
        supply: f64,
    ) -> CoinRecord {
        let [price, change_1h, change_24h, change_7d, market_cap, volume] = usd;
        let mut record = coin(id, &format!("coin-{}", id), 1.0);
        record.rank = rank;
        record.circulating_supply = supply;
        record.quotes = QuoteIndex::from(vec![QuoteVariant {
            currency_code: "USD".to_string(),
            price,
            percent_change_1h: change_1h,
            percent_change_24h: change_24h,
            percent_change_7d: change_7d,
            market_cap,
            volume_24h: volume,
        }]);
        record
    }

    fn mixed_rows() -> Vec<CoinRecord> {
        vec![
            valued(1, Some(3), [Some(2.0), Some(0.5), Some(-1.0), None, Some(100.0), Some(5.0)], 10.0),
            valued(2, None, [Some(1.0), Some(0.5), None, Some(2.0), Some(100.0), Some(7.0)], 20.0),
            valued(3, Some(1), [Some(2.0), None, Some(3.0), Some(2.0), Some(50.0), Some(5.0)], 10.0),
            valued(4, Some(3), [Some(0.5), Some(-2.0), Some(-1.0), Some(0.0), Some(300.0), None], 30.0),
            valued(5, Some(2), [None, Some(0.5), Some(3.0), None, Some(50.0), Some(5.0)], 20.0),
        ]
    }

    #[test]
    fn test_every_numeric_column_sorts_stably_both_ways() {
        let rows = mixed_rows();

        for column in SortColumn::all().into_iter().filter(|c| c.is_numeric()) {
            let mut engine = TableEngine::default();
            for _ in 0..2 {
                let state = engine.set_sort(column).unwrap();
                let order = engine.sorted_indices(&rows);
                let key = |i: usize| numeric_value(&rows[i], column).unwrap_or(f64::NEG_INFINITY);

                for pair in order.windows(2) {
                    let (a, b) = (key(pair[0]), key(pair[1]));
                    match state.direction {
                        SortDirection::Ascending => assert!(a <= b, "{} ascending: {:?}", column, order),
                        SortDirection::Descending => assert!(a >= b, "{} descending: {:?}", column, order),
                    }
                    if a == b {
                        assert!(pair[0] < pair[1], "{} tie out of input order: {:?}", column, order);
                    }
                }
            }
        }
    }

    #[test]
    fn test_absent_percent_change_sorts_as_smallest() {
        let rows = mixed_rows();
        let mut engine = TableEngine::default();

        engine.set_sort(SortColumn::Change24h).unwrap();
        assert_eq!(engine.sorted_indices(&rows), vec![1, 0, 3, 2, 4]);

        engine.set_sort(SortColumn::Change24h).unwrap();
        assert_eq!(engine.sorted_indices(&rows), vec![2, 4, 0, 3, 1]);

        engine.set_sort(SortColumn::Change7d).unwrap();
        assert_eq!(engine.sorted_indices(&rows), vec![0, 4, 3, 1, 2]);
    }

    #[test]
    fn test_null_usd_amounts_render_as_missing() {
        let rows = mixed_rows();
        let engine = TableEngine::default();

        let unpriced = engine.row_cells(&rows[4]).unwrap();
        assert_eq!(unpriced.price, MISSING);
        assert_eq!(unpriced.change_7d.map(|c| c.trend), Some(None));

        let no_volume = engine.row_cells(&rows[3]).unwrap();
        assert_eq!(no_volume.volume, MISSING);
        assert_eq!(no_volume.market_cap, "$300.00");
    }

    #[test]
    fn test_sort_does_not_touch_caller_rows() {
        let rows = vec![coin(1, "a", 3.0), coin(2, "b", 1.0)];
        let snapshot = rows.clone();
        let mut engine = TableEngine::default();
        engine.set_sort(SortColumn::Price).unwrap();

        let _ = engine.view(&rows, false);
        assert_eq!(rows, snapshot);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Paging
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_price_scenario_pages() {
        let rows = vec![coin(1, "a", 10.0), coin(2, "b", 30.0), coin(3, "c", 20.0)];
        let mut engine = engine(2);
        engine.set_sort(SortColumn::Price).unwrap();

        let first = engine.view(&rows, false);
        assert_eq!(
            visible_ids(&first),
            vec![CoinId::Numeric(1), CoinId::Numeric(3)]
        );
        assert_eq!(page(&first).empty_rows, 0);

        engine.set_page(1);
        let second = engine.view(&rows, false);
        assert_eq!(visible_ids(&second), vec![CoinId::Numeric(2)]);
        assert_eq!(page(&second).empty_rows, 1);
        assert_eq!(page(&second).page_count, 2);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let rows = vec![coin(1, "a", 10.0), coin(2, "b", 30.0), coin(3, "c", 20.0)];
        let mut engine = engine(2);
        engine.set_page(5);

        let view = engine.view(&rows, false);
        let page = page(&view);
        assert!(page.rows.is_empty());
        assert_eq!(page.empty_rows, 9);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_pages_cover_sorted_sequence_exactly() {
        let rows: Vec<CoinRecord> = (0..23)
            .map(|i| coin(i, &format!("c{}", i), ((i * 7) % 11) as f64))
            .collect();
        let mut engine = engine(5);
        engine.set_sort(SortColumn::Price).unwrap();
        let expected = engine.sorted_indices(&rows);

        let mut seen = Vec::new();
        for index in 0..engine.page_state().page_count(rows.len()) {
            engine.set_page(index);
            if let TableView::Ready(page) = engine.view(&rows, false) {
                seen.extend(page.rows.iter().map(|r| r.source_index));
            }
        }

        assert_eq!(seen, expected);
    }

    #[test]
    fn test_set_page_size_resets_page() {
        let mut engine = engine(5);
        engine.set_page(3);

        engine.set_page_size(25).unwrap();
        assert_eq!(
            engine.page_state(),
            PageState {
                page_index: 0,
                page_size: 25
            }
        );
    }

    #[test]
    fn test_set_page_size_rejects_unknown_sizes() {
        let mut engine = engine(5);
        engine.set_page(2);

        assert_eq!(engine.set_page_size(0), Err(TableError::InvalidPageSize(0)));
        assert_eq!(engine.set_page_size(7), Err(TableError::InvalidPageSize(7)));
        assert_eq!(engine.page_state().page_index, 2);
        assert_eq!(engine.page_state().page_size, 5);
    }

    #[test]
    fn test_configured_page_size_joins_allowed_set() {
        let engine = engine(20);
        assert_eq!(engine.page_size_options(), &[5, 10, 20, 25]);
    }

    #[test]
    fn test_cycle_page_size_wraps() {
        let mut engine = engine(25);
        engine.set_page(1);

        assert_eq!(engine.cycle_page_size(true), 5);
        assert_eq!(engine.page_state().page_index, 0);
        assert_eq!(engine.cycle_page_size(false), 25);
        assert_eq!(engine.cycle_page_size(false), 10);
    }

    #[test]
    fn test_next_and_previous_page_stay_in_range() {
        let mut engine = engine(5);

        engine.next_page(12);
        engine.next_page(12);
        engine.next_page(12);
        assert_eq!(engine.page_state().page_index, 2);

        engine.previous_page();
        engine.previous_page();
        engine.previous_page();
        assert_eq!(engine.page_state().page_index, 0);

        engine.next_page(0);
        assert_eq!(engine.page_state().page_index, 0);
    }

    #[test]
    fn test_sync_row_count_resets_when_list_shrinks() {
        let mut engine = engine(5);
        engine.set_page(3);

        engine.sync_row_count(40);
        assert_eq!(engine.page_state().page_index, 3);

        engine.sync_row_count(15);
        assert_eq!(engine.page_state().page_index, 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cells
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_usd_only_fails_that_row() {
        let rows = vec![
            coin(1, "a", 10.0),
            without_usd(coin(2, "broken", 10.0)),
            coin(3, "c", 20.0),
        ];
        let engine = engine(10);

        let view = engine.view(&rows, false);
        let page = page(&view);
        assert_eq!(page.rows.len(), 3);
        assert!(page.rows[0].cells.is_ok());
        assert_eq!(
            page.rows[1].cells,
            Err(TableError::MissingRequiredQuote {
                coin: "broken (BROKEN)".to_string()
            })
        );
        assert!(page.rows[2].cells.is_ok());
    }

    #[test]
    fn test_missing_btc_omits_secondary_volume() {
        let mut record = coin(1, "solo", 4.0);
        record.quotes = QuoteIndex::from(vec![quote("USD", 4.0)]);
        let engine = TableEngine::default();

        let cells = engine.row_cells(&record).unwrap();
        assert_eq!(cells.volume, "$40.00");
        assert_eq!(cells.volume_btc, None);
    }

    #[test]
    fn test_row_cells_formatting() {
        let mut record = coin(7, "bitcoin", 1234567.891);
        record.quotes = QuoteIndex::from(vec![quote("USD", 1234567.891), quote("BTC", 42.5)]);
        let cells = TableEngine::default().row_cells(&record).unwrap();

        assert_eq!(cells.rank, "7");
        assert_eq!(cells.price, "$1,234,567.89");
        assert_eq!(cells.change_24h.text, "1.25%");
        assert_eq!(cells.change_7d.map(|c| c.text), Some("0.00%".to_string()));
        assert_eq!(cells.volume_btc, Some("425.00 BTC".to_string()));
        assert_eq!(cells.circulating_supply, "1,000.00 BITCOIN");
        assert_eq!(
            cells.logo_url,
            "https://s2.coinmarketcap.com/static/img/coins/64x64/7.png"
        );
    }

    #[test]
    fn test_basic_column_set_hides_extended_cells() {
        let engine = TableEngine::new(TableOptions {
            columns: ColumnSet::Basic,
            ..TableOptions::default()
        });
        let cells = engine.row_cells(&coin(1, "a", 1.0)).unwrap();

        assert!(cells.change_1h.is_none());
        assert!(cells.change_7d.is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading & activation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_loading_reports_placeholders() {
        let rows = vec![coin(1, "a", 1.0)];
        let basic = TableEngine::new(TableOptions {
            columns: ColumnSet::Basic,
            ..TableOptions::default()
        });

        assert_eq!(
            basic.view(&rows, true),
            TableView::Loading {
                placeholder_rows: PLACEHOLDER_ROWS,
                columns: 7
            }
        );
        assert_eq!(basic.view(&rows, true).row_count(), 0);
    }

    #[test]
    fn test_activate_fires_callback_once_with_sorted_row() {
        let rows = vec![coin(1, "a", 10.0), coin(2, "b", 30.0), coin(3, "c", 20.0)];
        let mut engine = engine(2);
        engine.set_sort(SortColumn::Price).unwrap();
        engine.set_sort(SortColumn::Price).unwrap();

        let mut activated = Vec::new();
        let activation = engine
            .activate(&rows, 1, false, |coin| activated.push(coin.id.clone()))
            .unwrap();

        assert_eq!(activated, vec![CoinId::Numeric(3)]);
        assert_eq!(activation.source_index, 2);
        assert_eq!(
            activation.detail_url,
            "https://coinmarketcap.com/currencies/c/"
        );
    }

    #[test]
    fn test_activate_outside_window_or_loading_does_nothing() {
        let rows = vec![coin(1, "a", 10.0)];
        let engine = engine(2);
        let mut calls = 0;

        assert!(engine.activate(&rows, 1, false, |_| calls += 1).is_none());
        assert!(engine.activate(&rows, 0, true, |_| calls += 1).is_none());
        assert_eq!(calls, 0);
    }
}
