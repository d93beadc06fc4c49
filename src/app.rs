//! Root application component
//!
//! The App owns the table engine, the market snapshot and the background
//! fetcher. It routes input to the top modal or the market table and
//! applies the resulting Actions to engine state.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    draw_dashboard, CoinDetailDialog, DashboardContext, HelpDialog, MarketTableComponent,
    PageSizeDialog, QuitDialog,
};
use crate::config::Config;
use crate::model::modal::{Modal, ModalStack};
use crate::model::{CoinRecord, MarketState, RowActivation, TableEngine, TableOptions};
use crate::services::{MarketFetcher, MarketSource};
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Sort and page state plus cell derivation
    pub engine: TableEngine,

    /// Rows of the last successful fetch and the fetch status
    pub market: MarketState,

    pub fetcher: MarketFetcher,

    /// Where the fetcher reads listings from
    pub source: MarketSource,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    /// Detail page to open (set by OpenInBrowser, handled by the main loop)
    pub pending_browser_url: Option<String>,

    /// Rows activated this session
    pub activation_count: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub table: MarketTableComponent,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub page_size_dialog: PageSizeDialog,
    pub coin_detail: CoinDetailDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    pub fn new(config: &Config) -> App {
        Self::with_source(config.table_options(), config.market_source())
    }

    pub fn with_source(options: TableOptions, source: MarketSource) -> App {
        App {
            engine: TableEngine::new(options),
            market: MarketState::new(),
            fetcher: MarketFetcher::new(),
            source,
            modals: ModalStack::new(),
            should_quit: false,
            status_message: None,
            pending_browser_url: None,
            activation_count: 0,
            table: MarketTableComponent::new(),
            quit_dialog: QuitDialog::default(),
            help_dialog: HelpDialog::default(),
            page_size_dialog: PageSizeDialog::default(),
            coin_detail: CoinDetailDialog,
        }
    }

    /// Start a background fetch; rows stay on screen until it completes
    pub fn refresh(&mut self) {
        self.market.begin_loading();
        self.status_message = None;
        self.fetcher.spawn(self.source.clone());
    }

    /// Apply a finished fetch, if any
    fn poll_fetcher(&mut self) {
        let Some(outcome) = self.fetcher.poll() else {
            return;
        };

        if self.market.apply(outcome) {
            let total = self.market.rows.len();
            self.engine.sync_row_count(total);
            self.status_message = Some(format!("Loaded {} coins", total));
        }
    }

    /// Skeleton rows replace data only before the first snapshot
    fn placeholders(&self) -> bool {
        self.market.show_placeholders()
    }

    /// Activate the row at a window position and open its detail overlay
    fn activate(&mut self, position: usize) {
        let mut activated = None;
        let activation = self.engine.activate(
            &self.market.rows,
            position,
            self.placeholders(),
            |coin| {
                tracing::info!(id = %coin.id, symbol = %coin.symbol, "Row activated");
                activated = Some(coin.display_name());
            },
        );

        let Some(activation) = activation else {
            return;
        };

        self.activation_count += 1;
        if let Some(name) = activated {
            self.status_message = Some(format!("Selected {}", name));
        }
        self.modals.push(Modal::CoinDetail { activation });
    }

    /// Record shown by the detail overlay
    ///
    /// A refresh may reorder or replace the rows after activation, so the
    /// stored index is only a hint and the id decides.
    fn detail_coin(&self, activation: &RowActivation) -> Option<&CoinRecord> {
        let rows = &self.market.rows;
        rows.get(activation.source_index)
            .filter(|coin| coin.id == activation.id)
            .or_else(|| rows.iter().find(|coin| coin.id == activation.id))
    }

    fn page_size_index(&self) -> usize {
        let current = self.engine.page_state().page_size;
        self.engine
            .page_size_options()
            .iter()
            .position(|size| *size == current)
            .unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        self.refresh();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.modals.top() {
            Some(Modal::QuitConfirm) => self.quit_dialog.handle_key_event(key),
            Some(Modal::CoinDetail { .. }) => self.coin_detail.handle_key_event(key),
            Some(Modal::PageSize { .. }) => self.page_size_dialog.handle_key_event(key),
            Some(Modal::Help) => self.help_dialog.handle_key_event(key),
            None => self.table.handle_key_event(key),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if !self.modals.is_empty() {
            return Ok(None);
        }
        self.table.handle_mouse_event(mouse)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => self.poll_fetcher(),
            Action::Resize(_, _) => {}
            Action::ForceQuit => {
                self.should_quit = true;
            }

            // ─────────────────────────────────────────────────────────────────
            // Row Cursor (delegate to the table)
            // ─────────────────────────────────────────────────────────────────
            Action::NextRow | Action::PrevRow | Action::FirstRow | Action::LastRow => {
                self.table.update(action)?;
            }

            // ─────────────────────────────────────────────────────────────────
            // Table
            // ─────────────────────────────────────────────────────────────────
            Action::NextPage => {
                self.engine.next_page(self.market.rows.len());
                self.table.update(action)?;
            }
            Action::PrevPage => {
                self.engine.previous_page();
                self.table.update(action)?;
            }
            Action::SortBy(column) => match self.engine.set_sort(column) {
                Ok(sort) => {
                    tracing::debug!(column = %sort.column, direction = ?sort.direction, "Sort changed");
                    self.table.update(action)?;
                }
                Err(err) => self.status_message = Some(err.to_string()),
            },
            Action::SortByPosition(position) => {
                return Ok(self.engine.columns().column_at(position).map(Action::SortBy));
            }
            Action::NextPageSize | Action::PrevPageSize => {
                let size = self
                    .engine
                    .cycle_page_size(action == Action::NextPageSize);
                self.status_message = Some(format!("{} rows per page", size));
                self.table.update(action)?;
            }
            Action::ActivateRow(position) => self.activate(position),
            Action::ActivateSelected => self.activate(self.table.selected),
            Action::Refresh => self.refresh(),

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.fetch_in_flight = self.fetcher.is_running();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::OpenPageSizeDialog => {
                self.modals.push(Modal::PageSize {
                    selected_index: self.page_size_index(),
                });
            }
            Action::OpenInBrowser => {
                if let Some(Modal::CoinDetail { activation }) = self.modals.top() {
                    self.pending_browser_url = Some(activation.detail_url.clone());
                }
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => match self.modals.top().cloned() {
                Some(Modal::QuitConfirm) => {
                    self.should_quit = true;
                }
                Some(Modal::PageSize { selected_index }) => {
                    let size = self.engine.page_size_options().get(selected_index).copied();
                    if let Some(size) = size {
                        match self.engine.set_page_size(size) {
                            Ok(()) => {
                                self.table.reset_selection();
                                self.status_message = Some(format!("{} rows per page", size));
                            }
                            Err(err) => self.status_message = Some(err.to_string()),
                        }
                    }
                    self.modals.pop();
                }
                _ => {}
            },
            Action::ModalUp => {
                if let Some(Modal::PageSize { selected_index }) = self.modals.top_mut() {
                    *selected_index = selected_index.saturating_sub(1);
                }
            }
            Action::ModalDown => {
                let max = self.engine.page_size_options().len().saturating_sub(1);
                if let Some(Modal::PageSize { selected_index }) = self.modals.top_mut() {
                    if *selected_index < max {
                        *selected_index += 1;
                    }
                }
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let view = self.engine.view(&self.market.rows, self.placeholders());
        self.table.set_view(
            view,
            self.engine.sort_state(),
            self.engine.columns().columns(),
        );

        let source = self.source.describe();
        let ctx = DashboardContext {
            source: &source,
            total: self.market.rows.len(),
            page: self.engine.page_state(),
            sort: self.engine.sort_state(),
            loading: self.market.loading,
            elapsed: self.fetcher.elapsed(),
            last_updated: self.market.formatted_update_time(),
            error: self.market.error.as_deref(),
            status_message: self.status_message.as_deref(),
        };
        draw_dashboard(frame, area, &mut self.table, &ctx)?;

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help => self.help_dialog.draw(frame, area)?,
            Modal::PageSize { selected_index } => {
                let current = self.engine.page_state().page_size;
                self.page_size_dialog.draw_with_options(
                    frame,
                    area,
                    self.engine.page_size_options(),
                    current,
                    *selected_index,
                )?;
            }
            Modal::CoinDetail { activation } => {
                let coin = self.detail_coin(activation).cloned();
                let coin = coin.as_ref();
                let logo = coin.map(|coin| self.engine.logo_url(coin));
                self.coin_detail.draw_with_coin(
                    frame,
                    area,
                    activation,
                    coin,
                    logo.as_deref(),
                )?;
            }
        }
        Ok(())
    }
}
