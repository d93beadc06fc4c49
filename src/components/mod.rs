//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod coin_detail;
pub mod dashboard;
pub mod help_dialog;
pub mod layout;
pub mod market_table;
pub mod page_size_dialog;
pub mod quit_dialog;

pub use coin_detail::CoinDetailDialog;
pub use dashboard::{draw_dashboard, DashboardContext};
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use market_table::MarketTableComponent;
pub use page_size_dialog::PageSizeDialog;
pub use quit_dialog::QuitDialog;
