//! Model layer - market data and table state
//!
//! - `coin` - listing records and their quote variants
//! - `table` - the table engine (sort, paging, cell derivation)
//! - `market` - the current row snapshot and fetch status
//! - `modal` - overlay management

pub mod coin;
pub mod format;
pub mod link;
pub mod market;
pub mod modal;
pub mod table;

// Re-export commonly used types
pub use coin::CoinRecord;
pub use market::{FetchOutcome, MarketState};
pub use table::{ColumnSet, RowActivation, SortColumn, TableEngine, TableOptions, TableView};
