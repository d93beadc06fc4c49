//! External service interactions
//!
//! - Listing query construction, HTTP fetch and payload decoding
//! - Background fetch execution

pub mod fetcher;
pub mod market;

pub use fetcher::MarketFetcher;
pub use market::MarketSource;
