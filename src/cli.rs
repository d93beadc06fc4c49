//! Command-line arguments

use crate::services::market::parse_param;
use clap::Parser;
use std::path::PathBuf;

/// Cryptocurrency market table in the terminal
#[derive(Debug, Parser)]
#[command(name = "coin-tui", version, about)]
pub struct Cli {
    /// Number of coins to request from the listing endpoint
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Rows per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Show the basic column set (no 1h and 7d changes)
    #[arg(long)]
    pub basic: bool,

    /// Initial sort, e.g. `price`, `24h` or `market_cap:desc`
    #[arg(long, value_name = "COLUMN[:asc|desc]")]
    pub sort: Option<String>,

    /// Extra query parameter passed to the listing endpoint (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Read the listing from a saved JSON file instead of the network
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Listing endpoint URL
    #[arg(long, value_name = "URL", env = "COIN_TUI_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Write the effective settings to the config file
    #[arg(long)]
    pub save_config: bool,
}
