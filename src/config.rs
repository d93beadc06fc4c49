use crate::cli::Cli;
use crate::model::link::{DEFAULT_DETAIL_URL, DEFAULT_LOGO_URL};
use crate::model::table::DEFAULT_PAGE_SIZES;
use crate::model::{ColumnSet, TableOptions};
use crate::services::market::{MarketQuery, MarketSource, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    /// Number of coins requested per fetch
    pub limit: u32,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub columns: ColumnSet,
    /// Extra query parameters for the listing endpoint
    pub params: BTreeMap<String, String>,
    /// Detail page URL with `{id}`, `{slug}` or `{symbol}` placeholders
    pub detail_url_template: String,
    pub logo_url_template: String,
    /// Browser command for opening detail pages
    pub browser: Option<String>,
    /// Read rows from this file instead of the endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            limit: 20,
            page_size: 10,
            page_size_options: DEFAULT_PAGE_SIZES.to_vec(),
            columns: ColumnSet::Extended,
            params: BTreeMap::new(),
            detail_url_template: DEFAULT_DETAIL_URL.to_string(),
            logo_url_template: DEFAULT_LOGO_URL.to_string(),
            browser: None,
            snapshot: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".coin-tui"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the config file, falling back to defaults
    pub fn load() -> Config {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    pub fn load_from(path: &Path) -> Config {
        if !path.exists() {
            return Config::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| serde_json::from_str(&contents).map_err(anyhow::Error::from));

        match parsed {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Ignoring invalid config file");
                Config::default()
            }
        }
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Override file values with command-line flags
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(limit) = cli.limit {
            self.limit = limit;
        }
        if let Some(page_size) = cli.page_size {
            self.page_size = page_size;
        }
        if cli.basic {
            self.columns = ColumnSet::Basic;
        }
        if let Some(endpoint) = &cli.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(snapshot) = &cli.snapshot {
            self.snapshot = Some(snapshot.clone());
        }
        for (key, value) in &cli.params {
            self.params.insert(key.clone(), value.clone());
        }
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            columns: self.columns,
            page_size: self.page_size,
            page_size_options: self.page_size_options.clone(),
            detail_url: self.detail_url_template.clone(),
            logo_url: self.logo_url_template.clone(),
        }
    }

    pub fn market_source(&self) -> MarketSource {
        match &self.snapshot {
            Some(path) => MarketSource::Snapshot(path.clone()),
            None => MarketSource::Http {
                endpoint: self.endpoint.clone(),
                query: MarketQuery::default()
                    .with_limit(self.limit)
                    .with_overrides(&self.params),
            },
        }
    }
}
