use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    pub catalog: CatalogSettings,
    pub search: SearchSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Page size for general searches
    pub page_size: usize,
    /// Page size for the per-glossary category fetch
    pub hierarchy_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Per-module level overrides, e.g. `atlan_asset_core::logic::hierarchy = "debug"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_token: None,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            hierarchy_page_size: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            modules: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&ClientConfig::default())?);

        config = config.add_source(config::File::with_name("atlan").required(false));

        // Environment variables with prefix "ATLAN_", e.g. ATLAN_SEARCH__PAGE_SIZE
        config = config.add_source(
            config::Environment::with_prefix("ATLAN")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let client_config: ClientConfig = config.try_deserialize()?;

        Ok(client_config)
    }

    /// API token from config, falling back to the `ATLAN_API_KEY` variable
    pub fn api_token(&self) -> Option<String> {
        if let Some(token) = &self.catalog.api_token {
            return Some(token.clone());
        }
        std::env::var("ATLAN_API_KEY").ok()
    }
}
