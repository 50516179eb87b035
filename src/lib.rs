pub mod client;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

pub use client::AtlanClient;
pub use config::{ClientConfig, LoggingConfig};
pub use error::{AtlanError, ErrorKind, Result};

// Export logic types
pub use logic::{
    get, get_by_guid, get_by_qualified_name, get_hierarchy, AssetBuilder, CategoryHierarchy,
    CategoryNode, Column, Connection, Database, Glossary, GlossaryCategory, GlossaryTerm, Process,
    Schema, Table, View,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{AssetStore, Catalog, InMemoryCatalog, MutationStore, SearchStore};

/// Install the env_logger backend with the configured default level and
/// per-module overrides. `RUST_LOG` still takes precedence when set.
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init_logging(config: &LoggingConfig) {
    let default_level = parse_level(&config.level);
    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level);
    for (module, level) in &config.modules {
        builder.filter_module(module, parse_level(level));
    }
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    let _ = builder.try_init();
}

fn parse_level(level: &str) -> log::LevelFilter {
    level.parse().unwrap_or(log::LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_repeatable() {
        let mut config = LoggingConfig::default();
        config
            .modules
            .insert("atlan_asset_core::logic".to_string(), "debug".to_string());
        init_logging(&config);
        init_logging(&config);
        log::info!("logger installed");
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("DEBUG"), log::LevelFilter::Debug);
        assert_eq!(parse_level("off"), log::LevelFilter::Off);
        assert_eq!(parse_level("verbose"), log::LevelFilter::Info);
    }
}
