use crate::config::ClientConfig;
use crate::model::{AssetType, FluentSearch};
use crate::store::Catalog;
use std::sync::Arc;

/// Handle passed explicitly to every core operation.
///
/// Wraps the catalog collaborator together with client settings. Cloning is
/// cheap and clones share the same collaborator, so one handle can be used
/// from many tasks at once.
#[derive(Debug)]
pub struct AtlanClient<S> {
    store: Arc<S>,
    config: ClientConfig,
}

impl<S> Clone for AtlanClient<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Catalog> AtlanClient<S> {
    pub fn new(store: S, config: ClientConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, ClientConfig::default())
    }

    /// Build a client whose settings come from the environment and config file
    pub fn from_env(store: S) -> anyhow::Result<Self> {
        let config = ClientConfig::load()?;
        Ok(Self::new(store, config))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a search over `asset_type` using the configured page size
    pub fn select(&self, asset_type: AssetType) -> FluentSearch {
        FluentSearch::select(asset_type).page_size(self.config.search.page_size)
    }
}
