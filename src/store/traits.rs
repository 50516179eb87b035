use crate::model::{Asset, AssetType, FluentSearch};
use anyhow::Result;

/// Runs type-filtered searches against the catalog
#[async_trait::async_trait]
pub trait SearchStore: Send + Sync {
    /// Run the search to completion, returning every matching asset in the
    /// requested sort order. Re-running the request re-issues the query.
    async fn search(&self, request: &FluentSearch) -> Result<Vec<Asset>>;
}

/// Point lookups of a single asset
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    async fn get_by_guid(&self, guid: &str, include_relationships: bool) -> Result<Option<Asset>>;

    async fn get_by_qualified_name(
        &self,
        asset_type: &AssetType,
        qualified_name: &str,
        include_relationships: bool,
    ) -> Result<Option<Asset>>;
}

/// Writes against the catalog
#[async_trait::async_trait]
pub trait MutationStore: Send + Sync {
    /// Create or partially update one asset.
    ///
    /// Assets with a pending GUID and an unknown qualifiedName are created;
    /// otherwise the existing asset is updated with only the fields present.
    /// The result echoes the submitted fields with the persisted GUID, not the
    /// full post-update state.
    async fn save(&self, asset: Asset) -> Result<Asset>;
}

pub trait Catalog: SearchStore + AssetStore + MutationStore + Send + Sync {}

impl<T: SearchStore + AssetStore + MutationStore + Send + Sync> Catalog for T {}
