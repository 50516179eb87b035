use crate::client::AtlanClient;
use crate::error::{AtlanError, Result};
use crate::model::{is_guid_shaped, Asset, AssetType};
use crate::store::Catalog;
use log::debug;

/// Fetch one asset of `asset_type` by GUID or qualifiedName.
///
/// Identifiers shaped like a UUID are looked up by GUID, anything else by
/// qualifiedName within `asset_type`. A blank identifier is reported as a
/// missing GUID `(null)`.
pub async fn get<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    identifier: &str,
    include_relationships: bool,
) -> Result<Asset> {
    if identifier.trim().is_empty() {
        return Err(AtlanError::AssetNotFoundByGuid {
            guid: "(null)".to_string(),
        });
    }
    if is_guid_shaped(identifier) {
        get_by_guid(client, asset_type, identifier, include_relationships).await
    } else {
        get_by_qualified_name(client, asset_type, identifier, include_relationships).await
    }
}

pub async fn get_by_guid<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    guid: &str,
    include_relationships: bool,
) -> Result<Asset> {
    debug!("Fetching {} by GUID {}", asset_type, guid);
    let asset = client
        .store()
        .get_by_guid(guid, include_relationships)
        .await?
        .ok_or_else(|| AtlanError::AssetNotFoundByGuid {
            guid: guid.to_string(),
        })?;
    ensure_type(asset, asset_type, guid)
}

pub async fn get_by_qualified_name<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    include_relationships: bool,
) -> Result<Asset> {
    debug!("Fetching {} by qualifiedName {}", asset_type, qualified_name);
    let asset = client
        .store()
        .get_by_qualified_name(asset_type, qualified_name, include_relationships)
        .await?
        .ok_or_else(|| AtlanError::AssetNotFoundByQualifiedName {
            type_name: asset_type.type_name().to_string(),
            qualified_name: qualified_name.to_string(),
        })?;
    ensure_type(asset, asset_type, qualified_name)
}

fn ensure_type(asset: Asset, expected: &AssetType, identifier: &str) -> Result<Asset> {
    if &asset.type_name != expected {
        return Err(AtlanError::AssetNotTypeRequested {
            identifier: identifier.to_string(),
            expected: expected.type_name().to_string(),
        });
    }
    Ok(asset)
}
