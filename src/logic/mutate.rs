//! Single-asset update helpers.
//!
//! Collection helpers (tags and terms) read the current collection, merge
//! client-side and write the whole collection back. The rest write only the
//! field they change. Every helper returns what the catalog echoes for the
//! partial update, which is not the full post-update state of the asset.
//!
//! Nothing here is transactional: two concurrent read-modify-write calls on
//! the same collection race, and the last write wins.

use crate::client::AtlanClient;
use crate::error::{AtlanError, Result};
use crate::logic::builder::AssetBuilder;
use crate::logic::retrieve;
use crate::model::{
    fields, Announcement, Asset, AssetType, AtlanTag, CertificateStatus, Reference,
};
use crate::store::Catalog;
use log::debug;

fn require_qualified_name(asset_type: &AssetType, qualified_name: &str) -> Result<()> {
    if qualified_name.trim().is_empty() {
        return Err(AtlanError::MissingRequiredUpdateParam {
            type_name: asset_type.type_name().to_string(),
            fields: vec![fields::QUALIFIED_NAME.to_string()],
        });
    }
    Ok(())
}

/// Current state of the asset, relationships included
async fn current<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
) -> Result<Asset> {
    require_qualified_name(asset_type, qualified_name)?;
    retrieve::get_by_qualified_name(client, asset_type, qualified_name, true).await
}

/// Updater for an asset that was just read back. The qualifiedName is the
/// key; the name is echoed when known, and glossary categories and terms
/// carry their anchor.
fn updater_for(existing: &Asset, qualified_name: &str) -> AssetBuilder {
    let builder = AssetBuilder::for_update(existing.type_name.clone(), qualified_name);
    let builder = match existing.name() {
        Some(name) => builder.name(name),
        None => builder,
    };
    let anchor = existing
        .single_relation(fields::ANCHOR)
        .filter(|_| existing.type_name.is_glossary_scoped());
    match anchor {
        Some(anchor) => builder.relation(fields::ANCHOR, anchor.clone()),
        None => builder,
    }
}

async fn save<S: Catalog>(client: &AtlanClient<S>, asset: Asset) -> Result<Asset> {
    Ok(client.store().save(asset).await?)
}

/// Write only the fields set by `apply`, keyed by qualifiedName
async fn direct_set<S, F>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    apply: F,
) -> Result<Asset>
where
    S: Catalog,
    F: FnOnce(AssetBuilder) -> AssetBuilder,
{
    require_qualified_name(asset_type, qualified_name)?;
    let builder = AssetBuilder::for_update(asset_type.clone(), qualified_name);
    save(client, apply(builder).build()).await
}

/// Add tags to an asset, keeping the ones it already has. A tag that is
/// already present keeps its existing propagation options.
pub async fn append_atlan_tags<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    tags: &[AtlanTag],
) -> Result<Asset> {
    let existing = current(client, asset_type, qualified_name).await?;
    let mut merged = existing.atlan_tags.clone().unwrap_or_default();
    for tag in tags {
        if !merged.iter().any(|t| t.type_name == tag.type_name) {
            merged.push(tag.clone());
        }
    }
    debug!(
        "Writing {} tag(s) to {} {}",
        merged.len(),
        asset_type,
        qualified_name
    );
    let update = updater_for(&existing, qualified_name)
        .atlan_tags(merged)
        .build();
    save(client, update).await
}

/// Remove one tag by name. When the asset does not carry the tag nothing is
/// written and the asset is returned as read.
pub async fn remove_atlan_tag<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    tag_name: &str,
) -> Result<Asset> {
    let existing = current(client, asset_type, qualified_name).await?;
    let tags = existing.atlan_tags.clone().unwrap_or_default();
    if !tags.iter().any(|t| t.type_name == tag_name) {
        debug!(
            "{} {} has no tag {}; nothing to remove",
            asset_type, qualified_name, tag_name
        );
        return Ok(existing);
    }

    let remaining: Vec<AtlanTag> = tags
        .into_iter()
        .filter(|t| t.type_name != tag_name)
        .collect();
    let builder = updater_for(&existing, qualified_name);
    let update = if remaining.is_empty() {
        builder.null_field(fields::ATLAN_TAGS)
    } else {
        builder.atlan_tags(remaining)
    }
    .build();
    save(client, update).await
}

fn term_references(terms: &[Asset]) -> Result<Vec<Reference>> {
    terms.iter().map(Asset::trim_to_reference).collect()
}

fn with_meanings(builder: AssetBuilder, meanings: Vec<Reference>) -> AssetBuilder {
    if meanings.is_empty() {
        builder.null_field(fields::MEANINGS)
    } else {
        builder.relations(fields::MEANINGS, meanings)
    }
}

/// Link glossary terms to an asset, keeping the terms already linked
pub async fn append_terms<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    terms: &[Asset],
) -> Result<Asset> {
    let additions = term_references(terms)?;
    let existing = current(client, asset_type, qualified_name).await?;
    let mut merged: Vec<Reference> = existing.meanings().into_iter().collect();
    for term in additions {
        if !merged.iter().any(|m| m.same_target(&term)) {
            merged.push(term);
        }
    }
    debug!(
        "Writing {} term(s) to {} {}",
        merged.len(),
        asset_type,
        qualified_name
    );
    let update = with_meanings(updater_for(&existing, qualified_name), merged).build();
    save(client, update).await
}

/// Unlink glossary terms from an asset
pub async fn remove_terms<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    terms: &[Asset],
) -> Result<Asset> {
    let removals = term_references(terms)?;
    let existing = current(client, asset_type, qualified_name).await?;
    let remaining: Vec<Reference> = existing
        .meanings()
        .into_iter()
        .filter(|m| !removals.iter().any(|gone| gone.same_target(m)))
        .collect();
    debug!(
        "Keeping {} term(s) on {} {}",
        remaining.len(),
        asset_type,
        qualified_name
    );
    let update = with_meanings(updater_for(&existing, qualified_name), remaining).build();
    save(client, update).await
}

/// Set the linked glossary terms to exactly `terms`; an empty slice unlinks all
pub async fn replace_terms<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    terms: &[Asset],
) -> Result<Asset> {
    let meanings = term_references(terms)?;
    direct_set(client, asset_type, qualified_name, |builder| {
        with_meanings(builder, meanings)
    })
    .await
}

pub async fn update_certificate<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    status: CertificateStatus,
    message: Option<&str>,
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        let builder = builder.certificate(status, message);
        match message {
            Some(_) => builder,
            None => builder.null_field(fields::CERTIFICATE_STATUS_MESSAGE),
        }
    })
    .await
}

pub async fn remove_certificate<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        builder
            .null_field(fields::CERTIFICATE_STATUS)
            .null_field(fields::CERTIFICATE_STATUS_MESSAGE)
    })
    .await
}

pub async fn update_announcement<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    announcement: &Announcement,
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        let builder = builder.announcement(announcement);
        match announcement.message {
            Some(_) => builder,
            None => builder.null_field(fields::ANNOUNCEMENT_MESSAGE),
        }
    })
    .await
}

pub async fn remove_announcement<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        builder
            .null_field(fields::ANNOUNCEMENT_TYPE)
            .null_field(fields::ANNOUNCEMENT_TITLE)
            .null_field(fields::ANNOUNCEMENT_MESSAGE)
    })
    .await
}

/// Set the user-facing description (`userDescription`)
pub async fn update_description<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    description: &str,
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        builder.user_description(description)
    })
    .await
}

pub async fn remove_description<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        builder.null_field(fields::USER_DESCRIPTION)
    })
    .await
}

/// Replace the owning users and groups
pub async fn update_owners<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
    users: &[&str],
    groups: &[&str],
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        builder.owner_users(users).owner_groups(groups)
    })
    .await
}

pub async fn remove_owners<S: Catalog>(
    client: &AtlanClient<S>,
    asset_type: &AssetType,
    qualified_name: &str,
) -> Result<Asset> {
    direct_set(client, asset_type, qualified_name, |builder| {
        builder
            .null_field(fields::OWNER_USERS)
            .null_field(fields::OWNER_GROUPS)
    })
    .await
}
