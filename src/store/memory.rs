use crate::model::{
    fields, generate_guid, Asset, AssetType, FluentSearch, Guid, Reference, Relation,
    SaveSemantic, UniqueAttributes,
};
use crate::store::traits::{AssetStore, MutationStore, SearchStore};
use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct CatalogState {
    /// Assets keyed by persisted GUID
    assets: HashMap<String, Asset>,
    /// (type, qualifiedName) -> GUID
    by_qualified_name: HashMap<(AssetType, String), String>,
}

impl CatalogState {
    /// Fill in whichever identifier a reference is missing, the way the
    /// catalog returns relationship edges
    fn resolve_reference(&self, reference: &Reference) -> Reference {
        let mut resolved = reference.clone();
        let stored = match reference.guid.as_ref().and_then(Guid::as_persisted) {
            Some(guid) => self.assets.get(guid),
            None => reference.qualified_name().and_then(|qn| {
                self.by_qualified_name
                    .get(&(reference.type_name.clone(), qn.to_string()))
                    .and_then(|guid| self.assets.get(guid))
            }),
        };
        if let Some(stored) = stored {
            resolved.guid = stored.guid.clone();
            resolved.unique_attributes = stored.qualified_name().map(UniqueAttributes::qualified_name);
            resolved.display_text = stored.name.clone();
        }
        resolved.semantic = SaveSemantic::Replace;
        resolved
    }

    fn resolve_relation(&self, relation: &Relation) -> Relation {
        match relation {
            Relation::One(reference) => Relation::One(self.resolve_reference(reference)),
            Relation::Many(references) => Relation::Many(
                references
                    .iter()
                    .map(|r| self.resolve_reference(r))
                    .collect(),
            ),
        }
    }

    fn view(&self, asset: &Asset, include_relationships: bool) -> Asset {
        let mut view = asset.clone();
        if include_relationships {
            view.relationships = asset
                .relationships
                .iter()
                .map(|(key, relation)| (key.clone(), self.resolve_relation(relation)))
                .collect();
        } else {
            view.relationships.clear();
        }
        view
    }

    fn merge_relation(&self, existing: Option<&Relation>, incoming: &Relation) -> Option<Relation> {
        match incoming {
            Relation::One(reference) => match reference.semantic {
                SaveSemantic::Remove => match existing {
                    Some(Relation::One(current))
                        if self
                            .resolve_reference(current)
                            .same_target(&self.resolve_reference(reference)) =>
                    {
                        None
                    }
                    other => other.cloned(),
                },
                _ => Some(Relation::One(self.resolve_reference(reference))),
            },
            Relation::Many(references) => {
                let replace: Vec<Reference> = references
                    .iter()
                    .filter(|r| r.semantic == SaveSemantic::Replace)
                    .map(|r| self.resolve_reference(r))
                    .collect();
                let append: Vec<Reference> = references
                    .iter()
                    .filter(|r| r.semantic == SaveSemantic::Append)
                    .map(|r| self.resolve_reference(r))
                    .collect();
                let remove: Vec<Reference> = references
                    .iter()
                    .filter(|r| r.semantic == SaveSemantic::Remove)
                    .map(|r| self.resolve_reference(r))
                    .collect();

                let mut merged: Vec<Reference> =
                    if !replace.is_empty() || (append.is_empty() && remove.is_empty()) {
                        replace
                    } else {
                        existing
                            .map(|rel| {
                                rel.references()
                                    .into_iter()
                                    .map(|r| self.resolve_reference(r))
                                    .collect()
                            })
                            .unwrap_or_default()
                    };
                for reference in append {
                    if !merged.iter().any(|r| r.same_target(&reference)) {
                        merged.push(reference);
                    }
                }
                merged.retain(|r| !remove.iter().any(|gone| gone.same_target(r)));

                if merged.is_empty() {
                    None
                } else {
                    Some(Relation::Many(merged.into_iter().collect::<BTreeSet<_>>()))
                }
            }
        }
    }
}

/// Catalog held entirely in memory.
///
/// Implements the search, lookup and mutation contracts with the same
/// merge rules as the service, for tests and offline use.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
    failing_guids: RwLock<HashSet<String>>,
    fail_searches: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an asset verbatim, assigning a GUID when it has no persisted one
    pub fn insert(&self, mut asset: Asset) -> Asset {
        let guid = asset
            .guid
            .as_ref()
            .and_then(Guid::as_persisted)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| generate_guid().to_string());
        asset.guid = Some(Guid::Persisted(guid.clone()));

        let mut state = self.state.write();
        if let Some(qn) = asset.qualified_name() {
            state
                .by_qualified_name
                .insert((asset.type_name.clone(), qn.to_string()), guid.clone());
        }
        state.assets.insert(guid, asset.clone());
        asset
    }

    /// Make every subsequent GUID lookup for `guid` fail as a transport error
    pub fn fail_guid_lookups(&self, guid: &str) {
        self.failing_guids.write().insert(guid.to_string());
    }

    /// Make every subsequent search fail as a transport error
    pub fn fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.state.read().assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn project(asset: Asset, includes: &[String]) -> Asset {
        if includes.is_empty() {
            return asset;
        }
        let mut projected = asset;
        projected
            .attributes
            .retain(|key, _| includes.iter().any(|f| f == key));
        projected
            .relationships
            .retain(|key, _| includes.iter().any(|f| f == key));
        projected
    }
}

#[async_trait::async_trait]
impl SearchStore for InMemoryCatalog {
    async fn search(&self, request: &FluentSearch) -> Result<Vec<Asset>> {
        if self.fail_searches.load(Ordering::SeqCst) {
            bail!("search request failed: simulated transport failure");
        }

        let state = self.state.read();
        let mut results: Vec<Asset> = state
            .assets
            .values()
            .map(|asset| state.view(asset, true))
            .filter(|asset| request.matches(asset))
            .collect();
        // Stable baseline before applying the requested sort
        results.sort_by(|a, b| a.guid_string().cmp(&b.guid_string()));
        request.sort_assets(&mut results);

        Ok(results
            .into_iter()
            .map(|asset| Self::project(asset, &request.includes_on_results))
            .collect())
    }
}

#[async_trait::async_trait]
impl AssetStore for InMemoryCatalog {
    async fn get_by_guid(&self, guid: &str, include_relationships: bool) -> Result<Option<Asset>> {
        if self.failing_guids.read().contains(guid) {
            bail!("lookup of {} failed: simulated transport failure", guid);
        }
        let state = self.state.read();
        Ok(state
            .assets
            .get(guid)
            .map(|asset| state.view(asset, include_relationships)))
    }

    async fn get_by_qualified_name(
        &self,
        asset_type: &AssetType,
        qualified_name: &str,
        include_relationships: bool,
    ) -> Result<Option<Asset>> {
        let state = self.state.read();
        Ok(state
            .by_qualified_name
            .get(&(asset_type.clone(), qualified_name.to_string()))
            .and_then(|guid| state.assets.get(guid))
            .map(|asset| state.view(asset, include_relationships)))
    }
}

#[async_trait::async_trait]
impl MutationStore for InMemoryCatalog {
    async fn save(&self, asset: Asset) -> Result<Asset> {
        let mut state = self.state.write();

        let existing_guid = match asset.guid.as_ref().and_then(Guid::as_persisted) {
            Some(guid) if !guid.is_empty() => {
                let stored = state
                    .assets
                    .get(guid)
                    .ok_or_else(|| anyhow!("Asset with GUID {} does not exist", guid))?;
                if stored.type_name != asset.type_name {
                    bail!(
                        "Asset {} is a {}, not a {}",
                        guid,
                        stored.type_name,
                        asset.type_name
                    );
                }
                Some(guid.to_string())
            }
            _ => asset.qualified_name().and_then(|qn| {
                state
                    .by_qualified_name
                    .get(&(asset.type_name.clone(), qn.to_string()))
                    .cloned()
            }),
        };

        let now = Utc::now();
        let mut echo = asset.clone();
        echo.update_time = Some(now);

        match existing_guid {
            Some(guid) => {
                let current = state
                    .assets
                    .get(&guid)
                    .cloned()
                    .ok_or_else(|| anyhow!("Asset with GUID {} does not exist", guid))?;
                let mut updated = current.clone();

                if let Some(name) = asset.name() {
                    updated.name = Some(name.to_string());
                }
                for (key, value) in &asset.attributes {
                    if value.is_null() {
                        updated.attributes.remove(key);
                    } else {
                        updated.attributes.insert(key.clone(), value.clone());
                    }
                }
                for (key, relation) in &asset.relationships {
                    match state.merge_relation(current.relationships.get(key), relation) {
                        Some(merged) => {
                            updated.relationships.insert(key.clone(), merged);
                        }
                        None => {
                            updated.relationships.remove(key);
                        }
                    }
                }
                if let Some(tags) = &asset.atlan_tags {
                    updated.atlan_tags = Some(tags.clone());
                }
                for field in &asset.null_fields {
                    if field == fields::ATLAN_TAGS {
                        updated.atlan_tags = Some(Vec::new());
                    }
                    updated.attributes.remove(field);
                    updated.relationships.remove(field);
                }
                updated.update_time = Some(now);

                echo.guid = Some(Guid::Persisted(guid.clone()));
                if echo.qualified_name.is_none() {
                    echo.qualified_name = updated.qualified_name.clone();
                }
                state.assets.insert(guid, updated);
            }
            None => {
                let (Some(qn), Some(_)) = (asset.qualified_name(), asset.name()) else {
                    bail!(
                        "{} {} does not exist and cannot be created without a qualifiedName and name",
                        asset.type_name,
                        asset.qualified_name().unwrap_or("(no qualifiedName)")
                    );
                };
                let guid = generate_guid().to_string();
                let mut created = asset.clone();
                created.guid = Some(Guid::Persisted(guid.clone()));
                created.null_fields.clear();
                created.attributes.retain(|_, value| !value.is_null());
                created.relationships = asset
                    .relationships
                    .iter()
                    .filter_map(|(key, relation)| {
                        state
                            .merge_relation(None, relation)
                            .map(|merged| (key.clone(), merged))
                    })
                    .collect();
                created.update_time = Some(now);

                state
                    .by_qualified_name
                    .insert((asset.type_name.clone(), qn.to_string()), guid.clone());
                state.assets.insert(guid.clone(), created);
                echo.guid = Some(Guid::Persisted(guid));
            }
        }

        Ok(echo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{generate_placeholder_guid, Predicate, SortOrder};
    use serde_json::json;

    fn table(name: &str) -> Asset {
        let mut asset = Asset::new(AssetType::Table);
        asset.guid = Some(generate_placeholder_guid());
        asset.name = Some(name.to_string());
        asset.qualified_name = Some(format!("default/snowflake/1/DB/SCH/{}", name));
        asset
    }

    fn term_ref(qn: &str, semantic: SaveSemantic) -> Reference {
        Reference::by_qualified_name(AssetType::GlossaryTerm, qn, semantic)
    }

    fn seed_term(catalog: &InMemoryCatalog, qn: &str) -> Asset {
        let mut term = Asset::new(AssetType::GlossaryTerm);
        term.name = Some(qn.to_string());
        term.qualified_name = Some(qn.to_string());
        catalog.insert(term)
    }

    #[tokio::test]
    async fn test_save_creates_then_updates_by_qualified_name() {
        let catalog = InMemoryCatalog::new();
        let created = catalog.save(table("ORDERS")).await.unwrap();
        let guid = created.guid_string().unwrap();
        assert!(!created.guid.as_ref().unwrap().is_pending());

        let mut update = Asset::new(AssetType::Table);
        update.guid = Some(generate_placeholder_guid());
        update.qualified_name = Some("default/snowflake/1/DB/SCH/ORDERS".to_string());
        update
            .attributes
            .insert(fields::DESCRIPTION.to_string(), json!("All orders"));
        let echoed = catalog.save(update).await.unwrap();
        assert_eq!(echoed.guid_string(), Some(guid.clone()));
        assert_eq!(catalog.len(), 1);

        let stored = catalog.get_by_guid(&guid, false).await.unwrap().unwrap();
        assert_eq!(stored.description(), Some("All orders"));
        assert_eq!(stored.name(), Some("ORDERS"));
    }

    #[tokio::test]
    async fn test_save_semantics_merge_relationships() {
        let catalog = InMemoryCatalog::new();
        seed_term(&catalog, "revenue@finance");
        seed_term(&catalog, "margin@finance");
        seed_term(&catalog, "churn@finance");

        let mut asset = table("ORDERS");
        asset.relationships.insert(
            fields::MEANINGS.to_string(),
            Relation::Many(BTreeSet::from([term_ref("revenue@finance", SaveSemantic::Replace)])),
        );
        let created = catalog.save(asset).await.unwrap();
        let guid = created.guid_string().unwrap();

        let mut append = table("ORDERS");
        append.relationships.insert(
            fields::MEANINGS.to_string(),
            Relation::Many(BTreeSet::from([
                term_ref("margin@finance", SaveSemantic::Append),
                term_ref("revenue@finance", SaveSemantic::Remove),
            ])),
        );
        catalog.save(append).await.unwrap();

        let stored = catalog.get_by_guid(&guid, true).await.unwrap().unwrap();
        let names: Vec<_> = stored
            .meanings()
            .iter()
            .filter_map(|r| r.qualified_name().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["margin@finance".to_string()]);

        let mut replace = table("ORDERS");
        replace.relationships.insert(
            fields::MEANINGS.to_string(),
            Relation::Many(BTreeSet::from([term_ref("churn@finance", SaveSemantic::Replace)])),
        );
        catalog.save(replace).await.unwrap();
        let stored = catalog.get_by_guid(&guid, true).await.unwrap().unwrap();
        assert_eq!(stored.meanings().len(), 1);
        assert_eq!(
            stored.meanings().iter().next().unwrap().qualified_name(),
            Some("churn@finance")
        );
    }

    #[tokio::test]
    async fn test_null_fields_clear_attributes() {
        let catalog = InMemoryCatalog::new();
        let mut asset = table("ORDERS");
        asset
            .attributes
            .insert(fields::CERTIFICATE_STATUS.to_string(), json!("DRAFT"));
        let guid = catalog.save(asset).await.unwrap().guid_string().unwrap();

        let mut clear = table("ORDERS");
        clear.null_fields.insert(fields::CERTIFICATE_STATUS.to_string());
        catalog.save(clear).await.unwrap();

        let stored = catalog.get_by_guid(&guid, false).await.unwrap().unwrap();
        assert_eq!(stored.certificate_status(), None);
    }

    #[tokio::test]
    async fn test_update_of_unknown_asset_without_name_fails() {
        let catalog = InMemoryCatalog::new();
        let mut partial = Asset::new(AssetType::Table);
        partial.qualified_name = Some("default/snowflake/1/DB/SCH/MISSING".to_string());
        assert!(catalog.save(partial).await.is_err());
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_search_projects_requested_fields() {
        let catalog = InMemoryCatalog::new();
        for name in ["B", "A", "C"] {
            let mut asset = table(name);
            asset
                .attributes
                .insert(fields::DESCRIPTION.to_string(), json!(format!("table {}", name)));
            asset
                .attributes
                .insert(fields::OWNER_USERS.to_string(), json!(["jsmith"]));
            catalog.save(asset).await.unwrap();
        }

        let request = FluentSearch::select(AssetType::Table)
            .where_clause(Predicate::prefix("qualifiedName", "default/snowflake/1/DB/SCH/"))
            .sort("name", SortOrder::Desc)
            .include_on_results(fields::DESCRIPTION);
        let results = catalog.search(&request).await.unwrap();

        let names: Vec<_> = results.iter().filter_map(|a| a.name()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
        assert!(results.iter().all(|a| a.description().is_some()));
        assert!(results.iter().all(|a| a.owner_users().is_empty()));

        catalog.fail_searches(true);
        assert!(catalog.search(&request).await.is_err());
    }
}
