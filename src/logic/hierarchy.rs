//! Category tree of a single glossary.
//!
//! The catalog only stores each category's parent pointer, so the tree is
//! rebuilt client-side from one flat search. Nodes live in a GUID-keyed map
//! and refer to each other by GUID.

use crate::client::AtlanClient;
use crate::error::{AtlanError, Result};
use crate::model::{fields, Asset, AssetType, FluentSearch, Predicate, SortOrder};
use crate::store::Catalog;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub guid: String,
    pub name: Option<String>,
    pub qualified_name: Option<String>,
    /// GUID of the parent category, `None` for a root
    pub parent: Option<String>,
    /// Child GUIDs, in the order the children were linked
    pub children: Vec<String>,
    /// The category as returned by the catalog
    pub asset: Asset,
}

impl CategoryNode {
    fn from_asset(asset: Asset) -> Option<Self> {
        let guid = asset.guid_string()?;
        let parent = asset
            .single_relation(fields::PARENT_CATEGORY)
            .and_then(|reference| reference.guid.as_ref())
            .filter(|guid| !guid.is_empty())
            .map(ToString::to_string);
        Some(Self {
            guid,
            name: asset.name().map(str::to_string),
            qualified_name: asset.qualified_name().map(str::to_string),
            parent,
            children: Vec::new(),
            asset,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CategoryHierarchy {
    pub glossary_guid: String,
    pub glossary_qualified_name: String,
    nodes: HashMap<String, CategoryNode>,
    roots: Vec<String>,
}

impl CategoryHierarchy {
    pub fn get_category(&self, guid: &str) -> Option<&CategoryNode> {
        self.nodes.get(guid)
    }

    /// Top-level categories, in the order they were discovered
    pub fn root_categories(&self) -> Vec<&CategoryNode> {
        self.resolve(&self.roots)
    }

    /// Every reachable category level by level: all roots, then all of their
    /// children, then the grandchildren.
    pub fn breadth_first(&self) -> Vec<&CategoryNode> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut ordered = Vec::with_capacity(self.nodes.len());
        let mut frontier: Vec<&CategoryNode> = self
            .root_categories()
            .into_iter()
            .filter(|node| visited.insert(node.guid.as_str()))
            .collect();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for node in frontier {
                ordered.push(node);
                for child in self.resolve(&node.children) {
                    if visited.insert(child.guid.as_str()) {
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        ordered
    }

    /// Every reachable category in pre-order: each node before its children
    pub fn depth_first(&self) -> Vec<&CategoryNode> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut ordered = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&CategoryNode> = self.root_categories();
        stack.reverse();

        while let Some(node) = stack.pop() {
            if !visited.insert(node.guid.as_str()) {
                continue;
            }
            ordered.push(node);
            stack.extend(self.resolve(&node.children).into_iter().rev());
        }
        ordered
    }

    /// Number of categories reachable from the roots
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn resolve(&self, guids: &[String]) -> Vec<&CategoryNode> {
        guids.iter().filter_map(|guid| self.nodes.get(guid)).collect()
    }
}

/// Incremental state while the hierarchy is assembled
#[derive(Default)]
struct HierarchyBuilder {
    nodes: HashMap<String, CategoryNode>,
    /// GUIDs in the order they were indexed
    order: Vec<String>,
    roots: Vec<String>,
}

impl HierarchyBuilder {
    fn index(&mut self, node: CategoryNode) {
        if self.nodes.contains_key(&node.guid) {
            return;
        }
        if node.is_root() {
            self.roots.push(node.guid.clone());
        }
        self.order.push(node.guid.clone());
        self.nodes.insert(node.guid.clone(), node);
    }

    fn link(&mut self, child: &str, parent: &str) {
        if let Some(parent) = self.nodes.get_mut(parent) {
            if !parent.children.iter().any(|c| c == child) {
                parent.children.push(child.to_string());
            }
        }
    }

    /// Keep only the categories reachable from a root
    fn finish(
        mut self,
        glossary_guid: String,
        glossary_qualified_name: String,
    ) -> CategoryHierarchy {
        let mut reachable: HashSet<String> = HashSet::with_capacity(self.nodes.len());
        let mut stack: Vec<String> = self.roots.clone();
        while let Some(guid) = stack.pop() {
            if !reachable.insert(guid.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&guid) {
                stack.extend(node.children.iter().cloned());
            }
        }

        let dropped = self.nodes.len().saturating_sub(reachable.len());
        if dropped > 0 {
            debug!(
                "Dropping {} categories of glossary {} that no root reaches",
                dropped, glossary_qualified_name
            );
        }
        self.nodes.retain(|guid, _| reachable.contains(guid));
        CategoryHierarchy {
            glossary_guid,
            glossary_qualified_name,
            nodes: self.nodes,
            roots: self.roots,
        }
    }
}

/// Build the category tree of `glossary`.
///
/// `attributes` are extra fields to load on every category, and
/// `related_attributes` extra fields to load on their related assets.
/// Parents missing from the initial search are fetched once each by GUID;
/// when that fails the orphaned branch is left out of the hierarchy.
pub async fn get_hierarchy<S: Catalog>(
    client: &AtlanClient<S>,
    glossary: &Asset,
    attributes: &[&str],
    related_attributes: &[&str],
) -> Result<CategoryHierarchy> {
    let glossary_qualified_name = glossary
        .qualified_name()
        .or_else(|| glossary.unique_qualified_name())
        .ok_or_else(|| {
            AtlanError::InvalidRequest(
                "the glossary's qualifiedName is required to build its category hierarchy"
                    .to_string(),
            )
        })?
        .to_string();
    let glossary_guid = glossary
        .guid_string()
        .unwrap_or_else(|| glossary_qualified_name.clone());

    let request = FluentSearch::select(AssetType::GlossaryCategory)
        .where_clause(Predicate::eq(
            "anchor.qualifiedName",
            glossary_qualified_name.as_str(),
        ))
        .sort(fields::NAME, SortOrder::Asc)
        .page_size(client.config().search.hierarchy_page_size)
        .include_on_results(fields::PARENT_CATEGORY)
        .includes_on_results(attributes)
        .includes_on_relations([fields::NAME])
        .includes_on_relations(related_attributes);

    let categories = client.store().search(&request).await?;
    debug!(
        "Fetched {} categories for glossary {}",
        categories.len(),
        glossary_qualified_name
    );

    let mut builder = HierarchyBuilder::default();
    for category in categories {
        match CategoryNode::from_asset(category) {
            Some(node) => builder.index(node),
            None => warn!(
                "Skipping a category without a GUID in glossary {}",
                glossary_qualified_name
            ),
        }
    }

    if builder.roots.is_empty() {
        return Err(AtlanError::NoCategoriesFound {
            glossary_guid,
            qualified_name: glossary_qualified_name,
        });
    }

    let mut queue: VecDeque<String> = builder.order.iter().cloned().collect();
    let mut attempted: HashSet<String> = HashSet::new();
    while let Some(guid) = queue.pop_front() {
        let Some(parent) = builder.nodes.get(&guid).and_then(|node| node.parent.clone()) else {
            continue;
        };
        if !builder.nodes.contains_key(&parent) {
            if !attempted.insert(parent.clone()) {
                continue;
            }
            match fetch_parent(client, &parent).await {
                Some(node) => {
                    builder.index(node);
                    queue.push_back(parent.clone());
                }
                None => continue,
            }
        }
        builder.link(&guid, &parent);
    }

    let hierarchy = builder.finish(glossary_guid, glossary_qualified_name);
    info!(
        "Built category hierarchy for glossary {}: {} categories, {} roots",
        hierarchy.glossary_qualified_name,
        hierarchy.len(),
        hierarchy.roots.len()
    );
    Ok(hierarchy)
}

/// One best-effort lookup of a parent category missing from the search
async fn fetch_parent<S: Catalog>(client: &AtlanClient<S>, guid: &str) -> Option<CategoryNode> {
    match client.store().get_by_guid(guid, true).await {
        Ok(Some(asset)) if asset.type_name == AssetType::GlossaryCategory => {
            let node = CategoryNode::from_asset(asset);
            if node.is_none() {
                warn!("Parent category {} came back without a GUID", guid);
            }
            node
        }
        Ok(Some(asset)) => {
            warn!(
                "Parent {} of a category is a {}, not a category; skipping its branch",
                guid, asset.type_name
            );
            None
        }
        Ok(None) => {
            warn!("Parent category {} does not exist; skipping its branch", guid);
            None
        }
        Err(err) => {
            warn!("Unable to fetch parent category {}: {:#}", guid, err);
            None
        }
    }
}
