use crate::model::{AssetType, Guid, SaveSemantic};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Alternative identity bag, used when a GUID is not available
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
}

impl UniqueAttributes {
    pub fn qualified_name(qualified_name: &str) -> Self {
        Self {
            qualified_name: Some(qualified_name.to_string()),
        }
    }
}

/// The identifier a reference is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKey<'a> {
    Guid(&'a Guid),
    QualifiedName(&'a str),
}

/// Minimal identity-only stand-in for an asset, used to wire relationships.
///
/// A reference built through `by_guid` / `by_qualified_name` (or by trimming
/// an asset) always carries at least one identifier. References coming back
/// from the catalog usually carry both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub type_name: AssetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_attributes: Option<UniqueAttributes>,
    #[serde(default, rename = "relationshipSaveSemantic")]
    pub semantic: SaveSemantic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl Reference {
    pub fn by_guid(type_name: AssetType, guid: Guid, semantic: SaveSemantic) -> Self {
        Self {
            type_name,
            guid: Some(guid),
            unique_attributes: None,
            semantic,
            display_text: None,
        }
    }

    pub fn by_qualified_name(
        type_name: AssetType,
        qualified_name: &str,
        semantic: SaveSemantic,
    ) -> Self {
        Self {
            type_name,
            guid: None,
            unique_attributes: Some(UniqueAttributes::qualified_name(qualified_name)),
            semantic,
            display_text: None,
        }
    }

    /// The identifier this reference resolves through: GUID first, then the
    /// unique qualifiedName
    pub fn key(&self) -> Option<ReferenceKey<'_>> {
        if let Some(guid) = self.guid.as_ref().filter(|g| !g.is_empty()) {
            return Some(ReferenceKey::Guid(guid));
        }
        self.qualified_name().map(ReferenceKey::QualifiedName)
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.unique_attributes
            .as_ref()
            .and_then(|u| u.qualified_name.as_deref())
            .filter(|qn| !qn.is_empty())
    }

    pub fn with_semantic(mut self, semantic: SaveSemantic) -> Self {
        self.semantic = semantic;
        self
    }

    /// True when both references point at the same asset through any shared
    /// identifier
    pub fn same_target(&self, other: &Reference) -> bool {
        if self.type_name != other.type_name {
            return false;
        }
        let guid_match = match (&self.guid, &other.guid) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        };
        let qn_match = match (self.qualified_name(), other.qualified_name()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        guid_match || qn_match
    }

    fn sort_key(&self) -> (u8, String) {
        match self.key() {
            Some(ReferenceKey::Guid(guid)) => (0, guid.to_string()),
            Some(ReferenceKey::QualifiedName(qn)) => (1, qn.to_string()),
            None => (2, String::new()),
        }
    }
}

// Ordering (and therefore set membership) is by type and resolving key; the
// save semantic and display text do not distinguish two references.
impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
            .cmp(&other.type_name)
            .then_with(|| self.sort_key().cmp(&other.sort_key()))
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Reference {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_guid_is_preferred_key() {
        let mut reference = Reference::by_qualified_name(
            AssetType::Table,
            "default/snowflake/1/DB/SCH/T",
            SaveSemantic::Replace,
        );
        reference.guid = Some(Guid::from("6b1d8c3a-4f2e-4a7b-9c1d-2e3f4a5b6c7d"));
        assert!(matches!(reference.key(), Some(ReferenceKey::Guid(_))));

        reference.guid = Some(Guid::Persisted(String::new()));
        assert_eq!(
            reference.key(),
            Some(ReferenceKey::QualifiedName("default/snowflake/1/DB/SCH/T"))
        );
    }

    #[test]
    fn test_sets_deduplicate_on_key_not_semantic() {
        let guid = Guid::from("6b1d8c3a-4f2e-4a7b-9c1d-2e3f4a5b6c7d");
        let mut set = BTreeSet::new();
        set.insert(Reference::by_guid(
            AssetType::GlossaryTerm,
            guid.clone(),
            SaveSemantic::Replace,
        ));
        set.insert(Reference::by_guid(
            AssetType::GlossaryTerm,
            guid,
            SaveSemantic::Append,
        ));
        set.insert(Reference::by_qualified_name(
            AssetType::GlossaryTerm,
            "term@glossary",
            SaveSemantic::Replace,
        ));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_same_target_across_identifiers() {
        let mut from_server = Reference::by_qualified_name(
            AssetType::GlossaryTerm,
            "revenue@finance",
            SaveSemantic::Replace,
        );
        from_server.guid = Some(Guid::from("11111111-2222-3333-4444-555555555555"));

        let by_name = Reference::by_qualified_name(
            AssetType::GlossaryTerm,
            "revenue@finance",
            SaveSemantic::Remove,
        );
        let by_guid = Reference::by_guid(
            AssetType::GlossaryTerm,
            Guid::from("11111111-2222-3333-4444-555555555555"),
            SaveSemantic::Remove,
        );
        assert!(from_server.same_target(&by_name));
        assert!(from_server.same_target(&by_guid));
        assert!(!by_name.same_target(&by_guid));
    }
}
