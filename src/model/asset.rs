use crate::model::{
    Announcement, AnnouncementType, AssetType, AtlanTag, CertificateStatus, Guid, Reference,
    UniqueAttributes,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Attribute and relationship names shared across asset types
pub mod fields {
    pub const QUALIFIED_NAME: &str = "qualifiedName";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const USER_DESCRIPTION: &str = "userDescription";
    pub const OWNER_USERS: &str = "ownerUsers";
    pub const OWNER_GROUPS: &str = "ownerGroups";
    pub const CERTIFICATE_STATUS: &str = "certificateStatus";
    pub const CERTIFICATE_STATUS_MESSAGE: &str = "certificateStatusMessage";
    pub const ANNOUNCEMENT_TYPE: &str = "announcementType";
    pub const ANNOUNCEMENT_TITLE: &str = "announcementTitle";
    pub const ANNOUNCEMENT_MESSAGE: &str = "announcementMessage";
    pub const ATLAN_TAGS: &str = "atlanTags";
    pub const CONNECTOR_NAME: &str = "connectorName";
    pub const CONNECTION_QUALIFIED_NAME: &str = "connectionQualifiedName";
    pub const DATABASE_NAME: &str = "databaseName";
    pub const DATABASE_QUALIFIED_NAME: &str = "databaseQualifiedName";
    pub const SCHEMA_NAME: &str = "schemaName";
    pub const SCHEMA_QUALIFIED_NAME: &str = "schemaQualifiedName";
    pub const TABLE_NAME: &str = "tableName";
    pub const TABLE_QUALIFIED_NAME: &str = "tableQualifiedName";
    pub const VIEW_NAME: &str = "viewName";
    pub const VIEW_QUALIFIED_NAME: &str = "viewQualifiedName";
    pub const ORDER: &str = "order";
    pub const CATEGORY: &str = "category";
    pub const ADMIN_USERS: &str = "adminUsers";
    pub const ADMIN_GROUPS: &str = "adminGroups";
    pub const ADMIN_ROLES: &str = "adminRoles";

    // Relationships
    pub const ANCHOR: &str = "anchor";
    pub const PARENT_CATEGORY: &str = "parentCategory";
    pub const CHILDREN_CATEGORIES: &str = "childrenCategories";
    pub const MEANINGS: &str = "meanings";
    pub const CONNECTION: &str = "connection";
    pub const DATABASE: &str = "database";
    pub const SCHEMA: &str = "atlanSchema";
    pub const TABLE: &str = "table";
    pub const VIEW: &str = "view";
    pub const INPUTS: &str = "inputs";
    pub const OUTPUTS: &str = "outputs";
}

/// A relationship attribute: either a single edge or an ordered set of edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    One(Reference),
    Many(BTreeSet<Reference>),
}

impl Relation {
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            Relation::One(reference) => vec![reference],
            Relation::Many(references) => references.iter().collect(),
        }
    }
}

/// The universal catalog entity.
///
/// Identity lives in the typed fields; everything else sits in the attribute
/// bag or the relationship map, keyed by the catalog's attribute names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub type_name: AssetType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_attributes: Option<UniqueAttributes>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relation>,

    /// `None` leaves the tags untouched on write; `Some` replaces them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atlan_tags: Option<Vec<AtlanTag>>,

    /// Attributes to clear explicitly on write
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub null_fields: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Asset {
    pub fn new(type_name: AssetType) -> Self {
        Self {
            type_name,
            ..Default::default()
        }
    }

    pub fn guid_string(&self) -> Option<String> {
        self.guid
            .as_ref()
            .filter(|g| !g.is_empty())
            .map(ToString::to_string)
    }

    pub fn qualified_name(&self) -> Option<&str> {
        non_empty(self.qualified_name.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(self.name.as_deref())
    }

    /// The qualifiedName held in the unique-attributes bag
    pub fn unique_qualified_name(&self) -> Option<&str> {
        non_empty(
            self.unique_attributes
                .as_ref()
                .and_then(|u| u.qualified_name.as_deref()),
        )
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    pub fn string_attribute(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    fn string_list_attribute(&self, key: &str) -> Vec<String> {
        self.attribute(key)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.string_attribute(fields::DESCRIPTION)
    }

    pub fn user_description(&self) -> Option<&str> {
        self.string_attribute(fields::USER_DESCRIPTION)
    }

    pub fn owner_users(&self) -> Vec<String> {
        self.string_list_attribute(fields::OWNER_USERS)
    }

    pub fn owner_groups(&self) -> Vec<String> {
        self.string_list_attribute(fields::OWNER_GROUPS)
    }

    pub fn certificate_status(&self) -> Option<CertificateStatus> {
        self.attribute(fields::CERTIFICATE_STATUS)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn certificate_status_message(&self) -> Option<&str> {
        self.string_attribute(fields::CERTIFICATE_STATUS_MESSAGE)
    }

    pub fn announcement(&self) -> Option<Announcement> {
        let announcement_type: AnnouncementType = self
            .attribute(fields::ANNOUNCEMENT_TYPE)
            .and_then(|v| serde_json::from_value(v.clone()).ok())?;
        let title = self.string_attribute(fields::ANNOUNCEMENT_TITLE)?;
        Some(Announcement::new(
            announcement_type,
            title,
            self.string_attribute(fields::ANNOUNCEMENT_MESSAGE),
        ))
    }

    pub fn relation(&self, key: &str) -> Option<&Relation> {
        self.relationships.get(key)
    }

    /// The single reference behind a one-valued relationship
    pub fn single_relation(&self, key: &str) -> Option<&Reference> {
        match self.relationships.get(key) {
            Some(Relation::One(reference)) => Some(reference),
            _ => None,
        }
    }

    /// The references behind a relationship, empty when absent
    pub fn many_relation(&self, key: &str) -> BTreeSet<Reference> {
        match self.relationships.get(key) {
            Some(Relation::Many(references)) => references.clone(),
            Some(Relation::One(reference)) => BTreeSet::from([reference.clone()]),
            None => BTreeSet::new(),
        }
    }

    /// Glossary terms assigned to this asset
    pub fn meanings(&self) -> BTreeSet<Reference> {
        self.many_relation(fields::MEANINGS)
    }

    pub fn atlan_tag_names(&self) -> Vec<&str> {
        self.atlan_tags
            .iter()
            .flatten()
            .map(|tag| tag.type_name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SaveSemantic;
    use serde_json::json;

    #[test]
    fn test_typed_accessors_read_the_attribute_bag() {
        let mut asset = Asset::new(AssetType::Table);
        asset
            .attributes
            .insert(fields::CERTIFICATE_STATUS.to_string(), json!("VERIFIED"));
        asset
            .attributes
            .insert(fields::OWNER_USERS.to_string(), json!(["jsmith", "akhan"]));
        asset
            .attributes
            .insert(fields::ANNOUNCEMENT_TYPE.to_string(), json!("warning"));
        asset
            .attributes
            .insert(fields::ANNOUNCEMENT_TITLE.to_string(), json!("Migration"));
        asset
            .attributes
            .insert(fields::DESCRIPTION.to_string(), Value::Null);

        assert_eq!(asset.certificate_status(), Some(CertificateStatus::Verified));
        assert_eq!(asset.owner_users(), vec!["jsmith", "akhan"]);
        assert_eq!(
            asset.announcement(),
            Some(Announcement::new(AnnouncementType::Warning, "Migration", None))
        );
        assert_eq!(asset.description(), None);
    }

    #[test]
    fn test_deserialize_catalog_payload() {
        let payload = json!({
            "typeName": "AtlasGlossaryCategory",
            "guid": "6b1d8c3a-4f2e-4a7b-9c1d-2e3f4a5b6c7d",
            "qualifiedName": "sales@finance",
            "name": "Sales",
            "relationships": {
                "parentCategory": {
                    "typeName": "AtlasGlossaryCategory",
                    "guid": "11111111-2222-3333-4444-555555555555"
                },
                "meanings": []
            }
        });

        let asset: Asset = serde_json::from_value(payload).unwrap();
        assert_eq!(asset.type_name, AssetType::GlossaryCategory);
        let parent = asset.single_relation(fields::PARENT_CATEGORY).unwrap();
        assert_eq!(parent.semantic, SaveSemantic::Replace);
        assert_eq!(
            parent.guid,
            Some(Guid::from("11111111-2222-3333-4444-555555555555"))
        );
        assert!(asset.meanings().is_empty());
    }
}
