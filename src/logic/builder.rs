use crate::error::{AtlanError, Result};
use crate::model::{
    fields, generate_placeholder_guid, Announcement, Asset, AssetType, AtlanTag,
    CertificateStatus, Reference, Relation,
};
use serde_json::Value;
use std::collections::BTreeSet;

/// Owns the fields of an asset under construction until [`AssetBuilder::build`]
/// hands back the finished snapshot.
///
/// The type is fixed when the builder is created; there is no setter for it.
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    asset: Asset,
}

impl AssetBuilder {
    /// Starting point for every creator: placeholder GUID, qualifiedName and name
    pub(crate) fn creator_base(asset_type: AssetType, name: &str, qualified_name: String) -> Self {
        let mut asset = Asset::new(asset_type);
        asset.guid = Some(generate_placeholder_guid());
        asset.name = Some(name.to_string());
        asset.qualified_name = Some(qualified_name);
        Self { asset }
    }

    /// Partial-update builder keyed only by qualifiedName
    pub(crate) fn for_update(asset_type: AssetType, qualified_name: &str) -> Self {
        let mut asset = Asset::new(asset_type);
        asset.guid = Some(generate_placeholder_guid());
        asset.qualified_name = Some(qualified_name.to_string());
        Self { asset }
    }

    /// Builder for modifying an existing asset: only the two identifying
    /// fields are populated.
    pub fn updater(asset_type: AssetType, qualified_name: &str, name: &str) -> Result<Self> {
        let missing = missing_required(Some(qualified_name), Some(name));
        if !missing.is_empty() {
            return Err(AtlanError::MissingRequiredUpdateParam {
                type_name: asset_type.type_name().to_string(),
                fields: missing,
            });
        }
        Ok(Self::for_update(asset_type, qualified_name).name(name))
    }

    pub(crate) fn name(mut self, name: &str) -> Self {
        self.asset.name = Some(name.to_string());
        self
    }

    pub fn asset_type(&self) -> &AssetType {
        &self.asset.type_name
    }

    pub fn description(mut self, description: &str) -> Self {
        self.asset.attributes.insert(
            fields::DESCRIPTION.to_string(),
            Value::String(description.to_string()),
        );
        self
    }

    pub fn user_description(mut self, description: &str) -> Self {
        self.asset.attributes.insert(
            fields::USER_DESCRIPTION.to_string(),
            Value::String(description.to_string()),
        );
        self
    }

    pub fn owner_users<I, T>(self, users: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.string_list(fields::OWNER_USERS, users)
    }

    pub fn owner_groups<I, T>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.string_list(fields::OWNER_GROUPS, groups)
    }

    pub fn certificate(mut self, status: CertificateStatus, message: Option<&str>) -> Self {
        self.asset.attributes.insert(
            fields::CERTIFICATE_STATUS.to_string(),
            Value::String(status.to_string()),
        );
        match message {
            Some(message) => {
                self.asset.attributes.insert(
                    fields::CERTIFICATE_STATUS_MESSAGE.to_string(),
                    Value::String(message.to_string()),
                );
            }
            None => {
                self.asset.attributes.remove(fields::CERTIFICATE_STATUS_MESSAGE);
            }
        }
        self
    }

    pub fn announcement(mut self, announcement: &Announcement) -> Self {
        let attributes = &mut self.asset.attributes;
        attributes.insert(
            fields::ANNOUNCEMENT_TYPE.to_string(),
            serde_json::to_value(announcement.announcement_type).unwrap_or(Value::Null),
        );
        attributes.insert(
            fields::ANNOUNCEMENT_TITLE.to_string(),
            Value::String(announcement.title.clone()),
        );
        match &announcement.message {
            Some(message) => {
                attributes.insert(
                    fields::ANNOUNCEMENT_MESSAGE.to_string(),
                    Value::String(message.clone()),
                );
            }
            None => {
                attributes.remove(fields::ANNOUNCEMENT_MESSAGE);
            }
        }
        self
    }

    pub fn attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.asset.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn relation(mut self, key: &str, reference: Reference) -> Self {
        self.asset
            .relationships
            .insert(key.to_string(), Relation::One(reference));
        self
    }

    pub fn relations<I>(mut self, key: &str, references: I) -> Self
    where
        I: IntoIterator<Item = Reference>,
    {
        let set: BTreeSet<Reference> = references.into_iter().collect();
        self.asset
            .relationships
            .insert(key.to_string(), Relation::Many(set));
        self
    }

    pub fn atlan_tags(mut self, tags: Vec<AtlanTag>) -> Self {
        self.asset.atlan_tags = Some(tags);
        self
    }

    /// Clear the named field explicitly on save
    pub fn null_field(mut self, field: &str) -> Self {
        self.asset.attributes.remove(field);
        self.asset.relationships.remove(field);
        self.asset.null_fields.insert(field.to_string());
        self
    }

    pub fn build(self) -> Asset {
        self.asset
    }

    fn string_list<I, T>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let values: Vec<Value> = values
            .into_iter()
            .map(|v| Value::String(v.as_ref().to_string()))
            .collect();
        self.asset
            .attributes
            .insert(key.to_string(), Value::Array(values));
        self
    }
}

fn missing_required(qualified_name: Option<&str>, name: Option<&str>) -> Vec<String> {
    let mut missing = Vec::new();
    if qualified_name.map_or(true, |v| v.trim().is_empty()) {
        missing.push(fields::QUALIFIED_NAME.to_string());
    }
    if name.map_or(true, |v| v.trim().is_empty()) {
        missing.push(fields::NAME.to_string());
    }
    missing
}

impl Asset {
    /// Start an update of this asset carrying only its required fields.
    ///
    /// Every other attribute on `self` is dropped, so stale client values
    /// never overwrite server state. Glossary categories and terms also keep
    /// their anchor, which the catalog requires on every write.
    pub fn trim_to_required(&self) -> Result<AssetBuilder> {
        let needs_anchor = self.type_name.is_glossary_scoped();
        let anchor = self.single_relation(fields::ANCHOR).filter(|_| needs_anchor);

        match (self.qualified_name(), self.name()) {
            (Some(qualified_name), Some(name)) if anchor.is_some() || !needs_anchor => {
                let builder = AssetBuilder::updater(self.type_name.clone(), qualified_name, name)?;
                Ok(match anchor {
                    Some(anchor) => builder.relation(fields::ANCHOR, anchor.clone()),
                    None => builder,
                })
            }
            (qualified_name, name) => {
                let mut missing = missing_required(qualified_name, name);
                if needs_anchor && anchor.is_none() {
                    missing.push(fields::ANCHOR.to_string());
                }
                Err(AtlanError::MissingRequiredUpdateParam {
                    type_name: self.type_name.type_name().to_string(),
                    fields: missing,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnouncementType, Guid, SaveSemantic};
    use serde_json::json;

    #[test]
    fn test_updater_sets_only_identity() {
        let asset = AssetBuilder::updater(AssetType::Table, "default/snowflake/1/DB/SCH/T", "T")
            .unwrap()
            .build();
        assert!(asset.guid.as_ref().unwrap().is_pending());
        assert_eq!(asset.qualified_name(), Some("default/snowflake/1/DB/SCH/T"));
        assert_eq!(asset.name(), Some("T"));
        assert!(asset.attributes.is_empty());
        assert!(asset.relationships.is_empty());
        assert!(asset.atlan_tags.is_none());
    }

    #[test]
    fn test_placeholder_guid_differs_between_calls() {
        let first = AssetBuilder::updater(AssetType::Table, "qn", "n").unwrap().build();
        let second = AssetBuilder::updater(AssetType::Table, "qn", "n").unwrap().build();
        // Two independent draws from a 63-bit range
        assert_ne!(first.guid, second.guid);
    }

    #[test]
    fn test_trim_to_required_reports_every_missing_field() {
        let asset = Asset::new(AssetType::Table);
        match asset.trim_to_required() {
            Err(AtlanError::MissingRequiredUpdateParam { type_name, fields }) => {
                assert_eq!(type_name, "Table");
                assert_eq!(fields, vec!["qualifiedName", "name"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let mut term = Asset::new(AssetType::GlossaryTerm);
        term.name = Some("Revenue".to_string());
        match term.trim_to_required() {
            Err(AtlanError::MissingRequiredUpdateParam { fields, .. }) => {
                assert_eq!(fields, vec!["qualifiedName", "anchor"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_trim_to_required_drops_everything_else() {
        let mut full = Asset::new(AssetType::Table);
        full.guid = Some(Guid::from("6b1d8c3a-4f2e-4a7b-9c1d-2e3f4a5b6c7d"));
        full.qualified_name = Some("default/snowflake/1/DB/SCH/T".to_string());
        full.name = Some("T".to_string());
        full.attributes
            .insert(fields::DESCRIPTION.to_string(), json!("stale"));
        full.atlan_tags = Some(vec![AtlanTag::new("PII")]);

        let trimmed = full.trim_to_required().unwrap().build();
        assert!(trimmed.guid.as_ref().unwrap().is_pending());
        assert_eq!(trimmed.qualified_name(), full.qualified_name());
        assert_eq!(trimmed.name(), Some("T"));
        assert!(trimmed.attributes.is_empty());
        assert!(trimmed.atlan_tags.is_none());
    }

    #[test]
    fn test_trim_to_required_keeps_glossary_anchor() {
        let mut term = Asset::new(AssetType::GlossaryTerm);
        term.qualified_name = Some("revenue@finance".to_string());
        term.name = Some("Revenue".to_string());
        term.relationships.insert(
            fields::ANCHOR.to_string(),
            Relation::One(Reference::by_qualified_name(
                AssetType::Glossary,
                "finance",
                SaveSemantic::Replace,
            )),
        );
        let trimmed = term.trim_to_required().unwrap().build();
        assert_eq!(
            trimmed.single_relation(fields::ANCHOR).and_then(|r| r.qualified_name()),
            Some("finance")
        );
    }

    #[test]
    fn test_setters_and_explicit_nulls() {
        let asset = AssetBuilder::for_update(AssetType::Table, "qn")
            .certificate(CertificateStatus::Verified, Some("Reviewed"))
            .announcement(&Announcement::new(
                AnnouncementType::Issue,
                "Broken upstream",
                Some("Loader failing since Monday"),
            ))
            .owner_users(["jsmith"])
            .description("temporary")
            .null_field(fields::DESCRIPTION)
            .build();

        assert_eq!(asset.certificate_status(), Some(CertificateStatus::Verified));
        assert_eq!(asset.certificate_status_message(), Some("Reviewed"));
        assert_eq!(
            asset.announcement().map(|a| a.announcement_type),
            Some(AnnouncementType::Issue)
        );
        assert_eq!(asset.owner_users(), vec!["jsmith"]);
        assert_eq!(asset.description(), None);
        assert!(asset.null_fields.contains(fields::DESCRIPTION));
        assert_eq!(asset.name, None);
    }
}
