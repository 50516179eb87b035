use crate::error::{AtlanError, Result};
use crate::model::{Asset, AssetType, Guid, Reference, SaveSemantic};
use log::debug;

impl Asset {
    /// Reduce this asset to a reference usable as a relationship edge.
    ///
    /// Resolution order: GUID, then qualifiedName, then the qualifiedName in
    /// the unique-attributes bag. The reference carries the default REPLACE
    /// semantic.
    pub fn trim_to_reference(&self) -> Result<Reference> {
        if let Some(guid) = self.guid.as_ref().filter(|g| !g.is_empty()) {
            debug!("Referencing {} by GUID {}", self.type_name, guid);
            return Ok(Reference::by_guid(
                self.type_name.clone(),
                guid.clone(),
                SaveSemantic::Replace,
            ));
        }
        if let Some(qn) = self.qualified_name() {
            debug!("Referencing {} by qualifiedName {}", self.type_name, qn);
            return Ok(Reference::by_qualified_name(
                self.type_name.clone(),
                qn,
                SaveSemantic::Replace,
            ));
        }
        if let Some(qn) = self.unique_qualified_name() {
            debug!(
                "Referencing {} by uniqueAttributes.qualifiedName {}",
                self.type_name, qn
            );
            return Ok(Reference::by_qualified_name(
                self.type_name.clone(),
                qn,
                SaveSemantic::Replace,
            ));
        }
        Err(AtlanError::missing_identifier(self.type_name.type_name()))
    }

    /// Same as [`Asset::trim_to_reference`], with an explicit save semantic
    pub fn trim_to_reference_with(&self, semantic: SaveSemantic) -> Result<Reference> {
        Ok(self.trim_to_reference()?.with_semantic(semantic))
    }
}

impl AssetType {
    /// Reference an asset of this type by GUID
    pub fn ref_by_guid(&self, guid: &str, semantic: SaveSemantic) -> Result<Reference> {
        let guid = Guid::from(guid);
        if guid.is_empty() {
            return Err(AtlanError::missing_identifier(self.type_name()));
        }
        Ok(Reference::by_guid(self.clone(), guid, semantic))
    }

    /// Reference an asset of this type by qualifiedName
    pub fn ref_by_qualified_name(
        &self,
        qualified_name: &str,
        semantic: SaveSemantic,
    ) -> Result<Reference> {
        if qualified_name.trim().is_empty() {
            return Err(AtlanError::missing_identifier(self.type_name()));
        }
        Ok(Reference::by_qualified_name(
            self.clone(),
            qualified_name,
            semantic,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReferenceKey, UniqueAttributes};

    const GUID: &str = "6b1d8c3a-4f2e-4a7b-9c1d-2e3f4a5b6c7d";
    const QN: &str = "default/snowflake/1700000000/DB/SCH/ORDERS";

    fn asset(guid: Option<&str>, qn: Option<&str>, unique_qn: Option<&str>) -> Asset {
        let mut asset = Asset::new(AssetType::Table);
        asset.guid = guid.map(Guid::from);
        asset.qualified_name = qn.map(str::to_string);
        asset.unique_attributes = unique_qn.map(UniqueAttributes::qualified_name);
        asset
    }

    #[test]
    fn test_guid_wins_over_every_other_identifier() {
        let combos = [
            asset(Some(GUID), None, None),
            asset(Some(GUID), Some(QN), None),
            asset(Some(GUID), None, Some(QN)),
            asset(Some(GUID), Some(QN), Some("other")),
        ];
        for candidate in &combos {
            let reference = candidate.trim_to_reference().unwrap();
            assert_eq!(
                reference.key(),
                Some(ReferenceKey::Guid(&Guid::from(GUID)))
            );
            assert_eq!(reference.semantic, SaveSemantic::Replace);
            assert!(reference.unique_attributes.is_none());
        }
    }

    #[test]
    fn test_fallback_to_qualified_names() {
        let by_qn = asset(None, Some(QN), Some("ignored")).trim_to_reference().unwrap();
        assert_eq!(by_qn.key(), Some(ReferenceKey::QualifiedName(QN)));

        let by_unique = asset(Some(""), Some(""), Some(QN))
            .trim_to_reference()
            .unwrap();
        assert_eq!(by_unique.key(), Some(ReferenceKey::QualifiedName(QN)));
        assert!(by_unique.guid.is_none());
    }

    #[test]
    fn test_no_identifier_fails_naming_guid_and_qualified_name() {
        let err = asset(None, None, None).trim_to_reference().unwrap_err();
        match err {
            AtlanError::MissingRequiredRelationshipParam { type_name, fields } => {
                assert_eq!(type_name, "Table");
                assert_eq!(fields, vec!["guid", "qualifiedName"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let blank = asset(Some(""), Some("  "), Some(""));
        assert!(matches!(
            blank.trim_to_reference(),
            Err(AtlanError::MissingRequiredRelationshipParam { .. })
        ));
    }

    #[test]
    fn test_typed_reference_constructors() {
        let by_guid = AssetType::GlossaryTerm
            .ref_by_guid(GUID, SaveSemantic::Append)
            .unwrap();
        assert_eq!(by_guid.type_name, AssetType::GlossaryTerm);
        assert_eq!(by_guid.semantic, SaveSemantic::Append);

        let by_qn = AssetType::Table
            .ref_by_qualified_name(QN, SaveSemantic::Remove)
            .unwrap();
        assert_eq!(by_qn.qualified_name(), Some(QN));

        assert!(AssetType::Table.ref_by_guid("", SaveSemantic::Replace).is_err());
        assert!(AssetType::Table
            .ref_by_qualified_name("", SaveSemantic::Replace)
            .is_err());
    }
}
