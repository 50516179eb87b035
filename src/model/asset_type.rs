use serde::{Deserialize, Serialize};
use std::fmt;

/// The asset kinds this crate knows how to build and reason about.
///
/// Anything else the catalog returns is carried through as `Other`, keeping
/// the type name intact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetType {
    Glossary,
    GlossaryCategory,
    GlossaryTerm,
    Connection,
    Database,
    Schema,
    Table,
    View,
    Column,
    Process,
    Dashboard,
    #[default]
    Referenceable,
    Other(String),
}

impl AssetType {
    pub fn type_name(&self) -> &str {
        match self {
            AssetType::Glossary => "AtlasGlossary",
            AssetType::GlossaryCategory => "AtlasGlossaryCategory",
            AssetType::GlossaryTerm => "AtlasGlossaryTerm",
            AssetType::Connection => "Connection",
            AssetType::Database => "Database",
            AssetType::Schema => "Schema",
            AssetType::Table => "Table",
            AssetType::View => "View",
            AssetType::Column => "Column",
            AssetType::Process => "Process",
            AssetType::Dashboard => "Dashboard",
            AssetType::Referenceable => "Referenceable",
            AssetType::Other(name) => name.as_str(),
        }
    }

    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "AtlasGlossary" => AssetType::Glossary,
            "AtlasGlossaryCategory" => AssetType::GlossaryCategory,
            "AtlasGlossaryTerm" => AssetType::GlossaryTerm,
            "Connection" => AssetType::Connection,
            "Database" => AssetType::Database,
            "Schema" => AssetType::Schema,
            "Table" => AssetType::Table,
            "View" => AssetType::View,
            "Column" => AssetType::Column,
            "Process" => AssetType::Process,
            "Dashboard" => AssetType::Dashboard,
            "Referenceable" => AssetType::Referenceable,
            other => AssetType::Other(other.to_string()),
        }
    }

    /// Glossary-scoped types are anchored to a glossary rather than nested
    /// under a connection
    pub fn is_glossary_scoped(&self) -> bool {
        matches!(self, AssetType::GlossaryCategory | AssetType::GlossaryTerm)
    }
}

impl From<String> for AssetType {
    fn from(value: String) -> Self {
        AssetType::from_type_name(&value)
    }
}

impl From<AssetType> for String {
    fn from(asset_type: AssetType) -> Self {
        asset_type.type_name().to_string()
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
