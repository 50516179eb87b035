use itertools::Itertools;

/// Coarse classification of an [`AtlanError`], for callers that only need to
/// decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed and will never succeed as-is
    InvalidRequest,
    /// The asset does not exist, or exists with a different type
    NotFound,
    /// The catalog service (or the transport in front of it) failed
    Upstream,
}

#[derive(Debug, thiserror::Error)]
pub enum AtlanError {
    #[error("Missing required relationship parameter(s) for {type_name}: one of [{}] must be set", .fields.iter().join(", "))]
    MissingRequiredRelationshipParam {
        type_name: String,
        fields: Vec<String>,
    },

    #[error("Missing required update parameter(s) for {type_name}: [{}]", .fields.iter().join(", "))]
    MissingRequiredUpdateParam {
        type_name: String,
        fields: Vec<String>,
    },

    #[error("Asset with GUID {guid} does not exist")]
    AssetNotFoundByGuid { guid: String },

    #[error("Asset of type {type_name} with qualifiedName {qualified_name} does not exist")]
    AssetNotFoundByQualifiedName {
        type_name: String,
        qualified_name: String,
    },

    #[error("Asset {identifier} exists but is not of the requested type {expected}")]
    AssetNotTypeRequested { identifier: String, expected: String },

    #[error("No categories found for glossary {glossary_guid} ({qualified_name})")]
    NoCategoriesFound {
        glossary_guid: String,
        qualified_name: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Catalog request failed: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl AtlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AtlanError::MissingRequiredRelationshipParam { .. }
            | AtlanError::MissingRequiredUpdateParam { .. }
            | AtlanError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            AtlanError::AssetNotFoundByGuid { .. }
            | AtlanError::AssetNotFoundByQualifiedName { .. }
            | AtlanError::AssetNotTypeRequested { .. }
            | AtlanError::NoCategoriesFound { .. } => ErrorKind::NotFound,
            AtlanError::Upstream(_) => ErrorKind::Upstream,
        }
    }

    /// Reference construction failure for an asset with no usable identity
    pub fn missing_identifier(type_name: &str) -> Self {
        AtlanError::MissingRequiredRelationshipParam {
            type_name: type_name.to_string(),
            fields: vec!["guid".to_string(), "qualifiedName".to_string()],
        }
    }
}

pub type Result<T, E = AtlanError> = std::result::Result<T, E>;
