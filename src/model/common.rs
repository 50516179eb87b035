use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of an asset: either assigned by the catalog, or a client-side
/// placeholder for an asset that has not been persisted yet.
///
/// Placeholders render as `-<digits>` on the wire, which is also how they are
/// recognised when parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Guid {
    Persisted(String),
    Pending(i64),
}

impl Guid {
    pub fn is_pending(&self) -> bool {
        matches!(self, Guid::Pending(_))
    }

    /// The server-assigned identifier, if this GUID has one
    pub fn as_persisted(&self) -> Option<&str> {
        match self {
            Guid::Persisted(value) => Some(value.as_str()),
            Guid::Pending(_) => None,
        }
    }

    /// A persisted GUID with no characters carries no identity
    pub fn is_empty(&self) -> bool {
        match self {
            Guid::Persisted(value) => value.trim().is_empty(),
            Guid::Pending(_) => false,
        }
    }
}

impl From<String> for Guid {
    fn from(value: String) -> Self {
        if let Some(digits) = value.strip_prefix('-') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(token) = digits.parse::<i64>() {
                    return Guid::Pending(token);
                }
            }
        }
        Guid::Persisted(value)
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Guid::from(value.to_string())
    }
}

impl From<Guid> for String {
    fn from(guid: Guid) -> Self {
        guid.to_string()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Guid::Persisted(value) => write!(f, "{}", value),
            Guid::Pending(token) => write!(f, "-{}", token),
        }
    }
}

/// Draw a placeholder GUID for a not-yet-persisted asset.
///
/// The token is uniformly drawn from `[0, i64::MAX)`; it is never stable across
/// calls and must not be used to address an existing asset.
pub fn generate_placeholder_guid() -> Guid {
    let (high, low) = Uuid::new_v4().as_u64_pair();
    // Version and variant bits live in fixed positions; mixing the halves
    // spreads the random bits over the whole word.
    let mixed = high ^ low.rotate_left(17);
    Guid::Pending((mixed % (i64::MAX as u64)) as i64)
}

/// Generate a server-style GUID (used by the in-memory catalog)
pub fn generate_guid() -> Guid {
    Guid::Persisted(Uuid::new_v4().to_string())
}

/// True when the identifier looks like a catalog GUID (hyphenated UUID)
pub fn is_guid_shaped(identifier: &str) -> bool {
    identifier.len() == 36 && Uuid::try_parse(identifier).is_ok()
}

/// How a relationship reference is merged into the target's existing
/// relationship collection during a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveSemantic {
    #[default]
    Replace,
    Append,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Verified,
    Draft,
    Deprecated,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CertificateStatus::Verified => write!(f, "VERIFIED"),
            CertificateStatus::Draft => write!(f, "DRAFT"),
            CertificateStatus::Deprecated => write!(f, "DEPRECATED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    Information,
    Warning,
    Issue,
}

/// Banner-style message attached to an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub announcement_type: AnnouncementType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Announcement {
    pub fn new(announcement_type: AnnouncementType, title: &str, message: Option<&str>) -> Self {
        Self {
            announcement_type,
            title: title.to_string(),
            message: message.map(str::to_string),
        }
    }
}

/// Classification (Atlan tag) applied to an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlanTag {
    pub type_name: String,
    #[serde(default)]
    pub propagate: bool,
    #[serde(default)]
    pub remove_propagations_on_entity_delete: bool,
    #[serde(default)]
    pub restrict_propagation_through_lineage: bool,
}

impl AtlanTag {
    /// Tag that propagates and is cleaned up when the tagged asset is deleted
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            propagate: true,
            remove_propagations_on_entity_delete: true,
            restrict_propagation_through_lineage: false,
        }
    }

    pub fn with_propagation(
        type_name: &str,
        propagate: bool,
        remove_propagations_on_entity_delete: bool,
        restrict_propagation_through_lineage: bool,
    ) -> Self {
        Self {
            type_name: type_name.to_string(),
            propagate,
            remove_propagations_on_entity_delete,
            restrict_propagation_through_lineage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}
