//! Deterministic qualifiedName rules.
//!
//! Connection-scoped assets nest by path segment (`<parent>/<name>`);
//! glossary-scoped assets are keyed by `<slug>@<glossary>`, or by
//! `<slug>@<parent category>` when nested.

use crate::model::{AtlanConnectorType, Reference, ReferenceKey};
use itertools::Itertools;
use sha2::{Digest, Sha256};

/// `<parent>/<name>`
pub fn child_qualified_name(parent_qualified_name: &str, name: &str) -> String {
    format!("{}/{}", parent_qualified_name, name)
}

/// Lowercase, with every run of non-alphanumeric characters collapsed to `-`
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .join("-")
}

/// `<slug(name)>@<scope>`, where the scope is the glossary's qualifiedName
/// or, for a nested category, the parent category's
pub fn glossary_child_qualified_name(name: &str, scope_qualified_name: &str) -> String {
    format!("{}@{}", slug(name), scope_qualified_name)
}

/// `default/<connector>/<epoch seconds>`
pub fn connection_qualified_name(connector: AtlanConnectorType, epoch_seconds: i64) -> String {
    format!("default/{}/{}", connector.value(), epoch_seconds)
}

/// The qualifiedName one level up, if there is one
pub fn parent_qualified_name(qualified_name: &str) -> Option<&str> {
    qualified_name
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
}

/// The last path segment of a qualifiedName
pub fn last_segment(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('/')
        .map(|(_, last)| last)
        .unwrap_or(qualified_name)
}

/// The connection prefix (`default/<connector>/<epoch>`) of a nested name
pub fn connection_of(qualified_name: &str) -> Option<String> {
    let segments: Vec<&str> = qualified_name.split('/').collect();
    if segments.len() < 3 || segments[..3].iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments[..3].join("/"))
}

/// Name of a lineage process: the same inputs and outputs (in any order)
/// always yield the same name.
///
/// Edges are keyed by qualifiedName whenever one is known. A GUID is only
/// used for an edge that carries nothing else, since placeholder GUIDs
/// change on every build.
pub fn process_qualified_name(
    name: &str,
    connection_qualified_name: &str,
    inputs: &[Reference],
    outputs: &[Reference],
) -> String {
    let key = |reference: &Reference| {
        let identity = match (reference.qualified_name(), reference.key()) {
            (Some(qn), _) => qn.to_string(),
            (None, Some(ReferenceKey::Guid(guid))) => guid.to_string(),
            (None, _) => return reference.type_name.to_string(),
        };
        format!("{}:{}", reference.type_name, identity)
    };

    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"\n");
    hasher.update(connection_qualified_name.as_bytes());
    hasher.update(b"\n");
    hasher.update(inputs.iter().map(key).sorted().join(",").as_bytes());
    hasher.update(b"->");
    hasher.update(outputs.iter().map(key).sorted().join(",").as_bytes());
    let digest = hex::encode(hasher.finalize());

    child_qualified_name(connection_qualified_name, &digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{generate_placeholder_guid, AssetType, Guid, SaveSemantic};

    #[test]
    fn test_naming_is_deterministic() {
        let parent = "default/snowflake/1700000000/ANALYTICS";
        assert_eq!(
            child_qualified_name(parent, "PUBLIC"),
            child_qualified_name(parent, "PUBLIC")
        );
        assert_eq!(
            child_qualified_name(parent, "PUBLIC"),
            "default/snowflake/1700000000/ANALYTICS/PUBLIC"
        );
        assert_eq!(
            glossary_child_qualified_name("Revenue & Margin", "finance"),
            "revenue-margin@finance"
        );
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("  Customer  Lifetime--Value "), "customer-lifetime-value");
        assert_eq!(slug("KPIs"), "kpis");
        assert_eq!(slug("***"), "");
    }

    #[test]
    fn test_path_helpers() {
        let qn = "default/snowflake/1700000000/DB/SCH/ORDERS";
        assert_eq!(parent_qualified_name(qn), Some("default/snowflake/1700000000/DB/SCH"));
        assert_eq!(last_segment(qn), "ORDERS");
        assert_eq!(
            connection_of(qn).as_deref(),
            Some("default/snowflake/1700000000")
        );
        assert_eq!(connection_of("default/snowflake"), None);
        assert_eq!(parent_qualified_name("orphan"), None);
        assert_eq!(
            connection_qualified_name(AtlanConnectorType::Postgres, 42),
            "default/postgres/42"
        );
    }

    #[test]
    fn test_process_name_ignores_edge_order() {
        let a = Reference::by_qualified_name(AssetType::Table, "c/A", SaveSemantic::Replace);
        let b = Reference::by_qualified_name(AssetType::Table, "c/B", SaveSemantic::Replace);
        let out = Reference::by_qualified_name(AssetType::View, "c/V", SaveSemantic::Replace);

        let first = process_qualified_name("etl", "c", &[a.clone(), b.clone()], &[out.clone()]);
        let second = process_qualified_name("etl", "c", &[b.clone(), a.clone()], &[out.clone()]);
        assert_eq!(first, second);
        assert!(first.starts_with("c/"));
        assert_eq!(first.len(), "c/".len() + 64);

        // Direction matters
        let reversed = process_qualified_name("etl", "c", &[out], &[a, b]);
        assert_ne!(first, reversed);
    }

    #[test]
    fn test_process_name_ignores_placeholder_guids() {
        let edge = |qn: &str| {
            let mut reference =
                Reference::by_qualified_name(AssetType::Table, qn, SaveSemantic::Replace);
            reference.guid = Some(generate_placeholder_guid());
            reference
        };
        let first = process_qualified_name("etl", "c", &[edge("c/RAW")], &[edge("c/CLEAN")]);
        let second = process_qualified_name("etl", "c", &[edge("c/RAW")], &[edge("c/CLEAN")]);
        assert_eq!(first, second);

        // Persisted GUIDs are stable, so they may stand in for a qualifiedName
        let persisted = Reference::by_guid(
            AssetType::Table,
            Guid::from("6b1d8c3a-4f2e-4a7b-9c1d-2e3f4a5b6c7d"),
            SaveSemantic::Replace,
        );
        assert_eq!(
            process_qualified_name("etl", "c", &[persisted.clone()], &[]),
            process_qualified_name("etl", "c", &[persisted], &[])
        );
    }
}
