use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::model::{Asset, AssetType, Relation, SortOrder};

/// Predicate over asset fields, serialisable to the same JSON shape the
/// search layer accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    /// Logical AND - all conditions must be true
    All { all: Vec<Predicate> },
    /// Logical OR - any condition must be true
    Any { any: Vec<Predicate> },
    Not { not: Box<Predicate> },
    Eq { eq: (FieldPath, Value) },
    Ne { ne: (FieldPath, Value) },
    In { r#in: (FieldPath, Vec<Value>) },
    /// String prefix match, used for qualifiedName subtree lookups
    Prefix { prefix: (FieldPath, String) },
    /// Substring match on strings, membership on arrays
    Contains { contains: (FieldPath, Value) },
    Exists { exists: FieldPath },
    NotExists { not_exists: FieldPath },
}

impl Predicate {
    pub fn eq(path: &str, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            eq: (FieldPath::new(path), value.into()),
        }
    }

    pub fn prefix(path: &str, prefix: &str) -> Self {
        Predicate::Prefix {
            prefix: (FieldPath::new(path), prefix.to_string()),
        }
    }

    pub fn exists(path: &str) -> Self {
        Predicate::Exists {
            exists: FieldPath::new(path),
        }
    }
}

/// Path to a field on an asset.
///
/// `$.typeName`, `$.guid`, `$.qualifiedName` and `$.name` address identity;
/// `$.<relationship>.guid|qualifiedName|name` reaches through a relationship;
/// `$.__atlanTags` lists tag names; anything else reads the attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(pub String);

impl FieldPath {
    pub fn new(path: &str) -> Self {
        if path.starts_with("$.") {
            FieldPath(path.to_string())
        } else {
            FieldPath(format!("$.{}", path))
        }
    }

    /// Extract the value at this path from an asset
    pub fn extract(&self, asset: &Asset) -> Result<Option<Value>> {
        let field = self
            .0
            .strip_prefix("$.")
            .ok_or_else(|| anyhow!("Invalid field path: {}", self.0))?;

        let value = match field {
            "typeName" => Some(Value::String(asset.type_name.type_name().to_string())),
            "guid" => asset.guid_string().map(Value::String),
            "qualifiedName" => asset.qualified_name().map(|v| Value::String(v.to_string())),
            "name" => asset.name().map(|v| Value::String(v.to_string())),
            "__atlanTags" => Some(Value::Array(
                asset
                    .atlan_tag_names()
                    .into_iter()
                    .map(|n| Value::String(n.to_string()))
                    .collect(),
            )),
            _ => match field.split_once('.') {
                Some((relation, key)) => asset
                    .relation(relation)
                    .and_then(|rel| Self::extract_from_relation(rel, key)),
                None => asset.attribute(field).cloned(),
            },
        };
        Ok(value)
    }

    fn extract_from_relation(relation: &Relation, key: &str) -> Option<Value> {
        let read = |reference: &crate::model::Reference| -> Option<Value> {
            match key {
                "guid" => reference.guid.as_ref().map(|g| Value::String(g.to_string())),
                "qualifiedName" => reference
                    .qualified_name()
                    .map(|qn| Value::String(qn.to_string())),
                "name" => reference.display_text.clone().map(Value::String),
                "typeName" => Some(Value::String(reference.type_name.to_string())),
                _ => None,
            }
        };
        match relation {
            Relation::One(reference) => read(reference),
            Relation::Many(references) => {
                let values: Vec<Value> = references.iter().filter_map(read).collect();
                Some(Value::Array(values))
            }
        }
    }
}

pub struct PredicateEvaluator;

impl PredicateEvaluator {
    pub fn filter_assets(assets: Vec<Asset>, predicate: &Predicate) -> Vec<Asset> {
        assets
            .into_iter()
            .filter(|asset| Self::evaluate(asset, predicate).unwrap_or(false))
            .collect()
    }

    pub fn evaluate(asset: &Asset, predicate: &Predicate) -> Result<bool> {
        match predicate {
            Predicate::All { all } => {
                for expr in all {
                    if !Self::evaluate(asset, expr)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            Predicate::Any { any } => {
                for expr in any {
                    if Self::evaluate(asset, expr)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            Predicate::Not { not } => Ok(!Self::evaluate(asset, not)?),

            Predicate::Eq { eq: (path, value) } => {
                let extracted = path.extract(asset)?;
                Ok(extracted.as_ref() == Some(value))
            }

            Predicate::Ne { ne: (path, value) } => {
                let extracted = path.extract(asset)?;
                Ok(extracted.as_ref() != Some(value))
            }

            Predicate::In { r#in: (path, values) } => {
                let extracted = path.extract(asset)?;
                match extracted {
                    Some(val) => Ok(values.contains(&val)),
                    None => Ok(false),
                }
            }

            Predicate::Prefix {
                prefix: (path, prefix),
            } => {
                let extracted = path.extract(asset)?;
                match extracted {
                    Some(Value::String(s)) => Ok(s.starts_with(prefix.as_str())),
                    _ => Ok(false),
                }
            }

            Predicate::Contains {
                contains: (path, needle),
            } => {
                let extracted = path.extract(asset)?;
                match (extracted, needle) {
                    (Some(Value::String(s)), Value::String(sub)) => Ok(s.contains(sub.as_str())),
                    (Some(Value::Array(items)), needle) => Ok(items.contains(needle)),
                    _ => Ok(false),
                }
            }

            Predicate::Exists { exists: path } => Ok(path.extract(asset)?.is_some()),

            Predicate::NotExists { not_exists: path } => Ok(path.extract(asset)?.is_none()),
        }
    }

    /// Total order over extracted values; missing values sort first
    pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
        match (left, right) {
            (Some(Value::Number(l)), Some(Value::Number(r))) => {
                let (lf, rf) = (l.as_f64().unwrap_or(0.0), r.as_f64().unwrap_or(0.0));
                lf.partial_cmp(&rf).unwrap_or(Ordering::Equal)
            }
            (Some(Value::String(l)), Some(Value::String(r))) => l.cmp(r),
            (Some(l), Some(r)) => l.to_string().cmp(&r.to_string()),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortItem {
    pub field: FieldPath,
    pub order: SortOrder,
}

/// A type-filtered search request: `select(type).where(..).sort(..).page_size(..)`.
///
/// This only describes the query; running it is the job of a
/// [`crate::store::SearchStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluentSearch {
    #[serde(rename = "type")]
    pub types: Vec<AssetType>,

    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<Predicate>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortItem>,

    pub page_size: usize,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes_on_results: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes_on_relations: Vec<String>,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;

impl FluentSearch {
    pub fn select(asset_type: AssetType) -> Self {
        Self {
            types: vec![asset_type],
            where_clauses: Vec::new(),
            sort: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            includes_on_results: Vec::new(),
            includes_on_relations: Vec::new(),
        }
    }

    pub fn where_clause(mut self, predicate: Predicate) -> Self {
        self.where_clauses.push(predicate);
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push(SortItem {
            field: FieldPath::new(field),
            order,
        });
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn include_on_results(mut self, field: &str) -> Self {
        if !self.includes_on_results.iter().any(|f| f == field) {
            self.includes_on_results.push(field.to_string());
        }
        self
    }

    pub fn includes_on_results<I, T>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        fields
            .into_iter()
            .fold(self, |search, field| search.include_on_results(field.as_ref()))
    }

    pub fn includes_on_relations<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for field in fields {
            let field = field.as_ref();
            if !self.includes_on_relations.iter().any(|f| f == field) {
                self.includes_on_relations.push(field.to_string());
            }
        }
        self
    }

    /// Whether an asset satisfies the type filter and every where-clause
    pub fn matches(&self, asset: &Asset) -> bool {
        if !self.types.is_empty() && !self.types.contains(&asset.type_name) {
            return false;
        }
        self.where_clauses
            .iter()
            .all(|predicate| PredicateEvaluator::evaluate(asset, predicate).unwrap_or(false))
    }

    /// Order assets by the requested sort fields
    pub fn sort_assets(&self, assets: &mut [Asset]) {
        if self.sort.is_empty() {
            return;
        }
        assets.sort_by(|a, b| {
            for item in &self.sort {
                let left = item.field.extract(a).ok().flatten();
                let right = item.field.extract(b).ok().flatten();
                let ordering = PredicateEvaluator::compare_values(left.as_ref(), right.as_ref());
                let ordering = match item.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{fields, Guid, Reference, SaveSemantic};
    use serde_json::json;

    fn category(name: &str, glossary_qn: &str) -> Asset {
        let mut asset = Asset::new(AssetType::GlossaryCategory);
        asset.guid = Some(Guid::from(format!("guid-{}", name)));
        asset.name = Some(name.to_string());
        asset.qualified_name = Some(format!("{}@{}", name.to_lowercase(), glossary_qn));
        asset.relationships.insert(
            fields::ANCHOR.to_string(),
            Relation::One(Reference::by_qualified_name(
                AssetType::Glossary,
                glossary_qn,
                SaveSemantic::Replace,
            )),
        );
        asset
    }

    #[test]
    fn test_relationship_path_predicate() {
        let asset = category("Sales", "finance");
        let predicate = Predicate::eq("anchor.qualifiedName", "finance");
        assert!(PredicateEvaluator::evaluate(&asset, &predicate).unwrap());

        let other = Predicate::eq("$.anchor.qualifiedName", "marketing");
        assert!(!PredicateEvaluator::evaluate(&asset, &other).unwrap());
    }

    #[test]
    fn test_parse_from_json() {
        let json = json!({
            "all": [
                {"eq": ["$.typeName", "AtlasGlossaryCategory"]},
                {"prefix": ["$.qualifiedName", "sales@"]},
                {"not": {"exists": "$.certificateStatus"}}
            ]
        });

        let predicate: Predicate = serde_json::from_value(json).unwrap();
        match &predicate {
            Predicate::All { all } => assert_eq!(all.len(), 3),
            _ => panic!("Expected All expression"),
        }

        let assets = vec![category("Sales", "finance"), category("Ops", "finance")];
        let filtered = PredicateEvaluator::filter_assets(assets, &predicate);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name(), Some("Sales"));
    }

    #[test]
    fn test_invalid_path_is_an_error() {
        let asset = category("Sales", "finance");
        let predicate = Predicate::Exists {
            exists: FieldPath("qualifiedName".to_string()),
        };
        assert!(PredicateEvaluator::evaluate(&asset, &predicate).is_err());
    }

    #[test]
    fn test_search_matches_and_sorts() {
        let search = FluentSearch::select(AssetType::GlossaryCategory)
            .where_clause(Predicate::eq("anchor.qualifiedName", "finance"))
            .sort("name", SortOrder::Asc)
            .page_size(0);
        assert_eq!(search.page_size, 1);

        let mut assets = vec![
            category("Tax", "finance"),
            category("Audit", "finance"),
            category("Brand", "marketing"),
        ];
        assets.retain(|a| search.matches(a));
        search.sort_assets(&mut assets);
        let names: Vec<_> = assets.iter().filter_map(|a| a.name()).collect();
        assert_eq!(names, vec!["Audit", "Tax"]);
    }
}
