//! Typed entry points for building new assets.
//!
//! Each creator fills in exactly what the catalog needs to create the type,
//! plus the denormalised parent names that let searches filter without a
//! join. All of them delegate to the generic [`AssetBuilder`].

use crate::error::{AtlanError, Result};
use crate::logic::builder::AssetBuilder;
use crate::logic::naming::{
    child_qualified_name, connection_of, connection_qualified_name,
    glossary_child_qualified_name, last_segment, parent_qualified_name, process_qualified_name,
    slug,
};
use crate::model::{
    fields, Asset, AssetType, AtlanConnectorType, Reference, SaveSemantic, UniqueAttributes,
};
use serde_json::Value;

fn require_name(asset_type: &AssetType, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AtlanError::InvalidRequest(format!(
            "a name is required to create a {}",
            asset_type
        )));
    }
    Ok(())
}

/// Connection-scoped parent details shared by every SQL-shaped creator
struct ConnectionScope {
    connection_qualified_name: String,
    connector: AtlanConnectorType,
}

impl ConnectionScope {
    fn of(parent_qualified_name: &str) -> Result<Self> {
        let connection_qualified_name = connection_of(parent_qualified_name).ok_or_else(|| {
            AtlanError::InvalidRequest(format!(
                "{} is not nested under a connection",
                parent_qualified_name
            ))
        })?;
        let connector = AtlanConnectorType::from_qualified_name(&connection_qualified_name)
            .ok_or_else(|| {
                AtlanError::InvalidRequest(format!(
                    "unable to infer a connector from {}",
                    connection_qualified_name
                ))
            })?;
        Ok(Self {
            connection_qualified_name,
            connector,
        })
    }

    fn apply(&self, builder: AssetBuilder) -> AssetBuilder {
        builder
            .attribute(fields::CONNECTOR_NAME, self.connector.value())
            .attribute(
                fields::CONNECTION_QUALIFIED_NAME,
                self.connection_qualified_name.as_str(),
            )
    }
}

/// The name's slug, which must keep at least one alphanumeric character
fn require_slug(asset_type: &AssetType, name: &str) -> Result<String> {
    require_name(asset_type, name)?;
    let slug = slug(name);
    if slug.is_empty() {
        return Err(AtlanError::InvalidRequest(format!(
            "the name of a {} must contain at least one letter or digit, got {:?}",
            asset_type, name
        )));
    }
    Ok(slug)
}

fn parent_of(qualified_name: &str) -> Result<&str> {
    parent_qualified_name(qualified_name).ok_or_else(|| {
        AtlanError::InvalidRequest(format!("{} has no parent", qualified_name))
    })
}

pub struct Glossary;

impl Glossary {
    pub fn creator(name: &str) -> Result<AssetBuilder> {
        let slug = require_slug(&AssetType::Glossary, name)?;
        Ok(AssetBuilder::creator_base(AssetType::Glossary, name, slug))
    }
}

/// qualifiedName of an asset used as a naming scope; falls back to the GUID
/// when only that is known
fn naming_scope(asset: &Asset) -> Result<String> {
    asset
        .qualified_name()
        .or_else(|| asset.unique_qualified_name())
        .map(str::to_string)
        .or_else(|| asset.guid_string())
        .ok_or_else(|| AtlanError::missing_identifier(asset.type_name.type_name()))
}

/// Anchor reference and naming scope of the glossary a category or term
/// lives in
fn glossary_scope(glossary: &Asset) -> Result<(Reference, String)> {
    let anchor = glossary.trim_to_reference()?;
    Ok((anchor, naming_scope(glossary)?))
}

pub struct GlossaryCategory;

impl GlossaryCategory {
    /// Category anchored in `glossary`, optionally nested under `parent`.
    ///
    /// Top-level categories are named within the glossary and nested ones
    /// within their parent, so siblings of different parents may share a name.
    pub fn creator(name: &str, glossary: &Asset, parent: Option<&Asset>) -> Result<AssetBuilder> {
        let slug = require_slug(&AssetType::GlossaryCategory, name)?;
        let (anchor, glossary_scope) = glossary_scope(glossary)?;
        let (scope, parent_reference) = match parent {
            Some(parent) => (naming_scope(parent)?, Some(parent.trim_to_reference()?)),
            None => (glossary_scope, None),
        };
        let builder = AssetBuilder::creator_base(
            AssetType::GlossaryCategory,
            name,
            glossary_child_qualified_name(&slug, &scope),
        )
        .relation(fields::ANCHOR, anchor);
        Ok(match parent_reference {
            Some(parent) => builder.relation(fields::PARENT_CATEGORY, parent),
            None => builder,
        })
    }
}

pub struct GlossaryTerm;

impl GlossaryTerm {
    pub fn creator(name: &str, glossary: &Asset) -> Result<AssetBuilder> {
        let slug = require_slug(&AssetType::GlossaryTerm, name)?;
        let (anchor, scope) = glossary_scope(glossary)?;
        Ok(AssetBuilder::creator_base(
            AssetType::GlossaryTerm,
            name,
            glossary_child_qualified_name(&slug, &scope),
        )
        .relation(fields::ANCHOR, anchor))
    }
}

pub struct Connection;

impl Connection {
    /// A connection needs at least one admin (role, group or user)
    pub fn creator(
        name: &str,
        connector: AtlanConnectorType,
        admin_roles: &[&str],
        admin_groups: &[&str],
        admin_users: &[&str],
    ) -> Result<AssetBuilder> {
        require_name(&AssetType::Connection, name)?;
        if admin_roles.is_empty() && admin_groups.is_empty() && admin_users.is_empty() {
            return Err(AtlanError::InvalidRequest(
                "a connection requires at least one admin role, group or user".to_string(),
            ));
        }

        let qualified_name = connection_qualified_name(connector, chrono::Utc::now().timestamp());
        let list = |values: &[&str]| -> Value {
            Value::Array(values.iter().map(|v| Value::String(v.to_string())).collect())
        };
        Ok(
            AssetBuilder::creator_base(AssetType::Connection, name, qualified_name)
                .attribute(fields::CONNECTOR_NAME, connector.value())
                .attribute(
                    fields::CATEGORY,
                    serde_json::to_value(connector.category()).unwrap_or(Value::Null),
                )
                .attribute(fields::ADMIN_ROLES, list(admin_roles))
                .attribute(fields::ADMIN_GROUPS, list(admin_groups))
                .attribute(fields::ADMIN_USERS, list(admin_users)),
        )
    }
}

pub struct Database;

impl Database {
    pub fn creator(name: &str, connection_qualified_name: &str) -> Result<AssetBuilder> {
        require_name(&AssetType::Database, name)?;
        let scope = ConnectionScope::of(connection_qualified_name)?;
        let builder = AssetBuilder::creator_base(
            AssetType::Database,
            name,
            child_qualified_name(&scope.connection_qualified_name, name),
        )
        .relation(
            fields::CONNECTION,
            AssetType::Connection
                .ref_by_qualified_name(&scope.connection_qualified_name, SaveSemantic::Replace)?,
        );
        Ok(scope.apply(builder))
    }
}

pub struct Schema;

impl Schema {
    pub fn creator(name: &str, database_qualified_name: &str) -> Result<AssetBuilder> {
        require_name(&AssetType::Schema, name)?;
        let scope = ConnectionScope::of(database_qualified_name)?;
        let builder = AssetBuilder::creator_base(
            AssetType::Schema,
            name,
            child_qualified_name(database_qualified_name, name),
        )
        .attribute(fields::DATABASE_NAME, last_segment(database_qualified_name))
        .attribute(fields::DATABASE_QUALIFIED_NAME, database_qualified_name)
        .relation(
            fields::DATABASE,
            AssetType::Database.ref_by_qualified_name(database_qualified_name, SaveSemantic::Replace)?,
        );
        Ok(scope.apply(builder))
    }
}

/// Denormalised schema and database names shared by tables, views and columns
fn schema_attributes(builder: AssetBuilder, schema_qualified_name: &str) -> Result<AssetBuilder> {
    let scope = ConnectionScope::of(schema_qualified_name)?;
    let database_qualified_name = parent_of(schema_qualified_name)?;
    let builder = builder
        .attribute(fields::SCHEMA_NAME, last_segment(schema_qualified_name))
        .attribute(fields::SCHEMA_QUALIFIED_NAME, schema_qualified_name)
        .attribute(fields::DATABASE_NAME, last_segment(database_qualified_name))
        .attribute(fields::DATABASE_QUALIFIED_NAME, database_qualified_name);
    Ok(scope.apply(builder))
}

/// Tables and views hang directly off their schema
fn in_schema(builder: AssetBuilder, schema_qualified_name: &str) -> Result<AssetBuilder> {
    let schema =
        AssetType::Schema.ref_by_qualified_name(schema_qualified_name, SaveSemantic::Replace)?;
    Ok(schema_attributes(builder, schema_qualified_name)?.relation(fields::SCHEMA, schema))
}

pub struct Table;

impl Table {
    pub fn creator(name: &str, schema_qualified_name: &str) -> Result<AssetBuilder> {
        require_name(&AssetType::Table, name)?;
        let builder = AssetBuilder::creator_base(
            AssetType::Table,
            name,
            child_qualified_name(schema_qualified_name, name),
        );
        in_schema(builder, schema_qualified_name)
    }
}

pub struct View;

impl View {
    pub fn creator(name: &str, schema_qualified_name: &str) -> Result<AssetBuilder> {
        require_name(&AssetType::View, name)?;
        let builder = AssetBuilder::creator_base(
            AssetType::View,
            name,
            child_qualified_name(schema_qualified_name, name),
        );
        in_schema(builder, schema_qualified_name)
    }
}

pub struct Column;

impl Column {
    /// Column at position `order` (1-based) in a table or view
    pub fn creator(
        name: &str,
        parent_type: AssetType,
        parent_qualified_name: &str,
        order: u32,
    ) -> Result<AssetBuilder> {
        require_name(&AssetType::Column, name)?;
        let (name_field, qualified_name_field, relation_field) = match parent_type {
            AssetType::Table => (fields::TABLE_NAME, fields::TABLE_QUALIFIED_NAME, fields::TABLE),
            AssetType::View => (fields::VIEW_NAME, fields::VIEW_QUALIFIED_NAME, fields::VIEW),
            other => {
                return Err(AtlanError::InvalidRequest(format!(
                    "columns can only be created in a Table or View, not a {}",
                    other
                )))
            }
        };

        let schema_qualified_name = parent_of(parent_qualified_name)?;
        let parent_reference =
            parent_type.ref_by_qualified_name(parent_qualified_name, SaveSemantic::Replace)?;
        let builder = AssetBuilder::creator_base(
            AssetType::Column,
            name,
            child_qualified_name(parent_qualified_name, name),
        )
        .attribute(fields::ORDER, order)
        .attribute(name_field, last_segment(parent_qualified_name))
        .attribute(qualified_name_field, parent_qualified_name)
        .relation(relation_field, parent_reference);
        schema_attributes(builder, schema_qualified_name)
    }
}

/// Edge reference that also carries the asset's qualifiedName, so the
/// process name does not depend on placeholder GUIDs
fn edge_reference(asset: &Asset) -> Result<Reference> {
    let mut reference = asset.trim_to_reference()?;
    if reference.qualified_name().is_none() {
        if let Some(qualified_name) = asset.qualified_name() {
            reference.unique_attributes = Some(UniqueAttributes::qualified_name(qualified_name));
        }
    }
    Ok(reference)
}

pub struct Process;

impl Process {
    /// Lineage between `inputs` and `outputs`. Edges are directional; the
    /// inputs and outputs are not updated to point back at the process.
    pub fn creator(
        name: &str,
        connection_qualified_name: &str,
        inputs: &[Asset],
        outputs: &[Asset],
    ) -> Result<AssetBuilder> {
        require_name(&AssetType::Process, name)?;
        let scope = ConnectionScope::of(connection_qualified_name)?;
        let inputs = inputs
            .iter()
            .map(edge_reference)
            .collect::<Result<Vec<_>>>()?;
        let outputs = outputs
            .iter()
            .map(edge_reference)
            .collect::<Result<Vec<_>>>()?;

        let qualified_name =
            process_qualified_name(name, &scope.connection_qualified_name, &inputs, &outputs);
        let builder = AssetBuilder::creator_base(AssetType::Process, name, qualified_name)
            .relations(fields::INPUTS, inputs)
            .relations(fields::OUTPUTS, outputs);
        Ok(scope.apply(builder))
    }
}
