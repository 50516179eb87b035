use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad family of source systems a connector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectorCategory {
    Warehouse,
    Database,
    Lake,
    Bi,
    Stream,
    Api,
}

/// Source-system kind, as it appears in the second segment of a connection's
/// qualifiedName (`default/<connector>/<epoch>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtlanConnectorType {
    Snowflake,
    Postgres,
    Redshift,
    Bigquery,
    Databricks,
    Tableau,
    Powerbi,
    Looker,
    S3,
    Glue,
    Kafka,
    Api,
}

impl AtlanConnectorType {
    pub const ALL: [AtlanConnectorType; 12] = [
        AtlanConnectorType::Snowflake,
        AtlanConnectorType::Postgres,
        AtlanConnectorType::Redshift,
        AtlanConnectorType::Bigquery,
        AtlanConnectorType::Databricks,
        AtlanConnectorType::Tableau,
        AtlanConnectorType::Powerbi,
        AtlanConnectorType::Looker,
        AtlanConnectorType::S3,
        AtlanConnectorType::Glue,
        AtlanConnectorType::Kafka,
        AtlanConnectorType::Api,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            AtlanConnectorType::Snowflake => "snowflake",
            AtlanConnectorType::Postgres => "postgres",
            AtlanConnectorType::Redshift => "redshift",
            AtlanConnectorType::Bigquery => "bigquery",
            AtlanConnectorType::Databricks => "databricks",
            AtlanConnectorType::Tableau => "tableau",
            AtlanConnectorType::Powerbi => "powerbi",
            AtlanConnectorType::Looker => "looker",
            AtlanConnectorType::S3 => "s3",
            AtlanConnectorType::Glue => "glue",
            AtlanConnectorType::Kafka => "kafka",
            AtlanConnectorType::Api => "api",
        }
    }

    pub fn category(&self) -> ConnectorCategory {
        match self {
            AtlanConnectorType::Snowflake
            | AtlanConnectorType::Redshift
            | AtlanConnectorType::Bigquery
            | AtlanConnectorType::Databricks => ConnectorCategory::Warehouse,
            AtlanConnectorType::Postgres => ConnectorCategory::Database,
            AtlanConnectorType::Tableau
            | AtlanConnectorType::Powerbi
            | AtlanConnectorType::Looker => ConnectorCategory::Bi,
            AtlanConnectorType::S3 | AtlanConnectorType::Glue => ConnectorCategory::Lake,
            AtlanConnectorType::Kafka => ConnectorCategory::Stream,
            AtlanConnectorType::Api => ConnectorCategory::Api,
        }
    }

    /// Infer the connector from any qualifiedName rooted at a connection.
    ///
    /// Returns `None` when the name is not of the form `default/<connector>/...`
    /// or names a connector this crate does not know.
    pub fn from_qualified_name(qualified_name: &str) -> Option<Self> {
        let mut segments = qualified_name.split('/');
        let _tenant = segments.next()?;
        let connector = segments.next()?;
        segments.next()?;
        connector.parse().ok()
    }
}

impl fmt::Display for AtlanConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl std::str::FromStr for AtlanConnectorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        AtlanConnectorType::ALL
            .iter()
            .copied()
            .find(|connector| connector.value() == lowered)
            .ok_or_else(|| format!("Unknown connector type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_connector_from_qualified_name() {
        assert_eq!(
            AtlanConnectorType::from_qualified_name("default/snowflake/1700000000/DB/SCH"),
            Some(AtlanConnectorType::Snowflake)
        );
        assert_eq!(
            AtlanConnectorType::from_qualified_name("default/tableau/1700000000"),
            Some(AtlanConnectorType::Tableau)
        );
        assert_eq!(AtlanConnectorType::from_qualified_name("default/snowflake"), None);
        assert_eq!(
            AtlanConnectorType::from_qualified_name("default/mainframe/1700000000"),
            None
        );
    }

    #[test]
    fn test_connector_categories() {
        assert_eq!(
            AtlanConnectorType::Snowflake.category(),
            ConnectorCategory::Warehouse
        );
        assert_eq!(AtlanConnectorType::Looker.category(), ConnectorCategory::Bi);
        assert_eq!("PowerBI".parse::<AtlanConnectorType>(), Ok(AtlanConnectorType::Powerbi));
    }
}
