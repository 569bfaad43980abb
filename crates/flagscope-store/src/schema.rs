//! Row definitions for the SurrealDB `features` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serde bridge between chrono timestamps and SurrealDB datetimes
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// A row in the `features` table.
///
/// `value` carries the opaque JSON payload exactly as handed to
/// [`crate::FeatureStore::upsert`]; decoding happens at the read boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub name: String,
    pub scope: String,
    pub enabled: bool,
    pub value: Option<String>,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl FeatureRow {
    /// Build a fresh row; both timestamps start at now.
    pub fn new(name: &str, scope: &str, enabled: bool, value: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            scope: scope.to_string(),
            enabled,
            value,
            created_at: now,
            modified_at: now,
        }
    }

    /// The replacement row for an in-place update: `created_at` is kept,
    /// `modified_at` is refreshed.
    pub fn updated(&self, enabled: bool, value: Option<String>) -> Self {
        Self {
            name: self.name.clone(),
            scope: self.scope.clone(),
            enabled,
            value,
            created_at: self.created_at,
            modified_at: Utc::now(),
        }
    }
}
