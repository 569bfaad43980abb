//! Feature record model and the stored-value codec.
//!
//! Flag values are `serde_json::Value` on the API side and opaque JSON
//! text on the storage side. Encoding happens on write, decoding on read;
//! a payload that fails to decode is returned as raw text rather than
//! failing the lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::StorageError;

/// The reserved fallback scope.
///
/// Records stored here apply to every scope that has no exact override.
/// Every other scope string is caller-defined and structurally opaque.
pub const GLOBAL_SCOPE: &str = "global";

/// Maximum length accepted for feature names and scope strings.
pub const MAX_KEY_LEN: usize = 100;

/// A persisted feature flag, unique per `(name, scope)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Feature name, e.g. "dark_mode", "checkout_v2"
    pub name: String,
    /// Free-form scope string, e.g. "global", "beta", "tenant:42"
    pub scope: String,
    /// Whether the flag is on for this scope
    pub enabled: bool,
    /// Optional value stored alongside the flag, already decoded
    pub value: Option<Value>,
    /// Set once, on the first write of this pair
    pub created_at: DateTime<Utc>,
    /// Refreshed on every write
    pub modified_at: DateTime<Utc>,
}

/// Encode a flag value into its storage payload.
///
/// `None` and JSON `null` both map to an absent payload; readers cannot
/// tell the two apart, so an explicit null does not survive a round trip.
pub fn encode_value(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.to_string()),
    }
}

/// Decode a storage payload into a flag value.
///
/// Invalid JSON is a degraded read, not an error: the raw text comes back
/// as a JSON string and a warning is logged.
pub fn decode_value(raw: Option<&str>) -> Option<Value> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, payload = raw, "stored flag value is not valid JSON, returning raw text");
            Some(Value::String(raw.to_string()))
        }
    }
}

/// Validate a `(name, scope)` pair at the write boundary.
pub(crate) fn validate_key(name: &str, scope: &str) -> Result<(), StorageError> {
    check_field("name", name)?;
    check_field("scope", scope)
}

fn check_field(field: &'static str, value: &str) -> Result<(), StorageError> {
    if value.is_empty() {
        return Err(StorageError::InvalidKey {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.chars().count() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey {
            field,
            reason: format!("exceeds {MAX_KEY_LEN} characters"),
        });
    }
    Ok(())
}
