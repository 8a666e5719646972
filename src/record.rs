//! Directory records as served by the portal backend.
//!
//! A record is an ordered mapping from field name to a scalar JSON value.
//! The field set is whatever the backend returns; nothing here assumes a
//! schema beyond the three fields used to derive a record's identity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::PortalError;
use crate::remote::Backend;

/// Fields concatenated (in this order) to form a record's identity.
pub const IDENTITY_FIELDS: [&str; 3] = ["Name", "Contact", "Email"];
const IDENTITY_SEPARATOR: &str = "_";

/// A single directory record. Field order is the backend's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Raw value of a field. `None` when the field is absent,
    /// `Some(Value::Null)` when the backend sent an explicit null.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Derive the key that correlates a record with its persisted contact status.
///
/// `Name`, `Contact` and `Email` joined by `_`. Absent, null and falsy values
/// (empty string, zero, `false`) contribute an empty segment. The backend uses
/// the same string as its lookup key, so the format must not change.
pub fn identity(record: &Record) -> String {
    IDENTITY_FIELDS
        .iter()
        .map(|field| identity_segment(record.get(field)))
        .collect::<Vec<_>>()
        .join(IDENTITY_SEPARATOR)
}

fn identity_segment(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(other) => display_string(other).unwrap_or_default(),
    }
}

/// Text form of a field value, `None` for null.
///
/// Integral floats print without a fractional part (`17.0` -> `"17"`) so
/// spreadsheet-derived numbers display the way they were entered.
pub fn display_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_string(n)),
        other => Some(other.to_string()),
    }
}

fn number_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// The full dataset fetched once at startup. Read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    loaded: bool,
}

impl RecordStore {
    /// Fetch the dataset from the backend. On failure nothing is retried;
    /// the caller decides how to surface the error.
    pub fn load(backend: &dyn Backend) -> Result<Self, PortalError> {
        let records = backend.load_dataset().map_err(|err| PortalError::load(&err))?;
        tracing::info!(count = records.len(), "loaded dataset");
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            loaded: true,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
