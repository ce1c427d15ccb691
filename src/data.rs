use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SourceError;

pub use crate::types::{BaseId, EntryId, FieldName, TableName};

/// Closed set of value kinds a record field may hold.
///
/// Remote payloads are validated into this set at the client boundary;
/// anything else (JSON objects, non-finite numbers) is rejected there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free-form text.
    Text(String),
    /// Numeric value. Integers are widened to `f64`.
    Number(f64),
    /// Boolean flag (e.g. a checkbox column).
    Bool(bool),
    /// Array of values, e.g. multi-select or linked-record columns.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Convert a raw JSON value into the closed value-kind set.
    ///
    /// Returns `Ok(None)` for JSON null, which callers treat as an absent
    /// field. Nulls inside arrays are dropped the same way.
    pub fn from_json(value: &Value) -> Result<Option<FieldValue>, String> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(FieldValue::Text(s.clone()))),
            Value::Bool(b) => Ok(Some(FieldValue::Bool(*b))),
            Value::Number(n) => n
                .as_f64()
                .map(|n| Some(FieldValue::Number(n)))
                .ok_or_else(|| format!("number {n} is not representable as f64")),
            Value::Array(items) => {
                let mut converted = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(item) = Self::from_json(item)? {
                        converted.push(item);
                    }
                }
                Ok(Some(FieldValue::List(converted)))
            }
            Value::Object(_) => Err("nested objects are not a supported field kind".to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One row's field-name to value mapping, in source field order.
///
/// Fields are dynamic: the set is discovered from the data itself, and two
/// records of the same table may disagree on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<FieldName, FieldValue>,
}

impl Record {
    /// Validate a raw JSON field map into a record.
    ///
    /// `table` is only used for error context. Null-valued fields are
    /// dropped, matching how the remote service omits empty cells.
    pub fn from_json_map(
        table: &str,
        raw: &serde_json::Map<String, Value>,
    ) -> Result<Record, SourceError> {
        let mut fields = IndexMap::with_capacity(raw.len());
        for (name, value) in raw {
            match FieldValue::from_json(value) {
                Ok(Some(value)) => {
                    fields.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(details) => {
                    return Err(SourceError::FieldShape {
                        table: table.to_string(),
                        field: name.clone(),
                        details,
                    });
                }
            }
        }
        Ok(Record { fields })
    }

    /// Field names in source order.
    pub fn field_names(&self) -> Vec<FieldName> {
        self.fields.keys().cloned().collect()
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Insert or replace a field, preserving first-seen order.
    pub fn insert(&mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Iterate fields in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.fields.iter()
    }

    /// Number of fields present on this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(FieldName, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (FieldName, FieldValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Derived metadata describing one table's shape for downstream consumers.
///
/// Serialized keys are camelCase; this is the wire format rendering and
/// writing targets consume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    /// Name of the plugin that produced the model.
    pub source: String,
    /// Logical table name, used as the model name.
    pub model_name: TableName,
    /// Display label; identical to the model name for this source.
    pub model_label: String,
    /// Identifier of the remote base the table belongs to.
    pub project_id: BaseId,
    /// Ordered field names observed for this table. Empty for empty tables.
    pub field_names: Vec<FieldName>,
}

/// A record enriched with a synthetic id and its table's schema model.
///
/// The model is shared, not owned: entries of the same table point at one
/// `SchemaModel` allocation, and the pipeline's model collection holds the
/// same reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    /// Original record fields, flattened into the entry on serialization.
    #[serde(flatten)]
    pub fields: Record,
    /// Synthetic identifier, unique within the merged output.
    pub id: EntryId,
    /// Back-reference to the table's schema model.
    #[serde(rename = "__metadata")]
    pub metadata: Arc<SchemaModel>,
}

/// The cumulative data object threaded through all plugins in a run.
///
/// This plugin only ever appends to `models` and `objects`; buckets placed
/// here by other plugins ride along untouched in `rest`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineData {
    /// One schema model per table, across all source plugins.
    #[serde(default)]
    pub models: Vec<Arc<SchemaModel>>,
    /// Flattened normalized entries, across all source plugins.
    #[serde(default)]
    pub objects: Vec<NormalizedEntry>,
    /// Buckets owned by other plugins, preserved verbatim.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}
