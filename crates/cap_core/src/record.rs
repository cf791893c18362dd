use std::io::Read;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::DatasetError;
use crate::value::FieldValue;

const BYTE_ORDER_MARK: char = '\u{feff}';

static ABSENT: FieldValue = FieldValue::Absent;

/// One row of a dataset: field names in declaration order with their values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder used by tests and callers assembling records by hand.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Inserts or replaces a field, keeping the original position on replace.
    pub fn insert(&mut self, name: &str, value: FieldValue) {
        let name = normalize_field_name(name);
        if let Some(slot) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Value of `field`, or [`FieldValue::Absent`] when the record has no such field.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map_or(&ABSENT, |(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn first_field(&self) -> Option<&str> {
        self.fields.first().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut record = Self::new();
        for (name, value) in map {
            record.insert(&name, FieldValue::from(value));
        }
        record
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

/// Spreadsheet exports sometimes leave a byte-order mark glued to the first header.
fn normalize_field_name(name: &str) -> String {
    name.trim_start_matches(BYTE_ORDER_MARK).to_string()
}

/// A parsed dataset file: a JSON array of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn from_json_str(input: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    pub fn from_slice(input: &[u8]) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_slice(input)?;
        Self::from_value(value)
    }

    /// Read failures surface as [`DatasetError::Parse`], the way
    /// `serde_json` reports them.
    pub fn from_reader(reader: impl Read) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    /// Accepts an already-decoded JSON document.
    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        let Value::Array(items) = value else {
            return Err(DatasetError::NotAnArray {
                found: json_kind(&value),
            });
        };

        let total = items.len();
        let records = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(map) => Some(Record::from_map(map)),
                other => {
                    warn!(index, kind = json_kind(&other), "skipping non-object dataset entry");
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(total, kept = records.len(), "parsed dataset");
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
