use serde_json::{Number, Value};

/// A field value as it appears in a dataset record.
///
/// Dataset files are loosely typed, so every value is normalized into one of
/// these shapes on load and the rest of the engine never looks at raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Absent,
    Text(String),
    Number(Number),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Text form of the value, `None` when absent.
    ///
    /// Lists join their elements with `,`, the way a browser stringifies an
    /// array; absent elements contribute an empty string.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(number_text(number)),
            Self::List(items) => Some(
                items
                    .iter()
                    .map(|item| item.to_text().unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) | Value::Object(_) => Self::Absent,
            Value::Bool(true) => Self::Text("true".to_string()),
            Value::String(text) => Self::Text(text),
            Value::Number(number) => Self::Number(number),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

/// Integral numbers print without a fractional part, so a plan year stored as
/// `2022.0` still reads `2022`.
#[allow(clippy::cast_possible_truncation)]
pub fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }

    let float = number.as_f64().unwrap_or_default();
    if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e15 {
        return (float as i64).to_string();
    }
    float.to_string()
}
