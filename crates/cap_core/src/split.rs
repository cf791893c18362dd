//! Multi-Value Splitter: turns a field value into discrete tokens.

use serde::Serialize;

use crate::value::FieldValue;

/// Delimiters used to split a delimited text value.
///
/// Lever columns are written as `"Regulation; Incentive"` or
/// `"Regulation, Incentive"`, while strategy descriptions contain commas of
/// their own and are only ever separated by semicolons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    SemicolonOrComma,
    Semicolon,
}

impl SplitMode {
    const fn is_delimiter(self, ch: char) -> bool {
        match self {
            Self::SemicolonOrComma => ch == ';' || ch == ',',
            Self::Semicolon => ch == ';',
        }
    }
}

/// Splits a value into trimmed, non-empty tokens, in order.
///
/// Absent values give no tokens. Lists contribute one token per element
/// (elements are not split further). Scalars are converted to text and split
/// on the mode's delimiters. A numeric zero is present and yields `"0"`.
pub fn split_values(value: &FieldValue, mode: SplitMode) -> Vec<String> {
    match value {
        FieldValue::Absent => Vec::new(),
        FieldValue::List(items) => items
            .iter()
            .filter_map(FieldValue::to_text)
            .filter_map(|item| non_empty_trimmed(&item))
            .collect(),
        scalar => scalar
            .to_text()
            .map(|text| {
                text.split(|ch| mode.is_delimiter(ch))
                    .filter_map(non_empty_trimmed)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Trimmed text form of a single-valued field, `None` when absent or blank.
pub fn single_value(value: &FieldValue) -> Option<String> {
    value.to_text().and_then(|text| non_empty_trimmed(&text))
}

fn non_empty_trimmed(piece: &str) -> Option<String> {
    let trimmed = piece.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
