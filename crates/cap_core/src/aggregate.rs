//! Aggregator: distinct values, filtering, token counts and percentages.
//!
//! Everything here is a pure function over borrowed records and a [`Schema`];
//! the national, provincial and municipal breakdowns are all built from these
//! pieces with different predicates and universes.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::record::Record;
use crate::roles::Role;
use crate::schema::Schema;

/// Sort order for a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collation {
    /// Code-point order. Used for lever, strategy and province lists.
    #[default]
    Ordinal,
    /// Case- and accent-insensitive order for names shown to people
    /// (`Lévis` sorts next to `Laval`, not after `Z`).
    Display,
}

impl Collation {
    pub fn compare(self, left: &str, right: &str) -> Ordering {
        match self {
            Self::Ordinal => left.cmp(right),
            Self::Display => display_key(left)
                .cmp(&display_key(right))
                .then_with(|| left.cmp(right)),
        }
    }
}

fn display_key(value: &str) -> Vec<char> {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

const fn fold_accent(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Every distinct token of `role` across `records`, sorted, without duplicates.
pub fn distinct_values<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    schema: &Schema,
    role: Role,
    collation: Collation,
) -> Vec<String> {
    let unique = records
        .into_iter()
        .flat_map(|record| schema.tokens(record, role))
        .collect::<BTreeSet<_>>();

    let mut values = unique.into_iter().collect::<Vec<_>>();
    if collation != Collation::Ordinal {
        values.sort_by(|left, right| collation.compare(left, right));
    }
    values
}

/// A record filter on one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The role's single value equals `value` after trimming.
    Equals { role: Role, value: String },
    /// The role's tokens include `token`.
    Includes { role: Role, token: String },
}

impl Predicate {
    pub fn equals(role: Role, value: impl Into<String>) -> Self {
        Self::Equals {
            role,
            value: value.into(),
        }
    }

    pub fn includes(role: Role, token: impl Into<String>) -> Self {
        Self::Includes {
            role,
            token: token.into(),
        }
    }

    pub fn matches(&self, record: &Record, schema: &Schema) -> bool {
        match self {
            Self::Equals { role, value } => {
                let actual = schema.single(record, *role).unwrap_or_default();
                same_text(*role, &actual, value.trim())
            }
            Self::Includes { role, token } => {
                let wanted = token.trim();
                schema
                    .tokens(record, *role)
                    .iter()
                    .any(|candidate| same_text(*role, candidate, wanted))
            }
        }
    }
}

fn same_text(role: Role, left: &str, right: &str) -> bool {
    if role.matches_case_insensitively() {
        left.to_lowercase() == right.to_lowercase()
    } else {
        left == right
    }
}

/// Records satisfying every predicate, in their original order.
pub fn filter_records<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    schema: &Schema,
    predicates: &[Predicate],
) -> Vec<&'a Record> {
    records
        .into_iter()
        .filter(|record| predicates.iter().all(|p| p.matches(record, schema)))
        .collect()
}

/// Occurrence count per token, iterated in sorted token order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TokenCounts {
    counts: BTreeMap<String, u64>,
}

impl TokenCounts {
    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(token, count)| (token.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for TokenCounts {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        Self {
            counts: iter
                .into_iter()
                .map(|(token, count)| (token.into(), count))
                .collect(),
        }
    }
}

/// Counts token occurrences of `role` over `records`.
///
/// Every universe token starts at zero so empty categories stay visible.
/// Tokens seen in the data but missing from the universe are counted too, so
/// the key set is the universe plus whatever was observed.
pub fn count_tokens<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    schema: &Schema,
    role: Role,
    universe: &[String],
) -> TokenCounts {
    let mut counts = universe
        .iter()
        .map(|token| (token.clone(), 0))
        .collect::<BTreeMap<_, _>>();

    for record in records {
        for token in schema.tokens(record, role) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    TokenCounts { counts }
}

/// Share of the total per token, in percent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Percentages {
    shares: BTreeMap<String, f64>,
}

impl Percentages {
    /// Share of `token`; tokens that were never counted have a share of zero.
    pub fn get(&self, token: &str) -> f64 {
        self.shares.get(token).copied().unwrap_or(0.0)
    }

    /// Share rounded to two decimals for display.
    pub fn rounded(&self, token: &str) -> f64 {
        round2(self.get(token))
    }

    pub fn total(&self) -> f64 {
        self.shares.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.shares.iter().map(|(token, share)| (token.as_str(), *share))
    }
}

/// `100 * count / total` per token; every share is zero when the total is zero.
#[allow(clippy::cast_precision_loss)]
pub fn percentize(counts: &TokenCounts) -> Percentages {
    let total = counts.total();
    let shares = counts
        .iter()
        .map(|(token, count)| {
            let share = if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64) * 100.0
            };
            (token.to_string(), share)
        })
        .collect();
    Percentages { shares }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleMap;
    use crate::schema::ExtractionTable;

    fn schema() -> Schema {
        let roles: RoleMap = [
            (Role::Province, "Province".to_string()),
            (Role::Municipality, "Municipality".to_string()),
            (Role::Lever, "Lever".to_string()),
        ]
        .into_iter()
        .collect();
        Schema::new(roles, ExtractionTable::lever_view())
    }

    fn action(province: &str, city: &str, lever: &str) -> Record {
        Record::new()
            .with("Province", province)
            .with("Municipality", city)
            .with("Lever", lever)
    }

    fn actions() -> Vec<Record> {
        vec![
            action("ON", "Toronto", "Regulation"),
            action("ON", "Guelph", "Incentive"),
            action("BC", "Victoria", "Regulation"),
        ]
    }

    fn universe(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        let records = vec![
            action(" ON ", "Toronto", "Regulation; Incentive"),
            action("BC", "Victoria", "Incentive,Education"),
            action("", "Nowhere", ""),
        ];
        let schema = schema();

        assert_eq!(
            distinct_values(&records, &schema, Role::Province, Collation::Ordinal),
            ["BC", "ON"]
        );
        assert_eq!(
            distinct_values(&records, &schema, Role::Lever, Collation::Ordinal),
            ["Education", "Incentive", "Regulation"]
        );
    }

    #[test]
    fn display_collation_folds_case_and_accents() {
        let records = vec![
            action("QC", "Québec", "x"),
            action("QC", "laval", "x"),
            action("QC", "Lévis", "x"),
            action("QC", "Montréal", "x"),
        ];
        let cities = distinct_values(
            &records,
            &schema(),
            Role::Municipality,
            Collation::Display,
        );
        assert_eq!(cities, ["laval", "Lévis", "Montréal", "Québec"]);
    }

    #[test]
    fn province_equality_is_case_sensitive() {
        let records = actions();
        let schema = schema();

        let kept = filter_records(&records, &schema, &[Predicate::equals(Role::Province, "on")]);
        assert!(kept.is_empty());

        let kept = filter_records(&records, &schema, &[Predicate::equals(Role::Province, " ON")]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn municipality_equality_ignores_case() {
        let records = actions();
        let kept = filter_records(
            &records,
            &schema(),
            &[Predicate::equals(Role::Municipality, "TORONTO")],
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn includes_checks_split_tokens() {
        let records = vec![
            action("ON", "Toronto", "Regulation; Incentive"),
            action("ON", "Guelph", "Education"),
        ];
        let kept = filter_records(
            &records,
            &schema(),
            &[Predicate::includes(Role::Lever, "Incentive")],
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn filtering_by_city_twice_changes_nothing() {
        let records = actions();
        let schema = schema();
        let predicates = [
            Predicate::equals(Role::Province, "ON"),
            Predicate::equals(Role::Municipality, "Guelph"),
        ];

        let once = filter_records(&records, &schema, &predicates);
        let twice = filter_records(once.iter().copied(), &schema, &predicates[1..]);
        assert_eq!(once, twice);
    }

    #[test]
    fn counts_keep_zero_entries_from_universe() {
        let records = actions();
        let schema = schema();
        let bc = filter_records(&records, &schema, &[Predicate::equals(Role::Province, "BC")]);

        let counts = count_tokens(bc, &schema, Role::Lever, &universe(&["Incentive", "Regulation"]));
        assert_eq!(counts.get("Incentive"), 0);
        assert_eq!(counts.get("Regulation"), 1);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn counts_grow_for_tokens_outside_universe() {
        let records = actions();
        let counts = count_tokens(&records, &schema(), Role::Lever, &universe(&["Incentive"]));

        assert_eq!(counts.get("Regulation"), 2);
        assert_eq!(
            counts.iter().map(|(token, _)| token).collect::<Vec<_>>(),
            ["Incentive", "Regulation"]
        );
    }

    #[test]
    fn end_to_end_province_breakdown() {
        let records = actions();
        let schema = schema();
        let ontario = filter_records(&records, &schema, &[Predicate::equals(Role::Province, "ON")]);

        let counts = count_tokens(
            ontario,
            &schema,
            Role::Lever,
            &universe(&["Incentive", "Regulation"]),
        );
        let expected: TokenCounts = [("Incentive", 1), ("Regulation", 1)].into_iter().collect();
        assert_eq!(counts, expected);

        let shares = percentize(&counts);
        assert!((shares.get("Incentive") - 50.0).abs() < f64::EPSILON);
        assert!((shares.get("Regulation") - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentize_of_zero_total_is_all_zero() {
        let counts: TokenCounts = [("Incentive", 0), ("Regulation", 0)].into_iter().collect();
        let shares = percentize(&counts);

        assert!(shares.iter().all(|(_, share)| share.abs() < f64::EPSILON));
        assert!(shares.total().abs() < f64::EPSILON);
    }

    #[test]
    fn rounded_shares_have_two_decimals() {
        let counts: TokenCounts = [("a", 1), ("b", 2)].into_iter().collect();
        let shares = percentize(&counts);

        assert!((shares.rounded("a") - 33.33).abs() < 1e-9);
        assert!((shares.rounded("b") - 66.67).abs() < 1e-9);
        assert!(shares.rounded("missing").abs() < f64::EPSILON);
    }

    #[test]
    fn single_role_counts_records_per_label() {
        let records = actions();
        let counts = count_tokens(&records, &schema(), Role::Province, &[]);
        assert_eq!(counts.get("ON"), 2);
        assert_eq!(counts.get("BC"), 1);
    }
}
