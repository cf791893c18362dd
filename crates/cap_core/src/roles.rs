//! Field Inferrer: works out which dataset field plays which semantic role.
//!
//! Dataset files name their columns inconsistently (`Province`, `province`,
//! `Municipality (n=104)`, `Policy Levers`...), so roles are detected by
//! lower-cased substring matching over the field names of a sample record.
//! The matching rules are plain data in [`RoleRules`]; adding a role or a
//! dataset flavour means adding a table, not code.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::record::Record;
use crate::value::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Province,
    Municipality,
    Lever,
    Strategy,
    Year,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::Province,
        Self::Municipality,
        Self::Lever,
        Self::Strategy,
        Self::Year,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::Municipality => "municipality",
            Self::Lever => "lever",
            Self::Strategy => "strategy",
            Self::Year => "year",
        }
    }

    /// Municipality names are typed by people and matched case-insensitively.
    pub const fn matches_case_insensitively(self) -> bool {
        matches!(self, Self::Municipality)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A test against a lower-cased field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Contains(&'static str),
    Exact(&'static str),
}

impl Pattern {
    fn matches(&self, lowered: &str) -> bool {
        match self {
            Self::Contains(needle) => lowered.contains(needle),
            Self::Exact(name) => lowered == *name,
        }
    }
}

/// What to do when none of a role's patterns matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    None,
    /// Use the sample record's first field.
    FirstField,
    /// Use this field name even if the record does not carry it; lookups then
    /// simply come back absent.
    Literal(&'static str),
    /// Second, lower-priority pass over the field names.
    Patterns(Vec<Pattern>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRule {
    pub role: Role,
    pub patterns: Vec<Pattern>,
    pub fallback: Fallback,
}

impl RoleRule {
    pub const fn new(role: Role, patterns: Vec<Pattern>) -> Self {
        Self {
            role,
            patterns,
            fallback: Fallback::None,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Ordered rule table consumed by [`infer_roles`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleRules {
    pub rules: Vec<RoleRule>,
}

impl RoleRules {
    pub const fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    /// Rules for the municipality directory (`cities.json`).
    pub fn cities() -> Self {
        Self::new(vec![
            RoleRule::new(Role::Province, vec![Pattern::Exact("province")])
                .with_fallback(Fallback::Literal("Province")),
            RoleRule::new(Role::Municipality, vec![Pattern::Contains("municip")])
                .with_fallback(Fallback::FirstField),
            RoleRule::new(Role::Year, vec![Pattern::Contains("year")])
                .with_fallback(Fallback::Literal("Year")),
        ])
    }

    /// Rules for the action inventory behind the lever breakdown (`actions.json`).
    /// A file without a lever column reads its strategies as levers.
    pub fn actions() -> Self {
        Self::new(vec![
            RoleRule::new(
                Role::Province,
                vec![Pattern::Exact("province"), Pattern::Contains("provinc")],
            ),
            RoleRule::new(
                Role::Municipality,
                vec![Pattern::Contains("municip"), Pattern::Contains("city")],
            ),
            RoleRule::new(Role::Lever, vec![Pattern::Contains("lever")])
                .with_fallback(Fallback::Patterns(vec![Pattern::Contains("strateg")])),
            RoleRule::new(Role::Strategy, vec![Pattern::Contains("strateg")]),
            RoleRule::new(Role::Year, vec![Pattern::Contains("year")]),
        ])
    }

    /// Rules for the strategy inventory (`actions_mod.json`). Levers here only
    /// filter strategies, so a missing lever column stays unassigned.
    pub fn strategy_actions() -> Self {
        Self::new(vec![
            RoleRule::new(
                Role::Province,
                vec![Pattern::Exact("province"), Pattern::Contains("provinc")],
            ),
            RoleRule::new(
                Role::Municipality,
                vec![Pattern::Contains("municip"), Pattern::Contains("city")],
            ),
            RoleRule::new(Role::Lever, vec![Pattern::Contains("lever")]),
            RoleRule::new(Role::Strategy, vec![Pattern::Contains("strateg")]),
        ])
    }
}

/// Concrete field name per role for one loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoleMap {
    fields: BTreeMap<Role, String>,
}

impl RoleMap {
    pub fn field(&self, role: Role) -> Option<&str> {
        self.fields.get(&role).map(String::as_str)
    }

    /// Value the record carries for `role`; absent when the role is unassigned.
    pub fn value<'a>(&self, record: &'a Record, role: Role) -> &'a FieldValue {
        static ABSENT: FieldValue = FieldValue::Absent;
        self.field(role).map_or(&ABSENT, |field| record.get(field))
    }

    pub fn assigned(&self) -> impl Iterator<Item = (Role, &str)> {
        self.fields.iter().map(|(role, field)| (*role, field.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn assign(&mut self, role: Role, field: &str) {
        self.fields.entry(role).or_insert_with(|| field.to_string());
    }
}

impl FromIterator<(Role, String)> for RoleMap {
    fn from_iter<T: IntoIterator<Item = (Role, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Assigns each role the first field (in declaration order) whose lower-cased
/// name matches one of the role's patterns.
///
/// First match wins: once a role has a field, later fields are never
/// considered for it. A single field may satisfy several roles. Roles that
/// stay unmatched fall back per their rule, or stay unassigned; neither case
/// is an error.
pub fn infer_roles(sample: &Record, rules: &RoleRules) -> RoleMap {
    let mut map = RoleMap::default();
    let lowered = sample
        .field_names()
        .map(|name| (name, name.to_lowercase()))
        .collect::<Vec<_>>();

    for (name, lower) in &lowered {
        for rule in &rules.rules {
            if map.field(rule.role).is_none()
                && rule.patterns.iter().any(|pattern| pattern.matches(lower))
            {
                map.assign(rule.role, name);
            }
        }
    }

    for rule in &rules.rules {
        if map.field(rule.role).is_some() {
            continue;
        }

        match &rule.fallback {
            Fallback::None => {
                warn!(role = %rule.role, "no field matched role");
            }
            Fallback::FirstField => {
                if let Some(first) = sample.first_field() {
                    info!(role = %rule.role, field = first, "falling back to first field");
                    map.assign(rule.role, first);
                }
            }
            Fallback::Literal(field) => {
                info!(role = %rule.role, field, "falling back to literal field name");
                map.assign(rule.role, field);
            }
            Fallback::Patterns(patterns) => {
                let found = lowered
                    .iter()
                    .find(|(_, lower)| patterns.iter().any(|pattern| pattern.matches(lower)));
                if let Some((name, _)) = found {
                    info!(role = %rule.role, field = *name, "using secondary match");
                    map.assign(rule.role, name);
                } else {
                    warn!(role = %rule.role, "no field matched role");
                }
            }
        }
    }

    debug!(?map, "inferred field roles");
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new()
            .with("Province", "ON")
            .with("Municipality (n=104)", "Toronto")
            .with("Year", 2022)
    }

    #[test]
    fn assigns_roles_from_field_names() {
        let map = infer_roles(&sample(), &RoleRules::actions());

        assert_eq!(map.field(Role::Province), Some("Province"));
        assert_eq!(map.field(Role::Municipality), Some("Municipality (n=104)"));
        assert_eq!(map.field(Role::Year), Some("Year"));
        assert_eq!(map.field(Role::Lever), None);
    }

    #[test]
    fn first_match_wins_over_later_fields() {
        let record = Record::new()
            .with("Lever (primary)", "Regulation")
            .with("Levers", "Incentive");
        let map = infer_roles(&record, &RoleRules::actions());

        assert_eq!(map.field(Role::Lever), Some("Lever (primary)"));
    }

    #[test]
    fn one_field_can_serve_several_roles() {
        let record = Record::new().with("Lever / Strategy", "Regulation");
        let map = infer_roles(&record, &RoleRules::actions());

        assert_eq!(map.field(Role::Lever), Some("Lever / Strategy"));
        assert_eq!(map.field(Role::Strategy), Some("Lever / Strategy"));
    }

    #[test]
    fn lever_falls_back_to_strategy_field() {
        let record = Record::new()
            .with("Province", "ON")
            .with("Strategy Type", "Education");
        let map = infer_roles(&record, &RoleRules::actions());

        assert_eq!(map.field(Role::Lever), Some("Strategy Type"));
    }

    #[test]
    fn strategy_inventory_has_no_lever_fallback() {
        let record = Record::new()
            .with("Province", "ON")
            .with("Strategy Type", "Education");
        let map = infer_roles(&record, &RoleRules::strategy_actions());

        assert_eq!(map.field(Role::Lever), None);
        assert_eq!(map.field(Role::Strategy), Some("Strategy Type"));
    }

    #[test]
    fn cities_fallbacks_use_first_field_and_literal_year() {
        let record = Record::new().with("Name", "Guelph").with("province", "ON");
        let map = infer_roles(&record, &RoleRules::cities());

        assert_eq!(map.field(Role::Municipality), Some("Name"));
        assert_eq!(map.field(Role::Year), Some("Year"));
        assert_eq!(map.field(Role::Province), Some("province"));
    }

    #[test]
    fn cities_province_requires_exact_name() {
        let record = Record::new().with("Provincial Code", "ON");
        let map = infer_roles(&record, &RoleRules::cities());

        assert_eq!(map.field(Role::Province), Some("Province"));
    }

    #[test]
    fn unassigned_roles_read_as_absent() {
        let map = infer_roles(&sample(), &RoleRules::actions());
        assert!(map.value(&sample(), Role::Strategy).is_absent());
    }

    #[test]
    fn empty_sample_with_literal_fallback_still_assigns() {
        let map = infer_roles(&Record::new(), &RoleRules::cities());

        assert_eq!(map.field(Role::Year), Some("Year"));
        assert_eq!(map.field(Role::Municipality), None);
    }
}
