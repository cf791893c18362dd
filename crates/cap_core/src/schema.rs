use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::Record;
use crate::roles::{infer_roles, Role, RoleMap, RoleRules};
use crate::split::{single_value, split_values, SplitMode};

/// How a role's value is read off a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "split")]
pub enum Extraction {
    /// One trimmed value per record.
    Single,
    /// Zero or more tokens per record.
    Multi(SplitMode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionTable {
    roles: BTreeMap<Role, Extraction>,
}

impl ExtractionTable {
    /// Levers split on `;` or `,`, strategies on `;` only.
    pub fn lever_view() -> Self {
        Self::single_by_default([
            (Role::Lever, Extraction::Multi(SplitMode::SemicolonOrComma)),
            (Role::Strategy, Extraction::Multi(SplitMode::Semicolon)),
        ])
    }

    /// The strategy breakdown reads its lever column with a semicolon-only split.
    pub fn strategy_view() -> Self {
        Self::single_by_default([
            (Role::Lever, Extraction::Multi(SplitMode::Semicolon)),
            (Role::Strategy, Extraction::Multi(SplitMode::Semicolon)),
        ])
    }

    fn single_by_default(overrides: impl IntoIterator<Item = (Role, Extraction)>) -> Self {
        let mut roles = Role::ALL
            .into_iter()
            .map(|role| (role, Extraction::Single))
            .collect::<BTreeMap<_, _>>();
        roles.extend(overrides);
        Self { roles }
    }

    pub fn get(&self, role: Role) -> Extraction {
        self.roles.get(&role).copied().unwrap_or(Extraction::Single)
    }
}

impl Default for ExtractionTable {
    fn default() -> Self {
        Self::lever_view()
    }
}

/// Per-dataset context: which field plays which role and how to read it.
///
/// Built once when a dataset finishes loading and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Schema {
    pub roles: RoleMap,
    pub extraction: ExtractionTable,
}

impl Schema {
    pub const fn new(roles: RoleMap, extraction: ExtractionTable) -> Self {
        Self { roles, extraction }
    }

    /// Infers roles from the first record. An empty dataset has nothing to
    /// infer from and gets an empty role map.
    pub fn infer(records: &[Record], rules: &RoleRules, extraction: ExtractionTable) -> Self {
        let roles = records
            .first()
            .map(|sample| infer_roles(sample, rules))
            .unwrap_or_default();
        Self::new(roles, extraction)
    }

    /// Tokens a record contributes for `role`.
    pub fn tokens(&self, record: &Record, role: Role) -> Vec<String> {
        let value = self.roles.value(record, role);
        match self.extraction.get(role) {
            Extraction::Single => single_value(value).into_iter().collect(),
            Extraction::Multi(mode) => split_values(value, mode),
        }
    }

    /// Trimmed single value of `role`, or `None` when blank or unassigned.
    pub fn single(&self, record: &Record, role: Role) -> Option<String> {
        single_value(self.roles.value(record, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(extraction: ExtractionTable) -> Schema {
        let roles = [
            (Role::Lever, "Lever".to_string()),
            (Role::Province, "Province".to_string()),
        ]
        .into_iter()
        .collect();
        Schema::new(roles, extraction)
    }

    #[test]
    fn lever_view_splits_levers_on_commas() {
        let record = Record::new().with("Lever", "Regulation, Incentive");
        let tokens = schema(ExtractionTable::lever_view()).tokens(&record, Role::Lever);
        assert_eq!(tokens, ["Regulation", "Incentive"]);
    }

    #[test]
    fn strategy_view_keeps_commas_in_levers() {
        let record = Record::new().with("Lever", "Regulation, Incentive");
        let tokens = schema(ExtractionTable::strategy_view()).tokens(&record, Role::Lever);
        assert_eq!(tokens, ["Regulation, Incentive"]);
    }

    #[test]
    fn single_roles_are_not_split() {
        let record = Record::new().with("Province", " Newfoundland, Labrador ");
        let tokens = schema(ExtractionTable::lever_view()).tokens(&record, Role::Province);
        assert_eq!(tokens, ["Newfoundland, Labrador"]);
    }

    #[test]
    fn unassigned_role_yields_no_tokens() {
        let record = Record::new().with("Strategy", "Education");
        let schema = schema(ExtractionTable::lever_view());
        assert!(schema.tokens(&record, Role::Strategy).is_empty());
        assert_eq!(schema.single(&record, Role::Year), None);
    }

    #[test]
    fn empty_dataset_infers_nothing() {
        let schema = Schema::infer(&[], &RoleRules::cities(), ExtractionTable::lever_view());
        assert!(schema.roles.is_empty());
    }
}
