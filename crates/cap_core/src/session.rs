//! Load lifecycle of the three dataset files.
//!
//! A dataset is fetched once; until it arrives the views that need it show a
//! placeholder, and if it fails they keep showing one. Nothing here is global:
//! the application owns a [`Session`] and hands references to the composer.

use std::fmt;

use tracing::{error, info, warn};

use crate::record::{Dataset, Record};
use crate::roles::RoleRules;
use crate::schema::{ExtractionTable, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Cities,
    Actions,
    ActionsModified,
}

impl DatasetKind {
    pub const ALL: [Self; 3] = [Self::Cities, Self::Actions, Self::ActionsModified];

    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Cities => "cities.json",
            Self::Actions => "actions.json",
            Self::ActionsModified => "actions_mod.json",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cities => "cities",
            Self::Actions => "actions",
            Self::ActionsModified => "actions (modified)",
        }
    }

    pub fn rules(self) -> RoleRules {
        match self {
            Self::Cities => RoleRules::cities(),
            Self::Actions => RoleRules::actions(),
            Self::ActionsModified => RoleRules::strategy_actions(),
        }
    }

    /// The modified action file feeds the strategy breakdown and is read with
    /// semicolon-only splitting throughout.
    pub fn extraction(self) -> ExtractionTable {
        match self {
            Self::Cities | Self::Actions => ExtractionTable::lever_view(),
            Self::ActionsModified => ExtractionTable::strategy_view(),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Records of one dataset together with the schema inferred for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDataset {
    pub kind: DatasetKind,
    pub records: Vec<Record>,
    pub schema: Schema,
}

impl LoadedDataset {
    pub fn new(kind: DatasetKind, dataset: Dataset) -> Self {
        let records = dataset.records;
        if records.is_empty() {
            warn!(dataset = %kind, "dataset has no records");
        }
        let schema = Schema::infer(&records, &kind.rules(), kind.extraction());
        info!(
            dataset = %kind,
            records = records.len(),
            roles = schema.roles.len(),
            "dataset ready"
        );
        Self {
            kind,
            records,
            schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState<T> {
    #[default]
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed(_) => None,
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            Self::Pending | Self::Ready(_) => None,
        }
    }
}

/// Datasets of one dashboard session, each written once when its load completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub cities: LoadState<LoadedDataset>,
    pub actions: LoadState<LoadedDataset>,
    pub actions_modified: LoadState<LoadedDataset>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self, kind: DatasetKind) -> &LoadState<LoadedDataset> {
        match kind {
            DatasetKind::Cities => &self.cities,
            DatasetKind::Actions => &self.actions,
            DatasetKind::ActionsModified => &self.actions_modified,
        }
    }

    pub const fn dataset(&self, kind: DatasetKind) -> Option<&LoadedDataset> {
        self.state(kind).ready()
    }

    /// Records the outcome of a load. A failure is logged and kept; it never
    /// tears the session down.
    pub fn complete<E: fmt::Display>(&mut self, kind: DatasetKind, outcome: Result<Dataset, E>) {
        let state = match outcome {
            Ok(dataset) => LoadState::Ready(LoadedDataset::new(kind, dataset)),
            Err(reason) => {
                error!(dataset = %kind, %reason, "failed to load dataset");
                LoadState::Failed(reason.to_string())
            }
        };

        match kind {
            DatasetKind::Cities => self.cities = state,
            DatasetKind::Actions => self.actions = state,
            DatasetKind::ActionsModified => self.actions_modified = state,
        }
    }

    pub fn is_loading(&self) -> bool {
        DatasetKind::ALL
            .into_iter()
            .any(|kind| self.state(kind).is_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::lever_options;
    use crate::error::DatasetError;
    use crate::roles::Role;

    #[test]
    fn ready_dataset_carries_inferred_schema() {
        let mut session = Session::new();
        let dataset = Dataset::from_json_str(
            r#"[{"Province": "ON", "Municipality": "Guelph", "Lever": "Regulation"}]"#,
        );
        session.complete(DatasetKind::Actions, dataset);

        let loaded = session.dataset(DatasetKind::Actions).unwrap();
        assert_eq!(loaded.schema.roles.field(Role::Lever), Some("Lever"));
        assert!(session.is_loading());
    }

    #[test]
    fn failure_is_recorded_not_raised() {
        let mut session = Session::new();
        session.complete(DatasetKind::Cities, Dataset::from_json_str("not json"));

        assert!(session.dataset(DatasetKind::Cities).is_none());
        assert!(session.cities.failure().is_some());
    }

    #[test]
    fn loading_ends_when_every_dataset_settles() {
        let mut session = Session::new();
        for kind in DatasetKind::ALL {
            session.complete::<DatasetError>(kind, Ok(Dataset::default()));
        }

        assert!(!session.is_loading());
        assert!(session.dataset(DatasetKind::Cities).unwrap().schema.roles.is_empty());
    }

    #[test]
    fn modified_actions_split_levers_on_semicolons_only() {
        let mut session = Session::new();
        session.complete(
            DatasetKind::ActionsModified,
            Dataset::from_json_str(r#"[{"Lever": "Regulation, Incentive"}]"#),
        );

        let loaded = session.dataset(DatasetKind::ActionsModified).unwrap();
        let tokens = loaded.schema.tokens(&loaded.records[0], Role::Lever);
        assert_eq!(tokens, ["Regulation, Incentive"]);
    }

    #[test]
    fn modified_actions_without_lever_column_offer_no_levers() {
        let mut session = Session::new();
        let body = r#"[{"Province": "ON", "Strategy": "Bylaws; Codes"}]"#;
        session.complete(DatasetKind::ActionsModified, Dataset::from_json_str(body));
        session.complete(DatasetKind::Actions, Dataset::from_json_str(body));

        let modified = session.dataset(DatasetKind::ActionsModified).unwrap();
        assert_eq!(modified.schema.roles.field(Role::Lever), None);
        assert_eq!(modified.schema.roles.field(Role::Strategy), Some("Strategy"));
        assert!(lever_options(&modified.records, &modified.schema).is_empty());

        let actions = session.dataset(DatasetKind::Actions).unwrap();
        assert_eq!(actions.schema.roles.field(Role::Lever), Some("Strategy"));
    }
}
