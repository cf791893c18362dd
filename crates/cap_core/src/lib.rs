//! Key-inference and aggregation engine behind the climate action plan dashboard.
//!
//! Dataset files name their columns inconsistently, so the engine first works
//! out which field holds the province, municipality, lever, strategy and plan
//! year ([`roles`]), then splits multi-valued cells into tokens ([`split`]),
//! and finally filters and aggregates records into percentage breakdowns
//! ([`aggregate`], [`compose`]). Everything is a pure function over explicit
//! inputs; load state lives in a [`session::Session`] owned by the caller.

pub mod aggregate;
pub mod compose;
pub mod display;
pub mod error;
pub mod markers;
pub mod palette;
pub mod record;
pub mod roles;
pub mod schema;
pub mod session;
pub mod split;
pub mod value;

pub use aggregate::{
    count_tokens, distinct_values, filter_records, percentize, Collation, Percentages, Predicate,
    TokenCounts,
};
pub use compose::{GeoView, PlanDetail, Scope, Selection, Series, StackedChart};
pub use error::DatasetError;
pub use record::{Dataset, Record};
pub use roles::{infer_roles, Role, RoleMap, RoleRules};
pub use schema::{Extraction, ExtractionTable, Schema};
pub use session::{DatasetKind, LoadState, LoadedDataset, Session};
pub use split::{split_values, SplitMode};
pub use value::FieldValue;
