//! Column names shared by the aligner and the feature-list tooling.

use crate::models::contract::{ColumnKind, ColumnSpec};

/// Input layout assumed when a pipeline does not record its columns.
pub const DEFAULT_COLUMNS: [(&str, ColumnKind); 12] = [
    ("District", ColumnKind::Categorical),
    ("Ward", ColumnKind::Categorical),
    ("House_type", ColumnKind::Categorical),
    ("Legal_documents", ColumnKind::Categorical),
    ("No_floor", ColumnKind::Categorical),
    ("No_bedroom", ColumnKind::Categorical),
    ("Length", ColumnKind::Numeric),
    ("Width", ColumnKind::Numeric),
    ("Day_Of_Week", ColumnKind::Categorical),
    ("Month", ColumnKind::Numeric),
    ("Area", ColumnKind::Numeric),
    ("Region", ColumnKind::Numeric),
];

/// Fields a pre-encoded model sees as one-hot dummies.
pub const DUMMY_SOURCES: [&str; 5] = ["District", "Ward", "House_type", "Legal_documents", "Day_Of_Week"];

/// Fields a pre-encoded model sees as plain numbers, ahead of the dummies.
pub const PASSTHROUGH_SOURCES: [&str; 4] = ["No_floor", "No_bedroom", "Month", "Region"];

pub fn default_layout() -> Vec<ColumnSpec> {
    DEFAULT_COLUMNS
        .iter()
        .map(|(name, kind)| ColumnSpec {
            name: (*name).to_string(),
            kind: *kind,
        })
        .collect()
}

pub fn dummy_column(source: &str, category: &str) -> String {
    format!("{source}_{category}")
}
