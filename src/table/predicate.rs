use super::value::{display_of, is_empty_value, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire token selecting records whose value is absent, null or blank.
pub const EMPTY_TOKEN: &str = "__empty__";
/// Wire token clearing a column filter.
pub const ALL_TOKEN: &str = "all";

/// Selection made in one column's filter control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnFilter {
    #[default]
    All,
    Equals(String),
    Empty,
}

impl ColumnFilter {
    pub fn is_active(&self) -> bool {
        !matches!(self, ColumnFilter::All)
    }

    fn accepts(&self, record: &Record, key: &str) -> bool {
        match self {
            ColumnFilter::All => true,
            ColumnFilter::Empty => is_empty_value(record.get(key)),
            ColumnFilter::Equals(want) => {
                !is_empty_value(record.get(key)) && display_of(record.get(key)) == *want
            }
        }
    }
}

impl From<String> for ColumnFilter {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" | ALL_TOKEN => ColumnFilter::All,
            EMPTY_TOKEN => ColumnFilter::Empty,
            _ => ColumnFilter::Equals(s),
        }
    }
}

impl From<ColumnFilter> for String {
    fn from(f: ColumnFilter) -> Self {
        match f {
            ColumnFilter::All => ALL_TOKEN.to_string(),
            ColumnFilter::Empty => EMPTY_TOKEN.to_string(),
            ColumnFilter::Equals(s) => s,
        }
    }
}

pub type ColumnFilters = BTreeMap<String, ColumnFilter>;

/// Case-insensitive substring match against every field's display form.
/// An empty term matches everything.
pub fn matches_search(record: &Record, search_term: &str) -> bool {
    if search_term.is_empty() {
        return true;
    }
    let needle = search_term.to_lowercase();
    record
        .values()
        .any(|v| v.display().to_lowercase().contains(&needle))
}

/// Every active filter must accept the record.
pub fn matches_filters(record: &Record, filters: &ColumnFilters) -> bool {
    filters.iter().all(|(key, f)| f.accepts(record, key))
}

/// The search term and every column filter must accept the record.
pub fn matches(record: &Record, search_term: &str, filters: &ColumnFilters) -> bool {
    matches_search(record, search_term) && matches_filters(record, filters)
}
