use super::engine::TableEngine;
use super::paginate::PAGE_SIZE_OPTIONS;
use super::predicate::ColumnFilter;
use super::sort::SortDirection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// A full set of table selections submitted in one request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filters: BTreeMap<String, ColumnFilter>,
    pub sort_key: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl TableQuery {
    /// Replays the query through the engine's own operations so page
    /// resets and key checks behave exactly as interactive use.
    pub fn apply(&self, engine: &mut TableEngine) {
        engine.set_search_term(&self.search);
        for (key, filter) in &self.filters {
            engine.set_column_filter(key, filter.clone());
        }
        engine.set_sort_explicit(self.sort_key.as_deref(), self.sort_direction);
        if let Some(size) = self.page_size {
            engine.set_page_size(size);
        }
        if let Some(page) = self.page {
            engine.set_page(page);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage {
    pub rows: Vec<serde_json::Value>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_filtered_count: usize,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub summary: String,
    pub columns: Vec<serde_json::Value>,
    pub filter_options: BTreeMap<String, Vec<String>>,
}

impl TablePage {
    pub fn from_engine(engine: &TableEngine) -> Self {
        let rows = engine
            .visible_rows()
            .into_iter()
            .map(|r| {
                let cells: serde_json::Map<String, serde_json::Value> = engine
                    .columns()
                    .iter()
                    .map(|c| (c.key.clone(), json!(c.render(r))))
                    .collect();
                json!({ "record": r.to_json(), "cells": cells })
            })
            .collect();
        let filter_options = engine
            .columns()
            .iter()
            .filter(|c| c.filterable)
            .map(|c| (c.key.clone(), engine.filter_options(&c.key)))
            .collect();
        Self {
            rows,
            current_page: engine.current_page(),
            total_pages: engine.total_pages(),
            total_filtered_count: engine.total_filtered_count(),
            page_size: engine.page_size(),
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            summary: engine.summary_label(),
            columns: engine.columns().iter().map(|c| c.to_json()).collect(),
            filter_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::value::{Column, Record};

    #[test]
    fn query_from_json_drives_engine() {
        let q: TableQuery = serde_json::from_value(json!({
            "search": "",
            "filters": { "bus": "__empty__", "route": "all" },
            "sortKey": "name",
            "sortDirection": "desc",
            "page": 1,
            "pageSize": 5
        }))
        .expect("query");
        assert_eq!(q.filters.get("bus"), Some(&ColumnFilter::Empty));
        assert_eq!(q.filters.get("route"), Some(&ColumnFilter::All));

        let records = vec![
            Record::new().with("name", "Ann").with("bus", "B1"),
            Record::new().with("name", "Ben"),
            Record::new().with("name", "Cal"),
        ];
        let cols = vec![
            Column::new("name", "Name").sortable(),
            Column::new("bus", "Bus").filterable(),
            Column::new("route", "Route").filterable(),
        ];
        let mut engine = TableEngine::new(records, cols);
        q.apply(&mut engine);
        let page = TablePage::from_engine(&engine);
        assert_eq!(page.total_filtered_count, 2);
        assert_eq!(page.page_size, 5);
        assert_eq!(page.rows[0]["cells"]["name"], json!("Cal"));
        assert_eq!(page.rows[1]["cells"]["name"], json!("Ben"));
        assert_eq!(page.filter_options["bus"], vec!["B1".to_string()]);
    }
}
