use super::paginate::{paginate, total_pages, DEFAULT_PAGE_SIZE};
use super::predicate::{matches, ColumnFilter, ColumnFilters};
use super::sort::{sort_rows, SortDirection, SortState};
use super::value::{is_empty_value, Column, Record};
use serde::Deserialize;
use std::collections::HashSet;

/// Feature switches for one table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub searchable: bool,
    pub filterable: bool,
    pub pagination: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            searchable: true,
            filterable: true,
            pagination: true,
        }
    }
}

/// The user's current selections against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    pub search_term: String,
    pub column_filters: ColumnFilters,
    pub sort: SortState,
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            column_filters: ColumnFilters::new(),
            sort: SortState::default(),
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub type RowClickHandler = Box<dyn FnMut(&Record) + Send>;

/// Search, filter, sort and paginate over a caller-owned set of records.
///
/// Every mutation recomputes the filtered and sorted view from scratch, so
/// the visible rows are always a function of (records, columns, state).
/// When a mutation changes the filtered row count the current page falls
/// back to 1.
pub struct TableEngine {
    records: Vec<Record>,
    columns: Vec<Column>,
    options: TableOptions,
    state: EngineState,
    // indices into `records`, filtered then sorted
    view: Vec<usize>,
    on_row_click: Option<RowClickHandler>,
}

impl TableEngine {
    pub fn new(records: Vec<Record>, columns: Vec<Column>) -> Self {
        Self::with_options(records, columns, TableOptions::default())
    }

    pub fn with_options(records: Vec<Record>, columns: Vec<Column>, options: TableOptions) -> Self {
        let mut engine = Self {
            records,
            columns,
            options,
            state: EngineState::default(),
            view: Vec::new(),
            on_row_click: None,
        };
        engine.recompute();
        engine
    }

    pub fn on_row_click<F>(&mut self, f: F)
    where
        F: FnMut(&Record) + Send + 'static,
    {
        self.on_row_click = Some(Box::new(f));
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    fn recompute(&mut self) {
        let search = if self.options.searchable {
            self.state.search_term.as_str()
        } else {
            ""
        };
        let no_filters = ColumnFilters::new();
        let filters = if self.options.filterable {
            &self.state.column_filters
        } else {
            &no_filters
        };
        let mut rows: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| matches(r, search, filters))
            .map(|(i, _)| i)
            .collect();

        let records = &self.records;
        sort_rows(&mut rows, &self.state.sort, |&i| &records[i]);

        tracing::trace!(
            total = self.records.len(),
            filtered = rows.len(),
            "table view recomputed"
        );
        self.view = rows;
    }

    // Recompute and reset the page if the filtered set changed size.
    fn refresh(&mut self) {
        let before = self.view.len();
        self.recompute();
        if self.view.len() != before {
            self.state.current_page = 1;
        }
    }

    pub fn set_search_term(&mut self, term: &str) {
        if self.state.search_term == term {
            return;
        }
        self.state.search_term = term.to_string();
        self.refresh();
    }

    /// Unknown or non-filterable keys are ignored.
    pub fn set_column_filter(&mut self, key: &str, filter: ColumnFilter) {
        if !self.column(key).is_some_and(|c| c.filterable) {
            return;
        }
        if filter.is_active() {
            self.state.column_filters.insert(key.to_string(), filter);
        } else {
            self.state.column_filters.remove(key);
        }
        self.state.current_page = 1;
        self.refresh();
    }

    /// Header click on `key`. Unknown or non-sortable keys are ignored.
    pub fn set_sort(&mut self, key: &str) {
        if !self.column(key).is_some_and(|c| c.sortable) {
            return;
        }
        self.state.sort.toggle(key);
        self.refresh();
    }

    /// Sets key and direction directly, bypassing the toggle.
    pub fn set_sort_explicit(&mut self, key: Option<&str>, direction: SortDirection) {
        match key {
            Some(k) if self.column(k).is_some_and(|c| c.sortable) => {
                self.state.sort = SortState {
                    key: Some(k.to_string()),
                    direction,
                };
            }
            Some(_) => return,
            None => self.state.sort = SortState::default(),
        }
        self.refresh();
    }

    /// Clamped to `1..=total_pages()`.
    pub fn set_page(&mut self, page: usize) {
        self.state.current_page = page.clamp(1, self.total_pages());
    }

    /// Zero is ignored. Any accepted size returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            return;
        }
        self.state.page_size = page_size;
        self.state.current_page = 1;
    }

    /// Swaps in a fresh record set from the caller.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.refresh();
    }

    pub fn total_filtered_count(&self) -> usize {
        self.view.len()
    }

    /// Never less than 1, so an empty table still shows "page 1 of 1".
    pub fn total_pages(&self) -> usize {
        if !self.options.pagination {
            return 1;
        }
        total_pages(self.view.len(), self.state.page_size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    fn visible_indices(&self) -> &[usize] {
        if !self.options.pagination {
            return &self.view;
        }
        paginate(&self.view, self.state.current_page, self.state.page_size)
    }

    pub fn visible_rows(&self) -> Vec<&Record> {
        self.visible_indices()
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    /// Activates the `index`th visible row and hands the source record to
    /// the row-click handler.
    pub fn activate_row(&mut self, index: usize) -> Option<&Record> {
        let &source = self.visible_indices().get(index)?;
        let record = &self.records[source];
        if let Some(handler) = self.on_row_click.as_mut() {
            handler(record);
        }
        Some(record)
    }

    /// Distinct display values of a filterable column in first-seen order.
    /// Blank and absent values are left out.
    pub fn filter_options(&self, key: &str) -> Vec<String> {
        if !self.column(key).is_some_and(|c| c.filterable) {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for r in &self.records {
            let v = r.get(key);
            if is_empty_value(v) {
                continue;
            }
            let s = super::value::display_of(v);
            if seen.insert(s.clone()) {
                out.push(s);
            }
        }
        out
    }

    pub fn summary_label(&self) -> String {
        let n = self.total_filtered_count();
        let noun = if n == 1 { "Result" } else { "Results" };
        let mut label = format!("{n} {noun}");
        if self.options.searchable && !self.state.search_term.is_empty() {
            label.push_str(&format!(" for \"{}\"", self.state.search_term));
        }
        label
    }
}
