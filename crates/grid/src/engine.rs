use serde::Serialize;

use crate::column::Column;
use crate::page::{clamp_page, page_bounds, page_count};
use crate::sort::{SortDirection, SortState, sort_rows};
use crate::value::GridRow;

/// Everything a rendering layer needs for sort indicators and pager controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub page: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub sort: Option<SortState>,
}

/// Owns the sort/page state over a caller-supplied row collection.
///
/// The engine never mutates rows in place; `set_rows` replaces the whole
/// collection. Visible rows and the page count are derived on demand, never
/// stored, so they can't drift from the source data.
pub struct GridEngine<R: GridRow> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
}

impl<R: GridRow> GridEngine<R> {
    /// Creates an engine over `rows` with a fixed page size.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero — an input-contract violation, not a
    /// runtime-recoverable condition.
    pub fn new(columns: Vec<Column<R>>, rows: Vec<R>, page_size: usize) -> Self {
        assert!(page_size > 0, "page_size must be positive");
        Self {
            columns,
            rows,
            sort: None,
            page: 0,
            page_size,
        }
    }

    /// Handles a header click on `key`.
    ///
    /// A new column sorts ascending; the same column toggles direction
    /// (descending toggles back to ascending — there is no unsorted
    /// re-entry). Unknown keys and `sortable: false` columns are ignored.
    /// Every accepted call resets the page to 0, since the row order (and
    /// thus page contents) changes.
    pub fn set_sort(&mut self, key: &str) {
        let Some(column) = self.columns.iter().find(|c| c.key() == key) else {
            return;
        };
        if !column.is_sortable() {
            return;
        }

        match &mut self.sort {
            Some(state) if state.key == key => {
                state.direction = state.direction.toggle();
            }
            _ => {
                self.sort = Some(SortState {
                    key: key.to_string(),
                    direction: SortDirection::Ascending,
                });
            }
        }
        self.page = 0;
    }

    /// Navigates to page `n`, silently clamping out-of-range requests.
    pub fn set_page(&mut self, n: usize) {
        self.page = clamp_page(n, self.page_count());
    }

    /// Replaces the source collection, e.g. after a refetch.
    ///
    /// The sort selection is preserved; the page is clamped down if the new
    /// collection no longer reaches it.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.page = clamp_page(self.page, self.page_count());
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        page_count(self.rows.len(), self.page_size)
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// The rows of the active page, in display order.
    pub fn visible_rows(&self) -> Vec<&R> {
        let order = self.sorted_indices();
        let (start, end) = page_bounds(self.page, self.page_size, order.len());
        order[start..end].iter().map(|&i| &self.rows[i]).collect()
    }

    /// Pager/indicator metadata for the rendering layer.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            page: self.page,
            page_count: self.page_count(),
            total_rows: self.rows.len(),
            sort: self.sort.clone(),
        }
    }

    fn sorted_indices(&self) -> Vec<usize> {
        match &self.sort {
            Some(state) => sort_rows(&self.rows, &state.key, state.direction),
            None => (0..self.rows.len()).collect(),
        }
    }
}
