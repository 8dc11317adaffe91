use std::fmt;

use crate::value::GridRow;

/// Renders a row into the display form for one column.
pub type CellRenderer<R> = Box<dyn Fn(&R) -> String + Send + Sync>;

/// Caller-supplied column definition: header label, accessor key, optional
/// custom renderer, and whether header clicks may sort by it.
pub struct Column<R> {
    header: String,
    key: String,
    sortable: bool,
    cell: Option<CellRenderer<R>>,
}

impl<R: GridRow> Column<R> {
    /// Creates a sortable column.
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
            sortable: true,
            cell: None,
        }
    }

    /// Marks the column as excluded from sorting; `set_sort` skips it.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Overrides the default rendering (the cell value's display form).
    pub fn with_cell(mut self, cell: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.cell = Some(Box::new(cell));
        self
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Renders one cell for this column.
    pub fn render(&self, row: &R) -> String {
        match &self.cell {
            Some(cell) => cell(row),
            None => row.cell(&self.key).to_string(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("key", &self.key)
            .field("sortable", &self.sortable)
            .field("custom_cell", &self.cell.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    struct Row {
        name: &'static str,
        size: i64,
    }

    impl GridRow for Row {
        fn cell(&self, key: &str) -> CellValue {
            match key {
                "name" => self.name.into(),
                "size" => self.size.into(),
                _ => CellValue::Null,
            }
        }
    }

    #[test]
    fn renders_value_display_by_default() {
        let col = Column::new("Name", "name");
        let row = Row { name: "ledger.pdf", size: 10 };
        assert_eq!(col.render(&row), "ledger.pdf");
    }

    #[test]
    fn custom_renderer_wins() {
        let col = Column::new("Size", "size").with_cell(|r: &Row| format!("{} B", r.size));
        let row = Row { name: "a", size: 2048 };
        assert_eq!(col.render(&row), "2048 B");
    }

    #[test]
    fn sortable_by_default() {
        let col: Column<Row> = Column::new("Name", "name");
        assert!(col.is_sortable());
        let col = col.not_sortable();
        assert!(!col.is_sortable());
    }

    #[test]
    fn unknown_key_renders_empty() {
        let col: Column<Row> = Column::new("Missing", "missing");
        let row = Row { name: "a", size: 1 };
        assert_eq!(col.render(&row), "");
    }
}
