use serde::{Deserialize, Serialize};

use crate::value::{GridRow, compare};

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The active sort selection: which column, which way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

/// Returns row indices ordered by the value under `key`.
///
/// The ascending order is stable: rows with equal keys keep their relative
/// input order (index tie-break). Descending is the exact reverse of the
/// ascending sequence rather than a separate comparator, so equal keys stay
/// grouped in both directions and `asc -> desc` is a strict reversal.
pub fn sort_rows<R: GridRow>(rows: &[R], key: &str, direction: SortDirection) -> Vec<usize> {
    let mut keyed: Vec<(usize, crate::value::CellValue)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i, row.cell(key)))
        .collect();

    keyed.sort_unstable_by(|(i, a), (j, b)| compare(a, b).then(i.cmp(j)));

    let mut indices: Vec<usize> = keyed.into_iter().map(|(i, _)| i).collect();
    if direction == SortDirection::Descending {
        indices.reverse();
    }
    indices
}
