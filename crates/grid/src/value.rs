use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

/// A single cell value, normalized by type for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    Bool(bool),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(d: DateTime<Utc>) -> Self {
        CellValue::Date(d)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

/// A row the grid can sort and page. Implementors map a column key to the
/// cell value under it; unknown keys should return [`CellValue::Null`].
pub trait GridRow {
    fn cell(&self, key: &str) -> CellValue;
}

/// Compares two cell values with a total, deterministic ordering.
///
/// Same-type pairs compare natively: numbers numerically (`total_cmp`),
/// dates by epoch millisecond, booleans with `false < true`. Everything
/// else, including mixed-type pairs, falls back to case-folded string
/// comparison of the display form, with `Null` rendering as the empty
/// string so it sorts lowest. The raw form breaks case-fold ties, keeping
/// the ordering total for repeated runs on identical input.
pub fn compare(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        (CellValue::Date(x), CellValue::Date(y)) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        _ => {
            let (ra, rb) = (a.to_string(), b.to_string());
            ra.to_lowercase()
                .cmp(&rb.to_lowercase())
                .then_with(|| ra.cmp(&rb))
        }
    }
}
