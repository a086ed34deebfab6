/// The wide table as exported: one header record, then one row per keyword.
///
/// Column 0 is the keyword, the next `metadata_column_count - 1` columns are
/// metadata we never read, everything after that is a rank column whose
/// header should be a date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Header text exactly as exported.
    pub headers: Vec<String>,
    /// Data rows. Exports are ragged at times, so a row may be shorter (or
    /// longer) than `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Header of the keyword column, if the table has any columns at all.
    pub fn keyword_header(&self) -> Option<&str> {
        self.headers.first().map(String::as_str)
    }

    /// `(column index, header)` for every rank column.
    pub fn rank_columns(&self, metadata_column_count: usize) -> impl Iterator<Item = (usize, &str)> {
        self.headers
            .iter()
            .enumerate()
            .skip(metadata_column_count.max(1))
            .map(|(i, h)| (i, h.as_str()))
    }

    /// Cell at `(row, col)`; a missing trailing cell reads as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn keyword(&self, row: usize) -> &str {
        self.cell(row, 0)
    }
}
