// src/process/group.rs
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::date_parser::{CanonicalDate, DateParser};

/// A rank-column header that did not parse as a date. The column takes no
/// further part in processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedHeader {
    pub column: usize,
    pub header: String,
}

/// Rank columns partitioned by the canonical date their header resolves to.
/// Keys iterate in calendar order, whatever order the sheet had.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateColumnGroups {
    groups: BTreeMap<CanonicalDate, Vec<usize>>,
    excluded: Vec<ExcludedHeader>,
}

impl DateColumnGroups {
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalDate, &[usize])> {
        self.groups.iter().map(|(d, cols)| (*d, cols.as_slice()))
    }

    pub fn dates(&self) -> impl Iterator<Item = CanonicalDate> + '_ {
        self.groups.keys().copied()
    }

    pub fn columns(&self, date: CanonicalDate) -> Option<&[usize]> {
        self.groups.get(&date).map(Vec::as_slice)
    }

    pub fn excluded(&self) -> &[ExcludedHeader] {
        &self.excluded
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Run every rank-column header through `parser` and union the columns that
/// land on the same date. Headers that fail to parse are treated as stray
/// metadata: recorded in [`DateColumnGroups::excluded`], never an error.
pub fn group_rank_columns<'a, I>(columns: I, parser: &DateParser) -> DateColumnGroups
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut out = DateColumnGroups::default();

    for (column, header) in columns {
        match parser.parse(header) {
            Ok(date) => out.groups.entry(date).or_default().push(column),
            Err(_) => {
                warn!(column, header, "rank column header is not a date; excluding");
                out.excluded.push(ExcludedHeader {
                    column,
                    header: header.to_string(),
                });
            }
        }
    }

    let merged = out.groups.values().filter(|cols| cols.len() > 1).count();
    debug!(
        dates = out.groups.len(),
        merged,
        excluded = out.excluded.len(),
        "grouped rank columns"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn differently_formatted_headers_share_a_group() {
        let headers = [(4, "03-02-2024"), (5, "03-01-2024"), (6, "3/1/2024"), (7, "Notes")];
        let groups = group_rank_columns(headers, &DateParser::default());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.columns(ymd(2024, 3, 1)), Some(&[5, 6][..]));
        assert_eq!(groups.columns(ymd(2024, 3, 2)), Some(&[4][..]));
        assert_eq!(
            groups.excluded(),
            &[ExcludedHeader {
                column: 7,
                header: "Notes".into()
            }]
        );
    }

    #[test]
    fn dates_come_out_in_calendar_order() {
        let headers = [(4, "01/15/2024"), (5, "12-31-2023"), (6, "01-02-2024")];
        let groups = group_rank_columns(headers, &DateParser::default());
        let dates: Vec<_> = groups.dates().collect();
        assert_eq!(dates, vec![ymd(2023, 12, 31), ymd(2024, 1, 2), ymd(2024, 1, 15)]);
    }

    #[test]
    fn no_rank_columns_is_empty_not_error() {
        let groups = group_rank_columns(std::iter::empty(), &DateParser::default());
        assert!(groups.is_empty());
        assert!(groups.excluded().is_empty());
    }
}
