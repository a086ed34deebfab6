// src/process/matrix.rs
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

use super::date_parser::CanonicalDate;
use super::group::{DateColumnGroups, ExcludedHeader};
use super::raw_table::RawTable;
use super::utils::{clean_str, parse_rank_cell, RankCell};

/// What the builder dropped or merged on the way to the matrix. None of it is
/// an error; it exists so a caller can tell "malformed header" apart from
/// "no rank that day".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildDiagnostics {
    pub rank_columns: usize,
    pub excluded_headers: Vec<ExcludedHeader>,
    /// Non-empty rank cells that were not a positive integer.
    pub rejected_cells: usize,
    /// Rows with a blank keyword.
    pub skipped_rows: usize,
    /// Rows folded into an earlier row with the same keyword.
    pub merged_rows: usize,
}

/// One rank per keyword per canonical date, the deduplicated form of the
/// wide sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankMatrix {
    /// Keywords in order of first appearance.
    keywords: Vec<String>,
    index: HashMap<String, usize>,
    /// Every date that had at least one rank column, ascending.
    dates: Vec<CanonicalDate>,
    /// Parallel to `keywords`; only dates with a rank are present.
    ranks: Vec<BTreeMap<CanonicalDate, u32>>,
    diagnostics: BuildDiagnostics,
}

impl RankMatrix {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn dates(&self) -> &[CanonicalDate] {
        &self.dates
    }

    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.index.contains_key(keyword)
    }

    pub fn contains_date(&self, date: CanonicalDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    pub fn latest_date(&self) -> Option<CanonicalDate> {
        self.dates.last().copied()
    }

    /// The matrix date immediately before `date`, if `date` is a matrix date
    /// and not the first one.
    pub fn previous_date(&self, date: CanonicalDate) -> Option<CanonicalDate> {
        match self.dates.binary_search(&date) {
            Ok(i) if i > 0 => Some(self.dates[i - 1]),
            _ => None,
        }
    }

    pub fn rank(&self, keyword: &str, date: CanonicalDate) -> Option<u32> {
        let i = *self.index.get(keyword)?;
        self.ranks[i].get(&date).copied()
    }

    /// Full trend for one keyword over every matrix date, ascending.
    pub fn series(&self, keyword: &str) -> Option<Vec<(CanonicalDate, Option<u32>)>> {
        self.series_over(keyword, &self.dates)
    }

    /// Trend for one keyword restricted to `dates` (kept in the given order).
    pub fn series_over(
        &self,
        keyword: &str,
        dates: &[CanonicalDate],
    ) -> Option<Vec<(CanonicalDate, Option<u32>)>> {
        let i = *self.index.get(keyword)?;
        Some(
            dates
                .iter()
                .map(|d| (*d, self.ranks[i].get(d).copied()))
                .collect(),
        )
    }

    /// Every keyword's rank on one date, in keyword order.
    pub fn column(&self, date: CanonicalDate) -> impl Iterator<Item = (&str, Option<u32>)> + '_ {
        self.keywords
            .iter()
            .zip(&self.ranks)
            .map(move |(k, r)| (k.as_str(), r.get(&date).copied()))
    }
}

/// Collapse each date group into a single rank per keyword.
///
/// Per keyword row and date: every cell of the group is read numerically,
/// unusable cells are ignored, and the best (lowest) surviving position wins.
/// If nothing survives the keyword simply has no rank that day. Repeated
/// keyword rows fold together under the same rule. Total: never fails.
#[tracing::instrument(level = "debug", skip_all, fields(rows = table.rows.len(), dates = groups.len()))]
pub fn build_rank_matrix(table: &RawTable, groups: &DateColumnGroups) -> RankMatrix {
    let mut matrix = RankMatrix {
        dates: groups.dates().collect(),
        ..RankMatrix::default()
    };
    let diag = &mut matrix.diagnostics;
    diag.rank_columns = groups.iter().map(|(_, cols)| cols.len()).sum::<usize>()
        + groups.excluded().len();
    diag.excluded_headers = groups.excluded().to_vec();

    for row in 0..table.rows.len() {
        let keyword = clean_str(table.keyword(row));
        if keyword.is_empty() {
            trace!(row, "skipping row with blank keyword");
            diag.skipped_rows += 1;
            continue;
        }

        let slot = match matrix.index.get(&keyword) {
            Some(&i) => {
                trace!(row, keyword = %keyword, "merging repeated keyword row");
                diag.merged_rows += 1;
                i
            }
            None => {
                let i = matrix.keywords.len();
                matrix.index.insert(keyword.clone(), i);
                matrix.keywords.push(keyword);
                matrix.ranks.push(BTreeMap::new());
                i
            }
        };

        for (date, columns) in groups.iter() {
            let mut best: Option<u32> = None;
            for &col in columns {
                match parse_rank_cell(table.cell(row, col)) {
                    RankCell::Rank(r) => best = Some(best.map_or(r, |b| b.min(r))),
                    RankCell::Rejected => diag.rejected_cells += 1,
                    RankCell::Empty => {}
                }
            }
            if let Some(r) = best {
                matrix.ranks[slot]
                    .entry(date)
                    .and_modify(|existing| *existing = (*existing).min(r))
                    .or_insert(r);
            }
        }
    }

    debug!(
        keywords = matrix.keywords.len(),
        dates = matrix.dates.len(),
        rejected_cells = matrix.diagnostics.rejected_cells,
        skipped_rows = matrix.diagnostics.skipped_rows,
        merged_rows = matrix.diagnostics.merged_rows,
        "built rank matrix"
    );
    matrix
}
