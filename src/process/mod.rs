// src/process/mod.rs
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;

use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

pub mod date_parser;
pub mod group;
pub mod matrix;
pub mod raw_table;
pub mod utils;

pub use date_parser::{CanonicalDate, DateFormat, DateParser};
pub use group::{group_rank_columns, DateColumnGroups, ExcludedHeader};
pub use matrix::{build_rank_matrix, BuildDiagnostics, RankMatrix};
pub use raw_table::RawTable;

use crate::config::Config;

/// Read a CSV export of the rank sheet.
///
/// - The first record is the header row (keyword, metadata, date headers).
/// - Every later record is a keyword row; short or long records are kept as-is.
/// - Blank lines are skipped by the reader.
#[tracing::instrument(level = "info", skip(reader))]
pub fn load_rank_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // exports drop trailing empty cells on some rows
        .from_reader(reader);

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(first) => first
            .context("CSV parse error in header record")?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect(),
        None => bail!("rank sheet is empty: no header record"),
    };

    let mut rows = Vec::new();
    for (idx, result) in records.enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let record = result.with_context(|| format!("CSV parse error at record {}", idx + 2))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    info!(columns = headers.len(), rows = rows.len(), "loaded rank sheet");
    Ok(RawTable { headers, rows })
}

/// [`load_rank_csv`] from a file on disk.
pub fn load_rank_csv_path<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open rank sheet: {}", path.display()))?;
    load_rank_csv(file).with_context(|| format!("Failed to read rank sheet: {}", path.display()))
}

/// The whole normalization: header dates → column groups → rank matrix.
/// Deterministic; calling it twice on the same table gives equal matrices.
pub fn build_matrix(table: &RawTable, config: &Config) -> RankMatrix {
    let parser = config.date_parser();
    let groups = group_rank_columns(table.rank_columns(config.metadata_column_count), &parser);
    debug!(
        keyword_header = table.keyword_header().unwrap_or(""),
        dates = groups.len(),
        "resolved rank column dates"
    );
    build_rank_matrix(table, &groups)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    pub(crate) fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,rankgrid=debug")),
            )
            .with_test_writer() // Redirect logs to the test output
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber); // Use `let _ =` to ignore errors if already set
    }

    pub(crate) const SHEET: &str = "\
Keyword,Search Volume,Difficulty,URL,03-02-2024,03-01-2024,3/1/2024,Notes,02-28-2024
running shoes,12000,45,/shoes,2,5,3,check,4
trail boots,800,30,/boots,-,n/a,,,
wool socks,300,12,/socks,11,abc,8,,
rain jacket,500,20,/jacket,7
";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_rank_csv() -> Result<()> {
        init_test_logging();
        let table = load_rank_csv(Cursor::new(SHEET))?;

        assert_eq!(table.headers.len(), 9);
        assert_eq!(table.keyword_header(), Some("Keyword"));
        assert_eq!(table.rows.len(), 4);
        // ragged last row survives
        assert_eq!(table.rows[3].len(), 5);
        assert_eq!(table.cell(3, 8), "");
        Ok(())
    }

    #[test]
    fn strips_byte_order_mark() -> Result<()> {
        let table = load_rank_csv(Cursor::new("\u{feff}Keyword,a,b,c,03-01-2024\nx,,,,1\n"))?;
        assert_eq!(table.keyword_header(), Some("Keyword"));
        Ok(())
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(load_rank_csv(Cursor::new("")).is_err());
    }

    #[test]
    fn load_from_disk_and_build() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(SHEET.as_bytes())?;

        let table = load_rank_csv_path(tmp.path())?;
        let matrix = build_matrix(&table, &Config::default());

        assert_eq!(matrix.dates(), &[ymd(2024, 2, 28), ymd(2024, 3, 1), ymd(2024, 3, 2)]);
        assert_eq!(matrix.rank("running shoes", ymd(2024, 3, 1)), Some(3));
        assert_eq!(matrix.rank("wool socks", ymd(2024, 3, 1)), Some(8));
        assert_eq!(matrix.rank("trail boots", ymd(2024, 3, 1)), None);
        assert_eq!(matrix.rank("rain jacket", ymd(2024, 3, 2)), Some(7));
        assert_eq!(matrix.rank("rain jacket", ymd(2024, 2, 28)), None);
        assert_eq!(matrix.diagnostics().excluded_headers[0].header, "Notes");
        Ok(())
    }

    #[test]
    fn metadata_count_is_configurable() -> Result<()> {
        let table = load_rank_csv(Cursor::new("Keyword,03-01-2024,03-02-2024\nshoes,4,2\n"))?;
        let config = Config {
            metadata_column_count: 1,
            ..Config::default()
        };
        let matrix = build_matrix(&table, &config);
        assert_eq!(matrix.rank("shoes", ymd(2024, 3, 1)), Some(4));

        // with the default of 4 both date columns count as metadata
        assert!(build_matrix(&table, &Config::default()).dates().is_empty());
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_rank_csv_path("/no/such/sheet.csv").unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/sheet.csv"));
    }
}
