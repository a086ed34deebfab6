use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::RankError;
use crate::process::utils::clean_str;

/// A calendar date with no time component; the only join and ordering key
/// for rank columns.
pub type CanonicalDate = NaiveDate;

/// One accepted textual date layout. Serialized with its human spelling so a
/// config file reads `- MM-DD-YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "MM-DD-YYYY")]
    MonthDayYearDash,
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYearSlash,
    #[serde(rename = "YYYY-MM-DD")]
    IsoDash,
    #[serde(rename = "YYYY/MM/DD")]
    IsoSlash,
    #[serde(rename = "DD-MM-YYYY")]
    DayMonthYearDash,
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYearSlash,
}

impl DateFormat {
    /// chrono pattern for this layout.
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::MonthDayYearDash => "%m-%d-%Y",
            DateFormat::MonthDayYearSlash => "%m/%d/%Y",
            DateFormat::IsoDash => "%Y-%m-%d",
            DateFormat::IsoSlash => "%Y/%m/%d",
            DateFormat::DayMonthYearDash => "%d-%m-%Y",
            DateFormat::DayMonthYearSlash => "%d/%m/%Y",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateFormat::MonthDayYearDash => "MM-DD-YYYY",
            DateFormat::MonthDayYearSlash => "MM/DD/YYYY",
            DateFormat::IsoDash => "YYYY-MM-DD",
            DateFormat::IsoSlash => "YYYY/MM/DD",
            DateFormat::DayMonthYearDash => "DD-MM-YYYY",
            DateFormat::DayMonthYearSlash => "DD/MM/YYYY",
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const DEFAULT_DATE_FORMATS: &[DateFormat] =
    &[DateFormat::MonthDayYearDash, DateFormat::MonthDayYearSlash];

/// Text that matched none of the accepted formats.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{0}` does not match any accepted date format")]
pub struct DateParseFailure(pub String);

/// Parses header text and user input into [`CanonicalDate`]s by trying each
/// format in priority order. The first exact match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParser {
    formats: Vec<DateFormat>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.to_vec())
    }
}

impl DateParser {
    pub fn new(formats: impl Into<Vec<DateFormat>>) -> Self {
        Self {
            formats: formats.into(),
        }
    }

    pub fn formats(&self) -> &[DateFormat] {
        &self.formats
    }

    /// Same priority list with ISO `YYYY-MM-DD` appended when missing; date
    /// pickers hand us ISO regardless of how the sheet headers look.
    pub fn with_iso_fallback(&self) -> Self {
        let mut formats = self.formats.clone();
        if !formats.contains(&DateFormat::IsoDash) {
            formats.push(DateFormat::IsoDash);
        }
        Self { formats }
    }

    pub fn parse(&self, text: &str) -> Result<CanonicalDate, DateParseFailure> {
        let cleaned = clean_str(text);
        self.formats
            .iter()
            .find_map(|fmt| {
                NaiveDate::parse_from_str(&cleaned, fmt.pattern())
                    .ok()
                    // chrono takes any digit count for %Y; headers always carry four
                    .filter(|d| (1000..=9999).contains(&d.year()))
            })
            .ok_or_else(|| DateParseFailure(text.to_string()))
    }

    /// Parse a date the user typed or picked. Failure is reported as
    /// [`RankError::UserInputParse`] so callers can show it straight back.
    pub fn parse_user(&self, text: &str) -> crate::error::Result<CanonicalDate> {
        self.parse(text).map_err(|_| RankError::UserInputParse {
            input: text.to_string(),
            expected: self.expected_formats(),
        })
    }

    fn expected_formats(&self) -> String {
        self.formats
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_both_default_layouts() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("03-01-2024"), Ok(ymd(2024, 3, 1)));
        assert_eq!(parser.parse("3/1/2024"), Ok(ymd(2024, 3, 1)));
        assert_eq!(parser.parse("12/31/2023"), Ok(ymd(2023, 12, 31)));
    }

    #[test]
    fn strips_whitespace_and_quotes() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("  \"03-02-2024\" "), Ok(ymd(2024, 3, 2)));
    }

    #[test]
    fn rejects_partial_and_foreign_text() {
        let parser = DateParser::default();
        for bad in [
            "",
            "Keyword",
            "Search Volume",
            "2024-03-01",
            "03-01-2024 extra",
            "03-01",
            "13-01-2024",
            "02-30-2024",
            "3/1/24",
        ] {
            assert!(parser.parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn iso_only_when_configured() {
        let parser = DateParser::new(vec![DateFormat::MonthDayYearDash, DateFormat::IsoDash]);
        assert_eq!(parser.parse("2024-03-01"), Ok(ymd(2024, 3, 1)));
        assert_eq!(parser.parse("2024/03/01").ok(), None);
    }

    #[test]
    fn first_format_in_priority_wins() {
        let month_first = DateParser::new(vec![
            DateFormat::MonthDayYearDash,
            DateFormat::DayMonthYearDash,
        ]);
        let day_first = DateParser::new(vec![
            DateFormat::DayMonthYearDash,
            DateFormat::MonthDayYearDash,
        ]);
        assert_eq!(month_first.parse("03-04-2024"), Ok(ymd(2024, 3, 4)));
        assert_eq!(day_first.parse("03-04-2024"), Ok(ymd(2024, 4, 3)));
        // only one reading is a real date, so order does not matter here
        assert_eq!(day_first.parse("03-25-2024"), Ok(ymd(2024, 3, 25)));
    }

    #[test]
    fn user_input_failure_names_value_and_formats() {
        let parser = DateParser::default().with_iso_fallback();
        assert_eq!(parser.parse_user("2024-01-05"), Ok(ymd(2024, 1, 5)));
        match parser.parse_user("yesterday") {
            Err(RankError::UserInputParse { input, expected }) => {
                assert_eq!(input, "yesterday");
                assert_eq!(expected, "MM-DD-YYYY, MM/DD/YYYY, YYYY-MM-DD");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn formats_deserialize_from_labels() {
        let formats: Vec<DateFormat> =
            serde_yaml::from_str("- MM-DD-YYYY\n- YYYY/MM/DD\n").unwrap();
        assert_eq!(formats, vec![DateFormat::MonthDayYearDash, DateFormat::IsoSlash]);
    }
}
