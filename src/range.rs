// src/range.rs
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RankError, Result};
use crate::process::date_parser::CanonicalDate;

/// Dates needed to look up a single snapshot (bucket, trend).
pub const SINGLE_DATE: usize = 1;
/// Dates needed to compare two snapshots (movement).
pub const DATE_PAIR: usize = 2;

/// A named "last N days" window anchored on today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePreset {
    pub name: String,
    pub days: u32,
}

impl RangePreset {
    pub fn new(name: impl Into<String>, days: u32) -> Self {
        Self {
            name: name.into(),
            days,
        }
    }
}

pub fn default_presets() -> Vec<RangePreset> {
    [7, 15, 30, 90, 180]
        .into_iter()
        .map(|days| RangePreset::new(format!("Last {days} days"), days))
        .collect()
}

/// Which dates the caller is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    /// Inclusive on both ends.
    Between {
        start: CanonicalDate,
        end: CanonicalDate,
    },
    /// Name of a configured [`RangePreset`].
    Preset(String),
    /// Exactly one date, e.g. a comparison date.
    On(CanonicalDate),
}

/// Resolves a [`RangeRequest`] against the dates a matrix actually has.
#[derive(Debug, Clone)]
pub struct RangeSelector<'a> {
    presets: &'a [RangePreset],
    today: CanonicalDate,
}

impl<'a> RangeSelector<'a> {
    pub fn new(presets: &'a [RangePreset], today: CanonicalDate) -> Self {
        Self { presets, today }
    }

    pub fn preset(&self, name: &str) -> Result<&'a RangePreset> {
        let wanted = name.trim();
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RankError::UnknownPreset(name.to_string()))
    }

    /// Calendar bounds of a range request; `On` is a one-day range.
    pub fn bounds(&self, request: &RangeRequest) -> Result<(CanonicalDate, CanonicalDate)> {
        let (start, end) = match request {
            RangeRequest::Between { start, end } => (*start, *end),
            RangeRequest::Preset(name) => {
                let preset = self.preset(name)?;
                let start = self
                    .today
                    .checked_sub_days(Days::new(u64::from(preset.days)))
                    .unwrap_or(NaiveDate::MIN);
                (start, self.today)
            }
            RangeRequest::On(date) => (*date, *date),
        };
        if start > end {
            return Err(RankError::InvalidRange { start, end });
        }
        Ok((start, end))
    }

    /// Matrix dates satisfying `request`, ascending. Fails when fewer than
    /// `min_dates` remain, or when an `On` date is not in the matrix.
    pub fn select(
        &self,
        dates: &[CanonicalDate],
        request: &RangeRequest,
        min_dates: usize,
    ) -> Result<Vec<CanonicalDate>> {
        let (start, end) = self.bounds(request)?;

        let mut selected: Vec<CanonicalDate> = dates
            .iter()
            .copied()
            .filter(|d| (start..=end).contains(d))
            .collect();
        selected.sort_unstable();
        selected.dedup();

        if let RangeRequest::On(date) = request {
            if selected.is_empty() && !dates.is_empty() {
                return Err(RankError::DateNotFound(*date));
            }
        }

        debug!(?request, %start, %end, selected = selected.len(), "selected dates");
        if selected.len() < min_dates {
            return Err(RankError::InsufficientData {
                needed: min_dates,
                available: selected.len(),
            });
        }
        Ok(selected)
    }
}
