// src/report.rs
//! The dashboard variants (single end date, date range with presets,
//! explicit comparison date) all reduce to one [`ReportMode`] choosing which
//! dates feed the bucket and movement classifiers.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use std::{collections::BTreeMap, fmt};
use tracing::{debug, warn};

use crate::classify::{buckets_on, movements_between, Bucket, Movement};
use crate::config::Config;
use crate::error::{RankError, Result};
use crate::process::{BuildDiagnostics, CanonicalDate, RankMatrix};
use crate::range::{RangeRequest, RangeSelector, DATE_PAIR, SINGLE_DATE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportMode {
    /// Buckets on `end`; movement against the matrix date just before it.
    EndDate { end: CanonicalDate },
    /// Buckets on the last date in range; movement from the first date in
    /// range to the last.
    Range { request: RangeRequest },
    /// Buckets on `latest`; movement from `previous` to `latest`.
    Compare {
        latest: CanonicalDate,
        previous: CanonicalDate,
    },
}

impl ReportMode {
    /// Dates a trend view should cover for this mode.
    pub fn trend_request(&self) -> RangeRequest {
        match self {
            ReportMode::EndDate { end } => RangeRequest::Between {
                start: NaiveDate::MIN,
                end: *end,
            },
            ReportMode::Range { request } => request.clone(),
            ReportMode::Compare { latest, previous } => RangeRequest::Between {
                start: *previous,
                end: *latest,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSummary {
    pub date: CanonicalDate,
    /// Every bucket, including `Unclassified`, with its keyword count.
    pub counts: BTreeMap<Bucket, usize>,
    /// Keywords per ranked bucket, in sheet order.
    pub keywords: BTreeMap<Bucket, Vec<String>>,
}

impl BucketSummary {
    pub fn count(&self, bucket: Bucket) -> usize {
        self.counts.get(&bucket).copied().unwrap_or(0)
    }

    pub fn keywords_in(&self, bucket: Bucket) -> &[String] {
        self.keywords.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementSummary {
    pub previous: CanonicalDate,
    pub latest: CanonicalDate,
    pub keywords: BTreeMap<Movement, Vec<String>>,
}

impl MovementSummary {
    pub fn keywords_in(&self, movement: Movement) -> &[String] {
        self.keywords.get(&movement).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, movement: Movement) -> usize {
        self.keywords_in(movement).len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: CanonicalDate,
    pub rank: Option<u32>,
}

/// Everything one request produces. The sections fail independently: a
/// movement error leaves the bucket section (and the matrix) intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub keywords: usize,
    pub dates: usize,
    pub diagnostics: BuildDiagnostics,
    pub buckets: Result<BucketSummary>,
    pub movement: Result<MovementSummary>,
}

pub fn summarize_buckets(
    matrix: &RankMatrix,
    date: CanonicalDate,
    config: &Config,
) -> BucketSummary {
    let mut counts: BTreeMap<Bucket, usize> = Bucket::ALL.iter().map(|b| (*b, 0)).collect();
    let mut keywords: BTreeMap<Bucket, Vec<String>> = BTreeMap::new();

    for (keyword, bucket) in buckets_on(matrix, date, &config.bucket_thresholds) {
        *counts.entry(bucket).or_default() += 1;
        if bucket != Bucket::Unclassified {
            keywords.entry(bucket).or_default().push(keyword.to_string());
        }
    }
    BucketSummary {
        date,
        counts,
        keywords,
    }
}

pub fn summarize_movement(
    matrix: &RankMatrix,
    previous: CanonicalDate,
    latest: CanonicalDate,
) -> MovementSummary {
    let mut keywords: BTreeMap<Movement, Vec<String>> =
        Movement::ALL.iter().map(|m| (*m, Vec::new())).collect();
    for (keyword, movement) in movements_between(matrix, previous, latest) {
        keywords.entry(movement).or_default().push(keyword.to_string());
    }
    MovementSummary {
        previous,
        latest,
        keywords,
    }
}

/// Rank of `keyword` on each matrix date matching `request`, ascending.
pub fn trend(
    matrix: &RankMatrix,
    keyword: &str,
    request: &RangeRequest,
    config: &Config,
    today: CanonicalDate,
) -> Result<Vec<TrendPoint>> {
    let keyword = keyword.trim();
    if !matrix.contains_keyword(keyword) {
        return Err(RankError::KeywordNotFound(keyword.to_string()));
    }
    let selector = RangeSelector::new(&config.range_presets, today);
    let dates = selector.select(matrix.dates(), request, SINGLE_DATE)?;
    let series = matrix
        .series_over(keyword, &dates)
        .ok_or_else(|| RankError::KeywordNotFound(keyword.to_string()))?;
    Ok(series
        .into_iter()
        .map(|(date, rank)| TrendPoint { date, rank })
        .collect())
}

fn bucket_date(
    matrix: &RankMatrix,
    mode: &ReportMode,
    selector: &RangeSelector<'_>,
) -> Result<CanonicalDate> {
    let dates = match mode {
        ReportMode::EndDate { end } => {
            selector.select(matrix.dates(), &RangeRequest::On(*end), SINGLE_DATE)?
        }
        ReportMode::Range { request } => selector.select(matrix.dates(), request, SINGLE_DATE)?,
        ReportMode::Compare { latest, .. } => {
            selector.select(matrix.dates(), &RangeRequest::On(*latest), SINGLE_DATE)?
        }
    };
    dates.last().copied().ok_or(RankError::InsufficientData {
        needed: SINGLE_DATE,
        available: 0,
    })
}

fn movement_dates(
    matrix: &RankMatrix,
    mode: &ReportMode,
    selector: &RangeSelector<'_>,
) -> Result<(CanonicalDate, CanonicalDate)> {
    match mode {
        ReportMode::EndDate { end } => {
            selector.select(matrix.dates(), &RangeRequest::On(*end), SINGLE_DATE)?;
            let previous = matrix.previous_date(*end).ok_or(RankError::InsufficientData {
                needed: DATE_PAIR,
                available: 1,
            })?;
            Ok((previous, *end))
        }
        ReportMode::Range { request } => {
            let dates = selector.select(matrix.dates(), request, DATE_PAIR)?;
            match (dates.first(), dates.last()) {
                (Some(first), Some(last)) => Ok((*first, *last)),
                _ => Err(RankError::InsufficientData {
                    needed: DATE_PAIR,
                    available: dates.len(),
                }),
            }
        }
        ReportMode::Compare { latest, previous } => {
            selector.bounds(&RangeRequest::Between {
                start: *previous,
                end: *latest,
            })?;
            selector.select(matrix.dates(), &RangeRequest::On(*previous), SINGLE_DATE)?;
            selector.select(matrix.dates(), &RangeRequest::On(*latest), SINGLE_DATE)?;
            Ok((*previous, *latest))
        }
    }
}

/// Classify a built matrix according to `mode`. `today` anchors presets.
pub fn build_report(
    matrix: &RankMatrix,
    mode: &ReportMode,
    config: &Config,
    today: CanonicalDate,
) -> Report {
    let selector = RangeSelector::new(&config.range_presets, today);

    let buckets = bucket_date(matrix, mode, &selector)
        .map(|date| summarize_buckets(matrix, date, config));
    let movement = movement_dates(matrix, mode, &selector)
        .map(|(previous, latest)| summarize_movement(matrix, previous, latest));

    if let Err(e) = &buckets {
        warn!(error = %e, "bucket summary unavailable");
    }
    if let Err(e) = &movement {
        warn!(error = %e, "movement summary unavailable");
    }
    debug!(?mode, "built report");

    Report {
        keywords: matrix.len(),
        dates: matrix.dates().len(),
        diagnostics: matrix.diagnostics().clone(),
        buckets,
        movement,
    }
}

fn section<T: Serialize>(result: &Result<T>) -> Value {
    match result {
        Ok(v) => json!({ "status": "ok", "data": v }),
        Err(e) => json!({ "status": "error", "kind": e.kind(), "message": e.to_string() }),
    }
}

impl Report {
    pub fn to_json(&self) -> Value {
        json!({
            "keywords": self.keywords,
            "dates": self.dates,
            "diagnostics": self.diagnostics,
            "buckets": section(&self.buckets),
            "movement": section(&self.movement),
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} keywords across {} dates", self.keywords, self.dates)?;
        let d = &self.diagnostics;
        if !d.excluded_headers.is_empty() || d.rejected_cells > 0 || d.skipped_rows > 0 {
            writeln!(
                f,
                "excluded headers: {}, rejected cells: {}, skipped rows: {}",
                d.excluded_headers.len(),
                d.rejected_cells,
                d.skipped_rows
            )?;
        }

        writeln!(f)?;
        match &self.buckets {
            Ok(b) => {
                writeln!(f, "Rank buckets on {}", b.date.format("%m-%d-%Y"))?;
                for bucket in Bucket::ALL {
                    writeln!(f, "  {:<14} {:>5}", bucket.label(), b.count(bucket))?;
                }
                for bucket in [Bucket::Top3, Bucket::Top5, Bucket::Top10] {
                    let kws = b.keywords_in(bucket);
                    if !kws.is_empty() {
                        writeln!(f, "  {}: {}", bucket.label(), kws.join(", "))?;
                    }
                }
            }
            Err(e) => writeln!(f, "Rank buckets unavailable: {}", e)?,
        }

        writeln!(f)?;
        match &self.movement {
            Ok(m) => {
                writeln!(
                    f,
                    "Movement {} -> {}",
                    m.previous.format("%m-%d-%Y"),
                    m.latest.format("%m-%d-%Y")
                )?;
                for movement in Movement::ALL {
                    writeln!(f, "  {:<14} {:>5}", movement.label(), m.count(movement))?;
                }
                for movement in Movement::ALL {
                    let kws = m.keywords_in(movement);
                    if !kws.is_empty() && movement != Movement::NoMovement {
                        writeln!(f, "  {}: {}", movement.label(), kws.join(", "))?;
                    }
                }
            }
            Err(e) => writeln!(f, "Movement unavailable: {}", e)?,
        }
        Ok(())
    }
}
