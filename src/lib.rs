//! Normalize a wide keyword-rank sheet into a per-date rank matrix, then
//! classify keywords by standing (bucket) and by change (movement).

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod process;
pub mod range;
pub mod report;

pub use config::Config;
pub use error::RankError;
pub use process::{build_matrix, RankMatrix, RawTable};
pub use report::{build_report, Report, ReportMode};
