use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RankError, Result};
use crate::process::{CanonicalDate, RankMatrix};

/// Coarse standing of a keyword on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    Top3,
    Top5,
    Top10,
    Unclassified,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Top3, Bucket::Top5, Bucket::Top10, Bucket::Unclassified];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Top3 => "Top 3",
            Bucket::Top5 => "Top 5",
            Bucket::Top10 => "Top 10",
            Bucket::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper (inclusive) rank of each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketThresholds {
    pub top3: u32,
    pub top5: u32,
    pub top10: u32,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            top3: 3,
            top5: 5,
            top10: 10,
        }
    }
}

impl BucketThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.top3 == 0 || self.top3 >= self.top5 || self.top5 >= self.top10 {
            return Err(RankError::InvalidConfig(format!(
                "bucket thresholds must satisfy 0 < top3 < top5 < top10, got {}/{}/{}",
                self.top3, self.top5, self.top10
            )));
        }
        Ok(())
    }

    /// Tightest bucket whose threshold the rank meets. Absent and zero ranks
    /// are unclassified.
    pub fn classify(&self, rank: Option<u32>) -> Bucket {
        match rank {
            Some(r) if r == 0 => Bucket::Unclassified,
            Some(r) if r <= self.top3 => Bucket::Top3,
            Some(r) if r <= self.top5 => Bucket::Top5,
            Some(r) if r <= self.top10 => Bucket::Top10,
            _ => Bucket::Unclassified,
        }
    }
}

/// [`BucketThresholds::classify`] with the default 3/5/10 thresholds.
pub fn classify_bucket(rank: Option<u32>) -> Bucket {
    BucketThresholds::default().classify(rank)
}

/// Bucket of every keyword on `date`, in matrix keyword order. Only that
/// date's column is read.
pub fn buckets_on<'m>(
    matrix: &'m RankMatrix,
    date: CanonicalDate,
    thresholds: &BucketThresholds,
) -> Vec<(&'m str, Bucket)> {
    matrix
        .column(date)
        .map(|(keyword, rank)| (keyword, thresholds.classify(rank)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_examples() {
        assert_eq!(classify_bucket(Some(3)), Bucket::Top3);
        assert_eq!(classify_bucket(Some(4)), Bucket::Top5);
        assert_eq!(classify_bucket(Some(10)), Bucket::Top10);
        assert_eq!(classify_bucket(Some(11)), Bucket::Unclassified);
        assert_eq!(classify_bucket(None), Bucket::Unclassified);
        assert_eq!(classify_bucket(Some(0)), Bucket::Unclassified);
    }

    #[test]
    fn boundaries_hold_for_every_rank() {
        for r in 1..=200u32 {
            let expected = if r <= 3 {
                Bucket::Top3
            } else if r <= 5 {
                Bucket::Top5
            } else if r <= 10 {
                Bucket::Top10
            } else {
                Bucket::Unclassified
            };
            assert_eq!(classify_bucket(Some(r)), expected, "rank {r}");
        }
    }

    #[test]
    fn custom_thresholds() {
        let t = BucketThresholds {
            top3: 1,
            top5: 2,
            top10: 20,
        };
        assert_eq!(t.classify(Some(1)), Bucket::Top3);
        assert_eq!(t.classify(Some(2)), Bucket::Top5);
        assert_eq!(t.classify(Some(15)), Bucket::Top10);
        assert!(t.validate().is_ok());
        assert!(BucketThresholds { top3: 5, top5: 3, top10: 10 }.validate().is_err());
    }
}
