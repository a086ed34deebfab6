use serde::{Deserialize, Serialize};
use std::fmt;

use crate::process::{CanonicalDate, RankMatrix};

/// Change in one keyword's rank between a previous and a latest snapshot.
/// A pairwise comparison only; nothing is tracked across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Movement {
    Progressed,
    Declined,
    NoMovement,
    NewlyRanked,
}

impl Movement {
    pub const ALL: [Movement; 4] = [
        Movement::Progressed,
        Movement::Declined,
        Movement::NoMovement,
        Movement::NewlyRanked,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Movement::Progressed => "Progressed",
            Movement::Declined => "Declined",
            Movement::NoMovement => "No Movement",
            Movement::NewlyRanked => "Newly Ranked",
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower rank is better, so a smaller latest value is progress.
///
/// A keyword that falls out of the ranking (latest absent) reads as
/// `NoMovement`; there is no separate "dropped" label.
pub fn classify_movement(latest: Option<u32>, previous: Option<u32>) -> Movement {
    match (latest, previous) {
        (Some(l), Some(p)) if l < p => Movement::Progressed,
        (Some(l), Some(p)) if l > p => Movement::Declined,
        (Some(_), Some(_)) => Movement::NoMovement,
        (Some(_), None) => Movement::NewlyRanked,
        (None, _) => Movement::NoMovement,
    }
}

/// Movement of every keyword from `previous` to `latest`, in matrix keyword
/// order.
pub fn movements_between(
    matrix: &RankMatrix,
    previous: CanonicalDate,
    latest: CanonicalDate,
) -> Vec<(&str, Movement)> {
    matrix
        .keywords()
        .iter()
        .map(|k| {
            let movement = classify_movement(matrix.rank(k, latest), matrix.rank(k, previous));
            (k.as_str(), movement)
        })
        .collect()
}
