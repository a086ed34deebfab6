/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Outcome of reading one rank cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankCell {
    /// A positive integer position.
    Rank(u32),
    /// Nothing recorded (empty after cleaning).
    Empty,
    /// Something was recorded but it is not a usable rank (`-`, `n/a`,
    /// `0`, `3.5`, ...).
    Rejected,
}

impl RankCell {
    pub fn rank(self) -> Option<u32> {
        match self {
            RankCell::Rank(r) => Some(r),
            _ => None,
        }
    }
}

/// Numeric-aware read of a rank cell. Integral decimals such as `"4.0"`
/// (what spreadsheet CSV exports emit for number-formatted cells) count as
/// integers; zero, negatives and fractions do not.
pub fn parse_rank_cell(raw: &str) -> RankCell {
    let v = clean_str(raw);
    if v.is_empty() {
        return RankCell::Empty;
    }

    if let Ok(n) = v.parse::<i64>() {
        return match u32::try_from(n) {
            Ok(r) if r > 0 => RankCell::Rank(r),
            _ => RankCell::Rejected,
        };
    }

    match v.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 1.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            RankCell::Rank(f as u32)
        }
        _ => RankCell::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_space() {
        assert_eq!(clean_str("  \"abc\"  "), "abc");
        assert_eq!(clean_str("\""), "\"");
        assert_eq!(clean_str(" plain "), "plain");
    }

    #[test]
    fn rank_cells() {
        assert_eq!(parse_rank_cell("3"), RankCell::Rank(3));
        assert_eq!(parse_rank_cell(" 12 "), RankCell::Rank(12));
        assert_eq!(parse_rank_cell("4.0"), RankCell::Rank(4));
        assert_eq!(parse_rank_cell("\"7\""), RankCell::Rank(7));
        assert_eq!(parse_rank_cell(""), RankCell::Empty);
        assert_eq!(parse_rank_cell("   "), RankCell::Empty);
        for bad in ["-", "n/a", "0", "-2", "3.5", "NaN", "inf", "1e99", "#N/A"] {
            assert_eq!(parse_rank_cell(bad), RankCell::Rejected, "{bad:?}");
        }
    }
}
