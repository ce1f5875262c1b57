//! SEO scoring rubric for content documents.
//!
//! The rubric is a fixed table so the thresholds are enumerable: five checks,
//! each worth 20 points off a 100-point baseline. The dashboard colour-codes
//! the result, so the exact numbers matter.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Optimal meta-title length band, in characters.
pub const TITLE_LEN_RANGE: (usize, usize) = (50, 60);
/// Optimal meta-description length band, in characters.
pub const DESCRIPTION_LEN_RANGE: (usize, usize) = (120, 160);
/// Points deducted per failed check.
pub const CHECK_WEIGHT: u32 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SeoScore {
    pub score: u32,
    pub tips: Vec<String>,
}

/// Colour band shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreBand {
    /// Red, score below 50.
    Poor,
    /// Orange, score 50–80.
    Fair,
    /// Green, score above 80.
    Good,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..50 => ScoreBand::Poor,
            50..=80 => ScoreBand::Fair,
            _ => ScoreBand::Good,
        }
    }
}

struct RubricCheck {
    passes: fn(&CheckInput<'_>) -> bool,
    deduction: u32,
    tip: &'static str,
}

struct CheckInput<'a> {
    title: &'a str,
    description: &'a str,
    /// Lowercased primary keyword; empty when unset.
    primary: String,
    keywords: &'a [String],
}

/// Condition → deduction → tip. Order here is the order tips appear in.
const RUBRIC: [RubricCheck; 5] = [
    RubricCheck {
        passes: |i| (TITLE_LEN_RANGE.0..=TITLE_LEN_RANGE.1).contains(&i.title.chars().count()),
        deduction: CHECK_WEIGHT,
        tip: "Keep the meta title between 50 and 60 characters.",
    },
    RubricCheck {
        passes: |i| {
            (DESCRIPTION_LEN_RANGE.0..=DESCRIPTION_LEN_RANGE.1)
                .contains(&i.description.chars().count())
        },
        deduction: CHECK_WEIGHT,
        tip: "Keep the meta description between 120 and 160 characters.",
    },
    RubricCheck {
        passes: |i| !i.primary.is_empty() && i.title.to_lowercase().contains(&i.primary),
        deduction: CHECK_WEIGHT,
        tip: "Include the primary keyword in the meta title.",
    },
    RubricCheck {
        passes: |i| !i.primary.is_empty() && i.description.to_lowercase().contains(&i.primary),
        deduction: CHECK_WEIGHT,
        tip: "Include the primary keyword in the meta description.",
    },
    RubricCheck {
        passes: |i| !i.keywords.is_empty(),
        deduction: CHECK_WEIGHT,
        tip: "Add at least one target keyword.",
    },
];

/// Score a content document against the rubric. Pure and deterministic; an
/// unset primary keyword fails both presence checks.
pub fn score(title: &str, description: &str, primary_keyword: &str, keywords: &[String]) -> SeoScore {
    let input = CheckInput {
        title,
        description,
        primary: primary_keyword.trim().to_lowercase(),
        keywords,
    };

    let mut score: u32 = 100;
    let mut tips = Vec::new();

    for check in &RUBRIC {
        if !(check.passes)(&input) {
            score = score.saturating_sub(check.deduction);
            tips.push(check.tip.to_string());
        }
    }

    SeoScore { score, tips }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_TITLE: &str = "Terracotta Jaali Screens for Modern Facades | Clayhaus"; // 54 chars
    const GOOD_DESCRIPTION: &str = "Hand-crafted terracotta jaali screens for facades, courtyards and interiors. Explore patterns, finishes and city-specific advice from Clayhaus."; // ~142 chars

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_perfect_document_scores_100() {
        let result = score(GOOD_TITLE, GOOD_DESCRIPTION, "jaali", &kw(&["jaali", "terracotta"]));
        assert_eq!(result.score, 100);
        assert!(result.tips.is_empty());
    }

    #[test]
    fn test_each_failed_check_costs_twenty() {
        // Everything passes except the keyword list.
        let result = score(GOOD_TITLE, GOOD_DESCRIPTION, "jaali", &[]);
        assert_eq!(result.score, 80);
        assert_eq!(result.tips, vec!["Add at least one target keyword."]);
    }

    #[test]
    fn test_all_checks_failing_floors_at_zero() {
        let result = score("", "", "", &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.tips.len(), 5);
    }

    #[test]
    fn test_score_is_bounded() {
        for (t, d, p) in [
            ("short", "short", "x"),
            (GOOD_TITLE, "short", "clay"),
            ("", GOOD_DESCRIPTION, "terracotta"),
        ] {
            let result = score(t, d, p, &kw(&["k"]));
            assert!(result.score <= 100);
        }
    }

    #[test]
    fn test_empty_primary_keyword_fails_presence_checks() {
        let result = score(GOOD_TITLE, GOOD_DESCRIPTION, "", &kw(&["k"]));
        assert_eq!(result.score, 60);
        assert!(result.tips.iter().any(|t| t.contains("meta title")));
        assert!(result.tips.iter().any(|t| t.contains("meta description")));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let result = score(GOOD_TITLE, GOOD_DESCRIPTION, "JAALI", &kw(&["k"]));
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ScoreBand::from_score(0), ScoreBand::Poor);
        assert_eq!(ScoreBand::from_score(49), ScoreBand::Poor);
        assert_eq!(ScoreBand::from_score(50), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(81), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Good);
    }
}
