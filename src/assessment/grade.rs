//! Grade mapping from the normalized score.
//!
//! Both tables are evaluated top-down with inclusive lower bounds, so a
//! score exactly on a threshold takes the higher tier.

use serde::{Deserialize, Serialize};

/// Letter grade, A+ down to F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    D,
    #[serde(rename = "D-")]
    DMinus,
    F,
}

const LETTER_THRESHOLDS: &[(f64, LetterGrade)] = &[
    (97.0, LetterGrade::APlus),
    (93.0, LetterGrade::A),
    (90.0, LetterGrade::AMinus),
    (87.0, LetterGrade::BPlus),
    (83.0, LetterGrade::B),
    (80.0, LetterGrade::BMinus),
    (77.0, LetterGrade::CPlus),
    (73.0, LetterGrade::C),
    (70.0, LetterGrade::CMinus),
    (67.0, LetterGrade::DPlus),
    (63.0, LetterGrade::D),
    (60.0, LetterGrade::DMinus),
];

impl LetterGrade {
    pub fn from_score(score: f64) -> Self {
        LETTER_THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Self::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::DMinus => "D-",
            Self::F => "F",
        }
    }

    pub fn is_passing(&self) -> bool {
        *self != Self::F
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Five-bucket categorical grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuzzyGrade {
    Excellent,
    #[serde(rename = "Above Average")]
    AboveAverage,
    Average,
    Passed,
    Failed,
}

const FUZZY_THRESHOLDS: &[(f64, FuzzyGrade)] = &[
    (90.0, FuzzyGrade::Excellent),
    (80.0, FuzzyGrade::AboveAverage),
    (70.0, FuzzyGrade::Average),
    (60.0, FuzzyGrade::Passed),
];

impl FuzzyGrade {
    pub fn from_score(score: f64) -> Self {
        FUZZY_THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::AboveAverage => "Above Average",
            Self::Average => "Average",
            Self::Passed => "Passed",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for FuzzyGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_boundaries_are_inclusive() {
        assert_eq!(LetterGrade::from_score(100.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_score(97.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_score(96.99), LetterGrade::A);
        assert_eq!(LetterGrade::from_score(90.0), LetterGrade::AMinus);
        assert_eq!(LetterGrade::from_score(89.999), LetterGrade::BPlus);
        assert_eq!(LetterGrade::from_score(80.0), LetterGrade::BMinus);
        assert_eq!(LetterGrade::from_score(70.0), LetterGrade::CMinus);
        assert_eq!(LetterGrade::from_score(60.0), LetterGrade::DMinus);
        assert_eq!(LetterGrade::from_score(59.99), LetterGrade::F);
        assert_eq!(LetterGrade::from_score(0.0), LetterGrade::F);
    }

    #[test]
    fn fuzzy_boundaries_are_inclusive() {
        assert_eq!(FuzzyGrade::from_score(90.0), FuzzyGrade::Excellent);
        assert_eq!(FuzzyGrade::from_score(89.999), FuzzyGrade::AboveAverage);
        assert_eq!(FuzzyGrade::from_score(70.0), FuzzyGrade::Average);
        assert_eq!(FuzzyGrade::from_score(60.0), FuzzyGrade::Passed);
        assert_eq!(FuzzyGrade::from_score(12.0), FuzzyGrade::Failed);
    }

    #[test]
    fn nan_maps_to_lowest_tier() {
        assert_eq!(LetterGrade::from_score(f64::NAN), LetterGrade::F);
        assert_eq!(FuzzyGrade::from_score(f64::NAN), FuzzyGrade::Failed);
    }

    #[test]
    fn only_f_is_failing() {
        assert!(LetterGrade::from_score(60.0).is_passing());
        assert!(LetterGrade::APlus.is_passing());
        assert!(!LetterGrade::from_score(59.99).is_passing());
    }

    #[test]
    fn grades_serialize_as_display_strings() {
        assert_eq!(serde_json::to_string(&LetterGrade::AMinus).unwrap(), "\"A-\"");
        assert_eq!(
            serde_json::to_string(&FuzzyGrade::AboveAverage).unwrap(),
            "\"Above Average\""
        );
        let parsed: LetterGrade = serde_json::from_str("\"B+\"").unwrap();
        assert_eq!(parsed, LetterGrade::BPlus);
    }

    #[test]
    fn letter_tiers_are_monotone() {
        let mut previous = LetterGrade::from_score(100.0);
        let order: Vec<LetterGrade> = LETTER_THRESHOLDS.iter().map(|(_, g)| *g).collect();
        for step in (0..=1000).rev() {
            let grade = LetterGrade::from_score(step as f64 / 10.0);
            let rank = |g: LetterGrade| order.iter().position(|o| *o == g).unwrap_or(order.len());
            assert!(rank(grade) >= rank(previous));
            previous = grade;
        }
    }
}
