//! Weighted rubric: metric table, complexity lookup and rubric builder.
//!
//! Weights are not required to sum to one. Every consumer normalizes by
//! `max_possible_score`, so optional rows can be appended freely.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::StructuralFeatures;
use crate::assessment::types::{AssessmentInput, ScoreMetric, ScoringRubric, MAX_METRIC_SCORE};

/// Unique identifier for a rubric metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Correctness,
    TestCases,
    CodeStructure,
    Efficiency,
    TimeComplexity,
    SpaceComplexity,
    Readability,
    CodeStyle,
    ErrorHandling,
    SolutionMatch,
}

/// Presentation buckets. A metric may belong to several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Correctness,
    Efficiency,
    Style,
    Advanced,
}

impl MetricCategory {
    pub fn all() -> &'static [MetricCategory] {
        &[
            MetricCategory::Correctness,
            MetricCategory::Efficiency,
            MetricCategory::Style,
            MetricCategory::Advanced,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Correctness => "Correctness",
            Self::Efficiency => "Efficiency",
            Self::Style => "Style",
            Self::Advanced => "Advanced",
        }
    }
}

impl MetricId {
    /// All metrics in rubric order.
    pub fn all() -> &'static [MetricId] {
        &[
            MetricId::Correctness,
            MetricId::TestCases,
            MetricId::CodeStructure,
            MetricId::Efficiency,
            MetricId::TimeComplexity,
            MetricId::SpaceComplexity,
            MetricId::Readability,
            MetricId::CodeStyle,
            MetricId::ErrorHandling,
            MetricId::SolutionMatch,
        ]
    }

    /// Returns the human-readable name of this metric.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Correctness => "Correctness",
            Self::TestCases => "Test Cases",
            Self::CodeStructure => "Code Structure",
            Self::Efficiency => "Efficiency",
            Self::TimeComplexity => "Time Complexity",
            Self::SpaceComplexity => "Space Complexity",
            Self::Readability => "Readability",
            Self::CodeStyle => "Code Style",
            Self::ErrorHandling => "Error Handling",
            Self::SolutionMatch => "Solution Match",
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Self::Correctness | Self::TestCases => 0.25,
            Self::Efficiency => 0.15,
            Self::CodeStructure | Self::Readability => 0.10,
            Self::TimeComplexity
            | Self::SpaceComplexity
            | Self::CodeStyle
            | Self::ErrorHandling
            | Self::SolutionMatch => 0.05,
        }
    }

    pub fn categories(&self) -> &'static [MetricCategory] {
        use MetricCategory::*;
        match self {
            Self::Correctness | Self::TestCases => &[Correctness],
            Self::Efficiency | Self::TimeComplexity | Self::SpaceComplexity => &[Efficiency],
            Self::Readability | Self::CodeStyle => &[Style],
            Self::CodeStructure => &[Style, Advanced],
            Self::ErrorHandling => &[Advanced],
            Self::SolutionMatch => &[Correctness, Advanced],
        }
    }

    /// Metrics that only appear when their input is supplied.
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            Self::CodeStructure | Self::CodeStyle | Self::ErrorHandling | Self::SolutionMatch
        )
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Correctness => write!(f, "correctness"),
            Self::TestCases => write!(f, "test_cases"),
            Self::CodeStructure => write!(f, "code_structure"),
            Self::Efficiency => write!(f, "efficiency"),
            Self::TimeComplexity => write!(f, "time_complexity"),
            Self::SpaceComplexity => write!(f, "space_complexity"),
            Self::Readability => write!(f, "readability"),
            Self::CodeStyle => write!(f, "code_style"),
            Self::ErrorHandling => write!(f, "error_handling"),
            Self::SolutionMatch => write!(f, "solution_match"),
        }
    }
}

impl std::str::FromStr for MetricId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "correctness" => Ok(Self::Correctness),
            "test_cases" | "tests" => Ok(Self::TestCases),
            "code_structure" | "structure" => Ok(Self::CodeStructure),
            "efficiency" => Ok(Self::Efficiency),
            "time_complexity" | "time" => Ok(Self::TimeComplexity),
            "space_complexity" | "space" => Ok(Self::SpaceComplexity),
            "readability" => Ok(Self::Readability),
            "code_style" | "style" => Ok(Self::CodeStyle),
            "error_handling" => Ok(Self::ErrorHandling),
            "solution_match" | "fuzzy_match" => Ok(Self::SolutionMatch),
            _ => Err(format!("Unknown metric: {}", s)),
        }
    }
}

/// Big-O classes recognised in complexity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    /// `O(n^k)` for k >= 3. Not in the score table.
    Polynomial(u32),
    Exponential,
    Factorial,
}

/// Score for labels the table does not list.
pub const UNRECOGNIZED_COMPLEXITY_SCORE: f64 = 50.0;

impl Complexity {
    /// Parse a label such as `O(n log n)`, `o(N^2)` or `O(n²)`.
    pub fn parse(label: &str) -> Option<Self> {
        let compact: String = label
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .replace('²', "^2")
            .replace('³', "^3")
            .replace("**", "^");

        let inner = compact
            .strip_prefix("o(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(compact.as_str());

        match inner {
            "1" => Some(Self::Constant),
            "logn" | "log(n)" => Some(Self::Logarithmic),
            "n" => Some(Self::Linear),
            "nlogn" | "nlog(n)" | "n*logn" | "n*log(n)" => Some(Self::Linearithmic),
            "n^2" | "n*n" => Some(Self::Quadratic),
            "2^n" => Some(Self::Exponential),
            "n!" => Some(Self::Factorial),
            other => {
                let degree = other.strip_prefix("n^")?.parse::<u32>().ok()?;
                match degree {
                    0 => Some(Self::Constant),
                    1 => Some(Self::Linear),
                    2 => Some(Self::Quadratic),
                    k => Some(Self::Polynomial(k)),
                }
            }
        }
    }

    /// Fixed lookup: lower complexity scores higher.
    pub fn score(&self) -> f64 {
        match self {
            Self::Constant => 100.0,
            Self::Logarithmic => 95.0,
            Self::Linear => 90.0,
            Self::Linearithmic => 85.0,
            Self::Quadratic => 70.0,
            Self::Polynomial(_) => UNRECOGNIZED_COMPLEXITY_SCORE,
            Self::Exponential => 40.0,
            Self::Factorial => 30.0,
        }
    }

    pub fn is_quadratic_or_worse(&self) -> bool {
        matches!(
            self,
            Self::Quadratic | Self::Polynomial(_) | Self::Exponential | Self::Factorial
        )
    }

    /// O(1) and O(log n) are the only space classes that need no hint.
    pub fn is_sublinear(&self) -> bool {
        matches!(self, Self::Constant | Self::Logarithmic)
    }
}

/// Score a complexity label, defaulting unrecognised labels to 50.
pub fn complexity_score(label: &str) -> f64 {
    Complexity::parse(label)
        .map(|c| c.score())
        .unwrap_or(UNRECOGNIZED_COMPLEXITY_SCORE)
}

/// Clamp a score-like input into 0-100. Non-finite values become 0.
pub fn clamp_score(field: &str, value: f64) -> f64 {
    if !value.is_finite() {
        warn!("{} is not a finite number ({}), using 0", field, value);
        return 0.0;
    }
    if !(0.0..=MAX_METRIC_SCORE).contains(&value) {
        warn!("{} out of range ({}), clamping to 0-100", field, value);
    }
    value.clamp(0.0, MAX_METRIC_SCORE)
}

/// Test pass percentage. Zero total contributes 0.
pub fn test_pass_rate(passed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = MAX_METRIC_SCORE * f64::from(passed) / f64::from(total);
    clamp_score("test pass rate", rate)
}

/// Appends metrics conditionally, then reduces them into a [`ScoringRubric`].
#[derive(Debug, Default)]
pub struct RubricBuilder {
    metrics: Vec<ScoreMetric>,
}

impl RubricBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an always-present metric.
    pub fn metric(mut self, id: MetricId, score: f64, details: impl Into<String>) -> Self {
        let score = clamp_score(id.name(), score);
        debug!("metric {} = {:.1} (weight {})", id, score, id.weight());
        self.metrics.push(ScoreMetric {
            id,
            name: id.name().to_string(),
            weight: id.weight(),
            score,
            max_score: MAX_METRIC_SCORE,
            details: details.into(),
        });
        self
    }

    /// Append a metric only when its source value is present.
    pub fn optional<F>(self, id: MetricId, score: Option<f64>, details: F) -> Self
    where
        F: FnOnce(f64) -> String,
    {
        match score {
            Some(score) => self.metric(id, score, details(score)),
            None => {
                debug!("metric {} omitted (no input)", id);
                self
            }
        }
    }

    pub fn build(self) -> ScoringRubric {
        let total_weight = self.metrics.iter().map(|m| m.weight).sum();
        let total_score = self.metrics.iter().map(|m| m.weighted_score()).sum();
        let max_possible_score = self.metrics.iter().map(|m| m.max_weighted_score()).sum();

        ScoringRubric {
            metrics: self.metrics,
            total_weight,
            total_score,
            max_possible_score,
            rejection_reason: None,
        }
    }
}

/// Build the standard rubric for an accepted submission.
pub fn build_rubric(input: &AssessmentInput, features: Option<&StructuralFeatures>) -> ScoringRubric {
    let test_rate = test_pass_rate(input.test_cases_passed, input.total_test_cases);
    let test_details = if input.total_test_cases == 0 {
        "No test cases were run".to_string()
    } else {
        format!(
            "{}/{} test cases passed",
            input.test_cases_passed, input.total_test_cases
        )
    };

    RubricBuilder::new()
        .metric(
            MetricId::Correctness,
            input.correctness,
            format!("Estimated correctness {:.1}%", input.correctness),
        )
        .metric(MetricId::TestCases, test_rate, test_details)
        .optional(
            MetricId::CodeStructure,
            features.map(|f| f.structure_score),
            |score| structure_details(score, features),
        )
        .metric(
            MetricId::Efficiency,
            input.efficiency,
            format!("Efficiency rating {:.1}", input.efficiency),
        )
        .metric(
            MetricId::TimeComplexity,
            complexity_score(&input.time_complexity),
            complexity_details("Time", &input.time_complexity),
        )
        .metric(
            MetricId::SpaceComplexity,
            complexity_score(&input.space_complexity),
            complexity_details("Space", &input.space_complexity),
        )
        .metric(
            MetricId::Readability,
            input.readability,
            format!("Readability rating {:.1}", input.readability),
        )
        .optional(MetricId::CodeStyle, input.code_style, |score| {
            format!("Code style rating {:.1}", score)
        })
        .optional(MetricId::ErrorHandling, input.error_handling, |score| {
            format!("Error handling rating {:.1}", score)
        })
        .optional(MetricId::SolutionMatch, input.fuzzy_match_score, |score| {
            format!("{:.1}% similar to the reference solution", score)
        })
        .build()
}

fn structure_details(score: f64, features: Option<&StructuralFeatures>) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    match features {
        Some(f) => format!(
            "Structure score {:.0}/100 (loops: {}, variables: {}, input: {}, hard-coded output: {})",
            score,
            yes_no(f.has_loops),
            yes_no(f.has_variables),
            yes_no(f.has_input_handling),
            yes_no(f.has_hardcoded_output)
        ),
        None => format!("Structure score {:.0}/100", score),
    }
}

fn complexity_details(kind: &str, label: &str) -> String {
    match Complexity::parse(label) {
        Some(Complexity::Polynomial(_)) | None => format!(
            "{} complexity '{}' not in the lookup table, scored {:.0}",
            kind, label, UNRECOGNIZED_COMPLEXITY_SCORE
        ),
        Some(c) => format!("{} complexity {} scores {:.0}", kind, label, c.score()),
    }
}
