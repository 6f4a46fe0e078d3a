//! Core types for submission assessment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::StructuralFeatures;
use crate::assessment::grade::{FuzzyGrade, LetterGrade};
use crate::assessment::rubric::{MetricCategory, MetricId};
use crate::language::Language;

/// Every score-like field lives on a 0-100 scale.
pub const MAX_METRIC_SCORE: f64 = 100.0;

/// Result of one executed test case, as reported by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseDetail {
    pub id: String,
    pub name: String,
    pub passed: bool,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default)]
    pub actual_output: String,
}

/// Signals about one submission, supplied by the execution step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_code: Option<String>,
    pub correctness: f64,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub readability: f64,
    #[serde(default)]
    pub test_cases_passed: u32,
    #[serde(default)]
    pub total_test_cases: u32,
    #[serde(default)]
    pub time_complexity: String,
    #[serde(default)]
    pub space_complexity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_style: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handling: Option<f64>,
    /// Similarity to a reference solution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_match_score: Option<f64>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    /// Kilobytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<f64>,
    /// Pre-computed structure analysis. Computed from `raw_code` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_quality: Option<StructuralFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_details: Option<Vec<TestCaseDetail>>,
    /// Problem text, sniffed for pattern-task keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_statement: Option<String>,
    /// Explicitly marks the problem as a pattern-generation task.
    #[serde(default)]
    pub pattern_task: bool,
    /// Skip classification and analyze as this language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl AssessmentInput {
    pub fn new(correctness: f64) -> Self {
        Self {
            correctness,
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.raw_code = Some(code.into());
        self
    }

    pub fn with_tests(mut self, passed: u32, total: u32) -> Self {
        self.test_cases_passed = passed;
        self.total_test_cases = total;
        self
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    pub fn with_readability(mut self, readability: f64) -> Self {
        self.readability = readability;
        self
    }

    pub fn with_complexity(mut self, time: impl Into<String>, space: impl Into<String>) -> Self {
        self.time_complexity = time.into();
        self.space_complexity = space.into();
        self
    }

    pub fn with_code_style(mut self, score: f64) -> Self {
        self.code_style = Some(score);
        self
    }

    pub fn with_error_handling(mut self, score: f64) -> Self {
        self.error_handling = Some(score);
        self
    }

    pub fn with_fuzzy_match(mut self, score: f64) -> Self {
        self.fuzzy_match_score = Some(score);
        self
    }

    pub fn with_execution_time(mut self, millis: f64) -> Self {
        self.execution_time = Some(millis);
        self
    }

    pub fn with_code_quality(mut self, features: StructuralFeatures) -> Self {
        self.code_quality = Some(features);
        self
    }

    pub fn with_test_details(mut self, details: Vec<TestCaseDetail>) -> Self {
        self.test_case_details = Some(details);
        self
    }

    pub fn with_problem_statement(mut self, text: impl Into<String>) -> Self {
        self.problem_statement = Some(text.into());
        self
    }

    pub fn with_pattern_task(mut self, pattern_task: bool) -> Self {
        self.pattern_task = pattern_task;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Describe every field outside its documented range.
    pub fn validation_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let mut check_score = |field: &str, value: f64| {
            if !value.is_finite() || !(0.0..=MAX_METRIC_SCORE).contains(&value) {
                issues.push(format!("{} must be within 0-100 (got {})", field, value));
            }
        };
        check_score("correctness", self.correctness);
        check_score("efficiency", self.efficiency);
        check_score("readability", self.readability);
        for (field, value) in [
            ("codeStyle", self.code_style),
            ("errorHandling", self.error_handling),
            ("fuzzyMatchScore", self.fuzzy_match_score),
        ] {
            if let Some(v) = value {
                check_score(field, v);
            }
        }
        if let Some(features) = &self.code_quality {
            check_score("codeQuality.structureScore", features.structure_score);
        }

        for (field, value) in [
            ("executionTime", self.execution_time),
            ("memoryUsage", self.memory_usage),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    issues.push(format!("{} must be a non-negative number (got {})", field, v));
                }
            }
        }

        if self.test_cases_passed > self.total_test_cases {
            issues.push(format!(
                "testCasesPassed ({}) exceeds totalTestCases ({})",
                self.test_cases_passed, self.total_test_cases
            ));
        }

        issues
    }
}

/// One weighted row of the rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMetric {
    pub id: MetricId,
    pub name: String,
    pub weight: f64,
    /// 0-100.
    pub score: f64,
    pub max_score: f64,
    pub details: String,
}

impl ScoreMetric {
    pub fn weighted_score(&self) -> f64 {
        self.score * self.weight
    }

    pub fn max_weighted_score(&self) -> f64 {
        self.max_score * self.weight
    }
}

/// Ordered weighted metrics and their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRubric {
    pub metrics: Vec<ScoreMetric>,
    pub total_weight: f64,
    pub total_score: f64,
    pub max_possible_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ScoringRubric {
    /// Empty rubric for a rejected submission.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            metrics: Vec::new(),
            total_weight: 0.0,
            total_score: 0.0,
            max_possible_score: MAX_METRIC_SCORE,
            rejection_reason: Some(reason.into()),
        }
    }

    /// `100 * total / max`, or 0 when nothing can be scored.
    pub fn normalized_score(&self) -> f64 {
        if self.max_possible_score > 0.0 {
            (MAX_METRIC_SCORE * self.total_score / self.max_possible_score)
                .clamp(0.0, MAX_METRIC_SCORE)
        } else {
            0.0
        }
    }

    pub fn metric(&self, id: MetricId) -> Option<&ScoreMetric> {
        self.metrics.iter().find(|m| m.id == id)
    }

    pub fn metrics_in(&self, category: MetricCategory) -> Vec<&ScoreMetric> {
        self.metrics
            .iter()
            .filter(|m| m.id.categories().contains(&category))
            .collect()
    }

    /// Normalized 0-100 score over one category, if any metric belongs to it.
    pub fn category_score(&self, category: MetricCategory) -> Option<f64> {
        let metrics = self.metrics_in(category);
        let max: f64 = metrics.iter().map(|m| m.max_weighted_score()).sum();
        if max > 0.0 {
            let total: f64 = metrics.iter().map(|m| m.weighted_score()).sum();
            Some(MAX_METRIC_SCORE * total / max)
        } else {
            None
        }
    }
}

/// Final, self-contained outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub language: Language,
    pub rubric: ScoringRubric,
    pub normalized_score: f64,
    pub letter_grade: LetterGrade,
    pub fuzzy_grade: FuzzyGrade,
    pub feedback: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub rejected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_quality: Option<StructuralFeatures>,
}

/// Before/after comparison of two results for the same task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultComparison {
    pub before: AssessmentResult,
    pub after: AssessmentResult,
    pub score_delta: f64,
    /// Per-metric score deltas (positive = improvement).
    pub metric_deltas: BTreeMap<String, f64>,
    pub improvements: Vec<String>,
    pub regressions: Vec<String>,
}
