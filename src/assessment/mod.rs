//! Submission assessment.
//!
//! The engine runs structural analysis and dump-code detection first. A
//! rejection collapses the result to a fixed failing shape; otherwise the
//! rubric, grades and feedback are computed from the same inputs.

pub mod feedback;
pub mod grade;
pub mod report;
pub mod rubric;
pub mod store;
pub mod types;

pub use feedback::{Feedback, FeedbackContext};
pub use grade::{FuzzyGrade, LetterGrade};
pub use rubric::{build_rubric, Complexity, MetricCategory, MetricId, RubricBuilder};
pub use store::{compare_results, ResultStore};
pub use types::{
    AssessmentInput, AssessmentResult, ResultComparison, ScoreMetric, ScoringRubric,
    TestCaseDetail,
};

use std::sync::OnceLock;

use log::debug;
use thiserror::Error;

use crate::analysis::{CodeAnalyzer, StructuralFeatures};
use crate::language::Language;

/// Reason used when only a pre-computed analysis flags the submission.
pub const PRECOMPUTED_DUMP_REASON: &str = "Pre-computed analysis flagged hard-coded output.";

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Invalid assessment input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssessmentInput {
    /// Check field ranges, reporting every issue at once.
    pub fn validate(&self) -> Result<(), AssessmentError> {
        let issues = self.validation_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(AssessmentError::InvalidInput(issues.join("; ")))
        }
    }
}

/// Grades submissions. Holds only compiled patterns, so one engine can be
/// shared across threads.
#[derive(Default)]
pub struct AssessmentEngine {
    analyzer: CodeAnalyzer,
}

impl AssessmentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analyzer(analyzer: CodeAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &CodeAnalyzer {
        &self.analyzer
    }

    /// Whether the input marks or describes a pattern-printing task.
    fn pattern_hint(&self, input: &AssessmentInput) -> bool {
        input.pattern_task
            || input
                .problem_statement
                .as_deref()
                .is_some_and(|text| self.analyzer.mentions_pattern(text))
    }

    /// Grade one submission. Never fails; out-of-range values are clamped.
    pub fn assess(&self, input: &AssessmentInput) -> AssessmentResult {
        let analysis = input
            .raw_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .map(|code| self.analyzer.analyze(code, input.language, self.pattern_hint(input)));

        let language = input
            .language
            .or(analysis.as_ref().map(|a| a.scan.language))
            .unwrap_or(Language::Unknown);

        let features = input
            .code_quality
            .clone()
            .or_else(|| analysis.as_ref().map(|a| a.features.clone()));

        let rejection = match &analysis {
            Some(a) if a.verdict.is_dump_code => a.verdict.reason.clone(),
            _ => None,
        }
        .or_else(|| {
            input
                .code_quality
                .as_ref()
                .filter(|f| f.is_dump_code)
                .map(|_| PRECOMPUTED_DUMP_REASON.to_string())
        });

        if let Some(reason) = rejection {
            debug!("submission rejected: {}", reason);
            return rejected_result(language, reason, features);
        }

        let rubric = build_rubric(input, features.as_ref());
        let normalized_score = rubric.normalized_score();
        let feedback = feedback::synthesize(&FeedbackContext {
            input,
            rubric: &rubric,
            features: features.as_ref(),
        });

        let letter_grade = LetterGrade::from_score(normalized_score);
        let fuzzy_grade = FuzzyGrade::from_score(normalized_score);
        debug!(
            "assessed [{}]: {:.2}/100 ({}, {})",
            language, normalized_score, letter_grade, fuzzy_grade
        );

        AssessmentResult {
            language,
            rubric,
            normalized_score,
            letter_grade,
            fuzzy_grade,
            feedback: feedback.remarks,
            strengths: feedback.strengths,
            weaknesses: feedback.weaknesses,
            rejected: false,
            rejection_reason: None,
            code_quality: features,
        }
    }
}

fn rejected_result(
    language: Language,
    reason: String,
    features: Option<StructuralFeatures>,
) -> AssessmentResult {
    let feedback = Feedback::rejected();
    let code_quality = features.map(|f| StructuralFeatures {
        is_dump_code: true,
        ..f
    });

    AssessmentResult {
        language,
        rubric: ScoringRubric::rejected(reason.clone()),
        normalized_score: 0.0,
        letter_grade: LetterGrade::F,
        fuzzy_grade: FuzzyGrade::Failed,
        feedback: feedback.remarks,
        strengths: feedback.strengths,
        weaknesses: feedback.weaknesses,
        rejected: true,
        rejection_reason: Some(reason),
        code_quality,
    }
}

static SHARED_ENGINE: OnceLock<AssessmentEngine> = OnceLock::new();

/// Grade one submission with a process-wide engine built on first use.
///
/// Callers that need a custom analyzer should hold their own
/// [`AssessmentEngine`] instead.
pub fn assess(input: &AssessmentInput) -> AssessmentResult {
    SHARED_ENGINE.get_or_init(AssessmentEngine::new).assess(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{HARDCODED_PYTHON_TRIANGLE, LOOPED_PYTHON_TRIANGLE};

    #[test]
    fn validate_joins_issues() {
        let input = AssessmentInput::new(150.0).with_tests(3, 2);
        match input.validate() {
            Err(AssessmentError::InvalidInput(msg)) => {
                assert!(msg.contains("correctness"));
                assert!(msg.contains("testCasesPassed"));
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
        assert!(AssessmentInput::new(50.0).validate().is_ok());
    }

    #[test]
    fn hardcoded_pattern_is_rejected() {
        let result = assess(&AssessmentInput::new(100.0).with_code(HARDCODED_PYTHON_TRIANGLE));
        assert!(result.rejected);
        assert_eq!(result.language, Language::Python);
        assert!(result.rubric.metrics.is_empty());
        assert_eq!(result.letter_grade, LetterGrade::F);
        assert_eq!(result.feedback.len(), 2);
        assert!(result.code_quality.unwrap().is_dump_code);
    }

    #[test]
    fn hardcoding_without_pattern_signal_is_scored() {
        let code = "print(\"hello\")\nprint(\"world\")\n";
        let result = assess(&AssessmentInput::new(80.0).with_code(code));
        assert!(!result.rejected);
        assert!(result.rubric.metric(MetricId::CodeStructure).is_some());
    }

    #[test]
    fn problem_statement_supplies_pattern_signal() {
        let code = "print(\"*\")\nprint(\"**\")\n";
        let plain = AssessmentInput::new(80.0).with_code(code);
        assert!(!assess(&plain).rejected);

        let described = plain.clone().with_problem_statement("Print a right triangle of stars");
        assert!(assess(&described).rejected);

        let flagged = plain.with_pattern_task(true);
        assert!(assess(&flagged).rejected);
    }

    #[test]
    fn engine_uses_the_supplied_analyzer() {
        use crate::analysis::dump_code::DumpCodeDetector;

        let analyzer = CodeAnalyzer::new().with_detector(DumpCodeDetector::with_rules(vec![]));
        let engine = AssessmentEngine::with_analyzer(analyzer);
        let input = AssessmentInput::new(100.0).with_code(HARDCODED_PYTHON_TRIANGLE);

        let result = engine.assess(&input);
        assert!(!result.rejected);
        assert!(!result.code_quality.unwrap().is_dump_code);
        assert!(assess(&input).rejected);
    }

    #[test]
    fn precomputed_dump_flag_rejects_without_code() {
        let features = StructuralFeatures {
            is_dump_code: true,
            structure_score: 40.0,
            ..Default::default()
        };
        let result = assess(&AssessmentInput::new(90.0).with_code_quality(features));
        assert!(result.rejected);
        assert_eq!(result.rejection_reason.as_deref(), Some(PRECOMPUTED_DUMP_REASON));
        assert_eq!(result.language, Language::Unknown);
    }

    #[test]
    fn precomputed_features_are_used_for_scoring() {
        let features = StructuralFeatures {
            structure_score: 72.0,
            has_loops: true,
            has_variables: true,
            ..Default::default()
        };
        let input = AssessmentInput::new(90.0)
            .with_code(LOOPED_PYTHON_TRIANGLE)
            .with_code_quality(features);
        let result = assess(&input);
        assert_eq!(result.rubric.metric(MetricId::CodeStructure).unwrap().score, 72.0);
    }

    #[test]
    fn language_override_wins() {
        let input = AssessmentInput::new(90.0)
            .with_code(LOOPED_PYTHON_TRIANGLE)
            .with_language(Language::Java);
        assert_eq!(assess(&input).language, Language::Java);
    }

    #[test]
    fn blank_code_is_treated_as_absent() {
        let result = assess(&AssessmentInput::new(90.0).with_code("   \n"));
        assert!(result.code_quality.is_none());
        assert!(result.rubric.metric(MetricId::CodeStructure).is_none());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let input = AssessmentInput::new(250.0).with_readability(-10.0).with_tests(1, 1);
        let result = assess(&input);
        assert_eq!(result.rubric.metric(MetricId::Correctness).unwrap().score, 100.0);
        assert_eq!(result.rubric.metric(MetricId::Readability).unwrap().score, 0.0);
        assert!((0.0..=100.0).contains(&result.normalized_score));
    }
}
