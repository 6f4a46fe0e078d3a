//! Feedback synthesis.
//!
//! Rules run in a fixed order and each may append remarks; nothing is
//! reordered or deduplicated. Strengths and weaknesses come from a second,
//! metric-driven pass so optional metrics are covered automatically.

use serde::{Deserialize, Serialize};

use crate::analysis::StructuralFeatures;
use crate::assessment::rubric::{test_pass_rate, Complexity, MetricId};
use crate::assessment::types::{AssessmentInput, ScoringRubric};

pub const REJECTION_FEEDBACK: [&str; 2] = [
    "Your solution prints hard-coded output instead of computing it. Use loops and variables to generate the result.",
    "Submission rejected: hard-coded output is not accepted for this problem. Rewrite the solution so the output is computed.",
];

const STRUCTURE_THRESHOLD: f64 = 70.0;
const CORRECTNESS_FAIL: f64 = 70.0;
const CORRECTNESS_EDGE: f64 = 90.0;
const STYLE_THRESHOLD: f64 = 80.0;
const READABILITY_THRESHOLD: f64 = 80.0;
const ERROR_HANDLING_THRESHOLD: f64 = 70.0;
const SIMILARITY_THRESHOLD: f64 = 70.0;
const SLOW_EXECUTION_MS: f64 = 1000.0;
const STRENGTH_THRESHOLD: f64 = 90.0;
const WEAKNESS_THRESHOLD: f64 = 70.0;

/// Remarks plus derived strengths and weaknesses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub remarks: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl Feedback {
    /// The fixed feedback for a rejected submission.
    pub fn rejected() -> Self {
        Self {
            remarks: REJECTION_FEEDBACK.iter().map(|s| s.to_string()).collect(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }
}

/// Inputs available to every feedback rule.
pub struct FeedbackContext<'a> {
    pub input: &'a AssessmentInput,
    pub rubric: &'a ScoringRubric,
    pub features: Option<&'a StructuralFeatures>,
}

type FeedbackRule = fn(&FeedbackContext<'_>, &mut Vec<String>);

/// Rules in output order.
const RULES: &[FeedbackRule] = &[
    structure_rule,
    correctness_rule,
    test_rule,
    time_complexity_rule,
    space_complexity_rule,
    style_rule,
    readability_rule,
    error_handling_rule,
    similarity_rule,
    execution_time_rule,
];

/// Build feedback for an accepted submission.
pub fn synthesize(ctx: &FeedbackContext<'_>) -> Feedback {
    let mut remarks = Vec::new();
    for rule in RULES {
        rule(ctx, &mut remarks);
    }

    let (strengths, weaknesses) = strengths_and_weaknesses(ctx.rubric);
    Feedback {
        remarks,
        strengths,
        weaknesses,
    }
}

/// Metric-driven pass over the final rubric.
pub fn strengths_and_weaknesses(rubric: &ScoringRubric) -> (Vec<String>, Vec<String>) {
    let strengths = rubric
        .metrics
        .iter()
        .filter(|m| m.score >= STRENGTH_THRESHOLD)
        .map(|m| format!("Strong {}", m.name.to_lowercase()))
        .collect();
    let weaknesses = rubric
        .metrics
        .iter()
        .filter(|m| m.score <= WEAKNESS_THRESHOLD)
        .map(|m| format!("Needs improvement in {}", m.name.to_lowercase()))
        .collect();
    (strengths, weaknesses)
}

/// Clamped score of a metric present in the rubric.
fn scored(ctx: &FeedbackContext<'_>, id: MetricId) -> Option<f64> {
    ctx.rubric.metric(id).map(|m| m.score)
}

fn structure_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    let (Some(features), Some(score)) = (ctx.features, scored(ctx, MetricId::CodeStructure)) else {
        return;
    };
    if score >= STRUCTURE_THRESHOLD {
        return;
    }

    out.push(format!(
        "Code structure needs improvement (structure score {:.0}/100).",
        score
    ));
    if !features.has_loops {
        out.push("Use loops to repeat work instead of writing the same statement several times.".to_string());
    }
    if !features.has_variables {
        out.push("Store intermediate values in variables rather than hard-coding them.".to_string());
    }
    if !features.has_input_handling {
        out.push("Read the input instead of relying on fixed values.".to_string());
    }
}

fn correctness_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    let correctness = scored(ctx, MetricId::Correctness).unwrap_or(0.0);
    if correctness < CORRECTNESS_FAIL {
        out.push("Your solution doesn't solve the problem correctly. Re-read the requirements and trace through the expected output.".to_string());
    } else if correctness < CORRECTNESS_EDGE {
        out.push("Your solution works but check edge cases such as empty input, a single element and the largest allowed size.".to_string());
    }
}

fn test_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    let input = ctx.input;
    if input.total_test_cases == 0 {
        out.push("No test cases were run against this submission.".to_string());
        return;
    }

    let rate = test_pass_rate(input.test_cases_passed, input.total_test_cases);
    if rate >= 100.0 {
        return;
    }
    out.push(format!(
        "Passed {} of {} test cases ({:.0}%).",
        input.test_cases_passed, input.total_test_cases, rate
    ));

    if let Some(details) = &input.test_case_details {
        let failing: Vec<&str> = details
            .iter()
            .filter(|t| !t.passed)
            .map(|t| t.name.as_str())
            .collect();
        if !failing.is_empty() {
            out.push(format!("Failing test cases: {}.", failing.join(", ")));
        }
    }
}

fn time_complexity_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    let label = &ctx.input.time_complexity;
    if Complexity::parse(label).is_some_and(|c| c.is_quadratic_or_worse()) {
        out.push(format!(
            "Time complexity {} can likely be optimized. Look for a way to avoid nested passes over the input.",
            label
        ));
    }
}

fn space_complexity_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    let label = &ctx.input.space_complexity;
    if !Complexity::parse(label).is_some_and(|c| c.is_sublinear()) {
        let shown = if label.trim().is_empty() { "unknown" } else { label.as_str() };
        out.push(format!(
            "Space complexity {} could be reduced. Consider reusing buffers or computing values on the fly.",
            shown
        ));
    }
}

fn style_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    if scored(ctx, MetricId::CodeStyle).is_some_and(|s| s < STYLE_THRESHOLD) {
        out.push("Improve code style: follow consistent naming, spacing and formatting conventions.".to_string());
    }
}

fn readability_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    if scored(ctx, MetricId::Readability).unwrap_or(0.0) < READABILITY_THRESHOLD {
        out.push("Improve readability with descriptive names, smaller functions and comments on the tricky parts.".to_string());
    }
}

fn error_handling_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    if scored(ctx, MetricId::ErrorHandling).is_some_and(|s| s < ERROR_HANDLING_THRESHOLD) {
        out.push("Add error handling for invalid or unexpected input.".to_string());
    }
}

fn similarity_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    if scored(ctx, MetricId::SolutionMatch).is_some_and(|s| s < SIMILARITY_THRESHOLD) {
        out.push("Your approach differs significantly from the reference solution. Double-check the expected algorithm.".to_string());
    }
}

fn execution_time_rule(ctx: &FeedbackContext<'_>, out: &mut Vec<String>) {
    if let Some(ms) = ctx.input.execution_time {
        if ms > SLOW_EXECUTION_MS {
            out.push(format!(
                "Execution took {:.0} ms. Consider optimizing for speed.",
                ms
            ));
        }
    }
}
