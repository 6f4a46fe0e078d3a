//! Report formatting for assessment output.

use crate::analysis::Analysis;
use crate::assessment::rubric::MetricCategory;
use crate::assessment::types::{AssessmentResult, ResultComparison, ScoreMetric};

/// Output format for assessment reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable formatted output.
    Pretty,
    /// JSON output.
    Json,
    /// Markdown report.
    Markdown,
    /// Single summary line.
    Compact,
}

/// Format an assessment result. `full` adds per-metric details.
pub fn format_assessment(result: &AssessmentResult, format: OutputFormat, full: bool) -> String {
    match format {
        OutputFormat::Pretty => format_pretty(result, full),
        OutputFormat::Json => to_json(result),
        OutputFormat::Markdown => format_markdown(result, full),
        OutputFormat::Compact => format_compact(result),
    }
}

/// Format a before/after comparison.
pub fn format_comparison(comparison: &ResultComparison, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format_comparison_pretty(comparison),
        OutputFormat::Json => to_json(comparison),
        OutputFormat::Markdown => format_comparison_markdown(comparison),
        OutputFormat::Compact => format_comparison_compact(comparison),
    }
}

/// Format a structural analysis of a single source file.
pub fn format_analysis(analysis: &Analysis, format: OutputFormat) -> String {
    let scan = &analysis.scan;
    let features = &analysis.features;
    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "language": scan.language,
            "features": features,
            "verdict": analysis.verdict,
            "literalOutputCount": scan.literal_output_count,
            "longestLiteralRun": scan.longest_literal_run,
        })),
        OutputFormat::Compact => format!(
            "{} structure={:.0} dump={}",
            scan.language, features.structure_score, analysis.verdict.is_dump_code
        ),
        OutputFormat::Pretty | OutputFormat::Markdown => {
            let markdown = format == OutputFormat::Markdown;
            let mut output = String::new();
            if markdown {
                output.push_str("# Structural Analysis\n\n");
            }
            let rows = [
                ("Language", scan.language.to_string()),
                ("Structure score", format!("{:.0}/100", features.structure_score)),
                ("Loops", yes_no(features.has_loops)),
                ("Variables", yes_no(features.has_variables)),
                ("Input handling", yes_no(features.has_input_handling)),
                ("Functions", yes_no(scan.has_functions)),
                ("Comments", yes_no(scan.has_comments)),
                ("Literal outputs", scan.literal_output_count.to_string()),
                ("Longest literal run", scan.longest_literal_run.to_string()),
                ("Hard-coded output", yes_no(features.has_hardcoded_output)),
                ("Pattern task", yes_no(scan.pattern_signal)),
            ];
            for (label, value) in rows {
                if markdown {
                    output.push_str(&format!("- **{}**: {}\n", label, value));
                } else {
                    output.push_str(&format!("{:<20} {}\n", format!("{}:", label), value));
                }
            }
            if let Some(reason) = &analysis.verdict.reason {
                output.push_str(&format!("\nDump code: {}\n", reason));
            }
            output
        }
    }
}

fn yes_no(b: bool) -> String {
    let text = if b { "yes" } else { "no" };
    text.to_string()
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

fn format_pretty(result: &AssessmentResult, full: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Score: {:.1}/100  Grade: {} ({})  Language: {}\n",
        result.normalized_score, result.letter_grade, result.fuzzy_grade, result.language
    ));

    if let Some(reason) = &result.rejection_reason {
        output.push_str(&format!("\x1b[1;31mREJECTED\x1b[0m: {}\n", reason));
    } else {
        output.push('\n');
        output.push_str(&format_rubric_table(&result.rubric.metrics));
        output.push_str(&format!(
            "Total: {:.2} / {:.2} (weight {:.2})\n",
            result.rubric.total_score, result.rubric.max_possible_score, result.rubric.total_weight
        ));

        let categories: Vec<String> = MetricCategory::all()
            .iter()
            .filter_map(|c| {
                result
                    .rubric
                    .category_score(*c)
                    .map(|s| format!("{} {:.0}", c.name(), s))
            })
            .collect();
        if !categories.is_empty() {
            output.push_str(&format!("Categories: {}\n", categories.join(", ")));
        }
    }

    if full {
        for metric in &result.rubric.metrics {
            output.push_str(&format!("  {}: {}\n", metric.name, metric.details));
        }
    }

    push_list(&mut output, "Feedback", &result.feedback, "  - ");
    push_list(&mut output, "Strengths", &result.strengths, "  + ");
    push_list(&mut output, "Weaknesses", &result.weaknesses, "  - ");

    output
}

fn push_list(output: &mut String, title: &str, items: &[String], bullet: &str) {
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("\n{}:\n", title));
    for item in items {
        for (i, line) in wrap_text(item, 76).into_iter().enumerate() {
            if i == 0 {
                output.push_str(&format!("{}{}\n", bullet, line));
            } else {
                output.push_str(&format!("{}{}\n", " ".repeat(bullet.len()), line));
            }
        }
    }
}

/// Boxed metric table: name, weight, score, weighted score.
fn format_rubric_table(metrics: &[ScoreMetric]) -> String {
    const WIDTHS: [usize; 4] = [20, 8, 8, 10];
    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, w) in WIDTHS.iter().enumerate() {
            line.push_str(&"─".repeat(*w));
            line.push(if i + 1 < WIDTHS.len() { mid } else { right });
        }
        line.push('\n');
        line
    };

    let mut output = border('┌', '┬', '┐');
    output.push_str(&format!(
        "│{:<20}│{:>8}│{:>8}│{:>10}│\n",
        " Metric", "Weight ", "Score ", "Weighted "
    ));
    output.push_str(&border('├', '┼', '┤'));
    for metric in metrics {
        output.push_str(&format!(
            "│ {:<19}│{:>7.2} │{:>7.1} │{:>9.2} │\n",
            metric.name,
            metric.weight,
            metric.score,
            metric.weighted_score()
        ));
    }
    output.push_str(&border('└', '┴', '┘'));
    output
}

/// Wrap text to fit within a given width.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn format_markdown(result: &AssessmentResult, full: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Assessment Report\n\n**Score**: {:.1}/100\n**Grade**: {} ({})\n**Language**: {}\n\n",
        result.normalized_score, result.letter_grade, result.fuzzy_grade, result.language
    ));

    if let Some(reason) = &result.rejection_reason {
        output.push_str(&format!("> **Rejected**: {}\n\n", reason));
    } else {
        output.push_str("## Rubric\n\n| Metric | Weight | Score | Weighted |");
        if full {
            output.push_str(" Details |\n|--------|--------|-------|----------|---------|\n");
        } else {
            output.push_str("\n|--------|--------|-------|----------|\n");
        }
        for metric in &result.rubric.metrics {
            output.push_str(&format!(
                "| {} | {:.2} | {:.1} | {:.2} |",
                metric.name,
                metric.weight,
                metric.score,
                metric.weighted_score()
            ));
            if full {
                output.push_str(&format!(" {} |", metric.details));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    for (title, items) in [
        ("Feedback", &result.feedback),
        ("Strengths", &result.strengths),
        ("Weaknesses", &result.weaknesses),
    ] {
        if items.is_empty() {
            continue;
        }
        output.push_str(&format!("## {}\n\n", title));
        for item in items {
            output.push_str(&format!("- {}\n", item));
        }
        output.push('\n');
    }

    output
}

fn format_compact(result: &AssessmentResult) -> String {
    let status = match &result.rejection_reason {
        Some(_) => "rejected".to_string(),
        None => format!("{} metrics", result.rubric.metrics.len()),
    };
    format!(
        "{:.1} {} {} [{}] {}",
        result.normalized_score, result.letter_grade, result.fuzzy_grade, result.language, status
    )
}

fn signed(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{:.1}", delta)
    } else {
        format!("{:.1}", delta)
    }
}

fn format_comparison_pretty(comparison: &ResultComparison) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Assessment Comparison\n\nBefore: {:.1} ({}) -> After: {:.1} ({}) ({})\n\n",
        comparison.before.normalized_score,
        comparison.before.letter_grade,
        comparison.after.normalized_score,
        comparison.after.letter_grade,
        signed(comparison.score_delta)
    ));

    if !comparison.improvements.is_empty() {
        output.push_str("Improvements:\n");
        for imp in &comparison.improvements {
            output.push_str(&format!("  + {}\n", imp));
        }
        output.push('\n');
    }

    if !comparison.regressions.is_empty() {
        output.push_str("Regressions:\n");
        for reg in &comparison.regressions {
            output.push_str(&format!("  - {}\n", reg));
        }
        output.push('\n');
    }

    output
}

fn format_comparison_markdown(comparison: &ResultComparison) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Assessment Comparison\n\n**Before**: {:.1} ({})\n**After**: {:.1} ({})\n**Change**: {}\n\n",
        comparison.before.normalized_score,
        comparison.before.letter_grade,
        comparison.after.normalized_score,
        comparison.after.letter_grade,
        signed(comparison.score_delta)
    ));

    if !comparison.improvements.is_empty() {
        output.push_str("## Improvements\n\n");
        for imp in &comparison.improvements {
            output.push_str(&format!("- {}\n", imp));
        }
        output.push('\n');
    }

    if !comparison.regressions.is_empty() {
        output.push_str("## Regressions\n\n");
        for reg in &comparison.regressions {
            output.push_str(&format!("- {}\n", reg));
        }
    }

    output
}

fn format_comparison_compact(comparison: &ResultComparison) -> String {
    format!(
        "{:.1} -> {:.1} ({})",
        comparison.before.normalized_score,
        comparison.after.normalized_score,
        signed(comparison.score_delta)
    )
}
