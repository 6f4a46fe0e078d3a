//! Structural analysis of raw submission source.
//!
//! A single [`SourceScan`] pass collects the lexical facts, from which both
//! the structure score and the dump-code verdict are derived.

pub mod dump_code;
pub mod patterns;

pub use dump_code::{DumpCodeDetector, DumpRule, DumpVerdict};
pub use patterns::{LanguagePatterns, LiteralOutput};

use std::collections::HashMap;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::{compile, Language, LanguageClassifier};

/// Neutral prior for the structure score.
const BASE_STRUCTURE_SCORE: f64 = 50.0;

/// Boolean feature flags plus the 0-100 structure score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralFeatures {
    pub is_dump_code: bool,
    pub has_loops: bool,
    pub has_variables: bool,
    pub has_input_handling: bool,
    pub has_hardcoded_output: bool,
    pub structure_score: f64,
}

/// Lexical facts gathered from one source text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceScan {
    pub language: Language,
    /// The source (or accompanying problem text) describes a pattern task.
    pub pattern_signal: bool,
    pub has_loops: bool,
    pub has_variables: bool,
    pub has_input_handling: bool,
    pub has_functions: bool,
    pub has_comments: bool,
    pub consistent_indentation: bool,
    /// Total output calls with a string-literal argument.
    pub literal_output_count: usize,
    /// Longest run of back-to-back literal output statements.
    pub longest_literal_run: usize,
    /// Some literal output bakes in two or more lines.
    pub has_multiline_literal: bool,
}

impl SourceScan {
    pub fn has_hardcoded_output(&self) -> bool {
        self.longest_literal_run >= 2
    }

    /// Structure score from the fixed increments, clamped to 0-100.
    pub fn structure_score(&self) -> f64 {
        let adjustments = [
            (self.has_loops, 15.0, "loops"),
            (self.has_variables, 15.0, "variables"),
            (self.has_input_handling, 10.0, "input handling"),
            (!self.has_hardcoded_output(), 10.0, "no hard-coded output"),
            (self.has_functions, 10.0, "functions"),
            (self.has_comments, 5.0, "comments"),
            (self.consistent_indentation, 5.0, "consistent indentation"),
        ];

        let mut score = BASE_STRUCTURE_SCORE;
        for (present, points, label) in adjustments {
            if present {
                debug!("structure +{} ({})", points, label);
                score += points;
            }
        }
        score.clamp(0.0, 100.0)
    }
}

/// Full analysis of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub scan: SourceScan,
    pub features: StructuralFeatures,
    pub verdict: DumpVerdict,
}

/// Runs classification, scanning and dump-code detection.
///
/// Holds only compiled patterns; shareable across threads.
pub struct CodeAnalyzer {
    classifier: LanguageClassifier,
    patterns: HashMap<Language, LanguagePatterns>,
    pattern_keywords: Regex,
    detector: DumpCodeDetector,
}

impl Default for CodeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeAnalyzer {
    pub fn new() -> Self {
        let patterns = Language::all()
            .iter()
            .copied()
            .chain(std::iter::once(Language::Unknown))
            .map(|lang| (lang, LanguagePatterns::for_language(lang)))
            .collect();

        Self {
            classifier: LanguageClassifier::new(),
            patterns,
            pattern_keywords: compile(r"(?i)\b(?:pattern|pyramid|triangle|diamond|matrix|array)"),
            detector: DumpCodeDetector::new(),
        }
    }

    /// Replace the dump-code detector (e.g. with a custom rule list).
    pub fn with_detector(mut self, detector: DumpCodeDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn classify(&self, source: &str) -> Language {
        self.classifier.classify(source)
    }

    /// Whether `text` mentions a pattern-printing keyword.
    pub fn mentions_pattern(&self, text: &str) -> bool {
        self.pattern_keywords.is_match(text)
    }

    fn patterns_for(&self, language: Language) -> &LanguagePatterns {
        // Every variant is inserted in `new`.
        &self.patterns[&language]
    }

    /// Scan `source`. `pattern_hint` marks the submission as a pattern task
    /// regardless of keywords.
    pub fn scan(&self, source: &str, language: Language, pattern_hint: bool) -> SourceScan {
        let patterns = self.patterns_for(language);
        let literals = patterns.literal_output_spans(source);

        let scan = SourceScan {
            language,
            pattern_signal: pattern_hint || self.mentions_pattern(source),
            has_loops: patterns.loops.is_match(source),
            has_variables: patterns.declarations.is_match(source),
            has_input_handling: patterns.input.is_match(source),
            has_functions: patterns.has_function(source),
            has_comments: patterns.comments.is_match(source),
            consistent_indentation: indentation_consistent(source),
            literal_output_count: literals.len(),
            longest_literal_run: longest_literal_run(source, patterns),
            has_multiline_literal: literals.iter().any(|l| l.segment_count() >= 2),
        };

        debug!(
            "scan [{}]: loops={} vars={} input={} literal_outputs={} run={} multiline={} pattern={}",
            language,
            scan.has_loops,
            scan.has_variables,
            scan.has_input_handling,
            scan.literal_output_count,
            scan.longest_literal_run,
            scan.has_multiline_literal,
            scan.pattern_signal
        );

        scan
    }

    /// Classify (unless `language` is given), scan, score and run dump detection.
    pub fn analyze(&self, source: &str, language: Option<Language>, pattern_hint: bool) -> Analysis {
        let language = language.unwrap_or_else(|| self.classify(source));
        let scan = self.scan(source, language, pattern_hint);
        let verdict = self.detector.detect(&scan);
        let features = StructuralFeatures {
            is_dump_code: verdict.is_dump_code,
            has_loops: scan.has_loops,
            has_variables: scan.has_variables,
            has_input_handling: scan.has_input_handling,
            has_hardcoded_output: scan.has_hardcoded_output(),
            structure_score: scan.structure_score(),
        };

        Analysis {
            scan,
            features,
            verdict,
        }
    }
}

fn is_comment_line(trimmed: &str, language: Language) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || (language.hash_comments() && trimmed.starts_with('#'))
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// Longest run of consecutive statements that are nothing but literal output.
///
/// Blank and comment lines are skipped. Any other code line, or a change of
/// indentation, ends the run.
fn longest_literal_run(source: &str, patterns: &LanguagePatterns) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut run_indent: Option<&str> = None;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment_line(trimmed, patterns.language) {
            continue;
        }

        let outputs = literal_only_statements(trimmed, patterns);
        if outputs == 0 {
            run = 0;
            run_indent = None;
            continue;
        }

        let indent = leading_whitespace(line);
        if run_indent == Some(indent) {
            run += outputs;
        } else {
            run = outputs;
            run_indent = Some(indent);
        }
        longest = longest.max(run);
    }

    longest
}

/// Number of literal-output statements on a line that contains nothing else
/// (apart from `;` and braces), or zero.
fn literal_only_statements(trimmed: &str, patterns: &LanguagePatterns) -> usize {
    let spans = patterns.literal_output_spans(trimmed);
    if spans.is_empty() {
        return 0;
    }

    let mut rest = String::with_capacity(trimmed.len());
    let mut cursor = 0;
    for span in &spans {
        rest.push_str(&trimmed[cursor..span.start]);
        cursor = span.end;
    }
    rest.push_str(&trimmed[cursor..]);

    if rest.chars().all(|c| c.is_whitespace() || matches!(c, ';' | '{' | '}')) {
        spans.len()
    } else {
        0
    }
}

/// Indentation is consistent when at least two indented blocks exist, a
/// single indent character is used throughout, and every indent width is a
/// multiple of the smallest one.
fn indentation_consistent(source: &str) -> bool {
    let mut widths = Vec::new();
    let mut uses_tabs = false;
    let mut uses_spaces = false;
    let mut blocks = 0;
    let mut previous_width = 0;

    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = leading_whitespace(line);
        uses_tabs |= indent.contains('\t');
        uses_spaces |= indent.contains(' ');

        let width = indent.chars().count();
        if width > previous_width {
            blocks += 1;
        }
        previous_width = width;
        if width > 0 {
            widths.push(width);
        }
    }

    if blocks < 2 || (uses_tabs && uses_spaces) {
        return false;
    }
    let unit = widths.iter().copied().min().unwrap_or(1);
    widths.iter().all(|w| w % unit == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        HARDCODED_PYTHON_TRIANGLE, LOOPED_C_PYRAMID, LOOPED_PYTHON_TRIANGLE,
    };

    fn analyze(src: &str) -> Analysis {
        CodeAnalyzer::new().analyze(src, None, false)
    }

    #[test]
    fn looped_python_scores_high() {
        let a = analyze(LOOPED_PYTHON_TRIANGLE);
        assert_eq!(a.scan.language, Language::Python);
        assert!(a.features.has_loops);
        assert!(a.features.has_variables);
        assert!(a.features.has_input_handling);
        assert!(!a.features.has_hardcoded_output);
        assert!(!a.features.is_dump_code);
        assert!(a.features.structure_score >= 90.0);
    }

    #[test]
    fn hardcoded_python_has_hardcoded_output() {
        let a = analyze(HARDCODED_PYTHON_TRIANGLE);
        assert!(!a.features.has_loops);
        assert!(a.features.has_hardcoded_output);
        assert_eq!(a.scan.literal_output_count, 5);
        assert_eq!(a.scan.longest_literal_run, 5);
        assert!(a.features.structure_score < 70.0);
    }

    #[test]
    fn looped_c_is_not_hardcoded() {
        let a = analyze(LOOPED_C_PYRAMID);
        assert_eq!(a.scan.language, Language::C);
        assert!(a.scan.has_loops);
        assert!(a.scan.has_input_handling);
        assert!(a.scan.has_functions);
        assert!(!a.scan.has_hardcoded_output());
        assert!(!a.verdict.is_dump_code);
    }

    #[test]
    fn structure_score_is_clamped() {
        let scan = SourceScan {
            has_loops: true,
            has_variables: true,
            has_input_handling: true,
            has_functions: true,
            has_comments: true,
            consistent_indentation: true,
            ..Default::default()
        };
        assert_eq!(scan.structure_score(), 100.0);
    }

    #[test]
    fn bare_source_gets_prior_plus_no_hardcoding() {
        let scan = SourceScan::default();
        assert_eq!(scan.structure_score(), 60.0);
    }

    #[test]
    fn nested_loop_print_then_newline_is_not_a_run() {
        let src = "n = 3\nfor i in range(n):\n    for j in range(i + 1):\n        print(\"*\", end=\"\")\n    print(\"\")\n";
        let a = analyze(src);
        assert_eq!(a.scan.longest_literal_run, 1);
        assert!(!a.features.has_hardcoded_output);
    }

    #[test]
    fn same_line_statements_extend_a_run() {
        let patterns = LanguagePatterns::for_language(Language::C);
        let src = "int main() {\n    printf(\"*\"); printf(\"*\");\n    return 0;\n}\n";
        assert_eq!(longest_literal_run(src, &patterns), 2);
    }

    #[test]
    fn comment_lines_do_not_break_a_run() {
        let patterns = LanguagePatterns::for_language(Language::Python);
        let src = "print(\"*\")\n# row two\nprint(\"**\")\n";
        assert_eq!(longest_literal_run(src, &patterns), 2);
    }

    #[test]
    fn indentation_checks() {
        assert!(indentation_consistent(
            "def f():\n    if x:\n        y()\n    z()\n"
        ));
        assert!(!indentation_consistent("def f():\n    pass\n"));
        assert!(!indentation_consistent(
            "def f():\n    if x:\n\t\ty()\n"
        ));
        assert!(!indentation_consistent(
            "def f():\n    if x:\n      y()\n"
        ));
    }

    #[test]
    fn unknown_language_uses_generic_patterns() {
        let a = analyze("loop over things\nrepeat until done\n");
        assert_eq!(a.scan.language, Language::Unknown);
        assert!(a.scan.has_loops);
        assert!(!a.verdict.is_dump_code);
    }

    #[test]
    fn unknown_family_java_prints_form_a_run() {
        let src = "// pattern\nstatic void go() {\n    System.out.print(\"*\");\n    System.out.print(\"**\");\n}\n";
        let a = analyze(src);
        assert_eq!(a.scan.language, Language::Unknown);
        assert_eq!(a.scan.literal_output_count, 2);
        assert_eq!(a.scan.longest_literal_run, 2);
        assert!(a.verdict.is_dump_code);
        assert_eq!(a.verdict.rule.as_deref(), Some("consecutive_literal_output"));
    }

    #[test]
    fn custom_detector_replaces_default_rules() {
        let analyzer = CodeAnalyzer::new().with_detector(DumpCodeDetector::with_rules(vec![]));
        let a = analyzer.analyze(HARDCODED_PYTHON_TRIANGLE, None, false);
        assert!(a.scan.pattern_signal);
        assert!(!a.verdict.is_dump_code);
        assert!(!a.features.is_dump_code);
    }

    #[test]
    fn empty_source_never_fails() {
        let a = analyze("");
        assert_eq!(a.scan.language, Language::Unknown);
        assert_eq!(a.scan.literal_output_count, 0);
        assert!(!a.features.is_dump_code);
    }

    #[test]
    fn explicit_language_skips_classification() {
        let a = CodeAnalyzer::new().analyze("print('x')", Some(Language::Java), false);
        assert_eq!(a.scan.language, Language::Java);
    }

    #[test]
    fn pattern_hint_sets_signal() {
        let analyzer = CodeAnalyzer::new();
        assert!(!analyzer.scan("x = 1", Language::Python, false).pattern_signal);
        assert!(analyzer.scan("x = 1", Language::Python, true).pattern_signal);
        assert!(analyzer.scan("# Print a Pyramid", Language::Python, false).pattern_signal);
    }
}
