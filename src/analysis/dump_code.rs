//! Dump-code detection: submissions that print a known answer instead of
//! computing it.
//!
//! Rules only fire for pattern-printing tasks (stars, pyramids, matrices),
//! where hard-coding the output is the usual way to game the grader. Rules
//! are evaluated in order and the first match supplies the reason.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::SourceScan;

/// Literal outputs tolerated before a loop-free pattern solution is rejected.
const MAX_LITERAL_OUTPUTS_WITHOUT_LOOP: usize = 3;

/// One named detection rule.
#[derive(Clone)]
pub struct DumpRule {
    pub name: &'static str,
    pub reason: &'static str,
    predicate: fn(&SourceScan) -> bool,
}

impl DumpRule {
    pub const fn new(
        name: &'static str,
        reason: &'static str,
        predicate: fn(&SourceScan) -> bool,
    ) -> Self {
        Self {
            name,
            reason,
            predicate,
        }
    }

    pub fn matches(&self, scan: &SourceScan) -> bool {
        (self.predicate)(scan)
    }
}

impl std::fmt::Debug for DumpRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpRule")
            .field("name", &self.name)
            .field("reason", &self.reason)
            .finish()
    }
}

/// Outcome of dump-code detection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpVerdict {
    pub is_dump_code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DumpVerdict {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn rejected(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            is_dump_code: true,
            rule: Some(rule.into()),
            reason: Some(reason.into()),
        }
    }
}

/// The built-in rules, in evaluation order.
pub fn default_rules() -> Vec<DumpRule> {
    vec![
        DumpRule::new(
            "loop_free_literal_output",
            "Hard-coded solution detected, use loops to generate the pattern instead of printing it line by line.",
            |scan| {
                scan.pattern_signal
                    && !scan.has_loops
                    && scan.literal_output_count > MAX_LITERAL_OUTPUTS_WITHOUT_LOOP
            },
        ),
        DumpRule::new(
            "consecutive_literal_output",
            "Multiple hard-coded print statements detected, generate each line of the pattern with a loop.",
            |scan| scan.pattern_signal && scan.has_hardcoded_output(),
        ),
        DumpRule::new(
            "multiline_literal_output",
            "Hard-coded multi-line string detected, build the pattern programmatically instead of printing a fixed block.",
            |scan| scan.pattern_signal && scan.has_multiline_literal,
        ),
    ]
}

/// Ordered rule list; the first matching rule rejects.
#[derive(Debug, Clone)]
pub struct DumpCodeDetector {
    rules: Vec<DumpRule>,
}

impl Default for DumpCodeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DumpCodeDetector {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<DumpRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DumpRule] {
        &self.rules
    }

    pub fn detect(&self, scan: &SourceScan) -> DumpVerdict {
        if !scan.pattern_signal {
            return DumpVerdict::clean();
        }

        for rule in &self.rules {
            if rule.matches(scan) {
                debug!("dump-code rule '{}' matched", rule.name);
                return DumpVerdict::rejected(rule.name, rule.reason);
            }
        }
        DumpVerdict::clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_scan() -> SourceScan {
        SourceScan {
            pattern_signal: true,
            ..Default::default()
        }
    }

    #[test]
    fn no_pattern_signal_never_rejects() {
        let scan = SourceScan {
            pattern_signal: false,
            literal_output_count: 20,
            longest_literal_run: 20,
            has_multiline_literal: true,
            ..Default::default()
        };
        assert!(!DumpCodeDetector::new().detect(&scan).is_dump_code);
    }

    #[test]
    fn loop_free_literal_output_rule() {
        let scan = SourceScan {
            literal_output_count: 4,
            ..pattern_scan()
        };
        let verdict = DumpCodeDetector::new().detect(&scan);
        assert!(verdict.is_dump_code);
        assert_eq!(verdict.rule.as_deref(), Some("loop_free_literal_output"));
        assert!(verdict.reason.unwrap().contains("use loops"));
    }

    #[test]
    fn three_literals_without_a_run_pass() {
        let scan = SourceScan {
            literal_output_count: 3,
            longest_literal_run: 1,
            ..pattern_scan()
        };
        assert!(!DumpCodeDetector::new().detect(&scan).is_dump_code);
    }

    #[test]
    fn consecutive_rule_fires_even_with_loops() {
        let scan = SourceScan {
            has_loops: true,
            literal_output_count: 2,
            longest_literal_run: 2,
            ..pattern_scan()
        };
        let verdict = DumpCodeDetector::new().detect(&scan);
        assert_eq!(verdict.rule.as_deref(), Some("consecutive_literal_output"));
    }

    #[test]
    fn multiline_rule() {
        let scan = SourceScan {
            has_loops: true,
            literal_output_count: 1,
            longest_literal_run: 1,
            has_multiline_literal: true,
            ..pattern_scan()
        };
        let verdict = DumpCodeDetector::new().detect(&scan);
        assert_eq!(verdict.rule.as_deref(), Some("multiline_literal_output"));
        assert!(verdict.reason.unwrap().contains("multi-line"));
    }

    #[test]
    fn first_matching_rule_wins() {
        let scan = SourceScan {
            literal_output_count: 6,
            longest_literal_run: 6,
            has_multiline_literal: true,
            ..pattern_scan()
        };
        let verdict = DumpCodeDetector::new().detect(&scan);
        assert_eq!(verdict.rule.as_deref(), Some("loop_free_literal_output"));
    }

    #[test]
    fn custom_rule_list() {
        let detector = DumpCodeDetector::with_rules(vec![DumpRule::new(
            "any_literal",
            "literal output",
            |scan| scan.literal_output_count > 0,
        )]);
        let scan = SourceScan {
            literal_output_count: 1,
            ..pattern_scan()
        };
        assert_eq!(detector.rules().len(), 1);
        assert!(detector.detect(&scan).is_dump_code);
    }
}
