//! Language classification from raw source text.
//!
//! Families are checked most-specific-first so that, for example, a Python
//! solution declaring a `class` is never read as Java.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language families the analyzer has pattern sets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Python,
    JavaScript,
    Java,
    #[default]
    Unknown,
}

impl Language {
    /// All concrete families (excludes `Unknown`).
    pub fn all() -> &'static [Language] {
        &[
            Language::C,
            Language::Cpp,
            Language::Python,
            Language::JavaScript,
            Language::Java,
        ]
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::Java => "Java",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the family uses `#` line comments.
    pub fn hash_comments(&self) -> bool {
        matches!(self, Self::Python | Self::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::C => write!(f, "c"),
            Self::Cpp => write!(f, "cpp"),
            Self::Python => write!(f, "python"),
            Self::JavaScript => write!(f, "javascript"),
            Self::Java => write!(f, "java"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" => Ok(Self::C),
            "cpp" | "c++" | "cc" | "cxx" => Ok(Self::Cpp),
            "python" | "py" | "python3" => Ok(Self::Python),
            "javascript" | "js" | "node" => Ok(Self::JavaScript),
            "java" => Ok(Self::Java),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!(
                "Unknown language: '{}'. Valid options: c, cpp, python, javascript, java",
                s
            )),
        }
    }
}

/// Lexical signatures used by [`LanguageClassifier`].
pub struct LanguageClassifier {
    c_family: Regex,
    cpp_streams: Regex,
    python: Regex,
    javascript: Regex,
    java: Regex,
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageClassifier {
    pub fn new() -> Self {
        Self {
            c_family: compile(r#"(?m)^\s*#\s*include\s*[<"]|^\s*(?:int|void)\s+main\s*\("#),
            cpp_streams: compile(r"\b(?:cout|cin|cerr)\b|std::|<iostream>|using\s+namespace\s+std"),
            python: compile(
                r"(?m)^\s*def\s+\w+\s*\(|^\s*import\s+[\w.]+(?:\s+as\s+\w+)?\s*$|^\s*from\s+[\w.]+\s+import\s|^\s*print\s*\(|^\s*for\s+\w+(?:\s*,\s*\w+)*\s+in\s",
            ),
            javascript: compile(
                r"\bfunction\b\s*\w*\s*\(|(?m:^\s*(?:const|let)\s+\w+)|\bconsole\.(?:log|error|info|warn)\s*\(",
            ),
            java: compile(r"\bpublic\s+class\b|\bpublic\s+static\s+void\s+main\b"),
        }
    }

    /// Classify source text. Empty or unrecognised text yields `Unknown`.
    pub fn classify(&self, source: &str) -> Language {
        if source.trim().is_empty() {
            return Language::Unknown;
        }

        if self.c_family.is_match(source) {
            return if self.cpp_streams.is_match(source) {
                Language::Cpp
            } else {
                Language::C
            };
        }
        if self.python.is_match(source) {
            return Language::Python;
        }
        if self.javascript.is_match(source) {
            return Language::JavaScript;
        }
        if self.java.is_match(source) {
            return Language::Java;
        }
        Language::Unknown
    }
}

static SHARED_CLASSIFIER: OnceLock<LanguageClassifier> = OnceLock::new();

/// Classify source text with a process-wide classifier built on first use.
pub fn classify(source: &str) -> Language {
    SHARED_CLASSIFIER
        .get_or_init(LanguageClassifier::new)
        .classify(source)
}

/// Compile a pattern that is fixed at build time.
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {:?}: {}", pattern, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_c() {
        let src = "#include <stdio.h>\nint main() {\n    printf(\"hi\\n\");\n    return 0;\n}\n";
        assert_eq!(classify(src), Language::C);
    }

    #[test]
    fn detects_cpp_by_streams() {
        let src = "#include <iostream>\nusing namespace std;\nint main() { cout << \"hi\"; }\n";
        assert_eq!(classify(src), Language::Cpp);
    }

    #[test]
    fn main_signature_without_include_is_c_family() {
        assert_eq!(classify("int main() { return 0; }"), Language::C);
    }

    #[test]
    fn java_main_is_not_c() {
        let src = "class A {\n    public static void main(String[] a) {}\n}\n";
        assert_eq!(classify(src), Language::Java);
    }

    #[test]
    fn detects_python() {
        assert_eq!(classify("n = int(input())\nfor i in range(n):\n    print(i)\n"), Language::Python);
        assert_eq!(classify("def solve():\n    pass\n"), Language::Python);
        assert_eq!(classify("import sys\n"), Language::Python);
    }

    #[test]
    fn python_class_is_not_java() {
        let src = "class Solution:\n    def run(self):\n        print('x')\n";
        assert_eq!(classify(src), Language::Python);
    }

    #[test]
    fn detects_javascript() {
        assert_eq!(classify("const n = 5;\nconsole.log(n);\n"), Language::JavaScript);
        assert_eq!(classify("function solve(x) { return x; }"), Language::JavaScript);
    }

    #[test]
    fn detects_java() {
        let src = "import java.util.Scanner;\npublic class Main {\n    public static void main(String[] args) {\n        System.out.println(\"hi\");\n    }\n}\n";
        assert_eq!(classify(src), Language::Java);
    }

    #[test]
    fn empty_and_plain_text_are_unknown() {
        assert_eq!(classify(""), Language::Unknown);
        assert_eq!(classify("   \n"), Language::Unknown);
        assert_eq!(classify("hello world"), Language::Unknown);
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("JS".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for lang in Language::all() {
            assert_eq!(lang.to_string().parse::<Language>().unwrap(), *lang);
        }
    }
}
