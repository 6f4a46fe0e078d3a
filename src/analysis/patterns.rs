//! Per-language lexical pattern sets used by the structural scan.
//!
//! These are regex heuristics, not a parser. Every family gets the same set
//! of regexes; `Unknown` gets a generic union so analysis never fails.

use regex::Regex;

use crate::language::{compile, Language};

const DQ: &str = r#""(?:[^"\\\n]|\\.)*""#;
const SQ: &str = r"'(?:[^'\\\n]|\\.)*'";
const TRIPLE_DQ: &str = r#""""(?s:.*?)""""#;
const TRIPLE_SQ: &str = r"'''(?s:.*?)'''";
const TEMPLATE: &str = r"`[^`$]*`";

/// Keywords that look like a call when followed by `(`.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "return", "catch", "do", "sizeof", "new",
];

/// Compiled regexes for one language family.
pub struct LanguagePatterns {
    pub language: Language,
    pub loops: Regex,
    pub declarations: Regex,
    pub input: Regex,
    /// Function or method definitions. An optional `name` group is checked
    /// against control keywords.
    pub functions: Regex,
    pub comments: Regex,
    /// Output calls whose sole argument is a string literal. Each pattern
    /// captures the literal (quotes included) as `lit`.
    pub literal_outputs: Vec<Regex>,
}

impl LanguagePatterns {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::C => Self::c(),
            Language::Cpp => Self::cpp(),
            Language::Python => Self::python(),
            Language::JavaScript => Self::javascript(),
            Language::Java => Self::java(),
            Language::Unknown => Self::generic(),
        }
    }

    fn c() -> Self {
        Self {
            language: Language::C,
            loops: compile(C_LOOPS),
            declarations: compile(C_DECLARATIONS),
            input: compile(C_INPUT),
            functions: compile(C_FUNCTIONS),
            comments: compile(SLASH_COMMENTS),
            literal_outputs: c_outputs(),
        }
    }

    fn cpp() -> Self {
        let mut literal_outputs = c_outputs();
        literal_outputs.push(compile(&format!(
            r"(?:\bstd::)?\bcout\s*<<\s*(?P<lit>{DQ})(?:\s*<<\s*(?:(?:std::)?endl\b|{DQ}|'\\n'))*\s*;"
        )));
        Self {
            language: Language::Cpp,
            loops: compile(C_LOOPS),
            declarations: compile(&format!(
                r"{C_DECLARATIONS}|\b(?:auto|string|std::string)\s+\w+|\b(?:std::)?vector\s*<[^>]*>\s+\w+"
            )),
            input: compile(r"\bcin\s*>>|\bgetline\s*\(|\bscanf\s*\(|\bgetchar\s*\("),
            functions: compile(
                r"(?m)^\s*(?:(?:static|inline|const|unsigned|virtual|extern)\s+)*[\w:]+(?:\s*<[^>]*>)?\s*[\*&]*\s+[\*&]*(?P<name>[\w:]+)\s*\([^;{}\n]*\)\s*(?:const\s*)?\{?\s*$",
            ),
            comments: compile(SLASH_COMMENTS),
            literal_outputs,
        }
    }

    fn python() -> Self {
        Self {
            language: Language::Python,
            loops: compile(PY_LOOPS),
            declarations: compile(PY_DECLARATIONS),
            input: compile(PY_INPUT),
            functions: compile(r"(?m)^\s*(?:async\s+)?def\s+(?P<name>\w+)\s*\("),
            comments: compile(r#"(?m)(?:^|\s)#|^\s*(?:"""|''')"#),
            literal_outputs: python_outputs(),
        }
    }

    fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
            loops: compile(r"\b(?:for|while)\s*\(|\bdo\s*\{|\.forEach\s*\("),
            declarations: compile(JS_DECLARATIONS),
            input: compile(JS_INPUT),
            functions: compile(r"\bfunction\b|=>"),
            comments: compile(SLASH_COMMENTS),
            literal_outputs: js_outputs(),
        }
    }

    fn java() -> Self {
        Self {
            language: Language::Java,
            loops: compile(r"\b(?:for|while)\s*\(|\bdo\s*\{|\.forEach\s*\("),
            declarations: compile(
                r"\b(?:int|long|short|byte|float|double|char|boolean|String|var|Scanner|BufferedReader|StringBuilder)(?:\s*\[\s*\])*\s+\w+\s*(?:=|;|,)|\b[A-Z]\w*\s*<[^>]*>\s+\w+\s*=",
            ),
            input: compile(r"\bScanner\b|\bBufferedReader\b|\bSystem\.in\b|\bargs\s*\["),
            functions: compile(
                r"(?m)^\s*(?:(?:public|private|protected|static|final|abstract|synchronized)\s+)+[\w<>\[\], \t]*?\b(?P<name>\w+)\s*\([^;\n]*\)\s*(?:throws\s+[\w., \t]+)?\{?\s*$",
            ),
            comments: compile(SLASH_COMMENTS),
            literal_outputs: java_outputs(),
        }
    }

    fn generic() -> Self {
        // Most specific receivers first: `System.out.print(` contains `print(`.
        let mut literal_outputs = java_outputs();
        literal_outputs.extend(js_outputs());
        literal_outputs.extend(c_outputs());
        literal_outputs.extend(python_outputs());
        Self {
            language: Language::Unknown,
            loops: compile(r"\b(?:for|while|loop|repeat)\b|\.forEach\s*\("),
            declarations: compile(&format!(
                r"{C_DECLARATIONS}|{JS_DECLARATIONS}|{PY_DECLARATIONS}"
            )),
            input: compile(&format!(r"{C_INPUT}|{PY_INPUT}|{JS_INPUT}|\bScanner\b|\bcin\s*>>")),
            functions: compile(r"\b(?:def|function|fn|func)\s+\w+\s*\(|=>"),
            comments: compile(r"//|/\*|(?m:^\s*#\s)"),
            literal_outputs,
        }
    }

    /// Whether `source` contains at least one function definition.
    pub fn has_function(&self, source: &str) -> bool {
        self.functions.captures_iter(source).any(|caps| match caps.name("name") {
            Some(name) => {
                let base = name.as_str().rsplit("::").next().unwrap_or_default();
                !CONTROL_KEYWORDS.contains(&base)
            }
            None => true,
        })
    }

    /// Byte spans and literal text of every literal-output call in `text`.
    ///
    /// When matches overlap the widest one wins, so a call is never split
    /// into a shorter receiver-less match.
    pub fn literal_output_spans<'t>(&self, text: &'t str) -> Vec<LiteralOutput<'t>> {
        let mut candidates: Vec<LiteralOutput<'t>> = Vec::new();
        for pattern in &self.literal_outputs {
            for caps in pattern.captures_iter(text) {
                let (Some(whole), Some(lit)) = (caps.get(0), caps.name("lit")) else {
                    continue;
                };
                candidates.push(LiteralOutput {
                    start: whole.start(),
                    end: whole.end(),
                    literal: lit.as_str(),
                });
            }
        }

        // Stable sort keeps pattern order among equal widths.
        candidates.sort_by_key(|s| std::cmp::Reverse(s.end - s.start));
        let mut spans: Vec<LiteralOutput<'t>> = Vec::new();
        for candidate in candidates {
            if spans
                .iter()
                .all(|s| candidate.end <= s.start || s.end <= candidate.start)
            {
                spans.push(candidate);
            }
        }
        spans.sort_by_key(|s| s.start);
        spans
    }
}

/// One output call with a string-literal argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOutput<'t> {
    pub start: usize,
    pub end: usize,
    /// The literal including its quotes.
    pub literal: &'t str,
}

impl LiteralOutput<'_> {
    /// Number of non-blank lines baked into the literal, splitting on both
    /// `\n` escapes and real newlines.
    pub fn segment_count(&self) -> usize {
        let body = strip_quotes(self.literal);
        body.replace("\\n", "\n")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count()
    }
}

fn strip_quotes(literal: &str) -> &str {
    for quote in ["\"\"\"", "'''", "\"", "'", "`"] {
        if literal.len() >= 2 * quote.len()
            && literal.starts_with(quote)
            && literal.ends_with(quote)
        {
            return &literal[quote.len()..literal.len() - quote.len()];
        }
    }
    literal
}

const SLASH_COMMENTS: &str = r"//|/\*";

const C_LOOPS: &str = r"\b(?:for|while)\s*\(|\bdo\s*\{";
const C_DECLARATIONS: &str = r"\b(?:int|long|short|float|double|char|unsigned|signed|bool|size_t)\s+\**\s*\w+\s*(?:=|;|,|\[)";
const C_INPUT: &str = r"\b(?:scanf|fscanf|sscanf|fgets|getchar|gets|getline)\s*\(";
const C_FUNCTIONS: &str = r"(?m)^\s*(?:(?:static|inline|const|unsigned|extern)\s+)*(?:int|void|char|float|double|long|short|bool|size_t)\s*\**\s+\**(?P<name>\w+)\s*\([^;{}\n]*\)\s*\{?\s*$";

const PY_LOOPS: &str = r"(?m)^\s*(?:for|while)\b|\bfor\s+\w+(?:\s*,\s*\w+)*\s+in\b";
const PY_DECLARATIONS: &str = r"(?m)^\s*[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*\s*[-+*/%]?=[^=]";
const PY_INPUT: &str = r"\binput\s*\(|\bsys\.stdin\b|\bsys\.argv\b|\bopen\s*\(";

const JS_DECLARATIONS: &str = r"\b(?:var|let|const)\s+[\w{\[]";
const JS_INPUT: &str = r"\breadline\b|\bprocess\.stdin\b|\bprocess\.argv\b|\bprompt\s*\(|\bfs\.readFileSync\s*\(";

fn c_outputs() -> Vec<Regex> {
    vec![compile(&format!(
        r"\b(?:printf|puts)\s*\(\s*(?P<lit>{DQ})\s*\)"
    ))]
}

fn python_outputs() -> Vec<Regex> {
    vec![compile(&format!(
        r"(?:\bprint|\bsys\.stdout\.write)\s*\(\s*(?P<lit>{TRIPLE_DQ}|{TRIPLE_SQ}|{DQ}|{SQ})\s*(?:,\s*(?:end|sep|flush|file)\s*=\s*[^,()]*)*\)"
    ))]
}

fn java_outputs() -> Vec<Regex> {
    vec![compile(&format!(
        r"\bSystem\.out\.(?:println|print|printf)\s*\(\s*(?P<lit>{TRIPLE_DQ}|{DQ})\s*\)"
    ))]
}

fn js_outputs() -> Vec<Regex> {
    vec![compile(&format!(
        r"(?:\bconsole\.(?:log|info)|\bprocess\.stdout\.write|\bdocument\.write)\s*\(\s*(?P<lit>{TEMPLATE}|{DQ}|{SQ})\s*\)"
    ))]
}
