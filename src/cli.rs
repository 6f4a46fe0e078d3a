use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::assessment::report;
use crate::language::Language;

/// Command line interface definition for code-grader.
#[derive(Parser, Debug)]
#[command(name = "code-grader")]
#[command(about = "Grade code submissions with a weighted rubric and reject hard-coded output")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Command selected by CLI parsing.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Grade an assessment input (JSON)
    Assess(AssessArgs),
    /// Analyze a source file's structure and check for hard-coded output
    Analyze(AnalyzeArgs),
    /// Compare two saved results
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AssessArgs {
    /// Assessment input JSON file ("-" for stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Source file to use as rawCode (overrides the input's rawCode)
    #[arg(short, long, value_name = "FILE")]
    pub code: Option<PathBuf>,

    /// Force the submission language instead of detecting it
    #[arg(short, long, value_parser = parse_language)]
    pub language: Option<Language>,

    /// Treat the submission as a pattern-printing task
    #[arg(long)]
    pub pattern_task: bool,

    /// Fail on out-of-range input instead of clamping
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Include per-metric details
    #[arg(long)]
    pub full: bool,

    /// Save the result (to PATH, or a timestamped file in the results directory)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub save: Option<Option<PathBuf>>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Source file to analyze
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Force the language instead of detecting it
    #[arg(short, long, value_parser = parse_language)]
    pub language: Option<Language>,

    /// Treat the source as a pattern-printing task
    #[arg(long)]
    pub pattern_task: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Earlier result JSON
    pub before: PathBuf,

    /// Later result JSON
    pub after: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// Markdown report
    Markdown,
    /// Single summary line
    Compact,
}

impl From<OutputFormat> for report::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Pretty => report::OutputFormat::Pretty,
            OutputFormat::Json => report::OutputFormat::Json,
            OutputFormat::Markdown => report::OutputFormat::Markdown,
            OutputFormat::Compact => report::OutputFormat::Compact,
        }
    }
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assess_with_save_path() {
        let cli = Cli::parse_from([
            "code-grader",
            "-vv",
            "assess",
            "--input",
            "in.json",
            "--language",
            "c++",
            "--save",
            "out.json",
        ]);
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Command::Assess(args) => {
                assert_eq!(args.language, Some(Language::Cpp));
                assert_eq!(args.save, Some(Some(PathBuf::from("out.json"))));
                assert_eq!(args.format, OutputFormat::Pretty);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn bare_save_uses_default_location() {
        let cli = Cli::parse_from(["code-grader", "assess", "-i", "in.json", "--save"]);
        match cli.command {
            Command::Assess(args) => assert_eq!(args.save, Some(None)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parses_analyze_and_compare() {
        let cli = Cli::parse_from(["code-grader", "analyze", "main.py", "--pattern-task", "-f", "json"]);
        match cli.command {
            Command::Analyze(args) => {
                assert!(args.pattern_task);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["code-grader", "-q", "compare", "a.json", "b.json"]);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Compare(_)));
    }

    #[test]
    fn unknown_language_is_a_parse_error() {
        let result = Cli::try_parse_from(["code-grader", "analyze", "x.src", "--language", "cobol"]);
        assert!(result.is_err());
    }
}
