use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::analysis::CodeAnalyzer;
use crate::assessment::{
    self, compare_results, report, AssessmentEngine, AssessmentError, AssessmentInput,
    ResultStore,
};
use crate::cli::{AnalyzeArgs, AssessArgs, Command, CompareArgs};
use crate::config::{ConfigError, GraderConfig};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    User(String),
}

/// Runs CLI commands, writing reports to `out`.
pub struct App<W: Write> {
    config: GraderConfig,
    engine: AssessmentEngine,
    out: W,
}

impl<W: Write> App<W> {
    pub fn new(config: GraderConfig, out: W) -> Self {
        Self {
            config,
            engine: AssessmentEngine::new(),
            out,
        }
    }

    pub fn with_engine(mut self, engine: AssessmentEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn run(&mut self, command: Command) -> Result<(), AppError> {
        match command {
            Command::Assess(opts) => self.handle_assess(opts),
            Command::Analyze(opts) => self.handle_analyze(opts),
            Command::Compare(opts) => self.handle_compare(opts),
        }
    }

    fn handle_assess(&mut self, opts: AssessArgs) -> Result<(), AppError> {
        let config = self
            .config
            .clone()
            .with_overrides(opts.language, opts.pattern_task, opts.strict);

        let json = read_input(&opts.input)?;
        let mut input: AssessmentInput = serde_json::from_str(&json).map_err(|e| {
            AppError::User(format!(
                "Failed to parse assessment input {}: {}",
                opts.input.display(),
                e
            ))
        })?;

        if let Some(code_path) = &opts.code {
            input.raw_code = Some(read_file(code_path)?);
        }
        if opts.language.is_some() {
            input.language = opts.language;
        }
        config.apply_to(&mut input);

        if config.strict {
            input.validate()?;
        } else {
            for issue in input.validation_issues() {
                warn!("{}", issue);
            }
        }

        let result = self.engine.assess(&input);
        if result.rejected {
            info!(
                "Submission rejected: {}",
                result.rejection_reason.as_deref().unwrap_or("hard-coded output")
            );
        } else {
            info!(
                "Graded {} submission: {:.1} ({})",
                result.language, result.normalized_score, result.letter_grade
            );
        }

        let output = report::format_assessment(&result, opts.format.into(), opts.full);
        writeln!(self.out, "{}", output)?;

        if let Some(save_path) = opts.save {
            let store = ResultStore::new(&config.results_dir);
            let path = store.save(&result, save_path.as_deref())?;
            info!("Result saved to: {}", path.display());
        }

        Ok(())
    }

    fn handle_analyze(&mut self, opts: AnalyzeArgs) -> Result<(), AppError> {
        let config = self
            .config
            .clone()
            .with_overrides(opts.language, opts.pattern_task, false);

        let source = read_file(&opts.file)?;
        let analyzer: &CodeAnalyzer = self.engine.analyzer();
        let analysis = analyzer.analyze(&source, config.language, config.pattern_task);
        info!(
            "Analyzed {} as {}",
            opts.file.display(),
            analysis.scan.language
        );

        let output = report::format_analysis(&analysis, opts.format.into());
        writeln!(self.out, "{}", output)?;
        Ok(())
    }

    fn handle_compare(&mut self, opts: CompareArgs) -> Result<(), AppError> {
        let before = assessment::store::load_result(&opts.before).map_err(|e| {
            AppError::User(format!("Failed to load 'before' result: {}", e))
        })?;
        let after = assessment::store::load_result(&opts.after)
            .map_err(|e| AppError::User(format!("Failed to load 'after' result: {}", e)))?;

        let comparison = compare_results(before, after);
        let output = report::format_comparison(&comparison, opts.format.into());
        writeln!(self.out, "{}", output)?;
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path)
        .map_err(|e| AppError::User(format!("Failed to read {}: {}", path.display(), e)))
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String, AppError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        read_file(path)
    }
}
