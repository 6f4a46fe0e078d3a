//! Grader configuration from environment variables and CLI overrides.
//!
//! The engine itself is configuration-free; these settings only fill in
//! input defaults and storage locations at the application layer.

use std::env;
use std::path::PathBuf;

use log::warn;
use thiserror::Error;

use crate::assessment::store::DEFAULT_RESULTS_DIR;
use crate::assessment::AssessmentInput;
use crate::language::Language;

pub const ENV_PATTERN_TASK: &str = "CODE_GRADER_PATTERN_TASK";
pub const ENV_LANGUAGE: &str = "CODE_GRADER_LANGUAGE";
pub const ENV_STRICT: &str = "CODE_GRADER_STRICT";
pub const ENV_RESULTS_DIR: &str = "CODE_GRADER_RESULTS_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    InvalidValue { var: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraderConfig {
    /// Treat every submission as a pattern-generation task.
    pub pattern_task: bool,
    /// Force a language instead of classifying the source.
    pub language: Option<Language>,
    /// Abort on inputs that fail validation instead of clamping.
    pub strict: bool,
    pub results_dir: PathBuf,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            pattern_task: false,
            language: None,
            strict: false,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
        }
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

impl GraderConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CODE_GRADER_PATTERN_TASK` - mark inputs as pattern tasks (bool)
    /// - `CODE_GRADER_LANGUAGE` - force a language (c, cpp, python, javascript, java)
    /// - `CODE_GRADER_STRICT` - reject invalid inputs (bool)
    /// - `CODE_GRADER_RESULTS_DIR` - where saved results go
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let flag = |var: &str| -> Option<bool> {
            let value = lookup(var)?;
            match parse_bool(var, &value) {
                Ok(b) => Some(b),
                Err(e) => {
                    warn!("ignoring {}", e);
                    None
                }
            }
        };

        if let Some(b) = flag(ENV_PATTERN_TASK) {
            config.pattern_task = b;
        }
        if let Some(b) = flag(ENV_STRICT) {
            config.strict = b;
        }
        if let Some(value) = lookup(ENV_LANGUAGE) {
            match value.parse::<Language>() {
                Ok(lang) => config.language = Some(lang),
                Err(e) => warn!("ignoring {}: {}", ENV_LANGUAGE, e),
            }
        }
        if let Some(dir) = lookup(ENV_RESULTS_DIR).filter(|d| !d.trim().is_empty()) {
            config.results_dir = PathBuf::from(dir);
        }

        config
    }

    pub fn with_pattern_task(mut self, pattern_task: bool) -> Self {
        self.pattern_task = pattern_task;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Merge with CLI overrides. CLI values take precedence; flags can only
    /// switch a setting on.
    pub fn with_overrides(
        mut self,
        language: Option<Language>,
        pattern_task: bool,
        strict: bool,
    ) -> Self {
        if let Some(lang) = language {
            self.language = Some(lang);
        }
        self.pattern_task |= pattern_task;
        self.strict |= strict;
        self
    }

    /// Fill input fields the caller left unset.
    pub fn apply_to(&self, input: &mut AssessmentInput) {
        input.pattern_task |= self.pattern_task;
        if input.language.is_none() {
            input.language = self.language;
        }
    }
}
