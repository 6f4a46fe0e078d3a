pub mod analysis;
pub mod app;
pub mod assessment;
pub mod cli;
pub mod config;
pub mod language;

pub use assessment::{assess, AssessmentEngine, AssessmentInput, AssessmentResult};

#[cfg(test)]
pub mod test_utils;
