//! Structured error types for the pathological event evaluator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("matcher {name}: invalid {field} pattern: {source}")]
  Pattern {
    name: String,
    field: String,
    #[source]
    source: regex::Error,
  },

  #[error("matcher name must not be empty")]
  EmptyMatcherName,

  #[error("duplicate matcher name: {0}")]
  DuplicateMatcher(String),

  #[error("config: {key}: {reason}")]
  Config { key: String, reason: String },
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn pattern(name: &str, field: &str, source: regex::Error) -> Self {
    Self::Pattern {
      name: name.to_string(),
      field: field.to_string(),
      source,
    }
  }

  pub fn config(key: &str, reason: impl Into<String>) -> Self {
    Self::Config {
      key: key.to_string(),
      reason: reason.into(),
    }
  }
}
