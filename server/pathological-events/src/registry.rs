//! Ordered allow-list of matchers. The first matcher that accepts an event wins.

use std::collections::HashSet;

use crate::allowlist;
use crate::error::EngineError;
use crate::matcher::{Matcher, MatcherSpec};
use crate::types::{Interval, RunContext};

/// Immutable, ordered matcher collection. Names are unique.
#[derive(Debug, Clone)]
pub struct Registry {
  matchers: Vec<Matcher>,
}

impl Registry {
  /// Build from compiled matchers, keeping their order. Duplicate names are rejected.
  pub fn new(matchers: Vec<Matcher>) -> Result<Self, EngineError> {
    let mut seen = HashSet::new();
    for m in &matchers {
      if !seen.insert(m.name().to_string()) {
        return Err(EngineError::DuplicateMatcher(m.name().to_string()));
      }
    }
    Ok(Self { matchers })
  }

  pub fn from_specs(specs: &[MatcherSpec]) -> Result<Self, EngineError> {
    let matchers = specs
      .iter()
      .map(Matcher::compile)
      .collect::<Result<Vec<_>, _>>()?;
    Self::new(matchers)
  }

  /// The built-in allow-list of known repeated events.
  pub fn builtin() -> Result<Self, EngineError> {
    Self::from_specs(&allowlist::allowed_repeated_events())
  }

  /// First matcher that accepts the interval, if any.
  pub fn matches_any(&self, interval: &Interval, run: &RunContext) -> Option<&Matcher> {
    self.matchers.iter().find(|m| m.matches(interval, run))
  }

  pub fn get(&self, name: &str) -> Option<&Matcher> {
    self.matchers.iter().find(|m| m.name() == name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Matcher> {
    self.matchers.iter()
  }

  pub fn len(&self) -> usize {
    self.matchers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.matchers.is_empty()
  }
}
