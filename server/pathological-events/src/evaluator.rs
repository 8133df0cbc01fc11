//! Core evaluator: classifies repeated events and builds one result per namespace.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::EngineError;
use crate::known_bugs::{self, KnownBug};
use crate::namespaces;
use crate::registry::Registry;
use crate::report::{self, Disposition, Findings};
use crate::suppression::SuppressionIndex;
use crate::types::*;

/// The duplicated-event evaluator. Immutable once built; every call is a pure
/// function of its inputs.
#[derive(Debug, Clone)]
pub struct Evaluator {
  config: Config,
  registry: Registry,
  known_bugs: Vec<KnownBug>,
}

#[derive(Default)]
struct Bucket<'a> {
  rejected: Findings<'a>,
  allowed: Findings<'a>,
}

impl Evaluator {
  pub fn new(config: Config, registry: Registry) -> Self {
    Self {
      config,
      registry,
      known_bugs: Vec::new(),
    }
  }

  /// Default config with the built-in allow-list.
  pub fn with_defaults() -> Result<Self, EngineError> {
    Ok(Self::new(Config::default(), Registry::builtin()?))
  }

  pub fn with_known_bugs(mut self, bugs: Vec<KnownBug>) -> Self {
    self.known_bugs = bugs;
    self
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  /// Evaluate with the configured test name, namespace universe and strictness.
  pub fn run(&self, intervals: &[Interval]) -> Vec<EvaluationResult> {
    self.evaluate(
      &self.config.test_name,
      intervals,
      &self.config.known_namespaces,
      self.config.strict,
    )
  }

  /// One result per namespace in `known_namespaces` plus `""`, ordered by name.
  ///
  /// Events below the duplicate threshold are ignored outright. The rest are
  /// allowed by the registry, excused by the suppression index, allowed by a
  /// known bug (strict mode only), or rejected, in that order.
  pub fn evaluate(
    &self,
    test_name: &str,
    intervals: &[Interval],
    known_namespaces: &[String],
    strict: bool,
  ) -> Vec<EvaluationResult> {
    let universe = namespaces::universe(known_namespaces);
    let run = self.config.run_context();
    let index = SuppressionIndex::build(intervals, self.config.suppression_pad());

    let mut buckets: BTreeMap<&str, Bucket<'_>> = universe
      .iter()
      .map(|ns| (ns.as_str(), Bucket::default()))
      .collect();

    for interval in intervals {
      let count = interval.message.count();
      if count < self.config.duplicate_threshold {
        continue;
      }
      let Some(disposition) = self.classify(interval, &run, &index, strict) else {
        continue;
      };

      // Namespaces outside the universe report under "".
      let key = interval
        .locator
        .namespace()
        .filter(|ns| buckets.contains_key(ns))
        .unwrap_or("");
      let bucket = buckets.entry(key).or_default();
      match disposition {
        Disposition::Reject => bucket.rejected.record(interval, count, disposition),
        Disposition::Allow(_) => bucket.allowed.record(interval, count, disposition),
      }
    }

    buckets
      .iter()
      .map(|(ns, bucket)| {
        report::namespace_result(test_name, ns, &bucket.rejected, &bucket.allowed)
      })
      .collect()
  }

  /// `None` when the event is excused by context and should not be reported.
  fn classify(
    &self,
    interval: &Interval,
    run: &RunContext,
    index: &SuppressionIndex,
    strict: bool,
  ) -> Option<Disposition> {
    let namespace = interval.namespace().name().unwrap_or("");
    let reason = interval.message.reason.as_str();
    let count = interval.message.count();

    if let Some(matcher) = self.registry.matches_any(interval, run) {
      tracing::info!(
        matcher = matcher.name(),
        namespace,
        reason,
        count,
        "repeated event allowed"
      );
      // Cite the tracking issue next to the matcher when there is one.
      let cite = match matcher.jira() {
        Some(jira) => format!("{} {}", matcher.name(), jira),
        None => matcher.name().to_string(),
      };
      return Some(Disposition::Allow(cite));
    }

    if let Some(rule) = index.suppressing_rule(interval) {
      tracing::debug!(
        rule = rule.name(),
        namespace,
        reason,
        count,
        "repeated event suppressed"
      );
      return None;
    }

    if strict {
      if let Some(bug) = known_bugs::find(&self.known_bugs, interval, run) {
        tracing::info!(
          bug = bug.bug(),
          namespace,
          reason,
          count,
          "repeated event has a known bug"
        );
        return Some(Disposition::Allow(bug.bug().to_string()));
      }
    }

    tracing::warn!(namespace, reason, count, "repeated event rejected");
    Some(Disposition::Reject)
  }
}

/// The result for `namespace`.
///
/// # Panics
/// If `namespace` was not part of the evaluated universe.
pub fn result_for<'a>(
  results: &'a [EvaluationResult],
  namespace: &str,
) -> &'a EvaluationResult {
  results
    .iter()
    .find(|r| r.namespace == namespace)
    .unwrap_or_else(|| panic!("namespace {:?} is not in the evaluated universe", namespace))
}
