//! Probe-style grouped test: one pass/fail result for a single operator
//! namespace and a single matcher.

use std::collections::HashMap;

use crate::fingerprint::{self, Fingerprint};
use crate::matcher::Matcher;
use crate::types::{EvaluationResult, FailureOutput, Interval, RunContext};

/// Intervals in `operator`'s namespace that `matcher` matches with a count at
/// or above `threshold`. Repeats of the same event collapse into the one with
/// the highest count.
pub fn make_probe_test(
  test_name: &str,
  intervals: &[Interval],
  operator: &str,
  matcher: &Matcher,
  threshold: u32,
) -> EvaluationResult {
  let run = RunContext::default();
  let mut order: Vec<Fingerprint> = Vec::new();
  let mut worst: HashMap<Fingerprint, &Interval> = HashMap::new();

  for interval in intervals {
    if interval.locator.namespace() != Some(operator) {
      continue;
    }
    if interval.message.count() < threshold || !matcher.matches(interval, &run) {
      continue;
    }
    let fp = fingerprint::compute(interval);
    match worst.get_mut(&fp) {
      Some(seen) => {
        if interval.message.count() > seen.message.count() {
          *seen = interval;
        }
      }
      None => {
        order.push(fp.clone());
        worst.insert(fp, interval);
      }
    }
  }

  let failure_output = (!order.is_empty()).then(|| {
    let mut output = format!("{} events above threshold\n\n", order.len());
    for fp in &order {
      output.push_str(&worst[fp].legacy_line());
      output.push('\n');
    }
    tracing::warn!(
      operator,
      matcher = matcher.name(),
      events = order.len(),
      "probe events above threshold"
    );
    FailureOutput { output }
  });

  EvaluationResult {
    name: test_name.to_string(),
    namespace: operator.to_string(),
    passed: failure_output.is_none(),
    failure_output,
    system_out: None,
  }
}
