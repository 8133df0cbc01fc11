//! Rendering of per-namespace results. The failure text is parsed downstream,
//! so its layout is fixed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::fingerprint::{self, Fingerprint};
use crate::types::{EvaluationResult, FailureOutput, Interval};

/// How an evaluated event was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
  /// Tolerated; cites the matcher name or bug reference.
  Allow(String),
  Reject,
}

impl Disposition {
  pub fn result(&self) -> &'static str {
    match self {
      Self::Allow(_) => "allow",
      Self::Reject => "reject",
    }
  }
}

#[derive(Debug, Clone)]
pub struct Finding<'a> {
  pub interval: &'a Interval,
  pub count: u32,
  pub disposition: Disposition,
}

impl Finding<'_> {
  pub fn line(&self) -> String {
    event_line(self.interval, self.count, &self.disposition)
  }
}

/// Findings in first-seen order; repeats of one event keep the highest count.
#[derive(Debug, Clone, Default)]
pub struct Findings<'a> {
  items: Vec<Finding<'a>>,
  index: HashMap<Fingerprint, usize>,
}

impl<'a> Findings<'a> {
  pub fn record(&mut self, interval: &'a Interval, count: u32, disposition: Disposition) {
    let fp = fingerprint::compute(interval);
    match self.index.get(&fp) {
      Some(&i) => {
        if count > self.items[i].count {
          self.items[i] = Finding {
            interval,
            count,
            disposition,
          };
        }
      }
      None => {
        self.index.insert(fp, self.items.len());
        self.items.push(Finding {
          interval,
          count,
          disposition,
        });
      }
    }
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Finding<'a>> {
    self.items.iter()
  }

  pub fn lines(&self) -> Vec<String> {
    self.items.iter().map(Finding::line).collect()
  }
}

/// `HH:MM:SSZ`
pub fn clock(ts: &DateTime<Utc>) -> String {
  ts.format("%H:%M:%SZ").to_string()
}

/// `<namespace-prefix> - reason/<reason> <human message>`
pub fn event_summary(interval: &Interval) -> String {
  format!(
    "{} - reason/{} {}",
    interval.namespace().prefix(),
    interval.message.reason,
    interval.message.display_text()
  )
}

/// One report line. Multi-line human messages keep the single-line field order.
pub fn event_line(interval: &Interval, count: u32, disposition: &Disposition) -> String {
  let cite = match disposition {
    Disposition::Allow(by) => format!(" - {}", by),
    Disposition::Reject => String::new(),
  };
  format!(
    "event happened {} times, something is wrong: {} From: {} To: {}{} result={} ",
    count,
    event_summary(interval),
    clock(&interval.from),
    clock(&interval.to),
    cite,
    disposition.result()
  )
}

pub fn failure_output(lines: &[String]) -> String {
  format!(
    "{} events happened too frequently\n\n{}",
    lines.len(),
    lines.join("\n")
  )
}

pub fn allowed_output(lines: &[String]) -> String {
  format!("{} events were allowed\n\n{}", lines.len(), lines.join("\n"))
}

pub fn result_name(test_name: &str, namespace: &str) -> String {
  format!("{}:{}", test_name, namespace)
}

/// Package one namespace's findings. Any rejection fails the result; allowed
/// events only go to `system_out`.
pub fn namespace_result(
  test_name: &str,
  namespace: &str,
  rejected: &Findings<'_>,
  allowed: &Findings<'_>,
) -> EvaluationResult {
  let failure_output = (!rejected.is_empty()).then(|| FailureOutput {
    output: failure_output(&rejected.lines()),
  });
  let system_out = (!allowed.is_empty()).then(|| allowed_output(&allowed.lines()));
  EvaluationResult {
    name: result_name(test_name, namespace),
    namespace: namespace.to_string(),
    passed: failure_output.is_none(),
    failure_output,
    system_out,
  }
}
