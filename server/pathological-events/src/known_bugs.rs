//! Deprecated known-bug list: repeated events with an open bug report. Only
//! consulted in strict mode, where a match allows the event and cites the bug.

use regex::Regex;

use crate::error::EngineError;
use crate::report;
use crate::types::{Interval, PlatformType, RunContext, TopologyMode};

#[derive(Debug, Clone)]
pub struct KnownBug {
  pattern: Regex,
  bug: String,
  platform: Option<PlatformType>,
  topology: Option<TopologyMode>,
}

impl KnownBug {
  /// `pattern` is matched against the event summary
  /// (`<namespace-prefix> - reason/<reason> <human message>`).
  pub fn new(pattern: &str, bug: impl Into<String>) -> Result<Self, EngineError> {
    let bug = bug.into();
    let pattern = Regex::new(pattern).map_err(|e| EngineError::pattern(&bug, "known_bug", e))?;
    Ok(Self {
      pattern,
      bug,
      platform: None,
      topology: None,
    })
  }

  pub fn platform(mut self, platform: PlatformType) -> Self {
    self.platform = Some(platform);
    self
  }

  pub fn topology(mut self, topology: TopologyMode) -> Self {
    self.topology = Some(topology);
    self
  }

  pub fn bug(&self) -> &str {
    &self.bug
  }

  pub fn matches(&self, interval: &Interval, run: &RunContext) -> bool {
    if self.platform.is_some_and(|p| p != run.platform) {
      return false;
    }
    if self.topology.is_some_and(|t| run.topology != Some(t)) {
      return false;
    }
    self.pattern.is_match(&report::event_summary(interval))
  }
}

/// First known bug matching the interval.
pub fn find<'a>(
  bugs: &'a [KnownBug],
  interval: &Interval,
  run: &RunContext,
) -> Option<&'a KnownBug> {
  bugs.iter().find(|b| b.matches(interval, run))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::builder::KubeEvent;

  const BUG: &str = "https://bugzilla.redhat.com/show_bug.cgi?id=1234567";

  fn event(reason: &str) -> Interval {
    KubeEvent {
      namespace: Some("e2e"),
      reason,
      message: "foo",
      count: Some(21),
      ..Default::default()
    }
    .build()
  }

  fn aws_sno() -> RunContext {
    RunContext {
      platform: PlatformType::Aws,
      topology: Some(TopologyMode::SingleReplica),
    }
  }

  #[test]
  fn matches_without_platform_or_topology() {
    let bug = KnownBug::new(r"namespace/.* reason/SomeEvent1", BUG).unwrap();
    assert!(bug.matches(&event("SomeEvent1"), &aws_sno()));
  }

  #[test]
  fn topology_must_agree() {
    let sno = KnownBug::new(r"reason/SomeEvent2", BUG)
      .unwrap()
      .topology(TopologyMode::SingleReplica);
    let ha = KnownBug::new(r"reason/SomeEvent2", BUG)
      .unwrap()
      .topology(TopologyMode::HighlyAvailable);
    assert!(sno.matches(&event("SomeEvent2"), &aws_sno()));
    assert!(!ha.matches(&event("SomeEvent2"), &aws_sno()));
  }

  #[test]
  fn platform_must_agree() {
    let aws = KnownBug::new(r"reason/SomeEvent3", BUG).unwrap().platform(PlatformType::Aws);
    let gcp = KnownBug::new(r"reason/SomeEvent3", BUG).unwrap().platform(PlatformType::Gcp);
    assert!(aws.matches(&event("SomeEvent3"), &aws_sno()));
    assert!(!gcp.matches(&event("SomeEvent3"), &aws_sno()));
  }

  #[test]
  fn empty_platform_matches_only_unset() {
    let bug = KnownBug::new(r"reason/SomeEvent6", BUG)
      .unwrap()
      .platform(PlatformType::Unset);
    assert!(bug.matches(&event("SomeEvent6"), &RunContext::default()));
    assert!(!bug.matches(&event("SomeEvent6"), &aws_sno()));
  }

  #[test]
  fn invalid_pattern_rejected() {
    assert!(KnownBug::new("(", BUG).is_err());
  }

  #[test]
  fn find_returns_first() {
    let bugs = vec![
      KnownBug::new(r"SomeEvent1", "first").unwrap(),
      KnownBug::new(r"reason/", "second").unwrap(),
    ];
    let found = find(&bugs, &event("SomeEvent1"), &RunContext::default()).unwrap();
    assert_eq!(found.bug(), "first");
  }
}
