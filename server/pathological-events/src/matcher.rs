//! Declarative matchers that recognize known-acceptable repeated events.
//!
//! A `MatcherSpec` is plain data (serde-friendly); `Matcher::compile` turns it into
//! a predicate with compiled regular expressions. Matching is pure.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{Interval, Locator, Message, PlatformType, RunContext, TopologyMode};

/// A text pattern as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSpec {
  Exact(String),
  Regex(String),
}

impl PatternSpec {
  pub fn exact(s: impl Into<String>) -> Self {
    Self::Exact(s.into())
  }

  pub fn regex(s: impl Into<String>) -> Self {
    Self::Regex(s.into())
  }
}

/// Compiled text pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
  Exact(String),
  Regex(Regex),
}

impl Pattern {
  fn compile(spec: &PatternSpec, matcher: &str, field: &str) -> Result<Self, EngineError> {
    match spec {
      PatternSpec::Exact(s) => Ok(Self::Exact(s.clone())),
      PatternSpec::Regex(s) => Regex::new(s)
        .map(Self::Regex)
        .map_err(|e| EngineError::pattern(matcher, field, e)),
    }
  }

  pub fn is_match(&self, text: &str) -> bool {
    match self {
      Self::Exact(s) => s == text,
      Self::Regex(re) => re.is_match(text),
    }
  }
}

/// Authoring form of a matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherSpec {
  pub name: String,
  /// Patterns on locator keys; every listed key must be present and match.
  #[serde(default)]
  pub locator_keys: BTreeMap<String, PatternSpec>,
  #[serde(default)]
  pub reason: Option<PatternSpec>,
  #[serde(default)]
  pub human_message: Option<PatternSpec>,
  /// Patterns on message annotations; every listed key must be present and match.
  #[serde(default)]
  pub annotations: BTreeMap<String, PatternSpec>,
  #[serde(default)]
  pub platform: Option<PlatformType>,
  #[serde(default)]
  pub topology: Option<TopologyMode>,
  /// Minimum occurrence count for this matcher to apply.
  #[serde(default)]
  pub threshold: Option<u32>,
  /// Tracking issue for why the event is tolerated.
  #[serde(default)]
  pub jira: Option<String>,
}

impl MatcherSpec {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }

  pub fn locator_key(mut self, key: &str, pattern: PatternSpec) -> Self {
    self.locator_keys.insert(key.to_string(), pattern);
    self
  }

  pub fn namespace_regex(self, re: &str) -> Self {
    self.locator_key(crate::types::locator_keys::NAMESPACE, PatternSpec::regex(re))
  }

  pub fn pod_regex(self, re: &str) -> Self {
    self.locator_key(crate::types::locator_keys::POD, PatternSpec::regex(re))
  }

  pub fn reason_exact(mut self, reason: &str) -> Self {
    self.reason = Some(PatternSpec::exact(reason));
    self
  }

  pub fn reason_regex(mut self, re: &str) -> Self {
    self.reason = Some(PatternSpec::regex(re));
    self
  }

  pub fn human_regex(mut self, re: &str) -> Self {
    self.human_message = Some(PatternSpec::regex(re));
    self
  }

  pub fn annotation(mut self, key: &str, pattern: PatternSpec) -> Self {
    self.annotations.insert(key.to_string(), pattern);
    self
  }

  pub fn platform(mut self, platform: PlatformType) -> Self {
    self.platform = Some(platform);
    self
  }

  pub fn topology(mut self, topology: TopologyMode) -> Self {
    self.topology = Some(topology);
    self
  }

  pub fn threshold(mut self, threshold: u32) -> Self {
    self.threshold = Some(threshold);
    self
  }

  pub fn jira(mut self, url: &str) -> Self {
    self.jira = Some(url.to_string());
    self
  }
}

/// A compiled, named predicate over intervals.
#[derive(Debug, Clone)]
pub struct Matcher {
  name: String,
  locator_keys: Vec<(String, Pattern)>,
  reason: Option<Pattern>,
  human_message: Option<Pattern>,
  annotations: Vec<(String, Pattern)>,
  platform: Option<PlatformType>,
  topology: Option<TopologyMode>,
  threshold: Option<u32>,
  jira: Option<String>,
}

impl Matcher {
  pub fn compile(spec: &MatcherSpec) -> Result<Self, EngineError> {
    let name = spec.name.trim();
    if name.is_empty() {
      return Err(EngineError::EmptyMatcherName);
    }

    let locator_keys = spec
      .locator_keys
      .iter()
      .map(|(k, p)| Ok((k.clone(), Pattern::compile(p, name, &format!("locator.{}", k))?)))
      .collect::<Result<Vec<_>, EngineError>>()?;
    let annotations = spec
      .annotations
      .iter()
      .map(|(k, p)| Ok((k.clone(), Pattern::compile(p, name, &format!("annotation.{}", k))?)))
      .collect::<Result<Vec<_>, EngineError>>()?;
    let reason = spec
      .reason
      .as_ref()
      .map(|p| Pattern::compile(p, name, "reason"))
      .transpose()?;
    let human_message = spec
      .human_message
      .as_ref()
      .map(|p| Pattern::compile(p, name, "human_message"))
      .transpose()?;

    Ok(Self {
      name: name.to_string(),
      locator_keys,
      reason,
      human_message,
      annotations,
      platform: spec.platform,
      topology: spec.topology,
      threshold: spec.threshold,
      jira: spec.jira.clone(),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn jira(&self) -> Option<&str> {
    self.jira.as_deref()
  }

  pub fn threshold(&self) -> Option<u32> {
    self.threshold
  }

  /// Platform, topology, locator, message, then threshold, in that order.
  pub fn matches(&self, interval: &Interval, run: &RunContext) -> bool {
    if let Some(platform) = self.platform {
      if platform != run.platform {
        return false;
      }
    }
    if let Some(topology) = self.topology {
      if run.topology != Some(topology) {
        return false;
      }
    }
    if !self.matches_locator(&interval.locator) || !self.matches_message(&interval.message) {
      return false;
    }
    match self.threshold {
      Some(threshold) => interval.message.count() >= threshold,
      None => true,
    }
  }

  pub fn matches_locator(&self, locator: &Locator) -> bool {
    self
      .locator_keys
      .iter()
      .all(|(key, pattern)| locator.get(key).is_some_and(|v| pattern.is_match(v)))
  }

  pub fn matches_message(&self, message: &Message) -> bool {
    if let Some(reason) = &self.reason {
      if !reason.is_match(&message.reason) {
        return false;
      }
    }
    if let Some(human) = &self.human_message {
      if !human.is_match(&message.human_message) {
        return false;
      }
    }
    self
      .annotations
      .iter()
      .all(|(key, pattern)| message.annotation(key).is_some_and(|v| pattern.is_match(v)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::builder::KubeEvent;
  use crate::types::locator_keys;

  fn port_forward_matcher() -> Matcher {
    Matcher::compile(
      &MatcherSpec::named("UnhealthyE2EPortForwarding")
        .namespace_regex(r"^e2e-port-forwarding-[0-9]+$")
        .pod_regex(r"^pfpod$")
        .reason_exact("Unhealthy"),
    )
    .unwrap()
  }

  fn event(ns: Option<&str>, reason: &str, count: u32) -> Interval {
    KubeEvent {
      namespace: ns,
      pod: Some("pfpod"),
      reason,
      message: "Readiness probe failed: boom",
      count: Some(count),
      ..Default::default()
    }
    .build()
  }

  #[test]
  fn matches_locator_and_reason() {
    let m = port_forward_matcher();
    let run = RunContext::default();
    assert!(m.matches(&event(Some("e2e-port-forwarding-588"), "Unhealthy", 30), &run));
    assert!(!m.matches(&event(Some("e2e-port-forwarding-588"), "BackOff", 30), &run));
    assert!(!m.matches(&event(Some("openshift-dns"), "Unhealthy", 30), &run));
  }

  #[test]
  fn absent_key_never_matches_even_permissive_pattern() {
    let m = Matcher::compile(
      &MatcherSpec::named("AnyNamespace")
        .locator_key(locator_keys::NAMESPACE, PatternSpec::regex(".*")),
    )
    .unwrap();
    let run = RunContext::default();
    assert!(!m.matches(&event(None, "Unhealthy", 30), &run));
    assert!(m.matches(&event(Some(""), "Unhealthy", 30), &run));
  }

  #[test]
  fn empty_platform_matches_only_unset_platform() {
    let m =
      Matcher::compile(&MatcherSpec::named("NoPlatform").platform(PlatformType::Unset)).unwrap();
    let interval = event(Some("e2e"), "SomeEvent6", 21);
    assert!(m.matches(&interval, &RunContext::default()));
    assert!(!m.matches(
      &interval,
      &RunContext {
        platform: PlatformType::Aws,
        topology: None,
      }
    ));
  }

  #[test]
  fn topology_requires_equality() {
    let m =
      Matcher::compile(&MatcherSpec::named("SNO").topology(TopologyMode::SingleReplica)).unwrap();
    let interval = event(Some("e2e"), "SomeEvent2", 21);
    let sno = RunContext {
      platform: PlatformType::Aws,
      topology: Some(TopologyMode::SingleReplica),
    };
    let ha = RunContext {
      topology: Some(TopologyMode::HighlyAvailable),
      ..sno
    };
    assert!(m.matches(&interval, &sno));
    assert!(!m.matches(&interval, &ha));
    assert!(!m.matches(&interval, &RunContext::default()));
  }

  #[test]
  fn threshold_is_a_minimum() {
    let spec = MatcherSpec::named("Loud").reason_exact("Unhealthy").threshold(50);
    let m = Matcher::compile(&spec).unwrap();
    let run = RunContext::default();
    assert!(!m.matches(&event(Some("ns"), "Unhealthy", 49), &run));
    assert!(m.matches(&event(Some("ns"), "Unhealthy", 50), &run));
  }

  #[test]
  fn annotation_patterns_apply() {
    let m = Matcher::compile(
      &MatcherSpec::named("Constructed")
        .annotation("constructed", PatternSpec::exact("pod-lifecycle-constructor")),
    )
    .unwrap();
    let mut interval = event(Some("ns"), "Ready", 1);
    assert!(!m.matches(&interval, &RunContext::default()));
    interval
      .message
      .annotations
      .insert("constructed".into(), "pod-lifecycle-constructor".into());
    assert!(m.matches(&interval, &RunContext::default()));
  }

  #[test]
  fn invalid_regex_rejected_with_field() {
    let err = Matcher::compile(&MatcherSpec::named("Broken").human_regex("(unclosed")).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Broken"), "{}", text);
    assert!(text.contains("human_message"), "{}", text);
  }

  #[test]
  fn empty_name_rejected() {
    assert!(matches!(
      Matcher::compile(&MatcherSpec::named("  ")),
      Err(EngineError::EmptyMatcherName)
    ));
  }

  #[test]
  fn spec_deserializes_from_json() {
    let json = r#"{
      "name": "BackOffPullingWebserverImage404",
      "locator_keys": {"namespace": {"regex": "^e2e-deployment-[0-9]+$"}},
      "reason": {"exact": "BackOff"},
      "human_message": {"regex": "Back-off pulling image \"webserver:404\""}
    }"#;
    let spec: MatcherSpec = serde_json::from_str(json).unwrap();
    let m = Matcher::compile(&spec).unwrap();
    let interval = KubeEvent {
      namespace: Some("e2e-deployment-478"),
      pod: Some("webserver-deployment-795d758f88-fdr4d "),
      reason: "BackOff",
      message: "Back-off pulling image \"webserver:404\"",
      count: Some(25),
      ..Default::default()
    }
    .build();
    assert!(m.matches(&interval, &RunContext::default()));
  }
}
