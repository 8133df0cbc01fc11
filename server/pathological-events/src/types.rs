//! Core types for the evaluator (interval model, run context, JSON contracts).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Well-known keys
// ---------------------------------------------------------------------------

/// Locator keys with a fixed meaning. Any other key is an extension key.
pub mod locator_keys {
  pub const NAMESPACE: &str = "namespace";
  pub const POD: &str = "pod";
  pub const NODE: &str = "node";
  pub const CONTAINER: &str = "container";
  pub const E2E_TEST: &str = "e2e-test";
  /// Short hash of the originating message, set by the collector for deduplicated events.
  pub const HMSG: &str = "hmsg";
}

/// Reserved message annotation keys.
pub mod annotations {
  /// Occurrence count, string-encoded positive integer.
  pub const COUNT: &str = "count";
  pub const PATHOLOGICAL: &str = "pathological";
  pub const CONSTRUCTED: &str = "constructed";
  pub const PHASE: &str = "phase";
  pub const ROLES: &str = "roles";
  pub const REASON: &str = "reason";
  /// Namespace known to the producer when the locator carries none.
  pub const NAMESPACE: &str = "namespace";
}

/// Reasons the suppression rules key on.
pub mod reasons {
  pub const NODE_UPDATE: &str = "NodeUpdate";
  pub const GRACEFUL_DELETE_STARTED: &str = "GracefulDelete";
  pub const CONTAINER_READY: &str = "Ready";
  pub const FAILED_SCHEDULING: &str = "FailedScheduling";
  pub const TOPOLOGY_AWARE_HINTS_DISABLED: &str = "TopologyAwareHintsDisabled";
}

// ---------------------------------------------------------------------------
// Severity / source / locator type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  #[default]
  Info,
  Warning,
  Error,
}

impl Severity {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "info" | "i" => Some(Self::Info),
      "warning" | "warn" | "w" => Some(Self::Warning),
      "error" | "err" | "e" => Some(Self::Error),
      _ => None,
    }
  }

  /// Single-letter form used in legacy interval lines.
  pub fn letter(self) -> char {
    match self {
      Self::Info => 'I',
      Self::Warning => 'W',
      Self::Error => 'E',
    }
  }
}

/// Which producer observed the interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
  KubeEvent,
  NodeState,
  PodState,
  E2ETest,
  #[default]
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorType {
  Node,
  Pod,
  Container,
  E2ETest,
  #[default]
  #[serde(rename = "")]
  Unspecified,
  #[serde(other)]
  Other,
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Sparse identifying tags of an interval. A missing key is not the same as an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
  #[serde(default, rename = "type")]
  pub kind: LocatorType,
  #[serde(default)]
  pub keys: BTreeMap<String, String>,
}

impl Locator {
  pub fn new(kind: LocatorType) -> Self {
    Self {
      kind,
      keys: BTreeMap::new(),
    }
  }

  pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.keys.insert(key.into(), value.into());
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.keys.get(key).map(String::as_str)
  }

  pub fn namespace(&self) -> Option<&str> {
    self.get(locator_keys::NAMESPACE)
  }

  /// `key/value` pairs in key order, space separated. E2E test names are quoted.
  pub fn legacy_display(&self) -> String {
    self
      .keys
      .iter()
      .map(|(k, v)| {
        if k == locator_keys::E2E_TEST {
          format!("{}/{:?}", k, v)
        } else {
          format!("{}/{}", k, v)
        }
      })
      .collect::<Vec<_>>()
      .join(" ")
  }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  #[serde(default)]
  pub reason: String,
  #[serde(default)]
  pub human_message: String,
  #[serde(default)]
  pub annotations: BTreeMap<String, String>,
}

impl Message {
  pub fn annotation(&self, key: &str) -> Option<&str> {
    self.annotations.get(key).map(String::as_str)
  }

  /// Occurrence count. Falls back to a trailing `(N times)` in the human message when
  /// the count annotation is absent; anything malformed counts once.
  pub fn count(&self) -> u32 {
    match self.annotation(annotations::COUNT) {
      Some(raw) => parse_count(raw).unwrap_or(1),
      None => split_legacy_repeat(&self.human_message).1.unwrap_or(1),
    }
  }

  /// Human text as shown in reports: trimmed, legacy repeat suffix removed.
  pub fn display_text(&self) -> &str {
    if self.annotations.contains_key(annotations::COUNT) {
      self.human_message.trim()
    } else {
      split_legacy_repeat(&self.human_message).0.trim()
    }
  }

  /// Annotations as `key/value` in key order, followed by the human text.
  pub fn legacy_display(&self) -> String {
    let human = self.human_message.trim();
    if self.annotations.is_empty() {
      return human.to_string();
    }
    let annotations = self
      .annotations
      .iter()
      .map(|(k, v)| format!("{}/{}", k, v))
      .collect::<Vec<_>>()
      .join(" ");
    format!("{} {}", annotations, human)
  }
}

/// Positive decimal count; values beyond `u32::MAX` saturate.
fn parse_count(raw: &str) -> Option<u32> {
  raw
    .trim()
    .parse::<u64>()
    .ok()
    .filter(|n| *n > 0)
    .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Split `"text (N times)"` into `("text", Some(N))`.
fn split_legacy_repeat(text: &str) -> (&str, Option<u32>) {
  let trimmed = text.trim_end();
  if let Some(head) = trimmed.strip_suffix(" times)") {
    if let Some(open) = head.rfind('(') {
      if let Some(n) = parse_count(&head[open + 1..]) {
        return (head[..open].trim_end(), Some(n));
      }
    }
  }
  (trimmed, None)
}

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// One observed event. `from <= to`; equal bounds mean an instantaneous event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
  #[serde(default)]
  pub level: Severity,
  #[serde(default)]
  pub source: Source,
  #[serde(default)]
  pub locator: Locator,
  #[serde(default)]
  pub message: Message,
  pub from: DateTime<Utc>,
  pub to: DateTime<Utc>,
}

impl Interval {
  /// Where this interval's namespace comes from, if anywhere.
  pub fn namespace(&self) -> NamespaceOrigin<'_> {
    if let Some(ns) = self.locator.namespace() {
      NamespaceOrigin::Locator(ns)
    } else if let Some(ns) = self.message.annotation(annotations::NAMESPACE) {
      NamespaceOrigin::Inferred(ns)
    } else {
      NamespaceOrigin::Absent
    }
  }

  /// `<level> <locator> <message>` as printed by the legacy monitor.
  pub fn legacy_line(&self) -> String {
    format!(
      "{} {} {}",
      self.level.letter(),
      self.locator.legacy_display(),
      self.message.legacy_display()
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceOrigin<'a> {
  /// Explicit `namespace` locator key.
  Locator(&'a str),
  /// No locator key, but the message names the namespace.
  Inferred(&'a str),
  Absent,
}

impl<'a> NamespaceOrigin<'a> {
  pub fn name(self) -> Option<&'a str> {
    match self {
      Self::Locator(ns) | Self::Inferred(ns) => Some(ns),
      Self::Absent => None,
    }
  }

  /// Report prefix: `namespace/<ns>`, `ns/<ns>`, or empty.
  pub fn prefix(self) -> String {
    match self {
      Self::Locator(ns) => format!("namespace/{}", ns),
      Self::Inferred(ns) => format!("ns/{}", ns),
      Self::Absent => String::new(),
    }
  }
}

// ---------------------------------------------------------------------------
// Run context (platform / topology)
// ---------------------------------------------------------------------------

/// Infrastructure provider of the run. `Unset` is the empty platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformType {
  #[serde(rename = "AWS")]
  Aws,
  Azure,
  BareMetal,
  #[serde(rename = "GCP")]
  Gcp,
  #[serde(rename = "IBMCloud")]
  IbmCloud,
  Libvirt,
  OpenStack,
  #[serde(rename = "VSphere")]
  VSphere,
  #[serde(rename = "oVirt")]
  OVirt,
  Nutanix,
  PowerVS,
  External,
  #[default]
  #[serde(rename = "")]
  Unset,
}

impl PlatformType {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "aws" => Some(Self::Aws),
      "azure" => Some(Self::Azure),
      "baremetal" | "metal" => Some(Self::BareMetal),
      "gcp" => Some(Self::Gcp),
      "ibmcloud" => Some(Self::IbmCloud),
      "libvirt" => Some(Self::Libvirt),
      "openstack" => Some(Self::OpenStack),
      "vsphere" => Some(Self::VSphere),
      "ovirt" => Some(Self::OVirt),
      "nutanix" => Some(Self::Nutanix),
      "powervs" => Some(Self::PowerVS),
      "external" => Some(Self::External),
      "" => Some(Self::Unset),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyMode {
  SingleReplica,
  HighlyAvailable,
  External,
}

impl TopologyMode {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "singlereplica" | "single-replica" | "sno" => Some(Self::SingleReplica),
      "highlyavailable" | "highly-available" | "ha" => Some(Self::HighlyAvailable),
      "external" => Some(Self::External),
      _ => None,
    }
  }
}

/// Run-level classification that scopes matchers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunContext {
  pub platform: PlatformType,
  pub topology: Option<TopologyMode>,
}

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the collector sends)
// ---------------------------------------------------------------------------

/// One inbound interval line from stdin. Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundInterval {
  #[serde(default)]
  pub level: Option<String>,
  #[serde(default)]
  pub source: Source,
  #[serde(default)]
  pub locator: Locator,
  #[serde(default)]
  pub message: Message,
  pub from: String,
  #[serde(default)]
  pub to: Option<String>,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureOutput {
  pub output: String,
}

/// One report unit, JUnit-style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
  pub name: String,
  pub namespace: String,
  pub passed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub failure_output: Option<FailureOutput>,
  /// Allowed events, informational only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub system_out: Option<String>,
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub line: Option<usize>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
      line: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }

  pub fn at_line(mut self, line: usize) -> Self {
    self.line = Some(line);
    self
  }
}
