//! Stable identity for repeated reports of the same event.

use std::fmt;

use crate::types::{Interval, NamespaceOrigin};

/// A stable hex string identifying one logical event, independent of its count
/// and time window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub String);

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Key components: namespace origin + locator keys + reason + display text.
/// Uses blake3 for a fast, deterministic hash.
pub fn compute(interval: &Interval) -> Fingerprint {
  let mut hasher = blake3::Hasher::new();
  match interval.namespace() {
    NamespaceOrigin::Locator(ns) => {
      hasher.update(b"L:");
      hasher.update(ns.as_bytes());
    }
    NamespaceOrigin::Inferred(ns) => {
      hasher.update(b"I:");
      hasher.update(ns.as_bytes());
    }
    NamespaceOrigin::Absent => {
      hasher.update(b"-");
    }
  }
  // BTreeMap iteration is key-ordered, so the hash is stable.
  for (k, v) in &interval.locator.keys {
    hasher.update(b"|");
    hasher.update(k.as_bytes());
    hasher.update(b"=");
    hasher.update(v.as_bytes());
  }
  hasher.update(b"|");
  hasher.update(interval.message.reason.as_bytes());
  hasher.update(b"|");
  hasher.update(interval.message.display_text().as_bytes());

  let hex = hasher.finalize().to_hex();
  Fingerprint(hex[..32].to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::builder::KubeEvent;
  use chrono::{Duration, TimeZone, Utc};

  fn event(ns: Option<&str>, human: &str, count: u32, minute: i64) -> Interval {
    let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap() + Duration::minutes(minute);
    KubeEvent {
      namespace: ns,
      reason: "ProbeError",
      message: human,
      count: Some(count),
      from: Some(at),
      ..Default::default()
    }
    .build()
  }

  #[test]
  fn count_and_time_do_not_change_fingerprint() {
    let a = event(Some("openshift-etcd"), "Liveness probe error", 22, 0);
    let b = event(Some("openshift-etcd"), "Liveness probe error", 25, 7);
    assert_eq!(compute(&a), compute(&b));
  }

  #[test]
  fn trailing_whitespace_ignored() {
    let a = event(Some("openshift-etcd"), "Liveness probe error ", 22, 0);
    let b = event(Some("openshift-etcd"), "Liveness probe error", 22, 0);
    assert_eq!(compute(&a), compute(&b));
  }

  #[test]
  fn namespace_changes_fingerprint() {
    let a = event(Some("openshift-etcd"), "Liveness probe error", 22, 0);
    let b = event(Some("openshift-dns"), "Liveness probe error", 22, 0);
    let c = event(None, "Liveness probe error", 22, 0);
    assert_ne!(compute(&a), compute(&b));
    assert_ne!(compute(&a), compute(&c));
  }

  #[test]
  fn fingerprint_is_32_hex_chars() {
    let fp = compute(&event(None, "x", 1, 0));
    assert_eq!(fp.0.len(), 32);
    assert!(fp.0.chars().all(|c| c.is_ascii_hexdigit()));
  }
}
