//! Contextual suppression: events that are noisy only because something else was
//! happening at the same time.
//!
//! The index is built in one pass over the full interval set. Containment is
//! inclusive on both ends and widened by `pad` to absorb clock skew between
//! producers.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::types::{annotations, locator_keys, reasons, Interval, LocatorType};

/// Closed time range taken from an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub from: DateTime<Utc>,
  pub to: DateTime<Utc>,
}

impl Window {
  pub fn of(interval: &Interval) -> Self {
    Self {
      from: interval.from,
      to: interval.to,
    }
  }

  pub fn covers(&self, other: &Window, pad: Duration) -> bool {
    self.from - pad <= other.from && other.to <= self.to + pad
  }

  pub fn contains(&self, at: DateTime<Utc>, pad: Duration) -> bool {
    self.from - pad <= at && at <= self.to + pad
  }
}

/// Why an event was excused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionRule {
  /// `FailedScheduling` in a platform namespace while control plane nodes update.
  MasterNodeUpdate,
  /// `TopologyAwareHintsDisabled` while a pod evicted by a taint test comes back.
  TaintTestEndpointRecovery,
}

impl SuppressionRule {
  pub fn name(self) -> &'static str {
    match self {
      Self::MasterNodeUpdate => "MasterNodeUpdate",
      Self::TaintTestEndpointRecovery => "TaintTestEndpointRecovery",
    }
  }
}

#[derive(Debug, Clone)]
struct E2eTest {
  name: String,
  window: Window,
}

#[derive(Debug, Clone)]
struct PodDeletion {
  pod: String,
  window: Window,
}

#[derive(Debug, Clone)]
pub struct SuppressionIndex {
  pad: Duration,
  master_updates: Vec<Window>,
  e2e_tests: Vec<E2eTest>,
  /// namespace -> deletions in that namespace
  pod_deletions: HashMap<String, Vec<PodDeletion>>,
  /// namespace -> pod -> sorted ready instants
  container_ready: HashMap<String, HashMap<String, Vec<DateTime<Utc>>>>,
}

impl SuppressionIndex {
  pub fn build(intervals: &[Interval], pad: Duration) -> Self {
    let mut index = Self {
      pad,
      master_updates: Vec::new(),
      e2e_tests: Vec::new(),
      pod_deletions: HashMap::new(),
      container_ready: HashMap::new(),
    };

    for interval in intervals {
      let reason = interval.message.reason.as_str();
      let ns = interval.locator.namespace();
      let pod = interval.locator.get(locator_keys::POD);

      if reason == reasons::NODE_UPDATE && is_control_plane(interval) {
        index.master_updates.push(Window::of(interval));
      } else if interval.locator.kind == LocatorType::E2ETest {
        if let Some(name) = interval.locator.get(locator_keys::E2E_TEST) {
          index.e2e_tests.push(E2eTest {
            name: name.to_string(),
            window: Window::of(interval),
          });
        }
      } else if reason == reasons::GRACEFUL_DELETE_STARTED {
        if let (Some(ns), Some(pod)) = (ns, pod) {
          index
            .pod_deletions
            .entry(ns.to_string())
            .or_default()
            .push(PodDeletion {
              pod: pod.to_string(),
              window: Window::of(interval),
            });
        }
      } else if reason == reasons::CONTAINER_READY {
        if let (Some(ns), Some(pod)) = (ns, pod) {
          index
            .container_ready
            .entry(ns.to_string())
            .or_default()
            .entry(pod.to_string())
            .or_default()
            .push(interval.from);
        }
      }
    }

    for pods in index.container_ready.values_mut() {
      for times in pods.values_mut() {
        times.sort();
      }
    }

    index
  }

  /// The rule that excuses this interval, if any.
  pub fn suppressing_rule(&self, interval: &Interval) -> Option<SuppressionRule> {
    let ns = interval.locator.namespace()?;
    match interval.message.reason.as_str() {
      reasons::FAILED_SCHEDULING
        if ns.starts_with("openshift-") && self.masters_updating(&Window::of(interval)) =>
      {
        Some(SuppressionRule::MasterNodeUpdate)
      }
      reasons::TOPOLOGY_AWARE_HINTS_DISABLED if self.endpoint_recovering(ns, interval) => {
        Some(SuppressionRule::TaintTestEndpointRecovery)
      }
      _ => None,
    }
  }

  pub fn is_suppressed(&self, interval: &Interval) -> bool {
    self.suppressing_rule(interval).is_some()
  }

  /// Whether any control plane update window covers `window`.
  pub fn masters_updating(&self, window: &Window) -> bool {
    self.master_updates.iter().any(|w| w.covers(window, self.pad))
  }

  /// Names of E2E tests running at `at`.
  pub fn e2e_tests_at(&self, at: DateTime<Utc>) -> impl Iterator<Item = &str> {
    self
      .e2e_tests
      .iter()
      .filter(move |t| t.window.contains(at, self.pad))
      .map(|t| t.name.as_str())
  }

  /// A pod in `ns` started deleting during a taint test at or before the event,
  /// and the same pod reported a ready container at or after the event ended.
  fn endpoint_recovering(&self, ns: &str, interval: &Interval) -> bool {
    let Some(deletions) = self.pod_deletions.get(ns) else {
      return false;
    };
    deletions.iter().any(|d| {
      d.window.from - self.pad <= interval.from
        && self.e2e_tests_at(d.window.from).any(is_taint_test)
        && self.ready_since(ns, &d.pod, interval.to)
    })
  }

  fn ready_since(&self, ns: &str, pod: &str, at: DateTime<Utc>) -> bool {
    self
      .container_ready
      .get(ns)
      .and_then(|pods| pods.get(pod))
      .is_some_and(|times| {
        let idx = times.partition_point(|t| *t < at - self.pad);
        idx < times.len()
      })
  }
}

fn is_control_plane(interval: &Interval) -> bool {
  interval
    .message
    .annotation(annotations::ROLES)
    .is_some_and(|roles| {
      roles
        .split(',')
        .map(str::trim)
        .any(|r| r == "master" || r == "control-plane")
    })
}

fn is_taint_test(name: &str) -> bool {
  name.to_ascii_lowercase().contains("taint")
}
