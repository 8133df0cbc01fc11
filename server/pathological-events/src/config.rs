//! Evaluator configuration with sane defaults, overridable from the environment.

use chrono::Duration;

use crate::error::EngineError;
use crate::namespaces;
use crate::types::{PlatformType, RunContext, TopologyMode};

pub const ENV_THRESHOLD: &str = "PATHOLOGICAL_THRESHOLD";
pub const ENV_PLATFORM: &str = "PATHOLOGICAL_PLATFORM";
pub const ENV_TOPOLOGY: &str = "PATHOLOGICAL_TOPOLOGY";
pub const ENV_STRICT: &str = "PATHOLOGICAL_STRICT";
pub const ENV_PAD_SECONDS: &str = "PATHOLOGICAL_PAD_SECONDS";
pub const ENV_TEST_NAME: &str = "PATHOLOGICAL_TEST_NAME";
pub const ENV_NAMESPACES: &str = "PATHOLOGICAL_NAMESPACES";
pub const ENV_LOG_FORMAT: &str = "PATHOLOGICAL_LOG_FORMAT";

pub const DEFAULT_DUPLICATE_THRESHOLD: u32 = 20;
pub const DEFAULT_TEST_NAME: &str = "events should not repeat";
/// Upper bound on the suppression pad: one day.
pub const MAX_PAD_SECONDS: i64 = 86_400;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
  #[default]
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Occurrence count at which an event is considered repeated.
  pub duplicate_threshold: u32,
  pub platform: PlatformType,
  pub topology: Option<TopologyMode>,
  /// Consult the known-bug list before rejecting.
  pub strict: bool,
  /// Slack added to both ends of suppression windows.
  pub suppression_pad_seconds: i64,
  pub test_name: String,
  /// Namespaces that always get a result. `""` is added implicitly.
  pub known_namespaces: Vec<String>,
  pub log_format: LogFormat,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
      platform: PlatformType::Unset,
      topology: None,
      strict: false,
      suppression_pad_seconds: 0,
      test_name: DEFAULT_TEST_NAME.to_string(),
      known_namespaces: namespaces::known_namespaces(),
      log_format: LogFormat::Pretty,
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self, EngineError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Defaults overridden by whatever `lookup` returns. Empty values are unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| {
      lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    };
    let mut config = Self::default();

    if let Some(raw) = get(ENV_THRESHOLD) {
      config.duplicate_threshold = raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
        EngineError::config(ENV_THRESHOLD, format!("expected a positive integer, got {:?}", raw))
      })?;
    }
    if let Some(raw) = get(ENV_PLATFORM) {
      config.platform = PlatformType::from_str_loose(&raw)
        .ok_or_else(|| EngineError::config(ENV_PLATFORM, format!("unknown platform {:?}", raw)))?;
    }
    if let Some(raw) = get(ENV_TOPOLOGY) {
      let topology = TopologyMode::from_str_loose(&raw)
        .ok_or_else(|| EngineError::config(ENV_TOPOLOGY, format!("unknown topology {:?}", raw)))?;
      config.topology = Some(topology);
    }
    if let Some(raw) = get(ENV_STRICT) {
      config.strict = parse_bool(&raw).ok_or_else(|| {
        EngineError::config(ENV_STRICT, format!("expected true or false, got {:?}", raw))
      })?;
    }
    if let Some(raw) = get(ENV_PAD_SECONDS) {
      config.suppression_pad_seconds = raw
        .parse::<i64>()
        .ok()
        .filter(|n| (0..=MAX_PAD_SECONDS).contains(n))
        .ok_or_else(|| {
          EngineError::config(
            ENV_PAD_SECONDS,
            format!("expected seconds in 0..={}, got {:?}", MAX_PAD_SECONDS, raw),
          )
        })?;
    }
    if let Some(raw) = get(ENV_TEST_NAME) {
      config.test_name = raw;
    }
    if let Some(raw) = get(ENV_NAMESPACES) {
      config.known_namespaces = raw
        .split(',')
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(String::from)
        .collect();
    }
    if let Some(raw) = get(ENV_LOG_FORMAT) {
      config.log_format = match raw.to_ascii_lowercase().as_str() {
        "json" => LogFormat::Json,
        "pretty" | "text" => LogFormat::Pretty,
        _ => {
          let reason = format!("expected json or pretty, got {:?}", raw);
          return Err(EngineError::config(ENV_LOG_FORMAT, reason));
        }
      };
    }
    Ok(config)
  }

  pub fn run_context(&self) -> RunContext {
    RunContext {
      platform: self.platform,
      topology: self.topology,
    }
  }

  /// Pad as a duration, clamped to `0..=MAX_PAD_SECONDS`.
  pub fn suppression_pad(&self) -> Duration {
    let secs = self.suppression_pad_seconds.clamp(0, MAX_PAD_SECONDS);
    Duration::try_seconds(secs).unwrap_or_else(Duration::zero)
  }
}

fn parse_bool(raw: &str) -> Option<bool> {
  match raw.to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, EngineError> {
    let env: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    Config::from_lookup(|key| env.get(key).cloned())
  }

  #[test]
  fn defaults() {
    let config = Config::default();
    assert_eq!(config.duplicate_threshold, 20);
    assert_eq!(config.platform, PlatformType::Unset);
    assert!(config.topology.is_none());
    assert!(!config.strict);
    assert_eq!(config.suppression_pad(), Duration::zero());
    assert_eq!(config.test_name, "events should not repeat");
    assert!(config.known_namespaces.iter().any(|ns| ns == "openshift"));
  }

  #[test]
  fn env_overrides() {
    let config = from_pairs(&[
      (ENV_THRESHOLD, "30"),
      (ENV_PLATFORM, "aws"),
      (ENV_TOPOLOGY, "SingleReplica"),
      (ENV_STRICT, "true"),
      (ENV_PAD_SECONDS, "5"),
      (ENV_NAMESPACES, "openshift, openshift-dns,,"),
      (ENV_LOG_FORMAT, "json"),
    ])
    .unwrap();
    assert_eq!(config.duplicate_threshold, 30);
    assert_eq!(config.platform, PlatformType::Aws);
    assert_eq!(config.topology, Some(TopologyMode::SingleReplica));
    assert!(config.strict);
    assert_eq!(config.suppression_pad(), Duration::seconds(5));
    assert_eq!(config.known_namespaces, vec!["openshift", "openshift-dns"]);
    assert_eq!(config.log_format, LogFormat::Json);
  }

  #[test]
  fn empty_values_keep_defaults() {
    let config = from_pairs(&[(ENV_THRESHOLD, "  "), (ENV_PLATFORM, "")]).unwrap();
    assert_eq!(config.duplicate_threshold, 20);
    assert_eq!(config.platform, PlatformType::Unset);
  }

  #[test]
  fn pad_accepts_one_day() {
    let config = from_pairs(&[(ENV_PAD_SECONDS, "86400")]).unwrap();
    assert_eq!(config.suppression_pad(), Duration::days(1));
  }

  #[test]
  fn oversized_pad_set_directly_is_clamped() {
    let config = Config {
      suppression_pad_seconds: i64::MAX,
      ..Config::default()
    };
    assert_eq!(config.suppression_pad(), Duration::days(1));
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for (key, value) in [
      (ENV_THRESHOLD, "0"),
      (ENV_THRESHOLD, "many"),
      (ENV_PLATFORM, "mainframe"),
      (ENV_TOPOLOGY, "Sideways"),
      (ENV_STRICT, "maybe"),
      (ENV_PAD_SECONDS, "-1"),
      (ENV_PAD_SECONDS, "86401"),
      (ENV_PAD_SECONDS, "9223372036854775807"),
      (ENV_LOG_FORMAT, "xml"),
    ] {
      match from_pairs(&[(key, value)]) {
        Err(EngineError::Config { key: k, .. }) => assert_eq!(k, key),
        other => panic!("{}={} should fail, got {:?}", key, value, other),
      }
    }
  }
}
