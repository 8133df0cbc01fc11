//! Normalize inbound interval records into canonical `Interval`s.

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::types::*;

/// Parse and validate an inbound record. A missing `to` means an instantaneous
/// interval; a missing `level` means info.
pub fn normalize(raw: &InboundInterval) -> Result<Interval, EngineError> {
  let level = match raw.level.as_deref().map(str::trim) {
    None | Some("") => Severity::Info,
    Some(s) => Severity::from_str_loose(s)
      .ok_or_else(|| EngineError::validation("level", "expected info|warning|error"))?,
  };

  let from = parse_timestamp("from", &raw.from)?;
  let to = match raw.to.as_deref() {
    Some(t) => parse_timestamp("to", t)?,
    None => from,
  };
  if from > to {
    return Err(EngineError::validation("to", "must not be before from"));
  }

  let mut locator = raw.locator.clone();
  locator.keys.retain(|k, _| !k.is_empty());

  let mut message = raw.message.clone();
  message.reason = message.reason.trim().to_string();

  Ok(Interval {
    level,
    source: raw.source,
    locator,
    message,
    from,
    to,
  })
}

/// Decode one JSON line and normalize it.
pub fn parse_line(line: &str) -> Result<Interval, EngineError> {
  let raw: InboundInterval = serde_json::from_str(line)?;
  normalize(&raw)
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, EngineError> {
  DateTime::parse_from_rfc3339(raw.trim())
    .map(|t| t.with_timezone(&Utc))
    .map_err(|e| EngineError::validation(field, &format!("invalid RFC3339: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn raw(from: &str, to: Option<&str>) -> InboundInterval {
    InboundInterval {
      level: Some("Warning".into()),
      source: Source::KubeEvent,
      locator: Locator::default().with_key("namespace", "openshift-dns"),
      message: Message {
        reason: " TopologyAwareHintsDisabled ".into(),
        human_message: "Unable to allocate minimum required endpoints".into(),
        annotations: [("count".to_string(), "23".to_string())].into_iter().collect(),
      },
      from: from.into(),
      to: to.map(String::from),
    }
  }

  #[test]
  fn normalize_valid_interval() {
    let inbound = raw("1997-08-29T04:11:00Z", Some("1997-08-29T04:12:00+00:00"));
    let interval = normalize(&inbound).unwrap();
    assert_eq!(interval.level, Severity::Warning);
    assert_eq!(interval.message.reason, "TopologyAwareHintsDisabled");
    assert_eq!(interval.message.count(), 23);
    assert_eq!(interval.from, Utc.with_ymd_and_hms(1997, 8, 29, 4, 11, 0).unwrap());
    assert_eq!(interval.to, Utc.with_ymd_and_hms(1997, 8, 29, 4, 12, 0).unwrap());
  }

  #[test]
  fn offsets_convert_to_utc() {
    let interval = normalize(&raw("1997-08-29T06:00:00+02:00", None)).unwrap();
    assert_eq!(interval.from, Utc.with_ymd_and_hms(1997, 8, 29, 4, 0, 0).unwrap());
    assert_eq!(interval.from, interval.to);
  }

  #[test]
  fn normalize_rejects_reversed_window() {
    let err = normalize(&raw("1997-08-29T04:12:00Z", Some("1997-08-29T04:11:00Z"))).unwrap_err();
    match err {
      EngineError::Validation { field, .. } => assert_eq!(field, "to"),
      other => panic!("unexpected error: {}", other),
    }
  }

  #[test]
  fn normalize_rejects_bad_timestamp() {
    let err = normalize(&raw("yesterday", None)).unwrap_err();
    assert!(err.to_string().contains("from"));
  }

  #[test]
  fn normalize_rejects_unknown_level() {
    let mut bad = raw("1997-08-29T04:00:00Z", None);
    bad.level = Some("catastrophic".into());
    let err = normalize(&bad).unwrap_err();
    assert!(err.to_string().contains("level"));
  }

  #[test]
  fn parse_line_reports_json_errors() {
    let err = parse_line(r#"{"from": "1997-08-29T04:00:00Z""#).unwrap_err();
    assert!(matches!(err, EngineError::Json(_)));
    assert!(err.to_string().starts_with("json: "));
  }

  #[test]
  fn parse_line_normalizes() {
    let interval = parse_line(
      r#"{"locator": {"keys": {"namespace": "openshift"}}, "message": {"reason": "SomeEvent1"}, "from": "1997-08-29T04:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(interval.locator.namespace(), Some("openshift"));
    assert_eq!(interval.level, Severity::Info);
  }

  #[test]
  fn missing_level_is_info() {
    let mut r = raw("1997-08-29T04:00:00Z", None);
    r.level = None;
    assert_eq!(normalize(&r).unwrap().level, Severity::Info);
  }
}
