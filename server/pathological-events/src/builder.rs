//! Builders for intervals and messages, plus a one-call constructor for
//! duplicated kube events.

use chrono::{DateTime, Utc};

use crate::types::*;

#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
  message: Message,
}

impl MessageBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the reason and mirrors it into the `reason` annotation.
  pub fn reason(mut self, reason: impl Into<String>) -> Self {
    let reason = reason.into();
    self
      .message
      .annotations
      .insert(annotations::REASON.to_string(), reason.clone());
    self.message.reason = reason;
    self
  }

  pub fn human_message(mut self, text: impl Into<String>) -> Self {
    self.message.human_message = text.into();
    self
  }

  pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.message.annotations.insert(key.into(), value.into());
    self
  }

  pub fn count(self, count: u32) -> Self {
    self.annotation(annotations::COUNT, count.to_string())
  }

  pub fn build(self) -> Message {
    self.message
  }
}

#[derive(Debug, Clone)]
pub struct IntervalBuilder {
  level: Severity,
  source: Source,
  locator: Locator,
  message: Message,
}

impl IntervalBuilder {
  pub fn new(source: Source, level: Severity) -> Self {
    Self {
      level,
      source,
      locator: Locator::default(),
      message: Message::default(),
    }
  }

  pub fn locator(mut self, locator: Locator) -> Self {
    self.locator = locator;
    self
  }

  pub fn message(mut self, message: impl Into<Message>) -> Self {
    self.message = message.into();
    self
  }

  /// Finish the interval. Bounds are swapped if given in reverse.
  pub fn build(self, from: DateTime<Utc>, to: DateTime<Utc>) -> Interval {
    let (from, to) = if from <= to { (from, to) } else { (to, from) };
    Interval {
      level: self.level,
      source: self.source,
      locator: self.locator,
      message: self.message,
      from,
      to,
    }
  }
}

impl From<MessageBuilder> for Message {
  fn from(builder: MessageBuilder) -> Self {
    builder.build()
  }
}

/// A repeated kube event, described by named fields. Unset locator fields are
/// left out of the locator entirely.
#[derive(Debug, Clone, Default)]
pub struct KubeEvent<'a> {
  pub namespace: Option<&'a str>,
  pub pod: Option<&'a str>,
  pub node: Option<&'a str>,
  pub reason: &'a str,
  pub message: &'a str,
  pub count: Option<u32>,
  pub from: Option<DateTime<Utc>>,
  pub to: Option<DateTime<Utc>>,
}

impl KubeEvent<'_> {
  pub fn build(&self) -> Interval {
    let mut locator = Locator::default();
    if let Some(ns) = self.namespace {
      locator = locator.with_key(locator_keys::NAMESPACE, ns);
    }
    if let Some(pod) = self.pod {
      locator = locator.with_key(locator_keys::POD, pod);
    }
    if let Some(node) = self.node {
      locator = locator.with_key(locator_keys::NODE, node);
    }

    let mut message = MessageBuilder::new()
      .reason(self.reason)
      .human_message(self.message);
    if let Some(count) = self.count {
      message = message.count(count);
    }

    let from = self.from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let to = self.to.unwrap_or(from);
    IntervalBuilder::new(Source::KubeEvent, Severity::Info)
      .locator(locator)
      .message(message)
      .build(from, to)
  }
}
