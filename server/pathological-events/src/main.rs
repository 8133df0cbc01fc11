//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an InboundInterval. Output lines are:
//! - An ErrorOutput for every line that fails parsing or validation (emitted as read)
//! - One EvaluationResult per namespace, after EOF
//!
//! Configuration comes from PATHOLOGICAL_* environment variables; logs go to stderr.

use pathological_events::config::LogFormat;
use pathological_events::normalize;
use pathological_events::types::ErrorOutput;
use pathological_events::{Config, EngineError, Evaluator, Registry};
use std::io::{self, BufRead, Write};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(config: &Config) {
  let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

  let registry = tracing_subscriber::registry().with(env_filter);

  match config.log_format {
    LogFormat::Json => {
      registry
        .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
        .init();
    }
    LogFormat::Pretty => {
      registry
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    }
  }
}

fn error_output(e: &EngineError) -> ErrorOutput {
  match e {
    EngineError::Validation { field, reason } => {
      ErrorOutput::new(reason.clone()).with_field(field.clone())
    }
    _ => ErrorOutput::new(e.to_string()),
  }
}

fn main() {
  let config = match Config::from_env() {
    Ok(c) => c,
    Err(e) => {
      let _ = writeln!(io::stderr(), "pathological-events: {}", e);
      std::process::exit(2);
    }
  };
  init_tracing(&config);

  let registry = match Registry::builtin() {
    Ok(r) => r,
    Err(e) => {
      tracing::error!(error = %e, "built-in allow-list is invalid");
      std::process::exit(1);
    }
  };
  let evaluator = Evaluator::new(config, registry);

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let mut intervals = Vec::new();

  for (idx, line) in stdin.lock().lines().enumerate() {
    let line_no = idx + 1;
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        tracing::error!(error = %e, "read error");
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    match normalize::parse_line(trimmed) {
      Ok(interval) => intervals.push(interval),
      Err(e) => {
        tracing::warn!(line = line_no, error = %e, "invalid interval skipped");
        let err = error_output(&e).at_line(line_no);
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
      }
    }
  }

  tracing::info!(intervals = intervals.len(), "evaluating");
  for result in evaluator.run(&intervals) {
    let _ = serde_json::to_writer(&mut out, &result);
    let _ = writeln!(out);
  }

  let _ = out.flush();
}
