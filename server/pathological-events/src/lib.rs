//! Pathological Event Evaluator: deterministic, rule-based.
//!
//! Ingests monitor intervals recorded during a CI run, finds events that
//! repeated too often, excuses the expected ones (allow-list, contextual
//! suppression, known bugs in strict mode) and emits one pass/fail
//! EvaluationResult per namespace.
//!
//! No DB, no network; pure computation over a fully collected interval set.

pub mod allowlist;
pub mod builder;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod fingerprint;
pub mod known_bugs;
pub mod matcher;
pub mod namespaces;
pub mod normalize;
pub mod probe;
pub mod registry;
pub mod report;
pub mod suppression;
pub mod types;

pub use config::Config;
pub use error::EngineError;
pub use evaluator::Evaluator;
pub use matcher::{Matcher, MatcherSpec};
pub use registry::Registry;
pub use types::{EvaluationResult, InboundInterval, Interval};
