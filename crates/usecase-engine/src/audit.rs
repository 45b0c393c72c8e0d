//! Audit traces.
//!
//! An audit runs the same code path as `run` with tracing enabled. The trace
//! records a fresh transaction id, the acting user, whether authorization
//! passed, and one entry per executed node with its outcome and elapsed time.
//! Nodes skipped by a short-circuit are absent.
//!
//! Durations come from the monotonic clock and serialize as integer
//! nanoseconds (`elapsed_ns`).
//!
//! Recording never changes the outcome of a run. A user or payload that
//! cannot be represented as JSON is replaced in the trace by an object
//! holding the serializer's message under [`SNAPSHOT_ERROR_KEY`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::contract::{Contract, Outcome};

/// Key of the placeholder recorded for values that could not be serialized.
pub const SNAPSHOT_ERROR_KEY: &str = "snapshot_error";

/// An outcome snapshot: which variant was active and its payload as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TraceOutcome {
  Ok(Value),
  Err(Value),
}

impl TraceOutcome {
  /// Snapshot an outcome.
  pub fn capture<V: Serialize, E: Serialize>(
    outcome: &Result<V, E>,
  ) -> Result<Self, serde_json::Error> {
    Ok(match outcome {
      Ok(value) => TraceOutcome::Ok(serde_json::to_value(value)?),
      Err(detail) => TraceOutcome::Err(serde_json::to_value(detail)?),
    })
  }

  pub fn is_ok(&self) -> bool {
    matches!(self, TraceOutcome::Ok(_))
  }

  pub fn is_err(&self) -> bool {
    matches!(self, TraceOutcome::Err(_))
  }

  fn snapshot<C: Contract>(outcome: &Outcome<C>) -> Self {
    match outcome {
      Ok(value) => TraceOutcome::Ok(snapshot_value(value, "outcome")),
      Err(detail) => TraceOutcome::Err(snapshot_value(detail, "outcome")),
    }
  }
}

/// Serialize `value` for a trace, falling back to a placeholder.
fn snapshot_value<T: Serialize + ?Sized>(value: &T, what: &'static str) -> Value {
  serde_json::to_value(value).unwrap_or_else(|e| {
    warn!(what, error = %e, "audit_snapshot_failed");
    let mut placeholder = Map::new();
    placeholder.insert(SNAPSHOT_ERROR_KEY.to_string(), Value::String(e.to_string()));
    Value::Object(placeholder)
  })
}

/// Trace of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTrace {
  pub description: String,
  #[serde(rename = "return")]
  pub outcome: TraceOutcome,
  #[serde(rename = "elapsed_ns", with = "nanos")]
  pub elapsed: Duration,
}

/// Trace of one branch.
///
/// Exactly one side ran: either `then` and `return_then` are present, or
/// `otherwise` (serialized as `else`) and `return_else` are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchTrace {
  pub description: String,
  /// Outcome of the condition step.
  pub return_if: TraceOutcome,
  #[serde(rename = "elapsed_if_ns", with = "nanos")]
  pub elapsed_if: Duration,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub return_then: Option<TraceOutcome>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub return_else: Option<TraceOutcome>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub then: Option<Box<TraceEntry>>,
  #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
  pub otherwise: Option<Box<TraceEntry>>,
  /// Outcome of the side that ran, which is also the branch's outcome.
  #[serde(rename = "return")]
  pub outcome: TraceOutcome,
  #[serde(rename = "elapsed_ns", with = "nanos")]
  pub elapsed: Duration,
}

/// Trace of one executed node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraceEntry {
  #[serde(rename = "step")]
  Step(StepTrace),
  #[serde(rename = "if else")]
  Branch(BranchTrace),
  /// A nested use case opens its own audit scope.
  #[serde(rename = "use case")]
  UseCase(Box<AuditTrace>),
}

impl TraceEntry {
  pub fn description(&self) -> &str {
    match self {
      TraceEntry::Step(step) => &step.description,
      TraceEntry::Branch(branch) => &branch.description,
      TraceEntry::UseCase(trace) => &trace.description,
    }
  }

  pub fn outcome(&self) -> &TraceOutcome {
    match self {
      TraceEntry::Step(step) => &step.outcome,
      TraceEntry::Branch(branch) => &branch.outcome,
      TraceEntry::UseCase(trace) => &trace.outcome,
    }
  }

  pub fn elapsed(&self) -> Duration {
    match self {
      TraceEntry::Step(step) => step.elapsed,
      TraceEntry::Branch(branch) => branch.elapsed,
      TraceEntry::UseCase(trace) => trace.elapsed,
    }
  }
}

/// Runtime record of one use case execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrace {
  pub transaction_id: Uuid,
  pub description: String,
  /// Snapshot of the acting user.
  pub user: Value,
  pub authorized: bool,
  #[serde(rename = "return")]
  pub outcome: TraceOutcome,
  pub steps: Vec<TraceEntry>,
  #[serde(rename = "elapsed_ns", with = "nanos")]
  pub elapsed: Duration,
}

/// Outcome of an audit together with its trace.
pub struct Audited<C: Contract> {
  pub outcome: Outcome<C>,
  pub trace: AuditTrace,
}

/// Collects trace entries for one use case scope.
pub(crate) struct Tracer {
  transaction_id: Uuid,
  description: String,
  user: Value,
  started: Instant,
  steps: Vec<TraceEntry>,
}

impl Tracer {
  pub(crate) fn start<C: Contract>(description: &str, user: &C::User) -> Self {
    Self {
      transaction_id: Uuid::new_v4(),
      description: description.to_string(),
      user: snapshot_value(user, "user"),
      started: Instant::now(),
      steps: Vec::new(),
    }
  }

  pub(crate) fn transaction_id(&self) -> Uuid {
    self.transaction_id
  }

  pub(crate) fn record(&mut self, entry: TraceEntry) {
    self.steps.push(entry);
  }

  pub(crate) fn finish<C: Contract>(self, authorized: bool, outcome: &Outcome<C>) -> AuditTrace {
    AuditTrace {
      transaction_id: self.transaction_id,
      description: self.description,
      user: self.user,
      authorized,
      outcome: TraceOutcome::snapshot::<C>(outcome),
      steps: self.steps,
      elapsed: self.started.elapsed(),
    }
  }
}

pub(crate) fn step_entry<C: Contract>(
  description: &str,
  outcome: &Outcome<C>,
  elapsed: Duration,
) -> TraceEntry {
  TraceEntry::Step(StepTrace {
    description: description.to_string(),
    outcome: TraceOutcome::snapshot::<C>(outcome),
    elapsed,
  })
}

pub(crate) struct BranchRecord<'a, C: Contract> {
  pub description: &'a str,
  pub condition: &'a Outcome<C>,
  pub elapsed_if: Duration,
  pub took_then: bool,
  pub side: Option<TraceEntry>,
  pub outcome: &'a Outcome<C>,
  pub elapsed: Duration,
}

pub(crate) fn branch_entry<C: Contract>(record: BranchRecord<'_, C>) -> TraceEntry {
  let outcome = TraceOutcome::snapshot::<C>(record.outcome);
  let side = record.side.map(Box::new);
  let (then, otherwise, return_then, return_else) = if record.took_then {
    (side, None, Some(outcome.clone()), None)
  } else {
    (None, side, None, Some(outcome.clone()))
  };

  TraceEntry::Branch(BranchTrace {
    description: record.description.to_string(),
    return_if: TraceOutcome::snapshot::<C>(record.condition),
    elapsed_if: record.elapsed_if,
    return_then,
    return_else,
    then,
    otherwise,
    outcome,
    elapsed: record.elapsed,
  })
}

mod nanos {
  use std::time::Duration;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    serializer.serialize_u64(nanos)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_nanos)
  }
}
