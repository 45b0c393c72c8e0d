//! Audit sinks for shipping traces to logs, stores or compliance pipelines.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::audit::AuditTrace;

/// Receives completed audit traces.
///
/// [`UseCase::audit_into`](crate::UseCase::audit_into) calls `record` once
/// per audit, after the run finished without a fault. Implementations decide
/// what to do with the trace (persist, forward, log, ignore).
pub trait AuditSink: Send + Sync {
  fn record(&self, trace: &AuditTrace);
}

/// A sink that discards all traces.
#[derive(Debug, Clone, Default)]
pub struct NoopSink;

impl AuditSink for NoopSink {
  fn record(&self, _trace: &AuditTrace) {}
}

/// A sink that sends traces to an unbounded channel.
///
/// Use this when traces are consumed asynchronously, e.g. written to an audit
/// store by a background task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  sender: mpsc::UnboundedSender<AuditTrace>,
}

impl ChannelSink {
  pub fn new(sender: mpsc::UnboundedSender<AuditTrace>) -> Self {
    Self { sender }
  }
}

impl AuditSink for ChannelSink {
  fn record(&self, trace: &AuditTrace) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(trace.clone());
  }
}

/// A sink that emits each trace as one JSON `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl AuditSink for LogSink {
  fn record(&self, trace: &AuditTrace) {
    match serde_json::to_string(trace) {
      Ok(json) => info!(
        target: "usecase::audit",
        transaction_id = %trace.transaction_id,
        use_case = %trace.description,
        authorized = trace.authorized,
        trace = %json,
        "audit_recorded"
      ),
      Err(e) => warn!(
        target: "usecase::audit",
        transaction_id = %trace.transaction_id,
        error = %e,
        "audit trace could not be serialized"
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::audit::TraceOutcome;
  use std::time::Duration;

  fn trace() -> AuditTrace {
    AuditTrace {
      transaction_id: uuid::Uuid::new_v4(),
      description: "sink test".to_string(),
      user: serde_json::json!("alice"),
      authorized: true,
      outcome: TraceOutcome::Ok(serde_json::Value::Null),
      steps: Vec::new(),
      elapsed: Duration::from_nanos(1),
    }
  }

  #[tokio::test]
  async fn test_channel_sink_forwards_trace() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let sink = ChannelSink::new(sender);
    let trace = trace();

    sink.record(&trace);

    assert_eq!(receiver.recv().await, Some(trace));
  }

  #[test]
  fn test_channel_sink_ignores_dropped_receiver() {
    let (sender, receiver) = mpsc::unbounded_channel();
    drop(receiver);

    ChannelSink::new(sender).record(&trace());
  }

  #[test]
  fn test_noop_and_log_sinks_accept_traces() {
    NoopSink.record(&trace());
    LogSink.record(&trace());
  }
}
