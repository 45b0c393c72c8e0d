//! Tree execution shared by `run` and `audit`.
//!
//! Both entry points walk the tree through the same functions. They differ
//! only in the [`Probe`] they pass: `run` uses [`Untraced`], `audit` uses the
//! [`Tracer`], which builds an [`AuditTrace`] per use case scope.

use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audit::{self, AuditTrace, BranchRecord, TraceEntry, Tracer};
use crate::branch::Branch;
use crate::context::Context;
use crate::contract::{Contract, Outcome};
use crate::error::{DefinitionError, EngineError};
use crate::node::Node;
use crate::step::Step;
use crate::use_case::UseCase;

/// Observes one use case scope.
pub(crate) trait Probe: Send + Sized {
  /// What the scope produces when it closes.
  type Trace: Send;

  /// Whether nodes should build trace entries.
  const RECORDS: bool;

  fn open<C: Contract>(description: &str, user: &C::User) -> Self;

  fn transaction_id(&self) -> Option<Uuid>;

  fn record(&mut self, entry: TraceEntry);

  fn close<C: Contract>(self, authorized: bool, outcome: &Outcome<C>) -> Self::Trace;

  /// Turn a closed nested scope into its parent's trace entry.
  fn nest(trace: Self::Trace) -> Option<TraceEntry>;
}

/// Probe used by `run`.
pub(crate) struct Untraced;

impl Probe for Untraced {
  type Trace = ();
  const RECORDS: bool = false;

  fn open<C: Contract>(_description: &str, _user: &C::User) -> Self {
    Untraced
  }

  fn transaction_id(&self) -> Option<Uuid> {
    None
  }

  fn record(&mut self, _entry: TraceEntry) {}

  fn close<C: Contract>(self, _authorized: bool, _outcome: &Outcome<C>) {}

  fn nest(_trace: ()) -> Option<TraceEntry> {
    None
  }
}

impl Probe for Tracer {
  type Trace = AuditTrace;
  const RECORDS: bool = true;

  fn open<C: Contract>(description: &str, user: &C::User) -> Self {
    Tracer::start::<C>(description, user)
  }

  fn transaction_id(&self) -> Option<Uuid> {
    Some(Tracer::transaction_id(self))
  }

  fn record(&mut self, entry: TraceEntry) {
    Tracer::record(self, entry)
  }

  fn close<C: Contract>(self, authorized: bool, outcome: &Outcome<C>) -> AuditTrace {
    self.finish::<C>(authorized, outcome)
  }

  fn nest(trace: AuditTrace) -> Option<TraceEntry> {
    Some(TraceEntry::UseCase(Box::new(trace)))
  }
}

/// Outcome of a node plus its trace entry when recording.
struct Executed<C: Contract> {
  outcome: Outcome<C>,
  entry: Option<TraceEntry>,
}

/// Outcome of a use case plus whatever its probe produced.
pub(crate) struct Scoped<C: Contract, T> {
  pub outcome: Outcome<C>,
  pub trace: T,
}

pub(crate) fn execute_use_case<'a, C: Contract, P: Probe + 'a>(
  use_case: &'a UseCase<C>,
  ctx: &'a mut Context<C>,
) -> BoxFuture<'a, Result<Scoped<C, P::Trace>, EngineError>> {
  Box::pin(async move {
    let started = Instant::now();
    let mut probe = P::open::<C>(use_case.description(), ctx.user());
    let transaction_id = probe.transaction_id().map(|id| id.to_string());
    info!(
      use_case = %use_case.description(),
      transaction_id = transaction_id.as_deref(),
      "use_case_started"
    );

    if let Err(detail) = use_case.authorize_user(ctx.user())? {
      warn!(use_case = %use_case.description(), "authorization_denied");
      let outcome = Err(detail);
      let trace = probe.close::<C>(false, &outcome);
      return Ok(Scoped { outcome, trace });
    }

    use_case.prepare(ctx).await?;

    let mut last = None;
    for child in use_case.children() {
      let executed = execute_node::<C, P>(child, ctx).await?;
      if let Some(entry) = executed.entry {
        probe.record(entry);
      }

      let failed = executed.outcome.is_err();
      last = Some(executed.outcome);
      if failed {
        break;
      }
    }

    let outcome = last.ok_or_else(|| DefinitionError::NoChildren {
      use_case: use_case.description().to_string(),
    })?;

    let elapsed_ns = nanos(started.elapsed());
    match &outcome {
      Ok(_) => info!(use_case = %use_case.description(), elapsed_ns, "use_case_completed"),
      Err(_) => info!(use_case = %use_case.description(), elapsed_ns, "use_case_failed"),
    }

    let trace = probe.close::<C>(true, &outcome);
    Ok(Scoped { outcome, trace })
  })
}

fn execute_node<'a, C: Contract, P: Probe + 'a>(
  node: &'a Node<C>,
  ctx: &'a mut Context<C>,
) -> BoxFuture<'a, Result<Executed<C>, EngineError>> {
  Box::pin(async move {
    match node {
      Node::Step(step) => execute_step::<C, P>(step, ctx).await,
      Node::Branch(branch) => execute_branch::<C, P>(branch, ctx).await,
      Node::UseCase(use_case) => {
        let scoped = execute_use_case::<C, P>(use_case, ctx).await?;
        Ok(Executed {
          outcome: scoped.outcome,
          entry: P::nest(scoped.trace),
        })
      }
    }
  })
}

async fn execute_step<C: Contract, P: Probe>(
  step: &Step<C>,
  ctx: &mut Context<C>,
) -> Result<Executed<C>, EngineError> {
  let (outcome, elapsed) = time_step(step, ctx).await?;

  let entry = if P::RECORDS {
    Some(audit::step_entry::<C>(step.description(), &outcome, elapsed))
  } else {
    None
  };
  Ok(Executed { outcome, entry })
}

async fn execute_branch<C: Contract, P: Probe>(
  branch: &Branch<C>,
  ctx: &mut Context<C>,
) -> Result<Executed<C>, EngineError> {
  let started = Instant::now();
  let (condition, elapsed_if) = time_step(branch.condition(), ctx).await?;

  let took_then = condition.is_ok();
  let (side, side_name) = if took_then {
    (branch.then(), "then")
  } else {
    (branch.otherwise(), "else")
  };
  debug!(branch = %branch.description(), side = side_name, "branch_selected");

  let executed = execute_node::<C, P>(side, ctx).await?;
  let elapsed = started.elapsed();

  let entry = if P::RECORDS {
    Some(audit::branch_entry(BranchRecord::<C> {
      description: branch.description(),
      condition: &condition,
      elapsed_if,
      took_then,
      side: executed.entry,
      outcome: &executed.outcome,
      elapsed,
    }))
  } else {
    None
  };
  Ok(Executed {
    outcome: executed.outcome,
    entry,
  })
}

/// Run a step body, converting faults and measuring it even when it fails.
async fn time_step<C: Contract>(
  step: &Step<C>,
  ctx: &mut Context<C>,
) -> Result<(Outcome<C>, Duration), EngineError> {
  let started = Instant::now();
  let result = step.invoke(ctx).await;
  let elapsed = started.elapsed();

  let outcome = result.map_err(|source| {
    error!(step = %step.description(), error = %source, "step_fault");
    EngineError::step(step.description(), source)
  })?;

  match &outcome {
    Ok(_) => debug!(step = %step.description(), elapsed_ns = nanos(elapsed), "step_completed"),
    Err(_) => info!(step = %step.description(), elapsed_ns = nanos(elapsed), "step_failed"),
  }
  Ok((outcome, elapsed))
}

fn nanos(duration: Duration) -> u64 {
  u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
