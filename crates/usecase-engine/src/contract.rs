//! The associated types a use case is declared over.

use serde::Serialize;

/// Error type for unexpected faults raised by steps, setup hooks and
/// authorization checks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type bundle fixed per use case.
///
/// Every step, branch and nested use case in a tree shares the same contract,
/// so the request, user, dependency and outcome types are checked at compile
/// time instead of being looked up at run time.
pub trait Contract: Send + Sync + 'static {
  /// The request payload. Steps read it through [`Context::req`](crate::Context::req).
  type Request: Send;

  /// The acting user, passed to the authorization check and snapshotted into
  /// audit traces.
  type User: Serialize + Send;

  /// Dependencies wired by the setup hook (repositories, clients, ...).
  type Deps: Default + Send;

  /// Values steps publish for later steps in the same run.
  type Returns: Default + Send;

  /// Success payload of an outcome.
  type Value: Serialize + Send;

  /// Failure detail of an outcome.
  type Error: Serialize + Send;
}

/// The business outcome of a step, branch or use case.
///
/// `Err` is an anticipated business failure (validation, not found, ...).
/// Unexpected faults are reported separately as [`EngineError`](crate::EngineError).
pub type Outcome<C> = Result<<C as Contract>::Value, <C as Contract>::Error>;

/// Result of an authorization check. `Err` aborts the run with that detail.
pub type Verdict<C> = Result<(), <C as Contract>::Error>;
