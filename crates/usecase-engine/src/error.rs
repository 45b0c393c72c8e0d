//! Engine errors.

use crate::contract::BoxError;

/// Fatal faults raised while running or auditing a use case.
///
/// These never represent business failures; those are `Err` outcomes.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  /// The authorization check itself failed (as opposed to denying the user).
  #[error("authorization check of '{use_case}' failed")]
  Authorize {
    use_case: String,
    #[source]
    source: BoxError,
  },

  /// The setup hook failed.
  #[error("setup of '{use_case}' failed")]
  Setup {
    use_case: String,
    #[source]
    source: BoxError,
  },

  /// A step body raised an unexpected error.
  #[error("step '{step}' failed")]
  Step {
    step: String,
    #[source]
    source: BoxError,
  },

  /// The use case definition is malformed.
  #[error(transparent)]
  Definition(#[from] DefinitionError),
}

impl EngineError {
  /// Create an authorization fault.
  pub fn authorize(use_case: impl Into<String>, source: BoxError) -> Self {
    Self::Authorize {
      use_case: use_case.into(),
      source,
    }
  }

  /// Create a setup fault.
  pub fn setup(use_case: impl Into<String>, source: BoxError) -> Self {
    Self::Setup {
      use_case: use_case.into(),
      source,
    }
  }

  /// Create a step fault.
  pub fn step(step: impl Into<String>, source: BoxError) -> Self {
    Self::Step {
      step: step.into(),
      source,
    }
  }
}

/// Errors found while building a use case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
  /// A node was declared without a description.
  #[error("node at '{path}' has an empty description")]
  EmptyDescription { path: String },

  /// A use case was declared without children.
  #[error("use case '{use_case}' declares no steps")]
  NoChildren { use_case: String },
}
