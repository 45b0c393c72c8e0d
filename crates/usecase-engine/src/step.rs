//! Steps, the atomic units of a use case.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::Context;
use crate::contract::{BoxError, Contract, Outcome};

/// Future returned by async step closures.
pub type StepFuture<'a, C> = BoxFuture<'a, Result<Outcome<C>, BoxError>>;

/// Behaviour of a step.
///
/// Implement this for steps that carry their own state. Closures are wrapped
/// by [`Step::new`] and [`Step::sync`].
///
/// Return `Ok(Err(detail))` for expected business failures. The outer `Err`
/// is reserved for unexpected faults and aborts the whole run.
#[async_trait]
pub trait Action<C: Contract>: Send + Sync {
  async fn run(&self, ctx: &mut Context<C>) -> Result<Outcome<C>, BoxError>;
}

struct AsyncFn<F>(F);

#[async_trait]
impl<C, F> Action<C> for AsyncFn<F>
where
  C: Contract,
  F: for<'a> Fn(&'a mut Context<C>) -> StepFuture<'a, C> + Send + Sync,
{
  async fn run(&self, ctx: &mut Context<C>) -> Result<Outcome<C>, BoxError> {
    (self.0)(ctx).await
  }
}

struct SyncFn<F>(F);

#[async_trait]
impl<C, F> Action<C> for SyncFn<F>
where
  C: Contract,
  F: Fn(&mut Context<C>) -> Result<Outcome<C>, BoxError> + Send + Sync,
{
  async fn run(&self, ctx: &mut Context<C>) -> Result<Outcome<C>, BoxError> {
    (self.0)(ctx)
  }
}

/// A named unit of work.
pub struct Step<C: Contract> {
  description: String,
  action: Arc<dyn Action<C>>,
}

impl<C: Contract> Step<C> {
  /// Create a step from an async closure.
  ///
  /// ```ignore
  /// Step::new("load list", |ctx| Box::pin(async move {
  ///   let list = ctx.di.lists.find(&ctx.req().list_id).await?;
  ///   Ok(list.ok_or(ListError::NotFound))
  /// }))
  /// ```
  pub fn new<F>(description: impl Into<String>, action: F) -> Self
  where
    F: for<'a> Fn(&'a mut Context<C>) -> StepFuture<'a, C> + Send + Sync + 'static,
  {
    Self::from_action(description, AsyncFn(action))
  }

  /// Create a step from a closure that never suspends.
  pub fn sync<F>(description: impl Into<String>, action: F) -> Self
  where
    F: Fn(&mut Context<C>) -> Result<Outcome<C>, BoxError> + Send + Sync + 'static,
  {
    Self::from_action(description, SyncFn(action))
  }

  /// Create a step from an [`Action`] implementation.
  pub fn from_action(description: impl Into<String>, action: impl Action<C> + 'static) -> Self {
    Self {
      description: description.into(),
      action: Arc::new(action),
    }
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  pub(crate) async fn invoke(&self, ctx: &mut Context<C>) -> Result<Outcome<C>, BoxError> {
    self.action.run(ctx).await
  }
}

impl<C: Contract> Clone for Step<C> {
  fn clone(&self) -> Self {
    Self {
      description: self.description.clone(),
      action: self.action.clone(),
    }
  }
}

impl<C: Contract> fmt::Debug for Step<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Step")
      .field("description", &self.description)
      .finish_non_exhaustive()
  }
}
