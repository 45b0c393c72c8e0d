//! Use cases and their builder.

use std::fmt;

use futures::future::BoxFuture;
use tracing::{error, instrument};

use crate::audit::{Audited, Tracer};
use crate::branch::Branch;
use crate::context::Context;
use crate::contract::{BoxError, Contract, Outcome, Verdict};
use crate::doc::RequestShape;
use crate::error::{DefinitionError, EngineError};
use crate::execution::{Untraced, execute_use_case};
use crate::node::Node;
use crate::sink::AuditSink;
use crate::step::{Step, StepFuture};

type AuthorizeFn<C> =
  Box<dyn Fn(&<C as Contract>::User) -> Result<Verdict<C>, BoxError> + Send + Sync>;

type SetupFn<C> =
  Box<dyn for<'a> Fn(&'a mut Context<C>) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync>;

/// A named business operation composed of ordered steps.
///
/// Build one with [`UseCase::builder`]. A built use case is immutable and can
/// be shared between concurrent runs; every run gets its own [`Context`].
pub struct UseCase<C: Contract> {
  description: String,
  request: RequestShape,
  authorize: Option<AuthorizeFn<C>>,
  setup: Option<SetupFn<C>>,
  children: Vec<Node<C>>,
}

impl<C: Contract> UseCase<C> {
  pub fn builder(description: impl Into<String>) -> UseCaseBuilder<C> {
    UseCaseBuilder {
      use_case: UseCase {
        description: description.into(),
        request: RequestShape::new(),
        authorize: None,
        setup: None,
        children: Vec::new(),
      },
    }
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  /// The declared request shape.
  pub fn request(&self) -> &RequestShape {
    &self.request
  }

  pub fn children(&self) -> &[Node<C>] {
    &self.children
  }

  /// Run the use case.
  ///
  /// Returns the business outcome: the authorization `Err`, the first failing
  /// step's `Err`, or the last step's `Ok`. Faults raised by the
  /// authorization check, the setup hook or a step body are returned as
  /// [`EngineError`].
  #[instrument(name = "use_case_run", skip_all, fields(use_case = %self.description))]
  pub async fn run(&self, request: C::Request, user: C::User) -> Result<Outcome<C>, EngineError> {
    let mut ctx = Context::new(request, user);
    let scoped = execute_use_case::<C, Untraced>(self, &mut ctx).await?;
    Ok(scoped.outcome)
  }

  /// Run the use case while recording an [`AuditTrace`](crate::AuditTrace).
  ///
  /// The outcome is the one `run` would return for the same inputs. When a
  /// fault aborts the run, the partial trace is discarded.
  #[instrument(name = "use_case_audit", skip_all, fields(use_case = %self.description))]
  pub async fn audit(&self, request: C::Request, user: C::User) -> Result<Audited<C>, EngineError> {
    let mut ctx = Context::new(request, user);
    let scoped = execute_use_case::<C, Tracer>(self, &mut ctx).await?;
    Ok(Audited {
      outcome: scoped.outcome,
      trace: scoped.trace,
    })
  }

  /// Audit the use case and hand the trace to `sink`.
  pub async fn audit_into(
    &self,
    request: C::Request,
    user: C::User,
    sink: &dyn AuditSink,
  ) -> Result<Outcome<C>, EngineError> {
    let audited = self.audit(request, user).await?;
    sink.record(&audited.trace);
    Ok(audited.outcome)
  }

  pub(crate) fn authorize_user(&self, user: &C::User) -> Result<Verdict<C>, EngineError> {
    match &self.authorize {
      Some(authorize) => authorize(user).map_err(|source| {
        error!(use_case = %self.description, error = %source, "authorize_fault");
        EngineError::authorize(&self.description, source)
      }),
      None => Ok(Ok(())),
    }
  }

  pub(crate) async fn prepare(&self, ctx: &mut Context<C>) -> Result<(), EngineError> {
    let Some(setup) = &self.setup else {
      return Ok(());
    };

    setup(ctx).await.map_err(|source| {
      error!(use_case = %self.description, error = %source, "setup_fault");
      EngineError::setup(&self.description, source)
    })
  }
}

impl<C: Contract> fmt::Debug for UseCase<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("UseCase")
      .field("description", &self.description)
      .field("request", &self.request)
      .field("authorize", &self.authorize.is_some())
      .field("setup", &self.setup.is_some())
      .field("children", &self.children)
      .finish()
  }
}

/// Declares a [`UseCase`]. Children run in the order they are added.
pub struct UseCaseBuilder<C: Contract> {
  use_case: UseCase<C>,
}

impl<C: Contract> UseCaseBuilder<C> {
  /// Declare the request shape shown in documentation.
  pub fn request(mut self, request: RequestShape) -> Self {
    self.use_case.request = request;
    self
  }

  /// Set the authorization check. `Ok(Err(detail))` denies the user.
  pub fn authorize<F>(mut self, authorize: F) -> Self
  where
    F: Fn(&C::User) -> Result<Verdict<C>, BoxError> + Send + Sync + 'static,
  {
    self.use_case.authorize = Some(Box::new(authorize));
    self
  }

  /// Set the setup hook, run after authorization and before the first step.
  pub fn setup<F>(mut self, setup: F) -> Self
  where
    F: for<'a> Fn(&'a mut Context<C>) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync + 'static,
  {
    self.use_case.setup = Some(Box::new(setup));
    self
  }

  /// Add an async step.
  pub fn step<F>(self, description: impl Into<String>, action: F) -> Self
  where
    F: for<'a> Fn(&'a mut Context<C>) -> StepFuture<'a, C> + Send + Sync + 'static,
  {
    self.node(Step::new(description, action))
  }

  /// Add a step that never suspends.
  pub fn sync_step<F>(self, description: impl Into<String>, action: F) -> Self
  where
    F: Fn(&mut Context<C>) -> Result<Outcome<C>, BoxError> + Send + Sync + 'static,
  {
    self.node(Step::sync(description, action))
  }

  pub fn branch(self, branch: Branch<C>) -> Self {
    self.node(branch)
  }

  /// Add a nested use case. It shares this use case's context.
  pub fn use_case(self, use_case: impl Into<Node<C>>) -> Self {
    self.node(use_case)
  }

  pub fn node(mut self, node: impl Into<Node<C>>) -> Self {
    self.use_case.children.push(node.into());
    self
  }

  /// Validate the tree and return the use case.
  ///
  /// # Errors
  /// Returns an error if any node has an empty description or the use case
  /// has no children.
  pub fn build(self) -> Result<UseCase<C>, DefinitionError> {
    let use_case = self.use_case;

    let path = use_case.description.clone();
    check_description(&use_case.description, &path)?;
    if use_case.children.is_empty() {
      return Err(DefinitionError::NoChildren { use_case: path });
    }
    for (index, child) in use_case.children.iter().enumerate() {
      check_node(child, &format!("{path}/{index}"))?;
    }

    Ok(use_case)
  }
}

fn check_description(description: &str, path: &str) -> Result<(), DefinitionError> {
  if description.trim().is_empty() {
    return Err(DefinitionError::EmptyDescription {
      path: path.to_string(),
    });
  }
  Ok(())
}

fn check_node<C: Contract>(node: &Node<C>, path: &str) -> Result<(), DefinitionError> {
  check_description(node.description(), path)?;

  match node {
    Node::Branch(branch) => {
      check_description(branch.condition().description(), &format!("{path}/if"))?;
      check_node(branch.then(), &format!("{path}/then"))?;
      check_node(branch.otherwise(), &format!("{path}/else"))
    }
    // Steps have nothing below them; nested use cases were checked when built.
    Node::Step(_) | Node::UseCase(_) => Ok(()),
  }
}
