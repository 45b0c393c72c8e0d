//! Per-run execution context.

use crate::contract::Contract;

/// Mutable state threaded through the steps of one run.
///
/// A context is created fresh for every `run`/`audit` call and is exclusively
/// borrowed by one step at a time. The request and user are read-only; steps
/// publish results through `ret` and reach collaborators through `di`.
pub struct Context<C: Contract> {
  req: C::Request,
  user: C::User,
  /// Values published by earlier steps.
  pub ret: C::Returns,
  /// Dependencies wired by the setup hook.
  pub di: C::Deps,
}

impl<C: Contract> Context<C> {
  /// Create a context with default `ret` and `di`.
  pub fn new(req: C::Request, user: C::User) -> Self {
    Self {
      req,
      user,
      ret: C::Returns::default(),
      di: C::Deps::default(),
    }
  }

  /// The request payload.
  pub fn req(&self) -> &C::Request {
    &self.req
  }

  /// The acting user.
  pub fn user(&self) -> &C::User {
    &self.user
  }

  /// Consume the context, returning the published values.
  pub fn into_returns(self) -> C::Returns {
    self.ret
  }
}
