//! If/else branches.

use std::fmt;

use crate::contract::Contract;
use crate::node::Node;
use crate::step::Step;

/// A node choosing between two sub-trees.
///
/// The condition step runs first: `Ok` selects `then`, `Err` selects
/// `otherwise`. The branch's outcome is the outcome of the side that ran.
pub struct Branch<C: Contract> {
  description: String,
  condition: Step<C>,
  then: Node<C>,
  otherwise: Node<C>,
}

impl<C: Contract> Branch<C> {
  pub fn new(
    description: impl Into<String>,
    condition: Step<C>,
    then: impl Into<Node<C>>,
    otherwise: impl Into<Node<C>>,
  ) -> Self {
    Self {
      description: description.into(),
      condition,
      then: then.into(),
      otherwise: otherwise.into(),
    }
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  pub fn condition(&self) -> &Step<C> {
    &self.condition
  }

  pub fn then(&self) -> &Node<C> {
    &self.then
  }

  pub fn otherwise(&self) -> &Node<C> {
    &self.otherwise
  }
}

impl<C: Contract> fmt::Debug for Branch<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Branch")
      .field("description", &self.description)
      .field("condition", &self.condition)
      .field("then", &self.then)
      .field("otherwise", &self.otherwise)
      .finish()
  }
}
