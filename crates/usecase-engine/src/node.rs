//! Nodes of a use case tree.

use std::fmt;
use std::sync::Arc;

use crate::branch::Branch;
use crate::contract::Contract;
use crate::step::Step;
use crate::use_case::UseCase;

/// A child of a use case, or a side of a branch.
pub enum Node<C: Contract> {
  Step(Step<C>),
  Branch(Box<Branch<C>>),
  /// Nested use cases are shared so one definition can appear in several trees.
  UseCase(Arc<UseCase<C>>),
}

impl<C: Contract> Node<C> {
  pub fn description(&self) -> &str {
    match self {
      Node::Step(step) => step.description(),
      Node::Branch(branch) => branch.description(),
      Node::UseCase(use_case) => use_case.description(),
    }
  }
}

impl<C: Contract> From<Step<C>> for Node<C> {
  fn from(step: Step<C>) -> Self {
    Node::Step(step)
  }
}

impl<C: Contract> From<Branch<C>> for Node<C> {
  fn from(branch: Branch<C>) -> Self {
    Node::Branch(Box::new(branch))
  }
}

impl<C: Contract> From<UseCase<C>> for Node<C> {
  fn from(use_case: UseCase<C>) -> Self {
    Node::UseCase(Arc::new(use_case))
  }
}

impl<C: Contract> From<Arc<UseCase<C>>> for Node<C> {
  fn from(use_case: Arc<UseCase<C>>) -> Self {
    Node::UseCase(use_case)
  }
}

impl<C: Contract> fmt::Debug for Node<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Node::Step(step) => fmt::Debug::fmt(step, f),
      Node::Branch(branch) => fmt::Debug::fmt(branch, f),
      Node::UseCase(use_case) => fmt::Debug::fmt(use_case, f),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Unit;

  impl Contract for Unit {
    type Request = ();
    type User = ();
    type Deps = ();
    type Returns = ();
    type Value = ();
    type Error = ();
  }

  fn step(description: &str) -> Step<Unit> {
    Step::sync(description, |_ctx| Ok(Ok(())))
  }

  #[test]
  fn test_conversions_keep_descriptions() {
    let nested = UseCase::<Unit>::builder("nested").node(step("inner")).build().unwrap();
    let branch = Branch::new("pick", step("check"), step("yes"), step("no"));

    let nodes: Vec<Node<Unit>> = vec![step("plain").into(), branch.into(), nested.into()];

    assert!(matches!(nodes[0], Node::Step(_)));
    assert!(matches!(nodes[1], Node::Branch(_)));
    assert!(matches!(nodes[2], Node::UseCase(_)));
    let names: Vec<&str> = nodes.iter().map(Node::description).collect();
    assert_eq!(names, vec!["plain", "pick", "nested"]);
  }
}
