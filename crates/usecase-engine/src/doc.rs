//! Static documentation of use case trees.
//!
//! Documentation is generated by walking the declared tree. No step body,
//! authorization check or setup hook runs, so `doc()` can be called at any
//! time and always reflects the current definition.
//!
//! # Example
//!
//! ```json
//! {
//!   "type": "use case",
//!   "description": "add an item to a list",
//!   "request": { "list_id": "string", "text": "string" },
//!   "steps": [
//!     { "type": "step", "description": "validate text" },
//!     {
//!       "type": "if else",
//!       "description": "ensure list",
//!       "if": { "type": "step", "description": "list exists" },
//!       "then": { "type": "step", "description": "use list" },
//!       "else": { "type": "step", "description": "create list" }
//!     }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::branch::Branch;
use crate::contract::Contract;
use crate::node::Node;
use crate::step::Step;
use crate::use_case::UseCase;

/// Declared request fields, mapping field name to a type or validator label.
///
/// Used for documentation only; it is not enforced at run time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestShape(IndexMap<String, String>);

impl RequestShape {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declare a field. Redeclaring a field replaces its label in place.
  pub fn field(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
    self.0.insert(name.into(), label.into());
    self
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  /// Fields in declaration order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Structural description of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocNode {
  #[serde(rename = "use case")]
  UseCase {
    description: String,
    /// Only present on the root of a documented tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request: Option<RequestShape>,
    steps: Vec<DocNode>,
  },

  #[serde(rename = "step")]
  Step { description: String },

  #[serde(rename = "if else")]
  Branch {
    description: String,
    #[serde(rename = "if")]
    condition: Box<DocNode>,
    then: Box<DocNode>,
    #[serde(rename = "else")]
    otherwise: Box<DocNode>,
  },
}

impl DocNode {
  pub fn description(&self) -> &str {
    match self {
      DocNode::UseCase { description, .. }
      | DocNode::Step { description }
      | DocNode::Branch { description, .. } => description,
    }
  }
}

impl<C: Contract> UseCase<C> {
  /// Describe this use case and its whole tree, including the request shape.
  pub fn doc(&self) -> DocNode {
    self.doc_with_request(Some(self.request().clone()))
  }

  fn doc_with_request(&self, request: Option<RequestShape>) -> DocNode {
    DocNode::UseCase {
      description: self.description().to_string(),
      request,
      steps: self.children().iter().map(Node::doc).collect(),
    }
  }
}

impl<C: Contract> Node<C> {
  pub fn doc(&self) -> DocNode {
    match self {
      Node::Step(step) => step.doc(),
      Node::Branch(branch) => branch.doc(),
      Node::UseCase(use_case) => use_case.doc_with_request(None),
    }
  }
}

impl<C: Contract> Step<C> {
  pub fn doc(&self) -> DocNode {
    DocNode::Step {
      description: self.description().to_string(),
    }
  }
}

impl<C: Contract> Branch<C> {
  pub fn doc(&self) -> DocNode {
    DocNode::Branch {
      description: self.description().to_string(),
      condition: Box::new(self.condition().doc()),
      then: Box::new(self.then().doc()),
      otherwise: Box::new(self.otherwise().doc()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_request_shape_keeps_declaration_order() {
    let shape = RequestShape::new()
      .field("zeta", "string")
      .field("alpha", "integer")
      .field("mid", "email");

    let names: Vec<&str> = shape.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(shape.get("alpha"), Some("integer"));
    assert_eq!(shape.len(), 3);
  }

  #[test]
  fn test_doc_node_serialization() {
    let doc = DocNode::Branch {
      description: "pick".to_string(),
      condition: Box::new(DocNode::Step {
        description: "check".to_string(),
      }),
      then: Box::new(DocNode::Step {
        description: "yes".to_string(),
      }),
      otherwise: Box::new(DocNode::UseCase {
        description: "fallback".to_string(),
        request: None,
        steps: vec![DocNode::Step {
          description: "no".to_string(),
        }],
      }),
    };

    let json = serde_json::to_value(&doc).unwrap();

    assert_eq!(
      json,
      json!({
        "type": "if else",
        "description": "pick",
        "if": { "type": "step", "description": "check" },
        "then": { "type": "step", "description": "yes" },
        "else": {
          "type": "use case",
          "description": "fallback",
          "steps": [{ "type": "step", "description": "no" }]
        }
      })
    );

    let parsed: DocNode = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, doc);
  }
}
