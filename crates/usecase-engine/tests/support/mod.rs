//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use usecase_engine::{Contract, Outcome, Step};

/// A member of a shared shopping list.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
  pub name: String,
  pub admin: bool,
}

pub fn admin() -> Member {
  Member {
    name: "alice".to_string(),
    admin: true,
  }
}

pub fn guest() -> Member {
  Member {
    name: "bob".to_string(),
    admin: false,
  }
}

#[derive(Debug, Default)]
pub struct Deps {
  pub greeting: String,
}

pub struct Lists;

impl Contract for Lists {
  type Request = Value;
  type User = Member;
  type Deps = Deps;
  type Returns = BTreeMap<String, Value>;
  type Value = Value;
  type Error = Value;
}

/// Names of the steps that ran, in order.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
  pub fn push(&self, description: &str) {
    self.0.lock().unwrap().push(description.to_string());
  }

  pub fn entries(&self) -> Vec<String> {
    self.0.lock().unwrap().clone()
  }
}

/// A step that records itself and returns `outcome`.
pub fn recorded(journal: &Journal, description: &'static str, outcome: Outcome<Lists>) -> Step<Lists> {
  let journal = journal.clone();
  Step::<Lists>::sync(description, move |_ctx| {
    journal.push(description);
    Ok(outcome.clone())
  })
}

/// Like [`recorded`], but suspends before finishing.
pub fn suspending(
  journal: &Journal,
  description: &'static str,
  outcome: Outcome<Lists>,
) -> Step<Lists> {
  let journal = journal.clone();
  Step::<Lists>::new(description, move |_ctx| {
    let journal = journal.clone();
    let outcome = outcome.clone();
    Box::pin(async move {
      tokio::time::sleep(Duration::from_millis(2)).await;
      journal.push(description);
      Ok(outcome)
    })
  })
}
