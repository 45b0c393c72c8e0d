use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use usecase_engine::{TraceEntry, TraceOutcome};
use usecase_lists::{
  Actor, AddItemError, AddItemRequest, EDITOR_ROLE, InMemoryListRepository, Item, ListRepository,
  RepositoryError, add_item,
};

fn editor() -> Actor {
  Actor::new("alice").with_role(EDITOR_ROLE)
}

fn request(list_id: &str, text: &str, create_missing: bool) -> AddItemRequest {
  AddItemRequest {
    list_id: list_id.to_string(),
    text: text.to_string(),
    create_missing,
  }
}

async fn repository_with(lists: &[&str]) -> Arc<InMemoryListRepository> {
  let repository = Arc::new(InMemoryListRepository::new());
  for list_id in lists {
    repository.create_list(list_id).await.unwrap();
  }
  repository
}

#[tokio::test]
async fn test_editor_adds_item_to_existing_list() {
  let repository = repository_with(&["groceries"]).await;
  let use_case = add_item(repository.clone()).unwrap();

  let outcome = use_case
    .run(request("groceries", " milk ", false), editor())
    .await
    .unwrap();

  let item = outcome.unwrap().unwrap();
  assert_eq!(item.text, "milk");
  assert_eq!(item.added_by, "alice");
  assert_eq!(repository.items("groceries").await.unwrap(), vec![item]);
}

#[tokio::test]
async fn test_actor_without_editor_role_is_forbidden() {
  let repository = repository_with(&["groceries"]).await;
  let use_case = add_item(repository.clone()).unwrap();

  let audited = use_case
    .audit(request("groceries", "milk", false), Actor::new("bob"))
    .await
    .unwrap();

  assert_eq!(
    audited.outcome,
    Err(AddItemError::Forbidden {
      actor: "bob".to_string()
    })
  );
  assert!(!audited.trace.authorized);
  assert!(audited.trace.steps.is_empty());
  assert_eq!(audited.trace.user, json!({ "name": "bob", "roles": [] }));
  assert!(repository.items("groceries").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_text_stops_before_the_lookup() {
  let repository = repository_with(&["groceries"]).await;
  let use_case = add_item(repository.clone()).unwrap();

  let audited = use_case
    .audit(request("groceries", "  ", false), editor())
    .await
    .unwrap();

  assert!(matches!(audited.outcome, Err(AddItemError::InvalidText { .. })));
  assert_eq!(audited.trace.steps.len(), 1);
  assert_eq!(audited.trace.steps[0].description(), "validate item text");
}

#[tokio::test]
async fn test_unknown_list_fails_without_create_missing() {
  let repository = repository_with(&[]).await;
  let use_case = add_item(repository.clone()).unwrap();

  let audited = use_case
    .audit(request("hardware", "nails", false), editor())
    .await
    .unwrap();

  let unknown = AddItemError::UnknownList {
    list_id: "hardware".to_string(),
  };
  assert_eq!(audited.outcome, Err(unknown.clone()));
  assert!(repository.list_ids().await.unwrap().is_empty());

  let TraceEntry::Branch(branch) = &audited.trace.steps[1] else {
    panic!("expected the list lookup branch");
  };
  let unknown = serde_json::to_value(&unknown).unwrap();
  assert_eq!(branch.return_if, TraceOutcome::Err(unknown.clone()));
  assert_eq!(branch.return_else, Some(TraceOutcome::Err(unknown)));
  assert_eq!(audited.trace.steps.len(), 2);
}

#[tokio::test]
async fn test_create_missing_creates_the_list_first() {
  let repository = repository_with(&[]).await;
  let use_case = add_item(repository.clone()).unwrap();

  let outcome = use_case
    .run(request("hardware", "nails", true), editor())
    .await
    .unwrap();

  let item = outcome.unwrap().unwrap();
  assert_eq!(repository.list_ids().await.unwrap(), vec!["hardware"]);
  assert_eq!(repository.items("hardware").await.unwrap(), vec![item]);
}

/// Answers `list_exists` only after a pause, so concurrent runs all see the
/// answer from before any of them created the list.
struct SlowLookup {
  inner: InMemoryListRepository,
  pause: Duration,
}

#[async_trait]
impl ListRepository for SlowLookup {
  async fn list_exists(&self, list_id: &str) -> Result<bool, RepositoryError> {
    let exists = self.inner.list_exists(list_id).await?;
    tokio::time::sleep(self.pause).await;
    Ok(exists)
  }

  async fn create_list(&self, list_id: &str) -> Result<(), RepositoryError> {
    self.inner.create_list(list_id).await
  }

  async fn add_item(&self, item: &Item) -> Result<(), RepositoryError> {
    self.inner.add_item(item).await
  }

  async fn items(&self, list_id: &str) -> Result<Vec<Item>, RepositoryError> {
    self.inner.items(list_id).await
  }

  async fn list_ids(&self) -> Result<Vec<String>, RepositoryError> {
    self.inner.list_ids().await
  }
}

#[tokio::test]
async fn test_concurrent_create_missing_runs_both_store_their_item() {
  let repository = Arc::new(SlowLookup {
    inner: InMemoryListRepository::new(),
    pause: Duration::from_millis(20),
  });
  let use_case = add_item(repository.clone()).unwrap();

  let (first, second) = tokio::join!(
    use_case.run(request("hardware", "nails", true), editor()),
    use_case.run(request("hardware", "screws", true), editor()),
  );

  let first = first.unwrap().unwrap().unwrap();
  let second = second.unwrap().unwrap().unwrap();
  assert_eq!(repository.list_ids().await.unwrap(), vec!["hardware"]);
  let mut texts: Vec<String> = repository
    .items("hardware")
    .await
    .unwrap()
    .into_iter()
    .map(|item| item.text)
    .collect();
  texts.sort();
  assert_eq!(texts, vec!["nails", "screws"]);
  assert_ne!(first.item_id, second.item_id);
}

#[tokio::test]
async fn test_audit_records_every_stage() {
  let repository = repository_with(&["groceries"]).await;
  let use_case = add_item(repository).unwrap();

  let audited = use_case
    .audit(request("groceries", "eggs", false), editor())
    .await
    .unwrap();

  let descriptions: Vec<&str> = audited.trace.steps.iter().map(TraceEntry::description).collect();
  assert_eq!(
    descriptions,
    vec!["validate item text", "list exists?", "store item"]
  );
  let TraceEntry::Branch(branch) = &audited.trace.steps[1] else {
    panic!("expected the list lookup branch");
  };
  assert_eq!(branch.return_then, Some(TraceOutcome::Ok(json!(null))));
  assert!(audited.trace.outcome.is_ok());

  let stored = serde_json::to_value(audited.outcome.unwrap()).unwrap();
  assert_eq!(audited.trace.outcome, TraceOutcome::Ok(stored));
}

#[test]
fn test_doc_lists_request_and_steps() {
  let use_case = add_item(Arc::new(InMemoryListRepository::new())).unwrap();

  let json = serde_json::to_value(use_case.doc()).unwrap();

  assert_eq!(
    json,
    json!({
      "type": "use case",
      "description": "add item to list",
      "request": {
        "list_id": "string",
        "text": "string",
        "create_missing": "bool, optional"
      },
      "steps": [
        { "type": "step", "description": "validate item text" },
        {
          "type": "if else",
          "description": "list exists?",
          "if": { "type": "step", "description": "look up list" },
          "then": { "type": "step", "description": "use existing list" },
          "else": { "type": "step", "description": "create missing list" }
        },
        { "type": "step", "description": "store item" }
      ]
    })
  );
}
