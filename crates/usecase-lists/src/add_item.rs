//! The `add item` use case.
//!
//! ```text
//! add item to list
//! ├── validate item text
//! ├── list exists?
//! │   ├── if:   look up list
//! │   ├── then: use existing list
//! │   └── else: create missing list
//! └── store item
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use usecase_engine::{
  Action, BoxError, Branch, Context, Contract, DefinitionError, Outcome, RequestShape, Step,
  UseCase,
};

use crate::item::Item;
use crate::repository::{ListRepository, RepositoryError};

/// Role required to add items.
pub const EDITOR_ROLE: &str = "editor";

/// Longest accepted item text, in characters.
pub const MAX_TEXT_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemRequest {
  pub list_id: String,
  pub text: String,
  /// Create the list when it does not exist yet.
  #[serde(default)]
  pub create_missing: bool,
}

/// The user adding the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
  pub name: String,
  #[serde(default)]
  pub roles: Vec<String>,
}

impl Actor {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      roles: Vec::new(),
    }
  }

  pub fn with_role(mut self, role: impl Into<String>) -> Self {
    self.roles.push(role.into());
    self
  }

  pub fn has_role(&self, role: &str) -> bool {
    self.roles.iter().any(|r| r == role)
  }
}

/// Collaborators wired by the setup hook.
#[derive(Default)]
pub struct AddItemDeps {
  repository: Option<Arc<dyn ListRepository>>,
}

impl AddItemDeps {
  fn repository(&self) -> Result<Arc<dyn ListRepository>, BoxError> {
    self
      .repository
      .clone()
      .ok_or_else(|| "list repository is not wired".into())
  }
}

/// Values published between steps.
#[derive(Debug, Default)]
pub struct AddItemReturns {
  /// Trimmed text, set once validated.
  pub text: Option<String>,
  pub created_list: bool,
  pub item: Option<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum AddItemError {
  #[error("{actor} may not add items")]
  Forbidden { actor: String },

  #[error("invalid item text: {reason}")]
  InvalidText { reason: String },

  #[error("list not found: {list_id}")]
  UnknownList { list_id: String },
}

/// Contract of the `add item` use case.
pub struct AddItem;

impl Contract for AddItem {
  type Request = AddItemRequest;
  type User = Actor;
  type Deps = AddItemDeps;
  type Returns = AddItemReturns;
  /// The stored item, returned by the last step.
  type Value = Option<Item>;
  type Error = AddItemError;
}

/// Declare the `add item` use case over `repository`.
pub fn add_item(repository: Arc<dyn ListRepository>) -> Result<UseCase<AddItem>, DefinitionError> {
  UseCase::<AddItem>::builder("add item to list")
    .request(
      RequestShape::new()
        .field("list_id", "string")
        .field("text", "string")
        .field("create_missing", "bool, optional"),
    )
    .authorize(|actor| {
      if actor.has_role(EDITOR_ROLE) {
        Ok(Ok(()))
      } else {
        Ok(Err(AddItemError::Forbidden {
          actor: actor.name.clone(),
        }))
      }
    })
    .setup(move |ctx| {
      let repository = repository.clone();
      Box::pin(async move {
        ctx.di.repository = Some(repository);
        Ok(())
      })
    })
    .sync_step("validate item text", validate_text)
    .branch(Branch::new(
      "list exists?",
      Step::<AddItem>::new("look up list", |ctx| Box::pin(look_up_list(ctx))),
      Step::<AddItem>::sync("use existing list", |_ctx| Ok(Ok(None))),
      Step::<AddItem>::new("create missing list", |ctx| Box::pin(create_missing_list(ctx))),
    ))
    .node(Step::<AddItem>::from_action("store item", StoreItem))
    .build()
}

fn validate_text(ctx: &mut Context<AddItem>) -> Result<Outcome<AddItem>, BoxError> {
  let text = ctx.req().text.trim().to_string();

  if text.is_empty() {
    return Ok(Err(AddItemError::InvalidText {
      reason: "text is empty".to_string(),
    }));
  }
  let len = text.chars().count();
  if len > MAX_TEXT_LEN {
    return Ok(Err(AddItemError::InvalidText {
      reason: format!("text is {len} characters, at most {MAX_TEXT_LEN} allowed"),
    }));
  }

  ctx.ret.text = Some(text);
  Ok(Ok(None))
}

async fn look_up_list(ctx: &mut Context<AddItem>) -> Result<Outcome<AddItem>, BoxError> {
  let list_id = ctx.req().list_id.clone();

  if ctx.di.repository()?.list_exists(&list_id).await? {
    Ok(Ok(None))
  } else {
    Ok(Err(AddItemError::UnknownList { list_id }))
  }
}

async fn create_missing_list(ctx: &mut Context<AddItem>) -> Result<Outcome<AddItem>, BoxError> {
  let list_id = ctx.req().list_id.clone();
  if !ctx.req().create_missing {
    return Ok(Err(AddItemError::UnknownList { list_id }));
  }

  // Another run may have created the list since the lookup.
  match ctx.di.repository()?.create_list(&list_id).await {
    Ok(()) => {
      ctx.ret.created_list = true;
      info!(list_id = %list_id, actor = %ctx.user().name, "list_created");
    }
    Err(RepositoryError::ListExists(_)) => {
      debug!(list_id = %list_id, "list_created_concurrently");
    }
    Err(e) => return Err(e.into()),
  }
  Ok(Ok(None))
}

struct StoreItem;

#[async_trait]
impl Action<AddItem> for StoreItem {
  async fn run(&self, ctx: &mut Context<AddItem>) -> Result<Outcome<AddItem>, BoxError> {
    let text = ctx.ret.text.clone().ok_or("item text was not validated")?;
    let item = Item::new(ctx.req().list_id.clone(), text, ctx.user().name.clone());

    ctx.di.repository()?.add_item(&item).await?;
    info!(list_id = %item.list_id, item_id = %item.item_id, "item_added");

    ctx.ret.item = Some(item.clone());
    Ok(Ok(Some(item)))
  }
}
