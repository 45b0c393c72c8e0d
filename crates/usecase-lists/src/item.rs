use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An entry on a shared list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub item_id: Uuid,
  pub list_id: String,
  pub text: String,
  /// Name of the actor who added the item.
  pub added_by: String,
  pub added_at: DateTime<Utc>,
}

impl Item {
  pub fn new(list_id: impl Into<String>, text: impl Into<String>, added_by: impl Into<String>) -> Self {
    Self {
      item_id: Uuid::new_v4(),
      list_id: list_id.into(),
      text: text.into(),
      added_by: added_by.into(),
      added_at: Utc::now(),
    }
  }
}
