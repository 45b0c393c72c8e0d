use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::ListsConfig;
use crate::item::Item;

/// Error type for list storage operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
  /// The list does not exist.
  #[error("list not found: {0}")]
  UnknownList(String),

  /// A list with this id already exists.
  #[error("list already exists: {0}")]
  ListExists(String),

  /// The seed file could not be read.
  #[error("failed to read seed file: {0}")]
  Io(#[from] std::io::Error),

  /// The seed file is not valid JSON.
  #[error("invalid seed file: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Storage for lists and their items.
#[async_trait]
pub trait ListRepository: Send + Sync {
  /// Whether a list with this id exists.
  async fn list_exists(&self, list_id: &str) -> Result<bool, RepositoryError>;

  /// Create an empty list.
  async fn create_list(&self, list_id: &str) -> Result<(), RepositoryError>;

  /// Append an item to its list.
  async fn add_item(&self, item: &Item) -> Result<(), RepositoryError>;

  /// Items of a list, in insertion order.
  async fn items(&self, list_id: &str) -> Result<Vec<Item>, RepositoryError>;

  /// Ids of all lists, sorted.
  async fn list_ids(&self) -> Result<Vec<String>, RepositoryError>;
}

/// In-memory [`ListRepository`].
#[derive(Debug, Default)]
pub struct InMemoryListRepository {
  lists: RwLock<HashMap<String, Vec<Item>>>,
}

impl InMemoryListRepository {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a repository, loading the seed file if one is configured.
  pub async fn from_config(config: &ListsConfig) -> Result<Self, RepositoryError> {
    let Some(path) = &config.seed_path else {
      return Ok(Self::new());
    };

    let content = tokio::fs::read_to_string(path).await?;
    let seed: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)?;

    let mut lists = HashMap::with_capacity(seed.len());
    for (list_id, texts) in seed {
      let items = texts
        .into_iter()
        .map(|text| Item::new(list_id.clone(), text, "seed"))
        .collect();
      lists.insert(list_id, items);
    }

    info!(path = %path.display(), lists = lists.len(), "seeded list repository");
    Ok(Self {
      lists: RwLock::new(lists),
    })
  }
}

#[async_trait]
impl ListRepository for InMemoryListRepository {
  async fn list_exists(&self, list_id: &str) -> Result<bool, RepositoryError> {
    Ok(self.lists.read().await.contains_key(list_id))
  }

  async fn create_list(&self, list_id: &str) -> Result<(), RepositoryError> {
    let mut lists = self.lists.write().await;
    if lists.contains_key(list_id) {
      return Err(RepositoryError::ListExists(list_id.to_string()));
    }
    lists.insert(list_id.to_string(), Vec::new());
    Ok(())
  }

  async fn add_item(&self, item: &Item) -> Result<(), RepositoryError> {
    let mut lists = self.lists.write().await;
    let items = lists
      .get_mut(&item.list_id)
      .ok_or_else(|| RepositoryError::UnknownList(item.list_id.clone()))?;
    items.push(item.clone());
    Ok(())
  }

  async fn items(&self, list_id: &str) -> Result<Vec<Item>, RepositoryError> {
    self
      .lists
      .read()
      .await
      .get(list_id)
      .cloned()
      .ok_or_else(|| RepositoryError::UnknownList(list_id.to_string()))
  }

  async fn list_ids(&self) -> Result<Vec<String>, RepositoryError> {
    let mut ids: Vec<String> = self.lists.read().await.keys().cloned().collect();
    ids.sort();
    Ok(ids)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[tokio::test]
  async fn test_create_then_add_item() {
    let repo = InMemoryListRepository::new();

    repo.create_list("groceries").await.unwrap();
    repo.add_item(&Item::new("groceries", "milk", "alice")).await.unwrap();

    let items = repo.items("groceries").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "milk");
  }

  #[tokio::test]
  async fn test_add_item_to_missing_list_fails() {
    let repo = InMemoryListRepository::new();

    let err = repo.add_item(&Item::new("nowhere", "milk", "alice")).await.unwrap_err();

    assert!(matches!(err, RepositoryError::UnknownList(id) if id == "nowhere"));
  }

  #[tokio::test]
  async fn test_create_existing_list_fails() {
    let repo = InMemoryListRepository::new();
    repo.create_list("groceries").await.unwrap();

    let err = repo.create_list("groceries").await.unwrap_err();

    assert!(matches!(err, RepositoryError::ListExists(_)));
  }

  #[tokio::test]
  async fn test_from_config_loads_seed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"hardware": [], "groceries": ["milk", "eggs"]}}"#).unwrap();
    let config = ListsConfig {
      seed_path: Some(file.path().to_path_buf()),
    };

    let repo = InMemoryListRepository::from_config(&config).await.unwrap();

    assert_eq!(repo.list_ids().await.unwrap(), vec!["groceries", "hardware"]);
    let texts: Vec<String> = repo
      .items("groceries")
      .await
      .unwrap()
      .into_iter()
      .map(|item| item.text)
      .collect();
    assert_eq!(texts, vec!["milk", "eggs"]);
  }

  #[tokio::test]
  async fn test_from_config_rejects_invalid_seed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let config = ListsConfig {
      seed_path: Some(file.path().to_path_buf()),
    };

    let err = InMemoryListRepository::from_config(&config).await.unwrap_err();

    assert!(matches!(err, RepositoryError::Parse(_)));
  }
}
