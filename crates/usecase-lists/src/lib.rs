//! Shared shopping lists
//!
//! A small domain used to exercise `usecase-engine`: list items, an async
//! repository behind a trait, and the `add item` use case that wires the
//! repository in through its setup hook.
//!
//! The repository is the only collaborator; persistence beyond an in-memory
//! map (optionally seeded from a JSON file) is out of scope.

mod add_item;
mod config;
mod item;
mod repository;

pub use add_item::{
  AddItem, AddItemDeps, AddItemError, AddItemRequest, AddItemReturns, Actor, EDITOR_ROLE,
  MAX_TEXT_LEN, add_item,
};
pub use config::ListsConfig;
pub use item::Item;
pub use repository::{InMemoryListRepository, ListRepository, RepositoryError};
