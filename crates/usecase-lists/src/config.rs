use std::path::PathBuf;

/// Configuration for the list repository.
#[derive(Debug, Clone, Default)]
pub struct ListsConfig {
  /// JSON file mapping list ids to item texts, loaded at startup.
  ///
  /// ```json
  /// { "groceries": ["milk", "eggs"], "hardware": [] }
  /// ```
  pub seed_path: Option<PathBuf>,
}
