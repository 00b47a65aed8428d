//! Local file-based store construction

use crate::backend::LocalStore;
use crate::config::StoreConfig;
use crate::error::Result;

/// Create a new local store with default configuration
pub fn create_local_store(data_dir: impl Into<std::path::PathBuf>) -> Result<LocalStore> {
    LocalStore::with_default_config(data_dir)
}

/// Create a new local store with custom configuration
pub fn create_local_store_with_config(config: StoreConfig) -> Result<LocalStore> {
    LocalStore::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Store;
    use crate::batch::WriteOp;
    use crate::error::StoreError;
    use crate::snapshot::Collection;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_store_creation() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_path_buf();

        let store = create_local_store(data_dir).unwrap();
        assert_eq!(store.data_dir(), &temp_dir.path().to_path_buf());
    }

    #[tokio::test]
    async fn test_uninitialized_store_rejects_operations() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_local_store(temp_dir.path()).unwrap();

        let err = store.get_one(Collection::Config, "main").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn test_commit_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let mut store = create_local_store(temp_dir.path()).unwrap();
        store.initialize().await.unwrap();
        store
            .atomic_batch(vec![
                WriteOp::set(Collection::Drivers, "1", json!({"id": 1, "name": "Max Verstappen", "price": 30.0, "points": 0})),
                WriteOp::set(Collection::Config, "main", json!({"deadline": null, "settlementVersion": 0})),
            ])
            .await
            .unwrap();
        assert!(temp_dir.path().join("league.json").exists());
        assert!(!temp_dir.path().join("league.json.tmp").exists());

        let mut reopened = create_local_store(temp_dir.path()).unwrap();
        reopened.initialize().await.unwrap();

        let driver = reopened.get_one(Collection::Drivers, "1").await.unwrap().unwrap();
        assert_eq!(driver["name"], "Max Verstappen");
        assert_eq!(reopened.subscribe(Collection::Config).borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();

        let mut store = create_local_store(temp_dir.path()).unwrap();
        store.initialize().await.unwrap();
        store
            .atomic_batch(vec![WriteOp::set(Collection::Users, "A", json!({"name": "A", "championshipPoints": 25}))])
            .await
            .unwrap();
        let before = std::fs::read(temp_dir.path().join("league.json")).unwrap();

        let err = store
            .atomic_batch(vec![
                WriteOp::update(Collection::Users, "A", json!({"championshipPoints": 50})).unwrap(),
                WriteOp::update(Collection::Users, "Ghost", json!({"championshipPoints": 18})).unwrap(),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let after = std::fs::read(temp_dir.path().join("league.json")).unwrap();
        assert_eq!(before, after);

        let a = store.get_one(Collection::Users, "A").await.unwrap().unwrap();
        assert_eq!(a["championshipPoints"], 25);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = create_local_store(temp_dir.path().join("nested")).unwrap();
        store.initialize().await.unwrap();
        store.initialize().await.unwrap();
        assert!(store.data_dir().exists());
    }
}
