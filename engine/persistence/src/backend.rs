//! Store trait and implementations

use crate::batch::{Database, DatabaseFile, WriteOp};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::snapshot::{Collection, CollectionSnapshot};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Abstract trait for league document stores
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Receive the current snapshot of a collection now and a fresh one after every
    /// commit that touches it
    fn subscribe(&self, collection: Collection) -> watch::Receiver<CollectionSnapshot>;

    /// Commit all operations or none of them
    async fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<()>;

    /// Read a single document
    async fn get_one(&self, collection: Collection, key: &str) -> Result<Option<Value>>;
}

/// Live database plus one snapshot channel per collection.
///
/// The database mutex is held for the whole commit, so commits never interleave.
struct StoreState {
    database: Mutex<Database>,
    channels: HashMap<Collection, watch::Sender<CollectionSnapshot>>,
}

impl StoreState {
    fn new(database: Database) -> Self {
        let channels = Collection::ALL
            .into_iter()
            .map(|collection| {
                let (sender, _) = watch::channel(database.snapshot(collection));
                (collection, sender)
            })
            .collect();
        Self { database: Mutex::new(database), channels }
    }

    fn subscribe(&self, collection: Collection) -> watch::Receiver<CollectionSnapshot> {
        match self.channels.get(&collection) {
            Some(sender) => sender.subscribe(),
            // every collection gets a channel in `new`
            None => watch::channel(CollectionSnapshot::empty(collection)).1,
        }
    }

    fn publish(&self, database: &Database, touched: &BTreeSet<Collection>) {
        for collection in touched {
            if let Some(sender) = self.channels.get(collection) {
                sender.send_replace(database.snapshot(*collection));
            }
        }
    }

    async fn get_one(&self, collection: Collection, key: &str) -> Option<Value> {
        self.database.lock().await.get(collection, key).cloned()
    }
}

/// In-memory store (for testing and embedding)
///
/// Supports fault injection: access can be denied outright, and the next commit can
/// be made to fail as if the backend were unreachable.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<StoreState>,
    access_denied: Arc<AtomicBool>,
    fail_next_commit: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::with_database(Database::new())
    }

    /// Create an in-memory store holding an existing database
    pub fn with_database(database: Database) -> Self {
        Self {
            state: Arc::new(StoreState::new(database)),
            access_denied: Arc::new(AtomicBool::new(false)),
            fail_next_commit: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deny (or allow again) every read and write
    pub fn deny_access(&self, denied: bool) {
        self.access_denied.store(denied, Ordering::SeqCst);
    }

    /// Make the next commit fail with [`StoreError::Unavailable`]
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Copy of the whole database
    pub async fn dump(&self) -> Database {
        self.state.database.lock().await.clone()
    }

    fn check_access(&self) -> Result<()> {
        if self.access_denied.load(Ordering::SeqCst) {
            return Err(StoreError::permission_denied("in-memory store access denied"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    fn subscribe(&self, collection: Collection) -> watch::Receiver<CollectionSnapshot> {
        self.state.subscribe(collection)
    }

    async fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        self.check_access()?;

        let mut database = self.state.database.lock().await;
        let (next, touched) = database.apply(&ops)?;

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected commit failure"));
        }

        *database = next;
        self.state.publish(&database, &touched);

        tracing::debug!("In-memory store committed {} operations", ops.len());

        Ok(())
    }

    async fn get_one(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        self.check_access()?;
        Ok(self.state.get_one(collection, key).await)
    }
}

/// Local file-based store
///
/// The whole database lives in one JSON file. A commit writes the new database to a
/// staging file and renames it over the old one, so a crash or failed write leaves
/// the previous commit intact.
pub struct LocalStore {
    config: StoreConfig,
    state: StoreState,
    initialized: bool,
}

impl LocalStore {
    /// Create a new local store
    pub fn new(config: StoreConfig) -> Result<Self> {
        // Validate configuration
        config.validate().map_err(StoreError::config)?;

        Ok(Self { config, state: StoreState::new(Database::new()), initialized: false })
    }

    /// Create a new local store with default config
    pub fn with_default_config(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(StoreConfig::new(data_dir))
    }

    /// Create the data directory and load the last commit, if there is one
    pub async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.config.data_dir).await?;

        let path = self.config.store_path();
        let database = if tokio::fs::try_exists(&path).await? {
            let raw = tokio::fs::read(&path).await?;
            let file: DatabaseFile = serde_json::from_slice(&raw)?;
            tracing::info!("Loaded league store from {:?} (saved {})", path, file.saved_at);
            Database::from_file(file)?
        } else {
            tracing::info!("No league store at {:?}, starting empty", path);
            Database::new()
        };

        {
            let mut live = self.state.database.lock().await;
            *live = database;
            self.state.publish(&live, &Collection::ALL.into_iter().collect());
        }

        self.initialized = true;

        tracing::info!("Local store initialized at: {:?}", self.config.data_dir);

        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &PathBuf {
        &self.config.data_dir
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::invalid_operation("Local store not initialized"));
        }
        Ok(())
    }

    async fn write_file(&self, database: &Database) -> Result<()> {
        let staging = self.config.staging_path();
        let bytes = serde_json::to_vec_pretty(&database.to_file())?;

        let mut file = tokio::fs::File::create(&staging).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, &bytes).await?;
        if self.config.fsync_on_commit {
            file.sync_all().await?;
        }
        drop(file);

        tokio::fs::rename(&staging, self.config.store_path()).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for LocalStore {
    fn subscribe(&self, collection: Collection) -> watch::Receiver<CollectionSnapshot> {
        self.state.subscribe(collection)
    }

    async fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        self.ensure_initialized()?;

        let mut database = self.state.database.lock().await;
        let (next, touched) = database.apply(&ops)?;

        if !touched.is_empty() {
            self.write_file(&next).await?;
        }

        *database = next;
        self.state.publish(&database, &touched);

        tracing::debug!("Local store committed {} operations", ops.len());

        Ok(())
    }

    async fn get_one(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        self.ensure_initialized()?;
        Ok(self.state.get_one(collection, key).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscribe_gets_current_then_pushes() {
        let store = InMemoryStore::new();
        let mut users = store.subscribe(Collection::Users);
        assert!(users.borrow().is_empty());

        store
            .atomic_batch(vec![WriteOp::set(Collection::Users, "A", json!({"name": "A"}))])
            .await
            .unwrap();

        users.changed().await.unwrap();
        assert_eq!(users.borrow_and_update().len(), 1);

        // late subscribers see the current state immediately
        let late = store.subscribe(Collection::Users);
        assert_eq!(late.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_only_touched_collections_are_pushed() {
        let store = InMemoryStore::new();
        let drivers = store.subscribe(Collection::Drivers);

        store
            .atomic_batch(vec![WriteOp::set(Collection::Users, "A", json!({"name": "A"}))])
            .await
            .unwrap();

        assert!(!drivers.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_denied_access() {
        let store = InMemoryStore::new();
        store.deny_access(true);

        let err = store.get_one(Collection::Config, "main").await.unwrap_err();
        assert!(err.is_access_denied());

        let err = store
            .atomic_batch(vec![WriteOp::set(Collection::Config, "main", json!({}))])
            .await
            .unwrap_err();
        assert!(err.is_access_denied());

        store.deny_access(false);
        assert!(store.get_one(Collection::Config, "main").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_no_trace() {
        let store = InMemoryStore::new();
        let before = store.dump().await;
        let users = store.subscribe(Collection::Users);

        store.fail_next_commit();
        let err = store
            .atomic_batch(vec![WriteOp::set(Collection::Users, "A", json!({"name": "A"}))])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!err.is_access_denied());
        assert_eq!(store.dump().await, before);
        assert!(!users.has_changed().unwrap());

        // the fault only fires once
        store
            .atomic_batch(vec![WriteOp::set(Collection::Users, "A", json!({"name": "A"}))])
            .await
            .unwrap();
    }
}
