//! # Persistence Layer
//!
//! This crate provides the document store the fantasy league runs on. The league only
//! needs three things from it:
//!
//! - **subscribe**: a push stream of full collection snapshots
//! - **atomic_batch**: an all-or-nothing multi-document commit
//! - **get_one**: a single document lookup
//!
//! ## Architecture
//!
//! - **Store**: Abstract trait the league services are written against
//! - **InMemoryStore**: Process-local backend with fault injection (for testing)
//! - **LocalStore**: Single JSON file backend, committed by atomic rename
//! - **Database**: The pure document model batches are applied to
//!
//! ## Usage
//!
//! ```rust
//! use persistence::{Collection, InMemoryStore, Store, WriteOp};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::new();
//!     let drivers = store.subscribe(Collection::Drivers);
//!
//!     store
//!         .atomic_batch(vec![WriteOp::set(
//!             Collection::Drivers,
//!             "1",
//!             json!({"id": 1, "name": "Max Verstappen", "price": 30.0, "points": 0}),
//!         )])
//!         .await?;
//!
//!     assert_eq!(drivers.borrow().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod batch;
pub mod config;
pub mod error;
pub mod local;
pub mod snapshot;

pub use backend::{InMemoryStore, LocalStore, Store};
pub use batch::{Database, WriteOp};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use local::{create_local_store, create_local_store_with_config};
pub use snapshot::{Collection, CollectionSnapshot};

/// Re-export document types for convenience
pub use serde_json::{Map, Value};
