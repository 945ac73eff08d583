//! An in-memory [`EntityStore`](occi_core::EntityStore).
//!
//! All state lives behind a single read-write lock. Batches are applied to a
//! working copy and swapped in only when every operation in them succeeded,
//! so readers never observe half a batch.
//!
//! * Links are stored once, as entities of their own, and attached to their
//!   source resource on every read.
//! * Deleting a resource removes every link touching it.
//! * New entities get `<kind location><nanoid>` ids.
//!
//! ```rust
//! use occi_backend::MemoryStore;
//! use occi_core::{EntityStore, builtin};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), occi_core::StoreError> {
//! let store = MemoryStore::builder().build();
//! let resource = store.registry().instantiate(&builtin::resource_kind())?;
//! let saved = store.save_entities(vec![resource], &[], None).await?;
//! assert!(saved[0].id().is_some());
//! # Ok(())
//! # }
//! ```

mod builder;
mod store;
mod tables;

pub use builder::MemoryStoreBuilder;
pub use store::MemoryStore;
