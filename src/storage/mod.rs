//! Storage abstractions for generated artifacts and caches.
//!
//! Keys are `/`-separated paths relative to the storage root.
//!
//! ## Directory Structure
//!
//! ```text
//! static/data/
//! ├── makers.json       # JSON artifact
//! └── hadatai.json
//! src/data/
//! ├── makers.js         # Importable declaration, same data
//! └── hadatai.js
//! .cache/
//! └── exchange-rates.json
//! ```

pub mod local;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for artifact storage backends.
#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Write bytes under a key, replacing any previous content.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Read bytes, returning `None` if the key does not exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Human-readable location of a key, for logs.
    fn location(&self, key: &str) -> String;
}

/// Serialize a value as pretty JSON and store it.
pub async fn write_json<T: Serialize + ?Sized + Sync>(
    storage: &dyn ArtifactStorage,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    storage.write_bytes(key, &bytes).await
}

/// Read and decode a JSON value, `None` if the key does not exist.
pub async fn read_json<T: DeserializeOwned>(
    storage: &dyn ArtifactStorage,
    key: &str,
) -> Result<Option<T>> {
    match storage.read_bytes(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}
