//! Credential storage for the resume screener client.
//!
//! This crate persists the access/refresh token pair issued by the scoring
//! service's auth endpoints. Tokens are opaque bearer credentials; nothing
//! here inspects their contents. The default backend is a JSON file under
//! the client base directory, surviving process restarts the way browser
//! local storage survives page reloads.

mod file;
mod keys;
mod tokens;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use tokens::TokenStore;
pub use traits::TokenStorage;

use client_config::Paths;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create a TokenStore backed by the default file storage.
pub fn create_token_store(paths: &Paths) -> StorageResult<TokenStore> {
    let storage = FileStorage::open(paths.tokens_file())?;
    Ok(TokenStore::new(Box::new(storage)))
}
