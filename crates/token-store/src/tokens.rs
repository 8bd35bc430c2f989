//! High-level API for managing the credential pair.

use crate::{StorageKeys, StorageResult, TokenStorage};
use tracing::debug;

/// High-level store for the access/refresh token pair.
///
/// The two tokens are written together on login/signup, the access token
/// may be replaced alone during a silent refresh, and both are removed
/// together on logout or irrecoverable refresh failure.
pub struct TokenStore {
    storage: Box<dyn TokenStorage>,
}

impl TokenStore {
    /// Create a new token store with the given storage backend.
    pub fn new(storage: Box<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Store the access token, overwriting any prior value.
    pub fn set_access_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::ACCESS_TOKEN, token)
    }

    /// Retrieve the access token.
    pub fn get_access_token(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::ACCESS_TOKEN)
    }

    /// Store the refresh token, overwriting any prior value.
    pub fn set_refresh_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::REFRESH_TOKEN, token)
    }

    /// Retrieve the refresh token.
    pub fn get_refresh_token(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::REFRESH_TOKEN)
    }

    /// Store both tokens of a freshly issued credential pair.
    pub fn set_session(&self, access_token: &str, refresh_token: &str) -> StorageResult<()> {
        self.set_access_token(access_token)?;
        self.set_refresh_token(refresh_token)?;
        Ok(())
    }

    /// Remove both tokens. Idempotent.
    pub fn clear_tokens(&self) -> StorageResult<()> {
        let _ = self.storage.delete(StorageKeys::ACCESS_TOKEN)?;
        let _ = self.storage.delete(StorageKeys::REFRESH_TOKEN)?;
        debug!("Cleared stored tokens");
        Ok(())
    }

    /// Check whether an access token is currently persisted.
    pub fn has_access_token(&self) -> StorageResult<bool> {
        self.storage.has(StorageKeys::ACCESS_TOKEN)
    }
}
