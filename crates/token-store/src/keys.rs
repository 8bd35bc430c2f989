//! Storage key constants.

/// Storage keys used by the client
pub struct StorageKeys;

impl StorageKeys {
    /// Access token (short-lived bearer credential)
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Refresh token (exchanged for a new access token on expiry)
    pub const REFRESH_TOKEN: &'static str = "refresh_token";
}
