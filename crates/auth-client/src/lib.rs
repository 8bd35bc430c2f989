//! Authenticated HTTP client for the resume screener.
//!
//! This crate provides:
//! - A request pipeline that attaches the stored bearer token and
//!   transparently performs a single refresh-and-retry cycle on 401
//! - Session state management (initialize, login, signup, logout)
//! - A session-invalidated callback so the host can redirect to its
//!   login surface without this crate knowing about navigation

mod error;
mod http;
mod session;
mod types;

pub use error::{ApiError, ApiResult};
pub use http::{ApiClient, ApiRequest, FilePart, SessionInvalidatedCallback};
pub use session::{SessionController, SessionState, SessionStateCallback};
pub use types::{AuthResponse, User};
