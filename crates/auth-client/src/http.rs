//! Authenticated request pipeline.
//!
//! Every outgoing call carries the stored access token as a bearer
//! credential. A 401 response triggers exactly one refresh-and-retry
//! cycle per logical request: the refresh token is exchanged for a new
//! access token, the new token is persisted, and the original request is
//! re-dispatched once. Any failure along that path clears both tokens and
//! notifies the session-invalidated callback.

use crate::types::RefreshResponse;
use crate::{ApiError, ApiResult};
use reqwest::{Client, Method, Response, StatusCode};
use std::sync::{Arc, Mutex};
use token_store::TokenStore;
use tracing::{debug, warn};

/// Callback invoked when the session becomes unrecoverable and the host
/// should send the user back to its unauthenticated entry point.
pub type SessionInvalidatedCallback = Box<dyn Fn() + Send + Sync>;

/// A file to include in a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Original filename reported to the server
    pub filename: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Replayable request body.
#[derive(Debug, Clone)]
enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FilePart>),
}

/// Description of a logical API request.
///
/// Holds everything needed to build the outgoing call, so the pipeline can
/// re-dispatch the identical request after a token refresh without any
/// hidden mutable retry state.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
}

impl ApiRequest {
    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// POST request with an empty body.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// POST request with a JSON body.
    pub fn post_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    /// POST request uploading files as multipart form data.
    pub fn post_multipart(path: impl Into<String>, files: Vec<FilePart>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Multipart(files),
        }
    }

    /// DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }
}

/// HTTP client for the scoring service API.
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    invalidated_callback: Mutex<Option<SessionInvalidatedCallback>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// `base_url` is the service root (e.g. `http://localhost:5000/api`);
    /// request paths are appended to it.
    pub fn new(base_url: impl Into<String>, tokens: Arc<TokenStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client: Client::new(),
            base_url,
            tokens,
            invalidated_callback: Mutex::new(None),
        }
    }

    /// The token store this client reads credentials from.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Register the callback fired when the session is invalidated.
    pub fn on_session_invalidated(&self, callback: SessionInvalidatedCallback) {
        let mut cb = self.invalidated_callback.lock().unwrap();
        *cb = Some(callback);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Execute a request through the authenticated pipeline.
    ///
    /// Performs at most one refresh-and-retry cycle; a second 401 is never
    /// retried again. All non-401 failures propagate unchanged.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<Response> {
        let response = self.dispatch(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        debug!(path = %request.path, "Request unauthorized, attempting token refresh");

        if let Err(e) = self.refresh_access_token().await {
            warn!(path = %request.path, error = %e, "Token refresh failed, invalidating session");
            self.invalidate_session()?;
            return Err(ApiError::Unauthorized);
        }

        let retried = self.dispatch(request).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            // Rejected even with a fresh token. Give up instead of looping.
            warn!(path = %request.path, "Retried request still unauthorized, invalidating session");
            self.invalidate_session()?;
            return Err(ApiError::Unauthorized);
        }

        check_status(retried).await
    }

    /// POST without attaching a bearer credential and without the refresh
    /// cycle. Used for login/signup, which establish the session.
    pub async fn post_unauthenticated(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> ApiResult<Response> {
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Build and send a single attempt, attaching the current access token
    /// when one is stored.
    async fn dispatch(&self, request: &ApiRequest) -> ApiResult<Response> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), self.url(&request.path));

        if let Some(token) = self.tokens.get_access_token()? {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(files) => {
                let mut form = reqwest::multipart::Form::new();
                for file in files {
                    let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.filename.clone());
                    form = form.part("files", part);
                }
                builder.multipart(form)
            }
        };

        Ok(builder.send().await?)
    }

    /// Exchange the refresh token for a new access token and persist it.
    async fn refresh_access_token(&self) -> ApiResult<()> {
        let refresh_token = self
            .tokens
            .get_refresh_token()?
            .ok_or(ApiError::Unauthorized)?;

        let response = self
            .http_client
            .post(self.url("/auth/refresh"))
            .bearer_auth(&refresh_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "Refresh exchange rejected");
            return Err(ApiError::Unauthorized);
        }

        let data: RefreshResponse = response.json().await?;
        self.tokens.set_access_token(&data.access_token)?;
        debug!("Access token refreshed");
        Ok(())
    }

    /// Clear stored tokens and notify the host that the session is gone.
    fn invalidate_session(&self) -> ApiResult<()> {
        self.tokens.clear_tokens()?;
        let cb = self.invalidated_callback.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback();
        }
        Ok(())
    }
}

/// Map a completed non-401 response to a result, leaving successful
/// responses untouched for the caller to deserialize.
async fn check_status(response: Response) -> ApiResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

/// Build a Validation or Server error from a failed response, pulling the
/// message out of the backend's `{"error": "..."}` body when present.
async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body);

    if status.is_server_error() {
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    } else {
        ApiError::Validation {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use token_store::{StorageResult, TokenStorage};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory storage for testing.
    struct MemoryStorage {
        data: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }
    }

    impl TokenStorage for MemoryStorage {
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.data
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        fn delete(&self, key: &str) -> StorageResult<bool> {
            Ok(self.data.lock().unwrap().remove(key).is_some())
        }
    }

    fn create_client(base_url: &str) -> ApiClient {
        let store = TokenStore::new(Box::new(MemoryStorage::new()));
        ApiClient::new(base_url, Arc::new(store))
    }

    #[tokio::test]
    async fn attaches_stored_access_token_as_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resumes"))
            .and(header("authorization", "Bearer stored-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "resumes": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        client.tokens().set_access_token("stored-token").unwrap();

        let response = client.execute(&ApiRequest::get("/resumes")).await.unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn no_bearer_header_without_stored_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let response = client.execute(&ApiRequest::get("/health")).await.unwrap();
        assert!(response.status().is_success());

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn refreshes_and_retries_once_on_401() {
        let server = MockServer::start().await;

        // Stale token is rejected.
        Mock::given(method("GET"))
            .and(path("/resumes"))
            .and(header("authorization", "Bearer old-access"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        // Refresh exchange issues a new access token.
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("authorization", "Bearer refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-access"
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Retried request succeeds with the new token.
        Mock::given(method("GET"))
            .and(path("/resumes"))
            .and(header("authorization", "Bearer new-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "resumes": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        client.tokens().set_session("old-access", "refresh-1").unwrap();

        // Caller only sees the final, successful response.
        let response = client.execute(&ApiRequest::get("/resumes")).await.unwrap();
        assert!(response.status().is_success());

        assert_eq!(
            client.tokens().get_access_token().unwrap(),
            Some("new-access".to_string())
        );
        // Refresh token is untouched by a silent refresh.
        assert_eq!(
            client.tokens().get_refresh_token().unwrap(),
            Some("refresh-1".to_string())
        );
    }

    #[tokio::test]
    async fn failed_refresh_clears_tokens_and_notifies() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resumes"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        client.tokens().set_session("old-access", "bad-refresh").unwrap();

        let invalidated = Arc::new(AtomicBool::new(false));
        let flag = invalidated.clone();
        client.on_session_invalidated(Box::new(move || {
            flag.store(true, Ordering::SeqCst);
        }));

        let result = client.execute(&ApiRequest::get("/resumes")).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(invalidated.load(Ordering::SeqCst));
        assert!(!client.tokens().has_access_token().unwrap());
        assert_eq!(client.tokens().get_refresh_token().unwrap(), None);
    }

    #[tokio::test]
    async fn second_401_is_not_retried_again() {
        let server = MockServer::start().await;

        // The resource rejects both the original and the retried attempt.
        // expect(2) fails the test if a third dispatch ever happens.
        Mock::given(method("GET"))
            .and(path("/resumes"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-access"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        client.tokens().set_session("old-access", "refresh-1").unwrap();

        let result = client.execute(&ApiRequest::get("/resumes")).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(!client.tokens().has_access_token().unwrap());
    }

    #[tokio::test]
    async fn missing_refresh_token_invalidates_without_exchange() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resumes"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        client.tokens().set_access_token("orphaned-access").unwrap();

        let invalidated = Arc::new(AtomicBool::new(false));
        let flag = invalidated.clone();
        client.on_session_invalidated(Box::new(move || {
            flag.store(true, Ordering::SeqCst);
        }));

        let result = client.execute(&ApiRequest::get("/resumes")).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(invalidated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn non_401_errors_propagate_without_refresh() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/resumes/upload"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "No files provided"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        client.tokens().set_session("access", "refresh").unwrap();

        let result = client
            .execute(&ApiRequest::post("/resumes/upload"))
            .await;

        match result {
            Err(ApiError::Validation { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "No files provided");
            }
            other => panic!("Expected validation error, got {:?}", other.map(|_| ())),
        }

        // Tokens are untouched by non-401 failures.
        assert!(client.tokens().has_access_token().unwrap());
    }

    #[tokio::test]
    async fn server_errors_map_to_server_kind() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resumes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        client.tokens().set_access_token("access").unwrap();

        let result = client.execute(&ApiRequest::get("/resumes")).await;
        match result {
            Err(ApiError::Server { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected server error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn post_unauthenticated_sends_no_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "a@b.com",
                "password": "pw"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "A",
                "refresh_token": "R",
                "user": {"id": "1", "email": "a@b.com", "name": "A"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        // Even with a stored token, the unauthenticated path skips it.
        client.tokens().set_access_token("stale").unwrap();

        let body = serde_json::json!({"email": "a@b.com", "password": "pw"});
        let response = client
            .post_unauthenticated("/auth/login", &body)
            .await
            .unwrap();
        assert!(response.status().is_success());

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
    }
}
