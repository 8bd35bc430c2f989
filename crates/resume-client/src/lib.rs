//! In-memory collection of scored resumes, kept in sync with the scoring
//! service through the authenticated request pipeline.
//!
//! All mutations are server-first: the local collection only changes after
//! the corresponding API call succeeds, so a failed delete or batch delete
//! never drops records the server still holds.

mod types;

pub use types::{ResumeRecord, ResumeScores, UploadOutcome, UploadedResume};

use auth_client::{ApiClient, ApiRequest, ApiResult, FilePart};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Owns the client-side collection of scored resume records.
pub struct ResumeManager {
    api: Arc<ApiClient>,
    resumes: Mutex<Vec<ResumeRecord>>,
    last_error: Mutex<Option<String>>,
}

impl ResumeManager {
    /// Create a new manager with an empty collection.
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            resumes: Mutex::new(Vec::new()),
            last_error: Mutex::new(None),
        }
    }

    /// Snapshot of the current collection.
    pub fn resumes(&self) -> Vec<ResumeRecord> {
        self.resumes.lock().unwrap().clone()
    }

    /// Most recent human-readable failure message, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    fn set_error(&self, message: Option<String>) {
        *self.last_error.lock().unwrap() = message;
    }

    /// Fetch all stored resumes, replacing the local collection.
    pub async fn fetch_resumes(&self) -> ApiResult<Vec<ResumeRecord>> {
        self.set_error(None);

        let result: ApiResult<types::ListResponse> = async {
            let response = self.api.execute(&ApiRequest::get("/resumes")).await?;
            Ok(response.json().await?)
        }
        .await;

        match result {
            Ok(data) => {
                debug!(count = data.resumes.len(), "Fetched resume list");
                *self.resumes.lock().unwrap() = data.resumes.clone();
                Ok(data.resumes)
            }
            Err(e) => {
                self.set_error(Some(e.user_message("Failed to fetch resumes")));
                Err(e)
            }
        }
    }

    /// Upload resume files for scoring, then re-fetch the list so the
    /// collection reflects the newly stored records.
    pub async fn upload(&self, files: Vec<FilePart>) -> ApiResult<UploadOutcome> {
        self.set_error(None);

        let result: ApiResult<UploadOutcome> = async {
            let request = ApiRequest::post_multipart("/resumes/upload", files);
            let response = self.api.execute(&request).await?;
            Ok(response.json().await?)
        }
        .await;

        match result {
            Ok(outcome) => {
                info!(
                    scored = outcome.results.len(),
                    rejected = outcome.errors.len(),
                    "Upload processed"
                );
                for error in &outcome.errors {
                    warn!(error = %error, "File rejected by server");
                }
                // The upload already succeeded; a stale list is not an error.
                if let Err(e) = self.fetch_resumes().await {
                    warn!(error = %e, "Refetch after upload failed");
                }
                Ok(outcome)
            }
            Err(e) => {
                self.set_error(Some(e.user_message("Upload failed")));
                Err(e)
            }
        }
    }

    /// Fetch a single resume by ID.
    pub async fn get(&self, id: &str) -> ApiResult<ResumeRecord> {
        let response = self
            .api
            .execute(&ApiRequest::get(format!("/resumes/{}", id)))
            .await?;
        Ok(response.json().await?)
    }

    /// Delete a single resume. The local record is removed only after the
    /// server confirms.
    pub async fn delete_resume(&self, id: &str) -> ApiResult<()> {
        match self
            .api
            .execute(&ApiRequest::delete(format!("/resumes/{}", id)))
            .await
        {
            Ok(_) => {
                self.resumes.lock().unwrap().retain(|r| r.id != id);
                debug!(id = %id, "Deleted resume");
                Ok(())
            }
            Err(e) => {
                self.set_error(Some(e.user_message("Delete failed")));
                Err(e)
            }
        }
    }

    /// Delete a batch of resumes. On failure no local record is removed.
    pub async fn delete_batch(&self, ids: &[String]) -> ApiResult<()> {
        let body = serde_json::json!({ "resume_ids": ids });
        match self
            .api
            .execute(&ApiRequest::post_json("/resumes/batch/delete", body))
            .await
        {
            Ok(_) => {
                self.resumes
                    .lock()
                    .unwrap()
                    .retain(|r| !ids.contains(&r.id));
                debug!(count = ids.len(), "Deleted resume batch");
                Ok(())
            }
            Err(e) => {
                self.set_error(Some(e.user_message("Batch delete failed")));
                Err(e)
            }
        }
    }

    /// Delete every stored resume.
    pub async fn clear_all(&self) -> ApiResult<()> {
        match self
            .api
            .execute(&ApiRequest::delete("/resumes/clear-all"))
            .await
        {
            Ok(_) => {
                self.resumes.lock().unwrap().clear();
                info!("Cleared all resumes");
                Ok(())
            }
            Err(e) => {
                self.set_error(Some(e.user_message("Clear failed")));
                Err(e)
            }
        }
    }
}
