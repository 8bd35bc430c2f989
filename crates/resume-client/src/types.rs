//! Wire types for scored resume records.

use serde::{Deserialize, Serialize};

/// Per-criterion match scores, integer percentages 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeScores {
    pub ai_ml_match: u8,
    pub llm_match: u8,
    pub python_match: u8,
    pub experience_match: u8,
}

/// A stored, scored resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    /// Record ID
    pub id: String,
    /// Uploaded filename
    pub filename: String,
    /// Per-criterion scores
    pub scores: ResumeScores,
    /// Weighted overall score, 0-100
    pub overall_score: u8,
    /// Creation timestamp (ISO 8601)
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Response from `GET /resumes`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    pub resumes: Vec<ResumeRecord>,
}

/// One successfully scored file from an upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedResume {
    pub id: String,
    pub filename: String,
    /// Raw evaluator output (per-criterion scores plus overall_score)
    pub scores: serde_json::Value,
}

/// Response from `POST /resumes/upload`.
///
/// `errors` carries per-file failure messages for files the server
/// rejected while others succeeded.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadOutcome {
    pub results: Vec<UploadedResume>,
    #[serde(default)]
    pub errors: Vec<String>,
}
