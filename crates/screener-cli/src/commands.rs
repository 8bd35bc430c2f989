//! Command handlers wiring the controllers to terminal output.

use auth_client::{ApiClient, FilePart, SessionController, SessionState};
use client_config::{Config, Paths};
use resume_client::{ResumeManager, ResumeRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Shared application state for all subcommands.
pub struct App {
    session: SessionController,
    resumes: ResumeManager,
}

impl App {
    /// Wire up the token store, API client, and controllers.
    pub fn new(config: &Config, paths: &Paths) -> Result<Self, Box<dyn std::error::Error>> {
        let store = token_store::create_token_store(paths)?;
        let api = Arc::new(ApiClient::new(config.api_base_url.clone(), Arc::new(store)));

        api.on_session_invalidated(Box::new(|| {
            eprintln!("Session expired. Please log in again with `screener login`.");
        }));

        Ok(Self {
            session: SessionController::new(api.clone()),
            resumes: ResumeManager::new(api),
        })
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self.session.signup(email, password, name).await {
            Ok(user) => {
                println!("Account created. Logged in as {} <{}>", user.name, user.email);
                Ok(())
            }
            Err(e) => {
                let message = self
                    .session
                    .last_error()
                    .unwrap_or_else(|| "Signup failed".to_string());
                eprintln!("{}", message);
                Err(e.into())
            }
        }
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self.session.login(email, password).await {
            Ok(user) => {
                println!("Logged in as {} <{}>", user.name, user.email);
                Ok(())
            }
            Err(e) => {
                let message = self
                    .session
                    .last_error()
                    .unwrap_or_else(|| "Login failed".to_string());
                eprintln!("{}", message);
                Err(e.into())
            }
        }
    }

    pub async fn logout(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.session.logout().await?;
        println!("Logged out.");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.session.initialize().await?;
        match self.session.state() {
            SessionState::Authenticated(user) => {
                println!("{} <{}>", user.name, user.email);
            }
            _ => println!("Not logged in."),
        }
        Ok(())
    }

    pub async fn list(&self, sort: bool) -> Result<(), Box<dyn std::error::Error>> {
        let mut records = self.resumes.fetch_resumes().await?;
        if sort {
            records.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        }
        print_table(&records);
        Ok(())
    }

    pub async fn upload(&self, files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
        let mut parts = Vec::with_capacity(files.len());
        for file in files {
            parts.push(read_file_part(file)?);
        }

        let outcome = self.resumes.upload(parts).await?;
        println!("Scored {} file(s).", outcome.results.len());
        for error in &outcome.errors {
            eprintln!("Rejected: {}", error);
        }
        print_table(&self.resumes.resumes());
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.resumes.fetch_resumes().await?;
        self.resumes.delete_resume(id).await?;
        println!("Deleted {}.", id);
        Ok(())
    }

    pub async fn delete_batch(&self, ids: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
        self.resumes.fetch_resumes().await?;
        self.resumes.delete_batch(&ids).await?;
        println!("Deleted {} resume(s).", ids.len());
        Ok(())
    }

    pub async fn clear_all(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.resumes.clear_all().await?;
        println!("All resumes deleted.");
        Ok(())
    }
}

/// Read a file from disk into an upload part, keeping its filename.
fn read_file_part(path: &Path) -> Result<FilePart, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| {
            warn!(path = %path.display(), "Could not determine filename");
            "resume".to_string()
        });
    Ok(FilePart { filename, bytes })
}

/// Render the score table.
fn print_table(records: &[ResumeRecord]) {
    if records.is_empty() {
        println!("No resumes stored.");
        return;
    }

    println!(
        "{:<26} {:<24} {:>6} {:>6} {:>8} {:>6} {:>8}",
        "ID", "FILENAME", "AI/ML", "LLM", "PYTHON", "EXP", "OVERALL"
    );
    for record in records {
        println!(
            "{:<26} {:<24} {:>5}% {:>5}% {:>7}% {:>5}% {:>7}%",
            record.id,
            record.filename,
            record.scores.ai_ml_match,
            record.scores.llm_match,
            record.scores.python_match,
            record.scores.experience_match,
            record.overall_score
        );
    }
}
