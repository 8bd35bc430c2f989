//! Resume screener command-line client.
//!
//! Thin front end over the session and resume controllers; all auth and
//! collection logic lives in the `auth-client` and `resume-client` crates.

mod commands;

use clap::{Parser, Subcommand};
use client_config::{init_logging, Config, Paths};
use std::path::PathBuf;

/// Resume screener command-line interface.
#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Upload resumes for scoring and manage the results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Base directory for config and token storage. Defaults to ~/.screener
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Signup {
        email: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Password (prompted via env to avoid shell history; pass with --password)
        #[arg(long, env = "SCREENER_PASSWORD")]
        password: String,
    },
    /// Log in with email and password
    Login {
        email: String,
        #[arg(long, env = "SCREENER_PASSWORD")]
        password: String,
    },
    /// Log out and clear stored credentials
    Logout,
    /// Show the current session
    Whoami,
    /// List stored resumes with their scores
    List {
        /// Sort descending by overall score
        #[arg(long)]
        sort: bool,
    },
    /// Upload resume files for scoring
    Upload {
        /// Paths of resume files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete a single resume by ID
    Delete { id: String },
    /// Delete several resumes by ID
    DeleteBatch {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every stored resume
    ClearAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    let app = commands::App::new(&config, &paths)?;

    match cli.command {
        Commands::Signup {
            email,
            name,
            password,
        } => app.signup(&email, &password, &name).await?,
        Commands::Login { email, password } => app.login(&email, &password).await?,
        Commands::Logout => app.logout().await?,
        Commands::Whoami => app.whoami().await?,
        Commands::List { sort } => app.list(sort).await?,
        Commands::Upload { files } => app.upload(&files).await?,
        Commands::Delete { id } => app.delete(&id).await?,
        Commands::DeleteBatch { ids } => app.delete_batch(ids).await?,
        Commands::ClearAll => app.clear_all().await?,
    }

    Ok(())
}
