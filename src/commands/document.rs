//! Live quotation state commands against the bundled document table.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use quotever_core::config::AppConfig;
use quotever_core::error::{AppError, ErrorKind};
use quotever_core::types::id::DocumentId;
use quotever_database::DocumentOwner;
use quotever_entity::document::DocumentState;

/// Arguments for document commands
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document subcommand
    #[command(subcommand)]
    pub command: DocumentCommand,
}

/// Document subcommands
#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// Create or replace a quotation's live state from a JSON file
    Put {
        /// JSON file holding the quotation's top-level fields
        file: PathBuf,
        /// Document id; a new one is generated when omitted
        #[arg(long)]
        id: Option<DocumentId>,
    },
    /// Print a quotation's live state
    Get {
        /// Document id
        id: DocumentId,
    },
}

/// Execute document commands
pub async fn execute(
    args: &DocumentArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let documents = pool.document_store();

    match &args.command {
        DocumentCommand::Put { file, id } => {
            let state = read_state_file(file).await?;
            let document_id = id.unwrap_or_default();
            documents.upsert(document_id, &state).await?;

            match format {
                OutputFormat::Json => {
                    output::print_json(&serde_json::json!({ "document_id": document_id }))
                }
                OutputFormat::Table => {
                    output::print_success(&format!("Document {} stored", document_id))
                }
            }
        }
        DocumentCommand::Get { id } => {
            let state = documents.read_state(*id).await?;
            output::print_json(&state);
        }
    }

    Ok(())
}

/// Read a document state from a JSON file
pub async fn read_state_file(path: &Path) -> Result<DocumentState, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("Cannot read {}", path.display()),
            e,
        )
    })?;
    let json: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("{} is not valid JSON", path.display()),
            e,
        )
    })?;
    DocumentState::try_from(json)
}
