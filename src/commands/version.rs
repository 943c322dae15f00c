//! Version lifecycle commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use quotever_core::config::AppConfig;
use quotever_core::error::{AppError, ErrorKind};
use quotever_core::types::id::{DocumentId, UserId, VersionId};
use quotever_entity::change::Change;
use quotever_entity::version::{CreateVersionRequest, Version, VersionSummary};

/// Arguments for version commands
#[derive(Debug, Args)]
pub struct VersionArgs {
    /// Version subcommand
    #[command(subcommand)]
    pub command: VersionCommand,
}

/// Version subcommands
#[derive(Debug, Subcommand)]
pub enum VersionCommand {
    /// Snapshot a quotation's live state as a new draft version
    Create {
        /// Document id
        document: DocumentId,
        /// Version label (at most 100 characters)
        #[arg(short, long)]
        name: Option<String>,
        /// Why the version was taken (at most 500 characters)
        #[arg(short, long)]
        reason: Option<String>,
        /// Acting user
        #[arg(long, env = "QUOTEVER_USER")]
        user: UserId,
    },
    /// List a quotation's versions
    List {
        /// Document id
        document: DocumentId,
    },
    /// Show one version
    Show {
        /// Version id
        id: VersionId,
        /// Also print the decoded snapshot
        #[arg(long)]
        snapshot: bool,
    },
    /// Show a quotation's active version
    Active {
        /// Document id
        document: DocumentId,
    },
    /// Make a version the active one without touching live state
    Activate {
        /// Document id
        document: DocumentId,
        /// Version number
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        number: Option<i32>,
        /// Version id
        #[arg(long)]
        id: Option<VersionId>,
    },
    /// List field changes between two versions
    Compare {
        /// Document id
        document: DocumentId,
        /// Older version id
        from: VersionId,
        /// Newer version id
        to: VersionId,
    },
    /// List field changes from a version to the live state
    Drift {
        /// Document id
        document: DocumentId,
        /// Version id
        version: VersionId,
    },
    /// Restore live state from a version and record it as the active version
    Rollback {
        /// Document id
        document: DocumentId,
        /// Version to restore
        version: VersionId,
        /// Reason recorded on the new version
        #[arg(short, long)]
        reason: Option<String>,
        /// Acting user
        #[arg(long, env = "QUOTEVER_USER")]
        user: UserId,
    },
    /// Permanently delete an inactive version
    Delete {
        /// Version id
        id: VersionId,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Version display row for table output
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version number
    #[tabled(rename = "#")]
    number: i32,
    /// Version ID
    id: String,
    /// Label
    name: String,
    /// Lifecycle state
    state: String,
    /// Change reason
    reason: String,
    /// Author
    created_by: String,
    /// Created at
    created_at: String,
}

impl From<&VersionSummary> for VersionRow {
    fn from(v: &VersionSummary) -> Self {
        Self {
            number: v.version_number,
            id: v.id.to_string(),
            name: v.version_name.clone().unwrap_or_default(),
            state: v.state().to_string(),
            reason: v.change_reason.clone().unwrap_or_default(),
            created_by: v.created_by.to_string(),
            created_at: v.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl From<&Version> for VersionRow {
    fn from(v: &Version) -> Self {
        Self::from(&v.summary())
    }
}

/// Change display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ChangeRow {
    /// Field path
    field: String,
    /// Change type
    change: String,
    /// Old value
    old: String,
    /// New value
    new: String,
}

impl From<&Change> for ChangeRow {
    fn from(c: &Change) -> Self {
        Self {
            field: c.field_name.clone(),
            change: c.change_type.to_string(),
            old: c.old_value.as_ref().map(ToString::to_string).unwrap_or_default(),
            new: c.new_value.as_ref().map(ToString::to_string).unwrap_or_default(),
        }
    }
}

/// Execute version commands
pub async fn execute(
    args: &VersionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;

    match &args.command {
        VersionCommand::Create {
            document,
            name,
            reason,
            user,
        } => {
            let request = CreateVersionRequest {
                document_id: *document,
                version_name: name.clone(),
                change_reason: reason.clone(),
                created_by: *user,
            };
            let version = manager.create_version(request).await?;
            print_version(&version, format);
        }
        VersionCommand::List { document } => {
            let versions = manager.list_versions(*document).await?;
            match format {
                OutputFormat::Json => output::print_json(&versions),
                OutputFormat::Table => {
                    let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        VersionCommand::Show { id, snapshot } => {
            let version = manager.get_version(*id).await?;
            print_version(&version, format);
            if *snapshot {
                let state = manager.decode_snapshot(&version)?;
                output::print_json(&state);
            }
        }
        VersionCommand::Active { document } => match manager.get_active_version(*document).await? {
            Some(version) => print_version(&version, format),
            None => output::print_warning(&format!("Document {} has no active version", document)),
        },
        VersionCommand::Activate {
            document,
            number,
            id,
        } => {
            let version = match (number, id) {
                (Some(number), _) => manager.activate_version(*document, *number).await?,
                (None, Some(id)) => manager.activate_version_id(*document, *id).await?,
                (None, None) => {
                    return Err(AppError::validation("Either --number or --id is required"));
                }
            };
            output::print_success(&format!(
                "Version {} of document {} is now active",
                version.version_number, document
            ));
        }
        VersionCommand::Compare { document, from, to } => {
            let changes = manager.compare_versions(*document, *from, *to).await?;
            print_changes(&changes, format);
        }
        VersionCommand::Drift { document, version } => {
            let changes = manager.diff_against_live(*document, *version).await?;
            print_changes(&changes, format);
        }
        VersionCommand::Rollback {
            document,
            version,
            reason,
            user,
        } => {
            let restored = manager
                .rollback_to_version(*document, *version, reason.clone(), *user)
                .await?;
            print_version(&restored, format);
        }
        VersionCommand::Delete { id, yes } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Permanently delete version {}?", id))
                    .default(false)
                    .interact()
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Internal, "Input error", e)
                    })?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            manager.delete_version(*id).await?;
            output::print_success(&format!("Version {} deleted", id));
        }
    }

    Ok(())
}

fn print_version(version: &Version, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(&version.summary()),
        OutputFormat::Table => {
            output::print_row(&VersionRow::from(version), format);
            output::print_kv("Document", &version.document_id.to_string());
            output::print_kv("Content hash", &version.content_hash);
            if let Some(at) = version.activated_at {
                output::print_kv("Activated at", &at.format("%Y-%m-%d %H:%M:%S").to_string());
            }
        }
    }
}

fn print_changes(changes: &[Change], format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(changes),
        OutputFormat::Table => {
            if changes.is_empty() {
                output::print_success("No differences.");
            } else {
                let rows: Vec<ChangeRow> = changes.iter().map(ChangeRow::from).collect();
                output::print_list(&rows, format);
            }
        }
    }
}
