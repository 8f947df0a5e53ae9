use super::AppContext;
use crate::output::{Output, OutputFormat};
use animeshelf_config::CredentialStore;
use animeshelf_core::SnapshotSource;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

pub async fn run_sync(output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let mut ctx = AppContext::load()?;
    if !ctx.credentials.is_logged_in() {
        output.warn("Not logged in; the server will likely reject the request. Run 'animeshelf login' first.");
    }

    let mut store = ctx.open_store()?;
    let source = store.fetch_user_anime_list().await;

    // A rejected token is dead; drop the session like the web client does
    let session_ended = source.is_unauthorized();
    if session_ended {
        end_session(&mut ctx.credentials)?;
    }

    let source_name = match &source {
        SnapshotSource::Remote => "remote",
        SnapshotSource::Cache { .. } => "cache",
    };

    match output.format() {
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let reason = match &source {
                SnapshotSource::Cache { reason } => Some(reason.to_string()),
                SnapshotSource::Remote => None,
            };
            output.json(&json!({
                "source": source_name,
                "reason": reason,
                "session_ended": session_ended,
                "watching": store.watching_count(),
                "completed": store.completed_count(),
                "history": store.history_count(),
            }));
        }
        OutputFormat::Human => {
            let summary = format!(
                "{} watching, {} completed, {} in history",
                store.watching_count(),
                store.completed_count(),
                store.history_count()
            );
            match &source {
                SnapshotSource::Remote => output.success(format!("Synced from server: {}", summary)),
                SnapshotSource::Cache { reason } => {
                    output.warn(format!("Server unavailable ({}), using cached data: {}", reason, summary));
                }
            }
            if session_ended {
                output.warn("The server rejected the stored token. You have been logged out; run 'animeshelf login' again.");
            }
        }
    }

    Ok(())
}

/// Forget the stored token and user and write the change out
fn end_session(credentials: &mut CredentialStore) -> Result<()> {
    credentials.logout();
    credentials.save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))
}
