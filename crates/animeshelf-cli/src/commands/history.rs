use super::{resolve_video, AppContext};
use crate::output::{self, Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

pub async fn run_add(
    video_id: u64,
    episode_id: u64,
    episode_title: String,
    progress: f64,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    if !progress.is_finite() || progress < 0.0 {
        return Err(eyre!("Progress must be a non-negative number of seconds, got {}", progress));
    }

    let ctx = AppContext::load()?;
    let mut store = ctx.open_store()?;

    let video = resolve_video(&store, video_id, title);
    let display = video.display_title();
    store.add_to_history(video, episode_id, episode_title.as_str(), progress);
    store.settle().await;

    output.success(format!(
        "Recorded {} {} at {}",
        display,
        episode_title,
        output::format_progress(progress)
    ));
    Ok(())
}

pub async fn run_show(video_id: Option<u64>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.open_store()?;

    let Some(video_id) = video_id else {
        match output.format() {
            OutputFormat::Human => {
                if store.history().is_empty() {
                    output.info("Watch history is empty");
                } else {
                    output.table(&output::history_table(store.history()));
                }
            }
            _ => output.json(&json!({ "history": store.history() })),
        }
        return Ok(());
    };

    match (output.format(), store.get_history_item(video_id)) {
        (OutputFormat::Human, Some(entry)) => {
            output.table(&output::history_table(std::slice::from_ref(entry)));
        }
        (OutputFormat::Human, None) => output.info(format!("No history for #{}", video_id)),
        (_, entry) => output.json(&json!({ "videoId": video_id, "entry": entry })),
    }
    Ok(())
}

pub async fn run_remove(video_id: u64, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.open_store()?;

    let removed = store.remove_history_item(video_id);
    store.settle().await;

    if removed {
        output.success(format!("Removed #{} from the watch history", video_id));
    } else {
        output.warn(format!("#{} had no history entry", video_id));
    }
    Ok(())
}

pub async fn run_clear(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.open_store()?;

    let cleared = store.history_count();
    store.clear_history();
    store.settle().await;

    output.success(format!("Cleared {} history entr{}", cleared, if cleared == 1 { "y" } else { "ies" }));
    Ok(())
}
