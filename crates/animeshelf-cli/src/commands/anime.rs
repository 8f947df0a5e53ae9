use super::{resolve_video, AppContext};
use crate::output::{Output, OutputFormat};
use animeshelf_models::AnimeStatus;
use color_eyre::Result;
use serde_json::json;

pub async fn run_status(video_id: u64, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.open_store()?;
    let status = store.get_status(video_id);

    match output.format() {
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "videoId": video_id,
                "status": status,
                "tracked": status.is_some(),
                "lastWatched": store.get_history_item(video_id),
            }));
        }
        OutputFormat::Human => {
            let title = store
                .known_video(video_id)
                .map(|video| video.display_title())
                .unwrap_or_else(|| format!("#{}", video_id));
            match status {
                Some(status) => output.info(format!("{}: {}", title, status)),
                None => output.info(format!("{}: not tracked", title)),
            }
            if let Some(entry) = store.get_history_item(video_id) {
                output.info(format!(
                    "Last watched {} ({}) on {}",
                    entry.episode_title,
                    entry.episode_id,
                    entry.watched_at.format("%Y-%m-%d %H:%M")
                ));
            }
        }
    }

    Ok(())
}

/// Put a video on the watching or completed list
pub async fn run_track(
    video_id: u64,
    title: Option<String>,
    status: AnimeStatus,
    output: &Output,
) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.open_store()?;

    let previous = store.get_status(video_id);
    let video = resolve_video(&store, video_id, title);
    let display = video.display_title();

    match status {
        AnimeStatus::Watching => store.add_to_watching(video),
        AnimeStatus::Completed => store.add_to_completed(video),
    }
    store.settle().await;

    match previous {
        Some(previous) if previous == status => {
            output.info(format!("{} is already {}", display, status));
        }
        Some(previous) => output.success(format!("Moved {} from {} to {}", display, previous, status)),
        None => output.success(format!("Added {} to {}", display, status)),
    }
    Ok(())
}

pub async fn run_remove(video_id: u64, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.open_store()?;

    let removed = store.remove_anime(video_id);
    store.settle().await;

    if removed {
        output.success(format!("Removed #{} from the watch-list", video_id));
    } else {
        output.warn(format!("#{} was not in the watch-list", video_id));
    }
    Ok(())
}
