use crate::output::Output;
use animeshelf_config::PathManager;
use animeshelf_core::FileKeyValueStore;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;

pub async fn run_clear(all: bool, cache: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_cache(&path_manager, output)?;
        clear_credentials(&path_manager, output)?;
        output.success("Local data and credentials cleared");
        return Ok(());
    }

    if cache {
        clear_cache(&path_manager, output)?;
    }

    if credentials {
        clear_credentials(&path_manager, output)?;
    }

    if !cache && !credentials {
        output.warn("No clear option specified. Use --cache, --credentials, or --all");
        output.info("\nExample: animeshelf clear --cache");
    }

    Ok(())
}

/// Wipe the cached watch-list and history; the server copy is untouched
fn clear_cache(path_manager: &PathManager, output: &Output) -> Result<()> {
    let storage_dir = path_manager.storage_dir();
    if !storage_dir.exists() {
        output.info("No local data found to clear");
        return Ok(());
    }

    let kv = FileKeyValueStore::from_paths(path_manager)
        .map_err(|e| eyre!("Failed to open local storage at {}: {}", storage_dir.display(), e))?;
    kv.clear()
        .map_err(|e| eyre!("Failed to clear local storage at {}: {}", storage_dir.display(), e))?;

    output.success(format!("Cleared local data: {}", storage_dir.display()));
    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file)
            .map_err(|e| eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e))?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }

    Ok(())
}
