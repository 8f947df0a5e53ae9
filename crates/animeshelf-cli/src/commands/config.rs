use super::AppContext;
use crate::output::{Output, OutputFormat};
use animeshelf_config::Config;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::Set { base_url, timeout_ms, log_level } => {
            set_config(base_url, timeout_ms, log_level, output).await
        }
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let config = &ctx.config;
    let config_file = ctx.paths.config_file();
    let token = ctx.credentials.get_token().map(|t| if full { t.clone() } else { mask_string(t) });
    let user = ctx.credentials.get_user();
    let mode = if config.api.is_mock() { "offline" } else { "online" };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            if !config_file.exists() {
                output.warn(format!("No config file at {}, showing defaults", config_file.display()));
            }

            let mut api_table = section_table("API");
            api_table.add_row(vec![
                Cell::new("Base URL"),
                Cell::new(config.api.base_url().unwrap_or("<not set>")),
            ]);
            api_table.add_row(vec![
                Cell::new("Mode"),
                Cell::new(if config.api.is_mock() { mode.yellow().to_string() } else { mode.green().to_string() }),
            ]);
            api_table.add_row(vec![
                Cell::new("Timeout"),
                Cell::new(format!("{} ms", config.api.timeout_ms)),
            ]);
            println!("{}", api_table);

            let mut session_table = section_table("Session");
            session_table.add_row(vec![
                Cell::new("Logged In"),
                Cell::new(if ctx.credentials.is_logged_in() { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            session_table.add_row(vec![
                Cell::new("Token"),
                Cell::new(token.as_deref().unwrap_or("<not set>")),
            ]);
            if let Some(user) = &user {
                session_table.add_row(vec![Cell::new("User"), Cell::new(&user.username)]);
            }
            println!("{}", session_table);

            let mut paths_table = section_table("Paths");
            paths_table.add_row(vec![Cell::new("Config File"), Cell::new(config_file.display())]);
            paths_table.add_row(vec![Cell::new("Local Storage"), Cell::new(ctx.paths.storage_dir().display())]);
            paths_table.add_row(vec![Cell::new("Log Level"), Cell::new(&config.logging.level)]);
            if let Some(file) = &config.logging.file {
                paths_table.add_row(vec![Cell::new("Log File"), Cell::new(file.display())]);
            }
            println!("{}", paths_table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "api": {
                    "base_url": config.api.base_url(),
                    "timeout_ms": config.api.timeout_ms,
                    "mode": mode,
                },
                "session": {
                    "logged_in": ctx.credentials.is_logged_in(),
                    "token": token,
                    "user": user,
                },
                "logging": {
                    "level": config.logging.level,
                    "file": config.logging.file,
                },
                "storage_dir": ctx.paths.storage_dir(),
            }));
        }
    }

    Ok(())
}

async fn set_config(
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    log_level: Option<String>,
    output: &Output,
) -> Result<()> {
    if base_url.is_none() && timeout_ms.is_none() && log_level.is_none() {
        output.warn("Nothing to set. Use --base-url, --timeout-ms, or --log-level");
        return Ok(());
    }

    let ctx = AppContext::load()?;
    let mut config: Config = ctx.config;

    if let Some(url) = base_url {
        // An empty value switches back to offline mode
        config.api.base_url = Some(url).filter(|u| !u.trim().is_empty());
    }
    if let Some(timeout_ms) = timeout_ms {
        config.api.timeout_ms = timeout_ms;
    }
    if let Some(level) = log_level {
        config.logging.level = level;
    }

    config.validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;

    let config_file = ctx.paths.config_file();
    config.save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}

fn section_table(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return "<not set>".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("secret-token"), "se***en");
    }
}
