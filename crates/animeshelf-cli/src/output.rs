use animeshelf_models::{AnimeListEntry, HistoryEntry};
use clap::ValueEnum;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message("success", "✓".green().to_string(), msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", "⚠".yellow().to_string(), msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are shown even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
            }
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }

        self.print_json(data);
    }

    /// Section title with an item count; human mode only, like `table`
    pub fn heading(&self, title: &str, count: usize) {
        if !self.shows_human() {
            return;
        }
        println!("\n{} {}", title.bright_cyan().bold(), format!("({})", count).bright_black());
    }

    /// Print a table in human mode; other formats render their own payload
    pub fn table(&self, table: &Table) {
        if !self.shows_human() {
            return;
        }
        println!("{}", table);
    }

    /// Headings and tables only make sense on a non-quiet human terminal
    fn shows_human(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Human
    }

    fn message(&self, kind: &str, marker: String, msg: &str) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{} {}", marker, msg),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": kind, "message": msg }));
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => println!("{}", data),
        }
    }
}

fn styled_table(title: &str, columns: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                // The first header cell carries the table title
                let text = if i == 0 { format!("{} {}", title, column) } else { column.to_string() };
                Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold)
            })
            .collect::<Vec<_>>(),
    );
    table
}

pub fn entries_table<'a>(title: &str, entries: impl IntoIterator<Item = &'a AnimeListEntry>) -> Table {
    let mut table = styled_table(title, &["ID", "Title", "Status", "Added"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.video_id),
            Cell::new(entry.title()),
            Cell::new(entry.status),
            Cell::new(entry.added_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table
}

pub fn history_table(history: &[HistoryEntry]) -> Table {
    let mut table = styled_table("History", &["ID", "Title", "Episode", "Progress", "Watched"]);
    for entry in history {
        table.add_row(vec![
            Cell::new(entry.video_id),
            Cell::new(entry.title()),
            Cell::new(format!("{} ({})", entry.episode_title, entry.episode_id)),
            Cell::new(format_progress(entry.progress)),
            Cell::new(entry.watched_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table
}

/// Playback position in seconds, shown as m:ss
pub fn format_progress(progress: f64) -> String {
    let seconds = if progress.is_finite() && progress > 0.0 { progress as u64 } else { 0 };
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_tables_only_in_human_mode() {
        assert!(Output::new(OutputFormat::Human, false).shows_human());
        assert!(!Output::new(OutputFormat::Human, true).shows_human());
        assert!(!Output::new(OutputFormat::Json, false).shows_human());
        assert!(!Output::new(OutputFormat::JsonPretty, false).shows_human());
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(0.0), "0:00");
        assert_eq!(format_progress(125.7), "2:05");
        assert_eq!(format_progress(-3.0), "0:00");
        assert_eq!(format_progress(f64::NAN), "0:00");
    }
}
