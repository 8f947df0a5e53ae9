use super::AppContext;
use crate::output::{self, Output, OutputFormat};
use color_eyre::Result;
use serde_json::json;

pub async fn run_list(watching: bool, completed: bool, history: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.open_store()?;

    // No filter flag means show everything
    let show_all = !(watching || completed || history);
    let (watching, completed, history) = (
        show_all || watching,
        show_all || completed,
        show_all || history,
    );

    match output.format() {
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let mut data = serde_json::Map::new();
            if watching {
                data.insert("watching".into(), json!(store.watching().collect::<Vec<_>>()));
            }
            if completed {
                data.insert("completed".into(), json!(store.completed().collect::<Vec<_>>()));
            }
            if history {
                data.insert("history".into(), json!(store.history()));
            }
            data.insert(
                "counts".into(),
                json!({
                    "watching": store.watching_count(),
                    "completed": store.completed_count(),
                    "history": store.history_count(),
                }),
            );
            output.json(&serde_json::Value::Object(data));
        }
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            if watching {
                print_section(output, "Watching", store.watching_count(), || {
                    output.table(&output::entries_table("Watching", store.watching()));
                });
            }
            if completed {
                print_section(output, "Completed", store.completed_count(), || {
                    output.table(&output::entries_table("Completed", store.completed()));
                });
            }
            if history {
                print_section(output, "History", store.history_count(), || {
                    output.table(&output::history_table(store.history()));
                });
            }
        }
    }

    Ok(())
}

fn print_section(output: &Output, name: &str, count: usize, render: impl FnOnce()) {
    output.heading(name, count);
    if count == 0 {
        output.info("  nothing here yet");
    } else {
        render();
    }
}
