use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context as _, bail};
use inline_format_core::{
    ActionEvent, Document, DocumentValue, RecordingApi, ToolRegistry, ToolsConfig,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum Step {
    /// Select the first occurrence of `text`.
    Select { text: String },
    Blur,
    CheckState,
    Surround { tool: String },
    /// Run whichever tool is bound to `keys`.
    Shortcut { keys: String },
    Action { tool: String, event: ActionEvent },
    Clear,
    Value,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: Option<ToolsConfig>,
    steps: Vec<Step>,
}

fn usage() -> ! {
    eprintln!("usage: inline-format-playground <document.html> <script.json>");
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(html_path), Some(script_path)) = (args.next(), args.next()) else {
        usage();
    };
    let html_path = PathBuf::from(html_path);
    let script_path = PathBuf::from(script_path);

    let html = std::fs::read_to_string(&html_path)
        .with_context(|| format!("reading {}", html_path.display()))?;
    let script: Script = serde_json::from_str(
        &std::fs::read_to_string(&script_path)
            .with_context(|| format!("reading {}", script_path.display()))?,
    )
    .with_context(|| format!("parsing {}", script_path.display()))?;

    let config = script.config.unwrap_or_default();
    let mut doc = Document::from_html_with(html.trim(), config.blocks.clone())
        .with_context(|| format!("parsing {}", html_path.display()))?;
    let api = Rc::new(RecordingApi::new());
    let mut tools = ToolRegistry::standard(&config, api.clone())?;
    log::debug!("tools: {:?}", tools.ids());

    for (ix, step) in script.steps.into_iter().enumerate() {
        println!("-- step {ix}: {step:?}");
        match step {
            Step::Select { text } => {
                if !doc.select_text(&text) {
                    bail!("step {ix}: {text:?} does not occur in the document");
                }
                println!("selected {:?}", doc.selected_text());
            }
            Step::Blur => doc.blur(),
            Step::CheckState => {
                for (id, active) in tools.check_states(&mut doc)? {
                    println!("{id}: {}", if active { "active" } else { "inactive" });
                }
            }
            Step::Surround { tool } => {
                let range = doc.selection();
                let outcome = tools.surround(&tool, &mut doc, range)?;
                println!("{}", serde_json::to_string(&outcome)?);
            }
            Step::Shortcut { keys } => {
                let Some(tool) = tools.tool_for_shortcut(&keys) else {
                    bail!("step {ix}: no tool is bound to {keys}");
                };
                let range = doc.selection();
                let outcome = tools.surround(tool, &mut doc, range)?;
                println!("{tool}: {}", serde_json::to_string(&outcome)?);
            }
            Step::Action { tool, event } => {
                let outcome = tools.handle_action(&tool, &mut doc, event)?;
                println!("{}", serde_json::to_string(&outcome)?);
            }
            Step::Clear => tools.clear_all(&mut doc)?,
            Step::Value => {
                println!("{}", DocumentValue::from_document(&doc).to_json_pretty()?);
            }
        }

        for event in api.take_events() {
            println!("host: {}", serde_json::to_string(&event)?);
        }
        println!("{}", doc.to_html());
    }

    Ok(())
}
