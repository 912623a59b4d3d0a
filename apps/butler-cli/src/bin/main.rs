use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use butler_core::config::{Config, Settings};
use butler_devices::{describe_device, AttrValue, Attributes, DeviceStore, PowerState};
use butler_rag::{compose_prompt, prompt_messages, RetrievalEngine, SYSTEM_PROMPT};

#[derive(Parser)]
#[command(name = "butler", version, about = "Smart-home butler: device control and manual lookup")]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, global = true, default_value = ".")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every device and its attributes
    Devices,
    /// Switch a device on or off, optionally updating attributes
    Control {
        device: String,
        /// on | off | 开启 | 关闭
        action: PowerState,
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_update)]
        set: Vec<(String, AttrValue)>,
    },
    /// Print the manual passages closest to a query
    Retrieve {
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Retrieve passages and print the prompt for the chat model
    Ask {
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Emit the chat messages as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_update(raw: &str) -> Result<(String, AttrValue), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() { return Err("attribute key is empty".to_string()); }
    Ok((key.to_string(), AttrValue::parse(value)))
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config).map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    match cli.command {
        Command::Devices => {
            let store = DeviceStore::new(&settings.state_file);
            for (name, record) in &store.load() {
                println!("{}\n", describe_device(name, record));
            }
        }
        Command::Control { device, action, set } => {
            let store = DeviceStore::new(&settings.state_file);
            let updates: Attributes = set.into_iter().collect();
            match store.control_device(&device, action, &updates) {
                Ok(true) => {
                    println!("✨ {} {}", device, action);
                    if let Some(record) = store.load().get(&device) { println!("{}", describe_device(&device, record)); }
                }
                Ok(false) => {
                    eprintln!("Unknown device: {}", device);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => {
                    eprintln!("❌ {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Retrieve { query, top_k } => {
            let engine = build_engine(&settings)?;
            let docs = engine.retrieve_documents(&query, top_k.unwrap_or(settings.top_k))?;
            if docs.is_empty() { println!("No documents in {}", settings.knowledge_dir.display()); }
            for (rank, doc) in docs.iter().enumerate() {
                println!("{}. {} (distance {:.4})\n{}\n", rank + 1, doc.id, doc.distance, doc.text.trim_end());
            }
        }
        Command::Ask { query, top_k, json } => {
            let engine = build_engine(&settings)?;
            let docs = engine.retrieve(&query, top_k.unwrap_or(settings.top_k))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&prompt_messages(&docs, &query))?);
            } else {
                println!("[system]\n{}\n\n[user]\n{}", SYSTEM_PROMPT, compose_prompt(&docs, &query));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn build_engine(settings: &Settings) -> anyhow::Result<RetrievalEngine> {
    RetrievalEngine::from_settings(settings)
        .with_context(|| format!("Failed to build retrieval index from {}", settings.knowledge_dir.display()))
}
