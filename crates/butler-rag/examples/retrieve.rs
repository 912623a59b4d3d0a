use std::path::PathBuf;

use butler_core::config::Config;
use butler_rag::{compose_prompt, RetrievalEngine};

fn main() -> anyhow::Result<()> {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..");
    let settings = Config::load_from(&root)?.settings()?;
    let engine = RetrievalEngine::from_settings(&settings)?;
    let query = "洗衣机快洗需要多长时间？";
    let docs = engine.retrieve(query, settings.top_k)?;
    println!("{}", compose_prompt(&docs, query));
    Ok(())
}
