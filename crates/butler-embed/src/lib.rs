use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use butler_core::config::{EmbeddingSettings, DEFAULT_MODEL_DIR};
use butler_core::traits::Embedder;
use butler_core::types::Embedding;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::{l2_normalize, masked_mean};

/// Dimension produced by `paraphrase-MiniLM-L3-v2`; also used by the fake embedder.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Sentence encoder: BERT forward pass + masked mean pooling.
pub struct EmbeddingModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    pad_id: u32,
    max_len: usize,
    batch_size: usize,
    normalize: bool,
}

impl EmbeddingModel {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir(&settings.model_dir)?;
        info!("Loading sentence encoder from {}", model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&config_text)?;
        let dim: usize = serde_json::from_str::<serde_json::Value>(&config_text)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .map_or(DEFAULT_EMBEDDING_DIM, |d| d as usize);

        let vb = load_weights(&model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!("Sentence encoder loaded (dim={})", dim);

        Ok(Self {
            model,
            tokenizer,
            device,
            dim,
            pad_id,
            max_len: settings.max_len,
            batch_size: settings.batch_size,
            normalize: settings.normalize,
        })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let (input_ids, attention_mask) =
            tokenize::tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let mut pooled = masked_mean(&hidden, &attention_mask)?;
        if self.normalize { pooled = l2_normalize(&pooled)?; }
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size.max(1)) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!("Embedded {} texts in {:?}", texts.len(), start.elapsed());
        Ok(out)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    let weights: HashMap<String, Tensor> = if safetensors.exists() {
        candle_core::safetensors::load(&safetensors, device)?
    } else {
        let pickle = model_dir.join("pytorch_model.bin");
        candle_core::pickle::read_all(&pickle)
            .with_context(|| format!("Failed to read weights from {}", pickle.display()))?
            .into_iter()
            .collect()
    };
    Ok(VarBuilder::from_tensors(weights, DTYPE, device))
}

/// Deterministic hashed bag-of-words embedder for tests and development.
///
/// Identical texts map to identical vectors; texts sharing tokens are closer
/// than texts that share none. Output is L2-normalised.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_one(&self, text: &str) -> Embedding {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in tokens(text).enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Whitespace tokens; runs of CJK text have no spaces, so each CJK character is its own token.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().flat_map(|word| {
        let mut out = Vec::new();
        let mut latin = String::new();
        for ch in word.chars() {
            if is_cjk(ch) {
                if !latin.is_empty() { out.push(std::mem::take(&mut latin)); }
                out.push(ch.to_string());
            } else {
                latin.extend(ch.to_lowercase());
            }
        }
        if !latin.is_empty() { out.push(latin); }
        out
    })
}

fn is_cjk(ch: char) -> bool { matches!(ch, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}' | '\u{f900}'..='\u{faff}') }

fn fake_requested_by_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if settings.use_fake || fake_requested_by_env() {
        info!("Using FakeEmbedder (dim={})", DEFAULT_EMBEDDING_DIM);
        return Ok(Box::new(FakeEmbedder::new(DEFAULT_EMBEDDING_DIM)));
    }
    Ok(Box::new(EmbeddingModel::new(settings)?))
}

fn resolve_model_dir(configured: &Path) -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() { info!("Using {}: {}", var, p.display()); return Ok(p); }
            warn!("{} points to missing directory {}", var, p.display());
        }
    }
    if configured.exists() { return Ok(configured.to_path_buf()); }
    let fallback = Path::new(DEFAULT_MODEL_DIR);
    if fallback.exists() { info!("Using fallback model dir: {}", fallback.display()); return Ok(fallback.to_path_buf()); }
    Err(anyhow!("Could not locate sentence encoder model directory (tried {})", configured.display()))
}
