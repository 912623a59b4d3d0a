//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_DATA__STATE_FILE`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against the directory the config was loaded from.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub const DEFAULT_KNOWLEDGE_DIR: &str = "knowledge";
pub const DEFAULT_STATE_FILE: &str = "device_state.json";
pub const DEFAULT_MODEL_DIR: &str = "models/paraphrase-MiniLM-L3-v2";
pub const DEFAULT_TOP_K: usize = 3;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.settings()?;
        Ok(config)
    }

    /// Build from an in-memory TOML document; environment variables are not merged.
    pub fn from_toml_str(toml: &str, base_dir: &Path) -> Self {
        Self { figment: Figment::new().merge(Toml::string(toml)), base_dir: base_dir.to_path_buf() }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn base_dir(&self) -> &Path { &self.base_dir }

    /// Typed view of the configuration with defaults applied and paths resolved.
    pub fn settings(&self) -> crate::error::Result<Settings> {
        let raw: RawSettings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let settings = Settings {
            knowledge_dir: resolve_with_base(&self.base_dir, &raw.data.knowledge_dir),
            state_file: resolve_with_base(&self.base_dir, &raw.data.state_file),
            embedding: EmbeddingSettings {
                model_dir: resolve_with_base(&self.base_dir, &raw.embedding.model_dir),
                use_fake: raw.embedding.use_fake,
                batch_size: raw.embedding.batch_size,
                max_len: raw.embedding.max_len,
                normalize: raw.embedding.normalize,
            },
            top_k: raw.retrieval.top_k,
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub knowledge_dir: PathBuf,
    pub state_file: PathBuf,
    pub embedding: EmbeddingSettings,
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSettings {
    pub model_dir: PathBuf,
    pub use_fake: bool,
    pub batch_size: usize,
    pub max_len: usize,
    pub normalize: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: PathBuf::from(DEFAULT_MODEL_DIR), use_fake: false, batch_size: 32, max_len: 128, normalize: false }
    }
}

impl Settings {
    fn validate(&self) -> crate::error::Result<()> {
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be greater than 0".into()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be greater than 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    data: RawData,
    embedding: RawEmbedding,
    retrieval: RawRetrieval,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawData {
    knowledge_dir: String,
    state_file: String,
}

impl Default for RawData {
    fn default() -> Self {
        Self { knowledge_dir: DEFAULT_KNOWLEDGE_DIR.to_string(), state_file: DEFAULT_STATE_FILE.to_string() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawEmbedding {
    model_dir: String,
    use_fake: bool,
    batch_size: usize,
    max_len: usize,
    normalize: bool,
}

impl Default for RawEmbedding {
    fn default() -> Self {
        let d = EmbeddingSettings::default();
        Self {
            model_dir: DEFAULT_MODEL_DIR.to_string(),
            use_fake: d.use_fake,
            batch_size: d.batch_size,
            max_len: d.max_len,
            normalize: d.normalize,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawRetrieval {
    top_k: usize,
}

impl Default for RawRetrieval {
    fn default() -> Self { Self { top_k: DEFAULT_TOP_K } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
