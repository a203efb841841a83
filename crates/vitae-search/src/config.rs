use crate::error::SearchError;
use crate::relevance::ScoreMapping;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "vitae.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitaeConfig {
    #[serde(default)]
    pub lexical: Bm25Config,
    #[serde(default)]
    pub hybrid: HybridConfig,
    #[serde(default)]
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub embedder: EmbedderConfig,
}

/// BM25 Okapi parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term-frequency saturation (default: 1.5).
    #[serde(default = "default_k1")]
    pub k1: f32,
    /// Length normalization strength in `[0, 1]` (default: 0.75).
    #[serde(default = "default_b")]
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

/// Linear fusion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridConfig {
    /// Weight of the dense score; lexical gets `1 - alpha` (default: 0.5).
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// Each index is asked for `top_k * fanout` candidates (default: 2).
    #[serde(default = "default_fanout")]
    pub fanout: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            fanout: default_fanout(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceConfig {
    #[serde(default)]
    pub mapping: ScoreMapping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// Built-in feature-hashing embedder, no model files.
    #[default]
    Hashing,
    /// Model2Vec static embeddings (requires the `model2vec` feature).
    Model2vec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub kind: EmbedderKind,
    /// Vector length for the hashing embedder (default: 384).
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Local path or hub id for Model2Vec.
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::default(),
            dimension: default_dimension(),
            model: None,
        }
    }
}

impl VitaeConfig {
    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidWeight`] for an out-of-range alpha and
    /// [`SearchError::InvalidConfig`] for any other bad value.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.hybrid.alpha.is_finite() && (0.0..=1.0).contains(&self.hybrid.alpha)) {
            return Err(SearchError::InvalidWeight(self.hybrid.alpha));
        }
        if self.hybrid.fanout == 0 {
            return Err(SearchError::InvalidConfig(
                "hybrid.fanout must be at least 1".into(),
            ));
        }
        if !(self.lexical.k1.is_finite() && self.lexical.k1 >= 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "lexical.k1 must be a non-negative number, got {}",
                self.lexical.k1
            )));
        }
        if !(self.lexical.b.is_finite() && (0.0..=1.0).contains(&self.lexical.b)) {
            return Err(SearchError::InvalidConfig(format!(
                "lexical.b must be within [0, 1], got {}",
                self.lexical.b
            )));
        }
        if self.embedder.dimension == 0 {
            return Err(SearchError::InvalidConfig(
                "embedder.dimension must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Resolve and load configuration.
///
/// Precedence: `explicit` path (must exist) → `<cwd>/vitae.toml` →
/// `<config dir>/vitae/config.toml` → defaults.
///
/// # Errors
///
/// Returns an error if an explicit file is missing, a file cannot be read or
/// parsed, or the resulting values fail [`VitaeConfig::validate`].
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<VitaeConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(cwd),
    };

    let Some(path) = path else {
        return Ok(VitaeConfig::default());
    };

    let config = read_config(&path)?;
    config
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(config)
}

fn discover_config(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("vitae/config.toml");
    user.exists().then_some(user)
}

fn read_config(path: &Path) -> Result<VitaeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<VitaeConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_k1() -> f32 {
    1.5
}

const fn default_b() -> f32 {
    0.75
}

const fn default_alpha() -> f32 {
    0.5
}

const fn default_fanout() -> usize {
    2
}

const fn default_dimension() -> usize {
    384
}
