//! Tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::GradingEngineConfig;
use crate::grammar::GrammarConfig;
use crate::scoring::ScoringPolicy;

/// Top-level dikduk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DikdukConfig {
    /// Custom grammar table; the built-in table is used when unset.
    #[serde(default)]
    pub grammar_path: Option<PathBuf>,
    #[serde(default)]
    pub scoring_policy: ScoringPolicy,
    /// Max concurrent per-sentence store reads while grading.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./dikduk-results")
}

impl Default for DikdukConfig {
    fn default() -> Self {
        Self {
            grammar_path: None,
            scoring_policy: ScoringPolicy::default(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

impl DikdukConfig {
    /// The grammar table this configuration points at.
    pub fn grammar(&self) -> Result<GrammarConfig> {
        match &self.grammar_path {
            Some(path) => GrammarConfig::load(path),
            None => Ok(GrammarConfig::builtin()),
        }
    }

    pub fn engine_config(&self) -> GradingEngineConfig {
        GradingEngineConfig {
            parallelism: self.parallelism,
            scoring_policy: self.scoring_policy,
        }
    }
}

/// Expand `${VAR_NAME}` references in one left-to-right pass.
///
/// Unset variables expand to nothing. Substituted values are not expanded
/// again, and an unterminated `${` is kept as written.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        out.push_str(&std::env::var(&tail[2..end]).unwrap_or_default());
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `dikduk.toml` in the current directory
/// 2. `~/.config/dikduk/config.toml`
///
/// Environment variable overrides: `DIKDUK_GRAMMAR`, `DIKDUK_OUTPUT_DIR`.
pub fn load_config() -> Result<DikdukConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DikdukConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("dikduk.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<DikdukConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DikdukConfig::default(),
    };

    // Apply env var overrides
    if let Ok(grammar) = std::env::var("DIKDUK_GRAMMAR") {
        if !grammar.is_empty() {
            config.grammar_path = Some(PathBuf::from(grammar));
        }
    }
    if let Ok(dir) = std::env::var("DIKDUK_OUTPUT_DIR") {
        if !dir.is_empty() {
            config.output_dir = PathBuf::from(dir);
        }
    }

    config.grammar_path = config.grammar_path.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("dikduk"))
}
