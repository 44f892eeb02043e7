use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::filters::FindingFilters;

const CONFIG_FILE: &str = ".findex.toml";
const DEFAULT_FORMAT: &str = "terminal";

/// findex configuration (loaded from .findex.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindexConfig {
    /// `filter[...]` pairs applied on top of the built-in defaults
    #[serde(default)]
    pub filters: BTreeMap<String, String>,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: Option<String>,

    /// Number of findings to show (0 = all)
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FindexConfig {
    /// Try to load .findex.toml from the given directory or its parents
    pub fn load(start: &Path) -> Option<Self> {
        let config_path = find_config_file(start)?;
        debug!("Found config: {}", config_path.display());

        match std::fs::read_to_string(&config_path) {
            Ok(content) => match toml::from_str::<FindexConfig>(&content) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                    None
                }
            },
            Err(e) => {
                debug!("Could not read {}: {}", config_path.display(), e);
                None
            }
        }
    }

    pub fn filters(&self) -> FindingFilters {
        FindingFilters::from_pairs(&self.filters)
    }
}

/// Output format: the `--format` flag, then `[output] format`, then terminal
pub fn output_format(flag: Option<&str>, config: Option<&FindexConfig>) -> String {
    flag.or_else(|| config.and_then(|c| c.output.format.as_deref()))
        .unwrap_or(DEFAULT_FORMAT)
        .to_string()
}

/// Walk up from `start` to find .findex.toml
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let config = current.join(CONFIG_FILE);
        if config.exists() {
            return Some(config);
        }
        if !current.pop() {
            return None;
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# findex configuration

[filters]
# Applied on top of the built-in defaults (filter[status]=FAIL, filter[delta]=new).
# An empty value removes a default.
# "filter[delta]" = ""
# "filter[severity__in]" = "critical,high"
# "filter[provider.provider]" = "aws"

[output]
# Default output format: "terminal" or "json"
format = "terminal"

# Findings to show, most severe and newest first (0 = all)
# limit = 10
"#;

/// Create a default .findex.toml in the current directory
pub fn init_config() -> Result<()> {
    let dir = std::env::current_dir()?;
    if write_default_config(&dir)? {
        println!("✅ Created {}", CONFIG_FILE);
        println!("   Edit it to customize filters and output.");
    } else {
        println!("⚠️  {} already exists in this directory", CONFIG_FILE);
    }
    Ok(())
}

/// Write the default config into `dir`. Returns false if one already exists.
fn write_default_config(dir: &Path) -> Result<bool> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        return Ok(false);
    }
    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(true)
}
