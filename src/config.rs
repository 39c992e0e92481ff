//! Application configuration: named palette ramps and conversion defaults.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::palette::{BLOCK_RAMP, CLASSIC_RAMP, DENSE_RAMP};

/// Default character width for still images / console use.
pub const DEFAULT_STILL_WIDTH: u32 = 80;

/// Default character width for motion sources.
pub const DEFAULT_MOTION_WIDTH: u32 = 78;

/// User configuration, loaded from `glyphcast.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Named dense→sparse glyph ramps selectable with `--palette`.
    pub palettes: HashMap<String, String>,
    pub default_palette: String,
    #[serde(default = "default_still_width")]
    pub still_width: u32,
    #[serde(default = "default_motion_width")]
    pub motion_width: u32,
}

fn default_still_width() -> u32 {
    DEFAULT_STILL_WIDTH
}

fn default_motion_width() -> u32 {
    DEFAULT_MOTION_WIDTH
}

impl Default for AppConfig {
    fn default() -> Self {
        let palettes = HashMap::from([
            ("classic".to_string(), CLASSIC_RAMP.to_string()),
            ("dense".to_string(), DENSE_RAMP.to_string()),
            ("blocks".to_string(), BLOCK_RAMP.to_string()),
        ]);
        Self {
            palettes,
            default_palette: "classic".to_string(),
            still_width: DEFAULT_STILL_WIDTH,
            motion_width: DEFAULT_MOTION_WIDTH,
        }
    }
}

impl AppConfig {
    /// Resolves a `--palette` argument: a configured preset name, or a
    /// literal ramp string when no preset matches; `None` falls back to the
    /// configured default preset.
    pub fn resolve_ramp(&self, requested: Option<&str>) -> Result<String> {
        match requested {
            Some(name) => Ok(self
                .palettes
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string())),
            None => self
                .palettes
                .get(&self.default_palette)
                .cloned()
                .ok_or_else(|| {
                    anyhow!("default palette '{}' missing from config", self.default_palette)
                }),
        }
    }
}

/// Loads config from the platform config dir, then the working directory,
/// then built-in defaults.
pub fn load_config() -> Result<AppConfig> {
    let mut tried: Vec<PathBuf> = Vec::new();
    if let Some(mut dir) = dirs::config_dir() {
        dir.push("glyphcast");
        dir.push("glyphcast.json");
        tried.push(dir);
    }
    tried.push(PathBuf::from("glyphcast.json"));

    for path in &tried {
        if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: AppConfig =
                serde_json::from_str(&text).context("parsing config json")?;
            if config.palettes.values().any(|ramp| ramp.is_empty()) {
                return Err(anyhow!(
                    "config {} contains an empty palette ramp",
                    path.display()
                ));
            }
            return Ok(config);
        }
    }

    Ok(AppConfig::default())
}
