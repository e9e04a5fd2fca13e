// Copyright 2026 Docent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Global configuration loaded from `<config dir>/docent/docent.toml`.
//!
//! Every field has a default, so a missing file means a fully usable
//! configuration. A present file with invalid window parameters is a hard
//! error; a window that cannot advance must never reach the chunker.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 500,
            request_timeout_secs: 60,
            min_request_interval_ms: 1000,
        }
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.chunk_size == 0 {
        bail!("chunk_size must be at least 1");
    }
    if config.chunk_overlap >= config.chunk_size {
        bail!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            config.chunk_overlap,
            config.chunk_size
        );
    }
    if config.top_k == 0 {
        bail!("top_k must be at least 1");
    }
    Ok(())
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("docent").join("docent.toml"))
}

pub fn load_global_config() -> Result<Config> {
    let Some(path) = global_config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(&path)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: Config = toml::from_str(&text).context("parse docent.toml")?;
    validate(&config)?;
    Ok(config)
}
