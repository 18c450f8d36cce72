//! Configuration loading and parsing.
//!
//! Parses `typix.toml` (or an override path provided by the binary). Every
//! section and field is optional; absent values take the defaults below and
//! unknown fields are ignored so older binaries tolerate newer files.
//!
//! ```toml
//! [layout]
//! throttle_ms = 50
//! poll_interval_ms = 500
//! [occlusion]
//! ceiling = 200
//! min_delta_px = 4.0
//! [frame]
//! budget_ms = 8
//! [cache]
//! max_age_secs = 600
//! capacity = 256
//! [segmenter]
//! mode = "unicode"      # or "heuristic"
//! [highlight]
//! space = "viewport"    # or "element" / "page"
//! ```
//!
//! The parsed file is kept as-is; `Config::effective` produces the clamped
//! values the engine actually runs with.

use anyhow::{Context, Result};
use core_layout::CoordinateSpace;
use core_text::SegmenterMode;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const FILE_NAME: &str = "typix.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub throttle_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 50,
            poll_interval_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OcclusionConfig {
    pub ceiling: usize,
    pub min_delta_px: f64,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            ceiling: 200,
            min_delta_px: 4.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    pub budget_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { budget_ms: 8 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub max_age_secs: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 600,
            capacity: 256,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct SegmenterConfig {
    pub mode: SegmenterMode,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct HighlightConfig {
    pub space: CoordinateSpace,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub occlusion: OcclusionConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Values the engine runs with, after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveConfig {
    pub throttle: Duration,
    pub poll_interval: Duration,
    pub occlusion_ceiling: usize,
    pub occlusion_min_delta_px: f64,
    pub frame_budget: Duration,
    pub cache_max_age: Duration,
    pub cache_capacity: usize,
    pub segmenter: SegmenterMode,
    pub space: CoordinateSpace,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Config::default().effective()
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("typix").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

/// Parse configuration text. Errors carry the TOML location.
pub fn parse(content: &str) -> Result<ConfigFile> {
    toml::from_str::<ConfigFile>(content).context("invalid typix configuration")
}

/// Load from `path` (or the discovered path). A missing file or a parse
/// error yields defaults; only the parse error is logged.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match parse(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "loaded");
            Ok(Config {
                raw: Some(content),
                path: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %format!("{e:#}"), "parse failed; using defaults");
            Ok(Config::default())
        }
    }
}

fn clamp_logged<T>(name: &'static str, raw: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    let clamped = if raw < min {
        min
    } else if raw > max {
        max
    } else {
        raw
    };
    if clamped != raw {
        info!(target: "config", field = name, %raw, %clamped, "value_clamped");
    }
    clamped
}

impl Config {
    pub fn effective(&self) -> EffectiveConfig {
        let f = &self.file;
        let throttle = clamp_logged("layout.throttle_ms", f.layout.throttle_ms, 0, 1000);
        let poll = clamp_logged("layout.poll_interval_ms", f.layout.poll_interval_ms, 50, 60_000);
        let budget = clamp_logged("frame.budget_ms", f.frame.budget_ms, 1, 50);
        let ceiling = clamp_logged("occlusion.ceiling", f.occlusion.ceiling, 1, usize::MAX);
        let min_delta = if f.occlusion.min_delta_px.is_nan() {
            let fallback = OcclusionConfig::default().min_delta_px;
            info!(
                target: "config",
                field = "occlusion.min_delta_px",
                raw = "nan",
                clamped = fallback,
                "value_clamped"
            );
            fallback
        } else {
            clamp_logged("occlusion.min_delta_px", f.occlusion.min_delta_px, 0.0, f64::MAX)
        };
        let capacity = clamp_logged("cache.capacity", f.cache.capacity, 1, usize::MAX);
        EffectiveConfig {
            throttle: Duration::from_millis(throttle),
            poll_interval: Duration::from_millis(poll),
            occlusion_ceiling: ceiling,
            occlusion_min_delta_px: min_delta,
            frame_budget: Duration::from_millis(budget),
            cache_max_age: Duration::from_secs(f.cache.max_age_secs),
            cache_capacity: capacity,
            segmenter: f.segmenter.mode,
            space: f.highlight.space,
        }
    }
}
