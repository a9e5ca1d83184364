use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_speed")]
    pub speed: u8,

    /// Time for one full traversal at speed 1.
    #[serde(default = "default_base_duration_ms")]
    pub base_duration_ms: f32,

    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    #[serde(default = "default_true")]
    pub show_trajectory: bool,

    #[serde(default = "default_true")]
    pub show_decision_boundary: bool,

    #[serde(default = "default_max_width")]
    pub max_width: u32,

    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Height as a fraction of width, before the height cap.
    #[serde(default = "default_aspect")]
    pub aspect: f32,

    #[serde(default = "default_boundary_fade_ms")]
    pub boundary_fade_ms: u32,

    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub theme: Theme,
}

/// Where the overlay sits on its output. Missing keys keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub anchor: Anchor,
    pub margin: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

/// Colours as `#rrggbb` or `#rrggbbaa`. Missing keys keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub source_class: String,
    pub target_class: String,
    pub boundary: String,
    pub trajectory: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            base_duration_ms: default_base_duration_ms(),
            sample_count: default_sample_count(),
            show_trajectory: true,
            show_decision_boundary: true,
            max_width: default_max_width(),
            max_height: default_max_height(),
            aspect: default_aspect(),
            boundary_fade_ms: default_boundary_fade_ms(),
            position: Position::default(),
            theme: Theme::default(),
        }
    }
}

fn default_speed() -> u8 {
    5
}

fn default_base_duration_ms() -> f32 {
    11000.0
}

fn default_sample_count() -> usize {
    crate::trajectory::DEFAULT_SAMPLE_COUNT
}

fn default_true() -> bool {
    true
}

fn default_max_width() -> u32 {
    800
}

fn default_max_height() -> u32 {
    500
}

fn default_aspect() -> f32 {
    0.6
}

fn default_boundary_fade_ms() -> u32 {
    300
}

impl Default for Position {
    fn default() -> Self {
        Self {
            anchor: Anchor::Center,
            margin: 0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#ffffffff".to_string(),
            source_class: "#3f51b5".to_string(),
            target_class: "#f50057".to_string(),
            boundary: "#ff9800".to_string(),
            trajectory: "#00000033".to_string(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("crossing").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.sanitize();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Pulls out-of-range values back to something drawable.
    fn sanitize(&mut self) {
        let speed = clamp_speed(self.speed);
        if speed != self.speed {
            warn!("speed {} out of range, using {}", self.speed, speed);
            self.speed = speed;
        }
        if self.sample_count == 0 {
            warn!("sample_count must be at least 1, using default");
            self.sample_count = default_sample_count();
        }
        if !(self.base_duration_ms > 0.0) {
            warn!("base_duration_ms must be positive, using default");
            self.base_duration_ms = default_base_duration_ms();
        }
        if !(self.aspect > 0.0) {
            warn!("aspect must be positive, using default");
            self.aspect = default_aspect();
        }
    }
}

pub fn clamp_speed(speed: u8) -> u8 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}
