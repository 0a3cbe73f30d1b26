use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH, TARGET_FPS};

/// Looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "shooter.ron";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            title: "Space Shooter".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub dir: PathBuf,
    pub player: String,
    pub enemy: String,
    pub laser: String,
    pub background: String,
    pub happy: String,
    pub sad: String,
}
impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            player: "player.txt".into(),
            enemy: "enemy.txt".into(),
            laser: "laser.txt".into(),
            background: "background.txt".into(),
            happy: "smile.txt".into(),
            sad: "crying.txt".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `None` disables logging entirely; the terminal is busy with the game.
    pub file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("space_shooter.log")),
            level: "info".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub target_fps: u32,
    pub log: LogConfig,
}
impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            target_fps: TARGET_FPS,
            log: LogConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Defaults when the file is absent; defaults plus the error text when it
    /// exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        if !path.as_ref().exists() {
            return (Self::default(), None);
        }
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Replace unusable values with defaults; returns one warning per fix.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let defaults = WindowConfig::default();
        if !(self.window.width > 0.0) {
            warnings.push(format!(
                "window.width {} must be > 0; using {}",
                self.window.width, defaults.width
            ));
            self.window.width = defaults.width;
        }
        if !(self.window.height > 0.0) {
            warnings.push(format!(
                "window.height {} must be > 0; using {}",
                self.window.height, defaults.height
            ));
            self.window.height = defaults.height;
        }
        if self.target_fps == 0 {
            warnings.push(format!("target_fps must be > 0; using {TARGET_FPS}"));
            self.target_fps = TARGET_FPS;
        }
        warnings
    }
}
