use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tolerances used by the pose tests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClassifierThresholds {
    /// Maximum |arm slope| for the arms to count as horizontal
    pub arms_slope: f64,
    /// Maximum difference between |arm slope| and 1/|torso slope|
    pub perpendicular: f64,
    /// Maximum difference in |y| between an arm joint and its shoulder
    pub symmetry: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            arms_slope: 0.05,
            perpendicular: 0.05,
            symmetry: 0.1,
        }
    }
}

/// Colors and sizes used when drawing the overlay (RGB)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OverlayStyle {
    pub line_thickness: u32,
    pub point_radius: u32,
    pub normal_color: [u8; 3],
    pub highlight_color: [u8; 3],
    pub point_color: [u8; 3],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_thickness: 2,
            point_radius: 4,
            normal_color: [255, 255, 255],
            highlight_color: [0, 255, 0],
            point_color: [255, 0, 0],
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Drop face and feet joints before classification and drawing
    pub filter_landmarks: bool,
    pub thresholds: ClassifierThresholds,
    pub style: OverlayStyle,
    /// Canvas size used when no camera image is available
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter_landmarks: true,
            thresholds: ClassifierThresholds::default(),
            style: OverlayStyle::default(),
            image_width: 640,
            image_height: 480,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl Config {
    /// Load configuration from the default location, creating it with defaults
    /// if it doesn't exist
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from a file
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        let thresholds = [
            ("arms slope", self.thresholds.arms_slope),
            ("perpendicular", self.thresholds.perpendicular),
            ("symmetry", self.thresholds.symmetry),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "Invalid {} threshold: {}. Must be in (0.0, 1.0]",
                    name, value
                )));
            }
        }

        if !(1..=32).contains(&self.style.line_thickness) {
            return Err(ConfigError::Invalid(format!(
                "Invalid line thickness: {}. Must be between 1 and 32",
                self.style.line_thickness
            )));
        }

        if !(1..=32).contains(&self.style.point_radius) {
            return Err(ConfigError::Invalid(format!(
                "Invalid point radius: {}. Must be between 1 and 32",
                self.style.point_radius
            )));
        }

        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Invalid image size: {}x{}",
                self.image_width, self.image_height
            )));
        }

        Ok(())
    }

    /// Get the configuration file path
    pub fn get_config_path() -> ConfigResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDirectory)?;

        let mut path = PathBuf::from(home);
        path.push(".pose_overlay");
        path.push("settings.json");

        Ok(path)
    }
}
