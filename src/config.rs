//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. Built-in defaults
//! 2. `config/default.toml` (version controlled)
//! 3. `config/user.toml` (gitignored, user overrides)
//! 4. Environment variables (`ORRERY_SECTION__KEY`)

use figment::{Figment, providers::{Format, Serialized, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use orrery_core::{
    AssetBuilder, ComposeSettings, OrbitGenerator, Palette, ShapeKind, DEFAULT_ASSET_PREFIX,
    DEFAULT_SCENE_NAME, LAYER_EXTENSION, OVERALL_SPEED,
};
use orrery_stage::{TimeRange, WritePolicy};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output locations and names
    #[serde(default)]
    pub output: OutputConfig,
    /// Animation frame range
    #[serde(default)]
    pub timeline: TimelineConfig,
    /// Orbit animation
    #[serde(default)]
    pub orbit: OrbitConfig,
    /// Shape assets
    #[serde(default)]
    pub assets: AssetsConfig,
    /// Scene layer
    #[serde(default)]
    pub scene: SceneConfig,
    /// Color variants, in variant order
    #[serde(default)]
    pub palette: Palette,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Built-in defaults
    /// 2. `config/default.toml`
    /// 3. `config/user.toml`
    /// 4. Environment variables (`ORRERY_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // User overrides (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // ORRERY_OUTPUT__DIR=/tmp/out -> output.dir = "/tmp/out"
        figment = figment.merge(Env::prefixed("ORRERY_").split("__"));

        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeline.end < self.timeline.start {
            return Err(ConfigError::invalid(format!(
                "timeline end {} precedes start {}",
                self.timeline.end, self.timeline.start
            )));
        }
        if self.timeline.end < 1 {
            return Err(ConfigError::invalid("timeline end must be at least 1"));
        }
        if !self.orbit.overall_speed.is_finite() {
            return Err(ConfigError::invalid("orbit overall_speed must be finite"));
        }
        if self.assets.shapes.is_empty() {
            return Err(ConfigError::invalid("assets.shapes is empty"));
        }
        self.palette
            .validate()
            .map_err(|e| ConfigError::invalid(e.to_string()))
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.timeline.start, self.timeline.end)
    }

    /// Builder for the configured shape assets
    pub fn asset_builder(&self) -> AssetBuilder {
        AssetBuilder::new(self.palette.clone(), self.time_range())
            .with_prefix(self.output.asset_prefix.clone())
            .with_extension(self.output.extension.clone())
    }

    pub fn compose_settings(&self) -> ComposeSettings {
        ComposeSettings {
            scene_name: self.output.scene_name.clone(),
            time_range: self.time_range(),
            orbit: OrbitGenerator::new(self.orbit.overall_speed),
        }
    }

    /// Where the scene layer is exported
    pub fn scene_path(&self) -> PathBuf {
        self.output
            .dir
            .join(format!("{}.{}", self.output.scene_name, self.output.extension))
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the scene and asset layers
    pub dir: PathBuf,
    /// Name of the scene's root prim and layer file
    pub scene_name: String,
    /// Prefix of asset names
    pub asset_prefix: String,
    /// Layer file extension
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            scene_name: DEFAULT_SCENE_NAME.to_string(),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            extension: LAYER_EXTENSION.to_string(),
        }
    }
}

/// Timeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// First frame
    pub start: i64,
    /// Last frame; orbits are sampled for frames `0..end`
    pub end: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { start: 0, end: 720 }
    }
}

/// Orbit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Radians per frame for an instance with x scale 1
    pub overall_speed: f64,
    /// Phase offset seed; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            overall_speed: OVERALL_SPEED,
            seed: None,
        }
    }
}

/// Asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Shape kinds to build assets for
    pub shapes: Vec<ShapeKind>,
    /// What to do when an asset layer already exists
    pub write_policy: WritePolicy,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            shapes: ShapeKind::ALL.to_vec(),
            write_policy: WritePolicy::SkipIfExists,
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// JSON file holding the instance descriptors
    pub descriptors: PathBuf,
    /// What to do when the scene layer already exists
    pub write_policy: WritePolicy,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            descriptors: PathBuf::from("data/orbit.json"),
            write_policy: WritePolicy::Overwrite,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        ConfigError {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
