//! End-to-end scene generation
//!
//! One run ensures the shape assets exist, reads the instance descriptors,
//! composes the scene in memory, validates it, and exports it with a single
//! atomic write. A failure at any step leaves the previous scene layer in
//! place.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use orrery_core::{
    AssetLibrary, ComposeError, InstanceDescriptor, PhaseSource, SceneComposer, SeededPhases,
};
use orrery_stage::{ExportOutcome, StageError, StageValidator, ValidationError};

use crate::config::{AppConfig, ConfigError};

/// Error type for a pipeline run
#[derive(Debug)]
pub enum PipelineError {
    /// Configuration could not be loaded
    Config(ConfigError),
    /// The descriptor file could not be read
    Io { path: PathBuf, source: io::Error },
    /// The descriptor file is not a valid descriptor array
    Descriptors { path: PathBuf, source: serde_json::Error },
    /// Asset building or composition failed
    Compose(ComposeError),
    /// Export failed
    Stage(StageError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(e) => write!(f, "{}", e),
            PipelineError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            PipelineError::Descriptors { path, source } => {
                write!(f, "Invalid descriptors in {}: {}", path.display(), source)
            }
            PipelineError::Compose(e) => write!(f, "Composition failed: {}", e),
            PipelineError::Stage(e) => write!(f, "Export failed: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(e) => Some(e),
            PipelineError::Io { source, .. } => Some(source),
            PipelineError::Descriptors { source, .. } => Some(source),
            PipelineError::Compose(e) => Some(e),
            PipelineError::Stage(e) => Some(e),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        PipelineError::Config(e)
    }
}

impl From<ComposeError> for PipelineError {
    fn from(e: ComposeError) -> Self {
        PipelineError::Compose(e)
    }
}

impl From<StageError> for PipelineError {
    fn from(e: StageError) -> Self {
        PipelineError::Stage(e)
    }
}

/// What a run produced
#[derive(Debug)]
pub struct RunReport {
    /// Asset names with whether each was written or reused
    pub assets: Vec<(String, ExportOutcome)>,
    pub scene_path: PathBuf,
    pub scene_outcome: ExportOutcome,
    pub instance_count: usize,
    /// Findings of the pre-export validation pass
    pub warnings: Vec<ValidationError>,
}

/// Read a JSON array of instance descriptors
pub fn load_descriptors(path: impl AsRef<Path>) -> Result<Vec<InstanceDescriptor>, PipelineError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| PipelineError::Descriptors {
        path: path.to_path_buf(),
        source,
    })
}

/// Run with the configured descriptor file and seed
///
/// Without a configured seed the phase offsets are drawn from entropy.
pub fn run(config: &AppConfig) -> Result<RunReport, PipelineError> {
    let descriptors = load_descriptors(&config.scene.descriptors)?;
    log::info!(
        "Loaded {} descriptors from {}",
        descriptors.len(),
        config.scene.descriptors.display()
    );

    let mut phases = match config.orbit.seed {
        Some(seed) => SeededPhases::new(seed),
        None => SeededPhases::from_entropy(),
    };
    log::info!("Orbit phase seed {}", phases.seed());
    run_with(config, &descriptors, &mut phases)
}

/// Run against in-memory descriptors with an explicit phase source
pub fn run_with(
    config: &AppConfig,
    descriptors: &[InstanceDescriptor],
    phases: &mut dyn PhaseSource,
) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let out_dir = &config.output.dir;
    let builder = config.asset_builder();

    let mut library = AssetLibrary::new();
    let mut assets = Vec::with_capacity(config.assets.shapes.len());
    for &kind in &config.assets.shapes {
        let (asset, outcome) = builder.ensure(out_dir, kind, config.assets.write_policy)?;
        assets.push((asset.name().to_string(), outcome));
        library.insert(asset);
    }

    let scene = SceneComposer::new(&library, config.compose_settings()).compose(descriptors, phases)?;

    let warnings = StageValidator::validate(&scene);
    for warning in &warnings {
        log::warn!("Validation: {}", warning);
    }

    let scene_path = config.scene_path();
    let scene_outcome = scene.export(&scene_path, config.scene.write_policy)?;

    Ok(RunReport {
        assets,
        scene_path,
        scene_outcome,
        instance_count: descriptors.len(),
        warnings,
    })
}
