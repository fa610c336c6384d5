//! Orrery - procedural orbiting scene generator
//!
//! Builds the shape assets, composes the scene from the configured
//! descriptor file and exports it. Configuration comes from `config/` and
//! `ORRERY_*` environment variables.

use std::process::ExitCode;

use orrery::config::AppConfig;
use orrery::pipeline;

fn main() -> ExitCode {
    let config = AppConfig::load();

    // Log level from config unless RUST_LOG is set
    let level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });
    log::info!("Starting Orrery");

    match pipeline::run(&config) {
        Ok(report) => {
            for (name, outcome) in &report.assets {
                log::info!("Asset {}: {:?}", name, outcome);
            }
            log::info!(
                "Scene {} with {} instances: {:?}",
                report.scene_path.display(),
                report.instance_count,
                report.scene_outcome
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
