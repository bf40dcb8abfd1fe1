use engine::{AppError, LoopConfig, MAX_FRAMES_ENV_VAR, ROOT_ENV_VAR};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{
    create_block_config_from_env, ConfigError, CreateBlockConfig, ABILITY_CONFIG_ENV_VAR,
    HELP_TEXT,
};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) ability_config: CreateBlockConfig,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Loop(#[from] AppError),
    #[error(transparent)]
    AbilityConfig(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Platformer Startup ===");

    let config = LoopConfig::default().with_env_overrides()?;
    let ability_config = create_block_config_from_env()?;
    info!(
        block_def = %ability_config.block_def,
        create_effect = ability_config.create_effect_def.as_deref().unwrap_or("none"),
        destroy_effect = ability_config.destroy_effect_def.as_deref().unwrap_or("none"),
        max_frames = config.max_frames,
        "app_configured"
    );

    Ok(AppWiring {
        config,
        ability_config,
    })
}

pub(crate) fn wants_help(args: impl IntoIterator<Item = String>) -> bool {
    args.into_iter()
        .skip(1)
        .any(|arg| arg == "--help" || arg == "-h")
}

pub(crate) fn print_help() {
    println!("platformer: headless create-block demo\n");
    println!("{HELP_TEXT}\n");
    println!("Environment:");
    println!("  {ROOT_ENV_VAR}  project root holding assets/base");
    println!("  {ABILITY_CONFIG_ENV_VAR}  JSON file with block_def, create_effect_def, destroy_effect_def");
    println!("  {MAX_FRAMES_ENV_VAR}  stop after this many frames");
    println!("  RUST_LOG  tracing filter, default info");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn help_flag_is_detected_after_program_name() {
        assert!(wants_help(args(&["platformer", "--help"])));
        assert!(wants_help(args(&["platformer", "-h"])));
        assert!(!wants_help(args(&["--help"])));
        assert!(!wants_help(args(&["platformer"])));
    }
}
