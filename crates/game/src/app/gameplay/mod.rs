mod config;
mod create_block;
mod demo;
mod grid;
mod motor;
mod scene;

pub(crate) use config::{create_block_config_from_env, ConfigError, ABILITY_CONFIG_ENV_VAR};
pub(crate) use create_block::{CreateBlockConfig, HELP_TEXT};
pub(crate) use demo::demo_script;
pub(crate) use scene::PlatformerScene;
