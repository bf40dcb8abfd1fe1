use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::create_block::CreateBlockConfig;

pub(crate) const ABILITY_CONFIG_ENV_VAR: &str = "PLATFORMER_ABILITY_CONFIG";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read ability config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse ability config{}: {source}", at_path(.field_path))]
    Parse {
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("ability config: block_def must not be empty")]
    EmptyBlockDef,
}

fn at_path(field_path: &str) -> String {
    if field_path.is_empty() || field_path == "." {
        String::new()
    } else {
        format!(" at {field_path}")
    }
}

pub(crate) fn parse_create_block_config(raw: &str) -> Result<CreateBlockConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config = serde_path_to_error::deserialize::<_, CreateBlockConfig>(&mut deserializer)
        .map_err(|error| {
            let field_path = error.path().to_string();
            ConfigError::Parse {
                field_path,
                source: error.into_inner(),
            }
        })?;
    if config.block_def.trim().is_empty() {
        return Err(ConfigError::EmptyBlockDef);
    }
    Ok(config)
}

pub(crate) fn load_create_block_config(path: &Path) -> Result<CreateBlockConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_create_block_config(&raw)
}

/// Reads the config named by `PLATFORMER_ABILITY_CONFIG`, or the defaults when
/// the variable is unset or blank.
pub(crate) fn create_block_config_from_env() -> Result<CreateBlockConfig, ConfigError> {
    match std::env::var_os(ABILITY_CONFIG_ENV_VAR) {
        Some(raw) if !raw.is_empty() => load_create_block_config(Path::new(&raw)),
        _ => Ok(CreateBlockConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = parse_create_block_config("{}").expect("parse");
        assert_eq!(config, CreateBlockConfig::default());
    }

    #[test]
    fn null_effects_disable_them() {
        let config = parse_create_block_config(
            r#"{"block_def":"proto.crate","create_effect_def":null,"destroy_effect_def":null}"#,
        )
        .expect("parse");
        assert_eq!(config.block_def, "proto.crate");
        assert_eq!(config.create_effect_def, None);
        assert_eq!(config.destroy_effect_def, None);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse_create_block_config(r#"{"block":"proto.block"}"#).expect_err("unknown");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn type_error_reports_field_path() {
        let err = parse_create_block_config(r#"{"block_def":7}"#).expect_err("type");
        let message = err.to_string();
        assert!(message.contains("at block_def"), "{message}");
    }

    #[test]
    fn blank_block_def_is_rejected() {
        let err = parse_create_block_config(r#"{"block_def":"  "}"#).expect_err("blank");
        assert!(matches!(err, ConfigError::EmptyBlockDef));
    }

    #[test]
    fn loads_from_file() {
        let temp = tempfile::TempDir::new().expect("temp");
        let path = temp.path().join("create_block.json");
        fs::write(&path, r#"{"destroy_effect_def":null}"#).expect("write");

        let config = load_create_block_config(&path).expect("load");
        assert_eq!(config.block_def, "proto.block");
        assert!(config.create_effect_def.is_some());
        assert_eq!(config.destroy_effect_def, None);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = tempfile::TempDir::new().expect("temp");
        let err = load_create_block_config(&temp.path().join("nope.json")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
