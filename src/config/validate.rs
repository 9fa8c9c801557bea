// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.tools, raw.run, raw.defaults))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_tools(cfg)?;
    validate_run(cfg)?;
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let tools = &cfg.tools;

    for (key, path) in [
        ("patcher", &tools.patcher),
        ("injector", &tools.injector),
        ("script_dir", &tools.script_dir),
    ] {
        if path.as_os_str().is_empty() {
            return Err(PatchError::ConfigError(format!(
                "[tools].{key} must not be empty"
            )));
        }
    }

    let env = tools.injector_env.trim();
    if env.is_empty() || env != tools.injector_env || env.contains('=') || env.contains('\0') {
        return Err(PatchError::ConfigError(format!(
            "[tools].injector_env is not a usable variable name: {:?}",
            tools.injector_env
        )));
    }

    Ok(())
}

fn validate_run(cfg: &RawConfigFile) -> Result<()> {
    if let Some(root) = &cfg.run.temp_root {
        if root.as_os_str().is_empty() {
            return Err(PatchError::ConfigError(
                "[run].temp_root must not be empty when set".to_string(),
            ));
        }
    }

    if cfg.run.data_dirs.iter().any(|d| d.as_os_str().is_empty()) {
        return Err(PatchError::ConfigError(
            "[run].data_dirs must not contain empty entries".to_string(),
        ));
    }

    Ok(())
}
