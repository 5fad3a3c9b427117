// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PairdagError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PairdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.discover, raw.submit))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_discover(cfg)?;
    validate_submit(cfg)?;
    Ok(())
}

fn validate_discover(cfg: &RawConfigFile) -> Result<()> {
    if cfg.discover.patterns.is_empty() {
        return Err(PairdagError::Config(
            "[discover].patterns must contain at least one glob pattern".to_string(),
        ));
    }

    for pat in &cfg.discover.patterns {
        if let Err(e) = Glob::new(pat) {
            return Err(PairdagError::Config(format!(
                "[discover].patterns entry '{}' is not a valid glob: {}",
                pat, e
            )));
        }
    }

    Ok(())
}

fn validate_submit(cfg: &RawConfigFile) -> Result<()> {
    let submit = &cfg.submit;

    if submit.universe.trim().is_empty() {
        return Err(PairdagError::Config(
            "[submit].universe must not be empty".to_string(),
        ));
    }

    if submit.request_cpus == 0 {
        return Err(PairdagError::Config(
            "[submit].request_cpus must be >= 1 (got 0)".to_string(),
        ));
    }

    if submit.request_memory.trim().is_empty() {
        return Err(PairdagError::Config(
            "[submit].request_memory must not be empty".to_string(),
        ));
    }

    if submit.request_disk.trim().is_empty() {
        return Err(PairdagError::Config(
            "[submit].request_disk must not be empty".to_string(),
        ));
    }

    Ok(())
}
