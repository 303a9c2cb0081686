//! Typed method parameters, layered from defaults, a JSON file and overrides.

use std::path::Path;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ValidationError};
use crate::domain::allocation::{
    ConstrainedMesParameters, MesAddOneParameters, ModifiedMesParameters,
};

/// Parameters of every method that takes any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MethodParameters {
    pub constrained_mes: ConstrainedMesParameters,
    pub modified_mes: ModifiedMesParameters,
    pub mes_add_one: MesAddOneParameters,
}

impl MethodParameters {
    /// Layer the defaults, then `file`, then `group.name=value` overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file is missing, an override is
    /// malformed or names an unknown parameter, a value has the wrong type,
    /// or the resulting values are out of range.
    pub fn load(file: Option<&Path>, overrides: &[String]) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let known = defaults.to_json()?;

        let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);

        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::ParametersFileNotFound(path.to_path_buf()));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Json));
        }

        for entry in overrides {
            let (key, value) = split_override(entry)?;
            check_known(&known, key)?;
            builder = builder.set_override(key, value)?;
        }

        let parameters: Self = builder.build()?.try_deserialize()?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Validate every parameter group
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.constrained_mes.validate()?;
        self.modified_mes.validate()?;
        self.mes_add_one.validate()?;
        Ok(())
    }

    /// Effective values as written next to the results.
    pub fn to_json(&self) -> Result<serde_json::Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }
}

fn split_override(entry: &str) -> Result<(&str, &str), ConfigError> {
    let mut parts = entry.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) if !key.trim().is_empty() => {
            Ok((key.trim(), value.trim()))
        }
        _ => Err(ConfigError::InvalidOverride(entry.to_string())),
    }
}

fn check_known(known: &serde_json::Value, key: &str) -> Result<(), ConfigError> {
    let Some((group, name)) = key.split_once('.') else {
        return Err(ConfigError::InvalidOverride(key.to_string()));
    };
    let Some(fields) = known.get(group) else {
        return Err(ConfigError::UnknownGroup(group.to_string()));
    };
    if fields.get(name).is_none() {
        return Err(ConfigError::UnknownParameter {
            group: group.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}
