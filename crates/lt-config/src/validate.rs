//! Config validation logic.

use crate::schema::{PatternDef, PipelineConfig};
use regex::Regex;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate cache file name: {name}")]
    DuplicateFile { name: String },

    #[error("Invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &PipelineConfig) -> Result<(), ValidationError> {
    if config.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    let mut names = HashSet::new();
    for name in config.cache.file_names() {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "cache".to_string(),
                value: format!("{:?}", name),
                reason: "file name must not be empty".to_string(),
            });
        }
        if !names.insert(name) {
            return Err(ValidationError::DuplicateFile {
                name: name.to_string(),
            });
        }
    }

    validate_patterns(&config.patterns)?;

    let metrics = &config.metrics;
    for (field, value) in [
        ("metrics.power_vector", &metrics.power_vector),
        ("metrics.packet_length_vector", &metrics.packet_length_vector),
        ("metrics.energy_scalar", &metrics.energy_scalar),
        ("metrics.sent_scalar", &metrics.sent_scalar),
        ("metrics.received_scalar", &metrics.received_scalar),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.clone(),
                reason: "metric name must not be empty".to_string(),
            });
        }
    }

    if !config.observation_window_s.is_finite() || config.observation_window_s <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "observation_window_s".to_string(),
            value: config.observation_window_s.to_string(),
            reason: "must be finite and positive".to_string(),
        });
    }

    if config.export_tool.program.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "export_tool.program".to_string(),
            value: config.export_tool.program.clone(),
            reason: "program must not be empty".to_string(),
        });
    }

    if config.export_tool.timeout_s == 0 {
        return Err(ValidationError::InvalidValue {
            field: "export_tool.timeout_s".to_string(),
            value: "0".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }

    Ok(())
}

fn validate_patterns(patterns: &PatternDef) -> Result<(), ValidationError> {
    for (field, pattern) in [
        ("patterns.energy_consumer", &patterns.energy_consumer),
        ("patterns.queue", &patterns.queue),
        ("patterns.mac", &patterns.mac),
    ] {
        let re = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
        // captures_len counts the implicit whole-match group
        let groups = re.captures_len() - 1;
        if groups != 1 {
            return Err(ValidationError::InvalidPattern {
                field: field.to_string(),
                reason: format!("expected exactly one capture group, found {}", groups),
            });
        }
    }
    Ok(())
}
