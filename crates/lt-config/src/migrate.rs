//! Config version migration.

use crate::ConfigError;
use crate::schema::PipelineConfig;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut config: PipelineConfig) -> Result<PipelineConfig, ConfigError> {
    while config.version < LATEST_VERSION {
        config = migrate_one_version(config)?;
    }
    Ok(config)
}

fn migrate_one_version(config: PipelineConfig) -> Result<PipelineConfig, ConfigError> {
    match config.version {
        0 => migrate_v0_to_v1(config),
        v => Err(ConfigError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

// v0 files predate the scalar cache tiers and the MAC pattern; serde defaults
// already filled them in, but a v0 window of 0 meant "use the default".
fn migrate_v0_to_v1(mut config: PipelineConfig) -> Result<PipelineConfig, ConfigError> {
    if config.observation_window_s == 0.0 {
        config.observation_window_s = crate::schema::DEFAULT_OBSERVATION_WINDOW_S;
    }
    config.version = 1;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v0_window_zero_becomes_default() {
        let config = PipelineConfig {
            version: 0,
            observation_window_s: 0.0,
            ..PipelineConfig::default()
        };
        let migrated = migrate_to_latest(config).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.observation_window_s, 10_800.0);
    }

    #[test]
    fn latest_is_untouched() {
        let config = PipelineConfig::default();
        let migrated = migrate_to_latest(config.clone()).unwrap();
        assert_eq!(migrated, config);
    }
}
