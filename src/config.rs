//! Ring configuration, usually loaded from a json file
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Everything needed to build a [`crate::Ring`].
///
/// ```json
/// {
///   "node_count": 256,
///   "zone_count": 16,
///   "partition_power": 16,
///   "replica_count": 3,
///   "seed": 42
/// }
/// ```
///
/// `seed` is optional. Without it every build shuffles the partition table differently.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RingConfig {
    pub node_count: usize,
    pub zone_count: usize,
    pub partition_power: u32,
    pub replica_count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RingConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let stringified_json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&stringified_json)?)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::RingConfig;
    use crate::error::Error;

    #[test]
    fn deserialize_sample_config() {
        let mut config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        config_path.push("conf/ring.json");

        let config = RingConfig::from_path(config_path).unwrap();

        assert_eq!(
            config,
            RingConfig {
                node_count: 256,
                zone_count: 16,
                partition_power: 16,
                replica_count: 3,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn seed_is_optional() {
        let config: RingConfig = serde_json::from_str(
            r#"{"node_count": 4, "zone_count": 2, "partition_power": 4, "replica_count": 2}"#,
        )
        .unwrap();
        assert!(config.seed.is_none());
    }

    #[test]
    fn missing_file() {
        let err = RingConfig::from_path("conf/does_not_exist.json")
            .err()
            .unwrap();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn malformed_config() {
        let err: Error = serde_json::from_str::<RingConfig>(r#"{"node_count": -1}"#)
            .err()
            .unwrap()
            .into();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
