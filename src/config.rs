//! # Session Configuration
//!
//! JSON configuration for a scan session and the demo driver.
//!
//! Every field has a default, so a configuration file only needs to list the
//! values it changes. Values are checked by `validate` after loading.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scanner::ScannerConfig;
use crate::survey::{DEFAULT_REFRESH_INTERVAL, DEFAULT_SURVEY_RANGE};

/// Allowed values for `SessionConfig::effect_range`.
pub const EFFECT_RANGE_LIMITS: RangeInclusive<i32> = 16..=64;
/// Allowed values for `SessionConfig::near_range` and `SessionConfig::far_range`.
pub const RANDOM_RANGE_LIMITS: RangeInclusive<i32> = 0..=128;
/// Allowed values for `SessionConfig::survey_range`.
pub const SURVEY_RANGE_LIMITS: RangeInclusive<i32> = 0..=64;

/// Settings for a `ScanSession`.
///
/// # Fields
/// - `near_range` / `far_range`: half extents sampled by the two random scanners
/// - `random_iterations`: cells each random scanner samples per tick
/// - `effect_range`: half extent of the always-on window
/// - `survey_range` / `survey_refresh_interval`: area survey settings
/// - `floor_y`: lowest valid Y
/// - `seed`: seeds every scanner when present
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Half extent of the near random sampler
    pub near_range: i32,
    /// Half extent of the far random sampler
    pub far_range: i32,
    /// Samples per tick for each random sampler
    pub random_iterations: usize,
    /// Half extent of the always-on window
    pub effect_range: i32,
    /// Half width of the area survey
    pub survey_range: i32,
    /// Ticks between forced area surveys
    pub survey_refresh_interval: u64,
    /// Lowest valid Y
    pub floor_y: i32,
    /// Seed shared by all scanners
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            near_range: 16,
            far_range: 32,
            random_iterations: 667,
            effect_range: 24,
            survey_range: DEFAULT_SURVEY_RANGE,
            survey_refresh_interval: DEFAULT_REFRESH_INTERVAL,
            floor_y: 0,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: SessionConfig = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value, limits) in [
            ("effect_range", self.effect_range, EFFECT_RANGE_LIMITS),
            ("near_range", self.near_range, RANDOM_RANGE_LIMITS),
            ("far_range", self.far_range, RANDOM_RANGE_LIMITS),
            ("survey_range", self.survey_range, SURVEY_RANGE_LIMITS),
        ] {
            check_range(field, value, &limits)?;
        }
        if self.random_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "random_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Scanner settings for the near random sampler.
    pub fn near_scanner(&self) -> ScannerConfig {
        self.random_scanner(self.near_range, 0)
    }

    /// Scanner settings for the far random sampler.
    pub fn far_scanner(&self) -> ScannerConfig {
        self.random_scanner(self.far_range, 1)
    }

    /// Scanner settings for the always-on window.
    ///
    /// The budget is left on automatic so a full window takes about twenty ticks.
    pub fn always_on_scanner(&self) -> ScannerConfig {
        let config = ScannerConfig::cubic(self.effect_range)
            .with_exit_notifications(true)
            .with_floor(self.floor_y);
        self.seeded(config, 2)
    }

    fn random_scanner(&self, range: i32, stream: u64) -> ScannerConfig {
        let config = ScannerConfig::cubic(range)
            .with_cells_per_tick(self.random_iterations)
            .with_floor(self.floor_y);
        self.seeded(config, stream)
    }

    fn seeded(&self, config: ScannerConfig, stream: u64) -> ScannerConfig {
        match self.seed {
            Some(seed) => config.with_seed(seed.wrapping_add(stream)),
            None => config,
        }
    }
}

fn check_range(
    field: &'static str,
    value: i32,
    limits: &RangeInclusive<i32>,
) -> Result<(), ConfigError> {
    if limits.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field,
        reason: format!(
            "must be within {}..={}, got {}",
            limits.start(),
            limits.end(),
            value
        ),
    })
}

/// Settings for the demo driver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Session settings
    pub session: SessionConfig,
    /// Terrain seed of the first world
    pub world_seed: u32,
    /// Number of ticks to run
    pub ticks: u64,
    /// Tick on which the observer switches to a new world; 0 disables the switch
    pub switch_world_at: u64,
    /// Chunks kept loaded around the observer, in each direction
    pub load_radius: i32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            session: SessionConfig::default(),
            world_seed: 1,
            ticks: 200,
            switch_world_at: 120,
            load_radius: 3,
        }
    }
}

impl DemoConfig {
    /// Reads, parses and validates a demo configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: DemoConfig = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;
        if self.load_radius < 0 {
            return Err(ConfigError::Invalid {
                field: "load_radius",
                reason: format!("must not be negative, got {}", self.load_radius),
            });
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    debug!("loading config from {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_effect_handlers() {
        let config = SessionConfig::default();
        assert_eq!(config.validate().ok(), Some(()));
        assert_eq!(config.near_scanner().x_range, 16);
        assert_eq!(config.far_scanner().z_range, 32);
        assert_eq!(config.near_scanner().effective_cells_per_tick(), 667);

        let always_on = config.always_on_scanner();
        assert!(always_on.notify_exits);
        assert_eq!(always_on.window_volume(), 49 * 49 * 49);
        assert_eq!(always_on.effective_cells_per_tick(), 49 * 49 * 49 / 20);
    }

    #[test]
    fn seeds_differ_per_scanner() {
        let config = SessionConfig {
            seed: Some(10),
            ..Default::default()
        };
        assert_eq!(config.near_scanner().seed, Some(10));
        assert_eq!(config.far_scanner().seed, Some(11));
        assert_eq!(config.always_on_scanner().seed, Some(12));
        assert_eq!(SessionConfig::default().near_scanner().seed, None);
    }

    #[test]
    fn effect_range_is_bounded() {
        for (range, ok) in [(15, false), (16, true), (64, true), (65, false)] {
            let text = format!(r#"{{ "effect_range": {} }}"#, range);
            let result = SessionConfig::from_json_str(&text);
            assert_eq!(result.is_ok(), ok, "range {}", range);
        }
    }

    #[test]
    fn sampler_and_survey_ranges_are_bounded() {
        for (field, config) in [
            ("near_range", SessionConfig { near_range: -1, ..Default::default() }),
            ("far_range", SessionConfig { far_range: 129, ..Default::default() }),
            ("survey_range", SessionConfig { survey_range: 40_000, ..Default::default() }),
        ] {
            match config.validate() {
                Err(ConfigError::Invalid { field: got, .. }) => assert_eq!(got, field),
                other => panic!("{} accepted: {:?}", field, other),
            }
        }
        let widest = SessionConfig {
            near_range: *RANDOM_RANGE_LIMITS.end(),
            far_range: *RANDOM_RANGE_LIMITS.end(),
            survey_range: *SURVEY_RANGE_LIMITS.end(),
            ..Default::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn zero_iterations_are_rejected() {
        match SessionConfig::from_json_str(r#"{ "random_iterations": 0 }"#) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "random_iterations"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SessionConfig::from_json_str("{ near_range: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "near_range": 8, "seed": 3 }}"#).unwrap();

        let config = SessionConfig::from_path(file.path()).unwrap();
        assert_eq!(config.near_range, 8);
        assert_eq!(config.far_range, 32);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        match SessionConfig::from_path(&path) {
            Err(err @ ConfigError::Io { .. }) => {
                assert!(err.to_string().contains("missing.json"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn demo_config_nests_session() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "ticks": 5, "session": {{ "effect_range": 16 }}, "load_radius": 2 }}"#
        )
        .unwrap();

        let config = DemoConfig::from_path(file.path()).unwrap();
        assert_eq!(config.ticks, 5);
        assert_eq!(config.load_radius, 2);
        assert_eq!(config.session.effect_range, 16);
        assert_eq!(config.world_seed, 1);
    }
}
