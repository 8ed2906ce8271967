//! Game configuration consumed once when a world is constructed.
//!
//! Every field carries a default so a configuration file only needs to list
//! the values it overrides. [`GameConfig::load`] reads a TOML file,
//! [`GameConfig::validate`] rejects values the simulation cannot honour.

use std::{collections::HashSet, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemySpawn, FieldSize};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
    /// Failed to parse TOML content.
    #[error("failed to parse config TOML: {source}")]
    Parse {
        /// The underlying TOML parse error.
        #[from]
        source: toml::de::Error,
    },
    /// A value was parsed but cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a single game instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of tile columns.
    pub field_width: u32,
    /// Number of tile rows.
    pub field_height: u32,
    /// Integer multiplier applied to wall-clock deltas by driver loops.
    pub game_speed: u32,
    /// Fraction of a tower's cost returned when it is demolished.
    pub refund_multiplier: f64,
    /// Target duration of one driver loop iteration, in milliseconds.
    pub tick_delay_ms: u64,
    /// Seed for field generation and wave sizes; entropy when absent.
    pub seed: Option<u64>,
    /// Balance granted to every joining player.
    pub starting_coins: u32,
    /// Health of the base at the start of the game.
    pub base_health: u32,
    /// Price of clearing a generated obstacle.
    pub obstacle_removal_cost: u32,
    /// Towers players may build.
    pub towers: Vec<TowerSpec>,
    /// Hand-tuned waves, one per round starting at round one.
    pub waves: Vec<WaveSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 25,
            field_height: 25,
            game_speed: 1,
            refund_multiplier: 0.5,
            tick_delay_ms: 50,
            seed: None,
            starting_coins: 80,
            base_health: 100,
            obstacle_removal_cost: 100,
            towers: TowerSpec::catalog(),
            waves: WaveSpec::authored(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_width == 0 || self.field_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "field must be at least 1x1, got {}x{}",
                self.field_width, self.field_height
            )));
        }

        if self.game_speed == 0 {
            return Err(ConfigError::Invalid(
                "game speed must be at least 1".to_owned(),
            ));
        }

        if !(0.0..=1.0).contains(&self.refund_multiplier) {
            return Err(ConfigError::Invalid(format!(
                "refund multiplier must lie within 0..=1, got {}",
                self.refund_multiplier
            )));
        }

        if self.towers.is_empty() {
            return Err(ConfigError::Invalid("tower catalog is empty".to_owned()));
        }

        let mut names = HashSet::new();
        for tower in &self.towers {
            if !names.insert(tower.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "tower '{}' is listed more than once",
                    tower.name
                )));
            }
            if !(tower.reload_speed > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "tower '{}' must reload at a positive speed",
                    tower.name
                )));
            }
        }

        for (index, wave) in self.waves.iter().enumerate() {
            if !(wave.speed_multiplier > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "wave {} must move at a positive speed",
                    index + 1
                )));
            }
        }

        Ok(())
    }

    /// Dimensions of the playing field.
    #[must_use]
    pub const fn field_size(&self) -> FieldSize {
        FieldSize::new(self.field_width, self.field_height)
    }

    /// Target duration of one driver loop iteration.
    #[must_use]
    pub const fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    /// Looks up a catalog tower by its exact name.
    #[must_use]
    pub fn tower(&self, name: &str) -> Option<&TowerSpec> {
        self.towers.iter().find(|tower| tower.name == name)
    }
}

/// Catalog entry describing a buildable tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSpec {
    /// Name players use to request the tower.
    pub name: String,
    /// Price in coins.
    pub cost: u32,
    /// Reach in tiles along both axes.
    pub range: u32,
    /// Health removed per shot.
    pub damage: u32,
    /// Shots gained per second of simulated time.
    pub reload_speed: f64,
}

impl TowerSpec {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(name: &str, cost: u32, range: u32, damage: u32, reload_speed: f64) -> Self {
        Self {
            name: name.to_owned(),
            cost,
            range,
            damage,
            reload_speed,
        }
    }

    /// The stock tower catalog.
    #[must_use]
    pub fn catalog() -> Vec<TowerSpec> {
        vec![
            TowerSpec::new("Soldier", 25, 3, 1, 1.0),
            TowerSpec::new("Sniper", 50, 10, 1, 0.25),
            TowerSpec::new("Scout", 75, 2, 1, 1.5),
            TowerSpec::new("Heavy", 75, 2, 5, 0.5),
        ]
    }
}

/// A homogeneous group of enemies released together in one round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Number of enemies in the group.
    pub count: u32,
    /// Starting health of each enemy.
    pub health: u32,
    /// Coins paid per destroyed enemy.
    pub reward: u32,
    /// Delay between consecutive enemies leaving the spawn tile, in milliseconds.
    pub stagger_ms: u64,
    /// Tiles walked per second.
    pub speed_multiplier: f64,
}

impl WaveSpec {
    /// Creates a wave descriptor.
    #[must_use]
    pub const fn new(
        count: u32,
        health: u32,
        reward: u32,
        stagger_ms: u64,
        speed_multiplier: f64,
    ) -> Self {
        Self {
            count,
            health,
            reward,
            stagger_ms,
            speed_multiplier,
        }
    }

    /// The stock hand-tuned waves for rounds one through twenty.
    #[must_use]
    pub fn authored() -> Vec<WaveSpec> {
        vec![
            WaveSpec::new(5, 1, 1, 1_000, 1.0),
            WaveSpec::new(10, 1, 1, 1_000, 0.75),
            WaveSpec::new(5, 2, 2, 1_500, 0.75),
            WaveSpec::new(5, 3, 2, 1_500, 0.75),
            WaveSpec::new(10, 5, 3, 1_500, 0.75),
            WaveSpec::new(15, 1, 1, 1_000, 1.0),
            WaveSpec::new(10, 1, 1, 750, 1.0),
            WaveSpec::new(15, 1, 2, 500, 1.25),
            WaveSpec::new(15, 1, 2, 500, 1.5),
            WaveSpec::new(30, 1, 3, 250, 2.0),
            WaveSpec::new(15, 1, 1, 1_000, 1.0),
            WaveSpec::new(10, 5, 2, 500, 1.0),
            WaveSpec::new(10, 5, 2, 250, 1.0),
            WaveSpec::new(15, 5, 2, 250, 1.25),
            WaveSpec::new(15, 10, 3, 250, 1.25),
            WaveSpec::new(30, 1, 1, 1_000, 1.0),
            WaveSpec::new(30, 1, 1, 750, 1.25),
            WaveSpec::new(45, 2, 2, 500, 1.5),
            WaveSpec::new(50, 3, 2, 250, 1.75),
            WaveSpec::new(75, 3, 3, 100, 2.5),
        ]
    }

    /// Delay between consecutive enemies leaving the spawn tile.
    #[must_use]
    pub const fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    /// Expands the group into individual spawns, staggered by index.
    pub fn spawns(&self) -> impl Iterator<Item = EnemySpawn> + '_ {
        let stagger = self.stagger();
        (0..self.count).map(move |index| EnemySpawn {
            health: self.health,
            reward: self.reward,
            spawn_delay: stagger * index,
            speed_multiplier: self.speed_multiplier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.waves.len(), 20);
        assert_eq!(config.tick_delay(), Duration::from_millis(50));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = GameConfig::from_toml_str(
            "field_width = 10\nfield_height = 12\nrefund_multiplier = 0.75\nseed = 7\n",
        )
        .expect("config parses");

        assert_eq!(config.field_size(), FieldSize::new(10, 12));
        assert!((config.refund_multiplier - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.starting_coins, 80);
        assert_eq!(config.towers, TowerSpec::catalog());
    }

    #[test]
    fn custom_catalog_replaces_stock_towers() {
        let config = GameConfig::from_toml_str(
            r#"
            [[towers]]
            name = "Cannon"
            cost = 40
            range = 2
            damage = 3
            reload_speed = 0.5
            "#,
        )
        .expect("config parses");

        assert_eq!(config.towers.len(), 1);
        assert!(config.tower("Cannon").is_some());
        assert!(config.tower("Soldier").is_none());
    }

    #[test]
    fn refund_above_one_is_rejected() {
        let error = GameConfig::from_toml_str("refund_multiplier = 1.5").unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn empty_field_is_rejected() {
        let error = GameConfig::from_toml_str("field_width = 0").unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_game_speed_is_rejected() {
        let error = GameConfig::from_toml_str("game_speed = 0").unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(message) if message.contains("game speed")));
    }

    #[test]
    fn duplicate_tower_names_are_rejected() {
        let mut config = GameConfig::default();
        config.towers.push(TowerSpec::new("Soldier", 1, 1, 1, 1.0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let error = GameConfig::from_toml_str("field_width = \"wide\"").unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let error = GameConfig::load("/nonexistent/tower-defence.toml").unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn spawns_are_staggered_by_index() {
        let wave = WaveSpec::new(3, 2, 1, 1_500, 0.75);
        let delays: Vec<Duration> = wave.spawns().map(|spawn| spawn.spawn_delay).collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(1_500),
                Duration::from_millis(3_000),
            ]
        );
    }
}
