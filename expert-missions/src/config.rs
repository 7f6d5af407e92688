//! Tuning for the candidate generator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DISTANCE_PER_PRICE_UNIT, DISTANCE_PER_TRAVEL_DAY, FULL_OFFER_PORT_IDS, GOODS_FOR_MAX_MISSIONS,
    MISSION_COUNT_MAX, MISSION_COUNT_MIN, QUANTITY_MAX, QUANTITY_MIN, RANDOM_FACTOR_MAX,
    RANDOM_FACTOR_MIN, SPEED_MULTIPLIER, TEST_PORT_ID,
};
use crate::port::{Port, PortId};

/// Errors raised when generator configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("mission count minimum {min} exceeds maximum {max}")]
    MissionCountRange { min: u32, max: u32 },
    #[error("quantity minimum {min} exceeds maximum {max}")]
    QuantityRange { min: u32, max: u32 },
    #[error("random factor window invalid ({min:.2}..{max:.2})")]
    RandomFactorRange { min: f64, max: f64 },
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("failed to parse generator config: {0}")]
    Parse(String),
}

/// Generator tuning. Every field has a serde default so partial JSON
/// overlays only need to name what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "GeneratorConfig::default_mission_count_min")]
    pub mission_count_min: u32,
    #[serde(default = "GeneratorConfig::default_mission_count_max")]
    pub mission_count_max: u32,
    /// Produced-goods count at which a port reaches the maximum mission count.
    #[serde(default = "GeneratorConfig::default_goods_for_max")]
    pub goods_for_max: u32,
    /// Ports that always offer a fixed number of missions.
    #[serde(default = "GeneratorConfig::default_mission_count_overrides")]
    pub mission_count_overrides: BTreeMap<PortId, u32>,
    /// Ports never used as destinations, in addition to ports the host
    /// itself marks non-playable.
    #[serde(default = "GeneratorConfig::default_non_playable_ports")]
    pub non_playable_ports: BTreeSet<PortId>,
    #[serde(default = "GeneratorConfig::default_quantity_min")]
    pub quantity_min: u32,
    #[serde(default = "GeneratorConfig::default_quantity_max")]
    pub quantity_max: u32,
    #[serde(default = "GeneratorConfig::default_random_factor_min")]
    pub random_factor_min: f64,
    #[serde(default = "GeneratorConfig::default_random_factor_max")]
    pub random_factor_max: f64,
    /// World distance per pricing distance unit.
    #[serde(default = "GeneratorConfig::default_distance_per_price_unit")]
    pub distance_per_price_unit: f64,
    /// World distance covered per unit of speed factor in one day.
    #[serde(default = "GeneratorConfig::default_distance_per_travel_day")]
    pub distance_per_travel_day: f64,
    #[serde(default = "GeneratorConfig::default_speed_multiplier")]
    pub speed_multiplier: f64,
}

impl GeneratorConfig {
    const fn default_mission_count_min() -> u32 {
        MISSION_COUNT_MIN
    }

    const fn default_mission_count_max() -> u32 {
        MISSION_COUNT_MAX
    }

    const fn default_goods_for_max() -> u32 {
        GOODS_FOR_MAX_MISSIONS
    }

    fn default_mission_count_overrides() -> BTreeMap<PortId, u32> {
        FULL_OFFER_PORT_IDS
            .iter()
            .map(|id| (PortId(*id), MISSION_COUNT_MAX))
            .collect()
    }

    fn default_non_playable_ports() -> BTreeSet<PortId> {
        BTreeSet::from([PortId(TEST_PORT_ID)])
    }

    const fn default_quantity_min() -> u32 {
        QUANTITY_MIN
    }

    const fn default_quantity_max() -> u32 {
        QUANTITY_MAX
    }

    const fn default_random_factor_min() -> f64 {
        RANDOM_FACTOR_MIN
    }

    const fn default_random_factor_max() -> f64 {
        RANDOM_FACTOR_MAX
    }

    const fn default_distance_per_price_unit() -> f64 {
        DISTANCE_PER_PRICE_UNIT
    }

    const fn default_distance_per_travel_day() -> f64 {
        DISTANCE_PER_TRAVEL_DAY
    }

    const fn default_speed_multiplier() -> f64 {
        SPEED_MULTIPLIER
    }

    /// Get default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON overlay and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or violates a tuning invariant.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the tuning invariants the generator relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mission_count_min > self.mission_count_max {
            return Err(ConfigError::MissionCountRange {
                min: self.mission_count_min,
                max: self.mission_count_max,
            });
        }
        if self.quantity_min > self.quantity_max {
            return Err(ConfigError::QuantityRange {
                min: self.quantity_min,
                max: self.quantity_max,
            });
        }
        if !(self.random_factor_min > 0.0 && self.random_factor_min < self.random_factor_max) {
            return Err(ConfigError::RandomFactorRange {
                min: self.random_factor_min,
                max: self.random_factor_max,
            });
        }
        for (field, value) in [
            ("goods_for_max", f64::from(self.goods_for_max)),
            ("distance_per_price_unit", self.distance_per_price_unit),
            ("distance_per_travel_day", self.distance_per_travel_day),
            ("speed_multiplier", self.speed_multiplier),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Whether `port` may be drawn as a destination.
    #[must_use]
    pub fn is_destination_eligible(&self, port: &Port) -> bool {
        port.playable && !self.non_playable_ports.contains(&port.id)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mission_count_min: Self::default_mission_count_min(),
            mission_count_max: Self::default_mission_count_max(),
            goods_for_max: Self::default_goods_for_max(),
            mission_count_overrides: Self::default_mission_count_overrides(),
            non_playable_ports: Self::default_non_playable_ports(),
            quantity_min: Self::default_quantity_min(),
            quantity_max: Self::default_quantity_max(),
            random_factor_min: Self::default_random_factor_min(),
            random_factor_max: Self::default_random_factor_max(),
            distance_per_price_unit: Self::default_distance_per_price_unit(),
            distance_per_travel_day: Self::default_distance_per_travel_day(),
            speed_multiplier: Self::default_speed_multiplier(),
        }
    }
}
