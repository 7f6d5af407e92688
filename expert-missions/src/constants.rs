//! Centralized pricing and tuning constants for expert missions.
//!
//! These values define the deterministic math for mission pricing. Keeping
//! them together means rewards only move through reviewed code changes,
//! not through external JSON tuning.

// Logging / persistence keys ------------------------------------------------
pub const SAVE_BLOB_KEY: &str = "ExpertMissions";

// Seed derivation ----------------------------------------------------------
pub(crate) const SEED_DAY_STRIDE: i64 = 100;
pub(crate) const SEED_DOMAIN_TAG: &[u8] = b"expert-missions.offers";

// Total price model --------------------------------------------------------
pub(crate) const PRICE_BASE_PER_UNIT: f64 = 3.0;
pub(crate) const PRICE_DISTANCE_BONUS_RATE: f64 = 0.000_63;
pub(crate) const PRICE_WEIGHT_DIVISOR: f64 = 1_000.0;
pub(crate) const PRICE_QUANTITY_BONUS_RATE: f64 = 0.2;
pub(crate) const PRICE_SPEED_DIVISOR: f64 = 2.5;
pub(crate) const PRICE_SCALE: f64 = 0.6;

// Delivery overrides -------------------------------------------------------
pub(crate) const REPUTATION_SCALE: f64 = 0.7;

// Generator defaults -------------------------------------------------------
pub(crate) const MISSION_COUNT_MIN: u32 = 1;
pub(crate) const MISSION_COUNT_MAX: u32 = 5;
pub(crate) const GOODS_FOR_MAX_MISSIONS: u32 = 20;
pub(crate) const QUANTITY_MIN: u32 = 8;
pub(crate) const QUANTITY_MAX: u32 = 20;
pub(crate) const RANDOM_FACTOR_MIN: f64 = 2.0;
pub(crate) const RANDOM_FACTOR_MAX: f64 = 4.0;
pub(crate) const DISTANCE_PER_PRICE_UNIT: f64 = 100.0;
pub(crate) const DISTANCE_PER_TRAVEL_DAY: f64 = 1_000.0;
pub(crate) const SPEED_MULTIPLIER: f64 = 2.0;
pub(crate) const SECONDS_PER_HOUR: f64 = 3_600.0;
pub(crate) const TEST_PORT_ID: u32 = 7;
pub(crate) const FULL_OFFER_PORT_IDS: [u32; 2] = [6, 20];
