//! Constants for the SkyGauge core
//!
//! Centralized, documented constants used throughout the acquisition and
//! derivation paths. All numeric values live here with their purpose,
//! source, and rationale.
//!
//! ## Organization
//!
//! - **Physics**: atmosphere model, gas constants, unit conversions
//! - **Channels**: throttle intervals, queue capacities, plausibility bounds
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. When adding new constants, reference a standard or datasheet
//! 3. Use descriptive names that include units

/// Atmosphere model, gas constants, and unit conversion factors.
pub mod physics;

/// Per-channel intervals, capacities, and plausibility bounds.
pub mod channels;

// Re-export commonly used constants for convenience
pub use physics::{
    CELSIUS_TO_KELVIN_OFFSET, HPA_TO_PSI, ISA_SEA_LEVEL_TEMP_C, SEA_LEVEL_AIR_DENSITY_KG_M3,
    SEA_LEVEL_PRESSURE_HPA, STANDARD_GRAVITY_M_PER_S2,
};

pub use channels::{
    AUDIO_BIN_COUNT, FAST_COMMIT_INTERVAL_MS, GPS_HEADING_MIN_SPEED_KMH, LOUDNESS_FLOOR_DBFS,
    SLOW_COMMIT_INTERVAL_MS,
};
