//! Physical Constants for SkyGauge
//!
//! This module defines the atmosphere model and conversion factors used by
//! the derivation engine. All values are based on established physics and
//! aviation standards.

// ===== STANDARD ATMOSPHERE =====

/// Standard atmospheric pressure at sea level (hPa/mbar).
///
/// Reference pressure for the altitude model and the snapshot default.
/// Actual pressure varies with weather patterns and altitude.
///
/// Source: International Standard Atmosphere (ISA), ISO 2533:1975
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1013.25;

/// ISA sea-level temperature (°C).
///
/// Reference temperature for lapse-rate and density-altitude calculations.
///
/// Source: ISO 2533:1975
pub const ISA_SEA_LEVEL_TEMP_C: f32 = 15.0;

/// ISA temperature lapse rate in the troposphere (°C per meter).
///
/// Temperature drops by 6.5 °C per 1000 m up to the tropopause (~11 km).
///
/// Source: ISO 2533:1975
pub const ISA_TEMP_LAPSE_C_PER_M: f32 = 0.0065;

/// Altitude coefficient of the ISA pressure model (1/m).
///
/// Appears in P(h) = P0 * (1 - ISA_PRESSURE_ALT_COEFF * h)^ISA_PRESSURE_EXPONENT.
/// Equals lapse_rate / sea_level_temperature_kelvin (0.0065 / 288.15).
///
/// Source: barometric formula, troposphere segment
pub const ISA_PRESSURE_ALT_COEFF: f32 = 2.25577e-5;

/// Exponent of the ISA pressure model (dimensionless).
///
/// Equals g * M / (R * L) for dry air in the troposphere.
///
/// Source: barometric formula, troposphere segment
pub const ISA_PRESSURE_EXPONENT: f32 = 5.25588;

/// Air density at sea level under ISA conditions (kg/m³).
///
/// Used as the reference density in the true-airspeed approximation
/// TAS = GS * sqrt(rho0 / rho).
///
/// Source: ISO 2533:1975
pub const SEA_LEVEL_AIR_DENSITY_KG_M3: f32 = 1.225;

/// Specific gas constant of dry air (J/(kg·K)).
///
/// Used in the ideal-gas density calculation rho = P / (R_specific * T).
///
/// Source: ICAO Doc 7488/3
pub const DRY_AIR_GAS_CONSTANT_J_PER_KG_K: f32 = 287.05;

/// Density-altitude correction per degree of ISA deviation (ft/°C).
///
/// Empirical rule: density altitude rises by roughly 120 ft for every
/// degree the outside air is warmer than ISA at that pressure altitude.
///
/// Source: FAA Pilot's Handbook of Aeronautical Knowledge, Ch. 4
pub const DENSITY_ALTITUDE_FT_PER_C: f32 = 118.8;

// ===== SOUND AND GRAVITY =====

/// Speed of sound in dry air at 0 °C (m/s).
///
/// Base of the linear model c = 331.3 + 0.606 * T(°C), accurate to
/// within 0.5% over the ambient range.
///
/// Source: ISO 9613-1:1993
pub const SPEED_OF_SOUND_0C_M_PER_S: f32 = 331.3;

/// Temperature slope of the speed of sound (m/s per °C).
///
/// Source: ISO 9613-1:1993
pub const SPEED_OF_SOUND_SLOPE_M_PER_S_C: f32 = 0.606;

/// Standard acceleration of gravity (m/s²).
///
/// Conventional two-decimal value used for G-load display. Instrument
/// convention rounds the ISO 80000-3 value of 9.80665.
///
/// Source: ISO 80000-3, rounded per avionics display practice
pub const STANDARD_GRAVITY_M_PER_S2: f32 = 9.81;

// ===== UNIT CONVERSIONS =====

/// Celsius to Kelvin offset.
///
/// Source: NIST Special Publication 330
pub const CELSIUS_TO_KELVIN_OFFSET: f32 = 273.15;

/// Hectopascals to pounds per square inch.
///
/// 1 hPa = 100 Pa; 1 psi = 6894.757 Pa.
///
/// Source: NIST Special Publication 811
pub const HPA_TO_PSI: f32 = 0.0145038;

/// Meters to feet.
///
/// Source: NIST Special Publication 811
pub const M_TO_FT: f32 = 3.28084;

/// Meters per second to kilometers per hour.
pub const M_PER_S_TO_KMH: f32 = 3.6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isa_coefficient_matches_lapse_rate() {
        // 0.0065 / 288.15 within float rounding of the published coefficient
        let derived = ISA_TEMP_LAPSE_C_PER_M / (ISA_SEA_LEVEL_TEMP_C + CELSIUS_TO_KELVIN_OFFSET);
        assert!((derived - ISA_PRESSURE_ALT_COEFF).abs() < 1e-8);
    }

    #[test]
    fn sound_model_matches_20c_reference() {
        // ISO 9613-1 lists 343.2 m/s at 20 °C
        let c20 = SPEED_OF_SOUND_0C_M_PER_S + SPEED_OF_SOUND_SLOPE_M_PER_S_C * 20.0;
        assert!((c20 - 343.2).abs() < 0.5);
    }
}
