//! Environmental channel decoding: magnetometer, barometer, ambient light
//!
//! Each is an independently optional capability; the decoders only judge
//! individual samples. Availability (sensor present at all) is tracked by
//! the snapshot so a legitimate zero reading is never confused with "no
//! sensor".

use libm::sqrtf;

use crate::constants::channels::{
    ILLUMINANCE_MAX_LUX, MAG_FIELD_MAX_UT, PRESSURE_MAX_HPA, PRESSURE_MIN_HPA,
};
use crate::errors::{SensorError, SensorResult};
use crate::events::{RawIlluminance, RawPressure, RawVector};
use crate::time::Timestamp;

/// Validated magnetic field reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagneticReading {
    /// Field vector in device axes (µT)
    pub field_ut: [f32; 3],
    /// Field magnitude (µT)
    pub magnitude_ut: f32,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Validated static pressure reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PressureReading {
    /// Static pressure in hPa
    pub hpa: f32,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Validated illuminance reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightReading {
    /// Illuminance in lux
    pub lux: f32,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Decode one magnetometer sample
pub fn decode_magnetic(sample: &RawVector) -> SensorResult<MagneticReading> {
    let field = [sample.x_ut, sample.y_ut, sample.z_ut];
    if !field.iter().all(|c| c.is_finite()) {
        return Err(SensorError::malformed("magnetic field not finite"));
    }

    let magnitude = sqrtf(field[0] * field[0] + field[1] * field[1] + field[2] * field[2]);
    if magnitude > MAG_FIELD_MAX_UT {
        return Err(SensorError::malformed("magnetic field beyond sensor range"));
    }

    Ok(MagneticReading {
        field_ut: field,
        magnitude_ut: magnitude,
        timestamp: sample.timestamp,
    })
}

/// Decode one barometer sample
pub fn decode_pressure(sample: &RawPressure) -> SensorResult<PressureReading> {
    if !sample.hpa.is_finite() {
        return Err(SensorError::malformed("pressure not finite"));
    }
    if !(PRESSURE_MIN_HPA..=PRESSURE_MAX_HPA).contains(&sample.hpa) {
        return Err(SensorError::malformed("pressure implausible"));
    }

    Ok(PressureReading {
        hpa: sample.hpa,
        timestamp: sample.timestamp,
    })
}

/// Decode one ambient light sample
pub fn decode_light(sample: &RawIlluminance) -> SensorResult<LightReading> {
    if !sample.lux.is_finite() || sample.lux < 0.0 {
        return Err(SensorError::malformed("illuminance not usable"));
    }
    if sample.lux > ILLUMINANCE_MAX_LUX {
        return Err(SensorError::malformed("illuminance implausible"));
    }

    Ok(LightReading {
        lux: sample.lux,
        timestamp: sample.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnetic_magnitude_computed() {
        let reading = decode_magnetic(&RawVector {
            x_ut: 20.0,
            y_ut: 0.0,
            z_ut: -45.0,
            timestamp: 1,
        })
        .unwrap();
        assert!((reading.magnitude_ut - sqrtf(20.0 * 20.0 + 45.0 * 45.0)).abs() < 1e-4);
    }

    #[test]
    fn magnetic_rejects_corrupt_vectors() {
        assert!(decode_magnetic(&RawVector {
            x_ut: f32::NAN,
            y_ut: 0.0,
            z_ut: 0.0,
            timestamp: 1,
        })
        .is_err());

        assert!(decode_magnetic(&RawVector {
            x_ut: 9000.0,
            y_ut: 0.0,
            z_ut: 0.0,
            timestamp: 1,
        })
        .is_err());
    }

    #[test]
    fn pressure_bounds_allow_altitude_range() {
        // Sea level high and cruise-altitude low both pass
        assert!(decode_pressure(&RawPressure {
            hpa: 1035.0,
            timestamp: 1
        })
        .is_ok());
        assert!(decode_pressure(&RawPressure {
            hpa: 300.0,
            timestamp: 1
        })
        .is_ok());

        assert!(decode_pressure(&RawPressure {
            hpa: 150.0,
            timestamp: 1
        })
        .is_err());
        assert!(decode_pressure(&RawPressure {
            hpa: 1200.0,
            timestamp: 1
        })
        .is_err());
    }

    #[test]
    fn zero_lux_is_a_valid_reading() {
        // Darkness is data; only negative or absurd values are rejected
        assert!(decode_light(&RawIlluminance {
            lux: 0.0,
            timestamp: 1
        })
        .is_ok());
        assert!(decode_light(&RawIlluminance {
            lux: -5.0,
            timestamp: 1
        })
        .is_err());
        assert!(decode_light(&RawIlluminance {
            lux: 1.0e9,
            timestamp: 1
        })
        .is_err());
    }
}
