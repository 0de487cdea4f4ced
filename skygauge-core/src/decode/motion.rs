//! Motion sample decoding
//!
//! The gravity-inclusive vector is required; a sample without it is
//! discarded whole, never partially computed. Total G-force is the
//! Euclidean norm of that vector over standard gravity, so a device at
//! rest reads 1.0. Vibration is the norm of the gravity-excluded vector
//! when the host supplies one; its absence is preserved as `None` so "no
//! linear accelerometer" never displays as "not vibrating".

use libm::sqrtf;

use crate::constants::channels::ACCEL_MAX_M_PER_S2;
use crate::constants::physics::STANDARD_GRAVITY_M_PER_S2;
use crate::errors::{SensorError, SensorResult};
use crate::events::RawMotion;
use crate::time::Timestamp;

/// Validated motion reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionReading {
    /// Total acceleration in g units (1.0 at rest)
    pub g_force: f32,
    /// Gravity-excluded acceleration magnitude in m/s², when available
    pub vibration_m_per_s2: Option<f32>,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

fn norm(v: [f32; 3]) -> f32 {
    sqrtf(v[0] * v[0] + v[1] * v[1] + v[2] * v[2])
}

fn finite(v: [f32; 3]) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Decode one raw motion sample
pub fn decode(sample: &RawMotion) -> SensorResult<MotionReading> {
    let gravity_vec = sample
        .acceleration_incl_gravity
        .ok_or(SensorError::malformed("missing acceleration vector"))?;

    if !finite(gravity_vec) {
        return Err(SensorError::malformed("acceleration not finite"));
    }

    let magnitude = norm(gravity_vec);
    if magnitude > ACCEL_MAX_M_PER_S2 {
        return Err(SensorError::malformed("acceleration beyond sensor range"));
    }

    let vibration_m_per_s2 = match sample.linear_acceleration {
        Some(linear) if finite(linear) => Some(norm(linear)),
        Some(_) => return Err(SensorError::malformed("linear acceleration not finite")),
        None => None,
    };

    Ok(MotionReading {
        g_force: magnitude / STANDARD_GRAVITY_M_PER_S2,
        vibration_m_per_s2,
        timestamp: sample.timestamp,
    })
}
