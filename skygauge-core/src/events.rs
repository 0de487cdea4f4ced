//! Raw Platform Event Types
//!
//! ## Overview
//!
//! Platform sensor callbacks deliver loosely-typed payloads whose fields
//! come and go by device and browser engine. Everything the platform may or
//! may not supply is spelled out here as an explicit `Option`, and the
//! decode boundary (see [`crate::decode`]) turns each raw event into a
//! validated reading exactly once. Internal logic never re-probes whether
//! a field exists.
//!
//! ## Memory Model
//!
//! Raw events are `Copy` and fixed-size so they can sit in the lock-free
//! intake queues without allocation. The largest payload is the audio
//! frame at just over 128 bytes; everything else is well under one cache
//! line.
//!
//! ## Conventions
//!
//! - Latitude/longitude are `f64`; every other quantity fits `f32`
//! - Angles arrive in degrees, any range; decoders wrap into [0, 360)
//! - Speeds arrive in m/s; a negative speed means "unknown" on several
//!   platforms and decodes as absent
//! - `timestamp` is the platform's event time in milliseconds

use core::fmt;

use crate::constants::channels::AUDIO_BIN_COUNT;
use crate::time::Timestamp;

/// Raw geolocation fix as delivered by the platform watcher
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFix {
    /// Latitude in decimal degrees, north positive
    pub latitude_deg: f64,
    /// Longitude in decimal degrees, east positive
    pub longitude_deg: f64,
    /// Altitude above the WGS84 ellipsoid in meters, if the fix carries one
    pub altitude_m: Option<f32>,
    /// Estimated horizontal accuracy radius in meters
    pub horizontal_accuracy_m: Option<f32>,
    /// Ground speed in m/s; negative values mean unknown
    pub speed_m_per_s: Option<f32>,
    /// True-north course over ground in degrees; negative values mean unknown
    pub course_deg: Option<f32>,
    /// Fix time in milliseconds
    pub timestamp: Timestamp,
}

/// Why a single location fix failed
///
/// Faults are transient by definition: the watcher keeps running and the
/// next fix is awaited with no backoff state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FixFault {
    /// The per-fix timeout elapsed before a position arrived
    Timeout,
    /// The location service could not produce a position
    Unavailable,
}

impl FixFault {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            FixFault::Timeout => "timeout",
            FixFault::Unavailable => "position unavailable",
        }
    }
}

impl fmt::Display for FixFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw inertial motion sample
///
/// The gravity-inclusive vector is the primary payload; some hosts also
/// supply a gravity-excluded (linear) vector from the same event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMotion {
    /// Acceleration including gravity, device axes, m/s²
    pub acceleration_incl_gravity: Option<[f32; 3]>,
    /// Acceleration with gravity removed, device axes, m/s²
    pub linear_acceleration: Option<[f32; 3]>,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Raw orientation sample
///
/// Two divergent conventions exist in the wild: a device-native compass
/// heading, or a rotation angle about the screen axis that must be
/// inverted to yield a heading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawOrientation {
    /// Native compass heading in degrees clockwise from magnetic north
    pub compass_heading_deg: Option<f32>,
    /// Rotation about the screen axis in degrees, counterclockwise positive
    pub rotation_deg: Option<f32>,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Raw 3-axis magnetic field sample in microtesla
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawVector {
    /// Field along the device X axis (µT)
    pub x_ut: f32,
    /// Field along the device Y axis (µT)
    pub y_ut: f32,
    /// Field along the device Z axis (µT)
    pub z_ut: f32,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Raw static pressure sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawPressure {
    /// Static pressure in hectopascals
    pub hpa: f32,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Raw illuminance sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawIlluminance {
    /// Illuminance in lux
    pub lux: f32,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// One frequency-domain audio frame
///
/// Bin magnitudes are normalized to [0, 1]. Frames are pushed at the audio
/// hardware rate into a small rolling ring; only the newest frame is
/// sampled each microphone tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioFrame {
    /// Normalized bin magnitudes
    pub bins: [f32; AUDIO_BIN_COUNT],
    /// Capture time in milliseconds
    pub timestamp: Timestamp,
}

impl AudioFrame {
    /// Frame with every bin at the same level, mostly useful in tests
    pub const fn uniform(level: f32, timestamp: Timestamp) -> Self {
        Self {
            bins: [level; AUDIO_BIN_COUNT],
            timestamp,
        }
    }
}

/// Ambient temperature sample from an auxiliary feed
///
/// There is no portable hardware API for air temperature, so this value
/// always comes from an external collaborator. The `simulated` flag is the
/// provenance tag that keeps generated values distinguishable from a real
/// integration; nothing in the core ever sets it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmbientTemperature {
    /// Outside air temperature in °C
    pub celsius: f32,
    /// True when the value was generated rather than measured
    pub simulated: bool,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}
