//! Sensor Snapshot Store
//!
//! ## Ownership Model
//!
//! The snapshot is the single shared structure holding the latest committed
//! reading per channel. Exactly one component (the hub) holds it mutably;
//! the mutation entry points are crate-private and channel-scoped, so no
//! two channels can ever write the same field. Consumers get `&self` access
//! and the derived view recomputed on read.
//!
//! ## Lifecycle
//!
//! Created with explicit defaults (altitude 0, sea-level pressure, silence
//! floor) at session start. Peak fields are cleared only by
//! [`SensorSnapshot::reset_peaks`]; everything else changes only through a
//! committed update from its owning channel. The whole snapshot is
//! discarded at session end.
//!
//! ## Availability vs. Value
//!
//! Every subtree keeps its default values until its channel commits, and
//! the per-channel availability bit records whether a genuine reading ever
//! arrived. Consumers must check availability before trusting a zero.

use crate::channel::{Channel, ChannelSet};
use crate::constants::channels::LOUDNESS_FLOOR_DBFS;
use crate::constants::physics::SEA_LEVEL_PRESSURE_HPA;
use crate::decode::{
    LightReading, LocationReading, LoudnessReading, MagneticReading, MotionReading,
    OrientationReading, PressureReading,
};
use crate::events::AmbientTemperature;
use crate::time::Timestamp;

/// Where a pressure value came from
///
/// Consumers that require a real sensor must check this tag, never just
/// the presence of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PressureSource {
    /// Measured by the barometer channel
    Barometer,
    /// Estimated from GPS altitude through the standard atmosphere model
    IsaModel,
}

/// Running maximum that survives throttling
///
/// Observes every decoded sample, committed or dropped, and only an
/// explicit reset brings it back to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakAccumulator {
    max: f32,
}

impl PeakAccumulator {
    /// Feed one sample
    pub fn observe(&mut self, value: f32) {
        if value > self.max {
            self.max = value;
        }
    }

    /// Current maximum
    pub const fn get(&self) -> f32 {
        self.max
    }

    /// Clear back to zero
    pub fn reset(&mut self) {
        self.max = 0.0;
    }
}

/// Previous altitude sample for the climb-rate finite difference
///
/// Holds exactly one (altitude, time) pair. Overwritten each time a climb
/// computation runs, not on every raw fix, so the difference always spans
/// one climb interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct AltitudeRing {
    prev: Option<(f32, Timestamp)>,
}

impl AltitudeRing {
    /// Empty ring; the first update only seeds it
    pub const fn new() -> Self {
        Self { prev: None }
    }

    /// Compute the climb rate against the stored sample, then store this one
    ///
    /// Returns m/s, or None on the seeding call and when the two samples
    /// share a timestamp.
    pub fn update(&mut self, altitude_m: f32, at: Timestamp) -> Option<f32> {
        let rate = self.prev.and_then(|(prev_alt, prev_at)| {
            let dt_ms = at.saturating_sub(prev_at);
            if dt_ms == 0 {
                None
            } else {
                Some((altitude_m - prev_alt) * 1000.0 / dt_ms as f32)
            }
        });
        self.prev = Some((altitude_m, at));
        rate
    }
}

/// Latest committed position state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationState {
    /// Latitude in decimal degrees
    pub latitude_deg: f64,
    /// Longitude in decimal degrees
    pub longitude_deg: f64,
    /// Altitude in meters (session default 0)
    pub altitude_m: f32,
    /// Horizontal accuracy radius in meters, when reported
    pub horizontal_accuracy_m: Option<f32>,
    /// Ground speed in m/s (session default 0)
    pub ground_speed_m_per_s: f32,
    /// True-north course over ground, when meaningful
    pub course_deg: Option<f32>,
    /// Climb rate in m/s, committed on its own slower cadence
    pub vertical_speed_m_per_s: Option<f32>,
}

impl Default for LocationState {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
            horizontal_accuracy_m: None,
            ground_speed_m_per_s: 0.0,
            course_deg: None,
            vertical_speed_m_per_s: None,
        }
    }
}

/// Latest committed motion state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionState {
    /// Instantaneous total acceleration in g units
    pub g_force: f32,
    /// Running peak of every observed G sample
    pub peak: PeakAccumulator,
    /// Gravity-excluded acceleration magnitude in m/s², once seen
    pub vibration_m_per_s2: Option<f32>,
}

/// Latest committed heading state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrientationState {
    /// Magnetic heading in degrees, [0, 360)
    pub heading_deg: f32,
}

/// Latest committed magnetic field state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagnetometerState {
    /// Field vector in device axes (µT)
    pub field_ut: [f32; 3],
    /// Field magnitude (µT)
    pub magnitude_ut: f32,
}

/// Latest committed pressure state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarometerState {
    /// Static pressure in hPa (session default: ISA sea level)
    pub hpa: f32,
}

impl Default for BarometerState {
    fn default() -> Self {
        Self {
            hpa: SEA_LEVEL_PRESSURE_HPA,
        }
    }
}

/// Latest committed illuminance state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmbientLightState {
    /// Illuminance in lux
    pub lux: f32,
}

/// Latest committed loudness state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MicrophoneState {
    /// Loudness in dBFS (session default: silence floor)
    pub dbfs: f32,
}

impl Default for MicrophoneState {
    fn default() -> Self {
        Self {
            dbfs: LOUDNESS_FLOOR_DBFS,
        }
    }
}

/// The complete current set of latest-known per-channel values
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSnapshot {
    location: LocationState,
    motion: MotionState,
    orientation: OrientationState,
    magnetometer: MagnetometerState,
    barometer: BarometerState,
    ambient_light: AmbientLightState,
    microphone: MicrophoneState,
    ambient_temperature: Option<AmbientTemperature>,
    available: ChannelSet,
    last_commit: [Option<Timestamp>; Channel::COUNT],
}

impl SensorSnapshot {
    /// Snapshot with session-start defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Position state
    pub const fn location(&self) -> &LocationState {
        &self.location
    }

    /// Motion state
    pub const fn motion(&self) -> &MotionState {
        &self.motion
    }

    /// Heading state
    pub const fn orientation(&self) -> &OrientationState {
        &self.orientation
    }

    /// Magnetic field state
    pub const fn magnetometer(&self) -> &MagnetometerState {
        &self.magnetometer
    }

    /// Pressure state (raw channel value; see [`Self::pressure`] for the
    /// resolved value with provenance)
    pub const fn barometer(&self) -> &BarometerState {
        &self.barometer
    }

    /// Illuminance state
    pub const fn ambient_light(&self) -> &AmbientLightState {
        &self.ambient_light
    }

    /// Loudness state
    pub const fn microphone(&self) -> &MicrophoneState {
        &self.microphone
    }

    /// Auxiliary outside-air temperature, once fed
    pub const fn ambient_temperature(&self) -> Option<AmbientTemperature> {
        self.ambient_temperature
    }

    /// Channels that have delivered at least one valid reading
    pub const fn availability(&self) -> ChannelSet {
        self.available
    }

    /// Whether a channel has ever delivered a valid reading
    pub const fn is_available(&self, channel: Channel) -> bool {
        self.available.contains(channel)
    }

    /// When a channel last committed, for staleness display
    pub const fn last_commit(&self, channel: Channel) -> Option<Timestamp> {
        self.last_commit[channel.index()]
    }

    /// Clear peak accumulators, touching nothing else
    pub fn reset_peaks(&mut self) {
        self.motion.peak.reset();
    }

    /// Mark a channel live after its first valid decode
    ///
    /// Decoding alone flips availability; a throttled-away sample still
    /// proves the sensor works.
    pub(crate) fn mark_live(&mut self, channel: Channel) {
        self.available.mark(channel);
    }

    pub(crate) fn observe_peak_g(&mut self, g_force: f32) {
        self.motion.peak.observe(g_force);
    }

    pub(crate) fn apply_location(&mut self, reading: &LocationReading, now: Timestamp) {
        self.location.latitude_deg = reading.latitude_deg;
        self.location.longitude_deg = reading.longitude_deg;
        self.location.altitude_m = reading.altitude_m;
        self.location.horizontal_accuracy_m = reading.horizontal_accuracy_m;
        self.location.ground_speed_m_per_s = reading.ground_speed_m_per_s;
        self.location.course_deg = reading.course_deg;
        self.stamp(Channel::Location, now);
    }

    pub(crate) fn apply_vertical_speed(&mut self, rate_m_per_s: f32) {
        self.location.vertical_speed_m_per_s = Some(rate_m_per_s);
    }

    pub(crate) fn apply_motion(&mut self, reading: &MotionReading, now: Timestamp) {
        self.motion.g_force = reading.g_force;
        self.stamp(Channel::Motion, now);
    }

    pub(crate) fn apply_vibration(&mut self, magnitude_m_per_s2: f32) {
        self.motion.vibration_m_per_s2 = Some(magnitude_m_per_s2);
    }

    pub(crate) fn apply_orientation(&mut self, reading: &OrientationReading, now: Timestamp) {
        self.orientation.heading_deg = reading.heading_deg;
        self.stamp(Channel::Orientation, now);
    }

    pub(crate) fn apply_magnetic(&mut self, reading: &MagneticReading, now: Timestamp) {
        self.magnetometer.field_ut = reading.field_ut;
        self.magnetometer.magnitude_ut = reading.magnitude_ut;
        self.stamp(Channel::Magnetometer, now);
    }

    pub(crate) fn apply_pressure(&mut self, reading: &PressureReading, now: Timestamp) {
        self.barometer.hpa = reading.hpa;
        self.stamp(Channel::Barometer, now);
    }

    pub(crate) fn apply_illuminance(&mut self, reading: &LightReading, now: Timestamp) {
        self.ambient_light.lux = reading.lux;
        self.stamp(Channel::AmbientLight, now);
    }

    pub(crate) fn apply_loudness(&mut self, reading: &LoudnessReading, now: Timestamp) {
        self.microphone.dbfs = reading.dbfs;
        self.stamp(Channel::Microphone, now);
    }

    pub(crate) fn apply_ambient_temperature(&mut self, sample: AmbientTemperature) {
        self.ambient_temperature = Some(sample);
    }

    fn stamp(&mut self, channel: Channel, now: Timestamp) {
        self.last_commit[channel.index()] = Some(now);
    }
}
