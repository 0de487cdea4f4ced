//! Channel identity and availability tracking
//!
//! A channel is one independent physical-sensor source plus its
//! normalization and throttle state. The seven channels are fixed; every
//! per-channel table in the core is indexed by [`Channel::index`].
//!
//! Availability is recorded in a [`ChannelSet`] that only ever gains bits.
//! A channel that has produced one valid reading stays live for the whole
//! session; a stalled stream shows as stale, never as unavailable again.

use core::fmt;

use crate::constants::channels::{FAST_COMMIT_INTERVAL_MS, MIC_TICK_INTERVAL_MS};

/// One independent sensor data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Channel {
    /// Continuous position fixes (latitude, longitude, altitude, speed, course)
    Location = 0,
    /// Gravity-inclusive acceleration vectors
    Motion = 1,
    /// Device heading from compass or rotation angle
    Orientation = 2,
    /// 3-axis magnetic field strength
    Magnetometer = 3,
    /// Static atmospheric pressure
    Barometer = 4,
    /// Illuminance
    AmbientLight = 5,
    /// Loudness from a rolling frequency-domain frame buffer
    Microphone = 6,
}

impl Channel {
    /// Number of channels
    pub const COUNT: usize = 7;

    /// All channels in index order
    pub const ALL: [Channel; Self::COUNT] = [
        Channel::Location,
        Channel::Motion,
        Channel::Orientation,
        Channel::Magnetometer,
        Channel::Barometer,
        Channel::AmbientLight,
        Channel::Microphone,
    ];

    /// Dense index for per-channel tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Channel::Location => "location",
            Channel::Motion => "motion",
            Channel::Orientation => "orientation",
            Channel::Magnetometer => "magnetometer",
            Channel::Barometer => "barometer",
            Channel::AmbientLight => "ambient_light",
            Channel::Microphone => "microphone",
        }
    }

    /// Unit of the channel's primary scalar
    pub const fn unit(&self) -> &'static str {
        match self {
            Channel::Location => "m",
            Channel::Motion => "g",
            Channel::Orientation => "°",
            Channel::Magnetometer => "µT",
            Channel::Barometer => "hPa",
            Channel::AmbientLight => "lx",
            Channel::Microphone => "dBFS",
        }
    }

    /// Default commit interval for this channel (ms)
    ///
    /// All primary values commit at the fast interval; the microphone is
    /// bounded by its sampling tick instead of a per-event throttle.
    pub const fn default_interval_ms(self) -> u64 {
        match self {
            Channel::Microphone => MIC_TICK_INTERVAL_MS,
            _ => FAST_COMMIT_INTERVAL_MS,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of channels, used for the availability flags
///
/// The API is set-only: bits can be marked but never cleared, which makes
/// the availability invariant (monotonic false to true) structural rather
/// than a convention callers must remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSet(u8);

impl ChannelSet {
    /// Empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set with every channel marked
    pub const fn all() -> Self {
        Self((1 << Channel::COUNT) - 1)
    }

    /// Mark a channel as present
    pub fn mark(&mut self, channel: Channel) {
        self.0 |= 1 << channel.index();
    }

    /// Check whether a channel is present
    pub const fn contains(&self, channel: Channel) -> bool {
        (self.0 >> channel.index()) & 1 == 1
    }

    /// True when no channel is marked
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of marked channels
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over marked channels in index order
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(|ch| self.contains(*ch))
    }
}
