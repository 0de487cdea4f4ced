//! Sensor Intake: the write path from platform callbacks into the core
//!
//! One bounded queue per event-driven channel, plus a rolling ring for
//! audio frames and two low-rate side inputs (fix faults and the auxiliary
//! ambient temperature feed). Each queue has exactly one producer, which is
//! what makes the lock-free push sound, and the aggregating task is the
//! only consumer.
//!
//! Push methods return immediately in all cases. A full queue drops the
//! event and counts it; the audio ring instead drops its oldest frame so
//! the newest is always available to the next microphone tick.
//!
//! The intake is `const`-constructible so it can live in a `static` next to
//! the platform glue:
//!
//! ```rust
//! use skygauge_core::SensorIntake;
//!
//! static INTAKE: SensorIntake = SensorIntake::new();
//! ```

use crate::channel::Channel;
use crate::constants::channels::{AUDIO_RING_CAPACITY, RAW_QUEUE_CAPACITY};
use crate::events::{
    AmbientTemperature, AudioFrame, FixFault, RawFix, RawIlluminance, RawMotion, RawOrientation,
    RawPressure, RawVector,
};
use crate::queue::{QueueStats, RawQueue};

/// Capacity of the low-rate side queues (fix faults, temperature)
const SIDE_QUEUE_CAPACITY: usize = 8;

/// Per-channel raw event queues
///
/// The seam both real platform adapters and the demo producers write into.
pub struct SensorIntake {
    location: RawQueue<RawFix, RAW_QUEUE_CAPACITY>,
    fix_faults: RawQueue<FixFault, SIDE_QUEUE_CAPACITY>,
    motion: RawQueue<RawMotion, RAW_QUEUE_CAPACITY>,
    orientation: RawQueue<RawOrientation, RAW_QUEUE_CAPACITY>,
    magnetometer: RawQueue<RawVector, RAW_QUEUE_CAPACITY>,
    barometer: RawQueue<RawPressure, RAW_QUEUE_CAPACITY>,
    ambient_light: RawQueue<RawIlluminance, RAW_QUEUE_CAPACITY>,
    audio: RawQueue<AudioFrame, AUDIO_RING_CAPACITY>,
    temperature: RawQueue<AmbientTemperature, SIDE_QUEUE_CAPACITY>,
}

impl SensorIntake {
    /// Create an empty intake
    pub const fn new() -> Self {
        Self {
            location: RawQueue::new(),
            fix_faults: RawQueue::new(),
            motion: RawQueue::new(),
            orientation: RawQueue::new(),
            magnetometer: RawQueue::new(),
            barometer: RawQueue::new(),
            ambient_light: RawQueue::new(),
            audio: RawQueue::new(),
            temperature: RawQueue::new(),
        }
    }

    /// Push a position fix from the location watcher
    pub fn push_fix(&self, fix: RawFix) -> bool {
        self.location.push(fix)
    }

    /// Record a failed fix; the aggregator counts it and awaits the next one
    pub fn push_fix_fault(&self, fault: FixFault) -> bool {
        self.fix_faults.push(fault)
    }

    /// Push an inertial motion sample
    pub fn push_motion(&self, sample: RawMotion) -> bool {
        self.motion.push(sample)
    }

    /// Push an orientation sample
    pub fn push_orientation(&self, sample: RawOrientation) -> bool {
        self.orientation.push(sample)
    }

    /// Push a magnetometer sample
    pub fn push_magnetic(&self, sample: RawVector) -> bool {
        self.magnetometer.push(sample)
    }

    /// Push a barometer sample
    pub fn push_pressure(&self, sample: RawPressure) -> bool {
        self.barometer.push(sample)
    }

    /// Push an illuminance sample
    pub fn push_illuminance(&self, sample: RawIlluminance) -> bool {
        self.ambient_light.push(sample)
    }

    /// Push an audio frame, rolling out the oldest frame when full
    ///
    /// Audio hardware outpaces the sampling tick by design; losing stale
    /// frames is the intended behavior, not an overflow.
    pub fn push_audio_frame(&self, frame: AudioFrame) {
        if !self.audio.push(frame) {
            let _ = self.audio.pop();
            let _ = self.audio.push(frame);
        }
    }

    /// Push an ambient temperature sample from the auxiliary feed
    pub fn push_temperature(&self, sample: AmbientTemperature) -> bool {
        self.temperature.push(sample)
    }

    /// Queue statistics for one channel
    pub fn queue_stats(&self, channel: Channel) -> &QueueStats {
        match channel {
            Channel::Location => self.location.stats(),
            Channel::Motion => self.motion.stats(),
            Channel::Orientation => self.orientation.stats(),
            Channel::Magnetometer => self.magnetometer.stats(),
            Channel::Barometer => self.barometer.stats(),
            Channel::AmbientLight => self.ambient_light.stats(),
            Channel::Microphone => self.audio.stats(),
        }
    }

    pub(crate) fn pop_fix(&self) -> Option<RawFix> {
        self.location.pop()
    }

    pub(crate) fn pop_fix_fault(&self) -> Option<FixFault> {
        self.fix_faults.pop()
    }

    pub(crate) fn pop_motion(&self) -> Option<RawMotion> {
        self.motion.pop()
    }

    pub(crate) fn pop_orientation(&self) -> Option<RawOrientation> {
        self.orientation.pop()
    }

    pub(crate) fn pop_magnetic(&self) -> Option<RawVector> {
        self.magnetometer.pop()
    }

    pub(crate) fn pop_pressure(&self) -> Option<RawPressure> {
        self.barometer.pop()
    }

    pub(crate) fn pop_illuminance(&self) -> Option<RawIlluminance> {
        self.ambient_light.pop()
    }

    pub(crate) fn pop_temperature(&self) -> Option<AmbientTemperature> {
        self.temperature.pop()
    }

    /// Drain the audio ring, returning the newest frame and how many frames
    /// were discarded to reach it
    pub(crate) fn take_newest_audio_frame(&self) -> Option<(AudioFrame, u32)> {
        let mut newest = None;
        let mut skipped = 0;
        for frame in self.audio.drain() {
            if newest.is_some() {
                skipped += 1;
            }
            newest = Some(frame);
        }
        newest.map(|frame| (frame, skipped))
    }
}

impl Default for SensorIntake {
    fn default() -> Self {
        Self::new()
    }
}
