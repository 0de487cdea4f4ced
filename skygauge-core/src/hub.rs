//! Sensor Aggregation Hub
//!
//! The hub is the single consumer of every intake queue and the only
//! writer of the snapshot. One `process` call drains all pending raw
//! events, runs each through its channel decoder, feeds the peak and
//! finite-difference stages that must see every sample, and commits the
//! survivors through the per-channel throttles.
//!
//! ## Processing Order Per Event
//!
//! 1. Decode (reject malformed, count it, move on)
//! 2. Mark the channel live
//! 3. Always-on stages: peak G observation, climb-rate differencing
//! 4. Throttle gate
//! 5. Snapshot commit
//!
//! The always-on stages run before the throttle on purpose. A 4 g spike
//! inside a throttle window still has to end up in the peak readout.
//!
//! ## Microphone Cadence
//!
//! Audio is not event-committed. Frames roll through a small ring and a
//! tick sampler takes the newest one each time its gate opens; frames the
//! tick skipped over count as throttled. [`SensorHub::poll_loudness`]
//! exposes the sampler directly in `nb` style for callers that tick audio
//! on their own schedule.

use crate::channel::Channel;
use crate::constants::channels::SLOW_COMMIT_INTERVAL_MS;
use crate::decode;
use crate::errors::SensorError;
use crate::events::FixFault;
use crate::intake::SensorIntake;
use crate::snapshot::{AltitudeRing, SensorSnapshot};
use crate::throttle::Throttle;
use crate::time::{TimeSource, Timestamp};

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ let _ = ($($arg)*); }};
}

/// Per-channel intake accounting
///
/// Counters cover the full life of a session; [`SensorHub::reset`] zeroes
/// them. `received == committed + throttled + malformed` holds for every
/// channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelStats {
    /// Raw events drained from the channel's queue
    pub received: u32,
    /// Readings committed into the snapshot
    pub committed: u32,
    /// Valid readings dropped by the commit throttle
    pub throttled: u32,
    /// Events rejected by the decoder
    pub malformed: u32,
}

/// Configures commit cadences before the hub starts
///
/// ```
/// use skygauge_core::{Channel, SensorHubBuilder};
/// use skygauge_core::time::MockTimeSource;
///
/// let hub = SensorHubBuilder::new()
///     .interval_ms(Channel::Barometer, 100)
///     .climb_interval_ms(2000)
///     .build(MockTimeSource::new(0));
/// # let _ = hub;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SensorHubBuilder {
    intervals: [u64; Channel::COUNT],
    climb_interval_ms: u64,
    vibration_interval_ms: u64,
}

impl SensorHubBuilder {
    /// Builder with the per-channel default cadences
    pub const fn new() -> Self {
        let mut intervals = [0u64; Channel::COUNT];
        let mut i = 0;
        while i < Channel::COUNT {
            intervals[i] = Channel::ALL[i].default_interval_ms();
            i += 1;
        }
        Self {
            intervals,
            climb_interval_ms: SLOW_COMMIT_INTERVAL_MS,
            vibration_interval_ms: SLOW_COMMIT_INTERVAL_MS,
        }
    }

    /// Override one channel's minimum commit spacing
    pub const fn interval_ms(mut self, channel: Channel, interval_ms: u64) -> Self {
        self.intervals[channel.index()] = interval_ms;
        self
    }

    /// Override the climb-rate recomputation spacing
    pub const fn climb_interval_ms(mut self, interval_ms: u64) -> Self {
        self.climb_interval_ms = interval_ms;
        self
    }

    /// Override the vibration commit spacing
    pub const fn vibration_interval_ms(mut self, interval_ms: u64) -> Self {
        self.vibration_interval_ms = interval_ms;
        self
    }

    /// Finish configuration and attach the clock
    pub fn build<T: TimeSource>(self, clock: T) -> SensorHub<T> {
        let mut throttles = [Throttle::new(0); Channel::COUNT];
        let mut i = 0;
        while i < Channel::COUNT {
            throttles[i] = Throttle::new(self.intervals[i]);
            i += 1;
        }
        SensorHub {
            clock,
            snapshot: SensorSnapshot::new(),
            altitude_ring: AltitudeRing::new(),
            throttles,
            climb_gate: Throttle::new(self.climb_interval_ms),
            vibration_gate: Throttle::new(self.vibration_interval_ms),
            stats: [ChannelStats::default(); Channel::COUNT],
            fix_faults: 0,
            last_fix_fault: None,
        }
    }
}

impl Default for SensorHubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-consumer aggregator owning the snapshot
///
/// Exactly one hub exists per session. It is the only code that pops the
/// intake queues and the only code with mutable access to the snapshot,
/// which is what lets the snapshot skip interior locking entirely.
pub struct SensorHub<T: TimeSource> {
    clock: T,
    snapshot: SensorSnapshot,
    altitude_ring: AltitudeRing,
    throttles: [Throttle; Channel::COUNT],
    climb_gate: Throttle,
    vibration_gate: Throttle,
    stats: [ChannelStats; Channel::COUNT],
    fix_faults: u32,
    last_fix_fault: Option<FixFault>,
}

impl<T: TimeSource> SensorHub<T> {
    /// Hub with default cadences
    pub fn new(clock: T) -> Self {
        SensorHubBuilder::new().build(clock)
    }

    /// Builder for custom cadences
    pub const fn builder() -> SensorHubBuilder {
        SensorHubBuilder::new()
    }

    /// Drain every pending raw event and commit what passes
    ///
    /// Returns the number of events consumed. Call this from exactly one
    /// place on a short period (or whenever any producer signals); the
    /// queues absorb whatever burst arrived since the last call.
    pub fn process(&mut self, intake: &SensorIntake) -> usize {
        let now = self.clock.now();
        let mut drained = 0;

        drained += self.drain_location(intake, now);
        drained += self.drain_motion(intake, now);
        drained += self.drain_orientation(intake, now);
        drained += self.drain_magnetometer(intake, now);
        drained += self.drain_barometer(intake, now);
        drained += self.drain_ambient_light(intake, now);
        drained += self.tick_microphone(intake);
        drained += self.drain_temperature(intake);

        drained
    }

    /// Run one microphone tick
    ///
    /// Takes the newest rolled-in frame when the tick gate is open.
    /// Returns the committed loudness in dBFS, [`nb::Error::WouldBlock`]
    /// while the gate is closed or no frame has arrived, or the decode
    /// error for a corrupt frame.
    pub fn poll_loudness(&mut self, intake: &SensorIntake) -> nb::Result<f32, SensorError> {
        let now = self.clock.now();
        let idx = Channel::Microphone.index();
        if !self.throttles[idx].try_commit(now) {
            return Err(nb::Error::WouldBlock);
        }
        let (frame, skipped) = intake
            .take_newest_audio_frame()
            .ok_or(nb::Error::WouldBlock)?;
        self.stats[idx].received += 1 + skipped;
        self.stats[idx].throttled += skipped;
        match decode::microphone::decode(&frame) {
            Ok(reading) => {
                self.snapshot.mark_live(Channel::Microphone);
                self.snapshot.apply_loudness(&reading, now);
                self.stats[idx].committed += 1;
                Ok(reading.dbfs)
            }
            Err(err) => {
                self.stats[idx].malformed += 1;
                Err(nb::Error::Other(err))
            }
        }
    }

    /// Latest committed state
    pub const fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    /// Intake accounting for one channel
    pub const fn stats(&self, channel: Channel) -> ChannelStats {
        self.stats[channel.index()]
    }

    /// Transient fix failures seen this session
    pub const fn fix_faults(&self) -> u32 {
        self.fix_faults
    }

    /// Most recent transient fix failure, if any
    pub const fn last_fix_fault(&self) -> Option<FixFault> {
        self.last_fix_fault
    }

    /// The hub's time source
    pub const fn clock(&self) -> &T {
        &self.clock
    }

    /// Mutable time source access, for test clocks
    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }

    /// Clear peak accumulators without touching current values
    pub fn reset_peaks(&mut self) {
        self.snapshot.reset_peaks();
    }

    /// Return to session-start state: default snapshot, zeroed counters,
    /// open throttles
    pub fn reset(&mut self) {
        self.snapshot = SensorSnapshot::new();
        self.altitude_ring = AltitudeRing::new();
        for throttle in self.throttles.iter_mut() {
            *throttle = Throttle::new(throttle.interval_ms());
        }
        self.climb_gate = Throttle::new(self.climb_gate.interval_ms());
        self.vibration_gate = Throttle::new(self.vibration_gate.interval_ms());
        self.stats = [ChannelStats::default(); Channel::COUNT];
        self.fix_faults = 0;
        self.last_fix_fault = None;
    }

    fn drain_location(&mut self, intake: &SensorIntake, now: Timestamp) -> usize {
        let idx = Channel::Location.index();
        let mut drained = 0;

        while let Some(fix) = intake.pop_fix() {
            drained += 1;
            self.stats[idx].received += 1;
            match decode::location::decode(&fix) {
                Ok(reading) => {
                    self.snapshot.mark_live(Channel::Location);
                    // Climb rate differences fix timestamps, not wall time,
                    // on its own slower cadence
                    if self.climb_gate.try_commit(now) {
                        if let Some(rate) =
                            self.altitude_ring.update(reading.altitude_m, reading.timestamp)
                        {
                            self.snapshot.apply_vertical_speed(rate);
                        }
                    }
                    if self.throttles[idx].try_commit(now) {
                        self.snapshot.apply_location(&reading, now);
                        self.stats[idx].committed += 1;
                    } else {
                        self.stats[idx].throttled += 1;
                    }
                }
                Err(err) => {
                    self.stats[idx].malformed += 1;
                    log_warn!("location event rejected: {}", err);
                }
            }
        }

        while let Some(fault) = intake.pop_fix_fault() {
            drained += 1;
            self.fix_faults += 1;
            self.last_fix_fault = Some(fault);
            log_warn!("transient fix failure: {}", fault);
        }

        drained
    }

    fn drain_motion(&mut self, intake: &SensorIntake, now: Timestamp) -> usize {
        let idx = Channel::Motion.index();
        let mut drained = 0;
        while let Some(sample) = intake.pop_motion() {
            drained += 1;
            self.stats[idx].received += 1;
            match decode::motion::decode(&sample) {
                Ok(reading) => {
                    self.snapshot.mark_live(Channel::Motion);
                    // Peak must see every sample, throttled or not
                    self.snapshot.observe_peak_g(reading.g_force);
                    if let Some(vibration) = reading.vibration_m_per_s2 {
                        if self.vibration_gate.try_commit(now) {
                            self.snapshot.apply_vibration(vibration);
                        }
                    }
                    if self.throttles[idx].try_commit(now) {
                        self.snapshot.apply_motion(&reading, now);
                        self.stats[idx].committed += 1;
                    } else {
                        self.stats[idx].throttled += 1;
                    }
                }
                Err(err) => {
                    self.stats[idx].malformed += 1;
                    log_warn!("motion event rejected: {}", err);
                }
            }
        }
        drained
    }

    fn drain_orientation(&mut self, intake: &SensorIntake, now: Timestamp) -> usize {
        let idx = Channel::Orientation.index();
        let mut drained = 0;
        while let Some(sample) = intake.pop_orientation() {
            drained += 1;
            self.stats[idx].received += 1;
            match decode::orientation::decode(&sample) {
                Ok(reading) => {
                    self.snapshot.mark_live(Channel::Orientation);
                    if self.throttles[idx].try_commit(now) {
                        self.snapshot.apply_orientation(&reading, now);
                        self.stats[idx].committed += 1;
                    } else {
                        self.stats[idx].throttled += 1;
                    }
                }
                Err(err) => {
                    self.stats[idx].malformed += 1;
                    log_warn!("orientation event rejected: {}", err);
                }
            }
        }
        drained
    }

    fn drain_magnetometer(&mut self, intake: &SensorIntake, now: Timestamp) -> usize {
        let idx = Channel::Magnetometer.index();
        let mut drained = 0;
        while let Some(sample) = intake.pop_magnetic() {
            drained += 1;
            self.stats[idx].received += 1;
            match decode::environment::decode_magnetic(&sample) {
                Ok(reading) => {
                    self.snapshot.mark_live(Channel::Magnetometer);
                    if self.throttles[idx].try_commit(now) {
                        self.snapshot.apply_magnetic(&reading, now);
                        self.stats[idx].committed += 1;
                    } else {
                        self.stats[idx].throttled += 1;
                    }
                }
                Err(err) => {
                    self.stats[idx].malformed += 1;
                    log_warn!("magnetometer event rejected: {}", err);
                }
            }
        }
        drained
    }

    fn drain_barometer(&mut self, intake: &SensorIntake, now: Timestamp) -> usize {
        let idx = Channel::Barometer.index();
        let mut drained = 0;
        while let Some(sample) = intake.pop_pressure() {
            drained += 1;
            self.stats[idx].received += 1;
            match decode::environment::decode_pressure(&sample) {
                Ok(reading) => {
                    self.snapshot.mark_live(Channel::Barometer);
                    if self.throttles[idx].try_commit(now) {
                        self.snapshot.apply_pressure(&reading, now);
                        self.stats[idx].committed += 1;
                    } else {
                        self.stats[idx].throttled += 1;
                    }
                }
                Err(err) => {
                    self.stats[idx].malformed += 1;
                    log_warn!("pressure event rejected: {}", err);
                }
            }
        }
        drained
    }

    fn drain_ambient_light(&mut self, intake: &SensorIntake, now: Timestamp) -> usize {
        let idx = Channel::AmbientLight.index();
        let mut drained = 0;
        while let Some(sample) = intake.pop_illuminance() {
            drained += 1;
            self.stats[idx].received += 1;
            match decode::environment::decode_light(&sample) {
                Ok(reading) => {
                    self.snapshot.mark_live(Channel::AmbientLight);
                    if self.throttles[idx].try_commit(now) {
                        self.snapshot.apply_illuminance(&reading, now);
                        self.stats[idx].committed += 1;
                    } else {
                        self.stats[idx].throttled += 1;
                    }
                }
                Err(err) => {
                    self.stats[idx].malformed += 1;
                    log_warn!("illuminance event rejected: {}", err);
                }
            }
        }
        drained
    }

    fn tick_microphone(&mut self, intake: &SensorIntake) -> usize {
        let before = self.stats[Channel::Microphone.index()].received;
        match self.poll_loudness(intake) {
            Ok(_) | Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(err)) => {
                log_warn!("audio frame rejected: {}", err);
            }
        }
        (self.stats[Channel::Microphone.index()].received - before) as usize
    }

    fn drain_temperature(&mut self, intake: &SensorIntake) -> usize {
        let mut drained = 0;
        while let Some(sample) = intake.pop_temperature() {
            drained += 1;
            if sample.celsius.is_finite() {
                self.snapshot.apply_ambient_temperature(sample);
            } else {
                log_warn!("non-finite ambient temperature dropped");
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AudioFrame, RawFix, RawMotion, RawPressure};
    use crate::time::MockTimeSource;

    fn fix_at(altitude_m: f32, timestamp: Timestamp) -> RawFix {
        RawFix {
            latitude_deg: 47.26,
            longitude_deg: 11.34,
            altitude_m: Some(altitude_m),
            horizontal_accuracy_m: Some(5.0),
            speed_m_per_s: Some(40.0),
            course_deg: Some(90.0),
            timestamp,
        }
    }

    fn motion_g(g: f32, timestamp: Timestamp) -> RawMotion {
        RawMotion {
            acceleration_incl_gravity: Some([0.0, 0.0, g * 9.81]),
            linear_acceleration: None,
            timestamp,
        }
    }

    #[test]
    fn empty_intake_is_a_no_op() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));
        assert_eq!(hub.process(&intake), 0);
        assert!(hub.snapshot().availability().is_empty());
    }

    #[test]
    fn peak_survives_throttling() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));

        // Both arrive inside one throttle window; only the first commits
        intake.push_motion(motion_g(1.0, 990));
        intake.push_motion(motion_g(4.0, 995));
        assert_eq!(hub.process(&intake), 2);

        let stats = hub.stats(Channel::Motion);
        assert_eq!(stats.received, 2);
        assert_eq!(stats.committed, 1);
        assert_eq!(stats.throttled, 1);

        // Committed value is the first sample, peak saw the spike
        assert!((hub.snapshot().motion().g_force - 1.0).abs() < 1e-3);
        assert!((hub.snapshot().motion().peak.get() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn malformed_events_leave_no_trace_in_state() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));

        intake.push_pressure(RawPressure {
            hpa: f32::NAN,
            timestamp: 990,
        });
        hub.process(&intake);

        assert_eq!(hub.stats(Channel::Barometer).malformed, 1);
        assert_eq!(hub.stats(Channel::Barometer).committed, 0);
        assert!(!hub.snapshot().is_available(Channel::Barometer));
        assert_eq!(hub.snapshot().barometer().hpa, 1013.25);
    }

    #[test]
    fn fix_fault_does_not_clear_last_fix() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));

        intake.push_fix(fix_at(520.0, 990));
        hub.process(&intake);
        assert!(hub.snapshot().is_available(Channel::Location));

        intake.push_fix_fault(FixFault::Timeout);
        hub.process(&intake);

        assert_eq!(hub.fix_faults(), 1);
        assert_eq!(hub.last_fix_fault(), Some(FixFault::Timeout));
        assert!(hub.snapshot().is_available(Channel::Location));
        assert!((hub.snapshot().location().altitude_m - 520.0).abs() < 1e-3);
    }

    #[test]
    fn microphone_tick_blocks_then_commits() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));

        // Gate opens on first poll but the ring is empty
        assert_eq!(hub.poll_loudness(&intake), Err(nb::Error::WouldBlock));

        // Frame arrives, gate still closed from the empty tick
        intake.push_audio_frame(AudioFrame::uniform(1.0, 1001));
        assert_eq!(hub.poll_loudness(&intake), Err(nb::Error::WouldBlock));

        hub.clock_mut().advance(300);
        let dbfs = hub.poll_loudness(&intake).unwrap();
        assert!(dbfs.abs() < 0.1);
        assert!(hub.snapshot().is_available(Channel::Microphone));
    }

    #[test]
    fn newest_frame_wins_and_skips_count_as_throttled() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));

        for i in 0..5 {
            intake.push_audio_frame(AudioFrame::uniform(0.5, 1000 + i));
        }
        hub.process(&intake);

        let stats = hub.stats(Channel::Microphone);
        assert_eq!(stats.received, 5);
        assert_eq!(stats.committed, 1);
        assert_eq!(stats.throttled, 4);
    }

    #[test]
    fn builder_interval_override_takes_effect() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::<MockTimeSource>::builder()
            .interval_ms(Channel::Barometer, 50)
            .build(MockTimeSource::new(1000));

        intake.push_pressure(RawPressure { hpa: 1000.0, timestamp: 990 });
        hub.process(&intake);
        hub.clock_mut().advance(60);
        intake.push_pressure(RawPressure { hpa: 1001.0, timestamp: 1050 });
        hub.process(&intake);

        assert_eq!(hub.stats(Channel::Barometer).committed, 2);
        assert!((hub.snapshot().barometer().hpa - 1001.0).abs() < 1e-3);
    }

    #[test]
    fn temperature_feed_reaches_snapshot() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));

        intake.push_temperature(crate::events::AmbientTemperature {
            celsius: 12.5,
            simulated: true,
            timestamp: 990,
        });
        hub.process(&intake);

        let temp = hub.snapshot().ambient_temperature().unwrap();
        assert!((temp.celsius - 12.5).abs() < 1e-3);
        assert!(temp.simulated);
    }

    #[test]
    fn reset_returns_to_session_start() {
        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(1000));

        intake.push_motion(motion_g(3.0, 990));
        intake.push_fix_fault(FixFault::Unavailable);
        hub.process(&intake);
        assert!(hub.snapshot().is_available(Channel::Motion));

        hub.reset();

        assert!(hub.snapshot().availability().is_empty());
        assert_eq!(hub.stats(Channel::Motion), ChannelStats::default());
        assert_eq!(hub.fix_faults(), 0);
        assert_eq!(hub.snapshot().motion().peak.get(), 0.0);

        // Throttles reopened: a fresh event commits immediately
        intake.push_motion(motion_g(1.0, 1010));
        hub.process(&intake);
        assert_eq!(hub.stats(Channel::Motion).committed, 1);
    }
}
