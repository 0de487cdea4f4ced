//! Simulated Sensor Sources for SkyGauge
//!
//! Everything here stands in for real device hardware: a flight profile
//! generator that pushes plausible raw events for all seven channels, a
//! slow outside-air temperature walk, and a subscription type whose
//! release flag lets the driver observe session teardown.
//!
//! The simulators only ever touch the public intake surface. They push
//! raw platform-shaped events, dropouts and all, and the core does the
//! decoding, throttling, and deriving exactly as it would for real
//! hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skygauge_core::events::{
    AmbientTemperature, AudioFrame, FixFault, RawFix, RawIlluminance, RawMotion, RawOrientation,
    RawPressure, RawVector,
};
use skygauge_core::metrics::pressure_from_altitude;
use skygauge_core::time::Timestamp;
use skygauge_core::{Channel, SensorIntake, Subscription, WatchOptions};

/// Field elevation the simulated flight departs from, in meters
pub const FIELD_ELEVATION_M: f32 = 570.0;

/// Cruise altitude of the simulated profile, in meters
pub const CRUISE_ALTITUDE_M: f32 = 2400.0;

const ROLL_END_MS: u64 = 15_000;
const CLIMB_RATE_M_PER_S: f32 = 8.0;
const CRUISE_SPEED_M_PER_S: f32 = 160.0;
const ROLL_ACCEL_M_PER_S2: f32 = 5.0;
const GPS_DROPOUT_START_MS: u64 = 40_000;
const GPS_DROPOUT_END_MS: u64 = 52_000;

/// Shared liveness flag for one simulated stream
pub type StreamHandle = Arc<AtomicBool>;

/// A pretend platform sensor stream
///
/// Carries nothing but its channel and a liveness flag. The session
/// releases it on teardown; the driver can watch the handle to confirm
/// every stream was stopped exactly once.
pub struct SimulatedSubscription {
    channel: Channel,
    active: StreamHandle,
}

impl SimulatedSubscription {
    /// New active stream for a channel
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Clone the liveness flag before handing the stream to a session
    pub fn handle(&self) -> StreamHandle {
        self.active.clone()
    }
}

impl Subscription for SimulatedSubscription {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn release(&mut self) {
        if self.active.swap(false, Ordering::AcqRel) {
            log::debug!("simulated {} stream stopped", self.channel);
        }
    }
}

/// Slow random walk around a base outside-air temperature
pub struct TemperatureSimulator {
    rng: StdRng,
    current_c: f32,
}

impl TemperatureSimulator {
    /// Walk starting at a base temperature
    pub fn new(base_c: f32, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            current_c: base_c,
        }
    }

    /// One temperature sample, drifting a few hundredths of a degree
    pub fn sample(&mut self, now: Timestamp) -> AmbientTemperature {
        self.current_c += self.rng.gen_range(-0.05..0.05);
        AmbientTemperature {
            celsius: self.current_c,
            simulated: true,
            timestamp: now,
        }
    }
}

/// Synthetic takeoff-and-climb profile feeding all seven channels
///
/// The profile is deliberately eventful: a ground roll with heavy
/// vibration, a steady climb with a slow turn, a GPS dropout window in
/// cruise that produces a timeout fault, and engine noise that tracks
/// airspeed. Event cadence is faster than the core's commit cadence so
/// the throttle counters visibly move.
pub struct FlightSimulator {
    options: WatchOptions,
    rng: StdRng,
    elapsed_ms: u64,
    altitude_m: f32,
    speed_m_per_s: f32,
    heading_deg: f32,
    weather_offset_hpa: f32,
    next_fix_at_ms: u64,
    last_fix_wall_ms: u64,
    last_fault_wall_ms: u64,
}

impl FlightSimulator {
    /// Simulator honoring the session's location watch options
    pub fn new(options: WatchOptions, seed: u64) -> Self {
        Self {
            options,
            rng: StdRng::seed_from_u64(seed),
            elapsed_ms: 0,
            altitude_m: FIELD_ELEVATION_M,
            speed_m_per_s: 0.0,
            heading_deg: 80.0,
            weather_offset_hpa: 0.0,
            next_fix_at_ms: 0,
            last_fix_wall_ms: 0,
            last_fault_wall_ms: 0,
        }
    }

    /// Simulated altitude right now, for readout comparison
    pub fn altitude_m(&self) -> f32 {
        self.altitude_m
    }

    /// Whether the profile is inside its GPS dropout window
    pub fn in_gps_dropout(&self) -> bool {
        (GPS_DROPOUT_START_MS..GPS_DROPOUT_END_MS).contains(&self.elapsed_ms)
    }

    /// Advance the profile by `dt_ms` and push this tick's raw events
    pub fn tick(&mut self, intake: &SensorIntake, dt_ms: u64, now: Timestamp) {
        self.elapsed_ms += dt_ms;
        let dt_s = dt_ms as f32 / 1000.0;
        self.advance_profile(dt_s);

        self.push_fix(intake, now);
        self.push_motion(intake, now);
        self.push_orientation(intake, now);
        self.push_magnetics(intake, now);
        self.push_pressure(intake, now);
        self.push_light(intake, now);
        self.push_audio(intake, now);
    }

    fn advance_profile(&mut self, dt_s: f32) {
        if self.elapsed_ms < ROLL_END_MS {
            // Ground roll: accelerate, stay on the field
            self.speed_m_per_s =
                (self.speed_m_per_s + ROLL_ACCEL_M_PER_S2 * dt_s).min(CRUISE_SPEED_M_PER_S);
        } else if self.altitude_m < CRUISE_ALTITUDE_M {
            // Climb with a slow right turn
            self.altitude_m += CLIMB_RATE_M_PER_S * dt_s;
            self.speed_m_per_s = (self.speed_m_per_s + 0.6 * dt_s).min(CRUISE_SPEED_M_PER_S);
            self.heading_deg = (self.heading_deg + 0.8 * dt_s) % 360.0;
        } else {
            // Cruise: hold, with light turbulence
            self.altitude_m += self.rng.gen_range(-0.3..0.3);
        }
        self.weather_offset_hpa =
            (self.weather_offset_hpa + self.rng.gen_range(-0.02..0.02)).clamp(-3.0, 3.0);
    }

    fn push_fix(&mut self, intake: &SensorIntake, now: Timestamp) {
        if self.elapsed_ms < self.next_fix_at_ms {
            return;
        }
        self.next_fix_at_ms = self.elapsed_ms + 1000;

        if self.in_gps_dropout() {
            // No fixes arrive; after the watch timeout the platform
            // reports one timeout fault per timed-out request
            let waited = now.saturating_sub(self.last_fix_wall_ms.max(self.last_fault_wall_ms));
            if waited >= self.options.timeout_ms {
                intake.push_fix_fault(FixFault::Timeout);
                self.last_fault_wall_ms = now;
            }
            return;
        }

        let accuracy = if self.options.high_accuracy {
            self.rng.gen_range(3.0..8.0)
        } else {
            self.rng.gen_range(15.0..40.0)
        };
        intake.push_fix(RawFix {
            latitude_deg: 47.26 + self.elapsed_ms as f64 * 1.0e-6,
            longitude_deg: 11.34 + self.elapsed_ms as f64 * 1.4e-6,
            altitude_m: Some(self.altitude_m + self.rng.gen_range(-2.0..2.0)),
            horizontal_accuracy_m: Some(accuracy),
            speed_m_per_s: Some(self.speed_m_per_s),
            course_deg: if self.speed_m_per_s > 1.0 {
                Some(self.heading_deg)
            } else {
                None
            },
            timestamp: now,
        });
        self.last_fix_wall_ms = now;
    }

    fn push_motion(&mut self, intake: &SensorIntake, now: Timestamp) {
        // Runway rumble dominates the roll, light chop elsewhere
        let shake = if self.elapsed_ms < ROLL_END_MS && self.speed_m_per_s > 2.0 {
            2.5
        } else {
            0.4
        };
        let vibration = [
            self.rng.gen_range(-shake..shake),
            self.rng.gen_range(-shake..shake),
            self.rng.gen_range(-shake..shake),
        ];
        // Acceleration along track plus gravity on z
        let forward = if self.elapsed_ms < ROLL_END_MS {
            ROLL_ACCEL_M_PER_S2
        } else {
            0.6
        };
        let gravity = [
            vibration[0] + forward,
            vibration[1],
            vibration[2] + 9.81,
        ];
        intake.push_motion(RawMotion {
            acceleration_incl_gravity: Some(gravity),
            linear_acceleration: Some(vibration),
            timestamp: now,
        });
    }

    fn push_orientation(&mut self, intake: &SensorIntake, now: Timestamp) {
        intake.push_orientation(RawOrientation {
            compass_heading_deg: Some(
                (self.heading_deg + self.rng.gen_range(-1.5..1.5)).rem_euclid(360.0),
            ),
            rotation_deg: None,
            timestamp: now,
        });
    }

    fn push_magnetics(&mut self, intake: &SensorIntake, now: Timestamp) {
        // Central-European field rotated into the device frame
        let heading_rad = self.heading_deg.to_radians();
        intake.push_magnetic(RawVector {
            x_ut: 21.0 * heading_rad.cos() + self.rng.gen_range(-0.4..0.4),
            y_ut: 21.0 * heading_rad.sin() + self.rng.gen_range(-0.4..0.4),
            z_ut: -43.5 + self.rng.gen_range(-0.4..0.4),
            timestamp: now,
        });
    }

    fn push_pressure(&mut self, intake: &SensorIntake, now: Timestamp) {
        let hpa = pressure_from_altitude(self.altitude_m)
            + self.weather_offset_hpa
            + self.rng.gen_range(-0.05..0.05);
        intake.push_pressure(RawPressure {
            hpa,
            timestamp: now,
        });
    }

    fn push_light(&mut self, intake: &SensorIntake, now: Timestamp) {
        // Brightens with altitude as the horizon opens up
        let base = 9000.0 + (self.altitude_m - FIELD_ELEVATION_M) * 6.0;
        intake.push_illuminance(RawIlluminance {
            lux: (base + self.rng.gen_range(-500.0..500.0)).max(0.0),
            timestamp: now,
        });
    }

    fn push_audio(&mut self, intake: &SensorIntake, now: Timestamp) {
        // Engine note scales with airspeed, energy tilted into low bins
        let level = 0.03 + 0.45 * (self.speed_m_per_s / CRUISE_SPEED_M_PER_S);
        let mut frame = AudioFrame::uniform(0.0, now);
        for (i, bin) in frame.bins.iter_mut().enumerate() {
            let rolloff = (-(i as f32) / 12.0).exp();
            *bin = (level * rolloff + self.rng.gen_range(0.0..0.01)).min(1.0);
        }
        intake.push_audio_frame(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_walk_stays_near_base() {
        let mut sim = TemperatureSimulator::new(11.0, 1);
        for i in 0..1000 {
            let sample = sim.sample(i);
            assert!(sample.simulated);
            assert!((sample.celsius - 11.0).abs() < 30.0);
        }
    }

    #[test]
    fn ground_roll_stays_on_field() {
        let intake = SensorIntake::new();
        let mut sim = FlightSimulator::new(WatchOptions::default(), 7);
        for i in 0..100 {
            sim.tick(&intake, 100, i * 100);
        }
        assert!((sim.altitude_m() - FIELD_ELEVATION_M).abs() < 1.0);
    }

    #[test]
    fn climb_phase_gains_altitude() {
        let intake = SensorIntake::new();
        let mut sim = FlightSimulator::new(WatchOptions::default(), 7);
        // 30 s of profile: 15 s roll, 15 s climb at 8 m/s
        for i in 0..300 {
            sim.tick(&intake, 100, i * 100);
        }
        let gained = sim.altitude_m() - FIELD_ELEVATION_M;
        assert!((gained - 120.0).abs() < 5.0, "gained {gained}");
    }

    #[test]
    fn dropout_window_emits_timeout_fault() {
        use skygauge_core::time::MockTimeSource;
        use skygauge_core::SensorHub;

        let intake = SensorIntake::new();
        let mut hub = SensorHub::new(MockTimeSource::new(0));
        let mut sim = FlightSimulator::new(WatchOptions::default(), 7);
        for i in 0..600 {
            let now = i * 100;
            sim.tick(&intake, 100, now);
            hub.clock_mut().set(now);
            hub.process(&intake);
        }
        assert_eq!(hub.fix_faults(), 1);
        assert_eq!(hub.last_fix_fault(), Some(FixFault::Timeout));
    }

    #[test]
    fn release_is_idempotent() {
        let mut sub = SimulatedSubscription::new(Channel::Barometer);
        let handle = sub.handle();
        assert!(handle.load(Ordering::Acquire));
        sub.release();
        sub.release();
        assert!(!handle.load(Ordering::Acquire));
    }
}
