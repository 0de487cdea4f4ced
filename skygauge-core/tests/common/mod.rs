//! Shared fixtures for the integration suite
//!
//! Event builders with sensible defaults, a hub on a mock clock, and a
//! deterministic flight-profile generator so scenario tests read as
//! flight phases instead of struct literals.

#![allow(dead_code)]

use skygauge_core::events::{
    AudioFrame, RawFix, RawIlluminance, RawMotion, RawOrientation, RawPressure, RawVector,
};
use skygauge_core::time::{MockTimeSource, Timestamp};
use skygauge_core::{SensorHub, SensorIntake};

/// Mock clock origin for every scenario
pub const START_MS: Timestamp = 1_000;

/// Hub on a mock clock at [`START_MS`] with default cadences
pub fn hub() -> SensorHub<MockTimeSource> {
    SensorHub::new(MockTimeSource::new(START_MS))
}

/// Fix with the fields scenarios usually vary; the rest stays plausible
pub fn fix(altitude_m: f32, speed_m_per_s: f32, course_deg: Option<f32>, timestamp: Timestamp) -> RawFix {
    RawFix {
        latitude_deg: 47.26,
        longitude_deg: 11.34,
        altitude_m: Some(altitude_m),
        horizontal_accuracy_m: Some(5.0),
        speed_m_per_s: Some(speed_m_per_s),
        course_deg,
        timestamp,
    }
}

/// Motion sample reading `g` on the vertical axis
pub fn motion_g(g: f32, timestamp: Timestamp) -> RawMotion {
    RawMotion {
        acceleration_incl_gravity: Some([0.0, 0.0, g * 9.81]),
        linear_acceleration: None,
        timestamp,
    }
}

/// Motion sample carrying a gravity-excluded vibration vector
pub fn motion_vibrating(vibration: [f32; 3], timestamp: Timestamp) -> RawMotion {
    RawMotion {
        acceleration_incl_gravity: Some([vibration[0], vibration[1], vibration[2] + 9.81]),
        linear_acceleration: Some(vibration),
        timestamp,
    }
}

pub fn orientation(compass_heading_deg: f32, timestamp: Timestamp) -> RawOrientation {
    RawOrientation {
        compass_heading_deg: Some(compass_heading_deg),
        rotation_deg: None,
        timestamp,
    }
}

pub fn magnetic(x_ut: f32, y_ut: f32, z_ut: f32, timestamp: Timestamp) -> RawVector {
    RawVector {
        x_ut,
        y_ut,
        z_ut,
        timestamp,
    }
}

pub fn pressure(hpa: f32, timestamp: Timestamp) -> RawPressure {
    RawPressure { hpa, timestamp }
}

pub fn light(lux: f32, timestamp: Timestamp) -> RawIlluminance {
    RawIlluminance { lux, timestamp }
}

/// Deterministic climb profile pushing every channel each 100 ms tick
///
/// Fixes arrive once a second like a real GPS; everything else comes at
/// tick rate so the throttle counters move. Noise comes from a tiny LCG,
/// so runs are reproducible.
pub struct FlightEvents {
    seed: u32,
    pub altitude_m: f32,
    pub speed_m_per_s: f32,
    pub heading_deg: f32,
    next_fix_at: Timestamp,
}

impl FlightEvents {
    pub fn new(altitude_m: f32) -> Self {
        Self {
            seed: 42,
            altitude_m,
            speed_m_per_s: 50.0,
            heading_deg: 80.0,
            next_fix_at: 0,
        }
    }

    fn noise(&mut self, amplitude: f32) -> f32 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        let uniform = (self.seed as f32) / (u32::MAX as f32);
        (uniform - 0.5) * 2.0 * amplitude
    }

    /// Advance 100 ms of a steady 5 m/s climb and push this tick's events
    pub fn tick(&mut self, intake: &SensorIntake, now: Timestamp) {
        self.altitude_m += 0.5;
        self.heading_deg = (self.heading_deg + 0.1) % 360.0;

        if now >= self.next_fix_at {
            self.next_fix_at = now + 1000;
            intake.push_fix(fix(
                self.altitude_m,
                self.speed_m_per_s,
                Some(self.heading_deg),
                now,
            ));
        }

        let buzz = self.noise(0.8);
        intake.push_motion(motion_vibrating([buzz, buzz * 0.5, buzz * 0.25], now));
        intake.push_orientation(orientation(
            (self.heading_deg + self.noise(1.0)).rem_euclid(360.0),
            now,
        ));
        let heading_rad = self.heading_deg.to_radians();
        intake.push_magnetic(magnetic(
            21.0 * heading_rad.cos(),
            21.0 * heading_rad.sin(),
            -43.5,
            now,
        ));
        intake.push_pressure(pressure(
            skygauge_core::metrics::pressure_from_altitude(self.altitude_m),
            now,
        ));
        intake.push_illuminance(light(12_000.0 + self.noise(300.0), now));
        intake.push_audio_frame(AudioFrame::uniform(0.2 + self.noise(0.05), now));
    }
}
