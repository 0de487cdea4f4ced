//! Sensor acquisition core for SkyGauge
//!
//! Continuously ingests device sensor streams (location, inertial motion,
//! orientation, magnetometer, barometer, ambient light, microphone),
//! normalizes units and arrival rates, and derives flight-style metrics
//! (climb rate, air density, true heading, peak G, density altitude,
//! true airspeed, Mach) for display.
//!
//! Key constraints:
//! - Platform callbacks never block and never touch shared state directly
//! - One aggregating task owns the snapshot; producers only push raw events
//! - Per-channel throttling decouples hardware rate from the display budget
//!
//! ```no_run
//! use skygauge_core::{SensorHub, SensorIntake};
//! use skygauge_core::events::RawPressure;
//! use skygauge_core::time::SystemClock;
//!
//! static INTAKE: SensorIntake = SensorIntake::new();
//!
//! let mut hub = SensorHub::new(SystemClock);
//!
//! // Platform callback side: push and return, nothing else.
//! INTAKE.push_pressure(RawPressure { hpa: 1009.8, timestamp: 0 });
//!
//! // Aggregator side: drain, decode, throttle, commit.
//! hub.process(&INTAKE);
//! let snapshot = hub.snapshot();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod channel;
pub mod constants;
pub mod decode;
pub mod errors;
pub mod events;
pub mod hub;
pub mod intake;
pub mod metrics;
pub mod queue;
pub mod session;
pub mod snapshot;
pub mod throttle;
pub mod time;

// Public API
pub use channel::{Channel, ChannelSet};
pub use errors::{SensorError, SensorResult, SessionError};
pub use hub::{ChannelStats, SensorHub, SensorHubBuilder};
pub use intake::SensorIntake;
pub use metrics::{CompassPoint, DerivedMetrics, HeadingSource};
pub use session::{
    PermissionGate, PermissionGroup, PermissionState, Session, Subscription, WatchOptions,
};
pub use snapshot::{PressureSource, SensorSnapshot};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
