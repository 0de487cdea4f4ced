//! Channel Decoders
//!
//! One decoder per channel, each converting a raw platform event into a
//! typed, validated reading or rejecting it with a [`SensorError`]. This is
//! the only place field presence and plausibility are checked; past this
//! boundary every value is a real number in a known unit.
//!
//! Rejection policy: an event with a required field missing, any present
//! float non-finite, or a value outside the documented plausibility bounds
//! is dropped whole. No partial snapshot mutation ever happens from a
//! rejected event.

pub mod environment;
pub mod location;
pub mod microphone;
pub mod motion;
pub mod orientation;

pub use environment::{LightReading, MagneticReading, PressureReading};
pub use location::LocationReading;
pub use microphone::LoudnessReading;
pub use motion::MotionReading;
pub use orientation::OrientationReading;
