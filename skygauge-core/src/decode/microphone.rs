//! Audio frame decoding
//!
//! Loudness is the RMS of the frame's normalized frequency bins expressed
//! in dBFS (0 dBFS = full scale). Silence maps to the documented floor
//! rather than negative infinity so the scale stays finite.

use libm::{log10f, sqrtf};

use crate::constants::channels::{AUDIO_BIN_COUNT, LOUDNESS_FLOOR_DBFS};
use crate::errors::{SensorError, SensorResult};
use crate::events::AudioFrame;
use crate::time::Timestamp;

/// Validated loudness reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoudnessReading {
    /// Loudness in dB relative to full scale, clamped at the silence floor
    pub dbfs: f32,
    /// Frame time in milliseconds
    pub timestamp: Timestamp,
}

/// Decode one audio frame
pub fn decode(frame: &AudioFrame) -> SensorResult<LoudnessReading> {
    let mut sum_squares = 0.0f32;
    for bin in &frame.bins {
        if !bin.is_finite() || *bin < 0.0 {
            return Err(SensorError::malformed("audio bin not usable"));
        }
        // Bins are nominally normalized; clamp tiny analyser overshoot
        let level = bin.min(1.0);
        sum_squares += level * level;
    }

    let rms = sqrtf(sum_squares / AUDIO_BIN_COUNT as f32);
    let dbfs = if rms > 0.0 {
        (20.0 * log10f(rms)).max(LOUDNESS_FLOOR_DBFS)
    } else {
        LOUDNESS_FLOOR_DBFS
    };

    Ok(LoudnessReading {
        dbfs,
        timestamp: frame.timestamp,
    })
}
