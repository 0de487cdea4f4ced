//! Orientation sample decoding
//!
//! Two heading conventions are normalized into one value in [0, 360):
//! a device-native compass heading wins when present; otherwise the
//! rotation angle about the screen axis is inverted
//! (heading = 360 - rotation). An event carrying neither form is
//! malformed, which leaves the channel unavailable and the displayed
//! heading at its default.

use crate::errors::{SensorError, SensorResult};
use crate::events::RawOrientation;
use crate::metrics::wrap_degrees;
use crate::time::Timestamp;

/// Validated heading reading (magnetic reference)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrientationReading {
    /// Heading in degrees clockwise from magnetic north, [0, 360)
    pub heading_deg: f32,
    /// Sample time in milliseconds
    pub timestamp: Timestamp,
}

/// Decode one raw orientation sample
pub fn decode(sample: &RawOrientation) -> SensorResult<OrientationReading> {
    let heading_deg = match (sample.compass_heading_deg, sample.rotation_deg) {
        (Some(compass), _) => {
            if !compass.is_finite() {
                return Err(SensorError::malformed("compass heading not finite"));
            }
            wrap_degrees(compass)
        }
        (None, Some(rotation)) => {
            if !rotation.is_finite() {
                return Err(SensorError::malformed("rotation angle not finite"));
            }
            wrap_degrees(360.0 - rotation)
        }
        (None, None) => return Err(SensorError::malformed("no heading reference")),
    };

    Ok(OrientationReading {
        heading_deg,
        timestamp: sample.timestamp,
    })
}
