//! Location fix decoding
//!
//! Normalizes a raw platform fix into defined units and defaults: altitude
//! and ground speed default to 0 when the fix omits them, while course and
//! accuracy stay optional because "unknown" means something different from
//! any number. Several platforms report negative speed or course for
//! "unknown"; both decode as absent rather than as an error.

use crate::errors::{SensorError, SensorResult};
use crate::events::RawFix;
use crate::metrics::wrap_degrees;
use crate::time::Timestamp;

/// Validated position reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationReading {
    /// Latitude in decimal degrees
    pub latitude_deg: f64,
    /// Longitude in decimal degrees
    pub longitude_deg: f64,
    /// Altitude in meters; 0 when the fix carried none
    pub altitude_m: f32,
    /// Horizontal accuracy radius in meters, when reported
    pub horizontal_accuracy_m: Option<f32>,
    /// Ground speed in m/s; 0 when absent or unknown
    pub ground_speed_m_per_s: f32,
    /// True-north course over ground in [0, 360), when meaningful
    pub course_deg: Option<f32>,
    /// Fix time in milliseconds
    pub timestamp: Timestamp,
}

/// Decode one raw fix
pub fn decode(fix: &RawFix) -> SensorResult<LocationReading> {
    if !fix.latitude_deg.is_finite() || !(-90.0..=90.0).contains(&fix.latitude_deg) {
        return Err(SensorError::malformed("latitude out of range"));
    }
    if !fix.longitude_deg.is_finite() || !(-180.0..=180.0).contains(&fix.longitude_deg) {
        return Err(SensorError::malformed("longitude out of range"));
    }

    let altitude_m = match fix.altitude_m {
        Some(alt) if alt.is_finite() => alt,
        Some(_) => return Err(SensorError::malformed("altitude not finite")),
        None => 0.0,
    };

    let horizontal_accuracy_m = match fix.horizontal_accuracy_m {
        Some(acc) if acc.is_finite() && acc >= 0.0 => Some(acc),
        Some(_) => return Err(SensorError::malformed("accuracy not usable")),
        None => None,
    };

    let ground_speed_m_per_s = match fix.speed_m_per_s {
        Some(speed) if speed.is_finite() => {
            if speed < 0.0 {
                0.0 // "unknown" sentinel on several platforms
            } else {
                speed
            }
        }
        Some(_) => return Err(SensorError::malformed("speed not finite")),
        None => 0.0,
    };

    let course_deg = match fix.course_deg {
        Some(course) if course.is_finite() => {
            if course < 0.0 {
                None // "unknown" sentinel
            } else {
                Some(wrap_degrees(course))
            }
        }
        Some(_) => return Err(SensorError::malformed("course not finite")),
        None => None,
    };

    Ok(LocationReading {
        latitude_deg: fix.latitude_deg,
        longitude_deg: fix.longitude_deg,
        altitude_m,
        horizontal_accuracy_m,
        ground_speed_m_per_s,
        course_deg,
        timestamp: fix.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix() -> RawFix {
        RawFix {
            latitude_deg: 47.3769,
            longitude_deg: 8.5417,
            altitude_m: Some(408.0),
            horizontal_accuracy_m: Some(5.0),
            speed_m_per_s: Some(12.0),
            course_deg: Some(90.0),
            timestamp: 1000,
        }
    }

    #[test]
    fn full_fix_decodes() {
        let reading = decode(&fix()).unwrap();
        assert_eq!(reading.altitude_m, 408.0);
        assert_eq!(reading.ground_speed_m_per_s, 12.0);
        assert_eq!(reading.course_deg, Some(90.0));
    }

    #[test]
    fn missing_optionals_take_defaults() {
        let raw = RawFix {
            altitude_m: None,
            horizontal_accuracy_m: None,
            speed_m_per_s: None,
            course_deg: None,
            ..fix()
        };
        let reading = decode(&raw).unwrap();
        assert_eq!(reading.altitude_m, 0.0);
        assert_eq!(reading.ground_speed_m_per_s, 0.0);
        assert_eq!(reading.horizontal_accuracy_m, None);
        assert_eq!(reading.course_deg, None);
    }

    #[test]
    fn negative_sentinels_mean_unknown() {
        let raw = RawFix {
            speed_m_per_s: Some(-1.0),
            course_deg: Some(-1.0),
            ..fix()
        };
        let reading = decode(&raw).unwrap();
        assert_eq!(reading.ground_speed_m_per_s, 0.0);
        assert_eq!(reading.course_deg, None);
    }

    #[test]
    fn out_of_range_position_rejected() {
        let raw = RawFix {
            latitude_deg: 91.0,
            ..fix()
        };
        assert!(matches!(
            decode(&raw),
            Err(SensorError::MalformedEvent { .. })
        ));

        let raw = RawFix {
            longitude_deg: -200.0,
            ..fix()
        };
        assert!(decode(&raw).is_err());
    }

    #[test]
    fn non_finite_fields_reject_whole_fix() {
        let raw = RawFix {
            altitude_m: Some(f32::NAN),
            ..fix()
        };
        assert!(decode(&raw).is_err());

        let raw = RawFix {
            speed_m_per_s: Some(f32::INFINITY),
            ..fix()
        };
        assert!(decode(&raw).is_err());
    }

    #[test]
    fn course_wraps_into_circle() {
        let raw = RawFix {
            course_deg: Some(450.0),
            ..fix()
        };
        assert_eq!(decode(&raw).unwrap().course_deg, Some(90.0));
    }
}
