//! Derived Flight Metrics
//!
//! Pure functions from committed sensor state to the quantities a pilot
//! actually reads: pressure altitude, density altitude, true airspeed,
//! Mach number, and a fused heading. Nothing here is stored; the derived
//! view is recomputed from the snapshot on every read, so it can never
//! drift out of sync with its inputs.
//!
//! ## Atmosphere Model
//!
//! Altitude/pressure conversions use the ICAO standard atmosphere below
//! the tropopause. Temperature-dependent outputs (density, density
//! altitude, TAS, Mach) need an outside-air temperature sample and stay
//! `None` until one is fed; substituting ISA temperature silently would
//! hide exactly the deviation these numbers exist to show.

use libm::{floorf, fmodf, powf, sqrtf};

use crate::constants::channels::GPS_HEADING_MIN_SPEED_KMH;
use crate::constants::physics::{
    CELSIUS_TO_KELVIN_OFFSET, DENSITY_ALTITUDE_FT_PER_C, DRY_AIR_GAS_CONSTANT_J_PER_KG_K,
    HPA_TO_PSI, ISA_PRESSURE_ALT_COEFF, ISA_PRESSURE_EXPONENT, ISA_SEA_LEVEL_TEMP_C,
    ISA_TEMP_LAPSE_C_PER_M, M_PER_S_TO_KMH, M_TO_FT, SEA_LEVEL_AIR_DENSITY_KG_M3,
    SEA_LEVEL_PRESSURE_HPA, SPEED_OF_SOUND_0C_M_PER_S, SPEED_OF_SOUND_SLOPE_M_PER_S_C,
};
use crate::snapshot::{PressureSource, SensorSnapshot};

/// Normalize an angle into [0, 360) degrees
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = fmodf(degrees, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // fmodf of a tiny negative can land back on 360.0 after the shift
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Eight-wind compass rose sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompassPoint {
    /// North, 337.5°..22.5°
    North,
    /// Northeast
    NorthEast,
    /// East
    East,
    /// Southeast
    SouthEast,
    /// South
    South,
    /// Southwest
    SouthWest,
    /// West
    West,
    /// Northwest
    NorthWest,
}

impl CompassPoint {
    const ALL: [CompassPoint; 8] = [
        CompassPoint::North,
        CompassPoint::NorthEast,
        CompassPoint::East,
        CompassPoint::SouthEast,
        CompassPoint::South,
        CompassPoint::SouthWest,
        CompassPoint::West,
        CompassPoint::NorthWest,
    ];

    /// Sector containing a heading; boundaries round to the nearer sector
    pub fn from_heading(heading_deg: f32) -> Self {
        let sector = floorf(wrap_degrees(heading_deg) / 45.0 + 0.5) as usize % 8;
        Self::ALL[sector]
    }

    /// Short cardinal label ("N", "NE", ...)
    pub const fn label(&self) -> &'static str {
        match self {
            CompassPoint::North => "N",
            CompassPoint::NorthEast => "NE",
            CompassPoint::East => "E",
            CompassPoint::SouthEast => "SE",
            CompassPoint::South => "S",
            CompassPoint::SouthWest => "SW",
            CompassPoint::West => "W",
            CompassPoint::NorthWest => "NW",
        }
    }
}

impl core::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which sensor won the heading fusion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeadingSource {
    /// GPS course over ground (moving fast enough for it to mean something)
    GpsTrack,
    /// Magnetometer-derived compass heading
    Magnetic,
}

impl HeadingSource {
    /// Static label for logs
    pub const fn name(&self) -> &'static str {
        match self {
            HeadingSource::GpsTrack => "gps-track",
            HeadingSource::Magnetic => "magnetic",
        }
    }
}

/// Pick the heading to display
///
/// GPS course over ground wins when the device is moving faster than the
/// walking-pace gate and the fix actually carried a course. Below that
/// speed the course is numerical noise, so the magnetic heading holds.
pub fn fuse_heading(
    ground_speed_m_per_s: f32,
    course_deg: Option<f32>,
    magnetic_deg: f32,
) -> (f32, HeadingSource) {
    match course_deg {
        Some(course) if ground_speed_m_per_s * M_PER_S_TO_KMH > GPS_HEADING_MIN_SPEED_KMH => {
            (course, HeadingSource::GpsTrack)
        }
        _ => (magnetic_deg, HeadingSource::Magnetic),
    }
}

/// Convert hPa to pounds per square inch
pub fn hpa_to_psi(hpa: f32) -> f32 {
    hpa * HPA_TO_PSI
}

/// ISA static pressure at a geometric altitude
///
/// P(h) = P0 * (1 - L*h)^n, valid below the tropopause. The base term is
/// clamped at zero so absurd altitudes return 0 hPa instead of NaN.
pub fn pressure_from_altitude(altitude_m: f32) -> f32 {
    let base = 1.0 - ISA_PRESSURE_ALT_COEFF * altitude_m;
    if base <= 0.0 {
        return 0.0;
    }
    SEA_LEVEL_PRESSURE_HPA * powf(base, ISA_PRESSURE_EXPONENT)
}

/// Pressure altitude: the ISA altitude at which this pressure occurs
pub fn altitude_from_pressure(hpa: f32) -> f32 {
    let ratio = hpa / SEA_LEVEL_PRESSURE_HPA;
    (1.0 - powf(ratio, 1.0 / ISA_PRESSURE_EXPONENT)) / ISA_PRESSURE_ALT_COEFF
}

/// Dry-air density from the ideal gas law, kg/m³
pub fn air_density(pressure_hpa: f32, temperature_c: f32) -> f32 {
    let pascals = pressure_hpa * 100.0;
    pascals / (DRY_AIR_GAS_CONSTANT_J_PER_KG_K * (temperature_c + CELSIUS_TO_KELVIN_OFFSET))
}

/// Density altitude in feet
///
/// Pressure altitude corrected for the spread between outside-air
/// temperature and ISA temperature at that pressure altitude. Source:
/// FAA Pilot's Handbook of Aeronautical Knowledge, Ch. 4.
pub fn density_altitude_ft(pressure_altitude_m: f32, temperature_c: f32) -> f32 {
    let pressure_altitude_ft = pressure_altitude_m * M_TO_FT;
    let isa_temp_c = ISA_SEA_LEVEL_TEMP_C - ISA_TEMP_LAPSE_C_PER_M * pressure_altitude_m;
    pressure_altitude_ft + DENSITY_ALTITUDE_FT_PER_C * (temperature_c - isa_temp_c)
}

/// True airspeed from ground speed and local air density, m/s
///
/// Treats ground speed as equivalent airspeed (zero-wind assumption) and
/// scales by the density ratio.
pub fn true_airspeed(ground_speed_m_per_s: f32, density_kg_m3: f32) -> f32 {
    ground_speed_m_per_s * sqrtf(SEA_LEVEL_AIR_DENSITY_KG_M3 / density_kg_m3)
}

/// Local speed of sound from outside-air temperature, m/s
///
/// Linearized a = a0 + k*T, within 0.1 m/s of the exact formula over the
/// atmospheric range.
pub fn local_speed_of_sound(temperature_c: f32) -> f32 {
    SPEED_OF_SOUND_0C_M_PER_S + SPEED_OF_SOUND_SLOPE_M_PER_S_C * temperature_c
}

/// Mach number of the ground speed at local conditions
pub fn mach_number(ground_speed_m_per_s: f32, temperature_c: f32) -> f32 {
    ground_speed_m_per_s / local_speed_of_sound(temperature_c)
}

/// Everything computable from the snapshot, recomputed per read
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedMetrics {
    /// Resolved static pressure in hPa
    pub pressure_hpa: f32,
    /// Whether the pressure was measured or modeled
    pub pressure_source: PressureSource,
    /// Resolved static pressure in PSI
    pub pressure_psi: f32,
    /// Pressure altitude in meters
    pub pressure_altitude_m: f32,
    /// Air density in kg/m³; needs an outside-air temperature
    pub air_density_kg_m3: Option<f32>,
    /// Density altitude in feet; needs an outside-air temperature
    pub density_altitude_ft: Option<f32>,
    /// True airspeed in m/s; needs an outside-air temperature
    pub true_airspeed_m_per_s: Option<f32>,
    /// Mach number; needs an outside-air temperature
    pub mach: Option<f32>,
    /// Fused display heading in degrees, [0, 360)
    pub heading_deg: f32,
    /// Winner of the heading fusion
    pub heading_source: HeadingSource,
    /// Compass rose sector of the fused heading
    pub compass_point: CompassPoint,
}

impl DerivedMetrics {
    /// Compute the full derived view from current snapshot state
    pub fn compute(snapshot: &SensorSnapshot) -> Self {
        let (pressure_hpa, pressure_source) = snapshot.pressure();
        let pressure_altitude_m = altitude_from_pressure(pressure_hpa);
        let temperature_c = snapshot.ambient_temperature().map(|t| t.celsius);

        let ground_speed = snapshot.location().ground_speed_m_per_s;
        let density = temperature_c.map(|t| air_density(pressure_hpa, t));
        let (heading_deg, heading_source) = fuse_heading(
            ground_speed,
            snapshot.location().course_deg,
            snapshot.orientation().heading_deg,
        );

        Self {
            pressure_hpa,
            pressure_source,
            pressure_psi: hpa_to_psi(pressure_hpa),
            pressure_altitude_m,
            air_density_kg_m3: density,
            density_altitude_ft: temperature_c.map(|t| density_altitude_ft(pressure_altitude_m, t)),
            true_airspeed_m_per_s: density.map(|rho| true_airspeed(ground_speed, rho)),
            mach: temperature_c.map(|t| mach_number(ground_speed, t)),
            heading_deg,
            heading_source,
            compass_point: CompassPoint::from_heading(heading_deg),
        }
    }
}

impl SensorSnapshot {
    /// Resolve the static pressure and where it came from
    ///
    /// Prefers the barometer once it has delivered. Without one, falls back
    /// to the ISA pressure at the last GPS altitude; before any fix that is
    /// the sea-level default, which the source tag makes explicit.
    pub fn pressure(&self) -> (f32, PressureSource) {
        if self.is_available(crate::channel::Channel::Barometer) {
            (self.barometer().hpa, PressureSource::Barometer)
        } else {
            (
                pressure_from_altitude(self.location().altitude_m),
                PressureSource::IsaModel,
            )
        }
    }

    /// Derived flight metrics for the current state
    pub fn derived(&self) -> DerivedMetrics {
        DerivedMetrics::compute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::decode::{LocationReading, PressureReading};
    use crate::events::AmbientTemperature;

    #[test]
    fn wrap_covers_both_directions() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(450.0), 90.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert!((wrap_degrees(725.0) - 5.0).abs() < 1e-4);
        assert_eq!(wrap_degrees(360.0), 0.0);
    }

    #[test]
    fn compass_sectors_round_to_nearest() {
        assert_eq!(CompassPoint::from_heading(0.0), CompassPoint::North);
        assert_eq!(CompassPoint::from_heading(22.4), CompassPoint::North);
        assert_eq!(CompassPoint::from_heading(22.5), CompassPoint::NorthEast);
        assert_eq!(CompassPoint::from_heading(90.0), CompassPoint::East);
        assert_eq!(CompassPoint::from_heading(180.0), CompassPoint::South);
        assert_eq!(CompassPoint::from_heading(270.0), CompassPoint::West);
        assert_eq!(CompassPoint::from_heading(337.5), CompassPoint::North);
        assert_eq!(CompassPoint::from_heading(359.9), CompassPoint::North);
    }

    #[test]
    fn heading_fusion_gates_on_speed_and_presence() {
        // Walking pace: GPS course is noise even when present
        let (h, src) = fuse_heading(0.5, Some(120.0), 200.0);
        assert_eq!(h, 200.0);
        assert_eq!(src, HeadingSource::Magnetic);

        // Fast but courseless fix
        let (h, src) = fuse_heading(30.0, None, 200.0);
        assert_eq!(h, 200.0);
        assert_eq!(src, HeadingSource::Magnetic);

        // Moving with a course
        let (h, src) = fuse_heading(2.0, Some(120.0), 200.0);
        assert_eq!(h, 120.0);
        assert_eq!(src, HeadingSource::GpsTrack);
    }

    #[test]
    fn isa_pressure_round_trips_altitude() {
        assert!((pressure_from_altitude(0.0) - 1013.25).abs() < 0.01);

        // ICAO table value near 1500 m
        let p = pressure_from_altitude(1500.0);
        assert!((p - 845.6).abs() < 0.5);

        let h = altitude_from_pressure(p);
        assert!((h - 1500.0).abs() < 1.0);
    }

    #[test]
    fn extreme_altitude_clamps_instead_of_nan() {
        let p = pressure_from_altitude(50_000.0);
        assert_eq!(p, 0.0);
    }

    #[test]
    fn density_matches_isa_sea_level() {
        let rho = air_density(1013.25, 15.0);
        assert!((rho - 1.225).abs() < 0.001);
    }

    #[test]
    fn density_altitude_hot_day() {
        // Sea-level field, 30 °C: DA = 118.8 * (30 - 15)
        let da = density_altitude_ft(0.0, 30.0);
        assert!((da - 1782.0).abs() < 1.0);
    }

    #[test]
    fn tas_equals_ground_speed_at_sea_level_density() {
        let tas = true_airspeed(50.0, SEA_LEVEL_AIR_DENSITY_KG_M3);
        assert!((tas - 50.0).abs() < 1e-3);

        // Thinner air reads faster
        assert!(true_airspeed(50.0, 0.9) > 50.0);
    }

    #[test]
    fn mach_at_standard_temperature() {
        // a(15 °C) = 340.39 m/s
        let m = mach_number(170.0, 15.0);
        assert!((m - 0.4994).abs() < 0.001);
    }

    #[test]
    fn pressure_resolution_prefers_barometer() {
        let mut snap = SensorSnapshot::new();

        // No channels yet: ISA at default altitude 0
        let (p, src) = snap.pressure();
        assert_eq!(src, PressureSource::IsaModel);
        assert!((p - 1013.25).abs() < 0.01);

        // GPS altitude only: ISA at that altitude
        snap.apply_location(
            &LocationReading {
                latitude_deg: 47.0,
                longitude_deg: 11.0,
                altitude_m: 1500.0,
                horizontal_accuracy_m: None,
                ground_speed_m_per_s: 0.0,
                course_deg: None,
                timestamp: 10,
            },
            10,
        );
        snap.mark_live(Channel::Location);
        let (p, src) = snap.pressure();
        assert_eq!(src, PressureSource::IsaModel);
        assert!((p - 845.6).abs() < 0.5);

        // Barometer wins once live
        snap.apply_pressure(&PressureReading { hpa: 990.0, timestamp: 20 }, 20);
        snap.mark_live(Channel::Barometer);
        let (p, src) = snap.pressure();
        assert_eq!(src, PressureSource::Barometer);
        assert_eq!(p, 990.0);
    }

    #[test]
    fn derived_view_needs_temperature_for_density_family() {
        let mut snap = SensorSnapshot::new();
        let derived = snap.derived();
        assert_eq!(derived.air_density_kg_m3, None);
        assert_eq!(derived.density_altitude_ft, None);
        assert_eq!(derived.true_airspeed_m_per_s, None);
        assert_eq!(derived.mach, None);

        snap.apply_ambient_temperature(AmbientTemperature {
            celsius: 15.0,
            simulated: true,
            timestamp: 5,
        });
        let derived = snap.derived();
        let rho = derived.air_density_kg_m3.unwrap();
        assert!((rho - 1.225).abs() < 0.001);
        assert!(derived.mach.is_some());
    }
}
