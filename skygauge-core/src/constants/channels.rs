//! Channel Constants for SkyGauge
//!
//! Throttle intervals, intake capacities, and plausibility bounds applied
//! at the decode boundary. Bounds reject clearly corrupt events; they are
//! deliberately wide so airborne use never trips them.

// ===== COMMIT INTERVALS =====

/// Default commit interval for fast primary values (ms).
///
/// Raw callbacks arrive at 10-60 Hz; committing at ~3 Hz keeps the display
/// responsive without burning the update budget.
pub const FAST_COMMIT_INTERVAL_MS: u64 = 300;

/// Default commit interval for noisy derived values (ms).
///
/// Climb rate and vibration need a longer baseline to read stably.
pub const SLOW_COMMIT_INTERVAL_MS: u64 = 1000;

/// Microphone sampling tick (ms).
///
/// The microphone is polled on a fixed tick over a rolling frame ring, not
/// per hardware callback, so this bounds its effective update rate.
pub const MIC_TICK_INTERVAL_MS: u64 = 300;

// ===== INTAKE CAPACITIES =====

/// Per-channel raw event queue capacity (events). Must be a power of two.
///
/// Sized for a 60 Hz producer against an aggregator pumped at 4 Hz or
/// faster, with headroom for scheduling jitter.
pub const RAW_QUEUE_CAPACITY: usize = 32;

/// Rolling audio frame ring capacity (frames). Must be a power of two.
///
/// Only the newest frame is sampled each tick; older frames are dropped
/// by design, so a small ring suffices.
pub const AUDIO_RING_CAPACITY: usize = 8;

/// Frequency-domain bins carried per audio frame.
///
/// Matches a small analyser FFT (64-point) which is plenty for a single
/// loudness figure.
pub const AUDIO_BIN_COUNT: usize = 32;

// ===== LOCATION =====

/// Default per-fix timeout handed to the platform watcher (ms).
pub const FIX_TIMEOUT_MS: u64 = 10_000;

/// Default maximum acceptable fix age (ms). Zero means cached fixes are
/// never served.
pub const MAX_FIX_AGE_MS: u64 = 0;

/// Minimum ground speed for course-over-ground to be meaningful (km/h).
///
/// Below walking pace GPS course is dominated by position noise, so the
/// magnetic heading is displayed instead.
pub const GPS_HEADING_MIN_SPEED_KMH: f32 = 3.0;

// ===== PLAUSIBILITY BOUNDS =====

/// Lowest plausible static pressure (hPa).
///
/// Roughly the ISA value at 10 km, beyond typical unpressurized use.
/// Below this indicates a corrupt reading, not weather.
///
/// Source: ISA table, 10 km = 264.4 hPa
pub const PRESSURE_MIN_HPA: f32 = 260.0;

/// Highest plausible static pressure (hPa).
///
/// Above the strongest recorded surface highs.
///
/// Source: WMO records (Agata, Siberia: 1083.8 hPa)
pub const PRESSURE_MAX_HPA: f32 = 1100.0;

/// Maximum plausible acceleration magnitude (m/s²).
///
/// Consumer IMUs saturate at +/-16 g. Values beyond that range are
/// sensor faults.
pub const ACCEL_MAX_M_PER_S2: f32 = 16.0 * 9.81;

/// Maximum plausible magnetic field magnitude (µT).
///
/// Earth's field tops out near 65 µT; handset magnetometers clip around
/// 4900 µT next to a magnet.
///
/// Source: AK09918 datasheet measurement range
pub const MAG_FIELD_MAX_UT: f32 = 4900.0;

/// Maximum plausible illuminance (lux).
///
/// Direct sunlight reaches ~120 klx.
///
/// Source: CIE illuminance tables
pub const ILLUMINANCE_MAX_LUX: f32 = 130_000.0;

// ===== MICROPHONE =====

/// Loudness floor (dBFS) reported for silence.
///
/// Keeps the logarithmic scale finite when the frame RMS is zero.
pub const LOUDNESS_FLOOR_DBFS: f32 = -100.0;
