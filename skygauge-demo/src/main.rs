//! SkyGauge Demo Driver
//!
//! Runs the full acquisition path against simulated hardware: starts a
//! session, resolves permissions, attaches one simulated stream per
//! channel, then pushes a synthetic takeoff-and-climb profile through
//! the intake while the hub drains it on a fixed period. Once a second
//! the current snapshot and its derived metrics go to the console.
//!
//! ```bash
//! RUST_LOG=info cargo run -p skygauge-demo
//! ```

use std::thread;
use std::time::Duration;

use log::{info, warn};

use skygauge_core::time::{SystemClock, TimeSource};
use skygauge_core::{Channel, PermissionGroup, SensorHub, SensorIntake, Session, WatchOptions};
use skygauge_demo::{FlightSimulator, SimulatedSubscription, StreamHandle, TemperatureSimulator};

static INTAKE: SensorIntake = SensorIntake::new();

const TICK_MS: u64 = 100;
const RUN_TICKS: u64 = 900;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let clock = SystemClock;
    let start = clock.now();

    let mut session = Session::new(SensorHub::new(SystemClock), false);
    session.request_permissions();
    // The simulated user says yes to the microphone prompt
    session.resolve_permission(PermissionGroup::Microphone, true);

    let mut handles: Vec<StreamHandle> = Vec::new();
    for channel in Channel::ALL {
        let stream = SimulatedSubscription::new(channel);
        handles.push(stream.handle());
        if let Err(err) = session.attach(Box::new(stream)) {
            warn!("could not attach {channel}: {err}");
        }
    }
    info!("session started with {} streams", session.subscription_count());

    let options = WatchOptions::default();
    let mut flight = FlightSimulator::new(options, 7);
    let mut thermometer = TemperatureSimulator::new(11.0, 11);

    for tick in 0..RUN_TICKS {
        let now = clock.now();
        flight.tick(&INTAKE, TICK_MS, now);
        if tick % 50 == 0 {
            INTAKE.push_temperature(thermometer.sample(now));
        }

        session.process(&INTAKE);

        if tick % 10 == 0 {
            print_readout(&session, now.saturating_sub(start));
        }
        thread::sleep(Duration::from_millis(TICK_MS));
    }

    print_stats(&session);
    session.end();

    let stopped = handles
        .iter()
        .filter(|h| !h.load(std::sync::atomic::Ordering::Acquire))
        .count();
    info!("session ended, {stopped}/{} streams stopped", handles.len());
}

fn print_readout(session: &Session<SystemClock>, elapsed_ms: u64) {
    let snapshot = session.snapshot();
    let derived = snapshot.derived();
    let location = snapshot.location();
    let motion = snapshot.motion();

    let climb = location
        .vertical_speed_m_per_s
        .map(|v| format!("{v:+.1}"))
        .unwrap_or_else(|| "--".into());
    let density_alt = derived
        .density_altitude_ft
        .map(|ft| format!("{ft:.0} ft"))
        .unwrap_or_else(|| "--".into());
    let gps_note = if fix_is_stale(session) { " [no fix]" } else { "" };

    info!(
        "t+{:>5.1}s alt {:>6.1} m climb {} m/s spd {:>5.1} m/s hdg {:>5.1}° {} ({}) \
         g {:.2} (peak {:.2}) p {:.1} hPa ({:?}) DA {} {:.1} dBFS {:.0} lx{}",
        elapsed_ms as f32 / 1000.0,
        location.altitude_m,
        climb,
        location.ground_speed_m_per_s,
        derived.heading_deg,
        derived.compass_point,
        derived.heading_source.name(),
        motion.g_force,
        motion.peak.get(),
        derived.pressure_hpa,
        derived.pressure_source,
        density_alt,
        snapshot.microphone().dbfs,
        snapshot.ambient_light().lux,
        gps_note,
    );
}

fn fix_is_stale(session: &Session<SystemClock>) -> bool {
    match session.snapshot().last_commit(Channel::Location) {
        Some(at) => session.hub().clock().now().saturating_sub(at) > 3000,
        None => true,
    }
}

fn print_stats(session: &Session<SystemClock>) {
    info!("--- channel statistics ---");
    for channel in Channel::ALL {
        let stats = session.hub().stats(channel);
        let queue = INTAKE.queue_stats(channel);
        info!(
            "{:>13}: received {:>4} committed {:>4} throttled {:>4} malformed {:>2} queue-dropped {:>3}",
            channel.name(),
            stats.received,
            stats.committed,
            stats.throttled,
            stats.malformed,
            queue.dropped_count(),
        );
    }
    info!("fix faults: {}", session.hub().fix_faults());
}
