//! Integration tests for the session lifecycle
//!
//! Permission gating, subscription teardown, and state isolation across
//! an acquisition run, all through the public session surface.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use skygauge_core::time::MockTimeSource;
use skygauge_core::{
    Channel, PermissionGroup, PermissionState, SensorError, SensorHub, SensorIntake, Session,
    SessionError, Subscription,
};

use common::{motion_g, pressure, FlightEvents, START_MS};

struct CountingStream {
    channel: Channel,
    releases: Rc<Cell<u32>>,
}

impl CountingStream {
    fn new(channel: Channel) -> (Box<Self>, Rc<Cell<u32>>) {
        let releases = Rc::new(Cell::new(0));
        (
            Box::new(Self {
                channel,
                releases: releases.clone(),
            }),
            releases,
        )
    }
}

impl Subscription for CountingStream {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

fn session_with_gesture_gate() -> Session<MockTimeSource> {
    Session::new(SensorHub::new(MockTimeSource::new(START_MS)), true)
}

#[test]
fn gesture_host_walks_through_the_permission_flow() {
    let mut session = session_with_gesture_gate();
    session.request_permissions();

    // Before the user answers, inertial streams cannot attach
    let (stream, releases) = CountingStream::new(Channel::Motion);
    assert_eq!(
        session.attach(stream).unwrap_err(),
        SessionError::PermissionPending(PermissionGroup::MotionOrientation)
    );
    assert_eq!(releases.get(), 1);

    session.resolve_permission(PermissionGroup::MotionOrientation, true);
    assert_eq!(
        session.permission(PermissionGroup::MotionOrientation),
        PermissionState::Granted
    );

    let (stream, _) = CountingStream::new(Channel::Motion);
    assert!(session.attach(stream).is_ok());

    let (stream, _) = CountingStream::new(Channel::Orientation);
    assert!(session.attach(stream).is_ok());
    assert_eq!(session.subscription_count(), 2);
}

#[test]
fn denied_microphone_degrades_only_that_channel() {
    let intake = SensorIntake::new();
    let mut session = session_with_gesture_gate();
    session.request_permissions();
    session.resolve_permission(PermissionGroup::Microphone, false);

    let (mic, mic_releases) = CountingStream::new(Channel::Microphone);
    assert_eq!(
        session.attach(mic).unwrap_err(),
        SessionError::PermissionDenied(PermissionGroup::Microphone)
    );
    assert_eq!(mic_releases.get(), 1);

    // Ungated channels keep working
    let (baro, _) = CountingStream::new(Channel::Barometer);
    assert!(session.attach(baro).is_ok());

    intake.push_pressure(pressure(995.0, START_MS));
    session.process(&intake);

    let snapshot = session.snapshot();
    assert!(snapshot.is_available(Channel::Barometer));
    assert!(!snapshot.is_available(Channel::Microphone));
    assert_eq!(snapshot.microphone().dbfs, -100.0);

    // The silent microphone names its cause; the live barometer has none
    assert_eq!(
        session.channel_error(Channel::Microphone),
        Some(SensorError::PermissionDenied(Channel::Microphone))
    );
    assert_eq!(session.channel_error(Channel::Barometer), None);
}

#[test]
fn peak_reset_spares_current_values_and_availability() {
    let intake = SensorIntake::new();
    let mut session = session_with_gesture_gate();
    session.request_permissions();

    intake.push_motion(motion_g(3.2, START_MS));
    session.process(&intake);

    // A later steady sample becomes the committed value
    session.hub_mut().clock_mut().advance(400);
    intake.push_motion(motion_g(1.1, START_MS + 400));
    session.process(&intake);
    assert!((session.snapshot().motion().peak.get() - 3.2).abs() < 1e-3);

    session.reset_peaks();

    let motion = session.snapshot().motion();
    assert_eq!(motion.peak.get(), 0.0);
    assert!((motion.g_force - 1.1).abs() < 1e-3);
    assert!(session.snapshot().is_available(Channel::Motion));
}

#[test]
fn ending_mid_flight_releases_streams_and_clears_state() {
    let intake = SensorIntake::new();
    let mut session = session_with_gesture_gate();
    session.request_permissions();
    session.resolve_permission(PermissionGroup::MotionOrientation, true);
    session.resolve_permission(PermissionGroup::Microphone, true);

    let mut release_flags = Vec::new();
    for channel in Channel::ALL {
        let (stream, releases) = CountingStream::new(channel);
        session.attach(stream).unwrap();
        release_flags.push(releases);
    }

    let mut flight = FlightEvents::new(650.0);
    for i in 0..30u64 {
        let now = START_MS + i * 100;
        session.hub_mut().clock_mut().set(now);
        flight.tick(&intake, now);
        session.process(&intake);
    }
    assert_eq!(session.snapshot().availability().count(), 7);

    session.end();

    for releases in &release_flags {
        assert_eq!(releases.get(), 1);
    }
    assert_eq!(session.subscription_count(), 0);
    assert!(session.snapshot().availability().is_empty());
    assert_eq!(session.snapshot().barometer().hpa, 1013.25);
    assert_eq!(session.hub().stats(Channel::Motion).received, 0);

    // Nothing moves after the end
    intake.push_pressure(pressure(990.0, START_MS + 4000));
    assert_eq!(session.process(&intake), 0);

    // A second end does not double-release
    session.end();
    for releases in &release_flags {
        assert_eq!(releases.get(), 1);
    }
}
