//! Acquisition Session Lifecycle
//!
//! A session owns everything with a lifetime: the permission gate, the
//! registered platform subscriptions, and the hub with its snapshot.
//! Ending the session releases every subscription exactly once and
//! restores the hub to its start state, so a dropped session can never
//! leave a sensor stream running.
//!
//! ## Permission Model
//!
//! Two groups need explicit user consent: inertial sensors (motion plus
//! orientation, which some hosts gate behind a user gesture) and the
//! microphone. A subscription for a gated channel cannot attach until its
//! group resolves to granted; the attach call hands the rejected
//! subscription its release before returning, so the hardware handle is
//! never stranded. Channels outside both groups attach unconditionally.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

use crate::channel::{Channel, ChannelSet};
use crate::constants::channels::{FIX_TIMEOUT_MS, MAX_FIX_AGE_MS};
use crate::errors::{SensorError, SessionError};
use crate::hub::SensorHub;
use crate::intake::SensorIntake;
use crate::snapshot::SensorSnapshot;
use crate::time::TimeSource;

/// Most subscriptions a session will register
///
/// Seven channels plus auxiliary feeds fit comfortably; the bound exists
/// so the registry needs no allocation growth path.
pub const MAX_SUBSCRIPTIONS: usize = 16;

/// Permission groups requiring explicit user consent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermissionGroup {
    /// Inertial sensors: motion and orientation share one prompt
    MotionOrientation,
    /// Microphone capture
    Microphone,
}

impl PermissionGroup {
    /// The group gating a channel, if any
    pub const fn covering(channel: Channel) -> Option<Self> {
        match channel {
            Channel::Motion | Channel::Orientation => Some(Self::MotionOrientation),
            Channel::Microphone => Some(Self::Microphone),
            _ => None,
        }
    }

    /// Static label for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MotionOrientation => "motion-orientation",
            Self::Microphone => "microphone",
        }
    }
}

impl core::fmt::Display for PermissionGroup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a permission group stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermissionState {
    /// Prompt not yet answered
    Pending,
    /// User granted access
    Granted,
    /// User refused; terminal for this session
    Denied,
}

/// Tracks consent per permission group
///
/// Granted and denied are both terminal. A host that wants to re-ask
/// starts a new session with a fresh gate.
#[derive(Debug, Clone, Copy)]
pub struct PermissionGate {
    motion_requires_gesture: bool,
    motion_orientation: PermissionState,
    microphone: PermissionState,
    requested: bool,
}

impl PermissionGate {
    /// Fresh gate with both groups pending
    ///
    /// `motion_requires_gesture` mirrors the host: true where inertial
    /// sensors sit behind an explicit user-gesture prompt, false where
    /// requesting them succeeds silently.
    pub const fn new(motion_requires_gesture: bool) -> Self {
        Self {
            motion_requires_gesture,
            motion_orientation: PermissionState::Pending,
            microphone: PermissionState::Pending,
            requested: false,
        }
    }

    /// Kick off the permission prompts, once
    ///
    /// Idempotent. Hosts without a motion-sensor prompt grant the inertial
    /// group immediately; the microphone always waits for
    /// [`Self::resolve`].
    pub fn begin_requests(&mut self) {
        if self.requested {
            return;
        }
        self.requested = true;
        if !self.motion_requires_gesture {
            self.motion_orientation = PermissionState::Granted;
        }
    }

    /// Record the host's answer for one group
    ///
    /// Only a pending group moves; a decided group keeps its answer.
    pub fn resolve(&mut self, group: PermissionGroup, granted: bool) {
        let slot = match group {
            PermissionGroup::MotionOrientation => &mut self.motion_orientation,
            PermissionGroup::Microphone => &mut self.microphone,
        };
        if *slot == PermissionState::Pending {
            *slot = if granted {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
        }
    }

    /// Current state of one group
    pub const fn state(&self, group: PermissionGroup) -> PermissionState {
        match group {
            PermissionGroup::MotionOrientation => self.motion_orientation,
            PermissionGroup::Microphone => self.microphone,
        }
    }

    /// Whether a channel may start delivering
    pub fn allows(&self, channel: Channel) -> bool {
        match PermissionGroup::covering(channel) {
            Some(group) => self.state(group) == PermissionState::Granted,
            None => true,
        }
    }
}

/// Location watch configuration handed to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Ask for the best fix quality the host can deliver
    pub high_accuracy: bool,
    /// Oldest cached fix the watch may hand back, in ms (0 = fresh only)
    pub max_fix_age_ms: u64,
    /// How long one fix may be awaited before a timeout fault, in ms
    pub timeout_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_fix_age_ms: MAX_FIX_AGE_MS,
            timeout_ms: FIX_TIMEOUT_MS,
        }
    }
}

/// A registered platform sensor stream
///
/// Implementations wrap whatever handle the host hands out for a running
/// stream. `release` must be idempotent: the session calls it on every
/// teardown path, including drop.
pub trait Subscription {
    /// Channel this stream delivers into
    fn channel(&self) -> Channel;

    /// Stop the underlying platform stream
    fn release(&mut self);
}

/// Owns the gate, the subscriptions, and the hub for one acquisition run
pub struct Session<T: TimeSource> {
    gate: PermissionGate,
    subscriptions: heapless::Vec<Box<dyn Subscription>, MAX_SUBSCRIPTIONS>,
    hub: SensorHub<T>,
    unsupported: ChannelSet,
    ended: bool,
}

impl<T: TimeSource> Session<T> {
    /// Session wrapping a configured hub
    pub fn new(hub: SensorHub<T>, motion_requires_gesture: bool) -> Self {
        Self {
            gate: PermissionGate::new(motion_requires_gesture),
            subscriptions: heapless::Vec::new(),
            hub,
            unsupported: ChannelSet::empty(),
            ended: false,
        }
    }

    /// Start the permission prompts (idempotent)
    pub fn request_permissions(&mut self) {
        self.gate.begin_requests();
    }

    /// Feed back the host's answer for one permission group
    pub fn resolve_permission(&mut self, group: PermissionGroup, granted: bool) {
        self.gate.resolve(group, granted);
    }

    /// Current state of one permission group
    pub const fn permission(&self, group: PermissionGroup) -> PermissionState {
        self.gate.state(group)
    }

    /// The permission gate
    pub const fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Register a started platform stream
    ///
    /// A stream for a gated channel is only accepted once its group is
    /// granted. On any rejection the subscription is released before the
    /// error returns, so callers never hold a half-registered stream.
    pub fn attach(&mut self, mut subscription: Box<dyn Subscription>) -> Result<(), SessionError> {
        if self.ended {
            subscription.release();
            return Err(SessionError::SessionEnded);
        }
        if let Some(group) = PermissionGroup::covering(subscription.channel()) {
            match self.gate.state(group) {
                PermissionState::Granted => {}
                PermissionState::Pending => {
                    subscription.release();
                    return Err(SessionError::PermissionPending(group));
                }
                PermissionState::Denied => {
                    subscription.release();
                    return Err(SessionError::PermissionDenied(group));
                }
            }
        }
        if let Err(mut rejected) = self.subscriptions.push(subscription) {
            rejected.release();
            return Err(SessionError::RegistryFull);
        }
        Ok(())
    }

    /// Registered stream count
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Record that the host has no hardware for a channel
    ///
    /// Called by the platform layer when starting a stream fails with
    /// "no such sensor". Like availability, the record only ever gains
    /// channels; an absent capability does not come back mid-session.
    pub fn mark_unsupported(&mut self, channel: Channel) {
        self.unsupported.mark(channel);
    }

    /// Channels the host reported as absent
    pub const fn unsupported(&self) -> ChannelSet {
        self.unsupported
    }

    /// Why a channel has delivered nothing, when the reason is known
    ///
    /// Resolves the acquisition taxonomy for one silent channel so the
    /// presentation layer can tell "unsupported" and "denied" apart from
    /// plain warming up. A channel that has data never reports an error;
    /// a silent channel with no known cause returns `None` and should be
    /// shown as waiting.
    pub fn channel_error(&self, channel: Channel) -> Option<SensorError> {
        if self.hub.snapshot().is_available(channel) {
            return None;
        }
        if self.unsupported.contains(channel) {
            return Some(SensorError::SensorUnsupported(channel));
        }
        if let Some(group) = PermissionGroup::covering(channel) {
            if self.gate.state(group) == PermissionState::Denied {
                return Some(SensorError::PermissionDenied(channel));
            }
        }
        if channel == Channel::Location {
            if let Some(fault) = self.hub.last_fix_fault() {
                return Some(SensorError::TransientFixFailure(fault));
            }
        }
        None
    }

    /// Drain the intake through the hub
    ///
    /// A no-op after [`Self::end`].
    pub fn process(&mut self, intake: &SensorIntake) -> usize {
        if self.ended {
            return 0;
        }
        self.hub.process(intake)
    }

    /// Latest committed state
    pub const fn snapshot(&self) -> &SensorSnapshot {
        self.hub.snapshot()
    }

    /// The hub, for stats and direct polling
    pub const fn hub(&self) -> &SensorHub<T> {
        &self.hub
    }

    /// Mutable hub access, for test clocks and manual audio ticks
    pub fn hub_mut(&mut self) -> &mut SensorHub<T> {
        &mut self.hub
    }

    /// Clear peak readouts without touching current values
    pub fn reset_peaks(&mut self) {
        self.hub.reset_peaks();
    }

    /// Whether [`Self::end`] has run
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Release every subscription and restore the hub to its start state
    ///
    /// Idempotent; also runs on drop.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        for subscription in self.subscriptions.iter_mut() {
            subscription.release();
        }
        self.subscriptions.clear();
        self.hub.reset();
    }
}

impl<T: TimeSource> Drop for Session<T> {
    fn drop(&mut self) {
        self.end();
    }
}
