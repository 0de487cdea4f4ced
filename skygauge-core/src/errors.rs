//! Error Types for Sensor Acquisition
//!
//! ## Design Philosophy
//!
//! The error system follows the same rules as the rest of the core:
//!
//! 1. **Small Size**: Each variant stays a few bytes since errors are returned
//!    on the per-event hot path and counted per channel.
//!
//! 2. **No Heap Allocation**: Only `&'static str` reasons, no String. Memory
//!    usage stays deterministic on constrained hosts.
//!
//! 3. **Copy Semantics**: Errors implement Copy so they can be returned and
//!    tallied without move complications.
//!
//! 4. **Non-Fatal by Construction**: No variant may take the session down.
//!    Every error degrades exactly one channel to unavailable or
//!    last-known-value; the aggregator counts it and moves on.
//!
//! ## Error Categories
//!
//! ### Acquisition
//! - `PermissionDenied`: the user refused motion or microphone access
//! - `SensorUnsupported`: the capability does not exist on this host
//! - `TransientFixFailure`: one location fix timed out or errored
//!
//! ### Decode
//! - `MalformedEvent`: a callback fired with a required field missing,
//!   a non-finite float, or a physically implausible value
//!
//! ## Handling Strategy
//!
//! Decoders return `Result` so tests and alternative hosts can observe exact
//! rejection reasons. Inside the aggregating loop errors never propagate:
//! they increment the channel's counters and are logged through the optional
//! `log` facade.

use thiserror_no_std::Error;

use crate::channel::Channel;
use crate::events::FixFault;
use crate::session::PermissionGroup;

/// Result type for decode and acquisition operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Acquisition and decode errors - kept small for the per-event path
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// User refused the permission that gates this channel
    #[error("permission denied for {0}")]
    PermissionDenied(Channel),

    /// Capability absent on this host; the channel stays unavailable
    #[error("{0} is not supported on this host")]
    SensorUnsupported(Channel),

    /// A single location fix timed out or errored; the next fix is awaited
    #[error("location fix failed: {0}")]
    TransientFixFailure(FixFault),

    /// Event arrived with a required field missing or an unusable value
    #[error("malformed event: {reason}")]
    MalformedEvent {
        /// What was missing or wrong, as a static description
        reason: &'static str,
    },
}

impl SensorError {
    /// Shorthand for the most common decode rejection
    pub const fn malformed(reason: &'static str) -> Self {
        Self::MalformedEvent { reason }
    }
}

/// Errors from the session controller and its permission gate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The permission group gating this channel has not been decided yet
    #[error("{0} permission is still pending")]
    PermissionPending(PermissionGroup),

    /// The permission group gating this channel was refused
    #[error("{0} permission was denied")]
    PermissionDenied(PermissionGroup),

    /// The bounded subscription registry is full
    #[error("subscription registry is full")]
    RegistryFull,

    /// The session has already been ended
    #[error("session already ended")]
    SessionEnded,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::PermissionDenied(ch) => defmt::write!(fmt, "permission denied: {}", ch.name()),
            Self::SensorUnsupported(ch) => defmt::write!(fmt, "unsupported: {}", ch.name()),
            Self::TransientFixFailure(fault) => {
                defmt::write!(fmt, "fix failed: {}", fault.name())
            }
            Self::MalformedEvent { reason } => defmt::write!(fmt, "malformed: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SessionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::PermissionPending(group) => defmt::write!(fmt, "{} pending", group.name()),
            Self::PermissionDenied(group) => defmt::write!(fmt, "{} denied", group.name()),
            Self::RegistryFull => defmt::write!(fmt, "registry full"),
            Self::SessionEnded => defmt::write!(fmt, "session ended"),
        }
    }
}
