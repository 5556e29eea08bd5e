//! Wireless link surface for Voltwatch
//!
//! Two halves:
//!
//! - [`profile`]: the GATT identity the device presents. These constants are
//!   a compatibility contract with deployed client apps; a firmware port to
//!   any BLE stack must advertise exactly these values.
//! - [`channel`]: a host-side, in-memory stand-in for the radio. It
//!   implements the core's [`NotificationSink`] and [`Advertiser`] traits
//!   over a bounded channel and feeds connection events into the core's
//!   session ring the way a BLE stack callback would, so the whole control
//!   loop can run and be tested on a workstation.
//!
//! On-target firmware replaces [`channel`] with a thin adapter over the
//! platform BLE stack; [`profile`] and everything in `voltwatch-core` stay
//! as they are.
//!
//! [`NotificationSink`]: voltwatch_core::traits::NotificationSink
//! [`Advertiser`]: voltwatch_core::traits::Advertiser

pub mod channel;
pub mod profile;

pub use channel::{ChannelLink, PeerHandle};

use thiserror::Error;

/// Errors from the peer side of the host link
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// Connect attempted while the device is not advertising
    #[error("device is not advertising")]
    NotAdvertising,

    /// Connect attempted while a peer is already connected
    #[error("a peer is already connected")]
    AlreadyConnected,

    /// Disconnect attempted with no active connection
    #[error("no peer connected")]
    NotConnected,
}

/// Counters kept by the link, single-writer from the device side
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Notifications delivered to the peer
    pub notifications_sent: u64,
    /// Notifications refused (not connected or channel full)
    pub notifications_failed: u64,
    /// Payload bytes delivered
    pub bytes_sent: u64,
    /// Advertising starts, the initial one included
    pub advertising_starts: u32,
}
