//! In-memory link over a bounded channel
//!
//! [`ChannelLink`] is the device side: it implements the core's
//! [`NotificationSink`] and [`Advertiser`] traits, so a
//! [`Monitor`](voltwatch_core::Monitor) drives it exactly as it would drive
//! a radio. [`PeerHandle`] is the client side: connecting and disconnecting
//! push [`ConnectionEvent`]s into the shared session ring, which is the
//! same path a BLE stack's connection callbacks take on target.
//!
//! The channel is bounded and never blocks the device. A full peer buffer
//! refuses the notification, matching a radio whose transmit queue is
//! saturated; the control loop drops and moves on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::Arc;

use voltwatch_core::session::{ConnectionEvent, SessionEvents};
use voltwatch_core::traits::{Advertiser, NotificationSink};
use voltwatch_core::NotifyError;

use crate::{LinkError, LinkStats};

/// Default peer buffer depth, in records
pub const DEFAULT_CHANNEL_DEPTH: usize = 32;

/// Flags visible to both halves of the link
#[derive(Debug, Default)]
struct Shared {
    connected: AtomicBool,
    advertising: AtomicBool,
}

/// Device side of the in-memory link
pub struct ChannelLink {
    tx: SyncSender<Vec<u8>>,
    shared: Arc<Shared>,
    stats: LinkStats,
}

/// Client side: subscribes, connects and disconnects like a BLE central
pub struct PeerHandle {
    rx: Receiver<Vec<u8>>,
    shared: Arc<Shared>,
    events: Arc<SessionEvents>,
}

impl ChannelLink {
    /// Build a connected pair sharing the given session ring
    ///
    /// The ring is the same one the device's [`Monitor`] drains; events
    /// pushed by the peer surface in the control loop on its next tick.
    ///
    /// [`Monitor`]: voltwatch_core::Monitor
    pub fn pair(events: Arc<SessionEvents>) -> (Self, PeerHandle) {
        Self::pair_with_depth(events, DEFAULT_CHANNEL_DEPTH)
    }

    /// As [`ChannelLink::pair`] with an explicit peer buffer depth
    pub fn pair_with_depth(events: Arc<SessionEvents>, depth: usize) -> (Self, PeerHandle) {
        let (tx, rx) = sync_channel(depth);
        let shared = Arc::new(Shared::default());

        let link = Self {
            tx,
            shared: Arc::clone(&shared),
            stats: LinkStats::default(),
        };
        let peer = PeerHandle { rx, shared, events };

        (link, peer)
    }

    /// Delivery and advertising counters
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// True while a peer is connected
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// True while the device is advertising
    pub fn is_advertising(&self) -> bool {
        self.shared.advertising.load(Ordering::Acquire)
    }
}

impl NotificationSink for ChannelLink {
    fn notify(&mut self, payload: &[u8]) -> Result<(), NotifyError> {
        if !self.shared.connected.load(Ordering::Acquire) {
            self.stats.notifications_failed += 1;
            return Err(NotifyError::NotConnected);
        }

        match self.tx.try_send(payload.to_vec()) {
            Ok(()) => {
                self.stats.notifications_sent += 1;
                self.stats.bytes_sent += payload.len() as u64;
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.stats.notifications_failed += 1;
                Err(NotifyError::Busy)
            }
            Err(TrySendError::Disconnected(_)) => {
                // The peer handle is gone; the link behaves as unsubscribed
                self.shared.connected.store(false, Ordering::Release);
                self.stats.notifications_failed += 1;
                Err(NotifyError::NotConnected)
            }
        }
    }
}

impl Advertiser for ChannelLink {
    fn start_advertising(&mut self) {
        if !self.shared.advertising.swap(true, Ordering::AcqRel) {
            self.stats.advertising_starts += 1;
            log::debug!(target: "voltwatch-link", "advertising started");
        }
    }

    fn stop_advertising(&mut self) {
        if self.shared.advertising.swap(false, Ordering::AcqRel) {
            log::debug!(target: "voltwatch-link", "advertising stopped");
        }
    }
}

impl PeerHandle {
    /// Connect to the device, as a central would after scanning
    ///
    /// Succeeds only while the device is advertising; advertising stops on
    /// connection, like a single-peripheral BLE stack.
    pub fn connect(&self) -> Result<(), LinkError> {
        if self.shared.connected.load(Ordering::Acquire) {
            return Err(LinkError::AlreadyConnected);
        }
        if !self.shared.advertising.swap(false, Ordering::AcqRel) {
            return Err(LinkError::NotAdvertising);
        }

        self.shared.connected.store(true, Ordering::Release);
        self.events.push(ConnectionEvent::PeerConnected);
        log::debug!(target: "voltwatch-link", "peer connected");
        Ok(())
    }

    /// Drop the connection, as a central going out of range
    pub fn disconnect(&self) -> Result<(), LinkError> {
        if !self.shared.connected.swap(false, Ordering::AcqRel) {
            return Err(LinkError::NotConnected);
        }

        self.events.push(ConnectionEvent::PeerDisconnected);
        log::debug!(target: "voltwatch-link", "peer disconnected");
        Ok(())
    }

    /// Take the next buffered record, if any
    pub fn try_recv(&self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }

    /// Drain every buffered record
    pub fn drain(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(payload) = self.try_recv() {
            out.push(payload);
        }
        out
    }

    /// True while the device is advertising
    pub fn is_advertising(&self) -> bool {
        self.shared.advertising.load(Ordering::Acquire)
    }

    /// True while this peer is connected
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }
}
