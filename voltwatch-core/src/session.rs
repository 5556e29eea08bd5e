//! Wireless session lifecycle: event ring and reconnect policy
#![allow(unsafe_code)] // Required for the lock-free event ring
//!
//! ## Overview
//!
//! The wireless stack delivers connect/disconnect callbacks from its own
//! context (interrupt- or stack-thread-driven), while the control loop reads
//! session state once per iteration. The original firmware shared three
//! plain booleans across that boundary; here the boundary is a bounded
//! lock-free Single Producer Single Consumer ring of [`ConnectionEvent`]s,
//! drained once per tick. No torn reads, no locks, no priority inversion.
//!
//! ```text
//! Stack callback (producer)          Control loop (consumer)
//!        ↓                                  ↓
//!   SessionEvents::push  ──ring──▶  SessionManager::drain
//!                                           ↓
//!                                   SessionManager::poll ──▶ LinkCommand
//! ```
//!
//! ## Memory Ordering
//!
//! - **Acquire** on the opposite index before touching a slot, so the
//!   consumer sees the producer's write (and vice versa).
//! - **Release** on the own index after the slot access, publishing it.
//! - **Relaxed** for the drop counter; it is a statistic, not a guard.
//!
//! ## Reconnect policy
//!
//! A peer disconnect latches a restart request. The recovery sequence is
//! timer-driven against the loop's monotonic timestamps, never blocking:
//! wait [`RECONNECT_SETTLE_MS`] for stack cleanup, emit `StopAdvertising`,
//! wait [`ADVERTISE_GAP_MS`], emit `StartAdvertising` and clear the request.
//! Both advertiser operations are idempotent downstream.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::time::Timestamp;

/// Pause after a disconnect before touching the broadcast, in milliseconds
pub const RECONNECT_SETTLE_MS: u64 = 500;

/// Pause between stopping and restarting the broadcast, in milliseconds
pub const ADVERTISE_GAP_MS: u64 = 200;

/// Default capacity of the session event ring
pub const SESSION_EVENT_CAPACITY: usize = 8;

/// A connection-lifecycle transition reported by the wireless stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionEvent {
    /// A peer completed a connection
    PeerConnected,
    /// The connected peer dropped the link
    PeerDisconnected,
}

/// Lock-free SPSC ring carrying connection events into the control loop
///
/// One producer (the stack callback context), one consumer (the loop).
/// Can live in a `static`; capacity is one less than `N` because one slot
/// stays empty to distinguish full from empty.
pub struct SessionEvents<const N: usize = SESSION_EVENT_CAPACITY> {
    /// Ring buffer storage; slots are initialized before `head` is advanced
    buffer: UnsafeCell<[MaybeUninit<ConnectionEvent>; N]>,
    /// Next write position (producer owned)
    head: AtomicUsize,
    /// Next read position (consumer owned)
    tail: AtomicUsize,
    /// Events dropped because the ring was full
    dropped: AtomicU32,
}

// The ring handles cross-context synchronization itself
unsafe impl<const N: usize> Send for SessionEvents<N> {}
unsafe impl<const N: usize> Sync for SessionEvents<N> {}

impl<const N: usize> SessionEvents<N> {
    /// Create an empty ring; usable in a `static`
    pub const fn new() -> Self {
        Self {
            buffer: UnsafeCell::new([const { MaybeUninit::uninit() }; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push an event from the stack callback context
    ///
    /// Returns false (and counts the drop) when the ring is full.
    ///
    /// ## Safety contract
    /// Only one context may ever call `push`.
    pub fn push(&self, event: ConnectionEvent) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next_head = (head + 1) % N;

        if next_head == self.tail.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // Sole producer: this slot is ours until head advances
        unsafe {
            (*self.buffer.get())[head].write(event);
        }

        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Pop the oldest event from the loop context
    ///
    /// ## Safety contract
    /// Only one context may ever call `pop`.
    pub fn pop(&self) -> Option<ConnectionEvent> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // Sole consumer: the slot was published by the head store above
        let event = unsafe { (*self.buffer.get())[tail].assume_init() };

        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(event)
    }

    /// True when no events are pending
    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Relaxed) == self.head.load(Ordering::Acquire)
    }

    /// Events dropped due to a full ring since boot
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for SessionEvents<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection state owned exclusively by the session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No peer; broadcast assumed running
    Disconnected,
    /// A peer is connected; notifications flow
    Connected,
    /// A peer just left; advertising restart pending
    ReconnectPending,
}

/// Command for the advertiser, emitted by [`SessionManager::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkCommand {
    /// Stop the discoverability broadcast
    StopAdvertising,
    /// Start (or restart) the discoverability broadcast
    StartAdvertising,
}

/// Where the timer-driven recovery sequence currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecoveryPhase {
    Idle,
    Settling { since: Timestamp },
    Gap { since: Timestamp },
}

/// Owns [`SessionState`] and decides when to resume discoverability
///
/// Transitions are driven only by connect/disconnect events, never polled
/// from sensor data. `poll` runs every loop iteration regardless of alert
/// state.
#[derive(Debug, Clone)]
pub struct SessionManager {
    state: SessionState,
    restart_requested: bool,
    recovery: RecoveryPhase,
}

impl SessionManager {
    /// Start disconnected with no pending restart
    pub fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            restart_requested: false,
            recovery: RecoveryPhase::Idle,
        }
    }

    /// Apply one connection event from the stack
    pub fn handle_event(&mut self, event: ConnectionEvent, now: Timestamp) {
        match event {
            ConnectionEvent::PeerConnected => {
                self.state = SessionState::Connected;
                self.restart_requested = false;
                self.recovery = RecoveryPhase::Idle;
            }
            ConnectionEvent::PeerDisconnected => {
                self.state = SessionState::ReconnectPending;
                self.restart_requested = true;
                self.recovery = RecoveryPhase::Settling { since: now };
            }
        }
    }

    /// Drain pending events from the ring into state transitions
    pub fn drain<const N: usize>(&mut self, events: &SessionEvents<N>, now: Timestamp) {
        while let Some(event) = events.pop() {
            self.handle_event(event, now);
        }
    }

    /// Evaluate the reconnect policy for this iteration
    ///
    /// At most one command is emitted per call; the caller executes it on
    /// the advertiser.
    pub fn poll(&mut self, now: Timestamp) -> Option<LinkCommand> {
        if self.state != SessionState::ReconnectPending {
            return None;
        }

        match self.recovery {
            RecoveryPhase::Idle => {
                // Pending without a latched request (a connect raced the
                // disconnect handling): plain restart, idempotent downstream
                self.state = SessionState::Disconnected;
                Some(LinkCommand::StartAdvertising)
            }
            RecoveryPhase::Settling { since } => {
                if now.saturating_sub(since) < RECONNECT_SETTLE_MS {
                    return None;
                }
                if self.restart_requested {
                    self.recovery = RecoveryPhase::Gap { since: now };
                    Some(LinkCommand::StopAdvertising)
                } else {
                    self.state = SessionState::Disconnected;
                    self.recovery = RecoveryPhase::Idle;
                    Some(LinkCommand::StartAdvertising)
                }
            }
            RecoveryPhase::Gap { since } => {
                if now.saturating_sub(since) < ADVERTISE_GAP_MS {
                    return None;
                }
                self.restart_requested = false;
                self.recovery = RecoveryPhase::Idle;
                self.state = SessionState::Disconnected;
                Some(LinkCommand::StartAdvertising)
            }
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a peer is connected
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// True while a disconnect-triggered restart is still pending
    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
