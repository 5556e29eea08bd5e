//! The per-iteration control loop
//!
//! ## Data flow
//!
//! ```text
//! SessionEvents ─▶ drain ─▶ SensorReader ─▶ record ─▶ console log
//!                               │                        │
//!                               │              (connected only)
//!                               │                        ▼
//!                               │              NotificationSink
//!                               ▼
//!                        AlertController ─▶ AlertIndicator
//!                               ·
//!                        SessionManager ─▶ Advertiser
//! ```
//!
//! One tick per loop iteration, the enclosing harness paces the loop with
//! [`SAMPLE_INTERVAL_MS`]; the core never sleeps or blocks. Alert
//! evaluation and session polling are independent state machines and both
//! run every tick - neither can starve the other.
//!
//! There is no sample queue: when the sink refuses a payload the record is
//! dropped, counted and forgotten. Degradation here is by omission, never
//! by stopping.

use crate::alert::{AlertConfig, AlertController, AlertPhase};
use crate::sensor::SensorReader;
use crate::session::{LinkCommand, SessionEvents, SessionManager};
use crate::telemetry::TelemetrySample;
use crate::time::Timestamp;
use crate::traits::{Advertiser, AlertIndicator, NotificationSink, PowerSensor};

/// Pacing delay between loop iterations, in milliseconds
///
/// Bounds the sampling cadence so the wireless stack is never saturated.
pub const SAMPLE_INTERVAL_MS: u64 = 10;

/// Counters for loop health, single-writer from the loop itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Samples acquired since boot
    pub samples: u32,
    /// Records published on the notification channel
    pub published: u32,
    /// Records dropped because the sink refused them
    pub dropped_notifications: u32,
    /// Samples served from last-known-good after a read fault
    pub stale_samples: u32,
    /// Advertising restarts issued by the session manager
    pub advert_restarts: u32,
}

/// What one tick did, for harnesses and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// The sample acquired this tick
    pub sample: TelemetrySample,
    /// True when the record went out on the notification channel
    pub published: bool,
    /// True while the alert is in its blinking phase
    pub alert_active: bool,
    /// The advertiser command executed this tick, if any
    pub command: Option<LinkCommand>,
}

/// Ties the sensor, the link and the indicator into one control loop
pub struct Monitor<S, L, I>
where
    S: PowerSensor,
    L: NotificationSink + Advertiser,
    I: AlertIndicator,
{
    reader: SensorReader<S>,
    link: L,
    indicator: I,
    alert: AlertController,
    session: SessionManager,
    stats: MonitorStats,
}

impl<S, L, I> Monitor<S, L, I>
where
    S: PowerSensor,
    L: NotificationSink + Advertiser,
    I: AlertIndicator,
{
    /// Assemble the loop; the reader carries the latched calibration
    pub fn new(reader: SensorReader<S>, link: L, indicator: I, alert_config: AlertConfig) -> Self {
        Self {
            reader,
            link,
            indicator,
            alert: AlertController::new(alert_config),
            session: SessionManager::new(),
            stats: MonitorStats::default(),
        }
    }

    /// Startup: report calibration health and begin advertising
    pub fn start(&mut self) {
        #[cfg(feature = "log")]
        {
            let health = self.reader.health();
            if health.calibrated {
                log::info!(target: "voltwatch", "calibration ok\n{}", self.reader.calibration());
            } else if let Some(err) = health.calibration_error {
                log::warn!(target: "voltwatch", "calibration failed: {err}; running unconfigured");
            } else {
                log::warn!(target: "voltwatch", "sensor configure failed; running on power-on defaults");
            }
        }
        #[cfg(feature = "defmt")]
        if !self.reader.health().calibrated {
            defmt::warn!("calibration failed; running unconfigured");
        }

        self.link.start_advertising();
    }

    /// Run one loop iteration at the given uptime
    pub fn tick<const N: usize>(
        &mut self,
        events: &SessionEvents<N>,
        now: Timestamp,
    ) -> TickReport {
        self.session.drain(events, now);

        let sample = self.reader.sample(now);
        let record = sample.record();

        self.stats.samples = self.stats.samples.wrapping_add(1);
        if sample.stale {
            self.stats.stale_samples = self.stats.stale_samples.wrapping_add(1);
        }

        // The record goes to the console on every iteration, connected or not
        #[cfg(feature = "log")]
        log::info!(target: "voltwatch", "{record}");
        #[cfg(feature = "defmt")]
        defmt::info!("{=str}", record.as_str());

        let mut published = false;
        if self.session.is_connected() {
            match self.link.notify(record.as_bytes()) {
                Ok(()) => {
                    published = true;
                    self.stats.published = self.stats.published.wrapping_add(1);
                }
                Err(_) => {
                    // Dropped silently: no retry, no backpressure
                    self.stats.dropped_notifications =
                        self.stats.dropped_notifications.wrapping_add(1);
                }
            }
        }

        let level = self.alert.evaluate(sample.bus_voltage_v, now);
        self.indicator.set_level(level);

        let command = self.session.poll(now);
        match command {
            Some(LinkCommand::StopAdvertising) => self.link.stop_advertising(),
            Some(LinkCommand::StartAdvertising) => {
                self.link.start_advertising();
                self.stats.advert_restarts = self.stats.advert_restarts.wrapping_add(1);
            }
            None => {}
        }

        TickReport {
            sample,
            published,
            alert_active: self.alert.phase() == AlertPhase::Blinking,
            command,
        }
    }

    /// Loop counters
    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// The session manager's view of the link
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The alert controller
    pub fn alert(&self) -> &AlertController {
        &self.alert
    }

    /// Sensor health flags
    pub fn sensor_health(&self) -> &crate::sensor::SensorHealth {
        self.reader.health()
    }

    /// Borrow the link (host harnesses need it for shutdown)
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Borrow the sensor reader, for harnesses
    pub fn reader_mut(&mut self) -> &mut SensorReader<S> {
        &mut self.reader
    }
}
