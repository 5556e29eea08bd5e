//! Core monitoring engine for Voltwatch
//!
//! Samples bus voltage, shunt voltage, current and power from an
//! INA226-class sensor at a fixed cadence, applies an affine bus-voltage
//! calibration, streams a fixed-format text record over a notification
//! channel and drives an audible/visual low-voltage alert.
//!
//! Key constraints:
//! - Runs on small MCUs (ESP32-C3 class), `no_std` by default feature flip
//! - No heap allocation in the sampling path
//! - Single control loop; only the session event ring crosses contexts
//!
//! ```no_run
//! use voltwatch_core::{
//!     CalibrationParams, AlertConfig, Monitor, SensorReader, SessionEvents,
//! };
//! # use voltwatch_core::traits::{PowerSensor, NotificationSink, Advertiser, AlertIndicator, RawReading};
//! # use voltwatch_core::errors::{SensorFault, NotifyError};
//! # struct Ina; struct Ble; struct Pins;
//! # impl PowerSensor for Ina {
//! #     fn configure(&mut self, _: &voltwatch_core::calibration::DerivedCalibration) -> Result<(), SensorFault> { Ok(()) }
//! #     fn read(&mut self) -> Result<RawReading, SensorFault> { Ok(RawReading::default()) }
//! # }
//! # impl NotificationSink for Ble {
//! #     fn notify(&mut self, _: &[u8]) -> Result<(), NotifyError> { Ok(()) }
//! # }
//! # impl Advertiser for Ble {
//! #     fn start_advertising(&mut self) {}
//! #     fn stop_advertising(&mut self) {}
//! # }
//! # impl AlertIndicator for Pins {
//! #     fn set_level(&mut self, _: bool) {}
//! # }
//! # fn now_ms() -> u64 { 0 }
//! # fn sleep_ms(_: u64) {}
//!
//! static SESSION_EVENTS: SessionEvents = SessionEvents::new();
//!
//! let reader = SensorReader::new(Ina, CalibrationParams::default());
//! let mut monitor = Monitor::new(reader, Ble, Pins, AlertConfig::default());
//!
//! monitor.start();
//! loop {
//!     monitor.tick(&SESSION_EVENTS, now_ms());
//!     sleep_ms(voltwatch_core::monitor::SAMPLE_INTERVAL_MS);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alert;
pub mod calibration;
pub mod diagnostics;
pub mod errors;
pub mod monitor;
pub mod sensor;
pub mod session;
pub mod telemetry;
pub mod time;
pub mod traits;

// Public API
pub use alert::{AlertConfig, AlertController, AlertPhase};
pub use calibration::{apply_bus_voltage, CalibrationParams, DerivedCalibration};
pub use errors::{CalibrationError, NotifyError, SensorFault};
pub use monitor::{Monitor, MonitorStats, TickReport};
pub use sensor::{SensorHealth, SensorReader};
pub use session::{ConnectionEvent, LinkCommand, SessionEvents, SessionManager, SessionState};
pub use telemetry::TelemetrySample;
pub use time::{Clock, Timestamp};

/// Crate version, exposed for startup banners
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
