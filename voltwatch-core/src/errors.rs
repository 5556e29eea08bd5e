//! Error Types for the Monitoring Core
//!
//! ## Design Philosophy
//!
//! Voltwatch's error system follows the constraints of the device it runs on:
//!
//! 1. **Small Size**: Every variant carries at most a few floats or a
//!    `&'static str`, so errors can be returned from the sampling hot path
//!    and stored in reports without heap allocation.
//!
//! 2. **Copy Semantics**: All error enums are `Copy`; they are latched into
//!    health flags and counters rather than bubbled through deep call stacks.
//!
//! 3. **Nothing Is Fatal**: This firmware has no abort path. A calibration
//!    failure becomes a startup health flag, a sensor fault becomes a stale
//!    sample, a notify failure becomes a dropped-record counter. Loss of
//!    power is the only termination path.
//!
//! ## Error Categories
//!
//! - [`CalibrationError`]: derived scaling parameters fall outside the
//!   sensor's representable range. Reported once at startup.
//! - [`SensorFault`]: a transient bus/register read failure. The reader
//!   substitutes the last good values and marks the sample stale.
//! - [`NotifyError`]: the notification channel refused a payload. The record
//!   is dropped silently; no retry, no backpressure.

use thiserror_no_std::Error;

/// Result type for calibration derivation
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Calibration configuration errors - reported at startup, never clamped away
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    /// Requested current range and shunt value together exceed the shunt
    /// input full scale; the derived LSB step would overflow the register
    #[error("shunt drop {requested_mv} mV exceeds full scale {full_scale_mv} mV")]
    ShuntRangeExceeded {
        /// Voltage across the shunt at maximum expected current, in mV
        requested_mv: f32,
        /// The sensor's shunt input full scale, in mV
        full_scale_mv: f32,
    },

    /// A parameter that must be strictly positive was zero or negative
    #[error("calibration parameter {name} must be positive")]
    NonPositiveParameter {
        /// Which parameter failed the check
        name: &'static str,
    },
}

/// Transient sensor read failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// The bus transaction failed (NACK, arbitration loss, timeout)
    #[error("sensor bus transaction failed")]
    Bus,

    /// The sensor did not respond at its address
    #[error("sensor not responding")]
    NotResponding,
}

/// Notification publish failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// No peer is connected to the notification channel
    #[error("no peer connected")]
    NotConnected,

    /// The transport could not accept the payload right now
    #[error("transport busy, payload dropped")]
    Busy,
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ShuntRangeExceeded { requested_mv, full_scale_mv } => {
                defmt::write!(fmt, "shunt drop {} mV exceeds {} mV", requested_mv, full_scale_mv)
            }
            Self::NonPositiveParameter { name } => {
                defmt::write!(fmt, "parameter {} must be positive", name)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorFault {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Bus => defmt::write!(fmt, "sensor bus fault"),
            Self::NotResponding => defmt::write!(fmt, "sensor not responding"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NotifyError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotConnected => defmt::write!(fmt, "no peer connected"),
            Self::Busy => defmt::write!(fmt, "transport busy"),
        }
    }
}
