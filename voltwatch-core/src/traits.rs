//! Hardware seams for the monitoring core
//!
//! The sensor register driver, the wireless stack and the GPIO outputs are
//! external collaborators. These traits are the whole surface the core sees,
//! which is what lets the loop run unchanged on a host during tests.
//! Keep them small - this device does not need richer abstractions.

use crate::calibration::DerivedCalibration;
use crate::errors::{NotifyError, SensorFault};

/// One synchronous register read of all four measured quantities
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawReading {
    /// Bus voltage in volts, before the affine correction
    pub bus_voltage_v: f32,
    /// Shunt voltage in millivolts
    pub shunt_voltage_mv: f32,
    /// Current in milliamperes
    pub current_ma: f32,
    /// Power in milliwatts
    pub power_mw: f32,
}

/// The sensor register driver, treated as a black box
///
/// Implementations wrap the actual I2C driver. Reads are synchronous and
/// have no side effects beyond the bus transaction itself.
pub trait PowerSensor {
    /// Latch the derived scale factors into the sensor's calibration register
    fn configure(&mut self, calibration: &DerivedCalibration) -> Result<(), SensorFault>;

    /// Read all four calibrated quantities in one pass
    fn read(&mut self) -> Result<RawReading, SensorFault>;
}

/// Push-style notification channel toward a connected peer
pub trait NotificationSink {
    /// Publish one payload; failures mean the payload is gone
    fn notify(&mut self, payload: &[u8]) -> Result<(), NotifyError>;
}

/// Control over the discoverability broadcast
///
/// Both operations are idempotent: starting an already-running broadcast
/// and stopping an already-stopped one are no-ops.
pub trait Advertiser {
    /// Begin (or keep) broadcasting the advertisement
    fn start_advertising(&mut self);

    /// Stop an in-progress broadcast
    fn stop_advertising(&mut self);
}

/// The audible/visual alert output pair
///
/// Buzzer and LED are driven identically and in lockstep, so the core only
/// sees one logic level.
pub trait AlertIndicator {
    /// Drive both outputs to the given level
    fn set_level(&mut self, high: bool);
}
