//! Calibration math for INA226-class current/voltage sensors
//!
//! Two independent corrections live here:
//!
//! 1. **Current scaling**: the sensor reports current in register counts.
//!    The size of one count (the current LSB) is derived from the maximum
//!    expected current and the shunt resistance. The derivation fails -
//!    reported, never clamped - when the requested range is not
//!    representable by the sensor.
//!
//! 2. **Bus voltage correction**: a pure affine transform
//!    `calibrated = raw * multiplier + offset` fixed at startup, derived
//!    offline against a reference meter (see [`crate::diagnostics`]).
//!
//! Parameters are set once at startup and are immutable for the process
//! lifetime; there is no online recalibration.

use core::fmt;

use crate::errors::{CalibrationError, CalibrationResult};

/// Shunt input full scale of the INA226 front end, in volts (±81.92 mV)
pub const SHUNT_FULL_SCALE_V: f32 = 0.08192;

/// Current register resolution: the maximum current maps onto 2^15 counts
pub const CURRENT_REGISTER_STEPS: f32 = 32768.0;

/// User-supplied calibration parameters
///
/// Defaults are the values this firmware ships with: a 20 A range over a
/// ~4 mΩ shunt, normalized LSB, identity bus-voltage correction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationParams {
    /// Maximum expected current in amperes (> 0)
    pub max_current_a: f32,
    /// Shunt resistance in ohms (> 0)
    pub shunt_ohms: f32,
    /// Round the current LSB up to the next decade for round-number scaling
    pub normalized: bool,
    /// Bus voltage multiplier (affine correction)
    pub bus_multiplier: f32,
    /// Bus voltage offset in volts (affine correction)
    pub bus_offset: f32,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            max_current_a: 20.0,
            shunt_ohms: 0.003977142857142857,
            normalized: true,
            bus_multiplier: 1.0,
            bus_offset: 0.0,
        }
    }
}

impl CalibrationParams {
    /// Derive the internal scale factors, validating representability
    ///
    /// Fails when a parameter is non-positive or when the voltage across the
    /// shunt at maximum current would exceed the shunt input full scale
    /// (i.e. the requested range cannot be represented by the register).
    pub fn derive(&self) -> CalibrationResult<DerivedCalibration> {
        if !(self.max_current_a > 0.0) {
            return Err(CalibrationError::NonPositiveParameter { name: "max_current_a" });
        }
        if !(self.shunt_ohms > 0.0) {
            return Err(CalibrationError::NonPositiveParameter { name: "shunt_ohms" });
        }

        let shunt_drop_v = self.max_current_a * self.shunt_ohms;
        if shunt_drop_v > SHUNT_FULL_SCALE_V {
            return Err(CalibrationError::ShuntRangeExceeded {
                requested_mv: shunt_drop_v * 1000.0,
                full_scale_mv: SHUNT_FULL_SCALE_V * 1000.0,
            });
        }

        let mut current_lsb_a = self.max_current_a / CURRENT_REGISTER_STEPS;
        if self.normalized {
            current_lsb_a = round_up_to_decade(current_lsb_a);
        }

        Ok(DerivedCalibration {
            current_lsb_a,
            shunt_drop_v,
            params: *self,
        })
    }
}

/// Round a positive value up to the next power of ten
///
/// `6.1e-4` becomes `1e-3`, giving the current register a round A/bit step.
fn round_up_to_decade(value: f32) -> f32 {
    let mut decade = 1.0e-9;
    while decade < value {
        decade *= 10.0;
    }
    decade
}

/// Apply the bus-voltage affine correction
///
/// Pure, deterministic and exact: no clamping, no rounding beyond f32.
#[inline]
pub fn apply_bus_voltage(raw: f32, multiplier: f32, offset: f32) -> f32 {
    raw * multiplier + offset
}

/// Scale factors latched at startup
///
/// Carries the source parameters so the startup dump and the bus-voltage
/// correction need no other state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedCalibration {
    /// Physical current represented by one register increment, in A/bit
    pub current_lsb_a: f32,
    /// Voltage across the shunt at maximum expected current, in volts
    pub shunt_drop_v: f32,
    /// The parameters this calibration was derived from
    pub params: CalibrationParams,
}

impl DerivedCalibration {
    /// Scale factors of an unconfigured sensor
    ///
    /// Used when derivation fails at startup: the bus-voltage correction
    /// still applies, current scaling stays at zero. The failure itself is
    /// surfaced through [`crate::sensor::SensorHealth`].
    pub fn unconfigured(params: CalibrationParams) -> Self {
        Self {
            current_lsb_a: 0.0,
            shunt_drop_v: 0.0,
            params,
        }
    }

    /// Current LSB in µA/bit, for human-readable dumps
    pub fn current_lsb_ua(&self) -> f32 {
        self.current_lsb_a * 1_000_000.0
    }

    /// Apply the bus-voltage affine correction from the latched parameters
    #[inline]
    pub fn apply_bus_voltage(&self, raw: f32) -> f32 {
        apply_bus_voltage(raw, self.params.bus_multiplier, self.params.bus_offset)
    }
}

impl fmt::Display for DerivedCalibration {
    /// Startup parameter dump, human-readable only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shunt:        {:.4} Ohm", self.params.shunt_ohms)?;
        writeln!(f, "current LSB:  {:.10} A/bit", self.current_lsb_a)?;
        writeln!(f, "current LSB:  {:.3} uA/bit", self.current_lsb_ua())?;
        writeln!(f, "max current:  {:.3} A", self.params.max_current_a)?;
        writeln!(f, "normalized:   {}", self.params.normalized)?;
        writeln!(f, "bus V offset: {:.3} V", self.params.bus_offset)?;
        write!(f, "bus V multi:  {:.3}", self.params.bus_multiplier)
    }
}
