//! Sensor read wrapper with latched calibration and fault masking
//!
//! The reader owns the driver and the calibration derived at startup. Two
//! deliberate softenings happen here instead of error propagation:
//!
//! - A failed calibration derivation (or a faulted configure write) does not
//!   stop the system. The failure is latched into [`SensorHealth`] and the
//!   reader keeps running with the bus-voltage correction only. The device
//!   has no better option than to keep measuring what it can.
//!
//! - A failed read returns the last successfully read values with the
//!   sample marked `stale`. There is no external reporting channel for
//!   transient bus errors; staleness makes the reuse visible instead of
//!   silently re-reading whatever the registers held.

use crate::calibration::{CalibrationParams, DerivedCalibration};
use crate::errors::CalibrationError;
use crate::telemetry::TelemetrySample;
use crate::time::Timestamp;
use crate::traits::{PowerSensor, RawReading};

/// Startup and runtime health of the sensor interface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorHealth {
    /// True when calibration derived cleanly and was written to the sensor
    pub calibrated: bool,
    /// The derivation failure, if any
    pub calibration_error: Option<CalibrationError>,
    /// Count of read faults masked by last-known-good substitution
    pub read_faults: u32,
}

/// Wraps a [`PowerSensor`] with calibration and last-known-good fallback
pub struct SensorReader<S: PowerSensor> {
    sensor: S,
    calibration: DerivedCalibration,
    last_good: Option<RawReading>,
    health: SensorHealth,
}

impl<S: PowerSensor> SensorReader<S> {
    /// Derive calibration from `params`, configure the sensor, keep going
    /// regardless of the outcome
    pub fn new(sensor: S, params: CalibrationParams) -> Self {
        let mut health = SensorHealth::default();

        let calibration = match params.derive() {
            Ok(cal) => {
                health.calibrated = true;
                cal
            }
            Err(err) => {
                health.calibration_error = Some(err);
                DerivedCalibration::unconfigured(params)
            }
        };

        let mut reader = Self {
            sensor,
            calibration,
            last_good: None,
            health,
        };

        if reader.health.calibrated && reader.sensor.configure(&reader.calibration).is_err() {
            // The derivation was fine but the register write failed; the
            // sensor is running on power-on defaults.
            reader.health.calibrated = false;
        }

        reader
    }

    /// The scale factors in effect
    pub fn calibration(&self) -> &DerivedCalibration {
        &self.calibration
    }

    /// Current health flags
    pub fn health(&self) -> &SensorHealth {
        &self.health
    }

    /// Mutable access to the underlying driver, for harnesses
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Acquire one sample, never failing
    ///
    /// On a read fault the previous good values come back marked stale;
    /// before any good read an all-zero stale sample is returned.
    pub fn sample(&mut self, now: Timestamp) -> TelemetrySample {
        let (raw, stale) = match self.sensor.read() {
            Ok(raw) => {
                self.last_good = Some(raw);
                (raw, false)
            }
            Err(_) => {
                self.health.read_faults = self.health.read_faults.saturating_add(1);
                (self.last_good.unwrap_or_default(), true)
            }
        };

        TelemetrySample {
            timestamp_ms: now,
            bus_voltage_v: self.calibration.apply_bus_voltage(raw.bus_voltage_v),
            shunt_voltage_mv: raw.shunt_voltage_mv,
            current_ma: raw.current_ma,
            power_mw: raw.power_mw,
            stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SensorFault;

    /// Scripted sensor: a list of read outcomes played back in order
    struct ScriptedSensor {
        script: std::vec::Vec<Result<RawReading, SensorFault>>,
        next: usize,
        configured: bool,
    }

    impl ScriptedSensor {
        fn new(script: std::vec::Vec<Result<RawReading, SensorFault>>) -> Self {
            Self {
                script,
                next: 0,
                configured: false,
            }
        }
    }

    impl PowerSensor for ScriptedSensor {
        fn configure(&mut self, _: &DerivedCalibration) -> Result<(), SensorFault> {
            self.configured = true;
            Ok(())
        }

        fn read(&mut self) -> Result<RawReading, SensorFault> {
            let out = self.script[self.next % self.script.len()];
            self.next += 1;
            out
        }
    }

    fn reading(bus_v: f32) -> RawReading {
        RawReading {
            bus_voltage_v: bus_v,
            shunt_voltage_mv: 1.5,
            current_ma: 350.0,
            power_mw: bus_v * 350.0,
        }
    }

    #[test]
    fn good_reads_are_calibrated_and_finite() {
        let sensor = ScriptedSensor::new(vec![Ok(reading(12.0))]);
        let params = CalibrationParams {
            bus_multiplier: 1.05,
            bus_offset: -0.1,
            ..CalibrationParams::default()
        };
        let mut reader = SensorReader::new(sensor, params);

        assert!(reader.health().calibrated);

        let sample = reader.sample(1000);
        assert!(!sample.stale);
        assert_eq!(sample.bus_voltage_v, 12.0 * 1.05 - 0.1);
        assert!(sample.bus_voltage_v.is_finite());
        assert!(sample.current_ma.is_finite());
        assert!(sample.power_mw.is_finite());
    }

    #[test]
    fn read_fault_returns_last_good_marked_stale() {
        let sensor = ScriptedSensor::new(vec![
            Ok(reading(12.0)),
            Err(SensorFault::Bus),
            Ok(reading(11.5)),
        ]);
        let mut reader = SensorReader::new(sensor, CalibrationParams::default());

        let first = reader.sample(0);
        assert!(!first.stale);

        let masked = reader.sample(10);
        assert!(masked.stale);
        assert_eq!(masked.bus_voltage_v, first.bus_voltage_v);
        assert_eq!(masked.timestamp_ms, 10);
        assert_eq!(reader.health().read_faults, 1);

        let recovered = reader.sample(20);
        assert!(!recovered.stale);
        assert_eq!(recovered.bus_voltage_v, 11.5);
    }

    #[test]
    fn fault_before_first_good_read_is_zeroed_and_stale() {
        let sensor = ScriptedSensor::new(vec![Err(SensorFault::NotResponding)]);
        let mut reader = SensorReader::new(sensor, CalibrationParams::default());

        let sample = reader.sample(5);
        assert!(sample.stale);
        assert_eq!(sample.bus_voltage_v, 0.0);
        assert_eq!(sample.current_ma, 0.0);
    }

    #[test]
    fn bad_calibration_becomes_health_flag() {
        let sensor = ScriptedSensor::new(vec![Ok(reading(12.0))]);
        let params = CalibrationParams {
            shunt_ohms: 1.0, // 20 V drop over an 81.92 mV front end
            ..CalibrationParams::default()
        };
        let mut reader = SensorReader::new(sensor, params);

        assert!(!reader.health().calibrated);
        assert!(matches!(
            reader.health().calibration_error,
            Some(CalibrationError::ShuntRangeExceeded { .. })
        ));

        // The loop keeps running; bus correction still applies
        let sample = reader.sample(0);
        assert!(!sample.stale);
        assert_eq!(sample.bus_voltage_v, 12.0);
    }
}
