//! One-time calibration verification and manual-calibration guidance
//!
//! An offline aid, not part of the steady-state loop: after startup the
//! harness feeds [`CalibrationCheck`] one sample per iteration until it has
//! averaged [`VERIFY_SAMPLE_COUNT`] readings spaced at least
//! [`VERIFY_SETTLE_MS`] apart. The resulting [`CalibrationReport`] prints
//! human-readable guidance for deriving the bus-voltage multiplier and a
//! corrected shunt value against an external reference meter. There is no
//! machine-parseable contract on this output, and the check is never
//! re-entered at runtime.

use core::fmt;

use crate::telemetry::TelemetrySample;
use crate::time::Timestamp;

/// Number of readings averaged for verification
pub const VERIFY_SAMPLE_COUNT: usize = 10;

/// Minimum spacing between averaged readings, in milliseconds
pub const VERIFY_SETTLE_MS: u64 = 150;

/// Mean current below which shunt calibration guidance is unreliable, in mA
pub const LOW_CURRENT_FLOOR_MA: f32 = 40.0;

/// Accumulates spaced samples until enough are collected
#[derive(Debug, Clone)]
pub struct CalibrationCheck {
    sum_bus_v: f32,
    sum_current_ma: f32,
    taken: usize,
    last_taken_at: Option<Timestamp>,
}

impl CalibrationCheck {
    /// Start an empty check
    pub fn new() -> Self {
        Self {
            sum_bus_v: 0.0,
            sum_current_ma: 0.0,
            taken: 0,
            last_taken_at: None,
        }
    }

    /// Offer one sample; returns the report once enough have been averaged
    ///
    /// Samples closer than [`VERIFY_SETTLE_MS`] to the previous accepted one
    /// are ignored, which reproduces the original settling delay without
    /// blocking the loop. Stale samples are skipped outright.
    pub fn feed(&mut self, sample: &TelemetrySample, now: Timestamp) -> Option<CalibrationReport> {
        if self.is_complete() || sample.stale {
            return None;
        }

        if let Some(last) = self.last_taken_at {
            if now.saturating_sub(last) < VERIFY_SETTLE_MS {
                return None;
            }
        }

        self.sum_bus_v += sample.bus_voltage_v;
        self.sum_current_ma += sample.current_ma;
        self.taken += 1;
        self.last_taken_at = Some(now);

        if self.taken == VERIFY_SAMPLE_COUNT {
            Some(self.report())
        } else {
            None
        }
    }

    /// True once the report has been produced
    pub fn is_complete(&self) -> bool {
        self.taken >= VERIFY_SAMPLE_COUNT
    }

    fn report(&self) -> CalibrationReport {
        CalibrationReport {
            mean_bus_v: self.sum_bus_v / self.taken as f32,
            mean_current_ma: self.sum_current_ma / self.taken as f32,
            samples: self.taken,
        }
    }
}

impl Default for CalibrationCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// Averaged verification readings plus derivation helpers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    /// Mean calibrated bus voltage over the verification window, in volts
    pub mean_bus_v: f32,
    /// Mean current over the verification window, in mA
    pub mean_current_ma: f32,
    /// Number of readings averaged
    pub samples: usize,
}

impl CalibrationReport {
    /// Bus multiplier that would make the mean match a reference meter
    pub fn suggested_bus_multiplier(&self, reference_v: f32) -> f32 {
        reference_v / self.mean_bus_v
    }

    /// Corrected shunt value from a reference current measurement
    pub fn suggested_shunt(&self, current_shunt_ohms: f32, reference_ma: f32) -> f32 {
        current_shunt_ohms * self.mean_current_ma / reference_ma
    }

    /// True when the load was too light for trustworthy shunt guidance
    pub fn low_current_warning(&self) -> bool {
        self.mean_current_ma < LOW_CURRENT_FLOOR_MA
    }
}

impl fmt::Display for CalibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "calibration verification ({} readings)", self.samples)?;
        writeln!(f, "  mean bus voltage: {:.3} V", self.mean_bus_v)?;
        writeln!(f, "  mean current:     {:.3} mA", self.mean_current_ma)?;
        writeln!(f, "manual calibration, if readings disagree with a reference meter:")?;
        writeln!(
            f,
            "  1. shunt: attach a ~50-100 mA load, measure the true current,"
        )?;
        writeln!(
            f,
            "     then new_shunt = shunt * {:.3} / reference_mA",
            self.mean_current_ma
        )?;
        if self.low_current_warning() {
            writeln!(
                f,
                "     warning: mean current below {LOW_CURRENT_FLOOR_MA} mA, use a larger load"
            )?;
        }
        writeln!(
            f,
            "  2. bus voltage: measure the rail, then multiplier = reference_V / {:.3}",
            self.mean_bus_v
        )?;
        write!(
            f,
            "  3. range: raise max_current_a if the measured current can exceed it"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(bus_v: f32, current_ma: f32, at: Timestamp) -> TelemetrySample {
        TelemetrySample {
            timestamp_ms: at,
            bus_voltage_v: bus_v,
            shunt_voltage_mv: 1.0,
            current_ma,
            power_mw: bus_v * current_ma,
            stale: false,
        }
    }

    #[test]
    fn averages_spaced_samples() {
        let mut check = CalibrationCheck::new();
        let mut report = None;
        let mut t = 0;

        // 10 ms loop cadence; only every 15th sample is far enough apart
        let mut fed = 0;
        while report.is_none() {
            let s = sample(12.0, 100.0, t);
            report = check.feed(&s, t);
            t += 10;
            fed += 1;
            assert!(fed < 1000, "report never produced");
        }

        let report = report.unwrap();
        assert_eq!(report.samples, VERIFY_SAMPLE_COUNT);
        assert!((report.mean_bus_v - 12.0).abs() < 1e-5);
        assert!((report.mean_current_ma - 100.0).abs() < 1e-3);

        // Complete checks ignore further samples
        assert!(check.is_complete());
        assert_eq!(check.feed(&sample(5.0, 5.0, t), t), None);
    }

    #[test]
    fn respects_settling_spacing() {
        let mut check = CalibrationCheck::new();
        assert_eq!(check.feed(&sample(12.0, 100.0, 0), 0), None);

        // Too close: ignored, not averaged
        assert_eq!(check.feed(&sample(99.0, 999.0, 10), 10), None);
        assert_eq!(check.feed(&sample(99.0, 999.0, VERIFY_SETTLE_MS - 1), VERIFY_SETTLE_MS - 1), None);

        // Far enough: accepted
        let mut t = VERIFY_SETTLE_MS;
        for _ in 1..VERIFY_SAMPLE_COUNT - 1 {
            assert_eq!(check.feed(&sample(12.0, 100.0, t), t), None);
            t += VERIFY_SETTLE_MS;
        }
        let report = check.feed(&sample(12.0, 100.0, t), t).unwrap();

        // The out-of-spacing 99 V samples never made it into the mean
        assert!((report.mean_bus_v - 12.0).abs() < 1e-5);
    }

    #[test]
    fn stale_samples_are_skipped() {
        let mut check = CalibrationCheck::new();
        let mut s = sample(12.0, 100.0, 0);
        s.stale = true;
        assert_eq!(check.feed(&s, 0), None);
        assert!(!check.is_complete());
    }

    #[test]
    fn report_derivations() {
        let report = CalibrationReport {
            mean_bus_v: 5.0,
            mean_current_ma: 80.0,
            samples: VERIFY_SAMPLE_COUNT,
        };

        // Reference meter says 5.12 V: multiplier scales up
        assert!((report.suggested_bus_multiplier(5.12) - 1.024).abs() < 1e-6);

        // Reference meter says 100 mA while we read 80: shunt shrinks
        let shunt = report.suggested_shunt(0.004, 100.0);
        assert!((shunt - 0.0032).abs() < 1e-7);

        assert!(!report.low_current_warning());
        let light = CalibrationReport {
            mean_current_ma: 12.0,
            ..report
        };
        assert!(light.low_current_warning());
    }

    #[test]
    fn report_prints_guidance() {
        let report = CalibrationReport {
            mean_bus_v: 5.0,
            mean_current_ma: 12.0,
            samples: VERIFY_SAMPLE_COUNT,
        };
        let text = format!("{report}");
        assert!(text.contains("mean bus voltage: 5.000 V"));
        assert!(text.contains("use a larger load"));
    }
}
