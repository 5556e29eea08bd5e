//! Telemetry samples and the fixed-format text record
//!
//! One record per sample, comma-separated:
//!
//! ```text
//! HH:MM:SS,<busVoltage:3dp>,<shuntVoltage_mV:3dp>,<current_mA:3dp>,<power_mW:3dp>
//! ```
//!
//! The timestamp is uptime formatted as zero-padded hours:minutes:seconds.
//! Minutes and seconds roll over modulo 60; the hour field is not bounded
//! and simply widens past 99 (known limitation, kept for client
//! compatibility). The same bytes go to the console log and, verbatim, to
//! the notification channel.

use core::fmt::Write;

use crate::time::Timestamp;

/// Capacity of a formatted record
///
/// Worst case: unbounded hours plus four signed fields at 3 decimals.
pub const RECORD_CAPACITY: usize = 96;

/// A formatted telemetry record, ready for console and notification
pub type Record = heapless::String<RECORD_CAPACITY>;

/// One sampling tick's worth of measurements
///
/// Created fresh each tick and not retained after transmission; the only
/// copy kept anywhere is the reader's last-known-good fallback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetrySample {
    /// Milliseconds since boot at acquisition time
    pub timestamp_ms: Timestamp,
    /// Bus voltage in volts, after the affine correction
    pub bus_voltage_v: f32,
    /// Shunt voltage in millivolts
    pub shunt_voltage_mv: f32,
    /// Current in milliamperes
    pub current_ma: f32,
    /// Power in milliwatts
    pub power_mw: f32,
    /// True when the read faulted and these are the last good values
    pub stale: bool,
}

impl TelemetrySample {
    /// Format the record exactly as it goes over the wire
    pub fn record(&self) -> Record {
        let mut out = Record::new();

        let seconds = self.timestamp_ms / 1000;
        let minutes = seconds / 60;
        let hours = minutes / 60;

        // Capacity covers the worst case; a formatting error would only
        // truncate, and there is no channel to report it on anyway.
        let _ = write!(
            out,
            "{:02}:{:02}:{:02},{:.3},{:.3},{:.3},{:.3}",
            hours,
            minutes % 60,
            seconds % 60,
            self.bus_voltage_v,
            self.shunt_voltage_mv,
            self.current_ma,
            self.power_mw,
        );

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_matches_wire_format() {
        let sample = TelemetrySample {
            timestamp_ms: 3_725_000, // 1h 2m 5s
            bus_voltage_v: 12.345,
            shunt_voltage_mv: 1.234,
            current_ma: 567.891,
            power_mw: 7012.345,
            stale: false,
        };

        assert_eq!(sample.record(), "01:02:05,12.345,1.234,567.891,7012.345");
    }

    #[test]
    fn record_zero_pads_uptime() {
        let sample = TelemetrySample {
            timestamp_ms: 0,
            ..TelemetrySample::default()
        };
        assert_eq!(sample.record(), "00:00:00,0.000,0.000,0.000,0.000");
    }

    #[test]
    fn minutes_and_seconds_roll_over() {
        let sample = TelemetrySample {
            timestamp_ms: (59 * 60 + 59) * 1000 + 999,
            ..TelemetrySample::default()
        };
        assert!(sample.record().starts_with("00:59:59,"));

        let sample = TelemetrySample {
            timestamp_ms: 3_600_000,
            ..TelemetrySample::default()
        };
        assert!(sample.record().starts_with("01:00:00,"));
    }

    #[test]
    fn hours_widen_past_two_digits() {
        // 100 hours of uptime: the field grows instead of wrapping
        let sample = TelemetrySample {
            timestamp_ms: 100 * 3_600_000,
            ..TelemetrySample::default()
        };
        assert!(sample.record().starts_with("100:00:00,"));
    }

    #[test]
    fn negative_current_keeps_three_decimals() {
        let sample = TelemetrySample {
            timestamp_ms: 1000,
            bus_voltage_v: 11.9,
            shunt_voltage_mv: -0.5,
            current_ma: -125.25,
            power_mw: 1490.475,
            stale: false,
        };
        assert_eq!(sample.record(), "00:00:01,11.900,-0.500,-125.250,1490.475");
    }
}
