//! Property tests for the pure pieces of the core

use proptest::prelude::*;

use voltwatch_core::alert::{AlertConfig, AlertController};
use voltwatch_core::apply_bus_voltage;

proptest! {
    /// The bus-voltage correction is the exact affine transform, no clamping
    #[test]
    fn affine_transform_is_exact(
        raw in -1000.0f32..1000.0,
        multiplier in -10.0f32..10.0,
        offset in -100.0f32..100.0,
    ) {
        prop_assert_eq!(apply_bus_voltage(raw, multiplier, offset), raw * multiplier + offset);
    }

    /// Applying an identity calibration changes nothing
    #[test]
    fn identity_calibration_is_identity(raw in -1000.0f32..1000.0) {
        prop_assert_eq!(apply_bus_voltage(raw, 1.0, 0.0), raw);
    }

    /// While below threshold, toggle count tracks elapsed time / interval
    #[test]
    fn toggle_count_tracks_elapsed(
        below_ms in 1000u64..20_000,
        cadence_ms in 1u64..50,
    ) {
        let interval = AlertConfig::default().toggle_interval_ms;
        let mut alert = AlertController::new(AlertConfig::default());

        let mut toggles = 0u64;
        let mut last = alert.evaluate(10.0, 0);
        let mut t = cadence_ms;
        while t <= below_ms {
            let level = alert.evaluate(10.0, t);
            if level != last {
                toggles += 1;
                last = level;
            }
            t += cadence_ms;
        }

        // Each flip lands on the first sample at or after the interval, so
        // the effective period is the interval rounded up to the cadence
        let period = interval.div_ceil(cadence_ms) * cadence_ms;
        let expected = below_ms / period;
        prop_assert!(toggles <= below_ms / interval + 1);
        prop_assert!(toggles + 1 >= expected);
    }

    /// Above threshold the output is always low, whatever came before
    #[test]
    fn quiescent_output_is_low(
        voltages in prop::collection::vec(0.0f32..30.0, 1..200),
    ) {
        let threshold = AlertConfig::default().volt_threshold;
        let mut alert = AlertController::new(AlertConfig::default());

        for (i, v) in voltages.iter().enumerate() {
            let level = alert.evaluate(*v, i as u64 * 10);
            if *v >= threshold {
                prop_assert!(!level);
            }
        }
    }
}
