//! Low-voltage alert state machine
//!
//! Two phases, one transition rule each:
//!
//! - **Quiescent**: calibrated bus voltage at or above the threshold. The
//!   indicator pair is held low.
//! - **Blinking**: bus voltage below the threshold. The indicator flips
//!   every [`AlertConfig::toggle_interval_ms`] of wall-clock elapsed time,
//!   independent of the sampling cadence.
//!
//! A single sample crossing switches phase in either direction - there is
//! no hysteresis band, so a rail sitting exactly on the threshold may
//! oscillate; that is accepted. The upward crossing resets the output low
//! immediately (transition, not latched).

use crate::time::Timestamp;

/// Default safety threshold in volts
pub const DEFAULT_VOLT_THRESHOLD: f32 = 15.5;

/// Default indicator toggle interval in milliseconds
pub const DEFAULT_TOGGLE_INTERVAL_MS: u64 = 200;

/// Alert thresholds, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertConfig {
    /// Bus voltage below which the alert blinks, in volts
    pub volt_threshold: f32,
    /// Wall-clock interval between indicator flips, in milliseconds
    pub toggle_interval_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            volt_threshold: DEFAULT_VOLT_THRESHOLD,
            toggle_interval_ms: DEFAULT_TOGGLE_INTERVAL_MS,
        }
    }
}

/// Which side of the threshold the controller last saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertPhase {
    /// Voltage at or above threshold; outputs held low
    Quiescent,
    /// Voltage below threshold; outputs toggling
    Blinking,
}

/// Periodic-toggle alert controller
#[derive(Debug, Clone)]
pub struct AlertController {
    config: AlertConfig,
    phase: AlertPhase,
    last_toggle: Timestamp,
    level: bool,
}

impl AlertController {
    /// Create a controller in the quiescent phase
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            phase: AlertPhase::Quiescent,
            last_toggle: 0,
            level: false,
        }
    }

    /// Evaluate one calibrated sample; returns the indicator level to drive
    pub fn evaluate(&mut self, bus_voltage_v: f32, now: Timestamp) -> bool {
        if bus_voltage_v < self.config.volt_threshold {
            if self.phase == AlertPhase::Quiescent {
                self.phase = AlertPhase::Blinking;
                // First flip happens one full interval after the crossing
                self.last_toggle = now;
            }
            if now.saturating_sub(self.last_toggle) >= self.config.toggle_interval_ms {
                self.last_toggle = now;
                self.level = !self.level;
            }
        } else {
            self.phase = AlertPhase::Quiescent;
            self.level = false;
        }

        self.level
    }

    /// Current phase
    pub fn phase(&self) -> AlertPhase {
        self.phase
    }

    /// Current indicator level
    pub fn level(&self) -> bool {
        self.level
    }
}
