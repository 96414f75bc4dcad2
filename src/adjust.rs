//! Clamped adjustment model.
//!
//! Pure value logic: targets are changed in steps and clamped, and only
//! leave this module when a screen commits them.

use crate::config::ConfigProvider;
use crate::services::PrinterCommands;
use crate::session::SessionTargets;

/// An adjustable printer target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Hotend target temperature (°C).
    Hotend,
    /// Heatbed target temperature (°C).
    Heatbed,
    /// Feed rate multiplier (%).
    Feedrate,
    /// Flow rate multiplier (%).
    Flowrate,
    /// Part-cooling fan speed (%).
    Fan,
}

impl Quantity {
    /// Every quantity, in display order.
    pub const ALL: [Quantity; 5] = [
        Quantity::Hotend,
        Quantity::Heatbed,
        Quantity::Feedrate,
        Quantity::Flowrate,
        Quantity::Fan,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Send `value` to the printer as this quantity's new target.
    pub fn commit(self, value: i32, printer: &dyn PrinterCommands) {
        match self {
            Quantity::Hotend => printer.set_hotend_temperature(value),
            Quantity::Heatbed => printer.set_bed_temperature(value),
            Quantity::Feedrate => printer.set_feedrate(value),
            Quantity::Flowrate => printer.set_flowrate(value),
            Quantity::Fan => printer.set_fan_speed(value),
        }
    }
}

// =============================================================================
// Limits
// =============================================================================

/// Falls back to a default instead of clamping when a sum drops below `below`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSentinel {
    pub below: i32,
    pub default: i32,
}

/// Bounds of an adjustable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: i32,
    pub max: i32,
    pub reset: Option<ResetSentinel>,
}

impl Limits {
    /// Plain clamp into `[min, max]`.
    pub const fn clamp(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            reset: None,
        }
    }

    /// Limits used by the print-control overlay. No reset sentinel.
    pub fn overlay(quantity: Quantity) -> Self {
        match quantity {
            Quantity::Hotend => Self::clamp(0, 260),
            // The quick control caps the bed at 80; the overlay allows 100.
            Quantity::Heatbed => Self::clamp(0, 100),
            Quantity::Feedrate | Quantity::Flowrate => Self::clamp(10, 250),
            Quantity::Fan => Self::clamp(0, 100),
        }
    }

    /// Limits used by the quick control, resetting to `default` on a large
    /// negative step.
    pub fn quick(quantity: Quantity, default: i32) -> Self {
        let (min, max, below) = match quantity {
            Quantity::Hotend => (0, 260, -999),
            Quantity::Heatbed => (0, 80, -999),
            Quantity::Feedrate | Quantity::Flowrate => (10, 250, -989),
            Quantity::Fan => (0, 100, -999),
        };
        Self {
            min,
            max,
            reset: Some(ResetSentinel { below, default }),
        }
    }
}

/// Apply `delta` to `current` under `limits`.
///
/// ```
/// use printdash_core::adjust::{apply_delta, Limits, Quantity};
///
/// let limits = Limits::quick(Quantity::Hotend, 200);
/// assert_eq!(apply_delta(250, 50, limits), 260);
/// assert_eq!(apply_delta(20, -50, limits), 0);
/// assert_eq!(apply_delta(20, -1020, limits), 200);
/// ```
pub fn apply_delta(current: i32, delta: i32, limits: Limits) -> i32 {
    let sum = current.saturating_add(delta);
    match limits.reset {
        Some(sentinel) if sum < sentinel.below => sentinel.default,
        _ => sum.clamp(limits.min, limits.max),
    }
}

// =============================================================================
// Adjustment Set
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Adjustment {
    value: i32,
    limits: Limits,
}

/// One adjustable value per [`Quantity`], each with its own limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentSet {
    entries: [Adjustment; 5],
}

impl AdjustmentSet {
    fn build(mut seed: impl FnMut(Quantity) -> (i32, Limits)) -> Self {
        let entries = Quantity::ALL.map(|quantity| {
            let (value, limits) = seed(quantity);
            Adjustment { value, limits }
        });
        Self { entries }
    }

    /// Values for the print-control overlay.
    ///
    /// Temperatures and fan start at zero until telemetry is snapshotted;
    /// feed and flow continue from the session.
    pub fn overlay(session: &SessionTargets) -> Self {
        Self::build(|quantity| {
            let value = match quantity {
                Quantity::Feedrate => session.feed_rate(),
                Quantity::Flowrate => session.flow_rate(),
                _ => 0,
            };
            (value, Limits::overlay(quantity))
        })
    }

    /// Values for the quick control, seeded from configured defaults.
    pub fn quick(config: &dyn ConfigProvider) -> Self {
        Self::build(|quantity| {
            let default = config.default_for(quantity);
            (default, Limits::quick(quantity, default))
        })
    }

    pub fn get(&self, quantity: Quantity) -> i32 {
        self.entries[quantity.index()].value
    }

    /// Overwrite a value as-is, e.g. with a set-point read from telemetry.
    pub fn seed(&mut self, quantity: Quantity, value: i32) {
        self.entries[quantity.index()].value = value;
    }

    /// Step a value and return the result.
    pub fn apply(&mut self, quantity: Quantity, delta: i32) -> i32 {
        let entry = &mut self.entries[quantity.index()];
        entry.value = apply_delta(entry.value, delta, entry.limits);
        entry.value
    }
}

// =============================================================================
// Z Offset
// =============================================================================

/// Accumulated babystep offset, kept at two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZOffset {
    value: f64,
}

impl ZOffset {
    /// Accumulate `delta` and return the new offset.
    ///
    /// Halfway cases round toward positive infinity, so `-0.005` from zero
    /// lands on `0.0` rather than `-0.01`.
    pub fn apply(&mut self, delta: f64) -> f64 {
        self.value = ((self.value + delta) * 100.0 + 0.5).floor() / 100.0;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Forget the accumulated offset once it has been persisted.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Magnitude with two decimals, e.g. `"0.05"`.
    pub fn display(&self) -> String {
        format!("{:.2}", self.value.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelConfig;

    const STEPS: [i32; 10] = [1, 5, 10, -1, -5, -10, 50, -50, 300, -300];

    #[test]
    fn clamped_values_stay_in_bounds() {
        for quantity in Quantity::ALL {
            let limits = Limits::overlay(quantity);
            let mut value = limits.min;
            for _ in 0..20 {
                for step in STEPS {
                    value = apply_delta(value, step, limits);
                    assert!(
                        (limits.min..=limits.max).contains(&value),
                        "{quantity:?} escaped its limits: {value}"
                    );
                }
            }
        }
    }

    #[test]
    fn overlay_limits_clamp_huge_negative_steps() {
        assert_eq!(apply_delta(150, -5000, Limits::overlay(Quantity::Hotend)), 0);
        assert_eq!(apply_delta(150, -5000, Limits::overlay(Quantity::Feedrate)), 10);
    }

    #[test]
    fn quick_limits_reset_below_sentinel() {
        let feed = Limits::quick(Quantity::Feedrate, 100);
        // -989 itself still clamps.
        assert_eq!(apply_delta(11, -1000, feed), 10);
        assert_eq!(apply_delta(10, -1000, feed), 100);

        let bed = Limits::quick(Quantity::Heatbed, 60);
        assert_eq!(apply_delta(60, 100, bed), 80);
        assert_eq!(apply_delta(0, -1000, bed), 60);
    }

    #[test]
    fn bed_limits_differ_between_overlay_and_quick() {
        assert_eq!(Limits::overlay(Quantity::Heatbed).max, 100);
        assert_eq!(Limits::quick(Quantity::Heatbed, 60).max, 80);
    }

    #[test]
    fn overlay_set_continues_from_session() {
        let session = SessionTargets::with_rates(80, 120);
        let set = AdjustmentSet::overlay(&session);
        assert_eq!(set.get(Quantity::Feedrate), 80);
        assert_eq!(set.get(Quantity::Flowrate), 120);
        assert_eq!(set.get(Quantity::Hotend), 0);
    }

    #[test]
    fn quick_set_seeds_from_config() {
        let config = PanelConfig::default();
        let mut set = AdjustmentSet::quick(&config);
        assert_eq!(set.get(Quantity::Hotend), 200);
        assert_eq!(set.apply(Quantity::Hotend, 100), 260);
        assert_eq!(set.apply(Quantity::Hotend, -2000), 200);
    }

    #[test]
    fn z_offset_rounds_to_two_decimals() {
        let mut z = ZOffset::default();
        assert_eq!(z.apply(0.005), 0.01);
        assert_eq!(z.apply(0.005), 0.02);
        assert_eq!(z.apply(0.005), 0.03);
        assert_eq!(z.display(), "0.03");
    }

    #[test]
    fn z_offset_rounds_half_steps_up() {
        let mut z = ZOffset::default();
        assert_eq!(z.apply(-0.005), 0.0);
        assert_eq!(z.apply(-0.015), -0.01);
        assert_eq!(z.display(), "0.01");
    }

    #[test]
    fn z_offset_display_drops_sign() {
        let mut z = ZOffset::default();
        z.apply(-0.05);
        z.apply(-0.05);
        assert_eq!(z.value(), -0.1);
        assert_eq!(z.display(), "0.10");

        z.reset();
        assert_eq!(z.display(), "0.00");
    }
}
