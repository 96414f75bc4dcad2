//! Targets carried across screens.

use crate::adjust::Quantity;

use log::debug;
use std::sync::atomic::{AtomicI32, Ordering};

/// Feed and flow rate last committed from any screen.
///
/// One instance lives as long as the application and is handed to every
/// screen through [`Services`](crate::Services). It is never reset, so a value
/// confirmed on the status bar is what the print-control overlay opens with.
#[derive(Debug)]
pub struct SessionTargets {
    feed_rate: AtomicI32,
    flow_rate: AtomicI32,
}

impl SessionTargets {
    /// Both rates start at 100%.
    pub fn new() -> Self {
        Self::with_rates(100, 100)
    }

    /// Create with explicit starting rates.
    pub fn with_rates(feed_rate: i32, flow_rate: i32) -> Self {
        Self {
            feed_rate: AtomicI32::new(feed_rate),
            flow_rate: AtomicI32::new(flow_rate),
        }
    }

    pub fn feed_rate(&self) -> i32 {
        self.feed_rate.load(Ordering::SeqCst)
    }

    pub fn flow_rate(&self) -> i32 {
        self.flow_rate.load(Ordering::SeqCst)
    }

    /// Remember a committed value. Only feed and flow rate are carried over.
    pub fn record(&self, quantity: Quantity, value: i32) {
        let slot = match quantity {
            Quantity::Feedrate => &self.feed_rate,
            Quantity::Flowrate => &self.flow_rate,
            _ => return,
        };
        slot.store(value, Ordering::SeqCst);
        debug!("session {:?} target now {}", quantity, value);
    }
}

impl Default for SessionTargets {
    fn default() -> Self {
        Self::new()
    }
}
