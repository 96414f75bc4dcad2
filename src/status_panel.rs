//! Status bar: read-only printer status plus the quick control.

use crate::adjust::Quantity;
use crate::quick::QuickControl;
use crate::services::Services;
use crate::session::SessionTargets;
use crate::status::PrinterStatus;
use crate::telemetry::StatusSubscription;

use std::sync::Arc;
use std::time::Duration;

/// Mirrors the latest printer status and hosts the quick control.
pub struct StatusPanel {
    subscription: Option<StatusSubscription>,
    status: Option<PrinterStatus>,
    session: Arc<SessionTargets>,
    quick: QuickControl,
}

impl StatusPanel {
    pub fn new(services: &Services) -> Self {
        Self {
            subscription: Some(services.feed.subscribe()),
            status: None,
            session: services.session.clone(),
            quick: QuickControl::new(services),
        }
    }

    /// The last snapshot received, if any.
    pub fn status(&self) -> Option<&PrinterStatus> {
        self.status.as_ref()
    }

    /// Take in snapshots received since the last call.
    pub fn pump(&mut self) {
        if let Some(latest) = self.subscription.as_ref().and_then(|s| s.drain().last()) {
            self.status = Some(latest);
        }
    }

    /// Feed rate to display: the last one committed from any screen.
    pub fn feed_rate(&self) -> i32 {
        self.session.feed_rate()
    }

    /// Flow rate to display: the last one committed from any screen.
    pub fn flow_rate(&self) -> i32 {
        self.session.flow_rate()
    }

    pub fn quick(&self) -> &QuickControl {
        &self.quick
    }

    pub fn quick_mut(&mut self) -> &mut QuickControl {
        &mut self.quick
    }

    /// Open the quick control on `quantity`.
    pub fn open_quick_control(&mut self, quantity: Quantity) {
        self.quick.open(quantity);
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.quick.advance(elapsed);
    }

    /// Unsubscribe and reset the quick control.
    pub fn teardown(&mut self) {
        self.subscription = None;
        self.status = None;
        self.quick.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockServices;
    use crate::status::{PrinterState, TemperatureReading};
    use crate::PrintControl;

    #[test]
    fn mirrors_latest_snapshot() {
        let mock = MockServices::new();
        let mut panel = StatusPanel::new(&mock.services());
        panel.pump();
        assert!(panel.status().is_none());

        for set in [190, 200, 215] {
            mock.feed.publish(PrinterStatus {
                state: PrinterState::Printing,
                tool0: TemperatureReading { current: 180.0, set },
                ..Default::default()
            });
        }
        panel.pump();
        assert_eq!(panel.status().map(|s| s.tool0.set), Some(215));

        panel.pump();
        assert_eq!(panel.status().map(|s| s.tool0.set), Some(215));
    }

    #[test]
    fn quick_rate_survives_into_overlay() {
        let mock = MockServices::new();
        let mut panel = StatusPanel::new(&mock.services());

        panel.open_quick_control(Quantity::Feedrate);
        panel.quick_mut().adjust(-30);
        panel.quick_mut().confirm();
        assert_eq!(panel.feed_rate(), 70);
        panel.teardown();

        let overlay = PrintControl::new(&mock.services());
        assert_eq!(overlay.target(Quantity::Feedrate), 70);
        assert_eq!(StatusPanel::new(&mock.services()).feed_rate(), 70);
    }

    #[test]
    fn teardown_detaches_from_feed() {
        let mock = MockServices::new();
        let mut panel = StatusPanel::new(&mock.services());
        panel.teardown();
        mock.feed.publish(PrinterStatus::default());
        assert_eq!(mock.feed.subscriber_count(), 0);
    }
}
