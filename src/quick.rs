//! Quick control: a one-value panel opened from the status bar.

use crate::adjust::{AdjustmentSet, Quantity};
use crate::config::ConfigProvider;
use crate::services::{PrinterCommands, Services};
use crate::session::SessionTargets;
use crate::timer::{TimerId, Timers};

use log::{debug, info, trace};
use std::sync::Arc;
use std::time::Duration;

/// Delay before an opened panel fades in.
pub const REVEAL_DELAY: Duration = Duration::from_millis(50);
/// Time the fade-out takes before the panel is gone.
pub const HIDE_DELAY: Duration = Duration::from_millis(500);

/// Which value the quick control is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuickControlView {
    #[default]
    None,
    Hotend,
    Heatbed,
    Feedrate,
    Flowrate,
    Fan,
}

impl QuickControlView {
    /// The quantity edited in this view.
    pub fn quantity(self) -> Option<Quantity> {
        match self {
            Self::None => None,
            Self::Hotend => Some(Quantity::Hotend),
            Self::Heatbed => Some(Quantity::Heatbed),
            Self::Feedrate => Some(Quantity::Feedrate),
            Self::Flowrate => Some(Quantity::Flowrate),
            Self::Fan => Some(Quantity::Fan),
        }
    }
}

impl From<Quantity> for QuickControlView {
    fn from(quantity: Quantity) -> Self {
        match quantity {
            Quantity::Hotend => Self::Hotend,
            Quantity::Heatbed => Self::Heatbed,
            Quantity::Feedrate => Self::Feedrate,
            Quantity::Flowrate => Self::Flowrate,
            Quantity::Fan => Self::Fan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Reveal,
    Reset,
}

/// Quick-control state machine.
///
/// ```
/// use std::time::Duration;
/// use printdash_core::mock::MockServices;
/// use printdash_core::{Quantity, QuickControl, QuickControlView};
///
/// let mock = MockServices::new();
/// let mut quick = QuickControl::new(&mock.services());
///
/// quick.open(Quantity::Fan);
/// quick.adjust(-25);
/// quick.confirm();
/// quick.advance(Duration::from_millis(500));
///
/// assert_eq!(quick.view(), QuickControlView::None);
/// assert_eq!(quick.target(Quantity::Fan), 75);
/// ```
pub struct QuickControl {
    printer: Arc<dyn PrinterCommands>,
    session: Arc<SessionTargets>,
    config: Arc<dyn ConfigProvider>,
    view: QuickControlView,
    revealed: bool,
    targets: AdjustmentSet,
    timers: Timers<Effect>,
    pending_reveal: Option<TimerId>,
    pending_reset: Option<TimerId>,
}

impl QuickControl {
    pub fn new(services: &Services) -> Self {
        Self {
            printer: services.printer.clone(),
            session: services.session.clone(),
            config: services.config.clone(),
            view: QuickControlView::None,
            revealed: false,
            targets: AdjustmentSet::quick(services.config.as_ref()),
            timers: Timers::new(),
            pending_reveal: None,
            pending_reset: None,
        }
    }

    pub fn view(&self) -> QuickControlView {
        self.view
    }

    /// Whether the panel has faded in.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn target(&self, quantity: Quantity) -> i32 {
        self.targets.get(quantity)
    }

    /// Edit `quantity`, replacing whatever was open.
    pub fn open(&mut self, quantity: Quantity) {
        self.cancel_pending();
        self.view = quantity.into();
        self.pending_reveal = Some(self.timers.schedule(REVEAL_DELAY, Effect::Reveal));
        debug!("quick control opened on {:?}", quantity);
    }

    /// Step the value being edited.
    pub fn adjust(&mut self, delta: i32) {
        let Some(quantity) = self.view.quantity() else {
            trace!("quick adjust ignored: nothing open");
            return;
        };
        let value = self.targets.apply(quantity, delta);
        trace!("quick {quantity:?} target now {value}");
    }

    /// Send the edited value to the printer and close the panel.
    pub fn confirm(&mut self) {
        let Some(quantity) = self.view.quantity() else {
            return;
        };
        let value = self.targets.get(quantity);
        info!("quick control set {:?} to {}", quantity, value);
        quantity.commit(value, self.printer.as_ref());
        self.session.record(quantity, value);
        self.close();
    }

    /// Fade the panel out now and drop back to no view once the fade is over.
    pub fn close(&mut self) {
        self.revealed = false;
        self.cancel_pending();
        self.pending_reset = Some(self.timers.schedule(HIDE_DELAY, Effect::Reset));
    }

    fn cancel_pending(&mut self) {
        for id in [self.pending_reveal.take(), self.pending_reset.take()]
            .into_iter()
            .flatten()
        {
            self.timers.cancel(id);
        }
    }

    /// Let `elapsed` pass and apply due view effects.
    pub fn advance(&mut self, elapsed: Duration) {
        for effect in self.timers.advance(elapsed) {
            match effect {
                Effect::Reveal => {
                    self.pending_reveal = None;
                    self.revealed = true;
                }
                Effect::Reset => {
                    self.pending_reset = None;
                    self.view = QuickControlView::None;
                    self.revealed = false;
                }
            }
        }
    }

    /// Cancel pending effects and return to the initial state.
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.pending_reveal = None;
        self.pending_reset = None;
        self.view = QuickControlView::None;
        self.revealed = false;
        self.targets = AdjustmentSet::quick(self.config.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockServices, PrinterCall};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn open_reveals_after_delay() {
        let mock = MockServices::new();
        let mut quick = QuickControl::new(&mock.services());

        quick.open(Quantity::Hotend);
        assert_eq!(quick.view(), QuickControlView::Hotend);
        assert!(!quick.is_revealed());

        quick.advance(ms(49));
        assert!(!quick.is_revealed());
        quick.advance(ms(1));
        assert!(quick.is_revealed());
    }

    #[test]
    fn close_always_ends_on_none() {
        let mock = MockServices::new();
        for quantity in Quantity::ALL {
            let mut quick = QuickControl::new(&mock.services());
            quick.open(quantity);
            quick.adjust(10);
            quick.close();
            assert!(!quick.is_revealed());
            quick.adjust(-3000);
            quick.advance(HIDE_DELAY);
            assert_eq!(quick.view(), QuickControlView::None);
            assert!(!quick.is_revealed());
        }
    }

    #[test]
    fn close_before_reveal_never_reveals() {
        let mock = MockServices::new();
        let mut quick = QuickControl::new(&mock.services());

        quick.open(Quantity::Fan);
        quick.close();
        quick.advance(ms(100));
        assert!(!quick.is_revealed());
        assert_eq!(quick.view(), QuickControlView::Fan);
    }

    #[test]
    fn adjust_routes_to_open_quantity() {
        let mock = MockServices::new();
        let mut quick = QuickControl::new(&mock.services());

        quick.adjust(5);
        assert_eq!(quick.target(Quantity::Hotend), 200);

        quick.open(Quantity::Heatbed);
        quick.adjust(50);
        assert_eq!(quick.target(Quantity::Heatbed), 80);
        assert_eq!(quick.target(Quantity::Hotend), 200);

        quick.adjust(-2000);
        assert_eq!(quick.target(Quantity::Heatbed), 60);
    }

    #[test]
    fn confirm_commits_and_carries_rates() {
        let mock = MockServices::new();
        let mut quick = QuickControl::new(&mock.services());

        quick.open(Quantity::Flowrate);
        quick.adjust(-15);
        quick.confirm();

        assert_eq!(mock.printer.calls(), vec![PrinterCall::Flowrate(85)]);
        assert_eq!(mock.session.flow_rate(), 85);
        assert!(!quick.is_revealed());
    }

    #[test]
    fn confirm_without_view_does_nothing() {
        let mock = MockServices::new();
        let mut quick = QuickControl::new(&mock.services());
        quick.confirm();
        assert!(mock.printer.calls().is_empty());
    }

    #[test]
    fn reopen_during_fade_keeps_new_view() {
        let mock = MockServices::new();
        let mut quick = QuickControl::new(&mock.services());

        quick.open(Quantity::Fan);
        quick.close();
        quick.advance(ms(200));
        quick.open(Quantity::Hotend);
        quick.advance(ms(400));

        assert_eq!(quick.view(), QuickControlView::Hotend);
        assert!(quick.is_revealed());
    }

    #[test]
    fn teardown_cancels_pending_effects() {
        let mock = MockServices::new();
        let mut quick = QuickControl::new(&mock.services());

        quick.open(Quantity::Feedrate);
        quick.adjust(20);
        quick.teardown();
        quick.advance(ms(1000));

        assert_eq!(quick.view(), QuickControlView::None);
        assert!(!quick.is_revealed());
        assert_eq!(quick.target(Quantity::Feedrate), 100);
    }
}
