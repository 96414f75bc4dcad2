//! Print-control overlay.
//!
//! The overlay sits above the running-print view. A tap opens it on the main
//! panel; from there the user cancels, pauses, adjusts targets or babysteps
//! the z axis. The printer pausing on its own forces the pause panel open
//! once per pause episode.

use crate::adjust::{AdjustmentSet, Quantity, ZOffset};
use crate::services::Services;
use crate::status::PrinterStatus;
use crate::telemetry::StatusSubscription;

use log::{debug, info, trace};

/// G-code for a filament change mid-print.
const FILAMENT_CHANGE_GCODE: &str = "M600";

/// Which panel of the overlay is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Main,
    /// Waiting for the user to confirm a cancel.
    Cancel,
    Pause,
    Adjust,
    Babystep,
}

/// A pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Whether `pointer` falls in the job preview area: the band between 25%
    /// and 75% of the width and 5% and 35% of the height, edges excluded.
    pub fn is_on_preview(&self, pointer: PointerEvent) -> bool {
        let (min_x, max_x) = (self.width * 0.25, self.width * 0.75);
        let (min_y, max_y) = (self.height * 0.05, self.height * 0.35);
        min_x < pointer.x && pointer.x < max_x && min_y < pointer.y && pointer.y < max_y
    }
}

/// What a tap on the print view did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The overlay opened on its main panel.
    Shown,
    /// The tap went to the job preview toggle instead.
    PreviewToggled,
}

/// The print-control overlay view engine.
///
/// ```
/// use printdash_core::mock::{JobCall, MockServices};
/// use printdash_core::{OverlayState, PointerEvent, PrintControl, Viewport};
///
/// let mock = MockServices::new();
/// let mut overlay = PrintControl::new(&mock.services());
/// let viewport = Viewport { width: 800.0, height: 480.0 };
///
/// overlay.show(PointerEvent { x: 10.0, y: 400.0 }, viewport);
/// overlay.cancel_intent();
/// assert_eq!(overlay.state(), Some(OverlayState::Cancel));
///
/// overlay.confirm_cancel();
/// assert_eq!(mock.jobs.calls(), vec![JobCall::Cancel]);
/// assert!(!overlay.is_visible());
/// ```
pub struct PrintControl {
    services: Services,
    subscription: Option<StatusSubscription>,
    visible: bool,
    state: OverlayState,
    showed_pause_screen: bool,
    targets: AdjustmentSet,
    z_offset: ZOffset,
}

impl PrintControl {
    /// Create the overlay, hidden, and subscribe to printer status.
    pub fn new(services: &Services) -> Self {
        Self {
            subscription: Some(services.feed.subscribe()),
            visible: false,
            state: OverlayState::Main,
            showed_pause_screen: false,
            targets: AdjustmentSet::overlay(&services.session),
            z_offset: ZOffset::default(),
            services: services.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The active panel, or `None` while hidden.
    pub fn state(&self) -> Option<OverlayState> {
        self.visible.then_some(self.state)
    }

    /// Current adjustment value for `quantity`.
    pub fn target(&self, quantity: Quantity) -> i32 {
        self.targets.get(quantity)
    }

    pub fn z_offset(&self) -> f64 {
        self.z_offset.value()
    }

    /// Unsigned z offset with two decimals, as shown on the babystep panel.
    pub fn z_offset_display(&self) -> String {
        self.z_offset.display()
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    /// Handle a tap on the print view.
    ///
    /// Outside the preview area this opens the overlay on its main panel and
    /// loads the current set-points. Otherwise the tap toggles the preview.
    pub fn show(&mut self, pointer: PointerEvent, viewport: Viewport) -> ShowOutcome {
        if self.visible || viewport.is_on_preview(pointer) {
            self.services.navigator.toggle_job_preview();
            return ShowOutcome::PreviewToggled;
        }

        self.load_setpoints();
        self.state = OverlayState::Main;
        self.visible = true;
        debug!("overlay shown");
        ShowOutcome::Shown
    }

    pub fn hide(&mut self) {
        if self.visible {
            debug!("overlay hidden from {:?}", self.state);
        }
        self.visible = false;
    }

    fn load_setpoints(&mut self) {
        match self.services.feed.latest() {
            Some(status) => {
                self.targets.seed(Quantity::Hotend, status.tool0.set);
                self.targets.seed(Quantity::Heatbed, status.bed.set);
            }
            None => debug!("no printer status yet, keeping previous set-points"),
        }
    }

    /// Run `f` only while visible.
    fn guarded(&mut self, op: &str, f: impl FnOnce(&mut Self)) {
        if self.visible {
            f(self);
        } else {
            trace!("{op} ignored: overlay hidden");
        }
    }

    /// Run `f` only while visible on `state`.
    fn guarded_in(&mut self, state: OverlayState, op: &str, f: impl FnOnce(&mut Self)) {
        if self.visible && self.state == state {
            f(self);
        } else {
            trace!("{op} ignored: overlay not on {state:?}");
        }
    }

    // -------------------------------------------------------------------------
    // Panel transitions
    // -------------------------------------------------------------------------

    /// Ask for a cancel confirmation.
    pub fn cancel_intent(&mut self) {
        self.guarded("cancel", |this| this.state = OverlayState::Cancel);
    }

    /// Cancel the job after [`cancel_intent`](Self::cancel_intent).
    pub fn confirm_cancel(&mut self) {
        self.guarded_in(OverlayState::Cancel, "confirm cancel", |this| {
            info!("cancelling print job");
            this.services.jobs.cancel();
            this.hide();
        });
    }

    /// Pause the job right away and show the pause panel.
    pub fn pause_intent(&mut self) {
        self.guarded("pause", |this| {
            info!("pausing print job");
            this.services.jobs.pause();
            this.state = OverlayState::Pause;
        });
    }

    pub fn resume(&mut self) {
        self.guarded_in(OverlayState::Pause, "resume", |this| {
            info!("resuming print job");
            this.services.jobs.resume();
            this.hide();
        });
    }

    pub fn restart(&mut self) {
        self.guarded_in(OverlayState::Pause, "restart", |this| {
            info!("restarting print job");
            this.services.jobs.restart();
            this.hide();
        });
    }

    /// Start a filament change on the paused printer.
    pub fn change_filament(&mut self) {
        self.guarded_in(OverlayState::Pause, "change filament", |this| {
            info!("requesting filament change");
            this.services.printer.execute_gcode(FILAMENT_CHANGE_GCODE);
            this.hide();
        });
    }

    /// Open the adjust panel. Leaving the babystep panel persists the offset.
    pub fn enter_adjust(&mut self) {
        self.guarded("adjust", |this| {
            if this.state == OverlayState::Babystep {
                debug!("leaving babystep, persisting offsets");
                this.services.printer.persist_offsets();
            }
            this.state = OverlayState::Adjust;
        });
    }

    pub fn enter_babystep(&mut self) {
        self.guarded("babystep", |this| this.state = OverlayState::Babystep);
    }

    /// Return to the main panel from the adjust, babystep or cancel panel.
    pub fn back(&mut self) {
        self.guarded("back", |this| {
            if matches!(
                this.state,
                OverlayState::Adjust | OverlayState::Babystep | OverlayState::Cancel
            ) {
                this.state = OverlayState::Main;
            }
        });
    }

    // -------------------------------------------------------------------------
    // Telemetry
    // -------------------------------------------------------------------------

    /// React to the printer entering or leaving the paused state.
    ///
    /// The pause panel is forced open once per pause episode. When the pause
    /// ends the flag re-arms and a still-open overlay is closed.
    pub fn printer_paused_changed(&mut self, is_paused: bool) {
        if is_paused {
            if !self.showed_pause_screen {
                info!("printer paused, showing pause panel");
                self.state = OverlayState::Pause;
                self.visible = true;
                self.showed_pause_screen = true;
            }
        } else {
            if self.showed_pause_screen && self.visible {
                debug!("printer no longer paused, closing overlay");
                self.visible = false;
            }
            self.showed_pause_screen = false;
        }
    }

    pub fn on_status(&mut self, status: &PrinterStatus) {
        self.printer_paused_changed(status.is_paused());
    }

    /// Apply every status snapshot received since the last call.
    pub fn pump(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        for status in subscription.drain() {
            self.on_status(&status);
        }
        self.subscription = Some(subscription);
    }

    // -------------------------------------------------------------------------
    // Adjust panel
    // -------------------------------------------------------------------------

    /// Step an adjustment value.
    pub fn adjust(&mut self, quantity: Quantity, delta: i32) {
        self.guarded("adjust value", |this| {
            let value = this.targets.apply(quantity, delta);
            trace!("{quantity:?} target now {value}");
        });
    }

    /// Send temperatures and rates to the printer and close the overlay.
    ///
    /// The fan value is adjustable here but only the quick control sends it.
    pub fn confirm_adjust(&mut self) {
        self.guarded("confirm adjust", |this| {
            let printer = this.services.printer.as_ref();
            for quantity in [
                Quantity::Hotend,
                Quantity::Heatbed,
                Quantity::Feedrate,
                Quantity::Flowrate,
            ] {
                let value = this.targets.get(quantity);
                quantity.commit(value, printer);
                this.services.session.record(quantity, value);
            }
            info!(
                "adjusted: hotend={}, bed={}, feed={}%, flow={}%",
                this.targets.get(Quantity::Hotend),
                this.targets.get(Quantity::Heatbed),
                this.targets.get(Quantity::Feedrate),
                this.targets.get(Quantity::Flowrate)
            );
            this.hide();
        });
    }

    /// Drop the feed rate to 10%.
    pub fn slow_feedrate(&self) {
        self.services.printer.set_feedrate(10);
    }

    /// Restore the feed rate to 100%.
    pub fn normal_feedrate(&self) {
        self.services.printer.set_feedrate(100);
    }

    // -------------------------------------------------------------------------
    // Babystep panel
    // -------------------------------------------------------------------------

    /// Move the nozzle by `delta` mm on z right away and track the total.
    pub fn babystep_z(&mut self, delta: f64) {
        self.guarded("babystep z", |this| {
            let total = this.z_offset.apply(delta);
            let gcode = format!("{}{}", this.services.config.z_babystep_gcode(), delta);
            debug!("babystep {delta}, offset now {total}");
            this.services.printer.execute_gcode(&gcode);
        });
    }

    /// Persist the offset and start counting from zero.
    pub fn save_offset(&mut self) {
        self.guarded("save offset", |this| {
            info!("saving z offset {}", this.z_offset.value());
            this.services.printer.persist_offsets();
            this.z_offset.reset();
        });
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Unsubscribe and return to the initial state.
    pub fn teardown(&mut self) {
        self.subscription = None;
        self.visible = false;
        self.state = OverlayState::Main;
        self.showed_pause_screen = false;
        self.targets = AdjustmentSet::overlay(&self.services.session);
        self.z_offset = ZOffset::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{JobCall, MockServices, NavigatorCall, PrinterCall};
    use crate::status::{PrinterState, TemperatureReading};

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 480.0,
    };
    const OUTSIDE: PointerEvent = PointerEvent { x: 400.0, y: 300.0 };
    const ON_PREVIEW: PointerEvent = PointerEvent { x: 400.0, y: 100.0 };

    fn status(state: PrinterState) -> PrinterStatus {
        PrinterStatus {
            state,
            tool0: TemperatureReading {
                current: 209.5,
                set: 210,
            },
            bed: TemperatureReading {
                current: 59.8,
                set: 60,
            },
            fan_speed: 100,
        }
    }

    fn shown(mock: &MockServices) -> PrintControl {
        let mut overlay = PrintControl::new(&mock.services());
        assert_eq!(overlay.show(OUTSIDE, VIEWPORT), ShowOutcome::Shown);
        overlay
    }

    #[test]
    fn preview_area_edges_are_excluded() {
        assert!(VIEWPORT.is_on_preview(ON_PREVIEW));
        assert!(!VIEWPORT.is_on_preview(PointerEvent { x: 200.0, y: 100.0 }));
        assert!(!VIEWPORT.is_on_preview(PointerEvent { x: 400.0, y: 24.0 }));
        assert!(!VIEWPORT.is_on_preview(PointerEvent { x: 600.0, y: 100.0 }));
    }

    #[test]
    fn tap_on_preview_stays_hidden() {
        let mock = MockServices::new();
        let mut overlay = PrintControl::new(&mock.services());

        assert_eq!(
            overlay.show(ON_PREVIEW, VIEWPORT),
            ShowOutcome::PreviewToggled
        );
        assert!(!overlay.is_visible());
        assert_eq!(overlay.state(), None);
        assert_eq!(mock.navigator.calls(), vec![NavigatorCall::TogglePreview]);
    }

    #[test]
    fn tap_while_open_toggles_preview() {
        let mock = MockServices::new();
        let mut overlay = shown(&mock);
        overlay.enter_adjust();

        assert_eq!(
            overlay.show(OUTSIDE, VIEWPORT),
            ShowOutcome::PreviewToggled
        );
        assert!(overlay.is_visible());
        assert_eq!(overlay.state(), Some(OverlayState::Adjust));
        assert_eq!(mock.navigator.calls(), vec![NavigatorCall::TogglePreview]);
    }

    #[test]
    fn show_loads_setpoints_from_telemetry() {
        let mock = MockServices::new();
        mock.feed.publish(status(PrinterState::Printing));

        let overlay = shown(&mock);
        assert_eq!(overlay.state(), Some(OverlayState::Main));
        assert_eq!(overlay.target(Quantity::Hotend), 210);
        assert_eq!(overlay.target(Quantity::Heatbed), 60);
    }

    #[test]
    fn guarded_operations_ignored_while_hidden() {
        let mock = MockServices::new();
        let mut overlay = PrintControl::new(&mock.services());

        overlay.cancel_intent();
        overlay.pause_intent();
        overlay.enter_adjust();
        overlay.enter_babystep();
        overlay.adjust(Quantity::Feedrate, 50);
        overlay.babystep_z(0.05);
        overlay.confirm_adjust();

        assert_eq!(overlay.state(), None);
        assert_eq!(overlay.target(Quantity::Feedrate), 100);
        assert!(mock.jobs.calls().is_empty());
        assert!(mock.printer.calls().is_empty());
    }

    #[test]
    fn cancel_needs_confirmation() {
        let mock = MockServices::new();
        let mut overlay = shown(&mock);

        overlay.confirm_cancel();
        assert!(mock.jobs.calls().is_empty());
        assert!(overlay.is_visible());

        overlay.cancel_intent();
        overlay.back();
        assert_eq!(overlay.state(), Some(OverlayState::Main));

        overlay.cancel_intent();
        overlay.confirm_cancel();
        assert_eq!(mock.jobs.calls(), vec![JobCall::Cancel]);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn pause_panel_actions() {
        let mock = MockServices::new();
        let mut overlay = shown(&mock);

        overlay.resume();
        assert!(mock.jobs.calls().is_empty());

        overlay.pause_intent();
        assert_eq!(mock.jobs.calls(), vec![JobCall::Pause]);
        assert_eq!(overlay.state(), Some(OverlayState::Pause));

        overlay.change_filament();
        assert_eq!(mock.printer.calls(), vec![PrinterCall::Gcode("M600".into())]);
        assert!(!overlay.is_visible());

        overlay.show(OUTSIDE, VIEWPORT);
        overlay.pause_intent();
        overlay.restart();
        assert_eq!(
            mock.jobs.calls(),
            vec![JobCall::Pause, JobCall::Pause, JobCall::Restart]
        );
    }

    #[test]
    fn back_does_not_leave_pause_panel() {
        let mock = MockServices::new();
        let mut overlay = shown(&mock);
        overlay.pause_intent();
        overlay.back();
        assert_eq!(overlay.state(), Some(OverlayState::Pause));
    }

    #[test]
    fn adjust_from_babystep_persists_once() {
        let mock = MockServices::new();
        let mut overlay = shown(&mock);

        overlay.enter_adjust();
        assert!(mock.printer.calls().is_empty());

        overlay.enter_babystep();
        overlay.enter_adjust();
        assert_eq!(mock.printer.calls(), vec![PrinterCall::PersistOffsets]);
        assert_eq!(overlay.state(), Some(OverlayState::Adjust));
    }

    #[test]
    fn forced_pause_once_per_episode() {
        let mock = MockServices::new();
        let mut overlay = PrintControl::new(&mock.services());

        overlay.printer_paused_changed(true);
        assert_eq!(overlay.state(), Some(OverlayState::Pause));

        overlay.hide();
        overlay.printer_paused_changed(true);
        assert!(!overlay.is_visible());

        overlay.printer_paused_changed(false);
        overlay.printer_paused_changed(true);
        assert_eq!(overlay.state(), Some(OverlayState::Pause));
        assert!(mock.jobs.calls().is_empty());
    }

    #[test]
    fn unpause_closes_forced_overlay() {
        let mock = MockServices::new();
        let mut overlay = PrintControl::new(&mock.services());

        mock.feed.publish(status(PrinterState::Paused));
        overlay.pump();
        assert_eq!(overlay.state(), Some(OverlayState::Pause));

        mock.feed.publish(status(PrinterState::Printing));
        overlay.pump();
        assert!(!overlay.is_visible());
    }

    #[test]
    fn confirm_adjust_commits_and_updates_session() {
        let mock = MockServices::new();
        mock.feed.publish(status(PrinterState::Printing));
        let mut overlay = shown(&mock);

        overlay.enter_adjust();
        overlay.adjust(Quantity::Hotend, 100);
        overlay.adjust(Quantity::Heatbed, 100);
        overlay.adjust(Quantity::Feedrate, -200);
        overlay.adjust(Quantity::Flowrate, 5);
        overlay.adjust(Quantity::Fan, 40);
        overlay.confirm_adjust();

        assert_eq!(
            mock.printer.calls(),
            vec![
                PrinterCall::HotendTemperature(260),
                PrinterCall::BedTemperature(100),
                PrinterCall::Feedrate(10),
                PrinterCall::Flowrate(105),
            ]
        );
        assert_eq!(mock.session.feed_rate(), 10);
        assert_eq!(mock.session.flow_rate(), 105);
        assert!(!overlay.is_visible());

        let next = PrintControl::new(&mock.services());
        assert_eq!(next.target(Quantity::Feedrate), 10);
    }

    #[test]
    fn babystep_sends_each_step() {
        let mock = MockServices::new();
        let mut overlay = shown(&mock);
        overlay.enter_babystep();

        for _ in 0..3 {
            overlay.babystep_z(0.005);
        }
        assert_eq!(overlay.z_offset_display(), "0.03");
        assert_eq!(
            mock.printer.calls(),
            vec![PrinterCall::Gcode("M290 Z0.005".into()); 3]
        );

        overlay.save_offset();
        assert_eq!(overlay.z_offset(), 0.0);
        assert_eq!(mock.printer.calls().last(), Some(&PrinterCall::PersistOffsets));
    }

    #[test]
    fn feedrate_shortcuts() {
        let mock = MockServices::new();
        let overlay = PrintControl::new(&mock.services());
        overlay.slow_feedrate();
        overlay.normal_feedrate();
        assert_eq!(
            mock.printer.calls(),
            vec![PrinterCall::Feedrate(10), PrinterCall::Feedrate(100)]
        );
    }

    #[test]
    fn teardown_unsubscribes_and_resets() {
        let mock = MockServices::new();
        let mut overlay = shown(&mock);
        overlay.enter_babystep();
        overlay.babystep_z(0.1);

        overlay.teardown();
        assert_eq!(overlay.state(), None);
        assert_eq!(overlay.z_offset(), 0.0);

        mock.feed.publish(status(PrinterState::Paused));
        assert_eq!(mock.feed.subscriber_count(), 0);
        overlay.pump();
        assert!(!overlay.is_visible());
    }
}
