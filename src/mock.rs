//! Recording collaborators for testing.
//!
//! These stand in for the printer host, job queue, notification area and
//! router so screen logic can be exercised without a printer.
//!
//! ```
//! use printdash_core::mock::{MockServices, PrinterCall};
//! use printdash_core::{MachinePanel, HomeAxes};
//!
//! let mock = MockServices::new();
//! let panel = MachinePanel::machine(&mock.services());
//! panel.home_axis(HomeAxes::Xyz);
//! assert_eq!(mock.printer.calls(), vec![PrinterCall::Gcode("G28 XYZ".into())]);
//! ```

use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::services::{
    FilamentService, FilamentSpool, JobCommands, Navigator, Notification, NotificationSink,
    PrinterCommands, PrinterProfile, Route, Services,
};
use crate::session::SessionTargets;
use crate::telemetry::StatusFeed;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Printer
// =============================================================================

/// A call received by [`RecordingPrinter`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrinterCall {
    Gcode(String),
    Jog(f64, f64, f64),
    Extrude(f64, i32),
    HotendTemperature(i32),
    BedTemperature(i32),
    FanSpeed(i32),
    Feedrate(i32),
    Flowrate(i32),
    PersistOffsets,
}

/// Printer double that records every command.
pub struct RecordingPrinter {
    calls: Mutex<Vec<PrinterCall>>,
    profile: Mutex<Result<PrinterProfile, String>>,
}

impl RecordingPrinter {
    /// A printer serving a default profile.
    pub fn new() -> Self {
        Self::with_profile(PrinterProfile::default())
    }

    pub fn with_profile(profile: PrinterProfile) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            profile: Mutex::new(Ok(profile)),
        }
    }

    /// A printer whose profile lookup fails with `message`.
    pub fn without_profile(message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            profile: Mutex::new(Err(message.into())),
        }
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<PrinterCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: PrinterCall) {
        lock(&self.calls).push(call);
    }
}

impl Default for RecordingPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrinterCommands for RecordingPrinter {
    fn execute_gcode(&self, gcode: &str) {
        self.record(PrinterCall::Gcode(gcode.to_string()));
    }

    fn jog(&self, x: f64, y: f64, z: f64) {
        self.record(PrinterCall::Jog(x, y, z));
    }

    fn extrude(&self, amount: f64, speed: i32) {
        self.record(PrinterCall::Extrude(amount, speed));
    }

    fn set_hotend_temperature(&self, temperature: i32) {
        self.record(PrinterCall::HotendTemperature(temperature));
    }

    fn set_bed_temperature(&self, temperature: i32) {
        self.record(PrinterCall::BedTemperature(temperature));
    }

    fn set_fan_speed(&self, percentage: i32) {
        self.record(PrinterCall::FanSpeed(percentage));
    }

    fn set_feedrate(&self, percentage: i32) {
        self.record(PrinterCall::Feedrate(percentage));
    }

    fn set_flowrate(&self, percentage: i32) {
        self.record(PrinterCall::Flowrate(percentage));
    }

    fn persist_offsets(&self) {
        self.record(PrinterCall::PersistOffsets);
    }

    fn active_profile(&self) -> Result<PrinterProfile, PanelError> {
        lock(&self.profile)
            .clone()
            .map_err(PanelError::ProfileUnavailable)
    }
}

// =============================================================================
// Jobs, Notifications, Navigation, Filament
// =============================================================================

/// A call received by [`RecordingJobs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCall {
    Pause,
    Resume,
    Restart,
    Cancel,
}

/// Job-control double that records every command.
#[derive(Default)]
pub struct RecordingJobs {
    calls: Mutex<Vec<JobCall>>,
}

impl RecordingJobs {
    pub fn calls(&self) -> Vec<JobCall> {
        lock(&self.calls).clone()
    }
}

impl JobCommands for RecordingJobs {
    fn pause(&self) {
        lock(&self.calls).push(JobCall::Pause);
    }

    fn resume(&self) {
        lock(&self.calls).push(JobCall::Resume);
    }

    fn restart(&self) {
        lock(&self.calls).push(JobCall::Restart);
    }

    fn cancel(&self) {
        lock(&self.calls).push(JobCall::Cancel);
    }
}

/// Notification sink that keeps every notification.
#[derive(Default)]
pub struct RecordingNotifications {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifications {
    pub fn received(&self) -> Vec<Notification> {
        lock(&self.received).clone()
    }
}

impl NotificationSink for RecordingNotifications {
    fn notify(&self, notification: Notification) {
        lock(&self.received).push(notification);
    }
}

/// A call received by [`RecordingNavigator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorCall {
    TogglePreview,
    Navigate(Route),
}

/// Navigator double that records every request.
#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<NavigatorCall>>,
}

impl RecordingNavigator {
    pub fn calls(&self) -> Vec<NavigatorCall> {
        lock(&self.calls).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn toggle_job_preview(&self) {
        lock(&self.calls).push(NavigatorCall::TogglePreview);
    }

    fn navigate(&self, route: Route) {
        lock(&self.calls).push(NavigatorCall::Navigate(route));
    }
}

/// Filament service double with a switchable failure mode.
#[derive(Default)]
pub struct MockFilament {
    current: Mutex<Option<FilamentSpool>>,
    fail_with: Mutex<Option<String>>,
}

impl MockFilament {
    /// Make every following `set_spool` fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.fail_with) = Some(message.into());
    }
}

impl FilamentService for MockFilament {
    fn set_spool(&self, spool: &FilamentSpool) -> Result<(), PanelError> {
        if let Some(message) = lock(&self.fail_with).clone() {
            return Err(PanelError::SpoolChange(message));
        }
        *lock(&self.current) = Some(spool.clone());
        Ok(())
    }

    fn current_spool(&self) -> Option<FilamentSpool> {
        lock(&self.current).clone()
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// Concrete doubles plus the [`Services`] bundle wired to them.
pub struct MockServices {
    pub printer: Arc<RecordingPrinter>,
    pub jobs: Arc<RecordingJobs>,
    pub config: Arc<PanelConfig>,
    pub notifications: Arc<RecordingNotifications>,
    pub navigator: Arc<RecordingNavigator>,
    pub filament: Arc<MockFilament>,
    pub feed: Arc<StatusFeed>,
    pub session: Arc<SessionTargets>,
}

impl MockServices {
    /// Doubles with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PanelConfig::default())
    }

    pub fn with_config(config: PanelConfig) -> Self {
        Self::build(config, RecordingPrinter::new())
    }

    /// Doubles around a specific printer double.
    pub fn with_printer(printer: RecordingPrinter) -> Self {
        Self::build(PanelConfig::default(), printer)
    }

    fn build(config: PanelConfig, printer: RecordingPrinter) -> Self {
        Self {
            printer: Arc::new(printer),
            jobs: Arc::default(),
            config: Arc::new(config),
            notifications: Arc::default(),
            navigator: Arc::default(),
            filament: Arc::default(),
            feed: Arc::default(),
            session: Arc::default(),
        }
    }

    /// The bundle handed to screens.
    pub fn services(&self) -> Services {
        Services {
            printer: self.printer.clone(),
            jobs: self.jobs.clone(),
            config: self.config.clone(),
            notifications: self.notifications.clone(),
            navigator: self.navigator.clone(),
            filament: self.filament.clone(),
            feed: self.feed.clone(),
            session: self.session.clone(),
        }
    }
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printer_records_each_command() {
        let printer = RecordingPrinter::new();
        printer.execute_gcode("M600");
        printer.jog(1.0, 0.0, 0.0);
        printer.extrude(5.0, 100);
        printer.set_hotend_temperature(210);
        printer.set_bed_temperature(60);
        printer.set_fan_speed(50);
        printer.set_feedrate(90);
        printer.set_flowrate(110);
        printer.persist_offsets();
        assert!(printer.active_profile().is_ok());

        assert_eq!(
            printer.calls(),
            vec![
                PrinterCall::Gcode("M600".into()),
                PrinterCall::Jog(1.0, 0.0, 0.0),
                PrinterCall::Extrude(5.0, 100),
                PrinterCall::HotendTemperature(210),
                PrinterCall::BedTemperature(60),
                PrinterCall::FanSpeed(50),
                PrinterCall::Feedrate(90),
                PrinterCall::Flowrate(110),
                PrinterCall::PersistOffsets,
            ]
        );

        printer.clear();
        assert!(printer.calls().is_empty());
    }
}
