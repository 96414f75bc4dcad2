//! Collaborator interfaces consumed by the screens.
//!
//! Everything that talks to the printer, the job queue, the notification
//! area or the router sits behind one of these traits. Commands are
//! fire-and-forget: failures are the implementation's business.

use crate::config::ConfigProvider;
use crate::error::PanelError;
use crate::session::SessionTargets;
use crate::telemetry::StatusFeed;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Printer Commands
// =============================================================================

/// Commands sent to the printer host.
pub trait PrinterCommands: Send + Sync {
    /// Send a raw G-code line.
    fn execute_gcode(&self, gcode: &str);

    /// Relative jog of the print head, in mm.
    fn jog(&self, x: f64, y: f64, z: f64);

    /// Extrude (positive) or retract (negative) filament.
    fn extrude(&self, amount: f64, speed: i32);

    /// Set the hotend target temperature.
    fn set_hotend_temperature(&self, temperature: i32);

    /// Set the heatbed target temperature.
    fn set_bed_temperature(&self, temperature: i32);

    /// Set the part-cooling fan speed in percent.
    fn set_fan_speed(&self, percentage: i32);

    /// Set the feed rate multiplier in percent.
    fn set_feedrate(&self, percentage: i32);

    /// Set the flow rate multiplier in percent.
    fn set_flowrate(&self, percentage: i32);

    /// Persist offsets (babystep) to the printer's non-volatile memory.
    fn persist_offsets(&self);

    /// Fetch the active printer profile.
    fn active_profile(&self) -> Result<PrinterProfile, PanelError>;
}

/// Print job control.
pub trait JobCommands: Send + Sync {
    fn pause(&self);
    fn resume(&self);
    fn restart(&self);
    fn cancel(&self);
}

// =============================================================================
// Printer Profile
// =============================================================================

/// Per-axis settings of a printer profile.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AxisProfile {
    /// Whether positive moves go the other way on this machine.
    pub inverted: bool,
    /// Maximum jog speed in mm/min.
    pub speed: i32,
}

/// The active printer profile, in the shape the printer host serves it.
///
/// ```
/// use printdash_core::PrinterProfile;
///
/// let profile: PrinterProfile = serde_json::from_str(
///     r#"{ "id": "_default", "name": "Stella", "axes": { "z": { "inverted": true, "speed": 200 } } }"#,
/// ).unwrap();
/// assert!(profile.is_inverted("z"));
/// assert!(!profile.is_inverted("x"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PrinterProfile {
    pub id: String,
    pub name: String,
    /// Axis settings keyed by lowercase axis name (`x`, `y`, `z`, `e`).
    pub axes: HashMap<String, AxisProfile>,
}

impl PrinterProfile {
    /// Whether the named axis is inverted. Unknown axes are not.
    pub fn is_inverted(&self, axis: &str) -> bool {
        self.axes.get(axis).is_some_and(|a| a.inverted)
    }
}

// =============================================================================
// Notifications and Navigation
// =============================================================================

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

/// A message for the notification area.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub heading: String,
    pub text: String,
    pub kind: NotificationKind,
    pub time: DateTime<Utc>,
    /// Sticky notifications stay until the user dismisses them.
    pub sticky: bool,
}

impl Notification {
    /// A sticky error notification stamped with the current time.
    pub fn sticky_error(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
            kind: NotificationKind::Error,
            time: Utc::now(),
            sticky: true,
        }
    }
}

/// Receiver of user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Screens the core can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    MainScreen,
}

/// Host view actions outside the core's own state.
pub trait Navigator: Send + Sync {
    /// Toggle the job preview image on the main print view.
    fn toggle_job_preview(&self);

    /// Leave the current screen.
    fn navigate(&self, route: Route);
}

// =============================================================================
// Filament
// =============================================================================

/// A filament spool known to the filament manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilamentSpool {
    pub id: u32,
    pub name: String,
    pub material: String,
    pub color: String,
}

/// Spool bookkeeping, usually backed by a filament manager plugin.
pub trait FilamentService: Send + Sync {
    /// Mark `spool` as the loaded spool.
    fn set_spool(&self, spool: &FilamentSpool) -> Result<(), PanelError>;

    /// The currently loaded spool, if known.
    fn current_spool(&self) -> Option<FilamentSpool>;
}

// =============================================================================
// Services Bundle
// =============================================================================

/// Everything a screen needs from the outside world.
///
/// Cloning is cheap; screens keep their own clone for their lifetime.
#[derive(Clone)]
pub struct Services {
    pub printer: Arc<dyn PrinterCommands>,
    pub jobs: Arc<dyn JobCommands>,
    pub config: Arc<dyn ConfigProvider>,
    pub notifications: Arc<dyn NotificationSink>,
    pub navigator: Arc<dyn Navigator>,
    pub filament: Arc<dyn FilamentService>,
    pub feed: Arc<StatusFeed>,
    pub session: Arc<SessionTargets>,
}
