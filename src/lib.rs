//! Print-control view engine for touchscreen 3D-printer hosts.
//!
//! This crate holds the state behind the screens shown while a printer is
//! running: the print-control overlay, the status bar with its quick
//! control, the machine panel and the filament-change wizard. It never talks
//! to a printer itself. Commands go out through the collaborator traits in
//! [`Services`]; telemetry comes in through a [`StatusFeed`].
//!
//! Screens are driven from a single UI loop: forward taps to the screen
//! methods, call `pump()` to apply new printer status and `advance()` with
//! the elapsed frame time to run deferred view effects.
//!
//! # Example
//!
//! ```
//! use printdash_core::mock::{MockServices, PrinterCall};
//! use printdash_core::{
//!     OverlayState, PointerEvent, PrintControl, PrinterState, PrinterStatus, Viewport,
//! };
//!
//! let mock = MockServices::new();
//! let mut overlay = PrintControl::new(&mock.services());
//!
//! // The printer pauses on its own (e.g. filament runout).
//! mock.feed.publish(PrinterStatus { state: PrinterState::Paused, ..Default::default() });
//! overlay.pump();
//! assert_eq!(overlay.state(), Some(OverlayState::Pause));
//!
//! overlay.change_filament();
//! assert_eq!(mock.printer.calls(), vec![PrinterCall::Gcode("M600".into())]);
//! ```
//!
//! # Testing
//!
//! The [`mock`] module provides recording doubles for every collaborator, so
//! screen logic can be tested without a printer.

pub mod adjust;
pub mod config;
pub mod error;
pub mod filament;
pub mod machine;
pub mod mock;
pub mod overlay;
pub mod quick;
pub mod services;
pub mod session;
pub mod status;
pub mod status_panel;
pub mod telemetry;
pub mod timer;

pub use adjust::{AdjustmentSet, Limits, Quantity, ZOffset, apply_delta};
pub use config::{ConfigProvider, PanelConfig};
pub use error::PanelError;
pub use filament::FilamentWizard;
pub use machine::{Axis, Direction, HomeAxes, MachinePanel};
pub use overlay::{OverlayState, PointerEvent, PrintControl, ShowOutcome, Viewport};
pub use quick::{QuickControl, QuickControlView};
pub use services::{
    AxisProfile, FilamentService, FilamentSpool, JobCommands, Navigator, Notification,
    NotificationKind, NotificationSink, PrinterCommands, PrinterProfile, Route, Services,
};
pub use session::SessionTargets;
pub use status::{PrinterState, PrinterStatus, TemperatureReading};
pub use status_panel::StatusPanel;
pub use telemetry::{StatusFeed, StatusSubscription};
pub use timer::{TimerId, Timers};
