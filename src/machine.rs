//! Machine panel: jogging, homing, extrusion and bed-levelling commands.

use crate::config::ConfigProvider;
use crate::services::{Notification, NotificationSink, PrinterCommands, PrinterProfile, Services};

use log::{debug, warn};
use std::sync::Arc;

/// Jog distance preselected on the machine screen, in mm.
pub const MACHINE_JOG_DISTANCE: f64 = 5.0;
/// Jog distance preselected on the control screen, in mm.
pub const CONTROL_JOG_DISTANCE: f64 = 10.0;

const PROFILE_ERROR_HEADING: &str = "Can't retrieve printer profile!";

/// A movable axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn profile_key(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Jog or extrusion direction as pressed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    fn flipped_if(self, inverted: bool) -> Self {
        match (self, inverted) {
            (dir, false) => dir,
            (Direction::Positive, true) => Direction::Negative,
            (Direction::Negative, true) => Direction::Positive,
        }
    }

    fn apply(self, distance: f64) -> f64 {
        match self {
            Direction::Positive => distance,
            Direction::Negative => -distance,
        }
    }
}

/// Axes to home in one `G28`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAxes {
    Xy,
    Z,
    Xyz,
}

impl HomeAxes {
    fn gcode(self) -> &'static str {
        match self {
            HomeAxes::Xy => "G28 XY",
            HomeAxes::Z => "G28 Z",
            HomeAxes::Xyz => "G28 XYZ",
        }
    }
}

/// The machine (or control) screen.
///
/// The printer profile is fetched once on creation; if that fails the user
/// gets a sticky error notification and moves stay disabled.
pub struct MachinePanel {
    printer: Arc<dyn PrinterCommands>,
    config: Arc<dyn ConfigProvider>,
    profile: Option<PrinterProfile>,
    jog_distance: f64,
    show_extruder: bool,
}

impl MachinePanel {
    /// The machine screen, jogging 5 mm by default.
    pub fn machine(services: &Services) -> Self {
        Self::with_jog_distance(services, MACHINE_JOG_DISTANCE)
    }

    /// The control screen, jogging 10 mm by default.
    pub fn control(services: &Services) -> Self {
        Self::with_jog_distance(services, CONTROL_JOG_DISTANCE)
    }

    fn with_jog_distance(services: &Services, jog_distance: f64) -> Self {
        let profile = load_profile(services.printer.as_ref(), services.notifications.as_ref());
        Self {
            printer: services.printer.clone(),
            config: services.config.clone(),
            profile,
            jog_distance,
            show_extruder: services.config.show_extruder_control(),
        }
    }

    pub fn profile(&self) -> Option<&PrinterProfile> {
        self.profile.as_ref()
    }

    pub fn jog_distance(&self) -> f64 {
        self.jog_distance
    }

    pub fn shows_extruder(&self) -> bool {
        self.show_extruder
    }

    pub fn set_distance(&mut self, distance: f64) {
        self.jog_distance = distance;
    }

    /// Extrude or retract by the jog distance.
    pub fn extrude(&self, direction: Direction) {
        let Some(profile) = &self.profile else {
            warn!("extrude ignored: no printer profile");
            return;
        };
        let amount = direction
            .flipped_if(profile.is_inverted("e"))
            .apply(self.jog_distance);
        self.printer.extrude(amount, self.config.feed_speed());
    }

    /// Jog one axis by the jog distance.
    pub fn move_axis(&self, axis: Axis, direction: Direction) {
        let Some(profile) = &self.profile else {
            warn!("move ignored: no printer profile");
            return;
        };
        let distance = direction
            .flipped_if(profile.is_inverted(axis.profile_key()))
            .apply(self.jog_distance);
        debug!("jog {:?} by {}", axis, distance);
        match axis {
            Axis::X => self.printer.jog(distance, 0.0, 0.0),
            Axis::Y => self.printer.jog(0.0, distance, 0.0),
            Axis::Z => self.printer.jog(0.0, 0.0, distance),
        }
    }

    pub fn home_axis(&self, axes: HomeAxes) {
        self.printer.execute_gcode(axes.gcode());
    }

    /// Auto-align the z steppers.
    pub fn align_z(&self) {
        self.printer.execute_gcode("G34 I3 T0.1");
    }

    /// Probe the bed mesh.
    pub fn leveling(&self) {
        self.printer.execute_gcode("G29");
    }
}

fn load_profile(
    printer: &dyn PrinterCommands,
    notifications: &dyn NotificationSink,
) -> Option<PrinterProfile> {
    match printer.active_profile() {
        Ok(profile) => {
            debug!("loaded printer profile '{}'", profile.name);
            Some(profile)
        }
        Err(e) => {
            warn!("failed to load printer profile: {}", e);
            notifications.notify(Notification::sticky_error(
                PROFILE_ERROR_HEADING,
                e.to_string(),
            ));
            None
        }
    }
}
