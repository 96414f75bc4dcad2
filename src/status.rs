//! Printer status snapshot.

/// Coarse printer state as reported by the telemetry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrinterState {
    /// Connection to the printer is being established.
    #[default]
    Connecting,
    /// Connected and not running a job.
    Idle,
    /// A job is running.
    Printing,
    /// A job is paused.
    Paused,
    /// The printer reported an error.
    Error,
    /// The connection is closed.
    Closed,
}

impl PrinterState {
    /// Whether a job is currently active, paused jobs included.
    pub fn is_job_active(self) -> bool {
        matches!(self, Self::Printing | Self::Paused)
    }
}

/// A heater reading: measured temperature and target set-point, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureReading {
    /// Measured temperature.
    pub current: f64,
    /// Target set-point.
    pub set: i32,
}

/// A snapshot of the printer state at a point in time.
///
/// Produced by the telemetry source and only ever read here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrinterStatus {
    /// Coarse printer state.
    pub state: PrinterState,
    /// First hotend.
    pub tool0: TemperatureReading,
    /// Heatbed.
    pub bed: TemperatureReading,
    /// Part-cooling fan speed in percent.
    pub fan_speed: i32,
}

impl PrinterStatus {
    /// Whether the printer is paused.
    pub fn is_paused(&self) -> bool {
        self.state == PrinterState::Paused
    }
}
