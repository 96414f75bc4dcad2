//! Filament-change wizard.
//!
//! Opened from the pause panel. With a filament manager the user first picks
//! the new spool; otherwise the wizard starts on the change page directly.
//! The hotend set-point seen on entry is restored when the wizard goes away.

use crate::services::{FilamentService, FilamentSpool, Navigator, PrinterCommands, Route, Services};
use crate::telemetry::StatusFeed;
use crate::timer::Timers;

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// How long the checkmark shows after a successful spool change.
pub const CHECKMARK_DURATION: Duration = Duration::from_millis(1350);

const TOTAL_PAGES: u32 = 1;
/// Width of the full progress bar in viewport-width units.
const PROGRESS_BAR_VW: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    ReturnToMain,
}

pub struct FilamentWizard {
    printer: Arc<dyn PrinterCommands>,
    navigator: Arc<dyn Navigator>,
    filament: Arc<dyn FilamentService>,
    feed: Arc<StatusFeed>,
    page: u32,
    show_checkmark: bool,
    selected_spool: Option<FilamentSpool>,
    hotend_previous_temperature: i32,
    timers: Timers<Effect>,
}

impl FilamentWizard {
    pub fn new(services: &Services) -> Self {
        let hotend_previous_temperature = services
            .feed
            .latest()
            .map(|status| status.tool0.set)
            .unwrap_or_default();
        let page = if services.config.is_filament_manager_used() {
            0
        } else {
            1
        };
        debug!(
            "filament wizard on page {}, hotend was {}",
            page, hotend_previous_temperature
        );
        Self {
            printer: services.printer.clone(),
            navigator: services.navigator.clone(),
            filament: services.filament.clone(),
            feed: services.feed.clone(),
            page,
            show_checkmark: false,
            selected_spool: None,
            hotend_previous_temperature,
            timers: Timers::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn show_checkmark(&self) -> bool {
        self.show_checkmark
    }

    pub fn selected_spool(&self) -> Option<&FilamentSpool> {
        self.selected_spool.as_ref()
    }

    /// Spool the filament service reports as loaded.
    pub fn current_spool(&self) -> Option<FilamentSpool> {
        self.filament.current_spool()
    }

    /// Progress bar width in viewport-width units.
    pub fn progress_width_vw(&self) -> f64 {
        f64::from(self.page) * (PROGRESS_BAR_VW / f64::from(TOTAL_PAGES))
    }

    /// Move on, or leave for the main screen when done or asked to.
    ///
    /// Ignored unless a job is running or paused.
    pub fn increase_page(&mut self, return_to_main: bool) {
        let job_active = self
            .feed
            .latest()
            .is_some_and(|status| status.state.is_job_active());
        if !job_active {
            debug!("page change ignored: no active job");
            return;
        }

        if self.page == TOTAL_PAGES || return_to_main {
            self.navigator.navigate(Route::MainScreen);
        } else if self.page < TOTAL_PAGES {
            self.page += 1;
        }
    }

    /// Pick a spool. With `skip_change` the spool is committed right away.
    pub fn set_spool(&mut self, spool: FilamentSpool, skip_change: bool) {
        self.selected_spool = Some(spool);
        if skip_change {
            self.set_spool_selection();
        } else {
            self.increase_page(false);
        }
    }

    /// Commit the selected spool to the filament service.
    pub fn set_spool_selection(&mut self) {
        let Some(spool) = &self.selected_spool else {
            self.increase_page(true);
            return;
        };
        match self.filament.set_spool(spool) {
            Ok(()) => {
                info!("spool {} ({}) loaded", spool.id, spool.name);
                self.show_checkmark = true;
                self.timers.schedule(CHECKMARK_DURATION, Effect::ReturnToMain);
            }
            Err(e) => {
                warn!("failed to set spool: {}", e);
                self.increase_page(true);
            }
        }
    }

    /// Let `elapsed` pass and apply due effects.
    pub fn advance(&mut self, elapsed: Duration) {
        for effect in self.timers.advance(elapsed) {
            match effect {
                Effect::ReturnToMain => self.increase_page(true),
            }
        }
    }

    /// Cancel pending effects and put the hotend back where it was.
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.printer
            .set_hotend_temperature(self.hotend_previous_temperature);
    }
}
