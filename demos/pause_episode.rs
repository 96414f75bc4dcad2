//! Example: walk the print-control overlay through a pause episode.
//!
//! Run with: `RUST_LOG=debug cargo run --example pause_episode`

use std::time::Duration;

use printdash_core::mock::MockServices;
use printdash_core::{
    PointerEvent, PrintControl, PrinterState, PrinterStatus, Quantity, StatusPanel,
    TemperatureReading, Viewport,
};

fn status(state: PrinterState) -> PrinterStatus {
    PrinterStatus {
        state,
        tool0: TemperatureReading {
            current: 208.7,
            set: 210,
        },
        bed: TemperatureReading {
            current: 59.9,
            set: 60,
        },
        fan_speed: 100,
    }
}

fn main() {
    // Initialize logging (optional)
    env_logger::init();

    let mock = MockServices::new();
    let services = mock.services();
    let viewport = Viewport {
        width: 800.0,
        height: 480.0,
    };

    let mut overlay = PrintControl::new(&services);
    let mut status_bar = StatusPanel::new(&services);

    mock.feed.publish(status(PrinterState::Printing));
    overlay.pump();
    status_bar.pump();

    // Bump the feed rate from the status bar
    status_bar.open_quick_control(Quantity::Feedrate);
    status_bar.quick_mut().adjust(10);
    status_bar.quick_mut().confirm();
    status_bar.advance(Duration::from_millis(500));
    println!("Feed rate now: {}%", status_bar.feed_rate());

    // Printer pauses on its own, twice in a row
    mock.feed.publish(status(PrinterState::Paused));
    mock.feed.publish(status(PrinterState::Paused));
    overlay.pump();
    println!("Overlay after pause: {:?}", overlay.state());

    overlay.resume();
    mock.feed.publish(status(PrinterState::Printing));
    overlay.pump();

    // User opens the overlay and babysteps
    overlay.show(PointerEvent { x: 40.0, y: 400.0 }, viewport);
    overlay.enter_babystep();
    overlay.babystep_z(0.05);
    overlay.babystep_z(0.05);
    println!("Z offset: {}", overlay.z_offset_display());
    overlay.enter_adjust();
    println!("Adjust feed rate starts at: {}%", overlay.target(Quantity::Feedrate));

    println!("Job commands: {:?}", mock.jobs.calls());
    println!("Printer commands: {:?}", mock.printer.calls());

    overlay.teardown();
    status_bar.teardown();
}
