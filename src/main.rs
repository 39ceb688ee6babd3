//! Process entry point: init the logger, load configuration, open the
//! display, construct the root `Context`, and run the event loop.
//!
//! Grounded on the teacher's `main.rs` init/run skeleton (`env_logger`
//! setup, `Rdwm::init().ok_or(...)`, top-level error propagation), now
//! delegating the actual window-manager behavior to the `fensterchef`
//! library instead of keeping its own `Rdwm` struct inline.

use fensterchef::config::Configuration;
use fensterchef::context::Context;
use fensterchef::dispatcher;
use fensterchef::display::Display;
use fensterchef::error::FensterchefError;

fn main() {
    env_logger::builder()
        .format_timestamp(None)
        .write_style(env_logger::WriteStyle::Auto)
        .init();

    let config = match Configuration::load_default_path() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("{err}; starting with built-in defaults");
            Configuration::default()
        }
    };

    let display = match Display::open() {
        Ok(display) => display,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    log::info!("connected to X display");

    let mut ctx = Context::new(display, config);

    match dispatcher::run(&mut ctx) {
        Ok(()) => log::info!("exiting"),
        Err(fatal @ FensterchefError::OutOfMemory(_)) => {
            // Spec ss7: resource exhaustion is fatal, but the process
            // must release the keyboard/pointer grabs first so the X
            // session stays usable.
            log::error!("fatal: {fatal}; releasing grabs before exit");
            ctx.display.ungrab_pointer();
            std::process::exit(1);
        }
        Err(fatal) => {
            log::error!("fatal: {fatal}");
            std::process::exit(1);
        }
    }
}
