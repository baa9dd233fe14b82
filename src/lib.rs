//! Control core of a bedside clock / alarm / relay appliance.
//!
//! Everything in this crate is board-agnostic: the time engine, the two
//! time-window schedulers, the menu state machine with its editing pages and
//! the display command sink. The RTIC firmware in `src/bin/bedside_clock.rs`
//! wires these pieces into tasks that talk to each other only through
//! message queues ([`ports::Ports`]).

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod datetime;
pub mod display;
pub mod error;
pub mod events;
pub mod hd44780;
pub mod ports;
pub mod schedule;
pub mod sound;
pub mod thermo;
pub mod ui;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use error::Error;

#[cfg(feature = "firmware")]
mod rt {
    use defmt_rtt as _; // global logger
    use panic_probe as _;
    use stm32f1xx_hal as _; // memory layout

    // same panicking *behavior* as `panic-probe` but doesn't print a panic message
    // this prevents the panic message being printed *twice* when `defmt::panic` is invoked
    #[defmt::panic_handler]
    fn panic() -> ! {
        cortex_m::asm::udf()
    }
}
