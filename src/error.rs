//! Error type shared by the core and the drivers.

use core::fmt;

/// Errors surfaced by the control core.
///
/// None of these is fatal for the appliance: at worst an event is dropped or
/// the display shows stale content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Calendar fields that do not form a valid date or time of day.
    InvalidDateTime,
    /// The display bus rejected a transfer.
    Bus,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDateTime => write!(f, "invalid date or time"),
            Error::Bus => write!(f, "display bus error"),
        }
    }
}

impl From<time::error::ComponentRange> for Error {
    fn from(_: time::error::ComponentRange) -> Self {
        Error::InvalidDateTime
    }
}
