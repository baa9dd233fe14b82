//! Display command sink.
//!
//! Any task may queue a [`DisplayCommand`]; a single consumer owns the
//! physical display and applies the commands in arrival order.

use core::fmt::Write;

use crate::config::{DISPLAY_COLS, DISPLAY_ROWS};
use crate::Error;

/// One row worth of text.
pub type Line = heapless::String<{ DISPLAY_COLS as usize }>;

/// Custom character slots, registered once at start-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Glyph {
    BellOn = 0,
    BellOff = 1,
    Degree = 2,
    Clock = 3,
    Thermometer = 4,
    RelayOpen = 6,
    RelayClosed = 7,
}

impl Glyph {
    pub const ALL: [Glyph; 7] = [
        Glyph::BellOn,
        Glyph::BellOff,
        Glyph::Degree,
        Glyph::Clock,
        Glyph::Thermometer,
        Glyph::RelayOpen,
        Glyph::RelayClosed,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    /// 5x8 bitmap, one row per byte, low five bits used.
    pub fn bitmap(self) -> [u8; 8] {
        match self {
            Glyph::BellOn => [0x04, 0x0e, 0x0e, 0x0e, 0x1f, 0x00, 0x04, 0x00],
            Glyph::BellOff => [0x04, 0x0a, 0x0a, 0x0a, 0x11, 0x1f, 0x04, 0x00],
            Glyph::Degree => [0x0c, 0x12, 0x12, 0x0c, 0x00, 0x00, 0x00, 0x00],
            Glyph::Clock => [0x00, 0x0e, 0x15, 0x17, 0x11, 0x0e, 0x00, 0x00],
            Glyph::Thermometer => [0x04, 0x0a, 0x0a, 0x0a, 0x0e, 0x1f, 0x1f, 0x0e],
            Glyph::RelayOpen => [0x00, 0x10, 0x08, 0x04, 0x02, 0x1b, 0x00, 0x00],
            Glyph::RelayClosed => [0x00, 0x00, 0x00, 0x00, 0x1f, 0x1b, 0x00, 0x00],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayCommand {
    Clear,
    SetBacklight(bool),
    PrintLine { row: u8, col: u8, text: Line },
    PrintGlyph { row: u8, col: u8, glyph: Glyph },
}

impl DisplayCommand {
    /// `PrintLine` with `text` cut to what fits from `col` to the end of the row.
    pub fn print(row: u8, col: u8, text: &str) -> Self {
        let room = usize::from(DISPLAY_COLS.saturating_sub(col));
        let mut line = Line::new();
        for c in text.chars().take(room) {
            if line.push(c).is_err() {
                break;
            }
        }
        DisplayCommand::PrintLine { row, col, text: line }
    }

    /// Formats into a row-sized buffer; output past the row is dropped.
    pub fn printf(row: u8, col: u8, args: core::fmt::Arguments<'_>) -> Self {
        let mut buf = heapless::String::<64>::new();
        // overflow only truncates
        let _ = buf.write_fmt(args);
        Self::print(row, col, &buf)
    }
}

/// The character display as seen by the sink.
pub trait CharacterDisplay {
    fn clear(&mut self) -> Result<(), Error>;
    fn set_backlight(&mut self, on: bool) -> Result<(), Error>;
    fn print(&mut self, row: u8, col: u8, text: &str) -> Result<(), Error>;
    fn print_glyph(&mut self, row: u8, col: u8, glyph: u8) -> Result<(), Error>;
    fn register_glyph(&mut self, id: u8, bitmap: &[u8; 8]) -> Result<(), Error>;
}

/// Single consumer in front of a [`CharacterDisplay`].
pub struct DisplaySink<D> {
    display: D,
}

impl<D: CharacterDisplay> DisplaySink<D> {
    /// Takes ownership of the display and uploads every [`Glyph`].
    pub fn new(mut display: D) -> Result<Self, Error> {
        for glyph in Glyph::ALL {
            display.register_glyph(glyph.id(), &glyph.bitmap())?;
        }
        display.clear()?;
        Ok(Self { display })
    }

    /// Apply one queued command. Out-of-range positions and bus failures are
    /// logged and the command is dropped.
    pub fn apply(&mut self, cmd: &DisplayCommand) {
        let result = match cmd {
            DisplayCommand::Clear => self.display.clear(),
            DisplayCommand::SetBacklight(on) => self.display.set_backlight(*on),
            DisplayCommand::PrintLine { row, col, text } => {
                if *row >= DISPLAY_ROWS || *col >= DISPLAY_COLS {
                    warn!("print outside the screen at {},{}", row, col);
                    return;
                }
                self.display.print(*row, *col, text)
            }
            DisplayCommand::PrintGlyph { row, col, glyph } => {
                if *row >= DISPLAY_ROWS || *col >= DISPLAY_COLS {
                    warn!("glyph outside the screen at {},{}", row, col);
                    return;
                }
                self.display.print_glyph(*row, *col, glyph.id())
            }
        };
        if let Err(e) = result {
            error!("display: {}", e);
        }
    }

    pub fn release(self) -> D {
        self.display
    }
}
