//! Host-side doubles shared by the unit tests.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::blocking::i2c;

use crate::clock::ClockCommand;
use crate::config::{DISPLAY_COLS, DISPLAY_ROWS};
use crate::display::{CharacterDisplay, DisplayCommand, DisplaySink};
use crate::events::{ActuatorCommand, SchedulerCommand, SoundCue, UiEvent};
use crate::ports::Ports;
use crate::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Display(DisplayCommand),
    Clock(ClockCommand),
    Scheduler(SchedulerCommand),
    Ui(UiEvent),
    Actuator(ActuatorCommand),
    Sound(SoundCue),
}

/// Records every outgoing message in order.
#[derive(Default)]
pub struct RecordingPorts {
    pub sent: Vec<Sent>,
}

impl RecordingPorts {
    pub fn display_commands(&self) -> Vec<DisplayCommand> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Display(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    /// The screen after applying every recorded display command.
    pub fn screen(&self) -> TextScreen {
        let mut sink = match DisplaySink::new(TextScreen::default()) {
            Ok(sink) => sink,
            Err(e) => panic!("text screen failed: {e}"),
        };
        for cmd in self.display_commands() {
            sink.apply(&cmd);
        }
        sink.release()
    }
}

impl Ports for RecordingPorts {
    fn display(&mut self, cmd: DisplayCommand) {
        self.sent.push(Sent::Display(cmd));
    }

    fn clock(&mut self, cmd: ClockCommand) {
        self.sent.push(Sent::Clock(cmd));
    }

    fn scheduler(&mut self, cmd: SchedulerCommand) {
        self.sent.push(Sent::Scheduler(cmd));
    }

    fn ui(&mut self, ev: UiEvent) {
        self.sent.push(Sent::Ui(ev));
    }

    fn actuator(&mut self, cmd: ActuatorCommand) {
        self.sent.push(Sent::Actuator(cmd));
    }

    fn sound(&mut self, cue: SoundCue) {
        self.sent.push(Sent::Sound(cue));
    }
}

/// A 4x20 character surface. Glyph slots show up as the control character
/// with the same code.
pub struct TextScreen {
    cells: [[char; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize],
    pub backlight: bool,
    pub glyphs: Vec<(u8, [u8; 8])>,
}

impl Default for TextScreen {
    fn default() -> Self {
        Self {
            cells: [[' '; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize],
            backlight: true,
            glyphs: Vec::new(),
        }
    }
}

impl TextScreen {
    pub fn row(&self, row: usize) -> String {
        self.cells[row].iter().collect()
    }

    pub fn rows(&self) -> Vec<String> {
        (0..DISPLAY_ROWS as usize).map(|r| self.row(r)).collect()
    }

    fn put(&mut self, row: u8, col: usize, c: char) {
        if let Some(cell) = self
            .cells
            .get_mut(usize::from(row))
            .and_then(|r| r.get_mut(col))
        {
            *cell = c;
        }
    }
}

impl CharacterDisplay for TextScreen {
    fn clear(&mut self) -> Result<(), Error> {
        self.cells = [[' '; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize];
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Error> {
        self.backlight = on;
        Ok(())
    }

    fn print(&mut self, row: u8, col: u8, text: &str) -> Result<(), Error> {
        for (i, c) in text.chars().enumerate() {
            self.put(row, usize::from(col) + i, c);
        }
        Ok(())
    }

    fn print_glyph(&mut self, row: u8, col: u8, glyph: u8) -> Result<(), Error> {
        self.put(row, usize::from(col), char::from(glyph));
        Ok(())
    }

    fn register_glyph(&mut self, id: u8, bitmap: &[u8; 8]) -> Result<(), Error> {
        self.glyphs.push((id, *bitmap));
        Ok(())
    }
}

/// Records I²C writes; `fail` makes every write return an error.
#[derive(Default)]
pub struct RecordingI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub fail: bool,
}

impl RecordingI2c {
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.iter().flat_map(|(_, b)| b.iter().copied()).collect()
    }
}

impl i2c::Write for RecordingI2c {
    type Error = ();

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(());
        }
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }
}

pub struct NoDelay;

impl DelayUs<u16> for NoDelay {
    fn delay_us(&mut self, _us: u16) {}
}

impl DelayMs<u8> for NoDelay {
    fn delay_ms(&mut self, _ms: u8) {}
}
