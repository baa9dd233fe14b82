//! Cursor navigation shared by all editing pages.
//!
//! An [`Editor`] walks an ordered list of [`InputElement`]s, always shaped
//! `[Cancel, data.., Apply]`. In `Select` mode the encoder moves the cursor
//! (without wrapping); pushing on a data element switches to `Modify`, where
//! the encoder adjusts that one field through the page supplied callback.

use core::fmt::Write;

use crate::config::{DISPLAY_COLS, HINT_ROW};
use crate::display::{DisplayCommand, Line};
use crate::events::MenuEvent;
use crate::ports::Ports;

/// Row holding the cursor under the edited value.
pub const MARKER_ROW: u8 = 2;
/// Cancel, Apply and up to four data fields.
pub const MAX_ELEMENTS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role<F> {
    Cancel,
    Apply,
    Data(F),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputElement<F> {
    pub row: u8,
    pub col: u8,
    pub role: Role<F>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Select,
    Modify,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    Continue,
    Cancel,
    Apply,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Editor<F> {
    elements: heapless::Vec<InputElement<F>, MAX_ELEMENTS>,
    index: usize,
    mode: Mode,
}

impl<F: Copy> Editor<F> {
    /// `fields` are (marker column, field) pairs, left to right.
    pub fn new(fields: &[(u8, F)]) -> Self {
        let mut elements = heapless::Vec::new();
        let sentinel = |role| InputElement {
            row: HINT_ROW,
            col: 0,
            role,
        };
        elements.push(sentinel(Role::Cancel)).ok();
        for &(col, field) in fields.iter().take(MAX_ELEMENTS - 2) {
            elements
                .push(InputElement {
                    row: MARKER_ROW,
                    col,
                    role: Role::Data(field),
                })
                .ok();
        }
        elements.push(sentinel(Role::Apply)).ok();
        Self {
            elements,
            index: 0,
            mode: Mode::Select,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&InputElement<F>> {
        self.elements.get(self.index)
    }

    pub fn elements(&self) -> &[InputElement<F>] {
        &self.elements
    }

    /// Feed one event. `adjust(field, forward)` is called for each step
    /// applied to a field in `Modify` mode.
    pub fn process(&mut self, ev: MenuEvent, mut adjust: impl FnMut(F, bool)) -> Verdict {
        let Some(role) = self.current().map(|e| e.role) else {
            return Verdict::Cancel;
        };
        match (self.mode, ev) {
            (Mode::Select, MenuEvent::MoveFwd) => {
                if self.index + 1 < self.elements.len() {
                    self.index += 1;
                }
            }
            (Mode::Select, MenuEvent::MoveBack) => {
                self.index = self.index.saturating_sub(1);
            }
            (Mode::Select, MenuEvent::PushButton) => match role {
                Role::Cancel => return Verdict::Cancel,
                Role::Apply => return Verdict::Apply,
                Role::Data(_) => self.mode = Mode::Modify,
            },
            (Mode::Modify, MenuEvent::PushButton) => self.mode = Mode::Select,
            (Mode::Modify, MenuEvent::MoveFwd | MenuEvent::MoveBack) => {
                if let Role::Data(field) = role {
                    adjust(field, ev == MenuEvent::MoveFwd);
                }
            }
        }
        Verdict::Continue
    }

    /// Redraws the cursor row and the hint row.
    pub fn render<P: Ports>(&self, ports: &mut P) {
        let Some(current) = self.current() else {
            return;
        };
        let (marker, hint) = match (current.role, self.mode) {
            (Role::Cancel, _) => ('^', "Cancel"),
            (Role::Apply, _) => ('^', "Apply"),
            (Role::Data(_), Mode::Select) => ('^', "Select"),
            (Role::Data(_), Mode::Modify) => ('>', "Modify"),
        };

        let mut marker_line = blank();
        let mut hint_line = Line::new();
        let _ = write!(hint_line, "  {:<18}", hint);
        let target = if current.row == HINT_ROW {
            &mut hint_line
        } else {
            &mut marker_line
        };
        place(target, current.col, marker);

        ports.display(DisplayCommand::print(MARKER_ROW, 0, &marker_line));
        ports.display(DisplayCommand::print(HINT_ROW, 0, &hint_line));
    }
}

fn blank() -> Line {
    let mut line = Line::new();
    for _ in 0..DISPLAY_COLS {
        line.push(' ').ok();
    }
    line
}

/// Overwrite one cell of an all-ASCII line.
fn place(line: &mut Line, col: u8, c: char) {
    let mut out = Line::new();
    for (i, existing) in line.chars().enumerate() {
        let ch = if i == usize::from(col) { c } else { existing };
        out.push(ch).ok();
    }
    *line = out;
}
