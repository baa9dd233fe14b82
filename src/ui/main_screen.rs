//! Browse-mode summary screen.
//!
//! Holds the last snapshot seen on each event stream; it never queries the
//! clock or the schedulers directly.

use core::fmt::Write;

use crate::datetime::DateTime;
use crate::display::{DisplayCommand, Glyph};
use crate::ports::Ports;
use crate::window::{AlarmConfig, AlarmEvent, RelayConfig, RelayEvent, WindowState};

pub struct MainScreen {
    pub now: DateTime,
    /// Tenths of a degree, `None` until the first reading.
    pub temperature: Option<i16>,
    pub alarm: AlarmConfig,
    pub alarm_state: WindowState,
    pub relay: RelayConfig,
    pub relay_state: WindowState,
}

impl MainScreen {
    pub fn new(now: DateTime, alarm: AlarmConfig, relay: RelayConfig) -> Self {
        Self {
            now,
            temperature: None,
            alarm,
            alarm_state: WindowState::default(),
            relay,
            relay_state: WindowState::default(),
        }
    }

    pub fn on_alarm(&mut self, ev: &AlarmEvent) {
        self.alarm = ev.config;
        self.alarm_state = ev.state;
    }

    pub fn on_relay(&mut self, ev: &RelayEvent) {
        self.relay = ev.config;
        self.relay_state = ev.state;
    }

    pub fn render<P: Ports>(&self, ports: &mut P) {
        let now = self.now;
        ports.display(glyph(0, 0, Glyph::Clock));
        ports.display(DisplayCommand::printf(
            0,
            1,
            format_args!("{:04}.{:02}.{:02}", now.year(), now.month(), now.day()),
        ));
        ports.display(DisplayCommand::printf(
            0,
            12,
            format_args!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second()),
        ));

        let mut reading = heapless::String::<8>::new();
        match self.temperature {
            Some(t) => {
                let sign = if t < 0 { "-" } else { "" };
                let abs = t.unsigned_abs();
                let _ = write!(reading, "{}{}.{}", sign, abs / 10, abs % 10);
            }
            None => {
                let _ = reading.push_str("--.-");
            }
        }
        ports.display(glyph(1, 0, Glyph::Thermometer));
        ports.display(DisplayCommand::printf(
            1,
            1,
            format_args!("Temperature: {:>4}", reading.as_str()),
        ));
        ports.display(glyph(1, 18, Glyph::Degree));
        ports.display(DisplayCommand::print(1, 19, "C"));

        let relay_glyph = if self.relay_state.ringing {
            Glyph::RelayClosed
        } else {
            Glyph::RelayOpen
        };
        ports.display(glyph(2, 0, relay_glyph));
        ports.display(DisplayCommand::printf(
            2,
            1,
            format_args!(
                "Relay: {:02}:{:02}-{:02}:{:02}",
                self.relay.time_beg.hour(),
                self.relay.time_beg.minute(),
                self.relay.time_end.hour(),
                self.relay.time_end.minute()
            ),
        ));

        let bell = if self.alarm.enabled && self.alarm_state.ringing {
            Glyph::BellOn
        } else {
            Glyph::BellOff
        };
        ports.display(glyph(3, 0, bell));
        ports.display(DisplayCommand::printf(
            3,
            1,
            format_args!(
                "{:02} sec at {:02}:{:02} {:<3}",
                self.alarm.duration,
                self.alarm.time_beg.hour(),
                self.alarm.time_beg.minute(),
                if self.alarm.enabled { "On" } else { "Off" }
            ),
        ));
    }
}

fn glyph(row: u8, col: u8, glyph: Glyph) -> DisplayCommand {
    DisplayCommand::PrintGlyph { row, col, glyph }
}
