//! The concrete editing pages.
//!
//! Each page owns a working copy of the value it edits; nothing outside the
//! page sees that copy until the menu commits it on `Apply`.

use crate::config::MAX_ALARM_DURATION;
use crate::datetime::{DateTime, Field};
use crate::display::DisplayCommand;
use crate::events::MenuEvent;
use crate::ports::Ports;
use crate::window::{AlarmConfig, RelayConfig};

use super::page::{Editor, Verdict};

/// Settings owned by the UI task itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig {
    pub backlight: bool,
    /// Sound the hourly chime at hh:00:00.
    pub chime: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            backlight: true,
            chime: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmField {
    Duration,
    Enabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayField {
    BeginHour,
    BeginMinute,
    EndHour,
    EndMinute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemField {
    Backlight,
    Chime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
    Date {
        value: DateTime,
        editor: Editor<Field>,
    },
    Time {
        value: DateTime,
        seconds: bool,
        editor: Editor<Field>,
    },
    AlarmConfig {
        value: AlarmConfig,
        editor: Editor<AlarmField>,
    },
    RelayRange {
        value: RelayConfig,
        editor: Editor<RelayField>,
    },
    System {
        value: SystemConfig,
        editor: Editor<SystemField>,
    },
}

fn on_off(on: bool) -> &'static str {
    if on {
        "On "
    } else {
        "Off"
    }
}

impl Page {
    pub fn date(value: DateTime) -> Self {
        Page::Date {
            value,
            editor: Editor::new(&[(7, Field::Year), (10, Field::Month), (13, Field::Day)]),
        }
    }

    pub fn time(value: DateTime, seconds: bool) -> Self {
        let editor = if seconds {
            Editor::new(&[(5, Field::Hour), (8, Field::Minute), (11, Field::Second)])
        } else {
            Editor::new(&[(5, Field::Hour), (8, Field::Minute)])
        };
        Page::Time {
            value,
            seconds,
            editor,
        }
    }

    pub fn alarm_config(value: AlarmConfig) -> Self {
        Page::AlarmConfig {
            value,
            editor: Editor::new(&[(12, AlarmField::Duration), (15, AlarmField::Enabled)]),
        }
    }

    pub fn relay_range(value: RelayConfig) -> Self {
        Page::RelayRange {
            value,
            editor: Editor::new(&[
                (3, RelayField::BeginHour),
                (6, RelayField::BeginMinute),
                (11, RelayField::EndHour),
                (14, RelayField::EndMinute),
            ]),
        }
    }

    pub fn system(value: SystemConfig) -> Self {
        Page::System {
            value,
            editor: Editor::new(&[(7, SystemField::Backlight), (17, SystemField::Chime)]),
        }
    }

    /// Edits only ever touch the working copy.
    pub fn process(&mut self, ev: MenuEvent) -> Verdict {
        match self {
            Page::Date { value, editor } | Page::Time { value, editor, .. } => {
                editor.process(ev, |field, forward| value.roll(field, forward))
            }
            Page::AlarmConfig { value, editor } => editor.process(ev, |field, forward| match field {
                AlarmField::Duration => {
                    value.duration = if forward {
                        (value.duration + 1).min(MAX_ALARM_DURATION)
                    } else {
                        value.duration.saturating_sub(1)
                    }
                }
                AlarmField::Enabled => value.enabled = forward,
            }),
            Page::RelayRange { value, editor } => editor.process(ev, |field, forward| match field {
                RelayField::BeginHour => value.time_beg.roll(Field::Hour, forward),
                RelayField::BeginMinute => value.time_beg.roll(Field::Minute, forward),
                RelayField::EndHour => value.time_end.roll(Field::Hour, forward),
                RelayField::EndMinute => value.time_end.roll(Field::Minute, forward),
            }),
            Page::System { value, editor } => editor.process(ev, |field, forward| match field {
                SystemField::Backlight => value.backlight = forward,
                SystemField::Chime => value.chime = forward,
            }),
        }
    }

    /// Value on row 1, cursor and hint below it.
    pub fn render<P: Ports>(&self, ports: &mut P) {
        match self {
            Page::Date { value, editor } => {
                ports.display(DisplayCommand::printf(
                    1,
                    4,
                    format_args!("{:04}.{:02}.{:02}", value.year(), value.month(), value.day()),
                ));
                editor.render(ports);
            }
            Page::Time {
                value,
                seconds,
                editor,
            } => {
                let cmd = if *seconds {
                    DisplayCommand::printf(
                        1,
                        4,
                        format_args!(
                            "{:02}:{:02}:{:02}",
                            value.hour(),
                            value.minute(),
                            value.second()
                        ),
                    )
                } else {
                    DisplayCommand::printf(
                        1,
                        4,
                        format_args!("{:02}:{:02}", value.hour(), value.minute()),
                    )
                };
                ports.display(cmd);
                editor.render(ports);
            }
            Page::AlarmConfig { value, editor } => {
                ports.display(DisplayCommand::printf(
                    1,
                    1,
                    format_args!("Duration: {:02}s {}", value.duration, on_off(value.enabled)),
                ));
                editor.render(ports);
            }
            Page::RelayRange { value, editor } => {
                ports.display(DisplayCommand::printf(
                    1,
                    2,
                    format_args!(
                        "{:02}:{:02} - {:02}:{:02}",
                        value.time_beg.hour(),
                        value.time_beg.minute(),
                        value.time_end.hour(),
                        value.time_end.minute()
                    ),
                ));
                editor.render(ports);
            }
            Page::System { value, editor } => {
                ports.display(DisplayCommand::printf(
                    1,
                    1,
                    format_args!(
                        "Light:{} Chime:{}",
                        on_off(value.backlight),
                        on_off(value.chime)
                    ),
                ));
                editor.render(ports);
            }
        }
    }
}
