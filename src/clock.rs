//! Time engine.

use crate::config::DEFAULT_CLOCK;
use crate::datetime::DateTime;
use crate::Error;

/// Emitted by the clock once per advanced second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEvent {
    Tick { now: DateTime },
}

/// Messages accepted by the clock task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockCommand {
    /// The periodic timer fired.
    Period,
    /// Replace the whole date and time.
    SetTime(DateTime),
    /// Replace only the calendar date, keeping the running time of day.
    SetDate(DateTime),
    /// Replace only the time of day, keeping the calendar date.
    SetTimeOfDay(DateTime),
    Pause,
    Resume,
}

pub struct Clock {
    now: DateTime,
    running: bool,
}

impl Clock {
    pub fn new(now: DateTime) -> Self {
        Self { now, running: true }
    }

    /// Clock set to the power-up time from [`crate::config`].
    pub fn with_defaults() -> Result<Self, Error> {
        let (year, month, day, hour, minute, second) = DEFAULT_CLOCK;
        let now = DateTime::from_ymd_hms(year, month, day, hour, minute, second)?;
        Ok(Self::new(now))
    }

    /// Advance by exactly one second. Never fails; the returned event carries
    /// the new time.
    pub fn tick(&mut self) -> ClockEvent {
        self.now.increment_second();
        trace!("tick {}", self.now);
        ClockEvent::Tick { now: self.now }
    }

    pub fn handle(&mut self, cmd: ClockCommand) -> Option<ClockEvent> {
        match cmd {
            ClockCommand::Period if self.running => return Some(self.tick()),
            ClockCommand::Period => {}
            ClockCommand::SetTime(t) => self.set_current_time(t),
            ClockCommand::SetDate(t) => self.set_current_time(self.now.with_date_of(t)),
            ClockCommand::SetTimeOfDay(t) => self.set_current_time(self.now.with_time_of(t)),
            ClockCommand::Pause => self.pause(),
            ClockCommand::Resume => self.resume(),
        }
        None
    }

    pub fn set_current_time(&mut self, now: DateTime) {
        info!("clock set to {}", now);
        self.now = now;
    }

    pub fn current_time(&self) -> DateTime {
        self.now
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
