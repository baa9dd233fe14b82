//! On/off time windows for the alarm buzzer and the relay.
//!
//! Both outputs share one algorithm, [`WindowScheduler`], and differ only in
//! how their configuration describes the window. Membership is evaluated on
//! the time of day alone and is closed-open: `begin <= t < end`. A window
//! whose begin is later than its end spans midnight.

use time::{Duration, Time};

use crate::config::{DEFAULT_ALARM, DEFAULT_RELAY};
use crate::datetime::DateTime;
use crate::Error;

/// What a scheduler needs to know about its window.
pub trait WindowConfig: Copy {
    fn begin(&self) -> Time;
    fn end(&self) -> Time;
    fn enabled(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    /// Only the time of day is used.
    pub time_beg: DateTime,
    /// Ring time in seconds.
    pub duration: u16,
    pub enabled: bool,
}

impl AlarmConfig {
    pub fn with_defaults() -> Result<Self, Error> {
        let ((hour, minute, second), duration, enabled) = DEFAULT_ALARM;
        Ok(Self {
            time_beg: DateTime::from_hms(hour, minute, second)?,
            duration,
            enabled,
        })
    }

    /// `time_beg + duration`, wrapping past midnight.
    pub fn time_end(&self) -> Time {
        self.time_beg.time_of_day() + Duration::seconds(i64::from(self.duration))
    }
}

impl WindowConfig for AlarmConfig {
    fn begin(&self) -> Time {
        self.time_beg.time_of_day()
    }

    fn end(&self) -> Time {
        self.time_end()
    }

    fn enabled(&self) -> bool {
        self.enabled
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayConfig {
    pub time_beg: DateTime,
    pub time_end: DateTime,
    pub enabled: bool,
}

impl RelayConfig {
    pub fn with_defaults() -> Result<Self, Error> {
        let ((bh, bm, bs), (eh, em, es), enabled) = DEFAULT_RELAY;
        Ok(Self {
            time_beg: DateTime::from_hms(bh, bm, bs)?,
            time_end: DateTime::from_hms(eh, em, es)?,
            enabled,
        })
    }
}

impl WindowConfig for RelayConfig {
    fn begin(&self) -> Time {
        self.time_beg.time_of_day()
    }

    fn end(&self) -> Time {
        self.time_end.time_of_day()
    }

    fn enabled(&self) -> bool {
        self.enabled
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowState {
    /// Output asserted: buzzer sounding or relay closed.
    pub ringing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    On,
    Off,
    Reconfigured,
}

/// A transition together with a full snapshot of the scheduler, so consumers
/// never have to ask the scheduler for its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowEvent<C> {
    pub transition: Transition,
    pub state: WindowState,
    pub config: C,
}

pub type AlarmEvent = WindowEvent<AlarmConfig>;
pub type RelayEvent = WindowEvent<RelayConfig>;

fn contains(begin: Time, end: Time, t: Time) -> bool {
    if begin <= end {
        begin <= t && t < end
    } else {
        t >= begin || t < end
    }
}

pub struct WindowScheduler<C> {
    name: &'static str,
    config: C,
    state: WindowState,
}

pub type Alarm = WindowScheduler<AlarmConfig>;
pub type Relay = WindowScheduler<RelayConfig>;

impl<C: WindowConfig> WindowScheduler<C> {
    pub fn new(name: &'static str, config: C) -> Self {
        Self {
            name,
            config,
            state: WindowState::default(),
        }
    }

    /// Evaluate the window at `now`; at most one transition per call.
    ///
    /// A disabled window is not evaluated at all.
    pub fn process_current_time(&mut self, now: DateTime) -> Option<WindowEvent<C>> {
        if !self.config.enabled() {
            return None;
        }
        let inside = contains(self.config.begin(), self.config.end(), now.time_of_day());
        let transition = match (inside, self.state.ringing) {
            (true, false) => Transition::On,
            (false, true) => Transition::Off,
            _ => return None,
        };
        self.state.ringing = transition == Transition::On;
        info!("{} {} at {}", self.name, transition, now);
        Some(self.event(transition))
    }

    /// Replace the configuration.
    ///
    /// Always reports `Reconfigured`. Disabling a ringing window first
    /// reports `Off`.
    pub fn set_config(&mut self, config: C) -> heapless::Vec<WindowEvent<C>, 2> {
        let mut events = heapless::Vec::new();
        self.config = config;
        if !config.enabled() && self.state.ringing {
            self.state.ringing = false;
            info!("{} forced off", self.name);
            events.push(self.event(Transition::Off)).ok();
        }
        info!("{} reconfigured", self.name);
        events.push(self.event(Transition::Reconfigured)).ok();
        events
    }

    pub fn config(&self) -> C {
        self.config
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    fn event(&self, transition: Transition) -> WindowEvent<C> {
        WindowEvent {
            transition,
            state: self.state,
            config: self.config,
        }
    }
}
