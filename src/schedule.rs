//! Scheduler task: owns the alarm and relay windows.
//!
//! Window events are turned into actuator and sound commands here and are
//! also forwarded to the UI, which keeps its own copy of the last snapshot.

use crate::events::{ActuatorCommand, SchedulerCommand, SoundCue, UiEvent};
use crate::ports::Ports;
use crate::window::{
    Alarm, AlarmConfig, AlarmEvent, Relay, RelayConfig, RelayEvent, Transition,
};
use crate::Error;

pub struct Schedules {
    alarm: Alarm,
    relay: Relay,
}

impl Schedules {
    pub fn new(alarm: AlarmConfig, relay: RelayConfig) -> Self {
        Self {
            alarm: Alarm::new("alarm", alarm),
            relay: Relay::new("relay", relay),
        }
    }

    pub fn with_defaults() -> Result<Self, Error> {
        Ok(Self::new(
            AlarmConfig::with_defaults()?,
            RelayConfig::with_defaults()?,
        ))
    }

    /// Replays the current configuration as `Reconfigured` events so the UI
    /// starts with a complete picture.
    pub fn announce<P: Ports>(&mut self, ports: &mut P) {
        self.handle(SchedulerCommand::SetAlarmConfig(self.alarm.config()), ports);
        self.handle(SchedulerCommand::SetRelayConfig(self.relay.config()), ports);
    }

    pub fn handle<P: Ports>(&mut self, cmd: SchedulerCommand, ports: &mut P) {
        match cmd {
            SchedulerCommand::Evaluate(now) => {
                if let Some(ev) = self.alarm.process_current_time(now) {
                    on_alarm(ev, ports);
                }
                if let Some(ev) = self.relay.process_current_time(now) {
                    on_relay(ev, ports);
                }
            }
            SchedulerCommand::SetAlarmConfig(config) => {
                for ev in self.alarm.set_config(config) {
                    on_alarm(ev, ports);
                }
            }
            SchedulerCommand::SetRelayConfig(config) => {
                for ev in self.relay.set_config(config) {
                    on_relay(ev, ports);
                }
            }
        }
    }

    pub fn alarm(&self) -> &Alarm {
        &self.alarm
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }
}

fn on_alarm<P: Ports>(ev: AlarmEvent, ports: &mut P) {
    match ev.transition {
        Transition::On => {
            ports.actuator(ActuatorCommand::SetAlarmOutput(true));
            ports.sound(SoundCue::AlarmStart);
        }
        Transition::Off => {
            ports.actuator(ActuatorCommand::SetAlarmOutput(false));
            ports.sound(SoundCue::Silence);
        }
        Transition::Reconfigured => {}
    }
    ports.ui(UiEvent::Alarm(ev));
}

fn on_relay<P: Ports>(ev: RelayEvent, ports: &mut P) {
    match ev.transition {
        Transition::On | Transition::Off => {
            ports.actuator(ActuatorCommand::SetRelayOutput(ev.state.ringing));
            ports.sound(SoundCue::MenuBeep);
        }
        Transition::Reconfigured => {}
    }
    ports.ui(UiEvent::Relay(ev));
}
