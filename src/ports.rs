//! Outgoing queues as seen by the core.
//!
//! The firmware implements this with RTIC `spawn` calls; every method is a
//! fire-and-forget send and must not block.

use crate::clock::ClockCommand;
use crate::display::DisplayCommand;
use crate::events::{ActuatorCommand, SchedulerCommand, SoundCue, UiEvent};

pub trait Ports {
    fn display(&mut self, cmd: DisplayCommand);
    fn clock(&mut self, cmd: ClockCommand);
    fn scheduler(&mut self, cmd: SchedulerCommand);
    fn ui(&mut self, ev: UiEvent);
    fn actuator(&mut self, cmd: ActuatorCommand);
    fn sound(&mut self, cue: SoundCue);
}
