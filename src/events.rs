//! Message types exchanged between tasks.
//!
//! Everything here is a plain `Copy`-able value: queues carry snapshots,
//! never references into another task's state.

use crate::clock::ClockEvent;
use crate::datetime::DateTime;
use crate::window::{AlarmConfig, AlarmEvent, RelayConfig, RelayEvent};

/// Raw, already debounced input from the rotary encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderEvent {
    RotatedRight,
    RotatedLeft,
    Pressed,
}

/// Input as the menu understands it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuEvent {
    MoveFwd,
    MoveBack,
    PushButton,
}

impl From<EncoderEvent> for MenuEvent {
    fn from(ev: EncoderEvent) -> Self {
        match ev {
            EncoderEvent::RotatedRight => MenuEvent::MoveFwd,
            EncoderEvent::RotatedLeft => MenuEvent::MoveBack,
            EncoderEvent::Pressed => MenuEvent::PushButton,
        }
    }
}

/// Everything the UI task consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiEvent {
    Menu(MenuEvent),
    Clock(ClockEvent),
    Alarm(AlarmEvent),
    Relay(RelayEvent),
    /// Tenths of a degree Celsius.
    Temperature(i16),
}

impl From<EncoderEvent> for UiEvent {
    fn from(ev: EncoderEvent) -> Self {
        UiEvent::Menu(ev.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerCommand {
    /// Evaluate both windows at this time.
    Evaluate(DateTime),
    SetAlarmConfig(AlarmConfig),
    SetRelayConfig(RelayConfig),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorCommand {
    SetAlarmOutput(bool),
    SetRelayOutput(bool),
    PulseTickLed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundCue {
    MenuBeep,
    AlarmStart,
    HourlyChime,
    /// One of the built-in tunes, see [`crate::sound::MELODIES`]. Loops
    /// until `Silence`. Nothing in the core sends it.
    Melody(u8),
    Silence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_maps_one_to_one() {
        assert_eq!(MenuEvent::from(EncoderEvent::RotatedRight), MenuEvent::MoveFwd);
        assert_eq!(MenuEvent::from(EncoderEvent::RotatedLeft), MenuEvent::MoveBack);
        assert_eq!(MenuEvent::from(EncoderEvent::Pressed), MenuEvent::PushButton);
        assert_eq!(
            UiEvent::from(EncoderEvent::Pressed),
            UiEvent::Menu(MenuEvent::PushButton)
        );
    }
}
