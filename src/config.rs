//! Compile-time configuration.
//!
//! There is no persistent storage: every value here is what the appliance
//! starts with after power-up.

/// Text rows on the character display.
pub const DISPLAY_ROWS: u8 = 4;
/// Character cells per row.
pub const DISPLAY_COLS: u8 = 20;
/// Row used by the editing pages for the Select/Modify/Cancel/Apply hint.
pub const HINT_ROW: u8 = 3;

/// Period of the time engine, in milliseconds.
pub const TICK_PERIOD_MS: u32 = 1000;
/// Encoder polling period, in milliseconds.
pub const ENCODER_POLL_MS: u32 = 1;
/// Button debounce delay, in milliseconds.
pub const DEBOUNCE_MS: u32 = 20;
/// Temperature sampling period, in milliseconds.
pub const THERMO_PERIOD_MS: u32 = 2000;
/// Minimum change, in tenths of a degree, before a new temperature is reported.
pub const THERMO_EPSILON: i16 = 5;

/// Tick LED pulse: (LED on, hold time in ms) steps, played once per tick.
pub const TICK_LED_PULSE: [(bool, u32); 4] = [(true, 100), (false, 100), (true, 100), (false, 0)];

/// Power-up wall-clock time.
pub const DEFAULT_CLOCK: (u16, u8, u8, u8, u8, u8) = (2025, 6, 19, 11, 59, 55);
/// Power-up alarm: start time of day, ring duration in seconds, enabled.
pub const DEFAULT_ALARM: ((u8, u8, u8), u16, bool) = ((12, 0, 0), 10, true);
/// Power-up relay window: closes at, opens at, enabled.
pub const DEFAULT_RELAY: ((u8, u8, u8), (u8, u8, u8), bool) = ((12, 0, 0), (12, 1, 0), true);

/// Years reachable from the date page.
pub const MIN_YEAR: u16 = 2000;
pub const MAX_YEAR: u16 = 2099;

/// Longest alarm the alarm config page accepts, in seconds.
pub const MAX_ALARM_DURATION: u16 = 59;
