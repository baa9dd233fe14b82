//! Tone sequencing for the piezo buzzer.
//!
//! [`Player`] turns a [`SoundCue`] into a stream of [`Step`]s; the firmware
//! drives the PWM channel with each step and asks for the next one once its
//! hold time has elapsed. Cues arriving while one plays wait their turn. Every note sounds for nine tenths of its length
//! and is followed by a short gap so repeated notes stay distinct.

use heapless::Deque;

use crate::events::SoundCue;

/// (frequency in Hz, length in ms); a zero frequency is a rest.
pub type Note = (u16, u16);

const MENU_BEEP: &[Note] = &[(1000, 50)];
const ALARM_START: &[Note] = &[(1000, 100), (0, 100), (1200, 100), (0, 100)];
const HOURLY_CHIME: &[Note] = &[(800, 200), (0, 200), (600, 200), (0, 200)];

/// Pause between two loops of a melody, in ms.
const MELODY_PAUSE_MS: u32 = 1000;

pub const MELODIES: &[&[Note]] = &[
    &[
        (0, 42),
        (1175, 167),
        (784, 167),
        (784, 167),
        (1175, 167),
        (784, 167),
        (784, 167),
        (1175, 167),
        (784, 167),
        (1244, 167),
        (784, 167),
        (1109, 167),
        (740, 167),
        (740, 167),
        (1109, 167),
        (740, 167),
        (740, 167),
        (1109, 167),
        (740, 167),
        (1175, 167),
        (740, 167),
    ],
    &[
        (659, 333),
        (659, 333),
        (587, 167),
        (659, 333),
        (784, 333),
        (659, 1000),
        (0, 333),
        (1318, 500),
        (1976, 500),
        (1760, 500),
        (1568, 500),
        (1397, 333),
        (659, 333),
        (659, 333),
        (587, 167),
        (1175, 375),
        (1318, 375),
        (1175, 562),
        (988, 375),
    ],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Output {
    Tone(u16),
    Quiet,
}

/// Hold `output` for `hold_ms` milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    pub output: Output,
    pub hold_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Repeat {
    Times(u8),
    Forever,
}

#[derive(Clone, Copy)]
struct Score {
    notes: &'static [Note],
    repeat: Repeat,
}

fn score(cue: SoundCue) -> Option<Score> {
    let (notes, repeat) = match cue {
        SoundCue::MenuBeep => (MENU_BEEP, Repeat::Times(1)),
        SoundCue::AlarmStart => (ALARM_START, Repeat::Times(10)),
        SoundCue::HourlyChime => (HOURLY_CHIME, Repeat::Times(1)),
        SoundCue::Melody(i) => match MELODIES.get(usize::from(i)) {
            Some(notes) => (*notes, Repeat::Forever),
            None => {
                warn!("no melody {}", i);
                return None;
            }
        },
        SoundCue::Silence => return None,
    };
    Some(Score { notes, repeat })
}

/// Cues waiting behind the one being played.
pub const PENDING_CUES: usize = 4;

/// What the buzzer should do after a new cue arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cued {
    /// The player was idle; output this step now.
    Play(Step),
    /// Something is playing; the cue follows it.
    Queued,
    /// Go quiet and forget any scheduled step.
    Stopped,
}

pub struct Player {
    score: Option<Score>,
    pos: usize,
    loops: u8,
    gap_ms: Option<u32>,
    pending: Deque<SoundCue, PENDING_CUES>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub const fn new() -> Self {
        Self {
            score: None,
            pos: 0,
            loops: 0,
            gap_ms: None,
            pending: Deque::new(),
        }
    }

    /// Cues play one after another in arrival order. `Silence` cuts the
    /// current cue and drops the waiting ones.
    pub fn cue(&mut self, cue: SoundCue) -> Cued {
        if cue == SoundCue::Silence {
            debug!("sound silenced");
            *self = Self::new();
            return Cued::Stopped;
        }
        if self.is_playing() {
            if self.pending.push_back(cue).is_err() {
                warn!("sound queue full, {} dropped", cue);
            }
            return Cued::Queued;
        }
        self.load(cue);
        match self.next() {
            Some(step) => Cued::Play(step),
            None => Cued::Stopped,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.score.is_some()
    }

    fn load(&mut self, cue: SoundCue) {
        debug!("sound {}", cue);
        self.score = score(cue);
        self.pos = 0;
        self.loops = 0;
        self.gap_ms = None;
    }

    /// Step following the one just finished, `None` once nothing is left.
    pub fn next(&mut self) -> Option<Step> {
        loop {
            let Some(score) = self.score else {
                let cue = self.pending.pop_front()?;
                self.load(cue);
                continue;
            };
            if let Some(gap) = self.gap_ms.take() {
                return Some(Step {
                    output: Output::Quiet,
                    hold_ms: gap,
                });
            }
            if let Some(&(freq, ms)) = score.notes.get(self.pos) {
                self.pos += 1;
                let gap = u32::from(ms / 10);
                self.gap_ms = Some(gap);
                let output = if freq > 0 {
                    Output::Tone(freq)
                } else {
                    Output::Quiet
                };
                return Some(Step {
                    output,
                    hold_ms: u32::from(ms) - gap,
                });
            }

            self.pos = 0;
            self.loops = self.loops.saturating_add(1);
            match score.repeat {
                Repeat::Times(n) if self.loops >= n => self.score = None,
                Repeat::Times(_) => {}
                // a melody yields to waiting cues at the end of a round
                Repeat::Forever if !self.pending.is_empty() => self.score = None,
                Repeat::Forever => {
                    return Some(Step {
                        output: Output::Quiet,
                        hold_ms: MELODY_PAUSE_MS,
                    })
                }
            }
        }
    }
}
