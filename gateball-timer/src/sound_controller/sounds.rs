use crate::cue_scheduler::Cue;
use web_audio_api::node::OscillatorType;

pub const SAMPLE_RATE: f32 = 44100.0;

/// One note of a cue, with times relative to the start of the cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Tone {
    pub freq: f32,
    pub start: f64,
    pub len: f64,
}

impl Tone {
    const fn new(freq: f32, start: f64, len: f64) -> Self {
        Self { freq, start, len }
    }

    pub fn end(&self) -> f64 {
        self.start + self.len
    }
}

const BEEP: [Tone; 1] = [Tone::new(880.0, 0.0, 0.15)];

const ALERT: [Tone; 3] = [
    Tone::new(1320.0, 0.0, 0.15),
    Tone::new(1320.0, 0.25, 0.15),
    Tone::new(1320.0, 0.5, 0.15),
];

const START: [Tone; 3] = [
    Tone::new(660.0, 0.0, 0.25),
    Tone::new(880.0, 0.3, 0.25),
    Tone::new(1320.0, 0.6, 0.5),
];

// Parts 2 to 4 are announced with one horn blast per part number
const HORN_FREQ: f32 = 523.25;
const HORN_LEN: f64 = 0.5;
const HORN_GAP: f64 = 0.25;

const END: [Tone; 2] = [Tone::new(440.0, 0.0, 1.0), Tone::new(330.0, 1.0, 1.0)];

fn horn(blasts: u8) -> Vec<Tone> {
    (0..blasts)
        .map(|i| Tone::new(HORN_FREQ, f64::from(i) * (HORN_LEN + HORN_GAP), HORN_LEN))
        .collect()
}

pub(super) fn wave_type(cue: Cue) -> OscillatorType {
    match cue {
        Cue::Beep | Cue::Alert => OscillatorType::Sine,
        Cue::Parte1 | Cue::Parte2 | Cue::Parte3 | Cue::Parte4 | Cue::Parte5 => {
            OscillatorType::Square
        }
    }
}

pub(super) fn tones(cue: Cue) -> Vec<Tone> {
    match cue {
        Cue::Parte1 => START.to_vec(),
        Cue::Parte2 => horn(2),
        Cue::Parte3 => horn(3),
        Cue::Parte4 => horn(4),
        Cue::Parte5 => END.to_vec(),
        Cue::Alert => ALERT.to_vec(),
        Cue::Beep => BEEP.to_vec(),
    }
}

/// Length of the whole cue, in seconds
pub(super) fn cue_len(cue: Cue) -> f64 {
    tones(cue).iter().map(Tone::end).fold(0.0, f64::max)
}

/// Plays cues one after the other. A cue requested while another is still sounding waits
/// for it to finish instead of cutting it off.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct CueQueue {
    busy_until: f64,
}

impl CueQueue {
    /// Returns the context time at which a cue requested at `now` should start
    pub fn schedule(&mut self, now: f64, cue: Cue) -> f64 {
        let start = now.max(self.busy_until);
        self.busy_until = start + cue_len(cue);
        start
    }
}
