use enum_iterator::Sequence;
use gateball_common::{drawing_support::MATCH_DURATION_SECS, match_snapshot::MatchStatus};
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minute marks, counted as time left, at which the alert sounds
pub const ALERT_MINUTES: [u16; 5] = [15, 10, 5, 2, 1];

/// The beep sounds every second once this many seconds or fewer remain
pub const FINAL_BEEP_SECS: u16 = 10;

const PART_2_ELAPSED: u16 = 900;
const PART_3_ELAPSED: u16 = 1200;
const PART_4_ELAPSED: u16 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Parte1,
    Parte2,
    Parte3,
    Parte4,
    Parte5,
    Alert,
    Beep,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Self::Parte1 => "parte1",
            Self::Parte2 => "parte2",
            Self::Parte3 => "parte3",
            Self::Parte4 => "parte4",
            Self::Parte5 => "parte5",
            Self::Alert => "alert",
            Self::Beep => "beep",
        }
    }
}

impl core::fmt::Display for Cue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The cues that belong to the tick leaving `time_left` on the clock. `Parte1` is never
/// returned here, it belongs to the start of the match rather than to a tick.
pub fn cues_due_at(time_left: u16) -> Vec<Cue> {
    let elapsed = MATCH_DURATION_SECS.saturating_sub(time_left);
    let minutes = time_left / 60;
    let seconds = time_left % 60;

    let mut cues = Vec::new();
    if elapsed == PART_2_ELAPSED {
        cues.push(Cue::Parte2);
    }
    if elapsed == PART_3_ELAPSED {
        cues.push(Cue::Parte3);
    }
    if elapsed == PART_4_ELAPSED {
        cues.push(Cue::Parte4);
    }
    if time_left == 0 {
        cues.push(Cue::Parte5);
    }
    if seconds == 0 && ALERT_MINUTES.contains(&minutes) {
        cues.push(Cue::Alert);
    }
    if time_left > 0 && time_left <= FINAL_BEEP_SECS {
        cues.push(Cue::Beep);
    }
    cues
}

/// Watches the `(status, time left)` pairs coming out of the match clock and decides
/// which cues to play.
///
/// Every cue is tied to the instant (clock value) it fired at, and an instant never fires
/// twice until the match goes back to the lobby. Observing the same pair again, such as
/// when resuming on the exact second a cue sounded, is therefore harmless.
#[derive(Debug, Clone, PartialEq)]
pub struct CueScheduler {
    last: (MatchStatus, u16),
    fired: HashSet<(Cue, u16)>,
}

impl Default for CueScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl CueScheduler {
    pub fn new() -> Self {
        Self {
            last: (MatchStatus::Lobby, MATCH_DURATION_SECS),
            fired: HashSet::new(),
        }
    }

    /// Returns the cues due for this observation, in the order they should be played
    pub fn observe(&mut self, status: MatchStatus, time_left: u16) -> Vec<Cue> {
        let (prev_status, _) = self.last;
        self.last = (status, time_left);

        let mut due = Vec::new();
        match status {
            MatchStatus::Lobby => {
                if !self.fired.is_empty() {
                    debug!("Back in the lobby, clearing {} fired cues", self.fired.len());
                    self.fired.clear();
                }
            }
            MatchStatus::Running => {
                if prev_status == MatchStatus::Lobby {
                    due.push(Cue::Parte1);
                }
                due.extend(cues_due_at(time_left));
            }
            MatchStatus::Paused | MatchStatus::Finished => {}
        }

        due.retain(|cue| {
            let first_time = self.fired.insert((*cue, time_left));
            if !first_time {
                trace!("Cue {cue} already played at {time_left}s left, skipping");
            }
            first_time
        });
        due
    }
}
