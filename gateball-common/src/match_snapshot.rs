use crate::{bundles::RedWhiteBundle, drawing_support::MATCH_DURATION_SECS, team::Team};
use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

/// Number of players on the court, across both teams
pub const ROSTER_SIZE: usize = 10;

/// All valid player numbers, in display order
pub const PLAYER_IDS: core::ops::RangeInclusive<u8> = 1..=(ROSTER_SIZE as u8);

pub fn is_valid_player(player_id: u8) -> bool {
    PLAYER_IDS.contains(&player_id)
}

#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[derivative(Default)]
    Lobby,
    Running,
    Paused,
    Finished,
}

impl MatchStatus {
    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

impl core::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Lobby => write!(f, "LOBBY"),
            Self::Running => write!(f, "RUNNING"),
            Self::Paused => write!(f, "PAUSED"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub status: MatchStatus,
    pub time_left: u16,
    pub player_scores: [u32; ROSTER_SIZE],
    pub team_scores: RedWhiteBundle<u32>,
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        Self {
            status: MatchStatus::Lobby,
            time_left: MATCH_DURATION_SECS,
            player_scores: [0; ROSTER_SIZE],
            team_scores: Default::default(),
        }
    }
}

impl MatchSnapshot {
    /// Returns `None` if `player_id` is not on the roster
    pub fn player_score(&self, player_id: u8) -> Option<u32> {
        if is_valid_player(player_id) {
            Some(self.player_scores[(player_id - 1) as usize])
        } else {
            None
        }
    }

    pub fn players(&self) -> impl Iterator<Item = (u8, Team, u32)> + '_ {
        PLAYER_IDS
            .zip(self.player_scores.iter())
            .map(|(id, score)| (id, Team::for_player(id), *score))
    }
}
