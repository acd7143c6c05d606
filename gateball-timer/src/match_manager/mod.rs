use gateball_common::{
    drawing_support::{MATCH_DURATION_SECS, secs_to_time_string},
    match_snapshot::{MatchSnapshot, MatchStatus},
};
use log::*;
use std::cmp::min;
use thiserror::Error;
use tokio::{
    sync::watch,
    time::{Duration, Instant},
};

mod score_board;
pub use score_board::ScoreBoard;

pub type Result<T> = std::result::Result<T, MatchManagerError>;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum MatchManagerError {
    #[error("The `now` value passed is not valid")]
    InvalidNowValue,
}

/// Owns the match clock and the scoreboard. All time-dependent methods take an explicit
/// `now` so that the caller decides what time it is.
#[derive(Debug)]
pub struct MatchManager {
    status: MatchStatus,
    clock_state: ClockState,
    scores: ScoreBoard,
    start_stop_tx: watch::Sender<bool>,
    start_stop_rx: watch::Receiver<bool>,
}

impl Default for MatchManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchManager {
    pub fn new() -> Self {
        let (start_stop_tx, start_stop_rx) = watch::channel(false);
        Self {
            status: MatchStatus::Lobby,
            clock_state: ClockState::Stopped {
                clock_time: MATCH_DURATION_SECS,
            },
            scores: ScoreBoard::new(),
            start_stop_tx,
            start_stop_rx,
        }
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn clock_is_running(&self) -> bool {
        self.clock_state.is_running()
    }

    /// Seconds left in the match, as of the last processed tick
    pub fn game_clock_time(&self) -> u16 {
        self.clock_state.clock_time()
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn get_start_stop_rx(&self) -> watch::Receiver<bool> {
        self.start_stop_rx.clone()
    }

    fn send_clock_running(&self, running: bool) {
        self.start_stop_tx.send_replace(running);
    }

    /// Starts the match from the lobby, or resumes it after a pause. Does nothing in any
    /// other state.
    pub fn start_clock(&mut self, now: Instant) {
        match self.status {
            MatchStatus::Lobby | MatchStatus::Paused => {
                let clock_time = self.clock_state.clock_time();
                if self.status == MatchStatus::Lobby {
                    info!("{} Starting the match", self.status_string());
                } else {
                    info!("{} Resuming the match", self.status_string());
                }
                self.status = MatchStatus::Running;
                self.clock_state = ClockState::CountingDown {
                    start_time: now,
                    time_remaining_at_start: clock_time,
                    clock_time,
                };
                self.send_clock_running(true);
            }
            MatchStatus::Running | MatchStatus::Finished => {
                debug!("{} Ignoring start request", self.status_string());
            }
        }
    }

    /// Pauses a running match. Any partial second is discarded, so the next resume begins
    /// a fresh one-second interval. Does nothing in any other state.
    pub fn stop_clock(&mut self, _now: Instant) {
        match self.status {
            MatchStatus::Running => {
                self.status = MatchStatus::Paused;
                self.clock_state = ClockState::Stopped {
                    clock_time: self.clock_state.clock_time(),
                };
                info!("{} Pausing the match", self.status_string());
                self.send_clock_running(false);
            }
            MatchStatus::Lobby | MatchStatus::Paused | MatchStatus::Finished => {
                debug!("{} Ignoring pause request", self.status_string());
            }
        }
    }

    /// Single control for starting, pausing, and resuming. Returns the resulting status.
    pub fn toggle(&mut self, now: Instant) -> MatchStatus {
        match self.status {
            MatchStatus::Lobby | MatchStatus::Paused => self.start_clock(now),
            MatchStatus::Running => self.stop_clock(now),
            MatchStatus::Finished => {
                debug!("{} Ignoring toggle after the end", self.status_string())
            }
        }
        self.status
    }

    pub fn reset_match(&mut self, _now: Instant) {
        info!("{} Resetting the match", self.status_string());
        self.status = MatchStatus::Lobby;
        self.clock_state = ClockState::Stopped {
            clock_time: MATCH_DURATION_SECS,
        };
        self.scores.clear();
        self.send_clock_running(false);
    }

    /// Adds one goal for `player_id`. Unknown players are ignored and `false` is returned.
    pub fn add_score(&mut self, player_id: u8) -> bool {
        if self.scores.add_score(player_id) {
            info!(
                "{} Score by {} player #{player_id}, scores are now {}",
                self.status_string(),
                gateball_common::team::Team::for_player(player_id),
                self.scores.team_scores()
            );
            true
        } else {
            warn!(
                "{} Ignoring score for unknown player #{player_id}",
                self.status_string()
            );
            false
        }
    }

    /// Processes every whole second that has passed by `now`, in order. Returns the clock
    /// value after each tick, so no value is skipped even if the caller wakes up late.
    pub fn update(&mut self, now: Instant) -> Result<Vec<u16>> {
        let mut ticks = Vec::new();

        if let ClockState::CountingDown {
            start_time,
            time_remaining_at_start,
            ref mut clock_time,
        } = self.clock_state
        {
            let elapsed = now
                .checked_duration_since(start_time)
                .ok_or(MatchManagerError::InvalidNowValue)?;
            let elapsed_secs = min(elapsed.as_secs(), u64::from(u16::MAX)) as u16;
            let target = time_remaining_at_start.saturating_sub(elapsed_secs);

            while *clock_time > target {
                *clock_time -= 1;
                ticks.push(*clock_time);
            }
        }

        if let Some(last) = ticks.last() {
            trace!("{} Processed {} tick(s)", self.status_string(), ticks.len());
            if *last == 0 {
                self.end_match();
            }
        }

        Ok(ticks)
    }

    fn end_match(&mut self) {
        self.status = MatchStatus::Finished;
        self.clock_state = ClockState::Stopped { clock_time: 0 };
        info!(
            "{} Match over, final scores {}",
            self.status_string(),
            self.scores.team_scores()
        );
        self.send_clock_running(false);
    }

    /// When the next tick is due, or `None` if the clock isn't running
    pub fn next_update_time(&self) -> Option<Instant> {
        match self.clock_state {
            ClockState::CountingDown {
                start_time,
                time_remaining_at_start,
                clock_time,
            } => {
                let next_tick = u64::from(time_remaining_at_start - clock_time) + 1;
                Some(start_time + Duration::from_secs(next_tick))
            }
            ClockState::Stopped { .. } => None,
        }
    }

    pub fn generate_snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            status: self.status,
            time_left: self.clock_state.clock_time(),
            player_scores: self.scores.player_scores(),
            team_scores: self.scores.team_scores(),
        }
    }

    fn status_string(&self) -> String {
        format!(
            "[{} {:8}]",
            secs_to_time_string(self.clock_state.clock_time()),
            self.status.to_string()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ClockState {
    Stopped {
        clock_time: u16,
    },
    CountingDown {
        start_time: Instant,
        time_remaining_at_start: u16,
        clock_time: u16,
    },
}

impl ClockState {
    fn is_running(&self) -> bool {
        match self {
            ClockState::CountingDown { .. } => true,
            ClockState::Stopped { .. } => false,
        }
    }

    fn clock_time(&self) -> u16 {
        match self {
            ClockState::CountingDown { clock_time, .. } | ClockState::Stopped { clock_time } => {
                *clock_time
            }
        }
    }
}
