use crate::{
    cue_scheduler::{Cue, CueScheduler},
    match_manager::{MatchManager, Result},
    sound_controller::AudioPort,
};
use gateball_common::match_snapshot::{MatchSnapshot, MatchStatus};
use log::*;
use tokio::{sync::watch, time::Instant};

/// Everything one scoreboard needs for a match: the clock and scores, the cue scheduler,
/// and the audio output. Every command and tick goes through here, one at a time.
pub struct GameSession<A: AudioPort> {
    manager: MatchManager,
    scheduler: CueScheduler,
    audio: A,
}

impl<A: AudioPort> GameSession<A> {
    pub fn new(audio: A) -> Self {
        Self {
            manager: MatchManager::new(),
            scheduler: CueScheduler::new(),
            audio,
        }
    }

    pub fn manager(&self) -> &MatchManager {
        &self.manager
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.manager.generate_snapshot()
    }

    pub fn next_update_time(&self) -> Option<Instant> {
        self.manager.next_update_time()
    }

    pub fn get_start_stop_rx(&self) -> watch::Receiver<bool> {
        self.manager.get_start_stop_rx()
    }

    /// Start, pause, or resume, depending on where the match is
    pub fn toggle(&mut self, now: Instant) -> MatchSnapshot {
        self.user_interaction();
        self.manager.toggle(now);
        self.observe_status();
        self.snapshot()
    }

    pub fn reset(&mut self, now: Instant) -> MatchSnapshot {
        self.user_interaction();
        self.manager.reset_match(now);
        self.observe_status();
        self.snapshot()
    }

    /// Returns false if `player_id` isn't on the roster
    pub fn record_score(&mut self, player_id: u8) -> bool {
        self.user_interaction();
        self.manager.add_score(player_id)
    }

    /// Runs any ticks that are due. Returns the new snapshot if the clock changed.
    pub fn update(&mut self, now: Instant) -> Result<Option<MatchSnapshot>> {
        let ticks = self.manager.update(now)?;
        if ticks.is_empty() {
            return Ok(None);
        }

        // Every tick happened while the clock was running, even the one that ended the match
        for time_left in ticks {
            let cues = self.scheduler.observe(MatchStatus::Running, time_left);
            self.play_all(cues);
        }
        self.observe_status();

        Ok(Some(self.snapshot()))
    }

    fn observe_status(&mut self) {
        let cues = self
            .scheduler
            .observe(self.manager.status(), self.manager.game_clock_time());
        self.play_all(cues);
    }

    fn play_all(&mut self, cues: Vec<Cue>) {
        for cue in cues {
            debug!("Requesting cue {cue}");
            self.audio.play(cue);
        }
    }

    fn user_interaction(&mut self) {
        if !self.audio.is_initialized() {
            self.audio.initialize();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use gateball_common::bundles::RedWhiteBundle;
    use tokio::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum AudioEvent {
        Initialize,
        Play(Cue),
    }

    #[derive(Debug, Default)]
    struct RecordingAudio {
        initialized: bool,
        events: Vec<AudioEvent>,
    }

    impl RecordingAudio {
        fn played(&self) -> Vec<Cue> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    AudioEvent::Play(cue) => Some(*cue),
                    AudioEvent::Initialize => None,
                })
                .collect()
        }
    }

    impl AudioPort for RecordingAudio {
        fn initialize(&mut self) {
            self.initialized = true;
            self.events.push(AudioEvent::Initialize);
        }

        fn is_initialized(&self) -> bool {
            self.initialized
        }

        fn play(&mut self, cue: Cue) {
            assert!(self.initialized, "played {cue} before initializing");
            self.events.push(AudioEvent::Play(cue));
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_full_match() {
        let mut session = GameSession::new(RecordingAudio::default());
        let start = Instant::now();

        let snapshot = session.toggle(start);
        assert_eq!(
            session.audio().events,
            vec![AudioEvent::Initialize, AudioEvent::Play(Cue::Parte1)]
        );
        assert_eq!(snapshot.status, MatchStatus::Running);
        assert_eq!(snapshot.time_left, 1800);

        for s in 1..=1800 {
            let snapshot = session.update(start + secs(s)).unwrap().unwrap();
            assert_eq!(snapshot.time_left, 1800 - s as u16);
        }

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, MatchStatus::Finished);
        assert_eq!(snapshot.time_left, 0);

        let played = session.audio().played();
        assert_eq!(played.first(), Some(&Cue::Parte1));
        assert_eq!(played.last(), Some(&Cue::Parte5));
        assert_eq!(played.iter().filter(|c| **c == Cue::Parte2).count(), 1);
        assert_eq!(played.iter().filter(|c| **c == Cue::Alert).count(), 5);
        assert_eq!(played.iter().filter(|c| **c == Cue::Beep).count(), 10);
        assert_eq!(played.len(), 20);

        assert_eq!(session.update(start + secs(1900)), Ok(None));
        assert_eq!(session.audio().played().len(), 20);
    }

    #[test]
    fn test_late_wakeup_plays_every_cue() {
        let mut session = GameSession::new(RecordingAudio::default());
        let start = Instant::now();

        session.toggle(start);
        session.update(start + secs(1795)).unwrap();
        assert_eq!(session.manager().game_clock_time(), 5);
        assert_eq!(
            session
                .audio()
                .played()
                .iter()
                .filter(|c| **c == Cue::Beep)
                .count(),
            5
        );
    }

    #[test]
    fn test_pause_on_cue_second_does_not_repeat_it() {
        let mut session = GameSession::new(RecordingAudio::default());
        let start = Instant::now();

        session.toggle(start);
        session.update(start + secs(900)).unwrap();
        assert_eq!(
            session.audio().played(),
            vec![Cue::Parte1, Cue::Parte2, Cue::Alert]
        );

        let pause = start + secs(900);
        assert_eq!(session.toggle(pause).status, MatchStatus::Paused);
        assert_eq!(session.toggle(pause + secs(30)).status, MatchStatus::Running);
        assert_eq!(
            session.audio().played(),
            vec![Cue::Parte1, Cue::Parte2, Cue::Alert]
        );
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = GameSession::new(RecordingAudio::default());
        let start = Instant::now();

        session.toggle(start);
        session.update(start + secs(50)).unwrap();
        assert_eq!(session.snapshot().time_left, 1750);

        let pause = start + secs(50);
        session.toggle(pause);
        assert_eq!(session.next_update_time(), None);
        assert_eq!(session.update(pause + secs(20)), Ok(None));

        let resume = pause + secs(20);
        session.toggle(resume);
        for s in 1..=5 {
            session.update(resume + secs(s)).unwrap();
        }
        assert_eq!(session.snapshot().time_left, 1745);
        assert_eq!(session.audio().played(), vec![Cue::Parte1]);
    }

    #[test]
    fn test_reset_replays_start_cue() {
        let mut session = GameSession::new(RecordingAudio::default());
        let start = Instant::now();

        session.toggle(start);
        session.record_score(1);
        session.record_score(2);
        session.update(start + secs(10)).unwrap();

        let snapshot = session.reset(start + secs(10));
        assert_eq!(snapshot, MatchSnapshot::default());

        session.toggle(start + secs(11));
        assert_eq!(session.audio().played(), vec![Cue::Parte1, Cue::Parte1]);
    }

    #[test]
    fn test_scoring_initializes_audio_once() {
        let mut session = GameSession::new(RecordingAudio::default());

        assert!(session.record_score(3));
        assert!(session.record_score(3));
        assert!(!session.record_score(42));
        assert!(session.record_score(8));
        assert_eq!(session.audio().events, vec![AudioEvent::Initialize]);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, MatchStatus::Lobby);
        assert_eq!(snapshot.team_scores, RedWhiteBundle::new(2, 1));
        assert_eq!(snapshot.player_score(3), Some(2));
        assert_eq!(snapshot.player_score(8), Some(1));
    }
}
