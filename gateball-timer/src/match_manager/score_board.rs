use gateball_common::{
    bundles::RedWhiteBundle,
    match_snapshot::{PLAYER_IDS, ROSTER_SIZE, is_valid_player},
    team::Team,
};

/// Per-player goal tallies for the fixed roster. Team totals are always derived from the
/// player tallies, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    player_scores: [u32; ROSTER_SIZE],
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, without changing anything, if `player_id` isn't on the roster
    pub fn add_score(&mut self, player_id: u8) -> bool {
        if !is_valid_player(player_id) {
            return false;
        }
        let score = &mut self.player_scores[Self::index(player_id)];
        *score = score.saturating_add(1);
        true
    }

    pub fn player_score(&self, player_id: u8) -> Option<u32> {
        if is_valid_player(player_id) {
            Some(self.player_scores[Self::index(player_id)])
        } else {
            None
        }
    }

    pub fn player_scores(&self) -> [u32; ROSTER_SIZE] {
        self.player_scores
    }

    pub fn team_scores(&self) -> RedWhiteBundle<u32> {
        let mut totals = RedWhiteBundle::<u32>::default();
        for (id, score) in PLAYER_IDS.zip(self.player_scores.iter()) {
            let total = &mut totals[Team::for_player(id)];
            *total = total.saturating_add(*score);
        }
        totals
    }

    pub fn total(&self) -> u32 {
        self.player_scores
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(*s))
    }

    pub fn clear(&mut self) {
        self.player_scores = [0; ROSTER_SIZE];
    }

    fn index(player_id: u8) -> usize {
        (player_id - 1) as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_add_score() {
        let mut board = ScoreBoard::new();
        assert!(board.add_score(1));
        assert!(board.add_score(1));
        assert!(board.add_score(4));
        assert_eq!(board.player_score(1), Some(2));
        assert_eq!(board.player_score(4), Some(1));
        assert_eq!(board.player_score(2), Some(0));
        assert_eq!(board.team_scores(), RedWhiteBundle::new(2, 1));
    }

    #[test]
    fn test_invalid_players_are_ignored() {
        let mut board = ScoreBoard::new();
        assert!(!board.add_score(0));
        assert!(!board.add_score(11));
        assert!(!board.add_score(u8::MAX));
        assert_eq!(board, ScoreBoard::new());
        assert_eq!(board.player_score(0), None);
        assert_eq!(board.player_score(11), None);
    }

    #[test]
    fn test_team_totals_match_player_totals() {
        let mut board = ScoreBoard::new();
        for (i, id) in [3, 8, 10, 1, 1, 6, 5, 12, 7, 2, 9, 0, 4].into_iter().enumerate() {
            board.add_score(id);
            let teams = board.team_scores();
            assert_eq!(teams.red + teams.white, board.total(), "after {} scores", i + 1);
        }
        assert_eq!(board.team_scores(), RedWhiteBundle::new(6, 5));
    }

    #[test]
    fn test_clear() {
        let mut board = ScoreBoard::new();
        board.add_score(5);
        board.add_score(10);
        board.clear();
        assert_eq!(board.player_scores(), [0; ROSTER_SIZE]);
        assert_eq!(board.team_scores(), RedWhiteBundle::new(0, 0));
    }
}
