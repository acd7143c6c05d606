use crate::config::TeamNames;
use gateball_common::{
    drawing_support::secs_to_time_string,
    match_snapshot::{MatchSnapshot, MatchStatus},
    team::Team,
};
use std::fmt::Write;

/// Label of the start/pause control for the given status
pub fn toggle_label(status: MatchStatus) -> &'static str {
    if status.is_running() {
        "Pausar"
    } else {
        "Iniciar"
    }
}

fn team_tag(team: Team) -> char {
    match team {
        Team::Red => 'R',
        Team::White => 'W',
    }
}

pub fn render_text(snapshot: &MatchSnapshot, names: &TeamNames) -> String {
    let mut line = String::new();

    // Writing to a `String` can't fail
    let _ = write!(
        &mut line,
        "{} {} - {} {} | {} {} | [{}] |",
        names.0.red,
        snapshot.team_scores.red,
        snapshot.team_scores.white,
        names.0.white,
        secs_to_time_string(snapshot.time_left),
        snapshot.status,
        toggle_label(snapshot.status),
    );
    for (id, team, score) in snapshot.players() {
        let _ = write!(&mut line, " {}{id}:{score}", team_tag(team));
    }

    line
}

pub fn render_json(snapshot: &MatchSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}
