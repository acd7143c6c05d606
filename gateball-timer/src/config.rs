use crate::sound_controller::SoundSettings;
use derivative::Derivative;
use gateball_common::bundles::RedWhiteBundle;
use serde::{Deserialize, Serialize};
use toml::Table;

#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub sound: SoundSettings,
    pub teams: TeamNames,
}

/// Names shown above each team's score
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamNames(pub RedWhiteBundle<String>);

impl Default for TeamNames {
    fn default() -> Self {
        Self(RedWhiteBundle::new(
            "EQUIPE VERMELHA".to_string(),
            "EQUIPE BRANCA".to_string(),
        ))
    }
}

impl TeamNames {
    pub fn migrate(old: &Table) -> Self {
        let Self(mut names) = Default::default();

        get_string_value(old, "red", &mut names.red);
        get_string_value(old, "white", &mut names.white);

        Self(names)
    }
}

impl Config {
    pub fn migrate(old: &Table) -> Self {
        let Self {
            mut sound,
            mut teams,
        } = Default::default();

        if let Some(old_sound) = old.get("sound") {
            if let Some(old_sound) = old_sound.as_table() {
                sound = SoundSettings::migrate(old_sound);
            }
        }

        if let Some(old_teams) = old.get("teams") {
            if let Some(old_teams) = old_teams.as_table() {
                teams = TeamNames::migrate(old_teams);
            }
        }

        Self { sound, teams }
    }
}

fn get_string_value(table: &Table, key: &str, save: &mut String) {
    if let Some(value) = table.get(key) {
        if let Some(value) = value.as_str() {
            if !value.trim().is_empty() {
                *save = value.to_string();
            }
        }
    }
}
