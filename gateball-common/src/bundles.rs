use crate::team::Team;
use core::ops::{Index, IndexMut};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedWhiteBundle<T> {
    pub red: T,
    pub white: T,
}

impl<T> RedWhiteBundle<T> {
    pub fn new(red: T, white: T) -> Self {
        Self { red, white }
    }
}

impl<T> Index<Team> for RedWhiteBundle<T> {
    type Output = T;

    fn index(&self, team: Team) -> &Self::Output {
        match team {
            Team::Red => &self.red,
            Team::White => &self.white,
        }
    }
}

impl<T> IndexMut<Team> for RedWhiteBundle<T> {
    fn index_mut(&mut self, team: Team) -> &mut Self::Output {
        match team {
            Team::Red => &mut self.red,
            Team::White => &mut self.white,
        }
    }
}

impl<T: Display> Display for RedWhiteBundle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Red: {}, White: {}", self.red, self.white)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index() {
        let mut bundle = RedWhiteBundle::new(3u32, 5);
        assert_eq!(bundle[Team::Red], 3);
        assert_eq!(bundle[Team::White], 5);
        bundle[Team::White] += 1;
        assert_eq!(bundle.white, 6);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RedWhiteBundle::new(1, 2).to_string(),
            "Red: 1, White: 2".to_string()
        );
    }
}
