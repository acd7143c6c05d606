use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Team {
    #[derivative(Default)]
    Red,
    White,
}

impl Team {
    /// Odd player numbers play for red, even numbers for white
    pub fn for_player(player_id: u8) -> Self {
        if player_id % 2 == 1 {
            Self::Red
        } else {
            Self::White
        }
    }
}

impl core::fmt::Display for Team {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Red => write!(f, "Red"),
            Self::White => write!(f, "White"),
        }
    }
}
