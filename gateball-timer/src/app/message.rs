use std::str::FromStr;
use thiserror::Error;

/// One line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Toggle,
    Reset,
    Score(u8),
    CycleVolume,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMessageError {
    #[error("Unknown command: {0:?}")]
    Unknown(String),
    #[error("Not a player number: {0:?}")]
    BadPlayer(String),
}

impl FromStr for Message {
    type Err = ParseMessageError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim().to_lowercase();
        let mut words = input.split_whitespace();

        let msg = match (words.next(), words.next(), words.next()) {
            (None, ..) => Self::Toggle,
            (Some("t" | "toggle" | "space"), None, _) => Self::Toggle,
            (Some("r" | "reset"), None, _) => Self::Reset,
            (Some("v" | "volume"), None, _) => Self::CycleVolume,
            (Some("h" | "help" | "?"), None, _) => Self::Help,
            (Some("q" | "quit" | "exit"), None, _) => Self::Quit,
            (Some("s" | "score"), Some(player), None) => Self::Score(parse_player(player)?),
            (Some(player), None, _) if player.starts_with(|c: char| c.is_ascii_digit()) => {
                Self::Score(parse_player(player)?)
            }
            _ => return Err(ParseMessageError::Unknown(input.to_string())),
        };
        Ok(msg)
    }
}

fn parse_player(word: &str) -> Result<u8, ParseMessageError> {
    word.parse()
        .map_err(|_| ParseMessageError::BadPlayer(word.to_string()))
}

pub const HELP: &str = "Commands: [enter]/t = Iniciar/Pausar, r = Reiniciar, 1-10 or s <n> = score for \
                        player n, v = cycle volume, h = help, q = quit";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_toggle_aliases() {
        for input in ["", " ", "t", "T", "toggle", "space", "  Toggle  "] {
            assert_eq!(input.parse(), Ok(Message::Toggle), "input {input:?}");
        }
    }

    #[test]
    fn test_commands() {
        assert_eq!("r".parse(), Ok(Message::Reset));
        assert_eq!("reset".parse(), Ok(Message::Reset));
        assert_eq!("v".parse(), Ok(Message::CycleVolume));
        assert_eq!("?".parse(), Ok(Message::Help));
        assert_eq!("q".parse(), Ok(Message::Quit));
        assert_eq!("EXIT".parse(), Ok(Message::Quit));
    }

    #[test]
    fn test_scores() {
        assert_eq!("1".parse(), Ok(Message::Score(1)));
        assert_eq!("10".parse(), Ok(Message::Score(10)));
        assert_eq!("s 4".parse(), Ok(Message::Score(4)));
        assert_eq!("score 7".parse(), Ok(Message::Score(7)));
        // Roster checks happen in the match manager
        assert_eq!("11".parse(), Ok(Message::Score(11)));
        assert_eq!(
            "300".parse::<Message>(),
            Err(ParseMessageError::BadPlayer("300".to_string()))
        );
        assert_eq!(
            "s x".parse::<Message>(),
            Err(ParseMessageError::BadPlayer("x".to_string()))
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(
            "pause now".parse::<Message>(),
            Err(ParseMessageError::Unknown("pause now".to_string()))
        );
        assert_eq!(
            "s 1 2".parse::<Message>(),
            Err(ParseMessageError::Unknown("s 1 2".to_string()))
        );
        assert!("hello".parse::<Message>().is_err());
    }
}
