use std::fmt;
use strum_macros::EnumIter;

/// Games with at least one supported (game, playtype) capability entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, EnumIter,
)]
pub enum GameId {
    Iidx,
    Sdvx,
    Jubeat,
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GameId::Iidx => "iidx",
                GameId::Sdvx => "sdvx",
                GameId::Jubeat => "jubeat",
            }
        )
    }
}

impl TryFrom<&str> for GameId {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "iidx" => Ok(GameId::Iidx),
            "sdvx" => Ok(GameId::Sdvx),
            "jubeat" => Ok(GameId::Jubeat),
            _ => Err(s.to_string()),
        }
    }
}

/// Playstyle variant within a game. Which pairs are valid is defined by
/// capability-table membership, not here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, EnumIter,
)]
pub enum Playtype {
    Single,
    Double,
}

impl fmt::Display for Playtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Playtype::Single => "SP",
                Playtype::Double => "DP",
            }
        )
    }
}

impl TryFrom<&str> for Playtype {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "SP" => Ok(Playtype::Single),
            "DP" => Ok(Playtype::Double),
            _ => Err(s.to_string()),
        }
    }
}

/// The (game, playtype) pair every score, session, PB and profile is keyed by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct GameKey {
    pub game: GameId,
    pub playtype: Playtype,
}

impl GameKey {
    pub fn new(game: GameId, playtype: Playtype) -> Self {
        Self { game, playtype }
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.game, self.playtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn game_id_display_round_trips() {
        for game in GameId::iter() {
            let s = game.to_string();
            assert_eq!(GameId::try_from(s.as_str()), Ok(game));
        }
    }

    #[test]
    fn playtype_display_round_trips() {
        for playtype in Playtype::iter() {
            let s = playtype.to_string();
            assert_eq!(Playtype::try_from(s.as_str()), Ok(playtype));
        }
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        assert!(GameId::try_from("pumpitup").is_err());
        assert!(Playtype::try_from("14K").is_err());
    }

    #[test]
    fn game_key_display_is_compound() {
        let key = GameKey::new(GameId::Iidx, Playtype::Double);
        assert_eq!(key.to_string(), "iidx:DP");
    }
}
