//=========================================================================
// Game State Values
//=========================================================================
//
// Integer-coded values the simulation hands to the hub. The hub treats
// them as opaque: any value may follow any other.
//
//=========================================================================

//=== GameState ===========================================================

/// Integer-coded game phase.
///
/// The hub enforces no transition table; the simulation decides which
/// phase follows which. The last value set wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GameState(pub i32);

impl GameState {
    /// A game is in progress.
    pub const IN_GAME: GameState = GameState(1);

    /// The last ball drained and the game ended.
    pub const GAME_OVER: GameState = GameState(2);

    /// Returns the raw phase code.
    pub fn code(self) -> i32 {
        self.0
    }
}

impl From<i32> for GameState {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

//=== TextCategory ========================================================

/// Identifies which text overlay a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextCategory(pub i32);

impl From<i32> for TextCategory {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_unset() {
        assert_eq!(GameState::default(), GameState(0));
        assert_ne!(GameState::default(), GameState::IN_GAME);
    }

    #[test]
    fn named_phases_match_table_codes() {
        assert_eq!(GameState::IN_GAME.code(), 1);
        assert_eq!(GameState::GAME_OVER.code(), 2);
        assert_eq!(GameState::from(2), GameState::GAME_OVER);
    }
}
