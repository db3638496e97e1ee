//! Domain events produced by the rules engine.
//!
//! An action (hint, guess, pass) yields an ordered list of events. The list
//! is the unit of durable change and of change notification: the storage
//! layer applies it atomically and nothing else interprets its contents.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{CitizenCover, CoverState, Position, Team};

/// The reveal a guess produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cover {
    /// An agent belonging to the given team.
    Agent(Team),
    /// The assassin.
    Assassin,
    /// A citizen, with who has now found it.
    Citizen(CitizenCover),
}

impl From<Cover> for CoverState {
    fn from(cover: Cover) -> Self {
        match cover {
            Cover::Agent(team) => CoverState::Agent(team),
            Cover::Assassin => CoverState::Assassin,
            Cover::Citizen(citizen) => CoverState::Citizen(citizen),
        }
    }
}

/// One state change within an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum GameEvent {
    /// A codemaster set the hint for a turn.
    Hint {
        /// Turn the hint belongs to.
        turn_num: u32,
        /// The hint word.
        hint: String,
        /// How many cells the hint refers to.
        hint_num: u32,
    },

    /// A guess was recorded.
    Guess {
        /// Turn the guess belongs to.
        turn_num: u32,
        /// Sequence number within the turn.
        guess_num: u32,
        /// The guessed cell.
        position: Position,
    },

    /// A cell was revealed.
    Cover {
        /// Turn during which the reveal happened.
        turn_num: u32,
        /// The revealed cell.
        position: Position,
        /// The new public state of the cell.
        new_cover: Cover,
    },

    /// The guessing team stopped voluntarily.
    Pass {
        /// Turn that was passed.
        turn_num: u32,
    },

    /// A new turn begins.
    NextTurn {
        /// Team whose codemaster holds the new turn.
        next_team: Team,
        /// Number of the new turn.
        next_turn_num: u32,
        /// Whether the new turn may be passed.
        next_turn_allow_pass: bool,
    },

    /// The game ended.
    GameOver {
        /// Turn during which the game ended.
        turn_num: u32,
        /// Winning team, when the ending names one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<Team>,
    },
}

impl GameEvent {
    /// Returns the revealed cell and cover for `cover` events.
    #[instrument]
    pub fn as_cover(&self) -> Option<(Position, Cover)> {
        match self {
            Self::Cover {
                position,
                new_cover,
                ..
            } => Some((*position, *new_cover)),
            _ => None,
        }
    }

    /// Short event name, matching the serialized `type` tag.
    #[instrument]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hint { .. } => "hint",
            Self::Guess { .. } => "guess",
            Self::Cover { .. } => "cover",
            Self::Pass { .. } => "pass",
            Self::NextTurn { .. } => "nextturn",
            Self::GameOver { .. } => "gameover",
        }
    }
}
