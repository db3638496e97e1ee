//! Error types for rule evaluation.
//!
//! Two kinds of failure leave the rules engine. A [`Rejection`] is a normal,
//! user-facing refusal: the action broke a game rule and nothing may be
//! applied. A [`ConsistencyFault`] means the snapshot handed to the engine
//! contradicts itself and the caller has a bug or corrupted storage.

use derive_more::{Display, From};
use tracing::instrument;

use crate::{GameType, Position};

/// A game rule the proposed action violated.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Rejection {
    /// The game has no active turn yet.
    #[display("Game not started")]
    GameNotStarted,

    /// The action was made against a turn that is no longer current.
    #[display("Unexpected turn_num:{}, expected:{}", actual, expected)]
    StaleTurn {
        /// The current turn number.
        expected: u32,
        /// The turn number the action declared.
        actual: u32,
    },

    /// The guess number does not follow the guesses already recorded.
    #[display("Unexpected guess_num:{}, expected:{}", actual, expected)]
    StaleGuess {
        /// The next guess number for the turn.
        expected: u32,
        /// The guess number the action declared.
        actual: u32,
    },

    /// The acting team may not guess or pass during this turn.
    #[display("Guess out of turn")]
    OutOfTurn,

    /// The coordinates lie outside the board.
    #[display("Cell {} is not on the board", _0)]
    CellOutOfBounds(Position),

    /// The cell was already revealed for the acting team.
    #[display("Cell {} already covered", _0)]
    CellClaimed(Position),

    /// The game type has no rule set for this action.
    #[display("Unsupported game type: {}", _0)]
    UnsupportedGameType(GameType),

    /// Passing is never allowed on the last turn.
    #[display("Cannot pass on last turn")]
    PassOnLastTurn,

    /// The current turn was started without the right to pass.
    #[display("Pass not allowed this turn")]
    PassNotAllowed,

    /// Passing would hand the board to a team that has nothing left to find.
    #[display("Cannot pass while other team already finished")]
    OtherTeamFinished,

    /// Hint counts start at one.
    #[display("Invalid hint num: {}", _0)]
    InvalidHintNumber(u32),

    /// Only codemasters give hints.
    #[display("Player is not codemaster")]
    NotCodemaster,

    /// The codemaster's team does not own the current turn.
    #[display("Hint given out of turn")]
    HintOutOfTurn,

    /// The current turn already has its hint.
    #[display("Hint already given this turn")]
    HintAlreadyGiven,

    /// The hint is malformed or overlaps a word on the board.
    #[display("InvalidHint - WORDCONFLICT: {}", _0)]
    HintWordConflict(String),
}

impl Rejection {
    /// Stable machine-checkable reason code.
    #[instrument]
    pub fn code(&self) -> &'static str {
        match self {
            Self::GameNotStarted => "game_not_started",
            Self::StaleTurn { .. } => "stale_turn",
            Self::StaleGuess { .. } => "stale_guess",
            Self::OutOfTurn => "out_of_turn",
            Self::CellOutOfBounds(_) => "cell_out_of_bounds",
            Self::CellClaimed(_) => "cell_claimed",
            Self::UnsupportedGameType(_) => "unsupported_game_type",
            Self::PassOnLastTurn => "pass_on_last_turn",
            Self::PassNotAllowed => "pass_not_allowed",
            Self::OtherTeamFinished => "other_team_finished",
            Self::InvalidHintNumber(_) => "invalid_hint_number",
            Self::NotCodemaster => "not_codemaster",
            Self::HintOutOfTurn => "hint_out_of_turn",
            Self::HintAlreadyGiven => "hint_already_given",
            Self::HintWordConflict(_) => "hint_word_conflict",
        }
    }
}

impl std::error::Error for Rejection {}

/// The snapshot handed to the engine is internally inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("Inconsistent game snapshot: {} at {}:{}", message, file, line)]
pub struct ConsistencyFault {
    /// What was inconsistent.
    pub message: String,
    /// Line number where the fault was detected.
    pub line: u32,
    /// Source file where the fault was detected.
    pub file: &'static str,
}

impl ConsistencyFault {
    /// Creates a new fault with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl std::error::Error for ConsistencyFault {}

/// Failure returned by every rule entry point.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum RulesError {
    /// The action broke a game rule.
    #[display("Rejected: {}", _0)]
    Rejected(Rejection),

    /// The inputs contradict themselves.
    #[display("{}", _0)]
    Inconsistent(ConsistencyFault),
}

impl RulesError {
    /// Returns the rejection if this is a rule violation.
    #[instrument(skip(self))]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Inconsistent(_) => None,
        }
    }
}

impl std::error::Error for RulesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Inconsistent(fault) => Some(fault),
        }
    }
}

/// A spec card layout string could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("Layout error: {} at {}:{}", message, file, line)]
pub struct LayoutError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LayoutError {
    /// Creates a new layout error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl std::error::Error for LayoutError {}
