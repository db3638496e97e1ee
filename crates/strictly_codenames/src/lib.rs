//! Strictly Codenames - pure rules for a two-team word deduction game
//!
//! Two codemasters give one-word hints; guessers reveal board cells trying
//! to find their team's secret agents while avoiding citizens and the
//! assassin. This crate holds the turn and hint state machine only.
//!
//! # Architecture
//!
//! - **Types**: board, spec cards, turns and game snapshots
//! - **Events**: the ordered state changes an action produces
//! - **Rules**: guess, pass and hint resolution
//!
//! Storage, notification and board dealing live in the caller; the rules
//! never mutate their inputs.
//!
//! # Example
//!
//! ```no_run
//! use strictly_codenames::{process_guess, BoardSpecs, Game, GamePlayer, Guess};
//!
//! # fn example(game: Game, specs: BoardSpecs, player: GamePlayer, guess: Guess)
//! #     -> Result<(), strictly_codenames::RulesError> {
//! let events = process_guess(&game, &specs, &player, &guess)?;
//! // hand `events` to storage as one atomic unit
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod event;
mod rules;
mod types;

pub use error::{ConsistencyFault, LayoutError, Rejection, RulesError};
pub use event::{Cover, GameEvent};
pub use rules::{
    CorrectTurn, GuessersTurn, TeamsDone, TurnIsActive, TurnNumberMatches, is_valid_hint,
    is_valid_hint_quick, process_guess, process_guess_two_player, process_hint, process_pass,
    teams_done, with_next_turn_allow_pass,
};
pub use types::{
    BOARD_SIZE, Board, BoardCell, BoardSpecs, COLS, CellType, CitizenCover, CoverState, Game,
    GameId, GamePlayer, GameType, Guess, Hint, Player, PlayerId, PlayerRole, Position, ROWS,
    SpecCard, SpecCardCell, SpecCardId, SpecCardSide, TWO_PLAYER_TURNS, Team, TeamBoardSpec, Turn,
    parse_layout,
};
