//! Game rules for the word deduction game.
//!
//! Every rule is a pure function from a game snapshot (plus both teams'
//! spec cards and the acting player) to the ordered events the action
//! causes. Nothing here performs I/O or keeps state between calls.

mod done;
mod guess;
mod hint;
mod pass;
mod turn;

pub use done::{TeamsDone, teams_done, with_next_turn_allow_pass};
pub use guess::{process_guess, process_guess_two_player};
pub use hint::{is_valid_hint, is_valid_hint_quick, process_hint};
pub use pass::process_pass;
pub use turn::{CorrectTurn, GuessersTurn, TurnIsActive, TurnNumberMatches};
