//! Hint validation.

use tracing::{info, instrument, warn};

use super::turn::{TurnIsActive, TurnNumberMatches};
use crate::{Game, GameEvent, GamePlayer, Rejection, RulesError};

/// Validates a codemaster's hint and produces the `hint` event.
///
/// The hint must be a positive count, given by the codemaster of the team
/// holding the current turn, once per turn, and must not overlap any word on
/// the board.
///
/// # Errors
///
/// Returns [`RulesError::Rejected`] describing the first violated rule.
#[instrument(skip(game), fields(game_id = game.id()))]
pub fn process_hint(
    game: &Game,
    player: &GamePlayer,
    turn_num: u32,
    hint: &str,
    hint_num: u32,
) -> Result<Vec<GameEvent>, RulesError> {
    if hint_num < 1 {
        return Err(Rejection::InvalidHintNumber(hint_num).into());
    }
    let turn = TurnIsActive::check(game)?;
    TurnNumberMatches::check(turn, turn_num)?;
    if !player.is_codemaster() {
        warn!(player_id = player.player_id(), "Hint from a guesser");
        return Err(Rejection::NotCodemaster.into());
    }
    if player.team() != turn.team() {
        warn!(team = %player.team(), "Hint given out of turn");
        return Err(Rejection::HintOutOfTurn.into());
    }
    if turn.hint().is_some() {
        return Err(Rejection::HintAlreadyGiven.into());
    }
    if !is_valid_hint(hint, game.board().words()) {
        warn!(hint, "Hint conflicts with the board");
        return Err(Rejection::HintWordConflict(hint.to_string()).into());
    }

    info!(turn_num, hint_num, "Hint accepted");
    Ok(vec![GameEvent::Hint {
        turn_num,
        hint: hint.trim().to_string(),
        hint_num,
    }])
}

/// Checks only the shape of a hint: letters separated by single spaces.
#[instrument]
pub fn is_valid_hint_quick(hint: &str) -> bool {
    let trimmed = hint.trim();
    !trimmed.is_empty()
        && trimmed
            .split(' ')
            .all(|part| !part.is_empty() && part.chars().all(char::is_alphabetic))
}

/// Checks a hint's shape and that it neither contains nor is contained in any
/// board word, ignoring case.
#[instrument(skip(words))]
pub fn is_valid_hint<'a>(hint: &str, words: impl IntoIterator<Item = &'a str>) -> bool {
    if !is_valid_hint_quick(hint) {
        return false;
    }
    let hint = hint.trim().to_lowercase();
    words
        .into_iter()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .all(|word| !hint.contains(&word) && !word.contains(&hint))
}
