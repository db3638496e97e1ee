//! Voluntary end of a guessing streak.

use tracing::{info, instrument, warn};

use super::done::{teams_done, with_next_turn_allow_pass};
use super::turn::CorrectTurn;
use crate::{BoardSpecs, Game, GameEvent, GamePlayer, Rejection, RulesError, TWO_PLAYER_TURNS};

/// Resolves a pass by the guessing team.
///
/// Outside the two-player variant a pass is recorded without advancing the
/// turn. In the two-player variant it is refused on the last turn, when the
/// turn was started without the right to pass, or when the other team has
/// nothing left to find; otherwise the turn moves to the passing team's
/// codemaster.
///
/// # Errors
///
/// Returns [`RulesError::Rejected`] when the pass is not allowed.
#[instrument(skip(game, specs), fields(game_id = game.id()))]
pub fn process_pass(
    game: &Game,
    specs: &BoardSpecs,
    player: &GamePlayer,
    turn_num: u32,
) -> Result<Vec<GameEvent>, RulesError> {
    let turn = CorrectTurn::check(game, player, turn_num)?;

    if !game.is_two_player() {
        return Ok(vec![GameEvent::Pass { turn_num }]);
    }

    if turn_num >= TWO_PLAYER_TURNS {
        warn!(turn_num, "Pass on last turn");
        return Err(Rejection::PassOnLastTurn.into());
    }
    if !*turn.allow_pass() {
        warn!(turn_num, "Pass not allowed this turn");
        return Err(Rejection::PassNotAllowed.into());
    }

    let team = *player.team();
    let done = teams_done(game, specs, &[])?;
    if done.contains(team.other()) {
        warn!(other_team = %team.other(), "Other team already finished");
        return Err(Rejection::OtherTeamFinished.into());
    }

    info!(%team, turn_num, "Turn passed");
    Ok(vec![
        GameEvent::Pass { turn_num },
        with_next_turn_allow_pass(game, done, team, turn_num + 1),
    ])
}
