//! Guess resolution.
//!
//! In the two-player variant the board is mirrored: each team's card defines
//! what the *other* team can find. A guess is therefore resolved against the
//! opposing team's card, and a revealed agent belongs to that opposing team.

use tracing::{debug, info, instrument, warn};

use super::done::{teams_done, with_next_turn_allow_pass};
use super::turn::CorrectTurn;
use crate::{
    BoardSpecs, CellType, CitizenCover, ConsistencyFault, Cover, CoverState, Game, GameEvent,
    GamePlayer, GameType, Guess, Rejection, RulesError, TWO_PLAYER_TURNS,
};

/// Resolves a guess according to the game's variant.
///
/// # Errors
///
/// Returns [`RulesError::Rejected`] if the game is not started, uses the
/// unsupported four-player variant, or the guess breaks a rule.
#[instrument(skip(game, specs), fields(game_id = game.id()))]
pub fn process_guess(
    game: &Game,
    specs: &BoardSpecs,
    player: &GamePlayer,
    guess: &Guess,
) -> Result<Vec<GameEvent>, RulesError> {
    match game.game_type() {
        Some(GameType::TwoPlayer) => process_guess_two_player(game, specs, player, guess),
        Some(GameType::FourPlayer) => {
            warn!("Four-player guessing is not supported");
            Err(Rejection::UnsupportedGameType(GameType::FourPlayer).into())
        }
        None => Err(Rejection::GameNotStarted.into()),
    }
}

/// Resolves a two-player guess into the events it causes.
///
/// The result always starts with a `guess` event followed by a `cover`
/// event. An assassin ends the game. A citizen ends the turn (or the game,
/// on the last turn). An agent lets the team keep guessing unless it
/// completes a team's discovery.
///
/// # Errors
///
/// Returns [`RulesError::Rejected`] for rule violations and
/// [`RulesError::Inconsistent`] if the board and spec cards disagree about
/// cell ordering.
#[instrument(skip(game, specs), fields(game_id = game.id()))]
pub fn process_guess_two_player(
    game: &Game,
    specs: &BoardSpecs,
    player: &GamePlayer,
    guess: &Guess,
) -> Result<Vec<GameEvent>, RulesError> {
    let turn = CorrectTurn::check(game, player, *guess.turn_num())?;

    let expected = turn.next_guess_num();
    if *guess.guess_num() != expected {
        warn!(guess_num = guess.guess_num(), expected, "Stale guess number");
        return Err(Rejection::StaleGuess {
            expected,
            actual: *guess.guess_num(),
        }
        .into());
    }

    let team = *player.team();
    let other_team = team.other();
    let turn_num = *guess.turn_num();
    let position = *guess.position();

    if position.index().is_none() {
        return Err(Rejection::CellOutOfBounds(position).into());
    }
    let cell = game
        .board()
        .cell_at(position)
        .ok_or_else(|| ConsistencyFault::new(format!("Board has no cell at {}", position)))?;
    let spec_cell = specs
        .for_team(other_team)
        .cell_at(position)
        .ok_or_else(|| ConsistencyFault::new(format!("Spec card has no cell at {}", position)))?;
    if *cell.position() != position || *spec_cell.position() != position {
        return Err(ConsistencyFault::new(format!(
            "Cells out of order at {}: board {}, spec {}",
            position,
            cell.position(),
            spec_cell.position()
        ))
        .into());
    }

    if cell.cover().is_claimed_for(team) {
        warn!(%position, cover = ?cell.cover(), "Cell already covered");
        return Err(Rejection::CellClaimed(position).into());
    }

    let mut events = vec![GameEvent::Guess {
        turn_num,
        guess_num: *guess.guess_num(),
        position,
    }];

    match spec_cell.cell_type() {
        CellType::Assassin => {
            info!(%position, "Assassin revealed");
            events.push(GameEvent::Cover {
                turn_num,
                position,
                new_cover: Cover::Assassin,
            });
            events.push(GameEvent::GameOver {
                turn_num,
                winner: None,
            });
        }
        CellType::Citizen => {
            // A citizen the other team found first becomes fully covered.
            let citizen = match cell.cover() {
                CoverState::Citizen(_) => CitizenCover::Full,
                _ => CitizenCover::from(team),
            };
            events.push(GameEvent::Cover {
                turn_num,
                position,
                new_cover: Cover::Citizen(citizen),
            });

            if turn_num >= TWO_PLAYER_TURNS {
                info!(turn_num, "Citizen revealed on the last turn");
                events.push(GameEvent::GameOver {
                    turn_num,
                    winner: None,
                });
            } else {
                let done = teams_done(game, specs, &events)?;
                // The other team guesses next unless it has nothing left to find.
                let next_team = if done.contains(other_team) {
                    other_team
                } else {
                    team
                };
                events.push(with_next_turn_allow_pass(
                    game,
                    done,
                    next_team,
                    turn_num + 1,
                ));
            }
        }
        CellType::Agent => {
            events.push(GameEvent::Cover {
                turn_num,
                position,
                new_cover: Cover::Agent(other_team),
            });

            let done = teams_done(game, specs, &events)?;
            if done.both() {
                info!(winner = %team, "Every agent found");
                events.push(GameEvent::GameOver {
                    turn_num,
                    winner: Some(team),
                });
            } else if done.contains(team) {
                info!(%team, "Team finished its discovery, handing over");
                events.push(with_next_turn_allow_pass(game, done, team, turn_num + 1));
            } else {
                debug!(%position, "Agent found, turn continues");
            }
        }
    }

    Ok(events)
}
