//! Discovery progress and next-turn bookkeeping for the two-player variant.

use tracing::{debug, instrument};

use crate::{
    BoardSpecs, ConsistencyFault, CoverState, Game, GameEvent, Position, Team, TWO_PLAYER_TURNS,
};

/// The teams that have found every agent on the card they guess against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamsDone {
    done: [bool; 2],
}

impl TeamsDone {
    /// Returns true if `team` has nothing left to find.
    #[instrument]
    pub fn contains(&self, team: Team) -> bool {
        self.done[team.slot()]
    }

    /// Returns true once both teams are done.
    #[instrument]
    pub fn both(&self) -> bool {
        self.done.iter().all(|done| *done)
    }

    fn insert(&mut self, team: Team) {
        self.done[team.slot()] = true;
    }
}

impl FromIterator<Team> for TeamsDone {
    fn from_iter<I: IntoIterator<Item = Team>>(iter: I) -> Self {
        let mut done = Self::default();
        for team in iter {
            done.insert(team);
        }
        done
    }
}

/// Computes which teams are done, counting covers from `pending` as applied.
///
/// A team guesses against the opposing team's card, so it is done when every
/// agent on that card is covered by a team cover, either already on the
/// board or among the events produced by the action being evaluated.
#[instrument(skip(game, specs, pending), fields(game_id = game.id(), pending = pending.len()))]
pub fn teams_done(
    game: &Game,
    specs: &BoardSpecs,
    pending: &[GameEvent],
) -> Result<TeamsDone, ConsistencyFault> {
    let mut done = TeamsDone::default();
    for team in Team::ALL {
        let card = specs.for_team(team.other());
        let mut finished = true;
        for position in card.agent_positions() {
            if !agent_covered(game, pending, position)? {
                finished = false;
                break;
            }
        }
        if finished {
            done.insert(team);
        }
    }
    debug!(?done, "Computed teams done");
    Ok(done)
}

fn agent_covered(
    game: &Game,
    pending: &[GameEvent],
    position: Position,
) -> Result<bool, ConsistencyFault> {
    let cell = game
        .board()
        .cell_at(position)
        .ok_or_else(|| ConsistencyFault::new(format!("Board has no cell at {}", position)))?;
    if cell.cover().is_agent() {
        return Ok(true);
    }
    Ok(pending.iter().filter_map(GameEvent::as_cover).any(|(pos, cover)| {
        pos == position && CoverState::from(cover).is_agent()
    }))
}

/// Builds the `nextturn` event, deciding whether the new turn may pass.
///
/// Passing is allowed unless, in the two-player variant, the new turn is the
/// last one (or beyond it) or the team receiving the turn has already found
/// everything.
#[instrument(skip(game), fields(game_id = game.id()))]
pub fn with_next_turn_allow_pass(
    game: &Game,
    teams_done: TeamsDone,
    next_team: Team,
    next_turn_num: u32,
) -> GameEvent {
    // Mirrors the pass rule: no pass on the last two-player turn or for a finished team.
    let allow_pass = !(game.is_two_player()
        && (next_turn_num >= TWO_PLAYER_TURNS || teams_done.contains(next_team)));
    debug!(%next_team, next_turn_num, allow_pass, "Next turn");
    GameEvent::NextTurn {
        next_team,
        next_turn_num,
        next_turn_allow_pass: allow_pass,
    }
}
