//! Turn ownership preconditions shared by every action.
//!
//! Each precondition is a unit struct with a `check` function, so rule
//! entry points read as a list of the conditions they require.

use tracing::{instrument, warn};

use crate::{Game, GamePlayer, Rejection, Turn};

/// Precondition: the game has an active turn.
pub struct TurnIsActive;

impl TurnIsActive {
    /// Returns the current turn.
    #[instrument(skip(game), fields(game_id = game.id()))]
    pub fn check(game: &Game) -> Result<&Turn, Rejection> {
        game.current_turn().as_ref().ok_or_else(|| {
            warn!("Action on a game without a current turn");
            Rejection::GameNotStarted
        })
    }
}

/// Precondition: the action was made against the current turn.
pub struct TurnNumberMatches;

impl TurnNumberMatches {
    /// Rejects out-of-sync turn numbers.
    #[instrument(skip(turn), fields(current = turn.turn_num()))]
    pub fn check(turn: &Turn, turn_num: u32) -> Result<(), Rejection> {
        if *turn.turn_num() != turn_num {
            warn!(turn_num, "Stale turn number");
            return Err(Rejection::StaleTurn {
                expected: *turn.turn_num(),
                actual: turn_num,
            });
        }
        Ok(())
    }
}

/// Precondition: the player's team is the one guessing this turn.
///
/// The turn belongs to the team whose codemaster gave the hint; the other
/// team's side does the guessing and passing.
pub struct GuessersTurn;

impl GuessersTurn {
    /// Rejects players whose team holds the turn.
    #[instrument(skip(turn))]
    pub fn check(turn: &Turn, player: &GamePlayer) -> Result<(), Rejection> {
        if player.team() == turn.team() {
            warn!(team = %player.team(), "Guess out of turn");
            return Err(Rejection::OutOfTurn);
        }
        Ok(())
    }
}

/// Composite precondition for guesses and passes.
pub struct CorrectTurn;

impl CorrectTurn {
    /// Validates all turn preconditions and returns the current turn.
    #[instrument(skip(game), fields(game_id = game.id()))]
    pub fn check<'g>(
        game: &'g Game,
        player: &GamePlayer,
        turn_num: u32,
    ) -> Result<&'g Turn, Rejection> {
        let turn = TurnIsActive::check(game)?;
        TurnNumberMatches::check(turn, turn_num)?;
        GuessersTurn::check(turn, player)?;
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, GameType, PlayerRole, Team};

    fn game_with_turn(turn: Option<Turn>) -> Game {
        Game::new(
            1,
            Some(GameType::TwoPlayer),
            turn,
            Board::default(),
            Vec::new(),
            None,
            false,
        )
    }

    fn turn(turn_num: u32, team: Team) -> Turn {
        Turn::new(turn_num, team, None, Vec::new(), true)
    }

    #[test]
    fn test_no_turn_is_not_started() {
        let game = game_with_turn(None);
        assert_eq!(TurnIsActive::check(&game), Err(Rejection::GameNotStarted));
    }

    #[test]
    fn test_stale_turn() {
        let current = turn(3, Team::Team1);
        assert_eq!(
            TurnNumberMatches::check(&current, 2),
            Err(Rejection::StaleTurn {
                expected: 3,
                actual: 2
            })
        );
        assert!(TurnNumberMatches::check(&current, 3).is_ok());
    }

    #[test]
    fn test_turn_team_cannot_guess() {
        let current = turn(1, Team::Team1);
        let same = GamePlayer::new(1, Team::Team1, PlayerRole::Codemaster);
        let other = GamePlayer::new(2, Team::Team2, PlayerRole::Codemaster);
        assert_eq!(GuessersTurn::check(&current, &same), Err(Rejection::OutOfTurn));
        assert!(GuessersTurn::check(&current, &other).is_ok());
    }

    #[test]
    fn test_correct_turn_returns_current() {
        let game = game_with_turn(Some(turn(1, Team::Team1)));
        let player = GamePlayer::new(2, Team::Team2, PlayerRole::Codemaster);
        let current = CorrectTurn::check(&game, &player, 1).expect("valid turn");
        assert_eq!(*current.turn_num(), 1);
    }
}
