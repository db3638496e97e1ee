//! Game service: load, decide, apply, publish.

use derive_more::{Display, From};
use tracing::{debug, info, instrument, warn};

use strictly_codenames::{
    BoardSpecs, Game, GameEvent, GameId, GamePlayer, Guess, PlayerId, PlayerRole, Rejection,
    RulesError, Team, TurnIsActive, process_guess, process_hint, process_pass,
};

use crate::{
    DbError, GameChange, GamePlan, GameStore, Publisher, RandomPort, ServiceConfig, SetupError,
    plan_game,
};

/// Failure of a service call.
#[derive(Debug, Clone, Display, From)]
pub enum ServiceError {
    /// The rules engine refused the action or found the snapshot inconsistent.
    #[display("{}", _0)]
    Rules(RulesError),

    /// Storage failed.
    #[display("{}", _0)]
    Db(DbError),

    /// The game could not be set up.
    #[display("{}", _0)]
    Setup(SetupError),

    /// The acting player holds no seat in the game.
    #[display("Player {} not in game {}", player_id, game_id)]
    #[from(skip)]
    NotInGame {
        /// The game acted on.
        game_id: GameId,
        /// The acting player.
        player_id: PlayerId,
    },

    /// The game already ended.
    #[display("Game {} is over", _0)]
    #[from(skip)]
    GameOver(GameId),
}

impl ServiceError {
    /// Returns the rule violation, if the rules engine refused the action.
    #[instrument(skip(self))]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rules(err) => err.rejection(),
            _ => None,
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rules(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Setup(err) => Some(err),
            Self::NotInGame { .. } | Self::GameOver(_) => None,
        }
    }
}

/// Orchestrates one player action against the store and publisher.
///
/// Every attempt works on a freshly loaded snapshot. When the store reports a
/// write conflict the whole cycle is repeated, up to `max_conflict_retries`
/// extra times. Rule rejections are returned at once.
#[derive(Debug, Clone)]
pub struct GameService<S, P> {
    store: S,
    publisher: P,
    max_conflict_retries: u32,
}

impl<S: GameStore, P: Publisher> GameService<S, P> {
    /// Creates a service.
    pub fn new(store: S, publisher: P, max_conflict_retries: u32) -> Self {
        Self {
            store,
            publisher,
            max_conflict_retries,
        }
    }

    /// Creates a service with the retry budget from `config`.
    pub fn from_config(store: S, publisher: P, config: &ServiceConfig) -> Self {
        Self::new(store, publisher, *config.max_conflict_retries())
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reveals a cell for the acting player's team.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the guess is refused or cannot be stored.
    #[instrument(skip(self))]
    pub fn guess(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        guess: Guess,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        self.act(game_id, player_id, |game, player| {
            let specs = self.team_board_specs(game)?;
            Ok(process_guess(game, &specs, player, &guess)?)
        })
    }

    /// Ends the acting team's guessing for this turn.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the pass is refused or cannot be stored.
    #[instrument(skip(self))]
    pub fn pass(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        turn_num: u32,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        self.act(game_id, player_id, |game, player| {
            let specs = self.team_board_specs(game)?;
            Ok(process_pass(game, &specs, player, turn_num)?)
        })
    }

    /// Sets the hint for the current turn.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the hint is refused or cannot be stored.
    #[instrument(skip(self))]
    pub fn hint(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        turn_num: u32,
        hint: &str,
        hint_num: u32,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        self.act(game_id, player_id, |game, player| {
            Ok(process_hint(game, player, turn_num, hint, hint_num)?)
        })
    }

    /// Seats a player before the game starts.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the game has started or storage fails.
    #[instrument(skip(self))]
    pub fn join_game(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        team: Team,
        role: PlayerRole,
    ) -> Result<(), ServiceError> {
        self.store
            .add_player_to_game(game_id, player_id, team, role)?;
        self.publisher.publish(&GameChange::new(game_id, Vec::new()));
        Ok(())
    }

    /// Validates the seats, deals a board and opens turn one.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the seats are incomplete, the catalog is
    /// too small, or the game already started.
    #[instrument(skip(self, rng))]
    pub fn start_game(
        &self,
        game_id: GameId,
        rng: &dyn RandomPort,
    ) -> Result<GamePlan, ServiceError> {
        let players = self.store.load_game_players(game_id)?;
        let words = self.store.word_cards()?;
        let spec_card_ids = self.store.spec_card_ids()?;
        let plan = plan_game(&players, &words, &spec_card_ids, rng)?;
        self.store.start_game(game_id, &plan)?;
        info!(game_id, game_type = %plan.game_type(), "Game started");
        self.publisher.publish(&GameChange::new(game_id, Vec::new()));
        Ok(plan)
    }

    /// Loads the team views of a started game.
    #[instrument(skip(self, game), fields(game_id = game.id()))]
    fn team_board_specs(&self, game: &Game) -> Result<BoardSpecs, ServiceError> {
        // Unstarted games have no specs stored.
        TurnIsActive::check(game).map_err(RulesError::from)?;
        Ok(self.store.load_team_board_specs(*game.id())?)
    }

    #[instrument(skip(self, decide))]
    fn act<F>(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        decide: F,
    ) -> Result<Vec<GameEvent>, ServiceError>
    where
        F: Fn(&Game, &GamePlayer) -> Result<Vec<GameEvent>, ServiceError>,
    {
        let mut attempt = 0;
        loop {
            let game = self.store.load_game(game_id)?;
            if *game.game_over() {
                warn!(game_id, "Action on a finished game");
                return Err(ServiceError::GameOver(game_id));
            }
            let player = *game
                .player(player_id)
                .ok_or(ServiceError::NotInGame { game_id, player_id })?;

            let events = decide(&game, &player)?;
            debug!(count = events.len(), attempt, "Rules produced events");

            match self.store.apply_events(game_id, &events) {
                Ok(()) => {
                    self.publisher
                        .publish(&GameChange::new(game_id, events.clone()));
                    return Ok(events);
                }
                Err(err) if err.is_conflict() && attempt < self.max_conflict_retries => {
                    attempt += 1;
                    warn!(attempt, error = %err, "Write conflict, retrying with a fresh snapshot");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
