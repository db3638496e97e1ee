//! Event application store: snapshots in, atomic event batches out.

mod error;
mod models;
mod schema;
mod sqlite;

pub use error::{DbError, DbErrorKind};
pub use sqlite::SqliteStore;

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::instrument;

use strictly_codenames::{
    BoardSpecs, Game, GameEvent, GameId, GamePlayer, GameType, Player, PlayerId, PlayerRole,
    SpecCardId, Team,
};

use crate::GamePlan;

/// Lifecycle stage used to list a player's games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameState {
    /// Created but not dealt yet.
    Unstarted,
    /// Dealt and still being played.
    Active,
    /// Ended.
    Completed,
}

impl GameState {
    /// Default page size for a lobby listing of this stage.
    #[instrument]
    pub fn default_limit(self) -> usize {
        match self {
            Self::Unstarted => 5,
            Self::Active => 20,
            Self::Completed => 5,
        }
    }
}

/// Game header with its seats, as shown in a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GameInfo {
    id: GameId,
    created_by_player_id: PlayerId,
    game_type: Option<GameType>,
    current_turn_num: Option<u32>,
    winning_team: Option<Team>,
    game_over: bool,
    players: Vec<GamePlayer>,
}

impl GameInfo {
    /// Returns true once the board has been dealt.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn is_started(&self) -> bool {
        self.game_type.is_some()
    }

    /// Stage of the game's lifecycle.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn state(&self) -> GameState {
        match (self.game_over, self.is_started()) {
            (true, _) => GameState::Completed,
            (false, true) => GameState::Active,
            (false, false) => GameState::Unstarted,
        }
    }
}

/// Storage collaborator for the rules engine.
///
/// Loads return a consistent snapshot. `apply_events` writes one action's
/// events as a single atomic unit and fails with a
/// [`DbErrorKind::Conflict`] when a concurrent action changed the game first.
pub trait GameStore {
    /// Loads the game header, board, players and current turn.
    fn load_game(&self, game_id: GameId) -> Result<Game, DbError>;

    /// Loads both teams' secret maps. Fails for unstarted games.
    fn load_team_board_specs(&self, game_id: GameId) -> Result<BoardSpecs, DbError>;

    /// Loads the seats of a game.
    fn load_game_players(&self, game_id: GameId) -> Result<Vec<GamePlayer>, DbError>;

    /// Applies one action's events atomically.
    fn apply_events(&self, game_id: GameId, events: &[GameEvent]) -> Result<(), DbError>;

    /// Reads back every event applied to a game, oldest first.
    fn load_events(&self, game_id: GameId) -> Result<Vec<GameEvent>, DbError>;

    /// Registers a player.
    fn create_player(&self, name: &str) -> Result<Player, DbError>;

    /// Creates an unstarted game with its creator as team one's codemaster.
    fn create_game(&self, created_by: PlayerId) -> Result<GameId, DbError>;

    /// Seats a player, replacing their previous seat and, for codemasters,
    /// the team's current codemaster. Only allowed before the game starts.
    fn add_player_to_game(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        team: Team,
        role: PlayerRole,
    ) -> Result<(), DbError>;

    /// Deals the board and opens turn one.
    ///
    /// Fails with a conflict if the game already started or the seats no
    /// longer match the plan's game type.
    fn start_game(&self, game_id: GameId, plan: &GamePlan) -> Result<(), DbError>;

    /// Adds words to the catalog, skipping duplicates. Returns how many were new.
    fn add_words(&self, words: &[String]) -> Result<usize, DbError>;

    /// Adds a spec card from its two 25-letter layouts.
    fn add_spec_card(&self, front: &str, back: &str) -> Result<SpecCardId, DbError>;

    /// All catalog words.
    fn word_cards(&self) -> Result<Vec<String>, DbError>;

    /// All catalog spec card ids.
    fn spec_card_ids(&self) -> Result<Vec<SpecCardId>, DbError>;

    /// Games created by `player_id` in the given stage, newest first, at
    /// most `limit` of them.
    fn games_by_player(
        &self,
        player_id: PlayerId,
        state: GameState,
        limit: usize,
    ) -> Result<Vec<GameInfo>, DbError>;

    /// Deletes a game and everything recorded for it. Only its creator may
    /// do so; anyone else gets a [`DbErrorKind::Forbidden`] error.
    fn delete_game(&self, game_id: GameId, requester: PlayerId) -> Result<(), DbError>;
}
