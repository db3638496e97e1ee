//! Database rows and their conversion to rule-engine types.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use strictly_codenames::{
    BoardCell, Cover, CoverState, GamePlayer, Guess, Hint, Player, Position, Turn,
};

use super::{DbError, GameInfo, schema};

/// Registered player row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct PlayerRow {
    id: i32,
    name: String,
    created_at: NaiveDateTime,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player::new(row.id, row.name)
    }
}

/// Insertable player.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    name: String,
}

/// Insertable board word.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::word_cards)]
pub struct NewWordCard {
    word: String,
}

/// Spec card catalog row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::spec_cards)]
pub struct SpecCardRow {
    id: i32,
    front: String,
    back: String,
}

/// Insertable spec card.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::spec_cards)]
pub struct NewSpecCard {
    front: String,
    back: String,
}

/// Game header row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    id: i32,
    created_by_player_id: i32,
    game_type: Option<String>,
    spec_card_id: Option<i32>,
    current_turn_num: Option<i32>,
    winning_team: Option<String>,
    game_over: bool,
    created_at: NaiveDateTime,
}

impl GameRow {
    /// Reads the header back into a lobby entry with the given seats.
    #[instrument(skip(self, players), fields(game_id = self.id))]
    pub fn to_info(&self, players: Vec<GamePlayer>) -> Result<GameInfo, DbError> {
        let game_type = self
            .game_type
            .as_deref()
            .map(|value| parse_column("games.game_type", value))
            .transpose()?;
        let winning_team = self
            .winning_team
            .as_deref()
            .map(|value| parse_column("games.winning_team", value))
            .transpose()?;
        let current_turn_num = self
            .current_turn_num
            .map(|turn_num| to_u32("games.current_turn_num", turn_num))
            .transpose()?;
        Ok(GameInfo::new(
            self.id,
            self.created_by_player_id,
            game_type,
            current_turn_num,
            winning_team,
            self.game_over,
            players,
        ))
    }
}

/// Insertable unstarted game.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    created_by_player_id: i32,
}

/// A player's seat in a game.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters, new)]
#[diesel(table_name = schema::game_players)]
pub struct GamePlayerRow {
    game_id: i32,
    player_id: i32,
    team: String,
    role: String,
}

impl GamePlayerRow {
    /// Reads the seat back into the rules type.
    #[instrument(skip(self), fields(game_id = self.game_id, player_id = self.player_id))]
    pub fn to_domain(&self) -> Result<GamePlayer, DbError> {
        Ok(GamePlayer::new(
            self.player_id,
            parse_column("game_players.team", &self.team)?,
            parse_column("game_players.role", &self.role)?,
        ))
    }
}

/// Which face of the spec card a team received.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters, new)]
#[diesel(table_name = schema::team_board_specs)]
pub struct TeamBoardSpecRow {
    game_id: i32,
    team: String,
    spec_card_side: String,
}

/// One dealt word and its cover.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters, new)]
#[diesel(table_name = schema::board_cells)]
pub struct BoardCellRow {
    game_id: i32,
    row: i32,
    col: i32,
    word: String,
    covered: Option<String>,
    covered_citizen_team: Option<String>,
}

impl BoardCellRow {
    /// Reads the cell back into the rules type.
    #[instrument(skip(self), fields(game_id = self.game_id, row = self.row, col = self.col))]
    pub fn to_domain(&self) -> Result<BoardCell, DbError> {
        let position = position_from_columns(self.row, self.col)?;
        let cover = match (self.covered.as_deref(), self.covered_citizen_team.as_deref()) {
            (None, _) => CoverState::Uncovered,
            (Some("assassin"), _) => CoverState::Assassin,
            (Some("citizen"), Some(citizen)) => {
                CoverState::Citizen(parse_column("board_cells.covered_citizen_team", citizen)?)
            }
            (Some(team), _) => CoverState::Agent(parse_column("board_cells.covered", team)?),
        };
        Ok(BoardCell::new(position, self.word.clone(), cover))
    }
}

/// Column values for a cover event: `covered` and `covered_citizen_team`.
#[instrument]
pub fn cover_columns(cover: Cover) -> (String, Option<String>) {
    match cover {
        Cover::Agent(team) => (team.to_string(), None),
        Cover::Assassin => ("assassin".to_string(), None),
        Cover::Citizen(citizen) => ("citizen".to_string(), Some(citizen.to_string())),
    }
}

/// A turn header.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::turns)]
pub struct TurnRow {
    game_id: i32,
    turn_num: i32,
    team: String,
    hint_word: Option<String>,
    hint_num: Option<i32>,
    allow_pass: bool,
}

impl TurnRow {
    /// Combines the header with the turn's guesses, in order.
    #[instrument(skip(self, guesses), fields(game_id = self.game_id, turn_num = self.turn_num))]
    pub fn to_domain(&self, guesses: &[GuessRow]) -> Result<Turn, DbError> {
        let hint = match (&self.hint_word, self.hint_num) {
            (Some(word), Some(count)) => Some(Hint::new(
                word.clone(),
                to_u32("turns.hint_num", count)?,
            )),
            (None, None) => None,
            _ => return Err(DbError::corrupt("Hint word and count must be set together")),
        };
        let guesses = guesses
            .iter()
            .map(GuessRow::to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Turn::new(
            to_u32("turns.turn_num", self.turn_num)?,
            parse_column("turns.team", &self.team)?,
            hint,
            guesses,
            self.allow_pass,
        ))
    }
}

/// Insertable turn, created without a hint.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::turns)]
pub struct NewTurn {
    game_id: i32,
    turn_num: i32,
    team: String,
    allow_pass: bool,
}

/// A recorded guess.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters, new)]
#[diesel(table_name = schema::guesses)]
pub struct GuessRow {
    game_id: i32,
    turn_num: i32,
    guess_num: i32,
    row: i32,
    col: i32,
}

impl GuessRow {
    /// Reads the guess back into the rules type.
    #[instrument(skip(self))]
    pub fn to_domain(&self) -> Result<Guess, DbError> {
        Ok(Guess::new(
            to_u32("guesses.turn_num", self.turn_num)?,
            to_u32("guesses.guess_num", self.guess_num)?,
            position_from_columns(self.row, self.col)?,
        ))
    }
}

/// Append-only event log entry.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_events)]
pub struct GameEventRow {
    id: i32,
    game_id: i32,
    kind: String,
    payload: String,
    created_at: NaiveDateTime,
}

/// Insertable event log entry.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::game_events)]
pub struct NewGameEvent {
    game_id: i32,
    kind: String,
    payload: String,
}

/// Parses a stored enum string.
#[instrument(skip(value), fields(value = %value))]
pub fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, DbError> {
    value
        .parse()
        .map_err(|_| DbError::corrupt(format!("Invalid {}: '{}'", column, value)))
}

/// Reads a non-negative integer column.
#[instrument]
pub fn to_u32(column: &str, value: i32) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| DbError::corrupt(format!("Negative {}: {}", column, value)))
}

/// Converts a count for storage.
#[instrument]
pub fn to_i32(column: &str, value: u32) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::new(format!("{} out of range: {}", column, value)))
}

#[instrument]
fn position_from_columns(row: i32, col: i32) -> Result<Position, DbError> {
    let row = u8::try_from(row).map_err(|_| DbError::corrupt(format!("Invalid row: {}", row)))?;
    let col = u8::try_from(col).map_err(|_| DbError::corrupt(format!("Invalid col: {}", col)))?;
    Position::checked(row, col)
        .ok_or_else(|| DbError::corrupt(format!("Cell ({}, {}) is off the board", row, col)))
}
