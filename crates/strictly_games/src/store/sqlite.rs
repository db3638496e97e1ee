//! SQLite-backed [`GameStore`].

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use strictly_codenames::{
    BOARD_SIZE, Board, BoardSpecs, Game, GameEvent, GameId, GamePlayer, Player, PlayerId,
    PlayerRole, Position, SpecCard, SpecCardId, Team, TeamBoardSpec, Turn,
};

use super::models::{
    BoardCellRow, GameEventRow, GamePlayerRow, GameRow, GuessRow, NewGame, NewGameEvent,
    NewPlayer, NewSpecCard, NewTurn, NewWordCard, PlayerRow, SpecCardRow, TeamBoardSpecRow,
    TurnRow, cover_columns, parse_column, to_i32,
};
use super::{DbError, GameInfo, GameState, GameStore, schema};
use crate::{GamePlan, game_type_for};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Game store backed by a SQLite file.
///
/// Every call opens its own connection. Writes that make up one action run
/// inside a single `BEGIN IMMEDIATE` transaction, so concurrent actions on
/// the same database are serialized.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path))]
    pub fn open(db_path: impl Into<String>) -> Result<Self, DbError> {
        let store = Self {
            db_path: db_path.into(),
        };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Failed to run migrations: {}", e)))?
            .len();
        info!(path = %store.db_path, applied, "SqliteStore ready");
        Ok(store)
    }

    /// Path of the underlying database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        diesel::sql_query("PRAGMA busy_timeout = 5000").execute(&mut conn)?;
        Ok(conn)
    }
}

impl GameStore for SqliteStore {
    #[instrument(skip(self))]
    fn load_game(&self, game_id: GameId) -> Result<Game, DbError> {
        let mut conn = self.connection()?;
        let game = conn.transaction::<_, DbError, _>(|conn| {
            let row = find_game(conn, game_id)?;

            let cells = schema::board_cells::table
                .filter(schema::board_cells::game_id.eq(game_id))
                .order((schema::board_cells::row.asc(), schema::board_cells::col.asc()))
                .select(BoardCellRow::as_select())
                .load(conn)?
                .iter()
                .map(BoardCellRow::to_domain)
                .collect::<Result<Vec<_>, _>>()?;

            let players = load_players(conn, game_id)?;
            let current_turn = match row.current_turn_num() {
                Some(turn_num) => Some(load_turn(conn, game_id, *turn_num)?),
                None => None,
            };
            let game_type = row
                .game_type()
                .as_deref()
                .map(|value| parse_column("games.game_type", value))
                .transpose()?;
            let winning_team = row
                .winning_team()
                .as_deref()
                .map(|value| parse_column("games.winning_team", value))
                .transpose()?;

            Ok(Game::new(
                *row.id(),
                game_type,
                current_turn,
                Board::new(cells),
                players,
                winning_team,
                *row.game_over(),
            ))
        })?;
        debug!(
            started = game.is_started(),
            game_over = game.game_over(),
            "Game loaded"
        );
        Ok(game)
    }

    #[instrument(skip(self))]
    fn load_team_board_specs(&self, game_id: GameId) -> Result<BoardSpecs, DbError> {
        let mut conn = self.connection()?;
        conn.transaction::<_, DbError, _>(|conn| {
            let game = find_game(conn, game_id)?;
            let spec_card_id = (*game.spec_card_id())
                .ok_or_else(|| DbError::not_found(format!("Game {} has not started", game_id)))?;

            let card_row = schema::spec_cards::table
                .find(spec_card_id)
                .select(SpecCardRow::as_select())
                .first(conn)?;
            let card = SpecCard::parse(card_row.front(), card_row.back())
                .map_err(|e| DbError::corrupt(format!("Spec card {}: {}", spec_card_id, e)))?;

            let specs = schema::team_board_specs::table
                .filter(schema::team_board_specs::game_id.eq(game_id))
                .select(TeamBoardSpecRow::as_select())
                .load(conn)?
                .iter()
                .map(|row| {
                    let team: Team = parse_column("team_board_specs.team", row.team())?;
                    let side = parse_column("team_board_specs.spec_card_side", row.spec_card_side())?;
                    Ok(card.team_spec(team, spec_card_id, side))
                })
                .collect::<Result<Vec<_>, DbError>>()?;

            let [first, second]: [TeamBoardSpec; 2] =
                specs.try_into().map_err(|specs: Vec<TeamBoardSpec>| {
                    DbError::corrupt(format!(
                        "Expected 2 team board specs for game {}, found {}",
                        game_id,
                        specs.len()
                    ))
                })?;
            BoardSpecs::new(first, second).map_err(|e| DbError::corrupt(e.to_string()))
        })
    }

    #[instrument(skip(self))]
    fn load_game_players(&self, game_id: GameId) -> Result<Vec<GamePlayer>, DbError> {
        let mut conn = self.connection()?;
        find_game(&mut conn, game_id)?;
        load_players(&mut conn, game_id)
    }

    #[instrument(skip(self, events), fields(count = events.len()))]
    fn apply_events(&self, game_id: GameId, events: &[GameEvent]) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, DbError, _>(|conn| {
            if *find_game(conn, game_id)?.game_over() {
                return Err(DbError::conflict(format!("Game {} is already over", game_id)));
            }
            for event in events {
                apply_event(conn, game_id, event)?;
                record_event(conn, game_id, event)?;
            }
            Ok(())
        })?;
        info!(game_id, count = events.len(), "Events applied");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load_events(&self, game_id: GameId) -> Result<Vec<GameEvent>, DbError> {
        let mut conn = self.connection()?;
        schema::game_events::table
            .filter(schema::game_events::game_id.eq(game_id))
            .order(schema::game_events::id.asc())
            .select(GameEventRow::as_select())
            .load(&mut conn)?
            .iter()
            .map(|row| {
                serde_json::from_str(row.payload()).map_err(|e| {
                    DbError::corrupt(format!("Event {} unreadable: {}", row.id(), e))
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    fn create_player(&self, name: &str) -> Result<Player, DbError> {
        let mut conn = self.connection()?;
        let row = diesel::insert_into(schema::players::table)
            .values(&NewPlayer::new(name.to_string()))
            .returning(PlayerRow::as_returning())
            .get_result(&mut conn)?;
        info!(player_id = row.id(), name = %row.name(), "Player created");
        Ok(Player::from(row))
    }

    #[instrument(skip(self))]
    fn create_game(&self, created_by: PlayerId) -> Result<GameId, DbError> {
        let mut conn = self.connection()?;
        let game_id = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let game_id = diesel::insert_into(schema::games::table)
                .values(&NewGame::new(created_by))
                .returning(schema::games::id)
                .get_result::<i32>(conn)?;
            seat_player(conn, game_id, created_by, Team::Team1, PlayerRole::Codemaster)?;
            Ok(game_id)
        })?;
        info!(game_id, created_by, "Game created");
        Ok(game_id)
    }

    #[instrument(skip(self))]
    fn add_player_to_game(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        team: Team,
        role: PlayerRole,
    ) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, DbError, _>(|conn| {
            if find_game(conn, game_id)?.game_type().is_some() {
                warn!(game_id, "Seat change after start");
                return Err(DbError::conflict(format!("Game {} already started", game_id)));
            }
            seat_player(conn, game_id, player_id, team, role)
        })?;
        info!(game_id, player_id, %team, %role, "Player seated");
        Ok(())
    }

    #[instrument(skip(self, plan), fields(game_type = %plan.game_type()))]
    fn start_game(&self, game_id: GameId, plan: &GamePlan) -> Result<(), DbError> {
        if plan.words().len() != BOARD_SIZE {
            return Err(DbError::new(format!(
                "Board needs {} words, plan has {}",
                BOARD_SIZE,
                plan.words().len()
            )));
        }

        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, DbError, _>(|conn| {
            if find_game(conn, game_id)?.game_type().is_some() {
                return Err(DbError::conflict(format!("Game {} already started", game_id)));
            }
            // Seats may have changed since the plan was drawn.
            let seated = game_type_for(&load_players(conn, game_id)?).map_err(|e| {
                DbError::conflict(format!("Seats changed since planning: {}", e.message))
            })?;
            if seated != *plan.game_type() {
                warn!(%seated, planned = %plan.game_type(), "Seats no longer match plan");
                return Err(DbError::conflict(format!(
                    "Seats now make a {} game, plan is for {}",
                    seated,
                    plan.game_type()
                )));
            }

            let updated = diesel::update(
                schema::games::table
                    .find(game_id)
                    .filter(schema::games::game_type.is_null()),
            )
            .set((
                schema::games::game_type.eq(plan.game_type().to_string()),
                schema::games::spec_card_id.eq(*plan.spec_card_id()),
                schema::games::current_turn_num.eq(1),
            ))
            .execute(conn)?;
            if updated == 0 {
                find_game(conn, game_id)?;
                return Err(DbError::conflict(format!("Game {} already started", game_id)));
            }

            for (position, word) in Position::all().zip(plan.words()) {
                diesel::insert_into(schema::board_cells::table)
                    .values(&BoardCellRow::new(
                        game_id,
                        i32::from(position.row),
                        i32::from(position.col),
                        word.clone(),
                        None,
                        None,
                    ))
                    .execute(conn)?;
            }

            diesel::insert_into(schema::turns::table)
                .values(&NewTurn::new(game_id, 1, plan.first_team().to_string(), true))
                .execute(conn)?;

            for team in Team::ALL {
                diesel::insert_into(schema::team_board_specs::table)
                    .values(&TeamBoardSpecRow::new(
                        game_id,
                        team.to_string(),
                        plan.side_for(team).to_string(),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })?;
        info!(game_id, first_team = %plan.first_team(), "Game started");
        Ok(())
    }

    #[instrument(skip(self, words), fields(count = words.len()))]
    fn add_words(&self, words: &[String]) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let added = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let mut added = 0;
            for word in words {
                added += diesel::insert_or_ignore_into(schema::word_cards::table)
                    .values(&NewWordCard::new(word.trim().to_string()))
                    .execute(conn)?;
            }
            Ok(added)
        })?;
        info!(added, "Words added");
        Ok(added)
    }

    #[instrument(skip(self, front, back))]
    fn add_spec_card(&self, front: &str, back: &str) -> Result<SpecCardId, DbError> {
        SpecCard::parse(front, back)
            .map_err(|e| DbError::new(format!("Invalid spec card: {}", e)))?;
        let compact =
            |layout: &str| -> String { layout.chars().filter(|c| !c.is_whitespace()).collect() };

        let mut conn = self.connection()?;
        let id = diesel::insert_into(schema::spec_cards::table)
            .values(&NewSpecCard::new(compact(front), compact(back)))
            .returning(schema::spec_cards::id)
            .get_result::<i32>(&mut conn)?;
        info!(spec_card_id = id, "Spec card added");
        Ok(id)
    }

    #[instrument(skip(self))]
    fn word_cards(&self) -> Result<Vec<String>, DbError> {
        let mut conn = self.connection()?;
        let words = schema::word_cards::table
            .order(schema::word_cards::id.asc())
            .select(schema::word_cards::word)
            .load::<String>(&mut conn)?;
        debug!(count = words.len(), "Words loaded");
        Ok(words)
    }

    #[instrument(skip(self))]
    fn spec_card_ids(&self) -> Result<Vec<SpecCardId>, DbError> {
        let mut conn = self.connection()?;
        let ids = schema::spec_cards::table
            .order(schema::spec_cards::id.asc())
            .select(schema::spec_cards::id)
            .load::<i32>(&mut conn)?;
        Ok(ids)
    }

    #[instrument(skip(self))]
    fn games_by_player(
        &self,
        player_id: PlayerId,
        state: GameState,
        limit: usize,
    ) -> Result<Vec<GameInfo>, DbError> {
        use schema::games::dsl as g;

        let limit = i64::try_from(limit)
            .map_err(|_| DbError::new(format!("Listing limit out of range: {}", limit)))?;
        let mut conn = self.connection()?;
        conn.transaction::<_, DbError, _>(|conn| {
            let query = g::games
                .filter(g::created_by_player_id.eq(player_id))
                .select(GameRow::as_select())
                .into_boxed();
            let query = match state {
                GameState::Unstarted => query
                    .filter(g::game_over.eq(false))
                    .filter(g::game_type.is_null()),
                GameState::Active => query
                    .filter(g::game_over.eq(false))
                    .filter(g::game_type.is_not_null()),
                GameState::Completed => query.filter(g::game_over.eq(true)),
            };
            let rows = query
                .order((g::created_at.desc(), g::id.desc()))
                .limit(limit)
                .load::<GameRow>(conn)?;

            let mut infos = Vec::with_capacity(rows.len());
            for row in &rows {
                let players = load_players(conn, *row.id())?;
                infos.push(row.to_info(players)?);
            }
            debug!(count = infos.len(), "Games listed");
            Ok(infos)
        })
    }

    #[instrument(skip(self))]
    fn delete_game(&self, game_id: GameId, requester: PlayerId) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, DbError, _>(|conn| {
            let game = find_game(conn, game_id)?;
            if *game.created_by_player_id() != requester {
                warn!(game_id, requester, "Delete by a player who does not own the game");
                return Err(DbError::forbidden("Player does not own game"));
            }

            diesel::delete(
                schema::game_events::table.filter(schema::game_events::game_id.eq(game_id)),
            )
            .execute(conn)?;
            diesel::delete(schema::guesses::table.filter(schema::guesses::game_id.eq(game_id)))
                .execute(conn)?;
            diesel::delete(schema::turns::table.filter(schema::turns::game_id.eq(game_id)))
                .execute(conn)?;
            diesel::delete(
                schema::board_cells::table.filter(schema::board_cells::game_id.eq(game_id)),
            )
            .execute(conn)?;
            diesel::delete(
                schema::team_board_specs::table
                    .filter(schema::team_board_specs::game_id.eq(game_id)),
            )
            .execute(conn)?;
            diesel::delete(
                schema::game_players::table.filter(schema::game_players::game_id.eq(game_id)),
            )
            .execute(conn)?;
            diesel::delete(schema::games::table.find(game_id)).execute(conn)?;
            Ok(())
        })?;
        info!(game_id, requester, "Game deleted");
        Ok(())
    }
}

#[instrument(skip(conn))]
fn find_game(conn: &mut SqliteConnection, game_id: GameId) -> Result<GameRow, DbError> {
    schema::games::table
        .find(game_id)
        .select(GameRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DbError::not_found(format!("Game not found: {}", game_id)))
}

#[instrument(skip(conn))]
fn load_players(conn: &mut SqliteConnection, game_id: GameId) -> Result<Vec<GamePlayer>, DbError> {
    schema::game_players::table
        .filter(schema::game_players::game_id.eq(game_id))
        .order(schema::game_players::player_id.asc())
        .select(GamePlayerRow::as_select())
        .load(conn)?
        .iter()
        .map(GamePlayerRow::to_domain)
        .collect()
}

#[instrument(skip(conn))]
fn load_turn(conn: &mut SqliteConnection, game_id: GameId, turn_num: i32) -> Result<Turn, DbError> {
    let turn = schema::turns::table
        .find((game_id, turn_num))
        .select(TurnRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| {
            DbError::corrupt(format!(
                "Current turn {} not found for game {}",
                turn_num, game_id
            ))
        })?;
    let guesses = schema::guesses::table
        .filter(schema::guesses::game_id.eq(game_id))
        .filter(schema::guesses::turn_num.eq(turn_num))
        .order(schema::guesses::guess_num.asc())
        .select(GuessRow::as_select())
        .load(conn)?;
    turn.to_domain(&guesses)
}

#[instrument(skip(conn))]
fn seat_player(
    conn: &mut SqliteConnection,
    game_id: GameId,
    player_id: PlayerId,
    team: Team,
    role: PlayerRole,
) -> Result<(), DbError> {
    use schema::game_players::dsl as gp;

    diesel::delete(
        gp::game_players
            .filter(gp::game_id.eq(game_id))
            .filter(gp::player_id.eq(player_id)),
    )
    .execute(conn)?;
    if role == PlayerRole::Codemaster {
        let replaced = diesel::delete(
            gp::game_players
                .filter(gp::game_id.eq(game_id))
                .filter(gp::team.eq(team.to_string()))
                .filter(gp::role.eq(role.to_string())),
        )
        .execute(conn)?;
        if replaced > 0 {
            debug!(%team, "Replaced codemaster");
        }
    }
    diesel::insert_into(gp::game_players)
        .values(&GamePlayerRow::new(
            game_id,
            player_id,
            team.to_string(),
            role.to_string(),
        ))
        .execute(conn)?;
    Ok(())
}

/// Fails with a conflict when a guarded write touched nothing.
#[track_caller]
fn ensure_updated(rows: usize, message: &str) -> Result<(), DbError> {
    if rows == 0 {
        return Err(DbError::conflict(message));
    }
    Ok(())
}

#[instrument(skip(conn, game_id))]
fn current_turn_is(
    conn: &mut SqliteConnection,
    game_id: GameId,
    turn_num: i32,
) -> Result<bool, DbError> {
    Ok(*find_game(conn, game_id)?.current_turn_num() == Some(turn_num))
}

#[instrument(skip(conn), fields(kind = event.kind()))]
fn apply_event(
    conn: &mut SqliteConnection,
    game_id: GameId,
    event: &GameEvent,
) -> Result<(), DbError> {
    match event {
        GameEvent::Hint {
            turn_num,
            hint,
            hint_num,
        } => {
            let turn_num = to_i32("turn_num", *turn_num)?;
            if !current_turn_is(conn, game_id, turn_num)? {
                return Err(DbError::conflict("Hint given out of sync"));
            }
            let updated = diesel::update(
                schema::turns::table
                    .find((game_id, turn_num))
                    .filter(schema::turns::hint_word.is_null()),
            )
            .set((
                schema::turns::hint_word.eq(hint),
                schema::turns::hint_num.eq(to_i32("hint_num", *hint_num)?),
            ))
            .execute(conn)?;
            ensure_updated(updated, "Hint either not found or already given")
        }
        GameEvent::Guess {
            turn_num,
            guess_num,
            position,
        } => {
            let turn_num = to_i32("turn_num", *turn_num)?;
            if !current_turn_is(conn, game_id, turn_num)? {
                return Err(DbError::conflict("Guess made out of sync"));
            }
            diesel::insert_into(schema::guesses::table)
                .values(&GuessRow::new(
                    game_id,
                    turn_num,
                    to_i32("guess_num", *guess_num)?,
                    i32::from(position.row),
                    i32::from(position.col),
                ))
                .execute(conn)?;
            Ok(())
        }
        GameEvent::Cover {
            position,
            new_cover,
            ..
        } => {
            let (covered, citizen) = cover_columns(*new_cover);
            let updated = diesel::update(schema::board_cells::table.find((
                game_id,
                i32::from(position.row),
                i32::from(position.col),
            )))
            .set((
                schema::board_cells::covered.eq(Some(covered)),
                schema::board_cells::covered_citizen_team.eq(citizen),
            ))
            .execute(conn)?;
            if updated == 0 {
                return Err(DbError::not_found(format!("No board cell at {}", position)));
            }
            Ok(())
        }
        GameEvent::Pass { turn_num } => {
            debug!(turn_num, "Pass recorded");
            Ok(())
        }
        GameEvent::NextTurn {
            next_team,
            next_turn_num,
            next_turn_allow_pass,
        } => {
            let next = to_i32("next_turn_num", *next_turn_num)?;
            let updated = diesel::update(
                schema::games::table
                    .find(game_id)
                    .filter(schema::games::current_turn_num.eq(next - 1))
                    .filter(schema::games::game_over.eq(false)),
            )
            .set(schema::games::current_turn_num.eq(next))
            .execute(conn)?;
            ensure_updated(updated, "Failed to increment turn num")?;

            diesel::insert_into(schema::turns::table)
                .values(&NewTurn::new(
                    game_id,
                    next,
                    next_team.to_string(),
                    *next_turn_allow_pass,
                ))
                .execute(conn)?;
            Ok(())
        }
        GameEvent::GameOver { turn_num, winner } => {
            let turn_num = to_i32("turn_num", *turn_num)?;
            let updated = diesel::update(
                schema::games::table
                    .find(game_id)
                    .filter(schema::games::current_turn_num.eq(turn_num))
                    .filter(schema::games::game_over.eq(false)),
            )
            .set((
                schema::games::game_over.eq(true),
                schema::games::winning_team.eq(winner.map(|team| team.to_string())),
            ))
            .execute(conn)?;
            ensure_updated(updated, "Failed to set game over")
        }
    }
}

#[instrument(skip(conn, event), fields(kind = event.kind()))]
fn record_event(
    conn: &mut SqliteConnection,
    game_id: GameId,
    event: &GameEvent,
) -> Result<(), DbError> {
    let payload = serde_json::to_string(event)
        .map_err(|e| DbError::new(format!("Failed to serialize event: {}", e)))?;
    diesel::insert_into(schema::game_events::table)
        .values(&NewGameEvent::new(game_id, event.kind().to_string(), payload))
        .execute(conn)?;
    Ok(())
}
