//! Shared fixtures: a fresh database with a small catalog.

#![allow(dead_code)]

use tempfile::NamedTempFile;

use strictly_codenames::{GameId, Player, PlayerRole, Team};
use strictly_games::{FixedRandomPort, GamePlan, GameStore, SqliteStore, plan_game};

/// Front face, used by team one under [`deterministic_rng`].
pub const FRONT: &str = "
    AAAAA
    AAAAX
    XXZZZ
    ZZZZZ
    ZZZZZ";

/// Back face, used by team two under [`deterministic_rng`].
pub const BACK: &str = "
    AAAZZ
    ZZZZZ
    ZXXXA
    AAAAA
    ZZZZZ";

/// Keeps the catalog order: words `word0..word24` row-major, the first spec
/// card, front face for team one, team one opening.
pub fn deterministic_rng() -> FixedRandomPort {
    FixedRandomPort::constant(0)
}

/// Creates a migrated database in a temp file. The file handle must stay in
/// scope for the database to survive.
pub fn setup_store() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

/// Adds 30 words and one spec card.
pub fn seed_catalog(store: &SqliteStore) {
    let words: Vec<String> = (0..30).map(|i| format!("word{i}")).collect();
    store.add_words(&words).expect("Add words failed");
    store.add_spec_card(FRONT, BACK).expect("Add spec card failed");
}

/// An unstarted game with both codemasters seated.
pub struct Lobby {
    pub game_id: GameId,
    pub alex: Player,
    pub kara: Player,
}

pub fn two_player_lobby(store: &SqliteStore) -> Lobby {
    let alex = store.create_player("alex").expect("Create failed");
    let kara = store.create_player("kara").expect("Create failed");
    let game_id = store.create_game(*alex.id()).expect("Create game failed");
    store
        .add_player_to_game(game_id, *kara.id(), Team::Team2, PlayerRole::Codemaster)
        .expect("Join failed");
    Lobby {
        game_id,
        alex,
        kara,
    }
}

pub fn deterministic_plan(store: &SqliteStore, game_id: GameId) -> GamePlan {
    let players = store.load_game_players(game_id).expect("Load players failed");
    let words = store.word_cards().expect("Load words failed");
    let ids = store.spec_card_ids().expect("Load spec cards failed");
    plan_game(&players, &words, &ids, &deterministic_rng()).expect("Plan failed")
}

/// A started two-player game: turn one belongs to team one.
pub fn started_game(store: &SqliteStore) -> Lobby {
    seed_catalog(store);
    let lobby = two_player_lobby(store);
    let plan = deterministic_plan(store, lobby.game_id);
    store.start_game(lobby.game_id, &plan).expect("Start failed");
    lobby
}
