//! Game setup: validating seats and dealing a board.
//!
//! Randomness enters through [`RandomPort`] so that dealing can be replayed
//! in tests with [`FixedRandomPort`].

use std::sync::atomic::{AtomicUsize, Ordering};

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use strictly_codenames::{
    BOARD_SIZE, GamePlayer, GameType, PlayerRole, SpecCardId, SpecCardSide, Team,
};

/// Source of uniformly distributed indices.
pub trait RandomPort: Send + Sync {
    /// Returns an index in `0..len`. `len` is always at least one.
    fn random_index(&self, len: usize) -> usize;
}

/// Production randomness backed by `rand::thread_rng()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngPort;

impl RandomPort for ThreadRngPort {
    fn random_index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic randomness for tests.
///
/// Returns values from a fixed sequence, cycling when exhausted. Values are
/// clamped to the requested range.
#[derive(Debug)]
pub struct FixedRandomPort {
    values: Vec<usize>,
    index: AtomicUsize,
}

impl FixedRandomPort {
    /// Creates a port that replays `values` in order.
    pub fn new(values: Vec<usize>) -> Self {
        Self {
            values,
            index: AtomicUsize::new(0),
        }
    }

    /// Creates a port that always returns `value`.
    pub fn constant(value: usize) -> Self {
        Self::new(vec![value])
    }
}

impl Clone for FixedRandomPort {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            index: AtomicUsize::new(self.index.load(Ordering::SeqCst)),
        }
    }
}

impl RandomPort for FixedRandomPort {
    fn random_index(&self, len: usize) -> usize {
        if self.values.is_empty() || len == 0 {
            return 0;
        }
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        self.values[idx % self.values.len()].min(len - 1)
    }
}

/// Everything needed to start a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GamePlan {
    /// Rule variant chosen from the seats.
    game_type: GameType,
    /// The 25 board words in row-major order.
    words: Vec<String>,
    /// The spec card both teams draw from.
    spec_card_id: SpecCardId,
    /// Face of the card team one uses; team two gets the other.
    team1_side: SpecCardSide,
    /// Team whose codemaster opens turn one.
    first_team: Team,
}

impl GamePlan {
    /// Face of the spec card assigned to `team`.
    #[instrument(skip(self))]
    pub fn side_for(&self, team: Team) -> SpecCardSide {
        match (team, self.team1_side) {
            (Team::Team1, side) => side,
            (Team::Team2, SpecCardSide::Front) => SpecCardSide::Back,
            (Team::Team2, SpecCardSide::Back) => SpecCardSide::Front,
        }
    }
}

/// A game could not be set up.
#[derive(Debug, Clone, Display, Error)]
#[display("Setup error: {} at {}:{}", message, file, line)]
pub struct SetupError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SetupError {
    /// Creates a new setup error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Derives the rule variant from the seats.
///
/// Both codemasters are required. Guessers must sit on both sides or on
/// neither: without guessers the game is the two-player variant.
///
/// # Errors
///
/// Returns [`SetupError`] for incomplete seating.
#[instrument(skip(players), fields(players = players.len()))]
pub fn game_type_for(players: &[GamePlayer]) -> Result<GameType, SetupError> {
    let seats = |team: Team, role: PlayerRole| {
        players
            .iter()
            .filter(|p| *p.team() == team && *p.role() == role)
            .count()
    };

    if Team::ALL
        .iter()
        .any(|team| seats(*team, PlayerRole::Codemaster) == 0)
    {
        warn!("Missing codemasters");
        return Err(SetupError::new("Missing codemasters"));
    }
    let guessers1 = seats(Team::Team1, PlayerRole::Guesser);
    let guessers2 = seats(Team::Team2, PlayerRole::Guesser);
    if (guessers1 > 0) != (guessers2 > 0) {
        warn!(guessers1, guessers2, "Missing guessers on one side");
        return Err(SetupError::new("Missing guessers on one side"));
    }
    Ok(if guessers1 == 0 {
        GameType::TwoPlayer
    } else {
        GameType::FourPlayer
    })
}

/// Validates the seats and deals a board.
///
/// The seats decide the variant (see [`game_type_for`]). The board is a
/// random sample of 25 distinct words in shuffled order; the spec card,
/// the assignment of its faces and the opening team are drawn from `rng`.
///
/// # Errors
///
/// Returns [`SetupError`] for incomplete seating, fewer than 25 words, or an
/// empty spec card catalog.
#[instrument(skip(players, words, spec_card_ids, rng), fields(players = players.len(), words = words.len()))]
pub fn plan_game(
    players: &[GamePlayer],
    words: &[String],
    spec_card_ids: &[SpecCardId],
    rng: &dyn RandomPort,
) -> Result<GamePlan, SetupError> {
    let game_type = game_type_for(players)?;

    if words.len() < BOARD_SIZE {
        return Err(SetupError::new(format!(
            "Not enough words: found {}, need {}",
            words.len(),
            BOARD_SIZE
        )));
    }
    if spec_card_ids.is_empty() {
        return Err(SetupError::new("No spec cards available"));
    }

    let words = sample_words(words, rng);
    let spec_card_id = spec_card_ids[rng.random_index(spec_card_ids.len())];
    let team1_side = if rng.random_index(2) == 0 {
        SpecCardSide::Front
    } else {
        SpecCardSide::Back
    };
    let first_team = Team::ALL[rng.random_index(Team::ALL.len())];

    info!(%game_type, spec_card_id, %team1_side, %first_team, "Game planned");
    Ok(GamePlan::new(
        game_type,
        words,
        spec_card_id,
        team1_side,
        first_team,
    ))
}

/// Picks `BOARD_SIZE` distinct words in random order with a partial
/// Fisher-Yates shuffle.
#[instrument(skip(words, rng), fields(pool = words.len()))]
fn sample_words(words: &[String], rng: &dyn RandomPort) -> Vec<String> {
    let mut pool: Vec<&String> = words.iter().collect();
    for i in 0..BOARD_SIZE.min(pool.len()) {
        let j = i + rng.random_index(pool.len() - i);
        pool.swap(i, j);
    }
    let sample: Vec<String> = pool.into_iter().take(BOARD_SIZE).cloned().collect();
    debug!(first = ?sample.first(), "Words sampled");
    sample
}
