//! Core domain types: teams, boards, spec cards, turns and games.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::instrument;

use crate::{ConsistencyFault, LayoutError};

/// Rows on the board.
pub const ROWS: usize = 5;
/// Columns on the board.
pub const COLS: usize = 5;
/// Cells on the board.
pub const BOARD_SIZE: usize = ROWS * COLS;
/// Turns shared by both teams in the two-player variant.
pub const TWO_PLAYER_TURNS: u32 = 9;

/// Identifier of a player in the external registry.
pub type PlayerId = i32;
/// Identifier of a stored game.
pub type GameId = i32;
/// Identifier of a spec card in the catalog.
pub type SpecCardId = i32;

/// One of the two teams.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Team {
    /// Team one.
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    Team1,
    /// Team two.
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    Team2,
}

impl Team {
    /// Both teams, in order.
    pub const ALL: [Team; 2] = [Team::Team1, Team::Team2];

    /// Returns the opposing team.
    #[instrument]
    pub fn other(self) -> Self {
        match self {
            Team::Team1 => Team::Team2,
            Team::Team2 => Team::Team1,
        }
    }

    /// Zero-based slot for per-team arrays.
    pub(crate) fn slot(self) -> usize {
        match self {
            Team::Team1 => 0,
            Team::Team2 => 1,
        }
    }
}

/// What a game participant does.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerRole {
    /// Sees the team's spec card and gives hints.
    Codemaster,
    /// Reveals board cells.
    Guesser,
}

/// Rule variant chosen when the game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum GameType {
    /// Two codemasters guessing against each other's cards.
    #[serde(rename = "2player")]
    #[strum(serialize = "2player")]
    TwoPlayer,
    /// Codemasters plus guessers on each side.
    #[serde(rename = "4player")]
    #[strum(serialize = "4player")]
    FourPlayer,
}

/// Hidden identity of a cell on a spec card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CellType {
    /// A secret agent to be found.
    Agent,
    /// Ends the game when revealed.
    Assassin,
    /// A bystander; revealing one ends the guessing streak.
    Citizen,
}

impl CellType {
    /// Reads the one-letter card notation (`A`, `X`, `Z`).
    #[instrument]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'A' => Some(Self::Agent),
            'X' => Some(Self::Assassin),
            'Z' => Some(Self::Citizen),
            _ => None,
        }
    }
}

/// Which face of a physical spec card a team uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpecCardSide {
    /// Front face.
    Front,
    /// Back face.
    Back,
}

/// Who has discovered a citizen cell in the two-player variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum CitizenCover {
    /// Found by team one only.
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    Team1,
    /// Found by team two only.
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    Team2,
    /// Found independently by both teams.
    #[serde(rename = "full")]
    #[strum(serialize = "full")]
    Full,
}

impl CitizenCover {
    /// Returns true if `team` has already found this citizen.
    #[instrument]
    pub fn found_by(self, team: Team) -> bool {
        self == Self::Full || self == Self::from(team)
    }
}

impl From<Team> for CitizenCover {
    fn from(team: Team) -> Self {
        match team {
            Team::Team1 => Self::Team1,
            Team::Team2 => Self::Team2,
        }
    }
}

/// Public reveal state of a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverState {
    /// Not yet revealed.
    #[default]
    Uncovered,
    /// An agent belonging to the given team was found.
    Agent(Team),
    /// The assassin was found.
    Assassin,
    /// A citizen was found by one or both teams.
    Citizen(CitizenCover),
}

impl CoverState {
    /// Returns true if a team's agent covers the cell.
    #[instrument]
    pub fn is_agent(self) -> bool {
        matches!(self, Self::Agent(_))
    }

    /// Returns true if `team` can no longer guess this cell.
    #[instrument]
    pub fn is_claimed_for(self, team: Team) -> bool {
        match self {
            Self::Uncovered => false,
            Self::Agent(_) | Self::Assassin => true,
            Self::Citizen(citizen) => citizen.found_by(team),
        }
    }
}

/// A cell coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based row.
    pub row: u8,
    /// Zero-based column.
    pub col: u8,
}

impl Position {
    /// Creates a position without bounds checking.
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Creates a position, or `None` if it lies off the board.
    #[instrument]
    pub fn checked(row: u8, col: u8) -> Option<Self> {
        let position = Self::new(row, col);
        position.index().map(|_| position)
    }

    /// Row-major index, or `None` if the position is off the board.
    #[instrument]
    pub fn index(self) -> Option<usize> {
        let (row, col) = (usize::from(self.row), usize::from(self.col));
        (row < ROWS && col < COLS).then_some(row * COLS + col)
    }

    /// Position for a row-major index.
    #[instrument]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= BOARD_SIZE {
            return None;
        }
        Some(Self::new((index / COLS) as u8, (index % COLS) as u8))
    }

    /// Every position in row-major order.
    #[instrument]
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).filter_map(Self::from_index)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A word on the shared board and its reveal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct BoardCell {
    position: Position,
    word: String,
    cover: CoverState,
}

/// The shared board, stored in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<BoardCell>,
}

impl Board {
    /// Wraps cells that are already in row-major order.
    #[instrument(skip(cells), fields(count = cells.len()))]
    pub fn new(cells: Vec<BoardCell>) -> Self {
        Self { cells }
    }

    /// Returns the cell stored at the position's linear index.
    ///
    /// The returned cell is not guaranteed to carry the same position; callers
    /// that rely on ordering must check.
    #[instrument(skip(self))]
    pub fn cell_at(&self, position: Position) -> Option<&BoardCell> {
        position.index().and_then(|idx| self.cells.get(idx))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[BoardCell] {
        &self.cells
    }

    /// All board words.
    #[instrument(skip(self))]
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.word().as_str())
    }

    /// Returns true once the board has been dealt.
    #[instrument(skip(self))]
    pub fn is_dealt(&self) -> bool {
        !self.cells.is_empty()
    }
}

/// One cell on a team's secret map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct SpecCardCell {
    position: Position,
    cell_type: CellType,
}

/// A team's secret map: the identity of every board cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct TeamBoardSpec {
    team: Team,
    spec_card_id: SpecCardId,
    side: SpecCardSide,
    cells: Vec<SpecCardCell>,
}

impl TeamBoardSpec {
    /// Builds a spec from the 25-letter card notation.
    ///
    /// Whitespace is ignored, so a layout can be written as a 5x5 grid.
    #[instrument(skip(layout))]
    pub fn from_layout(
        team: Team,
        spec_card_id: SpecCardId,
        side: SpecCardSide,
        layout: &str,
    ) -> Result<Self, LayoutError> {
        let cells = parse_layout(layout)?
            .into_iter()
            .enumerate()
            .filter_map(|(idx, cell_type)| {
                Position::from_index(idx).map(|pos| SpecCardCell::new(pos, cell_type))
            })
            .collect();
        Ok(Self::new(team, spec_card_id, side, cells))
    }

    /// Returns the spec cell stored at the position's linear index.
    #[instrument(skip(self))]
    pub fn cell_at(&self, position: Position) -> Option<&SpecCardCell> {
        position.index().and_then(|idx| self.cells.get(idx))
    }

    /// Positions marked as agents on this card.
    #[instrument(skip(self))]
    pub fn agent_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .filter(|cell| *cell.cell_type() == CellType::Agent)
            .map(|cell| *cell.position())
    }
}

/// A physical spec card: one layout per face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecCard {
    front: Vec<CellType>,
    back: Vec<CellType>,
}

impl SpecCard {
    /// Reads both faces from the 25-letter card notation.
    #[instrument(skip(front, back))]
    pub fn parse(front: &str, back: &str) -> Result<Self, LayoutError> {
        Ok(Self {
            front: parse_layout(front)?,
            back: parse_layout(back)?,
        })
    }

    /// Cell types of one face in row-major order.
    pub fn side(&self, side: SpecCardSide) -> &[CellType] {
        match side {
            SpecCardSide::Front => &self.front,
            SpecCardSide::Back => &self.back,
        }
    }

    /// Assigns one face of this card to a team.
    #[instrument(skip(self))]
    pub fn team_spec(
        &self,
        team: Team,
        spec_card_id: SpecCardId,
        side: SpecCardSide,
    ) -> TeamBoardSpec {
        let cells = self
            .side(side)
            .iter()
            .enumerate()
            .filter_map(|(idx, cell_type)| {
                Position::from_index(idx).map(|pos| SpecCardCell::new(pos, *cell_type))
            })
            .collect();
        TeamBoardSpec::new(team, spec_card_id, side, cells)
    }
}

/// Reads a 25-letter `A`/`X`/`Z` layout, ignoring whitespace.
#[instrument(skip(layout))]
pub fn parse_layout(layout: &str) -> Result<Vec<CellType>, LayoutError> {
    let cells = layout
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            CellType::from_symbol(c)
                .ok_or_else(|| LayoutError::new(format!("Unrecognized cell symbol: {}", c)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if cells.len() != BOARD_SIZE {
        return Err(LayoutError::new(format!(
            "Expected {} cells, found {}",
            BOARD_SIZE,
            cells.len()
        )));
    }
    Ok(cells)
}

/// Both teams' secret maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSpecs {
    specs: [TeamBoardSpec; 2],
}

impl BoardSpecs {
    /// Pairs two specs, which must belong to different teams (in any order).
    #[instrument(skip(a, b))]
    pub fn new(a: TeamBoardSpec, b: TeamBoardSpec) -> Result<Self, ConsistencyFault> {
        if a.team() == b.team() {
            return Err(ConsistencyFault::new(format!(
                "Both board specs belong to team {}",
                a.team()
            )));
        }
        let specs = if *a.team() == Team::Team1 { [a, b] } else { [b, a] };
        Ok(Self { specs })
    }

    /// The secret map belonging to `team`.
    #[instrument(skip(self))]
    pub fn for_team(&self, team: Team) -> &TeamBoardSpec {
        &self.specs[team.slot()]
    }

    /// Both specs, team one first.
    pub fn iter(&self) -> impl Iterator<Item = &TeamBoardSpec> {
        self.specs.iter()
    }
}

/// A registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Player {
    id: PlayerId,
    name: String,
}

/// A player's seat in one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GamePlayer {
    player_id: PlayerId,
    team: Team,
    role: PlayerRole,
}

impl GamePlayer {
    /// Returns true if this seat gives hints.
    #[instrument]
    pub fn is_codemaster(&self) -> bool {
        self.role == PlayerRole::Codemaster
    }
}

/// A codemaster's clue: one word and a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Hint {
    word: String,
    count: u32,
}

/// A single cell reveal attempt within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Guess {
    turn_num: u32,
    guess_num: u32,
    position: Position,
}

/// One turn of play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Turn {
    turn_num: u32,
    team: Team,
    hint: Option<Hint>,
    guesses: Vec<Guess>,
    allow_pass: bool,
}

impl Turn {
    /// Sequence number the next guess of this turn must carry.
    #[instrument(skip(self))]
    pub fn next_guess_num(&self) -> u32 {
        self.guesses.len() as u32 + 1
    }
}

/// A consistent snapshot of one game, as loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Game {
    id: GameId,
    game_type: Option<GameType>,
    current_turn: Option<Turn>,
    board: Board,
    players: Vec<GamePlayer>,
    winning_team: Option<Team>,
    game_over: bool,
}

impl Game {
    /// Returns true once the board and first turn have been assigned.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn is_started(&self) -> bool {
        self.game_type.is_some()
    }

    /// Returns true for the two-player variant.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn is_two_player(&self) -> bool {
        self.game_type == Some(GameType::TwoPlayer)
    }

    /// Finds the seat held by `player_id`.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn player(&self, player_id: PlayerId) -> Option<&GamePlayer> {
        self.players.iter().find(|p| *p.player_id() == player_id)
    }
}
