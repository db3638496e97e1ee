//! Board fixtures written as 5x5 character grids.

#![allow(dead_code)]

use strictly_codenames::{
    Board, BoardCell, BoardSpecs, CitizenCover, CoverState, Game, GamePlayer, GameType, Guess,
    Hint, PlayerRole, Position, SpecCardSide, Team, TeamBoardSpec, Turn,
};

/// Team one's card used throughout the fixtures.
pub const SPEC_1: &str = "
    AAAAA
    AAAAX
    XXZZZ
    ZZZZZ
    ZZZZZ";

/// Team two's card used throughout the fixtures.
pub const SPEC_2: &str = "
    AAAZZ
    ZZZZZ
    ZXXXA
    AAAAA
    ZZZZZ";

/// An untouched board.
pub const EMPTY: &str = "
    -----
    -----
    -----
    -----
    -----";

/// Options for [`two_player_game`].
#[derive(Debug, Clone)]
pub struct TurnSetup {
    pub turn_num: u32,
    pub team: Team,
    pub allow_pass: bool,
    pub hint: Option<Hint>,
    pub guesses: Vec<Guess>,
}

impl Default for TurnSetup {
    fn default() -> Self {
        Self {
            turn_num: 1,
            team: Team::Team1,
            allow_pass: true,
            hint: Some(Hint::new("hint".to_string(), 1)),
            guesses: Vec::new(),
        }
    }
}

/// Reads a cover grid: `-` uncovered, `A` team one agent, `B` team two
/// agent, `X` assassin, `1`/`2` citizen found by that team, `Z` full citizen.
pub fn board(covers: &str) -> Board {
    let cells = covers
        .chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(idx, c)| {
            let cover = match c {
                'A' => CoverState::Agent(Team::Team1),
                'B' => CoverState::Agent(Team::Team2),
                'X' => CoverState::Assassin,
                '1' => CoverState::Citizen(CitizenCover::Team1),
                '2' => CoverState::Citizen(CitizenCover::Team2),
                'Z' => CoverState::Citizen(CitizenCover::Full),
                '-' => CoverState::Uncovered,
                other => panic!("Unrecognized cover: {other}"),
            };
            let position = Position::from_index(idx).expect("cell on board");
            BoardCell::new(position, format!("word{idx}"), cover)
        })
        .collect();
    Board::new(cells)
}

pub fn codemaster(player_id: i32, team: Team) -> GamePlayer {
    GamePlayer::new(player_id, team, PlayerRole::Codemaster)
}

/// Team one codemaster (player 1).
pub fn alex() -> GamePlayer {
    codemaster(1, Team::Team1)
}

/// Team two codemaster (player 2).
pub fn kara() -> GamePlayer {
    codemaster(2, Team::Team2)
}

pub fn two_player_game(covers: &str, setup: TurnSetup) -> Game {
    let turn = Turn::new(
        setup.turn_num,
        setup.team,
        setup.hint,
        setup.guesses,
        setup.allow_pass,
    );
    Game::new(
        1,
        Some(GameType::TwoPlayer),
        Some(turn),
        board(covers),
        vec![alex(), kara()],
        None,
        false,
    )
}

pub fn specs() -> BoardSpecs {
    specs_from(SPEC_1, SPEC_2)
}

pub fn specs_from(one: &str, two: &str) -> BoardSpecs {
    let one = TeamBoardSpec::from_layout(Team::Team1, 1, SpecCardSide::Front, one)
        .expect("valid layout");
    let two = TeamBoardSpec::from_layout(Team::Team2, 1, SpecCardSide::Back, two)
        .expect("valid layout");
    BoardSpecs::new(one, two).expect("one spec per team")
}

pub fn guess(turn_num: u32, row: u8, col: u8) -> Guess {
    Guess::new(turn_num, 1, Position::new(row, col))
}
