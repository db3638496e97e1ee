//! Tests for two-player guess resolution.

mod common;

use common::{EMPTY, TurnSetup, alex, board, guess, kara, specs, two_player_game};
use strictly_codenames::{
    BoardSpecs, CitizenCover, Cover, Game, GameEvent, GameType, Guess, Position, Rejection,
    RulesError, SpecCardSide, TWO_PLAYER_TURNS, Team, TeamBoardSpec, process_guess,
    process_guess_two_player,
};

fn rejection(result: Result<Vec<GameEvent>, RulesError>) -> Rejection {
    match result {
        Err(RulesError::Rejected(rejection)) => rejection,
        other => panic!("Expected rejection, got {other:?}"),
    }
}

#[test]
fn test_continues_turn_for_first_agent_guess() {
    let game = two_player_game(EMPTY, TurnSetup::default());
    let events = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 0, 0))
        .expect("legal guess");
    assert_eq!(
        events,
        vec![
            GameEvent::Guess {
                turn_num: 1,
                guess_num: 1,
                position: Position::new(0, 0),
            },
            GameEvent::Cover {
                turn_num: 1,
                position: Position::new(0, 0),
                new_cover: Cover::Agent(Team::Team1),
            },
        ]
    );
}

#[test]
fn test_changes_turn_on_citizen_guess() {
    let game = two_player_game(EMPTY, TurnSetup::default());
    let events = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 3, 4))
        .expect("legal guess");
    assert_eq!(
        events,
        vec![
            GameEvent::Guess {
                turn_num: 1,
                guess_num: 1,
                position: Position::new(3, 4),
            },
            GameEvent::Cover {
                turn_num: 1,
                position: Position::new(3, 4),
                new_cover: Cover::Citizen(CitizenCover::Team2),
            },
            GameEvent::NextTurn {
                next_team: Team::Team2,
                next_turn_num: 2,
                next_turn_allow_pass: true,
            },
        ]
    );
}

#[test]
fn test_game_over_if_guess_citizen_on_last_turn() {
    let setup = TurnSetup {
        turn_num: TWO_PLAYER_TURNS,
        ..TurnSetup::default()
    };
    let game = two_player_game(EMPTY, setup);
    let events = process_guess_two_player(&game, &specs(), &kara(), &guess(TWO_PLAYER_TURNS, 3, 4))
        .expect("legal guess");
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2],
        GameEvent::GameOver {
            turn_num: TWO_PLAYER_TURNS,
            winner: None,
        }
    );
    assert!(!events.iter().any(|e| matches!(e, GameEvent::NextTurn { .. })));
}

#[test]
fn test_do_not_allow_pass_for_last_turn() {
    let setup = TurnSetup {
        turn_num: TWO_PLAYER_TURNS - 1,
        ..TurnSetup::default()
    };
    let game = two_player_game(EMPTY, setup);
    let events =
        process_guess_two_player(&game, &specs(), &kara(), &guess(TWO_PLAYER_TURNS - 1, 3, 4))
            .expect("legal guess");
    assert_eq!(
        events[2],
        GameEvent::NextTurn {
            next_team: Team::Team2,
            next_turn_num: TWO_PLAYER_TURNS,
            next_turn_allow_pass: false,
        }
    );
}

#[test]
fn test_same_side_keeps_guessing_if_other_team_is_done() {
    // Team two has found every agent on team one's card.
    let covers = "
        AAAAA
        AAAA-
        -----
        -----
        -----";
    let setup = TurnSetup {
        turn_num: 2,
        team: Team::Team2,
        ..TurnSetup::default()
    };
    let game = two_player_game(covers, setup);
    let events = process_guess_two_player(&game, &specs(), &alex(), &guess(2, 4, 4))
        .expect("legal guess");
    assert_eq!(
        events,
        vec![
            GameEvent::Guess {
                turn_num: 2,
                guess_num: 1,
                position: Position::new(4, 4),
            },
            GameEvent::Cover {
                turn_num: 2,
                position: Position::new(4, 4),
                new_cover: Cover::Citizen(CitizenCover::Team1),
            },
            // Team one guesses again on turn 3; passing would hand the board
            // to a team with nothing left to find.
            GameEvent::NextTurn {
                next_team: Team::Team2,
                next_turn_num: 3,
                next_turn_allow_pass: false,
            },
        ]
    );
}

#[test]
fn test_next_turn_if_player_guesses_last_agent_even_past_turn_limit() {
    let covers = "
        AAAAA
        AAA--
        -----
        -----
        -----";
    let setup = TurnSetup {
        turn_num: TWO_PLAYER_TURNS,
        ..TurnSetup::default()
    };
    let game = two_player_game(covers, setup);
    let events = process_guess_two_player(&game, &specs(), &kara(), &guess(TWO_PLAYER_TURNS, 1, 3))
        .expect("legal guess");
    assert_eq!(
        events,
        vec![
            GameEvent::Guess {
                turn_num: TWO_PLAYER_TURNS,
                guess_num: 1,
                position: Position::new(1, 3),
            },
            GameEvent::Cover {
                turn_num: TWO_PLAYER_TURNS,
                position: Position::new(1, 3),
                new_cover: Cover::Agent(Team::Team1),
            },
            GameEvent::NextTurn {
                next_team: Team::Team2,
                next_turn_num: TWO_PLAYER_TURNS + 1,
                next_turn_allow_pass: false,
            },
        ]
    );
}

#[test]
fn test_game_over_for_win_names_acting_team() {
    let covers = "
        -AAAA
        AAAA-
        ----A
        AAAAA
        -----";
    let game = two_player_game(covers, TurnSetup::default());
    let events = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 0, 0))
        .expect("legal guess");
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameOver {
            turn_num: 1,
            winner: Some(Team::Team2),
        })
    );
}

#[test]
fn test_assassin_is_terminal() {
    let game = two_player_game(EMPTY, TurnSetup::default());
    // (1, 4) is the assassin on team one's card.
    let events = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 1, 4))
        .expect("legal guess");
    assert_eq!(
        events,
        vec![
            GameEvent::Guess {
                turn_num: 1,
                guess_num: 1,
                position: Position::new(1, 4),
            },
            GameEvent::Cover {
                turn_num: 1,
                position: Position::new(1, 4),
                new_cover: Cover::Assassin,
            },
            GameEvent::GameOver {
                turn_num: 1,
                winner: None,
            },
        ]
    );
}

#[test]
fn test_agent_chain_never_advances_turn() {
    let mut covers: Vec<char> = EMPTY.chars().filter(|c| !c.is_whitespace()).collect();
    for col in 0..4u8 {
        let game = two_player_game(&covers.iter().collect::<String>(), TurnSetup::default());
        let g = Guess::new(1, 1, Position::new(0, col));
        let events = process_guess_two_player(&game, &specs(), &kara(), &g).expect("legal guess");
        assert_eq!(events.len(), 2, "agent guess {col} should only guess and cover");
        covers[usize::from(col)] = 'A';
    }
}

#[test]
fn test_citizen_found_by_other_team_becomes_full() {
    let covers = "
        -----
        -----
        -----
        ----1
        -----";
    let game = two_player_game(covers, TurnSetup::default());
    let events = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 3, 4))
        .expect("legal guess");
    assert_eq!(
        events[1],
        GameEvent::Cover {
            turn_num: 1,
            position: Position::new(3, 4),
            new_cover: Cover::Citizen(CitizenCover::Full),
        }
    );
}

#[test]
fn test_claimed_cells_are_rejected() {
    for covers_row in ["A----", "X----", "2----", "Z----", "B----"] {
        let covers = format!("{covers_row}\n-----\n-----\n-----\n-----");
        let game = two_player_game(&covers, TurnSetup::default());
        let result = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 0, 0));
        assert_eq!(
            rejection(result),
            Rejection::CellClaimed(Position::new(0, 0)),
            "cover {covers_row}"
        );
    }
}

#[test]
fn test_turn_team_cannot_guess() {
    let game = two_player_game(EMPTY, TurnSetup::default());
    let result = process_guess_two_player(&game, &specs(), &alex(), &guess(1, 0, 0));
    assert_eq!(rejection(result), Rejection::OutOfTurn);
}

#[test]
fn test_stale_turn_is_rejected() {
    let game = two_player_game(EMPTY, TurnSetup::default());
    let result = process_guess_two_player(&game, &specs(), &kara(), &guess(2, 0, 0));
    assert_eq!(
        rejection(result),
        Rejection::StaleTurn {
            expected: 1,
            actual: 2
        }
    );
}

#[test]
fn test_stale_guess_number_is_rejected() {
    let setup = TurnSetup {
        guesses: vec![Guess::new(1, 1, Position::new(0, 0))],
        ..TurnSetup::default()
    };
    let covers = "
        A----
        -----
        -----
        -----
        -----";
    let game = two_player_game(covers, setup);
    let result = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 0, 1));
    assert_eq!(
        rejection(result),
        Rejection::StaleGuess {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn test_out_of_bounds_is_rejected() {
    let game = two_player_game(EMPTY, TurnSetup::default());
    let result = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 5, 0));
    assert_eq!(
        rejection(result),
        Rejection::CellOutOfBounds(Position::new(5, 0))
    );
}

#[test]
fn test_cells_out_of_order_is_a_fault() {
    let mut cells = board(EMPTY).cells().to_vec();
    cells.swap(0, 1);
    let game = Game::new(
        1,
        Some(GameType::TwoPlayer),
        two_player_game(EMPTY, TurnSetup::default()).current_turn().clone(),
        strictly_codenames::Board::new(cells),
        vec![alex(), kara()],
        None,
        false,
    );
    let result = process_guess_two_player(&game, &specs(), &kara(), &guess(1, 0, 0));
    assert!(matches!(result, Err(RulesError::Inconsistent(_))));
}

#[test]
fn test_guess_without_turn_is_not_started() {
    let game = Game::new(
        1,
        None,
        None,
        board(EMPTY),
        vec![alex(), kara()],
        None,
        false,
    );
    let result = process_guess(&game, &specs(), &kara(), &guess(1, 0, 0));
    assert_eq!(rejection(result), Rejection::GameNotStarted);
}

#[test]
fn test_four_player_guess_is_unsupported() {
    let base = two_player_game(EMPTY, TurnSetup::default());
    let game = Game::new(
        1,
        Some(GameType::FourPlayer),
        base.current_turn().clone(),
        board(EMPTY),
        vec![alex(), kara()],
        None,
        false,
    );
    let result = process_guess(&game, &specs(), &kara(), &guess(1, 0, 0));
    assert_eq!(
        rejection(result),
        Rejection::UnsupportedGameType(GameType::FourPlayer)
    );
}

#[test]
fn test_agent_on_both_cards_can_finish_both_sides() {
    // Every agent sits at (0, 0) on both cards.
    let one = format!("A{}", "Z".repeat(24));
    let specs = BoardSpecs::new(
        TeamBoardSpec::from_layout(Team::Team1, 1, SpecCardSide::Front, &one).expect("layout"),
        TeamBoardSpec::from_layout(Team::Team2, 1, SpecCardSide::Back, &one).expect("layout"),
    )
    .expect("specs");
    let game = two_player_game(EMPTY, TurnSetup::default());
    let events = process_guess_two_player(&game, &specs, &kara(), &guess(1, 0, 0))
        .expect("legal guess");
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameOver {
            turn_num: 1,
            winner: Some(Team::Team2),
        })
    );
}
