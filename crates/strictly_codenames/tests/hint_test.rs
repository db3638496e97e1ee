//! Tests for hint validation.

mod common;

use common::{EMPTY, TurnSetup, alex, kara, two_player_game};
use strictly_codenames::{
    GameEvent, GamePlayer, PlayerRole, Rejection, RulesError, Team, process_hint,
};

fn hintless() -> TurnSetup {
    TurnSetup {
        hint: None,
        ..TurnSetup::default()
    }
}

fn rejection(result: Result<Vec<GameEvent>, RulesError>) -> Rejection {
    match result {
        Err(RulesError::Rejected(rejection)) => rejection,
        other => panic!("Expected rejection, got {other:?}"),
    }
}

#[test]
fn test_codemaster_gives_hint() {
    let game = two_player_game(EMPTY, hintless());
    let events = process_hint(&game, &alex(), 1, "  ocean ", 2).expect("valid hint");
    assert_eq!(
        events,
        vec![GameEvent::Hint {
            turn_num: 1,
            hint: "ocean".to_string(),
            hint_num: 2,
        }]
    );
}

#[test]
fn test_hint_num_must_be_positive() {
    let game = two_player_game(EMPTY, hintless());
    let result = process_hint(&game, &alex(), 1, "ocean", 0);
    assert_eq!(rejection(result), Rejection::InvalidHintNumber(0));
}

#[test]
fn test_guesser_cannot_hint() {
    let game = two_player_game(EMPTY, hintless());
    let guesser = GamePlayer::new(3, Team::Team1, PlayerRole::Guesser);
    let result = process_hint(&game, &guesser, 1, "ocean", 1);
    assert_eq!(rejection(result), Rejection::NotCodemaster);
}

#[test]
fn test_other_codemaster_cannot_hint() {
    let game = two_player_game(EMPTY, hintless());
    let result = process_hint(&game, &kara(), 1, "ocean", 1);
    assert_eq!(rejection(result), Rejection::HintOutOfTurn);
}

#[test]
fn test_one_hint_per_turn() {
    let game = two_player_game(EMPTY, TurnSetup::default());
    let result = process_hint(&game, &alex(), 1, "ocean", 1);
    assert_eq!(rejection(result), Rejection::HintAlreadyGiven);
}

#[test]
fn test_hint_on_stale_turn() {
    let game = two_player_game(EMPTY, hintless());
    let result = process_hint(&game, &alex(), 2, "ocean", 1);
    assert_eq!(
        rejection(result),
        Rejection::StaleTurn {
            expected: 1,
            actual: 2
        }
    );
}

#[test]
fn test_hint_overlapping_board_word() {
    // Fixture words are `word0` through `word24`.
    let game = two_player_game(EMPTY, hintless());
    let result = process_hint(&game, &alex(), 1, "Word", 1);
    assert_eq!(
        rejection(result),
        Rejection::HintWordConflict("Word".to_string())
    );
}

#[test]
fn test_malformed_hint() {
    let game = two_player_game(EMPTY, hintless());
    let result = process_hint(&game, &alex(), 1, "two  spaces", 1);
    assert!(matches!(
        rejection(result),
        Rejection::HintWordConflict(_)
    ));
}
