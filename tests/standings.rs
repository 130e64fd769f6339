//! Ranking order and result parsing.

use uuid::Uuid;

use chessclub_core::ranking::{rank, Standing};
use chessclub_core::store::models::{MatchResult, Participant};

fn entry(name: &str, points: f64, wins: i32, losses: i32) -> Participant {
    Participant {
        id: Uuid::new_v4(),
        tournament_id: Uuid::nil(),
        user_id: Uuid::new_v4(),
        display_name: name.to_owned(),
        points,
        wins,
        draws: 0,
        losses,
        games: wins + losses,
    }
}

#[test]
fn tie_break_chain_is_applied_in_order() {
    let participants = vec![
        entry("Dora", 2.0, 2, 1),
        entry("Alice", 3.0, 3, 0),
        entry("Carol", 2.0, 2, 0),
        entry("Bob", 2.0, 1, 0),
    ];

    let names: Vec<String> = rank(&participants)
        .into_iter()
        .map(|s| s.display_name)
        .collect();

    // points, then wins, then fewest losses.
    assert_eq!(names, ["Alice", "Carol", "Dora", "Bob"]);
}

#[test]
fn equal_stats_fall_back_to_name() {
    let participants = vec![
        entry("Zara", 1.0, 1, 1),
        entry("", 1.0, 1, 1),
        entry("Ana", 1.0, 1, 1),
    ];

    let standings = rank(&participants);
    let names: Vec<&str> = standings.iter().map(|s| s.display_name.as_str()).collect();
    assert_eq!(names, ["", "Ana", "Zara"]);
    assert_eq!(
        standings.iter().map(|s| s.place).collect::<Vec<_>>(),
        [1, 2, 3]
    );
}

#[test]
fn reruns_are_identical() {
    let participants = vec![
        entry("Mia", 2.5, 2, 1),
        entry("Noa", 2.5, 2, 1),
        entry("Leo", 2.5, 2, 1),
    ];

    let first: Vec<Uuid> = rank(&participants)
        .into_iter()
        .map(|s| s.participant_id)
        .collect();
    for _ in 0..5 {
        let again: Vec<Uuid> = rank(&participants)
            .into_iter()
            .map(|s| s.participant_id)
            .collect();
        assert_eq!(first, again);
    }
}

#[test]
fn standings_serialize_for_the_api() {
    let standings = rank(&[entry("Ana", 1.0, 1, 0)]);

    let json = serde_json::to_string(&standings).unwrap();
    assert!(json.contains("\"display_name\":\"Ana\""));

    let back: Vec<Standing> = serde_json::from_str(&json).unwrap();
    assert_eq!(back[0].place, 1);
    assert_eq!(back[0].points, 1.0);
}

#[test]
fn result_strings_round_trip() {
    for result in [
        MatchResult::WhiteWin,
        MatchResult::BlackWin,
        MatchResult::Draw,
    ] {
        assert_eq!(result.as_str().parse::<MatchResult>().unwrap(), result);
    }
}

#[test]
fn unknown_result_string_is_an_error() {
    let err = "STALEMATE".parse::<MatchResult>().unwrap_err();
    assert_eq!(err.to_string(), "unknown result value: STALEMATE");
}
