//! Rebuilds per-player pairing state from persisted rows.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::PlayerState;
use crate::store::models::{MatchRow, Participant};

/// Derive the state the pairer needs from a tournament's participants and
/// match log. Scores come from the cumulative participant rows, not from
/// replaying matches: pending results would otherwise go uncounted and
/// finished ones double-counted. Avoid-sets and bye flags come strictly
/// from the match rows. Output order follows `participants`.
pub fn rebuild(participants: &[Participant], matches: &[MatchRow]) -> Vec<PlayerState> {
    let mut avoid: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    let mut byes: HashSet<Uuid> = HashSet::new();

    for m in matches {
        match m.black_id {
            Some(black) => {
                avoid.entry(m.white_id).or_default().insert(black);
                avoid.entry(black).or_default().insert(m.white_id);
            }
            None => {
                byes.insert(m.white_id);
            }
        }
    }

    participants
        .iter()
        .map(|p| PlayerState {
            id: p.id,
            score: p.points,
            games: p.games.max(0) as u32,
            avoid: avoid.remove(&p.id).unwrap_or_default(),
            received_bye: byes.contains(&p.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn participant(id: Uuid, tournament_id: Uuid, points: f64, games: i32) -> Participant {
        Participant {
            id,
            tournament_id,
            user_id: Uuid::new_v4(),
            display_name: String::new(),
            points,
            wins: 0,
            draws: 0,
            losses: 0,
            games,
        }
    }

    fn game(tid: Uuid, round: u32, white: Uuid, black: Option<Uuid>) -> MatchRow {
        MatchRow {
            id: Uuid::new_v4(),
            tournament_id: tid,
            round,
            white_id: white,
            black_id: black,
            result: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn avoid_sets_are_mutual_and_byes_flagged() {
        let tid = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let participants = vec![
            participant(a, tid, 1.0, 1),
            participant(b, tid, 0.0, 1),
            participant(c, tid, 1.0, 1),
        ];
        let matches = vec![game(tid, 1, a, Some(b)), game(tid, 1, c, None)];

        let states = rebuild(&participants, &matches);
        assert_eq!(states.len(), 3);
        assert!(states[0].avoid.contains(&b));
        assert!(states[1].avoid.contains(&a));
        assert!(states[2].avoid.is_empty());
        assert!(states[2].received_bye);
        assert!(!states[0].received_bye);
    }

    #[test]
    fn scores_come_from_rows_not_matches() {
        let tid = Uuid::new_v4();
        let a = Uuid::new_v4();
        let states = rebuild(&[participant(a, tid, 2.5, 4)], &[]);
        assert_eq!(states[0].score, 2.5);
        assert_eq!(states[0].games, 4);
    }
}
