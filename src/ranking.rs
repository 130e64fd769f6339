//! Standings computation with deterministic tie-breaks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::models::Participant;

/// One row of the standings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based place after all tie-breaks.
    pub place: u32,
    pub participant_id: Uuid,
    pub display_name: String,
    pub points: f64,
    pub wins: i32,
    pub draws: i32,
    pub losses: i32,
    pub games: i32,
}

/// Total order over participants: points descending, then wins descending,
/// then losses ascending, then display name ascending. The name comparison
/// is plain byte-wise `str` ordering, so equal stat lines always land in
/// the same order and reruns are byte-identical.
pub fn rank(participants: &[Participant]) -> Vec<Standing> {
    let mut ordered: Vec<&Participant> = participants.iter().collect();
    ordered.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| a.losses.cmp(&b.losses))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, p)| Standing {
            place: i as u32 + 1,
            participant_id: p.id,
            display_name: p.display_name.clone(),
            points: p.points,
            wins: p.wins,
            draws: p.draws,
            losses: p.losses,
            games: p.games,
        })
        .collect()
}
