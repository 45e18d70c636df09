//! Round scoring and leaderboard ordering
//!
//! A finished round awards every player its 0-based place in the death
//! order: first out scores nothing, the last one standing scores most.

use serde::{Deserialize, Serialize};

use crate::consts::{POINTS_PER_OPPONENT, WINNING_LEAD};
use crate::error::SimError;
use crate::sim::body::Color;

/// One player's line in the results animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub old_score: u32,
    /// Leaderboard position before this round (0 = leader)
    pub old_position: usize,
    pub new_score: u32,
    pub new_position: usize,
    pub color: Color,
}

/// Leaderboard position of every player: scores sorted descending, ties
/// keep slot order.
pub fn positions(scores: &[u32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));

    let mut positions = vec![0; scores.len()];
    for (position, &slot) in order.iter().enumerate() {
        positions[slot] = position;
    }
    positions
}

/// Add each player's finishing place to its score.
///
/// `death_order` must name every player exactly once. The last `survivors`
/// entries outlasted everyone and share the top place.
pub fn score_round(
    scores: &mut [u32],
    death_order: &[usize],
    survivors: usize,
) -> Result<(), SimError> {
    if death_order.len() != scores.len() {
        return Err(SimError::IncompleteDeathOrder {
            expected: scores.len(),
            actual: death_order.len(),
        });
    }
    if let Some(&bad) = death_order.iter().find(|&&slot| slot >= scores.len()) {
        return Err(SimError::UnknownPlayer(bad));
    }

    let top = death_order.len().saturating_sub(1);
    let shared_from = death_order.len().saturating_sub(survivors);
    for (place, &slot) in death_order.iter().enumerate() {
        let points = if place >= shared_from { top } else { place };
        scores[slot] += points as u32;
    }
    Ok(())
}

/// Results-screen lines comparing two score tables
pub fn player_scores(old: &[u32], new: &[u32], colors: &[Color]) -> Vec<PlayerScore> {
    let old_positions = positions(old);
    let new_positions = positions(new);
    colors
        .iter()
        .enumerate()
        .map(|(slot, &color)| PlayerScore {
            old_score: old[slot],
            old_position: old_positions[slot],
            new_score: new[slot],
            new_position: new_positions[slot],
            color,
        })
        .collect()
}

/// Outcome of the win check made when a round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nobody has reached the target yet
    ReachTarget(u32),
    /// Target reached but the lead is too small
    NeedLead,
    /// This slot won outright
    Winner(usize),
}

impl Verdict {
    /// Text shown on the results screen
    pub fn how_to_win_text(&self) -> String {
        match self {
            Verdict::ReachTarget(target) => format!("Reach {target} points"),
            Verdict::NeedLead => format!("Get a {WINNING_LEAD}-point lead"),
            Verdict::Winner(_) => String::new(),
        }
    }
}

/// Decide whether the game is over
pub fn judge(scores: &[u32]) -> Verdict {
    let target = POINTS_PER_OPPONENT * (scores.len().saturating_sub(1) as u32);

    let mut leader: Option<usize> = None;
    for (slot, &score) in scores.iter().enumerate() {
        if leader.is_none_or(|l| score > scores[l]) {
            leader = Some(slot);
        }
    }
    let Some(leader) = leader else {
        return Verdict::ReachTarget(target);
    };
    let first = scores[leader];
    let second = scores
        .iter()
        .enumerate()
        .filter(|&(slot, _)| slot != leader)
        .map(|(_, &s)| s)
        .max()
        .unwrap_or(0);

    if first < target {
        Verdict::ReachTarget(target)
    } else if first - second < WINNING_LEAD {
        Verdict::NeedLead
    } else {
        Verdict::Winner(leader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_stable_on_ties() {
        assert_eq!(positions(&[3, 5, 3, 1]), vec![1, 0, 2, 3]);
        assert_eq!(positions(&[0, 0, 0]), vec![0, 1, 2]);
    }

    #[test]
    fn test_score_round_awards_place() {
        let mut scores = vec![0, 0, 0];
        score_round(&mut scores, &[2, 0, 1], 1).unwrap();
        assert_eq!(scores, vec![1, 2, 0]);

        score_round(&mut scores, &[0, 2, 1], 1).unwrap();
        assert_eq!(scores, vec![1, 4, 1]);
    }

    #[test]
    fn test_score_round_survivors_share_top_place() {
        let mut scores = vec![0, 0, 0];
        score_round(&mut scores, &[1, 0, 2], 2).unwrap();
        assert_eq!(scores, vec![2, 0, 2]);
    }

    #[test]
    fn test_score_round_rejects_incomplete_order() {
        let mut scores = vec![4, 4];
        let err = score_round(&mut scores, &[1], 0).unwrap_err();
        assert!(matches!(
            err,
            SimError::IncompleteDeathOrder {
                expected: 2,
                actual: 1
            }
        ));
        assert_eq!(scores, vec![4, 4], "scores untouched on error");
    }

    #[test]
    fn test_score_round_rejects_unknown_slot() {
        let mut scores = vec![0, 0];
        assert!(matches!(
            score_round(&mut scores, &[0, 5], 1),
            Err(SimError::UnknownPlayer(5))
        ));
    }

    #[test]
    fn test_player_scores_track_movement() {
        let lines = player_scores(&[2, 3], &[4, 3], &[[1, 1, 1], [2, 2, 2]]);
        assert_eq!(lines[0].old_position, 1);
        assert_eq!(lines[0].new_position, 0);
        assert_eq!(lines[1].old_position, 0);
        assert_eq!(lines[1].new_position, 1);
        assert_eq!(lines[0].new_score, 4);
    }

    #[test]
    fn test_judge() {
        // Two players: target is 5
        assert_eq!(judge(&[4, 0]), Verdict::ReachTarget(5));
        assert_eq!(judge(&[5, 4]), Verdict::NeedLead);
        assert_eq!(judge(&[4, 6]), Verdict::Winner(1));
        // Four players: target is 15
        assert_eq!(judge(&[14, 0, 0, 0]), Verdict::ReachTarget(15));
        assert_eq!(judge(&[15, 13, 0, 0]), Verdict::Winner(0));
    }

    #[test]
    fn test_how_to_win_text() {
        assert_eq!(Verdict::ReachTarget(10).how_to_win_text(), "Reach 10 points");
        assert_eq!(Verdict::NeedLead.how_to_win_text(), "Get a 2-point lead");
    }
}
