// Playoff field selection from a standings snapshot.

use std::cmp::Ordering;

use ranker_core::season::{Division, TeamId};
use serde::Serialize;

/// One team's place in the standings, real or simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standing {
    pub team_id: TeamId,
    pub division_id: u32,
    pub wins: u32,
    pub points_for: f64,
}

/// Better record first: more wins, more points for, lower team id.
pub fn standing_order(a: &Standing, b: &Standing) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then(b.points_for.total_cmp(&a.points_for))
        .then(a.team_id.cmp(&b.team_id))
}

/// Positions (into the standings slice) of the teams that make the playoffs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayoffField {
    /// Division winners, best first.
    pub division_winners: Vec<usize>,
    /// Wild cards, best first.
    pub wildcards: Vec<usize>,
}

/// Pick division winners, then fill the remaining `spots` with the best
/// non-winners. Teams outside every listed division only compete for wild
/// cards.
pub fn select_field(standings: &[Standing], divisions: &[Division], spots: usize) -> PlayoffField {
    let mut order: Vec<usize> = (0..standings.len()).collect();
    order.sort_by(|&a, &b| standing_order(&standings[a], &standings[b]));

    let mut division_winners: Vec<usize> = divisions
        .iter()
        .filter_map(|d| {
            order
                .iter()
                .copied()
                .find(|&i| standings[i].division_id == d.id)
        })
        .collect();
    division_winners.sort_by(|&a, &b| standing_order(&standings[a], &standings[b]));
    division_winners.truncate(spots);

    let wildcard_spots = spots.saturating_sub(division_winners.len());
    let wildcards = order
        .iter()
        .copied()
        .filter(|i| !division_winners.contains(i))
        .take(wildcard_spots)
        .collect();

    PlayoffField {
        division_winners,
        wildcards,
    }
}

/// Where each team stands today.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentSeeding {
    pub division_winners: Vec<TeamId>,
    pub wildcards: Vec<TeamId>,
    /// Cannot reach the last wild card's current win total.
    pub eliminated: Vec<TeamId>,
    /// More wins than any rival can still reach.
    pub clinched: Vec<TeamId>,
}

/// Current field plus clinch and elimination status. `remaining[i]` is the
/// number of unplayed regular-season games of `standings[i]`.
pub fn current_seeding(
    standings: &[Standing],
    remaining: &[u32],
    divisions: &[Division],
    spots: usize,
) -> CurrentSeeding {
    let field = select_field(standings, divisions, spots);
    let ids = |positions: &[usize]| -> Vec<TeamId> {
        positions.iter().map(|&i| standings[i].team_id).collect()
    };

    let cutoff = field
        .wildcards
        .last()
        .or(field.division_winners.last())
        .map(|&i| standings[i].wins);

    let mut eliminated = Vec::new();
    let mut clinched = Vec::new();
    for (i, s) in standings.iter().enumerate() {
        let in_field = field.division_winners.contains(&i) || field.wildcards.contains(&i);
        if let Some(cutoff) = cutoff {
            if !in_field && cutoff.saturating_sub(s.wins) > remaining[i] {
                eliminated.push(s.team_id);
            }
        }
        let best_rival = standings
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(j, r)| r.wins + remaining[j])
            .max();
        if spots > 0 && best_rival.map_or(true, |best| s.wins > best) {
            clinched.push(s.team_id);
        }
    }

    CurrentSeeding {
        division_winners: ids(&field.division_winners),
        wildcards: ids(&field.wildcards),
        eliminated,
        clinched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(team_id: TeamId, division_id: u32, wins: u32, points_for: f64) -> Standing {
        Standing {
            team_id,
            division_id,
            wins,
            points_for,
        }
    }

    fn divisions() -> Vec<Division> {
        vec![
            Division {
                id: 1,
                name: "East".into(),
            },
            Division {
                id: 2,
                name: "West".into(),
            },
        ]
    }

    #[test]
    fn division_winners_then_wildcards() {
        let standings = vec![
            standing(1, 1, 8, 1000.0),
            standing(2, 1, 7, 1100.0),
            standing(3, 2, 5, 900.0),
            standing(4, 2, 4, 950.0),
            standing(5, 1, 6, 800.0),
        ];
        let field = select_field(&standings, &divisions(), 4);
        assert_eq!(field.division_winners, vec![0, 2]);
        assert_eq!(field.wildcards, vec![1, 4]);
    }

    #[test]
    fn points_for_breaks_ties() {
        let standings = vec![standing(1, 1, 5, 900.0), standing(2, 1, 5, 950.0)];
        let field = select_field(&standings, &[], 1);
        assert!(field.division_winners.is_empty());
        assert_eq!(field.wildcards, vec![1]);
    }

    #[test]
    fn seeding_flags_clinched_and_eliminated() {
        let standings = vec![
            standing(1, 1, 10, 1000.0),
            standing(2, 2, 6, 900.0),
            standing(3, 1, 5, 800.0),
            standing(4, 2, 2, 700.0),
        ];
        let remaining = vec![2, 2, 2, 2];
        let seeding = current_seeding(&standings, &remaining, &divisions(), 3);

        assert_eq!(seeding.division_winners, vec![1, 2]);
        assert_eq!(seeding.wildcards, vec![3]);
        assert_eq!(seeding.clinched, vec![1]);
        assert_eq!(seeding.eliminated, vec![4]);
    }
}
