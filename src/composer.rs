use std::collections::HashSet;

use serde::Serialize;

use crate::points::compute_points;
use crate::roster::{Player, Position};
use crate::settings::Settings;

pub const MIN_PRESENT: usize = 11;
pub const TWO_TEAM_THRESHOLD: usize = 20;
pub const TEAM_SIZE: usize = 11;
pub const MAX_SUBSTITUTES: usize = 3;

/// Selection quota, filled in this order. It does not follow the display
/// formation.
pub const POSITION_QUOTAS: [(Position, usize); 4] = [
    (Position::Goalkeeper, 1),
    (Position::Defender, 4),
    (Position::Midfielder, 4),
    (Position::Attacker, 2),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("not enough present players: {present} present, {required} required")]
    InsufficientPlayers { present: usize, required: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionMode {
    /// Two teams from 20 present players upward, one team below.
    #[default]
    Auto,
    /// Always a single team, whatever the head count.
    SingleTeam,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamSheet {
    pub starters: Vec<Player>,
    pub substitutes: Vec<Player>,
    pub excluded: Vec<Player>,
}

impl TeamSheet {
    pub fn is_empty(&self) -> bool {
        self.starters.is_empty() && self.substitutes.is_empty()
    }

    pub fn total_points(&self, settings: Option<&Settings>) -> i32 {
        self.starters
            .iter()
            .map(|p| compute_points(p, settings))
            .sum()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.starters
            .iter()
            .chain(self.substitutes.iter())
            .any(|p| p.id == player_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamAssignment {
    pub team_a: TeamSheet,
    pub team_b: TeamSheet,
}

impl TeamAssignment {
    pub fn is_split(&self) -> bool {
        !self.team_b.starters.is_empty()
    }

    pub fn excluded(&self) -> impl Iterator<Item = &Player> {
        self.team_a.excluded.iter().chain(self.team_b.excluded.iter())
    }
}

#[derive(Debug, Clone, Copy)]
struct Ranked<'a> {
    player: &'a Player,
    points: i32,
}

/// Compose one or two teams from the present players of `players`.
///
/// `present_ids` order is kept as the pool order (it drives tie-breaks);
/// ids missing from `players` and repeated ids are ignored.
pub fn compose_teams(
    players: &[Player],
    present_ids: &[String],
    settings: Option<&Settings>,
    mode: CompositionMode,
) -> Result<TeamAssignment, CompositionError> {
    let mut seen = HashSet::new();
    let present: Vec<Ranked<'_>> = present_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| players.iter().find(|p| &p.id == id))
        .map(|player| Ranked {
            player,
            points: compute_points(player, settings),
        })
        .collect();

    if present.len() < MIN_PRESENT {
        log::warn!(
            "team generation refused: {} present, {} required",
            present.len(),
            MIN_PRESENT
        );
        return Err(CompositionError::InsufficientPlayers {
            present: present.len(),
            required: MIN_PRESENT,
        });
    }

    if mode == CompositionMode::Auto && present.len() >= TWO_TEAM_THRESHOLD {
        let mut sorted = present;
        sorted.sort_by(|a, b| b.points.cmp(&a.points));
        let (pool_a, pool_b): (Vec<_>, Vec<_>) = sorted
            .into_iter()
            .enumerate()
            .partition(|(rank, _)| rank % 2 == 0);
        let pool_a = pool_a.into_iter().map(|(_, r)| r).collect();
        let pool_b = pool_b.into_iter().map(|(_, r)| r).collect();

        let assignment = TeamAssignment {
            team_a: fill_team(pool_a),
            team_b: fill_team(pool_b),
        };
        log::debug!(
            "composed two teams: A {} starters / {} subs, B {} starters / {} subs",
            assignment.team_a.starters.len(),
            assignment.team_a.substitutes.len(),
            assignment.team_b.starters.len(),
            assignment.team_b.substitutes.len()
        );
        return Ok(assignment);
    }

    let team_a = fill_team(present);
    log::debug!(
        "composed one team: {} starters / {} subs / {} excluded",
        team_a.starters.len(),
        team_a.substitutes.len(),
        team_a.excluded.len()
    );
    Ok(TeamAssignment {
        team_a,
        team_b: TeamSheet::default(),
    })
}

/// Pick starters by position quota, top up with the best remaining players,
/// then take substitutes in pool order.
pub fn create_optimal_team(pool: &[Player], settings: Option<&Settings>) -> TeamSheet {
    fill_team(
        pool.iter()
            .map(|player| Ranked {
                player,
                points: compute_points(player, settings),
            })
            .collect(),
    )
}

fn fill_team(mut remaining: Vec<Ranked<'_>>) -> TeamSheet {
    let mut starters: Vec<Ranked<'_>> = Vec::with_capacity(TEAM_SIZE);

    for (position, quota) in POSITION_QUOTAS {
        let mut candidates: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, r)| r.player.preferred_position == position)
            .map(|(idx, _)| idx)
            .collect();
        // Stable: equal points keep pool order.
        candidates.sort_by(|a, b| remaining[*b].points.cmp(&remaining[*a].points));
        candidates.truncate(quota);

        starters.extend(candidates.iter().map(|idx| remaining[*idx]));
        let taken: HashSet<usize> = candidates.into_iter().collect();
        remaining = remaining
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !taken.contains(idx))
            .map(|(_, r)| r)
            .collect();
    }

    while starters.len() < TEAM_SIZE && !remaining.is_empty() {
        let mut best = 0;
        for (idx, candidate) in remaining.iter().enumerate().skip(1) {
            if candidate.points > remaining[best].points {
                best = idx;
            }
        }
        starters.push(remaining.remove(best));
    }

    let split = remaining.len().min(MAX_SUBSTITUTES);
    let excluded = remaining.split_off(split);

    TeamSheet {
        starters: starters.into_iter().map(|r| r.player.clone()).collect(),
        substitutes: remaining.into_iter().map(|r| r.player.clone()).collect(),
        excluded: excluded.into_iter().map(|r| r.player.clone()).collect(),
    }
}
