use crate::composer::POSITION_QUOTAS;
use crate::roster::Position::{Attacker as AT, Defender as DF, Goalkeeper as GK, Midfielder as MF};
use crate::roster::{Player, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub x: u8,
    pub y: u8,
    pub position: Position,
}

const fn slot(x: u8, y: u8, position: Position) -> Slot {
    Slot { x, y, position }
}

const F_442: [Slot; 11] = [
    slot(50, 10, GK),
    slot(20, 25, DF),
    slot(40, 25, DF),
    slot(60, 25, DF),
    slot(80, 25, DF),
    slot(20, 50, MF),
    slot(40, 50, MF),
    slot(60, 50, MF),
    slot(80, 50, MF),
    slot(35, 75, AT),
    slot(65, 75, AT),
];

const F_433: [Slot; 11] = [
    slot(50, 10, GK),
    slot(20, 25, DF),
    slot(40, 25, DF),
    slot(60, 25, DF),
    slot(80, 25, DF),
    slot(30, 50, MF),
    slot(50, 50, MF),
    slot(70, 50, MF),
    slot(25, 75, AT),
    slot(50, 75, AT),
    slot(75, 75, AT),
];

const F_352: [Slot; 11] = [
    slot(50, 10, GK),
    slot(30, 25, DF),
    slot(50, 25, DF),
    slot(70, 25, DF),
    slot(15, 50, MF),
    slot(35, 50, MF),
    slot(50, 50, MF),
    slot(65, 50, MF),
    slot(85, 50, MF),
    slot(40, 75, AT),
    slot(60, 75, AT),
];

const F_451: [Slot; 11] = [
    slot(50, 10, GK),
    slot(20, 25, DF),
    slot(40, 25, DF),
    slot(60, 25, DF),
    slot(80, 25, DF),
    slot(15, 50, MF),
    slot(30, 50, MF),
    slot(50, 50, MF),
    slot(70, 50, MF),
    slot(85, 50, MF),
    slot(50, 75, AT),
];

/// Display layouts. Selection always uses the fixed quota in
/// [`POSITION_QUOTAS`]; a formation only decides where starters are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formation {
    #[default]
    F442,
    F433,
    F352,
    F451,
}

impl Formation {
    pub const ALL: [Formation; 4] = [
        Formation::F442,
        Formation::F433,
        Formation::F352,
        Formation::F451,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Formation::F442 => "4-4-2",
            Formation::F433 => "4-3-3",
            Formation::F352 => "3-5-2",
            Formation::F451 => "4-5-1",
        }
    }

    /// Unknown names fall back to 4-4-2.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name() == raw)
            .unwrap_or_default()
    }

    pub fn slots(self) -> &'static [Slot; 11] {
        match self {
            Formation::F442 => &F_442,
            Formation::F433 => &F_433,
            Formation::F352 => &F_352,
            Formation::F451 => &F_451,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Formation::F442 => Formation::F433,
            Formation::F433 => Formation::F352,
            Formation::F352 => Formation::F451,
            Formation::F451 => Formation::F442,
        }
    }

    pub fn count(self, position: Position) -> usize {
        self.slots().iter().filter(|s| s.position == position).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlacedSlot<'a> {
    pub index: usize,
    pub slot: Slot,
    pub player: Option<&'a Player>,
}

/// Slot `i` gets `starters[i]`, whatever the player's preferred position.
pub fn place_starters(formation: Formation, starters: &[Player]) -> Vec<PlacedSlot<'_>> {
    formation
        .slots()
        .iter()
        .enumerate()
        .map(|(index, slot)| PlacedSlot {
            index,
            slot: *slot,
            player: starters.get(index),
        })
        .collect()
}

/// Per-position `formation slots - selection quota`, non-zero entries only.
pub fn quota_mismatch(formation: Formation) -> Vec<(Position, i32)> {
    POSITION_QUOTAS
        .iter()
        .filter_map(|(position, quota)| {
            let diff = formation.count(*position) as i32 - *quota as i32;
            (diff != 0).then_some((*position, diff))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_formation_has_one_keeper_and_eleven_slots() {
        for f in Formation::ALL {
            assert_eq!(f.slots().len(), 11);
            assert_eq!(f.count(Position::Goalkeeper), 1);
            assert_eq!(f.slots()[0].position, Position::Goalkeeper);
        }
    }

    #[test]
    fn parse_falls_back_to_442() {
        assert_eq!(Formation::parse("3-5-2"), Formation::F352);
        assert_eq!(Formation::parse(" 4-3-3 "), Formation::F433);
        assert_eq!(Formation::parse("5-3-2"), Formation::F442);
    }

    #[test]
    fn mismatch_is_reported_against_the_quota() {
        assert!(quota_mismatch(Formation::F442).is_empty());
        assert_eq!(
            quota_mismatch(Formation::F433),
            vec![(Position::Midfielder, -1), (Position::Attacker, 1)]
        );
        assert_eq!(
            quota_mismatch(Formation::F352),
            vec![(Position::Defender, -1), (Position::Midfielder, 1)]
        );
    }

    #[test]
    fn cycling_visits_every_formation() {
        let mut f = Formation::default();
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, Formation::F442);
    }
}
