use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::roster::{MAX_LEVEL, MIN_LEVEL, PlayerDraft, Position, StrongFoot};
use crate::settings::default_catalog;

const FIRST_NAMES: &[&str] = &[
    "Hugo", "Lucas", "Nathan", "Enzo", "Louis", "Gabriel", "Jules", "Adam", "Arthur", "Raphaël",
    "Mathis", "Tom", "Théo", "Noah", "Sacha", "Maël", "Yanis", "Rayan", "Ethan", "Paul",
];

const LAST_NAMES: &[&str] = &[
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
    "Moreau", "Simon", "Laurent", "Lefebvre", "Michel", "Garcia", "David", "Bertrand", "Roux",
    "Vincent", "Fournier",
];

// Roughly one keeper in ten, defenders and midfielders dominant.
const POSITION_WEIGHTS: [(Position, u32); 4] = [
    (Position::Goalkeeper, 10),
    (Position::Defender, 35),
    (Position::Midfielder, 35),
    (Position::Attacker, 20),
];

const ACTIVITY_CHANCE: f64 = 0.15;

pub fn generate_roster<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<PlayerDraft> {
    (0..count).map(|_| generate_player(rng)).collect()
}

pub fn generate_player<R: Rng + ?Sized>(rng: &mut R) -> PlayerDraft {
    let catalog = default_catalog();
    let mut activities = BTreeMap::new();
    for key in catalog.keys() {
        if rng.gen_bool(ACTIVITY_CHANCE) {
            activities.insert(key.to_string(), true);
        }
    }

    PlayerDraft {
        first_name: pick(rng, FIRST_NAMES).to_string(),
        last_name: pick(rng, LAST_NAMES).to_string(),
        preferred_position: pick_position(rng),
        strong_foot: *StrongFoot::ALL.choose(rng).unwrap_or(&StrongFoot::Right),
        overall_rating: level(rng),
        speed: level(rng),
        endurance: level(rng),
        technique: level(rng),
        heading: level(rng),
        physical: level(rng),
        activities,
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or("Joueur")
}

fn pick_position<R: Rng + ?Sized>(rng: &mut R) -> Position {
    let total: u32 = POSITION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (position, weight) in POSITION_WEIGHTS {
        if roll < weight {
            return position;
        }
        roll -= weight;
    }
    Position::Midfielder
}

fn level<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(MIN_LEVEL..=MAX_LEVEL)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::roster::validate_draft;

    #[test]
    fn generated_players_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        let roster = generate_roster(&mut rng, 200);
        assert_eq!(roster.len(), 200);
        assert!(roster.iter().all(|d| validate_draft(d).is_ok()));
        assert!(
            roster
                .iter()
                .any(|d| d.preferred_position == Position::Goalkeeper)
        );
    }

    #[test]
    fn same_seed_same_roster() {
        let a = generate_roster(&mut StdRng::seed_from_u64(42), 30);
        let b = generate_roster(&mut StdRng::seed_from_u64(42), 30);
        assert_eq!(a, b);
    }
}
