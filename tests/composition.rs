use std::collections::BTreeMap;

use squad_planner::composer::{CompositionError, CompositionMode, compose_teams};
use squad_planner::points::compute_points;
use squad_planner::roster::{Player, Position, StrongFoot};
use squad_planner::settings::Settings;

fn player(id: &str, position: Position, rating: u8, skill: u8) -> Player {
    Player {
        id: id.to_string(),
        first_name: id.to_string(),
        last_name: "Test".to_string(),
        preferred_position: position,
        strong_foot: StrongFoot::Right,
        overall_rating: rating,
        speed: skill,
        endurance: skill,
        technique: skill,
        heading: skill,
        physical: skill,
        activities: BTreeMap::new(),
        created_at: String::new(),
    }
}

/// 1 GK, 4 DF, 4 MF, 2 AT with varied strength.
fn eleven() -> Vec<Player> {
    let mut players = vec![player("gk", Position::Goalkeeper, 2, 2)];
    for i in 0..4 {
        players.push(player(&format!("df{i}"), Position::Defender, 1 + (i % 3) as u8, 2));
        players.push(player(&format!("mf{i}"), Position::Midfielder, 1 + ((i + 1) % 3) as u8, 1));
    }
    players.push(player("at0", Position::Attacker, 3, 3));
    players.push(player("at1", Position::Attacker, 1, 2));
    players
}

fn ids(players: &[Player]) -> Vec<String> {
    players.iter().map(|p| p.id.clone()).collect()
}

#[test]
fn ten_present_is_refused() {
    let players = eleven();
    let present = ids(&players[..10]);
    let err = compose_teams(&players, &present, None, CompositionMode::Auto).unwrap_err();
    assert_eq!(
        err,
        CompositionError::InsufficientPlayers {
            present: 10,
            required: 11
        }
    );
    assert_eq!(
        err.to_string(),
        "not enough present players: 10 present, 11 required"
    );
}

#[test]
fn exactly_eleven_makes_one_full_team() {
    let players = eleven();
    let out = compose_teams(&players, &ids(&players), None, CompositionMode::Auto).unwrap();
    assert_eq!(out.team_a.starters.len(), 11);
    assert!(out.team_a.substitutes.is_empty());
    assert!(out.team_a.excluded.is_empty());
    assert!(out.team_b.starters.is_empty());
    assert!(!out.is_split());
    assert_eq!(out.team_a.starters[0].id, "gk");
}

#[test]
fn absent_players_are_never_selected() {
    let mut players = eleven();
    players.push(player("star", Position::Attacker, 3, 3));
    let out = compose_teams(&players, &ids(&players[..11]), None, CompositionMode::Auto).unwrap();
    assert!(!out.team_a.contains("star"));
}

#[test]
fn twenty_two_present_split_into_two_balanced_teams() {
    let positions = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Defender,
        Position::Midfielder,
        Position::Midfielder,
        Position::Attacker,
    ];
    let players: Vec<Player> = (0..22)
        .map(|i| {
            player(
                &format!("p{i:02}"),
                positions[i % positions.len()],
                1 + (i % 3) as u8,
                1 + ((i / 3) % 3) as u8,
            )
        })
        .collect();
    let settings = Settings::default();
    let out = compose_teams(&players, &ids(&players), Some(&settings), CompositionMode::Auto)
        .unwrap();

    assert!(out.is_split());
    let a = &out.team_a;
    let b = &out.team_b;
    let total = a.starters.len()
        + a.substitutes.len()
        + a.excluded.len()
        + b.starters.len()
        + b.substitutes.len()
        + b.excluded.len();
    assert_eq!(total, 22);
    assert_eq!(a.starters.len(), 11);
    assert_eq!(b.starters.len(), 11);

    let mut scores: Vec<i32> = players
        .iter()
        .map(|p| compute_points(p, Some(&settings)))
        .collect();
    scores.sort_unstable_by(|x, y| y.cmp(x));
    let skew = a.total_points(Some(&settings)) - b.total_points(Some(&settings));
    // Team A takes the first pick of every pair.
    assert!(skew >= 0);
    assert!(skew <= scores[0] - scores[21]);
}

#[test]
fn twenty_present_is_enough_to_split() {
    let players: Vec<Player> = (0..20)
        .map(|i| player(&format!("p{i}"), Position::ALL[i % 4], 2, 2))
        .collect();
    let out = compose_teams(&players, &ids(&players), None, CompositionMode::Auto).unwrap();
    assert!(out.is_split());
    assert_eq!(out.team_a.starters.len(), 10);
    assert_eq!(out.team_b.starters.len(), 10);

    let out = compose_teams(&players, &ids(&players[..19]), None, CompositionMode::Auto).unwrap();
    assert!(!out.is_split());
    assert_eq!(out.team_a.starters.len(), 11);
    assert_eq!(out.team_a.substitutes.len(), 3);
    assert_eq!(out.team_a.excluded.len(), 5);
}

#[test]
fn midfielder_tie_goes_to_the_earlier_pool_entry() {
    let mut players = vec![player("gk", Position::Goalkeeper, 1, 1)];
    for i in 0..4 {
        players.push(player(&format!("df{i}"), Position::Defender, 1, 1));
    }
    for i in 0..3 {
        players.push(player(&format!("mf{i}"), Position::Midfielder, 3, 3));
    }
    players.push(player("tie_a", Position::Midfielder, 2, 1));
    players.push(player("tie_b", Position::Midfielder, 2, 1));
    players.push(player("at0", Position::Attacker, 1, 1));
    players.push(player("at1", Position::Attacker, 1, 1));

    let present = ids(&players);
    let out = compose_teams(&players, &present, None, CompositionMode::Auto).unwrap();
    assert!(out.team_a.starters.iter().any(|p| p.id == "tie_a"));
    assert_eq!(out.team_a.substitutes[0].id, "tie_b");

    // Swapping the pool order swaps the pick.
    let mut reversed = present.clone();
    let a = reversed.iter().position(|id| id == "tie_a").unwrap();
    let b = reversed.iter().position(|id| id == "tie_b").unwrap();
    reversed.swap(a, b);
    let out = compose_teams(&players, &reversed, None, CompositionMode::Auto).unwrap();
    assert!(out.team_a.starters.iter().any(|p| p.id == "tie_b"));
    assert_eq!(out.team_a.substitutes[0].id, "tie_a");
}

#[test]
fn missing_goalkeeper_slot_is_filled_by_best_remaining() {
    let mut players = Vec::new();
    for i in 0..6 {
        players.push(player(&format!("df{i}"), Position::Defender, 1, 1));
    }
    for i in 0..5 {
        players.push(player(&format!("mf{i}"), Position::Midfielder, 1, 1));
    }
    players.push(player("at0", Position::Attacker, 3, 3));
    let out = compose_teams(&players, &ids(&players), None, CompositionMode::Auto).unwrap();
    assert_eq!(out.team_a.starters.len(), 11);
    assert!(
        out.team_a
            .starters
            .iter()
            .all(|p| p.preferred_position != Position::Goalkeeper)
    );
    assert_eq!(out.team_a.substitutes.len(), 1);
}

#[test]
fn same_inputs_compose_the_same_teams() {
    let players: Vec<Player> = (0..24)
        .map(|i| {
            player(
                &format!("p{i:02}"),
                Position::ALL[i % 4],
                1 + (i % 3) as u8,
                1 + ((i / 4) % 3) as u8,
            )
        })
        .collect();
    let present = ids(&players);
    let settings = Settings::default();

    for mode in [CompositionMode::Auto, CompositionMode::SingleTeam] {
        let first = compose_teams(&players, &present, Some(&settings), mode).unwrap();
        let second = compose_teams(&players, &present, Some(&settings), mode).unwrap();
        assert_eq!(first, second);
    }
    let short = &present[..12];
    assert_eq!(
        compose_teams(&players, short, None, CompositionMode::Auto),
        compose_teams(&players, short, None, CompositionMode::Auto)
    );
}
