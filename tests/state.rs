use std::collections::BTreeMap;

use squad_planner::formation::Formation;
use squad_planner::roster::{Player, Position, StrongFoot};
use squad_planner::session::PositionColumn;
use squad_planner::settings::Settings;
use squad_planner::state::{AppState, FormField, FormSubmission, Screen};
use squad_planner::store::Store;

fn player(id: &str, first: &str, position: Position, rating: u8) -> Player {
    Player {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: "Petit".to_string(),
        preferred_position: position,
        strong_foot: StrongFoot::Right,
        overall_rating: rating,
        speed: 2,
        endurance: 2,
        technique: 2,
        heading: 2,
        physical: 2,
        activities: BTreeMap::new(),
        created_at: String::new(),
    }
}

fn roster(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| {
            player(
                &format!("p{i}"),
                &format!("Joueur{i}"),
                Position::ALL[i % 4],
                1 + (i % 3) as u8,
            )
        })
        .collect()
}

#[test]
fn roster_filters_combine() {
    let players = vec![
        player("1", "Hugo", Position::Defender, 3),
        player("2", "Hugues", Position::Attacker, 1),
        player("3", "Lucas", Position::Defender, 1),
    ];
    let mut state = AppState::new(players, Settings::default(), Formation::F442);
    assert_eq!(state.filtered_players().len(), 3);

    for c in "HUG".chars() {
        state.push_search_char(c);
    }
    assert_eq!(state.filtered_players().len(), 2);

    state.cycle_position_filter();
    state.cycle_position_filter();
    assert_eq!(state.position_filter, Some(Position::Defender));
    let ids: Vec<&str> = state.filtered_players().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);

    state.clear_search();
    assert_eq!(state.filtered_players().len(), 2);
    state.cycle_min_rating();
    state.cycle_min_rating();
    assert_eq!(state.min_rating, 3);
    assert_eq!(state.filtered_players().len(), 1);
    state.cycle_min_rating();
    assert_eq!(state.min_rating, 1);
}

#[test]
fn generation_is_refused_below_eleven_present() {
    let mut state = AppState::new(roster(10), Settings::default(), Formation::F442);
    state.mark_all_present();
    assert!(!state.can_generate());
    assert!(!state.generate_teams());
    assert!(state.assignment.is_none());
    let last = state.logs.back().unwrap();
    assert!(last.starts_with("[WARN]"), "{last}");
}

#[test]
fn generation_moves_left_out_players_to_excluded_column() {
    let mut state = AppState::new(roster(18), Settings::default(), Formation::F442);
    state.mark_all_present();
    assert!(state.generate_teams());

    let assignment = state.assignment.as_ref().unwrap();
    assert!(!assignment.is_split());
    assert_eq!(assignment.team_a.starters.len(), 11);
    assert_eq!(assignment.team_a.substitutes.len(), 3);
    let excluded: Vec<String> = assignment.excluded().map(|p| p.id.clone()).collect();
    assert_eq!(excluded.len(), 4);
    assert_eq!(
        state.board.column(PositionColumn::Excluded),
        excluded.as_slice()
    );
    // Still present, only the column changed.
    assert_eq!(state.board.present_count(), 18);
}

#[test]
fn presence_toggle_and_column_move() {
    let mut state = AppState::new(roster(4), Settings::default(), Formation::F442);
    assert_eq!(state.toggle_presence_selected(), Some(true));
    assert_eq!(state.board.column(PositionColumn::Goalkeeper), &["p0".to_string()]);

    state.screen = Screen::Composition;
    assert_eq!(
        state.cycle_selected_player_column(),
        Some(PositionColumn::Defenders)
    );
    assert_eq!(state.board.column_of("p0"), Some(PositionColumn::Defenders));

    let rows = state.column_rows(PositionColumn::Defenders);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].adjusted, rows[0].points - 10);
    assert_eq!(rows[0].penalty, Some("hors poste"));

    state.screen = Screen::Roster;
    assert_eq!(state.toggle_presence_selected(), Some(false));
    assert_eq!(state.board.placed_count(), 0);
}

#[test]
fn formation_warning_flags_quota_mismatch() {
    let mut state = AppState::new(Vec::new(), Settings::default(), Formation::F442);
    assert!(state.formation_warning().is_none());
    state.cycle_formation();
    assert_eq!(state.formation, Formation::F433);
    assert_eq!(
        state.formation_warning().as_deref(),
        Some("quota mismatch: M -1 A +1")
    );
}

#[test]
fn deleted_players_leave_the_session() {
    let mut state = AppState::new(roster(5), Settings::default(), Formation::F442);
    state.mark_all_present();
    let remaining = roster(5).into_iter().skip(1).collect();
    state.set_players(remaining);
    assert_eq!(state.board.present_count(), 4);
    assert!(!state.board.is_present("p0"));
}

#[test]
fn removing_a_composed_player_drops_the_composition() {
    let mut state = AppState::new(roster(14), Settings::default(), Formation::F442);
    state.mark_all_present();
    assert!(state.generate_teams());

    // Same roster again: nothing went missing, the composition stays.
    state.set_players(roster(14));
    assert!(state.assignment.is_some());

    let starter = state.assignment.as_ref().unwrap().team_a.starters[0].id.clone();
    let remaining: Vec<Player> = roster(14).into_iter().filter(|p| p.id != starter).collect();
    state.set_players(remaining);
    assert!(state.assignment.is_none());
    assert!(!state.board.is_present(&starter));
    assert_eq!(
        state.logs.back().map(String::as_str),
        Some("[INFO] Composition cleared: roster changed")
    );
}

#[test]
fn console_keeps_the_last_two_hundred_lines() {
    let mut state = AppState::new(Vec::new(), Settings::default(), Formation::F442);
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 50"));
}

#[test]
fn selection_wraps_around() {
    let mut state = AppState::new(roster(3), Settings::default(), Formation::F442);
    state.select_prev();
    assert_eq!(state.selected, 2);
    state.select_next();
    assert_eq!(state.selected, 0);
}

fn focus(state: &mut AppState, field: &FormField) {
    for _ in 0..state.form_fields().len() {
        if state.form_focused_field().as_ref() == Some(field) {
            return;
        }
        state.form_next_field();
    }
    panic!("{field:?} is not on the form");
}

#[test]
fn player_form_creates_then_edits_through_the_store() {
    let store = Store::open_in_memory().unwrap();
    let settings = store.load_settings().unwrap();
    let mut state = AppState::new(Vec::new(), settings, Formation::F442);

    state.open_create_form();
    // Names are required; the form stays open.
    assert_eq!(state.submit_form(), None);
    assert!(state.form.is_some());
    assert!(state.logs.back().unwrap().starts_with("[WARN]"));

    for c in "Zoé".chars() {
        state.form_type_char(c);
    }
    state.form_next_field();
    for c in "Marim".chars() {
        state.form_type_char(c);
    }
    state.form_backspace();
    state.form_type_char('n');
    focus(&mut state, &FormField::Position);
    state.form_adjust(-1);
    focus(&mut state, &FormField::Rating);
    for _ in 0..4 {
        state.form_adjust(1);
    }
    let defender = FormField::Activity("defenderAccepted".to_string());
    focus(&mut state, &defender);
    state.form_type_char('x');
    state.form_toggle();

    let Some(FormSubmission::Create(draft)) = state.submit_form() else {
        panic!("expected a create submission");
    };
    assert_eq!(draft.first_name, "Zoé");
    assert_eq!(draft.last_name, "Marin");
    assert_eq!(draft.preferred_position, Position::Defender);
    assert_eq!(draft.overall_rating, 3);
    assert_eq!(draft.activities.get("defenderAccepted"), Some(&true));
    let created = store.create_player(draft).unwrap();
    state.cancel_form();
    state.set_players(store.list_players().unwrap());

    assert!(state.open_edit_form());
    assert_eq!(
        state.form.as_ref().and_then(|f| f.editing.as_deref()),
        Some(created.id.as_str())
    );
    focus(&mut state, &FormField::Rating);
    state.form_adjust(-1);
    focus(&mut state, &FormField::Activity("trainingAttendance".to_string()));
    state.form_adjust(1);

    let Some(FormSubmission::Update { id, patch }) = state.submit_form() else {
        panic!("expected an update submission");
    };
    assert_eq!(id, created.id);
    store.update_player(&id, patch).unwrap().unwrap();
    state.cancel_form();
    state.set_players(store.list_players().unwrap());

    let stored = store.get_player(&id).unwrap().unwrap();
    assert_eq!(stored.first_name, "Zoé");
    assert_eq!(stored.overall_rating, 2);
    assert!(stored.is_active("defenderAccepted"));
    assert!(stored.is_active("trainingAttendance"));
    let without = Player {
        activities: BTreeMap::new(),
        ..stored.clone()
    };
    assert_eq!(state.points(&stored), state.points(&without) + 3 + 1);
    assert_eq!(state.points(&state.players[0]), state.points(&stored));
}

#[test]
fn edit_form_needs_a_selected_player() {
    let mut state = AppState::new(Vec::new(), Settings::default(), Formation::F442);
    assert!(!state.open_edit_form());
    assert!(state.form.is_none());

    state.open_create_form();
    let fields = state.form_fields();
    assert_eq!(fields.len(), 10 + state.settings.activities_config.len());
    state.form_prev_field();
    assert_eq!(state.form_focused_field().as_ref(), fields.last());
    state.cancel_form();
    assert!(state.form.is_none());
}
