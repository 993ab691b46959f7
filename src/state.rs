use std::collections::VecDeque;

use crate::composer::{CompositionMode, MIN_PRESENT, TeamAssignment, compose_teams};
use crate::formation::{Formation, quota_mismatch};
use crate::points::compute_points;
use crate::roster::{
    MAX_LEVEL, MIN_LEVEL, Player, PlayerDraft, PlayerPatch, Position, StrongFoot, validate_draft,
};
use crate::session::{PositionColumn, SessionBoard, adjusted_points, penalty_for};
use crate::settings::Settings;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Roster,
    Composition,
    Settings,
}

impl Screen {
    pub fn next(self) -> Self {
        match self {
            Screen::Roster => Screen::Composition,
            Screen::Composition => Screen::Settings,
            Screen::Settings => Screen::Roster,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Roster => "ROSTER",
            Screen::Composition => "COMPOSITION",
            Screen::Settings => "SETTINGS",
        }
    }
}

/// One line of a composition column, as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub player_id: String,
    pub name: String,
    pub points: i32,
    pub adjusted: i32,
    pub penalty: Option<&'static str>,
}

/// One editable line of the player form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Position,
    Foot,
    Rating,
    Speed,
    Endurance,
    Technique,
    Heading,
    Physical,
    /// Catalog key of an activity checkbox.
    Activity(String),
}

impl FormField {
    const FIXED: [FormField; 10] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Position,
        FormField::Foot,
        FormField::Rating,
        FormField::Speed,
        FormField::Endurance,
        FormField::Technique,
        FormField::Heading,
        FormField::Physical,
    ];

    pub fn label(&self) -> &str {
        match self {
            FormField::FirstName => "Prénom",
            FormField::LastName => "Nom",
            FormField::Position => "Poste",
            FormField::Foot => "Pied fort",
            FormField::Rating => "Note",
            FormField::Speed => "Vitesse",
            FormField::Endurance => "Endurance",
            FormField::Technique => "Technique",
            FormField::Heading => "Jeu de tête",
            FormField::Physical => "Physique",
            FormField::Activity(key) => key.as_str(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FormField::FirstName | FormField::LastName)
    }
}

/// Create/edit form for one player. `editing` holds the id being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerForm {
    pub editing: Option<String>,
    pub draft: PlayerDraft,
    pub focus: usize,
}

impl PlayerForm {
    fn level_mut(&mut self, field: &FormField) -> Option<&mut u8> {
        let draft = &mut self.draft;
        match field {
            FormField::Rating => Some(&mut draft.overall_rating),
            FormField::Speed => Some(&mut draft.speed),
            FormField::Endurance => Some(&mut draft.endurance),
            FormField::Technique => Some(&mut draft.technique),
            FormField::Heading => Some(&mut draft.heading),
            FormField::Physical => Some(&mut draft.physical),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: &FormField) -> Option<&mut String> {
        match field {
            FormField::FirstName => Some(&mut self.draft.first_name),
            FormField::LastName => Some(&mut self.draft.last_name),
            _ => None,
        }
    }
}

/// What the caller has to write to the store once the form validates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Create(PlayerDraft),
    Update { id: String, patch: PlayerPatch },
}

fn step_in<T: Copy + PartialEq>(all: &[T], current: T, step: i8) -> T {
    let len = all.len() as i32;
    let idx = all.iter().position(|v| *v == current).unwrap_or(0) as i32;
    all[(idx + i32::from(step)).rem_euclid(len) as usize]
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub players: Vec<Player>,
    pub settings: Settings,
    pub board: SessionBoard,
    pub formation: Formation,
    pub mode: CompositionMode,
    pub assignment: Option<TeamAssignment>,
    pub search: String,
    pub search_active: bool,
    pub position_filter: Option<Position>,
    pub min_rating: u8,
    pub selected: usize,
    pub column: PositionColumn,
    pub column_selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub form: Option<PlayerForm>,
}

impl AppState {
    pub fn new(players: Vec<Player>, settings: Settings, formation: Formation) -> Self {
        Self {
            screen: Screen::Roster,
            players,
            settings,
            board: SessionBoard::new(),
            formation,
            mode: CompositionMode::Auto,
            assignment: None,
            search: String::new(),
            search_active: false,
            position_filter: None,
            min_rating: MIN_LEVEL,
            selected: 0,
            column: PositionColumn::Goalkeeper,
            column_selected: 0,
            logs: VecDeque::new(),
            help_overlay: false,
            form: None,
        }
    }

    /// Swap in a freshly loaded roster, dropping session entries for players
    /// that disappeared. A composition naming a missing player is discarded.
    pub fn set_players(&mut self, players: Vec<Player>) {
        self.players = players;
        self.board.retain_known(&self.players);
        let stale = self.assignment.as_ref().is_some_and(|assignment| {
            [&assignment.team_a, &assignment.team_b]
                .into_iter()
                .flat_map(|team| {
                    team.starters
                        .iter()
                        .chain(&team.substitutes)
                        .chain(&team.excluded)
                })
                .any(|p| !self.players.iter().any(|known| known.id == p.id))
        });
        if stale {
            self.assignment = None;
            self.push_log("[INFO] Composition cleared: roster changed");
        }
        self.clamp_selection();
    }

    pub fn points(&self, player: &Player) -> i32 {
        compute_points(player, Some(&self.settings))
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    // Roster screen

    pub fn filtered_players(&self) -> Vec<&Player> {
        let query = self.search.trim().to_lowercase();
        self.players
            .iter()
            .filter(|p| query.is_empty() || p.full_name().to_lowercase().contains(&query))
            .filter(|p| {
                self.position_filter
                    .is_none_or(|pos| p.preferred_position == pos)
            })
            .filter(|p| p.overall_rating >= self.min_rating)
            .collect()
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.filtered_players().get(self.selected).copied()
    }

    pub fn cycle_position_filter(&mut self) {
        self.position_filter = match self.position_filter {
            None => Some(Position::Goalkeeper),
            Some(Position::Goalkeeper) => Some(Position::Defender),
            Some(Position::Defender) => Some(Position::Midfielder),
            Some(Position::Midfielder) => Some(Position::Attacker),
            Some(Position::Attacker) => None,
        };
        self.selected = 0;
    }

    pub fn cycle_min_rating(&mut self) {
        self.min_rating = if self.min_rating >= MAX_LEVEL {
            MIN_LEVEL
        } else {
            self.min_rating + 1
        };
        self.selected = 0;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.search_active = false;
        self.selected = 0;
    }

    /// Returns the player's presence afterwards, or None without a selection.
    pub fn toggle_presence_selected(&mut self) -> Option<bool> {
        let player = self.selected_player()?.clone();
        let present = self.board.toggle_presence(&player);
        let verb = if present { "present" } else { "absent" };
        self.push_log(format!("[INFO] {} marked {verb}", player.full_name()));
        Some(present)
    }

    // Player form

    pub fn open_create_form(&mut self) {
        self.form = Some(PlayerForm {
            editing: None,
            draft: PlayerDraft {
                first_name: String::new(),
                last_name: String::new(),
                preferred_position: Position::Midfielder,
                strong_foot: StrongFoot::Right,
                overall_rating: MIN_LEVEL,
                speed: MIN_LEVEL,
                endurance: MIN_LEVEL,
                technique: MIN_LEVEL,
                heading: MIN_LEVEL,
                physical: MIN_LEVEL,
                activities: Default::default(),
            },
            focus: 0,
        });
    }

    /// Returns false without a selected player.
    pub fn open_edit_form(&mut self) -> bool {
        let Some(player) = self.selected_player() else {
            return false;
        };
        let form = PlayerForm {
            editing: Some(player.id.clone()),
            draft: player.to_draft(),
            focus: 0,
        };
        self.form = Some(form);
        true
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Fixed fields, then one checkbox per catalog activity in category order.
    pub fn form_fields(&self) -> Vec<FormField> {
        let activities = self
            .settings
            .activities_config
            .by_category()
            .into_iter()
            .flat_map(|(_, rules)| rules.into_iter().map(|(key, _)| key.to_string()))
            .map(FormField::Activity);
        FormField::FIXED.into_iter().chain(activities).collect()
    }

    pub fn form_focused_field(&self) -> Option<FormField> {
        let form = self.form.as_ref()?;
        self.form_fields().get(form.focus).cloned()
    }

    pub fn form_next_field(&mut self) {
        let total = self.form_fields().len();
        if let Some(form) = self.form.as_mut() {
            form.focus = (form.focus + 1) % total;
        }
    }

    pub fn form_prev_field(&mut self) {
        let total = self.form_fields().len();
        if let Some(form) = self.form.as_mut() {
            form.focus = if form.focus == 0 { total - 1 } else { form.focus - 1 };
        }
    }

    /// Types into the focused name field. Other fields ignore the key.
    pub fn form_type_char(&mut self, c: char) {
        let Some(field) = self.form_focused_field() else {
            return;
        };
        if let Some(text) = self.form.as_mut().and_then(|form| form.text_mut(&field)) {
            text.push(c);
        }
    }

    pub fn form_backspace(&mut self) {
        let Some(field) = self.form_focused_field() else {
            return;
        };
        if let Some(text) = self.form.as_mut().and_then(|form| form.text_mut(&field)) {
            text.pop();
        }
    }

    /// Left/right on the focused field: cycles position and foot, moves a
    /// level within 1..=3, flips an activity.
    pub fn form_adjust(&mut self, step: i8) {
        let Some(field) = self.form_focused_field() else {
            return;
        };
        if matches!(field, FormField::Activity(_)) {
            self.form_toggle();
            return;
        }
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match field {
            FormField::Position => {
                form.draft.preferred_position =
                    step_in(&Position::ALL, form.draft.preferred_position, step);
            }
            FormField::Foot => {
                form.draft.strong_foot = step_in(&StrongFoot::ALL, form.draft.strong_foot, step);
            }
            _ => {
                if let Some(level) = form.level_mut(&field) {
                    let next = (*level as i8 + step).clamp(MIN_LEVEL as i8, MAX_LEVEL as i8);
                    *level = next as u8;
                }
            }
        }
    }

    /// Flips the focused activity checkbox.
    pub fn form_toggle(&mut self) {
        let Some(FormField::Activity(key)) = self.form_focused_field() else {
            return;
        };
        if let Some(form) = self.form.as_mut() {
            let flag = form.draft.activities.entry(key).or_insert(false);
            *flag = !*flag;
        }
    }

    /// Validates the form. On failure the reason lands in the console and
    /// the form stays open.
    pub fn submit_form(&mut self) -> Option<FormSubmission> {
        let form = self.form.as_ref()?;
        if let Err(err) = validate_draft(&form.draft) {
            self.push_log(format!("[WARN] {err}"));
            return None;
        }
        let draft = form.draft.clone();
        Some(match form.editing.clone() {
            None => FormSubmission::Create(draft),
            Some(id) => FormSubmission::Update {
                id,
                patch: PlayerPatch {
                    first_name: Some(draft.first_name),
                    last_name: Some(draft.last_name),
                    preferred_position: Some(draft.preferred_position),
                    strong_foot: Some(draft.strong_foot),
                    overall_rating: Some(draft.overall_rating),
                    speed: Some(draft.speed),
                    endurance: Some(draft.endurance),
                    technique: Some(draft.technique),
                    heading: Some(draft.heading),
                    physical: Some(draft.physical),
                    activities: Some(draft.activities),
                },
            },
        })
    }

    // Composition screen

    pub fn column_rows(&self, column: PositionColumn) -> Vec<ColumnRow> {
        self.board
            .column_players(column, &self.players)
            .into_iter()
            .map(|p| ColumnRow {
                player_id: p.id.clone(),
                name: p.full_name(),
                points: self.points(p),
                adjusted: adjusted_points(p, column, Some(&self.settings)),
                penalty: penalty_for(p, column).map(|pen| pen.label()),
            })
            .collect()
    }

    pub fn selected_column_player(&self) -> Option<&Player> {
        let id = self.board.column(self.column).get(self.column_selected)?;
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn focus_next_column(&mut self) {
        self.column = self.column.next();
        self.column_selected = 0;
    }

    pub fn focus_prev_column(&mut self) {
        // Four steps forward is one step back on a five-column ring.
        for _ in 0..PositionColumn::ALL.len() - 1 {
            self.column = self.column.next();
        }
        self.column_selected = 0;
    }

    /// `m`: send the highlighted player to the next column.
    pub fn cycle_selected_player_column(&mut self) -> Option<PositionColumn> {
        let id = self.board.column(self.column).get(self.column_selected)?.clone();
        let target = self.column.next();
        if !self.board.move_to(&id, target) {
            return None;
        }
        let name = self
            .players
            .iter()
            .find(|p| p.id == id)
            .map(Player::full_name)
            .unwrap_or(id);
        self.push_log(format!("[INFO] {name} moved to {}", target.label()));
        self.clamp_selection();
        Some(target)
    }

    pub fn can_generate(&self) -> bool {
        self.board.present_count() >= MIN_PRESENT
    }

    /// Run the composer on the present players. Failures land in the console.
    pub fn generate_teams(&mut self) -> bool {
        let result = compose_teams(
            &self.players,
            self.board.present_ids(),
            Some(&self.settings),
            self.mode,
        );
        match result {
            Ok(assignment) => {
                self.board.absorb_excluded(&assignment);
                let msg = if assignment.is_split() {
                    format!(
                        "[INFO] Two teams generated: A {} pts, B {} pts",
                        assignment.team_a.total_points(Some(&self.settings)),
                        assignment.team_b.total_points(Some(&self.settings))
                    )
                } else {
                    format!(
                        "[INFO] Team generated: {} starters, {} subs",
                        assignment.team_a.starters.len(),
                        assignment.team_a.substitutes.len()
                    )
                };
                self.push_log(msg);
                self.assignment = Some(assignment);
                self.clamp_selection();
                true
            }
            Err(err) => {
                self.push_log(format!("[WARN] {err}"));
                false
            }
        }
    }

    pub fn mark_all_present(&mut self) {
        self.board.mark_all_present(&self.players);
        self.assignment = None;
        self.push_log(format!(
            "[INFO] {} players marked present",
            self.board.present_count()
        ));
    }

    pub fn clear_session(&mut self) {
        self.board.clear();
        self.assignment = None;
        self.column_selected = 0;
        self.push_log("[INFO] Session cleared");
    }

    pub fn cycle_formation(&mut self) {
        self.formation = self.formation.next();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CompositionMode::Auto => CompositionMode::SingleTeam,
            CompositionMode::SingleTeam => CompositionMode::Auto,
        };
    }

    /// Header note when the display formation does not match the 1-4-4-2
    /// selection quota.
    pub fn formation_warning(&self) -> Option<String> {
        let diffs = quota_mismatch(self.formation);
        if diffs.is_empty() {
            return None;
        }
        let parts: Vec<String> = diffs
            .iter()
            .map(|(pos, diff)| format!("{} {diff:+}", pos.short()))
            .collect();
        Some(format!("quota mismatch: {}", parts.join(" ")))
    }

    // Navigation

    pub fn select_next(&mut self) {
        let (cursor, total) = self.cursor();
        if total == 0 {
            *cursor = 0;
            return;
        }
        *cursor = (*cursor + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let (cursor, total) = self.cursor();
        if total == 0 {
            *cursor = 0;
            return;
        }
        if *cursor == 0 {
            *cursor = total - 1;
        } else {
            *cursor -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_players().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
        let total = self.board.column(self.column).len();
        if total == 0 {
            self.column_selected = 0;
        } else if self.column_selected >= total {
            self.column_selected = total - 1;
        }
    }

    fn cursor(&mut self) -> (&mut usize, usize) {
        match self.screen {
            Screen::Composition => {
                let total = self.board.column(self.column).len();
                (&mut self.column_selected, total)
            }
            Screen::Roster | Screen::Settings => {
                let total = self.filtered_players().len();
                (&mut self.selected, total)
            }
        }
    }
}
