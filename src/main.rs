use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use env_logger::{Env, Target};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use squad_planner::composer::CompositionMode;
use squad_planner::config::{AppConfig, load_dotenv, parse_db_path_arg};
use squad_planner::export::{export_assignment, export_roster};
use squad_planner::formation::place_starters;
use squad_planner::points::activity_delta;
use squad_planner::roster::{MAX_LEVEL, MIN_LEVEL, PlayerPatch};
use squad_planner::session::PositionColumn;
use squad_planner::state::{AppState, FormField, FormSubmission, Screen};
use squad_planner::store::{Store, open_store};

struct App {
    state: AppState,
    store: Store,
    export_dir: PathBuf,
    should_quit: bool,
}

impl App {
    fn new(store: Store, config: &AppConfig) -> anyhow::Result<Self> {
        let settings = store.load_settings()?;
        let players = store.list_players()?;
        let mut state = AppState::new(players, settings, config.formation);
        state.push_log(format!(
            "[INFO] {} players loaded from {}",
            state.players.len(),
            config.db_path.display()
        ));
        Ok(Self {
            state,
            store,
            export_dir: config.export_dir.clone(),
            should_quit: false,
        })
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.form.is_some() {
            self.on_form_key(key);
            return;
        }
        if self.state.search_active {
            match key.code {
                KeyCode::Esc => self.state.clear_search(),
                KeyCode::Enter => self.state.search_active = false,
                KeyCode::Backspace => self.state.pop_search_char(),
                KeyCode::Char(c) => self.state.push_search_char(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Roster,
            KeyCode::Char('2') => self.state.screen = Screen::Composition,
            KeyCode::Char('3') => self.state.screen = Screen::Settings,
            KeyCode::Tab => self.state.screen = self.state.screen.next(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => match self.state.screen {
                Screen::Roster => self.on_roster_key(key),
                Screen::Composition => self.on_composition_key(key),
                Screen::Settings => {}
            },
        }
    }

    fn on_roster_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Esc => self.state.clear_search(),
            KeyCode::Char('o') => self.state.cycle_position_filter(),
            KeyCode::Char('r') => self.state.cycle_min_rating(),
            KeyCode::Char('p') | KeyCode::Char(' ') => {
                self.state.toggle_presence_selected();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_rating(1),
            KeyCode::Char('-') => self.adjust_rating(-1),
            KeyCode::Char('D') => self.delete_selected(),
            KeyCode::Char('x') => self.export_roster(),
            KeyCode::Char('n') => self.state.open_create_form(),
            KeyCode::Char('e') => {
                self.state.open_edit_form();
            }
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.cancel_form(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => self.state.form_next_field(),
            KeyCode::BackTab | KeyCode::Up => self.state.form_prev_field(),
            KeyCode::Left => self.state.form_adjust(-1),
            KeyCode::Right => self.state.form_adjust(1),
            KeyCode::Backspace => self.state.form_backspace(),
            KeyCode::Char(' ') if !self.form_on_text() => self.state.form_toggle(),
            KeyCode::Char(c) => self.state.form_type_char(c),
            _ => {}
        }
    }

    fn form_on_text(&self) -> bool {
        self.state
            .form_focused_field()
            .is_some_and(|field| field.is_text())
    }

    fn submit_form(&mut self) {
        let Some(submission) = self.state.submit_form() else {
            return;
        };
        let saved = match submission {
            FormSubmission::Create(draft) => self.store.create_player(draft).map(Some),
            FormSubmission::Update { id, patch } => self.store.update_player(&id, patch),
        };
        match saved {
            Ok(Some(player)) => {
                self.state.cancel_form();
                self.state
                    .push_log(format!("[INFO] {} saved", player.full_name()));
                self.reload_players();
            }
            Ok(None) => {
                self.state.cancel_form();
                self.state.push_log("[WARN] Player no longer exists");
                self.reload_players();
            }
            Err(err) => self.report_error("Save failed", &err),
        }
    }

    fn on_composition_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('l') | KeyCode::Right => self.state.focus_next_column(),
            KeyCode::Char('h') | KeyCode::Left => self.state.focus_prev_column(),
            KeyCode::Char('m') => {
                self.state.cycle_selected_player_column();
            }
            KeyCode::Char('f') => self.state.cycle_formation(),
            KeyCode::Char('t') => self.state.toggle_mode(),
            KeyCode::Char('g') => {
                if !self.state.can_generate() {
                    self.state.push_log(format!(
                        "[WARN] {} present, at least 11 needed to generate",
                        self.state.board.present_count()
                    ));
                    return;
                }
                self.state.generate_teams();
            }
            KeyCode::Char('a') => self.state.mark_all_present(),
            KeyCode::Char('c') => self.state.clear_session(),
            KeyCode::Char('s') => self.save_team(),
            KeyCode::Char('e') => self.export_composition(),
            _ => {}
        }
    }

    fn adjust_rating(&mut self, step: i8) {
        let Some(player) = self.state.selected_player() else {
            return;
        };
        let next = player.overall_rating as i8 + step;
        if next < MIN_LEVEL as i8 || next > MAX_LEVEL as i8 {
            return;
        }
        let id = player.id.clone();
        let patch = PlayerPatch {
            overall_rating: Some(next as u8),
            ..PlayerPatch::default()
        };
        match self.store.update_player(&id, patch) {
            Ok(Some(updated)) => {
                self.state.push_log(format!(
                    "[INFO] {} rating set to {}",
                    updated.full_name(),
                    updated.overall_rating
                ));
                self.reload_players();
            }
            Ok(None) => self.state.push_log("[WARN] Player no longer exists"),
            Err(err) => self.report_error("Rating update failed", &err),
        }
    }

    fn delete_selected(&mut self) {
        let Some(player) = self.state.selected_player() else {
            return;
        };
        let (id, name) = (player.id.clone(), player.full_name());
        match self.store.delete_player(&id) {
            Ok(true) => {
                self.state.push_log(format!("[INFO] {name} deleted"));
                self.reload_players();
            }
            Ok(false) => self.state.push_log("[WARN] Player no longer exists"),
            Err(err) => self.report_error("Delete failed", &err),
        }
    }

    fn save_team(&mut self) {
        let Some(assignment) = &self.state.assignment else {
            self.state.push_log("[INFO] Generate teams before saving");
            return;
        };
        let name = format!("Équipe {}", Local::now().format("%Y-%m-%d %H:%M"));
        match self
            .store
            .save_assignment(&name, self.state.formation, &assignment.team_a)
        {
            Ok(team) => self.state.push_log(format!("[INFO] Saved \"{}\"", team.name)),
            Err(err) => self.report_error("Save failed", &err),
        }
    }

    fn export_roster(&mut self) {
        let path = self.export_path("roster");
        let players: Vec<_> = self.state.filtered_players().into_iter().cloned().collect();
        match export_roster(&path, &players, Some(&self.state.settings)) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] {} players exported to {}",
                report.players,
                path.display()
            )),
            Err(err) => self.report_error("Export failed", &err),
        }
    }

    fn export_composition(&mut self) {
        let Some(assignment) = &self.state.assignment else {
            self.state.push_log("[INFO] Generate teams before exporting");
            return;
        };
        let path = self.export_path("composition");
        match export_assignment(
            &path,
            assignment,
            self.state.formation,
            Some(&self.state.settings),
        ) {
            Ok(_) => self
                .state
                .push_log(format!("[INFO] Composition exported to {}", path.display())),
            Err(err) => self.report_error("Export failed", &err),
        }
    }

    fn export_path(&self, stem: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.export_dir.join(format!("{stem}_{stamp}.xlsx"))
    }

    fn reload_players(&mut self) {
        match self.store.list_players() {
            Ok(players) => self.state.set_players(players),
            Err(err) => self.report_error("Reload failed", &err),
        }
    }

    fn report_error(&mut self, what: &str, err: &anyhow::Error) {
        log::warn!("{what}: {err:#}");
        self.state.push_log(format!("[WARN] {what}: {err}"));
    }
}

fn init_logging(config: &AppConfig) {
    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent).ok();
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
    else {
        return;
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::from_env().with_db_path(parse_db_path_arg(&args));
    init_logging(&config);

    let store = open_store(&config.db_path)?;
    let mut app = App::new(store, &config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Roster => render_roster(frame, chunks[1], &app.state),
        Screen::Composition => render_composition(frame, chunks[1], &app.state),
        Screen::Settings => render_settings(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.form.is_some() {
        render_player_form(frame, frame.size(), &app.state);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    match state.screen {
        Screen::Roster => format!(
            "SQUAD {} | {} players | {} present | Pos: {} | Min rating: {}{}",
            state.screen.title(),
            state.players.len(),
            state.board.present_count(),
            state
                .position_filter
                .map(|p| p.label())
                .unwrap_or("Tous"),
            state.min_rating,
            if state.search.is_empty() && !state.search_active {
                String::new()
            } else {
                format!(" | Search: {}", state.search)
            }
        ),
        Screen::Composition => {
            let mode = match state.mode {
                CompositionMode::Auto => "AUTO",
                CompositionMode::SingleTeam => "SINGLE",
            };
            let warning = state
                .formation_warning()
                .map(|w| format!(" | ! {w}"))
                .unwrap_or_default();
            format!(
                "SQUAD {} | {} present | Formation {} | Mode {mode}{warning}",
                state.screen.title(),
                state.board.present_count(),
                state.formation.name()
            )
        }
        Screen::Settings => format!("SQUAD {}", state.screen.title()),
    }
}

fn footer_text(state: &AppState) -> String {
    if state.form.is_some() {
        return "Tab/↑/↓ Field | ←/→ Change | Space Check | Enter Save | Esc Cancel".to_string();
    }
    if state.search_active {
        return "Type to search | Enter Keep | Esc Clear".to_string();
    }
    match state.screen {
        Screen::Roster => "1/2/3 Screens | j/k Move | / Search | o Position | r Rating | p Present | n New | e Edit | +/- Rating | D Delete | x Export | ? Help | q Quit".to_string(),
        Screen::Composition => "h/l Column | j/k Move | m Move player | f Formation | t Mode | g Generate | a All | c Clear | s Save | e Export | ? Help | q Quit".to_string(),
        Screen::Settings => "1/2/3 Screens | ? Help | q Quit".to_string(),
    }
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(34)])
        .split(area);

    let block = Block::default().title("Players").borders(Borders::ALL);
    let inner = block.inner(cols[0]);
    frame.render_widget(block, cols[0]);

    let filtered = state.filtered_players();
    if state.players.is_empty() {
        let empty = Paragraph::new("No players yet. Run `cargo run --bin seed_roster` for a demo roster.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
    } else if filtered.is_empty() {
        let empty = Paragraph::new("No players match the filters")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
    } else if inner.height > 1 {
        let header = Paragraph::new(format!(
            "  {:<3} {:<24} {:<11} {:>3} {:>4}",
            "", "Name", "Position", "Lvl", "Pts"
        ))
        .style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(header, Rect { height: 1, ..inner });

        let visible = (inner.height - 1) as usize;
        let (start, end) = visible_range(state.selected, filtered.len(), visible);
        for (i, idx) in (start..end).enumerate() {
            let p = filtered[idx];
            let selected = idx == state.selected;
            let style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let mark = if state.board.is_present(&p.id) { "[x]" } else { "[ ]" };
            let line = format!(
                "  {mark} {:<24} {:<11} {:>3} {:>4}",
                truncate(&p.full_name(), 24),
                p.preferred_position.label(),
                p.overall_rating,
                state.points(p)
            );
            let row = Rect {
                x: inner.x,
                y: inner.y + 1 + i as u16,
                width: inner.width,
                height: 1,
            };
            frame.render_widget(Paragraph::new(line).style(style), row);
        }
    }

    let detail = Paragraph::new(player_detail_text(state))
        .block(Block::default().title("Detail").borders(Borders::ALL));
    frame.render_widget(detail, cols[1]);
}

fn player_detail_text(state: &AppState) -> String {
    let Some(p) = state.selected_player() else {
        return "No player selected".to_string();
    };
    let mut lines = vec![
        p.full_name(),
        format!("{} | pied {}", p.preferred_position.label(), p.strong_foot.label()),
        format!("Note: {}", stars(p.overall_rating)),
        String::new(),
        format!("Vitesse    {}", stars(p.speed)),
        format!("Endurance  {}", stars(p.endurance)),
        format!("Technique  {}", stars(p.technique)),
        format!("Jeu de tête {}", stars(p.heading)),
        format!("Physique   {}", stars(p.physical)),
        String::new(),
        format!("Points: {}", state.points(p)),
        format!(
            "  dont activités {:+}",
            activity_delta(p, &state.settings.activities_config)
        ),
    ];
    let active: Vec<String> = p
        .active_activities()
        .map(|key| {
            state
                .settings
                .activities_config
                .get(key)
                .map(|rule| format!("  {} ({:+})", rule.label, rule.points))
                .unwrap_or_else(|| format!("  {key} (?)"))
        })
        .collect();
    if !active.is_empty() {
        lines.push("Activités:".to_string());
        lines.extend(active);
    }
    lines.join("\n")
}

fn render_composition(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(rows[0]);

    for (col_idx, column) in PositionColumn::ALL.into_iter().enumerate() {
        let focused = column == state.column;
        let mut block = Block::default()
            .title(format!(
                "{} ({})",
                column.label(),
                state.board.column(column).len()
            ))
            .borders(Borders::ALL);
        if focused {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }
        let inner = block.inner(columns[col_idx]);
        frame.render_widget(block, columns[col_idx]);

        let entries = state.column_rows(column);
        let visible = inner.height as usize;
        let cursor = if focused { state.column_selected } else { 0 };
        let (start, end) = visible_range(cursor, entries.len(), visible);
        for (i, idx) in (start..end).enumerate() {
            let entry = &entries[idx];
            let style = if focused && idx == state.column_selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else if entry.penalty.is_some() {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            let marker = if entry.penalty.is_some() { "*" } else { " " };
            let line = format!("{marker}{} {}", entry.adjusted, entry.name);
            let row = Rect {
                x: inner.x,
                y: inner.y + i as u16,
                width: inner.width,
                height: 1,
            };
            frame.render_widget(Paragraph::new(line).style(style), row);
        }
    }

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    match &state.assignment {
        None => {
            let empty = Paragraph::new(format!(
                "{} present. Press g to generate teams.",
                state.board.present_count()
            ))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Pitch").borders(Borders::ALL));
            frame.render_widget(empty, rows[1]);
        }
        Some(assignment) => {
            render_pitch(frame, bottom[0], state, "Équipe A", &assignment.team_a);
            if assignment.is_split() {
                render_pitch(frame, bottom[1], state, "Équipe B", &assignment.team_b);
            } else {
                let bench = Paragraph::new(bench_text(state, &assignment.team_a))
                    .block(Block::default().title("Banc").borders(Borders::ALL));
                frame.render_widget(bench, bottom[1]);
            }
        }
    }
}

fn render_pitch(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    title: &str,
    team: &squad_planner::composer::TeamSheet,
) {
    let block = Block::default()
        .title(format!(
            "{title} | {} pts | subs: {}",
            team.total_points(Some(&state.settings)),
            team.substitutes
                .iter()
                .map(|p| p.initials())
                .collect::<Vec<_>>()
                .join(" ")
        ))
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 4 || inner.height < 2 {
        return;
    }

    for placed in place_starters(state.formation, &team.starters) {
        let label = placed
            .player
            .map(|p| p.initials())
            .unwrap_or_else(|| "--".to_string());
        // Slot y runs from own goal (low) upward; draw the keeper at the bottom.
        let x = inner.x + ((inner.width - 3) as u32 * placed.slot.x as u32 / 100) as u16;
        let y = inner.y
            + ((inner.height - 1) as u32 * (100 - placed.slot.y as u32) / 100) as u16;
        let cell = Rect {
            x,
            y,
            width: 3.min(inner.width),
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(label).style(Style::default().fg(Color::White)),
            cell,
        );
    }
}

fn bench_text(state: &AppState, team: &squad_planner::composer::TeamSheet) -> String {
    let mut lines = vec!["Remplaçants:".to_string()];
    for p in &team.substitutes {
        lines.push(format!("  {} ({})", p.full_name(), state.points(p)));
    }
    lines.push("Écartés:".to_string());
    for p in &team.excluded {
        lines.push(format!("  {} ({})", p.full_name(), state.points(p)));
    }
    lines.join("\n")
}

fn render_settings(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(30)])
        .split(area);

    let cfg = &state.settings.points_config;
    let scoring = [
        format!("Valeur étoile: {}", cfg.star_value()),
        format!("Valeur compétence: {}", cfg.skill_value()),
        String::new(),
        "Bonus pied fort:".to_string(),
    ]
    .into_iter()
    .chain(
        squad_planner::roster::StrongFoot::ALL
            .into_iter()
            .map(|foot| format!("  {:<10} {:+}", foot.label(), cfg.foot_bonus(foot))),
    )
    .collect::<Vec<_>>()
    .join("\n");
    let scoring = Paragraph::new(scoring)
        .block(Block::default().title("Points").borders(Borders::ALL));
    frame.render_widget(scoring, cols[0]);

    let mut lines = Vec::new();
    for (category, rules) in state.settings.activities_config.by_category() {
        lines.push(category.label().to_string());
        for (key, rule) in rules {
            lines.push(format!("  {:<28} {:+} ({key})", rule.label, rule.points));
        }
    }
    let catalog = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Activités").borders(Borders::ALL));
    frame.render_widget(catalog, cols[1]);
}

fn render_player_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(form) = &state.form else {
        return;
    };
    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);

    let focused = state.form_focused_field();
    let marker = |field: &FormField| {
        if focused.as_ref() == Some(field) {
            "▶"
        } else {
            " "
        }
    };
    let draft = &form.draft;
    let value = |field: &FormField| -> String {
        match field {
            FormField::FirstName => format!("{}_", draft.first_name),
            FormField::LastName => format!("{}_", draft.last_name),
            FormField::Position => draft.preferred_position.label().to_string(),
            FormField::Foot => draft.strong_foot.label().to_string(),
            FormField::Rating => stars(draft.overall_rating),
            FormField::Speed => stars(draft.speed),
            FormField::Endurance => stars(draft.endurance),
            FormField::Technique => stars(draft.technique),
            FormField::Heading => stars(draft.heading),
            FormField::Physical => stars(draft.physical),
            FormField::Activity(_) => String::new(),
        }
    };

    let mut lines = Vec::new();
    for field in state
        .form_fields()
        .iter()
        .filter(|f| !matches!(f, FormField::Activity(_)))
    {
        lines.push(format!("{} {:<12} {}", marker(field), field.label(), value(field)));
    }
    for (category, rules) in state.settings.activities_config.by_category() {
        lines.push(String::new());
        lines.push(category.label().to_string());
        for (key, rule) in rules {
            let field = FormField::Activity(key.to_string());
            let checked = if draft.activities.get(key).copied().unwrap_or(false) {
                "[x]"
            } else {
                "[ ]"
            };
            lines.push(format!(
                "{} {checked} {:<28} {:+}",
                marker(&field),
                rule.label,
                rule.points
            ));
        }
    }

    // Keep the focused line on screen.
    let visible = popup_area.height.saturating_sub(2) as usize;
    let focus_line = lines
        .iter()
        .position(|line| line.starts_with('▶'))
        .unwrap_or(0);
    let (start, end) = visible_range(focus_line, lines.len(), visible);

    let title = match &form.editing {
        Some(_) => "Modifier le joueur",
        None => "Nouveau joueur",
    };
    let body = Paragraph::new(lines[start..end].join("\n"))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(body, popup_area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn stars(level: u8) -> String {
    let filled = level.min(MAX_LEVEL) as usize;
    format!(
        "{}{}",
        "★".repeat(filled),
        "☆".repeat(MAX_LEVEL as usize - filled)
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max.saturating_sub(1)).chain(['…']).collect()
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Squad Planner - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Roster / Composition / Settings",
        "  Tab          Next screen",
        "  j/k or ↑/↓   Move",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Roster:",
        "  /            Search by name",
        "  o            Cycle position filter",
        "  r            Cycle minimum rating",
        "  p / Space    Toggle presence",
        "  n / e        New player / edit selected",
        "  + / -        Change rating",
        "  D            Delete player",
        "  x            Export roster (xlsx)",
        "",
        "Composition:",
        "  h/l or ←/→   Focus column",
        "  m            Move player to next column",
        "  f            Cycle formation",
        "  t            Toggle auto / single team",
        "  g            Generate teams (11+ present)",
        "  a / c        All present / clear",
        "  s / e        Save team A / export",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
