use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use env_logger::Env;

use squad_planner::composer::{CompositionError, CompositionMode, TeamSheet, compose_teams};
use squad_planner::config::{AppConfig, has_flag, load_dotenv, parse_db_path_arg, parse_value_arg};
use squad_planner::export::export_assignment;
use squad_planner::formation::{Formation, place_starters};
use squad_planner::points::compute_points;
use squad_planner::session::{PositionColumn, adjusted_points};
use squad_planner::settings::Settings;
use squad_planner::store::open_store;

fn main() -> ExitCode {
    load_dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<CompositionError>().is_some() {
                eprintln!("{err}");
                return ExitCode::from(2);
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AppConfig::from_env().with_db_path(parse_db_path_arg(&args));
    let formation = parse_value_arg(&args, "--formation")
        .map(|raw| Formation::parse(&raw))
        .unwrap_or(config.formation);
    let mode = if has_flag(&args, "--single") {
        CompositionMode::SingleTeam
    } else {
        CompositionMode::Auto
    };

    let store = open_store(&config.db_path)?;
    let settings = store.load_settings()?;
    let players = store.list_players()?;

    let present_ids: Vec<String> = if has_flag(&args, "--all") {
        players.iter().map(|p| p.id.clone()).collect()
    } else {
        parse_value_arg(&args, "--present")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    let assignment = compose_teams(&players, &present_ids, Some(&settings), mode)?;

    println!("Formation: {}", formation.name());
    print_team("Team A", &assignment.team_a, formation, &settings);
    if assignment.is_split() {
        print_team("Team B", &assignment.team_b, formation, &settings);
    }
    let excluded: Vec<_> = assignment.excluded().collect();
    if !excluded.is_empty() {
        println!("Excluded:");
        for p in excluded {
            println!("  {} ({} pts)", p.full_name(), compute_points(p, Some(&settings)));
        }
    }

    if let Some(path) = parse_value_arg(&args, "--export").map(PathBuf::from) {
        export_assignment(&path, &assignment, formation, Some(&settings))?;
        println!("Exported: {}", path.display());
    }

    Ok(())
}

fn print_team(title: &str, team: &TeamSheet, formation: Formation, settings: &Settings) {
    println!(
        "{title} ({} pts)",
        team.total_points(Some(settings))
    );
    for placed in place_starters(formation, &team.starters) {
        let Some(p) = placed.player else {
            println!("  {:>2} {:<10} -", placed.index + 1, placed.slot.position.label());
            continue;
        };
        let column = PositionColumn::for_position(placed.slot.position);
        println!(
            "  {:>2} {:<10} {:<24} {:<10} {:>3} pts (adjusted {})",
            placed.index + 1,
            placed.slot.position.label(),
            p.full_name(),
            p.preferred_position.label(),
            compute_points(p, Some(settings)),
            adjusted_points(p, column, Some(settings))
        );
    }
    for p in &team.substitutes {
        println!(
            "  SUB           {:<24} {:<10} {:>3} pts",
            p.full_name(),
            p.preferred_position.label(),
            compute_points(p, Some(settings))
        );
    }
}
