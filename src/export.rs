use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::composer::{TeamAssignment, TeamSheet};
use crate::formation::{Formation, place_starters};
use crate::points::compute_points;
use crate::roster::Player;
use crate::session::{PositionColumn, adjusted_points};
use crate::settings::Settings;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub players: usize,
    pub starters: usize,
    pub substitutes: usize,
    pub excluded: usize,
}

pub fn export_roster(path: &Path, players: &[Player], settings: Option<&Settings>) -> Result<ExportReport> {
    let mut rows = vec![vec![
        "First Name".to_string(),
        "Last Name".to_string(),
        "Position".to_string(),
        "Strong Foot".to_string(),
        "Rating".to_string(),
        "Speed".to_string(),
        "Endurance".to_string(),
        "Technique".to_string(),
        "Heading".to_string(),
        "Physical".to_string(),
        "Activities".to_string(),
        "Points".to_string(),
    ]];
    rows.extend(players.iter().map(|p| roster_row(p, settings)));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Players").context("name players sheet")?;
    write_rows(sheet, &rows)?;
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    log::info!("exported {} players to {}", players.len(), path.display());
    Ok(ExportReport {
        players: players.len(),
        ..ExportReport::default()
    })
}

pub fn export_assignment(
    path: &Path,
    assignment: &TeamAssignment,
    formation: Formation,
    settings: Option<&Settings>,
) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    let mut report = ExportReport::default();

    let teams = [("Team A", &assignment.team_a), ("Team B", &assignment.team_b)];
    for (name, team) in teams {
        if team.is_empty() {
            continue;
        }
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).with_context(|| format!("name sheet {name}"))?;
        write_rows(sheet, &team_rows(team, formation, settings))?;
        report.starters += team.starters.len();
        report.substitutes += team.substitutes.len();
    }

    let mut excluded_rows = vec![vec![
        "Player".to_string(),
        "Position".to_string(),
        "Points".to_string(),
    ]];
    for player in assignment.excluded() {
        excluded_rows.push(vec![
            player.full_name(),
            player.preferred_position.label().to_string(),
            compute_points(player, settings).to_string(),
        ]);
        report.excluded += 1;
    }
    let sheet = workbook.add_worksheet();
    sheet.set_name("Excluded").context("name excluded sheet")?;
    write_rows(sheet, &excluded_rows)?;

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    log::info!(
        "exported composition ({} starters, {} subs) to {}",
        report.starters,
        report.substitutes,
        path.display()
    );
    Ok(report)
}

fn team_rows(team: &TeamSheet, formation: Formation, settings: Option<&Settings>) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Slot".to_string(),
        "Slot Position".to_string(),
        "Player".to_string(),
        "Preferred Position".to_string(),
        "Points".to_string(),
        "Adjusted Points".to_string(),
    ]];
    for placed in place_starters(formation, &team.starters) {
        let column = PositionColumn::for_position(placed.slot.position);
        rows.push(match placed.player {
            Some(p) => vec![
                (placed.index + 1).to_string(),
                placed.slot.position.label().to_string(),
                p.full_name(),
                p.preferred_position.label().to_string(),
                compute_points(p, settings).to_string(),
                adjusted_points(p, column, settings).to_string(),
            ],
            None => vec![
                (placed.index + 1).to_string(),
                placed.slot.position.label().to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ],
        });
    }
    for p in &team.substitutes {
        rows.push(vec![
            "SUB".to_string(),
            String::new(),
            p.full_name(),
            p.preferred_position.label().to_string(),
            compute_points(p, settings).to_string(),
            String::new(),
        ]);
    }
    rows
}

fn roster_row(p: &Player, settings: Option<&Settings>) -> Vec<String> {
    vec![
        p.first_name.clone(),
        p.last_name.clone(),
        p.preferred_position.label().to_string(),
        p.strong_foot.label().to_string(),
        p.overall_rating.to_string(),
        p.speed.to_string(),
        p.endurance.to_string(),
        p.technique.to_string(),
        p.heading.to_string(),
        p.physical.to_string(),
        p.active_activities().collect::<Vec<_>>().join(", "),
        compute_points(p, settings).to_string(),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
