use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::composer::TeamSheet;
use crate::formation::Formation;
use crate::roster::{Player, PlayerDraft, PlayerPatch, Position, StrongFoot, validate_draft};
use crate::settings::{ActivityCatalog, ScoringConfig, Settings};

/// A composition kept by the administrator: slot index -> player id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTeam {
    pub id: String,
    pub name: String,
    pub formation: String,
    pub player_positions: BTreeMap<String, String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDraft {
    pub name: String,
    pub formation: String,
    #[serde(default)]
    pub player_positions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    pub name: Option<String>,
    pub formation: Option<String>,
    pub player_positions: Option<BTreeMap<String, String>>,
}

pub struct Store {
    conn: Connection,
}

pub fn open_store(path: &Path) -> Result<Store> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    log::info!("opened roster store at {}", path.display());
    Store::from_connection(conn)
}

impl Store {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    // Players

    pub fn list_players(&self) -> Result<Vec<Player>> {
        self.ensure_default_settings()?;
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT
                    id, first_name, last_name, preferred_position, strong_foot,
                    overall_rating, speed, endurance, technique, heading, physical,
                    activities, created_at
                FROM players
                ORDER BY created_at ASC, id ASC
                "#,
            )
            .context("prepare list players query")?;
        let rows = stmt
            .query_map([], player_from_row)
            .context("query list players")?;

        let mut out = Vec::new();
        for row in rows {
            match row {
                Ok(player) => out.push(player),
                // Left untouched in the table so nothing overwrites it.
                Err(err @ rusqlite::Error::FromSqlConversionFailure(..)) => {
                    log::warn!("skipping unreadable player row: {err}");
                }
                Err(err) => return Err(err).context("decode player row"),
            }
        }
        Ok(out)
    }

    pub fn get_player(&self, id: &str) -> Result<Option<Player>> {
        self.ensure_default_settings()?;
        self.conn
            .query_row(
                r#"
                SELECT
                    id, first_name, last_name, preferred_position, strong_foot,
                    overall_rating, speed, endurance, technique, heading, physical,
                    activities, created_at
                FROM players
                WHERE id = ?1
                "#,
                params![id],
                player_from_row,
            )
            .optional()
            .with_context(|| format!("query player {id}"))
    }

    pub fn create_player(&self, draft: PlayerDraft) -> Result<Player> {
        self.ensure_default_settings()?;
        validate_draft(&draft).context("invalid player")?;
        let player = Player::from_draft(
            Uuid::new_v4().to_string(),
            Utc::now().to_rfc3339(),
            draft,
        );
        self.write_player(&player)?;
        log::info!("created player {} ({})", player.full_name(), player.id);
        Ok(player)
    }

    /// `Ok(None)` when no player has this id.
    pub fn update_player(&self, id: &str, patch: PlayerPatch) -> Result<Option<Player>> {
        let Some(mut player) = self.get_player(id)? else {
            return Ok(None);
        };
        patch.apply(&mut player);
        validate_draft(&player.to_draft()).context("invalid player")?;
        self.write_player(&player)?;
        log::debug!("updated player {id}");
        Ok(Some(player))
    }

    pub fn delete_player(&self, id: &str) -> Result<bool> {
        self.ensure_default_settings()?;
        let n = self
            .conn
            .execute("DELETE FROM players WHERE id = ?1", params![id])
            .context("delete player")?;
        if n > 0 {
            log::info!("deleted player {id}");
        }
        Ok(n > 0)
    }

    fn write_player(&self, p: &Player) -> Result<()> {
        let activities = serde_json::to_string(&p.activities).context("encode activities")?;
        self.conn
            .execute(
                r#"
                INSERT INTO players (
                    id, first_name, last_name, preferred_position, strong_foot,
                    overall_rating, speed, endurance, technique, heading, physical,
                    activities, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(id) DO UPDATE SET
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    preferred_position = excluded.preferred_position,
                    strong_foot = excluded.strong_foot,
                    overall_rating = excluded.overall_rating,
                    speed = excluded.speed,
                    endurance = excluded.endurance,
                    technique = excluded.technique,
                    heading = excluded.heading,
                    physical = excluded.physical,
                    activities = excluded.activities
                "#,
                params![
                    p.id,
                    p.first_name,
                    p.last_name,
                    p.preferred_position.as_str(),
                    p.strong_foot.as_str(),
                    p.overall_rating,
                    p.speed,
                    p.endurance,
                    p.technique,
                    p.heading,
                    p.physical,
                    activities,
                    p.created_at,
                ],
            )
            .context("upsert player")?;
        Ok(())
    }

    // Teams

    pub fn list_teams(&self) -> Result<Vec<SavedTeam>> {
        self.ensure_default_settings()?;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, formation, player_positions, created_at
                 FROM teams ORDER BY created_at ASC, id ASC",
            )
            .context("prepare list teams query")?;
        let rows = stmt.query_map([], team_from_row).context("query list teams")?;

        let mut out = Vec::new();
        for row in rows {
            match row {
                Ok(team) => out.push(team),
                Err(err @ rusqlite::Error::FromSqlConversionFailure(..)) => {
                    log::warn!("skipping unreadable team row: {err}");
                }
                Err(err) => return Err(err).context("decode team row"),
            }
        }
        Ok(out)
    }

    pub fn get_team(&self, id: &str) -> Result<Option<SavedTeam>> {
        self.ensure_default_settings()?;
        self.conn
            .query_row(
                "SELECT id, name, formation, player_positions, created_at
                 FROM teams WHERE id = ?1",
                params![id],
                team_from_row,
            )
            .optional()
            .with_context(|| format!("query team {id}"))
    }

    pub fn create_team(&self, draft: TeamDraft) -> Result<SavedTeam> {
        self.ensure_default_settings()?;
        let team = SavedTeam {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            formation: draft.formation,
            player_positions: draft.player_positions,
            created_at: Utc::now().to_rfc3339(),
        };
        validate_team(&team)?;
        self.write_team(&team)?;
        log::info!("saved team {} ({})", team.name, team.id);
        Ok(team)
    }

    pub fn update_team(&self, id: &str, patch: TeamPatch) -> Result<Option<SavedTeam>> {
        let Some(mut team) = self.get_team(id)? else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            team.name = name;
        }
        if let Some(formation) = patch.formation {
            team.formation = formation;
        }
        if let Some(positions) = patch.player_positions {
            team.player_positions = positions;
        }
        validate_team(&team)?;
        self.write_team(&team)?;
        Ok(Some(team))
    }

    pub fn delete_team(&self, id: &str) -> Result<bool> {
        self.ensure_default_settings()?;
        let n = self
            .conn
            .execute("DELETE FROM teams WHERE id = ?1", params![id])
            .context("delete team")?;
        Ok(n > 0)
    }

    /// Keep a generated team: starters by slot index, substitutes after them.
    pub fn save_assignment(
        &self,
        name: &str,
        formation: Formation,
        team: &TeamSheet,
    ) -> Result<SavedTeam> {
        let player_positions = team
            .starters
            .iter()
            .chain(team.substitutes.iter())
            .enumerate()
            .map(|(idx, p)| (idx.to_string(), p.id.clone()))
            .collect();
        self.create_team(TeamDraft {
            name: name.to_string(),
            formation: formation.name().to_string(),
            player_positions,
        })
    }

    fn write_team(&self, t: &SavedTeam) -> Result<()> {
        let positions =
            serde_json::to_string(&t.player_positions).context("encode player positions")?;
        self.conn
            .execute(
                r#"
                INSERT INTO teams (id, name, formation, player_positions, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    formation = excluded.formation,
                    player_positions = excluded.player_positions
                "#,
                params![t.id, t.name, t.formation, positions, t.created_at],
            )
            .context("upsert team")?;
        Ok(())
    }

    // Settings

    pub fn get_settings(&self) -> Result<Option<Settings>> {
        let row = self
            .conn
            .query_row(
                "SELECT points_config, activities_config FROM settings ORDER BY id ASC LIMIT 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .context("query settings")?;
        let Some((points_raw, activities_raw)) = row else {
            return Ok(None);
        };

        // A malformed payload falls back to defaults instead of failing.
        let points_config = serde_json::from_str::<ScoringConfig>(&points_raw)
            .unwrap_or_else(|err| {
                log::warn!("invalid points config, using defaults: {err}");
                ScoringConfig::standard()
            });
        let activities_config = serde_json::from_str::<ActivityCatalog>(&activities_raw)
            .unwrap_or_else(|err| {
                log::warn!("invalid activities config, ignoring activities: {err}");
                ActivityCatalog::default()
            });
        Ok(Some(Settings {
            points_config,
            activities_config,
        }))
    }

    /// Settings for scoring: the stored record, created with defaults on
    /// first use.
    pub fn load_settings(&self) -> Result<Settings> {
        self.ensure_default_settings()?;
        self.get_settings()?
            .ok_or_else(|| anyhow!("settings missing after initialisation"))
    }

    pub fn ensure_default_settings(&self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .context("count settings")?;
        if count == 0 {
            log::info!("no settings record found, writing defaults");
            self.update_settings(&Settings::default())?;
        }
        Ok(())
    }

    /// Full replacement; the last write wins.
    pub fn update_settings(&self, settings: &Settings) -> Result<Settings> {
        let points = serde_json::to_string(&settings.points_config).context("encode points")?;
        let activities =
            serde_json::to_string(&settings.activities_config).context("encode activities")?;
        let existing: Option<String> = self
            .conn
            .query_row("SELECT id FROM settings ORDER BY id ASC LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .context("query settings id")?;
        match existing {
            Some(id) => {
                self.conn
                    .execute(
                        "UPDATE settings SET points_config = ?1, activities_config = ?2 WHERE id = ?3",
                        params![points, activities, id],
                    )
                    .context("update settings")?;
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO settings (id, points_config, activities_config) VALUES (?1, ?2, ?3)",
                        params![Uuid::new_v4().to_string(), points, activities],
                    )
                    .context("insert settings")?;
            }
        }
        Ok(settings.clone())
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            preferred_position TEXT NOT NULL,
            strong_foot TEXT NOT NULL,
            overall_rating INTEGER NOT NULL DEFAULT 1,
            speed INTEGER NOT NULL DEFAULT 1,
            endurance INTEGER NOT NULL DEFAULT 1,
            technique INTEGER NOT NULL DEFAULT 1,
            heading INTEGER NOT NULL DEFAULT 1,
            physical INTEGER NOT NULL DEFAULT 1,
            activities TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_players_position ON players(preferred_position);

        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            formation TEXT NOT NULL,
            player_positions TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            id TEXT PRIMARY KEY,
            points_config TEXT NOT NULL DEFAULT '{}',
            activities_config TEXT NOT NULL DEFAULT '{}'
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn validate_team(team: &SavedTeam) -> Result<()> {
    if team.name.trim().is_empty() {
        return Err(anyhow!("invalid team: name is required"));
    }
    if team.formation.trim().is_empty() {
        return Err(anyhow!("invalid team: formation is required"));
    }
    Ok(())
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    let position: String = row.get(3)?;
    let foot: String = row.get(4)?;
    let activities: String = row.get(11)?;
    Ok(Player {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        preferred_position: Position::parse(&position)
            .ok_or_else(|| text_error(3, format!("unknown position {position:?}")))?,
        strong_foot: StrongFoot::parse(&foot)
            .ok_or_else(|| text_error(4, format!("unknown strong foot {foot:?}")))?,
        overall_rating: row.get(5)?,
        speed: row.get(6)?,
        endurance: row.get(7)?,
        technique: row.get(8)?,
        heading: row.get(9)?,
        physical: row.get(10)?,
        activities: serde_json::from_str(&activities)
            .map_err(|err| text_error(11, format!("invalid activities {activities:?}: {err}")))?,
        created_at: row.get(12)?,
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<SavedTeam> {
    let positions: String = row.get(3)?;
    Ok(SavedTeam {
        id: row.get(0)?,
        name: row.get(1)?,
        formation: row.get(2)?,
        player_positions: serde_json::from_str(&positions)
            .map_err(|err| text_error(3, format!("invalid player positions {positions:?}: {err}")))?,
        created_at: row.get(4)?,
    })
}

fn text_error(col: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        col,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, msg)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_access_writes_default_settings() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_settings().unwrap().is_none());
        assert!(store.list_players().unwrap().is_empty());
        assert_eq!(store.get_settings().unwrap(), Some(Settings::default()));
    }

    #[test]
    fn malformed_settings_payload_falls_back_to_defaults() {
        let store = Store::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO settings (id, points_config, activities_config) VALUES ('s', 'not json', '{}')",
                [],
            )
            .unwrap();
        let settings = store.load_settings().unwrap();
        assert_eq!(settings.points_config, ScoringConfig::standard());
        assert!(settings.activities_config.is_empty());
    }

    fn raw_activities(store: &Store, id: &str) -> String {
        store
            .conn
            .query_row(
                "SELECT activities FROM players WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn unreadable_activities_are_never_overwritten() {
        let store = Store::open_in_memory().unwrap();
        let draft = PlayerDraft {
            first_name: "Léo".to_string(),
            last_name: "Roux".to_string(),
            preferred_position: Position::Defender,
            strong_foot: StrongFoot::Right,
            overall_rating: 1,
            speed: 1,
            endurance: 1,
            technique: 1,
            heading: 1,
            physical: 1,
            activities: BTreeMap::new(),
        };
        let kept = store.create_player(draft.clone()).unwrap();
        let broken = store.create_player(draft).unwrap();
        store
            .conn
            .execute(
                "UPDATE players SET activities = '{\"jerseys\": 1}' WHERE id = ?1",
                params![broken.id],
            )
            .unwrap();

        assert!(store.get_player(&broken.id).is_err());
        let patch = PlayerPatch {
            overall_rating: Some(2),
            ..PlayerPatch::default()
        };
        assert!(store.update_player(&broken.id, patch).is_err());
        assert_eq!(raw_activities(&store, &broken.id), "{\"jerseys\": 1}");

        let listed = store.list_players().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept.id);
    }

    #[test]
    fn unreadable_team_positions_are_skipped_in_listing() {
        let store = Store::open_in_memory().unwrap();
        let team = store
            .create_team(TeamDraft {
                name: "Samedi".to_string(),
                formation: "4-4-2".to_string(),
                player_positions: BTreeMap::new(),
            })
            .unwrap();
        store
            .conn
            .execute(
                "UPDATE teams SET player_positions = 'oops' WHERE id = ?1",
                params![team.id],
            )
            .unwrap();
        assert!(store.get_team(&team.id).is_err());
        assert!(store.list_teams().unwrap().is_empty());
    }
}
