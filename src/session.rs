//! Caller-held session state: who is present and which position column each
//! present player sits in. Team generation reads only the present ids; the
//! columns exist for display and for the adjusted-points annotation.

use serde::{Deserialize, Serialize};

use crate::composer::TeamAssignment;
use crate::points::compute_points;
use crate::roster::{Player, Position};
use crate::settings::Settings;

pub const GOALKEEPER_PENALTY: i32 = 20;
pub const OFF_POSITION_PENALTY: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionColumn {
    Goalkeeper,
    Defenders,
    Midfielders,
    Attackers,
    Excluded,
}

impl PositionColumn {
    pub const ALL: [PositionColumn; 5] = [
        PositionColumn::Goalkeeper,
        PositionColumn::Defenders,
        PositionColumn::Midfielders,
        PositionColumn::Attackers,
        PositionColumn::Excluded,
    ];

    pub fn for_position(position: Position) -> Self {
        match position {
            Position::Goalkeeper => PositionColumn::Goalkeeper,
            Position::Defender => PositionColumn::Defenders,
            Position::Midfielder => PositionColumn::Midfielders,
            Position::Attacker => PositionColumn::Attackers,
        }
    }

    pub fn position(self) -> Option<Position> {
        match self {
            PositionColumn::Goalkeeper => Some(Position::Goalkeeper),
            PositionColumn::Defenders => Some(Position::Defender),
            PositionColumn::Midfielders => Some(Position::Midfielder),
            PositionColumn::Attackers => Some(Position::Attacker),
            PositionColumn::Excluded => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionColumn::Goalkeeper => "Gardiens",
            PositionColumn::Defenders => "Défenseurs",
            PositionColumn::Midfielders => "Milieux",
            PositionColumn::Attackers => "Attaquants",
            PositionColumn::Excluded => "Écartés",
        }
    }

    pub fn next(self) -> Self {
        match self {
            PositionColumn::Goalkeeper => PositionColumn::Defenders,
            PositionColumn::Defenders => PositionColumn::Midfielders,
            PositionColumn::Midfielders => PositionColumn::Attackers,
            PositionColumn::Attackers => PositionColumn::Excluded,
            PositionColumn::Excluded => PositionColumn::Goalkeeper,
        }
    }

    fn index(self) -> usize {
        match self {
            PositionColumn::Goalkeeper => 0,
            PositionColumn::Defenders => 1,
            PositionColumn::Midfielders => 2,
            PositionColumn::Attackers => 3,
            PositionColumn::Excluded => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    NonGoalkeeper,
    OffPosition,
}

impl Penalty {
    pub fn points(self) -> i32 {
        match self {
            Penalty::NonGoalkeeper => GOALKEEPER_PENALTY,
            Penalty::OffPosition => OFF_POSITION_PENALTY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Penalty::NonGoalkeeper => "non-gardien",
            Penalty::OffPosition => "hors poste",
        }
    }
}

/// Which penalty, if any, applies to `player` shown in `column`. The
/// excluded column has no position, so it always counts as off-position.
pub fn penalty_for(player: &Player, column: PositionColumn) -> Option<Penalty> {
    if column == PositionColumn::Goalkeeper && player.preferred_position != Position::Goalkeeper {
        return Some(Penalty::NonGoalkeeper);
    }
    if column.position() != Some(player.preferred_position) {
        return Some(Penalty::OffPosition);
    }
    None
}

/// Display-only score. Never used for selection.
pub fn adjusted_points(player: &Player, column: PositionColumn, settings: Option<&Settings>) -> i32 {
    let base = compute_points(player, settings);
    match penalty_for(player, column) {
        Some(penalty) => base - penalty.points(),
        None => base,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBoard {
    present: Vec<String>,
    columns: [Vec<String>; 5],
}

impl SessionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present ids in the order they were marked.
    pub fn present_ids(&self) -> &[String] {
        &self.present
    }

    pub fn present_count(&self) -> usize {
        self.present.len()
    }

    pub fn is_present(&self, player_id: &str) -> bool {
        self.present.iter().any(|id| id == player_id)
    }

    pub fn column(&self, column: PositionColumn) -> &[String] {
        &self.columns[column.index()]
    }

    pub fn column_of(&self, player_id: &str) -> Option<PositionColumn> {
        PositionColumn::ALL
            .into_iter()
            .find(|c| self.columns[c.index()].iter().any(|id| id == player_id))
    }

    pub fn placed_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Marking present drops the player into the column of its preferred
    /// position; unmarking removes it from every column. Returns whether the
    /// player is present afterwards.
    pub fn toggle_presence(&mut self, player: &Player) -> bool {
        if self.is_present(&player.id) {
            self.present.retain(|id| id != &player.id);
            self.remove_from_columns(&player.id);
            false
        } else {
            self.present.push(player.id.clone());
            self.columns[PositionColumn::for_position(player.preferred_position).index()]
                .push(player.id.clone());
            true
        }
    }

    /// Returns false when the player is not on the board.
    pub fn move_to(&mut self, player_id: &str, column: PositionColumn) -> bool {
        if !self.is_present(player_id) {
            return false;
        }
        self.remove_from_columns(player_id);
        self.columns[column.index()].push(player_id.to_string());
        true
    }

    pub fn mark_all_present(&mut self, players: &[Player]) {
        self.clear();
        for player in players {
            self.toggle_presence(player);
        }
    }

    pub fn clear(&mut self) {
        self.present.clear();
        for column in &mut self.columns {
            column.clear();
        }
    }

    /// Move the players a generation run left out into the excluded column.
    pub fn absorb_excluded(&mut self, assignment: &TeamAssignment) {
        for player in assignment.excluded() {
            self.move_to(&player.id, PositionColumn::Excluded);
        }
    }

    /// Drop ids that no longer exist in the roster (deleted players).
    pub fn retain_known(&mut self, players: &[Player]) {
        let known = |id: &String| players.iter().any(|p| &p.id == id);
        self.present.retain(known);
        for column in &mut self.columns {
            column.retain(known);
        }
    }

    pub fn column_players<'a>(
        &self,
        column: PositionColumn,
        players: &'a [Player],
    ) -> Vec<&'a Player> {
        self.column(column)
            .iter()
            .filter_map(|id| players.iter().find(|p| &p.id == id))
            .collect()
    }

    fn remove_from_columns(&mut self, player_id: &str) {
        for column in &mut self.columns {
            column.retain(|id| id != player_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::roster::StrongFoot;

    fn player(id: &str, position: Position) -> Player {
        Player {
            id: id.to_string(),
            first_name: id.to_string(),
            last_name: "Y".to_string(),
            preferred_position: position,
            strong_foot: StrongFoot::Right,
            overall_rating: 2,
            speed: 2,
            endurance: 2,
            technique: 2,
            heading: 2,
            physical: 2,
            activities: BTreeMap::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn penalties_match_the_column() {
        let def = player("d", Position::Defender);
        let gk = player("g", Position::Goalkeeper);
        // 20 + 1 + 10
        assert_eq!(adjusted_points(&def, PositionColumn::Defenders, None), 31);
        assert_eq!(adjusted_points(&def, PositionColumn::Goalkeeper, None), 11);
        assert_eq!(adjusted_points(&def, PositionColumn::Attackers, None), 21);
        assert_eq!(adjusted_points(&def, PositionColumn::Excluded, None), 21);
        assert_eq!(adjusted_points(&gk, PositionColumn::Goalkeeper, None), 31);
        assert_eq!(
            penalty_for(&gk, PositionColumn::Defenders),
            Some(Penalty::OffPosition)
        );
    }

    #[test]
    fn toggling_places_and_removes() {
        let mut board = SessionBoard::new();
        let m = player("m", Position::Midfielder);
        assert!(board.toggle_presence(&m));
        assert_eq!(board.column_of("m"), Some(PositionColumn::Midfielders));
        assert!(board.move_to("m", PositionColumn::Goalkeeper));
        assert_eq!(board.column(PositionColumn::Midfielders).len(), 0);
        assert!(!board.toggle_presence(&m));
        assert_eq!(board.placed_count(), 0);
        assert!(!board.move_to("m", PositionColumn::Defenders));
    }

    #[test]
    fn mark_all_then_clear() {
        let players = vec![
            player("a", Position::Attacker),
            player("g", Position::Goalkeeper),
        ];
        let mut board = SessionBoard::new();
        board.mark_all_present(&players);
        assert_eq!(board.present_ids(), &["a".to_string(), "g".to_string()]);
        assert_eq!(board.column(PositionColumn::Goalkeeper), &["g".to_string()]);
        board.retain_known(&players[..1]);
        assert_eq!(board.present_count(), 1);
        board.clear();
        assert_eq!(board.present_count(), 0);
    }
}
