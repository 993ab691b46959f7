use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Attacker,
}

impl Position {
    /// Quota order. Goalkeepers are filled first so scarce keepers are never
    /// taken by a later pass.
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Attacker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeeper",
            Position::Defender => "defender",
            Position::Midfielder => "midfielder",
            Position::Attacker => "attacker",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "goalkeeper" => Some(Position::Goalkeeper),
            "defender" => Some(Position::Defender),
            "midfielder" => Some(Position::Midfielder),
            "attacker" => Some(Position::Attacker),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "Gardien",
            Position::Defender => "Défenseur",
            Position::Midfielder => "Milieu",
            Position::Attacker => "Attaquant",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Position::Goalkeeper => "G",
            Position::Defender => "D",
            Position::Midfielder => "M",
            Position::Attacker => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrongFoot {
    Left,
    Right,
    Both,
}

impl StrongFoot {
    pub const ALL: [StrongFoot; 3] = [StrongFoot::Left, StrongFoot::Right, StrongFoot::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            StrongFoot::Left => "left",
            StrongFoot::Right => "right",
            StrongFoot::Both => "both",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(StrongFoot::Left),
            "right" => Some(StrongFoot::Right),
            "both" => Some(StrongFoot::Both),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StrongFoot::Left => "Pied gauche",
            StrongFoot::Right => "Pied droit",
            StrongFoot::Both => "Les deux pieds",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_position: Position,
    pub strong_foot: StrongFoot,
    pub overall_rating: u8,
    pub speed: u8,
    pub endurance: u8,
    pub technique: u8,
    pub heading: u8,
    pub physical: u8,
    #[serde(default)]
    pub activities: BTreeMap<String, bool>,
    #[serde(default)]
    pub created_at: String,
}

impl Player {
    pub fn skill_total(&self) -> i32 {
        [
            self.speed,
            self.endurance,
            self.technique,
            self.heading,
            self.physical,
        ]
        .iter()
        .map(|v| i32::from(*v))
        .sum()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.activities.get(key).copied().unwrap_or(false)
    }

    pub fn active_activities(&self) -> impl Iterator<Item = &str> {
        self.activities
            .iter()
            .filter(|(_, on)| **on)
            .map(|(key, _)| key.as_str())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn initials(&self) -> String {
        let first = self.first_name.chars().next().unwrap_or('?');
        let last = self.last_name.chars().next().unwrap_or('?');
        format!("{first}{last}")
    }

    pub fn from_draft(id: String, created_at: String, draft: PlayerDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            preferred_position: draft.preferred_position,
            strong_foot: draft.strong_foot,
            overall_rating: draft.overall_rating,
            speed: draft.speed,
            endurance: draft.endurance,
            technique: draft.technique,
            heading: draft.heading,
            physical: draft.physical,
            activities: draft.activities,
            created_at,
        }
    }

    pub fn to_draft(&self) -> PlayerDraft {
        PlayerDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            preferred_position: self.preferred_position,
            strong_foot: self.strong_foot,
            overall_rating: self.overall_rating,
            speed: self.speed,
            endurance: self.endurance,
            technique: self.technique,
            heading: self.heading,
            physical: self.physical,
            activities: self.activities.clone(),
        }
    }
}

/// Create payload: everything the store does not assign itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    pub first_name: String,
    pub last_name: String,
    pub preferred_position: Position,
    pub strong_foot: StrongFoot,
    #[serde(default = "default_level")]
    pub overall_rating: u8,
    #[serde(default = "default_level")]
    pub speed: u8,
    #[serde(default = "default_level")]
    pub endurance: u8,
    #[serde(default = "default_level")]
    pub technique: u8,
    #[serde(default = "default_level")]
    pub heading: u8,
    #[serde(default = "default_level")]
    pub physical: u8,
    #[serde(default)]
    pub activities: BTreeMap<String, bool>,
}

fn default_level() -> u8 {
    MIN_LEVEL
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_position: Option<Position>,
    pub strong_foot: Option<StrongFoot>,
    pub overall_rating: Option<u8>,
    pub speed: Option<u8>,
    pub endurance: Option<u8>,
    pub technique: Option<u8>,
    pub heading: Option<u8>,
    pub physical: Option<u8>,
    pub activities: Option<BTreeMap<String, bool>>,
}

impl PlayerPatch {
    pub fn apply(self, player: &mut Player) {
        if let Some(v) = self.first_name {
            player.first_name = v;
        }
        if let Some(v) = self.last_name {
            player.last_name = v;
        }
        if let Some(v) = self.preferred_position {
            player.preferred_position = v;
        }
        if let Some(v) = self.strong_foot {
            player.strong_foot = v;
        }
        if let Some(v) = self.overall_rating {
            player.overall_rating = v;
        }
        if let Some(v) = self.speed {
            player.speed = v;
        }
        if let Some(v) = self.endurance {
            player.endurance = v;
        }
        if let Some(v) = self.technique {
            player.technique = v;
        }
        if let Some(v) = self.heading {
            player.heading = v;
        }
        if let Some(v) = self.physical {
            player.physical = v;
        }
        if let Some(v) = self.activities {
            player.activities = v;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == PlayerPatch::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be between 1 and 3, got {value}")]
    OutOfRange { field: &'static str, value: u8 },
}

pub fn validate_draft(draft: &PlayerDraft) -> Result<(), ValidationError> {
    if draft.first_name.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: "firstName",
        });
    }
    if draft.last_name.trim().is_empty() {
        return Err(ValidationError::Missing { field: "lastName" });
    }
    let levels = [
        ("overallRating", draft.overall_rating),
        ("speed", draft.speed),
        ("endurance", draft.endurance),
        ("technique", draft.technique),
        ("heading", draft.heading),
        ("physical", draft.physical),
    ];
    for (field, value) in levels {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&value) {
            return Err(ValidationError::OutOfRange { field, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PlayerDraft {
        PlayerDraft {
            first_name: "Ana".to_string(),
            last_name: "Lopes".to_string(),
            preferred_position: Position::Midfielder,
            strong_foot: StrongFoot::Left,
            overall_rating: 2,
            speed: 1,
            endurance: 2,
            technique: 3,
            heading: 1,
            physical: 2,
            activities: BTreeMap::new(),
        }
    }

    #[test]
    fn validation_rejects_out_of_range_levels() {
        let mut d = draft();
        assert!(validate_draft(&d).is_ok());
        d.technique = 4;
        assert_eq!(
            validate_draft(&d),
            Err(ValidationError::OutOfRange {
                field: "technique",
                value: 4
            })
        );
        d.technique = 0;
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn validation_rejects_blank_names() {
        let mut d = draft();
        d.last_name = "   ".to_string();
        assert_eq!(
            validate_draft(&d),
            Err(ValidationError::Missing { field: "lastName" })
        );
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut p = Player::from_draft("id".into(), String::new(), draft());
        PlayerPatch {
            speed: Some(3),
            ..PlayerPatch::default()
        }
        .apply(&mut p);
        assert_eq!(p.speed, 3);
        assert_eq!(p.first_name, "Ana");
        assert_eq!(p.skill_total(), 3 + 2 + 3 + 1 + 2);
    }

    #[test]
    fn enums_use_lowercase_wire_names() {
        let json = serde_json::to_string(&Position::Goalkeeper).unwrap();
        assert_eq!(json, "\"goalkeeper\"");
        let foot: StrongFoot = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(foot, StrongFoot::Both);
        assert!(serde_json::from_str::<StrongFoot>("\"none\"").is_err());
    }

    #[test]
    fn missing_activity_is_inactive() {
        let mut p = Player::from_draft("id".into(), String::new(), draft());
        p.activities.insert("jerseys".into(), false);
        assert!(!p.is_active("jerseys"));
        assert!(!p.is_active("extra"));
        assert_eq!(p.initials(), "AL");
    }
}
