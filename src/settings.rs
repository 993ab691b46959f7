use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::roster::StrongFoot;

pub const DEFAULT_STAR_VALUE: i32 = 10;
pub const DEFAULT_SKILL_VALUE: i32 = 1;

/// Foot bonus used when no settings record is available at all.
pub fn default_foot_bonus(foot: StrongFoot) -> i32 {
    match foot {
        StrongFoot::Left => 2,
        StrongFoot::Right => 1,
        StrongFoot::Both => 3,
    }
}

/// Weights applied by the points computation. Every numeric field is
/// optional in the stored payload; accessors fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_value: Option<i32>,
    #[serde(default)]
    pub strong_foot: BTreeMap<String, i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_value: Option<i32>,
}

impl ScoringConfig {
    pub fn standard() -> Self {
        Self {
            star_value: Some(DEFAULT_STAR_VALUE),
            strong_foot: StrongFoot::ALL
                .iter()
                .map(|foot| (foot.as_str().to_string(), default_foot_bonus(*foot)))
                .collect(),
            skill_value: Some(DEFAULT_SKILL_VALUE),
        }
    }

    // A zero weight counts as unset, same as a missing one.
    pub fn star_value(&self) -> i32 {
        self.star_value
            .filter(|v| *v != 0)
            .unwrap_or(DEFAULT_STAR_VALUE)
    }

    pub fn skill_value(&self) -> i32 {
        self.skill_value
            .filter(|v| *v != 0)
            .unwrap_or(DEFAULT_SKILL_VALUE)
    }

    pub fn foot_bonus(&self, foot: StrongFoot) -> i32 {
        self.strong_foot.get(foot.as_str()).copied().unwrap_or(0)
    }
}

/// Grouping of a catalog entry. French aliases (`arbitrage`, `service`,
/// `services`) are read as their canonical category and stored back under
/// the canonical name (`refereeing`, `tasks`); unknown names are kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityCategory {
    Position,
    Refereeing,
    Tasks,
    Attendance,
    Bonus,
    Penalty,
    Negative,
    Status,
    Other(String),
}

impl ActivityCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityCategory::Position => "position",
            ActivityCategory::Refereeing => "refereeing",
            ActivityCategory::Tasks => "tasks",
            ActivityCategory::Attendance => "attendance",
            ActivityCategory::Bonus => "bonus",
            ActivityCategory::Penalty => "penalty",
            ActivityCategory::Negative => "negative",
            ActivityCategory::Status => "status",
            ActivityCategory::Other(raw) => raw.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ActivityCategory::Position => "Postes",
            ActivityCategory::Refereeing => "Arbitrage",
            ActivityCategory::Tasks => "Services",
            ActivityCategory::Attendance => "Présence",
            ActivityCategory::Bonus => "Bonus",
            ActivityCategory::Penalty => "Pénalités",
            ActivityCategory::Negative => "Négatif",
            ActivityCategory::Status => "Statut",
            ActivityCategory::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for ActivityCategory {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "position" => ActivityCategory::Position,
            "refereeing" | "arbitrage" => ActivityCategory::Refereeing,
            "tasks" | "service" | "services" => ActivityCategory::Tasks,
            "attendance" => ActivityCategory::Attendance,
            "bonus" => ActivityCategory::Bonus,
            "penalty" => ActivityCategory::Penalty,
            "negative" => ActivityCategory::Negative,
            "status" => ActivityCategory::Status,
            _ => ActivityCategory::Other(raw),
        }
    }
}

impl From<ActivityCategory> for String {
    fn from(category: ActivityCategory) -> Self {
        category.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRule {
    pub label: String,
    pub points: i32,
    pub category: ActivityCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityCatalog(pub BTreeMap<String, ActivityRule>);

impl ActivityCatalog {
    pub fn get(&self, key: &str) -> Option<&ActivityRule> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, rule: ActivityRule) {
        self.0.insert(key.into(), rule);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries grouped by category, keys sorted within each group.
    pub fn by_category(&self) -> Vec<(ActivityCategory, Vec<(&str, &ActivityRule)>)> {
        let mut groups: BTreeMap<ActivityCategory, Vec<(&str, &ActivityRule)>> = BTreeMap::new();
        for (key, rule) in &self.0 {
            groups
                .entry(rule.category.clone())
                .or_default()
                .push((key.as_str(), rule));
        }
        groups.into_iter().collect()
    }
}

/// The single global settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub points_config: ScoringConfig,
    #[serde(default)]
    pub activities_config: ActivityCatalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            points_config: ScoringConfig::standard(),
            activities_config: default_catalog(),
        }
    }
}

pub fn default_catalog() -> ActivityCatalog {
    const ENTRIES: [(&str, &str, i32, &str); 15] = [
        ("alreadyExcluded", "Déjà écarté", 2, "status"),
        ("goalkeeperAccepted", "Gardien accepté", 5, "position"),
        ("defenderAccepted", "Défenseur accepté", 3, "position"),
        ("midfielderAccepted", "Milieu accepté", 1, "position"),
        ("attackerAccepted", "Attaquant accepté", 1, "position"),
        ("trainingAttendance", "Présence entraînement", 1, "attendance"),
        ("eventAttendance", "Présence évènement", 1, "attendance"),
        ("lineDrawing", "Traçage", 1, "tasks"),
        ("lockerCleaning", "Nettoyage vestiaire", 1, "tasks"),
        ("jerseys", "Maillots", 1, "tasks"),
        ("extra", "Extra", 1, "tasks"),
        ("lineRefereeing", "Arbitrage touche", 1, "refereeing"),
        ("centerRefereeing", "Arbitrage centre", 1, "refereeing"),
        ("unjustifiedAbsence", "Absence injustifié", -5, "negative"),
        ("badBehavior", "Mauvais comportement", -10, "negative"),
    ];

    let mut catalog = ActivityCatalog::default();
    for (key, label, points, category) in ENTRIES {
        catalog.insert(
            key,
            ActivityRule {
                label: label.to_string(),
                points,
                category: ActivityCategory::from(category.to_string()),
            },
        );
    }
    catalog
}
