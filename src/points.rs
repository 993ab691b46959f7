use crate::roster::Player;
use crate::settings::{ActivityCatalog, Settings, default_foot_bonus};

/// Integer score for a player. Without settings the built-in weights apply
/// and activities are ignored; with settings every active activity known to
/// the catalog adds its (possibly negative) points. Never clamped.
pub fn compute_points(player: &Player, settings: Option<&Settings>) -> i32 {
    let rating = i32::from(player.overall_rating);
    let Some(settings) = settings else {
        return rating * 10 + default_foot_bonus(player.strong_foot) + player.skill_total();
    };

    let cfg = &settings.points_config;
    rating * cfg.star_value()
        + cfg.foot_bonus(player.strong_foot)
        + player.skill_total() * cfg.skill_value()
        + activity_delta(player, &settings.activities_config)
}

/// Sum of the catalog points of the player's active activities. Keys the
/// catalog does not know are skipped.
pub fn activity_delta(player: &Player, catalog: &ActivityCatalog) -> i32 {
    player
        .active_activities()
        .filter_map(|key| catalog.get(key))
        .map(|rule| rule.points)
        .sum()
}
