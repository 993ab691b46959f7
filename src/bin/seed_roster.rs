use anyhow::{Context, Result, anyhow};
use env_logger::Env;
use rand::SeedableRng;
use rand::rngs::StdRng;

use squad_planner::config::{AppConfig, load_dotenv, parse_db_path_arg, parse_value_arg};
use squad_planner::demo_roster::generate_roster;
use squad_planner::points::compute_points;
use squad_planner::roster::Position;
use squad_planner::store::open_store;

const DEFAULT_COUNT: usize = 24;

fn main() -> Result<()> {
    load_dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AppConfig::from_env().with_db_path(parse_db_path_arg(&args));

    let count = match parse_value_arg(&args, "--count") {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid --count {raw}"))?,
        None => DEFAULT_COUNT,
    };
    if count == 0 {
        return Err(anyhow!("--count must be at least 1"));
    }
    let seed = parse_value_arg(&args, "--seed")
        .map(|raw| {
            raw.parse::<u64>()
                .with_context(|| format!("invalid --seed {raw}"))
        })
        .transpose()?;

    let store = open_store(&config.db_path)?;
    store.ensure_default_settings()?;
    let settings = store.load_settings()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut created = Vec::with_capacity(count);
    for draft in generate_roster(&mut rng, count) {
        created.push(store.create_player(draft)?);
    }

    println!("Demo roster seeded");
    println!("DB: {}", config.db_path.display());
    println!("Players created: {}", created.len());
    for position in Position::ALL {
        let n = created
            .iter()
            .filter(|p| p.preferred_position == position)
            .count();
        println!("  {:<10} {n}", position.label());
    }
    if let Some(best) = created
        .iter()
        .max_by_key(|p| compute_points(p, Some(&settings)))
    {
        println!(
            "Top player: {} ({} pts)",
            best.full_name(),
            compute_points(best, Some(&settings))
        );
    }

    Ok(())
}
