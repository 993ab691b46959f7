use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use squad_planner::composer::{CompositionMode, compose_teams};
use squad_planner::demo_roster::generate_roster;
use squad_planner::points::compute_points;
use squad_planner::roster::Player;
use squad_planner::settings::Settings;

fn sample_roster(count: usize) -> Vec<Player> {
    let mut rng = StdRng::seed_from_u64(2026);
    generate_roster(&mut rng, count)
        .into_iter()
        .enumerate()
        .map(|(i, draft)| Player::from_draft(format!("p{i}"), String::new(), draft))
        .collect()
}

fn bench_compute_points(c: &mut Criterion) {
    let players = sample_roster(40);
    let settings = Settings::default();
    c.bench_function("compute_points_roster_40", |b| {
        b.iter(|| {
            let total: i32 = players
                .iter()
                .map(|p| compute_points(black_box(p), Some(&settings)))
                .sum();
            black_box(total);
        })
    });
}

fn bench_compose(c: &mut Criterion, present: usize) {
    let players = sample_roster(present);
    let ids: Vec<String> = players.iter().map(|p| p.id.clone()).collect();
    let settings = Settings::default();
    c.bench_function(&format!("compose_teams_{present}"), |b| {
        b.iter(|| {
            let out = compose_teams(
                black_box(&players),
                black_box(&ids),
                Some(&settings),
                CompositionMode::Auto,
            );
            black_box(out.is_ok());
        })
    });
}

fn bench_compose_22(c: &mut Criterion) {
    bench_compose(c, 22);
}

fn bench_compose_40(c: &mut Criterion) {
    bench_compose(c, 40);
}

criterion_group!(perf, bench_compute_points, bench_compose_22, bench_compose_40);
criterion_main!(perf);
