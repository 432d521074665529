//! Performance benchmarks for the match engine
//!
//! Measures AI-vs-AI match execution with Criterion.rs:
//!
//! 1. **match** - set up and play a full seeded match per iteration
//! 2. **bus** - raw publish throughput with a realistic subscriber mix
//! 3. **tourney** - parallel batches through the tournament runner
//!
//! Matches use the starter card set with RandomController on both sides.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grid_tactics::{
    config::GameConfig,
    core::{Card, PlayerId},
    events::{EventBus, EventKind, GameEvent},
    game::{GameLogger, GameManager, MatchRunner, RandomController, VerbosityLevel},
    loader::starter_cards,
    tournament::{run_tourney, NamedDeck, TourneySettings},
    Result,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collected during match execution
#[derive(Debug, Clone)]
struct MatchMetrics {
    turns: u32,
    actions: u32,
    events: u64,
    duration: Duration,
}

impl MatchMetrics {
    fn actions_per_sec(&self) -> f64 {
        self.actions as f64 / self.duration.as_secs_f64()
    }

    fn events_per_sec(&self) -> f64 {
        self.events as f64 / self.duration.as_secs_f64()
    }

    fn actions_per_turn(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.actions as f64 / self.turns as f64
        }
    }
}

fn silent_logger() -> GameLogger {
    GameLogger::with_verbosity(VerbosityLevel::Silent)
}

/// Set up and play one match; card templates are loaded once by the caller
fn run_match_with_metrics(cards: &[Arc<Card>], seed: u64) -> Result<MatchMetrics> {
    let start = Instant::now();

    let bus = EventBus::with_logger(silent_logger());
    let mut game = GameManager::new(GameConfig::default().with_seed(seed), [cards, cards], bus.clone())?;
    game.set_logger(silent_logger());

    let [p1, p2] = game.player_ids();
    let mut controller1 = RandomController::with_seed(p1, seed);
    let mut controller2 = RandomController::with_seed(p2, seed + 1);
    let result = MatchRunner::new(&mut game).run_game(&mut controller1, &mut controller2)?;

    Ok(MatchMetrics {
        turns: result.turns_played,
        actions: result.actions_taken,
        events: bus.published_count(),
        duration: start.elapsed(),
    })
}

fn bench_match(c: &mut Criterion) {
    let cards = starter_cards();
    let mut group = c.benchmark_group("match_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    println!("\nWarmup match (seed {seed}):");
    if let Ok(metrics) = run_match_with_metrics(&cards, seed) {
        println!("  Turns: {}", metrics.turns);
        println!("  Actions: {}", metrics.actions);
        println!("  Events: {}", metrics.events);
        println!("  Duration: {:?}", metrics.duration);
        println!("  Actions/sec: {:.2}", metrics.actions_per_sec());
        println!("  Events/sec: {:.2}", metrics.events_per_sec());
        println!("  Actions/turn: {:.2}", metrics.actions_per_turn());
    }

    group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
        b.iter(|| run_match_with_metrics(&cards, black_box(seed)).expect("match should complete"));
    });
    group.finish();
}

fn bench_bus(c: &mut Criterion) {
    let bus = EventBus::with_logger(silent_logger());
    for priority in [10, 50, 90] {
        bus.subscribe(EventKind::MinionDamaged, format!("sub{priority}"), priority, |_| Ok(()));
    }
    bus.subscribe_all("recorder", 100, |_, _| Ok(()));

    let event = GameEvent::TurnStarted {
        player: PlayerId::new(0),
        turn: 1,
    };
    c.bench_function("bus_publish", |b| {
        b.iter(|| bus.publish(black_box(event.clone())));
    });
}

fn bench_tourney(c: &mut Criterion) {
    let decks = vec![NamedDeck {
        name: "starter".to_string(),
        cards: starter_cards(),
    }];
    let settings = TourneySettings {
        games: 64,
        seed: 7,
        ..Default::default()
    };

    let mut group = c.benchmark_group("tourney");
    group.sample_size(10);
    group.bench_function(BenchmarkId::new("parallel", settings.games), |b| {
        b.iter(|| run_tourney(black_box(&settings), &decks).expect("tourney should complete"));
    });
    group.finish();
}

criterion_group!(benches, bench_match, bench_bus, bench_tourney);
criterion_main!(benches);
