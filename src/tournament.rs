//! Tournament mode for running many matches in parallel and collecting statistics
//!
//! Matches are independent, so each one builds its own bus, manager and
//! controllers inside a rayon worker. Per-match seeds are derived from the
//! tournament seed and the match index, which keeps a tournament
//! reproducible regardless of thread scheduling.

use crate::config::GameConfig;
use crate::core::Card;
use crate::events::EventBus;
use crate::game::{
    EndReason, GameLogger, GameManager, MatchRunner, OutputMode, PlayerController, RandomController,
    VerbosityLevel, ZeroController,
};
use crate::{GameError, Result};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Controller type for tournament matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    Zero,
    Random,
}

impl ControllerType {
    pub fn build(self, player: crate::core::PlayerId, seed: u64) -> Box<dyn PlayerController> {
        match self {
            ControllerType::Zero => Box::new(ZeroController::new(player)),
            ControllerType::Random => Box::new(RandomController::with_seed(player, seed)),
        }
    }
}

/// A deck entered into the tournament
#[derive(Debug, Clone)]
pub struct NamedDeck {
    pub name: String,
    pub cards: Vec<Arc<Card>>,
}

#[derive(Debug, Clone)]
pub struct TourneySettings {
    pub games: usize,
    pub seed: u64,
    pub p1: ControllerType,
    pub p2: ControllerType,
    pub max_turns: u32,
    /// Base configuration; seed and layout are overridden per match
    pub config: GameConfig,
    /// Layouts drawn from at random for each match
    pub layouts: Vec<String>,
}

impl Default for TourneySettings {
    fn default() -> Self {
        TourneySettings {
            games: 100,
            seed: 0,
            p1: ControllerType::Random,
            p2: ControllerType::Random,
            max_turns: 200,
            config: GameConfig::default(),
            layouts: vec!["classic".to_string()],
        }
    }
}

/// Statistics collected during a tournament
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TournamentStats {
    pub p1_wins: usize,
    pub p2_wins: usize,
    pub draws: usize,
    pub failed: usize,
    pub total_turns: u64,
    pub end_reasons: FxHashMap<EndReason, usize>,
    /// deck name -> (wins, games)
    pub deck_records: BTreeMap<String, (usize, usize)>,
}

impl TournamentStats {
    pub fn games_played(&self) -> usize {
        self.p1_wins + self.p2_wins + self.draws
    }

    fn merge(mut self, other: TournamentStats) -> TournamentStats {
        self.p1_wins += other.p1_wins;
        self.p2_wins += other.p2_wins;
        self.draws += other.draws;
        self.failed += other.failed;
        self.total_turns += other.total_turns;
        for (reason, count) in other.end_reasons {
            *self.end_reasons.entry(reason).or_insert(0) += count;
        }
        for (deck, (wins, games)) in other.deck_records {
            let record = self.deck_records.entry(deck).or_insert((0, 0));
            record.0 += wins;
            record.1 += games;
        }
        self
    }
}

/// What one match contributes to the statistics
struct MatchRecord {
    winner_seat: Option<usize>,
    turns: u32,
    reason: EndReason,
    decks: [usize; 2],
}

/// Play `settings.games` matches in parallel
pub fn run_tourney(settings: &TourneySettings, decks: &[NamedDeck]) -> Result<TournamentStats> {
    if decks.is_empty() {
        return Err(GameError::InvalidConfig("Tournament requires at least 1 deck".to_string()));
    }
    if settings.layouts.is_empty() {
        return Err(GameError::InvalidConfig("Tournament requires at least 1 layout".to_string()));
    }
    settings.config.validate()?;

    let stats = (0..settings.games)
        .into_par_iter()
        .map(|game_idx| {
            let mut stats = TournamentStats::default();
            match play_match(settings, decks, game_idx) {
                Ok(record) => stats.record(decks, &record),
                Err(e) => {
                    eprintln!("Warning: Game {game_idx} failed: {e}");
                    stats.failed += 1;
                }
            }
            stats
        })
        .reduce(TournamentStats::default, TournamentStats::merge);
    Ok(stats)
}

impl TournamentStats {
    fn record(&mut self, decks: &[NamedDeck], record: &MatchRecord) {
        match record.winner_seat {
            Some(0) => self.p1_wins += 1,
            Some(_) => self.p2_wins += 1,
            None => self.draws += 1,
        }
        self.total_turns += u64::from(record.turns);
        *self.end_reasons.entry(record.reason).or_insert(0) += 1;
        for (seat, &deck) in record.decks.iter().enumerate() {
            let entry = self.deck_records.entry(decks[deck].name.clone()).or_insert((0, 0));
            entry.1 += 1;
            if record.winner_seat == Some(seat) {
                entry.0 += 1;
            }
        }
    }
}

fn play_match(settings: &TourneySettings, decks: &[NamedDeck], game_idx: usize) -> Result<MatchRecord> {
    // Deterministic per-match choices based on tournament seed + match index
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(settings.seed.wrapping_add(game_idx as u64));
    let picks = [rng.gen_range(0..decks.len()), rng.gen_range(0..decks.len())];
    let layout = settings.layouts[rng.gen_range(0..settings.layouts.len())].clone();
    let game_seed: u64 = rng.gen();

    let config = settings.config.clone().with_seed(game_seed).with_layout(layout);
    let mut silent = GameLogger::with_verbosity(VerbosityLevel::Silent);
    silent.set_output_mode(OutputMode::Memory);
    let bus = EventBus::with_logger(silent.clone());
    let mut game = GameManager::new(config, [&decks[picks[0]].cards, &decks[picks[1]].cards], bus)?;
    game.set_logger(silent);

    let [p1, p2] = game.player_ids();
    let mut controller1 = settings.p1.build(p1, rng.gen());
    let mut controller2 = settings.p2.build(p2, rng.gen());

    let result = MatchRunner::new(&mut game)
        .with_max_turns(settings.max_turns)
        .run_game(&mut *controller1, &mut *controller2)?;

    Ok(MatchRecord {
        winner_seat: result.winner.map(|w| if w == p1 { 0 } else { 1 }),
        turns: result.turns_played,
        reason: result.end_reason,
        decks: picks,
    })
}

/// Print a human-readable summary
pub fn print_report(stats: &TournamentStats, elapsed: Duration) {
    let total = stats.games_played();
    println!("\n=== Tournament Complete ===");
    println!("Total games played: {total}");
    if stats.failed > 0 {
        println!("Failed games: {}", stats.failed);
    }
    println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    if elapsed.as_secs_f64() > 0.0 {
        println!("Games per second: {:.2}", total as f64 / elapsed.as_secs_f64());
    }
    if total == 0 {
        return;
    }

    let pct = |n: usize| 100.0 * n as f64 / total as f64;
    println!("\n=== Player Position Statistics ===");
    println!("P1 wins: {} ({:.1}%)", stats.p1_wins, pct(stats.p1_wins));
    println!("P2 wins: {} ({:.1}%)", stats.p2_wins, pct(stats.p2_wins));
    println!("Draws: {} ({:.1}%)", stats.draws, pct(stats.draws));
    println!("Average turns: {:.1}", stats.total_turns as f64 / total as f64);

    println!("\n=== End Reasons ===");
    let mut reasons: Vec<_> = stats.end_reasons.iter().collect();
    reasons.sort_by_key(|(reason, _)| format!("{reason:?}"));
    for (reason, count) in reasons {
        println!("  {reason:?}: {count} ({:.1}%)", pct(*count));
    }

    println!("\n=== Deck Win Rates ===");
    for (deck, (wins, games)) in &stats.deck_records {
        if *games > 0 {
            println!(
                "  {deck}: {wins}/{games} ({:.1}%)",
                100.0 * *wins as f64 / *games as f64
            );
        }
    }
}
