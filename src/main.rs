//! Grid Tactics - Main Binary
//!
//! Runs AI-vs-AI matches on the grid from the command line

use clap::{Parser, Subcommand, ValueEnum};
use grid_tactics::{
    board::LayoutRegistry,
    config::GameConfig,
    events::EventBus,
    game::{AnimationBridge, GameLogger, GameManager, MatchRunner, VerbosityLevel},
    loader::{starter_cards, CardDatabase, CardLoader, DeckLoader},
    tournament::{self, NamedDeck, TourneySettings},
    GameError, Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Controller type for AI agents
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Always chooses first meaningful action (for testing)
    Zero,
    /// Makes random choices
    Random,
}

impl From<ControllerType> for tournament::ControllerType {
    fn from(value: ControllerType) -> Self {
        match value {
            ControllerType::Zero => tournament::ControllerType::Zero,
            ControllerType::Random => tournament::ControllerType::Random,
        }
    }
}

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "tactics")]
#[command(about = "Grid Tactics - turn-based card battles on a tile grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match between two AI controllers
    Play {
        /// Deck list for player 1 (default: the starter card set)
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: Option<PathBuf>,

        /// Deck list for player 2 (default: same as player 1)
        #[arg(value_name = "PLAYER2_DECK")]
        deck2: Option<PathBuf>,

        /// JSON card definitions used to resolve deck lists
        #[arg(long, value_name = "CARDS_JSON")]
        cards: Option<PathBuf>,

        /// JSON match configuration
        #[arg(long, value_name = "CONFIG_JSON")]
        config: Option<PathBuf>,

        /// Board layout name (overrides the configuration)
        #[arg(long)]
        layout: Option<String>,

        /// JSON layout definitions to use instead of the built-in ones
        #[arg(long, value_name = "LAYOUTS_JSON")]
        layouts: Option<PathBuf>,

        /// Player 1 controller type
        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        /// Player 2 controller type
        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        /// Set random seed for deterministic testing
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum turns before the match is called a draw
        #[arg(long, default_value_t = 200)]
        max_turns: u32,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,
    },

    /// Run many matches in parallel and report win rates
    Tourney {
        /// Deck lists to enter (default: the starter card set)
        #[arg(value_name = "DECKS")]
        decks: Vec<PathBuf>,

        /// JSON card definitions used to resolve deck lists
        #[arg(long, value_name = "CARDS_JSON")]
        cards: Option<PathBuf>,

        /// Number of matches to play
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        /// Tournament seed; per-match seeds are derived from it
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Layouts to draw from (repeatable)
        #[arg(long = "layout", default_value = "classic")]
        layouts: Vec<String>,

        /// Player 1 controller type
        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        /// Player 2 controller type
        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        /// Maximum turns before a match is called a draw
        #[arg(long, default_value_t = 200)]
        max_turns: u32,
    },

    /// List the built-in board layouts
    Layouts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            deck1,
            deck2,
            cards,
            config,
            layout,
            layouts,
            p1,
            p2,
            seed,
            max_turns,
            verbosity,
        } => run_play(PlayArgs {
            deck1,
            deck2,
            cards,
            config,
            layout,
            layouts,
            p1,
            p2,
            seed,
            max_turns,
            verbosity: verbosity.into(),
        })?,
        Commands::Tourney {
            decks,
            cards,
            games,
            seed,
            layouts,
            p1,
            p2,
            max_turns,
        } => {
            let db = load_database(cards.as_deref())?;
            let entries = if decks.is_empty() {
                vec![NamedDeck {
                    name: "starter".to_string(),
                    cards: starter_cards(),
                }]
            } else {
                decks
                    .iter()
                    .map(|path| {
                        Ok(NamedDeck {
                            name: deck_name(path),
                            cards: load_deck(&db, path)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            };
            let settings = TourneySettings {
                games,
                seed,
                p1: p1.into(),
                p2: p2.into(),
                max_turns,
                layouts,
                ..Default::default()
            };

            println!("=== Grid Tactics - Tournament Mode ===\n");
            println!("Decks: {}", entries.len());
            println!("Games: {games}  Seed: {seed}");
            let start = std::time::Instant::now();
            let stats = tournament::run_tourney(&settings, &entries)?;
            tournament::print_report(&stats, start.elapsed());
        }
        Commands::Layouts => {
            let registry = LayoutRegistry::builtin();
            for name in registry.names() {
                let layout = registry.get(name)?;
                let towers = if layout.has_towers() { "towers" } else { "no towers" };
                println!("{name}: {}x{} ({towers})", layout.rows, layout.cols);
            }
        }
    }

    Ok(())
}

struct PlayArgs {
    deck1: Option<PathBuf>,
    deck2: Option<PathBuf>,
    cards: Option<PathBuf>,
    config: Option<PathBuf>,
    layout: Option<String>,
    layouts: Option<PathBuf>,
    p1: ControllerType,
    p2: ControllerType,
    seed: Option<u64>,
    max_turns: u32,
    verbosity: VerbosityLevel,
}

fn run_play(args: PlayArgs) -> Result<()> {
    let verbosity = args.verbosity;
    if verbosity >= VerbosityLevel::Minimal {
        println!("=== Grid Tactics ===\n");
    }

    let mut config = match &args.config {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(layout) = args.layout {
        config = config.with_layout(layout);
    }
    // Without an explicit seed, matches differ from run to run
    config = config.with_seed(args.seed.unwrap_or_else(rand::random));

    let db = load_database(args.cards.as_deref())?;
    let deck1 = match &args.deck1 {
        Some(path) => load_deck(&db, path)?,
        None => starter_cards(),
    };
    let deck2 = match &args.deck2 {
        Some(path) => load_deck(&db, path)?,
        None => deck1.clone(),
    };

    let registry = match &args.layouts {
        Some(path) => LayoutRegistry::load_from_file(path)?,
        None => LayoutRegistry::builtin(),
    };
    let layout = registry.get(&config.layout)?.clone();

    if verbosity >= VerbosityLevel::Normal {
        println!("Layout: {} ({}x{})", layout.name, layout.rows, layout.cols);
        println!("Seed: {}", config.seed);
        println!("Decks: {} vs {} cards\n", deck1.len(), deck2.len());
    }

    let logger = GameLogger::with_verbosity(verbosity);
    let bus = EventBus::with_logger(logger.clone());
    let mut game = GameManager::with_layout(config.clone(), &layout, [&deck1, &deck2], bus.clone())?;
    game.set_logger(logger);

    let [p1_id, p2_id] = game.player_ids();
    let mut controller1 = tournament::ControllerType::from(args.p1).build(p1_id, config.seed);
    let mut controller2 = tournament::ControllerType::from(args.p2).build(p2_id, config.seed.wrapping_add(1));

    let result = MatchRunner::new(&mut game)
        .with_max_turns(args.max_turns)
        .with_animations(AnimationBridge::disabled(&bus))
        .with_verbosity(verbosity)
        .run_game(&mut *controller1, &mut *controller2)?;

    if verbosity >= VerbosityLevel::Minimal {
        println!("\n=== Game Over ===");
        match result.winner {
            Some(winner_id) => println!("Winner: {}", game.player(winner_id)?.name),
            None => println!("Game ended in a draw"),
        }
        println!("Turns played: {}", result.turns_played);
        println!("Actions taken: {}", result.actions_taken);
        println!("Reason: {:?}", result.end_reason);

        println!("\n=== Final State ===");
        for player in game.players() {
            println!("  {}: {} health", player.name, player.health);
        }
        for tower in game.board().towers() {
            println!("  Tower {} at {}: {} hp", tower.id, tower.position, tower.hp.max(0));
        }
    }

    Ok(())
}

fn load_database(cards: Option<&Path>) -> Result<CardDatabase> {
    match cards {
        Some(path) => Ok(CardDatabase::from_cards(&CardLoader::load_from_file(path)?)),
        None => Ok(CardDatabase::from_cards(&starter_cards())),
    }
}

fn load_deck(db: &CardDatabase, path: &Path) -> Result<Vec<Arc<grid_tactics::core::Card>>> {
    let list = DeckLoader::load_from_file(path)?;
    if list.total_cards() == 0 {
        return Err(GameError::InvalidCardData(format!("deck {} is empty", path.display())));
    }
    db.build_deck(&list)
}

fn deck_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
