//! # Delver Main Entry Point
//!
//! Generates a dungeon, lets the autoexplore pilot play it for a number of
//! turns and prints what happened.

use clap::Parser;
use delver::{
    Autoexplore, DelverResult, DungeonMap, GameCompletionState, GameState, GameStatistics,
    GenerationConfig, Position,
};
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;

/// Command line arguments for the Delver simulation.
#[derive(Parser, Debug)]
#[command(name = "delver")]
#[command(about = "Headless turn-based dungeon simulation")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Player turns to simulate
    #[arg(short, long, default_value_t = 200)]
    turns: u32,

    /// Map width in cells
    #[arg(long)]
    width: Option<i32>,

    /// Map height in cells
    #[arg(long)]
    height: Option<i32>,

    /// Room placement attempts
    #[arg(long)]
    max_rooms: Option<u32>,

    /// Generation config as JSON; flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Print the final map
    #[arg(long)]
    show_map: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// End-of-run report.
#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    turns_played: u32,
    completion_state: GameCompletionState,
    player_health: i32,
    player_gold: i32,
    monsters_left: usize,
    explored_cells: usize,
    statistics: GameStatistics,
    messages: Vec<String>,
}

fn main() {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Delver v{}", delver::VERSION);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .try_init();
}

/// Builds the generation config from the optional file and the flags.
fn load_config(args: &Args) -> DelverResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => GenerationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(max_rooms) = args.max_rooms {
        config.max_rooms = max_rooms;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> DelverResult<()> {
    let config = load_config(args)?;
    let mut game = GameState::new(config)?;
    let pilot = Autoexplore::new();

    let mut turns_played = 0;
    for _ in 0..args.turns {
        if game.is_game_over() {
            break;
        }
        let action = pilot.next_action(&game);
        if game.apply_player_action(action)?.consumed_turn() {
            turns_played += 1;
        }
    }
    info!(
        "simulation finished after {} turns: {:?}",
        turns_played, game.completion_state
    );

    let summary = summarize(&game, turns_played);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if args.show_map {
        println!("{}", render_map(game.map()));
    }

    Ok(())
}

fn summarize(game: &GameState, turns_played: u32) -> Summary {
    let map = game.map();
    let (player_health, player_gold) = game
        .player()
        .map(|player| (player.stats.health, player.stats.gold))
        .unwrap_or_default();

    Summary {
        seed: game.config().seed,
        turns_played,
        completion_state: game.completion_state,
        player_health,
        player_gold,
        monsters_left: map.monsters().count(),
        explored_cells: map.cells().filter(|(_, cell)| cell.explored).count(),
        statistics: game.statistics.clone(),
        messages: game.message_log().lines().map(str::to_string).collect(),
    }
}

fn print_summary(summary: &Summary) {
    for line in &summary.messages {
        println!("{}", line);
    }
    println!();
    println!("seed:             {}", summary.seed);
    println!("turns played:     {}", summary.turns_played);
    println!("outcome:          {:?}", summary.completion_state);
    println!("health:           {}", summary.player_health);
    println!("gold:             {}", summary.player_gold);
    println!("monsters killed:  {}", summary.statistics.enemies_defeated);
    println!("monsters left:    {}", summary.monsters_left);
    println!("explored cells:   {}", summary.explored_cells);
}

/// Draws the explored part of the map as text.
fn render_map(map: &DungeonMap) -> String {
    let mut out = String::new();

    for y in 0..map.height() {
        for x in 0..map.width() {
            let pos = Position::new(x, y);
            let glyph = match map.actor_at(pos) {
                Some(actor) if map.is_in_fov(pos) || actor.is_player() => actor.symbol,
                _ if !map.is_explored(pos) => ' ',
                _ if map.is_transparent(pos) => '.',
                _ => '#',
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    out
}
