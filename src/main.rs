use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use p2rpg::companion::{Companion, CompanionApi, OfflineCompanion};
use p2rpg::config::{GameConfig, GamePaths, default_root};
use p2rpg::decay::DecayTimers;
use p2rpg::error::StartupError;
use p2rpg::game::{Game, Output, OutputBlock, SAVE_EXTENSION, read_save_info, with_save_extension};
use p2rpg::mods::{ModCatalog, ModOutcome, report};
use p2rpg::world::{BaseContent, load_base_content_from_file};

/// A text adventure with an AI companion and folder-based mods.
#[derive(Parser)]
#[command(name = "p2rpg")]
#[command(about = "AI RPG Adventure", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose (debug-level) logging
    #[arg(long)]
    dev: bool,

    /// Data folder holding Saves/ and Mods/
    #[arg(long)]
    root: Option<PathBuf>,

    /// Config file (default: <root>/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base world file replacing the built-in one
    #[arg(long)]
    world: Option<PathBuf>,
}

fn init_logging(dev: bool) {
    let level = if dev {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn flush_output(out: &Output, companion_name: &str) {
    let mut printed_anything = false;
    let mut started_events = false;

    for block in &out.blocks {
        match block {
            OutputBlock::Title(t) => println!("\n{}", t),
            OutputBlock::Text(line) => println!("{}", line),
            OutputBlock::Event(ev) => {
                if !started_events {
                    if printed_anything {
                        println!(); // visual separation before first event
                    }
                    started_events = true;
                }
                println!("* {}", ev);
            }
            OutputBlock::Companion(text) => println!("\n{}: {}", companion_name, text),
        }
        printed_anything = true;
    }
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn print_help() {
    println!("Commands:");
    println!("  look, map, stats, inventory, quests, log");
    println!("  explore, rest, craft, shop, quest, discover");
    println!("  travel <place>, use <slot>");
    println!("  talk <message>, tts on|off");
    println!("  new <name>, save <name>, load <name>, saves");
    println!("  help, quit");
}

fn list_saves(dir: &Path) -> Output {
    let mut out = Output::new();
    out.title("Saved games");

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(SAVE_EXTENSION))
                .collect()
        })
        .unwrap_or_default();
    paths.sort();

    if paths.is_empty() {
        out.say("No saved games.");
    }
    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match read_save_info(&path) {
            Ok(info) => out.say(format!(
                "{}: {} (level {}) at {}, {}",
                stem, info.character.name, info.character.level, info.location.name, info.timestamp
            )),
            Err(e) => out.say(format!("{}: {}", stem, e)),
        }
    }
    out
}

async fn speak_lines<A: CompanionApi>(companion: &Companion<A>, out: &Output) {
    for block in &out.blocks {
        if let OutputBlock::Companion(text) = block {
            companion.speak(text).await;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.dev);

    let mut root = cli.root.clone().unwrap_or_else(default_root);
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| GamePaths::new(&root).config_file());
    let config = GameConfig::load(&config_path)?;
    if cli.root.is_none() {
        if let Some(configured) = &config.root {
            root = configured.clone();
        }
    }
    let paths = GamePaths::new(root);
    info!(root = %paths.root.display(), "using data folder");

    let startup = match p2rpg::prepare(&paths, &ModCatalog::new()) {
        Ok(s) => s,
        Err(StartupError::MissingDependencies(violations)) => {
            eprintln!("Mod dependency error\n\n{}", report(&violations));
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let base = match &cli.world {
        Some(path) => load_base_content_from_file(path)
            .with_context(|| format!("failed to load world file '{}'", path.display()))?,
        None => BaseContent::builtin().context("built-in world is invalid")?,
    };

    for r in &startup.reports {
        if let ModOutcome::Failed(reason) = &r.outcome {
            warn!(mod_name = %r.mod_name, "mod failed: {reason}");
        }
    }

    let mut game = Game::new(base, startup.registry);
    let mut rng = StdRng::from_entropy();
    let mut companion = Companion::new(OfflineCompanion, config.tts_enabled);
    let (mut timers, mut ticks) = DecayTimers::new(config.decay);

    println!("Welcome to AI RPG Adventure!");
    if !startup.mods.is_empty() {
        println!("Loaded {} mod(s).", startup.mods.len());
    }
    println!("What is your character's name?");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let name = lines.next_line().await?.unwrap_or_default();

    let mut out = game.start_new_game(&name);
    let status = companion.check_connection().await;
    out.event(status);
    if let Some(tts) = companion.init_tts().await {
        out.event(tts);
    }
    flush_output(&out, &game.state().companion.name);
    println!("\nType 'help' for commands.\n");
    timers.start();
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nGoodbye.");
                    break;
                };
                let input = line.trim();
                if input.is_empty() {
                    prompt()?;
                    continue;
                }

                let mut parts = input.splitn(2, char::is_whitespace);
                let verb = parts.next().unwrap_or("").to_lowercase();
                let rest = parts.next().unwrap_or("").trim();

                let out = match verb.as_str() {
                    "quit" | "exit" => {
                        println!("Goodbye.");
                        break;
                    }
                    "help" | "h" | "?" => {
                        print_help();
                        Output::new()
                    }
                    "new" => {
                        timers.stop();
                        let out = game.start_new_game(rest);
                        timers.start();
                        out
                    }
                    "save" => {
                        let mut out = game.save_info_lines();
                        let name = if rest.is_empty() { "quicksave" } else { rest };
                        match game.save_to(&paths.saves, name) {
                            Ok(path) => out.event(format!("Game saved to {}.", path.display())),
                            Err(e) => out.event(format!("Failed to save game: {}", e)),
                        }
                        out
                    }
                    "load" => {
                        let name = if rest.is_empty() { "quicksave" } else { rest };
                        let path = with_save_extension(&paths.saves.join(name));
                        timers.stop();
                        let mut out = Output::new();
                        match game.load_file(&path) {
                            Ok(()) => {
                                out.append(game.look());
                                out.event("Game loaded successfully!");
                            }
                            Err(e) => out.event(format!("Failed to load game: {}", e)),
                        }
                        timers.start();
                        out
                    }
                    "saves" => list_saves(&paths.saves),
                    "talk" | "say" | "ask" => {
                        let mut out = Output::new();
                        if rest.is_empty() {
                            out.say("Say what?");
                        } else {
                            out.companion(companion.reply(rest, game.state()).await);
                        }
                        out
                    }
                    "tts" => {
                        let mut out = Output::new();
                        match rest {
                            "on" => companion.set_tts_enabled(true),
                            "off" => {
                                companion.set_tts_enabled(false);
                                companion.stop_speaking().await;
                            }
                            _ => {}
                        }
                        out.say(format!(
                            "Speech is {}.",
                            if companion.tts_enabled() { "on" } else { "off" }
                        ));
                        out
                    }
                    _ => match game.step(input, &mut rng) {
                        Some(out) => out,
                        None => {
                            let mut out = Output::new();
                            out.say("I don't understand that command.");
                            out
                        }
                    },
                };

                flush_output(&out, &game.state().companion.name);
                speak_lines(&companion, &out).await;
                prompt()?;
            }
            Some(tick) = ticks.recv() => {
                if timers.is_current(&tick) {
                    game.apply_decay(tick.stat);
                }
            }
        }
    }

    timers.stop();
    Ok(())
}
