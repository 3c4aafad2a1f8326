mod app;
mod config;
mod dragdrop;
mod error;
mod games;
mod modal;
mod scene;
mod sound;
mod terminal;

use app::Screen;
use config::AppConfig;
use error::{GameError, Result};
use sound::{Cue, CuePlayer, TerminalChime};
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::time::{Duration, Instant};

const LOG_FILE_ENV: &str = "KID_GAMES_LOG";
const CUE_GAP: Duration = Duration::from_millis(700);

fn main()
{
    init_logging();
    if let Err(err) = run() {
        log::error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to the file named by `KID_GAMES_LOG` at info level, or to stderr
/// when only `RUST_LOG` is set. Nothing is logged otherwise.
fn init_logging()
{
    let mut builder = env_logger::Builder::new();
    match env::var(LOG_FILE_ENV).ok().and_then(|path| File::create(path).ok()) {
        Some(file) => {
            builder
                .filter_level(log::LevelFilter::Info)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.parse_default_env().init();
}

fn run() -> Result<()>
{
    let mut args = env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();
    match command.as_deref() {
        None => app::run(AppConfig::from_args(&rest)?, Screen::Menu),
        Some("list") => {
            list_games();
            Ok(())
        }
        Some("sound-check") => sound_check(),
        Some("-h") | Some("--help") => {
            print_help();
            Ok(())
        }
        Some(name) => {
            if let Some(screen) = Screen::from_name(name) {
                return app::run(AppConfig::from_args(&rest)?, screen);
            }
            if name.starts_with("--") {
                let mut all = vec![name.to_string()];
                all.extend(rest);
                return app::run(AppConfig::from_args(&all)?, Screen::Menu);
            }
            Err(GameError::UnknownCommand(name.to_string()))
        }
    }
}

/// Plays every cue through the terminal bell, printing its notes.
fn sound_check() -> Result<()>
{
    let mut stdout = io::stdout();
    let mut chime = TerminalChime::new();
    for cue in Cue::ALL {
        let notes: Vec<String> = cue
            .notes()
            .iter()
            .map(|note| format!("{} {:?} +{}ms", note.pitch, note.length, note.offset.as_millis()))
            .collect();
        writeln!(stdout, "{:<8} {}", cue.name(), notes.join(", "))?;
        chime.play(cue);
        while !chime.is_idle() {
            chime.pump(&mut stdout, Instant::now())?;
            std::thread::sleep(Duration::from_millis(1));
        }
        std::thread::sleep(CUE_GAP);
    }
    Ok(())
}

fn list_games()
{
    println!("Available games:");
    for game in games::registry() {
        println!("  {:<8} {} {} - {}", game.name, game.emoji, game.title, game.description);
    }
}

fn print_help()
{
    println!("kid-games");
    println!("\nUsage:");
    println!("  kid-games [--drag=touch|pointer] [--mute] [--seed=N]");
    println!("  kid-games list");
    println!("  kid-games robot|toys|recipe [options]");
    println!("  kid-games sound-check");
    println!("\nOptions:");
    println!("  --drag=touch    Drag a copy that follows the cursor, dimming the original (default)");
    println!("  --drag=pointer  Hide the item while it is dragged");
    println!("  --mute          Silence all sound cues");
    println!("  --seed=N        Fixed seed for shuffles and robot placement");
    println!("\nEnvironment:");
    println!("  KID_GAMES_DRAG  Default drag style (touch or pointer)");
    println!("  KID_GAMES_LOG   Write logs to this file (RUST_LOG sets the filter)");
}
