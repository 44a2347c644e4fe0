// ABOUTME: Entry point for the chirp application.
// ABOUTME: Parses CLI args and launches the TUI or runs subcommands.

use chirp_core::Config;
use chirp_tui::cli::{self, Cli, Command, ThemeAction};
use chirp_tui::error::Result;
use chirp_tui::{open_store, run_tui};
use clap::{CommandFactory, Parser};
use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
use rand::seq::SliceRandom;
use std::future::Future;
use std::io::Write;

const GOODBYES: &[&str] = &[
    "See you soon!",
    "Until next time!",
    "Goodbye for now!",
    "Catch you later!",
    "Talk soon!",
];

fn print_exit_message() {
    let mut rng = rand::thread_rng();
    let goodbye = GOODBYES.choose(&mut rng).unwrap_or(&"See you soon!");

    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout);
    let _ = write!(stdout, "  {}", SetForegroundColor(Color::Blue));
    let _ = write!(stdout, "{}", SetAttribute(Attribute::Bold));
    let _ = write!(stdout, "chirp");
    let _ = write!(stdout, "{}", SetAttribute(Attribute::Reset));
    let _ = write!(stdout, "{}", ResetColor);
    let _ = write!(stdout, "  {}", SetForegroundColor(Color::DarkGrey));
    let _ = write!(stdout, "{}", goodbye);
    let _ = writeln!(stdout, "{}", ResetColor);
    let _ = writeln!(stdout);
}

/// Run a future on a fresh runtime, exiting with status 1 on failure
fn block_on<F>(future: F)
where
    F: Future<Output = Result<()>>,
{
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(future) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs go to a file
    if cli.command.is_none() {
        chirp_log::init_file("chirp");
    } else {
        chirp_log::init();
    }

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            std::process::exit(1);
        }
    };
    config.apply_env();
    config.apply_overrides(cli.theme.as_deref(), cli.data_dir.as_deref());

    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Some(Command::Version) => {
            println!("chirp {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Command::Config { action }) => {
            if let Err(e) = cli::config::run(action, &config) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Command::Send { message }) => {
            block_on(cli::send::run(&config, &message));
        }
        Some(Command::Themes { action }) => {
            let store = open_store(&config);
            match action.unwrap_or(ThemeAction::List) {
                ThemeAction::List => {
                    block_on(cli::themes::list_themes(&config, store.as_ref()));
                }
                ThemeAction::Set { name } => {
                    block_on(cli::themes::set_theme(&config, store.as_ref(), &name));
                }
            }
        }
        Some(Command::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "chirp", &mut std::io::stdout());
        }
        None => {
            block_on(run_tui(&config));
            print_exit_message();
        }
    }
}
