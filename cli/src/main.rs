use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use minesweep_core::{
    CellView, Coord, GameConfig, GameController, GameSession, GameStatus, KeyValueStore,
};
use rand::prelude::*;
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use command::{Command, HELP};
use store::FileStore;

mod command;
mod store;

/// Headless minesweeper driver, reads commands from stdin.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// File holding the saved game
    #[arg(long, default_value = "minesweeper-state.json")]
    state: PathBuf,

    /// Rows of the game started when nothing is saved
    #[arg(long, default_value_t = GameConfig::default().rows())]
    rows: Coord,

    /// Columns of the game started when nothing is saved
    #[arg(long, default_value_t = GameConfig::default().cols())]
    cols: Coord,

    /// Mines of the game started when nothing is saved
    #[arg(long, default_value_t = GameConfig::default().mines)]
    mines: u16,
}

fn init_logging(verbose: &Verbosity<WarnLevel>) {
    use tracing_subscriber::filter::LevelFilter;

    let level = match verbose.log_level_filter() {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cell_char(view: CellView) -> char {
    match view {
        CellView { triggered: true, .. } => 'X',
        CellView { is_mine: Some(true), flagged: true, .. } => 'F',
        CellView { is_mine: Some(true), .. } => '*',
        CellView { flagged: true, .. } => 'F',
        CellView { adjacent_count: Some(0), .. } => '.',
        CellView { adjacent_count: Some(count), .. } => char::from(b'0' + count),
        _ => '#',
    }
}

fn render(session: &GameSession) -> String {
    let (rows, cols) = session.size();
    let mut out = String::new();

    let status = match session.status() {
        GameStatus::Active if session.first_move_pending() => "ready",
        GameStatus::Active => "playing",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    };
    let _ = writeln!(
        out,
        "{}x{}, {} mines, {} flags left, {}",
        rows,
        cols,
        session.mine_count(),
        session.flags_remaining(),
        status
    );

    for row in 0..rows {
        for col in 0..cols {
            let ch = session.cell_view((row, col)).map_or('?', cell_char);
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

fn run<S: KeyValueStore>(
    ctl: &mut GameController<S>,
    default_config: GameConfig,
    command: Command,
) -> anyhow::Result<bool> {
    match command {
        Command::NewGame(config) => ctl.new_game(config.unwrap_or(default_config))?,
        Command::Reveal(coords) => {
            let outcome = ctl.reveal(coords)?;
            if let Some(placement) = outcome.placement.filter(|p| p.was_clamped()) {
                println!(
                    "only {} of {} mines fit outside the first click",
                    placement.placed, placement.requested
                );
            }
            log::debug!("{:?}, {} cells changed", outcome.kind, outcome.changed.len());
        }
        Command::Flag(coords) => {
            let outcome = ctl.toggle_flag(coords)?;
            log::debug!("{:?}, {} flags placed", outcome.kind, outcome.flags_placed);
        }
        Command::Load(path) => {
            let data = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            ctl.load_session(&data)?;
        }
        Command::Reset => ctl.reset_session()?,
        Command::Time(secs) => ctl.set_elapsed_secs(secs)?,
        Command::Pause => ctl.set_paused(true)?,
        Command::Resume => ctl.set_paused(false)?,
        Command::Show => {}
        Command::Help => {
            println!("{HELP}");
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    }
    print!("{}", render(ctl.session()));
    Ok(true)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);

    let default_config = GameConfig::new((args.rows, args.cols), args.mines)?;
    let seed = args
        .seed
        .unwrap_or_else(|| SmallRng::from_os_rng().random());
    log::debug!("seed: {}", seed);

    let store = FileStore::open(&args.state)?;
    log::info!("Using saved state at {}", store.path().display());
    let mut ctl = GameController::restore(store, default_config, seed)?;
    print!("{}", render(ctl.session()));

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let keep_going = line
            .parse::<Command>()
            .and_then(|command| run(&mut ctl, default_config, command));
        match keep_going {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => eprintln!("error: {err:#}"),
        }
        std::io::stdout().flush()?;
    }
    Ok(())
}
