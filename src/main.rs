//! drydock, a Halite III bot.
//!
//! Reads the game engine's init and frame messages from stdin and answers
//! each frame with one line of commands on stdout. Logs go to stderr.
//!
//! Usage: `drydock [seed] [tunables.json]`

use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use tracing::{error, info, warn};

use drydock::engine::{Engine, BOT_NAME};
use drydock::logging::init_logging;
use drydock::protocol::{format_commands, InputReader, ProtocolError};
use drydock::tunables::{Bucket, TunableTable, TURN_BUDGET_MS};

/// Runs the bot until the engine closes stdin.
fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = match args.first() {
        Some(s) => match s.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!(arg = %s, "seed is not a number, seeding from entropy");
                None
            }
        },
        None => None,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = InputReader::new(stdin.lock());
    let mut out = io::BufWriter::new(stdout.lock());

    let mut state = match input.read_init() {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to read game init");
            process::exit(1);
        }
    };

    let table = match args.get(1) {
        Some(path) => TunableTable::load(Path::new(path)).unwrap_or_else(|e| {
            warn!(error = %e, "using built-in tunables");
            TunableTable::default()
        }),
        None => TunableTable::default(),
    };
    let bucket = Bucket::for_state(&state);
    let tunables = table.select(bucket);
    let budget_ms = tunables.lookup(TURN_BUDGET_MS);
    info!(
        my_id = state.my_id,
        players = bucket.players,
        map_size = bucket.map_size,
        abundance = bucket.abundance,
        seed = ?seed,
        "game started"
    );

    let mut engine = Engine::new(tunables, seed);

    if writeln!(out, "{}", BOT_NAME).and_then(|_| out.flush()).is_err() {
        error!("failed to write bot name");
        process::exit(1);
    }

    loop {
        match input.read_frame(&mut state) {
            Ok(()) => {}
            Err(ProtocolError::Eof) => {
                info!(turn = state.turn, "input closed");
                break;
            }
            Err(e) => {
                error!(turn = state.turn, error = %e, "failed to read frame");
                break;
            }
        }

        let started = Instant::now();
        let commands = engine.play_turn(&state);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if elapsed_ms > budget_ms {
            warn!(turn = state.turn, elapsed_ms, budget_ms, "turn over budget");
        }

        if writeln!(out, "{}", format_commands(&commands))
            .and_then(|_| out.flush())
            .is_err()
        {
            error!(turn = state.turn, "failed to write commands");
            break;
        }
    }
}
