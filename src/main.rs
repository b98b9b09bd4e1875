/*!
`mincpu`: command-line host for the Minimal CPU System simulator.

Parses a flash image path (plus optional pacing/verbosity flags), boots a
`System`, and drives `Step` in a loop that never returns on its own — per
§1, "the simulator prints UART output and terminates only externally."
Everything here is host glue (§10.4): the CLI (`config`), logging setup,
and a best-effort stdin-to-UART feed. None of it is simulated hardware.
*/

use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::info;

use mincpu::config::{self, RunConfig};
use mincpu::error::SimError;
use mincpu::system::System;

fn main() {
    let args = std::env::args().skip(1);
    if let Err(err) = run(args) {
        eprintln!("mincpu: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run(args: impl IntoIterator<Item = String>) -> Result<(), SimError> {
    let config = config::parse_args(args)?;

    env_logger::Builder::new().filter_level(config.log_level()).init();

    let flash = std::fs::read(&config.flash).map_err(|source| SimError::FlashIoError {
        path: config.flash.clone(),
        source,
    })?;

    let mut system = System::new();
    system.load_flash(&flash)?;
    info!("loaded flash image {:?} ({} bytes)", config.flash, flash.len());

    let stdin_feed = spawn_stdin_feed();
    pace(&mut system, &config, stdin_feed.as_ref())
}

/// Drive `System::step` forever, in batches of `RunConfig::rate` (or one
/// step at a time if unset), sleeping briefly between batches only when a
/// rate cap is configured. Draining the stdin feed once per batch is the
/// "reserved for future host integration" UART input path from §4.6/§6.
fn pace(system: &mut System, config: &RunConfig, stdin_feed: Option<&mpsc::Receiver<u8>>) -> Result<(), SimError> {
    let batch = config.rate.unwrap_or(1);
    loop {
        if let Some(rx) = stdin_feed {
            while let Ok(byte) = rx.try_recv() {
                system.push_uart_input(byte);
            }
        }
        for _ in 0..batch {
            system.step()?;
        }
        if config.rate.is_some() {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Spawn a background reader draining stdin into a channel, but only when
/// stdin is piped rather than an interactive TTY — an interactive terminal
/// is left unread so the run loop never blocks waiting on a human.
fn spawn_stdin_feed() -> Option<mpsc::Receiver<u8>> {
    use std::io::IsTerminal;
    if std::io::stdin().is_terminal() {
        return None;
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut stdin = std::io::stdin();
        let mut byte = [0u8; 1];
        loop {
            match stdin.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(byte[0]).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    Some(rx)
}
