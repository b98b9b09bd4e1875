/*!
`RunConfig`: the ambient, process-level configuration the CLI parses before
any simulated hardware exists. This is never visible to the microcode; it
only decides which flash image to load, how fast the host paces `Step`
calls, and how chatty `log` should be.

The flag set and exit codes are pinned to §6 of the board's own CLI
contract (`-h`/`-help`/`-?` print usage and exit 0; an unknown flag or a
missing positional exits 1), which predates `clap`'s own `--help`
conventions and doesn't match them (single-dash multi-letter spellings,
exit 0 on help rather than clap's exit 0 only for `--help`/`-h`). So the
legacy spellings are recognized by hand before handing the rest of the
argument list to a `clap` derive parser with its own help flag disabled.
*/

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::error::SimError;

const PROGRAM_NAME: &str = "mincpu";

fn usage() -> String {
    format!("usage: {PROGRAM_NAME} [-v]... [--rate N] <flash.bin>")
}

#[derive(Debug, Parser)]
#[command(name = "mincpu", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Path to a 524,288-byte flash image (16 banks of 32 KiB).
    flash: PathBuf,

    /// Instructions to run per pacing batch before a `--rate`-driven sleep;
    /// omitted or absent means run unbounded, one batch at a time.
    #[arg(long = "rate", value_name = "N")]
    rate: Option<u64>,

    /// Raise log verbosity; repeatable (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Process-level configuration parsed from argv. Never simulated hardware
/// state — see the module doc comment.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub flash: PathBuf,
    pub rate: Option<u64>,
    pub verbose: u8,
}

impl RunConfig {
    /// The `log::LevelFilter` implied by the `-v` count: warnings and
    /// errors by default, rising to info/debug/trace as `-v` repeats.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Parse `argv[1..]` into a `RunConfig`, or exit the process directly for
/// the legacy help spellings (matching the original's own `exit` calls —
/// see §6 and `original_source/main.cpp`'s argument loop).
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<RunConfig, SimError> {
    let args: Vec<String> = args.into_iter().collect();

    if args.iter().any(|a| matches!(a.as_str(), "-h" | "-help" | "-?")) {
        println!("{}", usage());
        std::process::exit(0);
    }

    let with_program_name = std::iter::once(PROGRAM_NAME.to_string()).chain(args.iter().cloned());
    let cli = Cli::try_parse_from(with_program_name).map_err(|err| classify(err, &args))?;

    Ok(RunConfig {
        flash: cli.flash,
        rate: cli.rate,
        verbose: cli.verbose,
    })
}

fn classify(err: clap::Error, args: &[String]) -> SimError {
    use clap::error::ErrorKind;
    match err.kind() {
        ErrorKind::MissingRequiredArgument => SimError::MissingFlashArgument,
        _ => {
            let bad = args
                .iter()
                .find(|a| a.starts_with('-'))
                .cloned()
                .unwrap_or_else(|| err.to_string());
            SimError::UnknownArgument(bad)
        }
    }
}
