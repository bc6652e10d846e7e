use std::env;
use std::io;
use std::path;
use std::process;

use clap::{ArgAction, Parser};
use is_terminal::IsTerminal;
use log::LevelFilter;
use patcher::signature::{DEFAULT_TARGET, ZOOM_LIMIT_MASK, ZOOM_LIMIT_PATTERN};
use patcher::{
    exit_code, ConsoleProgress, Interrupt, NullProgress, PatchError, Progress, ScanError, ScanOutcome, Signature,
};

#[derive(Parser, Debug)]
#[command(name = "ultrawide-patcher")]
#[command(version)]
/// Lifts the hard-coded zoom limits of Terraria so the game renders properly
/// on screens wider or taller than 1920x1200.
///
/// IMPORTANT:
/// The executable is modified in place. A copy named
/// `<file>_backup_<YYYYMMDD_HHMMSS>` is written next to it first, restore
/// that copy by hand to undo the patch.
struct Args {
    #[arg(short)]
    #[arg(long)]
    #[arg(default_value = DEFAULT_TARGET)]
    /// The executable to patch, relative to the current working directory
    file: path::PathBuf,

    #[arg(long)]
    #[arg(default_value = ZOOM_LIMIT_PATTERN)]
    /// Hex bytes to look for, `??` matches any byte
    pattern: String,

    #[arg(long)]
    #[arg(default_value = ZOOM_LIMIT_MASK)]
    /// Hex bytes OR'd into the first match
    mask: String,

    #[arg(short)]
    #[arg(long)]
    /// Don't draw a progress bar
    quiet: bool,

    #[arg(short)]
    #[arg(long)]
    #[arg(action = ArgAction::Count)]
    /// Log more details, can be repeated
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    process::exit(run(&args));
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> i32 {
    let signature = match Signature::parse(&args.pattern, &args.mask) {
        Ok(signature) => signature,
        Err(e) => {
            eprintln!("{}", PatchError::from(e));
            return exit_code::FAILURE;
        }
    };

    let interrupt = Interrupt::new();
    let handler_interrupt = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_interrupt.trigger()) {
        log::warn!("Could not install interrupt handler: {e}");
    }

    let mut progress = select_progress(args.quiet);

    let result = env::current_dir()
        .map_err(PatchError::from)
        .and_then(|cwd| patcher::resolve_target(&cwd, &args.file))
        .and_then(|target| patcher::patch_file(&target, &signature, progress.as_mut(), &interrupt));

    match result {
        Ok(outcome) => {
            match &outcome.scan {
                ScanOutcome::Patched(report) => println!("{report}"),
                ScanOutcome::NotFound => println!("Pattern not found!"),
            }
            outcome.exit_code()
        }
        Err(PatchError::Scan(ScanError::Interrupted)) => {
            eprintln!("Aborted!");
            exit_code::ERROR_PROCESS_ABORTED
        }
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    }
}

/// Only draw a bar when somebody is watching.
fn select_progress(quiet: bool) -> Box<dyn Progress> {
    if !quiet && io::stderr().is_terminal() {
        Box::new(ConsoleProgress::stderr())
    } else {
        Box::new(NullProgress)
    }
}
