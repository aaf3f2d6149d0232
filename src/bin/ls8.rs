use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use ls8::{load_program, Machine, MachineSnapshot, RunState, Timer, Tracer, Verbosity};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Emulator for the LS-8 8-bit machine", long_about = None)]
struct Args {
    /// Program image: text, one binary byte per line, `#` comments
    #[arg(required_unless_present = "load_state")]
    program: Option<PathBuf>,

    /// Increase diagnostics on stderr: -v events, -vv per-cycle trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Timer interrupt period in clock units (one unit is one second)
    #[arg(long, default_value_t = 1)]
    timer_period: u64,

    /// Disable the timer interrupt source
    #[arg(long, action = ArgAction::SetTrue)]
    no_timer: bool,

    /// Give up if the program has not halted after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Resume from a state dump instead of booting a program image
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write the final machine state as JSON on exit, fatal or not
    #[arg(long)]
    dump_state: Option<PathBuf>,
}

/// Boots from a state dump or a program image; returns the machine plus the
/// path it came from, for fault messages.
fn boot(args: &Args) -> Result<(Machine, String)> {
    if let Some(path) = args.load_state.as_ref() {
        let snapshot = MachineSnapshot::load(path)
            .with_context(|| format!("failed to load state dump {}", path.display()))?;
        let machine = Machine::from_snapshot(&snapshot)?;
        return Ok((machine, path.display().to_string()));
    }
    let path = args.program.as_deref().context("missing program image path")?;
    let image =
        load_program(path).with_context(|| format!("failed to load {}", path.display()))?;
    let machine = Machine::new(&image)
        .with_context(|| format!("program {} does not fit in memory", path.display()))?;
    Ok((machine, path.display().to_string()))
}

fn run(args: &Args) -> Result<()> {
    let (machine, source) = boot(args)?;
    let mut machine = machine.with_tracer(Tracer::new(Verbosity::from(args.verbose)));
    if args.no_timer {
        machine = machine.with_timer(None);
    } else if args.load_state.is_none() {
        // A resumed machine keeps the timer deadline it was dumped with.
        machine = machine.with_timer(Some(Timer::new(args.timer_period)));
    }

    let outcome = match args.max_cycles {
        Some(limit) => machine.run_for(limit),
        None => machine.run().map(|()| RunState::Halted),
    };

    // The dump happens before the fault propagates so a crashed run still
    // leaves its state behind.
    if let Some(path) = args.dump_state.as_ref() {
        machine
            .snapshot()
            .save(path)
            .with_context(|| format!("failed to write state dump {}", path.display()))?;
    }

    let state = outcome.with_context(|| format!("fault in {source}"))?;
    if state == RunState::Running {
        bail!(
            "program did not halt within {} cycles",
            args.max_cycles.unwrap_or_default()
        );
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("ls8: {err:#}");
        std::process::exit(1);
    }
}
