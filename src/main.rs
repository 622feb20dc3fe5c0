use clap::{Parser, Subcommand};
use sap1::asm::assemble;
use sap1::dev::DeviceId;
use sap1::sim::Machine;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

//===========================================================================//

#[derive(Parser)]
#[clap(author, about, long_about = None, version)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assembles a source file and prints the resulting RAM image.
    Asm {
        /// The assembly source file.
        source: PathBuf,
    },
    /// Assembles a source file and runs it until the machine halts.
    Run {
        /// The assembly source file.
        source: PathBuf,
        /// Gives up if the machine has not halted after this many pulses.
        #[clap(long, default_value_t = 10_000)]
        max_pulses: u64,
        /// Logs every clock pulse to stderr.
        #[clap(long)]
        trace: bool,
    },
}

//===========================================================================//

fn main() -> io::Result<ExitCode> {
    let cli = Cli::parse();
    let trace = matches!(cli.command, Command::Run { trace: true, .. });
    init_logging(trace);
    match cli.command {
        Command::Asm { source } => {
            let Some(image) = assemble_file(&source)? else {
                return Ok(ExitCode::FAILURE);
            };
            let hex: Vec<String> =
                image.iter().map(|byte| format!("{byte:02x}")).collect();
            println!("{}", hex.join(" "));
        }
        Command::Run { source, max_pulses, .. } => {
            let Some(image) = assemble_file(&source)? else {
                return Ok(ExitCode::FAILURE);
            };
            let mut machine = match Machine::with_program(&image) {
                Ok(machine) => machine,
                Err(error) => {
                    eprintln!("{}: {error}", source.display());
                    return Ok(ExitCode::FAILURE);
                }
            };
            let result = machine.run_with(max_pulses, |machine, pulse| {
                if pulse.taken && pulse.step.sink == Some(DeviceId::Output) {
                    println!("{}", machine.output());
                }
            });
            println!("{}", machine.description());
            match result {
                Ok(pulses) => println!("halted after {pulses} clock pulses"),
                Err(error) => {
                    eprintln!("{}: {error}", source.display());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(trace: bool) {
    let directive = if trace { "sap1=trace" } else { "sap1=warn" };
    let filter = EnvFilter::from_default_env().add_directive(
        directive.parse().unwrap_or_else(|_| LevelFilter::WARN.into()),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reads and assembles a source file.  Assembly errors are printed to stderr
/// and result in `None`; I/O errors are propagated.
fn assemble_file(path: &Path) -> io::Result<Option<Vec<u8>>> {
    let source = std::fs::read_to_string(path)?;
    match assemble(&source) {
        Ok(image) => Ok(Some(image)),
        Err(errors) => {
            for error in errors {
                eprintln!("{}: {error}", path.display());
            }
            Ok(None)
        }
    }
}

//===========================================================================//
