// famicore - trace-runner entry point
//
// Loads an iNES ROM named on the command line and interprets it until the
// CPU faults or jams, optionally printing a nestest-style trace line per
// instruction. Rendering, audio, and input have no home here; this binary
// exists to drive the core and watch it think.

use std::process::ExitCode;

use log::error;

use famicore::cpu::CpuError;
use famicore::Emulator;

fn main() -> ExitCode {
    env_logger::init();

    let Some(rom_path) = std::env::args().nth(1) else {
        eprintln!("usage: famicore <rom.nes>");
        return ExitCode::FAILURE;
    };

    let mut emulator = Emulator::new();
    if let Err(err) = emulator.load_rom(&rom_path) {
        error!("{}: {}", rom_path, err);
        return ExitCode::FAILURE;
    }

    let trace = emulator.config().execution.trace;
    let limit = emulator.config().execution.max_trace_instructions;
    let mut executed: u64 = 0;

    loop {
        if trace {
            println!("{}", emulator.cpu().trace());
        }

        if let Err(err) = emulator.step() {
            match err {
                CpuError::CpuJam { .. } => {
                    // A JAM is a legitimate program ending on this core
                    error!("{}", err);
                    return ExitCode::SUCCESS;
                }
                other => {
                    error!("{}", other);
                    return ExitCode::FAILURE;
                }
            }
        }

        executed += 1;
        if limit != 0 && executed >= limit {
            return ExitCode::SUCCESS;
        }
    }
}
