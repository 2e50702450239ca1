use clap::Parser;
use lc3_vm::emulator;
use lc3_vm::hardware::Keyboard;
use lc3_vm::input_relay::{InputRelay, TerminalKeySource};
use lc3_vm::terminal;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Runs an LC-3 program image. Esc, Ctrl+C, Ctrl+D or Ctrl+Q stop the machine.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Program image: big-endian words, the first one is the load address
    program: PathBuf,
}

fn main() -> ExitCode {
    // log level can be raised via RUST_LOG, logs go to stderr
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Warn).env().init() {
        eprintln!("Could not initialize logging: {e}");
    }
    let args = Args::parse();

    let keyboard = Arc::new(Keyboard::new());
    let mut emu = match emulator::from_program(&args.program, Arc::clone(&keyboard)) {
        Ok(emu) => emu,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let raw_lock = terminal::set_terminal_raw();
    let relay = match InputRelay::new(TerminalKeySource, Arc::clone(&keyboard)).spawn() {
        Ok(relay) => relay,
        Err(e) => {
            eprintln!("Could not start input relay: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut stdout = terminal::RawOutput::new(io::stdout().lock());
    let result = emu.execute(&mut stdout);
    keyboard.shutdown();
    match relay.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("Input relay stopped with error: {e}"),
        Err(_) => log::error!("Input relay panicked"),
    }
    drop(stdout);
    drop(raw_lock);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
