//! Service routines reached via the TRAP instruction.
//!
//! Every routine returns `ControlFlow::Continue` to keep executing and `ControlFlow::Break`
//! to stop the machine, with `Ok` for a regular halt.
use crate::errors::ExecutionError;
use crate::hardware::keyboard::KEYBOARD_POLL_INTERVAL;
use crate::hardware::memory::{Memory, MemoryMappedIOLocations};
use crate::hardware::registers::Registers;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;

/// Trap vectors, the lowest 8 bits of a TRAP instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapVector {
    GetC = 0x20,
    Out = 0x21,
    PutS = 0x22,
    In = 0x23,
    PutSp = 0x24,
    Halt = 0x25,
}

/// Runs the service routine for `vector`, unknown vectors are ignored.
pub fn dispatch(
    vector: u8,
    regs: &mut Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    let Some(trap) = TrapVector::n(vector) else {
        log::debug!("Ignoring unknown trap vector {vector:#04X}");
        return ControlFlow::Continue(());
    };
    match trap {
        TrapVector::GetC => get_c(regs, mem),
        TrapVector::Out => out(regs, stdout),
        TrapVector::PutS => put_s(regs, mem, stdout),
        TrapVector::In => in_trap(regs, mem, stdout),
        TrapVector::PutSp => put_sp(regs, mem, stdout),
        TrapVector::Halt => halt(stdout),
    }
}

/// Takes the next key, a key already delivered to the keyboard data register comes first.
/// Returns `None` if the keyboard was shut down while waiting.
fn read_key(mem: &mut Memory) -> Option<u16> {
    if mem.read(MemoryMappedIOLocations::Kbsr as u16) & Memory::KEYBOARD_READY != 0 {
        return Some(mem.read(MemoryMappedIOLocations::Kbdr as u16));
    }
    mem.keyboard().wait_pop(KEYBOARD_POLL_INTERVAL)
}

fn read_character_from_console(
    regs: &mut Registers,
    mem: &mut Memory,
) -> ControlFlow<Result<(), ExecutionError>, u8> {
    read_key(mem).map_or_else(
        || {
            log::info!("Keyboard shut down while waiting for input");
            ControlFlow::Break(Ok(()))
        },
        |key| {
            let c = key.to_le_bytes()[0];
            regs.set(0, u16::from(c));
            ControlFlow::Continue(c)
        },
    )
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
/// Blocks until a key is available.
pub fn get_c(regs: &mut Registers, mem: &mut Memory) -> ControlFlow<Result<(), ExecutionError>> {
    read_character_from_console(regs, mem)?;
    ControlFlow::Continue(())
}

/// IN: Read a single character echoed back to the console.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    let c = read_character_from_console(regs, mem)?;
    write_out(&[c], stdout)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    write_out(&[regs.get(0).to_le_bytes()[0]], stdout)
}

fn put_one_char_per_u16(input: u16, append_to: &mut Vec<u8>) -> ControlFlow<()> {
    if input == 0 {
        return ControlFlow::Break(());
    }
    append_to.push(input.to_le_bytes()[0]);
    ControlFlow::Continue(())
}

fn put_two_chars_per_u16(input: u16, append_to: &mut Vec<u8>) -> ControlFlow<()> {
    for c in input.to_le_bytes() {
        if c == 0 {
            return ControlFlow::Break(());
        }
        append_to.push(c);
    }
    ControlFlow::Continue(())
}

fn put(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
    handle_word: fn(u16, &mut Vec<u8>) -> ControlFlow<()>,
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0);
    let mut s = Vec::with_capacity(120);
    // at most one pass over the address space if no terminator is found
    for _ in 0..=u16::MAX {
        if handle_word(mem.peek(address), &mut s).is_break() {
            break;
        }
        address = address.wrapping_add(1);
    }
    write_out(&s, stdout)
}

/// PUTS: print null-delimited string starting at register 0's address, one character per word.
pub fn put_s(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// Writing terminates at the first 0x00 byte, low or high.
pub fn put_sp(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: End program execution.
pub fn halt(stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    log::info!("Program halted");
    match stdout.flush() {
        Ok(()) => ControlFlow::Break(Ok(())),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn write_out(data: &[u8], stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    match stdout.write_all(data).and_then(|()| stdout.flush()) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, ()> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}
