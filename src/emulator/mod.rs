//! The control unit: loads programs and runs the fetch, decode, execute cycle.
pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

use crate::emulator::instruction::{Instruction, Opcode};
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::Keyboard;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::fs;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

/// Run state of the control unit.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MachineState {
    Running,
    /// Reached by the HALT trap or a termination key.
    Halted,
}

/// The public facing emulator used to run LC-3 programs.
#[derive(Debug)]
pub struct Emulator {
    pub(crate) memory: Memory,
    pub(crate) registers: Registers,
    state: MachineState,
}

/// Reads the program image at `path` and creates an [`Emulator`] with the program loaded.
///
/// # Errors
/// - path does not exist, is a directory or cannot be read
/// - Program is missing valid .ORIG header or has an odd number of bytes
pub fn from_program(
    path: impl AsRef<Path>,
    keyboard: Arc<Keyboard>,
) -> Result<Emulator, LoadProgramError> {
    let path = path.as_ref();
    if path.is_dir() {
        return Err(LoadProgramError::ProgramPathIsDirectory {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            LoadProgramError::ProgramFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadProgramError::ProgramFileReadError {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let mut emu = Emulator::new(keyboard);
    let (origin, count) = emu.memory.load_program_bytes(&bytes)?;
    log::info!("Loaded {count} words from {} at {origin:#06X}", path.display());
    Ok(emu)
}

/// Creates an [`Emulator`] from a program given as words, the first one being the `.ORIG` header.
///
/// # Errors
/// - Program is missing valid .ORIG header
pub fn from_program_words(
    program: &[u16],
    keyboard: Arc<Keyboard>,
) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new(keyboard);
    emu.load_program(program)?;
    Ok(emu)
}

impl Emulator {
    /// Machine with zeroed memory, registers in power-on state and `Running`.
    #[must_use]
    pub fn new(keyboard: Arc<Keyboard>) -> Self {
        Self {
            memory: Memory::new(keyboard),
            registers: Registers::new(),
            state: MachineState::Running,
        }
    }

    /// Loads a program with its `.ORIG` header into memory. PC is not changed.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), LoadProgramError> {
        let (origin, count) = self.memory.load_program(program)?;
        log::info!("Loaded {count} words at {origin:#06X}");
        Ok(())
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    #[must_use]
    pub const fn state(&self) -> MachineState {
        self.state
    }
    #[must_use]
    pub fn keyboard(&self) -> &Arc<Keyboard> {
        self.memory.keyboard()
    }

    /// Puts the registers back to power-on state so the loaded program can run again.
    /// Memory including any changes made by the program is kept.
    pub fn reset_registers(&mut self) {
        self.registers.reset();
        self.state = MachineState::Running;
    }

    /// Runs instructions until the machine halts.
    ///
    /// # Errors
    /// - writing program output failed
    pub fn execute(&mut self, stdout: &mut impl Write) -> Result<(), ExecutionError> {
        while self.state == MachineState::Running {
            if let ControlFlow::Break(res) = self.step(stdout) {
                self.state = MachineState::Halted;
                res?;
            }
        }
        Ok(())
    }

    /// One cycle: hand a queued key to the keyboard registers, fetch, increment PC, execute.
    ///
    /// Breaks when the machine has to stop, either regularly or with an error.
    pub fn step(&mut self, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
        if self.memory.keyboard().is_shut_down() {
            log::info!("Termination requested by keyboard");
            return ControlFlow::Break(Ok(()));
        }
        self.memory.refresh_keyboard();
        let instruction = Instruction::from(self.memory.read(self.registers.pc()));
        self.registers.inc_pc();
        self.execute_instruction(instruction, stdout)
    }

    fn execute_instruction(
        &mut self,
        i: Instruction,
        stdout: &mut impl Write,
    ) -> ControlFlow<Result<(), ExecutionError>> {
        let r = &mut self.registers;
        let mem = &mut self.memory;
        match i.op_code() {
            Opcode::Br => opcodes::br(i, r),
            Opcode::Add => opcodes::add(i, r),
            Opcode::Ld => opcodes::ld(i, r, mem),
            Opcode::St => opcodes::st(i, r, mem),
            Opcode::Jsr => opcodes::jsr(i, r),
            Opcode::And => opcodes::and(i, r),
            Opcode::Ldr => opcodes::ldr(i, r, mem),
            Opcode::Str => opcodes::str(i, r, mem),
            Opcode::Not => opcodes::not(i, r),
            Opcode::Ldi => opcodes::ldi(i, r, mem),
            Opcode::Sti => opcodes::sti(i, r, mem),
            Opcode::Jmp => opcodes::jmp_or_ret(i, r),
            Opcode::Lea => opcodes::lea(i, r),
            Opcode::Trap => return trap_routines::dispatch(i.trap_vector(), r, mem, stdout),
            Opcode::Rti | Opcode::Reserved => {
                log::debug!("Ignoring unsupported instruction {i:?}");
            }
        }
        ControlFlow::Continue(())
    }
}
