use crate::emulator;
use crate::emulator::Emulator;
use crate::hardware::keyboard::Keyboard;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::io;
use std::io::Write;
use std::sync::Arc;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Writer failing on every write.
pub struct FailingWriter;
impl Write for FailingWriter {
    fn write(&mut self, _data: &[u8]) -> Result<usize, io::Error> {
        Err(io::Error::other("Error during write"))
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

pub struct FakeEmulator<'a> {
    inner: Emulator,
    stdin_data: &'a [u8],
    stdout: StringWriter,
}
impl<'a> FakeEmulator<'a> {
    /// Emulator with `program_no_header` loaded at `0x3000`.
    pub fn new(program_no_header: &[u16]) -> Self {
        let mut program = Vec::with_capacity(program_no_header.len() + 1);
        program.push(0x3000u16);
        program.extend_from_slice(program_no_header);

        let emu = emulator::from_program_words(program.as_slice(), Arc::new(Keyboard::new()))
            .unwrap();
        Self {
            inner: emu,
            stdin_data: b"",
            stdout: StringWriter::new(),
        }
    }
    pub fn add_stdin_input(&mut self, input: &'a [u8]) -> &mut Self {
        self.stdin_data = input;
        self
    }
    pub fn keyboard(&self) -> Arc<Keyboard> {
        Arc::clone(self.inner.keyboard())
    }
    /// Feeds the stdin input to the keyboard and gives access to the machine parts.
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        for b in self.stdin_data {
            self.inner.keyboard().push(u16::from(*b));
        }
        self.stdin_data = b"";
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.stdout,
        )
    }
    pub fn execute(&mut self) -> Result<(), crate::errors::ExecutionError> {
        self.get_parts();
        self.inner.execute(&mut self.stdout)
    }
    pub fn emulator(&self) -> &Emulator {
        &self.inner
    }
    pub fn output(&self) -> String {
        self.stdout.get_string()
    }
}
