use crate::errors::LoadProgramError;
use crate::hardware::keyboard::Keyboard;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub const PROGRAM_SECTION_START: u16 = 0x3000;
const MEMORY_SIZE_U16: usize = 1 << 16;

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

/// An abstraction for the whole 16-bit LC-3 address space, excluding registers.
///
/// Every address is valid, all address arithmetic by callers wraps. The keyboard registers
/// alias ordinary cells but reading them has side effects, see [`Memory::read`].
pub struct Memory {
    /// Index equals memory address
    data: Box<[u16]>,
    keyboard: Arc<Keyboard>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Memory {{ non-zero words: {}, KBSR: {:#06X}, KBDR: {:#06X} }}",
            self.data.iter().filter(|w| **w != 0).count(),
            self.peek(MemoryMappedIOLocations::Kbsr as u16),
            self.peek(MemoryMappedIOLocations::Kbdr as u16),
        )
    }
}

impl Memory {
    /// Bit 15 of the keyboard status register, set while a key waits in the data register.
    pub const KEYBOARD_READY: u16 = 1 << 15;

    #[must_use]
    pub fn new(keyboard: Arc<Keyboard>) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE_U16].into_boxed_slice(),
            keyboard,
        }
    }

    /// Reads the word at `address` without any device side effects.
    #[inline]
    #[must_use]
    pub fn peek(&self, address: u16) -> u16 {
        self.data[usize::from(address)]
    }

    /// Reads the word at `address`.
    ///
    /// - `KBSR`: if no key is ready yet, the oldest queued key is moved to `KBDR` first.
    /// - `KBDR`: clears the ready bit of `KBSR`, the data cell keeps its value.
    pub fn read(&mut self, address: u16) -> u16 {
        match MemoryMappedIOLocations::n(address) {
            Some(MemoryMappedIOLocations::Kbsr) => {
                self.refresh_keyboard();
            }
            Some(MemoryMappedIOLocations::Kbdr) => {
                let kbsr = MemoryMappedIOLocations::Kbsr as u16;
                self.write(kbsr, self.peek(kbsr) & !Self::KEYBOARD_READY);
            }
            None => {}
        }
        self.peek(address)
    }

    /// Plain store, the keyboard registers included.
    pub fn write(&mut self, address: u16, value: u16) {
        self.data[usize::from(address)] = value;
    }

    /// Delivers at most one queued key to the keyboard registers.
    ///
    /// A new key is only delivered after the previous one was consumed by reading `KBDR`.
    pub fn refresh_keyboard(&mut self) {
        let kbsr = MemoryMappedIOLocations::Kbsr as u16;
        if self.peek(kbsr) & Self::KEYBOARD_READY != 0 {
            return;
        }
        if let Some(key) = self.keyboard.try_pop() {
            self.write(MemoryMappedIOLocations::Kbdr as u16, key);
            self.write(kbsr, self.peek(kbsr) | Self::KEYBOARD_READY);
        }
    }

    #[must_use]
    pub fn keyboard(&self) -> &Arc<Keyboard> {
        &self.keyboard
    }

    /// Loads a program with its `.ORIG` header, the first word being the address
    /// where the following words are placed. Loading wraps past `0xFFFF` to `0x0000`.
    ///
    /// Returns the origin and the number of words written.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header because it is empty
    pub fn load_program(&mut self, program: &[u16]) -> Result<(u16, usize), LoadProgramError> {
        let (&origin, rest) = program
            .split_first()
            .ok_or(LoadProgramError::ProgramMissingOrigHeader)?;
        let mut address = origin;
        for word in rest {
            self.write(address, *word);
            address = address.wrapping_add(1);
        }
        Ok((origin, rest.len()))
    }

    /// Like [`Memory::load_program`] but for the raw big-endian byte image as stored on disk.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header because it is shorter than one `u16`
    /// - Program has an odd number of bytes
    pub fn load_program_bytes(&mut self, bytes: &[u8]) -> Result<(u16, usize), LoadProgramError> {
        self.load_program(&words_from_be_bytes(bytes)?)
    }
}

/// Converts a big-endian byte image into `u16` words.
///
/// # Errors
/// - fewer than two bytes
/// - odd number of bytes
pub fn words_from_be_bytes(bytes: &[u8]) -> Result<Vec<u16>, LoadProgramError> {
    if bytes.len() < 2 {
        return Err(LoadProgramError::ProgramMissingOrigHeader);
    }
    let chunks = bytes.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return Err(LoadProgramError::ProgramTruncated { bytes: bytes.len() });
    }
    Ok(chunks
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}
