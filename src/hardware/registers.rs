use crate::hardware::memory::PROGRAM_SECTION_START;
use crate::numbers;
use std::fmt::{Debug, Formatter};

/// General purpose registers R0 to R7, program counter and condition register.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    general_purpose: [u16; 8],
    pc: u16,
    cond: ConditionFlag,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, value) in self.general_purpose.iter().enumerate() {
            write!(f, "R{idx}: {value:#06X} ")?;
        }
        write!(f, "PC: {:#06X}, COND: {:?}", self.pc, self.cond)
    }
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [0u16; 8],
            pc: PROGRAM_SECTION_START,
            cond: ConditionFlag::Zero,
        }
    }

    /// Puts every register back to its power-on value.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// # Panics
    /// - register number is greater than 7
    #[must_use]
    pub fn get(&self, r: u8) -> u16 {
        assert!(r <= 7, "Invalid general purpose register get");
        self.general_purpose[usize::from(r)]
    }
    /// Value of the register interpreted as two's complement number.
    #[must_use]
    pub fn get_decimal(&self, r: u8) -> i16 {
        numbers::twos_complement_to_decimal(self.get(r))
    }
    /// # Panics
    /// - register number is greater than 7
    pub fn set(&mut self, r: u8, value: u16) {
        assert!(r <= 7, "Invalid general purpose register set");
        self.general_purpose[usize::from(r)] = value;
    }

    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }
    /// Advances the PC past the instruction just fetched.
    pub const fn inc_pc(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    /// Sets the condition register from the sign of the value in register `r`.
    pub fn update_conditional_register(&mut self, r: u8) {
        self.cond = ConditionFlag::from(self.get(r));
    }
}

/// Condition codes, exactly one is active at any time.
/// The discriminants match the `nzp` bits of the BR instruction.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
