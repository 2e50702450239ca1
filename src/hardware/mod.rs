//! Machine state of the LC-3: memory with its memory-mapped keyboard, the register file and
//! the keystroke queue shared with the input relay.
pub mod keyboard;
pub mod memory;
pub mod registers;

pub use keyboard::{KEYBOARD_POLL_INTERVAL, Keyboard};
pub use memory::{Memory, MemoryMappedIOLocations, PROGRAM_SECTION_START};
pub use registers::{ConditionFlag, Registers};
