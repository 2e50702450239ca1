//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` is a virtual machine for the LC-3 system. Programs are loaded via
//! `emulator::from_program`, keys reach the machine through the shared
//! [`hardware::Keyboard`], usually fed by an [`input_relay::InputRelay`] on its own thread.
//!
//!  # Example
//! ```
//! use lc3_vm::emulator;
//! use lc3_vm::hardware::Keyboard;
//! use std::sync::Arc;
//!
//! // LEA R0, #2; PUTS; HALT; "Hi"
//! let program = [0x3000, 0xE002, 0xF022, 0xF025, 0x48, 0x69, 0x00];
//! let mut emu = emulator::from_program_words(&program, Arc::new(Keyboard::new())).unwrap();
//! let mut out = Vec::new();
//! emu.execute(&mut out).unwrap();
//! assert_eq!(out, b"Hi");
//! ```
//! # Errors
//! - Program is missing valid .ORIG header (because it is shorter than one `u16` instruction)
//! - Program file is missing, a directory or has an odd number of bytes

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod input_relay;
pub(crate) mod numbers;
pub mod terminal;
