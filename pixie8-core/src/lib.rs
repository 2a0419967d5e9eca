//! A CHIP-8 interpreter core.
//!
//! The machine is a plain value, [`Chip8State`]. A [`Chip8Interpreter`] turns
//! one state plus the currently pressed [`Key`] into the next state:
//!
//! ```
//! use pixie8_core::{Chip8Config, Chip8Interpreter, Chip8State};
//!
//! // LD VA, 5; JP 202
//! let state = Chip8State::load_program(&[0x6A, 0x05, 0x12, 0x02]).unwrap();
//! let mut interpreter = Chip8Interpreter::seeded(Chip8Config::default(), 42);
//!
//! let state = interpreter.step(&state, None).unwrap();
//! assert_eq!(state.registers()[0xA], 5);
//! assert_eq!(pixie8_core::disassemble(0x6A05).unwrap(), "LD VA, 5");
//! ```
//!
//! Loading programs from disk, drawing the display and reading the keyboard
//! are left to the host.

mod config;
mod decoder;
mod disassembler;
mod display;
mod error;
mod executor;
pub mod font;
pub mod instruction;
mod interpreter;
mod keyboard;
mod state;

pub use config::{Chip8Config, LoadStoreRange, ShiftSource};
pub use decoder::{decode, Decoded};
pub use disassembler::{disassemble, disassemble_in, listing, Line, Radix};
pub use display::{Display, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use error::{DecodeError, ExecutionFault, Fault, LoadError};
pub use executor::INSTRUCTIONS;
pub use interpreter::Chip8Interpreter;
pub use keyboard::{Key, KeyWait};
pub use state::{Chip8State, FLAG_REGISTER, PROGRAM_START, RAM_SIZE, REGISTER_COUNT};
