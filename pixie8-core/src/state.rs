use log::debug;

use crate::{
    font::{FONT, FONT_ADDRESS},
    Display, ExecutionFault, Key, KeyWait, LoadError,
};

pub const RAM_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const REGISTER_COUNT: usize = 16;
/// VF doubles as the carry/borrow/collision flag.
pub const FLAG_REGISTER: u8 = 0xF;

/// Everything the machine remembers between two steps.
///
/// A state is never changed in place by the interpreter: every step reads one
/// state and returns the next one, so a host can keep older states around for
/// free (rewinding, comparing, displaying).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8State {
    pub(crate) ram: [u8; RAM_SIZE],
    pub(crate) data_registers: [u8; REGISTER_COUNT],
    pub(crate) index_register: u16,
    pub(crate) program_counter: u16,
    pub(crate) stack: Vec<u16>,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) display: Display,
    pub(crate) pressed_key: Option<Key>,
    pub(crate) key_wait: KeyWait,
    /// Steps since the last timer decrement.
    pub(crate) timer_phase: u8,
}

impl Default for Chip8State {
    fn default() -> Self {
        let mut ram = [0; RAM_SIZE];
        ram[FONT_ADDRESS..FONT_ADDRESS + FONT.len()].copy_from_slice(&FONT);

        Self {
            ram,
            data_registers: [0; REGISTER_COUNT],
            index_register: 0,
            program_counter: PROGRAM_START,
            stack: Vec::new(),
            delay_timer: 0,
            sound_timer: 0,
            display: Display::default(),
            pressed_key: None,
            key_wait: KeyWait::Running,
            timer_phase: 0,
        }
    }
}

impl Chip8State {
    /// A freshly reset machine with the font in low memory and nothing else.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_program(program: &[u8]) -> Result<Self, LoadError> {
        Self::load(program, PROGRAM_START)
    }

    /// Resets the machine and copies `program` to `base`, where execution starts.
    pub fn load(program: &[u8], base: u16) -> Result<Self, LoadError> {
        if base < PROGRAM_START {
            return Err(LoadError::ReservedAddress { base });
        }
        if base % 2 != 0 {
            return Err(LoadError::MisalignedBase { base });
        }
        let start = base as usize;
        if program.len() + start > RAM_SIZE {
            return Err(LoadError::DataOverflow {
                len: program.len(),
                base,
            });
        }

        let mut state = Self::new();
        state.ram[start..start + program.len()].copy_from_slice(program);
        state.program_counter = base;

        debug!("loaded {} bytes at {:#05X}", program.len(), base);
        Ok(state)
    }

    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.data_registers
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    /// Return addresses, innermost call last.
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The key the host reported for the step that produced this state.
    pub fn pressed_key(&self) -> Option<Key> {
        self.pressed_key
    }

    pub fn key_wait(&self) -> KeyWait {
        self.key_wait
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.key_wait, KeyWait::WaitingForKey(_))
    }

    /// Big-endian word at `address`.
    pub fn opcode_at(&self, address: u16) -> Result<u16, ExecutionFault> {
        let address = address as usize;
        match self.ram.get(address..address + 2) {
            Some(&[high, low]) => Ok(u16::from_be_bytes([high, low])),
            _ => Err(ExecutionFault::MemoryOutOfBounds { address }),
        }
    }

    /// The opcode the next step will execute.
    pub fn current_opcode(&self) -> Result<u16, ExecutionFault> {
        self.opcode_at(self.program_counter)
    }
}
