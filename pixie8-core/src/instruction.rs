use std::fmt;

use rand::RngCore;

use crate::{
    font::FONT_END,
    state::{FLAG_REGISTER, RAM_SIZE, REGISTER_COUNT},
    Chip8Config, Chip8State, ExecutionFault, KeyWait, LoadStoreRange,
};

/// Where the operands sit inside an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandLayout {
    None,
    /// 12-bit address in the low three nibbles.
    Nnn,
    X,
    Xkk,
    Xy,
    Xyn,
}

/// Operand values pulled out of an opcode. Fields the layout does not use are 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Operands {
    pub x: u8,
    pub y: u8,
    pub n: u8,
    pub kk: u8,
    pub nnn: u16,
}

impl OperandLayout {
    pub fn extract(self, opcode: u16) -> Operands {
        let x = ((opcode >> 8) & 0xF) as u8;
        let y = ((opcode >> 4) & 0xF) as u8;
        match self {
            OperandLayout::None => Operands::default(),
            OperandLayout::Nnn => Operands {
                nnn: opcode & 0x0FFF,
                ..Operands::default()
            },
            OperandLayout::X => Operands {
                x,
                ..Operands::default()
            },
            OperandLayout::Xkk => Operands {
                x,
                kk: (opcode & 0xFF) as u8,
                ..Operands::default()
            },
            OperandLayout::Xy => Operands {
                x,
                y,
                ..Operands::default()
            },
            OperandLayout::Xyn => Operands {
                x,
                y,
                n: (opcode & 0xF) as u8,
                ..Operands::default()
            },
        }
    }
}

pub type ExecuteFn = fn(&mut Execution<'_>, Operands) -> Result<(), ExecutionFault>;

/// One row of the instruction table. Rows are declared with `#[opcode(..)]`.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub name: &'static str,
    pub pattern: u16,
    pub mask: u16,
    pub layout: OperandLayout,
    /// Template with `{x}`, `{y}`, `{n}`, `{kk}` and `{nnn}` placeholders.
    pub mnemonic: &'static str,
    pub execute: ExecuteFn,
}

impl Instruction {
    pub fn matches(&self, opcode: u16) -> bool {
        opcode & self.mask == self.pattern
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("name", &self.name)
            .field("pattern", &format_args!("{:#06X}", self.pattern))
            .field("mask", &format_args!("{:#06X}", self.mask))
            .field("layout", &self.layout)
            .finish()
    }
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.mask == other.mask
    }
}

impl Eq for Instruction {}

/// The machine as seen by a single instruction.
///
/// Every access is checked and reported as an [`ExecutionFault`]; the
/// interpreter throws the state away when that happens.
pub struct Execution<'a> {
    pub(crate) state: &'a mut Chip8State,
    pub(crate) rng: &'a mut dyn RngCore,
    pub(crate) config: &'a Chip8Config,
    jumped: bool,
}

impl<'a> Execution<'a> {
    pub(crate) fn new(
        state: &'a mut Chip8State,
        rng: &'a mut dyn RngCore,
        config: &'a Chip8Config,
    ) -> Self {
        Self {
            state,
            rng,
            config,
            jumped: false,
        }
    }

    /// Whether the instruction wrote the program counter itself.
    pub(crate) fn jumped(&self) -> bool {
        self.jumped
    }

    pub fn register(&self, index: u8) -> Result<u8, ExecutionFault> {
        self.state
            .data_registers
            .get(index as usize)
            .copied()
            .ok_or(ExecutionFault::RegisterOutOfBounds { index })
    }

    pub fn set_register(&mut self, index: u8, value: u8) -> Result<(), ExecutionFault> {
        let register = self
            .state
            .data_registers
            .get_mut(index as usize)
            .ok_or(ExecutionFault::RegisterOutOfBounds { index })?;
        *register = value;
        Ok(())
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.state.data_registers[FLAG_REGISTER as usize] = flag as u8;
    }

    /// Registers V0 up to `last`, honouring the configured load/store range.
    pub fn register_range(&self, last: u8) -> Result<std::ops::Range<u8>, ExecutionFault> {
        if last as usize >= REGISTER_COUNT {
            return Err(ExecutionFault::RegisterOutOfBounds { index: last });
        }
        Ok(match self.config.load_store_range {
            LoadStoreRange::Inclusive => 0..last + 1,
            LoadStoreRange::Exclusive => 0..last,
        })
    }

    pub fn program_counter(&self) -> u16 {
        self.state.program_counter
    }

    /// Moves the program counter; the step will not add its default 2.
    /// The target has to be even and leave room for a whole opcode.
    pub fn jump(&mut self, target: usize) -> Result<(), ExecutionFault> {
        if target + 1 >= RAM_SIZE {
            return Err(ExecutionFault::MemoryOutOfBounds { address: target });
        }
        if target % 2 != 0 {
            return Err(ExecutionFault::MisalignedJump { address: target });
        }
        self.state.program_counter = target as u16;
        self.jumped = true;
        Ok(())
    }

    /// Skips the next instruction when `condition` holds.
    pub fn skip_if(&mut self, condition: bool) -> Result<(), ExecutionFault> {
        if condition {
            self.jump(self.state.program_counter as usize + 4)
        } else {
            Ok(())
        }
    }

    /// Suspends the machine until the host reports a key, which lands in
    /// `register`. The program counter stays on the waiting instruction.
    pub fn wait_for_key(&mut self, register: u8) {
        self.state.key_wait = KeyWait::WaitingForKey(register);
    }

    pub fn read(&self, address: usize, len: usize) -> Result<&[u8], ExecutionFault> {
        self.state
            .ram
            .get(address..address + len)
            .ok_or_else(|| ExecutionFault::MemoryOutOfBounds {
                address: address + len.max(1) - 1,
            })
    }

    pub fn write(&mut self, address: usize, bytes: &[u8]) -> Result<(), ExecutionFault> {
        if bytes.is_empty() {
            return Ok(());
        }
        if address < FONT_END {
            return Err(ExecutionFault::ReadOnlyMemory { address });
        }
        let end = address + bytes.len();
        let target = self
            .state
            .ram
            .get_mut(address..end)
            .ok_or(ExecutionFault::MemoryOutOfBounds { address: end - 1 })?;
        target.copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_operands() {
        assert_eq!(OperandLayout::None.extract(0x00E0), Operands::default());
        assert_eq!(OperandLayout::Nnn.extract(0x1ABC).nnn, 0xABC);
        assert_eq!(OperandLayout::X.extract(0xF729).x, 0x7);
        let xkk = OperandLayout::Xkk.extract(0x6A05);
        assert_eq!((xkk.x, xkk.kk), (0xA, 0x05));
        let xy = OperandLayout::Xy.extract(0x8124);
        assert_eq!((xy.x, xy.y, xy.n), (0x1, 0x2, 0));
        let xyn = OperandLayout::Xyn.extract(0xD12F);
        assert_eq!((xyn.x, xyn.y, xyn.n), (0x1, 0x2, 0xF));
    }
}
