use thiserror::Error;

/// No entry of the instruction table matches the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode {opcode:04X}")]
    UnknownOpcode { opcode: u16 },
}

/// A fault raised while applying an instruction to the machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionFault {
    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("call stack exceeded its depth of {depth}")]
    StackOverflow { depth: usize },

    #[error("memory access out of bounds at {address:#05X}")]
    MemoryOutOfBounds { address: usize },

    #[error("jump to odd address {address:#05X}")]
    MisalignedJump { address: usize },

    #[error("register or digit {index:#04X} is outside 0-F")]
    RegisterOutOfBounds { index: u8 },

    #[error("write into the font region at {address:#05X}")]
    ReadOnlyMemory { address: usize },
}

/// Why a single `step` failed. The state passed to the step stays the state of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Execution(#[from] ExecutionFault),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("program of {len} bytes does not fit in memory at {base:#05X}")]
    DataOverflow { len: usize, base: u16 },

    #[error("programs cannot be loaded below 0x200 (got {base:#05X})")]
    ReservedAddress { base: u16 },

    #[error("programs must start on an even address (got {base:#05X})")]
    MisalignedBase { base: u16 },
}
