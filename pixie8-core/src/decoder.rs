use crate::{
    executor::INSTRUCTIONS,
    instruction::{Instruction, Operands},
    DecodeError,
};

/// An opcode resolved to its table entry, with operands extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub opcode: u16,
    pub instruction: &'static Instruction,
    pub operands: Operands,
}

/// Finds the first table entry whose pattern matches `opcode`.
pub fn decode(opcode: u16) -> Result<Decoded, DecodeError> {
    let instruction = INSTRUCTIONS
        .iter()
        .find(|instruction| instruction.matches(opcode))
        .ok_or(DecodeError::UnknownOpcode { opcode })?;

    Ok(Decoded {
        opcode,
        instruction,
        operands: instruction.layout.extract(opcode),
    })
}
