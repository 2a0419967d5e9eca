use crate::{decode, state::RAM_SIZE, DecodeError};

/// Base used for numeric literals. Register names are always one hex digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    #[default]
    Hex,
    Decimal,
}

/// Mnemonic for `opcode`, literals in upper-case hex: `0x6A05` is `LD VA, 5`.
pub fn disassemble(opcode: u16) -> Result<String, DecodeError> {
    disassemble_in(opcode, Radix::Hex)
}

pub fn disassemble_in(opcode: u16, radix: Radix) -> Result<String, DecodeError> {
    let decoded = decode(opcode)?;
    let op = decoded.operands;

    let literal = |value: u16| match radix {
        Radix::Hex => format!("{:X}", value),
        Radix::Decimal => value.to_string(),
    };

    Ok(decoded
        .instruction
        .mnemonic
        .replace("{x}", &format!("{:X}", op.x))
        .replace("{y}", &format!("{:X}", op.y))
        .replace("{nnn}", &literal(op.nnn))
        .replace("{kk}", &literal(op.kk as u16))
        .replace("{n}", &literal(op.n as u16)))
}

/// One word of a program listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub address: u16,
    pub opcode: u16,
    pub text: Result<String, DecodeError>,
}

/// Disassembles a program image word by word as if loaded at `base`. Data
/// mixed into the code shows up as lines whose `text` is an error; a trailing
/// odd byte is not listed. The listing ends with the last word that fits in RAM.
pub fn listing(program: &[u8], base: u16) -> impl Iterator<Item = Line> + '_ {
    program
        .chunks_exact(2)
        .enumerate()
        .map(move |(i, word)| (base as usize + 2 * i, word))
        .take_while(|&(address, _)| address + 1 < RAM_SIZE)
        .map(|(address, word)| {
            let opcode = u16::from_be_bytes([word[0], word[1]]);
            Line {
                address: address as u16,
                opcode,
                text: disassemble(opcode),
            }
        })
}
