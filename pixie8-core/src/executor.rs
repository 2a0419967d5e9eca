//! Semantics of every instruction, and the ordered table the decoder walks.
//!
//! Each function gets the machine through [`Execution`] and the operands the
//! decoder extracted. A function that returns an error leaves nothing behind:
//! the interpreter only keeps the state of steps that succeed.
//!
//! Arithmetic that sets VF writes the result first and the flag last, so with
//! x = F the flag wins.

use pixie8_macros::opcode;
use rand::Rng;

use crate::{
    font,
    instruction::{Execution, Instruction, Operands},
    ExecutionFault, ShiftSource,
};

type Outcome = Result<(), ExecutionFault>;

/// Instruction table, most specific masks first: the first entry whose
/// pattern matches wins, so `00E0`/`00EE` must come before `SYS 0nnn`.
pub static INSTRUCTIONS: &[Instruction] = &[
    CLS,
    RET,
    SYS,
    JP,
    CALL,
    SE_VX_KK,
    SNE_VX_KK,
    SE_VX_VY,
    LD_VX_KK,
    ADD_VX_KK,
    LD_VX_VY,
    OR_VX_VY,
    AND_VX_VY,
    XOR_VX_VY,
    ADD_VX_VY,
    SUB_VX_VY,
    SHR_VX_VY,
    SUBN_VX_VY,
    SHL_VX_VY,
    SNE_VX_VY,
    LD_I,
    JP_V0,
    RND,
    DRW,
    SKP,
    SKNP,
    LD_VX_DT,
    LD_VX_K,
    LD_DT_VX,
    LD_ST_VX,
    ADD_I_VX,
    LD_F_VX,
    LD_B_VX,
    LD_MEM_VX,
    LD_VX_MEM,
];

#[opcode(pattern = 0x00E0, mask = 0xFFFF, operands = None, mnemonic = "CLS")]
fn cls(cpu: &mut Execution<'_>, _: Operands) -> Outcome {
    cpu.state.display.clear();
    Ok(())
}

// returns to the instruction after the CALL
#[opcode(pattern = 0x00EE, mask = 0xFFFF, operands = None, mnemonic = "RET")]
fn ret(cpu: &mut Execution<'_>, _: Operands) -> Outcome {
    let call_site = cpu.state.stack.pop().ok_or(ExecutionFault::StackUnderflow)?;
    cpu.jump(call_site as usize + 2)
}

#[opcode(pattern = 0x0000, mask = 0xF000, operands = Nnn, mnemonic = "SYS {nnn}")]
fn sys(_: &mut Execution<'_>, _: Operands) -> Outcome {
    Ok(())
}

#[opcode(pattern = 0x1000, mask = 0xF000, operands = Nnn, mnemonic = "JP {nnn}")]
fn jp(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    cpu.jump(op.nnn as usize)
}

#[opcode(pattern = 0x2000, mask = 0xF000, operands = Nnn, mnemonic = "CALL {nnn}")]
fn call(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let depth = cpu.config.stack_depth;
    if cpu.state.stack.len() >= depth {
        return Err(ExecutionFault::StackOverflow { depth });
    }
    let call_site = cpu.program_counter();
    cpu.jump(op.nnn as usize)?;
    cpu.state.stack.push(call_site);
    Ok(())
}

#[opcode(pattern = 0x3000, mask = 0xF000, operands = Xkk, mnemonic = "SE V{x}, {kk}")]
fn se_vx_kk(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let vx = cpu.register(op.x)?;
    cpu.skip_if(vx == op.kk)
}

#[opcode(pattern = 0x4000, mask = 0xF000, operands = Xkk, mnemonic = "SNE V{x}, {kk}")]
fn sne_vx_kk(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let vx = cpu.register(op.x)?;
    cpu.skip_if(vx != op.kk)
}

#[opcode(pattern = 0x5000, mask = 0xF00F, operands = Xy, mnemonic = "SE V{x}, V{y}")]
fn se_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    cpu.skip_if(vx == vy)
}

#[opcode(pattern = 0x6000, mask = 0xF000, operands = Xkk, mnemonic = "LD V{x}, {kk}")]
fn ld_vx_kk(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    cpu.set_register(op.x, op.kk)
}

#[opcode(pattern = 0x7000, mask = 0xF000, operands = Xkk, mnemonic = "ADD V{x}, {kk}")]
fn add_vx_kk(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let vx = cpu.register(op.x)?;
    cpu.set_register(op.x, vx.wrapping_add(op.kk))
}

#[opcode(pattern = 0x8000, mask = 0xF00F, operands = Xy, mnemonic = "LD V{x}, V{y}")]
fn ld_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let vy = cpu.register(op.y)?;
    cpu.set_register(op.x, vy)
}

#[opcode(pattern = 0x8001, mask = 0xF00F, operands = Xy, mnemonic = "OR V{x}, V{y}")]
fn or_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    cpu.set_register(op.x, vx | vy)
}

#[opcode(pattern = 0x8002, mask = 0xF00F, operands = Xy, mnemonic = "AND V{x}, V{y}")]
fn and_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    cpu.set_register(op.x, vx & vy)
}

#[opcode(pattern = 0x8003, mask = 0xF00F, operands = Xy, mnemonic = "XOR V{x}, V{y}")]
fn xor_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    cpu.set_register(op.x, vx ^ vy)
}

#[opcode(pattern = 0x8004, mask = 0xF00F, operands = Xy, mnemonic = "ADD V{x}, V{y}")]
fn add_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    let (result, overflow) = vx.overflowing_add(vy);
    cpu.set_register(op.x, result)?;
    cpu.set_flag(overflow);
    Ok(())
}

#[opcode(pattern = 0x8005, mask = 0xF00F, operands = Xy, mnemonic = "SUB V{x}, V{y}")]
fn sub_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    cpu.set_register(op.x, vx.wrapping_sub(vy))?;
    cpu.set_flag(vx > vy);
    Ok(())
}

fn shift_source(cpu: &Execution<'_>, op: Operands) -> Result<u8, ExecutionFault> {
    match cpu.config.shift_source {
        ShiftSource::Vy => cpu.register(op.y),
        ShiftSource::Vx => cpu.register(op.x),
    }
}

#[opcode(pattern = 0x8006, mask = 0xF00F, operands = Xy, mnemonic = "SHR V{x}, V{y}")]
fn shr_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let source = shift_source(cpu, op)?;
    cpu.set_register(op.x, source >> 1)?;
    cpu.set_flag(source & 0x01 != 0);
    Ok(())
}

#[opcode(pattern = 0x8007, mask = 0xF00F, operands = Xy, mnemonic = "SUBN V{x}, V{y}")]
fn subn_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    cpu.set_register(op.x, vy.wrapping_sub(vx))?;
    cpu.set_flag(vy > vx);
    Ok(())
}

#[opcode(pattern = 0x800E, mask = 0xF00F, operands = Xy, mnemonic = "SHL V{x}, V{y}")]
fn shl_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let source = shift_source(cpu, op)?;
    cpu.set_register(op.x, source << 1)?;
    cpu.set_flag(source & 0x80 != 0);
    Ok(())
}

#[opcode(pattern = 0x9000, mask = 0xF00F, operands = Xy, mnemonic = "SNE V{x}, V{y}")]
fn sne_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    cpu.skip_if(vx != vy)
}

#[opcode(pattern = 0xA000, mask = 0xF000, operands = Nnn, mnemonic = "LD I, {nnn}")]
fn ld_i(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    cpu.state.index_register = op.nnn;
    Ok(())
}

#[opcode(pattern = 0xB000, mask = 0xF000, operands = Nnn, mnemonic = "JP V0, {nnn}")]
fn jp_v0(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let v0 = cpu.register(0x0)?;
    cpu.jump(v0 as usize + op.nnn as usize)
}

#[opcode(pattern = 0xC000, mask = 0xF000, operands = Xkk, mnemonic = "RND V{x}, {kk}")]
fn rnd(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let value = cpu.rng.gen::<u8>() & op.kk;
    cpu.set_register(op.x, value)
}

#[opcode(pattern = 0xD000, mask = 0xF000, operands = Xyn, mnemonic = "DRW V{x}, V{y}, {n}")]
fn drw(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let (vx, vy) = (cpu.register(op.x)?, cpu.register(op.y)?);
    let index = cpu.state.index_register as usize;
    let sprite = cpu.read(index, op.n as usize)?.to_vec();

    let collision = cpu.state.display.draw(vx, vy, &sprite);
    cpu.set_flag(collision);
    Ok(())
}

fn key_matches(cpu: &Execution<'_>, op: Operands) -> Result<bool, ExecutionFault> {
    let vx = cpu.register(op.x)?;
    Ok(cpu.state.pressed_key.map(|key| key.value()) == Some(vx))
}

#[opcode(pattern = 0xE09E, mask = 0xF0FF, operands = X, mnemonic = "SKP V{x}")]
fn skp(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let pressed = key_matches(cpu, op)?;
    cpu.skip_if(pressed)
}

#[opcode(pattern = 0xE0A1, mask = 0xF0FF, operands = X, mnemonic = "SKNP V{x}")]
fn sknp(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let pressed = key_matches(cpu, op)?;
    cpu.skip_if(!pressed)
}

#[opcode(pattern = 0xF007, mask = 0xF0FF, operands = X, mnemonic = "LD V{x}, DT")]
fn ld_vx_dt(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let delay = cpu.state.delay_timer;
    cpu.set_register(op.x, delay)
}

/// Blocks until a key is pressed; see [`crate::KeyWait`].
#[opcode(pattern = 0xF00A, mask = 0xF0FF, operands = X, mnemonic = "LD V{x}, K")]
fn ld_vx_k(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    cpu.register(op.x)?;
    cpu.wait_for_key(op.x);
    Ok(())
}

#[opcode(pattern = 0xF015, mask = 0xF0FF, operands = X, mnemonic = "LD DT, V{x}")]
fn ld_dt_vx(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    cpu.state.delay_timer = cpu.register(op.x)?;
    Ok(())
}

#[opcode(pattern = 0xF018, mask = 0xF0FF, operands = X, mnemonic = "LD ST, V{x}")]
fn ld_st_vx(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    cpu.state.sound_timer = cpu.register(op.x)?;
    Ok(())
}

#[opcode(pattern = 0xF01E, mask = 0xF0FF, operands = X, mnemonic = "ADD I, V{x}")]
fn add_i_vx(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let vx = cpu.register(op.x)? as usize;
    let index = cpu.state.index_register as usize;
    cpu.state.index_register = ((index + vx) % crate::state::RAM_SIZE) as u16;
    Ok(())
}

#[opcode(pattern = 0xF029, mask = 0xF0FF, operands = X, mnemonic = "LD F, V{x}")]
fn ld_f_vx(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let digit = cpu.register(op.x)?;
    cpu.state.index_register =
        font::glyph_address(digit).ok_or(ExecutionFault::RegisterOutOfBounds { index: digit })?;
    Ok(())
}

#[opcode(pattern = 0xF033, mask = 0xF0FF, operands = X, mnemonic = "LD B, V{x}")]
fn ld_b_vx(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let value = cpu.register(op.x)?;
    let index = cpu.state.index_register as usize;
    cpu.write(index, &[value / 100, value / 10 % 10, value % 10])
}

#[opcode(pattern = 0xF055, mask = 0xF0FF, operands = X, mnemonic = "LD [I], V{x}")]
fn ld_mem_vx(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let range = cpu.register_range(op.x)?;
    let values = cpu.state.data_registers[range.start as usize..range.end as usize].to_vec();
    let index = cpu.state.index_register as usize;
    cpu.write(index, &values)
}

#[opcode(pattern = 0xF065, mask = 0xF0FF, operands = X, mnemonic = "LD V{x}, [I]")]
fn ld_vx_mem(cpu: &mut Execution<'_>, op: Operands) -> Outcome {
    let range = cpu.register_range(op.x)?;
    let index = cpu.state.index_register as usize;
    let values = cpu.read(index, range.len())?.to_vec();
    for (register, value) in range.zip(values) {
        cpu.set_register(register, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{Chip8Config, Chip8State, Key, KeyWait, LoadStoreRange, PROGRAM_START};

    /// Runs one instruction against `state` and reports whether it jumped.
    fn run(
        state: &mut Chip8State,
        config: &Chip8Config,
        instruction: &Instruction,
        opcode: u16,
    ) -> Result<bool, ExecutionFault> {
        let mut rng = StdRng::seed_from_u64(8);
        let mut cpu = Execution::new(state, &mut rng, config);
        (instruction.execute)(&mut cpu, instruction.layout.extract(opcode))?;
        Ok(cpu.jumped())
    }

    fn exec(
        state: &mut Chip8State,
        instruction: &Instruction,
        opcode: u16,
    ) -> Result<bool, ExecutionFault> {
        run(state, &Chip8Config::default(), instruction, opcode)
    }

    #[test]
    fn test_table_order() {
        // every opcode resolves to the first matching entry, and no later
        // entry is completely hidden behind an earlier one
        for (i, later) in INSTRUCTIONS.iter().enumerate() {
            let shadowed = INSTRUCTIONS[..i].iter().any(|earlier| {
                later.pattern & earlier.mask == earlier.pattern && earlier.mask & !later.mask == 0
            });
            assert!(!shadowed, "{} is unreachable", later.name);
        }
        assert_eq!(INSTRUCTIONS.len(), 35);
    }

    #[test]
    fn test_jp_and_call() {
        let mut state = Chip8State::new();
        assert_eq!(exec(&mut state, &JP, 0x1ABC), Ok(true));
        assert_eq!(state.program_counter(), 0xABC);

        assert_eq!(exec(&mut state, &CALL, 0x2300), Ok(true));
        assert_eq!(state.program_counter(), 0x300);
        assert_eq!(state.stack(), &[0xABC]);

        assert_eq!(exec(&mut state, &RET, 0x00EE), Ok(true));
        assert_eq!(state.program_counter(), 0xABE);
        assert!(state.stack().is_empty());
    }

    #[test]
    fn test_jump_to_last_byte_faults() {
        let mut state = Chip8State::new();
        assert_eq!(
            exec(&mut state, &JP, 0x1FFF),
            Err(ExecutionFault::MemoryOutOfBounds { address: 0xFFF })
        );
    }

    #[test]
    fn test_jump_to_odd_address_faults() {
        let mut state = Chip8State::new();
        assert_eq!(
            exec(&mut state, &JP, 0x1201),
            Err(ExecutionFault::MisalignedJump { address: 0x201 })
        );
        assert_eq!(state.program_counter(), PROGRAM_START);

        state.data_registers[0] = 0x03;
        assert_eq!(
            exec(&mut state, &JP_V0, 0xB300),
            Err(ExecutionFault::MisalignedJump { address: 0x303 })
        );
    }

    #[test]
    fn test_ret_underflow() {
        let mut state = Chip8State::new();
        assert_eq!(
            exec(&mut state, &RET, 0x00EE),
            Err(ExecutionFault::StackUnderflow)
        );
    }

    #[test]
    fn test_call_overflow() {
        let mut state = Chip8State::new();
        let config = Chip8Config::default().with_stack_depth(2);
        run(&mut state, &config, &CALL, 0x2300).unwrap();
        run(&mut state, &config, &CALL, 0x2400).unwrap();
        assert_eq!(
            run(&mut state, &config, &CALL, 0x2500),
            Err(ExecutionFault::StackOverflow { depth: 2 })
        );
    }

    #[test]
    fn test_skips() {
        let mut state = Chip8State::new();
        state.data_registers[1] = 0x42;
        state.data_registers[2] = 0x42;

        assert_eq!(exec(&mut state, &SE_VX_KK, 0x3142), Ok(true));
        assert_eq!(state.program_counter(), 0x204);
        assert_eq!(exec(&mut state, &SNE_VX_KK, 0x4142), Ok(false));
        assert_eq!(state.program_counter(), 0x204);
        assert_eq!(exec(&mut state, &SE_VX_VY, 0x5120), Ok(true));
        assert_eq!(state.program_counter(), 0x208);
        assert_eq!(exec(&mut state, &SNE_VX_VY, 0x9120), Ok(false));
    }

    #[test]
    fn test_add_sets_carry() {
        let mut state = Chip8State::new();
        state.data_registers[0] = 200;
        state.data_registers[1] = 100;
        exec(&mut state, &ADD_VX_VY, 0x8014).unwrap();
        assert_eq!(state.registers()[0], 44);
        assert_eq!(state.registers()[0xF], 1);

        exec(&mut state, &ADD_VX_VY, 0x8014).unwrap();
        assert_eq!(state.registers()[0], 144);
        assert_eq!(state.registers()[0xF], 0);
    }

    #[test]
    fn test_add_kk_has_no_flag() {
        let mut state = Chip8State::new();
        state.data_registers[3] = 0xFF;
        exec(&mut state, &ADD_VX_KK, 0x7302).unwrap();
        assert_eq!(state.registers()[3], 0x01);
        assert_eq!(state.registers()[0xF], 0);
    }

    #[test]
    fn test_sub_and_subn() {
        let mut state = Chip8State::new();
        state.data_registers[0] = 5;
        state.data_registers[1] = 7;
        exec(&mut state, &SUB_VX_VY, 0x8015).unwrap();
        assert_eq!(state.registers()[0], 254);
        assert_eq!(state.registers()[0xF], 0);

        state.data_registers[0] = 5;
        exec(&mut state, &SUBN_VX_VY, 0x8017).unwrap();
        assert_eq!(state.registers()[0], 2);
        assert_eq!(state.registers()[0xF], 1);

        // equal operands borrow nothing but do not set the flag either
        state.data_registers[0] = 7;
        exec(&mut state, &SUB_VX_VY, 0x8015).unwrap();
        assert_eq!(state.registers()[0], 0);
        assert_eq!(state.registers()[0xF], 0);
    }

    #[test]
    fn test_flag_register_as_destination() {
        let mut state = Chip8State::new();
        state.data_registers[0xF] = 0xFF;
        state.data_registers[1] = 0x01;
        exec(&mut state, &ADD_VX_VY, 0x8F14).unwrap();
        assert_eq!(state.registers()[0xF], 1);
    }

    #[test]
    fn test_shifts_read_vy() {
        let mut state = Chip8State::new();
        state.data_registers[1] = 0b1000_0011;
        exec(&mut state, &SHR_VX_VY, 0x8016).unwrap();
        assert_eq!(state.registers()[0], 0b0100_0001);
        assert_eq!(state.registers()[0xF], 1);

        exec(&mut state, &SHL_VX_VY, 0x801E).unwrap();
        assert_eq!(state.registers()[0], 0b0000_0110);
        assert_eq!(state.registers()[0xF], 1);
    }

    #[test]
    fn test_shifts_in_place_quirk() {
        let mut state = Chip8State::new();
        let config = Chip8Config::default().with_shift_source(ShiftSource::Vx);
        state.data_registers[0] = 0b0000_0100;
        state.data_registers[1] = 0xFF;
        run(&mut state, &config, &SHR_VX_VY, 0x8016).unwrap();
        assert_eq!(state.registers()[0], 0b0000_0010);
        assert_eq!(state.registers()[0xF], 0);
    }

    #[test]
    fn test_bitwise() {
        let mut state = Chip8State::new();
        state.data_registers[0] = 0b1100;
        state.data_registers[1] = 0b1010;
        exec(&mut state, &OR_VX_VY, 0x8011).unwrap();
        assert_eq!(state.registers()[0], 0b1110);
        exec(&mut state, &AND_VX_VY, 0x8012).unwrap();
        assert_eq!(state.registers()[0], 0b1010);
        exec(&mut state, &XOR_VX_VY, 0x8013).unwrap();
        assert_eq!(state.registers()[0], 0);
    }

    #[test]
    fn test_jp_v0() {
        let mut state = Chip8State::new();
        state.data_registers[0] = 0x10;
        exec(&mut state, &JP_V0, 0xB300).unwrap();
        assert_eq!(state.program_counter(), 0x310);

        state.data_registers[0] = 0xFF;
        assert_eq!(
            exec(&mut state, &JP_V0, 0xBF80),
            Err(ExecutionFault::MemoryOutOfBounds { address: 0x107F })
        );
    }

    #[test]
    fn test_rnd_is_masked() {
        let mut state = Chip8State::new();
        exec(&mut state, &RND, 0xC50F).unwrap();
        assert_eq!(state.registers()[5] & 0xF0, 0);
        exec(&mut state, &RND, 0xC500).unwrap();
        assert_eq!(state.registers()[5], 0);
    }

    #[test]
    fn test_drw_collision() {
        let mut state = Chip8State::new();
        // glyph "0" from the font
        state.index_register = 0;
        exec(&mut state, &DRW, 0xD015).unwrap();
        assert_eq!(state.registers()[0xF], 0);
        assert_eq!(state.display().lit_count(), 14);

        exec(&mut state, &DRW, 0xD015).unwrap();
        assert_eq!(state.registers()[0xF], 1);
        assert_eq!(state.display().lit_count(), 0);
    }

    #[test]
    fn test_drw_reads_past_memory() {
        let mut state = Chip8State::new();
        state.index_register = 0xFFE;
        assert_eq!(
            exec(&mut state, &DRW, 0xD003),
            Err(ExecutionFault::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_key_skips() {
        let mut state = Chip8State::new();
        state.data_registers[2] = 0x7;
        assert_eq!(exec(&mut state, &SKNP, 0xE2A1), Ok(true));
        state.pressed_key = Key::new(0x7);
        assert_eq!(exec(&mut state, &SKP, 0xE29E), Ok(true));
        assert_eq!(exec(&mut state, &SKNP, 0xE2A1), Ok(false));
        assert_eq!(state.program_counter(), 0x208);
    }

    #[test]
    fn test_ld_vx_k_waits() {
        let mut state = Chip8State::new();
        assert_eq!(exec(&mut state, &LD_VX_K, 0xF30A), Ok(false));
        assert_eq!(state.key_wait(), KeyWait::WaitingForKey(3));
    }

    #[test]
    fn test_timers() {
        let mut state = Chip8State::new();
        state.data_registers[4] = 30;
        exec(&mut state, &LD_DT_VX, 0xF415).unwrap();
        exec(&mut state, &LD_ST_VX, 0xF418).unwrap();
        assert_eq!(state.delay_timer(), 30);
        assert_eq!(state.sound_timer(), 30);
        state.delay_timer = 12;
        exec(&mut state, &LD_VX_DT, 0xF507).unwrap();
        assert_eq!(state.registers()[5], 12);
    }

    #[test]
    fn test_add_i_wraps() {
        let mut state = Chip8State::new();
        state.index_register = 0xFFF;
        state.data_registers[0] = 2;
        exec(&mut state, &ADD_I_VX, 0xF01E).unwrap();
        assert_eq!(state.index_register(), 0x001);
        assert_eq!(state.registers()[0xF], 0);
    }

    #[test]
    fn test_ld_f() {
        let mut state = Chip8State::new();
        state.data_registers[0] = 0xA;
        exec(&mut state, &LD_F_VX, 0xF029).unwrap();
        assert_eq!(state.index_register(), 50);

        state.data_registers[0] = 0x10;
        assert_eq!(
            exec(&mut state, &LD_F_VX, 0xF029),
            Err(ExecutionFault::RegisterOutOfBounds { index: 0x10 })
        );
    }

    #[test]
    fn test_ld_b() {
        let mut state = Chip8State::new();
        state.index_register = 0x300;
        state.data_registers[6] = 234;
        exec(&mut state, &LD_B_VX, 0xF633).unwrap();
        assert_eq!(&state.ram()[0x300..0x303], &[2, 3, 4]);
    }

    #[test]
    fn test_ld_b_into_font_is_rejected() {
        let mut state = Chip8State::new();
        state.index_register = 0x010;
        assert_eq!(
            exec(&mut state, &LD_B_VX, 0xF033),
            Err(ExecutionFault::ReadOnlyMemory { address: 0x010 })
        );
    }

    #[test]
    fn test_store_and_load_registers() {
        let mut state = Chip8State::new();
        state.index_register = 0x400;
        state.data_registers[..4].copy_from_slice(&[1, 2, 3, 4]);
        exec(&mut state, &LD_MEM_VX, 0xF355).unwrap();
        assert_eq!(&state.ram()[0x400..0x405], &[1, 2, 3, 4, 0]);
        assert_eq!(state.index_register(), 0x400);

        state.data_registers = [0; 16];
        exec(&mut state, &LD_VX_MEM, 0xF265).unwrap();
        assert_eq!(&state.registers()[..4], &[1, 2, 3, 0]);
    }

    #[test]
    fn test_store_exclusive_range() {
        let mut state = Chip8State::new();
        let config = Chip8Config::default().with_load_store_range(LoadStoreRange::Exclusive);
        state.index_register = 0x400;
        state.data_registers[..3].copy_from_slice(&[9, 8, 7]);
        run(&mut state, &config, &LD_MEM_VX, 0xF255).unwrap();
        assert_eq!(&state.ram()[0x400..0x403], &[9, 8, 0]);
    }

    #[test]
    fn test_cls() {
        let mut state = Chip8State::new();
        state.display.draw(0, 0, &[0xFF]);
        exec(&mut state, &CLS, 0x00E0).unwrap();
        assert_eq!(state.display().lit_count(), 0);
    }
}
