use log::{debug, log_enabled, trace, Level};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    decode, disassemble,
    instruction::Execution,
    state::RAM_SIZE,
    Chip8Config, Chip8State, ExecutionFault, Fault, Key, KeyWait,
};

/// Drives a [`Chip8State`] forward one step at a time.
///
/// The interpreter owns only the configuration and the random number source
/// RND draws from. Timing is up to the host: call [`step`](Self::step) as often
/// as the program should run, passing the key held down at that moment.
pub struct Chip8Interpreter<R: RngCore = StdRng> {
    config: Chip8Config,
    rng: R,
}

impl Chip8Interpreter<StdRng> {
    pub fn new(config: Chip8Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same seed, same inputs, same states.
    pub fn seeded(config: Chip8Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl Default for Chip8Interpreter<StdRng> {
    fn default() -> Self {
        Self::new(Chip8Config::default())
    }
}

impl<R: RngCore> Chip8Interpreter<R> {
    pub fn with_rng(config: Chip8Config, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &Chip8Config {
        &self.config
    }

    /// Executes the instruction at the program counter, or keeps waiting for a
    /// key, and returns the resulting state. On error `state` is still the
    /// state of record; nothing of the failed step is kept.
    pub fn step(
        &mut self,
        state: &Chip8State,
        pressed_key: Option<Key>,
    ) -> Result<Chip8State, Fault> {
        let mut next = state.clone();
        next.pressed_key = pressed_key;

        match next.key_wait {
            KeyWait::WaitingForKey(register) => {
                if let Some(key) = pressed_key {
                    debug!("key {} pressed, stored in V{:X}", key, register);
                    next.data_registers[register as usize] = key.value();
                    next.key_wait = KeyWait::Running;
                    advance(&mut next)?;
                }
            }
            KeyWait::Running => self.execute(&mut next)?,
        }

        self.tick_timers(&mut next);
        Ok(next)
    }

    /// Runs `steps` steps with the same key held, stopping at the first fault.
    pub fn run(
        &mut self,
        state: &Chip8State,
        pressed_key: Option<Key>,
        steps: usize,
    ) -> Result<Chip8State, Fault> {
        let mut current = state.clone();
        for _ in 0..steps {
            current = self.step(&current, pressed_key)?;
        }
        Ok(current)
    }

    fn execute(&mut self, state: &mut Chip8State) -> Result<(), Fault> {
        let address = state.program_counter;
        let opcode = state.current_opcode()?;
        let decoded = decode(opcode)?;

        if log_enabled!(Level::Trace) {
            if let Ok(text) = disassemble(opcode) {
                trace!("{:03X}: {:04X}  {}", address, opcode, text);
            }
        }

        let mut cpu = Execution::new(state, &mut self.rng, &self.config);
        (decoded.instruction.execute)(&mut cpu, decoded.operands)?;
        let jumped = cpu.jumped();

        if let KeyWait::WaitingForKey(register) = state.key_wait {
            debug!("{:03X}: waiting for a key for V{:X}", address, register);
        } else if !jumped {
            advance(state)?;
        }
        Ok(())
    }

    fn tick_timers(&self, state: &mut Chip8State) {
        state.timer_phase = (state.timer_phase + 1) % self.config.timer_divider.max(1);
        if state.timer_phase == 0 {
            state.delay_timer = state.delay_timer.saturating_sub(1);
            state.sound_timer = state.sound_timer.saturating_sub(1);
        }
    }
}

/// The default move to the next instruction.
fn advance(state: &mut Chip8State) -> Result<(), ExecutionFault> {
    let next = state.program_counter as usize + 2;
    if next + 1 >= RAM_SIZE {
        return Err(ExecutionFault::MemoryOutOfBounds { address: next });
    }
    state.program_counter = next as u16;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;

    fn interpreter() -> Chip8Interpreter {
        Chip8Interpreter::seeded(Chip8Config::default(), 0x5EED)
    }

    #[test]
    fn test_step_advances() {
        let state = Chip8State::load_program(&[0x60, 0x2A, 0x71, 0x01]).unwrap();
        let mut interpreter = interpreter();
        let next = interpreter.step(&state, None).unwrap();
        assert_eq!(next.program_counter(), 0x202);
        assert_eq!(next.registers()[0], 0x2A);
        // the input state is untouched
        assert_eq!(state.registers()[0], 0);
    }

    #[test]
    fn test_jump_to_self_stays() {
        let state = Chip8State::load_program(&[0x12, 0x00]).unwrap();
        let next = interpreter().run(&state, None, 5).unwrap();
        assert_eq!(next.program_counter(), 0x200);
    }

    #[test]
    fn test_fault_keeps_nothing() {
        let state = Chip8State::load_program(&[0x60, 0x01, 0xFF, 0xFF]).unwrap();
        let mut interpreter = interpreter();
        let next = interpreter.step(&state, None).unwrap();
        assert_eq!(
            interpreter.step(&next, None),
            Err(Fault::Decode(DecodeError::UnknownOpcode { opcode: 0xFFFF }))
        );
        assert_eq!(next.program_counter(), 0x202);
    }

    #[test]
    fn test_running_off_the_end() {
        // SYS 000 in the last word has nowhere to go
        let state = Chip8State::load(&[0x00, 0x00], 0xFFE).unwrap();
        assert_eq!(
            interpreter().step(&state, None),
            Err(Fault::Execution(ExecutionFault::MemoryOutOfBounds {
                address: 0x1000
            }))
        );
    }

    #[test]
    fn test_timer_divider() {
        // LD V0, 3; LD DT, V0; LD ST, V0; JP 206
        let program = [0x60, 0x03, 0xF0, 0x15, 0xF0, 0x18, 0x12, 0x06];
        let state = Chip8State::load_program(&program).unwrap();
        let config = Chip8Config::default().with_timer_divider(4);
        let mut interpreter = Chip8Interpreter::seeded(config, 1);

        let state = interpreter.run(&state, None, 3).unwrap();
        assert_eq!((state.delay_timer(), state.sound_timer()), (3, 3));
        let state = interpreter.step(&state, None).unwrap();
        assert_eq!((state.delay_timer(), state.sound_timer()), (2, 2));
        let state = interpreter.run(&state, None, 40).unwrap();
        assert_eq!((state.delay_timer(), state.sound_timer()), (0, 0));
    }

    #[test]
    fn test_rnd_is_reproducible() {
        let program = [0xC0, 0xFF, 0xC1, 0xFF, 0xC2, 0xFF];
        let state = Chip8State::load_program(&program).unwrap();
        let first = interpreter().run(&state, None, 3).unwrap();
        let second = interpreter().run(&state, None, 3).unwrap();
        assert_eq!(first.registers(), second.registers());
    }

    #[test]
    fn test_pressed_key_recorded() {
        let state = Chip8State::load_program(&[0x12, 0x00]).unwrap();
        let next = interpreter().step(&state, Key::new(0xC)).unwrap();
        assert_eq!(next.pressed_key(), Key::new(0xC));
    }
}
