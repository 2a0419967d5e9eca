/// Which register SHR/SHL shift. The COSMAC VIP shifted Vy into Vx,
/// most later ones shift Vx in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftSource {
    #[default]
    Vy,
    Vx,
}

/// Whether `LD [I], Vx` and `LD Vx, [I]` transfer Vx itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStoreRange {
    #[default]
    Inclusive,
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8Config {
    /// Nested calls allowed before CALL faults with a stack overflow.
    pub stack_depth: usize,
    /// Steps per timer decrement. 8 approximates 60 Hz timers at ~480 steps/s.
    pub timer_divider: u8,
    pub shift_source: ShiftSource,
    pub load_store_range: LoadStoreRange,
}

impl Default for Chip8Config {
    fn default() -> Self {
        Self {
            stack_depth: 16,
            timer_divider: 8,
            shift_source: ShiftSource::default(),
            load_store_range: LoadStoreRange::default(),
        }
    }
}

impl Chip8Config {
    pub fn with_stack_depth(mut self, stack_depth: usize) -> Self {
        self.stack_depth = stack_depth;
        self
    }

    /// A divider of 0 is treated as 1.
    pub fn with_timer_divider(mut self, timer_divider: u8) -> Self {
        self.timer_divider = timer_divider.max(1);
        self
    }

    pub fn with_shift_source(mut self, shift_source: ShiftSource) -> Self {
        self.shift_source = shift_source;
        self
    }

    pub fn with_load_store_range(mut self, load_store_range: LoadStoreRange) -> Self {
        self.load_store_range = load_store_range;
        self
    }
}
