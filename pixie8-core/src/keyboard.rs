use std::fmt;

/// One of the sixteen logical keys, 0x0 to 0xF. How physical input maps onto
/// them is up to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u8);

impl Key {
    pub fn new(value: u8) -> Option<Self> {
        (value < 0x10).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// Whether the machine is blocked on `LD Vx, K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyWait {
    #[default]
    Running,
    /// The next pressed key goes into this register.
    WaitingForKey(u8),
}
