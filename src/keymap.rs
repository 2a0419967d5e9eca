use std::collections::HashMap;

use pixie8_core::Key;

/// Left-hand block of a QWERTY keyboard laid over the hex keypad:
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r  ->  4 5 6 D
/// a s d f      7 8 9 E
/// z x c v      A 0 B F
/// ```
const CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('4', 0xC),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('r', 0xD),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('f', 0xE),
    ('z', 0xA),
    ('x', 0x0),
    ('c', 0xB),
    ('v', 0xF),
];

/// Most terminals never report key releases, so a press counts as held for
/// this many frames after the last press or repeat event.
pub const KEY_HOLD_FRAMES: u8 = 6;

pub struct Keymap {
    keys: HashMap<char, Key>,
    held: Option<(Key, u8)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            keys: CONVENTIONAL_KEYMAP
                .iter()
                .filter_map(|&(c, value)| Key::new(value).map(|key| (c, key)))
                .collect(),
            held: None,
        }
    }
}

impl Keymap {
    pub fn lookup(&self, c: char) -> Option<Key> {
        self.keys.get(&c.to_ascii_lowercase()).copied()
    }

    /// Returns false for characters that are not mapped to a key.
    pub fn press(&mut self, c: char) -> bool {
        match self.lookup(c) {
            Some(key) => {
                self.held = Some((key, KEY_HOLD_FRAMES));
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, c: char) {
        if let (Some(key), Some((held, _))) = (self.lookup(c), self.held) {
            if key == held {
                self.held = None;
            }
        }
    }

    pub fn held_key(&self) -> Option<Key> {
        self.held.map(|(key, _)| key)
    }

    pub fn end_frame(&mut self) {
        self.held = match self.held {
            Some((key, frames)) if frames > 1 => Some((key, frames - 1)),
            _ => None,
        };
    }
}
