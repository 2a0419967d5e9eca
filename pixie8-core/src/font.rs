/// Where the glyphs live. Glyph `d` starts at `FONT_ADDRESS + d * GLYPH_SIZE`.
pub const FONT_ADDRESS: usize = 0x000;
pub const GLYPH_SIZE: usize = 5;

pub const FONT: [u8; 16 * GLYPH_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// One past the last font byte; writes below this address are rejected.
pub const FONT_END: usize = FONT_ADDRESS + FONT.len();

/// Address of the glyph for a hex digit, or `None` if `digit` is not one.
pub fn glyph_address(digit: u8) -> Option<u16> {
    (digit < 0x10).then(|| (FONT_ADDRESS + digit as usize * GLYPH_SIZE) as u16)
}
