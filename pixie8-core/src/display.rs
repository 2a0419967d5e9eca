pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Monochrome 64x32 frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pixels: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
}

impl Default for Display {
    fn default() -> Self {
        Self {
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        }
    }
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    }

    /// Coordinates wrap, so any `x`/`y` addresses a pixel.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool; DISPLAY_WIDTH]> {
        self.pixels.iter()
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().flatten().filter(|lit| **lit).count()
    }

    /// XORs an 8-pixel-wide sprite onto the screen, one byte per row, most
    /// significant bit leftmost. Rows and columns wrap around the edges.
    /// Returns whether any lit pixel was turned off.
    pub fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut pixel_cleared = false;

        for (i, row_bits) in sprite.iter().enumerate() {
            let row = (y as usize + i) % DISPLAY_HEIGHT;
            for j in 0..8 {
                if row_bits & (0x80 >> j) == 0 {
                    continue;
                }
                let col = (x as usize + j) % DISPLAY_WIDTH;
                let pixel = &mut self.pixels[row][col];
                if *pixel {
                    pixel_cleared = true;
                }
                *pixel ^= true;
            }
        }

        pixel_cleared
    }
}
