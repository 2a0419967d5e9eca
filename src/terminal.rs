use std::{
    io::{self, stdout, Stdout, Write},
    time::Duration,
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{self, Stylize},
    terminal,
};
use log::debug;
use pixie8_core::{disassemble, Chip8State, DISPLAY_HEIGHT};

use crate::keymap::Keymap;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Continue,
    Quit,
}

/// Raw-mode terminal on the alternate screen. Dropping it restores the terminal.
pub struct TerminalScreen {
    stdout: Stdout,
}

impl TerminalScreen {
    pub fn new() -> io::Result<Self> {
        let mut stdout = stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )?;
        Ok(Self { stdout })
    }

    /// Drains pending terminal events into `keymap`.
    pub fn poll_input(&mut self, keymap: &mut Keymap) -> io::Result<Input> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Input::Quit = handle_key(keymap, key) {
                    return Ok(Input::Quit);
                }
            }
        }
        Ok(Input::Continue)
    }

    pub fn draw(&mut self, state: &Chip8State) -> io::Result<()> {
        for (row, pixels) in state.display().rows().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, row as u16))?;
            for lit in pixels {
                if *lit {
                    queue!(self.stdout, style::PrintStyledContent("██".yellow()))?
                } else {
                    queue!(self.stdout, style::PrintStyledContent("  ".black()))?
                }
            }
        }

        for (i, line) in status_lines(state).iter().enumerate() {
            queue!(
                self.stdout,
                cursor::MoveTo(0, (DISPLAY_HEIGHT + 1 + i) as u16),
                terminal::Clear(terminal::ClearType::CurrentLine),
                style::Print(line)
            )?;
        }

        self.stdout.flush()
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        // nothing sensible to do if the terminal refuses
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Applies one key event to `keymap`. Nothing here may log above `debug`:
/// stderr is the same tty as the alternate screen.
fn handle_key(keymap: &mut Keymap, key: KeyEvent) -> Input {
    match key.code {
        KeyCode::Esc => return Input::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Input::Quit
        }
        KeyCode::Char(c) if key.kind == KeyEventKind::Release => keymap.release(c),
        KeyCode::Char(c) => {
            if !keymap.press(c) {
                debug!("{:?} is not mapped to a key", c);
            }
        }
        _ => {}
    }
    Input::Continue
}

/// Register panel and current instruction shown under the display.
pub fn status_lines(state: &Chip8State) -> [String; 3] {
    let mut header = String::new();
    let mut values = String::new();
    for (i, value) in state.registers().iter().enumerate() {
        header += &format!(" V{:X}", i);
        values += &format!(" {:02X}", value);
    }
    header += "  PC   I    DT ST";
    values += &format!(
        "  {:03X}  {:03X}  {:02X} {:02X}",
        state.program_counter(),
        state.index_register(),
        state.delay_timer(),
        state.sound_timer()
    );

    let instruction = match state.current_opcode() {
        Ok(opcode) => match disassemble(opcode) {
            Ok(text) => format!("{:04X}  {}", opcode, text),
            Err(error) => format!("{:04X}  {}", opcode, error),
        },
        Err(error) => error.to_string(),
    };
    let waiting = if state.is_waiting_for_key() {
        "  (waiting for key)"
    } else {
        ""
    };

    [header, values, format!(" {}{}", instruction, waiting)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        let state = Chip8State::load_program(&[0x6A, 0x05]).unwrap();
        let [header, values, instruction] = status_lines(&state);
        assert!(header.starts_with(" V0 V1"));
        assert!(header.ends_with("PC   I    DT ST"));
        assert!(values.ends_with("200  000  00 00"));
        assert_eq!(instruction, " 6A05  LD VA, 5");
    }

    #[test]
    fn test_status_unknown_opcode() {
        let state = Chip8State::load_program(&[0xFF, 0xFF]).unwrap();
        let [_, _, instruction] = status_lines(&state);
        assert_eq!(instruction, " FFFF  unknown opcode FFFF");
    }

    #[test]
    fn test_unmapped_key_keeps_running() {
        let mut keymap = Keymap::default();
        let key = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);
        assert_eq!(handle_key(&mut keymap, key), Input::Continue);
        assert_eq!(keymap.held_key(), None);

        let key = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE);
        assert_eq!(handle_key(&mut keymap, key), Input::Continue);
        assert_eq!(keymap.held_key(), pixie8_core::Key::new(0x5));
    }

    #[test]
    fn test_quit_keys() {
        let mut keymap = Keymap::default();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(handle_key(&mut keymap, esc), Input::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut keymap, ctrl_c), Input::Quit);
    }
}
