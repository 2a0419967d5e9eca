mod keymap;
mod terminal;

use std::{
    error::Error,
    fs,
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use clap::{arg, command, value_parser, ArgAction};
use log::{error, info, LevelFilter};
use pixie8_core::{
    listing, Chip8Config, Chip8Interpreter, Chip8State, Fault, LoadStoreRange, ShiftSource,
    PROGRAM_START,
};
use simple_logger::SimpleLogger;

use keymap::Keymap;
use terminal::{Input, TerminalScreen};

const FRAME_RATE: u32 = 60;

#[derive(Debug, thiserror::Error)]
#[error("halted at {address:03X} ({opcode}): {fault}")]
struct Halted {
    address: u16,
    opcode: String,
    fault: Fault,
}

pub struct Frontend {
    pub steps_per_frame: usize,
    screen: TerminalScreen,
    keymap: Keymap,
}

impl Frontend {
    pub fn new(steps_per_frame: usize) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            steps_per_frame,
            screen: TerminalScreen::new()?,
            keymap: Keymap::default(),
        })
    }

    /// Runs until Esc is pressed or the program faults.
    pub fn run(
        &mut self,
        mut interpreter: Chip8Interpreter,
        mut state: Chip8State,
    ) -> Result<Chip8State, Box<dyn Error>> {
        let frame_time = Duration::from_secs_f64(1. / FRAME_RATE as f64);

        loop {
            let start_frame_time = Instant::now();

            if let Input::Quit = self.screen.poll_input(&mut self.keymap)? {
                return Ok(state);
            }

            let key = self.keymap.held_key();
            for _ in 0..self.steps_per_frame {
                state = interpreter
                    .step(&state, key)
                    .map_err(|fault| Halted {
                        address: state.program_counter(),
                        opcode: state
                            .current_opcode()
                            .map(|opcode| format!("{:04X}", opcode))
                            .unwrap_or_else(|_| "----".to_owned()),
                        fault,
                    })?;
            }
            self.keymap.end_frame();

            self.screen.draw(&state)?;

            if let Some(wait_time) = frame_time.checked_sub(start_frame_time.elapsed()) {
                thread::sleep(wait_time);
            }
        }
    }
}

fn print_listing(program: &[u8]) {
    for line in listing(program, PROGRAM_START) {
        match line.text {
            Ok(text) => println!("{:03X}: {:04X}  {}", line.address, line.opcode, text),
            Err(error) => println!("{:03X}: {:04X}  ; {}", line.address, line.opcode, error),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let rom_arg = arg!(<rom> "The CHIP-8 program to run").value_parser(value_parser!(PathBuf));

    let steps_arg = arg!(-s --"steps-per-frame" <STEPS> "How many instructions run per frame, at 60 frames per second")
        .value_parser(value_parser!(usize))
        .default_value("8");

    let seed_arg = arg!(--seed <SEED> "Seed for RND, for reproducible runs")
        .value_parser(value_parser!(u64));

    let stack_arg = arg!(--"stack-depth" <DEPTH> "How many nested calls are allowed")
        .value_parser(value_parser!(usize))
        .default_value("16");

    let divider_arg = arg!(--"timer-divider" <STEPS> "Steps per delay/sound timer decrement")
        .value_parser(value_parser!(u8).range(1..))
        .default_value("8");

    let shift_arg = arg!(--"shift-in-place" "SHR and SHL shift Vx instead of Vy")
        .action(ArgAction::SetTrue);

    let exclusive_arg =
        arg!(--"exclusive-load-store" "LD [I], Vx and LD Vx, [I] stop before Vx")
            .action(ArgAction::SetTrue);

    let disassemble_arg = arg!(-d --disassemble "Print a listing of the program and exit")
        .action(ArgAction::SetTrue);

    let log_arg = arg!(--"log-level" <LEVEL> "Log level for messages on stderr; redirect stderr below warn")
        .value_parser(value_parser!(LevelFilter))
        .default_value("warn");

    let matches = command!()
        .arg(rom_arg)
        .arg(steps_arg)
        .arg(seed_arg)
        .arg(stack_arg)
        .arg(divider_arg)
        .arg(shift_arg)
        .arg(exclusive_arg)
        .arg(disassemble_arg)
        .arg(log_arg)
        .get_matches();

    let log_level = *matches.get_one::<LevelFilter>("log-level").unwrap();
    SimpleLogger::new().with_level(log_level).init()?;

    let rom = matches.get_one::<PathBuf>("rom").unwrap();
    let program = fs::read(rom)?;

    if *matches.get_one::<bool>("disassemble").unwrap() {
        print_listing(&program);
        return Ok(());
    }

    let mut config = Chip8Config::default()
        .with_stack_depth(*matches.get_one::<usize>("stack-depth").unwrap())
        .with_timer_divider(*matches.get_one::<u8>("timer-divider").unwrap());
    if *matches.get_one::<bool>("shift-in-place").unwrap() {
        config = config.with_shift_source(ShiftSource::Vx);
    }
    if *matches.get_one::<bool>("exclusive-load-store").unwrap() {
        config = config.with_load_store_range(LoadStoreRange::Exclusive);
    }

    let interpreter = match matches.get_one::<u64>("seed") {
        Some(seed) => Chip8Interpreter::seeded(config, *seed),
        None => Chip8Interpreter::new(config),
    };

    let state = Chip8State::load_program(&program)?;
    info!("running {} ({} bytes)", rom.display(), program.len());

    let steps_per_frame = *matches.get_one::<usize>("steps-per-frame").unwrap();
    let mut frontend = Frontend::new(steps_per_frame)?;
    let result = frontend.run(interpreter, state);
    // leave the alternate screen before anything is printed
    drop(frontend);

    if let Err(err) = &result {
        error!("{}", err);
    }
    result.map(|_| ())
}
