//! Interactive console for exercising the disc subsystem

use std::cell::RefCell;
use std::rc::Rc;

use acorndisc::{Density, DiscSystem, FdcEvents, Medium, SeekFeedback, REGISTRY};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Command completer for the REPL
struct CommandCompleter {
    commands: Vec<&'static str>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: vec![
                "address", "drive", "eject", "exit", "format", "formats", "help", "load", "new",
                "poll", "quit", "read", "reset", "run", "seek", "status", "write",
            ],
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete the first word (command name)
        let line_to_cursor = &line[..pos];
        if line_to_cursor.contains(' ') {
            return Ok((pos, vec![]));
        }

        let prefix = line_to_cursor.to_lowercase();
        let matches: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Get the path to the history file
fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".acorndisc_history");
        p
    })
}

/// Everything the emulated controller would observe, collected so the
/// console can display it after a batch of polls
#[derive(Default)]
struct ConsoleState {
    data: Vec<u8>,
    events: Vec<String>,
    fill_byte: u8,
    settled: bool,
}

#[derive(Clone, Default)]
struct ConsoleFdc(Rc<RefCell<ConsoleState>>);

impl FdcEvents for ConsoleFdc {
    fn data_ready(&mut self, data: u8) {
        self.0.borrow_mut().data.push(data);
    }
    fn finish_read(&mut self) {
        let mut st = self.0.borrow_mut();
        st.events.push("transfer complete".to_string());
        st.settled = true;
    }
    fn not_found(&mut self) {
        let mut st = self.0.borrow_mut();
        st.events.push("sector not found".to_string());
        st.settled = true;
    }
    fn data_crc_error(&mut self) {
        self.0.borrow_mut().events.push("data CRC error".to_string());
    }
    fn header_crc_error(&mut self) {
        self.0.borrow_mut().events.push("header CRC error".to_string());
    }
    fn write_protect(&mut self) {
        let mut st = self.0.borrow_mut();
        st.events.push("write protected".to_string());
        st.settled = true;
    }
    fn spin_down(&mut self) {
        self.0.borrow_mut().events.push("motor spun down".to_string());
    }
    fn next_write_byte(&mut self, _last: bool) -> u8 {
        self.0.borrow().fill_byte
    }
}

impl SeekFeedback for ConsoleFdc {
    fn head_step(&mut self, delta: i32) {
        if delta != 0 {
            self.0
                .borrow_mut()
                .events
                .push(format!("head stepped {:+} tracks", delta));
        }
    }
}

fn main() {
    env_logger::init();

    println!("=== acorndisc ===");
    println!("Interactive console for the emulated two-drive disc subsystem.");
    println!("Type 'help' for available commands\n");

    let mut rl = Editor::new().expect("Failed to create editor");
    rl.set_helper(Some(CommandCompleter::new()));

    // Load history if available
    if let Some(history_path) = history_path() {
        let _ = rl.load_history(&history_path);
    }

    let fdc = ConsoleFdc::default();
    let mut system = DiscSystem::new(Box::new(fdc.clone()), Box::new(fdc.clone()));

    loop {
        let readline = rl.readline("> ");
        let input = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let _ = rl.add_history_entry(input);

        let parts = parse_command_line(input);
        if parts.is_empty() {
            continue;
        }
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "help" => {
                print_help();
            }
            "quit" | "exit" => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            "formats" => {
                for desc in REGISTRY {
                    let size = match desc.kind.canonical_size() {
                        Some(s) => format!("{} bytes", s),
                        None => "variable".to_string(),
                    };
                    println!("  .{:<4} {:<18} {}", desc.extension, desc.kind.name(), size);
                }
            }
            "load" => {
                if let Some((drive, path)) = drive_and_path(&parts) {
                    match system.load_image(drive, &path) {
                        Ok(()) => {
                            let kind = system.drive(drive).and_then(|s| s.format());
                            println!(
                                "Loaded {} into drive {} as {}",
                                path,
                                drive,
                                kind.map(|k| k.name()).unwrap_or("?")
                            );
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("Usage: load <drive> <path>");
                }
            }
            "new" => {
                if let Some((drive, path)) = drive_and_path(&parts) {
                    match system.create_image(drive, &path) {
                        Ok(()) => println!("Created {} and loaded into drive {}", path, drive),
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("Usage: new <drive> <path>");
                }
            }
            "eject" => {
                let drive = arg(&parts, 1).unwrap_or(0);
                match system.eject(drive) {
                    Ok(()) => println!("Ejected drive {}", drive),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "drive" => {
                if let Some(n) = arg(&parts, 1) {
                    system.set_active_drive(n);
                }
                println!("Active drive: {}", system.active_drive());
            }
            "seek" => {
                match (arg(&parts, 1), arg(&parts, 2)) {
                    (Some(drive), Some(track)) => {
                        system.seek(drive, track as u8);
                        drain_events(&fdc);
                    }
                    _ => println!("Usage: seek <drive> <track>"),
                }
            }
            "read" => {
                match (arg(&parts, 1), arg(&parts, 2), arg(&parts, 3), arg(&parts, 4)) {
                    (Some(drive), Some(sector), Some(track), Some(side)) => {
                        let density = drive_density(&system, drive);
                        system.seek(drive, track as u8);
                        system.read_sector(drive, sector as u8, track as u8, side as u8, density);
                        run_until_settled(&mut system, &fdc);
                        let data = std::mem::take(&mut fdc.0.borrow_mut().data);
                        if !data.is_empty() {
                            print_hex_dump(&data, 256);
                        }
                        drain_events(&fdc);
                    }
                    _ => println!("Usage: read <drive> <sector> <track> <side>"),
                }
            }
            "write" => {
                match (arg(&parts, 1), arg(&parts, 2), arg(&parts, 3), arg(&parts, 4)) {
                    (Some(drive), Some(sector), Some(track), Some(side)) => {
                        let byte = arg(&parts, 5).unwrap_or(0xE5) as u8;
                        fdc.0.borrow_mut().fill_byte = byte;
                        let density = drive_density(&system, drive);
                        system.seek(drive, track as u8);
                        system.write_sector(drive, sector as u8, track as u8, side as u8, density);
                        run_until_settled(&mut system, &fdc);
                        drain_events(&fdc);
                    }
                    _ => println!("Usage: write <drive> <sector> <track> <side> [byte]"),
                }
            }
            "address" => {
                match (arg(&parts, 1), arg(&parts, 2), arg(&parts, 3)) {
                    (Some(drive), Some(track), Some(side)) => {
                        let density = drive_density(&system, drive);
                        system.seek(drive, track as u8);
                        system.read_address(drive, track as u8, side as u8, density);
                        run_until_settled(&mut system, &fdc);
                        let id = std::mem::take(&mut fdc.0.borrow_mut().data);
                        if id.len() == 6 {
                            println!(
                                "ID: cylinder {} head {} record {} size {}",
                                id[0], id[1], id[2], 128usize << id[3]
                            );
                        }
                        drain_events(&fdc);
                    }
                    _ => println!("Usage: address <drive> <track> <side>"),
                }
            }
            "format" => {
                match (arg(&parts, 1), arg(&parts, 2), arg(&parts, 3)) {
                    (Some(drive), Some(track), Some(side)) => {
                        let density = drive_density(&system, drive);
                        system.seek(drive, track as u8);
                        system.format_track(drive, track as u8, side as u8, density);
                        run_until_settled(&mut system, &fdc);
                        drain_events(&fdc);
                    }
                    _ => println!("Usage: format <drive> <track> <side>"),
                }
            }
            "poll" => {
                let ticks = arg(&parts, 1).unwrap_or(1);
                for _ in 0..ticks {
                    system.poll();
                }
                let data_len = fdc.0.borrow().data.len();
                if data_len > 0 {
                    println!("{} data bytes pending", data_len);
                }
                drain_events(&fdc);
            }
            "run" => {
                run_until_settled(&mut system, &fdc);
                let data = std::mem::take(&mut fdc.0.borrow_mut().data);
                if !data.is_empty() {
                    print_hex_dump(&data, 256);
                }
                drain_events(&fdc);
            }
            "reset" => {
                system.reset();
                println!("Controller reset; active drive 0");
            }
            "status" => {
                print_status(&system);
            }
            _ => {
                println!("Unknown command '{}'. Type 'help' for a list.", command);
            }
        }
    }
}

/// Parse a drive index and path argument pair
fn drive_and_path(parts: &[String]) -> Option<(usize, String)> {
    if parts.len() < 3 {
        return None;
    }
    let drive = parts[1].parse().ok()?;
    Some((drive, parts[2].clone()))
}

/// Parse a numeric argument
fn arg(parts: &[String], index: usize) -> Option<usize> {
    parts.get(index).and_then(|p| p.parse().ok())
}

/// Density the mounted medium records, defaulting to FM for empty drives
fn drive_density(system: &DiscSystem, drive: usize) -> Density {
    system
        .drive(drive)
        .and_then(|slot| slot.medium())
        .and_then(|medium| match medium {
            Medium::Sector(m) => Some(m.image().geometry().density),
            Medium::Fdi(_) => None,
        })
        .unwrap_or(Density::Single)
}

/// Poll the subsystem until the controller reports a terminal event, with a
/// generous tick budget so the delayed not-found path completes too
fn run_until_settled(system: &mut DiscSystem, fdc: &ConsoleFdc) {
    fdc.0.borrow_mut().settled = false;
    for _ in 0..2 * acorndisc::NOT_FOUND_DELAY {
        system.poll();
        if fdc.0.borrow().settled {
            return;
        }
    }
    println!("(no completion event within the tick budget)");
}

/// Print and clear collected controller events
fn drain_events(fdc: &ConsoleFdc) {
    let events = std::mem::take(&mut fdc.0.borrow_mut().events);
    for event in events {
        println!("  [{}]", event);
    }
}

fn print_status(system: &DiscSystem) {
    println!("Active drive: {}", system.active_drive());
    for drive in 0..acorndisc::NUM_DRIVES {
        let Some(slot) = system.drive(drive) else {
            continue;
        };
        match slot.medium() {
            Some(medium) => {
                let h = slot.handlers();
                let mut ops = Vec::new();
                if h.poll {
                    ops.push("poll");
                }
                if h.seek {
                    ops.push("seek");
                }
                if h.read_sector {
                    ops.push("read");
                }
                if h.write_sector {
                    ops.push("write");
                }
                if h.read_address {
                    ops.push("address");
                }
                if h.format {
                    ops.push("format");
                }
                println!(
                    "Drive {}: {} ({}) track {} ops [{}]",
                    drive,
                    medium.path().display(),
                    slot.format().map(|k| k.name()).unwrap_or("?"),
                    slot.track(),
                    ops.join(" ")
                );
            }
            None => println!("Drive {}: empty", drive),
        }
    }
}

fn print_hex_dump(data: &[u8], limit: usize) {
    for (i, chunk) in data[..data.len().min(limit)].chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
            .collect();
        println!("{:04X}  {:<48}  {}", i * 16, hex.join(" "), ascii);
    }
    if data.len() > limit {
        println!("... {} more bytes", data.len() - limit);
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  load <drive> <path>             - Load a disc image (use quotes for paths with spaces)");
    println!("  new <drive> <path>              - Create a blank image and load it (.ssd/.dsd/.adf/.adl)");
    println!("  eject <drive>                   - Eject, flushing writes back to the image file");
    println!("  drive [n]                       - Show or set the active drive");
    println!("  seek <drive> <track>            - Step the head");
    println!("  read <drive> <sec> <trk> <side> - Read a sector and hex dump it");
    println!("  write <drive> <sec> <trk> <side> [byte] - Fill a sector with a byte (default 229)");
    println!("  address <drive> <trk> <side>    - Read the next ID field");
    println!("  format <drive> <trk> <side>     - Format (zero) a track");
    println!("  poll [n]                        - Run n emulation ticks (default 1)");
    println!("  run                             - Poll until the controller reports completion");
    println!("  reset                           - Controller reset");
    println!("  status                          - Show both drive slots");
    println!("  formats                         - List registered image formats");
    println!("  help                            - Show this help");
    println!("  quit, exit                      - Exit");
}

fn parse_command_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}
