/*!
# acorndisc

A Rust library for Acorn DFS/ADFS floppy disc images with an emulated
two-drive subsystem for retro-computer emulators.

## Features

- Format registry covering SSD, DSD, ADF, ADL and FDI images
- Detection by extension with a file-size fallback for the common raw dumps
- Blank image creation, including the ADFS boot/root-directory stamp
- Two drive slots with per-format capability sets and poll-driven transfers
- Hardware-realistic delayed "not found" signalling toward the FDC

## Quick Start

```rust,no_run
use acorndisc::{Density, DiscSystem, FdcEvents, SilentSeek};

struct Controller;

impl FdcEvents for Controller {
    fn data_ready(&mut self, data: u8) { print!("{data:02X} "); }
    fn finish_read(&mut self) { println!("done"); }
    fn not_found(&mut self) { println!("not found"); }
    fn data_crc_error(&mut self) {}
    fn header_crc_error(&mut self) {}
    fn write_protect(&mut self) {}
    fn spin_down(&mut self) {}
    fn next_write_byte(&mut self, _last: bool) -> u8 { 0 }
}

let mut system = DiscSystem::new(Box::new(Controller), Box::new(SilentSeek));
system.load_image(0, "game.ssd")?;
system.seek(0, 0);
system.read_sector(0, 0, 0, 0, Density::Single);
for _ in 0..256 {
    system.poll(); // one emulated tick each
}
# Ok::<(), acorndisc::DiscError>(())
```

## Modules

- `format`: format registry, geometry presets and detection
- `boot`: blank image synthesis with ADFS boot-sector stamps
- `image`: raw sector-dump images
- `medium`: per-format drive media and their capability sets
- `drive`: the two drive slots
- `fdc`: callback boundaries toward the FDC and seek feedback
- `system`: the controller-facing dispatch surface
- `error`: error types and Result alias
*/

#![warn(missing_docs)]

/// Blank image synthesis with ADFS boot-sector stamps
pub mod boot;
/// Drive slot state
pub mod drive;
/// Error types and Result alias
pub mod error;
/// Callback boundaries toward the FDC and seek feedback
pub mod fdc;
/// Disc image format registry and detection
pub mod format;
/// Raw sector-dump images
pub mod image;
/// Per-format drive media and capability sets
pub mod medium;
/// The controller-facing dispatch surface
pub mod system;

// Re-export common types
pub use boot::{boot_stamp, create_blank_image, BootStamp, ADF_STAMP, ADL_STAMP};
pub use drive::DriveSlot;
pub use error::{DiscError, Result};
pub use fdc::{FdcEvents, SeekFeedback, SilentSeek};
pub use format::{
    lookup_extension, resolve, resolve_extension, Density, Detection, FormatDescriptor,
    FormatKind, Geometry, SideLayout, REGISTRY,
};
pub use image::SectorImage;
pub use medium::{FdiMedium, HandlerSet, Medium, SectorMedium, SPIN_DOWN_DELAY};
pub use system::{DiscSystem, NOT_FOUND_DELAY, NUM_DRIVES};
