//! Per-format drive media
//!
//! Each supported format binds a drive slot to one variant of [`Medium`],
//! which supplies the subset of controller operations that format models.
//! A raw sector dump supports everything; the FDI container mounts but
//! exposes no operations, so every controller request takes the delayed
//! not-found path in the dispatch layer.

use crate::error::{DiscError, Result};
use crate::fdc::FdcEvents;
use crate::format::{Density, Geometry};
use crate::image::SectorImage;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Polls of inactivity after a completed transfer before the motor is
/// reported spun down
pub const SPIN_DOWN_DELAY: u32 = 2_000;

/// Which controller operations the bound format wired into a drive slot.
/// Each handler is independently present or absent; the reset contract
/// clears some of them without unbinding the medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerSet {
    /// Per-tick operation progress
    pub poll: bool,
    /// Head positioning
    pub seek: bool,
    /// Sector read
    pub read_sector: bool,
    /// Sector write
    pub write_sector: bool,
    /// ID field read
    pub read_address: bool,
    /// Track format
    pub format: bool,
}

impl HandlerSet {
    /// No handlers wired
    pub const NONE: HandlerSet = HandlerSet {
        poll: false,
        seek: false,
        read_sector: false,
        write_sector: false,
        read_address: false,
        format: false,
    };

    /// All six handlers wired
    pub const FULL: HandlerSet = HandlerSet {
        poll: true,
        seek: true,
        read_sector: true,
        write_sector: true,
        read_address: true,
        format: true,
    };
}

/// In-progress operation state for a sector-dump medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Idle,
    Read {
        track: u8,
        side: u8,
        sector: u8,
        pos: usize,
    },
    Write {
        track: u8,
        side: u8,
        sector: u8,
        pos: usize,
    },
    ReadAddress {
        side: u8,
        pos: usize,
    },
    Format {
        track: u8,
        side: u8,
        remaining: usize,
    },
}

/// A mounted raw sector dump with its transfer state machine.
///
/// Transfers advance one byte per poll: reads push bytes through
/// [`FdcEvents::data_ready`], writes pull them via
/// [`FdcEvents::next_write_byte`], and every operation ends with
/// [`FdcEvents::finish_read`].
#[derive(Debug)]
pub struct SectorMedium {
    image: SectorImage,
    /// Head position from the last seek
    track: u8,
    /// Cycling sector id reported by read-address
    address_counter: u8,
    transfer: Transfer,
    /// Idle countdown toward the spin-down callback; 0 = disarmed
    spin_down: u32,
}

impl SectorMedium {
    /// Mount an image file with the given raw geometry
    pub fn open<P: AsRef<Path>>(path: P, geometry: Geometry) -> Result<Self> {
        Ok(Self {
            image: SectorImage::open(path, geometry)?,
            track: 0,
            address_counter: 0,
            transfer: Transfer::Idle,
            spin_down: 0,
        })
    }

    /// The mounted image
    pub fn image(&self) -> &SectorImage {
        &self.image
    }

    #[cfg(test)]
    pub(crate) fn image_mut(&mut self) -> &mut SectorImage {
        &mut self.image
    }

    fn geometry(&self) -> Geometry {
        *self.image.geometry()
    }

    /// A request is serviceable only when it addresses the seeked track and
    /// fits the mounted geometry and density; anything else looks like an
    /// unformatted region to the controller.
    fn addressable(&self, track: u8, side: u8, density: Density) -> bool {
        let geom = self.geometry();
        track == self.track && track < geom.tracks && side < geom.sides && density == geom.density
    }

    fn seek(&mut self, track: u8) {
        let geom = self.geometry();
        self.track = track.min(geom.tracks.saturating_sub(1));
    }

    fn read_sector(&mut self, sector: u8, track: u8, side: u8, density: Density) -> bool {
        if !self.addressable(track, side, density) || sector >= self.geometry().sectors_per_track {
            return false;
        }
        self.transfer = Transfer::Read {
            track,
            side,
            sector,
            pos: 0,
        };
        true
    }

    fn write_sector(
        &mut self,
        fdc: &mut dyn FdcEvents,
        sector: u8,
        track: u8,
        side: u8,
        density: Density,
    ) -> bool {
        if !self.addressable(track, side, density) || sector >= self.geometry().sectors_per_track {
            return false;
        }
        if self.image.is_write_protected() {
            fdc.write_protect();
            return true;
        }
        self.transfer = Transfer::Write {
            track,
            side,
            sector,
            pos: 0,
        };
        true
    }

    fn read_address(&mut self, track: u8, side: u8, density: Density) -> bool {
        if !self.addressable(track, side, density) {
            return false;
        }
        self.transfer = Transfer::ReadAddress { side, pos: 0 };
        true
    }

    fn format_track(
        &mut self,
        fdc: &mut dyn FdcEvents,
        track: u8,
        side: u8,
        density: Density,
    ) -> bool {
        if !self.addressable(track, side, density) {
            return false;
        }
        if self.image.is_write_protected() {
            fdc.write_protect();
            return true;
        }
        self.transfer = Transfer::Format {
            track,
            side,
            remaining: self.geometry().track_span(),
        };
        true
    }

    fn finish(&mut self, fdc: &mut dyn FdcEvents) {
        self.transfer = Transfer::Idle;
        self.spin_down = SPIN_DOWN_DELAY;
        fdc.finish_read();
    }

    fn poll(&mut self, fdc: &mut dyn FdcEvents) {
        let sector_size = self.geometry().sector_size as usize;
        match self.transfer {
            Transfer::Idle => {
                if self.spin_down > 0 {
                    self.spin_down -= 1;
                    if self.spin_down == 0 {
                        fdc.spin_down();
                    }
                }
            }
            Transfer::Read {
                track,
                side,
                sector,
                pos,
            } => {
                let byte = self
                    .image
                    .sector(track, side, sector)
                    .map(|data| data[pos])
                    .unwrap_or(0);
                fdc.data_ready(byte);
                if pos + 1 == sector_size {
                    self.finish(fdc);
                } else {
                    self.transfer = Transfer::Read {
                        track,
                        side,
                        sector,
                        pos: pos + 1,
                    };
                }
            }
            Transfer::Write {
                track,
                side,
                sector,
                pos,
            } => {
                let last = pos + 1 == sector_size;
                let byte = fdc.next_write_byte(last);
                if let Some(data) = self.image.sector_mut(track, side, sector) {
                    data[pos] = byte;
                }
                if last {
                    self.finish(fdc);
                } else {
                    self.transfer = Transfer::Write {
                        track,
                        side,
                        sector,
                        pos: pos + 1,
                    };
                }
            }
            Transfer::ReadAddress { side, pos } => {
                let geom = self.geometry();
                // Cylinder, head, record, size code, then the two CRC bytes
                let id = [
                    self.track,
                    side,
                    self.address_counter,
                    size_code(geom.sector_size),
                    0,
                    0,
                ];
                fdc.data_ready(id[pos]);
                if pos + 1 == id.len() {
                    self.address_counter = (self.address_counter + 1) % geom.sectors_per_track;
                    self.finish(fdc);
                } else {
                    self.transfer = Transfer::ReadAddress {
                        side,
                        pos: pos + 1,
                    };
                }
            }
            Transfer::Format {
                track,
                side,
                remaining,
            } => {
                if remaining > 1 {
                    self.transfer = Transfer::Format {
                        track,
                        side,
                        remaining: remaining - 1,
                    };
                } else {
                    self.image.wipe_track(track, side);
                    self.finish(fdc);
                }
            }
        }
    }
}

/// IDs an FM/MFM ID field carries for a sector size (128 << code bytes)
fn size_code(sector_size: u16) -> u8 {
    let mut code = 0u8;
    let mut size = 128u16;
    while size < sector_size && code < 7 {
        size <<= 1;
        code += 1;
    }
    code
}

/// Signature at the start of every FDI container file
pub const FDI_SIGNATURE: &[u8] = b"Formatted Disk Image file";

/// A mounted FDI container.
///
/// The container's track decoding belongs to an external collaborator; this
/// medium only validates the signature and holds the mount. It advertises no
/// controller operations, so reads and writes against it surface as a timed
/// not-found, the way an unreadable disc would on real hardware.
#[derive(Debug)]
pub struct FdiMedium {
    path: PathBuf,
}

impl FdiMedium {
    /// Mount an FDI file, validating its signature
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        if !data.starts_with(FDI_SIGNATURE) {
            return Err(DiscError::BadSignature(path.to_path_buf()));
        }
        debug!("mounted FDI container {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// The file this container was mounted from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The closed set of media a drive slot can be bound to
#[derive(Debug)]
pub enum Medium {
    /// Raw sector dump (SSD/DSD/ADF/ADL and the DOS sub-variants)
    Sector(SectorMedium),
    /// FDI container (no controller operations)
    Fdi(FdiMedium),
}

impl Medium {
    /// The operation handlers this medium supplies
    pub fn handlers(&self) -> HandlerSet {
        match self {
            Medium::Sector(_) => HandlerSet::FULL,
            Medium::Fdi(_) => HandlerSet::NONE,
        }
    }

    /// Advance the in-progress operation one step
    pub fn poll(&mut self, fdc: &mut dyn FdcEvents) {
        match self {
            Medium::Sector(m) => m.poll(fdc),
            Medium::Fdi(_) => {}
        }
    }

    /// Position the head
    pub fn seek(&mut self, track: u8) {
        match self {
            Medium::Sector(m) => m.seek(track),
            Medium::Fdi(_) => {}
        }
    }

    /// Begin a sector read. Returns false if the request is not
    /// serviceable (the dispatch layer then arms the not-found timer).
    pub fn read_sector(&mut self, sector: u8, track: u8, side: u8, density: Density) -> bool {
        match self {
            Medium::Sector(m) => m.read_sector(sector, track, side, density),
            Medium::Fdi(_) => false,
        }
    }

    /// Begin a sector write. A write-protected medium reports through
    /// [`FdcEvents::write_protect`] and counts as handled.
    pub fn write_sector(
        &mut self,
        fdc: &mut dyn FdcEvents,
        sector: u8,
        track: u8,
        side: u8,
        density: Density,
    ) -> bool {
        match self {
            Medium::Sector(m) => m.write_sector(fdc, sector, track, side, density),
            Medium::Fdi(_) => false,
        }
    }

    /// Begin an ID field read
    pub fn read_address(&mut self, track: u8, side: u8, density: Density) -> bool {
        match self {
            Medium::Sector(m) => m.read_address(track, side, density),
            Medium::Fdi(_) => false,
        }
    }

    /// Begin formatting a track
    pub fn format_track(
        &mut self,
        fdc: &mut dyn FdcEvents,
        track: u8,
        side: u8,
        density: Density,
    ) -> bool {
        match self {
            Medium::Sector(m) => m.format_track(fdc, track, side, density),
            Medium::Fdi(_) => false,
        }
    }

    /// Flush modified data back to the image file (used at eject)
    pub fn flush(&mut self) -> Result<()> {
        match self {
            Medium::Sector(m) => m.image.save(),
            Medium::Fdi(_) => Ok(()),
        }
    }

    /// The file the medium was mounted from
    pub fn path(&self) -> &Path {
        match self {
            Medium::Sector(m) => m.image.path(),
            Medium::Fdi(m) => m.path(),
        }
    }
}
