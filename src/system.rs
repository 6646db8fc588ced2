//! The disc subsystem: two drive slots, the active-drive selector, the
//! not-found countdown and the controller-facing dispatch surface.
//!
//! Everything here runs on the emulator's single main tick. Controller
//! operations never block and never return errors; a request a drive cannot
//! satisfy is answered asynchronously through the not-found callback after a
//! hardware-realistic delay, because software written against a real FDC
//! polls status for a while before giving up. File I/O only happens in the
//! load/create/eject entry points.

use crate::boot::create_blank_image;
use crate::drive::DriveSlot;
use crate::error::{DiscError, Result};
use crate::fdc::{FdcEvents, SeekFeedback};
use crate::format::{resolve, resolve_extension, Density};
use crate::medium::{FdiMedium, Medium, SectorMedium};
use log::{info, warn};
use std::path::Path;

/// Poll ticks between an unserviceable request and the not-found callback,
/// approximating seek-and-settle latency on real hardware
pub const NOT_FOUND_DELAY: u32 = 10_000;

/// Number of drive slots in the machine
pub const NUM_DRIVES: usize = 2;

/// The floppy disc subsystem
pub struct DiscSystem {
    drives: [DriveSlot; NUM_DRIVES],
    active: usize,
    /// Single countdown shared by both drives, as on the original hardware
    /// emulation. Re-arming from either drive restarts the same timer.
    not_found: u32,
    fdc: Box<dyn FdcEvents>,
    feedback: Box<dyn SeekFeedback>,
}

impl DiscSystem {
    /// Wire up the subsystem with the FDC callback set and the acoustic
    /// feedback collaborator. Both drives start empty.
    pub fn new(fdc: Box<dyn FdcEvents>, feedback: Box<dyn SeekFeedback>) -> Self {
        Self {
            drives: Default::default(),
            active: 0,
            not_found: 0,
            fdc,
            feedback,
        }
    }

    /// Inspect a drive slot
    pub fn drive(&self, drive: usize) -> Option<&DriveSlot> {
        self.drives.get(drive)
    }

    /// The drive currently addressed by the controller
    pub fn active_drive(&self) -> usize {
        self.active
    }

    /// Select which drive the controller addresses
    pub fn set_active_drive(&mut self, drive: usize) {
        if drive < NUM_DRIVES {
            self.active = drive;
        }
    }

    // --- load / create / eject -------------------------------------------

    /// Load an existing image file into a drive.
    ///
    /// The format is resolved by extension, falling back to the file-size
    /// heuristic. On success the slot is rebound wholesale: the new medium's
    /// handler set replaces the old one and any in-flight operation of the
    /// previous medium is abandoned unflushed. On failure the slot is left
    /// exactly as it was.
    pub fn load_image<P: AsRef<Path>>(&mut self, drive: usize, path: P) -> Result<()> {
        let path = path.as_ref();
        if drive >= NUM_DRIVES {
            return Err(DiscError::InvalidDrive(drive));
        }
        let detection =
            resolve(path).inspect_err(|e| warn!("not loading {}: {}", path.display(), e))?;
        let medium = match detection.geometry {
            Some(geometry) => Medium::Sector(SectorMedium::open(path, geometry)?),
            None => Medium::Fdi(FdiMedium::open(path)?),
        };
        info!(
            "drive {}: loaded {} as {}",
            drive,
            path.display(),
            detection.kind.name()
        );
        self.drives[drive].bind(detection.kind, medium);
        Ok(())
    }

    /// Create a blank image file and load it into a drive.
    ///
    /// The target format comes strictly from the extension; there is no
    /// file to size-probe and container formats are rejected because they
    /// have no canonical geometry to synthesise. No file is written when
    /// creation is rejected.
    pub fn create_image<P: AsRef<Path>>(&mut self, drive: usize, path: P) -> Result<()> {
        let path = path.as_ref();
        if drive >= NUM_DRIVES {
            return Err(DiscError::InvalidDrive(drive));
        }
        let detection = resolve_extension(path)
            .inspect_err(|e| warn!("not creating {}: {}", path.display(), e))?;
        if detection.kind.canonical_size().is_none() {
            warn!("not creating {}: variable-size format", path.display());
            return Err(DiscError::VariableSize(detection.kind.name()));
        }
        create_blank_image(path, detection.kind)?;
        self.load_image(drive, path)
    }

    /// Eject a drive's medium, flushing modified sectors back to the image
    /// file first. Safe to call on an empty drive.
    pub fn eject(&mut self, drive: usize) -> Result<()> {
        let Some(slot) = self.drives.get_mut(drive) else {
            return Err(DiscError::InvalidDrive(drive));
        };
        if let Some(mut medium) = slot.unbind() {
            info!("drive {}: ejected {}", drive, medium.path().display());
            medium.flush()?;
        }
        Ok(())
    }

    // --- controller dispatch ---------------------------------------------

    /// Controller reset: drops the poll/seek/read-sector wiring on both
    /// drives and reselects drive 0. Loaded media and format bindings are
    /// untouched.
    pub fn reset(&mut self) {
        for slot in &mut self.drives {
            slot.mask_for_reset();
        }
        self.active = 0;
    }

    /// One emulation tick: advance the active drive's operation, then run
    /// the not-found countdown. The callback fires exactly once per arming,
    /// on the tick the counter reaches zero.
    pub fn poll(&mut self) {
        let slot = &mut self.drives[self.active];
        if slot.handlers().poll {
            if let Some(medium) = slot.medium_mut() {
                medium.poll(&mut *self.fdc);
            }
        }
        if self.not_found > 0 {
            self.not_found -= 1;
            if self.not_found == 0 {
                self.fdc.not_found();
            }
        }
    }

    /// Position a drive's head. The head-step delta is reported to the
    /// feedback collaborator and the slot's track bookkeeping updated even
    /// when the bound format has no seek handler.
    pub fn seek(&mut self, drive: usize, track: u8) {
        let Some(slot) = self.drives.get_mut(drive) else {
            return;
        };
        if slot.handlers().seek {
            if let Some(medium) = slot.medium_mut() {
                medium.seek(track);
            }
        }
        let delta = slot.record_seek(track);
        self.feedback.head_step(delta);
    }

    /// Request a sector read
    pub fn read_sector(
        &mut self,
        drive: usize,
        sector: u8,
        track: u8,
        side: u8,
        density: Density,
    ) {
        let Some(slot) = self.drives.get_mut(drive) else {
            return;
        };
        let handled = slot.handlers().read_sector
            && slot
                .medium_mut()
                .map(|m| m.read_sector(sector, track, side, density))
                .unwrap_or(false);
        if !handled {
            self.not_found = NOT_FOUND_DELAY;
        }
    }

    /// Request a sector write
    pub fn write_sector(
        &mut self,
        drive: usize,
        sector: u8,
        track: u8,
        side: u8,
        density: Density,
    ) {
        let fdc = &mut *self.fdc;
        let Some(slot) = self.drives.get_mut(drive) else {
            return;
        };
        let handled = slot.handlers().write_sector
            && slot
                .medium_mut()
                .map(|m| m.write_sector(fdc, sector, track, side, density))
                .unwrap_or(false);
        if !handled {
            self.not_found = NOT_FOUND_DELAY;
        }
    }

    /// Request an ID field read
    pub fn read_address(&mut self, drive: usize, track: u8, side: u8, density: Density) {
        let Some(slot) = self.drives.get_mut(drive) else {
            return;
        };
        let handled = slot.handlers().read_address
            && slot
                .medium_mut()
                .map(|m| m.read_address(track, side, density))
                .unwrap_or(false);
        if !handled {
            self.not_found = NOT_FOUND_DELAY;
        }
    }

    /// Request a track format
    pub fn format_track(&mut self, drive: usize, track: u8, side: u8, density: Density) {
        let fdc = &mut *self.fdc;
        let Some(slot) = self.drives.get_mut(drive) else {
            return;
        };
        let handled = slot.handlers().format
            && slot
                .medium_mut()
                .map(|m| m.format_track(fdc, track, side, density))
                .unwrap_or(false);
        if !handled {
            self.not_found = NOT_FOUND_DELAY;
        }
    }
}
