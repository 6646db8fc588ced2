//! Raw sector-dump images
//!
//! SSD, DSD, ADF and ADL files (and the size-probed DOS variants) are all
//! plain dumps of sector data; only the geometry differs. The whole file is
//! held in memory while mounted; writes mark the image dirty and are flushed
//! back to the file when the disc is ejected.

use crate::error::Result;
use crate::format::Geometry;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// An in-memory raw sector dump bound to a file on disc
#[derive(Debug, Clone)]
pub struct SectorImage {
    path: PathBuf,
    geometry: Geometry,
    data: Vec<u8>,
    write_protected: bool,
    dirty: bool,
}

impl SectorImage {
    /// Read an image file into memory.
    ///
    /// The geometry's track count is recomputed from the actual file length,
    /// so short dumps (40-track discs in an 80-track format) address only
    /// the tracks that exist. A read-only file mounts write-protected.
    pub fn open<P: AsRef<Path>>(path: P, geometry: Geometry) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let write_protected = fs::metadata(path)
            .map(|m| m.permissions().readonly())
            .unwrap_or(true);
        let geometry = geometry.with_tracks_for_len(data.len());
        if data.len() % geometry.track_span() != 0 {
            warn!(
                "{}: {} bytes is not a whole number of tracks",
                path.display(),
                data.len()
            );
        }
        debug!(
            "mounted {} ({} bytes, {} tracks{})",
            path.display(),
            data.len(),
            geometry.tracks,
            if write_protected { ", write protected" } else { "" }
        );
        Ok(Self {
            path: path.to_path_buf(),
            geometry,
            data,
            write_protected,
            dirty: false,
        })
    }

    /// The file this image was mounted from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Effective geometry (track count adjusted to the file length)
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Whether writes are refused
    pub fn is_write_protected(&self) -> bool {
        self.write_protected
    }

    /// Whether in-memory data differs from the file
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Borrow a sector's data, or `None` if the address is outside the
    /// geometry
    pub fn sector(&self, track: u8, side: u8, sector: u8) -> Option<&[u8]> {
        let offset = self.geometry.sector_offset(track, side, sector)?;
        let size = self.geometry.sector_size as usize;
        self.data.get(offset..offset + size)
    }

    /// Mutably borrow a sector's data and mark the image dirty
    pub fn sector_mut(&mut self, track: u8, side: u8, sector: u8) -> Option<&mut [u8]> {
        let offset = self.geometry.sector_offset(track, side, sector)?;
        let size = self.geometry.sector_size as usize;
        let slice = self.data.get_mut(offset..offset + size)?;
        self.dirty = true;
        Some(slice)
    }

    /// Zero-fill every sector of a track and mark the image dirty.
    /// Returns false if the track/side is outside the geometry.
    pub fn wipe_track(&mut self, track: u8, side: u8) -> bool {
        let Some(offset) = self.geometry.track_offset(track, side) else {
            return false;
        };
        let span = self.geometry.track_span();
        let Some(slice) = self.data.get_mut(offset..offset + span) else {
            return false;
        };
        slice.fill(0);
        self.dirty = true;
        true
    }

    /// Write the image back to its file if it has been modified.
    /// A write-protected image is never flushed.
    pub fn save(&mut self) -> Result<()> {
        if self.dirty && !self.write_protected {
            fs::write(&self.path, &self.data)?;
            debug!("flushed {} ({} bytes)", self.path.display(), self.data.len());
        }
        self.dirty = false;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn force_write_protect(&mut self, on: bool) {
        self.write_protected = on;
    }
}
