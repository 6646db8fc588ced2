//! Raw image geometry and layout presets

/// Recording density of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    /// Single density (FM) - used by DFS discs
    Single,
    /// Double density (MFM) - used by ADFS and DOS discs
    Double,
}

/// How a double-sided image lays its tracks out on disc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideLayout {
    /// Tracks in file order, one side after the other (or a single side)
    Sequential,
    /// Sides interleaved per cylinder: T0S0, T0S1, T1S0, T1S1, ...
    Interleaved,
}

/// Geometry of a raw sector-dump image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Number of sides (1 or 2)
    pub sides: u8,
    /// Number of tracks per side
    pub tracks: u8,
    /// Sectors per track
    pub sectors_per_track: u8,
    /// Sector size in bytes
    pub sector_size: u16,
    /// Recording density
    pub density: Density,
    /// Side arrangement within the file
    pub side_layout: SideLayout,
}

impl Geometry {
    /// Acorn DFS single-sided (80 tracks, 10 sectors, 256 bytes)
    pub fn dfs_single() -> Self {
        Self {
            sides: 1,
            tracks: 80,
            sectors_per_track: 10,
            sector_size: 256,
            density: Density::Single,
            side_layout: SideLayout::Sequential,
        }
    }

    /// Acorn DFS double-sided (2 sides, 80 tracks, 10 sectors, 256 bytes)
    pub fn dfs_double() -> Self {
        Self {
            sides: 2,
            tracks: 80,
            sectors_per_track: 10,
            sector_size: 256,
            density: Density::Single,
            side_layout: SideLayout::Interleaved,
        }
    }

    /// Acorn ADFS M (single-sided, 80 tracks, 16 sectors, 256 bytes)
    pub fn adfs_m() -> Self {
        Self {
            sides: 1,
            tracks: 80,
            sectors_per_track: 16,
            sector_size: 256,
            density: Density::Double,
            side_layout: SideLayout::Sequential,
        }
    }

    /// Acorn ADFS L (2 sides, 80 tracks, 16 sectors, 256 bytes)
    pub fn adfs_l() -> Self {
        Self {
            sides: 2,
            tracks: 80,
            sectors_per_track: 16,
            sector_size: 256,
            density: Density::Double,
            side_layout: SideLayout::Interleaved,
        }
    }

    /// DOS 720K (2 sides, 80 tracks, 9 sectors, 512 bytes)
    pub fn dos_720k() -> Self {
        Self {
            sides: 2,
            tracks: 80,
            sectors_per_track: 9,
            sector_size: 512,
            density: Density::Double,
            side_layout: SideLayout::Interleaved,
        }
    }

    /// DOS 360K 40-track (2 sides, 40 tracks, 9 sectors, 512 bytes)
    pub fn dos_360k() -> Self {
        Self {
            sides: 2,
            tracks: 40,
            sectors_per_track: 9,
            sector_size: 512,
            density: Density::Double,
            side_layout: SideLayout::Interleaved,
        }
    }

    /// Bytes occupied by one track
    pub fn track_span(&self) -> usize {
        self.sectors_per_track as usize * self.sector_size as usize
    }

    /// Total capacity in bytes
    pub fn total_capacity(&self) -> usize {
        self.sides as usize * self.tracks as usize * self.track_span()
    }

    /// Byte offset of a sector within the image file, or `None` if the
    /// address falls outside the geometry
    pub fn sector_offset(&self, track: u8, side: u8, sector: u8) -> Option<usize> {
        if track >= self.tracks || side >= self.sides || sector >= self.sectors_per_track {
            return None;
        }
        let track_index = match self.side_layout {
            SideLayout::Sequential => side as usize * self.tracks as usize + track as usize,
            SideLayout::Interleaved => track as usize * self.sides as usize + side as usize,
        };
        Some(track_index * self.track_span() + sector as usize * self.sector_size as usize)
    }

    /// Byte offset of the start of a track, or `None` if out of range
    pub fn track_offset(&self, track: u8, side: u8) -> Option<usize> {
        self.sector_offset(track, side, 0)
    }

    /// Derive a copy with the track count recomputed from an actual file
    /// length. Raw dumps are frequently truncated (or oversized), and the
    /// drive should address whatever is really present.
    pub fn with_tracks_for_len(mut self, len: usize) -> Self {
        let cylinder_span = self.sides as usize * self.track_span();
        if cylinder_span > 0 {
            let tracks = len / cylinder_span;
            self.tracks = tracks.min(u8::MAX as usize) as u8;
        }
        self
    }
}
