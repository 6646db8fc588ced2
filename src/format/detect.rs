//! Format detection by extension and file-size heuristic

use crate::error::{DiscError, Result};
use crate::format::geometry::Geometry;
use crate::format::{lookup_extension, FormatKind};
use log::debug;
use std::fs;
use std::path::Path;

/// Outcome of resolving a file to a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// The resolved format
    pub kind: FormatKind,
    /// Effective raw geometry. `None` for container formats that describe
    /// their own geometry. May differ from the format's default when the
    /// size heuristic identified a DOS sub-variant.
    pub geometry: Option<Geometry>,
}

impl Detection {
    fn of(kind: FormatKind) -> Self {
        Detection {
            kind,
            geometry: kind.geometry(),
        }
    }
}

/// Resolve a file to a format by extension only. Used by image creation,
/// which has no existing file to size-probe.
pub fn resolve_extension<P: AsRef<Path>>(path: P) -> Result<Detection> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| DiscError::MissingExtension(path.to_path_buf()))?;
    lookup_extension(ext)
        .map(Detection::of)
        .ok_or_else(|| DiscError::UnknownExtension(ext.to_string()))
}

/// Resolve a file to a format: extension match first, then classification
/// by exact file size for the common raw dump sizes.
pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Detection> {
    let path = path.as_ref();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if let Some(kind) = lookup_extension(ext) {
            return Ok(Detection::of(kind));
        }
        debug!("extension .{} not registered, probing size of {}", ext, path.display());
    }
    let size = fs::metadata(path)?.len();
    debug!("size probe of {}: {} bytes", path.display(), size);
    classify_size(size).ok_or(DiscError::UnrecognisedImage {
        path: path.to_path_buf(),
        size,
    })
}

const KIB: u64 = 1024;

/// Classify a raw image by its exact byte length
pub fn classify_size(size: u64) -> Option<Detection> {
    match size {
        // 800K ADFS/DOS
        s if s == 800 * KIB => Some(Detection::of(FormatKind::Adf)),
        // 640K ADFS/DOS
        s if s == 640 * KIB => Some(Detection::of(FormatKind::Adl)),
        // 720K DOS - 80*2*9*512
        s if s == 720 * KIB => Some(Detection {
            kind: FormatKind::Adl,
            geometry: Some(Geometry::dos_720k()),
        }),
        // 360K DOS - 40*2*9*512
        s if s == 360 * KIB => Some(Detection {
            kind: FormatKind::Adl,
            geometry: Some(Geometry::dos_360k()),
        }),
        // 200K DFS - 80*1*10*256
        s if s <= 200 * KIB => Some(Detection::of(FormatKind::Ssd)),
        // 400K DFS - 80*2*10*256
        s if s <= 400 * KIB => Some(Detection::of(FormatKind::Dsd)),
        _ => None,
    }
}
