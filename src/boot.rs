//! Blank image synthesis
//!
//! Creates zero-filled image files of a format's canonical size and, for the
//! ADFS families, stamps the minimum map/directory bytes an ADFS ROM needs
//! to treat the disc as a formatted, empty volume.

use crate::error::{DiscError, Result};
use crate::format::FormatKind;
use log::info;
use std::fs;
use std::path::Path;

/// A boot stamp is a list of (offset, bytes) patches applied to an
/// otherwise all-zero image.
pub type BootStamp = &'static [(usize, &'static [u8])];

/// ADFS M: free-space map, map check bytes and the "Hugo" root directory
/// markers for a 640-sector volume.
pub const ADF_STAMP: BootStamp = &[
    (0x000, &[7]),
    (0x0FD, &[0x05, 0x00, 0x0C, 0xF9, 0x04]),
    (0x1FB, &[0x88, 0x39, 0x00, 0x03, 0xC1, 0x00, b'H', b'u', b'g', b'o']),
    (0x6CC, &[0x24]),
    (0x6D6, &[0x02, 0x00, 0x00, 0x24]),
    (0x6FB, &[b'H', b'u', b'g', b'o']),
];

/// ADFS L: as [`ADF_STAMP`] but for a 2560-sector volume.
pub const ADL_STAMP: BootStamp = &[
    (0x000, &[7]),
    (0x0FD, &[0x0A, 0x00, 0x11, 0xF9, 0x09]),
    (0x1FB, &[0x01, 0x84, 0x00, 0x03, 0x8A, 0x00, b'H', b'u', b'g', b'o']),
    (0x6CC, &[0x24]),
    (0x6D6, &[0x02, 0x00, 0x00, 0x24]),
    (0x6FB, &[b'H', b'u', b'g', b'o']),
];

/// The stamp for a format, if it needs one. DFS discs are valid as plain
/// zeros (an empty catalogue); ADFS needs its map and root directory.
pub fn boot_stamp(kind: FormatKind) -> Option<BootStamp> {
    match kind {
        FormatKind::Adf => Some(ADF_STAMP),
        FormatKind::Adl => Some(ADL_STAMP),
        _ => None,
    }
}

/// Write a blank image of the format's canonical size to `path`.
///
/// Rejects container formats, which have no fixed geometry to synthesise.
pub fn create_blank_image<P: AsRef<Path>>(path: P, kind: FormatKind) -> Result<()> {
    let path = path.as_ref();
    let size = kind
        .canonical_size()
        .ok_or(DiscError::VariableSize(kind.name()))?;

    let mut data = vec![0u8; size];
    if let Some(stamp) = boot_stamp(kind) {
        apply_stamp(&mut data, stamp);
    }
    fs::write(path, &data)?;
    info!("created blank {} image {}", kind.name(), path.display());
    Ok(())
}

fn apply_stamp(data: &mut [u8], stamp: BootStamp) {
    for &(offset, bytes) in stamp {
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}
