//! Drive slots
//!
//! The emulated machine has exactly two drives. A slot records which format
//! is bound to it, owns the mounted medium, and keeps the handler wiring and
//! the last-seeked track used for acoustic feedback deltas.

use crate::format::FormatKind;
use crate::medium::{HandlerSet, Medium};

/// One of the two addressable disc drives
#[derive(Debug, Default)]
pub struct DriveSlot {
    /// Format most recently bound to this slot. Survives eject, matching
    /// the original firmware behaviour of remembering the last loader.
    format: Option<FormatKind>,
    /// The mounted medium, if any
    medium: Option<Medium>,
    /// Which of the medium's operations are currently wired through.
    /// Cleared piecemeal by reset without unbinding the medium.
    handlers: HandlerSet,
    /// Last seeked track, kept even when no medium is present so head
    /// movement deltas stay correct across loads
    track: u8,
}

impl DriveSlot {
    /// Bind a newly loaded medium, replacing all handlers wholesale.
    /// Any in-flight operation of the previous medium is abandoned.
    pub fn bind(&mut self, kind: FormatKind, medium: Medium) {
        self.handlers = medium.handlers();
        self.format = Some(kind);
        self.medium = Some(medium);
    }

    /// Take the medium out for ejecting, clearing the handler wiring.
    /// The format binding is left recorded.
    pub fn unbind(&mut self) -> Option<Medium> {
        self.handlers = HandlerSet::NONE;
        self.medium.take()
    }

    /// The bound format, if an image was ever loaded
    pub fn format(&self) -> Option<FormatKind> {
        self.format
    }

    /// The mounted medium
    pub fn medium(&self) -> Option<&Medium> {
        self.medium.as_ref()
    }

    /// The mounted medium, mutably
    pub fn medium_mut(&mut self) -> Option<&mut Medium> {
        self.medium.as_mut()
    }

    /// Whether a medium is mounted
    pub fn is_loaded(&self) -> bool {
        self.medium.is_some()
    }

    /// Current handler wiring
    pub fn handlers(&self) -> HandlerSet {
        self.handlers
    }

    /// Clear the inter-operation handler wiring a controller reset drops:
    /// poll, seek and read-sector. Other handlers and the medium stay bound.
    pub fn mask_for_reset(&mut self) {
        self.handlers.poll = false;
        self.handlers.seek = false;
        self.handlers.read_sector = false;
    }

    /// Last seeked track
    pub fn track(&self) -> u8 {
        self.track
    }

    /// Record a seek target, returning the signed head movement delta
    pub fn record_seek(&mut self, track: u8) -> i32 {
        let delta = track as i32 - self.track as i32;
        self.track = track;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Geometry;
    use crate::medium::SectorMedium;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ssd_slot() -> (NamedTempFile, DriveSlot) {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&vec![0u8; 80 * 10 * 256]).unwrap();
        f.flush().unwrap();
        let medium = SectorMedium::open(f.path(), Geometry::dfs_single()).unwrap();
        let mut slot = DriveSlot::default();
        slot.bind(FormatKind::Ssd, Medium::Sector(medium));
        (f, slot)
    }

    #[test]
    fn test_bind_wires_full_handler_set() {
        let (_f, slot) = ssd_slot();
        assert_eq!(slot.handlers(), HandlerSet::FULL);
        assert_eq!(slot.format(), Some(FormatKind::Ssd));
        assert!(slot.is_loaded());
    }

    #[test]
    fn test_unbind_keeps_format_binding() {
        let (_f, mut slot) = ssd_slot();
        let medium = slot.unbind();
        assert!(medium.is_some());
        assert!(!slot.is_loaded());
        assert_eq!(slot.handlers(), HandlerSet::NONE);
        assert_eq!(slot.format(), Some(FormatKind::Ssd));
    }

    #[test]
    fn test_reset_mask_clears_only_three_handlers() {
        let (_f, mut slot) = ssd_slot();
        slot.mask_for_reset();
        let h = slot.handlers();
        assert!(!h.poll && !h.seek && !h.read_sector);
        assert!(h.write_sector && h.read_address && h.format);
        assert!(slot.is_loaded());
    }

    #[test]
    fn test_seek_delta_bookkeeping() {
        let mut slot = DriveSlot::default();
        assert_eq!(slot.record_seek(10), 10);
        assert_eq!(slot.record_seek(4), -6);
        assert_eq!(slot.record_seek(4), 0);
        assert_eq!(slot.track(), 4);
    }
}
