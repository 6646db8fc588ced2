//! Callback boundaries toward the FDC and the acoustic feedback collaborator
//!
//! The emulated floppy disc controller owns the protocol state machine; this
//! crate only reports transfer progress and outcomes to it through
//! [`FdcEvents`]. The callback set is injected when the [`DiscSystem`]
//! (see [`crate::system`]) is constructed and lives for the life of the
//! subsystem.
//!
//! [`DiscSystem`]: crate::system::DiscSystem

/// Events raised toward the FDC while an operation is in progress
pub trait FdcEvents {
    /// A byte read from the disc is ready
    fn data_ready(&mut self, data: u8);

    /// The in-progress read, write, read-address or format has finished
    fn finish_read(&mut self);

    /// The requested sector/track/operation could not be satisfied
    fn not_found(&mut self);

    /// CRC error in a sector's data field
    fn data_crc_error(&mut self);

    /// CRC error in a sector's ID field
    fn header_crc_error(&mut self);

    /// A write was attempted on a protected disc
    fn write_protect(&mut self);

    /// The drive motor has spun down after inactivity
    fn spin_down(&mut self);

    /// Supply the next byte of an in-progress write. `last` is true when
    /// this is the final byte of the transfer.
    fn next_write_byte(&mut self, last: bool) -> u8;
}

/// Head movement reporting, consumed by an acoustic feedback collaborator
pub trait SeekFeedback {
    /// The head stepped by `delta` tracks (signed; zero for a settle in
    /// place)
    fn head_step(&mut self, delta: i32);
}

/// A feedback sink that ignores head movement, for hosts without audio
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSeek;

impl SeekFeedback for SilentSeek {
    fn head_step(&mut self, _delta: i32) {}
}
