use crate::addr::Addr;

/// The external byte-buffer collaborator (spec.md §6): a non-blocking
/// outbound staging buffer. The core calls `buffer_append` for each admitted
/// frame and `buffer_flush` exactly once per `drain` pass, even when nothing
/// drained — framing, CRC, escaping, and the raw serial write live entirely
/// outside this crate.
pub trait FrameSink: Send + Sync {
    /// Append a complete, length-prefixed frame destined for `addr` to the
    /// staging buffer.
    fn buffer_append(&self, addr: Addr, frame: &[u8]);

    /// Commit the staging buffer to the wire.
    fn buffer_flush(&self);
}
