/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Bad-argument errors the core detects before touching any node state.
///
/// Per the error-handling design, these are the only core operations that can
/// fail: "node not ready" is a normal `false`/`Ok` return, response timeouts
/// are logged rather than returned, and an unknown node on `on_response` is a
/// silent ignore. Allocation failure is fatal and is not represented here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The address stack is not well-formed: a non-zero byte follows a zero
    /// terminator (spec.md §3: "a byte of 0x00 after the first non-zero byte
    /// terminates the path").
    #[error("address stack {0:02x?} is malformed: a non-zero byte follows a zero terminator")]
    BadAddress([u8; 4]),
    /// The response-info table has no entry for this message type.
    #[error("message type {0:#04x} has no response-info table entry")]
    TypeOutOfRange(u8),
}
