use crate::node_state::BUFFER_BUDGET;
use crate::tracker::RESPONSE_EXPIRATION_SECS;

/// The two tunables the original implementation hardcodes as C macros,
/// lifted into a small config struct passed to `NodeTransmissionCore::new`.
/// This is the crate's only configuration surface — board-address parsing
/// and CLI flags remain out of scope (spec.md §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Per-node cap on the sum of reserved reply bytes (spec.md §3, §4.4).
    pub buffer_budget: u16,
    /// How long a response expectation may sit unmatched before it is
    /// reaped on the next incoming response for the node (spec.md §4.5).
    pub response_expiration_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_budget: BUFFER_BUDGET,
            response_expiration_secs: RESPONSE_EXPIRATION_SECS,
        }
    }
}
