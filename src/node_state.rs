use std::collections::VecDeque;

use crate::addr::Addr;

/// Maximum sum of reserved reply bytes outstanding for a single node
/// (spec.md §3: "0 ≤ current_max_respond ≤ 48").
pub const BUFFER_BUDGET: u16 = 48;

/// A pending reply the host is waiting on (spec.md §3).
#[derive(Debug, Clone)]
pub struct ResponseExpectation {
    pub message_type: u8,
    pub max_reply_bytes: u16,
    pub creation_time: i64,
    pub action_id: u32,
}

/// A deferred outgoing message (spec.md §3). `bytes` is the self-delimited
/// frame verbatim: its first byte is the count of the bytes that follow.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub message_type: u8,
    pub addr: Addr,
    pub bytes: Vec<u8>,
    pub action_id: u32,
}

/// Per-node transmission state (spec.md §3). Created lazily on first
/// reference to `addr` and kept until `reset`/`destroy`.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub addr: Addr,
    pub send_seqnum: u8,
    pub recv_seqnum: u8,
    pub stall: bool,
    pub current_max_respond: u16,
    pub response_queue: VecDeque<ResponseExpectation>,
    pub message_queue: VecDeque<QueuedMessage>,
    /// Downstream addresses that attempted to send while this node was
    /// stalled, recorded at most once each (spec.md §3 invariant 4).
    pub stall_affected: VecDeque<Addr>,
}

impl NodeState {
    pub fn new(addr: Addr) -> Self {
        Self {
            addr,
            send_seqnum: 0x01,
            recv_seqnum: 0x01,
            stall: false,
            current_max_respond: 0,
            response_queue: VecDeque::new(),
            message_queue: VecDeque::new(),
            stall_affected: VecDeque::new(),
        }
    }

    /// Record that `descendant` attempted to send while `self` was stalled,
    /// suppressing duplicates (spec.md §4.3, invariant 4).
    pub fn mark_stall_affected(&mut self, descendant: Addr) {
        if !self.stall_affected.contains(&descendant) {
            self.stall_affected.push_back(descendant);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let state = NodeState::new(Addr::new([3, 0, 0, 0]));
        assert_eq!(state.send_seqnum, 0x01);
        assert_eq!(state.recv_seqnum, 0x01);
        assert!(!state.stall);
        assert_eq!(state.current_max_respond, 0);
        assert!(state.response_queue.is_empty());
        assert!(state.message_queue.is_empty());
        assert!(state.stall_affected.is_empty());
    }

    #[test]
    fn stall_affected_suppresses_duplicates() {
        let mut state = NodeState::new(Addr::new([3, 0, 0, 0]));
        let descendant = Addr::new([3, 4, 0, 0]);
        state.mark_stall_affected(descendant);
        state.mark_stall_affected(descendant);
        assert_eq!(state.stall_affected.len(), 1);
    }
}
