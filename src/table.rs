use std::collections::HashMap;

use crate::addr::Addr;
use crate::node_state::NodeState;

/// C2 + C7: the node-state map.
///
/// Mirrors `gazette::Router`'s `Arc<Inner>`-over-`Mutex<HashMap<_, _>>` shape:
/// a single coarse lock protects the whole map and every state within it, so
/// that cross-node operations (stall propagation, drain) can mutate several
/// states atomically — exactly the reason spec.md §5 gives for rejecting
/// per-node locks.
pub(crate) struct NodeStateMap {
    nodes: HashMap<Addr, NodeState>,
}

impl NodeStateMap {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Return the existing state for `addr`, or lazily create one with the
    /// defaults of spec.md §3.
    pub fn query(&mut self, addr: Addr) -> &mut NodeState {
        self.nodes
            .entry(addr)
            .or_insert_with(|| {
                tracing::debug!(?addr, "add to node state table");
                NodeState::new(addr)
            })
    }

    /// Non-creating lookup.
    pub fn lookup(&mut self, addr: Addr) -> Option<&mut NodeState> {
        self.nodes.get_mut(&addr)
    }

    pub fn raw(&mut self) -> &mut HashMap<Addr, NodeState> {
        &mut self.nodes
    }

    /// C7 `reset`: drain and free every node's three queues, then drop the
    /// state itself. The map is left empty; `query` will lazily recreate
    /// states with fresh defaults afterward.
    pub fn reset(&mut self) {
        self.nodes.clear();
        tracing::info!("node state table reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_creates_lazily_with_defaults() {
        let mut map = NodeStateMap::new();
        let addr = Addr::new([3, 0, 0, 0]);
        assert!(map.lookup(addr).is_none());

        let state = map.query(addr);
        assert_eq!(state.addr, addr);
        assert_eq!(state.send_seqnum, 0x01);

        assert!(map.lookup(addr).is_some());
    }

    #[test]
    fn reset_clears_everything_and_allows_fresh_recreation() {
        let mut map = NodeStateMap::new();
        let addr = Addr::new([3, 0, 0, 0]);
        map.query(addr).current_max_respond = 40;

        map.reset();
        assert!(map.lookup(addr).is_none());

        let fresh = map.query(addr);
        assert_eq!(fresh.current_max_respond, 0);
    }
}
