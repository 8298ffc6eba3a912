use std::collections::HashMap;

use crate::addr::Addr;
use crate::buffer::FrameSink;
use crate::clock::Clock;
use crate::engine;
use crate::node_state::NodeState;
use crate::response_info::ResponseInfoProvider;
use crate::table::NodeStateMap;

/// C3: walk `addr`'s ancestor chain (spec.md §4.3) and determine whether any
/// ancestor is currently stalled.
///
/// Only *existing* node states are consulted (a non-creating lookup per hop);
/// an ancestor with no state yet is treated as not stalled. When a stalled
/// ancestor is found, `addr` is recorded in that ancestor's `stall_affected`
/// set so that clearing the stall later re-drives exactly this address — but
/// only the first time: if `addr` is already recorded there, this hop is
/// skipped and the walk continues to the next shallower prefix. This mirrors
/// the original implementation's exact control flow (and is harmless in
/// practice: once `addr` has anything queued, `try_send`'s "message_queue is
/// empty" admission check already blocks it regardless of this walk's
/// result).
pub fn is_ready_for(nodes: &mut HashMap<Addr, NodeState>, addr: Addr) -> bool {
    for prefix in addr.prefixes() {
        if let Some(state) = nodes.get_mut(&prefix) {
            if state.stall {
                let already_recorded = state.stall_affected.contains(&addr);
                state.mark_stall_affected(addr);
                if !already_recorded {
                    return false;
                }
            }
        }
    }
    true
}

/// C3 `update_stall`: `0x00` clears the node's stall flag and re-drives every
/// address recorded in its `stall_affected` set, exactly once each
/// (spec.md §6, invariant I5). Any other value sets the flag.
pub(crate) fn update_stall<R: ResponseInfoProvider, S: FrameSink>(
    map: &mut NodeStateMap,
    response_info: &R,
    clock: &dyn Clock,
    sink: &S,
    addr: Addr,
    stall_status: u8,
    budget_cap: u16,
) {
    if stall_status == 0x00 {
        let affected: Vec<Addr> = {
            let state = map.query(addr);
            state.stall = false;
            state.stall_affected.drain(..).collect()
        };
        tracing::info!(?addr, count = affected.len(), "stall cleared");
        for target in affected {
            engine::drain(map, response_info, clock, sink, target, budget_cap);
        }
    } else {
        map.query(addr).stall = true;
        tracing::info!(?addr, "stall set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(nodes: &mut HashMap<Addr, NodeState>, addr: Addr) -> &mut NodeState {
        nodes.entry(addr).or_insert_with(|| NodeState::new(addr))
    }

    #[test]
    fn ready_when_no_ancestor_state_exists() {
        let mut nodes = HashMap::new();
        assert!(is_ready_for(&mut nodes, Addr::new([3, 4, 0, 0])));
    }

    #[test]
    fn blocked_by_stalled_ancestor_and_recorded_as_affected() {
        let mut nodes = HashMap::new();
        insert(&mut nodes, Addr::new([3, 0, 0, 0])).stall = true;

        let target = Addr::new([3, 4, 0, 0]);
        assert!(!is_ready_for(&mut nodes, target));

        let parent = nodes.get(&Addr::new([3, 0, 0, 0])).unwrap();
        assert_eq!(parent.stall_affected.len(), 1);
        assert_eq!(parent.stall_affected[0], target);
    }

    #[test]
    fn ready_once_ancestor_stall_clears() {
        let mut nodes = HashMap::new();
        let parent_addr = Addr::new([3, 0, 0, 0]);
        insert(&mut nodes, parent_addr).stall = true;

        let target = Addr::new([3, 4, 0, 0]);
        assert!(!is_ready_for(&mut nodes, target));

        nodes.get_mut(&parent_addr).unwrap().stall = false;
        assert!(is_ready_for(&mut nodes, target));
    }

    #[test]
    fn own_stall_blocks_self() {
        // The walk's first checked prefix is the full target address itself.
        let mut nodes = HashMap::new();
        let target = Addr::new([3, 0, 0, 0]);
        insert(&mut nodes, target).stall = true;
        assert!(!is_ready_for(&mut nodes, target));
    }

    mod update_stall_tests {
        use super::super::update_stall;
        use crate::buffer::test_support::RecordingSink;
        use crate::clock::VirtualClock;
        use crate::engine::try_send;
        use crate::node_state::BUFFER_BUDGET;
        use crate::response_info::{ResponseInfoEntry, StaticResponseInfoTable};
        use crate::table::NodeStateMap;

        /// Scenario 3 (stall transitivity), verbatim.
        #[test]
        fn clearing_stall_redrives_affected_descendant() {
            let mut map = NodeStateMap::new();
            let response_info = StaticResponseInfoTable::new()
                .with_entry(0x00, ResponseInfoEntry::fire_and_forget());
            let clock = VirtualClock::new(0);
            let sink = RecordingSink::default();
            let parent = Addr::new([3, 0, 0, 0]);
            let child = Addr::new([3, 4, 0, 0]);

            update_stall(&mut map, &response_info, &clock, &sink, parent, 0x01, BUFFER_BUDGET);

            let admitted = try_send(&mut map, &response_info, &clock, &sink, child, 0x00, &[0x00], 11, BUFFER_BUDGET)
                .unwrap();
            assert!(!admitted);
            assert_eq!(map.query(child).message_queue.len(), 1);
            assert!(sink.appended.lock().unwrap().is_empty());

            update_stall(&mut map, &response_info, &clock, &sink, parent, 0x00, BUFFER_BUDGET);

            assert!(map.query(child).message_queue.is_empty());
            assert_eq!(sink.appended.lock().unwrap().len(), 1);
        }

        #[test]
        fn clearing_stall_with_no_affected_descendants_is_a_noop() {
            let mut map = NodeStateMap::new();
            let response_info = StaticResponseInfoTable::new();
            let clock = VirtualClock::new(0);
            let sink = RecordingSink::default();
            let addr = Addr::new([7, 0, 0, 0]);

            update_stall(&mut map, &response_info, &clock, &sink, addr, 0x01, BUFFER_BUDGET);
            assert!(map.query(addr).stall);

            update_stall(&mut map, &response_info, &clock, &sink, addr, 0x00, BUFFER_BUDGET);
            assert!(!map.query(addr).stall);
            assert!(sink.appended.lock().unwrap().is_empty());
        }
    }
}
