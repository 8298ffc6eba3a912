use crate::addr::Addr;
use crate::buffer::FrameSink;
use crate::clock::Clock;
use crate::engine;
use crate::response_info::ResponseInfoProvider;
use crate::table::NodeStateMap;

/// Response expectations older than this are reaped opportunistically, on
/// the next incoming response for the node (spec.md §4.5).
pub const RESPONSE_EXPIRATION_SECS: i64 = 2;

/// C5 `on_response`: match an inbound reply to the node's outstanding
/// expectations in strict FIFO order, reaping stale heads along the way.
///
/// Returns the matched `action_id`, or `0` when nothing matched: the node is
/// unknown, its response queue is empty, or `reply_type` matches neither the
/// current head nor causes it to expire (spec.md §4.5's preserved open
/// question — a reply that is valid in general but doesn't match the
/// current head is a no-op, not an error).
pub(crate) fn on_response<R: ResponseInfoProvider, S: FrameSink>(
    map: &mut NodeStateMap,
    response_info: &R,
    clock: &dyn Clock,
    sink: &S,
    addr: Addr,
    reply_type: u8,
    budget_cap: u16,
    expiration_secs: i64,
) -> u32 {
    let Some(state) = map.lookup(addr) else {
        return 0;
    };
    if state.response_queue.is_empty() {
        return 0;
    }

    let now = clock.now_seconds();
    loop {
        let state = map.lookup(addr).expect("node state just confirmed present");
        let Some(head) = state.response_queue.front() else {
            return 0;
        };

        let valid_replies = response_info
            .lookup(head.message_type)
            .map(|e| e.valid_reply_types)
            .unwrap_or_default();
        let is_expired = now - head.creation_time >= expiration_secs;

        // On an already-stale head, only the first declared valid reply type
        // can still match: the spec checks expiration per `r_i` in declared
        // order, so a later `r_i` is never reached once an earlier one has
        // triggered the reap below (spec.md §4.5).
        let matched = if is_expired {
            valid_replies.first() == Some(&reply_type)
        } else {
            valid_replies.contains(&reply_type)
        };

        if matched {
            let expectation = state.response_queue.pop_front().expect("head was just peeked");
            state.current_max_respond = state
                .current_max_respond
                .saturating_sub(expectation.max_reply_bytes);
            debug_assert!(state.current_max_respond <= budget_cap);

            engine::drain(map, response_info, clock, sink, addr, budget_cap);
            return expectation.action_id;
        }

        if is_expired {
            let expired = state.response_queue.pop_front().expect("head was just peeked");
            state.current_max_respond = state
                .current_max_respond
                .saturating_sub(expired.max_reply_bytes);
            tracing::error!(
                ?addr,
                message_type = expired.message_type,
                action_id = expired.action_id,
                "response expected but not received"
            );
            if state.response_queue.is_empty() {
                return 0;
            }
            // Loop again with the same `reply_type` against the new head.
            continue;
        }

        return 0;
    }
}
