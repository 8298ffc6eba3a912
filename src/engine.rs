use crate::addr::Addr;
use crate::buffer::FrameSink;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::node_state::{NodeState, QueuedMessage, ResponseExpectation};
use crate::response_info::ResponseInfoProvider;
use crate::stall;
use crate::table::NodeStateMap;

/// C4: register a pending reply for `message_type`, reserving `budget` bytes
/// of the node's buffer credit. A zero budget is fire-and-forget and does
/// not touch the response queue (spec.md §4.4).
fn add_response(
    state: &mut NodeState,
    message_type: u8,
    budget: u16,
    action_id: u32,
    clock: &dyn Clock,
) {
    if budget > 0 {
        state.current_max_respond += budget;
        state.response_queue.push_back(ResponseExpectation {
            message_type,
            max_reply_bytes: budget,
            creation_time: clock.now_seconds(),
            action_id,
        });
    }
}

/// C4 `try_send`: admit `frame` now, or defer it to the node's message queue.
///
/// Returns `Ok(true)` if the frame was handed to `sink` immediately,
/// `Ok(false)` if it was queued (this is the normal "node not ready" case,
/// not an error — spec.md §7).
pub(crate) fn try_send<R: ResponseInfoProvider, S: FrameSink>(
    map: &mut NodeStateMap,
    response_info: &R,
    clock: &dyn Clock,
    sink: &S,
    addr: Addr,
    message_type: u8,
    frame: &[u8],
    action_id: u32,
    budget_cap: u16,
) -> Result<bool> {
    addr.validate()?;
    let entry = response_info
        .lookup(message_type)
        .ok_or(Error::TypeOutOfRange(message_type))?;
    let budget = entry.max_reply_bytes;

    // Ensure the node's own state exists before the readiness walk, which
    // may consult it as the first ("deepest") prefix.
    map.query(addr);

    let is_ready = stall::is_ready_for(map.raw(), addr);
    let queue_empty = map.query(addr).message_queue.is_empty();
    let within_budget = map.query(addr).current_max_respond + budget <= budget_cap;
    let ready = is_ready && queue_empty && within_budget;

    if ready {
        let state = map.query(addr);
        add_response(state, message_type, budget, action_id, clock);
        let used = state.current_max_respond;
        sink.buffer_append(addr, frame);
        tracing::debug!(?addr, used, "used output buffer");
        Ok(true)
    } else {
        let state = map.query(addr);
        state.message_queue.push_back(QueuedMessage {
            message_type,
            addr,
            bytes: frame.to_vec(),
            action_id,
        });
        tracing::debug!(?addr, message_type, action_id, "enqueued");
        Ok(false)
    }
}

/// C4 `drain`: re-evaluate `addr`'s deferred queue after conditions may have
/// improved (a stall cleared, or a response freed buffer credit).
///
/// `buffer_flush` is called exactly once per invocation, even if nothing
/// drained — this is observable and required by spec.md §4.4.
pub(crate) fn drain<R: ResponseInfoProvider, S: FrameSink>(
    map: &mut NodeStateMap,
    response_info: &R,
    clock: &dyn Clock,
    sink: &S,
    addr: Addr,
    budget_cap: u16,
) {
    loop {
        if !stall::is_ready_for(map.raw(), addr) {
            break;
        }
        let Some(state) = map.lookup(addr) else {
            break;
        };
        let Some(head) = state.message_queue.front() else {
            break;
        };
        let budget = response_info
            .lookup(head.message_type)
            .map(|e| e.max_reply_bytes)
            .unwrap_or(0);
        if state.current_max_respond + budget > budget_cap {
            break;
        }

        let msg = state.message_queue.pop_front().expect("head was just peeked");
        add_response(state, msg.message_type, budget, msg.action_id, clock);

        tracing::debug!(
            ?addr,
            message_type = msg.message_type,
            action_id = msg.action_id,
            "dequeued"
        );
        sink.buffer_append(addr, &msg.bytes);
    }
    sink.buffer_flush();
}
