mod action_id;
mod addr;
mod buffer;
mod clock;
mod config;
mod engine;
mod error;
mod node_state;
mod response_info;
mod seqnum;
mod stall;
mod table;
mod tracker;

pub use action_id::AtomicActionIdAllocator;
pub use addr::Addr;
pub use buffer::FrameSink;
pub use clock::{Clock, SystemClock, VirtualClock};
pub use config::Config;
pub use error::{Error, Result};
pub use response_info::{ResponseInfoEntry, ResponseInfoProvider, StaticResponseInfoTable};

use std::sync::Arc;
use std::sync::Mutex;

use table::NodeStateMap;

/// `NodeTransmissionCore` wires C1–C7 behind a single coarse lock over the
/// node-state map (spec.md §5): every public method acquires it on entry
/// and releases it on every exit path, including the error paths of
/// `try_send`.
///
/// `R`, `C`, `S` are the three external collaborators (spec.md §6): the
/// static response-info table, the time source, and the outbound
/// byte-buffer. Cloning a core clones the `Arc`, not the table.
pub struct NodeTransmissionCore<R, C, S>
where
    R: ResponseInfoProvider,
    C: Clock,
    S: FrameSink,
{
    inner: Arc<Inner<R, C, S>>,
}

// Cloning only bumps the `Arc`'s refcount; `R`, `C`, `S` need not be `Clone`
// themselves, so this is implemented by hand rather than derived.
impl<R, C, S> Clone for NodeTransmissionCore<R, C, S>
where
    R: ResponseInfoProvider,
    C: Clock,
    S: FrameSink,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R, C, S> {
    nodes: Mutex<NodeStateMap>,
    response_info: R,
    clock: C,
    sink: S,
    config: Config,
}

impl<R, C, S> NodeTransmissionCore<R, C, S>
where
    R: ResponseInfoProvider,
    C: Clock,
    S: FrameSink,
{
    /// C7 `init`: create an empty map over the given collaborators.
    pub fn new(response_info: R, clock: C, sink: S, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                nodes: Mutex::new(NodeStateMap::new()),
                response_info,
                clock,
                sink,
                config,
            }),
        }
    }

    /// C4 `try_send`: admit `frame` now, or defer it to `addr`'s message
    /// queue. See spec.md §4.4 for the admission rule.
    pub fn try_send(
        &self,
        addr: Addr,
        message_type: u8,
        frame: &[u8],
        action_id: u32,
    ) -> Result<bool> {
        let mut nodes = self.inner.nodes.lock().unwrap();
        engine::try_send(
            &mut nodes,
            &self.inner.response_info,
            &self.inner.clock,
            &self.inner.sink,
            addr,
            message_type,
            frame,
            action_id,
            self.inner.config.buffer_budget,
        )
    }

    /// C5 `on_response`: match an inbound reply against `addr`'s oldest
    /// outstanding expectation, returning the matched `action_id` or `0`.
    pub fn on_response(&self, addr: Addr, reply_type: u8) -> u32 {
        let mut nodes = self.inner.nodes.lock().unwrap();
        tracker::on_response(
            &mut nodes,
            &self.inner.response_info,
            &self.inner.clock,
            &self.inner.sink,
            addr,
            reply_type,
            self.inner.config.buffer_budget,
            self.inner.config.response_expiration_secs,
        )
    }

    /// C3 `update_stall`: `0x00` clears `addr`'s stall flag and re-drives
    /// every descendant recorded in its `stall_affected` set; any other
    /// value sets the flag.
    pub fn update_stall(&self, addr: Addr, stall_status: u8) {
        let mut nodes = self.inner.nodes.lock().unwrap();
        stall::update_stall(
            &mut nodes,
            &self.inner.response_info,
            &self.inner.clock,
            &self.inner.sink,
            addr,
            stall_status,
            self.inner.config.buffer_budget,
        )
    }

    /// C6 `next_send`: apply the wrap-at-255 rule to `addr`'s send counter.
    pub fn next_send(&self, addr: Addr) -> u8 {
        let mut nodes = self.inner.nodes.lock().unwrap();
        seqnum::next_seqnum(&mut nodes.query(addr).send_seqnum)
    }

    /// C6 `next_recv`: apply the wrap-at-255 rule to `addr`'s receive counter.
    pub fn next_recv(&self, addr: Addr) -> u8 {
        let mut nodes = self.inner.nodes.lock().unwrap();
        seqnum::next_seqnum(&mut nodes.query(addr).recv_seqnum)
    }

    /// C6 `set_recv`: overwrite `addr`'s receive counter verbatim, used to
    /// resync after a detected gap.
    pub fn set_recv(&self, addr: Addr, value: u8) {
        let mut nodes = self.inner.nodes.lock().unwrap();
        nodes.query(addr).recv_seqnum = value;
    }

    /// C7 `reset`: purge every node's queues and drop its state; the map is
    /// left empty and `query` will lazily recreate states with fresh
    /// defaults afterward.
    pub fn reset(&self) {
        self.inner.nodes.lock().unwrap().reset();
    }

    /// C7 `destroy`: reset, then tear down the map. Consumes the last
    /// reference to the shared state; remaining clones continue to share an
    /// (now reset) map rather than observing a torn-down one.
    pub fn destroy(self) {
        self.reset();
    }
}
