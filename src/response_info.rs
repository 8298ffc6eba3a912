use std::collections::HashMap;

/// A single response-info entry (spec.md §3, §4.1): how many reply bytes a
/// message of this type reserves, and which reply types satisfy it.
///
/// `max_reply_bytes == 0` means the message solicits no reply and consumes
/// no buffer credit ("fire-and-forget").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseInfoEntry {
    pub max_reply_bytes: u16,
    pub valid_reply_types: Vec<u8>,
}

impl ResponseInfoEntry {
    pub fn new(max_reply_bytes: u16, valid_reply_types: impl Into<Vec<u8>>) -> Self {
        Self {
            max_reply_bytes,
            valid_reply_types: valid_reply_types.into(),
        }
    }

    pub fn fire_and_forget() -> Self {
        Self::default()
    }
}

/// The external response-info collaborator (spec.md §4.1, §6): an immutable,
/// process-wide table indexed by message type. The real BiDiB table content
/// is owned by callers ("external collaborator provides it") — this crate
/// never invents protocol constants, only the lookup contract.
pub trait ResponseInfoProvider: Send + Sync {
    /// Look up the response-info entry for `message_type`, or `None` if the
    /// type has no registered entry.
    fn lookup(&self, message_type: u8) -> Option<ResponseInfoEntry>;
}

/// A simple, caller-populated `ResponseInfoProvider` backed by a hash map.
/// Suitable for tests and for callers who build their table at startup from
/// a BiDiB message-type registry.
#[derive(Debug, Clone, Default)]
pub struct StaticResponseInfoTable {
    entries: HashMap<u8, ResponseInfoEntry>,
}

impl StaticResponseInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, message_type: u8, entry: ResponseInfoEntry) -> Self {
        self.entries.insert(message_type, entry);
        self
    }
}

impl ResponseInfoProvider for StaticResponseInfoTable {
    fn lookup(&self, message_type: u8) -> Option<ResponseInfoEntry> {
        self.entries.get(&message_type).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_type_is_none() {
        let table = StaticResponseInfoTable::new();
        assert_eq!(table.lookup(0x80), None);
    }

    #[test]
    fn registered_type_round_trips() {
        let table = StaticResponseInfoTable::new()
            .with_entry(0x80, ResponseInfoEntry::new(4, vec![0x81]));
        assert_eq!(
            table.lookup(0x80),
            Some(ResponseInfoEntry::new(4, vec![0x81]))
        );
    }
}
