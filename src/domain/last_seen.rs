//! Last Seen Trade Message Tracking

use parking_lot::RwLock;

/// Most recent trade message id observed on the stream.
///
/// Holds the payload-level `MessageId` of the latest successfully
/// decoded trade message frame, not the frame envelope id. Starts
/// unset, is overwritten on each qualifying frame, and is read by the
/// mark-as-read call. Shared by `Arc` between the router and whatever
/// component services acknowledgements.
#[derive(Debug, Default)]
pub struct LastSeenMessageId {
    inner: RwLock<Option<u64>>,
}

impl LastSeenMessageId {
    /// Create an unset tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly seen trade message id, replacing any prior value.
    pub fn record(&self, message_id: u64) {
        *self.inner.write() = Some(message_id);
    }

    /// The latest recorded id, or `None` if no trade message has been
    /// seen yet.
    #[must_use]
    pub fn get(&self) -> Option<u64> {
        *self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        let last_seen = LastSeenMessageId::new();
        assert_eq!(last_seen.get(), None);
    }

    #[test]
    fn record_overwrites() {
        let last_seen = LastSeenMessageId::new();
        last_seen.record(7);
        assert_eq!(last_seen.get(), Some(7));

        last_seen.record(11);
        assert_eq!(last_seen.get(), Some(11));
    }
}
