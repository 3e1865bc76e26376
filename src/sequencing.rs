//! Request sequencing
//!
//! Every outgoing request takes a token from a [`Sequencer`]. When its
//! response arrives the token is checked against the latest one issued for the
//! same kind of request; anything older is stale and must be dropped so a slow
//! response can never overwrite newer state.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Ticket identifying one in-flight request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken<K> {
    kind: K,
    seq: u64,
}

impl<K: Copy> RequestToken<K> {
    /// The kind of request this token was issued for.
    pub fn kind(&self) -> K {
        self.kind
    }

    /// Position of the token in issue order.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Issues monotonically increasing request tokens per request kind.
#[derive(Debug, Clone)]
pub struct Sequencer<K> {
    next: u64,
    latest: FxHashMap<K, u64>,
}

impl<K> Default for Sequencer<K> {
    fn default() -> Self {
        Self {
            next: 1,
            latest: FxHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> Sequencer<K> {
    /// Creates a sequencer with no requests issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token, superseding every earlier token of the same kind.
    pub fn issue(&mut self, kind: K) -> RequestToken<K> {
        let seq = self.next;

        self.next = self.next.saturating_add(1);
        self.latest.insert(kind, seq);

        RequestToken { kind, seq }
    }

    /// Whether `token` is the most recent one issued for its kind.
    pub fn is_current(&self, token: &RequestToken<K>) -> bool {
        self.latest.get(&token.kind) == Some(&token.seq)
    }

    /// Supersedes every outstanding token.
    pub fn invalidate_all(&mut self) {
        self.latest.clear();
    }
}
