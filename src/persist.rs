use core::fmt;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use zeroize::Zeroize;

use crate::enums::{CipherSuite, HashAlgorithm};
use crate::lock::Mutex;

/// Housekeeping data for one session ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketInfo {
    /// Validity period in seconds, as stated by the issuer.
    pub lifetime: u32,
    /// The obfuscation offset for the ticket age (RFC8446 s4.6.1).
    pub age_add: u32,
    /// When we received the ticket, in seconds since the unix epoch.
    pub received_at: u64,
}

impl TicketInfo {
    /// Describe a ticket received just now.
    pub fn new(lifetime: u32, age_add: u32) -> Self {
        let received_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            lifetime,
            age_add,
            received_at,
        }
    }
}

/// Everything needed to attempt resumption of a session later.
///
/// The `secret` is the PSK derived from the resumption master secret and
/// the ticket nonce; the nonce itself is not retained.
#[derive(Clone, PartialEq)]
pub struct SessionData {
    /// The suite the session ran.
    pub suite: CipherSuite,
    /// The hash underlying `suite`.
    pub hash: HashAlgorithm,
    /// The pre-shared key for resumption.
    pub secret: Vec<u8>,
    /// How much early data a resumed session may send, in bytes.
    pub max_early_data_size: u32,
    /// Ticket housekeeping.
    pub ticket: TicketInfo,
}

impl Drop for SessionData {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("suite", &self.suite)
            .field("max_early_data_size", &self.max_early_data_size)
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// A shared store of resumable sessions.
///
/// The driver inserts one entry per received `NewSessionTicket` and
/// removes the current session when it terminates a connection, so that
/// an aborted session cannot be resumed.  Implementations must be safe
/// under concurrent calls, and `remove` must tolerate unknown labels.
pub trait SessionStore: Send + Sync {
    /// Remember `data` under `label` (a ticket or session id).
    fn insert(&self, label: &[u8], data: SessionData);

    /// Forget the session stored under `label`, if any.
    fn remove(&self, label: &[u8]);
}

/// A session store that stores nothing; resumption never succeeds.
pub struct NoSessionStorage;

impl SessionStore for NoSessionStorage {
    fn insert(&self, _label: &[u8], _data: SessionData) {}

    fn remove(&self, _label: &[u8]) {}
}

/// An unbounded in-memory [`SessionStore`].
///
/// Every inserted ticket is retained until removed, so a peer that sends
/// several tickets in one flight leaves all of them available; which one
/// a later handshake prefers is its caller's policy.
pub struct MemorySessionStore {
    cache: Mutex<HashMap<Vec<u8>, SessionData>>,
}

impl MemorySessionStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a session by label.
    pub fn get(&self, label: &[u8]) -> Option<SessionData> {
        self.cache
            .lock()
            .and_then(|cache| cache.get(label).cloned())
    }

    /// The number of stored sessions.
    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .map(|cache| cache.len())
            .unwrap_or_default()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn insert(&self, label: &[u8], data: SessionData) {
        if let Some(mut cache) = self.cache.lock() {
            cache.insert(label.to_vec(), data);
        }
    }

    fn remove(&self, label: &[u8]) {
        if let Some(mut cache) = self.cache.lock() {
            cache.remove(label);
        }
    }
}
