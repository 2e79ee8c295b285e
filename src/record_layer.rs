use core::fmt;

use zeroize::Zeroize;

use crate::enums::{CipherSuite, HashAlgorithm};
use crate::error::Error;
use crate::msgs::message::{Message, Message13};

/// The cipher state of one direction of a connection, as exchanged with
/// the record layer.
///
/// A key update replaces only `secret`; the suite (and therefore the
/// hash) is fixed for the lifetime of the connection.  Installing a new
/// state via [`RecordLayer::set_read_state`] or
/// [`RecordLayer::set_write_state`] reseeds that direction's AEAD key and
/// IV deterministically inside the record layer.
#[derive(Clone, PartialEq)]
pub struct DirectionState {
    /// The hash underlying `suite`, used for secret derivation.
    pub hash: HashAlgorithm,
    /// The negotiated cipher suite.
    pub suite: CipherSuite,
    /// The current traffic secret for this direction.
    pub secret: Vec<u8>,
}

impl DirectionState {
    /// Bundle up a direction's state.
    pub fn new(hash: HashAlgorithm, suite: CipherSuite, secret: Vec<u8>) -> Self {
        Self {
            hash,
            suite,
            secret,
        }
    }
}

impl Drop for DirectionState {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for DirectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectionState")
            .field("hash", &self.hash)
            .field("suite", &self.suite)
            .finish_non_exhaustive()
    }
}

/// The framing and encryption layer underneath a [`crate::Connection`].
///
/// Implementations own the transport, the record framing, and the AEAD
/// state for both directions; the session driver above only sees whole
/// decrypted records and the per-direction traffic-secret state.
///
/// Contract:
///
/// * `read_record`/`read_record_13` block until one record is available,
///   and return [`Error::Eof`] for a cleanly closed transport.  A call
///   is made under the connection's read lock, so at most one is in
///   flight at a time.
/// * `write_record`/`write_record_13` must serialize concurrent callers
///   internally; the driver issues sends from several code paths without
///   holding a common lock.
/// * the state accessors expose `(hash, suite, traffic secret)` per
///   direction; a state installed with a setter takes effect from the
///   next record read or written in that direction.
pub trait RecordLayer: Send + Sync {
    /// Read one record on the TLS1.2-and-below plane.
    fn read_record(&self) -> Result<Message, Error>;

    /// Read one record on the TLS1.3 plane.
    fn read_record_13(&self) -> Result<Message13, Error>;

    /// Write one record on the TLS1.2-and-below plane.
    fn write_record(&self, m: Message) -> Result<(), Error>;

    /// Write one record on the TLS1.3 plane.
    fn write_record_13(&self, m: Message13) -> Result<(), Error>;

    /// The current receive-direction state.
    fn read_state(&self) -> DirectionState;

    /// Install a new receive-direction state.
    fn set_read_state(&self, state: DirectionState);

    /// The current send-direction state.
    fn write_state(&self) -> DirectionState;

    /// Install a new send-direction state.
    fn set_write_state(&self, state: DirectionState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_state_debug_hides_secret() {
        let st = DirectionState::new(
            HashAlgorithm::SHA256,
            CipherSuite::TLS13_AES_128_GCM_SHA256,
            vec![0xau8; 32],
        );
        let dbg = format!("{st:?}");
        assert!(dbg.contains("SHA256"));
        assert!(!dbg.contains("secret"));
    }
}
