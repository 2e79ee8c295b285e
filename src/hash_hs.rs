use ring::digest;

use crate::enums::HashAlgorithm;
use crate::key_schedule::digest_algorithm;

/// Early stage buffering of handshake payloads.
///
/// Before the negotiation fixes the digest algorithm we just buffer the
/// raw messages; a HelloRetryRequest can also revert a `HandshakeHash`
/// back into one of these.
#[derive(Clone)]
pub struct HandshakeHashBuffer {
    buffer: Vec<u8>,
}

impl HandshakeHashBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Buffer a raw handshake message.
    pub fn add(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// We now know what hash function the transcript uses.
    pub fn start_hash(self, alg: HashAlgorithm) -> HandshakeHash {
        let mut ctx = digest::Context::new(digest_algorithm(alg));
        ctx.update(&self.buffer);
        HandshakeHash { alg, ctx }
    }
}

impl Default for HandshakeHashBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// This deals with keeping a running hash of the handshake
/// payloads.  This is computed by buffering initially.  Once
/// we know what hash function we need to use we switch to
/// incremental hashing.
#[derive(Clone)]
pub struct HandshakeHash {
    alg: HashAlgorithm,
    ctx: digest::Context,
}

impl HandshakeHash {
    /// Hash a raw handshake message.
    pub fn add(&mut self, bytes: &[u8]) {
        self.ctx.update(bytes);
    }

    /// Get the hash value if we were to hash `extra` too.
    pub fn hash_given(&self, extra: &[u8]) -> Vec<u8> {
        let mut ctx = self.ctx.clone();
        ctx.update(extra);
        ctx.finish().as_ref().to_vec()
    }

    /// Get the current hash value.
    pub fn current_hash(&self) -> Vec<u8> {
        self.ctx
            .clone()
            .finish()
            .as_ref()
            .to_vec()
    }

    /// The hashing algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.alg
    }
}
