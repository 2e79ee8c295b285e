use zeroize::Zeroize;

use crate::enums::{HashAlgorithm, ProtocolVersion};
use crate::hash_hs::{HandshakeHash, HandshakeHashBuffer};
use crate::key::{Certificate, PrivateKey};
use crate::msgs::handshake::{CertificateRequestPayload, Random};

enum Transcript {
    Buffering(HandshakeHashBuffer),
    Hashing(HandshakeHash),
}

/// Mutable per-handshake bookkeeping.
///
/// One of these exists while a handshake is in flight: created when the
/// handshake begins, torn down (or replaced) when it completes.  After a
/// TLS1.3 handshake the driver keeps it around because post-handshake
/// messages still consult it, notably the resumption master secret for
/// `NewSessionTicket` processing and the certificate-request bookkeeping
/// for post-handshake authentication.
///
/// The raw message log and the digest context must be advanced together
/// ([`Self::add_message`] / [`Self::update_transcript`]); letting them
/// diverge is a bug in the caller.
pub struct HandshakeState {
    client_version: ProtocolVersion,
    client_random: Random,
    server_random: Option<Random>,
    master_secret: Option<Vec<u8>>,
    local_key: Option<PrivateKey>,
    peer_key: Option<Certificate>,
    transcript: Transcript,
    messages: Vec<Vec<u8>>,
    cert_request: Option<CertificateRequestPayload>,
    client_cert_sent: bool,
    cert_request_sent: bool,
    client_cert_chain: Option<Vec<Certificate>>,
}

impl HandshakeState {
    /// Start bookkeeping for a handshake offering `client_version`.
    pub fn new(client_version: ProtocolVersion, client_random: Random) -> Self {
        Self {
            client_version,
            client_random,
            server_random: None,
            master_secret: None,
            local_key: None,
            peer_key: None,
            transcript: Transcript::Buffering(HandshakeHashBuffer::new()),
            messages: Vec::new(),
            cert_request: None,
            client_cert_sent: false,
            cert_request_sent: false,
            client_cert_chain: None,
        }
    }

    /// The version the client offered.
    pub fn client_version(&self) -> ProtocolVersion {
        self.client_version
    }

    /// The client's hello random.
    pub fn client_random(&self) -> &Random {
        &self.client_random
    }

    /// The server's hello random, once seen.
    pub fn server_random(&self) -> Option<&Random> {
        self.server_random.as_ref()
    }

    /// Record the server's hello random.
    pub fn set_server_random(&mut self, random: Random) {
        self.server_random = Some(random);
    }

    /// For TLS1.2, the master secret; for TLS1.3 the resumption master
    /// secret once the handshake has completed.
    pub fn master_secret(&self) -> Option<&[u8]> {
        self.master_secret.as_deref()
    }

    /// Record the master (or resumption master) secret, wiping any
    /// previous value.
    pub fn set_master_secret(&mut self, secret: Vec<u8>) {
        if let Some(mut old) = self.master_secret.replace(secret) {
            old.zeroize();
        }
    }

    /// Our long-term key, if one is involved.
    pub fn local_key(&self) -> Option<&PrivateKey> {
        self.local_key.as_ref()
    }

    /// Record our long-term key.
    pub fn set_local_key(&mut self, key: PrivateKey) {
        self.local_key = Some(key);
    }

    /// The peer's long-term key, if one was presented.
    pub fn peer_key(&self) -> Option<&Certificate> {
        self.peer_key.as_ref()
    }

    /// Record the peer's long-term key.
    pub fn set_peer_key(&mut self, key: Certificate) {
        self.peer_key = Some(key);
    }

    /// Append a raw handshake message to the log.
    ///
    /// The log is kept in wire order; [`Self::messages`] returns it
    /// chronologically.
    pub fn add_message(&mut self, bytes: &[u8]) {
        self.messages.push(bytes.to_vec());
    }

    /// The logged handshake messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &[u8]> {
        self.messages.iter().map(Vec::as_slice)
    }

    /// Fold `bytes` into the running transcript digest.
    pub fn update_transcript(&mut self, bytes: &[u8]) {
        match &mut self.transcript {
            Transcript::Buffering(buffer) => buffer.add(bytes),
            Transcript::Hashing(hash) => hash.add(bytes),
        }
    }

    /// Fix the transcript digest algorithm.
    ///
    /// Until this is called the transcript is merely buffered; calling
    /// it twice keeps the first algorithm.
    pub fn start_transcript_hash(&mut self, alg: HashAlgorithm) {
        let transcript = core::mem::replace(
            &mut self.transcript,
            Transcript::Buffering(HandshakeHashBuffer::new()),
        );
        self.transcript = match transcript {
            Transcript::Buffering(buffer) => Transcript::Hashing(buffer.start_hash(alg)),
            hashing => hashing,
        };
    }

    /// The current transcript hash, once the algorithm is known.
    pub fn current_transcript_hash(&self) -> Option<Vec<u8>> {
        match &self.transcript {
            Transcript::Buffering(_) => None,
            Transcript::Hashing(hash) => Some(hash.current_hash()),
        }
    }

    /// The peer's `CertificateRequest`, if one arrived.
    pub fn cert_request(&self) -> Option<&CertificateRequestPayload> {
        self.cert_request.as_ref()
    }

    /// Record a received `CertificateRequest`.
    pub fn set_cert_request(&mut self, request: CertificateRequestPayload) {
        self.cert_request = Some(request);
    }

    /// Whether we sent a client certificate.
    pub fn client_cert_sent(&self) -> bool {
        self.client_cert_sent
    }

    /// Note that we sent a client certificate.
    pub fn set_client_cert_sent(&mut self) {
        self.client_cert_sent = true;
    }

    /// Whether we sent a `CertificateRequest`.
    pub fn cert_request_sent(&self) -> bool {
        self.cert_request_sent
    }

    /// Note that we sent a `CertificateRequest`.
    pub fn set_cert_request_sent(&mut self) {
        self.cert_request_sent = true;
    }

    /// The client certificate chain selected for this handshake.
    pub fn client_cert_chain(&self) -> Option<&[Certificate]> {
        self.client_cert_chain.as_deref()
    }

    /// Record the selected client certificate chain.
    pub fn set_client_cert_chain(&mut self, chain: Vec<Certificate>) {
        self.client_cert_chain = Some(chain);
    }
}

impl Drop for HandshakeState {
    fn drop(&mut self) {
        if let Some(secret) = &mut self.master_secret {
            secret.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> HandshakeState {
        HandshakeState::new(ProtocolVersion::TLSv1_3, Random([0x55; 32]))
    }

    #[test]
    fn message_log_is_chronological() {
        let mut hs = fresh();
        hs.add_message(b"first");
        hs.add_message(b"second");
        let logged: Vec<&[u8]> = hs.messages().collect();
        assert_eq!(logged, vec![b"first".as_slice(), b"second".as_slice()]);
    }

    #[test]
    fn transcript_buffers_until_algorithm_is_known() {
        let mut hs = fresh();
        hs.update_transcript(b"hello");
        assert!(hs.current_transcript_hash().is_none());

        hs.start_transcript_hash(HashAlgorithm::SHA256);
        hs.update_transcript(b"world");
        let h = hs.current_transcript_hash().unwrap();
        // sha256("helloworld")
        assert_eq!(&h[..4], &[0x93, 0x6a, 0x18, 0x5c]);
    }

    #[test]
    fn starting_the_transcript_twice_keeps_the_first_algorithm() {
        let mut hs = fresh();
        hs.start_transcript_hash(HashAlgorithm::SHA256);
        hs.start_transcript_hash(HashAlgorithm::SHA384);
        hs.update_transcript(b"x");
        assert_eq!(hs.current_transcript_hash().unwrap().len(), 32);
    }

    #[test]
    fn replacing_the_master_secret_zeroizes_the_old_one() {
        let mut hs = fresh();
        hs.set_master_secret(vec![1; 32]);
        hs.set_master_secret(vec![2; 32]);
        assert_eq!(hs.master_secret().unwrap(), &[2; 32]);
    }

    #[test]
    fn certificate_request_bookkeeping() {
        let mut hs = fresh();
        assert!(!hs.client_cert_sent());
        assert!(!hs.cert_request_sent());
        hs.set_client_cert_sent();
        hs.set_cert_request_sent();
        assert!(hs.client_cert_sent());
        assert!(hs.cert_request_sent());
        assert!(hs.cert_request().is_none());
        assert!(hs.client_cert_chain().is_none());
    }
}
