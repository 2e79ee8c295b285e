use core::fmt;

use zeroize::Zeroize;

/// This type contains a single certificate by value.
///
/// The certificate must be in DER-encoded X.509 format.  This library
/// never inspects the contents: validation and selection belong to the
/// handshake collaborator.
#[derive(Clone, Eq, PartialEq)]
pub struct Certificate(pub Vec<u8>);

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Certificate")
            .field(&self.0.len())
            .finish()
    }
}

/// This type contains a private key by value.
///
/// The key must be DER-encoded ASN.1 in either PKCS#8, PKCS#1, or SEC1
/// format.  The bytes are wiped on drop and never appear in `Debug`
/// output.
#[derive(Clone, Eq, PartialEq)]
pub struct PrivateKey(pub Vec<u8>);

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey")
            .field(&self.0.len())
            .finish()
    }
}
