/// Key schedule maintenance for TLS1.3
use ring::digest;
use ring::hkdf::{self, KeyType as _};

use crate::enums::HashAlgorithm;

/// Map a negotiated hash onto ring's digest implementation.
///
/// Only the hashes used by TLS cipher suites are supported; asking for
/// anything else is a programmer error upstream (suite negotiation must
/// not produce it).
pub(crate) fn digest_algorithm(alg: HashAlgorithm) -> &'static digest::Algorithm {
    match alg {
        HashAlgorithm::SHA1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
        HashAlgorithm::SHA256 => &digest::SHA256,
        HashAlgorithm::SHA384 => &digest::SHA384,
        HashAlgorithm::SHA512 => &digest::SHA512,
        _ => unreachable!("hash {alg:?} is not usable in a key schedule"),
    }
}

fn hkdf_algorithm(alg: HashAlgorithm) -> hkdf::Algorithm {
    match alg {
        HashAlgorithm::SHA1 => hkdf::HKDF_SHA1_FOR_LEGACY_USE_ONLY,
        HashAlgorithm::SHA256 => hkdf::HKDF_SHA256,
        HashAlgorithm::SHA384 => hkdf::HKDF_SHA384,
        HashAlgorithm::SHA512 => hkdf::HKDF_SHA512,
        _ => unreachable!("hash {alg:?} is not usable in a key schedule"),
    }
}

/// The output length of `alg`, which is also the length of every secret
/// derived under it.
pub fn hash_len(alg: HashAlgorithm) -> usize {
    hkdf_algorithm(alg).len()
}

/// `HKDF-Expand-Label` from RFC8446 s7.1, on a raw `secret`.
///
/// The label on the wire is `"tls13 " + label`; `context` is typically a
/// transcript hash or a ticket nonce.
pub fn hkdf_expand_label(
    alg: HashAlgorithm,
    secret: &[u8],
    label: &[u8],
    context: &[u8],
    out_len: usize,
) -> Vec<u8> {
    const LABEL_PREFIX: &[u8] = b"tls13 ";

    let prk = hkdf::Prk::new_less_safe(hkdf_algorithm(alg), secret);

    let output_len = u16::to_be_bytes(out_len as u16);
    let label_len = u8::to_be_bytes((LABEL_PREFIX.len() + label.len()) as u8);
    let context_len = u8::to_be_bytes(context.len() as u8);

    let info = &[
        &output_len[..],
        &label_len[..],
        LABEL_PREFIX,
        label,
        &context_len[..],
        context,
    ];
    let okm = prk.expand(info, OkmLen(out_len)).unwrap();

    let mut out = vec![0u8; out_len];
    okm.fill(&mut out).unwrap();
    out
}

/// `Derive-Secret` from RFC8446 s7.1: an expand-label whose context is a
/// transcript hash and whose output is one hash-length long.
pub fn derive_secret(
    alg: HashAlgorithm,
    secret: &[u8],
    label: &[u8],
    transcript_hash: &[u8],
) -> Vec<u8> {
    hkdf_expand_label(alg, secret, label, transcript_hash, hash_len(alg))
}

/// The next generation of a traffic secret (RFC8446 s7.2).
///
/// The cipher in use does not change across a key update; only the
/// secret advances, which reseeds the record layer's key and IV.
pub(crate) fn next_traffic_secret(alg: HashAlgorithm, secret: &[u8]) -> Vec<u8> {
    hkdf_expand_label(alg, secret, b"traffic upd", &[], hash_len(alg))
}

/// The PSK conveyed by a `NewSessionTicket`, derived from the resumption
/// master secret and the ticket nonce (RFC8446 s4.6.1).
pub(crate) fn derive_ticket_psk(alg: HashAlgorithm, rms: &[u8], nonce: &[u8]) -> Vec<u8> {
    hkdf_expand_label(alg, rms, b"resumption", nonce, hash_len(alg))
}

struct OkmLen(usize);

impl hkdf::KeyType for OkmLen {
    fn len(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use ring::hmac;

    use super::*;

    /// Textbook HKDF-Expand (RFC5869 s2.3), used to cross-check the
    /// `ring` plumbing above.
    fn hkdf_expand_reference(alg: hmac::Algorithm, prk: &[u8], info: &[u8], out_len: usize) -> Vec<u8> {
        let key = hmac::Key::new(alg, prk);
        let mut out = Vec::new();
        let mut last = Vec::new();
        let mut counter = 1u8;
        while out.len() < out_len {
            let mut ctx = hmac::Context::with_key(&key);
            ctx.update(&last);
            ctx.update(info);
            ctx.update(&[counter]);
            last = ctx.sign().as_ref().to_vec();
            out.extend_from_slice(&last);
            counter += 1;
        }
        out.truncate(out_len);
        out
    }

    fn expand_label_info(label: &[u8], context: &[u8], out_len: usize) -> Vec<u8> {
        let mut info = Vec::new();
        info.extend_from_slice(&u16::to_be_bytes(out_len as u16));
        info.push((6 + label.len()) as u8);
        info.extend_from_slice(b"tls13 ");
        info.extend_from_slice(label);
        info.push(context.len() as u8);
        info.extend_from_slice(context);
        info
    }

    #[test]
    fn expand_label_matches_reference_hkdf() {
        for (alg, hmac_alg) in [
            (HashAlgorithm::SHA1, hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY),
            (HashAlgorithm::SHA256, hmac::HMAC_SHA256),
            (HashAlgorithm::SHA384, hmac::HMAC_SHA384),
            (HashAlgorithm::SHA512, hmac::HMAC_SHA512),
        ] {
            let secret = vec![0x0b; hash_len(alg)];
            let info = expand_label_info(b"traffic upd", &[], hash_len(alg));
            assert_eq!(
                hkdf_expand_label(alg, &secret, b"traffic upd", &[], hash_len(alg)),
                hkdf_expand_reference(hmac_alg, &secret, &info, hash_len(alg)),
                "{alg:?}"
            );
        }
    }

    #[test]
    fn expand_label_is_deterministic() {
        let secret = [0x42; 32];
        let a = hkdf_expand_label(HashAlgorithm::SHA256, &secret, b"resumption", b"nonce", 32);
        let b = hkdf_expand_label(HashAlgorithm::SHA256, &secret, b"resumption", b"nonce", 32);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn derive_secret_is_expand_label_at_hash_len() {
        let secret = [0x17; 48];
        let transcript = [0x55; 48];
        assert_eq!(
            derive_secret(HashAlgorithm::SHA384, &secret, b"exp master", &transcript),
            hkdf_expand_label(
                HashAlgorithm::SHA384,
                &secret,
                b"exp master",
                &transcript,
                hash_len(HashAlgorithm::SHA384)
            ),
        );
    }

    #[test]
    fn labels_and_contexts_separate_outputs() {
        let secret = [0x99; 32];
        let upd = next_traffic_secret(HashAlgorithm::SHA256, &secret);
        let psk = derive_ticket_psk(HashAlgorithm::SHA256, &secret, &[]);
        let psk2 = derive_ticket_psk(HashAlgorithm::SHA256, &secret, b"n");
        assert_ne!(upd, psk);
        assert_ne!(psk, psk2);
        assert_ne!(upd, secret);
    }

    #[test]
    fn traffic_secret_generations_form_a_chain() {
        let gen0 = vec![0x01; 48];
        let gen1 = next_traffic_secret(HashAlgorithm::SHA384, &gen0);
        let gen2 = next_traffic_secret(HashAlgorithm::SHA384, &gen1);
        assert_eq!(gen1.len(), 48);
        assert_eq!(gen2.len(), 48);
        assert_ne!(gen1, gen2);
        // re-deriving from the same generation gives the same next secret
        assert_eq!(next_traffic_secret(HashAlgorithm::SHA384, &gen0), gen1);
    }

    #[test]
    fn hash_lengths() {
        assert_eq!(hash_len(HashAlgorithm::SHA1), 20);
        assert_eq!(hash_len(HashAlgorithm::SHA256), 32);
        assert_eq!(hash_len(HashAlgorithm::SHA384), 48);
        assert_eq!(hash_len(HashAlgorithm::SHA512), 64);
    }
}
