use crate::enums::{HandshakeType, SignatureScheme};
use crate::error::InvalidMessage;
use crate::msgs::base::{Payload, PayloadU16, PayloadU8};
use crate::msgs::codec::{u24, Codec, LengthPrefixedBuffer, ListLength, Reader, TlsListElement};
use crate::msgs::enums::{ClientCertificateType, ExtensionType, KeyUpdateRequest};

/// Random material from a hello message.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Random(pub [u8; 32]);

impl Codec for Random {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let Some(bytes) = r.take(32) else {
            return Err(InvalidMessage::MissingData("Random"));
        };
        let mut opaque = [0; 32];
        opaque.clone_from_slice(bytes);
        Ok(Self(opaque))
    }
}

impl From<[u8; 32]> for Random {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Debug for Random {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        super::base::hex(f, &self.0)
    }
}

/// A `DistinguishedName` as used in `CertificateRequest`: DER-encoded, opaque here.
pub type DistinguishedName = PayloadU16;

impl TlsListElement for ClientCertificateType {
    const SIZE_LEN: ListLength = ListLength::U8;
}

impl TlsListElement for SignatureScheme {
    const SIZE_LEN: ListLength = ListLength::U16;
}

impl TlsListElement for DistinguishedName {
    const SIZE_LEN: ListLength = ListLength::U16;
}

/// The body of a TLS1.2 `CertificateRequest` message.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateRequestPayload {
    pub certtypes: Vec<ClientCertificateType>,
    pub sigschemes: Vec<SignatureScheme>,
    pub canames: Vec<DistinguishedName>,
}

impl Codec for CertificateRequestPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.certtypes.encode(bytes);
        self.sigschemes.encode(bytes);
        self.canames.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let certtypes = Vec::read(r)?;
        let sigschemes = Vec::read(r)?;
        let canames = Vec::read(r)?;

        if sigschemes.is_empty() {
            return Err(InvalidMessage::InvalidContents);
        }

        Ok(Self {
            certtypes,
            sigschemes,
            canames,
        })
    }
}

/// The extension block of a TLS1.3 `NewSessionTicket` message.
///
/// Only the `early_data` extension is interpreted; others are skipped,
/// as is an `early_data` body of the wrong shape (it then counts as
/// absent).  Duplicated `early_data` extensions are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSessionTicketExtensions {
    pub max_early_data_size: Option<u32>,
}

impl Codec for NewSessionTicketExtensions {
    fn encode(&self, bytes: &mut Vec<u8>) {
        let extensions = LengthPrefixedBuffer::new(ListLength::U16, bytes);

        if let Some(sz) = self.max_early_data_size {
            ExtensionType::EarlyData.encode(extensions.buf);
            (4u16).encode(extensions.buf);
            sz.encode(extensions.buf);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let mut out = Self::default();

        let len = usize::from(u16::read(r)?);
        let mut sub = r.sub(len)?;

        while sub.any_left() {
            let typ = ExtensionType::read(&mut sub)?;
            let ext_len = usize::from(u16::read(&mut sub)?);
            let mut ext_body = sub.sub(ext_len)?;

            match typ {
                ExtensionType::EarlyData => {
                    if out.max_early_data_size.is_some() {
                        return Err(InvalidMessage::DuplicateExtension(u16::from(typ)));
                    }
                    if ext_len == 4 {
                        out.max_early_data_size = Some(u32::read(&mut ext_body)?);
                    } else {
                        ext_body.rest();
                    }
                }
                _ => {
                    ext_body.rest();
                }
            }
        }

        Ok(out)
    }
}

/// The body of a TLS1.3 `NewSessionTicket` message.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSessionTicketPayloadTls13 {
    pub lifetime: u32,
    pub age_add: u32,
    pub nonce: PayloadU8,
    pub ticket: PayloadU16,
    pub exts: NewSessionTicketExtensions,
}

impl NewSessionTicketPayloadTls13 {
    pub fn new(lifetime: u32, age_add: u32, nonce: Vec<u8>, ticket: Vec<u8>) -> Self {
        Self {
            lifetime,
            age_add,
            nonce: PayloadU8::new(nonce),
            ticket: PayloadU16::new(ticket),
            exts: NewSessionTicketExtensions::default(),
        }
    }

    /// The early-data limit conveyed by the ticket, or zero if the
    /// extension was absent.
    pub fn max_early_data_size(&self) -> u32 {
        self.exts.max_early_data_size.unwrap_or(0)
    }
}

impl Codec for NewSessionTicketPayloadTls13 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.lifetime.encode(bytes);
        self.age_add.encode(bytes);
        self.nonce.encode(bytes);
        self.ticket.encode(bytes);
        self.exts.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let lifetime = u32::read(r)?;
        let age_add = u32::read(r)?;
        let nonce = PayloadU8::read(r)?;
        let ticket = PayloadU16::read(r)?;
        let exts = NewSessionTicketExtensions::read(r)?;

        Ok(Self {
            lifetime,
            age_add,
            nonce,
            ticket,
            exts,
        })
    }
}

/// A parsed handshake message: its type and typed body.
///
/// The bodies this library interprets are the ones the post-handshake
/// driver consumes; anything else is carried opaquely so that installed
/// post-handshake actions can interpret it themselves.  `NewSessionTicket`
/// is decoded with its TLS1.3 body: tickets on the TLS1.2 plane belong to
/// the initial handshake, which is not this library's business.
#[derive(Debug, Clone, PartialEq)]
pub struct HandshakeMessagePayload {
    pub typ: HandshakeType,
    pub payload: HandshakePayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandshakePayload {
    HelloRequest,
    /// An entire ClientHello body, opaque: negotiation is the handshake
    /// component's concern, the driver only routes it.
    ClientHello(Payload),
    NewSessionTicketTls13(NewSessionTicketPayloadTls13),
    KeyUpdate(KeyUpdateRequest),
    CertificateRequest(CertificateRequestPayload),
    Unknown(Payload),
}

impl HandshakeMessagePayload {
    /// A `KeyUpdate` that does not ask the peer to update in turn.
    pub fn build_key_update_notify() -> Self {
        Self {
            typ: HandshakeType::KeyUpdate,
            payload: HandshakePayload::KeyUpdate(KeyUpdateRequest::UpdateNotRequested),
        }
    }

    /// A `KeyUpdate` that asks the peer to update in turn.
    pub fn build_key_update_request() -> Self {
        Self {
            typ: HandshakeType::KeyUpdate,
            payload: HandshakePayload::KeyUpdate(KeyUpdateRequest::UpdateRequested),
        }
    }
}

impl Codec for HandshakeMessagePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.typ.encode(bytes);

        let mut body = Vec::new();
        match &self.payload {
            HandshakePayload::HelloRequest => {}
            HandshakePayload::ClientHello(x) => x.encode(&mut body),
            HandshakePayload::NewSessionTicketTls13(x) => x.encode(&mut body),
            HandshakePayload::KeyUpdate(x) => x.encode(&mut body),
            HandshakePayload::CertificateRequest(x) => x.encode(&mut body),
            HandshakePayload::Unknown(x) => x.encode(&mut body),
        }

        u24(body.len() as u32).encode(bytes);
        bytes.extend_from_slice(&body);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let typ = HandshakeType::read(r)?;
        let len = u24::read(r)?;
        let mut sub = r.sub(len.into())?;

        let payload = match typ {
            HandshakeType::HelloRequest => HandshakePayload::HelloRequest,
            HandshakeType::ClientHello => HandshakePayload::ClientHello(Payload::read_slice(&mut sub)),
            HandshakeType::NewSessionTicket => {
                HandshakePayload::NewSessionTicketTls13(NewSessionTicketPayloadTls13::read(&mut sub)?)
            }
            HandshakeType::KeyUpdate => HandshakePayload::KeyUpdate(KeyUpdateRequest::read(&mut sub)?),
            HandshakeType::CertificateRequest => {
                HandshakePayload::CertificateRequest(CertificateRequestPayload::read(&mut sub)?)
            }
            _ => HandshakePayload::Unknown(Payload::read_slice(&mut sub)),
        };

        sub.expect_empty("HandshakeMessagePayload")?;
        Ok(Self { typ, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_update_round_trip() {
        let msg = HandshakeMessagePayload::build_key_update_request();
        let enc = msg.get_encoding();
        assert_eq!(enc, vec![0x18, 0x00, 0x00, 0x01, 0x01]);
        assert_eq!(HandshakeMessagePayload::read_bytes(&enc).unwrap(), msg);
    }

    #[test]
    fn hello_request_has_empty_body() {
        let msg = HandshakeMessagePayload {
            typ: HandshakeType::HelloRequest,
            payload: HandshakePayload::HelloRequest,
        };
        let enc = msg.get_encoding();
        assert_eq!(enc, vec![0x00, 0x00, 0x00, 0x00]);
        assert_eq!(HandshakeMessagePayload::read_bytes(&enc).unwrap(), msg);

        // a HelloRequest with a body is rejected
        assert!(HandshakeMessagePayload::read_bytes(&[0x00, 0x00, 0x00, 0x01, 0xff]).is_err());
    }

    #[test]
    fn new_session_ticket_round_trip() {
        let mut nst = NewSessionTicketPayloadTls13::new(3600, 0xdeadbeef, vec![1, 2], vec![3; 16]);
        nst.exts.max_early_data_size = Some(4096);
        let msg = HandshakeMessagePayload {
            typ: HandshakeType::NewSessionTicket,
            payload: HandshakePayload::NewSessionTicketTls13(nst.clone()),
        };
        let parsed = HandshakeMessagePayload::read_bytes(&msg.get_encoding()).unwrap();
        match parsed.payload {
            HandshakePayload::NewSessionTicketTls13(got) => {
                assert_eq!(got, nst);
                assert_eq!(got.max_early_data_size(), 4096);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn new_session_ticket_rejects_duplicate_early_data() {
        let mut body = Vec::new();
        3600u32.encode(&mut body);
        0u32.encode(&mut body);
        PayloadU8::new(vec![0]).encode(&mut body);
        PayloadU16::new(vec![1]).encode(&mut body);
        // two early_data extensions
        let ext = {
            let mut e = Vec::new();
            ExtensionType::EarlyData.encode(&mut e);
            4u16.encode(&mut e);
            1024u32.encode(&mut e);
            e
        };
        ((ext.len() * 2) as u16).encode(&mut body);
        body.extend_from_slice(&ext);
        body.extend_from_slice(&ext);

        assert_eq!(
            NewSessionTicketPayloadTls13::read_bytes(&body),
            Err(InvalidMessage::DuplicateExtension(u16::from(
                ExtensionType::EarlyData
            )))
        );
    }

    #[test]
    fn unknown_extensions_are_skipped() {
        let mut body = Vec::new();
        60u32.encode(&mut body);
        7u32.encode(&mut body);
        PayloadU8::new(vec![9]).encode(&mut body);
        PayloadU16::new(vec![8]).encode(&mut body);
        {
            let exts = LengthPrefixedBuffer::new(ListLength::U16, &mut body);
            ExtensionType::Cookie.encode(exts.buf);
            2u16.encode(exts.buf);
            exts.buf.extend_from_slice(&[0xaa, 0xbb]);
        }

        let nst = NewSessionTicketPayloadTls13::read_bytes(&body).unwrap();
        assert_eq!(nst.max_early_data_size(), 0);
    }

    #[test]
    fn malformed_early_data_extension_counts_as_absent() {
        let mut body = Vec::new();
        60u32.encode(&mut body);
        7u32.encode(&mut body);
        PayloadU8::new(vec![9]).encode(&mut body);
        PayloadU16::new(vec![8]).encode(&mut body);
        {
            let exts = LengthPrefixedBuffer::new(ListLength::U16, &mut body);
            ExtensionType::EarlyData.encode(exts.buf);
            2u16.encode(exts.buf);
            exts.buf.extend_from_slice(&[0x00, 0x01]);
        }

        let nst = NewSessionTicketPayloadTls13::read_bytes(&body).unwrap();
        assert_eq!(nst.max_early_data_size(), 0);
    }

    #[test]
    fn certificate_request_round_trip() {
        let req = CertificateRequestPayload {
            certtypes: vec![ClientCertificateType::RSASign, ClientCertificateType::ECDSASign],
            sigschemes: vec![SignatureScheme::ECDSA_NISTP256_SHA256],
            canames: vec![DistinguishedName::new(vec![0x30, 0x00])],
        };
        let msg = HandshakeMessagePayload {
            typ: HandshakeType::CertificateRequest,
            payload: HandshakePayload::CertificateRequest(req),
        };
        assert_eq!(
            HandshakeMessagePayload::read_bytes(&msg.get_encoding()).unwrap(),
            msg
        );
    }
}
