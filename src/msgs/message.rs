use crate::enums::AlertDescription;
use crate::msgs::alert::AlertMessagePayload;
use crate::msgs::base::Payload;
use crate::msgs::enums::{AlertLevel, KeyUpdateRequest};
use crate::msgs::handshake::HandshakeMessagePayload;

/// Maximum plaintext fragment length per record: 2^14 bytes.
///
/// Outgoing application data is chunked to this size; see RFC8446 s5.1.
pub const MAX_FRAGMENT_LEN: usize = 16_384;

/// One decrypted record on the TLS1.2-and-below plane.
///
/// A single record may carry several handshake messages or alerts, so
/// those variants hold lists.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Handshake(Vec<HandshakeMessagePayload>),
    Alert(Vec<AlertMessagePayload>),
    ApplicationData(Payload),
    ChangeCipherSpec,
}

impl Message {
    pub fn build_alert(level: AlertLevel, description: AlertDescription) -> Self {
        Self::Alert(vec![AlertMessagePayload { level, description }])
    }

    pub fn build_close_notify() -> Self {
        Self::build_alert(AlertLevel::Warning, AlertDescription::CloseNotify)
    }
}

/// One decrypted record on the TLS1.3 plane.
///
/// `ChangeCipherSpec` survives here only for middlebox compatibility; the
/// driver ignores it.
#[derive(Debug, Clone, PartialEq)]
pub enum Message13 {
    Handshake(Vec<HandshakeMessagePayload>),
    Alert(Vec<AlertMessagePayload>),
    ApplicationData(Payload),
    ChangeCipherSpec,
}

impl Message13 {
    pub fn build_alert(level: AlertLevel, description: AlertDescription) -> Self {
        Self::Alert(vec![AlertMessagePayload { level, description }])
    }

    pub fn build_close_notify() -> Self {
        Self::build_alert(AlertLevel::Warning, AlertDescription::CloseNotify)
    }

    pub fn build_key_update(request: KeyUpdateRequest) -> Self {
        let msg = match request {
            KeyUpdateRequest::UpdateRequested => HandshakeMessagePayload::build_key_update_request(),
            _ => HandshakeMessagePayload::build_key_update_notify(),
        };
        Self::Handshake(vec![msg])
    }
}
