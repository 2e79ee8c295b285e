use crate::error::InvalidMessage;
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::enums::AlertLevel;
use crate::enums::AlertDescription;

#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessagePayload {
    pub level: AlertLevel,
    pub description: AlertDescription,
}

impl Codec for AlertMessagePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.level.encode(bytes);
        self.description.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let level = AlertLevel::read(r)?;
        let description = AlertDescription::read(r)?;

        Ok(Self { level, description })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let alert = AlertMessagePayload {
            level: AlertLevel::Fatal,
            description: AlertDescription::HandshakeFailure,
        };
        let enc = alert.get_encoding();
        assert_eq!(enc, vec![0x02, 0x28]);
        assert_eq!(AlertMessagePayload::read_bytes(&enc).unwrap(), alert);
    }
}
