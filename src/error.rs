use std::error::Error as StdError;
use std::fmt;

use crate::enums::AlertDescription;

/// This library reports protocol and session faults using this type.
///
/// Faulty peers and lower-layer failures are mapped onto these variants by
/// the record layer and the session driver.  [`Error::Terminated`] is the
/// only variant a [`crate::Connection`] raises out of its public surface
/// once a session is live: every other variant is an *input* to the
/// termination machinery, preserved as the underlying cause.
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// The transport was closed cleanly before (or between) records.
    ///
    /// This is not a protocol failure: the receive path reports it to the
    /// application as an empty read.
    Eof,

    /// The peer (or this endpoint) deviated from the protocol.
    ///
    /// Carries the alert that describes the deviation on the wire, and
    /// whether it is fatal at this point in the conversation.
    Protocol {
        /// A hint as to what went wrong.
        reason: String,
        /// Whether the deviation is fatal.
        fatal: bool,
        /// The alert to send (or that was implied) for this deviation.
        description: AlertDescription,
    },

    /// A catch-all for unexpected-message conditions and local wiring
    /// mistakes.  Always treated as fatal.
    General(String),

    /// The session has been terminated.
    ///
    /// `clean` is true when the termination was orderly from the peer's
    /// point of view (for example, the peer sent a fatal alert and we shut
    /// down in response).  `source` preserves the error that caused the
    /// termination.
    Terminated {
        /// Whether the shutdown was orderly.
        clean: bool,
        /// A hint as to why the session ended.
        reason: String,
        /// The error that caused the termination.
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn peer_misbehaved(reason: impl Into<String>, description: AlertDescription) -> Self {
        Self::Protocol {
            reason: reason.into(),
            fatal: true,
            description,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eof => write!(f, "end of stream"),
            Self::Protocol {
                reason,
                fatal,
                description,
            } => {
                let level = if *fatal { "fatal" } else { "warning" };
                write!(f, "protocol error ({level}, {description:?}): {reason}")
            }
            Self::General(err) => write!(f, "unexpected error: {err}"),
            Self::Terminated { clean, reason, .. } => {
                let kind = if *clean { "cleanly" } else { "abnormally" };
                write!(f, "session terminated {kind}: {reason}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Terminated { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<InvalidMessage> for Error {
    fn from(e: InvalidMessage) -> Self {
        Self::Protocol {
            reason: format!("invalid message: {e:?}"),
            fatal: true,
            description: AlertDescription::DecodeError,
        }
    }
}

/// A corrupt TLS message payload that resulted in an error.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidMessage {
    /// A field of the message was out of range
    InvalidContents,
    /// The message contained an unexpectedly duplicated extension
    DuplicateExtension(u16),
    /// The peer sent us a syntactically incorrect message, with the missing data named
    MissingData(&'static str),
    /// The message was too short to contain a length-prefixed structure
    MessageTooShort,
    /// The peer sent more data than expected in the named structure
    TrailingData(&'static str),
    /// A handshake message header described a body larger than permitted
    MessageTooLarge,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        let all = vec![
            Error::Eof,
            Error::Protocol {
                reason: "inconsistent something".to_string(),
                fatal: true,
                description: AlertDescription::IllegalParameter,
            },
            Error::General("undocumented error".to_string()),
            Error::Terminated {
                clean: true,
                reason: "received fatal error".to_string(),
                source: Box::new(Error::Eof),
            },
        ];

        for err in all {
            println!("{:?}:", err);
            println!("  fmt '{}'", err);
        }
    }

    #[test]
    fn terminated_exposes_cause() {
        use std::error::Error as _;
        let err = Error::Terminated {
            clean: false,
            reason: "oops".to_string(),
            source: Box::new(Error::General("inner".to_string())),
        };
        assert!(err.source().is_some());
        assert!(Error::Eof.source().is_none());
    }

    #[test]
    fn invalid_message_becomes_decode_error() {
        let err = Error::from(InvalidMessage::MessageTooShort);
        match err {
            Error::Protocol {
                fatal, description, ..
            } => {
                assert!(fatal);
                assert_eq!(description, AlertDescription::DecodeError);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
