//! # tls-session - a post-handshake session driver for TLS endpoints
//!
//! This library is the control plane of an established TLS session.  It
//! sits above a record layer (framing and AEAD, supplied by you) and
//! below an application, and drives the ongoing conversation once keys
//! exist: record demultiplexing, TLS1.3 post-handshake messages, key
//! updates, session tickets, 0-RTT accounting, and clean shutdown via
//! alerts.
//!
//! It implements the traffic phase of TLS1.2 and TLS1.3 for both clients
//! and servers.
//!
//! ### This library does not take care of network IO
//! It doesn't make or accept TCP connections, frame records, or touch an
//! AEAD.  You implement the [`RecordLayer`] trait on top of your
//! transport; the driver exchanges whole decrypted records and
//! per-direction traffic-secret state with it.
//!
//! ### This library does not negotiate connections
//! ClientHello/ServerHello, key exchange, certificate validation and
//! credential selection belong to a handshake component, which plugs in
//! through the [`HandshakeDriver`] trait and hands its results to the
//! [`Connection`] through setters ([`Connection::set_traffic_stage`] and
//! friends).  TLS1.2 renegotiation requests and deferred TLS1.3
//! post-handshake exchanges ([`PostHandshakeAction`]) are dispatched
//! back to it.
//!
//! ### What you get in return
//! [`Connection::recv_data`] returns application bytes and turns every
//! way a session can end (peer close_notify, transport EOF, fatal
//! alerts, protocol violations) into one of two outcomes: an empty read
//! for a clean close, or a single [`Error::Terminated`] fault after
//! which the connection refuses further use.  [`Connection::send_data`]
//! fragments writes to the record limit; [`Connection::bye`] says
//! goodbye exactly once; [`Connection::update_key`] rotates TLS1.3
//! traffic secrets on demand.
//!
//! ## Thread safety
//! A [`Connection`] is usable from several threads at once.  Record
//! reads serialize on an internal read lock acquired per record, so a
//! key update initiated on another thread interleaves between records;
//! post-handshake actions and the key-update send/rekey pairs serialize
//! on a second lock.  See the [`Connection`] documentation for the
//! details.
//!
//! # Crate features
//! Here's a list of what features are exposed by the tls-session crate
//! and what they enable:
//!
//! - `logging`: this feature is in the default set, and enables logging
//!   of interesting protocol-level events through the `log` crate.

// Require docs for public APIs, deny unsafe code, etc.
#![forbid(unsafe_code, unused_must_use, unstable_features)]
#![warn(
    elided_lifetimes_in_paths,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_extern_crates,
    unused_qualifications
)]
// Relax these clippy lints:
// - ptr_arg: this triggers on references to type aliases that are Vec
//   underneath.
// - too_many_arguments: some things just need a lot of state, wrapping it
//   doesn't necessarily make it easier to follow what's going on
// - single_component_path_imports: our top-level `use log` import causes
//   a false positive, https://github.com/rust-lang/rust-clippy/issues/5210
#![allow(
    clippy::too_many_arguments,
    clippy::ptr_arg,
    clippy::single_component_path_imports
)]

// log for logging (optional).
#[cfg(feature = "logging")]
use log;

#[cfg(not(feature = "logging"))]
mod log {
    macro_rules! trace    ( ($($tt:tt)*) => {{}} );
    macro_rules! debug    ( ($($tt:tt)*) => {{}} );
    macro_rules! _warn    ( ($($tt:tt)*) => {{}} );
    pub(crate) use {_warn as warn, debug, trace};
}

#[macro_use]
pub mod msgs;

mod conn;
mod enums;
mod error;
mod handshake;
mod hash_hs;
mod key;
mod key_schedule;
mod lock;
mod persist;
mod record_layer;

// The public interface is:
pub use crate::conn::{
    Connection, HandshakeDriver, KeyUpdateMode, PostHandshakeAction, Side, TrafficStage,
};
pub use crate::enums::{
    AlertDescription, CipherSuite, ContentType, HandshakeType, HashAlgorithm, ProtocolVersion,
    SignatureScheme,
};
pub use crate::error::{Error, InvalidMessage};
pub use crate::handshake::HandshakeState;
pub use crate::hash_hs::{HandshakeHash, HandshakeHashBuffer};
pub use crate::key::{Certificate, PrivateKey};
pub use crate::key_schedule::{derive_secret, hash_len, hkdf_expand_label};
pub use crate::msgs::message::MAX_FRAGMENT_LEN;
pub use crate::persist::{
    MemorySessionStore, NoSessionStorage, SessionData, SessionStore, TicketInfo,
};
pub use crate::record_layer::{DirectionState, RecordLayer};
