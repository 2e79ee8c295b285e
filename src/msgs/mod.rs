//! Wire-level message model: codec primitives, protocol enums, and the
//! payloads the post-handshake driver interprets.
#![allow(missing_docs)]

#[macro_use]
mod macros;

pub mod alert;
pub mod base;
pub mod codec;
pub mod enums;
pub mod handshake;
pub mod message;
