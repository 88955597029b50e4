//! # Redwire
//!
//! The command-encoding and reply-adaptation core of a Redis client.
//!
//! Redwire turns argument values into RESP2 request bytes, adapts decoded
//! protocol replies into typed results (including the `QUEUED` pass-through
//! needed inside MULTI transactions), and drives cursor-based SCAN iteration
//! one page at a time. It owns no sockets: the transport layer encodes
//! commands with this crate, settles each command's [`pending::PendingReply`],
//! and supplies the low-level [`scan::ScanCommand`] primitive.

pub mod arg;
pub mod coerced;
pub mod command;
pub mod error;
pub mod pending;
pub mod reply;
pub mod scan;
