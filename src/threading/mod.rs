//! Conversation thread reconstruction.
//!
//! The provider delivers a conversation as a flat message stream. Each message
//! carries a conversation link naming the thread root it replies to; a message
//! whose link resolves to its own id (or does not resolve at all) is a thread
//! root. This module rebuilds the tree: replies are attached to their root in
//! ascending sequence order and the roots themselves are emitted in ascending
//! sequence order.
//!
//! Reconstruction never fails. A malformed record degrades to an orphan root
//! and replies referencing a root that is absent from the input are dropped
//! with a warning.

pub mod reconstruct;

pub use reconstruct::build_threads;
