//! Client side of webdrop: the zero-knowledge encryption layer and the session API.
//!
//! Content of an encrypted session is encrypted here, before it leaves the process,
//! and decrypted here after it arrives. See [`crypto`] for the scheme.

pub mod client;
pub mod context;
pub mod crypto;
