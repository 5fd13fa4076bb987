//! Wire types shared by webdrop clients and the session server.
//!
//! Everything here is what the server is allowed to see: session records, object
//! envelopes (plaintext or ciphertext), encoded KDF and cipher parameters, and the
//! authentication token. No type in this crate holds a password or a master key.

pub mod codec;
mod content;
pub mod credentials;
pub mod endpoints;
mod params;
mod session;

pub use crate::{
    content::{CIPHERTEXT_MIME, Content, EncryptedContent, FileObject, Upload},
    credentials::AuthToken,
    params::{EncodedCipherParams, EncodedKdfParams},
    session::{CreateSession, Session, SessionCrypto},
};
use {
    chrono::Utc,
    derive_more::{Display, From, FromStr, Into},
    serde::{Deserialize, Serialize},
};

pub type DateTimeUtc = chrono::DateTime<Utc>;

/// Snowflake id of a session: 48-bit millisecond timestamp followed by random bits.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    From,
    Into,
    Display,
    FromStr,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

/// Snowflake id of an object within a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    From,
    Into,
    Display,
    FromStr,
)]
#[serde(transparent)]
pub struct ObjectId(pub u64);
