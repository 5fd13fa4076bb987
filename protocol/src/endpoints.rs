//! REST paths of the session service, relative to the server root.

use crate::{ObjectId, SessionId};

/// `POST` creates a session; body is an optional [`CreateSession`](crate::CreateSession).
pub const SESSIONS: &str = "api/session";

/// `GET` returns the [`Session`](crate::Session), `DELETE` removes it,
/// `POST` stores an [`Upload`](crate::Upload) and returns the new object.
#[must_use]
#[inline]
pub fn session(sid: SessionId) -> String {
    format!("{SESSIONS}/{sid}")
}

/// `GET` lists all objects of a session, newest first.
#[must_use]
#[inline]
pub fn objects(sid: SessionId) -> String {
    format!("{SESSIONS}/{sid}/objects")
}

/// `GET` returns one object, `DELETE` removes it.
#[must_use]
#[inline]
pub fn object(sid: SessionId, oid: ObjectId) -> String {
    format!("{SESSIONS}/{sid}/{oid}")
}

/// Directory of the raw file bytes of a `file` object; the file name follows as one
/// more path segment. Served to browsers directly, so it is authorized with the
/// query parameter rather than the header.
#[must_use]
#[inline]
pub fn download_dir(sid: SessionId, oid: ObjectId) -> String {
    format!("s/{sid}/{oid}/")
}

/// Page a share link points at; the session password follows as `#fragment`.
#[must_use]
#[inline]
pub fn share_page(sid: SessionId) -> String {
    format!("s/{sid}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        let sid = SessionId(7);
        let oid = ObjectId(9);
        assert_eq!(session(sid), "api/session/7");
        assert_eq!(objects(sid), "api/session/7/objects");
        assert_eq!(object(sid, oid), "api/session/7/9");
        assert_eq!(download_dir(sid, oid), "s/7/9/");
        assert_eq!(share_page(sid), "s/7");
    }
}
