use {
    crate::{DateTimeUtc, ObjectId, params::EncodedCipherParams},
    serde::{Deserialize, Serialize},
};

/// MIME type of every object stored in an encrypted session.
pub const CIPHERTEXT_MIME: &str = "application/x-ciphertext";

/// Payload of a shared item, discriminated by its `kind` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Content {
    Text {
        data: String,
    },
    Link {
        url: String,
        title: String,
    },
    /// Uploaded file; the bytes live on the server under `name`.
    File {
        name: String,
    },
    Ciphertext(EncryptedContent),
}

impl Content {
    #[must_use]
    #[inline]
    pub fn is_ciphertext(&self) -> bool {
        matches!(self, Self::Ciphertext(_))
    }

    /// Name of the downloadable file, if this item has one.
    #[must_use]
    #[inline]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::File { name } => Some(name),
            Self::Text { .. } | Self::Link { .. } | Self::Ciphertext(_) => None,
        }
    }
}

/// Encrypted form of an [`Upload`].
///
/// `ciphertext` is the AES-GCM output (tag appended), `wrapped_key` is the per-item
/// content key wrapped with AES-KW under the session master key. Both are base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedContent {
    pub cipher: EncodedCipherParams,
    pub ciphertext: String,
    #[serde(rename = "wrappedKey")]
    pub wrapped_key: String,
}

/// Item as sent by a client, before the server assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub mime: String,
    pub content: Content,
}

impl Upload {
    #[must_use]
    #[inline]
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            mime: "text/plain".into(),
            content: Content::Text { data: data.into() },
        }
    }

    #[must_use]
    #[inline]
    pub fn link(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            mime: "text/uri-list".into(),
            content: Content::Link {
                url: url.into(),
                title: title.into(),
            },
        }
    }

    #[must_use]
    #[inline]
    pub fn ciphertext(content: EncryptedContent) -> Self {
        Self {
            mime: CIPHERTEXT_MIME.into(),
            content: Content::Ciphertext(content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub id: ObjectId,
    pub mime: String,
    pub timestamp: DateTimeUtc,
    pub content: Content,
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test")]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn upload_serializes_kind_first() {
        let upload = Upload::text("hello");
        assert_eq!(
            serde_json::to_string(&upload).unwrap(),
            r#"{"mime":"text/plain","content":{"kind":"text","data":"hello"}}"#,
        );
    }

    #[test]
    fn ciphertext_envelope_shape() {
        let upload = Upload::ciphertext(EncryptedContent {
            cipher: EncodedCipherParams {
                name: "AES-GCM".into(),
                iv: "AAAAAAAAAAAAAAAA".into(),
            },
            ciphertext: "Y3Q=".into(),
            wrapped_key: "d2s=".into(),
        });
        assert_eq!(
            serde_json::to_value(&upload).unwrap(),
            json!({
                "mime": "application/x-ciphertext",
                "content": {
                    "kind": "ciphertext",
                    "cipher": { "name": "AES-GCM", "iv": "AAAAAAAAAAAAAAAA" },
                    "ciphertext": "Y3Q=",
                    "wrappedKey": "d2s=",
                },
            }),
        );
    }

    #[test]
    fn file_object_from_server() {
        let obj: FileObject = serde_json::from_value(json!({
            "id": 123_456_789_u64,
            "mime": "image/png",
            "timestamp": "2024-06-03T10:00:00Z",
            "content": { "kind": "file", "name": "cat.png" },
        }))
        .unwrap();
        assert_eq!(obj.id, ObjectId(123_456_789));
        assert_eq!(obj.content.file_name(), Some("cat.png"));
        assert!(!obj.content.is_ciphertext());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        serde_json::from_value::<Content>(json!({ "kind": "hologram" })).unwrap_err();
        serde_json::from_value::<Content>(json!({ "data": "no kind" })).unwrap_err();
    }
}
