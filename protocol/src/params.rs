use serde::{Deserialize, Serialize};

/// PBKDF2 parameters as stored in session metadata, salt in base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedKdfParams {
    pub name: String,
    pub hash: String,
    pub iterations: u32,
    pub salt: String,
}

/// AES-GCM parameters carried in a ciphertext envelope, IV in base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedCipherParams {
    pub name: String,
    pub iv: String,
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test")]
mod tests {
    use super::*;

    #[test]
    fn kdf_params_wire_shape() {
        let json = r#"{"name":"PBKDF2","salt":"AAECAwQFBgcICQoLDA0ODw==","iterations":600000,"hash":"SHA-256"}"#;
        let params: EncodedKdfParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.name, "PBKDF2");
        assert_eq!(params.hash, "SHA-256");
        assert_eq!(params.iterations, 600_000);
        assert_eq!(params.salt, "AAECAwQFBgcICQoLDA0ODw==");
    }

    #[test]
    fn cipher_params_wire_shape() {
        let params = EncodedCipherParams {
            name: "AES-GCM".into(),
            iv: "AAAAAAAAAAAAAAAA".into(),
        };
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"name":"AES-GCM","iv":"AAAAAAAAAAAAAAAA"}"#,
        );
    }
}
