use {
    crate::crypto::{CryptoError, CryptoResult, KdfParams, params::fill_random, run_blocking},
    derivative::Derivative,
    hmac::Hmac,
    pbkdf2::pbkdf2,
    sha2::Sha256,
    webdrop_protocol::{AuthToken, codec},
    zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing},
};

pub const MASTER_KEY_LENGTH: usize = 32;

/// Public input of the token derivation; the master key bits act as the salt.
const AUTH_TOKEN_CONSTRUCT: &str = "わたしはわたしでいたいから";

const GENERATED_PASSWORD_LENGTH: usize = 32;

/// Session password. Never persisted, never sent to the server.
#[derive(Clone, Derivative, Zeroize, ZeroizeOnDrop)]
#[derivative(Debug)]
pub struct Password(#[derivative(Debug = "ignore")] Vec<u8>);

impl Password {
    #[must_use]
    #[inline]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Random password for a new session.
    #[inline]
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = vec![0; GENERATED_PASSWORD_LENGTH];
        fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Decodes the password carried in a share-link fragment. Both base64 alphabets
    /// are accepted, with or without padding.
    #[inline]
    pub fn from_fragment(fragment: &str) -> CryptoResult<Self> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let bytes = if fragment.contains(['+', '/']) {
            codec::decode(fragment)?
        } else {
            codec::decode_url_safe(fragment)?
        };
        Ok(Self(bytes))
    }

    #[must_use]
    #[inline]
    pub fn to_fragment(&self) -> String {
        codec::encode_url_safe(&self.0)
    }

    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Password {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Raw output of the password KDF.
///
/// Short-lived: used once to derive the auth token and once to import the
/// [`MasterKey`](crate::crypto::MasterKey), then dropped.
#[derive(Clone, PartialEq, Eq, Derivative, Zeroize, ZeroizeOnDrop)]
#[derivative(Debug)]
pub struct MasterKeyBits(#[derivative(Debug = "ignore")] [u8; MASTER_KEY_LENGTH]);

impl MasterKeyBits {
    #[must_use]
    #[inline]
    pub fn from_bytes(bytes: [u8; MASTER_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_LENGTH] {
        &self.0
    }
}

fn pbkdf2_sha256(
    password: &[u8],
    params: &KdfParams,
) -> CryptoResult<Zeroizing<[u8; MASTER_KEY_LENGTH]>> {
    params.check()?;
    let mut out = Zeroizing::new([0; MASTER_KEY_LENGTH]);
    pbkdf2::<Hmac<Sha256>>(password, &params.salt, params.iterations, out.as_mut_slice())
        .map_err(|err| CryptoError::KeyDerivation(err.to_string()))?;
    Ok(out)
}

/// Stretches `password` into master key bits.
///
/// With `params == None` a fresh salt is generated: the caller is creating a session
/// and must store the returned parameters with it. Joining clients pass the stored ones.
#[inline]
pub fn derive_master_key_bits_blocking(
    password: &Password,
    params: Option<KdfParams>,
) -> CryptoResult<(MasterKeyBits, KdfParams)> {
    let params = match params {
        Some(params) => params,
        None => KdfParams::generate()?,
    };
    let bits = pbkdf2_sha256(password.as_bytes(), &params)?;
    Ok((MasterKeyBits(*bits), params))
}

#[inline]
pub async fn derive_master_key_bits(
    password: &Password,
    params: Option<KdfParams>,
) -> CryptoResult<(MasterKeyBits, KdfParams)> {
    let password = password.clone();
    run_blocking(move || derive_master_key_bits_blocking(&password, params)).await
}

/// Derives the token a client presents to prove it holds the master key.
///
/// PBKDF2 over a fixed public string, salted with the master key bits, so the token
/// reveals nothing usable about the key.
// TODO: switch to an HKDF expand step once the server can hold tokens of both kinds.
#[inline]
pub fn derive_auth_token_blocking(bits: &MasterKeyBits) -> CryptoResult<AuthToken> {
    let params = KdfParams::with_salt(bits.as_bytes().to_vec());
    let token = pbkdf2_sha256(AUTH_TOKEN_CONSTRUCT.as_bytes(), &params)?;
    Ok(AuthToken::from_bytes(*token))
}

#[inline]
pub async fn derive_auth_token(bits: &MasterKeyBits) -> CryptoResult<AuthToken> {
    let bits = bits.clone();
    run_blocking(move || derive_auth_token_blocking(&bits)).await
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test")]
mod tests {
    use super::*;

    fn cheap_params(salt: &[u8]) -> KdfParams {
        KdfParams {
            iterations: 1000,
            ..KdfParams::with_salt(salt)
        }
    }

    #[test]
    fn deterministic() {
        let password = Password::from_bytes(*b"pw");
        let params = cheap_params(b"0123456789abcdef");
        let (a, _) = derive_master_key_bits_blocking(&password, Some(params.clone())).unwrap();
        let (b, returned) = derive_master_key_bits_blocking(&password, Some(params.clone())).unwrap();
        assert_eq!(a, b);
        assert_eq!(returned, params);
    }

    #[test]
    fn salt_and_password_matter() {
        let password = Password::from_bytes(*b"pw");
        let (a, _) =
            derive_master_key_bits_blocking(&password, Some(cheap_params(b"salt-one"))).unwrap();
        let (b, _) =
            derive_master_key_bits_blocking(&password, Some(cheap_params(b"salt-two"))).unwrap();
        let (c, _) = derive_master_key_bits_blocking(
            &Password::from_bytes(*b"other"),
            Some(cheap_params(b"salt-one")),
        )
        .unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_iterations_rejected() {
        let params = KdfParams {
            iterations: 0,
            ..KdfParams::with_salt(vec![0; 16])
        };
        let err = derive_master_key_bits_blocking(&Password::from_bytes(*b"pw"), Some(params))
            .unwrap_err();
        assert!(matches!(err, CryptoError::KeyDerivation(_)));
    }

    #[test]
    fn token_differs_from_key() {
        let bits = MasterKeyBits::from_bytes([7; MASTER_KEY_LENGTH]);
        let token = derive_auth_token_blocking(&bits).unwrap();
        assert_eq!(token, derive_auth_token_blocking(&bits).unwrap());
        assert_ne!(token.as_bytes(), bits.as_bytes());
        let other = derive_auth_token_blocking(&MasterKeyBits::from_bytes([8; 32])).unwrap();
        assert_ne!(token, other);
    }

    #[test]
    fn fragment_roundtrip() {
        let password = Password::generate().unwrap();
        let fragment = password.to_fragment();
        assert_eq!(
            Password::from_fragment(&fragment).unwrap().as_bytes(),
            password.as_bytes()
        );
        assert_eq!(
            Password::from_fragment(&format!("#{fragment}")).unwrap().as_bytes(),
            password.as_bytes()
        );
    }

    #[test]
    fn fragment_accepts_standard_alphabet() {
        assert_eq!(Password::from_fragment("+/8=").unwrap().as_bytes(), [0xfb, 0xff]);
        assert_eq!(Password::from_fragment("-_8").unwrap().as_bytes(), [0xfb, 0xff]);
        Password::from_fragment("not base64!").unwrap_err();
    }

    #[test]
    fn secrets_are_redacted() {
        let password = Password::from_bytes(*b"hunter2");
        assert!(!format!("{password:?}").contains("104"));
        let bits = MasterKeyBits::from_bytes([42; MASTER_KEY_LENGTH]);
        assert!(!format!("{bits:?}").contains("42"));
    }
}
