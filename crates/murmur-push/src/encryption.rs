//! RFC 8291 message encryption with the RFC 8188 `aes128gcm` content coding.
//!
//! A single record is produced: the header carries the salt, record size and
//! the ephemeral server public key, followed by the sealed payload.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, KeyInit};
use hkdf::Hkdf;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::rand_core::{OsRng, RngCore};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use sha2::Sha256;

use crate::error::PushError;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Uncompressed P-256 point length.
pub const PUBLIC_KEY_LEN: usize = 65;
/// Client auth secret length.
pub const AUTH_SECRET_LEN: usize = 16;
/// Record size advertised in the header.
pub const RECORD_SIZE: u32 = 4096;
/// Largest request body push services accept.
pub const MAX_BODY_LEN: usize = 4096;
/// Bytes of `salt | rs | idlen | keyid` in front of the record.
pub const HEADER_LEN: usize = SALT_LEN + 4 + 1 + PUBLIC_KEY_LEN;
/// Largest plaintext whose encrypted body, header included, fits in
/// [`MAX_BODY_LEN`] with the delimiter and tag.
pub const MAX_PLAINTEXT_LEN: usize = MAX_BODY_LEN - HEADER_LEN - TAG_LEN - 1;

const TAG_LEN: usize = 16;

const IKM_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const KEY_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";
const LAST_RECORD_DELIMITER: u8 = 0x02;

/// Encrypt `plaintext` for the user agent owning `ua_public` / `auth_secret`.
pub fn encrypt(
    plaintext: &[u8],
    ua_public: &[u8; PUBLIC_KEY_LEN],
    auth_secret: &[u8; AUTH_SECRET_LEN],
) -> Result<Vec<u8>, PushError> {
    if plaintext.is_empty() {
        return Err(PushError::failed("push payload cannot be empty"));
    }
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(PushError::failed(format!(
            "push payload too large: {} bytes",
            plaintext.len()
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let remote = p256::PublicKey::from_sec1_bytes(ua_public)
        .map_err(|_| PushError::InvalidSubscription("p256dh is not a P-256 point".into()))?;

    let local_secret = EphemeralSecret::random(&mut OsRng);
    let local_point = p256::PublicKey::from(&local_secret).to_encoded_point(false);
    let as_public: [u8; PUBLIC_KEY_LEN] = local_point
        .as_bytes()
        .try_into()
        .map_err(|_| PushError::failed("unexpected server public key length"))?;

    let shared = local_secret.diffie_hellman(&remote);

    let mut ikm_info = Vec::with_capacity(IKM_INFO_PREFIX.len() + PUBLIC_KEY_LEN * 2);
    ikm_info.extend_from_slice(IKM_INFO_PREFIX);
    ikm_info.extend_from_slice(ua_public);
    ikm_info.extend_from_slice(&as_public);

    let ikm = hkdf_sha256(auth_secret, shared.raw_secret_bytes().as_slice(), &ikm_info, 32)?;
    let cek = hkdf_sha256(&salt, &ikm, KEY_INFO, 16)?;
    let nonce = hkdf_sha256(&salt, &ikm, NONCE_INFO, 12)?;

    let cipher =
        Aes128Gcm::new_from_slice(&cek).map_err(|_| PushError::failed("invalid content key"))?;

    let mut padded = Vec::with_capacity(plaintext.len() + 1);
    padded.extend_from_slice(plaintext);
    padded.push(LAST_RECORD_DELIMITER);

    let ciphertext = cipher
        .encrypt(nonce.as_slice().into(), padded.as_slice())
        .map_err(|_| PushError::failed("AES-GCM encryption failed"))?;

    let mut body = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(PUBLIC_KEY_LEN as u8);
    body.extend_from_slice(&as_public);
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

fn hkdf_sha256(salt: &[u8], ikm: &[u8], info: &[u8], len: usize) -> Result<Vec<u8>, PushError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; len];
    hk.expand(info, &mut okm)
        .map_err(|_| PushError::failed("HKDF expand failed"))?;
    Ok(okm)
}
