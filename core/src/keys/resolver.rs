//! keys/resolver.rs
//!
//! Turns caller key material and the archive's wrapped-key block into the
//! content encryption key.
//!
//! Asymmetric unwrap:
//! - shared  = ECDH(recipient private, ephemeral public)
//! - mask    = HKDF-SHA256(salt, shared, "AEA_KWK" ‖ ephemeral ‖ recipient)
//! - archive = wrapped XOR mask
//!
//! There is no key check value: a wrong private key yields a wrong archive
//! key, which shows up as an authentication failure on the first segment.

use p256::elliptic_curve::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePrivateKey;
use p256::{PublicKey, SecretKey};
use tracing::debug;
use zeroize::Zeroizing;

use crate::constants::key_schemes;
use crate::crypto::{derive_content_key, derive_wrap_mask, KEY_LEN_32};
use crate::headers::{ArchiveHeader, Profile};
use crate::keys::block::{decode_key_block, EcdheWrap, ECDHE_MATERIAL_LEN, EPHEMERAL_PUB_LEN};
use crate::keys::material::KeyMaterial;
use crate::keys::types::{ContentEncryptionKey, KeyError};

fn expected_scheme(profile: Profile) -> u16 {
    match profile {
        Profile::KeyLess => key_schemes::NONE,
        Profile::Asymmetric | Profile::AsymmetricSigned => key_schemes::ECDHE_P256,
        _ => key_schemes::SYMMETRIC,
    }
}

/// Parse a P-256 private key from PKCS#8 (`PRIVATE KEY`) or SEC1 (`EC PRIVATE KEY`) PEM.
pub fn parse_private_key_pem(pem: &[u8]) -> Result<SecretKey, KeyError> {
    let text = std::str::from_utf8(pem).map_err(|_| KeyError::InvalidPem("not UTF-8".into()))?;
    SecretKey::from_pkcs8_pem(text)
        .or_else(|_| SecretKey::from_sec1_pem(text))
        .map_err(|e| KeyError::InvalidPem(e.to_string()))
}

fn recipient_point(secret: &SecretKey) -> Vec<u8> {
    secret.public_key().to_encoded_point(false).as_bytes().to_vec()
}

/// Recover the archive key from ECDHE material.
pub fn unwrap_archive_key(
    secret: &SecretKey,
    wrap: &EcdheWrap,
    salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN_32]>, KeyError> {
    let ephemeral = PublicKey::from_sec1_bytes(&wrap.ephemeral_pub)
        .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;

    let shared = diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());
    let mask = derive_wrap_mask(
        shared.raw_secret_bytes().as_slice(),
        salt,
        &wrap.ephemeral_pub,
        &recipient_point(secret),
    )
    .map_err(|e| KeyError::Derivation(e.to_string()))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN_32]);
    for (k, (w, m)) in key.iter_mut().zip(wrap.wrapped_key.iter().zip(mask.iter())) {
        *k = w ^ m;
    }
    Ok(key)
}

/// Inverse of [`unwrap_archive_key`]: produce ECDHE block material
/// (`ephemeral_pub ‖ wrapped_key`) for `recipient`.
pub fn wrap_archive_key(
    archive_key: &[u8; KEY_LEN_32],
    ephemeral: &SecretKey,
    recipient: &PublicKey,
    salt: &[u8],
) -> Result<Vec<u8>, KeyError> {
    let shared = diffie_hellman(ephemeral.to_nonzero_scalar(), recipient.as_affine());
    let eph_pub = recipient_point(ephemeral);
    let recipient_pub = recipient.to_encoded_point(false);
    let mask = derive_wrap_mask(shared.raw_secret_bytes().as_slice(), salt, &eph_pub, recipient_pub.as_bytes())
        .map_err(|e| KeyError::Derivation(e.to_string()))?;

    let mut out = Vec::with_capacity(ECDHE_MATERIAL_LEN);
    out.extend_from_slice(&eph_pub);
    out.extend(archive_key.iter().zip(mask.iter()).map(|(k, m)| k ^ m));
    debug_assert_eq!(out.len(), EPHEMERAL_PUB_LEN + KEY_LEN_32);
    Ok(out)
}

/// Resolve the content encryption key for one archive.
///
/// | profile    | no material       | symmetric          | PEM              |
/// |------------|-------------------|--------------------|------------------|
/// | KeyLess    | empty archive key | rejected           | rejected         |
/// | Symmetric  | missing           | archive key        | rejected         |
/// | Asymmetric | missing           | pre-unwrapped key  | ECDHE unwrap     |
pub fn resolve_content_key(
    material: Option<&KeyMaterial>,
    key_block: &[u8],
    header: &ArchiveHeader,
) -> Result<ContentEncryptionKey, KeyError> {
    let profile = header.profile()?;
    let block = decode_key_block(key_block)?;
    if block.scheme != expected_scheme(profile) {
        return Err(KeyError::SchemeMismatch { profile, scheme: block.scheme });
    }

    let archive_key: Zeroizing<Vec<u8>> = match (profile, material) {
        (Profile::KeyLess, None) => Zeroizing::new(Vec::new()),
        (Profile::KeyLess, Some(m)) => {
            return Err(KeyError::UnsupportedMaterial { profile, material: m.kind() });
        }
        (_, None) => return Err(KeyError::MissingKeyMaterial { profile }),
        (Profile::Symmetric | Profile::Asymmetric, Some(KeyMaterial::Symmetric(k))) => {
            Zeroizing::new(k.as_bytes().to_vec())
        }
        (Profile::Asymmetric, Some(KeyMaterial::Asymmetric(pem))) => {
            let wrap = block.ecdhe()?;
            let secret = parse_private_key_pem(pem)?;
            let key = unwrap_archive_key(&secret, &wrap, &header.salt)?;
            Zeroizing::new(key.to_vec())
        }
        (_, Some(m)) => return Err(KeyError::UnsupportedMaterial { profile, material: m.kind() }),
    };

    debug!(profile = ?profile, material = material.map(KeyMaterial::kind), "resolved archive key");

    let mut cek = ContentEncryptionKey([0u8; KEY_LEN_32]);
    derive_content_key(&archive_key, header, &mut cek.0).map_err(|e| KeyError::Derivation(e.to_string()))?;
    Ok(cek)
}
