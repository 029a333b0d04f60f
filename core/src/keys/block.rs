//! keys/block.rs
//! Wrapped-key block: `scheme u16 ‖ material_len u16 ‖ material`.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::key_schemes;
use crate::crypto::KEY_LEN_32;
use crate::keys::types::KeyError;

/// Uncompressed SEC1 P-256 point.
pub const EPHEMERAL_PUB_LEN: usize = 65;
pub const ECDHE_MATERIAL_LEN: usize = EPHEMERAL_PUB_LEN + KEY_LEN_32;

const BLOCK_PREFIX: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKeyBlock {
    pub scheme: u16,
    pub material: Vec<u8>,
}

/// ECDHE material split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdheWrap {
    pub ephemeral_pub: [u8; EPHEMERAL_PUB_LEN],
    pub wrapped_key: [u8; KEY_LEN_32],
}

impl WrappedKeyBlock {
    pub fn ecdhe(&self) -> Result<EcdheWrap, KeyError> {
        if self.scheme != key_schemes::ECDHE_P256 {
            return Err(KeyError::MalformedKeyBlock(format!("scheme 0x{:04x} carries no ECDHE material", self.scheme)));
        }
        if self.material.len() != ECDHE_MATERIAL_LEN {
            return Err(KeyError::MalformedKeyBlock(format!(
                "ECDHE material is {} bytes, expected {}", self.material.len(), ECDHE_MATERIAL_LEN
            )));
        }
        let mut ephemeral_pub = [0u8; EPHEMERAL_PUB_LEN];
        ephemeral_pub.copy_from_slice(&self.material[..EPHEMERAL_PUB_LEN]);
        let mut wrapped_key = [0u8; KEY_LEN_32];
        wrapped_key.copy_from_slice(&self.material[EPHEMERAL_PUB_LEN..]);
        Ok(EcdheWrap { ephemeral_pub, wrapped_key })
    }
}

pub fn decode_key_block(buf: &[u8]) -> Result<WrappedKeyBlock, KeyError> {
    if buf.len() < BLOCK_PREFIX {
        return Err(KeyError::MalformedKeyBlock(format!("{} bytes, need at least {}", buf.len(), BLOCK_PREFIX)));
    }
    let scheme = LittleEndian::read_u16(&buf[0..2]);
    let material_len = LittleEndian::read_u16(&buf[2..4]) as usize;
    if buf.len() != BLOCK_PREFIX + material_len {
        return Err(KeyError::MalformedKeyBlock(format!(
            "declared {} material bytes, block holds {}", material_len, buf.len() - BLOCK_PREFIX
        )));
    }

    match scheme {
        key_schemes::NONE | key_schemes::SYMMETRIC if material_len != 0 => Err(KeyError::MalformedKeyBlock(
            format!("scheme 0x{scheme:04x} must not carry material"),
        )),
        key_schemes::NONE | key_schemes::SYMMETRIC | key_schemes::ECDHE_P256 => {
            Ok(WrappedKeyBlock { scheme, material: buf[BLOCK_PREFIX..].to_vec() })
        }
        other => Err(KeyError::MalformedKeyBlock(format!("unknown scheme 0x{other:04x}"))),
    }
}

pub fn encode_key_block(scheme: u16, material: &[u8]) -> Result<Vec<u8>, KeyError> {
    let len = u16::try_from(material.len())
        .map_err(|_| KeyError::MalformedKeyBlock(format!("material too long: {}", material.len())))?;
    let mut out = vec![0u8; BLOCK_PREFIX];
    LittleEndian::write_u16(&mut out[0..2], scheme);
    LittleEndian::write_u16(&mut out[2..4], len);
    out.extend_from_slice(material);
    Ok(out)
}
