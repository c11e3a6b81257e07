use crate::error::{PrismError, Result};
use sha2::{Digest, Sha256};
use std::io::Read;

/// Lowercase hex SHA-256 of a byte slice.
pub fn digest_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Lowercase hex SHA-256 of a reader, streamed in 64 KiB frames.
pub fn digest_reader<R: Read + ?Sized>(r: &mut R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = r.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check that a claimed checksum has the shape of a hex SHA-256 digest.
///
/// Shape only; the actual comparison against a computed digest is exact
/// string equality at the call site.
pub fn validate_digest_shape(hex_str: &str) -> Result<()> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| PrismError::InvalidInput(format!("invalid checksum hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(PrismError::InvalidInput(format!(
            "checksum must be 64 hex chars, got {}",
            hex_str.len()
        )));
    }
    Ok(())
}
