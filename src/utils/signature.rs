use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of an outbound webhook body, so the relay can verify it.
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Internal(format!("Invalid webhook secret: {}", e)))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_and_keyed() {
        let a = sign_payload("whsec_a", b"{\"x\":1}").unwrap();
        let again = sign_payload("whsec_a", b"{\"x\":1}").unwrap();
        let b = sign_payload("whsec_b", b"{\"x\":1}").unwrap();
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
