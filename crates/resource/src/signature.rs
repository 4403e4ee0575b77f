//! GitHub `X-Hub-Signature` verification.
//!
//! The header has the fixed form `sha1=<40 lowercase hex digits>`. The digest
//! is HMAC-SHA1 over the raw body bytes exactly as captured, keyed with the
//! webhook secret shared between GitHub and the resource configuration.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Prefix of every valid signature header.
pub const SIGNATURE_PREFIX: &str = "sha1=";

/// Total length of a valid signature header: the prefix plus 20 hex-encoded bytes.
pub const SIGNATURE_LEN: usize = SIGNATURE_PREFIX.len() + 40;

/// Returns `true` when `signature_header` is the HMAC-SHA1 of `body` under `secret`.
///
/// Headers of the wrong length or without the `sha1=` prefix are rejected
/// before any hex decoding. Digest comparison is constant-time.
pub fn validate(body: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    if signature_header.len() != SIGNATURE_LEN {
        return false;
    }
    let Some(hex_digest) = signature_header.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    if hex_digest.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let Ok(received) = hex::decode(hex_digest) else {
        return false;
    };

    mac_for(body, secret).verify_slice(&received).is_ok()
}

/// Computes the header value GitHub would send for `body` under `secret`.
pub fn sign(body: &[u8], secret: &[u8]) -> String {
    let digest = mac_for(body, secret).finalize().into_bytes();
    format!("{SIGNATURE_PREFIX}{}", hex::encode(digest))
}

fn mac_for(body: &[u8], secret: &[u8]) -> HmacSha1 {
    let mut mac =
        <HmacSha1 as Mac>::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    mac
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
