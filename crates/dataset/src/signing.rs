//! SharedKey Lite request signing for the blob service.
//!
//! Every request carries `x-ms-date` and `x-ms-version` headers plus an
//! `Authorization: SharedKeyLite <account>:<signature>` header. The
//! signature is an HMAC-SHA256 over the canonical string for the request,
//! base64-encoded with the account key.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Storage service version sent with every request.
pub const STORAGE_API_VERSION: &str = "2021-08-06";

type HmacSha256 = Hmac<Sha256>;

/// Signs blob-service requests for one account.
#[derive(Clone)]
pub struct SharedKeySigner {
    account: String,
    key: Vec<u8>,
}

impl SharedKeySigner {
    pub fn new(account: impl Into<String>, key: Vec<u8>) -> Self {
        Self {
            account: account.into(),
            key,
        }
    }

    /// The `Authorization` header value for a request.
    ///
    /// `canonical_resource` is the SharedKey Lite canonicalized resource:
    /// `/{account}/{container}[/{blob}]`, with `?comp=...` appended when the
    /// request carries a `comp` query parameter.
    pub fn authorization(&self, verb: &str, date_rfc1123: &str, canonical_resource: &str) -> String {
        let string_to_sign = Self::string_to_sign(verb, date_rfc1123, canonical_resource);
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());
        format!("SharedKeyLite {}:{}", self.account, signature)
    }

    /// SharedKey Lite canonical string. The `Date` line is empty because the
    /// date travels in the `x-ms-date` header instead.
    fn string_to_sign(verb: &str, date_rfc1123: &str, canonical_resource: &str) -> String {
        format!(
            "{verb}\n\n\n\nx-ms-date:{date_rfc1123}\nx-ms-version:{STORAGE_API_VERSION}\n{canonical_resource}"
        )
    }
}

/// Current time formatted per RFC 1123, as the storage service expects.
pub fn rfc1123_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
