//! Azure storage connection-string parsing.
//!
//! Connection strings are semicolon-separated `Key=Value` pairs. The parts
//! this loader needs are `AccountName` and `AccountKey` (base64); protocol,
//! endpoint suffix, and an explicit `BlobEndpoint` override are honored when
//! present.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use logseek_core::DatasetError;

/// A parsed storage account: who we are and where the blob service lives.
#[derive(Debug, Clone)]
pub struct BlobAccount {
    /// Account name, used in signing and in the default endpoint
    pub account: String,

    /// Decoded account key for request signing
    pub key: Vec<u8>,

    /// Blob service base URL, no trailing slash
    pub endpoint: String,
}

impl BlobAccount {
    /// Parse an Azure connection string.
    pub fn parse(connection_string: &str) -> Result<Self, DatasetError> {
        let mut account = None;
        let mut key_b64 = None;
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut blob_endpoint = None;

        for pair in connection_string.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((name, value)) = pair.split_once('=') else {
                return Err(DatasetError::BadConnectionString(format!(
                    "segment without '=': {pair}"
                )));
            };
            match name {
                "AccountName" => account = Some(value.to_string()),
                // The key is base64 and may itself contain '=' padding, which
                // split_once already leaves attached to the value.
                "AccountKey" => key_b64 = Some(value.to_string()),
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "EndpointSuffix" => suffix = value.to_string(),
                "BlobEndpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                _ => {}
            }
        }

        let account = account.ok_or_else(|| {
            DatasetError::BadConnectionString("missing AccountName".into())
        })?;
        let key_b64 = key_b64.ok_or_else(|| {
            DatasetError::BadConnectionString("missing AccountKey".into())
        })?;
        let key = BASE64.decode(key_b64.as_bytes()).map_err(|e| {
            DatasetError::BadConnectionString(format!("AccountKey is not valid base64: {e}"))
        })?;

        let endpoint = blob_endpoint
            .unwrap_or_else(|| format!("{protocol}://{account}.blob.{suffix}"));

        Ok(Self {
            account,
            key,
            endpoint,
        })
    }
}
