//! Fragment download and table assembly.
//!
//! The loader lists the configured container, downloads every blob whose
//! name carries the fragment suffix, deserializes each into a table
//! fragment, and concatenates them. The listing comes back as XML; blob
//! names are pulled out of the `<Name>` elements.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::{error, info, warn};

use logseek_config::StorageConfig;
use logseek_core::table::Row;
use logseek_core::{DatasetError, LogTable};

use crate::connection::BlobAccount;
use crate::signing::{SharedKeySigner, STORAGE_API_VERSION, rfc1123_now};

/// Per-request deadline for storage calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads and assembles the unified table from blob storage.
pub struct DatasetLoader {
    client: reqwest::Client,
    account: BlobAccount,
    signer: SharedKeySigner,
    container: String,
    fragment_suffix: String,
}

impl DatasetLoader {
    /// Build a loader from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Result<Self, DatasetError> {
        let account = BlobAccount::parse(&config.connection_string)?;
        let signer = SharedKeySigner::new(account.account.clone(), account.key.clone());
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DatasetError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            account,
            signer,
            container: config.container.clone(),
            fragment_suffix: config.fragment_suffix.clone(),
        })
    }

    /// Load the unified table, degrading to empty on any failure.
    pub async fn load(&self) -> LogTable {
        match self.try_load().await {
            Ok(table) => {
                info!(
                    rows = table.row_count(),
                    columns = table.columns().len(),
                    "Dataset loaded"
                );
                table
            }
            Err(e) => {
                error!(error = %e, "Dataset load failed, starting with an empty table");
                LogTable::empty()
            }
        }
    }

    async fn try_load(&self) -> Result<LogTable, DatasetError> {
        info!(container = %self.container, "Listing dataset fragments");
        let names = self.list_fragments().await?;
        if names.is_empty() {
            warn!(container = %self.container, "No fragments found in container");
            return Ok(LogTable::empty());
        }

        let mut fragments = Vec::with_capacity(names.len());
        for name in &names {
            info!(blob = %name, "Downloading fragment");
            fragments.push(self.download_fragment(name).await?);
        }
        Ok(LogTable::concat(fragments))
    }

    /// Blob names in the container that carry the fragment suffix.
    async fn list_fragments(&self) -> Result<Vec<String>, DatasetError> {
        let url = format!(
            "{}/{}?restype=container&comp=list",
            self.account.endpoint, self.container
        );
        let canonical = format!("/{}/{}?comp=list", self.account.account, self.container);
        let date = rfc1123_now();

        let response = self
            .client
            .get(&url)
            .header("x-ms-date", &date)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header(
                "Authorization",
                self.signer.authorization("GET", &date, &canonical),
            )
            .send()
            .await
            .map_err(|e| DatasetError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(DatasetError::Listing(format!("status {status}: {body}")));
        }

        let xml = response
            .text()
            .await
            .map_err(|e| DatasetError::Listing(e.to_string()))?;

        let names = extract_blob_names(&xml)
            .into_iter()
            .filter(|name| name.ends_with(&self.fragment_suffix))
            .collect();
        Ok(names)
    }

    /// Download one fragment and deserialize it.
    async fn download_fragment(&self, name: &str) -> Result<LogTable, DatasetError> {
        let url = format!("{}/{}/{}", self.account.endpoint, self.container, name);
        let canonical = format!("/{}/{}/{}", self.account.account, self.container, name);
        let date = rfc1123_now();

        let response = self
            .client
            .get(&url)
            .header("x-ms-date", &date)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header(
                "Authorization",
                self.signer.authorization("GET", &date, &canonical),
            )
            .send()
            .await
            .map_err(|e| DatasetError::Download {
                blob: name.into(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DatasetError::Download {
                blob: name.into(),
                reason: format!("status {status}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| DatasetError::Download {
            blob: name.into(),
            reason: e.to_string(),
        })?;

        parse_fragment(&bytes).map_err(|reason| DatasetError::Deserialize {
            blob: name.into(),
            reason,
        })
    }
}

/// A fragment is either a bare JSON array of row objects or a full table
/// document with explicit columns.
fn parse_fragment(bytes: &[u8]) -> Result<LogTable, String> {
    if let Ok(rows) = serde_json::from_slice::<Vec<Row>>(bytes) {
        return Ok(LogTable::from_rows(rows));
    }
    serde_json::from_slice::<LogTable>(bytes).map_err(|e| e.to_string())
}

/// Pull blob names out of a container-listing XML document.
fn extract_blob_names(xml: &str) -> Vec<String> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r"<Name>([^<]+)</Name>").expect("blob name pattern is valid")
    });
    re.captures_iter(xml)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="log-fragments">
  <Blobs>
    <Blob><Name>2024-01.json</Name><Properties><Content-Length>120</Content-Length></Properties></Blob>
    <Blob><Name>2024-02.json</Name><Properties><Content-Length>98</Content-Length></Properties></Blob>
    <Blob><Name>readme.txt</Name><Properties><Content-Length>10</Content-Length></Properties></Blob>
  </Blobs>
  <NextMarker/>
</EnumerationResults>"#;

    #[test]
    fn extracts_all_names() {
        let names = extract_blob_names(LISTING);
        assert_eq!(names, vec!["2024-01.json", "2024-02.json", "readme.txt"]);
    }

    #[test]
    fn empty_listing_yields_nothing() {
        assert!(extract_blob_names("<EnumerationResults><Blobs/></EnumerationResults>").is_empty());
    }

    #[test]
    fn fragment_as_row_array() {
        let table = parse_fragment(br#"[{"op":"Read","ms":12},{"op":"Write","ms":40}]"#).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns(), ["op", "ms"]);
    }

    #[test]
    fn fragment_as_table_document() {
        let table =
            parse_fragment(br#"{"columns":["op"],"rows":[{"op":"Delete"}]}"#).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn malformed_fragment_is_an_error() {
        assert!(parse_fragment(b"not json at all").is_err());
    }

    #[test]
    fn loader_rejects_bad_connection_string() {
        let config = StorageConfig {
            connection_string: "AccountName=only".into(),
            ..StorageConfig::default()
        };
        assert!(DatasetLoader::from_config(&config).is_err());
    }

    #[test]
    fn loader_builds_from_default_config() {
        // The default placeholder connection string parses cleanly even
        // though it reaches nothing.
        assert!(DatasetLoader::from_config(&StorageConfig::default()).is_ok());
    }
}
