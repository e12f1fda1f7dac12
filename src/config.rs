//! Explicit configuration values passed into each stage
//!
//! Nothing here is read from process-wide state after startup: `main`
//! builds these values once (from the environment and an optional YAML
//! policy file) and hands them to the extractor, transformer and loader.
//!
//! Example policy file:
//! ```yaml
//! unknown_text: Unknown
//! null_markers: ["", "NA", "null"]
//! date_formats: ["%Y-%m-%d", "%m/%d/%Y"]
//! ```

use crate::client::{Auth, AuthType, AwsCredentials};
use crate::sales::SALES_TABLE;
use crate::transform::DEFAULT_DATE_FORMATS;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Cell values read as null, matching the usual dataframe defaults
pub const DEFAULT_NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Cleaning rules shared by the CSV reader and the transformer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleaningPolicy {
    /// Placeholder for missing Product, Category and Customer_Region
    pub unknown_text: String,
    /// Cell values treated as null when reading CSV
    pub null_markers: Vec<String>,
    /// chrono formats tried after RFC 3339 when parsing Sale_Date
    pub date_formats: Vec<String>,
}

impl Default for CleaningPolicy {
    fn default() -> Self {
        Self {
            unknown_text: "Unknown".to_string(),
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|m| m.to_string()).collect(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl CleaningPolicy {
    /// Read a policy from a YAML file; missing keys keep their defaults
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse policy file: {}", path.display()))
    }
}

/// Destination database for the loader
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Local database path, or a `libsql://` / `http(s)://` URL for a remote one
    pub url: String,
    /// Credentials for a remote database
    pub auth_token: Option<String>,
    /// Destination table
    pub table: String,
}

impl SinkConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            table: SALES_TABLE.to_string(),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Load the sink from environment variables
    ///
    /// - SALES_DB_URL: database path or URL (required)
    /// - SALES_DB_AUTH_TOKEN: token for a remote database (optional)
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("SALES_DB_URL").context("SALES_DB_URL environment variable not set")?;

        let mut config = Self::new(url);
        if let Ok(token) = std::env::var("SALES_DB_AUTH_TOKEN") {
            config = config.with_auth_token(token);
        }
        Ok(config)
    }

    pub fn is_remote(&self) -> bool {
        ["libsql://", "http://", "https://", "ws://", "wss://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }

    /// Filesystem path of a local database
    pub fn local_path(&self) -> &str {
        self.url.strip_prefix("file:").unwrap_or(&self.url)
    }
}

/// Region used when neither AWS_REGION nor AWS_DEFAULT_REGION is set
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// HTTP object storage endpoint and credentials
pub struct ObjectStoreConfig {
    pub endpoint: Url,
    pub auth: Auth,
}

impl ObjectStoreConfig {
    /// Load the object store from environment variables
    ///
    /// - OBJECT_STORE_ENDPOINT: base URL, used when `endpoint` is None
    /// - AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY: SigV4 keys (optional)
    /// - AWS_SESSION_TOKEN: temporary credentials token (optional)
    /// - AWS_REGION / AWS_DEFAULT_REGION: signing region, default `us-east-1`
    /// - OBJECT_STORE_TOKEN: bearer token (optional)
    /// - OBJECT_STORE_USERNAME / OBJECT_STORE_PASSWORD: basic auth (optional)
    ///
    /// `kind` forces one auth kind; without it AWS keys win over a token and
    /// a token wins over basic auth. With AWS auth and no endpoint, the
    /// regional AWS S3 endpoint is used.
    pub fn from_env(endpoint: Option<&str>, kind: Option<&AuthType>) -> Result<Self> {
        let auth = Auth::new(
            kind,
            std::env::var("OBJECT_STORE_USERNAME").ok(),
            std::env::var("OBJECT_STORE_PASSWORD").ok(),
            std::env::var("OBJECT_STORE_TOKEN").ok(),
            aws_credentials_from_env(),
        );
        log::debug!("Object store auth: {}", auth);

        let endpoint = match (endpoint, std::env::var("OBJECT_STORE_ENDPOINT"), &auth) {
            (Some(endpoint), _, _) => endpoint.to_string(),
            (None, Ok(endpoint), _) => endpoint,
            (None, Err(_), Auth::Aws(aws)) => format!("https://s3.{}.amazonaws.com", aws.region),
            (None, Err(e), _) => {
                return Err(e).context("OBJECT_STORE_ENDPOINT environment variable not set");
            }
        };
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid object store endpoint: {}", endpoint))?;

        Ok(Self { endpoint, auth })
    }
}

fn aws_credentials_from_env() -> Option<AwsCredentials> {
    let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
    let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
    let region = std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| DEFAULT_AWS_REGION.to_string());

    let credentials = AwsCredentials::new(access_key_id, secret_access_key, region);
    Some(match std::env::var("AWS_SESSION_TOKEN") {
        Ok(token) => credentials.with_session_token(token),
        Err(_) => credentials,
    })
}
