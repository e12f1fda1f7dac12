//! AWS Signature Version 4 for S3 requests
//!
//! Only what a read-only client needs: signing of body-less requests with
//! access-key credentials (plus an optional session token).

use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of an empty request body
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Access-key credentials and the region requests are scoped to
#[derive(Clone, PartialEq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            region: region.into(),
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Sign a request and return the headers to add to it
    ///
    /// `url` must already be in canonical form (see [`uri_encode`] and
    /// [`query_string`]); `headers` are extra request headers to include in
    /// the signature. `Host` is always signed and is not returned.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        headers: &[(&str, &str)],
        payload_sha256: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<(&'static str, String)>> {
        let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let date = at.format("%Y%m%d").to_string();

        let mut signed: Vec<(String, String)> = headers
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.trim().to_string()))
            .collect();
        signed.push(("host".to_string(), host_header(url)?));
        signed.push(("x-amz-content-sha256".to_string(), payload_sha256.to_string()));
        signed.push(("x-amz-date".to_string(), amz_date.clone()));
        if let Some(token) = &self.session_token {
            signed.push(("x-amz-security-token".to_string(), token.clone()));
        }
        signed.sort();

        let canonical_headers: String = signed
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();
        let signed_headers = signed
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method,
            canonical_path(url),
            canonical_query(url),
            canonical_headers,
            signed_headers,
            payload_sha256
        );
        log::trace!("SigV4 canonical request:\n{}", canonical_request);

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, SERVICE);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = [date.as_str(), self.region.as_str(), SERVICE, "aws4_request"]
            .iter()
            .try_fold(
                format!("AWS4{}", self.secret_access_key).into_bytes(),
                |key, part| hmac(&key, part.as_bytes()),
            )?;
        let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes())?);

        let mut out = vec![
            ("x-amz-date", amz_date),
            ("x-amz-content-sha256", payload_sha256.to_string()),
        ];
        if let Some(token) = &self.session_token {
            out.push(("x-amz-security-token", token.clone()));
        }
        out.push((
            "authorization",
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, self.access_key_id, scope, signed_headers, signature
            ),
        ));
        Ok(out)
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| eyre!("Invalid signing key: {}", e))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| eyre!("URL has no host: {}", url))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn canonical_path(url: &Url) -> &str {
    match url.path() {
        "" => "/",
        path => path,
    }
}

fn canonical_query(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    query_string(
        &pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>(),
    )
}

/// Percent-encode everything except the unreserved characters
pub fn uri_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Query string with encoded pairs sorted by key, then value
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}
