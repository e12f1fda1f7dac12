//! S3-compatible object storage over HTTP
//!
//! Uses path-style addressing:
//! - `GET {endpoint}/{bucket}?list-type=2&prefix=...` to list keys (paged
//!   through `continuation-token`)
//! - `GET {endpoint}/{bucket}/{key}` to fetch an object body
//!
//! URLs are built in their SigV4 canonical form so that a signed request
//! and the request on the wire are the same bytes.

use super::{Auth, EMPTY_PAYLOAD_SHA256, query_string, uri_encode};
use crate::storage::ObjectStore;
use chrono::Utc;
use eyre::{Context, Result, eyre};
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::{Client, RequestBuilder};
use std::collections::HashSet;
use url::Url;

/// One page of a ListObjectsV2 response
#[derive(Debug, Default, PartialEq)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Token for the next page, present only when the listing was truncated
    pub next_token: Option<String>,
}

/// Parse a ListObjectsV2 XML body
///
/// Keys come back unescaped, including numeric character references.
pub fn parse_list_response(body: &str) -> Result<ListPage> {
    let mut reader = Reader::from_str(body);
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut truncated = false;
    let mut page = ListPage::default();

    loop {
        match reader.read_event().context("Malformed listing response")? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                text.clear();
            }
            Event::Text(e) => {
                let unescaped = e.unescape().context("Malformed text in listing response")?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(_) => {
                let element = path.last().map(String::as_str);
                let parent = path.len().checked_sub(2).map(|i| path[i].as_str());
                match (parent, element) {
                    (Some("Contents"), Some("Key")) => page.keys.push(std::mem::take(&mut text)),
                    (Some("ListBucketResult"), Some("IsTruncated")) => {
                        truncated = text.trim() == "true"
                    }
                    (Some("ListBucketResult"), Some("NextContinuationToken")) => {
                        page.next_token = Some(std::mem::take(&mut text))
                    }
                    _ => {}
                }
                path.pop();
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match truncated {
        true => {
            if page.next_token.as_deref().is_none_or(str::is_empty) {
                eyre::bail!("Truncated listing without a continuation token");
            }
        }
        false => page.next_token = None,
    }

    Ok(page)
}

/// Object store client for an S3-compatible HTTP endpoint
///
/// # Example
/// ```no_run
/// use sales_etl::client::{Auth, AwsCredentials, HttpObjectStore};
/// use sales_etl::storage::ObjectStore;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://s3.eu-west-1.amazonaws.com")?;
/// let auth = Auth::Aws(AwsCredentials::new("AKID", "secret", "eu-west-1"));
/// let store = HttpObjectStore::try_new(url, "messy-data", auth)?;
/// let keys = store.list("2024/").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: Url,
    bucket: String,
    auth: Auth,
}

impl HttpObjectStore {
    /// Create a client for one bucket on `endpoint`
    ///
    /// # Errors
    /// Returns an error if the endpoint cannot carry a path, the auth header
    /// is not valid header text, or the HTTP client cannot be built
    pub fn try_new(endpoint: Url, bucket: impl Into<String>, auth: Auth) -> Result<Self> {
        if endpoint.cannot_be_a_base() {
            eyre::bail!("Endpoint cannot be a base URL: {}", endpoint);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(value) = auth.header_value() {
            headers.append(reqwest::header::AUTHORIZATION, value.parse()?);
        }
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint,
            bucket: bucket.into(),
            auth,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// URL of the bucket, or of an object inside it when `key` is given
    ///
    /// Key segments are encoded individually so `/` keeps its meaning.
    pub fn object_url(&self, key: Option<&str>) -> Url {
        let mut path = self.endpoint.path().trim_end_matches('/').to_string();
        path.push('/');
        path.push_str(&uri_encode(&self.bucket));
        if let Some(key) = key {
            for segment in key.split('/') {
                path.push('/');
                path.push_str(&uri_encode(segment));
            }
        }

        let mut url = self.endpoint.clone();
        url.set_path(&path);
        url.set_query(None);
        url
    }

    /// URL of one ListObjectsV2 page
    pub fn list_url(&self, prefix: &str, token: Option<&str>) -> Url {
        let mut pairs = vec![("list-type", "2"), ("prefix", prefix)];
        if let Some(token) = token {
            pairs.push(("continuation-token", token));
        }

        let mut url = self.object_url(None);
        url.set_query(Some(&query_string(&pairs)));
        url
    }

    /// GET request for `url`, signed when the store uses AWS auth
    fn request(&self, url: Url) -> Result<RequestBuilder> {
        let mut request = self.client.get(url.clone());
        if let Auth::Aws(credentials) = &self.auth {
            let headers = credentials.sign("GET", &url, &[], EMPTY_PAYLOAD_SHA256, Utc::now())?;
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }
        Ok(request)
    }

    async fn list_page(&self, prefix: &str, token: Option<&str>) -> Result<ListPage> {
        let response = self
            .request(self.list_url(prefix, token))?
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Failed to list bucket '{}' ({}): {}", self.bucket, status, body);
        }

        let body = response
            .text()
            .await
            .with_context(|| "Failed to read listing response")?;
        parse_list_response(&body)
    }
}

impl ObjectStore for HttpObjectStore {
    fn location(&self) -> String {
        self.object_url(None).to_string()
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut seen = HashSet::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.list_page(prefix, token.as_deref()).await?;
            log::debug!(
                "Listed {} key(s) from bucket '{}'",
                page.keys.len(),
                self.bucket
            );
            keys.extend(page.keys);

            match page.next_token {
                Some(next) if !seen.insert(next.clone()) => {
                    eyre::bail!(
                        "Listing of bucket '{}' repeated continuation token '{}'",
                        self.bucket,
                        next
                    );
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .request(self.object_url(Some(key)))?
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            eyre::bail!("Failed to get object '{}' ({})", key, status);
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of '{}'", key))?;
        Ok(body.to_vec())
    }
}
