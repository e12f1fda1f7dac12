//! Object storage abstraction

use eyre::Result;
use std::future::Future;

/// A flat key/value store of objects grouped under a bucket
///
/// Keys are `/`-separated. Implementations exist for HTTP endpoints
/// ([`HttpObjectStore`](crate::client::HttpObjectStore)) and for local
/// directories ([`DirectoryObjectStore`](super::DirectoryObjectStore)).
pub trait ObjectStore: Send + Sync {
    /// Human readable location, used in logs and failure records
    fn location(&self) -> String;

    /// List every key starting with `prefix`
    fn list(&self, prefix: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Fetch the body of one object
    fn get(&self, key: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
