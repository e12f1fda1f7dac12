//! Object storage HTTP client and authentication.
//!
//! This module provides the [`HttpObjectStore`] for reading CSV objects from an
//! S3-compatible endpoint, along with authentication types ([`Auth`], [`AuthType`])
//! and AWS Signature Version 4 signing ([`AwsCredentials`]).

mod auth;
mod http_store;
mod sigv4;

pub use auth::{Auth, AuthType};
pub use http_store::{HttpObjectStore, ListPage, parse_list_response};
pub use sigv4::{AwsCredentials, EMPTY_PAYLOAD_SHA256, query_string, uri_encode};
