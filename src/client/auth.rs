//! Object store credentials

use super::AwsCredentials;
use base64::Engine;
use clap::ValueEnum;
use std::str::FromStr;

/// Credentials sent with every object store request
#[derive(Clone, PartialEq)]
pub enum Auth {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: Basic <base64(user:password)>`
    Basic(String, String),
    /// AWS Signature Version 4, computed per request
    Aws(AwsCredentials),
    /// Anonymous access
    None,
}

impl Auth {
    /// Pick credentials of the requested kind
    ///
    /// Without a `kind`, AWS credentials win over a token, and a token wins
    /// over a username/password pair. A kind whose credentials are incomplete
    /// falls back to [`Auth::None`].
    pub fn new(
        kind: Option<&AuthType>,
        username: Option<String>,
        password: Option<String>,
        token: Option<String>,
        aws: Option<AwsCredentials>,
    ) -> Self {
        match (kind, username, password, token, aws) {
            (Some(AuthType::None), ..) => Self::None,
            (Some(AuthType::Aws) | None, _, _, _, Some(aws)) => Self::Aws(aws),
            (Some(AuthType::Bearer) | None, _, _, Some(token), _) => Self::Bearer(token),
            (Some(AuthType::Basic) | None, Some(username), Some(password), _, _) => {
                Self::Basic(username, password)
            }
            _ => Self::None,
        }
    }

    /// Value of a fixed `Authorization` header, if any
    ///
    /// AWS signatures depend on each request and are never fixed.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Bearer(token) => Some(format!("Bearer {}", token)),
            Self::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", credentials))
            }
            Self::Aws(_) | Self::None => None,
        }
    }
}

// Never print secrets
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Auth::{}", self)
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "Bearer"),
            Self::Basic(_, _) => write!(f, "Basic"),
            Self::Aws(_) => write!(f, "Aws"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Auth kind selectable on the command line
#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum AuthType {
    Aws,
    Bearer,
    Basic,
    None,
}

impl FromStr for AuthType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "bearer" => Ok(Self::Bearer),
            "basic" => Ok(Self::Basic),
            "none" => Ok(Self::None),
            other => Err(format!("unknown auth type '{}'", other)),
        }
    }
}
