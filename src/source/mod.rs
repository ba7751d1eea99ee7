use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::model::{User, UsersDocument};

pub const DEFAULT_SOURCE: &str = "./data/users.json";

#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
    Inline(Vec<User>),
}

impl DataSource {
    /// `http://` and `https://` strings are URLs; anything else is a file path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(crate::config::expand_tilde(value))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
            Self::Inline(users) => format!("inline ({} users)", users.len()),
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_SOURCE))
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read users file: {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch users: {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch users: {url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("invalid data format: {message}")]
    Format { message: String },
}

/// Decodes the `{ "users": [...] }` document. Any other shape is a format error.
pub fn parse_users(body: &str) -> Result<Vec<User>, SourceError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SourceError::Format {
            message: format!("body is not valid JSON: {e}"),
        })?;
    match value.get("users") {
        Some(serde_json::Value::Array(_)) => {}
        Some(_) => {
            return Err(SourceError::Format {
                message: "expected array in 'users'".to_string(),
            })
        }
        None => {
            return Err(SourceError::Format {
                message: "expected an object with a 'users' array".to_string(),
            })
        }
    }
    let doc: UsersDocument = serde_json::from_value(value).map_err(|e| SourceError::Format {
        message: format!("malformed user record: {e}"),
    })?;
    Ok(doc.users)
}

pub fn build_client(
    proxy: Option<&str>,
    timeout_seconds: usize,
) -> Result<reqwest::Client, SourceError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);

    match proxy.filter(|p| !p.trim().is_empty()) {
        Some(proxy) => {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| SourceError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }
        None => builder = builder.no_proxy(),
    }

    builder
        .build()
        .map_err(|e| SourceError::HttpClientBuild { source: e })
}

/// Loads the full user list once. `client` is only used for [`DataSource::Url`].
pub async fn load_users(
    source: &DataSource,
    client: &reqwest::Client,
) -> Result<Vec<User>, SourceError> {
    match source {
        DataSource::Inline(users) => Ok(users.clone()),
        DataSource::File(path) => {
            let body = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| SourceError::FileRead {
                    path: path.display().to_string(),
                    source: e,
                })?;
            parse_users(&body)
        }
        DataSource::Url(url) => {
            tracing::debug!(%url, "requesting users document");
            let resp = client
                .get(url.as_str())
                .send()
                .await
                .map_err(|e| SourceError::Request {
                    url: url.clone(),
                    source: e,
                })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(SourceError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            let body = resp.text().await.map_err(|e| SourceError::Request {
                url: url.clone(),
                source: e,
            })?;
            parse_users(&body)
        }
    }
}
