//! Remote file adapter over a GitHub-style repository contents API.
//!
//! # Responsibility
//! - Read one file with its revision token (blob sha).
//! - Write one file, passing the revision from a prior read so the remote
//!   rejects the write if the file changed in between.
//!
//! # Invariants
//! - Configuration is validated before any request is built.
//! - A 404 on read means "no file yet" and is not an error.
//! - Tokens never reach logs.

use super::codec::{decode_content, encode_content};
use super::config::SyncConfig;
use super::error::{SyncError, SyncResult};
use log::{info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("labnote/", env!("CARGO_PKG_VERSION"));

/// Remote file as last read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Opaque optimistic-concurrency token for the next write.
    pub revision: String,
    /// Decoded UTF-8 file text.
    pub content: String,
}

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushAck {
    /// Revision of the file as written, when the remote reports it.
    pub revision: Option<String>,
    /// Commit created by the write, when the remote reports it.
    pub commit: Option<String>,
}

/// Single-file remote storage used by sync.
#[allow(async_fn_in_trait)]
pub trait RemoteFileStore {
    /// Reads the configured file. `Ok(None)` when it does not exist.
    async fn fetch(&self, config: &SyncConfig) -> SyncResult<Option<RemoteFile>>;

    /// Writes the configured file. `revision` must come from a prior
    /// [`RemoteFileStore::fetch`]; `None` creates the file.
    async fn push(
        &self,
        config: &SyncConfig,
        content: &str,
        revision: Option<&str>,
        message: &str,
    ) -> SyncResult<PushAck>;
}

/// `reqwest` client for `/repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Default)]
pub struct GitHubContentsClient {
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    #[serde(default)]
    content: Option<ShaRef>,
    #[serde(default)]
    commit: Option<ShaRef>,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubContentsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses an existing `reqwest` client (connection pool, proxy setup).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: String,
        config: &SyncConfig,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", config.token.trim()))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }
}

impl RemoteFileStore for GitHubContentsClient {
    async fn fetch(&self, config: &SyncConfig) -> SyncResult<Option<RemoteFile>> {
        config.validate()?;
        let url = format!(
            "{}?ref={}",
            contents_url(config),
            urlencoding::encode(config.branch.trim())
        );

        let response = self
            .request(reqwest::Method::GET, url, config)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!(
                "event=remote_fetch module=sync status=ok found=false owner={} repo={} path={}",
                config.owner, config.repo, config.path
            );
            return Ok(None);
        }
        if !status.is_success() {
            warn!(
                "event=remote_fetch module=sync status=error http_status={}",
                status.as_u16()
            );
            return Err(SyncError::Api {
                status: status.as_u16(),
                message: status_text(status),
            });
        }

        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|err| SyncError::Decode(err.to_string()))?;
        if body.encoding.as_deref().is_some_and(|encoding| encoding != "base64") {
            return Err(SyncError::Decode(format!(
                "unsupported content encoding `{}`",
                body.encoding.unwrap_or_default()
            )));
        }
        let content = decode_content(&body.content).map_err(SyncError::Decode)?;

        info!(
            "event=remote_fetch module=sync status=ok found=true owner={} repo={} path={} bytes={}",
            config.owner,
            config.repo,
            config.path,
            content.len()
        );
        Ok(Some(RemoteFile {
            revision: body.sha,
            content,
        }))
    }

    async fn push(
        &self,
        config: &SyncConfig,
        content: &str,
        revision: Option<&str>,
        message: &str,
    ) -> SyncResult<PushAck> {
        config.validate()?;
        let body = PutContentsRequest {
            message,
            content: encode_content(content),
            branch: config.branch.trim(),
            sha: revision,
        };

        let response = self
            .request(reqwest::Method::PUT, contents_url(config), config)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = api_error_message(response).await;
            warn!(
                "event=remote_push module=sync status=error http_status={}",
                status.as_u16()
            );
            return Err(SyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let ack = match response.json::<PutContentsResponse>().await {
            Ok(body) => PushAck {
                revision: body.content.map(|content| content.sha),
                commit: body.commit.map(|commit| commit.sha),
            },
            Err(err) => {
                warn!("event=remote_push module=sync status=ok ack_parse=failed error={err}");
                PushAck::default()
            }
        };
        info!(
            "event=remote_push module=sync status=ok owner={} repo={} path={} with_revision={} bytes={}",
            config.owner,
            config.repo,
            config.path,
            revision.is_some(),
            content.len()
        );
        Ok(ack)
    }
}

/// Contents endpoint for the configured file, with each segment URL-encoded.
pub fn contents_url(config: &SyncConfig) -> String {
    let path = config
        .path
        .trim()
        .trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}/repos/{}/{}/contents/{path}",
        config.api_base.trim().trim_end_matches('/'),
        urlencoding::encode(config.owner.trim()),
        urlencoding::encode(config.repo.trim()),
    )
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}

async fn api_error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status_text(status),
    }
}

#[cfg(test)]
mod tests {
    use super::contents_url;
    use crate::sync::config::SyncConfig;

    #[test]
    fn contents_url_encodes_segments() {
        let mut config = SyncConfig::new("t", "lab owner", "notes");
        config.path = "/backups/实验 data.json".to_string();
        config.api_base = "https://ghe.example.com/api/v3/".to_string();

        assert_eq!(
            contents_url(&config),
            "https://ghe.example.com/api/v3/repos/lab%20owner/notes/contents/backups/%E5%AE%9E%E9%AA%8C%20data.json"
        );
    }

    #[test]
    fn default_contents_url_targets_github() {
        let config = SyncConfig::new("t", "me", "lab");
        assert_eq!(
            contents_url(&config),
            "https://api.github.com/repos/me/lab/contents/labnote_data.json"
        );
    }
}
