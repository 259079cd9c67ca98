//! GitHub contents API backend

use crate::store::{DocumentStore, WriteReceipt};
use crate::wire::{decode_content, encode_document, ContentsFile, ErrorBody, PutContents, PutResponse};
use async_trait::async_trait;
use pool_model::{Document, PoolError, PoolResult, Snapshot, VersionToken};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Default GitHub API base URL
const GITHUB_API_URL: &str = "https://api.github.com";

/// User agent string for API requests (GitHub rejects requests without one)
const USER_AGENT_VALUE: &str = concat!("egg-pool/", env!("CARGO_PKG_VERSION"));

/// Location of the shared document inside a repository
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubContentsConfig {
    /// API base URL
    pub api_base: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch commits land on
    pub branch: String,
    /// Path of the JSON document inside the repository
    pub path: String,
    /// Personal access token; never written back out
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl GitHubContentsConfig {
    /// Config for `owner/repo` with default branch and path
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    /// With access token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// With branch
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// With document path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// With API base URL
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Full contents endpoint for the document
    #[must_use]
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.path.trim_start_matches('/'),
        )
    }
}

impl Default for GitHubContentsConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_URL.to_string(),
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            path: "eggs.json".to_string(),
            token: None,
        }
    }
}

impl fmt::Debug for GitHubContentsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubContentsConfig")
            .field("api_base", &self.api_base)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("path", &self.path)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Document store backed by one file in a GitHub repository
///
/// The blob sha returned by the contents API is the version token; GitHub
/// rejects a `PUT` whose `sha` is not the file's current sha.
pub struct GitHubContentsStore<R> {
    client: reqwest::Client,
    config: GitHubContentsConfig,
    url: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> GitHubContentsStore<R> {
    /// Create a store for the configured document.
    ///
    /// # Errors
    /// - `Validation` if the token cannot be sent as a header
    /// - `Transport` if the HTTP client cannot be built
    pub fn new(config: GitHubContentsConfig) -> PoolResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = config.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| PoolError::validation("GitHub token contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PoolError::transport(format!("failed to create HTTP client: {e}")))?;

        let url = config.contents_url();
        Ok(Self {
            client,
            config,
            url,
            _record: PhantomData,
        })
    }

    /// Contents endpoint this store talks to
    #[inline]
    #[must_use]
    pub fn contents_url(&self) -> &str {
        &self.url
    }

    /// Store configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GitHubContentsConfig {
        &self.config
    }
}

impl<R> fmt::Debug for GitHubContentsStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubContentsStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn request_failed(err: &reqwest::Error) -> PoolError {
    PoolError::transport(format!("GitHub API request failed: {err}"))
}

#[async_trait]
impl<R> DocumentStore for GitHubContentsStore<R>
where
    R: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Record = R;

    async fn read(&self) -> PoolResult<Snapshot<R>> {
        tracing::debug!("Reading document from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .query(&[("ref", self.config.branch.as_str())])
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| request_failed(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PoolError::transport_status(
                status.as_u16(),
                format!("GitHub API error: {}", status.as_u16()),
            ));
        }

        let file: ContentsFile = response
            .json()
            .await
            .map_err(|e| PoolError::transport(format!("malformed contents response: {e}")))?;
        let document = decode_content(&file.content)?;

        tracing::debug!(sha = %file.sha, records = document.len(), "Read document");
        Ok(Snapshot::new(document, VersionToken::new(file.sha)))
    }

    async fn write(
        &self,
        document: &Document<R>,
        version: &VersionToken,
        description: &str,
    ) -> PoolResult<WriteReceipt> {
        let body = PutContents {
            message: description,
            content: encode_document(document)?,
            sha: version.as_str(),
            branch: &self.config.branch,
        };

        let response = self
            .client
            .put(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(&e))?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .unwrap_or_default()
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("GitHub API error: {code}"));
            tracing::debug!(status = code, %message, "Conditional write rejected");
            return Err(PoolError::from_write_status(code, message));
        }

        // The revision exists at this point; an unreadable body must not turn
        // the write into a failure.
        match response.json::<PutResponse>().await {
            Ok(PutResponse {
                content: Some(contents),
            }) => Ok(WriteReceipt::new(VersionToken::new(contents.sha))),
            Ok(PutResponse { content: None }) => Ok(WriteReceipt::unversioned()),
            Err(e) => {
                tracing::warn!("Write succeeded but response was unreadable: {}", e);
                Ok(WriteReceipt::unversioned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_url_joins_segments() {
        let config = GitHubContentsConfig::new("ash-ketchum", "egglocke")
            .with_api_base("https://api.github.com/")
            .with_path("/data/eggs.json");
        assert_eq!(
            config.contents_url(),
            "https://api.github.com/repos/ash-ketchum/egglocke/contents/data/eggs.json"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let config = GitHubContentsConfig::new("o", "r").with_token("ghp_secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn token_is_not_serialized() {
        let config = GitHubContentsConfig::new("o", "r").with_token("ghp_secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("ghp_secret"));
    }

    #[test]
    fn store_creation() {
        let store =
            GitHubContentsStore::<serde_json::Value>::new(GitHubContentsConfig::new("o", "r"));
        assert!(store.is_ok());
    }

    #[test]
    fn rejects_token_with_newline() {
        let config = GitHubContentsConfig::new("o", "r").with_token("bad\ntoken");
        let err = GitHubContentsStore::<serde_json::Value>::new(config).unwrap_err();
        assert_eq!(err.kind(), pool_model::ErrorKind::Validation);
    }
}
