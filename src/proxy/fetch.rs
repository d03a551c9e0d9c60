//! Module proxy client
//!
//! Talks the GOPROXY protocol: `@v/list`, `@v/{version}.zip` and `@latest`.
//! All module paths handed to a `Fetcher` are already escaped.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::error::{DocError, DocResult, IoContext};
use crate::versions::{LATEST, latest_version};

/// File name of the downloaded archive inside the request workspace
pub const ARCHIVE_NAME: &str = "source.zip";

/// A module archive located for a requested path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Downloaded archive inside the request workspace
    pub archive: PathBuf,
    /// Escaped path of the module that published the archive
    pub module_root: String,
    /// Requested path relative to the module root, empty for the root
    pub subpackage: String,
}

/// Source of module archives and version metadata
pub trait Fetcher: Send + Sync + 'static {
    /// Find the module publishing `module` at `version` and download its
    /// archive into `dest`. Walks up the path while the proxy reports the
    /// prefix as missing.
    fn resolve(
        &self,
        module: &str,
        version: &str,
        dest: &Path,
    ) -> impl Future<Output = DocResult<ResolvedModule>> + Send;

    /// Known versions of a module, empty when they cannot be listed
    fn list_versions(&self, module_root: &str) -> impl Future<Output = Vec<String>> + Send;

    /// Version the proxy reports as latest, `"latest"` when unknown
    fn latest_version(&self, module_root: &str) -> impl Future<Output = String> + Send;

    /// Version to show when a page is requested without one
    fn resolve_version(&self, module_root: &str) -> impl Future<Output = String> + Send {
        async move {
            let versions = self.list_versions(module_root).await;
            if versions.is_empty() {
                self.latest_version(module_root).await
            } else {
                latest_version(&versions)
            }
        }
    }
}

/// Response body of `@latest`
#[derive(Debug, Deserialize)]
struct LatestInfo {
    #[serde(rename = "Version", default)]
    version: String,
}

/// `Fetcher` backed by an HTTP module proxy
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    token: Option<String>,
}

fn fetch_error(url: &str, message: impl std::fmt::Display) -> DocError {
    DocError::Fetch {
        url: url.to_string(),
        message: message.to_string(),
    }
}

/// Statuses a proxy answers with when it does not publish a path
fn is_missing(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::GONE
}

impl HttpFetcher {
    /// Create a fetcher for the proxy at `base_url`. Every request is
    /// bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> DocResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| fetch_error(base_url, e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `token` as a bearer token with every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str) -> DocResult<Response> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await.map_err(|e| fetch_error(url, e))
    }

    /// GET that fails on any non-success status
    async fn get_ok(&self, url: &str) -> DocResult<Response> {
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(url, format!("unexpected status {}", status)));
        }
        Ok(response)
    }

    /// Stream a response body into `path`
    async fn download(&self, mut response: Response, url: &str, path: &Path) -> DocResult<()> {
        let mut file = tokio::fs::File::create(path)
            .await
            .with_io_context("Failed to create archive file")?;
        while let Some(chunk) = response.chunk().await.map_err(|e| fetch_error(url, e))? {
            file.write_all(&chunk).await.with_io_context("Failed to write archive file")?;
        }
        file.flush().await.with_io_context("Failed to write archive file")?;
        Ok(())
    }
}

impl Fetcher for HttpFetcher {
    async fn resolve(&self, module: &str, version: &str, dest: &Path) -> DocResult<ResolvedModule> {
        let mut path = module;
        loop {
            let url = format!("{}/{}/@v/{}.zip", self.base_url, path, version);
            let response = self.get(&url).await?;
            let status = response.status();

            if status.is_success() {
                let archive = dest.join(ARCHIVE_NAME);
                self.download(response, &url, &archive).await?;
                let subpackage = if path.len() < module.len() {
                    module[path.len() + 1..].to_string()
                } else {
                    String::new()
                };
                log::info!("Resolved {}@{} to module {} ({:?})", module, version, path, subpackage);
                return Ok(ResolvedModule {
                    archive,
                    module_root: path.to_string(),
                    subpackage,
                });
            }

            if !is_missing(status) {
                return Err(fetch_error(&url, format!("unexpected status {}", status)));
            }
            log::debug!("{} returned {}", url, status);
            match path.rfind('/') {
                Some(idx) => path = &path[..idx],
                None => {
                    return Err(DocError::NotFound {
                        module: module.to_string(),
                        version: version.to_string(),
                    });
                }
            }
        }
    }

    async fn list_versions(&self, module_root: &str) -> Vec<String> {
        let url = format!("{}/{}/@v/list", self.base_url, module_root);
        let body = match self.get_ok(&url).await {
            Ok(response) => response.text().await.map_err(|e| fetch_error(&url, e)),
            Err(e) => Err(e),
        };
        match body {
            Ok(body) => body
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                log::warn!("Could not list versions of {}: {}", module_root, e);
                Vec::new()
            }
        }
    }

    async fn latest_version(&self, module_root: &str) -> String {
        let url = format!("{}/{}/@latest", self.base_url, module_root);
        let info = match self.get_ok(&url).await {
            Ok(response) => response.json::<LatestInfo>().await.map_err(|e| fetch_error(&url, e)),
            Err(e) => Err(e),
        };
        match info {
            Ok(info) if !info.version.is_empty() => info.version,
            Ok(_) => LATEST.to_string(),
            Err(e) => {
                log::warn!("Could not get the latest version of {}: {}", module_root, e);
                LATEST.to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
