//! Documentation service on top of a module proxy
//!
//! `ProxyService::get_doc` resolves the requested path to a published module,
//! downloads its archive into a per-request workspace and builds the page on
//! a blocking worker while the version list is fetched concurrently.

pub mod archive;
pub mod fetch;

use std::future::Future;
use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};

use crate::doc::Documentation;
use crate::error::{DocResult, IoContext};
use crate::godoc::{BuildRequest, Builder, BuilderOptions};
use crate::module_path::encode_path;
use crate::versions::{LATEST, sort_versions};

pub use fetch::{Fetcher, HttpFetcher, ResolvedModule};

/// Produces documentation for a module path and version
pub trait DocService: Send + Sync {
    /// Documentation of the package at the (unescaped) import path `module`
    fn get_doc(&self, module: &str, version: &str) -> impl Future<Output = DocResult<Documentation>> + Send;
}

/// Aborts the wrapped task when dropped. Aborting a finished task is a no-op.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<T> {
    async fn join(mut self) -> Result<T, JoinError> {
        (&mut self.0).await
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// `DocService` reading modules through a `Fetcher`
#[derive(Debug)]
pub struct ProxyService<F: Fetcher> {
    fetcher: Arc<F>,
    options: BuilderOptions,
}

impl<F: Fetcher> ProxyService<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_options(fetcher, BuilderOptions::default())
    }

    pub fn with_options(fetcher: F, options: BuilderOptions) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            options,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Version to show for `module` when none was requested.
    ///
    /// A package path inside a module has no versions of its own, so the
    /// path is walked up until a prefix reports one.
    pub async fn resolve_version(&self, module: &str) -> DocResult<String> {
        let escaped = encode_path(module)?;
        let mut path = escaped.as_str();
        loop {
            let version = self.fetcher.resolve_version(path).await;
            if version != LATEST {
                return Ok(version);
            }
            match path.rfind('/') {
                Some(idx) => path = &path[..idx],
                None => return Ok(LATEST.to_string()),
            }
        }
    }
}

impl<F: Fetcher> DocService for ProxyService<F> {
    async fn get_doc(&self, module: &str, version: &str) -> DocResult<Documentation> {
        let escaped = encode_path(module)?;
        let workspace = tempfile::Builder::new()
            .prefix("moddoc-")
            .tempdir()
            .with_io_context("Failed to create request workspace")?;

        let resolved = self.fetcher.resolve(&escaped, version, workspace.path()).await?;

        let fetcher = Arc::clone(&self.fetcher);
        let module_root = resolved.module_root.clone();
        let versions = AbortOnDrop(tokio::spawn(async move { fetcher.list_versions(&module_root).await }));

        let request = BuildRequest {
            module: escaped,
            version: version.to_string(),
            subpackage: resolved.subpackage,
            files: Vec::new(),
        };
        let archive = resolved.archive;
        let options = self.options.clone();
        let mut doc = tokio::task::spawn_blocking(move || -> DocResult<Documentation> {
            let mut request = request;
            request.files = archive::extract_file(&archive)?;
            let mut builder = Builder::new(options)?;
            builder.build(&request)
        })
        .await??;

        doc.versions = match versions.join().await {
            Ok(mut list) => {
                sort_versions(&mut list);
                list
            }
            Err(e) => {
                log::warn!("Version listing for {} failed: {}", module, e);
                Vec::new()
            }
        };
        log::info!("Built documentation for {}@{}", module, version);
        Ok(doc)
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
