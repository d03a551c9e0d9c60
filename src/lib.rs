//! Go module documentation
//!
//! Fetches module archives from a Go module proxy and builds pkg.go.dev
//! style documentation pages from their sources.

pub mod config;
pub mod doc;
pub mod error;
pub mod godoc;
pub mod html;
pub mod logging;
pub mod modfile;
pub mod module_path;
pub mod proxy;
pub mod versions;
#[cfg(test)]
pub mod test_utils;

pub use doc::Documentation;
pub use error::{DocError, DocResult};
pub use proxy::{DocService, HttpFetcher, ProxyService};
