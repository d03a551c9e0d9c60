use super::*;
use crate::error::DocError;
use crate::proxy::fetch::ARCHIVE_NAME;
use crate::test_utils::build_zip;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sets the flag when the version listing future is dropped
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct StubFetcher {
    module_root: String,
    archive: Vec<u8>,
    versions: Vec<String>,
    hang_versions: bool,
    versions_dropped: Arc<AtomicBool>,
    workspace: Mutex<Option<PathBuf>>,
}

impl Fetcher for StubFetcher {
    async fn resolve(&self, module: &str, version: &str, dest: &Path) -> DocResult<ResolvedModule> {
        *self.workspace.lock().unwrap() = Some(dest.to_path_buf());
        let subpackage = if module == self.module_root {
            String::new()
        } else if let Some(rest) = module.strip_prefix(&format!("{}/", self.module_root)) {
            rest.to_string()
        } else {
            return Err(DocError::NotFound {
                module: module.to_string(),
                version: version.to_string(),
            });
        };
        let archive = dest.join(ARCHIVE_NAME);
        std::fs::write(&archive, &self.archive).unwrap();
        Ok(ResolvedModule {
            archive,
            module_root: self.module_root.clone(),
            subpackage,
        })
    }

    async fn list_versions(&self, _module_root: &str) -> Vec<String> {
        if self.hang_versions {
            let _flag = DropFlag(self.versions_dropped.clone());
            return std::future::pending::<Vec<String>>().await;
        }
        self.versions.clone()
    }

    async fn latest_version(&self, _module_root: &str) -> String {
        "v0.0.1".to_string()
    }
}

fn root_archive() -> Vec<u8> {
    build_zip(&[
        ("example.com/root@v1.0.0/go.mod", "module example.com/root\n\ngo 1.21\n"),
        ("example.com/root@v1.0.0/root.go", "// Package root is the root.\npackage root\n"),
        (
            "example.com/root@v1.0.0/sub/sub.go",
            "// Package sub does things.\npackage sub\n\n// Hello says hi.\nfunc Hello() string { return \"hi\" }\n",
        ),
    ])
}

fn stub() -> StubFetcher {
    StubFetcher {
        module_root: "example.com/root".to_string(),
        archive: root_archive(),
        versions: vec!["v1.0.0".to_string(), "v1.10.0".to_string(), "v1.2.0".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_get_doc_for_subpackage() {
    let service = ProxyService::new(stub());
    let doc = service.get_doc("example.com/root/sub", "v1.0.0").await.unwrap();

    assert_eq!(doc.package_name, "sub");
    assert_eq!(doc.import_path, "example.com/root/sub");
    assert_eq!(doc.module_root, "example.com/root");
    assert_eq!(doc.module_version, "v1.0.0");
    assert_eq!(doc.versions, vec!["v1.10.0", "v1.2.0", "v1.0.0"]);
    assert_eq!(doc.funcs.len(), 1);
    assert_eq!(doc.funcs[0].name, "Hello");
    assert!(doc.go_mod.contains("example.com/root"));
}

#[tokio::test]
async fn test_workspace_is_removed_after_request() {
    let service = ProxyService::new(stub());
    service.get_doc("example.com/root", "v1.0.0").await.unwrap();

    let workspace = service.fetcher().workspace.lock().unwrap().clone().unwrap();
    assert!(!workspace.exists());
}

#[tokio::test]
async fn test_get_doc_not_found() {
    let service = ProxyService::new(stub());
    let err = service.get_doc("example.org/other", "v1.0.0").await.unwrap_err();
    assert!(err.is_not_found(), "{:?}", err);
}

#[tokio::test]
async fn test_get_doc_rejects_malformed_path() {
    let service = ProxyService::new(stub());
    let err = service.get_doc("example.com//root", "v1.0.0").await.unwrap_err();
    assert!(err.is_client_error(), "{:?}", err);
}

#[tokio::test]
async fn test_cancelled_request_stops_version_listing() {
    let fetcher = StubFetcher {
        hang_versions: true,
        ..stub()
    };
    let dropped = fetcher.versions_dropped.clone();
    let service = ProxyService::new(fetcher);

    let result = tokio::time::timeout(Duration::from_millis(200), service.get_doc("example.com/root", "v1.0.0")).await;
    assert!(result.is_err());

    for _ in 0..50 {
        if dropped.load(Ordering::SeqCst) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_resolve_version_encodes_path() {
    let service = ProxyService::new(StubFetcher::default());
    assert_eq!(service.resolve_version("example.com/Root").await.unwrap(), "v0.0.1");
    assert!(service.resolve_version("").await.unwrap_err().is_client_error());
}

#[tokio::test]
async fn test_resolve_version_of_package_inside_module() {
    let proxy = crate::test_utils::MockProxy::start(vec![(
        "/example.com/root/@v/list",
        200,
        b"v1.0.0\nv1.2.0\n".to_vec(),
    )])
    .await;
    let fetcher = HttpFetcher::new(&proxy.base_url, Duration::from_secs(5)).unwrap();
    let service = ProxyService::new(fetcher);

    assert_eq!(service.resolve_version("example.com/root/sub/pkg").await.unwrap(), "v1.2.0");
    assert_eq!(
        proxy.paths(),
        vec![
            "/example.com/root/sub/pkg/@v/list",
            "/example.com/root/sub/pkg/@latest",
            "/example.com/root/sub/@v/list",
            "/example.com/root/sub/@latest",
            "/example.com/root/@v/list",
        ]
    );
}

#[tokio::test]
async fn test_resolve_version_unknown_module() {
    let proxy = crate::test_utils::MockProxy::start(vec![]).await;
    let fetcher = HttpFetcher::new(&proxy.base_url, Duration::from_secs(5)).unwrap();
    let service = ProxyService::new(fetcher);

    assert_eq!(service.resolve_version("example.com/a").await.unwrap(), "latest");
    assert_eq!(proxy.paths().len(), 4);
}
