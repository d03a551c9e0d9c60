//! Documentation builder
//!
//! Turns the files of a module archive into a `Documentation` page for the
//! requested package: partitions the archive, parses the package, reads its
//! declarations and examples, discovers subdirectories and renders the
//! closest go.mod.

use std::collections::BTreeSet;

use super::comments::{synopsis, to_html};
use super::examples::{RawExample, examples_for, extract_all};
use super::parser::{GoParser, ParsedFile};
use super::reader::read_package;
use super::resolver::{archive_dir, base_name, relative_dir};
use crate::doc::{Documentation, File, Subdir};
use crate::error::DocResult;
use crate::modfile::ModFile;
use crate::module_path::decode_path;
use crate::proxy::archive::FileRecord;

const MANIFEST_NAME: &str = "go.mod";
const GO_EXTENSION: &str = ".go";
const TEST_SUFFIX: &str = "_test.go";

/// How to choose between manifests whose directories match equally well
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManifestTieBreak {
    /// Keep the manifest that appears first in the archive
    #[default]
    FirstMatch,
    /// Keep the manifest with the lexically smallest entry name
    Lexical,
}

#[derive(Debug, Clone, Default)]
pub struct BuilderOptions {
    pub tie_break: ManifestTieBreak,
}

/// A parsed go.mod and the import path of the directory holding it
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Archive entry name
    pub entry: String,
    /// Import path of the manifest's directory, e.g. `example.com/mod/tools`
    pub path: String,
    pub file: ModFile,
}

/// Everything needed to document one package of one archive
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Escaped import path of the requested package
    pub module: String,
    pub version: String,
    /// Path of the package relative to the module root, empty for the root
    pub subpackage: String,
    pub files: Vec<FileRecord>,
}

impl BuildRequest {
    /// Escaped path of the module that published the archive
    pub fn module_root(&self) -> &str {
        if self.subpackage.is_empty() {
            return &self.module;
        }
        self.module
            .strip_suffix(&self.subpackage)
            .and_then(|root| root.strip_suffix('/'))
            .unwrap_or(&self.module)
    }
}

/// Archive files sorted by role
#[derive(Default)]
struct Partition<'a> {
    manifests: Vec<&'a FileRecord>,
    sources: Vec<&'a FileRecord>,
    tests: Vec<&'a FileRecord>,
    subdirs: BTreeSet<String>,
}

fn partition<'a>(files: &'a [FileRecord], subpackage: &str) -> Partition<'a> {
    let mut parts = Partition::default();
    for file in files {
        let name = base_name(&file.name);
        if name == MANIFEST_NAME {
            parts.manifests.push(file);
            continue;
        }
        if !name.ends_with(GO_EXTENSION) {
            continue;
        }
        let (dir, valid) = relative_dir(&file.name, subpackage);
        if !valid {
            continue;
        }
        if dir != "." {
            parts.subdirs.insert(dir);
        } else if name.ends_with(TEST_SUFFIX) {
            parts.tests.push(file);
        } else {
            parts.sources.push(file);
        }
    }
    parts
}

/// Builds documentation pages. One builder is reused across requests on
/// the same worker thread.
#[derive(Debug)]
pub struct Builder {
    parser: GoParser,
    options: BuilderOptions,
}

impl Builder {
    pub fn new(options: BuilderOptions) -> DocResult<Self> {
        Ok(Self {
            parser: GoParser::new()?,
            options,
        })
    }

    /// Build the documentation of the requested package.
    ///
    /// A malformed package source file fails the build. Malformed test
    /// files, subdirectory files and manifests are logged and skipped.
    pub fn build(&mut self, request: &BuildRequest) -> DocResult<Documentation> {
        let import_path = decode_path(&request.module)?;
        let module_root = decode_path(request.module_root())?;
        // archive entries carry the real case, the request carries the escaped one
        let subpackage = if request.subpackage.is_empty() {
            String::new()
        } else {
            decode_path(&request.subpackage)?
        };
        let parts = partition(&request.files, &subpackage);
        log::debug!(
            "Building {}@{}: {} sources, {} tests, {} subdirectories, {} manifests",
            import_path,
            request.version,
            parts.sources.len(),
            parts.tests.len(),
            parts.subdirs.len(),
            parts.manifests.len()
        );

        let mut sources = Vec::with_capacity(parts.sources.len());
        for record in &parts.sources {
            sources.push(self.parser.parse_file(&record.name, &record.content)?);
        }
        let examples = self.read_examples(&parts.tests);

        let package_name = sources.first().and_then(|f| f.package_name()).unwrap_or_default();
        let package_doc = sources
            .iter()
            .map(|f| f.package_doc())
            .find(|doc| !doc.is_empty())
            .map(|doc| to_html(&doc))
            .unwrap_or_default();
        let decls = read_package(&sources, &examples);

        let files = parts
            .sources
            .iter()
            .map(|record| File {
                name: base_name(&record.name).to_string(),
            })
            .collect();

        let subdirs = parts
            .subdirs
            .iter()
            .map(|dir| Subdir {
                name: dir.clone(),
                synopsis: self.subdir_synopsis(&request.files, &subpackage, dir),
                link: format!("/{}/{}/@v/{}", import_path, dir, request.version),
            })
            .collect();

        let manifests = self.parse_manifests(&parts.manifests, &module_root);
        let go_mod = closest_manifest(&manifests, &import_path, self.options.tie_break)
            .map(|manifest| manifest.file.format_html())
            .unwrap_or_default();

        let mut doc = Documentation {
            package_name,
            module_version: request.version.clone(),
            versions: Vec::new(),
            module_root,
            import_path,
            package_doc,
            constants: decls.constants,
            variables: decls.variables,
            funcs: decls.funcs,
            types: decls.types,
            files,
            subdirs,
            examples: examples_for("", &examples),
            go_mod,
            nav_links: Vec::new(),
        };
        doc.nav_links = nav_links(&doc);
        Ok(doc)
    }

    fn read_examples(&mut self, tests: &[&FileRecord]) -> Vec<RawExample> {
        let mut parsed: Vec<ParsedFile> = Vec::with_capacity(tests.len());
        for record in tests {
            match self.parser.parse_file(&record.name, &record.content) {
                Ok(file) => parsed.push(file),
                Err(e) => log::warn!("Skipping examples of {}: {}", record.name, e),
            }
        }
        extract_all(&parsed)
    }

    /// First sentence of the package doc of the first non-test source file
    /// directly inside `subdir`
    fn subdir_synopsis(&mut self, files: &[FileRecord], subpackage: &str, subdir: &str) -> String {
        for record in files {
            let name = base_name(&record.name);
            if !name.ends_with(GO_EXTENSION) || name.ends_with(TEST_SUFFIX) {
                continue;
            }
            let (dir, valid) = relative_dir(&record.name, subpackage);
            if !valid || dir != subdir {
                continue;
            }
            match self.parser.parse_file(&record.name, &record.content) {
                Ok(file) => {
                    let doc = file.package_doc();
                    if !doc.is_empty() {
                        return synopsis(&doc);
                    }
                }
                Err(e) => log::warn!("Could not read synopsis of {}: {}", record.name, e),
            }
        }
        String::new()
    }

    fn parse_manifests(&self, records: &[&FileRecord], module_root: &str) -> Vec<ManifestFile> {
        let mut manifests: Vec<ManifestFile> = Vec::with_capacity(records.len());
        for record in records {
            let dir = archive_dir(&record.name);
            let path = if dir == "." {
                module_root.to_string()
            } else {
                format!("{}/{}", module_root, dir)
            };
            match ModFile::parse(&record.name, &record.content) {
                Ok(file) => manifests.push(ManifestFile {
                    entry: record.name.clone(),
                    path,
                    file,
                }),
                Err(e) => log::warn!("Ignoring manifest {}: {}", record.name, e),
            }
        }
        manifests
    }
}

/// Whether `prefix` is `path` or one of its parent directories
fn is_path_prefix(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// The manifest governing `import_path`: the one whose directory is the
/// longest path prefix of it
pub fn closest_manifest<'m>(
    manifests: &'m [ManifestFile],
    import_path: &str,
    tie_break: ManifestTieBreak,
) -> Option<&'m ManifestFile> {
    let mut closest: Option<&ManifestFile> = None;
    for manifest in manifests {
        if !is_path_prefix(&manifest.path, import_path) {
            continue;
        }
        closest = match closest {
            None => Some(manifest),
            Some(current) if manifest.path.len() > current.path.len() => Some(manifest),
            Some(current)
                if manifest.path.len() == current.path.len()
                    && tie_break == ManifestTieBreak::Lexical
                    && manifest.entry < current.entry =>
            {
                Some(manifest)
            }
            current => current,
        };
    }
    closest
}

/// Page sections that have content, always starting with the index
pub fn nav_links(doc: &Documentation) -> Vec<String> {
    let mut links = vec!["Index".to_string()];
    if !doc.examples.is_empty() {
        links.push("Examples".to_string());
    }
    if !doc.files.is_empty() {
        links.push("Files".to_string());
    }
    if !doc.go_mod.is_empty() {
        links.push("Go.mod".to_string());
    }
    if !doc.subdirs.is_empty() {
        links.push("Directories".to_string());
    }
    links
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
