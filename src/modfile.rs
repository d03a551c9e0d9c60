//! go.mod parsing and rendering
//!
//! Only the syntax the documentation page needs is modelled: the module
//! path, the go directive, requirements, replacements, exclusions and
//! retractions. The original text is kept so the page can show the file as
//! written, with dependency paths turned into links.

use std::collections::HashMap;

use crate::error::{DocError, DocResult};
use crate::html::escape_html_text;

/// A module path and version pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleVersion {
    pub path: String,
    /// Empty for the unversioned side of a replacement
    pub version: String,
}

/// A `require` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub module: ModuleVersion,
    pub indirect: bool,
}

/// A `replace` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: ModuleVersion,
    pub new: ModuleVersion,
}

/// A parsed go.mod file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModFile {
    pub module: String,
    pub go: String,
    pub toolchain: String,
    pub require: Vec<Require>,
    pub replace: Vec<Replace>,
    pub exclude: Vec<ModuleVersion>,
    pub retract: Vec<String>,
    /// The file as written
    pub source: String,
}

struct LineParser<'a> {
    file: &'a str,
    line: usize,
}

impl LineParser<'_> {
    fn error(&self, message: impl Into<String>) -> DocError {
        DocError::ManifestParse {
            file: self.file.to_string(),
            line: self.line,
            message: message.into(),
        }
    }
}

/// Split a line into tokens and its trailing `//` comment.
/// Quoted tokens are returned unquoted.
fn tokenize(line: &str) -> Result<(Vec<String>, String), String> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if line[start..].starts_with("//") {
            return Ok((tokens, line[start + 2..].trim().to_string()));
        }
        if c == '"' || c == '`' {
            chars.next();
            let mut token = String::new();
            let mut closed = false;
            while let Some((_, q)) = chars.next() {
                if q == c {
                    closed = true;
                    break;
                }
                if q == '\\' && c == '"' {
                    if let Some((_, escaped)) = chars.next() {
                        token.push(escaped);
                    }
                    continue;
                }
                token.push(q);
            }
            if !closed {
                return Err("unterminated quoted string".to_string());
            }
            tokens.push(token);
            continue;
        }
        let mut token = String::new();
        while let Some(&(_, t)) = chars.peek() {
            if t.is_whitespace() || t == '"' || t == '`' {
                break;
            }
            token.push(t);
            chars.next();
        }
        tokens.push(token);
    }
    Ok((tokens, String::new()))
}

impl ModFile {
    /// Parse the content of a go.mod file. `file` is only used in errors.
    pub fn parse(file: &str, content: &[u8]) -> DocResult<ModFile> {
        let source = std::str::from_utf8(content).map_err(|e| DocError::ManifestParse {
            file: file.to_string(),
            line: 0,
            message: format!("invalid UTF-8: {}", e),
        })?;

        let mut mod_file = ModFile {
            source: source.to_string(),
            ..Default::default()
        };
        let mut block: Option<String> = None;

        for (idx, raw_line) in source.lines().enumerate() {
            let parser = LineParser { file, line: idx + 1 };
            let (tokens, comment) = tokenize(raw_line).map_err(|m| parser.error(m))?;
            if tokens.is_empty() {
                continue;
            }

            if let Some(verb) = block.clone() {
                if tokens.len() == 1 && tokens[0] == ")" {
                    block = None;
                    continue;
                }
                mod_file.apply(&parser, &verb, &tokens, &comment)?;
                continue;
            }

            if tokens.len() == 2 && tokens[1] == "(" {
                block = Some(tokens[0].clone());
                continue;
            }
            mod_file.apply(&parser, &tokens[0], &tokens[1..], &comment)?;
        }

        if let Some(verb) = block {
            return Err(DocError::ManifestParse {
                file: file.to_string(),
                line: source.lines().count(),
                message: format!("unterminated {} block", verb),
            });
        }
        if mod_file.module.is_empty() {
            return Err(DocError::ManifestParse {
                file: file.to_string(),
                line: 0,
                message: "no module directive".to_string(),
            });
        }

        Ok(mod_file)
    }

    fn apply(&mut self, parser: &LineParser, verb: &str, args: &[String], comment: &str) -> DocResult<()> {
        match verb {
            "module" => {
                let [path] = args else {
                    return Err(parser.error("usage: module module/path"));
                };
                self.module = path.clone();
            }
            "go" => {
                let [version] = args else {
                    return Err(parser.error("usage: go 1.23"));
                };
                self.go = version.clone();
            }
            "toolchain" => {
                let [name] = args else {
                    return Err(parser.error("usage: toolchain go1.23.1"));
                };
                self.toolchain = name.clone();
            }
            "require" => {
                let [path, version] = args else {
                    return Err(parser.error("usage: require module/path v1.2.3"));
                };
                self.require.push(Require {
                    module: ModuleVersion {
                        path: path.clone(),
                        version: version.clone(),
                    },
                    indirect: comment.split(';').any(|part| part.trim() == "indirect"),
                });
            }
            "exclude" => {
                let [path, version] = args else {
                    return Err(parser.error("usage: exclude module/path v1.2.3"));
                };
                self.exclude.push(ModuleVersion {
                    path: path.clone(),
                    version: version.clone(),
                });
            }
            "replace" => {
                let arrow = args
                    .iter()
                    .position(|a| a == "=>")
                    .ok_or_else(|| parser.error("usage: replace module/path [v1.2.3] => other/module v1.4.5"))?;
                let old = Self::module_version(parser, &args[..arrow])?;
                let new = Self::module_version(parser, &args[arrow + 1..])?;
                self.replace.push(Replace { old, new });
            }
            "retract" => {
                let joined = args.join(" ");
                if joined.is_empty() {
                    return Err(parser.error("usage: retract v1.2.3 or retract [v1.0.0, v1.1.0]"));
                }
                self.retract.push(joined);
            }
            "godebug" | "tool" | "ignore" => {}
            other => return Err(parser.error(format!("unknown directive: {}", other))),
        }
        Ok(())
    }

    fn module_version(parser: &LineParser, args: &[String]) -> DocResult<ModuleVersion> {
        match args {
            [path] => Ok(ModuleVersion {
                path: path.clone(),
                version: String::new(),
            }),
            [path, version] => Ok(ModuleVersion {
                path: path.clone(),
                version: version.clone(),
            }),
            _ => Err(parser.error("invalid module path/version in replace")),
        }
    }

    /// Dependency path to page link for every require and replacement target
    pub fn dependency_links(&self) -> HashMap<String, String> {
        let mut links = HashMap::new();
        for req in &self.require {
            links.insert(
                req.module.path.clone(),
                format!("/{}/@v/{}", req.module.path, req.module.version),
            );
        }
        for rep in &self.replace {
            links.insert(rep.new.path.clone(), format!("/{}/@v/{}", rep.new.path, rep.new.version));
        }
        links
    }

    /// Render the file as HTML, turning every dependency path into a link
    pub fn format_html(&self) -> String {
        let links = self.dependency_links();
        let mut html = String::with_capacity(self.source.len() * 2);
        for line in self.source.lines() {
            html.push_str(&link_line(line, &links));
            html.push('\n');
        }
        html
    }
}

/// Escape one line, wrapping whitespace-separated words found in `links`
fn link_line(line: &str, links: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut word_start: Option<usize> = None;
    let flush = |out: &mut String, word: &str| {
        let bare = word.trim_matches('"');
        match links.get(bare) {
            Some(href) if !bare.is_empty() => {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html_text(href),
                    escape_html_text(word)
                ));
            }
            _ => out.push_str(&escape_html_text(word)),
        }
    };

    for (idx, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(start) = word_start.take() {
                flush(&mut out, &line[start..idx]);
            }
            out.push(c);
        } else if word_start.is_none() {
            word_start = Some(idx);
        }
    }
    if let Some(start) = word_start {
        flush(&mut out, &line[start..]);
    }
    out
}

#[cfg(test)]
#[path = "modfile_tests.rs"]
mod tests;
