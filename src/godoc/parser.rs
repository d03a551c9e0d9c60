//! Go parser using tree-sitter-go
//!
//! The rest of the documentation builder only talks to this module through
//! `GoParser::parse_file` and `format_node`, so another parser backend can be
//! dropped in without touching the declaration reader.

use tree_sitter::{Node, Parser, Tree};

use super::comments::{comment_text, doc_comment_nodes};
use super::constants::*;
use crate::error::{DocError, DocResult};

/// Go parser wrapper around tree-sitter-go
pub struct GoParser {
    parser: Parser,
}

impl std::fmt::Debug for GoParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoParser").field("parser", &"<Parser>").finish()
    }
}

/// A syntactically valid Go source file
pub struct ParsedFile {
    /// Archive entry name
    pub name: String,
    pub source: String,
    tree: Tree,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile").field("name", &self.name).finish()
    }
}

impl GoParser {
    /// Create a new Go parser
    pub fn new() -> DocResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| DocError::Parse {
                file: String::new(),
                message: format!("Failed to set Go language: {}", e),
            })?;

        Ok(Self { parser })
    }

    /// Parse one Go file. Any syntax error fails the whole file.
    pub fn parse_file(&mut self, name: &str, content: &[u8]) -> DocResult<ParsedFile> {
        let source = String::from_utf8(content.to_vec()).map_err(|e| DocError::Parse {
            file: name.to_string(),
            message: format!("invalid UTF-8: {}", e),
        })?;

        let tree = self.parser.parse(&source, None).ok_or_else(|| DocError::Parse {
            file: name.to_string(),
            message: "parser produced no tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let position = first_error(root)
                .map(|node| node.start_position())
                .unwrap_or_else(|| root.start_position());
            return Err(DocError::Parse {
                file: name.to_string(),
                message: format!("syntax error at line {} column {}", position.row + 1, position.column + 1),
            });
        }

        Ok(ParsedFile {
            name: name.to_string(),
            source,
            tree,
        })
    }
}

/// Depth-first search for the first error or missing node
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

impl ParsedFile {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by a node
    pub fn text(&self, node: Node) -> &str {
        &self.source[node.byte_range()]
    }

    /// Node text with continuation lines dedented to the node's own line
    pub fn format(&self, node: Node) -> String {
        format_node(&self.source, node)
    }

    /// Named top-level children that are not comments
    pub fn declarations(&self) -> Vec<Node<'_>> {
        let root = self.root();
        let mut cursor = root.walk();
        let declarations = root
            .named_children(&mut cursor)
            .filter(|child| child.kind() != COMMENT)
            .collect();
        declarations
    }

    pub fn package_clause(&self) -> Option<Node<'_>> {
        self.declarations().into_iter().find(|node| node.kind() == PACKAGE_CLAUSE)
    }

    pub fn package_name(&self) -> Option<String> {
        let clause = self.package_clause()?;
        let mut cursor = clause.walk();
        let name = clause
            .named_children(&mut cursor)
            .find(|child| child.kind() == PACKAGE_IDENTIFIER || child.kind() == IDENTIFIER)?;
        Some(self.text(name).to_string())
    }

    /// Text of the doc comment directly above the package clause
    pub fn package_doc(&self) -> String {
        self.package_clause()
            .map(|clause| self.doc_text(clause))
            .unwrap_or_default()
    }

    /// Text of the doc comment directly above `node`
    pub fn doc_text(&self, node: Node) -> String {
        let comments: Vec<&str> = doc_comment_nodes(node).into_iter().map(|c| self.text(c)).collect();
        comment_text(&comments)
    }
}

/// Format a node the way it appears in source, with the indentation of its
/// first line removed from every following line
pub fn format_node(source: &str, node: Node) -> String {
    format_range(source, node.start_byte(), node.end_byte())
}

/// Format an arbitrary byte range, see `format_node`
pub fn format_range(source: &str, start: usize, end: usize) -> String {
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let indent: &str = {
        let line = &source[line_start..start];
        let trimmed = line.trim_start_matches([' ', '\t']);
        &line[..line.len() - trimmed.len()]
    };

    let text = source[start..end].trim_end();
    if indent.is_empty() || !text.contains('\n') {
        return text.to_string();
    }

    let mut lines = text.split('\n');
    let mut out = String::with_capacity(text.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(line.strip_prefix(indent).unwrap_or(line));
    }
    out
}

/// Whether a Go identifier is exported
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// Children of `node` that carry the given field name
pub fn children_by_field<'a>(node: Node<'a>, field: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    let children = node.children_by_field_name(field, &mut cursor).collect();
    children
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_creation() {
        assert!(GoParser::new().is_ok());
    }

    #[test]
    fn test_parse_package_clause() {
        let mut parser = GoParser::new().unwrap();
        let src = "// Package zap is fast.\npackage zap\n\nfunc New() {}\n";
        let file = parser.parse_file("zap.go", src.as_bytes()).unwrap();

        assert_eq!(file.package_name().as_deref(), Some("zap"));
        assert_eq!(file.package_doc(), "Package zap is fast.\n");
        let kinds: Vec<&str> = file.declarations().iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![PACKAGE_CLAUSE, FUNCTION_DECLARATION]);
    }

    #[test]
    fn test_syntax_error_is_reported_with_position() {
        let mut parser = GoParser::new().unwrap();
        let src = "package bad\n\nfunc (\n";
        let err = parser.parse_file("bad.go", src.as_bytes()).unwrap_err();
        match err {
            DocError::Parse { file, message } => {
                assert_eq!(file, "bad.go");
                assert!(message.contains("syntax error"), "{}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_format_node_dedents_nested_nodes() {
        let mut parser = GoParser::new().unwrap();
        let src = "package p\n\ntype (\n\tT struct {\n\t\tA int\n\t}\n)\n";
        let file = parser.parse_file("p.go", src.as_bytes()).unwrap();
        let decl = file.declarations()[1];
        let mut cursor = decl.walk();
        let spec = decl
            .named_children(&mut cursor)
            .find(|n| n.kind() == TYPE_SPEC)
            .unwrap();
        assert_eq!(file.format(spec), "T struct {\n\tA int\n}");
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Logger"));
        assert!(is_exported("Édition"));
        assert!(!is_exported("logger"));
        assert!(!is_exported("_Hidden"));
        assert!(!is_exported(""));
    }
}
