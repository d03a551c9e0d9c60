//! Runnable examples
//!
//! Example functions live in `_test.go` files and are named after the symbol
//! they illustrate (`ExampleNew`, `ExampleLogger`, `ExampleNew_custom`).
//! This module pulls them out of parsed test files, matches them to symbols
//! by name and reformats their code for display.

use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

use super::comments::{comment_groups, comment_text};
use super::constants::*;
use super::parser::{ParsedFile, format_node};
use crate::doc::Example;

const EXAMPLE_PREFIX: &str = "Example";
const TAB_WIDTH: usize = 4;

/// Output marker at the start of an example's last comment group
static OUTPUT_PREFIX_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[[:space:]]*(unordered )?output:").expect("Failed to compile output prefix regex")
});

/// Output marker comment anywhere in printed example code
static EXAMPLE_OUTPUT_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)//[[:space:]]*output:").expect("Failed to compile example output regex"));

/// An example function found in a test file
#[derive(Debug, Clone, PartialEq)]
pub struct RawExample {
    /// Identifier without the `Example` prefix, e.g. `Logger_Info`
    pub name: String,
    pub doc: String,
    /// Printed code: the function body, or the whole program for file examples
    pub code: String,
    pub output: String,
}

/// Whether `name` is `prefix` or `prefix` followed by a non-lowercase rune
fn is_test_name(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.chars().next().map(|c| !c.is_lowercase()).unwrap_or(true),
        None => false,
    }
}

/// Replace tabs with spaces the way the example printer lays code out
fn expand_tabs(code: &str) -> String {
    code.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// All comment nodes under `node`, in source order
fn descendant_comments<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == COMMENT {
            out.push(child);
        } else {
            descendant_comments(child, out);
        }
    }
}

/// The last comment group of a function body and its text
fn last_comment_group<'a>(file: &ParsedFile, body: Node<'a>) -> Option<(Vec<Node<'a>>, String)> {
    let mut comments = Vec::new();
    descendant_comments(body, &mut comments);
    let group = comment_groups(&comments).pop()?;
    let texts: Vec<&str> = group.iter().map(|c| file.text(*c)).collect();
    let text = comment_text(&texts);
    Some((group, text))
}

/// Expected output declared by the body's trailing `Output:` comment
fn example_output(file: &ParsedFile, body: Node) -> Option<(String, std::ops::Range<usize>)> {
    let (group, text) = last_comment_group(file, body)?;
    let marker = OUTPUT_PREFIX_RX.find(&text)?;
    let rest = text[marker.end()..].trim_start_matches(' ');
    let output = rest.strip_prefix('\n').unwrap_or(rest).to_string();
    let range = group.first()?.start_byte()..group.last()?.end_byte();
    Some((output, range))
}

/// Byte range of the full lines covering `range`, including the final newline
fn line_span(source: &str, range: std::ops::Range<usize>) -> std::ops::Range<usize> {
    let start = source[..range.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = source[range.end..]
        .find('\n')
        .map(|i| range.end + i + 1)
        .unwrap_or(source.len());
    start..end
}

/// Whether a function declaration has the shape of an example
fn is_example_function(file: &ParsedFile, decl: Node) -> bool {
    let Some(name) = decl.child_by_field_name(NAME_FIELD) else {
        return false;
    };
    if !is_test_name(file.text(name), EXAMPLE_PREFIX) {
        return false;
    }
    let takes_params = decl
        .child_by_field_name(PARAMETERS_FIELD)
        .map(|params| params.named_child_count() > 0)
        .unwrap_or(false);
    !takes_params
        && decl.child_by_field_name(RESULT_FIELD).is_none()
        && decl.child_by_field_name(TYPE_PARAMETERS_FIELD).is_none()
        && decl.child_by_field_name(BODY_FIELD).is_some()
}

/// Rewrite a test file into the standalone program shown for a whole-file
/// example: package `main`, the example function renamed to `main`, the
/// output comment and a leading copyright notice removed
fn play_file(file: &ParsedFile, example: Node, output_range: Option<std::ops::Range<usize>>) -> String {
    let mut edits: Vec<(std::ops::Range<usize>, String)> = Vec::new();

    if let Some(clause) = file.package_clause() {
        let mut cursor = clause.walk();
        let name = clause
            .named_children(&mut cursor)
            .find(|child| child.kind() == PACKAGE_IDENTIFIER || child.kind() == IDENTIFIER);
        if let Some(name) = name {
            edits.push((name.byte_range(), "main".to_string()));
        }
    }
    if let Some(name) = example.child_by_field_name(NAME_FIELD) {
        edits.push((name.byte_range(), "main".to_string()));
    }
    if let Some(range) = output_range {
        edits.push((line_span(&file.source, range), String::new()));
    }

    let root = file.root();
    let mut cursor = root.walk();
    let top_comments: Vec<Node> = root.named_children(&mut cursor).filter(|n| n.kind() == COMMENT).collect();
    if let Some(first_group) = comment_groups(&top_comments).into_iter().next() {
        let texts: Vec<&str> = first_group.iter().map(|c| file.text(*c)).collect();
        if comment_text(&texts).starts_with("Copyright") {
            if let (Some(first), Some(last)) = (first_group.first(), first_group.last()) {
                edits.push((line_span(&file.source, first.start_byte()..last.end_byte()), String::new()));
            }
        }
    }

    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut program = file.source.clone();
    for (range, replacement) in edits {
        program.replace_range(range, &replacement);
    }
    expand_tabs(program.trim_start_matches('\n'))
}

/// Collect the examples declared in one test file
pub fn extract_examples(file: &ParsedFile) -> Vec<RawExample> {
    let mut has_tests = false;
    let mut num_decl = 0;
    let mut found: Vec<(RawExample, Node, Option<std::ops::Range<usize>>)> = Vec::new();

    for decl in file.declarations() {
        match decl.kind() {
            CONST_DECLARATION | VAR_DECLARATION | TYPE_DECLARATION => {
                num_decl += 1;
                continue;
            }
            FUNCTION_DECLARATION => {}
            _ => continue,
        }
        num_decl += 1;

        let name = match decl.child_by_field_name(NAME_FIELD) {
            Some(name) => file.text(name),
            None => continue,
        };
        if is_test_name(name, "Test") || is_test_name(name, "Benchmark") || is_test_name(name, "Fuzz") {
            has_tests = true;
            continue;
        }
        if !is_example_function(file, decl) {
            continue;
        }
        let Some(body) = decl.child_by_field_name(BODY_FIELD) else {
            continue;
        };

        let (output, output_range) = match example_output(file, body) {
            Some((output, range)) => (output, Some(range)),
            None => (String::new(), None),
        };
        let example = RawExample {
            name: name[EXAMPLE_PREFIX.len()..].to_string(),
            doc: file.doc_text(decl),
            code: expand_tabs(&format_node(&file.source, body)),
            output,
        };
        found.push((example, decl, output_range));
    }

    if !has_tests && num_decl > 1 && found.len() == 1 {
        let (example, decl, output_range) = &mut found[0];
        example.code = play_file(file, *decl, output_range.clone());
    }

    found.into_iter().map(|(example, _, _)| example).collect()
}

/// Collect and sort the examples of every parsed test file
pub fn extract_all(files: &[ParsedFile]) -> Vec<RawExample> {
    let mut examples: Vec<RawExample> = files.iter().flat_map(extract_examples).collect();
    examples.sort_by(|a, b| a.name.cmp(&b.name));
    examples
}

/// Capitalize the first letter of every word. Letters, digits and `_`
/// continue a word, everything else separates words.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// Prepare printed example code for display.
///
/// A function body loses its braces and one level of indentation, and is
/// cut and trimmed at the output comment if it has one. Anything else is a whole program: it is kept
/// as is and the output dropped, since the output comment is part of the code.
pub fn fmt_example_code(code: &str, output: &str) -> (String, String) {
    let bytes = code.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'{' && bytes[bytes.len() - 1] == b'}' {
        let inner = &code[1..code.len() - 1];
        let unindented = inner.replace(&format!("\n{}", " ".repeat(TAB_WIDTH)), "\n");
        let code = match EXAMPLE_OUTPUT_RX.find(&unindented) {
            Some(marker) => unindented[..marker.start()].trim().to_string(),
            None => unindented,
        };
        (code, output.to_string())
    } else {
        (code.to_string(), String::new())
    }
}

/// Examples belonging to the symbol `prefix`.
///
/// An example matches when its name is `prefix` (the default example) or
/// `prefix_suffix` with a suffix that starts lowercase. Suffixes starting
/// uppercase name another symbol and are skipped.
pub fn examples_for(prefix: &str, examples: &[RawExample]) -> Vec<Example> {
    let mut docs = Vec::new();
    for example in examples {
        let Some(rest) = example.name.strip_prefix(prefix) else {
            continue;
        };
        let mut display = String::new();
        if !rest.is_empty() {
            let Some(suffix) = rest.strip_prefix('_') else {
                continue;
            };
            if suffix.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                continue;
            }
            display = title_case(suffix);
        }

        let (code, output) = fmt_example_code(&example.code, &example.output);
        docs.push(Example {
            id: format!("{}{}--{}", EXAMPLE_PREFIX, prefix, display),
            name: display,
            doc: example.doc.clone(),
            code,
            output,
        });
    }
    docs
}

/// Symbol prefix used to look up a method's examples
pub fn method_prefix(func_name: &str, type_name: &str) -> String {
    format!("{}_{}", func_name, type_name)
}

#[cfg(test)]
#[path = "examples_tests.rs"]
mod tests;
