//! Doc comment handling
//!
//! Finds the comment group attached to a declaration, turns the raw comment
//! tokens into plain text and renders that text to HTML the way Go's
//! documentation tools do: paragraphs, indented preformatted blocks,
//! headings and bare URLs.

use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

use super::constants::COMMENT;
use crate::html::{escape_html, escape_html_text};

static URL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?|ftp|file|mailto)://[^\s<>"']+"#).expect("Failed to compile URL regex")
});

static DIRECTIVE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+:[a-z0-9]").expect("Failed to compile directive regex"));

/// Comments that prefix a synopsis we never want to show
const ILLEGAL_SYNOPSIS_PREFIXES: &[&str] = &["copyright", "all rights", "author"];

/// Comment nodes directly above `node`, in source order.
///
/// The group must end on the line before the node. A group whose first
/// comment trails code on the same line belongs to that code instead.
pub fn doc_comment_nodes(node: Node) -> Vec<Node> {
    let mut comments = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut current = node;

    while let Some(prev) = current.prev_named_sibling() {
        if prev.kind() != COMMENT || prev.end_position().row + 1 != expected_row {
            break;
        }
        comments.push(prev);
        expected_row = prev.start_position().row;
        current = prev;
    }

    if let Some(first) = comments.last() {
        if let Some(before) = first.prev_named_sibling() {
            if before.kind() != COMMENT && before.end_position().row == first.start_position().row {
                return Vec::new();
            }
        }
    }

    comments.reverse();
    comments
}

/// Split comment nodes into groups of comments on consecutive lines
pub fn comment_groups<'a>(comments: &[Node<'a>]) -> Vec<Vec<Node<'a>>> {
    let mut groups: Vec<Vec<Node<'a>>> = Vec::new();
    for comment in comments {
        match groups.last_mut() {
            Some(group)
                if group
                    .last()
                    .map(|last| last.end_position().row + 1 >= comment.start_position().row)
                    .unwrap_or(false) =>
            {
                group.push(*comment);
            }
            _ => groups.push(vec![*comment]),
        }
    }
    groups
}

fn is_directive(text: &str) -> bool {
    text.starts_with("line ") || text.starts_with("extern ") || text.starts_with("export ") || DIRECTIVE_RX.is_match(text)
}

/// Text of a comment group with comment markers removed.
///
/// Leading blank lines are dropped, interior runs of blank lines collapse to
/// one, and a non-empty result always ends with a newline. Tool directives
/// such as `//go:generate` are skipped.
pub fn comment_text(comments: &[&str]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for raw in comments {
        let body = if let Some(rest) = raw.strip_prefix("//") {
            if let Some(stripped) = rest.strip_prefix(' ') {
                stripped
            } else if is_directive(rest) {
                continue;
            } else {
                rest
            }
        } else if raw.starts_with("/*") && raw.ends_with("*/") && raw.len() >= 4 {
            &raw[2..raw.len() - 2]
        } else {
            raw
        };
        for line in body.split('\n') {
            lines.push(line.trim_end().to_string());
        }
    }

    let mut collapsed: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let previous_blank = collapsed.last().map(|l| l.is_empty()).unwrap_or(true);
        if !line.is_empty() || !previous_blank {
            collapsed.push(line);
        }
    }
    while collapsed.last().map(|l| l.is_empty()).unwrap_or(false) {
        collapsed.pop();
    }

    if collapsed.is_empty() {
        return String::new();
    }
    let mut text = collapsed.join("\n");
    text.push('\n');
    text
}

/// Length of the first sentence: up to the first period followed by a space,
/// unless the period follows a single uppercase letter (an initial)
fn first_sentence_len(s: &str) -> usize {
    let (mut ppp, mut pp, mut p) = (' ', ' ', ' ');
    for (i, c) in s.char_indices() {
        let q = if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c };
        if q == ' ' && p == '.' && (!pp.is_uppercase() || ppp.is_uppercase()) {
            return i;
        }
        if p == '。' || p == '．' {
            return i;
        }
        ppp = pp;
        pp = p;
        p = q;
    }
    s.len()
}

/// Collapse all whitespace runs to a single space
fn clean_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert `` and '' pairs to typographic quotes
fn convert_quotes(s: &str) -> String {
    s.replace("``", "\u{201c}").replace("''", "\u{201d}")
}

/// First sentence of a doc comment, empty for copyright and author notices
pub fn synopsis(text: &str) -> String {
    let sentence = clean_whitespace(&text[..first_sentence_len(text)]);
    let lower = sentence.to_lowercase();
    if ILLEGAL_SYNOPSIS_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return String::new();
    }
    convert_quotes(&sentence)
}

enum Block {
    Para(Vec<String>),
    Pre(Vec<String>),
    Heading(String),
}

fn indent_len(s: &str) -> usize {
    s.len() - s.trim_start_matches([' ', '\t']).len()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// The heading text if `line` looks like a section heading
fn heading(line: &str) -> Option<String> {
    let line = line.trim();
    let first = line.chars().next()?;
    if !first.is_alphabetic() || !first.is_uppercase() {
        return None;
    }
    let last = line.chars().last()?;
    if !last.is_alphabetic() && !last.is_numeric() {
        return None;
    }
    if line.chars().any(|c| ";:!?+*/=[]{}_^°&§~%#@<\">\\".contains(c)) {
        return None;
    }

    // "'" only as a possessive 's
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'\'' => {
                if bytes.get(i + 1) != Some(&b's') || bytes.get(i + 2).map(|c| *c != b' ').unwrap_or(false) {
                    return None;
                }
            }
            b'.' => {
                if bytes.get(i + 1).map(|c| *c == b' ').unwrap_or(true) {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(line.to_string())
}

/// Heading anchor id
fn anchor_id(text: &str) -> String {
    let id: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("hdr-{}", id)
}

fn split_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut para: Vec<String> = Vec::new();
    let mut last_was_blank = false;
    let mut last_was_heading = false;

    let close = |para: &mut Vec<String>, blocks: &mut Vec<Block>| {
        if !para.is_empty() {
            blocks.push(Block::Para(std::mem::take(para)));
        }
    };

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if is_blank(line) {
            close(&mut para, &mut blocks);
            i += 1;
            last_was_blank = true;
            continue;
        }

        if indent_len(line) > 0 {
            close(&mut para, &mut blocks);

            // pre block runs until a non-blank unindented line
            let start = i;
            i += 1;
            while i < lines.len() && (is_blank(lines[i]) || indent_len(lines[i]) > 0) {
                i += 1;
            }
            let mut end = i;
            while end > start && is_blank(lines[end - 1]) {
                end -= 1;
            }
            let common = lines[start..end]
                .iter()
                .filter(|l| !is_blank(l))
                .map(|l| &l[..indent_len(l)])
                .fold(None::<&str>, |acc, indent| match acc {
                    None => Some(indent),
                    Some(prefix) => {
                        let shared = prefix
                            .bytes()
                            .zip(indent.bytes())
                            .take_while(|(a, b)| a == b)
                            .count();
                        Some(&prefix[..shared])
                    }
                })
                .unwrap_or("");
            let pre = lines[start..end]
                .iter()
                .map(|l| l.strip_prefix(common).unwrap_or(l.trim_start()).to_string())
                .collect();
            blocks.push(Block::Pre(pre));
            last_was_blank = false;
            last_was_heading = false;
            continue;
        }

        if last_was_blank
            && !last_was_heading
            && i + 2 < lines.len()
            && is_blank(lines[i + 1])
            && !is_blank(lines[i + 2])
            && indent_len(lines[i + 2]) == 0
        {
            if let Some(head) = heading(line) {
                close(&mut para, &mut blocks);
                blocks.push(Block::Heading(head));
                i += 2;
                last_was_heading = true;
                continue;
            }
        }

        last_was_blank = false;
        last_was_heading = false;
        para.push(line.to_string());
        i += 1;
    }
    close(&mut para, &mut blocks);
    blocks
}

/// Escape a paragraph line, linking bare URLs and converting quote pairs
fn emphasize(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for m in URL_RX.find_iter(line) {
        let url = m.as_str().trim_end_matches(['.', ',', ':', ';', '?', '!', ')']);
        let end = m.start() + url.len();
        out.push_str(&convert_quotes(&escape_html_text(&line[last..m.start()])));
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url),
            escape_html_text(url)
        ));
        last = end;
    }
    out.push_str(&convert_quotes(&escape_html_text(&line[last..])));
    out
}

/// Render comment text to HTML
pub fn to_html(text: &str) -> String {
    let mut html = String::new();
    for block in split_blocks(text) {
        match block {
            Block::Para(lines) => {
                html.push_str("<p>\n");
                for line in lines {
                    html.push_str(&emphasize(&line));
                    html.push('\n');
                }
                html.push_str("</p>\n");
            }
            Block::Pre(lines) => {
                html.push_str("<pre>");
                for line in lines {
                    html.push_str(&escape_html_text(&line));
                    html.push('\n');
                }
                html.push_str("</pre>\n");
            }
            Block::Heading(head) => {
                html.push_str(&format!(
                    "<h3 id=\"{}\">{}</h3>\n",
                    anchor_id(&head),
                    escape_html_text(&head)
                ));
            }
        }
    }
    html
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
