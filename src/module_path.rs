//! Module path escaping
//!
//! Proxy storage is case-insensitive, so every uppercase letter in a module
//! path travels as `!` followed by its lowercase form
//! (`github.com/Azure` becomes `github.com/!azure`).

use crate::error::{DocError, DocResult};

const ESCAPE_MARKER: char = '!';

fn path_error(path: &str, message: impl Into<String>) -> DocError {
    DocError::PathEncoding {
        path: path.to_string(),
        message: message.into(),
    }
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+' | '/')
}

/// Check that a decoded module path is well formed
pub fn check_path(path: &str) -> DocResult<()> {
    if path.is_empty() {
        return Err(path_error(path, "empty path"));
    }
    if let Some(c) = path.chars().find(|c| !is_path_char(*c)) {
        return Err(path_error(path, format!("invalid char {:?}", c)));
    }
    for element in path.split('/') {
        match element {
            "" => return Err(path_error(path, "empty path element")),
            "." | ".." => return Err(path_error(path, format!("invalid path element {:?}", element))),
            _ => {}
        }
    }
    Ok(())
}

/// Escape a module path for use in a proxy URL
pub fn encode_path(path: &str) -> DocResult<String> {
    check_path(path)?;

    let mut escaped = String::with_capacity(path.len() + 4);
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push(ESCAPE_MARKER);
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    Ok(escaped)
}

/// Reverse `encode_path`
pub fn decode_path(escaped: &str) -> DocResult<String> {
    let mut decoded = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_MARKER {
            match chars.next() {
                Some(next) if next.is_ascii_lowercase() => decoded.push(next.to_ascii_uppercase()),
                Some(next) => {
                    return Err(path_error(escaped, format!("invalid escape sequence !{}", next)));
                }
                None => return Err(path_error(escaped, "trailing escape marker")),
            }
        } else if c.is_ascii_uppercase() {
            return Err(path_error(escaped, format!("unescaped uppercase letter {:?}", c)));
        } else {
            decoded.push(c);
        }
    }
    check_path(&decoded)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("github.com/Azure/azure-sdk").unwrap(), "github.com/!azure/azure-sdk");
        assert_eq!(encode_path("go.uber.org/zap").unwrap(), "go.uber.org/zap");
        assert_eq!(encode_path("example.com/BigCo").unwrap(), "example.com/!big!co");
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("github.com/!azure/azure-sdk").unwrap(), "github.com/Azure/azure-sdk");
        assert_eq!(decode_path("example.com/!big!co").unwrap(), "example.com/BigCo");
        assert_eq!(decode_path("go.uber.org/zap").unwrap(), "go.uber.org/zap");
    }

    #[test]
    fn test_decode_rejects_malformed_escapes() {
        for bad in ["example.com/!", "example.com/!1", "example.com/!A", "example.com/Upper", ""] {
            let err = decode_path(bad).unwrap_err();
            assert!(err.is_client_error(), "{:?} should be a client error", bad);
        }
    }

    #[test]
    fn test_encode_rejects_invalid_paths() {
        for bad in ["", "/leading", "trailing/", "a//b", "a/../b", "with space/x", "bang!/x"] {
            assert!(encode_path(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_encode_decode_inverse() {
        let path = "github.com/BurntSushi/TOML";
        assert_eq!(decode_path(&encode_path(path).unwrap()).unwrap(), path);
    }
}
