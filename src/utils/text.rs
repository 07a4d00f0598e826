// src/utils/text.rs
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RUN_RE"));

/// Removes every ASCII space character. Newlines and tabs are kept so source
/// files stay line-oriented.
pub fn strip_spaces(text: &str) -> String {
    text.replace(' ', "")
}

/// Collapses runs of whitespace (including newlines) into a single space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(text, " ").trim().to_string()
}

/// Decodes bytes as UTF-8, dropping invalid sequences. Characters that are
/// validly encoded, U+FFFD included, are kept.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_spaces_keeps_newlines() {
        assert_eq!(strip_spaces("hello world"), "helloworld");
        assert_eq!(strip_spaces("fn main() {\n    x\n}"), "fnmain(){\nx\n}");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\tc  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_decode_lossy_drops_invalid_bytes() {
        let bytes = [b'o', b'k', 0xff, 0xfe, b'!'];
        assert_eq!(decode_lossy(&bytes), "ok!");
    }

    #[test]
    fn test_decode_lossy_keeps_encoded_replacement_character() {
        let mut bytes = "a\u{FFFD}b".as_bytes().to_vec();
        bytes.push(0xc3);
        assert_eq!(decode_lossy(&bytes), "a\u{FFFD}b");
    }
}
