//! Program-image loader: text lines of binary literals into bytes.

use std::fs;
use std::path::Path;

use crate::{Ls8Error, Result};

/// Parses program text into an image, one byte per line.
///
/// Each line is trimmed first; a line that is then empty or starts with
/// `#` is skipped and consumes no address. Otherwise the first 8
/// characters must all be `0`/`1` and are read as a binary literal;
/// anything after them (typically a trailing `# comment`) is ignored.
pub fn parse_program(text: &str) -> Result<Vec<u8>> {
    let mut image = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let digits = line
            .get(..8)
            .filter(|digits| digits.bytes().all(|b| b == b'0' || b == b'1'))
            .ok_or_else(|| Ls8Error::BadProgramLine {
                line: index + 1,
                reason: format!("expected 8 binary digits, got {line:?}"),
            })?;
        let byte = u8::from_str_radix(digits, 2).map_err(|_| Ls8Error::BadProgramLine {
            line: index + 1,
            reason: format!("bad binary literal {digits:?}"),
        })?;
        image.push(byte);
    }
    Ok(image)
}

/// Reads and parses a program image file.
pub fn load_program(path: &Path) -> Result<Vec<u8>> {
    let text = fs::read_to_string(path)?;
    parse_program(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bytes_in_file_order() {
        let image = parse_program("10000010\n00000000\n00001000\n").unwrap();
        assert_eq!(image, vec![0x82, 0x00, 0x08]);
    }

    #[test]
    fn skips_blank_and_comment_lines_without_consuming_addresses() {
        let text = "# boot\n\n10000010\n   \n# data\n00000001\n";
        assert_eq!(parse_program(text).unwrap(), vec![0x82, 0x01]);
    }

    #[test]
    fn ignores_trailing_comments_and_indentation() {
        let text = "  10000010 # LDI R0,8\n\t01000111# PRN R0\n";
        assert_eq!(parse_program(text).unwrap(), vec![0x82, 0x47]);
    }

    #[test]
    fn short_line_reports_its_line_number() {
        let err = parse_program("10000010\n101\n").unwrap_err();
        match err {
            Ls8Error::BadProgramLine { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_binary_digits_are_rejected() {
        assert!(parse_program("1000001x\n").is_err());
        assert!(parse_program("+0000001\n").is_err());
        assert!(parse_program("0b000001\n").is_err());
    }

    #[test]
    fn empty_input_is_an_empty_image() {
        assert!(parse_program("").unwrap().is_empty());
        assert!(parse_program("# only comments\n").unwrap().is_empty());
    }
}
