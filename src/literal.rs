//! Image literals: bitmaps written as rows of characters
//!
//! Two surface syntaxes wrap the same body:
//!
//! ```text
//! img`
//!     . 1 2
//!     3 . .
//! `
//! ```
//!
//! ```text
//! img("""
//!     . 1 2
//!     3 . .
//! """)
//! ```
//!
//! Each body row is one bitmap row. Several characters alias each palette
//! index (see [`char_to_index`]); anything else is skipped.

use crate::bitmap::Bitmap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

/// Symbols emitted by the encoder, indexed by palette index.
const ENCODE_ALPHABET: [char; 16] =
    ['.', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f'];

/// Which wrapper an encoded literal uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralFormat {
    /// `` img`...` `` tagged template
    #[default]
    TypeScript,
    /// `img("""...""")` call
    Python,
}

impl std::str::FromStr for LiteralFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Ok(LiteralFormat::TypeScript),
            "python" | "py" => Ok(LiteralFormat::Python),
            other => Err(format!("unknown literal format '{}'", other)),
        }
    }
}

/// Map a literal character to its palette index.
///
/// Digits and lowercase hex letters select their own value; the remaining
/// letters are color mnemonics (`T`/`t` for reds, `N`/`n` oranges, `G`/`g`
/// greens, `R`ed, `P`ink/`p`urple, `O`live, `Y`ellow, `W`hite).
pub fn char_to_index(c: char) -> Option<u8> {
    let index = match c {
        '0' | '.' => 0,
        '1' | '#' => 1,
        '2' | 'T' => 2,
        '3' | 't' => 3,
        '4' | 'N' => 4,
        '5' | 'n' => 5,
        '6' | 'G' => 6,
        '7' | 'g' => 7,
        '8' => 8,
        '9' => 9,
        'a' | 'A' | 'R' => 10,
        'b' | 'B' | 'P' => 11,
        'c' | 'C' | 'p' => 12,
        'd' | 'D' | 'O' => 13,
        'e' | 'E' | 'Y' => 14,
        'f' | 'F' | 'W' => 15,
        _ => return None,
    };
    Some(index)
}

/// Strip the wrapper and entity escapes, leaving only the row body.
fn strip_wrapper(text: &str) -> String {
    let text = text
        .replace("&#96;", "")
        .replace("&#9;", "")
        .replace("img", "")
        .replace(['`', ' '], "");
    let text = text.trim();
    let text = text.trim_start_matches(['"', '`', '(', ')']);
    let text = text.trim_end_matches(['"', '`', '(', ')']);
    text.replace("&#10;", "\n").trim().to_string()
}

/// Decode an image literal into a bitmap.
///
/// Rows may be ragged: the bitmap is as wide as the longest row and short
/// rows are padded with index 0. When the stripped body is empty and a
/// `fallback` body is given, the fallback is decoded instead.
///
/// # Examples
///
/// ```
/// use sprite_pack::literal::decode;
///
/// let bitmap = decode("img`\n12\n3\n`", None);
/// assert_eq!(bitmap.rows(), vec![vec![1, 2], vec![3, 0]]);
/// ```
pub fn decode(text: &str, fallback: Option<&str>) -> Bitmap {
    let mut body = strip_wrapper(text);
    if body.is_empty() {
        if let Some(pattern) = fallback {
            body = pattern.to_string();
        }
    }

    let rows: Vec<Vec<u8>> = body
        .split('\n')
        .map(|row| {
            row.chars()
                .filter_map(|c| {
                    let index = char_to_index(c);
                    if index.is_none() && !c.is_whitespace() {
                        tracing::debug!("skipping unknown image literal character {:?}", c);
                    }
                    index
                })
                .collect()
        })
        .collect();

    if rows.iter().all(Vec::is_empty) {
        return Bitmap::default();
    }
    Bitmap::from_rows(&rows)
}

/// Encode a bitmap as an image literal.
///
/// Every pixel becomes exactly one symbol; symbols in a row are separated
/// by a single space and each row sits on its own indented line.
pub fn encode(bitmap: &Bitmap, format: LiteralFormat) -> String {
    let mut out = String::from(match format {
        LiteralFormat::TypeScript => "img`",
        LiteralFormat::Python => "img(\"\"\"",
    });

    for row in bitmap.rows() {
        out.push_str("\n    ");
        let symbols: Vec<String> =
            row.iter().map(|&v| ENCODE_ALPHABET[(v & 0xF) as usize].to_string()).collect();
        out.push_str(&symbols.join(" "));
    }
    out.push('\n');

    out.push_str(match format {
        LiteralFormat::TypeScript => "`",
        LiteralFormat::Python => "\"\"\")",
    });
    out
}

/// One literal found inside a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMatch {
    /// Byte range of the whole literal in the scanned text
    pub range: Range<usize>,
    pub format: LiteralFormat,
    /// The matched literal, wrapper included
    pub text: String,
}

impl LiteralMatch {
    pub fn decode(&self) -> Bitmap {
        decode(&self.text, None)
    }
}

fn literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)img\s*(?:`(?P<ts>[\s\da-f.#tngrpoyw]*)`|\(\s*"""(?P<py>[\s\da-f.#tngrpoyw]*)"""\s*\))"#,
        )
        .expect("literal pattern is valid")
    })
}

/// Find every image literal in `text`, in source order.
pub fn scan(text: &str) -> Vec<LiteralMatch> {
    literal_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let format =
                if caps.name("py").is_some() { LiteralFormat::Python } else { LiteralFormat::TypeScript };
            Some(LiteralMatch { range: whole.range(), format, text: whole.as_str().to_string() })
        })
        .collect()
}
