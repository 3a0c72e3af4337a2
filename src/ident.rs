//! Turning free-form asset names into unique identifiers

use std::collections::HashSet;

/// Words that can never be used bare as an identifier.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "any", "as", "break", "case", "catch", "class", "continue", "const",
    "constructor", "debugger", "declare", "default", "delete", "do", "else", "enum", "export",
    "extends", "false", "finally", "for", "from", "function", "get", "if", "implements",
    "import", "in", "instanceof", "interface", "is", "let", "module", "namespace", "new", "null",
    "package", "private", "protected", "public", "require", "global", "return", "set", "static",
    "super", "switch", "symbol", "this", "throw", "true", "try", "type", "typeof", "var", "void",
    "while", "with", "yield", "async", "await", "of", "Math",
];

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphanumeric())
}

/// Escape a name into a valid identifier.
///
/// Whitespace runs become `_`, characters that cannot appear in an
/// identifier are deleted, and a `_` is prepended when the result is empty,
/// starts with a non-start character or is a reserved word.
///
/// # Examples
///
/// ```
/// use sprite_pack::ident::escape_identifier;
///
/// assert_eq!(escape_identifier("my hero"), "my_hero");
/// assert_eq!(escape_identifier("my-name!"), "myname");
/// assert_eq!(escape_identifier("1abc"), "_1abc");
/// assert_eq!(escape_identifier("class"), "_class");
/// ```
pub fn escape_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }

    let mut escaped = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.trim().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                escaped.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if is_identifier_part(c) {
            escaped.push(c);
        }
    }

    let needs_prefix = match escaped.chars().next() {
        None => true,
        Some(first) => !is_identifier_start(first) || RESERVED_WORDS.contains(&escaped.as_str()),
    };
    if needs_prefix {
        escaped.insert(0, '_');
    }
    escaped
}

/// The set of identifiers already handed out during one export or import.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape `name` and reserve a unique variant of it.
    ///
    /// The first claim gets the escaped name itself; later collisions get
    /// `name2`, `name3`, ... using the lowest free suffix.
    pub fn claim(&mut self, name: &str) -> String {
        let escaped = escape_identifier(name);
        if self.taken.insert(escaped.clone()) {
            return escaped;
        }

        let mut suffix = 2u32;
        loop {
            let candidate = format!("{}{}", escaped, suffix);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.taken.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}
