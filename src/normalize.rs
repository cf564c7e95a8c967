//! Normalizer: turns any key into a legal identifier spelling.
//!
//! Steps, in order:
//! 1. Integral floats that equal their own numeric hash render as the
//!    integer (`1234.0` -> `1234`). Booleans never collapse.
//! 2. Take the text form of the key.
//! 3. ASCII punctuation and ASCII whitespace become `_`.
//! 4. Prefix `_` when the text is empty, starts with a character that may
//!    continue but not start an identifier (digits), or is reserved.
//! 5. Any character that is not `XID_Continue` becomes `_`.
//!
//! The result always starts with `_` or an `XID_Start` character and is
//! never reserved, so normalizing it again returns it unchanged as long as
//! no reserved word starts with `_`.

use crate::key::Key;

/// Hard keywords of Python, the attribute syntax these spellings target.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

// 2^61 - 1, the modulus of numeric hashing. Integral floats below it hash
// to themselves, except -1.0 which hashes to -2.
const HASH_MODULUS: f64 = 2_305_843_009_213_693_951.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Normalizer {
    reserved: &'static [&'static str],
}

impl Normalizer {
    pub const fn new() -> Self {
        Self::with_reserved(PYTHON_KEYWORDS)
    }

    /// Use a different frozen set of reserved words.
    pub const fn with_reserved(reserved: &'static [&'static str]) -> Self {
        Self { reserved }
    }

    pub fn reserved(&self) -> &'static [&'static str] {
        self.reserved
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(&word)
    }

    pub fn normalize(&self, key: &Key) -> String {
        let mut name: String = text_of(key)
            .chars()
            .map(|c| if is_separator(c) { '_' } else { c })
            .collect();
        if needs_prefix(&name) || self.is_reserved(&name) {
            name.insert(0, '_');
        }
        name.chars()
            .map(|c| if is_identifier_char(c) { c } else { '_' })
            .collect()
    }

    /// Whether `name` is already a usable attribute spelling.
    pub fn is_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let head_ok = match chars.next() {
            Some(c) => c == '_' || unicode_ident::is_xid_start(c),
            None => false,
        };
        head_ok && chars.all(is_identifier_char) && !self.is_reserved(name)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the default reserved words.
pub fn normalize<K: Into<Key>>(key: K) -> String {
    Normalizer::new().normalize(&key.into())
}

/// May `c` appear after the first character of an identifier.
pub fn is_identifier_char(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

fn text_of(key: &Key) -> String {
    match key {
        Key::Float(f) if hashes_to_itself(*f) => format!("{}", *f as i64),
        _ => key.to_string(),
    }
}

fn hashes_to_itself(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < HASH_MODULUS && f != -1.0
}

fn is_separator(c: char) -> bool {
    // `is_ascii_whitespace` leaves out vertical tab.
    c.is_ascii_punctuation() || c.is_ascii_whitespace() || c == '\x0b'
}

fn needs_prefix(name: &str) -> bool {
    match name.chars().next() {
        None => true,
        Some(c) => c != '_' && is_identifier_char(c) && !unicode_ident::is_xid_start(c),
    }
}
