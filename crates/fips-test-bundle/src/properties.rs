// crates/fips-test-bundle/src/properties.rs
// ============================================================================
// Module: Property Set Codec
// Description: Ordered key/value sets in Java `.properties` syntax.
// Purpose: Load, edit, and store `java.security` style configuration files.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`PropertySet`] is an insertion-ordered key/value set with a codec for the
//! Java `.properties` format. Loading follows `java.util.Properties::load`:
//! `#`/`!` comment lines, `=`/`:`/whitespace separators, backslash line
//! continuations, and `\uXXXX` escapes. Storing escapes keys and values the
//! way `Properties::store` does, so output is plain ASCII.
//! Invariants:
//! - Keys are unique; re-inserting a key overwrites its value in place.
//! - Iteration order is first-insertion order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io;
use std::io::Write;

use crate::error::BundleError;

// ============================================================================
// SECTION: Property Set
// ============================================================================

/// Insertion-ordered set of string properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    /// Entries in first-insertion order.
    entries: Vec<(String, String)>,
}

impl PropertySet {
    /// Creates an empty property set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parses `.properties` text.
    ///
    /// Later duplicates of a key overwrite earlier values.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Parse`] on a malformed `\uXXXX` escape.
    pub fn parse(text: &str) -> Result<Self, BundleError> {
        let mut set = Self::new();
        for line in logical_lines(text) {
            let (raw_key, raw_value) = split_key_value(&line);
            set.insert(unescape(raw_key)?, unescape(raw_value)?);
        }
        Ok(set)
    }

    /// Parses ISO-8859-1 encoded `.properties` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Parse`] on a malformed `\uXXXX` escape.
    pub fn from_latin1(bytes: &[u8]) -> Result<Self, BundleError> {
        let text: String = bytes.iter().map(|byte| char::from(*byte)).collect();
        Self::parse(&text)
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
    }

    /// Returns true when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    /// Inserts or overwrites a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(candidate, _)| *candidate == key)
        {
            return Some(std::mem::replace(existing, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Removes every property whose key starts with `prefix`.
    ///
    /// Returns the number of removed entries.
    pub fn remove_prefixed(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Copies every entry of `other` into this set, overwriting existing keys.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the set has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the set as `.properties` text with an optional header comment.
    #[must_use]
    pub fn to_properties_string(&self, comment: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(comment) = comment {
            for line in comment.lines() {
                out.push('#');
                out.push_str(&escape(line, EscapeMode::Comment));
                out.push('\n');
            }
        }
        for (key, value) in &self.entries {
            out.push_str(&escape(key, EscapeMode::Key));
            out.push('=');
            out.push_str(&escape(value, EscapeMode::Value));
            out.push('\n');
        }
        out
    }

    /// Writes the set as `.properties` text.
    ///
    /// # Errors
    ///
    /// Returns the writer's I/O error.
    pub fn write_to<W: Write>(&self, writer: &mut W, comment: Option<&str>) -> io::Result<()> {
        writer.write_all(self.to_properties_string(comment).as_bytes())?;
        writer.flush()
    }
}

impl<K, V> FromIterator<(K, V)> for PropertySet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}

// ============================================================================
// SECTION: Load Helpers
// ============================================================================

/// Returns true for `.properties` whitespace (space, tab, form feed).
const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// Returns true when the line ends with an odd number of backslashes.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Splits text into logical lines, dropping blanks and comments.
fn logical_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut natural = normalized.split('\n');
    let mut lines = Vec::new();
    while let Some(line) = natural.next() {
        let mut segment = line.trim_start_matches(is_blank);
        if segment.is_empty() || segment.starts_with('#') || segment.starts_with('!') {
            continue;
        }
        let mut logical = String::new();
        while continues(segment) {
            logical.push_str(&segment[.. segment.len() - 1]);
            match natural.next() {
                Some(next) => segment = next.trim_start_matches(is_blank),
                None => {
                    segment = "";
                    break;
                }
            }
        }
        logical.push_str(segment);
        lines.push(logical);
    }
    lines
}

/// Splits a logical line into raw (still escaped) key and value slices.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut has_separator = false;
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = index;
                has_separator = true;
                break;
            }
            c if is_blank(c) => {
                key_end = index;
                break;
            }
            _ => {}
        }
    }
    let key = &line[.. key_end];
    let mut rest = line[key_end ..].chars();
    if has_separator {
        rest.next();
    }
    let mut value = rest.as_str().trim_start_matches(is_blank);
    if !has_separator && let Some(stripped) = value.strip_prefix(['=', ':']) {
        value = stripped.trim_start_matches(is_blank);
    }
    (key, value)
}

/// Decodes backslash escapes, including UTF-16 `\uXXXX` sequences.
fn unescape(raw: &str) -> Result<String, BundleError> {
    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut buffer = [0u16; 2];
    while let Some(c) = chars.next() {
        let decoded = if c == '\\' {
            match chars.next() {
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let unit = if hex.len() == 4 && hex.chars().all(|d| d.is_ascii_hexdigit()) {
                        u16::from_str_radix(&hex, 16).ok()
                    } else {
                        None
                    };
                    let Some(unit) = unit else {
                        return Err(BundleError::Parse(format!("malformed \\uxxxx encoding: \\u{hex}")));
                    };
                    units.push(unit);
                    continue;
                }
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\u{c}',
                Some(other) => other,
                None => break,
            }
        } else {
            c
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buffer));
    }
    Ok(String::from_utf16_lossy(&units))
}

// ============================================================================
// SECTION: Store Helpers
// ============================================================================

/// Escaping context for stored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeMode {
    /// Keys escape every space.
    Key,
    /// Values escape only a leading space.
    Value,
    /// Comments escape only non-ASCII characters.
    Comment,
}

/// Escapes text for storage in a `.properties` file.
fn escape(text: &str, mode: EscapeMode) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        if mode == EscapeMode::Comment {
            push_ascii(&mut out, c);
            continue;
        }
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if index == 0 || mode == EscapeMode::Key => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => push_ascii(&mut out, c),
        }
    }
    out
}

/// Pushes printable ASCII as-is and everything else as `\uXXXX` units.
fn push_ascii(out: &mut String, c: char) {
    if (' ' ..= '~').contains(&c) {
        out.push(c);
        return;
    }
    let mut buffer = [0u16; 2];
    for unit in c.encode_utf16(&mut buffer) {
        let _ = write!(out, "\\u{unit:04X}");
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
