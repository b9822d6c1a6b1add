//! # Card Text
//!
//! [`FormattedText`] is the immutable value stored on each card side. It keeps
//! the text in its formatted form: inline markup tags such as `<b>`, `<i>`,
//! `<u>`, `<sub>` and `<sup>`, with `&`, `<` and `>` escaped as entities in
//! literal text.
//!
//! Two constructors mirror the two ways text enters the system:
//!
//! - [`FormattedText::formatted`]: the string already is markup (editor output).
//! - [`FormattedText::unformatted`]: the string is plain text typed by a user.
//!   Markup characters are escaped so `"a < b"` stays literal.
//!
//! Equality compares the formatted form, so plain-text edits compare equal to
//! existing content only when they escape to the same markup.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FormattedText {
    formatted: String,
}

impl FormattedText {
    pub fn formatted(markup: impl Into<String>) -> Self {
        Self {
            formatted: markup.into(),
        }
    }

    pub fn unformatted(plain: &str) -> Self {
        Self {
            formatted: escape(plain),
        }
    }

    pub fn as_formatted(&self) -> &str {
        &self.formatted
    }

    /// The text with markup tags removed and entities decoded.
    pub fn unformatted_text(&self) -> String {
        let mut stripped = String::with_capacity(self.formatted.len());
        let mut in_tag = false;
        for ch in self.formatted.chars() {
            match ch {
                '<' => in_tag = true,
                '>' if in_tag => in_tag = false,
                _ if !in_tag => stripped.push(ch),
                _ => {}
            }
        }
        unescape(&stripped)
    }

    /// True when nothing visible remains after stripping markup.
    pub fn is_blank(&self) -> bool {
        self.unformatted_text().trim().is_empty()
    }
}

impl fmt::Display for FormattedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unformatted_text())
    }
}

fn escape(plain: &str) -> String {
    plain
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
