/*
 * xml.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Text escaping for package parts.

use std::borrow::Cow;

use quick_xml::escape::escape;

/// Replacement for characters XML 1.0 cannot carry.
const REPLACEMENT: char = '\u{FFFD}';

/// XML 1.0 `Char`: tab, LF, CR and everything from U+0020 up, except the
/// U+FFFE/U+FFFF noncharacters. Surrogates never occur in a `char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Escape `text` for element content or an attribute value.
///
/// Markup characters are escaped; control characters that XML 1.0 forbids
/// are replaced with U+FFFD.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return escape(text);
    }
    let cleaned: String = text
        .chars()
        .map(|c| if is_xml_char(c) { c } else { REPLACEMENT })
        .collect();
    Cow::Owned(escape(cleaned.as_str()).into_owned())
}
