//! Escaping utilities for safe report generation.
//!
//! System descriptions, element names and data types are free text typed
//! by the user. They may contain:
//! - Markdown syntax that could break table formatting or headings
//! - Quotes and newlines that could split CSV records
//! - Control characters that could disrupt rendering
//!
//! All user-controllable data MUST be escaped before embedding in reports.

/// Escape a string for safe inclusion in Markdown table cells.
///
/// Markdown tables use `|` as column separators and can be broken
/// by unescaped pipe characters. This function also handles newlines
/// and backticks that could break formatting.
///
/// # Examples
///
/// ```
/// use stride_tools::reports::escape::escape_markdown_table;
///
/// assert_eq!(escape_markdown_table("a | b"), "a \\| b");
/// assert_eq!(escape_markdown_table("line1\nline2"), "line1 line2");
/// assert_eq!(escape_markdown_table("`code`"), "\\`code\\`");
/// ```
pub fn escape_markdown_table(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '|' => result.push_str("\\|"),
            '\n' => result.push(' '),
            '\r' => {}
            '`' => result.push_str("\\`"),
            '[' => result.push_str("\\["),
            ']' => result.push_str("\\]"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for safe inclusion in Markdown inline content.
///
/// Escapes characters that have special meaning in Markdown.
///
/// # Examples
///
/// ```
/// use stride_tools::reports::escape::escape_markdown_inline;
///
/// assert_eq!(escape_markdown_inline("**bold**"), "\\*\\*bold\\*\\*");
/// assert_eq!(escape_markdown_inline("[link](url)"), "\\[link\\](url)");
/// ```
pub fn escape_markdown_inline(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' => result.push_str("\\*"),
            '_' => result.push_str("\\_"),
            '`' => result.push_str("\\`"),
            '[' => result.push_str("\\["),
            ']' => result.push_str("\\]"),
            '#' => result.push_str("\\#"),
            '!' => result.push_str("\\!"),
            '~' => result.push_str("\\~"),
            '|' => result.push_str("\\|"),
            '<' => result.push_str("\\<"),
            '>' => result.push_str("\\>"),
            '\n' => result.push(' '),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for use in Markdown list items.
///
/// Lighter than inline escaping: underscores and `#` stay readable in
/// ASVS and SAMM references.
pub fn escape_markdown_list(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' => result.push_str("\\*"),
            '`' => result.push_str("\\`"),
            '[' => result.push_str("\\["),
            ']' => result.push_str("\\]"),
            '<' => result.push_str("\\<"),
            '>' => result.push_str("\\>"),
            '\n' => result.push_str("; "),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Quote a CSV field per RFC 4180, flattening line breaks.
///
/// # Examples
///
/// ```
/// use stride_tools::reports::escape::escape_csv;
///
/// assert_eq!(escape_csv("plain"), "\"plain\"");
/// assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
/// ```
pub fn escape_csv(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\"\""),
            '\n' => result.push(' '),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown_table_malicious() {
        assert_eq!(
            escape_markdown_table("Frontend | [x](javascript:alert(1))"),
            "Frontend \\| \\[x\\](javascript:alert(1))"
        );
        assert_eq!(escape_markdown_table("a\r\nb"), "a b");
    }

    #[test]
    fn test_escape_markdown_inline() {
        assert_eq!(escape_markdown_inline("# heading"), "\\# heading");
        assert_eq!(escape_markdown_inline("<b>"), "\\<b\\>");
        assert_eq!(escape_markdown_inline("User → API"), "User → API");
    }

    #[test]
    fn test_escape_markdown_list() {
        assert_eq!(escape_markdown_list("V2.1.1 - *verify*"), "V2.1.1 - \\*verify\\*");
        assert_eq!(escape_markdown_list("line1\nline2"), "line1; line2");
        assert_eq!(escape_markdown_list("third_party"), "third_party");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv(""), "\"\"");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("multi\r\nline"), "\"multi line\"");
    }

    #[test]
    fn test_unicode_preservation() {
        assert_eq!(escape_markdown_table("Zahlungsdienst → Datenbank"), "Zahlungsdienst → Datenbank");
        assert_eq!(escape_csv("日本語"), "\"日本語\"");
    }
}
