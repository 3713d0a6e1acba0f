//! Message body sanitization.
//!
//! Provider message bodies arrive as fragments of HTML-ish markup. This module
//! reduces them to plain text in a single pass over a token stream:
//!
//! - nested `<blockquote>` blocks become `"> "` prefixes, one per nesting
//!   level, applied to each text run encountered inside the quote;
//! - emoticon `<span>` elements are replaced by their display glyph and their
//!   literal text content is dropped;
//! - everything else passes through as text, with common character entities
//!   decoded.
//!
//! Sanitization never fails: a malformed tag or a truncated body ends the
//! token stream and whatever output has accumulated so far is returned.

use super::emoji::glyph_for_code;

/// Attribute class prefix marking an emoticon element.
const EMOTICON_CLASS_PREFIX: &str = "animated-emoticon-";

/// Quote marker emitted once per nesting level in front of quoted text.
const QUOTE_MARKER: &str = "> ";

/// Reduce a raw markup body to plain text.
pub fn sanitize_content(raw: &str) -> String {
    let mut tokenizer = Tokenizer::new(raw);
    let mut quote_depth: usize = 0;
    let mut suppress_depth: usize = 0;
    let mut output = String::with_capacity(raw.len());

    loop {
        match tokenizer.next_token() {
            Token::Open {
                name,
                attrs,
                self_closing,
            } => match name.as_str() {
                "span" => {
                    if let Some(glyph) = emoticon_glyph(&attrs) {
                        output.push_str(glyph);
                        if !self_closing {
                            suppress_depth += 1;
                        }
                    }
                }
                "blockquote" => {
                    if !self_closing {
                        quote_depth += 1;
                    }
                }
                _ => {}
            },
            Token::Close { name } => match name.as_str() {
                "blockquote" => quote_depth = quote_depth.saturating_sub(1),
                "span" => suppress_depth = suppress_depth.saturating_sub(1),
                _ => {}
            },
            Token::Text(text) => {
                if suppress_depth > 0 {
                    continue;
                }
                for _ in 0..quote_depth {
                    output.push_str(QUOTE_MARKER);
                }
                output.push_str(&text);
            }
            Token::Eof => return output,
        }
    }
}

/// Resolve an attribute set to an emoticon glyph.
///
/// An element counts as an emoticon only when its `class` attribute carries
/// the marker prefix and its `type` attribute names a code present in the
/// static table. Anything else is an ordinary element.
fn emoticon_glyph(attrs: &[(String, String)]) -> Option<&'static str> {
    let class = attrs
        .iter()
        .find(|(name, _)| name == "class")
        .map(|(_, value)| value.as_str())?;
    if !class.starts_with(EMOTICON_CLASS_PREFIX) {
        return None;
    }

    let code = attrs
        .iter()
        .find(|(name, _)| name == "type")
        .map(|(_, value)| value.as_str())?;
    glyph_for_code(code)
}

/// A single markup token.
#[derive(Debug, PartialEq, Eq)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text(String),
    Eof,
}

/// Minimal streaming markup tokenizer.
///
/// Understands open/close tags with quoted or bare attribute values,
/// self-closing tags, and comment/doctype constructs (skipped). Anything it
/// cannot parse terminates the stream.
struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn next_token(&mut self) -> Token {
        loop {
            if self.pos >= self.input.len() {
                return Token::Eof;
            }

            if self.input[self.pos] != b'<' {
                return self.read_text();
            }

            match self.input.get(self.pos + 1) {
                Some(b'/') => return self.read_close_tag(),
                Some(b'!') | Some(b'?') => {
                    // Comment, doctype or processing instruction: skip to '>'.
                    if !self.skip_past(b'>') {
                        return Token::Eof;
                    }
                }
                Some(c) if c.is_ascii_alphabetic() => return self.read_open_tag(),
                Some(_) => {
                    // A lone '<' that does not start a tag is treated as text.
                    return self.read_text_from_bracket();
                }
                None => return Token::Eof,
            }
        }
    }

    fn read_text(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos] != b'<' {
            self.pos += 1;
        }
        Token::Text(decode_entities(&self.slice(start, self.pos)))
    }

    fn read_text_from_bracket(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.input.len() && self.input[self.pos] != b'<' {
            self.pos += 1;
        }
        Token::Text(decode_entities(&self.slice(start, self.pos)))
    }

    fn read_close_tag(&mut self) -> Token {
        self.pos += 2; // consume "</"
        let name = self.read_name();
        if !self.skip_past(b'>') {
            return Token::Eof;
        }
        Token::Close { name }
    }

    fn read_open_tag(&mut self) -> Token {
        self.pos += 1; // consume '<'
        let name = self.read_name();
        let mut attrs = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.input.get(self.pos) {
                None => return Token::Eof,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self_closing = true;
                    self.pos += 1;
                }
                Some(_) => {
                    let attr_name = self.read_name();
                    if attr_name.is_empty() {
                        // Not a parseable attribute; give up on the stream.
                        return Token::Eof;
                    }
                    let value = self.read_attr_value();
                    attrs.push((attr_name, value));
                }
            }
        }

        Token::Open {
            name,
            attrs,
            self_closing,
        }
    }

    /// Read a tag or attribute name: ASCII letters, digits, '-', '_', ':'.
    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(&c) = self.input.get(self.pos) {
            if c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.slice(start, self.pos).to_ascii_lowercase()
    }

    /// Read an optional `=value` after an attribute name.
    fn read_attr_value(&mut self) -> String {
        self.skip_whitespace();
        if self.input.get(self.pos) != Some(&b'=') {
            return String::new();
        }
        self.pos += 1;
        self.skip_whitespace();

        match self.input.get(self.pos).copied() {
            Some(quote) if quote == b'"' || quote == b'\'' => {
                self.pos += 1;
                let start = self.pos;
                while self.pos < self.input.len() && self.input[self.pos] != quote {
                    self.pos += 1;
                }
                let value = self.slice(start, self.pos);
                if self.pos < self.input.len() {
                    self.pos += 1; // consume closing quote
                }
                decode_entities(&value)
            }
            _ => {
                let start = self.pos;
                while let Some(&c) = self.input.get(self.pos) {
                    if c.is_ascii_whitespace() || c == b'>' || c == b'/' {
                        break;
                    }
                    self.pos += 1;
                }
                decode_entities(&self.slice(start, self.pos))
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .input
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    /// Advance past the next occurrence of `byte`. Returns false at EOF.
    fn skip_past(&mut self, byte: u8) -> bool {
        while self.pos < self.input.len() {
            let current = self.input[self.pos];
            self.pos += 1;
            if current == byte {
                return true;
            }
        }
        false
    }

    fn slice(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.input[start..end]).into_owned()
    }
}

/// Decode the character entities the provider commonly emits.
///
/// Unknown entities are left verbatim so no text is ever lost.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        output.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let Some(end) = rest.find(';').filter(|&end| end <= 8) else {
            output.push('&');
            rest = &rest[1..];
            continue;
        };

        let entity = &rest[..=end];
        match entity {
            "&amp;" => output.push('&'),
            "&lt;" => output.push('<'),
            "&gt;" => output.push('>'),
            "&quot;" => output.push('"'),
            "&apos;" | "&#39;" => output.push('\''),
            "&nbsp;" => output.push(' '),
            _ => {
                output.push('&');
                rest = &rest[1..];
                continue;
            }
        }
        rest = &rest[end + 1..];
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_identity() {
        assert_eq!(sanitize_content("hello world"), "hello world");
        assert_eq!(sanitize_content(""), "");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(sanitize_content("a &amp; b &lt;ok&gt;"), "a & b <ok>");
        assert_eq!(sanitize_content("50% &off;"), "50% &off;");
    }

    #[test]
    fn single_blockquote_prefixes_text() {
        assert_eq!(
            sanitize_content("<blockquote>quoted</blockquote>after"),
            "> quotedafter"
        );
    }

    #[test]
    fn nested_blockquotes_multiply_the_prefix() {
        assert_eq!(
            sanitize_content("<blockquote><blockquote>T</blockquote></blockquote>"),
            "> > T"
        );
    }

    #[test]
    fn prefix_applies_per_text_run_inside_quote() {
        let body = "<blockquote>one<blockquote>two</blockquote>three</blockquote>";
        assert_eq!(sanitize_content(body), "> one> > two> three");
    }

    #[test]
    fn emoticon_is_replaced_by_glyph() {
        let body = r#"<span class="animated-emoticon-20-smile" type="smile">(smile)</span>"#;
        assert_eq!(sanitize_content(body), "\u{1F642}");
    }

    #[test]
    fn emoticon_text_stays_suppressed_until_close() {
        let body = concat!(
            r#"before <span class="animated-emoticon-20-laugh" type="laugh">"#,
            "<b>alt text</b></span> after"
        );
        assert_eq!(sanitize_content(body), "before \u{1F600} after");
    }

    #[test]
    fn unrecognized_code_passes_text_through() {
        let body = r#"<span class="animated-emoticon-20-zorp" type="zorp">(zorp)</span>"#;
        assert_eq!(sanitize_content(body), "(zorp)");
    }

    #[test]
    fn span_without_marker_class_is_ordinary() {
        let body = r#"<span class="mention" type="smile">@alice</span>"#;
        assert_eq!(sanitize_content(body), "@alice");
    }

    #[test]
    fn self_closing_emoticon_does_not_suppress_following_text() {
        let body = r#"<span class="animated-emoticon-20-smile" type="smile"/>tail"#;
        assert_eq!(sanitize_content(body), "\u{1F642}tail");
    }

    #[test]
    fn unmatched_close_tags_never_go_negative() {
        assert_eq!(
            sanitize_content("</blockquote></blockquote>ok</span>"),
            "ok"
        );
        // A later open still quotes exactly one level deep.
        assert_eq!(
            sanitize_content("</blockquote><blockquote>T</blockquote>"),
            "> T"
        );
    }

    #[test]
    fn malformed_trailing_tag_returns_partial_output() {
        assert_eq!(sanitize_content("before <spa"), "before ");
        assert_eq!(sanitize_content("before <span class=\"x"), "before ");
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(sanitize_content("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn quote_closes_back_to_plain_text() {
        assert_eq!(
            sanitize_content("intro<blockquote>q</blockquote>outro"),
            "intro> qoutro"
        );
    }

    #[test]
    fn single_quoted_and_bare_attribute_values_parse() {
        let body = "<span class='animated-emoticon-20-like' type=like>+1</span>";
        assert_eq!(sanitize_content(body), "\u{1F44D}");
    }
}
