//! Static emoticon code to glyph table.
//!
//! The provider encodes emoticons as markup elements carrying a short code
//! (`smile`, `laugh`, ...). The table below maps the codes we recognize to
//! their display glyphs. Codes not in the table are left untouched by the
//! sanitizer so the literal text content of the element survives.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static EMOJI_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("smile", "\u{1F642}"),
        ("laugh", "\u{1F600}"),
        ("heart", "\u{2764}\u{FE0F}"),
        ("like", "\u{1F44D}"),
        ("sad", "\u{1F641}"),
        ("cry", "\u{1F622}"),
        ("angry", "\u{1F620}"),
        ("surprised", "\u{1F62E}"),
        ("wink", "\u{1F609}"),
        ("party", "\u{1F389}"),
    ])
});

/// Look up the display glyph for an emoticon code.
pub fn glyph_for_code(code: &str) -> Option<&'static str> {
    EMOJI_TABLE.get(code).copied()
}
