//! Line scanner shared by the release catalog and package page parsers.
//!
//! Listing pages are served as CRLF-terminated lines of the form
//! `<a href="LINK">NAME</a> DATE TIME SIZE`. Anything else is ignored.

const LINK_PATTERN: &str = "<a href=\"";
const LINK_CLOSE: &str = "\">";
const LINK_END: &str = "</a>";

/// One anchor line from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor<'a> {
    pub href: &'a str,
    /// Display text and the trailing metadata, or `None` when `</a>` is missing.
    pub label: Option<(&'a str, &'a str)>,
    pub line: &'a str,
}

/// Yields every trimmed line that starts with the anchor marker and carries a
/// terminated href.
pub fn anchors(body: &str) -> impl Iterator<Item = Anchor<'_>> {
    body.split("\r\n").filter_map(|line| parse_anchor(line.trim()))
}

fn parse_anchor(line: &str) -> Option<Anchor<'_>> {
    let rest = line.strip_prefix(LINK_PATTERN)?;
    let link_end = rest.find(LINK_CLOSE)?;
    let href = &rest[..link_end];
    let after = &rest[link_end + LINK_CLOSE.len()..];
    let label = after
        .find(LINK_END)
        .map(|name_end| (&after[..name_end], &after[name_end + LINK_END.len()..]));

    Some(Anchor { href, label, line })
}

/// Splits a lowercase `name+version` token at the first character outside `a`-`z`.
///
/// Leading dots are removed from the version: `blender2.80` gives
/// `("blender", "2.80")`, `blender.2` gives `("blender", "2")`, and an
/// all-letter token gives `(token, "")`.
pub fn split_version(token: &str) -> (&str, &str) {
    match token.find(|c: char| !c.is_ascii_lowercase()) {
        Some(i) => (&token[..i], token[i..].trim_start_matches('.')),
        None => (token, ""),
    }
}
