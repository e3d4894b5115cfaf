//! Match highlighting and plain-value extraction for suggestion labels
//!
//! Labels coming from the backends carry a little inline markup (bold
//! emphasis, italic hints). Highlighting must leave that markup intact and
//! value extraction must remove it.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Opening marker inserted around a match
pub const HIGHLIGHT_OPEN: &str = "<span class='highlight'>";
/// Closing marker inserted around a match
pub const HIGHLIGHT_CLOSE: &str = "</span>";

static ITALIC_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<i>.*</i>").unwrap());
static BOLD_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?b>").unwrap());

/// Wrap every case-insensitive occurrence of `query` in `label` with the
/// highlight markers, except occurrences that sit inside a markup tag.
///
/// `query` is matched literally; an empty query returns `label` unchanged.
pub fn highlight(label: &str, query: &str) -> String {
    if query.is_empty() {
        return label.to_string();
    }

    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(_) => return label.to_string(),
    };

    let mut highlighted = String::with_capacity(label.len() + HIGHLIGHT_OPEN.len());
    let mut last = 0;

    for found in pattern.find_iter(label) {
        if is_inside_tag(&label[found.end()..]) {
            continue;
        }
        highlighted.push_str(&label[last..found.start()]);
        highlighted.push_str(HIGHLIGHT_OPEN);
        highlighted.push_str(found.as_str());
        highlighted.push_str(HIGHLIGHT_CLOSE);
        last = found.end();
    }

    highlighted.push_str(&label[last..]);
    highlighted
}

/// A position is inside a tag when the next angle bracket after it closes one.
fn is_inside_tag(rest: &str) -> bool {
    rest.chars().find(|c| *c == '<' || *c == '>') == Some('>')
}

/// Strip the italic hint spans and bold emphasis of a label, leaving the
/// plain value used for matching and for filling the input field.
pub fn extract_value(label: &str) -> String {
    let without_hints = ITALIC_HINT.replace_all(label, "");
    BOLD_TAG.replace_all(&without_hints, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_identity() {
        let label = "<b>Bern</b> <i>(BE)</i>";
        assert_eq!(highlight(label, ""), label);
    }

    #[test]
    fn test_case_insensitive_matches() {
        assert_eq!(
            highlight("Bern, BERNEX", "bern"),
            "<span class='highlight'>Bern</span>, <span class='highlight'>BERN</span>EX"
        );
    }

    #[test]
    fn test_markup_is_not_touched() {
        assert_eq!(
            highlight("<b>Bibern</b>", "b"),
            "<b><span class='highlight'>B</span>i<span class='highlight'>b</span>ern</b>"
        );
    }

    #[test]
    fn test_attribute_text_is_not_wrapped() {
        let label = "Bern <i class=\"bern\">hint</i>";
        assert_eq!(
            highlight(label, "bern"),
            "<span class='highlight'>Bern</span> <i class=\"bern\">hint</i>"
        );
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert_eq!(highlight("a.b axb", "."), "a<span class='highlight'>.</span>b axb");
        assert_eq!(
            highlight("Zürich (ZH)", "(zh)"),
            "Zürich <span class='highlight'>(ZH)</span>"
        );
        assert_eq!(highlight("no match here", "[x"), "no match here");
    }

    #[test]
    fn test_extract_value() {
        assert_eq!(extract_value("<b>3000 Bern</b>"), "3000 Bern");
        assert_eq!(extract_value("Bern <i>Gemeinde</i>"), "Bern");
        assert_eq!(extract_value("plain"), "plain");
    }

    #[test]
    fn test_extract_value_removes_greedy_hint() {
        assert_eq!(extract_value("<b>Bern</b> <i>BE</i> x <i>CH</i>"), "Bern");
    }
}
