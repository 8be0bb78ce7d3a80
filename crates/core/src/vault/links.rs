//! Reference extraction from note text.
//!
//! Two forms are recognised:
//! - wikilinks: `[[target]]` or `[[target|alias]]`
//! - markdown links: `[label](target)`, except `http://` and `https://` targets
//!
//! Targets are normalized by stripping a leading `./` and a trailing `.md`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // [[target]] or [[target|alias]]
    Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").expect("wikilink regex is valid")
});

static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // [label](target)
    Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("markdown link regex is valid")
});

/// Extract the set of normalized link targets from `text`.
///
/// Never fails: malformed fragments simply produce no match.
pub fn extract_links(text: &str) -> BTreeSet<String> {
    let wiki = WIKILINK_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str());

    let markdown = MARKDOWN_LINK_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(2))
        .map(|m| m.as_str())
        .filter(|url| !is_external(url));

    wiki.chain(markdown)
        .map(normalize_target)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip one leading `./` and one trailing `.md` from a raw target.
pub fn normalize_target(raw: &str) -> &str {
    let target = raw.strip_prefix("./").unwrap_or(raw);
    target.strip_suffix(".md").unwrap_or(target)
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_wikilink_and_markdown_link() {
        let links = extract_links("See [[Note A]] and [guide](./g.md)");
        assert_eq!(links, set(&["Note A", "g"]));
    }

    #[test]
    fn test_external_links_skipped() {
        assert!(extract_links("[ext](https://x.com)").is_empty());
        assert!(extract_links("[ext](http://x.com/page.md)").is_empty());
    }

    #[test]
    fn test_no_links() {
        assert!(extract_links("").is_empty());
        assert!(extract_links("plain text with [brackets] and (parens)").is_empty());
    }

    #[rstest]
    #[case("[[target|alias]]", "target")]
    #[case("[[folder/Note]]", "folder/Note")]
    #[case("[[Q&A - draft]]", "Q&A - draft")]
    #[case("[[note.md]]", "note")]
    #[case("[[./local]]", "local")]
    #[case("[x](../up/other.md)", "../up/other")]
    #[case("[x](nested/path/file.md)", "nested/path/file")]
    #[case("[x](note#section)", "note#section")]
    fn test_target_forms(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(extract_links(text), set(&[expected]));
    }

    #[test]
    fn test_duplicates_collapse() {
        let links = extract_links("[[a]] [[a|again]] [a](a.md) [a](./a)");
        assert_eq!(links, set(&["a"]));
    }

    #[test]
    fn test_malformed_fragments_yield_nothing() {
        assert!(extract_links("[[unclosed and [label](").is_empty());
        assert!(extract_links("[[]] [empty]()").is_empty());
    }

    #[test]
    fn test_empty_after_normalization_dropped() {
        assert!(extract_links("[x](./.md)").is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "[[One]] then [two](./two.md) and [[three|3]]";
        assert_eq!(extract_links(text), extract_links(text));
    }

    #[test]
    fn test_normalize_strips_once() {
        assert_eq!(normalize_target("././a.md.md"), "./a.md");
        assert_eq!(normalize_target("a"), "a");
    }
}
