//! Note content extraction: title and links.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::links::extract_links;

/// Extracted information from a note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedNote {
    /// Note title (first heading, or filename).
    pub title: String,
    /// Normalized link targets found in the document.
    pub links: BTreeSet<String>,
}

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    // ATX heading: up to 3 spaces, 1-6 hashes, whitespace, text
    Regex::new(r"^ {0,3}#{1,6}[ \t]+(.+)$").expect("heading regex is valid")
});

/// Extract note information from file content.
pub fn extract_note(content: &str, file_path: &Path) -> ExtractedNote {
    ExtractedNote { title: extract_title(content, file_path), links: extract_links(content) }
}

/// Title from the first heading line, falling back to the filename stem.
pub fn extract_title(content: &str, file_path: &Path) -> String {
    for line in content.lines() {
        if let Some(cap) = HEADING_RE.captures(line) {
            let heading = cap[1].trim().trim_end_matches('#').trim_end();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }

    file_path.file_stem().and_then(|s| s.to_str()).unwrap_or("Untitled").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_from_heading() {
        let content = "# First Heading\n\nContent here.";
        assert_eq!(extract_title(content, Path::new("file.md")), "First Heading");
    }

    #[test]
    fn test_extract_title_from_later_heading() {
        let content = "Intro paragraph.\n\n## Section Two ##\n# Later";
        assert_eq!(extract_title(content, Path::new("file.md")), "Section Two");
    }

    #[test]
    fn test_hashtag_is_not_a_heading() {
        let content = "#tag line\nno heading here";
        assert_eq!(extract_title(content, Path::new("dir/my-note.md")), "my-note");
    }

    #[test]
    fn test_extract_title_from_filename() {
        let content = "No heading.";
        assert_eq!(extract_title(content, Path::new("my-note.md")), "my-note");
    }

    #[test]
    fn test_extract_note_collects_links() {
        let content = "# Note 1\n\nLinks to [[note2]] and [three](./sub/three.md).";
        let note = extract_note(content, Path::new("note1.md"));

        assert_eq!(note.title, "Note 1");
        assert_eq!(
            note.links.into_iter().collect::<Vec<_>>(),
            vec!["note2".to_string(), "sub/three".to_string()]
        );
    }
}
