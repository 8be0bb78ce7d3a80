//! Link target resolution against a fixed set of node paths.

use std::collections::{BTreeMap, BTreeSet};

/// Lookup tables over the node paths of one resolution pass.
pub(crate) struct Resolver<'a> {
    paths: BTreeSet<&'a str>,
    /// File name -> paths ending in that file name.
    by_name: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let paths: BTreeSet<&str> = paths.into_iter().collect();
        let mut by_name: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for &path in &paths {
            let name = path.rsplit('/').next().unwrap_or(path);
            by_name.entry(name).or_default().insert(path);
        }
        Self { paths, by_name }
    }

    /// Resolve `target` as written in the document at `source`.
    pub(crate) fn resolve(&self, source: &str, target: &str) -> Option<String> {
        let target = strip_fragment(target);
        if target.is_empty() {
            return None;
        }

        if target.starts_with("./") || target.starts_with("../") {
            let joined = join_relative(source, target)?;
            return self.exact(&joined);
        }

        let target = target.trim_start_matches('/');
        self.exact(target).or_else(|| self.by_suffix(target))
    }

    fn exact(&self, candidate: &str) -> Option<String> {
        if self.paths.contains(candidate) {
            return Some(candidate.to_string());
        }
        let with_ext = format!("{candidate}.md");
        self.paths.contains(with_ext.as_str()).then_some(with_ext)
    }

    fn by_suffix(&self, target: &str) -> Option<String> {
        let name = target.rsplit('/').next().unwrap_or(target);
        let suffix = format!("/{target}");
        let suffix_md = format!("/{target}.md");

        [name.to_string(), format!("{name}.md")]
            .iter()
            .filter_map(|n| self.by_name.get(n.as_str()))
            .flatten()
            .filter(|p| p.ends_with(&suffix) || p.ends_with(&suffix_md))
            .min()
            .map(|p| (*p).to_string())
    }
}

/// Drop a `#heading` anchor and any `.md` left in front of it.
fn strip_fragment(target: &str) -> &str {
    let base = target.split('#').next().unwrap_or(target);
    base.strip_suffix(".md").unwrap_or(base)
}

/// Join a relative target onto the source document's directory.
///
/// Returns `None` when the path climbs above the vault root.
fn join_relative(source: &str, target: &str) -> Option<String> {
    let mut parts: Vec<&str> = source.split('/').collect();
    parts.pop();

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    Some(parts.join("/"))
}
