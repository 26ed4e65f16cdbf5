//! Rewriting of relative `.md`/`.mdx` links into site permalinks.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::urls::aliased_site_path;

/// Matches the target of an inline link `](target)` or a reference
/// definition `]: target` when the target ends in `.md`/`.mdx`. Absolute
/// URLs are filtered in code since the target charset admits them.
static DOC_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:\]\(|\]:\s*)([^'")\]\s>]+\.mdx?)"#).unwrap());

/// Filesystem roots a version's docs are read from. The localized root
/// takes precedence per file when the file exists there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPaths {
    pub content_path: PathBuf,
    pub content_path_localized: PathBuf,
}

/// A relative doc link whose target resolved to no known document.
#[derive(Debug)]
pub struct BrokenMarkdownLink<'a, T> {
    pub file_path: &'a Path,
    pub version: &'a T,
    pub link: &'a str,
}

/// Everything link rewriting needs besides the document itself.
#[derive(Debug)]
pub struct LinkRewriteContext<'a, T> {
    pub site_dir: &'a Path,
    pub version: &'a T,
    pub content_paths: &'a ContentPaths,
    pub source_to_permalink: &'a BTreeMap<String, String>,
}

/// Rewrite relative doc links in `content` into permalinks.
///
/// Each candidate target is resolved against the file's directory and
/// against the version content roots, then looked up by its `@site/...`
/// alias. Targets that resolve are replaced in place; the rest are
/// reported through `on_broken` and left untouched.
pub fn rewrite_markdown_links<T>(
    file_path: &Path,
    content: &str,
    ctx: &LinkRewriteContext<'_, T>,
    mut on_broken: impl FnMut(&BrokenMarkdownLink<'_, T>),
) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for caps in DOC_LINK_RE.captures_iter(content) {
        let Some(target) = caps.get(1) else { continue };
        let link = target.as_str();
        out.push_str(&content[last..target.start()]);
        last = target.end();

        if url::Url::parse(link).is_ok() {
            out.push_str(link);
            continue;
        }

        match resolve_link(file_path, link, ctx) {
            Some(permalink) => out.push_str(&permalink),
            None => {
                on_broken(&BrokenMarkdownLink {
                    file_path,
                    version: ctx.version,
                    link,
                });
                out.push_str(link);
            }
        }
    }

    out.push_str(&content[last..]);
    out
}

fn resolve_link<T>(file_path: &Path, link: &str, ctx: &LinkRewriteContext<'_, T>) -> Option<String> {
    let file_dir = file_path.parent()?;
    let bases = [
        file_dir,
        ctx.content_paths.content_path.as_path(),
        ctx.content_paths.content_path_localized.as_path(),
    ];
    bases.iter().find_map(|base| {
        let candidate = normalize_components(&base.join(link));
        let alias = aliased_site_path(&candidate, ctx.site_dir)?;
        ctx.source_to_permalink.get(&alias).cloned()
    })
}

/// Lexical `.`/`..` resolution; the target need not exist on disk.
fn normalize_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}
