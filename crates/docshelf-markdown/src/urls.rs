//! URL-path and site-path helpers shared by the docs pipeline.

use std::path::Path;

/// Join URL segments into a normalized path.
///
/// Empty segments are dropped, duplicate slashes collapse, a protocol
/// prefix (`https://`) is left untouched, and the result carries no
/// trailing slash. Joining nothing (or only `/`) yields `/`.
#[must_use]
pub fn normalize_url(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let (protocol, rest) = match joined.find("://") {
        Some(idx) => joined.split_at(idx + 3),
        None => ("", joined.as_str()),
    };

    let collapsed = rest
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let mut out = String::with_capacity(joined.len());
    out.push_str(protocol);
    if protocol.is_empty() && rest.starts_with('/') {
        out.push('/');
    }
    out.push_str(&collapsed);

    if out.is_empty() { "/".to_string() } else { out }
}

/// Forward-slash rendering of a path, for ids and URLs.
#[must_use]
pub fn posix_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Stable site-relative alias for a file, `@site/<relative path>`.
///
/// Returns `None` when the file does not live under the site directory.
#[must_use]
pub fn aliased_site_path(file_path: &Path, site_dir: &Path) -> Option<String> {
    let rel = file_path.strip_prefix(site_dir).ok()?;
    Some(format!("@site/{}", posix_path(rel)))
}

/// Resolve a doc slug from its directory and the front-matter or id base.
///
/// A base starting with `/` is absolute and ignores the directory; the
/// root directory is spelled `.`.
#[must_use]
pub fn resolve_slug(dir_name: &str, base_slug: &str) -> String {
    if base_slug.starts_with('/') {
        return normalize_url(&["/", base_slug]);
    }
    if dir_name == "." {
        normalize_url(&["/", base_slug])
    } else {
        normalize_url(&["/", dir_name, base_slug])
    }
}
