//! Link rewriting glue between loaded content and the markdown crate.

use std::path::{Path, PathBuf};

use docshelf_markdown::{BrokenMarkdownLink, LinkRewriteContext, rewrite_markdown_links};

use crate::error::{ContentError, Result};
use crate::loader::SourceToPermalink;
use crate::versions::VersionMetadata;

/// Everything link resolution needs, borrowed from the loaded site.
pub struct DocsMarkdownOptions<'a> {
    pub site_dir: &'a Path,
    pub versions: &'a [VersionMetadata],
    pub source_to_permalink: &'a SourceToPermalink,
}

/// The version owning `file_path`, by content root prefix.
#[must_use]
pub fn version_of_file<'a>(
    versions: &'a [VersionMetadata],
    file_path: &Path,
) -> Option<&'a VersionMetadata> {
    versions.iter().find(|version| {
        file_path.starts_with(&version.content_paths.content_path)
            || file_path.starts_with(&version.content_paths.content_path_localized)
    })
}

/// Rewrite relative doc links in one file into permalinks.
///
/// Misses are reported through `on_broken`; the policy (ignore, warn,
/// fail the build) is the caller's to apply.
pub fn linkify_doc(
    file_path: &Path,
    content: &str,
    options: &DocsMarkdownOptions<'_>,
    on_broken: impl FnMut(&BrokenMarkdownLink<'_, VersionMetadata>),
) -> Result<String> {
    let Some(version) = version_of_file(options.versions, file_path) else {
        return Err(ContentError::Version(format!(
            "no version owns doc {}",
            file_path.display()
        )));
    };
    let ctx = LinkRewriteContext {
        site_dir: options.site_dir,
        version,
        content_paths: &version.content_paths,
        source_to_permalink: options.source_to_permalink,
    };
    Ok(rewrite_markdown_links(file_path, content, &ctx, on_broken))
}

/// Resolve an `@site/`-aliased source back to an absolute path.
#[must_use]
pub fn source_file_path(site_dir: &Path, source: &str) -> PathBuf {
    source
        .strip_prefix("@site/")
        .map_or_else(|| PathBuf::from(source), |rel| site_dir.join(rel))
}
