//! Reading doc sources and deriving per-document metadata.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use docshelf_markdown::{
    FrontMatter, aliased_site_path, content_excerpt, content_title, normalize_url, posix_path,
    resolve_slug, split_front_matter,
};

use crate::CURRENT_VERSION_NAME;
use crate::config::SiteContext;
use crate::error::{ContentError, Result};
use crate::last_update::{LastUpdateData, read_last_update};
use crate::options::{EditUrl, EditUrlParams, PluginOptions};
use crate::versions::VersionMetadata;

/// A located document before metadata processing.
#[derive(Debug, Clone)]
pub struct DocFile {
    /// Content root the file was found under (may be the localized root).
    pub content_path: PathBuf,
    pub file_path: PathBuf,
    /// Site-aliased posix id, `@site/<relative-to-site-dir>`.
    pub source: String,
    pub content: String,
    pub last_update: LastUpdateData,
}

/// Link target for previous/next navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNavLink {
    pub title: String,
    pub permalink: String,
}

/// Full metadata of one processed doc. The navigation fields (`sidebar`,
/// `previous`, `next`) are filled in once sidebar order is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocMetadata {
    /// Version name the doc belongs to.
    pub version: String,
    pub unversioned_id: String,
    /// `version-<name>/<unversioned_id>` outside the current version.
    pub id: String,
    pub is_docs_home_page: bool,
    pub title: String,
    pub description: String,
    pub source: String,
    pub slug: String,
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// Deliberately snake_case in JSON, unlike every other key.
    #[serde(
        rename = "sidebar_label",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sidebar_label: Option<String>,
    #[serde(flatten)]
    pub last_update: LastUpdateData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<DocNavLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<DocNavLink>,
    #[serde(default, skip_serializing_if = "FrontMatter::is_empty")]
    pub front_matter: FrontMatter,
}

fn compile_patterns(include: &[String]) -> Result<Vec<glob::Pattern>> {
    include
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|source| ContentError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn walk_content_dir(root: &Path, patterns: &[glob::Pattern]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if patterns.iter().any(|p| p.matches_path(rel)) {
            files.push(rel.to_path_buf());
        }
    }
    files
}

fn read_doc_file(
    site: &SiteContext,
    options: &PluginOptions,
    root: &Path,
    rel: &Path,
) -> Result<DocFile> {
    let file_path = root.join(rel);
    let content = std::fs::read_to_string(&file_path)?;
    let source =
        aliased_site_path(&file_path, &site.site_dir).unwrap_or_else(|| posix_path(&file_path));
    let last_update = read_last_update(
        &file_path,
        options.metadata.show_last_update_time,
        options.metadata.show_last_update_author,
    );
    Ok(DocFile {
        content_path: root.to_path_buf(),
        file_path,
        source,
        content,
        last_update,
    })
}

/// Read every doc source of a version. A file present in both the main
/// and the localized tree is read from the localized one.
///
/// # Errors
///
/// Returns an error for an invalid include pattern or an unreadable file.
pub fn read_version_docs(
    site: &SiteContext,
    options: &PluginOptions,
    version: &VersionMetadata,
) -> Result<Vec<DocFile>> {
    let patterns = compile_patterns(&options.include)?;

    // later roots overwrite, so the localized tree wins per file
    let mut sources: BTreeMap<PathBuf, &Path> = BTreeMap::new();
    for root in [
        &version.content_paths.content_path,
        &version.content_paths.content_path_localized,
    ] {
        if !root.is_dir() {
            continue;
        }
        for rel in walk_content_dir(root, &patterns) {
            sources.insert(rel, root.as_path());
        }
    }

    let mut docs = sources
        .into_iter()
        .map(|(rel, root)| read_doc_file(site, options, root, &rel))
        .collect::<Result<Vec<_>>>()?;
    docs.sort_by(|a, b| a.source.cmp(&b.source));
    tracing::debug!(
        "read {} docs for version {}",
        docs.len(),
        version.version_name
    );
    Ok(docs)
}

fn doc_edit_url(
    site: &SiteContext,
    options: &PluginOptions,
    version: &VersionMetadata,
    doc: &DocFile,
    rel_posix: &str,
    permalink: &str,
) -> Option<String> {
    match options.metadata.edit_url.as_ref()? {
        EditUrl::Url(_) => {
            let localized = options.metadata.edit_localized_files
                && doc.content_path == version.content_paths.content_path_localized;
            let base = if localized {
                version.version_edit_url_localized.as_ref()
            } else {
                version.version_edit_url.as_ref()
            };
            base.map(|base| normalize_url(&[base, rel_posix]))
        }
        EditUrl::Function(callback) => {
            let docs_dir = &version.content_paths.content_path;
            let version_docs_dir_path = docs_dir
                .strip_prefix(&site.site_dir)
                .map_or_else(|_| posix_path(docs_dir), posix_path);
            callback(&EditUrlParams {
                version: version.version_name.clone(),
                version_docs_dir_path,
                doc_path: rel_posix.to_string(),
                permalink: permalink.to_string(),
                locale: site.locale.clone(),
            })
        }
    }
}

/// Derive a doc's metadata from its raw file.
///
/// # Errors
///
/// Returns an error for unparseable front matter, a front matter id
/// containing `/`, or a home-page doc declaring a front matter slug.
pub fn process_doc_metadata(
    site: &SiteContext,
    options: &PluginOptions,
    version: &VersionMetadata,
    doc: &DocFile,
) -> Result<DocMetadata> {
    let doc_err = |message: String| ContentError::Doc {
        source_path: doc.source.clone(),
        message,
    };

    let rel = doc.file_path.strip_prefix(&doc.content_path).map_err(|_| {
        doc_err(format!(
            "file is outside its content root {}",
            doc.content_path.display()
        ))
    })?;
    let (front_matter, body) =
        split_front_matter(&doc.content).map_err(|e| doc_err(e.to_string()))?;

    let dir_name = match rel.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => posix_path(parent),
        _ => ".".to_string(),
    };
    let file_stem = rel
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| doc_err("file has no name".to_string()))?;

    let base_id = match &front_matter.id {
        Some(id) if id.contains('/') => {
            return Err(doc_err(format!("document id {id:?} cannot include a slash")));
        }
        Some(id) => id.clone(),
        None => file_stem,
    };
    let unversioned_id = if dir_name == "." {
        base_id.clone()
    } else {
        format!("{dir_name}/{base_id}")
    };
    let id = if version.version_name == CURRENT_VERSION_NAME {
        unversioned_id.clone()
    } else {
        format!("version-{}/{unversioned_id}", version.version_name)
    };

    let is_docs_home_page =
        options.metadata.home_page_id.as_deref() == Some(unversioned_id.as_str());
    let slug = if is_docs_home_page {
        if front_matter.slug.is_some() {
            return Err(doc_err(
                "the docs home page is not allowed to set a front matter slug".to_string(),
            ));
        }
        "/".to_string()
    } else {
        let base_slug = front_matter.slug.clone().unwrap_or_else(|| base_id.clone());
        resolve_slug(&dir_name, &base_slug)
    };
    let permalink = normalize_url(&[&version.version_path, &slug]);

    let title = front_matter
        .title
        .clone()
        .or_else(|| content_title(body))
        .unwrap_or_else(|| base_id.clone());
    let description = front_matter
        .description
        .clone()
        .or_else(|| content_excerpt(body))
        .unwrap_or_default();

    let rel_posix = posix_path(rel);
    let edit_url = doc_edit_url(site, options, version, doc, &rel_posix, &permalink);

    Ok(DocMetadata {
        version: version.version_name.clone(),
        unversioned_id,
        id,
        is_docs_home_page,
        title,
        description,
        source: doc.source.clone(),
        slug,
        permalink,
        edit_url,
        sidebar_label: front_matter.sidebar_label.clone(),
        last_update: doc.last_update.clone(),
        sidebar: None,
        previous: None,
        next: None,
        front_matter,
    })
}
