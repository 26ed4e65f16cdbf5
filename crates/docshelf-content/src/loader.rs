//! Assembling versions into loaded content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use docshelf_sidebars::{
    Sidebars, create_order, first_doc_id, load_sidebars, map_doc_ids, referenced_doc_ids,
};

use crate::config::SiteContext;
use crate::docs::{DocMetadata, DocNavLink, process_doc_metadata, read_version_docs};
use crate::error::{ContentError, Result};
use crate::options::PluginOptions;
use crate::versions::{VersionMetadata, read_versions_metadata};

/// Maps doc sources (`@site/...` aliases) to permalinks, across versions.
pub type SourceToPermalink = BTreeMap<String, String>;

/// One fully loaded version: metadata plus docs and navigation wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedVersion {
    #[serde(flatten)]
    pub metadata: VersionMetadata,
    /// Unversioned id of the doc a version link should land on.
    pub main_doc_id: String,
    /// Sorted by id.
    pub docs: Vec<DocMetadata>,
    pub sidebars: Sidebars,
    pub permalink_to_sidebar: BTreeMap<String, String>,
}

/// Everything an instance loads, versions in resolution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedContent {
    pub loaded_versions: Vec<LoadedVersion>,
}

fn main_doc_id(docs: &[DocMetadata], sidebars: &Sidebars) -> Option<String> {
    if let Some(home) = docs.iter().find(|doc| doc.is_docs_home_page) {
        return Some(home.unversioned_id.clone());
    }
    if let Some(first) = first_doc_id(sidebars)
        && let Some(doc) = docs.iter().find(|doc| doc.id == first)
    {
        return Some(doc.unversioned_id.clone());
    }
    docs.first().map(|doc| doc.unversioned_id.clone())
}

/// Load one version: docs, sidebars, ordering, and navigation.
///
/// # Errors
///
/// Returns an error when the version has no docs, a doc fails metadata
/// processing, two docs share an id or permalink, the sidebars file is
/// malformed, or a sidebar references an unknown doc id.
pub fn load_version(
    site: &SiteContext,
    options: &PluginOptions,
    version: &VersionMetadata,
) -> Result<LoadedVersion> {
    let files = read_version_docs(site, options, version)?;
    if files.is_empty() {
        return Err(ContentError::Version(format!(
            "no docs found for version {:?} under {}",
            version.version_name,
            version.content_paths.content_path.display()
        )));
    }

    let mut docs = files
        .iter()
        .map(|file| process_doc_metadata(site, options, version, file))
        .collect::<Result<Vec<_>>>()?;
    docs.sort_by(|a, b| a.id.cmp(&b.id));

    for pair in docs.windows(2) {
        if pair[0].id == pair[1].id {
            return Err(ContentError::Doc {
                source_path: pair[1].source.clone(),
                message: format!(
                    "duplicate doc id {:?}, also produced by {}",
                    pair[1].id, pair[0].source
                ),
            });
        }
    }
    let mut permalinks: BTreeMap<&str, &str> = BTreeMap::new();
    for doc in &docs {
        if let Some(existing) = permalinks.insert(&doc.permalink, &doc.source) {
            return Err(ContentError::Doc {
                source_path: doc.source.clone(),
                message: format!(
                    "permalink {:?} already used by {existing}",
                    doc.permalink
                ),
            });
        }
    }

    let raw_sidebars = load_sidebars(&version.sidebar_file_path)?;

    // sidebar entries may use either the versioned or the unversioned id
    let mut canonical: BTreeMap<String, String> = BTreeMap::new();
    for doc in &docs {
        canonical.insert(doc.id.clone(), doc.id.clone());
    }
    for doc in &docs {
        canonical
            .entry(doc.unversioned_id.clone())
            .or_insert_with(|| doc.id.clone());
    }
    for raw in referenced_doc_ids(&raw_sidebars) {
        if !canonical.contains_key(&raw) {
            return Err(ContentError::Version(format!(
                "invalid sidebars file {}: unknown document id {raw:?}",
                version.sidebar_file_path.display()
            )));
        }
    }
    let sidebars = map_doc_ids(&raw_sidebars, &|raw| {
        canonical
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    });

    let order = create_order(&sidebars);
    let nav_targets: BTreeMap<String, DocNavLink> = docs
        .iter()
        .map(|doc| {
            (
                doc.id.clone(),
                DocNavLink {
                    title: doc.title.clone(),
                    permalink: doc.permalink.clone(),
                },
            )
        })
        .collect();
    for doc in &mut docs {
        if let Some(order_meta) = order.get(&doc.id) {
            doc.sidebar.clone_from(&order_meta.sidebar);
            doc.previous = order_meta
                .previous
                .as_ref()
                .and_then(|id| nav_targets.get(id).cloned());
            doc.next = order_meta
                .next
                .as_ref()
                .and_then(|id| nav_targets.get(id).cloned());
        }
    }

    let permalink_to_sidebar = docs
        .iter()
        .filter_map(|doc| {
            doc.sidebar
                .as_ref()
                .map(|sidebar| (doc.permalink.clone(), sidebar.clone()))
        })
        .collect();

    let main_doc_id = main_doc_id(&docs, &sidebars).ok_or_else(|| {
        ContentError::Version(format!("version {:?} has no docs", version.version_name))
    })?;

    tracing::info!(
        "loaded version {} ({} docs)",
        version.version_name,
        docs.len()
    );
    Ok(LoadedVersion {
        metadata: version.clone(),
        main_doc_id,
        docs,
        sidebars,
        permalink_to_sidebar,
    })
}

/// Load every version of a docs instance.
///
/// # Errors
///
/// Returns an error when the options are invalid, version resolution
/// fails, or any version fails to load.
pub fn load_content(site: &SiteContext, options: &PluginOptions) -> Result<LoadedContent> {
    options.validate()?;
    let versions = read_versions_metadata(site, options)?;
    let loaded_versions = versions
        .iter()
        .map(|version| load_version(site, options, version))
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(
        "instance {} loaded {} version(s)",
        options.id,
        loaded_versions.len()
    );
    Ok(LoadedContent { loaded_versions })
}

/// Index every loaded doc's permalink by its source alias.
#[must_use]
pub fn source_to_permalink(content: &LoadedContent) -> SourceToPermalink {
    content
        .loaded_versions
        .iter()
        .flat_map(|version| version.docs.iter())
        .map(|doc| (doc.source.clone(), doc.permalink.clone()))
        .collect()
}
