//! Global data projection for client-side consumption.

use serde::{Deserialize, Serialize};

use docshelf_markdown::{FrontMatter, normalize_url};

use crate::config::SiteContext;
use crate::docs::DocMetadata;
use crate::loader::{LoadedContent, LoadedVersion};
use crate::options::PluginOptions;

/// Client-facing projection of one doc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDoc {
    /// Unversioned id, stable across versions.
    pub id: String,
    /// The doc's permalink.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_matter: Option<FrontMatter>,
}

/// Client-facing projection of one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVersion {
    pub name: String,
    pub label: String,
    pub is_last: bool,
    /// The version's routed URL prefix.
    pub path: String,
    pub main_doc_id: String,
    pub docs: Vec<GlobalDoc>,
}

/// Everything one docs instance exposes to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalPluginData {
    /// Instance base path, `normalize_url([base_url, route_base_path])`.
    pub path: String,
    pub versions: Vec<GlobalVersion>,
}

#[must_use]
pub fn to_global_doc(doc: &DocMetadata, include_front_matter: bool) -> GlobalDoc {
    GlobalDoc {
        id: doc.unversioned_id.clone(),
        path: doc.permalink.clone(),
        sidebar: doc.sidebar.clone(),
        front_matter: include_front_matter.then(|| doc.front_matter.clone()),
    }
}

#[must_use]
pub fn to_global_version(version: &LoadedVersion, include_front_matter: bool) -> GlobalVersion {
    GlobalVersion {
        name: version.metadata.version_name.clone(),
        label: version.metadata.version_label.clone(),
        is_last: version.metadata.is_last,
        path: version.metadata.version_path.clone(),
        main_doc_id: version.main_doc_id.clone(),
        docs: version
            .docs
            .iter()
            .map(|doc| to_global_doc(doc, include_front_matter))
            .collect(),
    }
}

/// Project loaded content into the client global payload.
#[must_use]
pub fn to_global_data(
    site: &SiteContext,
    options: &PluginOptions,
    content: &LoadedContent,
) -> GlobalPluginData {
    GlobalPluginData {
        path: normalize_url(&[&site.base_url, &options.metadata.route_base_path]),
        versions: content
            .loaded_versions
            .iter()
            .map(|version| {
                to_global_version(version, options.metadata.include_front_matter_in_globals)
            })
            .collect(),
    }
}
