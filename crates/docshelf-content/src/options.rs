//! Per-instance options.
//!
//! A docs instance is configured by [`PluginOptions`], a merge of smaller
//! option groups. The groups deserialize flattened, so a `[[docs]]` table in
//! the site config lists every field at one level.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_INSTANCE_ID;
use crate::error::{ContentError, Result};

/// Inputs handed to an edit-URL callback, one doc at a time.
#[derive(Debug, Clone)]
pub struct EditUrlParams {
    pub version: String,
    /// Version docs directory, posix, relative to the site dir.
    pub version_docs_dir_path: String,
    /// Doc file path, posix, relative to the content root it was read from.
    pub doc_path: String,
    pub permalink: String,
    pub locale: String,
}

/// Where "edit this page" links point: a base URL joined with the doc path,
/// or a callback computing the target per doc. Only the URL form can appear
/// in a config file; callbacks are installed by library embedders.
#[derive(Clone)]
pub enum EditUrl {
    Url(String),
    Function(Arc<dyn Fn(&EditUrlParams) -> Option<String> + Send + Sync>),
}

impl fmt::Debug for EditUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for EditUrl {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::Url(String::deserialize(deserializer)?))
    }
}

impl Serialize for EditUrl {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Url(url) => serializer.serialize_str(url),
            Self::Function(_) => Err(serde::ser::Error::custom(
                "edit URL callbacks cannot be serialized",
            )),
        }
    }
}

fn default_route_base_path() -> String {
    "docs".to_string()
}

/// Options shaping per-doc metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataOptions {
    #[serde(default = "default_route_base_path")]
    pub route_base_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<EditUrl>,
    #[serde(default)]
    pub edit_current_version: bool,
    #[serde(default)]
    pub edit_localized_files: bool,
    #[serde(default)]
    pub show_last_update_time: bool,
    #[serde(default)]
    pub show_last_update_author: bool,
    #[serde(default)]
    pub include_front_matter_in_globals: bool,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        Self {
            route_base_path: default_route_base_path(),
            home_page_id: None,
            edit_url: None,
            edit_current_version: false,
            edit_localized_files: false,
            show_last_update_time: false,
            show_last_update_author: false,
            include_front_matter_in_globals: false,
        }
    }
}

fn default_path() -> String {
    "docs".to_string()
}

fn default_sidebar_path() -> String {
    "sidebars.json".to_string()
}

/// Filesystem locations of the working docs tree, relative to the site dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathOptions {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_sidebar_path")]
    pub sidebar_path: String,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            path: default_path(),
            sidebar_path: default_sidebar_path(),
        }
    }
}

/// Label and URL path overrides for a single version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Version selection and per-version overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions: BTreeMap<String, VersionOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_include_versions: Option<Vec<String>>,
}

fn default_instance_id() -> String {
    DEFAULT_INSTANCE_ID.to_string()
}

fn default_include() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.mdx".to_string()]
}

fn default_doc_layout_component() -> String {
    "@theme/DocPage".to_string()
}

fn default_doc_item_component() -> String {
    "@theme/DocItem".to_string()
}

fn default_true() -> bool {
    true
}

/// Full configuration of one docs instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginOptions {
    #[serde(default = "default_instance_id")]
    pub id: String,
    #[serde(flatten)]
    pub metadata: MetadataOptions,
    #[serde(flatten)]
    pub paths: PathOptions,
    #[serde(flatten)]
    pub versions: VersionsOptions,
    /// Glob patterns selecting doc files, relative to the content root.
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    /// Opaque layout component identifier for version root routes.
    #[serde(default = "default_doc_layout_component")]
    pub doc_layout_component: String,
    /// Opaque component identifier for per-doc routes.
    #[serde(default = "default_doc_item_component")]
    pub doc_item_component: String,
    /// Passed through untouched to downstream renderers.
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub admonitions: toml::Table,
    /// Skip the version registry entirely; only `current` loads.
    #[serde(default)]
    pub disable_versioning: bool,
    /// Deprecated alias: `true` behaves as `include_current_version = false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_next_version_docs: Option<bool>,
    #[serde(default = "default_true")]
    pub include_current_version: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            id: default_instance_id(),
            metadata: MetadataOptions::default(),
            paths: PathOptions::default(),
            versions: VersionsOptions::default(),
            include: default_include(),
            doc_layout_component: default_doc_layout_component(),
            doc_item_component: default_doc_item_component(),
            admonitions: toml::Table::new(),
            disable_versioning: false,
            exclude_next_version_docs: None,
            include_current_version: true,
        }
    }
}

impl PluginOptions {
    /// Check structural validity of the options.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or non `[A-Za-z0-9_-]` instance id, or
    /// when `path`, `route_base_path`, or `include` is empty.
    pub fn validate(&self) -> Result<()> {
        let id_ok = !self.id.is_empty()
            && self
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !id_ok {
            return Err(ContentError::Options(format!(
                "invalid instance id {:?}",
                self.id
            )));
        }
        if self.paths.path.is_empty() {
            return Err(ContentError::Options("path must not be empty".to_string()));
        }
        if self.metadata.route_base_path.is_empty() {
            return Err(ContentError::Options(
                "route_base_path must not be empty".to_string(),
            ));
        }
        if self.include.is_empty() {
            return Err(ContentError::Options(
                "include must list at least one pattern".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the working tree loads as the `current` version, honoring
    /// the deprecated `exclude_next_version_docs` alias.
    #[must_use]
    pub fn effective_include_current_version(&self) -> bool {
        match self.exclude_next_version_docs {
            Some(true) => false,
            Some(false) | None => self.include_current_version,
        }
    }
}
