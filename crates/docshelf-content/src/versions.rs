//! Version discovery and metadata.
//!
//! An instance's versions are the working `current` tree plus the names
//! listed newest-first in its `versions.json` registry. Snapshots live
//! under `versioned_docs/` and `versioned_sidebars/`; non-default
//! instances prefix all three locations with `<id>_`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use docshelf_markdown::{ContentPaths, normalize_url, posix_path};

use crate::config::SiteContext;
use crate::error::{ContentError, Result};
use crate::options::{EditUrl, PluginOptions};
use crate::{CURRENT_VERSION_NAME, DEFAULT_INSTANCE_ID};

/// Label of the working version when none is configured.
pub const CURRENT_VERSION_LABEL: &str = "Next";

/// URL path part of the working version when it is not the latest.
pub const CURRENT_VERSION_PATH_PART: &str = "next";

/// Identity and routing for one resolved documentation version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadata {
    pub version_name: String,
    pub version_label: String,
    /// Routed URL prefix, e.g. `/docs/1.0.0`.
    pub version_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_edit_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_edit_url_localized: Option<String>,
    /// Exactly one version per instance is the latest.
    pub is_last: bool,
    #[serde(flatten)]
    pub content_paths: ContentPaths,
    pub sidebar_file_path: PathBuf,
    /// `Some(-1)` for the version routed at the bare base path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_priority: Option<i32>,
}

fn prefixed(site_dir: &Path, instance_id: &str, name: &str) -> PathBuf {
    if instance_id == DEFAULT_INSTANCE_ID {
        site_dir.join(name)
    } else {
        site_dir.join(format!("{instance_id}_{name}"))
    }
}

/// Registry file listing released version names, newest first.
#[must_use]
pub fn versions_file_path(site_dir: &Path, instance_id: &str) -> PathBuf {
    prefixed(site_dir, instance_id, "versions.json")
}

/// Root of the snapshotted docs trees.
#[must_use]
pub fn versioned_docs_dir(site_dir: &Path, instance_id: &str) -> PathBuf {
    prefixed(site_dir, instance_id, "versioned_docs")
}

/// Root of the snapshotted sidebars files.
#[must_use]
pub fn versioned_sidebars_dir(site_dir: &Path, instance_id: &str) -> PathBuf {
    prefixed(site_dir, instance_id, "versioned_sidebars")
}

/// Directory name of a released version under `versioned_docs`.
#[must_use]
pub fn version_dir_name(version_name: &str) -> String {
    format!("version-{version_name}")
}

fn localized_content_dir(site: &SiteContext, instance_id: &str, version_name: &str) -> PathBuf {
    let dir_name = if version_name == CURRENT_VERSION_NAME {
        CURRENT_VERSION_NAME.to_string()
    } else {
        version_dir_name(version_name)
    };
    site.site_dir
        .join("i18n")
        .join(&site.locale)
        .join(format!("docs-{instance_id}"))
        .join(dir_name)
}

fn read_version_names(site: &SiteContext, options: &PluginOptions) -> Result<Vec<String>> {
    let mut names = Vec::new();
    if options.effective_include_current_version() {
        names.push(CURRENT_VERSION_NAME.to_string());
    }
    if !options.disable_versioning {
        let registry = versions_file_path(&site.site_dir, &options.id);
        if registry.exists() {
            let raw = std::fs::read_to_string(&registry)?;
            let released: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
                ContentError::Version(format!(
                    "invalid versions file {}: {e}",
                    registry.display()
                ))
            })?;
            names.extend(released);
        }
    }

    let mut seen = BTreeSet::new();
    for name in &names {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(ContentError::Version(format!(
                "invalid version name {name:?}"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(ContentError::Version(format!(
                "duplicate version name {name:?}"
            )));
        }
    }
    Ok(names)
}

fn validate_version_refs(names: &[String], options: &PluginOptions) -> Result<()> {
    if let Some(last) = &options.versions.last_version
        && !names.contains(last)
    {
        return Err(ContentError::Version(format!(
            "last_version references unknown version {last:?}"
        )));
    }
    if let Some(only) = &options.versions.only_include_versions {
        for name in only {
            if !names.contains(name) {
                return Err(ContentError::Version(format!(
                    "only_include_versions references unknown version {name:?}"
                )));
            }
        }
        if let Some(last) = &options.versions.last_version
            && !only.contains(last)
        {
            return Err(ContentError::Version(format!(
                "last_version {last:?} is not in only_include_versions"
            )));
        }
    }
    for name in options.versions.versions.keys() {
        if !names.contains(name) {
            return Err(ContentError::Version(format!(
                "versions override references unknown version {name:?}"
            )));
        }
    }
    Ok(())
}

fn last_version_name(names: &[String], options: &PluginOptions) -> String {
    if let Some(last) = &options.versions.last_version {
        return last.clone();
    }
    names
        .iter()
        .find(|name| name.as_str() != CURRENT_VERSION_NAME)
        .cloned()
        .unwrap_or_else(|| CURRENT_VERSION_NAME.to_string())
}

fn default_path_part(name: &str, is_last: bool) -> String {
    if is_last {
        String::new()
    } else if name == CURRENT_VERSION_NAME {
        CURRENT_VERSION_PATH_PART.to_string()
    } else {
        name.to_string()
    }
}

fn edit_url_for_dir(base: &str, site_dir: &Path, dir: &Path) -> Option<String> {
    match dir.strip_prefix(site_dir) {
        Ok(rel) => Some(normalize_url(&[base, &posix_path(rel)])),
        Err(_) => {
            tracing::warn!(
                "cannot compute edit URL for {} outside the site dir",
                dir.display()
            );
            None
        }
    }
}

fn version_edit_urls(
    site: &SiteContext,
    options: &PluginOptions,
    content_paths: &ContentPaths,
) -> (Option<String>, Option<String>) {
    let Some(EditUrl::Url(base)) = &options.metadata.edit_url else {
        return (None, None);
    };
    // edit_current_version pins edit links to the working tree
    let (dir, dir_localized) = if options.metadata.edit_current_version {
        (
            site.site_dir.join(&options.paths.path),
            localized_content_dir(site, &options.id, CURRENT_VERSION_NAME),
        )
    } else {
        (
            content_paths.content_path.clone(),
            content_paths.content_path_localized.clone(),
        )
    };
    (
        edit_url_for_dir(base, &site.site_dir, &dir),
        edit_url_for_dir(base, &site.site_dir, &dir_localized),
    )
}

fn version_metadata(
    site: &SiteContext,
    options: &PluginOptions,
    name: &str,
    is_last: bool,
) -> Result<VersionMetadata> {
    let overrides = options.versions.versions.get(name);
    let version_label = overrides
        .and_then(|o| o.label.clone())
        .unwrap_or_else(|| {
            if name == CURRENT_VERSION_NAME {
                CURRENT_VERSION_LABEL.to_string()
            } else {
                name.to_string()
            }
        });
    let path_part = overrides
        .and_then(|o| o.path.clone())
        .unwrap_or_else(|| default_path_part(name, is_last));
    let version_path = normalize_url(&[
        &site.base_url,
        &options.metadata.route_base_path,
        &path_part,
    ]);
    let route_priority = path_part.is_empty().then_some(-1);

    let content_path = if name == CURRENT_VERSION_NAME {
        site.site_dir.join(&options.paths.path)
    } else {
        versioned_docs_dir(&site.site_dir, &options.id).join(version_dir_name(name))
    };
    if !content_path.is_dir() {
        return Err(ContentError::Version(format!(
            "docs directory for version {name:?} does not exist: {}",
            content_path.display()
        )));
    }
    let content_paths = ContentPaths {
        content_path,
        content_path_localized: localized_content_dir(site, &options.id, name),
    };

    let sidebar_file_path = if name == CURRENT_VERSION_NAME {
        site.site_dir.join(&options.paths.sidebar_path)
    } else {
        versioned_sidebars_dir(&site.site_dir, &options.id)
            .join(format!("version-{name}-sidebars.json"))
    };

    let (version_edit_url, version_edit_url_localized) =
        version_edit_urls(site, options, &content_paths);

    Ok(VersionMetadata {
        version_name: name.to_string(),
        version_label,
        version_path,
        version_edit_url,
        version_edit_url_localized,
        is_last,
        content_paths,
        sidebar_file_path,
        route_priority,
    })
}

/// Resolve every version of an instance, current first then registry order.
///
/// # Errors
///
/// Returns an error when the registry is malformed, a version name is
/// invalid or duplicated, an option references an unknown version, no
/// version remains to load, or a version's docs directory is missing.
pub fn read_versions_metadata(
    site: &SiteContext,
    options: &PluginOptions,
) -> Result<Vec<VersionMetadata>> {
    if options.exclude_next_version_docs.is_some() {
        tracing::warn!(
            "exclude_next_version_docs is deprecated, set include_current_version instead"
        );
    }
    let mut names = read_version_names(site, options)?;
    validate_version_refs(&names, options)?;
    if let Some(only) = &options.versions.only_include_versions {
        names.retain(|name| only.contains(name));
    }
    if names.is_empty() {
        return Err(ContentError::Version("no versions to load".to_string()));
    }
    let last = last_version_name(&names, options);
    names
        .iter()
        .map(|name| version_metadata(site, options, name, *name == last))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(dir: &Path) -> SiteContext {
        SiteContext {
            site_dir: dir.to_path_buf(),
            base_url: "/".to_string(),
            locale: "en".to_string(),
        }
    }

    fn scaffold_current(dir: &Path) {
        std::fs::create_dir_all(dir.join("docs")).unwrap();
        std::fs::write(dir.join("docs/intro.md"), "# Intro").unwrap();
    }

    fn scaffold_version(dir: &Path, name: &str) {
        let versioned = dir.join("versioned_docs").join(format!("version-{name}"));
        std::fs::create_dir_all(&versioned).unwrap();
        std::fs::write(versioned.join("intro.md"), "# Intro").unwrap();
    }

    fn write_registry(dir: &Path, names: &[&str]) {
        std::fs::write(
            dir.join("versions.json"),
            serde_json::to_string(names).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn current_only_site() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());

        let versions =
            read_versions_metadata(&site(dir.path()), &PluginOptions::default()).unwrap();
        assert_eq!(versions.len(), 1);
        let current = &versions[0];
        assert_eq!(current.version_name, "current");
        assert_eq!(current.version_label, "Next");
        assert!(current.is_last);
        assert_eq!(current.version_path, "/docs");
        assert_eq!(current.route_priority, Some(-1));
        assert_eq!(current.content_paths.content_path, dir.path().join("docs"));
        assert_eq!(
            current.content_paths.content_path_localized,
            dir.path().join("i18n/en/docs-default/current")
        );
        assert_eq!(current.sidebar_file_path, dir.path().join("sidebars.json"));
    }

    #[test]
    fn registry_versions_follow_current() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());
        scaffold_version(dir.path(), "1.1.0");
        scaffold_version(dir.path(), "1.0.0");
        write_registry(dir.path(), &["1.1.0", "1.0.0"]);

        let versions =
            read_versions_metadata(&site(dir.path()), &PluginOptions::default()).unwrap();
        let names: Vec<&str> = versions.iter().map(|v| v.version_name.as_str()).collect();
        assert_eq!(names, ["current", "1.1.0", "1.0.0"]);

        let current = &versions[0];
        assert_eq!(current.version_path, "/docs/next");
        assert!(!current.is_last);
        assert_eq!(current.route_priority, None);

        let latest = &versions[1];
        assert!(latest.is_last);
        assert_eq!(latest.version_path, "/docs");
        assert_eq!(latest.route_priority, Some(-1));
        assert_eq!(
            latest.content_paths.content_path,
            dir.path().join("versioned_docs/version-1.1.0")
        );
        assert_eq!(
            latest.sidebar_file_path,
            dir.path().join("versioned_sidebars/version-1.1.0-sidebars.json")
        );

        let old = &versions[2];
        assert_eq!(old.version_path, "/docs/1.0.0");
        assert_eq!(old.version_label, "1.0.0");
    }

    #[test]
    fn label_and_path_overrides() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());
        scaffold_version(dir.path(), "1.0.0");
        write_registry(dir.path(), &["1.0.0"]);

        let mut options = PluginOptions::default();
        options.versions.versions.insert(
            "1.0.0".to_string(),
            crate::options::VersionOptions {
                path: Some("stable".to_string()),
                label: Some("1.0.0 LTS".to_string()),
            },
        );

        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        let latest = &versions[1];
        assert_eq!(latest.version_label, "1.0.0 LTS");
        assert_eq!(latest.version_path, "/docs/stable");
        // overriding the path forfeits the bare base path
        assert_eq!(latest.route_priority, None);
    }

    #[test]
    fn last_version_option_selects_latest() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());
        scaffold_version(dir.path(), "2.0.0");
        scaffold_version(dir.path(), "1.0.0");
        write_registry(dir.path(), &["2.0.0", "1.0.0"]);

        let mut options = PluginOptions::default();
        options.versions.last_version = Some("1.0.0".to_string());

        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        assert!(!versions[1].is_last);
        assert!(versions[2].is_last);
        assert_eq!(versions[2].version_path, "/docs");
        assert_eq!(versions[1].version_path, "/docs/2.0.0");
    }

    #[test]
    fn only_include_versions_filters() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());
        scaffold_version(dir.path(), "2.0.0");
        scaffold_version(dir.path(), "1.0.0");
        write_registry(dir.path(), &["2.0.0", "1.0.0"]);

        let mut options = PluginOptions::default();
        options.versions.only_include_versions =
            Some(vec!["current".to_string(), "1.0.0".to_string()]);

        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        let names: Vec<&str> = versions.iter().map(|v| v.version_name.as_str()).collect();
        assert_eq!(names, ["current", "1.0.0"]);
    }

    #[test]
    fn only_include_versions_unknown_name_is_error() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());

        let mut options = PluginOptions::default();
        options.versions.only_include_versions = Some(vec!["9.9.9".to_string()]);

        let err = read_versions_metadata(&site(dir.path()), &options).unwrap_err();
        assert!(format!("{err}").contains("only_include_versions"));
    }

    #[test]
    fn disable_versioning_ignores_registry() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());
        scaffold_version(dir.path(), "1.0.0");
        write_registry(dir.path(), &["1.0.0"]);

        let mut options = PluginOptions::default();
        options.disable_versioning = true;

        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version_name, "current");
        assert!(versions[0].is_last);
    }

    #[test]
    fn excluding_current_loads_registry_only() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_version(dir.path(), "1.0.0");
        write_registry(dir.path(), &["1.0.0"]);

        let mut options = PluginOptions::default();
        options.include_current_version = false;

        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version_name, "1.0.0");
        assert!(versions[0].is_last);

        let mut options = PluginOptions::default();
        options.exclude_next_version_docs = Some(true);
        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version_name, "1.0.0");
    }

    #[test]
    fn no_versions_at_all_is_error() {
        let dir = tempfile::tempdir().unwrap();

        let mut options = PluginOptions::default();
        options.include_current_version = false;

        let err = read_versions_metadata(&site(dir.path()), &options).unwrap_err();
        assert!(format!("{err}").contains("no versions"));
    }

    #[test]
    fn missing_docs_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();

        let err =
            read_versions_metadata(&site(dir.path()), &PluginOptions::default()).unwrap_err();
        assert!(format!("{err}").contains("does not exist"));
    }

    #[test]
    fn invalid_registry_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());

        write_registry(dir.path(), &["a/b"]);
        let err =
            read_versions_metadata(&site(dir.path()), &PluginOptions::default()).unwrap_err();
        assert!(format!("{err}").contains("invalid version name"));

        write_registry(dir.path(), &["1.0.0", "1.0.0"]);
        let err =
            read_versions_metadata(&site(dir.path()), &PluginOptions::default()).unwrap_err();
        assert!(format!("{err}").contains("duplicate version name"));
    }

    #[test]
    fn malformed_registry_is_error() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());
        std::fs::write(dir.path().join("versions.json"), "{\"not\": \"a list\"}").unwrap();

        let err =
            read_versions_metadata(&site(dir.path()), &PluginOptions::default()).unwrap_err();
        assert!(format!("{err}").contains("invalid versions file"));
    }

    #[test]
    fn unknown_override_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());

        let mut options = PluginOptions::default();
        options
            .versions
            .versions
            .insert("9.9.9".to_string(), crate::options::VersionOptions::default());

        let err = read_versions_metadata(&site(dir.path()), &options).unwrap_err();
        assert!(format!("{err}").contains("versions override"));
    }

    #[test]
    fn non_default_instance_uses_prefixed_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("api-docs")).unwrap();
        let versioned = dir.path().join("api_versioned_docs/version-1.0.0");
        std::fs::create_dir_all(&versioned).unwrap();
        std::fs::write(
            dir.path().join("api_versions.json"),
            "[\"1.0.0\"]",
        )
        .unwrap();

        let mut options = PluginOptions::default();
        options.id = "api".to_string();
        options.paths.path = "api-docs".to_string();
        options.metadata.route_base_path = "api".to_string();

        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1].content_paths.content_path, versioned);
        assert_eq!(
            versions[1].sidebar_file_path,
            dir.path()
                .join("api_versioned_sidebars/version-1.0.0-sidebars.json")
        );
        assert_eq!(
            versions[0].content_paths.content_path_localized,
            dir.path().join("i18n/en/docs-api/current")
        );
        assert_eq!(versions[0].version_path, "/api/next");
    }

    #[test]
    fn edit_urls_follow_content_dirs() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());
        scaffold_version(dir.path(), "1.0.0");
        write_registry(dir.path(), &["1.0.0"]);

        let mut options = PluginOptions::default();
        options.metadata.edit_url = Some(EditUrl::Url(
            "https://github.com/acme/site/edit/main".to_string(),
        ));

        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        assert_eq!(
            versions[0].version_edit_url.as_deref(),
            Some("https://github.com/acme/site/edit/main/docs")
        );
        assert_eq!(
            versions[1].version_edit_url.as_deref(),
            Some("https://github.com/acme/site/edit/main/versioned_docs/version-1.0.0")
        );
        assert_eq!(
            versions[1].version_edit_url_localized.as_deref(),
            Some("https://github.com/acme/site/edit/main/i18n/en/docs-default/version-1.0.0")
        );

        options.metadata.edit_current_version = true;
        let versions = read_versions_metadata(&site(dir.path()), &options).unwrap();
        assert_eq!(
            versions[1].version_edit_url.as_deref(),
            Some("https://github.com/acme/site/edit/main/docs")
        );
    }

    #[test]
    fn version_metadata_serializes_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_current(dir.path());

        let versions =
            read_versions_metadata(&site(dir.path()), &PluginOptions::default()).unwrap();
        let json = serde_json::to_value(&versions[0]).unwrap();
        assert!(json.get("versionName").is_some());
        assert!(json.get("versionLabel").is_some());
        assert!(json.get("versionPath").is_some());
        assert!(json.get("isLast").is_some());
        assert!(json.get("contentPath").is_some());
        assert!(json.get("contentPathLocalized").is_some());
        assert!(json.get("sidebarFilePath").is_some());
        assert!(json.get("routePriority").is_some());
        assert!(json.get("versionEditUrl").is_none());
    }
}
