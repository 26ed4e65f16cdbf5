//! Version snapshot: freeze the current docs into the versioned tree.

use std::path::Path;

use docshelf_sidebars::{Sidebars, load_sidebars, map_doc_ids};
use tracing::info;

use crate::CURRENT_VERSION_NAME;
use crate::config::SiteContext;
use crate::error::{ContentError, Result};
use crate::options::PluginOptions;
use crate::versions::{
    version_dir_name, versioned_docs_dir, versioned_sidebars_dir, versions_file_path,
};

/// Snapshot the current docs and sidebars as version `name`.
///
/// Copies the docs tree into `versioned_docs/version-<name>`, writes a
/// prefixed sidebars snapshot when the current sidebars file exists, and
/// prepends the name to the versions registry (creating it if absent).
///
/// # Errors
///
/// Returns an error for an invalid or reserved name, a name already in the
/// registry, a missing or empty docs dir, or any I/O failure.
pub fn cut_version(site: &SiteContext, options: &PluginOptions, name: &str) -> Result<()> {
    validate_snapshot_name(name)?;

    let registry_path = versions_file_path(&site.site_dir, &options.id);
    let mut names: Vec<String> = if registry_path.exists() {
        serde_json::from_str(&std::fs::read_to_string(&registry_path)?).map_err(|error| {
            ContentError::Version(format!(
                "invalid versions file {}: {error}",
                registry_path.display()
            ))
        })?
    } else {
        Vec::new()
    };
    if names.iter().any(|existing| existing == name) {
        return Err(ContentError::Version(format!(
            "version {name:?} already exists"
        )));
    }

    let docs_dir = site.site_dir.join(&options.paths.path);
    if !docs_dir.is_dir() || !dir_has_files(&docs_dir)? {
        return Err(ContentError::Version(format!(
            "no docs to version at {}",
            docs_dir.display()
        )));
    }

    let snapshot_dir = versioned_docs_dir(&site.site_dir, &options.id).join(version_dir_name(name));
    copy_dir_recursive(&docs_dir, &snapshot_dir)?;

    let sidebar_path = site.site_dir.join(&options.paths.sidebar_path);
    if sidebar_path.exists() {
        let sidebars = load_sidebars(&sidebar_path)?;
        let snapshot = snapshot_sidebars(&sidebars, name);
        let out_path = versioned_sidebars_dir(&site.site_dir, &options.id)
            .join(format!("{}-sidebars.json", version_dir_name(name)));
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_pretty_json(&out_path, &snapshot)?;
    }

    names.insert(0, name.to_string());
    if let Some(parent) = registry_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_pretty_json(&registry_path, &names)?;

    info!(version = name, dir = %snapshot_dir.display(), "cut version");
    Ok(())
}

fn validate_snapshot_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ContentError::Version(
            "version name must not be empty".to_string(),
        ));
    }
    if name == CURRENT_VERSION_NAME {
        return Err(ContentError::Version(format!(
            "version name {CURRENT_VERSION_NAME:?} is reserved"
        )));
    }
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid_chars || name == "." || name == ".." {
        return Err(ContentError::Version(format!(
            "invalid version name {name:?}: use letters, digits, '.', '_' or '-'"
        )));
    }
    Ok(())
}

/// Prefix every sidebar name and doc/ref id with `version-<name>/`.
fn snapshot_sidebars(sidebars: &Sidebars, name: &str) -> Sidebars {
    let dir = version_dir_name(name);
    map_doc_ids(sidebars, &|id| format!("{dir}/{id}"))
        .into_iter()
        .map(|(sidebar_name, items)| (format!("{dir}/{sidebar_name}"), items))
        .collect()
}

fn dir_has_files(dir: &Path) -> std::io::Result<bool> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if dir_has_files(&path)? {
                return Ok(true);
            }
        } else {
            return Ok(true);
        }
    }
    Ok(false)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn write_pretty_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}
