//! Build pipeline: load instances, rewrite links, write artifacts.

use std::path::Path;

use anyhow::Context;
use docshelf_content::{
    BrokenLinksPolicy, Config, ContentError, ContentWatcher, DocsMarkdownOptions, LoadedContent,
    PluginOptions, SiteContext, VersionMetadata, build_routes, linkify_doc, load_content,
    read_versions_metadata, source_file_path, source_to_permalink, to_global_data, watch_paths,
};
use tracing::{info, warn};

/// Build the selected instances (all of them when `instance` is `None`).
pub fn run(config: &Config, instance: Option<&str>) -> anyhow::Result<()> {
    for options in selected_instances(config, instance)? {
        build_instance(config, options)?;
    }
    Ok(())
}

/// Build once, then rebuild on every content change until shutdown.
pub async fn watch(config: &Config, instance: Option<&str>) -> anyhow::Result<()> {
    if let Err(error) = run(config, instance) {
        warn!("build failed: {error:#}");
    }

    let site = config.site_context();
    let mut paths = Vec::new();
    for options in selected_instances(config, instance)? {
        let versions = read_versions_metadata(&site, options)?;
        paths.extend(watch_paths(&site, &options.id, &versions));
    }
    paths.sort();
    paths.dedup();

    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    let _watcher = ContentWatcher::start(&paths, tx).context("failed to start content watcher")?;
    info!(paths = paths.len(), "watching for docs changes");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    loop {
        tokio::select! {
            event = rx.recv() => {
                if event.is_none() {
                    break;
                }
                info!("docs changed, rebuilding");
                if let Err(error) = run(config, instance) {
                    warn!("rebuild failed: {error:#}");
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
    Ok(())
}

fn selected_instances<'a>(
    config: &'a Config,
    instance: Option<&str>,
) -> anyhow::Result<Vec<&'a PluginOptions>> {
    match instance {
        Some(id) => {
            let options = config
                .instance(id)
                .with_context(|| format!("no docs instance {id:?} configured"))?;
            Ok(vec![options])
        }
        None => Ok(config.instances.iter().collect()),
    }
}

fn build_instance(config: &Config, options: &PluginOptions) -> anyhow::Result<()> {
    let site = config.site_context();
    let content = load_content(&site, options)
        .with_context(|| format!("failed to load docs instance {:?}", options.id))?;

    let out_dir = config.out_dir().join("docshelf").join(&options.id);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    write_pretty_json(&out_dir.join("content.json"), &content)?;
    let global = to_global_data(&site, options, &content);
    write_pretty_json(&out_dir.join("global.json"), &global)?;
    write_pretty_json(&out_dir.join("routes.json"), &build_routes(options, &content))?;
    write_markdown(
        &site,
        config.site.on_broken_markdown_links,
        &content,
        &out_dir,
    )?;

    info!(instance = %options.id, out = %out_dir.display(), "built docs instance");
    Ok(())
}

/// Write the link-rewritten source of every doc under `markdown/<doc id>.md`.
fn write_markdown(
    site: &SiteContext,
    policy: BrokenLinksPolicy,
    content: &LoadedContent,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let versions: Vec<VersionMetadata> = content
        .loaded_versions
        .iter()
        .map(|version| version.metadata.clone())
        .collect();
    let permalinks = source_to_permalink(content);
    let markdown_options = DocsMarkdownOptions {
        site_dir: &site.site_dir,
        versions: &versions,
        source_to_permalink: &permalinks,
    };

    let markdown_dir = out_dir.join("markdown");
    let mut broken = 0usize;

    for version in &content.loaded_versions {
        for doc in &version.docs {
            let file_path = source_file_path(&site.site_dir, &doc.source);
            let raw = std::fs::read_to_string(&file_path)
                .with_context(|| format!("failed to read {}", file_path.display()))?;
            let rewritten = linkify_doc(&file_path, &raw, &markdown_options, |link| {
                broken += 1;
                if matches!(policy, BrokenLinksPolicy::Warn) {
                    warn!(
                        file = %link.file_path.display(),
                        link = link.link,
                        "broken markdown link"
                    );
                }
            })?;

            let out_path = markdown_dir.join(format!("{}.md", doc.id));
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(&out_path, rewritten)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
        }
    }

    if matches!(policy, BrokenLinksPolicy::Error) && broken > 0 {
        return Err(ContentError::BrokenLinks(broken).into());
    }
    Ok(())
}

fn write_pretty_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_content::SiteOptions;

    fn config_for(dir: &Path) -> Config {
        Config {
            site: SiteOptions {
                site_dir: Some(dir.to_path_buf()),
                ..SiteOptions::default()
            },
            instances: vec![PluginOptions::default()],
        }
    }

    fn scaffold(dir: &Path) {
        std::fs::create_dir_all(dir.join("docs/guides")).unwrap();
        std::fs::write(
            dir.join("docs/intro.md"),
            "# Introduction\n\nSee [setup](guides/setup.md).\n",
        )
        .unwrap();
        std::fs::write(dir.join("docs/guides/setup.md"), "# Setup\n").unwrap();
        std::fs::write(
            dir.join("sidebars.json"),
            r#"{"docs": ["intro", "guides/setup"]}"#,
        )
        .unwrap();
    }

    #[test]
    fn writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        let config = config_for(dir.path());

        run(&config, None).unwrap();

        let out = dir.path().join("build/docshelf/default");
        for name in ["content.json", "global.json", "routes.json"] {
            let raw = std::fs::read_to_string(out.join(name)).unwrap();
            assert!(raw.ends_with('\n'), "{name} should end with newline");
            serde_json::from_str::<serde_json::Value>(&raw).unwrap();
        }

        let intro = std::fs::read_to_string(out.join("markdown/intro.md")).unwrap();
        assert!(intro.contains("(/docs/guides/setup)"));
        assert!(out.join("markdown/guides/setup.md").is_file());
    }

    #[test]
    fn broken_links_fail_the_build_under_error_policy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(
            dir.path().join("docs/intro.md"),
            "# Intro\n\n[gone](missing.md)\n",
        )
        .unwrap();

        let mut config = config_for(dir.path());
        config.site.on_broken_markdown_links = BrokenLinksPolicy::Error;

        let err = run(&config, None).unwrap_err();
        assert!(err.to_string().contains("broken markdown link"));
    }

    #[test]
    fn broken_links_only_warn_by_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(
            dir.path().join("docs/intro.md"),
            "# Intro\n\n[gone](missing.md)\n",
        )
        .unwrap();

        let config = config_for(dir.path());
        run(&config, None).unwrap();

        let out = dir.path().join("build/docshelf/default");
        let intro = std::fs::read_to_string(out.join("markdown/intro.md")).unwrap();
        assert!(intro.contains("(missing.md)"));
    }

    #[test]
    fn unknown_instance_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        let config = config_for(dir.path());

        let err = run(&config, Some("missing")).unwrap_err();
        assert!(err.to_string().contains("no docs instance"));
    }
}
