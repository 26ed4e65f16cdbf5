//! `docshelf init`: scaffold a new docs site.

use std::path::Path;

use anyhow::{Context, bail};
use tracing::info;

const CONFIG_TEMPLATE: &str = r#"[site]
base_url = "/"
out_dir = "build"

[[docs]]
id = "default"
path = "docs"
sidebar_path = "sidebars.json"
route_base_path = "docs"
"#;

const INTRO_TEMPLATE: &str = r"---
sidebar_label: Introduction
---

# Introduction

Welcome. Edit `docs/intro.md`, then run `docshelf build`.
";

const SIDEBARS_TEMPLATE: &str = r#"{
  "docs": ["intro"]
}
"#;

/// Scaffold `docshelf.toml`, `docs/intro.md`, and `sidebars.json` in `dir`.
pub fn run(dir: &Path) -> anyhow::Result<()> {
    let config_path = dir.join("docshelf.toml");
    let docs_dir = dir.join("docs");
    let intro_path = docs_dir.join("intro.md");
    let sidebars_path = dir.join("sidebars.json");

    for path in [&config_path, &intro_path, &sidebars_path] {
        if path.exists() {
            bail!("refusing to overwrite existing {}", path.display());
        }
    }

    std::fs::create_dir_all(&docs_dir)
        .with_context(|| format!("failed to create {}", docs_dir.display()))?;
    write_new(&config_path, CONFIG_TEMPLATE)?;
    write_new(&intro_path, INTRO_TEMPLATE)?;
    write_new(&sidebars_path, SIDEBARS_TEMPLATE)?;

    info!(dir = %dir.display(), "scaffolded docs site");
    println!("scaffolded docs site in {}", dir.display());
    println!("next: docshelf build --config {}", config_path.display());
    Ok(())
}

fn write_new(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
