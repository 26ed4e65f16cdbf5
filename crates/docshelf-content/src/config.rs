//! Site configuration (`docshelf.toml`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::options::PluginOptions;

/// How unresolvable relative doc links are handled at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokenLinksPolicy {
    Ignore,
    #[default]
    Warn,
    Error,
}

fn default_base_url() -> String {
    "/".to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_locale() -> String {
    "en".to_string()
}

/// Site-wide settings shared by every docs instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteOptions {
    /// Defaults to the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_dir: Option<PathBuf>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Relative paths resolve against the site dir.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub on_broken_markdown_links: BrokenLinksPolicy,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            site_dir: None,
            base_url: default_base_url(),
            out_dir: default_out_dir(),
            locale: default_locale(),
            on_broken_markdown_links: BrokenLinksPolicy::default(),
        }
    }
}

/// Resolved site-level inputs the load pipeline threads through.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site_dir: PathBuf,
    pub base_url: String,
    pub locale: String,
}

/// Top-level site configuration: one `[site]` table plus a `[[docs]]`
/// table per instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteOptions,
    #[serde(default, rename = "docs")]
    pub instances: Vec<PluginOptions>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteOptions::default(),
            instances: vec![PluginOptions::default()],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to a single default instance when the file does not
    /// exist. An unset `site_dir` resolves to the config file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        if config.instances.is_empty() {
            config.instances.push(PluginOptions::default());
        }
        if config.site.site_dir.is_none() {
            config.site.site_dir = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf);
        }

        config.apply_env_overrides();
        Ok(config)
    }

    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DOCSHELF_SITE_DIR") {
            self.site.site_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("DOCSHELF_OUT_DIR") {
            self.site.out_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCSHELF_BASE_URL") {
            self.site.base_url = v;
        }
    }

    /// Check every instance and reject duplicate instance ids.
    ///
    /// # Errors
    ///
    /// Returns an error when any instance fails validation or two
    /// instances share an id.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = BTreeSet::new();
        for options in &self.instances {
            options.validate()?;
            if !seen.insert(options.id.as_str()) {
                anyhow::bail!("duplicate docs instance id {:?}", options.id);
            }
        }
        Ok(())
    }

    /// The configured site dir, defaulting to the working directory.
    #[must_use]
    pub fn site_dir(&self) -> PathBuf {
        self.site
            .site_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Output directory, resolved against the site dir when relative.
    #[must_use]
    pub fn out_dir(&self) -> PathBuf {
        if self.site.out_dir.is_absolute() {
            self.site.out_dir.clone()
        } else {
            self.site_dir().join(&self.site.out_dir)
        }
    }

    /// Site-level inputs for the load pipeline.
    #[must_use]
    pub fn site_context(&self) -> SiteContext {
        SiteContext {
            site_dir: self.site_dir(),
            base_url: self.site.base_url.clone(),
            locale: self.site.locale.clone(),
        }
    }

    /// The instance with the given id, if configured.
    #[must_use]
    pub fn instance(&self, id: &str) -> Option<&PluginOptions> {
        self.instances.iter().find(|options| options.id == id)
    }
}
