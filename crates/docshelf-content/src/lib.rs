//! Versioned docs content loading for docshelf: plugin options, version
//! discovery, doc reading and metadata, sidebar wiring, global data and
//! route derivation, version snapshots, and filesystem watching.

pub mod config;
pub mod docs;
pub mod error;
pub mod global;
pub mod last_update;
pub mod loader;
pub mod markdown;
pub mod options;
pub mod routes;
pub mod snapshot;
pub mod versions;
pub mod watcher;

/// Instance id used when the site configures a single docs instance.
pub const DEFAULT_INSTANCE_ID: &str = "default";

/// Name of the version backed by the working-tree docs dir.
pub const CURRENT_VERSION_NAME: &str = "current";

pub use config::{BrokenLinksPolicy, Config, SiteContext, SiteOptions};
pub use docs::{DocFile, DocMetadata, DocNavLink};
pub use error::{ContentError, Result};
pub use global::{GlobalDoc, GlobalPluginData, GlobalVersion, to_global_data};
pub use last_update::LastUpdateData;
pub use loader::{LoadedContent, LoadedVersion, SourceToPermalink, load_content, source_to_permalink};
pub use markdown::{DocsMarkdownOptions, linkify_doc, source_file_path, version_of_file};
pub use options::{EditUrl, EditUrlParams, PluginOptions};
pub use routes::{RouteNode, build_routes};
pub use snapshot::cut_version;
pub use versions::{VersionMetadata, read_versions_metadata};
pub use watcher::{ContentEvent, ContentWatcher, watch_paths};
