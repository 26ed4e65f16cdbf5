//! Markdown-side building blocks for docshelf: front matter parsing,
//! outline extraction (title and excerpt), URL-path helpers, and rewriting
//! of relative doc links into permalinks.

pub mod error;
pub mod front_matter;
pub mod links;
pub mod outline;
pub mod urls;

pub use error::MarkdownError;
pub use front_matter::{FrontMatter, split_front_matter};
pub use links::{BrokenMarkdownLink, ContentPaths, LinkRewriteContext, rewrite_markdown_links};
pub use outline::{content_excerpt, content_title};
pub use urls::{aliased_site_path, normalize_url, posix_path, resolve_slug};
