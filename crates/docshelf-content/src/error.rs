//! Error types for docshelf-content.

/// Errors that can occur while loading and assembling docs content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// IO error reading content files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error reading the version registry or writing artifacts.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Markdown front matter error.
    #[error("markdown error: {0}")]
    Markdown(#[from] docshelf_markdown::MarkdownError),

    /// Sidebars file error.
    #[error("sidebar error: {0}")]
    Sidebar(#[from] docshelf_sidebars::SidebarError),

    /// Invalid instance options.
    #[error("invalid options: {0}")]
    Options(String),

    /// Version registry or version layout problem.
    #[error("version error: {0}")]
    Version(String),

    /// A document failed metadata processing.
    #[error("doc {source_path}: {message}")]
    Doc { source_path: String, message: String },

    /// An include entry is not a valid glob pattern.
    #[error("invalid include pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// Relative doc links failed to resolve under the `error` policy.
    #[error("{0} broken markdown link(s)")]
    BrokenLinks(usize),
}

/// Result type alias using `ContentError`.
pub type Result<T> = std::result::Result<T, ContentError>;
