#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("unclosed front matter block")]
    UnclosedFrontMatter,
}
