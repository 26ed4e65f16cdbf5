#[derive(Debug, thiserror::Error)]
pub enum SidebarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown sidebar item type: {0}")]
    UnknownType(String),

    #[error("invalid sidebar item: {0}")]
    InvalidItem(String),

    #[error("invalid sidebars file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: Box<SidebarError>,
    },
}
