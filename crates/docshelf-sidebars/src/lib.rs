//! Sidebar navigation trees: the item model, sidebars-file loading with
//! shorthand normalization, and doc ordering derived from the trees.

pub mod error;
pub mod item;
pub mod loader;
pub mod order;

pub use error::SidebarError;
pub use item::{CustomProps, Sidebar, SidebarItem, Sidebars, map_doc_ids};
pub use loader::{load_sidebars, parse_sidebars};
pub use order::{OrderMetadata, create_order, first_doc_id, referenced_doc_ids, sidebar_doc_ids};
