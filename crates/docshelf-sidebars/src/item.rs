use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque payload a site can attach to any sidebar item.
pub type CustomProps = serde_json::Map<String, Value>;

/// One navigation tree, top-level items in display order.
pub type Sidebar = Vec<SidebarItem>;

/// All sidebars of a version, keyed by sidebar name.
pub type Sidebars = BTreeMap<String, Sidebar>;

/// A navigation node. The serialized form is discriminated by `type`,
/// one of `doc`, `ref`, `link`, `category`.
///
/// `doc` places a document in the tree and in the prev/next chain; `ref`
/// displays a document without affecting navigation; `link` is an external
/// href; `category` nests child items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarItem {
    Doc {
        id: String,
        #[serde(default, rename = "customProps", skip_serializing_if = "Option::is_none")]
        custom_props: Option<CustomProps>,
    },
    Ref {
        id: String,
        #[serde(default, rename = "customProps", skip_serializing_if = "Option::is_none")]
        custom_props: Option<CustomProps>,
    },
    Link {
        href: String,
        label: String,
        #[serde(default, rename = "customProps", skip_serializing_if = "Option::is_none")]
        custom_props: Option<CustomProps>,
    },
    Category {
        label: String,
        items: Vec<SidebarItem>,
        #[serde(default = "default_collapsed")]
        collapsed: bool,
        #[serde(default, rename = "customProps", skip_serializing_if = "Option::is_none")]
        custom_props: Option<CustomProps>,
    },
}

fn default_collapsed() -> bool {
    true
}

/// Rewrite every `doc` and `ref` id through `f`, recursing into
/// categories. Labels, links, and custom props pass through unchanged.
#[must_use]
pub fn map_doc_ids<F: Fn(&str) -> String>(sidebars: &Sidebars, f: &F) -> Sidebars {
    sidebars
        .iter()
        .map(|(name, items)| (name.clone(), items.iter().map(|item| map_item(item, f)).collect()))
        .collect()
}

fn map_item<F: Fn(&str) -> String>(item: &SidebarItem, f: &F) -> SidebarItem {
    match item {
        SidebarItem::Doc { id, custom_props } => SidebarItem::Doc {
            id: f(id),
            custom_props: custom_props.clone(),
        },
        SidebarItem::Ref { id, custom_props } => SidebarItem::Ref {
            id: f(id),
            custom_props: custom_props.clone(),
        },
        SidebarItem::Link { .. } => item.clone(),
        SidebarItem::Category {
            label,
            items,
            collapsed,
            custom_props,
        } => SidebarItem::Category {
            label: label.clone(),
            items: items.iter().map(|child| map_item(child, f)).collect(),
            collapsed: *collapsed,
            custom_props: custom_props.clone(),
        },
    }
}
