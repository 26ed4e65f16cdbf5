use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::{Sidebar, SidebarItem, Sidebars};

/// Navigation neighbors and owning sidebar for one doc id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
}

/// Derive per-doc ordering from the sidebar trees.
///
/// Only `doc` items enter the prev/next chain and receive a sidebar
/// association; `ref` and `link` items are navigation-neutral. A doc
/// appearing in several sidebars keeps the last one's ordering.
#[must_use]
pub fn create_order(sidebars: &Sidebars) -> BTreeMap<String, OrderMetadata> {
    let mut order = BTreeMap::new();
    for (name, sidebar) in sidebars {
        let ids = sidebar_doc_ids(sidebar);
        for (pos, id) in ids.iter().enumerate() {
            order.insert(
                id.clone(),
                OrderMetadata {
                    previous: pos.checked_sub(1).map(|prev| ids[prev].clone()),
                    next: ids.get(pos + 1).cloned(),
                    sidebar: Some(name.clone()),
                },
            );
        }
    }
    order
}

/// Depth-first `doc` ids of one sidebar, in navigation order.
#[must_use]
pub fn sidebar_doc_ids(sidebar: &Sidebar) -> Vec<String> {
    let mut out = Vec::new();
    collect_doc_ids(sidebar, false, &mut out);
    out
}

/// Every doc id a set of sidebars points at, `ref` items included.
/// Used to validate sidebars against the loaded docs.
#[must_use]
pub fn referenced_doc_ids(sidebars: &Sidebars) -> Vec<String> {
    let mut out = Vec::new();
    for sidebar in sidebars.values() {
        collect_doc_ids(sidebar, true, &mut out);
    }
    out
}

/// First `doc` id of the first sidebar, if any.
#[must_use]
pub fn first_doc_id(sidebars: &Sidebars) -> Option<String> {
    sidebars
        .values()
        .next()
        .and_then(|sidebar| sidebar_doc_ids(sidebar).into_iter().next())
}

fn collect_doc_ids(items: &[SidebarItem], include_refs: bool, out: &mut Vec<String>) {
    for item in items {
        match item {
            SidebarItem::Doc { id, .. } => out.push(id.clone()),
            SidebarItem::Ref { id, .. } => {
                if include_refs {
                    out.push(id.clone());
                }
            }
            SidebarItem::Category { items, .. } => collect_doc_ids(items, include_refs, out),
            SidebarItem::Link { .. } => {}
        }
    }
}
