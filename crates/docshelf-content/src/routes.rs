//! Route tree derivation for the router manifest.

use serde::{Deserialize, Serialize};

use crate::loader::LoadedContent;
use crate::options::PluginOptions;

/// One node in the emitted route manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    pub path: String,
    pub component: String,
    pub exact: bool,
    /// Router tie-break weight. Only the last version's root carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteNode>,
}

/// One root route per version, with an exact child route per doc.
#[must_use]
pub fn build_routes(options: &PluginOptions, content: &LoadedContent) -> Vec<RouteNode> {
    content
        .loaded_versions
        .iter()
        .map(|version| {
            let mut doc_routes: Vec<RouteNode> = version
                .docs
                .iter()
                .map(|doc| RouteNode {
                    path: doc.permalink.clone(),
                    component: options.doc_item_component.clone(),
                    exact: true,
                    priority: None,
                    routes: Vec::new(),
                })
                .collect();
            doc_routes.sort_by(|a, b| a.path.cmp(&b.path));

            RouteNode {
                path: version.metadata.version_path.clone(),
                component: options.doc_layout_component.clone(),
                exact: false,
                priority: version.metadata.route_priority,
                routes: doc_routes,
            }
        })
        .collect()
}
