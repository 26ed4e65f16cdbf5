//! Sidebars-file loading and shorthand normalization.
//!
//! A sidebars file maps sidebar names to item lists. Items may be written
//! in full form (`{"type": "doc", ...}`), as a bare doc id string, or as a
//! label-to-items object that expands to categories.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::SidebarError;
use crate::item::{CustomProps, Sidebar, SidebarItem, Sidebars};

/// Load and normalize a sidebars file.
///
/// A missing file is not an error: the version simply has no navigation.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or
/// contains an item that fails normalization; the error names the file.
pub fn load_sidebars(path: &Path) -> Result<Sidebars, SidebarError> {
    if !path.exists() {
        return Ok(Sidebars::new());
    }
    let raw = std::fs::read_to_string(path)?;
    parse_sidebars(&raw).map_err(|source| SidebarError::File {
        path: path.display().to_string(),
        source: Box::new(source),
    })
}

/// Normalize raw sidebars JSON into typed trees.
///
/// # Errors
///
/// Returns an error for malformed JSON, an unknown item `type`, or an
/// unknown key on a typed item.
pub fn parse_sidebars(raw: &str) -> Result<Sidebars, SidebarError> {
    let root: BTreeMap<String, Value> = serde_json::from_str(raw)?;
    root.into_iter()
        .map(|(name, value)| Ok((name, normalize_sidebar(value)?)))
        .collect()
}

fn normalize_sidebar(value: Value) -> Result<Sidebar, SidebarError> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(normalize_item(item)?);
            }
            Ok(out)
        }
        Value::Object(map) => map
            .into_iter()
            .map(|(label, items)| shorthand_category(label, items))
            .collect(),
        other => Err(SidebarError::InvalidItem(format!(
            "sidebar must be an array or a category object, got {other}"
        ))),
    }
}

fn normalize_item(value: Value) -> Result<Vec<SidebarItem>, SidebarError> {
    match value {
        Value::String(id) => Ok(vec![SidebarItem::Doc {
            id,
            custom_props: None,
        }]),
        Value::Object(map) if map.contains_key("type") => Ok(vec![typed_item(map)?]),
        Value::Object(map) => map
            .into_iter()
            .map(|(label, items)| shorthand_category(label, items))
            .collect(),
        other => Err(SidebarError::InvalidItem(format!(
            "expected a doc id, a typed item, or a category object, got {other}"
        ))),
    }
}

fn shorthand_category(label: String, items: Value) -> Result<SidebarItem, SidebarError> {
    let Value::Array(raw_items) = items else {
        return Err(SidebarError::InvalidItem(format!(
            "category {label:?} must map to an array of items"
        )));
    };
    let mut children = Vec::new();
    for item in raw_items {
        children.extend(normalize_item(item)?);
    }
    Ok(SidebarItem::Category {
        label,
        items: children,
        collapsed: true,
        custom_props: None,
    })
}

fn typed_item(map: serde_json::Map<String, Value>) -> Result<SidebarItem, SidebarError> {
    let Some(type_tag) = map.get("type").and_then(Value::as_str) else {
        return Err(SidebarError::InvalidItem(
            "item type must be a string".to_string(),
        ));
    };

    let allowed: &[&str] = match type_tag {
        "doc" | "ref" => &["type", "id", "customProps"],
        "link" => &["type", "href", "label", "customProps"],
        "category" => &["type", "label", "items", "collapsed", "customProps"],
        other => return Err(SidebarError::UnknownType(other.to_string())),
    };
    if let Some(unknown) = map.keys().find(|key| !allowed.contains(&key.as_str())) {
        return Err(SidebarError::InvalidItem(format!(
            "unknown key {unknown:?} on {type_tag} item"
        )));
    }

    if type_tag == "category" {
        return typed_category(&map);
    }
    Ok(serde_json::from_value(Value::Object(map))?)
}

// Categories cannot go straight through serde: their items may themselves
// be shorthand.
fn typed_category(map: &serde_json::Map<String, Value>) -> Result<SidebarItem, SidebarError> {
    let Some(label) = map.get("label").and_then(Value::as_str) else {
        return Err(SidebarError::InvalidItem(
            "category requires a string label".to_string(),
        ));
    };
    let collapsed = match map.get("collapsed") {
        None => true,
        Some(Value::Bool(collapsed)) => *collapsed,
        Some(_) => {
            return Err(SidebarError::InvalidItem(format!(
                "collapsed on category {label:?} must be a boolean"
            )));
        }
    };
    let custom_props = custom_props(map, label)?;
    let Some(Value::Array(raw_items)) = map.get("items") else {
        return Err(SidebarError::InvalidItem(format!(
            "category {label:?} requires an items array"
        )));
    };
    let mut children = Vec::new();
    for item in raw_items {
        children.extend(normalize_item(item.clone())?);
    }
    Ok(SidebarItem::Category {
        label: label.to_string(),
        items: children,
        collapsed,
        custom_props,
    })
}

fn custom_props(
    map: &serde_json::Map<String, Value>,
    label: &str,
) -> Result<Option<CustomProps>, SidebarError> {
    match map.get("customProps") {
        None => Ok(None),
        Some(Value::Object(props)) => Ok(Some(props.clone())),
        Some(_) => Err(SidebarError::InvalidItem(format!(
            "customProps on category {label:?} must be an object"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_becomes_doc_item() {
        let sidebars = parse_sidebars(r#"{"docs": ["intro", "setup"]}"#).unwrap();
        assert_eq!(
            sidebars["docs"],
            vec![
                SidebarItem::Doc {
                    id: "intro".to_string(),
                    custom_props: None
                },
                SidebarItem::Doc {
                    id: "setup".to_string(),
                    custom_props: None
                },
            ]
        );
    }

    #[test]
    fn object_shorthand_becomes_categories() {
        let sidebars =
            parse_sidebars(r#"{"docs": {"Getting Started": ["intro"], "Guides": ["a", "b"]}}"#)
                .unwrap();
        let SidebarItem::Category { label, items, collapsed, .. } = &sidebars["docs"][0] else {
            panic!("expected category");
        };
        assert_eq!(label, "Getting Started");
        assert_eq!(items.len(), 1);
        assert!(*collapsed);
        assert_eq!(sidebars["docs"].len(), 2);
    }

    #[test]
    fn nested_shorthand_inside_category_items() {
        let raw = r#"{"docs": [
            {"type": "category", "label": "Outer", "items": ["plain", {"Inner": ["deep"]}]}
        ]}"#;
        let sidebars = parse_sidebars(raw).unwrap();
        let SidebarItem::Category { items, .. } = &sidebars["docs"][0] else {
            panic!("expected category");
        };
        assert!(matches!(&items[0], SidebarItem::Doc { id, .. } if id == "plain"));
        assert!(matches!(&items[1], SidebarItem::Category { label, .. } if label == "Inner"));
    }

    #[test]
    fn full_form_passes_through() {
        let raw = r#"{"docs": [
            {"type": "ref", "id": "shared"},
            {"type": "link", "href": "https://example.com", "label": "Site"}
        ]}"#;
        let sidebars = parse_sidebars(raw).unwrap();
        assert!(matches!(&sidebars["docs"][0], SidebarItem::Ref { .. }));
        assert!(matches!(&sidebars["docs"][1], SidebarItem::Link { .. }));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = parse_sidebars(r#"{"docs": [{"type": "page", "id": "x"}]}"#).unwrap_err();
        assert!(matches!(err, SidebarError::UnknownType(t) if t == "page"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = parse_sidebars(r#"{"docs": [{"type": "doc", "id": "x", "lable": "oops"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("lable"));
    }

    #[test]
    fn category_without_items_is_rejected() {
        let err =
            parse_sidebars(r#"{"docs": [{"type": "category", "label": "L"}]}"#).unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sidebars = load_sidebars(&dir.path().join("sidebars.json")).unwrap();
        assert!(sidebars.is_empty());
    }

    #[test]
    fn file_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sidebars.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_sidebars(&path).unwrap_err();
        assert!(err.to_string().contains("sidebars.json"));
    }

    #[test]
    fn whole_sidebar_object_shorthand() {
        let sidebars = parse_sidebars(r#"{"docs": {"Only": ["a"]}}"#).unwrap();
        assert_eq!(sidebars["docs"].len(), 1);
    }

    mod proptest_normalization {
        use super::*;
        use proptest::prelude::*;

        fn item_strategy() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                "[a-z][a-z0-9-]{0,10}".prop_map(Value::String),
                "[a-z]{1,8}".prop_map(|id| serde_json::json!({"type": "doc", "id": id})),
                "[a-z]{1,8}".prop_map(|id| serde_json::json!({"type": "ref", "id": id})),
            ];
            leaf.prop_recursive(3, 16, 4, |inner| {
                (
                    "[A-Z][a-z]{0,6}",
                    proptest::collection::vec(inner, 0..4),
                )
                    .prop_map(|(label, items)| {
                        serde_json::json!({"type": "category", "label": label, "items": items})
                    })
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn normalized_items_always_carry_known_type(
                items in proptest::collection::vec(item_strategy(), 0..6)
            ) {
                let raw = serde_json::json!({"docs": items}).to_string();
                let sidebars = parse_sidebars(&raw).unwrap();
                let json = serde_json::to_value(&sidebars).unwrap();
                for item in flatten(&json["docs"]) {
                    let tag = item["type"].as_str().unwrap();
                    prop_assert!(matches!(tag, "doc" | "ref" | "link" | "category"));
                }
            }
        }

        fn flatten(value: &Value) -> Vec<&Value> {
            let mut out = Vec::new();
            if let Value::Array(items) = value {
                for item in items {
                    out.push(item);
                    if let Some(children) = item.get("items") {
                        out.extend(flatten(children));
                    }
                }
            }
            out
        }
    }
}
