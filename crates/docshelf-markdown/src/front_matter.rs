use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MarkdownError;

/// Front matter keys the docs pipeline acts on. Unknown keys are preserved
/// in `extra` and travel with the doc all the way into global data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FrontMatter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.slug.is_none()
            && self.sidebar_label.is_none()
            && self.extra.is_empty()
    }
}

/// Split a document into its YAML front matter and the remaining body.
///
/// A document without a leading `---` fence has no front matter; the body
/// is the whole input.
///
/// # Errors
///
/// Returns an error if the opening fence is never closed or the YAML block
/// does not deserialize.
pub fn split_front_matter(content: &str) -> Result<(FrontMatter, &str), MarkdownError> {
    let Some(after_open) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((FrontMatter::default(), content));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            let front = if yaml.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(yaml)?
            };
            return Ok((front, body));
        }
        offset += line.len();
    }

    Err(MarkdownError::UnclosedFrontMatter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let (front, body) = split_front_matter(
            "---\nid: intro\ntitle: Introduction\nsidebar_label: Intro\n---\n# Hello\n",
        )
        .unwrap();
        assert_eq!(front.id.as_deref(), Some("intro"));
        assert_eq!(front.title.as_deref(), Some("Introduction"));
        assert_eq!(front.sidebar_label.as_deref(), Some("Intro"));
        assert_eq!(body, "# Hello\n");
    }

    #[test]
    fn preserves_unknown_keys() {
        let (front, _) =
            split_front_matter("---\ntitle: T\nauthors: [a, b]\ndraft: true\n---\nbody").unwrap();
        assert_eq!(front.extra.len(), 2);
        assert_eq!(front.extra["draft"], serde_json::Value::Bool(true));
    }

    #[test]
    fn no_front_matter_returns_whole_input() {
        let input = "# Just a doc\n\ncontent";
        let (front, body) = split_front_matter(input).unwrap();
        assert!(front.is_empty());
        assert_eq!(body, input);
    }

    #[test]
    fn unclosed_fence_is_an_error() {
        let err = split_front_matter("---\ntitle: x\n").unwrap_err();
        assert!(matches!(err, MarkdownError::UnclosedFrontMatter));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(split_front_matter("---\n: broken\n---\nbody").is_err());
    }

    #[test]
    fn empty_block_is_empty_front_matter() {
        let (front, body) = split_front_matter("---\n---\nbody").unwrap();
        assert!(front.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn fence_as_final_line() {
        let (front, body) = split_front_matter("---\nid: x\n---").unwrap();
        assert_eq!(front.id.as_deref(), Some("x"));
        assert_eq!(body, "");
    }

    #[test]
    fn crlf_front_matter() {
        let (front, body) = split_front_matter("---\r\ntitle: T\r\n---\r\nbody").unwrap();
        assert_eq!(front.title.as_deref(), Some("T"));
        assert_eq!(body, "body");
    }

    #[test]
    fn thematic_break_later_is_not_front_matter() {
        let input = "intro\n\n---\n\nmore";
        let (front, body) = split_front_matter(input).unwrap();
        assert!(front.is_empty());
        assert_eq!(body, input);
    }

    #[test]
    fn round_trips_through_json() {
        let (front, _) = split_front_matter("---\ntitle: T\nweight: 3\n---\n").unwrap();
        let json = serde_json::to_value(&front).unwrap();
        assert_eq!(json["title"], "T");
        assert_eq!(json["weight"], 3);
        assert!(json.get("id").is_none());
    }
}
