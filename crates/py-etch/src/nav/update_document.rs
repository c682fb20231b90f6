//! Navigation document updates
//!
//! Locates the configured anchor or group inside a `docs.json`-style
//! navigation document and splices the generated subtree into it. Every
//! value outside the target node is carried through untouched.

use super::NavNode;
use crate::diagnostics::{EtchError, EtchResult};
use crate::docgen::output::{write_if_changed, WriteStatus};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Key of the one-time insertion marker `{"$etch": "generated"}`
pub const PLACEHOLDER_KEY: &str = "$etch";
const PLACEHOLDER_VALUE: &str = "generated";

/// The insertion marker value
pub fn placeholder() -> Value {
    let mut map = serde_json::Map::new();
    map.insert(PLACEHOLDER_KEY.to_string(), Value::from(PLACEHOLDER_VALUE));
    Value::Object(map)
}

/// Whether `value` is the insertion marker
pub fn is_placeholder(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => map.len() == 1 && map.get(PLACEHOLDER_KEY).and_then(Value::as_str) == Some(PLACEHOLDER_VALUE),
        None => false,
    }
}

/// How the generated subtree was merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The insertion marker was replaced
    ReplacedPlaceholder,
    /// The target's children were overwritten
    ReplacedChildren,
}

/// Result of updating a navigation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavUpdateResult {
    /// JSON pointer of the target node
    pub location: String,
    pub outcome: MergeOutcome,
    pub status: WriteStatus,
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn node_name(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    map.get("anchor")
        .or_else(|| map.get("group"))
        .and_then(Value::as_str)
}

/// JSON pointers of every node named `name`, in document order.
///
/// The search starts at the `"navigation"` value when the document has one.
pub fn find_targets(doc: &Value, name: &str) -> Vec<String> {
    let (start, base) = match doc.get("navigation") {
        Some(nav) => (nav, "/navigation".to_string()),
        None => (doc, String::new()),
    };

    let mut found = Vec::new();
    let mut stack = vec![(base, start)];
    while let Some((pointer, value)) = stack.pop() {
        if node_name(value) == Some(name) {
            found.push(pointer.clone());
        }
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter().rev() {
                    if child.is_object() || child.is_array() {
                        stack.push((format!("{}/{}", pointer, escape_pointer_token(key)), child));
                    }
                }
            }
            Value::Array(items) => {
                for (idx, child) in items.iter().enumerate().rev() {
                    if child.is_object() || child.is_array() {
                        stack.push((format!("{}/{}", pointer, idx), child));
                    }
                }
            }
            _ => {}
        }
    }
    found
}

/// Pointers (relative to `node`) of arrays holding a marker, with the marker index.
///
/// Searches every depth so misplaced markers are reported rather than
/// silently dropped.
fn find_placeholders(node: &Value) -> Vec<(String, usize)> {
    let mut found = Vec::new();
    let mut stack = vec![(String::new(), node)];
    while let Some((pointer, value)) = stack.pop() {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter() {
                    stack.push((format!("{}/{}", pointer, escape_pointer_token(key)), child));
                }
            }
            Value::Array(items) => {
                for (idx, child) in items.iter().enumerate() {
                    if is_placeholder(child) {
                        found.push((pointer.clone(), idx));
                    } else {
                        stack.push((format!("{}/{}", pointer, idx), child));
                    }
                }
            }
            _ => {}
        }
    }
    found
}

/// Splice `subtree` into the node named `name`.
///
/// The target's children list (`pages`, else `groups`, else a new `pages`)
/// is overwritten with the subtree. On the first run that list may hold
/// just the marker; a marker anywhere else inside the target is an error,
/// since a later run would no longer find it and would overwrite its
/// siblings. Returns the target's pointer and how it was merged.
pub fn merge_navigation(
    doc: &mut Value,
    name: &str,
    subtree: &[NavNode],
) -> EtchResult<(String, MergeOutcome)> {
    let mut targets = find_targets(doc, name);
    let location = match targets.len() {
        0 => return Err(EtchError::NavigationTargetNotFound(name.to_string())),
        1 => targets.remove(0),
        _ => {
            return Err(EtchError::NavigationTargetAmbiguous {
                name: name.to_string(),
                locations: targets,
            })
        }
    };

    let generated: Vec<Value> = subtree
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;

    let target = doc
        .pointer_mut(&location)
        .ok_or_else(|| EtchError::other(format!("navigation node vanished at {}", location)))?;

    let markers = find_placeholders(target);
    if markers.len() > 1 {
        return Err(EtchError::PlaceholderAmbiguous {
            name: name.to_string(),
            count: markers.len(),
        });
    }
    if let Some((array_pointer, idx)) = markers.into_iter().next() {
        let sole_child = matches!(array_pointer.as_str(), "/pages" | "/groups")
            && target
                .pointer(&array_pointer)
                .and_then(Value::as_array)
                .map_or(false, |items| items.len() == 1);
        if !sole_child {
            return Err(EtchError::PlaceholderMisplaced {
                name: name.to_string(),
                location: format!("{}{}/{}", location, array_pointer, idx),
            });
        }
        if let Some(slot) = target.pointer_mut(&array_pointer) {
            *slot = Value::Array(generated);
            return Ok((location, MergeOutcome::ReplacedPlaceholder));
        }
    }

    let Value::Object(map) = target else {
        return Err(EtchError::other(format!("navigation node at {} is not an object", location)));
    };
    let key = if map.contains_key("pages") {
        "pages"
    } else if map.contains_key("groups") {
        "groups"
    } else {
        "pages"
    };
    map.insert(key.to_string(), Value::Array(generated));
    Ok((location, MergeOutcome::ReplacedChildren))
}

/// Read, merge and (when the text changed) rewrite a navigation file.
///
/// On any error the file is left as it was.
pub fn update_navigation_file(
    path: &Path,
    name: &str,
    subtree: &[NavNode],
) -> EtchResult<NavUpdateResult> {
    let text = fs::read_to_string(path)?;
    let mut doc: Value = serde_json::from_str(&text)?;

    let (location, outcome) = merge_navigation(&mut doc, name, subtree)?;
    let mut updated = serde_json::to_string_pretty(&doc)?;
    updated.push('\n');

    let status = write_if_changed(path, &updated)?;
    tracing::info!(
        target_name = name,
        location = %location,
        ?outcome,
        ?status,
        "updated navigation"
    );

    Ok(NavUpdateResult {
        location,
        outcome,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn subtree() -> Vec<NavNode> {
        vec![NavNode::Group {
            group: "pkg".into(),
            pages: vec![NavNode::Page("sdk/pkg-__init__".into()), NavNode::Page("sdk/pkg-core".into())],
        }]
    }

    fn site() -> Value {
        json!({
            "theme": "mint",
            "navigation": {
                "anchors": [
                    { "anchor": "Guides", "pages": ["intro", { "group": "Deep", "pages": ["a"] }] },
                    { "anchor": "SDK Reference", "pages": [{ "$etch": "generated" }] }
                ]
            }
        })
    }

    #[test]
    fn test_placeholder_replaced_in_place() {
        let mut doc = site();
        let before_guides = doc["navigation"]["anchors"][0].clone();

        let (location, outcome) = merge_navigation(&mut doc, "SDK Reference", &subtree()).unwrap();
        assert_eq!(location, "/navigation/anchors/1");
        assert_eq!(outcome, MergeOutcome::ReplacedPlaceholder);
        assert_eq!(
            doc["navigation"]["anchors"][1]["pages"],
            json!([{ "group": "pkg", "pages": ["sdk/pkg-__init__", "sdk/pkg-core"] }])
        );
        assert_eq!(doc["navigation"]["anchors"][0], before_guides);
        assert_eq!(doc["theme"], "mint");
    }

    #[test]
    fn test_without_placeholder_children_are_overwritten() {
        let mut doc = json!({ "navigation": [{ "group": "API", "pages": ["stale"] }] });
        let (_, outcome) = merge_navigation(&mut doc, "API", &subtree()).unwrap();
        assert_eq!(outcome, MergeOutcome::ReplacedChildren);
        assert_eq!(doc["navigation"][0]["pages"][0]["group"], "pkg");
        assert_eq!(doc["navigation"][0]["pages"].as_array().unwrap().len(), 1);

        let mut groups = json!([{ "anchor": "API", "groups": [] }]);
        merge_navigation(&mut groups, "API", &subtree()).unwrap();
        assert!(groups[0].get("pages").is_none());
        assert_eq!(groups[0]["groups"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_target_not_found() {
        let mut doc = site();
        let err = merge_navigation(&mut doc, "Missing", &subtree()).unwrap_err();
        assert!(matches!(err, EtchError::NavigationTargetNotFound(ref n) if n == "Missing"));
        assert_eq!(doc, site());
    }

    #[test]
    fn test_duplicate_targets_are_reported() {
        let mut doc = json!({
            "navigation": [
                { "group": "API", "pages": [] },
                { "anchor": "Other", "pages": [{ "group": "API", "pages": [] }] }
            ]
        });
        let err = merge_navigation(&mut doc, "API", &subtree()).unwrap_err();
        match err {
            EtchError::NavigationTargetAmbiguous { locations, .. } => {
                assert_eq!(locations, vec!["/navigation/0", "/navigation/1/pages/0"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_multiple_placeholders_are_rejected() {
        let mut doc = json!([{ "group": "API", "pages": [placeholder(), "x", placeholder()] }]);
        let err = merge_navigation(&mut doc, "API", &subtree()).unwrap_err();
        assert!(matches!(err, EtchError::PlaceholderAmbiguous { count: 2, .. }));
    }

    #[test]
    fn test_placeholder_beside_siblings_is_rejected() {
        let mut doc = json!([{ "group": "API", "pages": ["intro", placeholder(), "faq"] }]);
        let before = doc.clone();
        let err = merge_navigation(&mut doc, "API", &subtree()).unwrap_err();
        match err {
            EtchError::PlaceholderMisplaced { location, .. } => assert_eq!(location, "/0/pages/1"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn test_nested_placeholder_requires_inner_group_as_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        let original = r#"{"navigation": {"anchors": [{"anchor": "SDK Reference", "groups": [{"group": "Modules", "pages": [{"$etch": "generated"}]}]}]}}"#;
        fs::write(&path, original).unwrap();

        let err = update_navigation_file(&path, "SDK Reference", &subtree()).unwrap_err();
        match err {
            EtchError::PlaceholderMisplaced { ref location, .. } => {
                assert_eq!(location, "/navigation/anchors/0/groups/0/pages/0");
                assert!(err.to_string().contains("name the group"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        let first = update_navigation_file(&path, "Modules", &subtree()).unwrap();
        assert_eq!(first.outcome, MergeOutcome::ReplacedPlaceholder);
        let text = fs::read_to_string(&path).unwrap();

        let second = update_navigation_file(&path, "Modules", &subtree()).unwrap();
        assert_eq!(second.outcome, MergeOutcome::ReplacedChildren);
        assert_eq!(second.status, WriteStatus::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), text);

        let doc: Value = serde_json::from_str(&text).unwrap();
        let sdk = &doc["navigation"]["anchors"][0];
        assert_eq!(sdk["anchor"], "SDK Reference");
        assert_eq!(sdk["groups"][0]["group"], "Modules");
        assert_eq!(sdk["groups"][0]["pages"][0]["group"], "pkg");
    }

    #[test]
    fn test_foreign_numbers_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(
            &path,
            r#"{"scale": 1e3, "ratio": 0.10, "id": 123456789012345678901234567890, "name": "Caf\u00e9", "navigation": [{"group": "API", "pages": []}]}"#,
        )
        .unwrap();

        update_navigation_file(&path, "API", &subtree()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#""scale": 1e3"#));
        assert!(text.contains(r#""ratio": 0.10"#));
        assert!(text.contains(r#""id": 123456789012345678901234567890"#));
        assert!(text.contains(r#""name": "Café""#));
    }

    #[test]
    fn test_update_file_is_idempotent_and_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(
            &path,
            r#"{"zeta": 1, "alpha": 2, "navigation": [{"group": "API", "pages": [{"$etch": "generated"}]}]}"#,
        )
        .unwrap();

        let first = update_navigation_file(&path, "API", &subtree()).unwrap();
        assert_eq!(first.outcome, MergeOutcome::ReplacedPlaceholder);
        assert_eq!(first.status, WriteStatus::Updated);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.find("\"zeta\"").unwrap() < text.find("\"alpha\"").unwrap());

        let second = update_navigation_file(&path, "API", &subtree()).unwrap();
        assert_eq!(second.outcome, MergeOutcome::ReplacedChildren);
        assert_eq!(second.status, WriteStatus::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_missing_target_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        let original = "{\"navigation\": [ {\"group\": \"Guides\", \"pages\": []} ]}";
        fs::write(&path, original).unwrap();

        assert!(update_navigation_file(&path, "API", &subtree()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }
}
