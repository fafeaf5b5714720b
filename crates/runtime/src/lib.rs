//! Runtime resolution of reference markers in API response payloads.
//!
//! Responses from the content API arrive in a compact form: wherever one
//! entity points at another, the payload carries a small *reference marker*
//! (`{ "_id": ..., "_ref": ... }`) instead of the entity itself, and the
//! referenced entities travel once, out of line, in a `_refs` table at the
//! payload root. [`resolve_refs`] merges the referenced entities back into
//! place so callers see the joined shape.
//!
//! The build tool in `refjoin-core` injects a TypeScript rendition of the
//! same algorithm into every generated client; this crate is its
//! server-side twin and the implementation the tests pin down. Both sides
//! agree on the key names exported here.

use serde_json::{Map, Value};

/// Key of the reference table attached to a payload root.
pub const REFS_KEY: &str = "_refs";

/// Key naming the reference kind on a marker object.
pub const REF_KEY: &str = "_ref";

/// Key carrying the referenced entity id on a marker object.
pub const ID_KEY: &str = "_id";

/// Key carrying a media marker's source path.
pub const SRC_KEY: &str = "_src";

/// Reference kind for content entities.
pub const CONTENT_KIND: &str = "content";

/// Reference kind for media entities.
pub const MEDIA_KIND: &str = "media";

/// Discriminator key narrowing a marker of `kind` to one entity type,
/// e.g. `_content` for content markers.
pub fn kind_discriminator(kind: &str) -> String {
    format!("_{kind}")
}

/// Coordinates of an entity currently being merged. Markers that point
/// back at an entity already on this stack are left unresolved.
type EntityCoord = (String, Option<String>, String);

/// Resolve every reference marker in `payload` against the `_refs` table
/// at its root.
///
/// The table is removed from the result. Each marker object keeps its own
/// keys and additionally gains the fields of the entity it points at;
/// entity fields win when names collide. Markers whose entity cannot be
/// found, and markers that close a reference cycle, are left as they are.
/// A payload without a `_refs` table (or one that is not an object at
/// all) comes back unchanged.
pub fn resolve_refs(payload: Value) -> Value {
    match payload {
        Value::Object(mut root) => {
            let Some(refs) = root.remove(REFS_KEY) else {
                return Value::Object(root);
            };
            let mut data = Value::Object(root);
            let mut in_flight = Vec::new();
            walk(&mut data, &refs, &mut in_flight);
            data
        }
        other => other,
    }
}

fn walk(value: &mut Value, refs: &Value, in_flight: &mut Vec<EntityCoord>) {
    match value {
        Value::Array(items) => {
            for item in items {
                walk(item, refs, in_flight);
            }
        }
        Value::Object(map) => {
            // Keys merged in below must not be revisited at this level,
            // so iterate over a snapshot.
            let keys: Vec<String> = map.keys().cloned().collect();
            for key in keys {
                if key == REF_KEY {
                    merge_entity(map, refs, in_flight);
                }
                if let Some(child) = map.get_mut(&key) {
                    walk(child, refs, in_flight);
                }
            }
        }
        _ => {}
    }
}

/// Merge the entity referenced by the marker `map` into it, resolving the
/// entity's own markers first. Leaves the marker untouched when the table
/// has no matching entry or the entity is already being merged further up
/// the stack.
fn merge_entity(map: &mut Map<String, Value>, refs: &Value, in_flight: &mut Vec<EntityCoord>) {
    let Some(kind) = non_empty_str(map.get(REF_KEY)) else {
        return;
    };
    let Some(id) = entity_id(map.get(ID_KEY)) else {
        return;
    };
    let entity_type = non_empty_str(map.get(&kind_discriminator(&kind)));

    let Some(bucket) = refs.get(&kind) else {
        return;
    };
    let table = match &entity_type {
        Some(name) => match bucket.get(name) {
            Some(inner) => inner,
            None => return,
        },
        None => bucket,
    };
    let Some(entity) = table.get(&id) else {
        return;
    };

    let coord: EntityCoord = (kind, entity_type, id);
    if in_flight.contains(&coord) {
        return;
    }
    in_flight.push(coord);
    let mut resolved = entity.clone();
    walk(&mut resolved, refs, in_flight);
    in_flight.pop();

    if let Value::Object(fields) = resolved {
        for (name, value) in fields {
            map.insert(name, value);
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Entity ids are table keys, so numbers are accepted and rendered in
/// their decimal form.
fn entity_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn payload_without_refs_is_returned_unchanged() {
        let payload = json!({"name": "felix", "tags": ["a", "b"]});
        assert_eq!(resolve_refs(payload.clone()), payload);

        let scalar = json!("just a string");
        assert_eq!(resolve_refs(scalar.clone()), scalar);
        assert_eq!(resolve_refs(Value::Null), Value::Null);
    }

    #[test]
    fn null_refs_table_is_still_removed() {
        // The key comes off even when the table itself is null.
        let payload = json!({"_refs": null, "name": "felix"});
        assert_eq!(resolve_refs(payload), json!({"name": "felix"}));
    }

    #[test]
    fn resolves_content_marker_against_table() {
        let payload = json!({
            "name": "Main",
            "contacts": [
                {
                    "role": "support",
                    "contact": {"_id": "23", "_ref": "content", "_content": "Contact"}
                }
            ],
            "_refs": {
                "content": {
                    "Contact": {
                        "23": {"name": "Felix", "email": "felix@example.com", "other": "some value"}
                    }
                }
            }
        });

        let resolved = resolve_refs(payload);
        let contact = &resolved["contacts"][0]["contact"];
        assert_eq!(contact["name"], "Felix");
        assert_eq!(contact["email"], "felix@example.com");
        assert_eq!(contact["other"], "some value");
        // Marker keys survive the merge.
        assert_eq!(contact["_id"], "23");
        assert_eq!(contact["_ref"], "content");
        assert!(resolved.get(REFS_KEY).is_none());
    }

    #[test]
    fn resolution_is_idempotent() {
        let payload = json!({
            "contact": {"_id": "1", "_ref": "content", "_content": "Contact"},
            "_refs": {"content": {"Contact": {"1": {"name": "Ada"}}}}
        });
        let once = resolve_refs(payload);
        let twice = resolve_refs(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn marker_without_table_entry_is_left_alone() {
        // A miss at any table level leaves the marker untouched.
        let payload = json!({
            "contact": {"_id": "99", "_ref": "content", "_content": "Contact"},
            "author": {"_id": "23", "_ref": "content", "_content": "Author"},
            "other": {"_id": "1", "_ref": "thing"},
            "_refs": {"content": {"Contact": {"23": {"name": "Felix"}}}}
        });
        let resolved = resolve_refs(payload);
        assert_eq!(
            resolved["contact"],
            json!({"_id": "99", "_ref": "content", "_content": "Contact"})
        );
        assert_eq!(
            resolved["author"],
            json!({"_id": "23", "_ref": "content", "_content": "Author"})
        );
        assert_eq!(resolved["other"], json!({"_id": "1", "_ref": "thing"}));
        assert!(resolved.get(REFS_KEY).is_none());
    }

    #[test]
    fn resolves_media_marker_in_flat_bucket() {
        // Media tables are keyed by id directly, without a type level.
        let payload = json!({
            "image": {"_id": "m1", "_ref": "media", "_src": "/media/m1.jpg"},
            "_refs": {
                "media": {
                    "m1": {"originalname": "cat.jpg", "mimetype": "image/jpeg", "size": 1234}
                }
            }
        });
        let resolved = resolve_refs(payload);
        assert_eq!(resolved["image"]["originalname"], "cat.jpg");
        assert_eq!(resolved["image"]["_src"], "/media/m1.jpg");
    }

    #[test]
    fn resolves_markers_nested_in_arrays() {
        let payload = json!({
            "sections": [
                {"items": [{"link": {"_id": "1", "_ref": "content", "_content": "Page"}}]},
                {"items": []}
            ],
            "_refs": {"content": {"Page": {"1": {"title": "Home"}}}}
        });
        let resolved = resolve_refs(payload);
        assert_eq!(resolved["sections"][0]["items"][0]["link"]["title"], "Home");
    }

    #[test]
    fn entities_are_resolved_before_merging() {
        // The table entry itself contains a marker; it must be resolved
        // in the merged output.
        let payload = json!({
            "page": {"_id": "1", "_ref": "content", "_content": "Page"},
            "_refs": {
                "content": {
                    "Page": {
                        "1": {
                            "title": "Home",
                            "author": {"_id": "7", "_ref": "content", "_content": "Author"}
                        }
                    },
                    "Author": {"7": {"name": "Ada"}}
                }
            }
        });
        let resolved = resolve_refs(payload);
        assert_eq!(resolved["page"]["author"]["name"], "Ada");
    }

    #[test]
    fn reference_cycles_terminate() {
        let payload = json!({
            "a": {"_id": "1", "_ref": "content", "_content": "Node"},
            "_refs": {
                "content": {
                    "Node": {
                        "1": {"label": "one", "next": {"_id": "2", "_ref": "content", "_content": "Node"}},
                        "2": {"label": "two", "next": {"_id": "1", "_ref": "content", "_content": "Node"}}
                    }
                }
            }
        });
        let resolved = resolve_refs(payload);
        assert_eq!(resolved["a"]["label"], "one");
        assert_eq!(resolved["a"]["next"]["label"], "two");
        // The edge closing the cycle stays an unresolved marker.
        let back = &resolved["a"]["next"]["next"];
        assert_eq!(back["_id"], "1");
        assert!(back.get("label").is_none());
    }

    #[test]
    fn numeric_ids_match_decimal_table_keys() {
        let payload = json!({
            "contact": {"_id": 23, "_ref": "content", "_content": "Contact"},
            "_refs": {"content": {"Contact": {"23": {"name": "Felix"}}}}
        });
        let resolved = resolve_refs(payload);
        assert_eq!(resolved["contact"]["name"], "Felix");
    }

    #[test]
    fn empty_marker_fields_are_treated_as_missing() {
        let payload = json!({
            "a": {"_id": "", "_ref": "content", "_content": "Contact"},
            "b": {"_id": "23", "_ref": "", "_content": "Contact"},
            "_refs": {"content": {"Contact": {"23": {"name": "Felix"}}}}
        });
        let resolved = resolve_refs(payload);
        assert!(resolved["a"].get("name").is_none());
        assert!(resolved["b"].get("name").is_none());
    }

    #[test]
    fn root_object_can_itself_be_a_marker() {
        let payload = json!({
            "_id": "23", "_ref": "content", "_content": "Contact",
            "_refs": {"content": {"Contact": {"23": {"name": "Felix"}}}}
        });
        let resolved = resolve_refs(payload);
        assert_eq!(resolved["name"], "Felix");
        assert_eq!(resolved["_id"], "23");
    }

    #[test]
    fn entity_fields_win_on_collision() {
        let payload = json!({
            "contact": {"_id": "23", "_ref": "content", "_content": "Contact", "name": "stale"},
            "_refs": {"content": {"Contact": {"23": {"name": "Felix"}}}}
        });
        let resolved = resolve_refs(payload);
        assert_eq!(resolved["contact"]["name"], "Felix");
    }
}
