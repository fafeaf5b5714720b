//! Join descriptors and the configuration consumed by the transformer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the join option on generated client methods.
pub const JOIN_PROP: &str = "join";

/// One join: a reference-target type and the properties to expand
/// for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    /// Reference-target type name, canonical PascalCase.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Property names, in declaration order.
    pub props: Vec<String>,
}

/// A join-capable client method: what inspection discovers and what the
/// transformer is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Joins the method offers (after inspection) or should bake in
    /// (as configuration).
    #[serde(default)]
    pub join: Vec<Join>,
}

/// Per-method join selection, accepted in either of two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JoinConfig {
    /// The pruned descriptor list a selection function returns:
    ///
    /// ```json
    /// [{ "name": "loadCategory", "join": [{ "type": "Contact", "props": ["name"] }] }]
    /// ```
    Methods(Vec<Method>),
    /// A nested map of method name to reference type to properties:
    ///
    /// ```json
    /// { "loadCategory": { "Contact": ["name"] } }
    /// ```
    Map(BTreeMap<String, BTreeMap<String, Vec<String>>>),
}

impl JoinConfig {
    /// The joins configured for `method`, or `None` when the method has
    /// no entry at all. Map entries come back sorted by type name, so
    /// output is stable regardless of configuration order.
    pub fn joins_for(&self, method: &str) -> Option<Vec<Join>> {
        match self {
            Self::Methods(methods) => methods
                .iter()
                .find(|m| m.name == method)
                .map(|m| m.join.clone()),
            Self::Map(map) => map.get(method).map(|types| {
                types
                    .iter()
                    .map(|(type_name, props)| Join {
                        type_name: type_name.clone(),
                        props: props.clone(),
                    })
                    .collect()
            }),
        }
    }
}

impl From<Vec<Method>> for JoinConfig {
    fn from(methods: Vec<Method>) -> Self {
        Self::Methods(methods)
    }
}

impl From<BTreeMap<String, BTreeMap<String, Vec<String>>>> for JoinConfig {
    fn from(map: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptor_list_shape() {
        let json = r#"[
            { "name": "loadCategory", "join": [{ "type": "Contact", "props": ["name", "email"] }] },
            { "name": "loadPage" }
        ]"#;
        let config: JoinConfig = serde_json::from_str(json).unwrap();
        let joins = config.joins_for("loadCategory").unwrap();
        assert_eq!(
            joins,
            vec![Join {
                type_name: "Contact".into(),
                props: vec!["name".into(), "email".into()],
            }]
        );
        assert_eq!(config.joins_for("loadPage"), Some(Vec::new()));
        assert_eq!(config.joins_for("unknown"), None);
    }

    #[test]
    fn parses_nested_map_shape() {
        let json = r#"{ "loadCategory": { "Contact": ["name"], "Author": ["bio"] } }"#;
        let config: JoinConfig = serde_json::from_str(json).unwrap();
        let joins = config.joins_for("loadCategory").unwrap();
        // Map entries are sorted by type name.
        assert_eq!(joins[0].type_name, "Author");
        assert_eq!(joins[1].type_name, "Contact");
        assert_eq!(config.joins_for("other"), None);
    }

    #[test]
    fn join_serializes_with_type_key() {
        let join = Join {
            type_name: "Contact".into(),
            props: vec!["name".into()],
        };
        let json = serde_json::to_string(&join).unwrap();
        assert_eq!(json, r#"{"type":"Contact","props":["name"]}"#);
    }
}
