//! JSON rendering of a converted type graph.
//!
//! Only nodes reachable from the root are emitted, keyed by handle in the
//! order they are first reached. Handles are rendered as `"t<N>"`.

use serde_json::{json, Map, Value};

use crate::ir::{Deferred, Type, TypeGraph, TypeRef};

pub fn describe(graph: &TypeGraph, root: TypeRef) -> Value {
    let mut types = Map::new();
    let mut stack = vec![root];
    let mut order = Vec::new();
    let mut seen = std::collections::HashSet::new();

    // depth-first, children pushed in reverse so output follows declaration order
    while let Some(t) = stack.pop() {
        if !seen.insert(t) {
            continue;
        }
        order.push(t);
        let mut children = children_of(graph, t);
        children.reverse();
        stack.extend(children);
    }

    for t in order {
        types.insert(t.to_string(), describe_node(graph, t));
    }
    json!({ "root": root.to_string(), "types": Value::Object(types) })
}

fn children_of(graph: &TypeGraph, t: TypeRef) -> Vec<TypeRef> {
    match graph.lookup_type(t) {
        None | Some(Type::Primitive(_) | Type::String | Type::Enum(_)) => Vec::new(),
        Some(Type::Array(items)) => vec![*items],
        Some(Type::Map(values)) => values.resolved().copied().into_iter().collect(),
        Some(Type::Class(body)) => body
            .resolved()
            .map(|props| props.values().copied().collect())
            .unwrap_or_default(),
        Some(Type::Union(members)) => members.clone(),
        Some(Type::Nullable(inner)) => vec![*inner],
    }
}

fn describe_node(graph: &TypeGraph, t: TypeRef) -> Value {
    let mut o = match graph.lookup_type(t) {
        None => json!({ "kind": "missing" }),
        Some(Type::Primitive(kind)) => json!({ "kind": kind.as_str() }),
        Some(Type::String) => json!({ "kind": "string" }),
        Some(Type::Enum(cases)) => {
            json!({ "kind": "enum", "cases": cases.iter().collect::<Vec<_>>() })
        }
        Some(Type::Array(items)) => json!({ "kind": "array", "items": items.to_string() }),
        Some(Type::Map(values)) => match values {
            Deferred::Resolved(v) => json!({ "kind": "map", "values": v.to_string() }),
            Deferred::Pending => json!({ "kind": "map", "values": null }),
        },
        Some(Type::Class(body)) => {
            let props = match body {
                Deferred::Resolved(props) => Value::Object(
                    props.iter().map(|(k, v)| (k.clone(), Value::from(v.to_string()))).collect(),
                ),
                Deferred::Pending => Value::Null,
            };
            json!({ "kind": "class", "properties": props })
        }
        Some(Type::Union(members)) => json!({
            "kind": "union",
            "members": members.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
        }),
        Some(Type::Nullable(inner)) => json!({ "kind": "nullable", "inner": inner.to_string() }),
    };
    if let Some(names) = graph.names_of(t) {
        o["name"] = Value::from(names.name());
        if names.are_inferred() {
            o["inferred"] = Value::from(true);
        }
    }
    o
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use crate::convert_schema;

    #[test]
    fn linked_list_description() {
        let doc = json!({
            "title": "Node",
            "type": "object",
            "properties": {
                "value": { "type": "integer" },
                "next": { "$ref": "#" }
            },
            "required": ["value"]
        });
        let conv = convert_schema(&doc, &ConvertOptions::default()).unwrap();
        let out = describe(&conv.graph, conv.root);
        let root = out["root"].as_str().unwrap();
        let node = &out["types"][root];
        assert_eq!(node["kind"], "class");
        assert_eq!(node["name"], "Node");
        assert!(node.get("inferred").is_none());

        let value = node["properties"]["value"].as_str().unwrap();
        assert_eq!(out["types"][value]["kind"], "integer");

        let next = node["properties"]["next"].as_str().unwrap();
        assert_eq!(out["types"][next]["kind"], "nullable");
        assert_eq!(out["types"][next]["inner"], root);
    }

    #[test]
    fn output_is_keyed_in_reach_order() {
        let doc = json!({
            "type": "object",
            "properties": {
                "b": { "type": "string" },
                "a": { "type": "array", "items": { "type": "boolean" } }
            },
            "required": ["a", "b"]
        });
        let conv = convert_schema(&doc, &ConvertOptions::default()).unwrap();
        let out = describe(&conv.graph, conv.root);
        let kinds: Vec<&str> = out["types"]
            .as_object()
            .unwrap()
            .values()
            .map(|v| v["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, ["class", "string", "array", "bool"]);
    }
}
