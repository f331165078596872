//! Convert a JSON Schema document into a graph of canonical types.
//!
//! The input is a draft-04 subset (`type`, `$ref`, `definitions`,
//! `properties`, `required`, `additionalProperties`, `items`, `enum`,
//! `oneOf`, `anyOf`, `title`, `format`). The output is a [`TypeGraph`]
//! plus the handle of the top-level type. Self-referential classes and
//! maps are supported; every schema location yields at most one type.
//!
//! ```
//! use json_typegraph::{convert_schema, ConvertOptions, Type};
//!
//! let schema = serde_json::json!({
//!     "type": "object",
//!     "properties": { "next": { "$ref": "#" } }
//! });
//! let conv = convert_schema(&schema, &ConvertOptions::default()).unwrap();
//! assert!(matches!(conv.graph.lookup_type(conv.root), Some(Type::Class(_))));
//! ```
pub mod clique;
pub mod config;
pub mod convert;
pub mod emit;
pub mod error;
pub mod ir;
pub mod names;
pub mod reference;
pub mod schema;

use serde_json::Value;
use tracing::debug;

pub use config::ConvertOptions;
pub use convert::Converter;
pub use error::{Error, Result};
pub use ir::{Deferred, PrimitiveKind, Type, TypeGraph, TypeRef};
pub use names::TypeNames;
pub use reference::{parse_ref, resolve_ref, PathElement, Ref};

/// Result of converting one document.
#[derive(Debug)]
pub struct Conversion {
    pub graph: TypeGraph,
    pub root: TypeRef,
}

/// Convert `document` (rooted at `#`) into a fresh type graph.
pub fn convert_schema(document: &Value, options: &ConvertOptions) -> Result<Conversion> {
    let mut converter = Converter::new(document);
    let root_names = TypeNames::inferred(options.root_name.as_str());
    let root = converter.to_type(document, &Ref::root(), root_names)?;
    let graph = converter.into_graph();
    debug!(types = graph.len(), %root, "converted schema");
    Ok(Conversion { graph, root })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_convert() {
        for (name, src) in [
            ("linked-list", include_str!("../fixtures/linked-list.json")),
            ("tree", include_str!("../fixtures/tree.json")),
            ("dictionary", include_str!("../fixtures/dictionary.json")),
            ("union-shapes", include_str!("../fixtures/union-shapes.json")),
        ] {
            let doc: Value = serde_json::from_str(src).unwrap();
            let conv = convert_schema(&doc, &ConvertOptions::default())
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            assert!(conv.graph.lookup_type(conv.root).is_some(), "{name}");
        }
    }

    #[test]
    fn root_name_is_overridable() {
        let doc = serde_json::json!({ "type": "object", "properties": {} });
        let opts = ConvertOptions { root_name: "Welcome".into() };
        let conv = convert_schema(&doc, &opts).unwrap();
        assert_eq!(conv.graph.names_of(conv.root), Some(&TypeNames::inferred("Welcome")));

        let titled = serde_json::json!({ "title": "Greeting", "type": "object", "properties": {} });
        let conv = convert_schema(&titled, &opts).unwrap();
        assert_eq!(conv.graph.names_of(conv.root), Some(&TypeNames::explicit("Greeting")));
    }

    #[test]
    fn unsupported_cycle_fixture_fails() {
        let src = include_str!("../fixtures/invalid/union-cycle.json");
        let doc: Value = serde_json::from_str(src).unwrap();
        assert!(matches!(
            convert_schema(&doc, &ConvertOptions::default()),
            Err(Error::UnresolvableRecursion { .. })
        ));
    }
}
