//! Unification of candidate types (⊔).
//!
//! Inputs are sorted into one bucket per kind, nested unions and
//! nullables are flattened on the way in, and each bucket is reduced to
//! at most one member. Members are then packed into a single union, which
//! degenerates to its only member when there is just one.
//!
//! - classes and maps never mix;
//! - several maps become one map over the unified value types;
//! - several classes are merged property by property (see [`crate::clique`]);
//! - enum cases accumulate; array item types unify recursively;
//! - `any` absorbs everything; `null` makes the result nullable.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::Converter;
use crate::clique::{self, Unifier};
use crate::error::{Error, Result};
use crate::ir::{Deferred, PrimitiveKind, Type, TypeGraph, TypeRef};
use crate::names::TypeNames;
use crate::reference::{PathElement, Ref};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum StringKind {
    Plain,
    Date,
    Time,
    DateTime,
}

#[derive(Debug, Default)]
struct Buckets {
    has_any: bool,
    nullable: bool,
    has_bool: bool,
    has_integer: bool,
    has_double: bool,
    strings: BTreeSet<StringKind>,
    enum_cases: Option<IndexSet<String>>,
    array_items: Vec<TypeRef>,
    maps: IndexSet<TypeRef>,
    classes: IndexSet<TypeRef>,
}

impl Buckets {
    fn observe(&mut self, graph: &TypeGraph, t: TypeRef) {
        let Some(ty) = graph.lookup_type(t) else {
            debug!(ty = %t, "skipping handle unknown to the graph");
            return;
        };
        match ty {
            Type::Primitive(kind) => match kind {
                PrimitiveKind::Any => self.has_any = true,
                PrimitiveKind::Null => self.nullable = true,
                PrimitiveKind::Bool => self.has_bool = true,
                PrimitiveKind::Integer => self.has_integer = true,
                PrimitiveKind::Double => self.has_double = true,
                PrimitiveKind::Date => {
                    self.strings.insert(StringKind::Date);
                }
                PrimitiveKind::Time => {
                    self.strings.insert(StringKind::Time);
                }
                PrimitiveKind::DateTime => {
                    self.strings.insert(StringKind::DateTime);
                }
            },
            Type::String => {
                self.strings.insert(StringKind::Plain);
            }
            Type::Enum(cases) => {
                self.enum_cases.get_or_insert_with(IndexSet::new).extend(cases.iter().cloned());
            }
            Type::Array(items) => self.array_items.push(*items),
            Type::Map(_) => {
                self.maps.insert(t);
            }
            Type::Class(_) => {
                self.classes.insert(t);
            }
            Type::Union(members) => {
                for &m in members {
                    self.observe(graph, m);
                }
            }
            Type::Nullable(inner) => {
                self.nullable = true;
                self.observe(graph, *inner);
            }
        }
    }
}

impl<'a> Converter<'a> {
    /// Unify the candidate `types` found at `path`.
    pub fn unify_types(
        &mut self,
        types: &[TypeRef],
        names: TypeNames,
        path: &Ref,
    ) -> Result<TypeRef> {
        match types {
            [] => return Err(Error::EmptyUnification),
            [single] => return Ok(*single),
            _ => {}
        }

        let mut b = Buckets::default();
        for &t in types {
            b.observe(&self.graph, t);
        }

        if !b.classes.is_empty() && !b.maps.is_empty() {
            return Err(Error::ClassMapConflict);
        }
        if b.has_any {
            debug!(count = types.len(), "unification absorbed by any");
            return Ok(self.graph.primitive_type(PrimitiveKind::Any));
        }

        let object = if !b.maps.is_empty() {
            Some(self.unify_maps(&b.maps, &names, path)?)
        } else {
            match b.classes.len() {
                0 => None,
                1 => Some(b.classes[0]),
                _ => Some(self.merge_classes(&b.classes, names.clone(), path)?),
            }
        };

        let mut members: Vec<TypeRef> = object.into_iter().collect();
        for (present, kind) in [
            (b.has_bool, PrimitiveKind::Bool),
            (b.has_integer, PrimitiveKind::Integer),
            (b.has_double, PrimitiveKind::Double),
        ] {
            if present {
                members.push(self.graph.primitive_type(kind));
            }
        }
        for kind in &b.strings {
            members.push(match kind {
                StringKind::Plain => self.graph.string_type(names.clone()),
                StringKind::Date => self.graph.primitive_type(PrimitiveKind::Date),
                StringKind::Time => self.graph.primitive_type(PrimitiveKind::Time),
                StringKind::DateTime => self.graph.primitive_type(PrimitiveKind::DateTime),
            });
        }
        if let Some(cases) = b.enum_cases.take() {
            members.push(self.graph.enum_type(names.clone(), cases));
        }
        if !b.array_items.is_empty() {
            let items_path = path.child(PathElement::Items);
            let items = self.unify_types(&b.array_items, names.singularize(), &items_path)?;
            members.push(self.graph.array_type(items));
        }

        let core = match members.len() {
            // only null was observed
            0 => return Ok(self.graph.primitive_type(PrimitiveKind::Null)),
            1 => members[0],
            _ => self.graph.union_type(names.clone(), members),
        };
        Ok(if b.nullable { self.graph.make_nullable(core, names) } else { core })
    }

    fn unify_maps(
        &mut self,
        maps: &IndexSet<TypeRef>,
        names: &TypeNames,
        path: &Ref,
    ) -> Result<TypeRef> {
        if maps.len() == 1 {
            return Ok(maps[0]);
        }
        let values: Vec<TypeRef> =
            maps.iter().filter_map(|&m| self.graph.map_values(m)).collect();
        let value_path = path.child(PathElement::AdditionalProperty);
        let value_type = self.unify_types(&values, names.singularize(), &value_path)?;
        Ok(self.graph.map_type(value_type))
    }

    /// Every class must be complete; one still under construction cannot
    /// be merged.
    fn merge_classes(
        &mut self,
        classes: &IndexSet<TypeRef>,
        names: TypeNames,
        path: &Ref,
    ) -> Result<TypeRef> {
        let mut shapes = Vec::with_capacity(classes.len());
        for &c in classes {
            match self.graph.lookup_type(c) {
                Some(Type::Class(Deferred::Resolved(props))) => shapes.push(props.clone()),
                _ => {
                    debug!(%path, class = %c, "class still under construction");
                    return Err(Error::UnresolvableRecursion { path: path.to_string() });
                }
            }
        }
        debug!(%path, classes = shapes.len(), "merging class clique");
        let merged: IndexMap<String, TypeRef> =
            clique::merge_class_properties(&shapes, path, self)?;
        Ok(self.graph.unique_class_type(names, Some(merged)))
    }
}

impl Unifier for Converter<'_> {
    fn unify(&mut self, types: &[TypeRef], names: TypeNames, path: &Ref) -> Result<TypeRef> {
        self.unify_types(types, names, path)
    }
    fn make_nullable(&mut self, ty: TypeRef, names: TypeNames) -> TypeRef {
        self.graph.make_nullable(ty, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn n(s: &str) -> TypeNames {
        TypeNames::inferred(s)
    }

    fn class(cv: &mut Converter<'_>, props: &[(&str, TypeRef)]) -> TypeRef {
        let props = props.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        cv.graph.unique_class_type(n("C"), Some(props))
    }

    #[test]
    fn empty_and_single() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let empty = cv.unify_types(&[], n("x"), &Ref::root());
        assert!(matches!(empty, Err(Error::EmptyUnification)));
        let s = cv.graph.string_type(n("s"));
        assert_eq!(cv.unify_types(&[s], n("x"), &Ref::root()).unwrap(), s);
    }

    #[test]
    fn integer_and_double_stay_distinct() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let i = cv.graph.primitive_type(PrimitiveKind::Integer);
        let d = cv.graph.primitive_type(PrimitiveKind::Double);
        let u = cv.unify_types(&[i, d], n("num"), &Ref::root()).unwrap();
        assert_eq!(cv.graph.lookup_type(u), Some(&Type::Union(vec![i, d])));
    }

    #[test]
    fn classes_merge_by_property() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let int = cv.graph.primitive_type(PrimitiveKind::Integer);
        let string = cv.graph.string_type(n("a"));
        let boolean = cv.graph.primitive_type(PrimitiveKind::Bool);
        let c1 = class(&mut cv, &[("a", int)]);
        let c2 = class(&mut cv, &[("a", string), ("b", boolean)]);

        let merged = cv.unify_types(&[c1, c2], n("Merged"), &Ref::root()).unwrap();
        let g = cv.graph();
        let Some(Type::Class(Deferred::Resolved(props))) = g.lookup_type(merged) else {
            panic!("expected class");
        };
        assert_eq!(props.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(g.lookup_type(props["a"]), Some(&Type::Union(vec![int, string])));
        assert_eq!(g.lookup_type(props["b"]), Some(&Type::Nullable(boolean)));
    }

    #[test]
    fn same_class_twice_passes_through() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let c = class(&mut cv, &[]);
        assert_eq!(cv.unify_types(&[c, c], n("x"), &Ref::root()).unwrap(), c);
    }

    #[test]
    fn class_and_map_conflict() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let c = class(&mut cv, &[]);
        let any = cv.graph.primitive_type(PrimitiveKind::Any);
        let m = cv.graph.map_type(any);
        let mixed = cv.unify_types(&[c, m], n("x"), &Ref::root());
        assert!(matches!(mixed, Err(Error::ClassMapConflict)));
    }

    #[test]
    fn maps_unify_their_values() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let i = cv.graph.primitive_type(PrimitiveKind::Integer);
        let b = cv.graph.primitive_type(PrimitiveKind::Bool);
        let mi = cv.graph.map_type(i);
        let mb = cv.graph.map_type(b);
        let u = cv.unify_types(&[mi, mb], n("scores"), &Ref::root()).unwrap();
        let values = cv.graph.map_values(u).unwrap();
        assert_eq!(cv.graph.lookup_type(values), Some(&Type::Union(vec![b, i])));
        assert_eq!(cv.graph.names_of(values), Some(&n("score")));
    }

    #[test]
    fn null_wraps_and_nested_unions_flatten() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let s = cv.graph.string_type(n("s"));
        let null = cv.graph.primitive_type(PrimitiveKind::Null);
        let i = cv.graph.primitive_type(PrimitiveKind::Integer);

        let ns = cv.unify_types(&[s, null], n("s"), &Ref::root()).unwrap();
        assert_eq!(cv.graph.lookup_type(ns), Some(&Type::Nullable(s)));

        let outer = cv.unify_types(&[ns, i], n("v"), &Ref::root()).unwrap();
        let Some(Type::Nullable(core)) = cv.graph.lookup_type(outer) else {
            panic!("expected nullable");
        };
        assert_eq!(cv.graph.lookup_type(*core), Some(&Type::Union(vec![i, s])));

        assert_eq!(cv.unify_types(&[null, null], n("z"), &Ref::root()).unwrap(), null);
    }

    #[test]
    fn any_absorbs() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let any = cv.graph.primitive_type(PrimitiveKind::Any);
        let s = cv.graph.string_type(n("s"));
        assert_eq!(cv.unify_types(&[s, any], n("x"), &Ref::root()).unwrap(), any);
    }

    #[test]
    fn arrays_unify_items_and_string_kinds_stay_apart() {
        let doc = Value::Null;
        let mut cv = Converter::new(&doc);
        let s = cv.graph.string_type(n("s"));
        let d = cv.graph.primitive_type(PrimitiveKind::Date);
        let i = cv.graph.primitive_type(PrimitiveKind::Integer);
        let ai = cv.graph.array_type(i);
        let ad = cv.graph.array_type(d);

        let u = cv.unify_types(&[s, d, ai, ad], n("things"), &Ref::root()).unwrap();
        let Some(Type::Union(members)) = cv.graph.lookup_type(u) else { panic!("expected union") };
        let members = members.clone();
        assert_eq!(members.len(), 3);
        assert_eq!(members[0], s);
        assert_eq!(members[1], d);
        let Some(Type::Array(items)) = cv.graph.lookup_type(members[2]) else {
            panic!("expected array");
        };
        assert_eq!(cv.graph.lookup_type(*items), Some(&Type::Union(vec![i, d])));
    }

    #[test]
    fn multi_class_one_of_from_schema() {
        let doc = json!({
            "oneOf": [
                { "type": "object", "properties": { "a": { "type": "integer" } }, "required": ["a"] },
                {
                    "type": "object",
                    "properties": { "a": { "type": "string" }, "b": { "type": "boolean" } },
                    "required": ["a", "b"]
                }
            ]
        });
        let mut cv = Converter::new(&doc);
        let root = cv.to_type(&doc, &Ref::root(), TypeNames::explicit("Shape")).unwrap();
        let g = cv.graph();
        let Some(Type::Class(Deferred::Resolved(props))) = g.lookup_type(root) else {
            panic!("expected class");
        };
        assert_eq!(g.names_of(root), Some(&TypeNames::explicit("Shape")));
        let Some(Type::Union(a)) = g.lookup_type(props["a"]) else { panic!("expected union") };
        assert_eq!(a.len(), 2);
        let Some(Type::Nullable(b)) = g.lookup_type(props["b"]) else {
            panic!("expected nullable");
        };
        assert_eq!(g.lookup_type(*b), Some(&Type::Primitive(PrimitiveKind::Bool)));
    }

    #[test]
    fn merging_a_class_under_construction_fails_at_the_union_path() {
        let doc = json!({
            "$ref": "#/definitions/Tree",
            "definitions": {
                "Tree": {
                    "type": "object",
                    "properties": {
                        "child": {
                            "oneOf": [
                                { "$ref": "#/definitions/Tree" },
                                { "$ref": "#/definitions/Leaf" }
                            ]
                        }
                    }
                },
                "Leaf": { "type": "object", "properties": { "v": { "type": "integer" } } }
            }
        });
        let mut cv = Converter::new(&doc);
        let err = cv.to_type(&doc, &Ref::root(), n("Root")).unwrap_err();
        let Error::UnresolvableRecursion { path } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(path, "#/definitions/Tree/properties/child");
    }
}
