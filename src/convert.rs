//! Schema → type graph conversion.
//!
//! A [`Converter`] owns everything one conversion call mutates: the type
//! graph, the path memo table and the set of paths whose conversion is
//! still running. Recursive descent threads `&mut self` through every
//! step; nothing is captured implicitly.
//!
//! Cycles terminate through the memo table. Classes and open-ended maps
//! register a placeholder handle at their path *before* converting their
//! children, so a child that refers back to that path receives the
//! placeholder.
//!
//! A path with no placeholder (a `$ref`, a union wrapper, an array) may be
//! re-entered once while its first conversion is still running. The second
//! pass dispatches again and normally lands on a placeholder registered by
//! the first. Reaching the same path a third time means the cycle passes
//! through no class or map, which is an unresolvable recursion.
pub mod class;
pub mod unify;

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::ir::{PrimitiveKind, TypeGraph, TypeRef};
use crate::names::TypeNames;
use crate::reference::{parse_ref, resolve_ref, PathElement, Ref};
use crate::schema::Schema;

pub struct Converter<'a> {
    root: &'a Value,
    graph: TypeGraph,
    memo: HashMap<Ref, TypeRef>,
    in_progress: HashSet<Ref>,
    reentered: HashSet<Ref>,
}

impl<'a> Converter<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            graph: TypeGraph::new(),
            memo: HashMap::new(),
            in_progress: HashSet::new(),
            reentered: HashSet::new(),
        }
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }
    pub fn into_graph(self) -> TypeGraph {
        self.graph
    }

    /// Handle already produced for `path`, if any.
    pub fn lookup_path(&self, path: &Ref) -> Option<TypeRef> {
        self.memo.get(path).copied()
    }

    /// Convert the schema at `path`, reusing the handle recorded for that
    /// path when there is one.
    ///
    /// The recorded handle is stable with one exception: a class placeholder
    /// registered at a path whose final type wraps it (for example
    /// `"type": ["object", "null"]`) is replaced by that final type once
    /// conversion of the path completes.
    pub fn to_type(
        &mut self,
        schema: &'a Value,
        path: &Ref,
        names: TypeNames,
    ) -> Result<TypeRef> {
        if let Some(t) = self.lookup_path(path) {
            trace!(%path, ty = %t, "memo hit");
            return Ok(t);
        }
        if self.in_progress.contains(path) {
            return self.reenter(schema, path, names);
        }
        self.in_progress.insert(path.clone());
        let result = self.convert_to_type(schema, path, names);
        self.in_progress.remove(path);
        let t = result?;
        self.record(path, t);
        Ok(t)
    }

    /// Second pass over a path whose first conversion is still running.
    fn reenter(&mut self, schema: &'a Value, path: &Ref, names: TypeNames) -> Result<TypeRef> {
        if !self.reentered.insert(path.clone()) {
            return Err(Error::UnresolvableRecursion { path: path.to_string() });
        }
        debug!(%path, "re-entering path still in progress");
        let result = self.convert_to_type(schema, path, names);
        self.reentered.remove(path);
        let t = result?;
        self.record(path, t);
        Ok(t)
    }

    fn record(&mut self, path: &Ref, t: TypeRef) {
        if let Some(prev) = self.memo.insert(path.clone(), t) {
            if prev != t {
                debug!(%path, placeholder = %prev, result = %t, "placeholder superseded");
            }
        }
    }

    /// Record a container placeholder so recursive references find it.
    fn register(&mut self, path: &Ref, t: TypeRef) {
        debug!(%path, ty = %t, "registered placeholder");
        self.memo.insert(path.clone(), t);
    }

    fn convert_to_type(
        &mut self,
        schema: &'a Value,
        path: &Ref,
        names: TypeNames,
    ) -> Result<TypeRef> {
        let s = Schema::new(schema, path)?;
        let names = match s.title() {
            Some(title) => TypeNames::explicit(title),
            None => names,
        };

        if let Some(reference) = s.reference()? {
            let (target_ref, fallback) = parse_ref(reference)?;
            let (target, target_path) = resolve_ref(self.root, schema, path, &target_ref)?;
            let names = if names.are_inferred() { TypeNames::explicit(fallback) } else { names };
            return self.to_type(target, &target_path, names);
        }

        if let Some(cases) = s.enum_cases(path)? {
            let cases: IndexSet<String> = cases.into_iter().map(String::from).collect();
            return Ok(self.graph.enum_type(names, cases));
        }

        if let Some(type_names) = s.type_names(path)? {
            let type_names: IndexSet<&str> = type_names.into_iter().collect();
            if type_names.len() == 1 {
                return self.from_type_name(s, path, names, type_names[0]);
            }
            let mut types = Vec::with_capacity(type_names.len());
            for name in type_names {
                types.push(self.from_type_name(s, path, names.clone(), name)?);
            }
            return self.unify_types(&types, names, path);
        }

        let alternatives = match s.one_of(path)? {
            Some(xs) => Some((xs, PathElement::OneOf as fn(usize) -> PathElement)),
            None => s.any_of(path)?.map(|xs| (xs, PathElement::AnyOf as fn(usize) -> PathElement)),
        };
        if let Some((alternatives, element)) = alternatives {
            let mut types = Vec::with_capacity(alternatives.len());
            for (i, alt) in alternatives.iter().enumerate() {
                types.push(self.to_type(alt, &path.child(element(i)), names.make_inferred())?);
            }
            return self.unify_types(&types, names, path);
        }

        Ok(self.graph.primitive_type(PrimitiveKind::Any))
    }

    fn from_type_name(
        &mut self,
        s: Schema<'a>,
        path: &Ref,
        names: TypeNames,
        name: &str,
    ) -> Result<TypeRef> {
        let kind = match name {
            "object" => return self.object_type(s, path, names),
            "array" => {
                let items = match s.items(path)? {
                    Some(items) => {
                        let items_path = path.child(PathElement::Items);
                        self.to_type(items, &items_path, names.singularize())?
                    }
                    None => self.graph.primitive_type(PrimitiveKind::Any),
                };
                return Ok(self.graph.array_type(items));
            }
            "string" => match s.format() {
                None => return Ok(self.graph.string_type(names)),
                Some("date") => PrimitiveKind::Date,
                Some("time") => PrimitiveKind::Time,
                Some("date-time") => PrimitiveKind::DateTime,
                Some(format) => {
                    return Err(Error::UnsupportedFormat {
                        format: format.to_string(),
                        path: path.to_string(),
                    });
                }
            },
            "boolean" => PrimitiveKind::Bool,
            "null" => PrimitiveKind::Null,
            "integer" => PrimitiveKind::Integer,
            "number" => PrimitiveKind::Double,
            other => {
                return Err(Error::UnknownTypeName {
                    name: other.to_string(),
                    path: path.to_string(),
                });
            }
        };
        Ok(self.graph.primitive_type(kind))
    }
}
