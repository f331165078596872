// Type graph produced by conversion. Nodes live in an arena and are
// addressed by `TypeRef`; nothing outside this module owns type content.

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};
use crate::names::TypeNames;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(usize);

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Any,
    Null,
    Bool,
    Integer,
    Double,
    Date,
    Time,
    DateTime,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Any => "any",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Date => "date",
            PrimitiveKind::Time => "time",
            PrimitiveKind::DateTime => "date-time",
        }
    }
}

/// A slot filled in after allocation, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred<T> {
    Pending,
    Resolved(T),
}

impl<T> Deferred<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Deferred::Pending => None,
            Deferred::Resolved(x) => Some(x),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveKind),
    String,
    Enum(IndexSet<String>),
    Array(TypeRef),
    Map(Deferred<TypeRef>),
    Class(Deferred<IndexMap<String, TypeRef>>),
    /// Two or more members; never contains null, any, nullables or unions.
    Union(Vec<TypeRef>),
    /// Never wraps null, any or another nullable.
    Nullable(TypeRef),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub ty: Type,
    pub names: Option<TypeNames>,
}

/// Structural identity for interned nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Primitive(PrimitiveKind),
    String,
    Enum(Vec<String>),
    Array(TypeRef),
    Map(TypeRef),
    Union(Vec<TypeRef>),
    Nullable(TypeRef),
}

#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: Vec<Node>,
    interned: HashMap<Key, TypeRef>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn lookup_type(&self, r: TypeRef) -> Option<&Type> {
        self.nodes.get(r.0).map(|n| &n.ty)
    }
    pub fn names_of(&self, r: TypeRef) -> Option<&TypeNames> {
        self.nodes.get(r.0).and_then(|n| n.names.as_ref())
    }

    // ---------------------------- Builders ------------------------------ //

    pub fn primitive_type(&mut self, kind: PrimitiveKind) -> TypeRef {
        self.intern(Key::Primitive(kind), Type::Primitive(kind), None)
    }

    pub fn string_type(&mut self, names: TypeNames) -> TypeRef {
        self.intern(Key::String, Type::String, Some(names))
    }

    pub fn enum_type(&mut self, names: TypeNames, cases: IndexSet<String>) -> TypeRef {
        let mut key: Vec<String> = cases.iter().cloned().collect();
        key.sort();
        self.intern(Key::Enum(key), Type::Enum(cases), Some(names))
    }

    pub fn array_type(&mut self, items: TypeRef) -> TypeRef {
        self.intern(Key::Array(items), Type::Array(items), None)
    }

    pub fn map_type(&mut self, values: TypeRef) -> TypeRef {
        self.intern(Key::Map(values), Type::Map(Deferred::Resolved(values)), None)
    }

    /// Allocate a map whose value type is supplied later via [`resolve_map`].
    ///
    /// [`resolve_map`]: TypeGraph::resolve_map
    pub fn lazy_map_type(&mut self) -> TypeRef {
        self.push(Type::Map(Deferred::Pending), None)
    }

    pub fn resolve_map(&mut self, map: TypeRef, values: TypeRef) -> Result<()> {
        match self.nodes.get_mut(map.0).map(|n| &mut n.ty) {
            Some(Type::Map(slot @ Deferred::Pending)) => {
                *slot = Deferred::Resolved(values);
                Ok(())
            }
            _ => Err(Error::AlreadyResolved { handle: map.to_string() }),
        }
    }

    /// Value type of a map. A map still waiting for [`resolve_map`] refers
    /// to itself.
    ///
    /// [`resolve_map`]: TypeGraph::resolve_map
    pub fn map_values(&self, map: TypeRef) -> Option<TypeRef> {
        match self.lookup_type(map)? {
            Type::Map(Deferred::Resolved(v)) => Some(*v),
            Type::Map(Deferred::Pending) => Some(map),
            _ => None,
        }
    }

    /// A fresh class that is never shared with another request. With
    /// `properties == None` the class is a placeholder to be completed
    /// by [`set_class_properties`].
    ///
    /// [`set_class_properties`]: TypeGraph::set_class_properties
    pub fn unique_class_type(
        &mut self,
        names: TypeNames,
        properties: Option<IndexMap<String, TypeRef>>,
    ) -> TypeRef {
        let body = match properties {
            Some(props) => Deferred::Resolved(props),
            None => Deferred::Pending,
        };
        self.push(Type::Class(body), Some(names))
    }

    pub fn set_class_properties(
        &mut self,
        class: TypeRef,
        properties: IndexMap<String, TypeRef>,
    ) -> Result<()> {
        match self.nodes.get_mut(class.0).map(|n| &mut n.ty) {
            Some(Type::Class(slot @ Deferred::Pending)) => {
                *slot = Deferred::Resolved(properties);
                Ok(())
            }
            _ => Err(Error::AlreadyResolved { handle: class.to_string() }),
        }
    }

    /// Members must already be flattened and free of null/any.
    pub fn union_type(&mut self, names: TypeNames, members: Vec<TypeRef>) -> TypeRef {
        let mut key = members.clone();
        key.sort();
        key.dedup();
        self.intern(Key::Union(key), Type::Union(members), Some(names))
    }

    pub fn make_nullable(&mut self, ty: TypeRef, names: TypeNames) -> TypeRef {
        let already = matches!(
            self.lookup_type(ty),
            Some(Type::Primitive(PrimitiveKind::Null | PrimitiveKind::Any) | Type::Nullable(_))
        );
        if already {
            return ty;
        }
        self.intern(Key::Nullable(ty), Type::Nullable(ty), Some(names))
    }

    // ---------------------------- Internals ----------------------------- //

    fn push(&mut self, ty: Type, names: Option<TypeNames>) -> TypeRef {
        let r = TypeRef(self.nodes.len());
        self.nodes.push(Node { ty, names });
        r
    }

    fn intern(&mut self, key: Key, ty: Type, names: Option<TypeNames>) -> TypeRef {
        if let Some(&r) = self.interned.get(&key) {
            if let Some(names) = names {
                self.add_names(r, names);
            }
            return r;
        }
        let r = self.push(ty, names);
        self.interned.insert(key, r);
        r
    }

    fn add_names(&mut self, r: TypeRef, names: TypeNames) {
        if let Some(node) = self.nodes.get_mut(r.0) {
            node.names = Some(match node.names.take() {
                Some(existing) => existing.prefer(names),
                None => names,
            });
        }
    }
}
