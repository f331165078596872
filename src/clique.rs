//! Property merging for a clique of classes.
//!
//! Given the property maps of several classes that must become one, every
//! property name seen in any class becomes one merged property. Its type
//! is the unification of that property's types across the classes that
//! declare it, made nullable when some class lacks it.

use indexmap::IndexMap;

use crate::error::Result;
use crate::ir::TypeRef;
use crate::names::TypeNames;
use crate::reference::{PathElement, Ref};

/// Operations the merge needs from whoever owns the type graph.
pub trait Unifier {
    fn unify(&mut self, types: &[TypeRef], names: TypeNames, path: &Ref) -> Result<TypeRef>;
    fn make_nullable(&mut self, ty: TypeRef, names: TypeNames) -> TypeRef;
}

/// Merged property order is first appearance, scanning classes in order.
pub fn merge_class_properties<U: Unifier>(
    classes: &[IndexMap<String, TypeRef>],
    path: &Ref,
    unifier: &mut U,
) -> Result<IndexMap<String, TypeRef>> {
    let mut candidates: IndexMap<&str, Vec<TypeRef>> = IndexMap::new();
    for props in classes {
        for (name, &ty) in props {
            candidates.entry(name.as_str()).or_default().push(ty);
        }
    }

    let mut merged = IndexMap::with_capacity(candidates.len());
    for (name, types) in candidates {
        let names = TypeNames::inferred(name);
        let prop_path = path.child(PathElement::Property(name.to_string()));
        let mut ty = unifier.unify(&types, names.clone(), &prop_path)?;
        if types.len() < classes.len() {
            ty = unifier.make_nullable(ty, names);
        }
        merged.insert(name.to_string(), ty);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Records calls; `unify` returns its first input.
    #[derive(Default)]
    struct Recorder {
        unified: Vec<(Vec<TypeRef>, String, String)>,
        nulled: Vec<TypeRef>,
    }

    impl Unifier for Recorder {
        fn unify(&mut self, types: &[TypeRef], names: TypeNames, path: &Ref) -> Result<TypeRef> {
            self.unified.push((types.to_vec(), names.name().to_string(), path.to_string()));
            types.first().copied().ok_or(Error::EmptyUnification)
        }
        fn make_nullable(&mut self, ty: TypeRef, _names: TypeNames) -> TypeRef {
            self.nulled.push(ty);
            ty
        }
    }

    fn props(pairs: &[(&str, TypeRef)]) -> IndexMap<String, TypeRef> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn shared_properties_unify_and_missing_ones_become_nullable() {
        use crate::ir::{PrimitiveKind, TypeGraph};
        let mut g = TypeGraph::new();
        let int = g.primitive_type(PrimitiveKind::Integer);
        let string = g.string_type(TypeNames::inferred("a"));
        let boolean = g.primitive_type(PrimitiveKind::Bool);

        let c1 = props(&[("a", int)]);
        let c2 = props(&[("a", string), ("b", boolean)]);

        let mut rec = Recorder::default();
        let merged = merge_class_properties(&[c1, c2], &Ref::root(), &mut rec).unwrap();

        assert_eq!(merged.keys().collect::<Vec<_>>(), ["a", "b"]);
        let entry = |types: Vec<TypeRef>, name: &str| {
            (types, name.to_string(), format!("#/properties/{name}"))
        };
        assert_eq!(rec.unified[0], entry(vec![int, string], "a"));
        assert_eq!(rec.unified[1], entry(vec![boolean], "b"));
        assert_eq!(rec.nulled, vec![boolean]);
    }
}
