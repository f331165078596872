use indexmap::IndexMap;
use serde_json::Value;

use super::Converter;
use crate::error::Result;
use crate::ir::{PrimitiveKind, TypeRef};
use crate::names::TypeNames;
use crate::reference::{PathElement, Ref};
use crate::schema::{AdditionalProperties, Schema};

impl<'a> Converter<'a> {
    /// `"type": "object"`: a class when properties are declared, otherwise
    /// a map or an empty class depending on `additionalProperties`.
    pub(super) fn object_type(
        &mut self,
        s: Schema<'a>,
        path: &Ref,
        names: TypeNames,
    ) -> Result<TypeRef> {
        if let Some(properties) = s.properties(path)? {
            return self.class_type(s, properties, path, names);
        }
        match s.additional_properties() {
            Some(AdditionalProperties::Forbidden) => {
                Ok(self.graph.unique_class_type(names, Some(IndexMap::new())))
            }
            Some(AdditionalProperties::Schema(values)) => self.lazy_map_type(values, path, names),
            Some(AdditionalProperties::Allowed) | None => {
                let any = self.graph.primitive_type(PrimitiveKind::Any);
                Ok(self.graph.map_type(any))
            }
        }
    }

    fn class_type(
        &mut self,
        s: Schema<'a>,
        properties: Vec<(&'a str, &'a Value)>,
        path: &Ref,
        names: TypeNames,
    ) -> Result<TypeRef> {
        let required = s.required(path)?;

        let class = self.graph.unique_class_type(names, None);
        self.register(path, class);

        let mut props = IndexMap::with_capacity(properties.len());
        for (name, schema) in properties {
            let prop_names = TypeNames::inferred(name);
            let prop_path = path.child(PathElement::Property(name.to_string()));
            let mut ty = self.to_type(schema, &prop_path, prop_names.clone())?;
            if !required.contains(&name) {
                ty = self.graph.make_nullable(ty, prop_names);
            }
            props.insert(name.to_string(), ty);
        }

        self.graph.set_class_properties(class, props)?;
        Ok(class)
    }

    fn lazy_map_type(
        &mut self,
        values: &'a Value,
        path: &Ref,
        names: TypeNames,
    ) -> Result<TypeRef> {
        let map = self.graph.lazy_map_type();
        self.register(path, map);

        let value_path = path.child(PathElement::AdditionalProperty);
        let value_type = self.to_type(values, &value_path, names.singularize())?;
        self.graph.resolve_map(map, value_type)?;
        Ok(map)
    }
}
