//! Schema locations and `$ref` handling.
//!
//! A [`Ref`] is a root-relative sequence of [`PathElement`]s. The same
//! type addresses a location for memoization and describes the target of
//! a parsed `$ref`.

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    Root,
    Definition(String),
    OneOf(usize),
    AnyOf(usize),
    Property(String),
    AdditionalProperty,
    Items,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref(Vec<PathElement>);

impl Ref {
    pub fn root() -> Self {
        Ref(vec![PathElement::Root])
    }
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Ref(elements)
    }
    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }
    /// A new path one element deeper.
    pub fn child(&self, el: PathElement) -> Self {
        let mut out = self.0.clone();
        out.push(el);
        Ref(out)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Root => write!(f, "#"),
            PathElement::Definition(name) => write!(f, "definitions/{name}"),
            PathElement::OneOf(i) => write!(f, "oneOf/{i}"),
            PathElement::AnyOf(i) => write!(f, "anyOf/{i}"),
            PathElement::Property(name) => write!(f, "properties/{name}"),
            PathElement::AdditionalProperty => write!(f, "additionalProperties"),
            PathElement::Items => write!(f, "items"),
        }
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "#");
        }
        for (i, el) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{el}")?;
        }
        Ok(())
    }
}

// ------------------------------- Parsing --------------------------------- //

/// Parse a `$ref` string of the form `#`, `#/definitions/A`,
/// `#/definitions/A/definitions/B`, ... into a path plus the name to fall
/// back on when the target carries no better one.
pub fn parse_ref(reference: &str) -> Result<(Ref, String)> {
    let syntax = || Error::ReferenceSyntax(reference.to_string());

    let mut elements = Vec::new();
    let mut fallback = None;
    let mut parts = reference.split('/');
    while let Some(part) = parts.next() {
        match part {
            "#" => {
                elements.push(PathElement::Root);
                fallback = Some("Root".to_string());
            }
            "definitions" => {
                let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(syntax)?;
                elements.push(PathElement::Definition(name.to_string()));
                fallback = Some(name.to_string());
            }
            _ => return Err(syntax()),
        }
    }
    let fallback = fallback.ok_or_else(syntax)?;
    Ok((Ref(elements), fallback))
}

// ------------------------------ Resolution ------------------------------- //

/// Walk `reference` from `current` (located at `current_path`), returning
/// the target node and its absolute path.
pub fn resolve_ref<'a>(
    root: &'a Value,
    current: &'a Value,
    current_path: &Ref,
    reference: &Ref,
) -> Result<(&'a Value, Ref)> {
    let mut node = current;
    let mut path = current_path.clone();
    for el in reference.elements() {
        node = match el {
            PathElement::Root => {
                path = Ref::root();
                node = root;
                continue;
            }
            PathElement::Definition(name) => node
                .get("definitions")
                .and_then(|defs| defs.get(name))
                .filter(|v| v.is_object())
                .ok_or_else(|| Error::MissingDefinition {
                    name: name.clone(),
                    path: path.to_string(),
                })?,
            PathElement::OneOf(i) => index_into(node, "oneOf", *i, &path)?,
            PathElement::AnyOf(i) => index_into(node, "anyOf", *i, &path)?,
            PathElement::Property(name) => node
                .get("properties")
                .and_then(|props| props.get(name))
                .ok_or_else(|| Error::MissingProperty {
                    name: name.clone(),
                    path: path.to_string(),
                })?,
            PathElement::AdditionalProperty => {
                object_at(node, "additionalProperties", &path)?
            }
            PathElement::Items => object_at(node, "items", &path)?,
        };
        path = path.child(el.clone());
    }
    Ok((node, path))
}

fn index_into<'a>(
    node: &'a Value,
    keyword: &'static str,
    index: usize,
    path: &Ref,
) -> Result<&'a Value> {
    node.get(keyword)
        .and_then(Value::as_array)
        .and_then(|xs| xs.get(index))
        .ok_or_else(|| Error::Index { keyword, index, path: path.to_string() })
}

fn object_at<'a>(node: &'a Value, keyword: &'static str, path: &Ref) -> Result<&'a Value> {
    node.get(keyword)
        .filter(|v| v.is_object())
        .ok_or_else(|| Error::MalformedKeyword { keyword, path: path.to_string() })
}
