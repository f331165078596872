//! Read-only view over one schema node.
//!
//! Only the keywords the converter understands are exposed; anything else
//! is ignored. Property iteration follows document order, which relies on
//! serde_json's `preserve_order` feature.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::reference::Ref;

#[derive(Debug, Clone, Copy)]
pub struct Schema<'a> {
    map: &'a Map<String, Value>,
}

/// The `additionalProperties` keyword.
#[derive(Debug, Clone, Copy)]
pub enum AdditionalProperties<'a> {
    Allowed,
    Forbidden,
    Schema(&'a Value),
}

impl<'a> Schema<'a> {
    pub fn new(value: &'a Value, path: &Ref) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            _ => Err(Error::NotASchema { path: path.to_string() }),
        }
    }

    pub fn title(&self) -> Option<&'a str> {
        self.map.get("title").and_then(Value::as_str)
    }

    pub fn reference(&self) -> Result<Option<&'a str>> {
        match self.map.get("$ref") {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(Error::ReferenceSyntax(other.to_string())),
        }
    }

    /// `enum` cases; every case must be a string.
    pub fn enum_cases(&self, path: &Ref) -> Result<Option<Vec<&'a str>>> {
        let Some(raw) = self.map.get("enum") else { return Ok(None) };
        let invalid = || Error::InvalidEnum { path: path.to_string() };
        let xs = raw.as_array().ok_or_else(invalid)?;
        xs.iter()
            .map(|x| x.as_str().ok_or_else(invalid))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// `type` normalized to a non-empty list of names.
    pub fn type_names(&self, path: &Ref) -> Result<Option<Vec<&'a str>>> {
        let Some(raw) = self.map.get("type") else { return Ok(None) };
        let names = match raw {
            Value::String(s) => vec![s.as_str()],
            Value::Array(xs) => xs
                .iter()
                .map(|x| {
                    x.as_str().ok_or_else(|| Error::MalformedKeyword {
                        keyword: "type",
                        path: path.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => {
                return Err(Error::MalformedKeyword { keyword: "type", path: path.to_string() });
            }
        };
        if names.is_empty() {
            return Err(Error::EmptyTypeList { path: path.to_string() });
        }
        Ok(Some(names))
    }

    pub fn one_of(&self, path: &Ref) -> Result<Option<&'a [Value]>> {
        self.array_keyword("oneOf", path)
    }

    pub fn any_of(&self, path: &Ref) -> Result<Option<&'a [Value]>> {
        self.array_keyword("anyOf", path)
    }

    /// Declared properties in document order.
    pub fn properties(&self, path: &Ref) -> Result<Option<Vec<(&'a str, &'a Value)>>> {
        match self.map.get("properties") {
            None => Ok(None),
            Some(Value::Object(props)) => {
                Ok(Some(props.iter().map(|(k, v)| (k.as_str(), v)).collect()))
            }
            Some(_) => {
                Err(Error::MalformedKeyword { keyword: "properties", path: path.to_string() })
            }
        }
    }

    pub fn required(&self, path: &Ref) -> Result<Vec<&'a str>> {
        let malformed = || Error::MalformedKeyword { keyword: "required", path: path.to_string() };
        match self.map.get("required") {
            None => Ok(Vec::new()),
            Some(Value::Array(xs)) => xs
                .iter()
                .map(|x| x.as_str().ok_or_else(malformed))
                .collect(),
            Some(_) => Err(malformed()),
        }
    }

    /// `None` when absent or not one of the recognized forms.
    pub fn additional_properties(&self) -> Option<AdditionalProperties<'a>> {
        match self.map.get("additionalProperties")? {
            Value::Bool(true) => Some(AdditionalProperties::Allowed),
            Value::Bool(false) => Some(AdditionalProperties::Forbidden),
            v @ Value::Object(_) => Some(AdditionalProperties::Schema(v)),
            _ => None,
        }
    }

    pub fn items(&self, path: &Ref) -> Result<Option<&'a Value>> {
        match self.map.get("items") {
            None => Ok(None),
            Some(v @ Value::Object(_)) => Ok(Some(v)),
            Some(_) => Err(Error::MalformedKeyword { keyword: "items", path: path.to_string() }),
        }
    }

    pub fn format(&self) -> Option<&'a str> {
        self.map.get("format").and_then(Value::as_str)
    }

    fn array_keyword(&self, keyword: &'static str, path: &Ref) -> Result<Option<&'a [Value]>> {
        match self.map.get(keyword) {
            None => Ok(None),
            Some(Value::Array(xs)) => Ok(Some(xs.as_slice())),
            Some(_) => Err(Error::MalformedKeyword { keyword, path: path.to_string() }),
        }
    }
}
