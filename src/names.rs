//! Naming hints attached to produced types.
//!
//! A name is either explicit (a `title`, a definition name) or inferred
//! (a property name, the caller's root name). Downstream naming may
//! override inferred names; explicit ones win whenever both are seen.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeNames {
    name: String,
    inferred: bool,
}

/// Ordered suffix rules; the first match wins.
static SINGULAR_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)^(.*[^aeiou])ies$", "${1}y"),
        (r"(?i)^(.*(?:s|x|z|ch|sh))es$", "${1}"),
        (r"(?i)^(.*(?:ss|us|is))$", "${1}"),
        (r"(?i)^(.+)s$", "${1}"),
    ]
    .into_iter()
    .filter_map(|(rx, rep)| Regex::new(rx).ok().map(|rx| (rx, rep)))
    .collect()
});

impl TypeNames {
    pub fn new(name: impl Into<String>, inferred: bool) -> Self {
        Self { name: name.into(), inferred }
    }
    pub fn explicit(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }
    pub fn inferred(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn are_inferred(&self) -> bool {
        self.inferred
    }

    pub fn make_inferred(&self) -> Self {
        Self::inferred(self.name.clone())
    }

    /// Name for an element of a collection named `self` (array items, map
    /// values). The result is always inferred.
    pub fn singularize(&self) -> Self {
        Self::inferred(singular(&self.name))
    }

    /// Keep the stronger of two hints: explicit beats inferred, otherwise
    /// the first one seen stays.
    pub fn prefer(self, other: TypeNames) -> TypeNames {
        if self.inferred && !other.inferred { other } else { self }
    }
}

fn singular(word: &str) -> String {
    for (rx, rep) in SINGULAR_RULES.iter() {
        if rx.is_match(word) {
            return rx.replace(word, *rep).into_owned();
        }
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singularize_common_suffixes() {
        assert_eq!(TypeNames::explicit("categories").singularize().name(), "category");
        assert_eq!(TypeNames::explicit("boxes").singularize().name(), "box");
        assert_eq!(TypeNames::explicit("matches").singularize().name(), "match");
        assert_eq!(TypeNames::explicit("items").singularize().name(), "item");
        assert_eq!(TypeNames::explicit("address").singularize().name(), "address");
        assert_eq!(TypeNames::explicit("status").singularize().name(), "status");
        assert_eq!(TypeNames::explicit("data").singularize().name(), "data");
    }

    #[test]
    fn singular_and_inferred_forms_are_inferred() {
        let n = TypeNames::explicit("Users");
        assert!(!n.are_inferred());
        assert!(n.singularize().are_inferred());
        assert!(n.make_inferred().are_inferred());
        assert_eq!(n.make_inferred().name(), "Users");
    }

    #[test]
    fn explicit_names_win() {
        let a = TypeNames::inferred("next");
        let b = TypeNames::explicit("Node");
        assert_eq!(a.clone().prefer(b.clone()), b);
        assert_eq!(b.clone().prefer(a.clone()), b);
        assert_eq!(a.clone().prefer(TypeNames::inferred("other")), a);
    }
}
