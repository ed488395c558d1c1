//! Fact registry - maps variant names to variants for polymorphic decoding.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::{catalog, FactDraft, FactError, Fact, Variant};

/// Variants known by name.
///
/// Registration is explicit: a variant can only be decoded if it was added
/// with [`Registry::register`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    variants: HashMap<String, Arc<Variant>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry holding every built-in variant.
    pub fn standard() -> &'static Registry {
        static STANDARD: OnceLock<Registry> = OnceLock::new();
        STANDARD.get_or_init(catalog::standard_registry)
    }

    /// Add a variant, replacing any variant with the same name.
    ///
    /// Returns the registered variant for further derivation.
    pub fn register(&mut self, variant: Arc<Variant>) -> Arc<Variant> {
        if self
            .variants
            .insert(variant.name().to_string(), Arc::clone(&variant))
            .is_some()
        {
            tracing::warn!(variant = variant.name(), "fact variant registered twice");
        }
        variant
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Variant>> {
        self.variants.get(name)
    }

    /// Look a variant up, failing with [`FactError::UnknownVariant`].
    pub fn variant(&self, name: &str) -> Result<&Arc<Variant>, FactError> {
        self.get(name)
            .ok_or_else(|| FactError::UnknownVariant(name.to_string()))
    }

    /// Start building a fact of the named variant.
    pub fn draft(&self, name: &str) -> Result<FactDraft, FactError> {
        self.variant(name).map(Fact::draft)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variants.contains_key(name)
    }

    /// Registered variant names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.variants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::{catalog::names, UidRule, Value};

    #[test]
    fn test_standard_registry_contents() {
        let registry = Registry::standard();

        for name in [
            names::STATE,
            names::START,
            names::FINISH,
            names::CHOICE,
            names::JUMP,
            names::OPTION,
            names::OPTIONS_LINK,
            names::CHOICE_PATH,
            names::LOCATED_IN,
            names::PREFERENCE_HOMETOWN,
            names::MESSAGE,
            names::GIVE_POWER,
            names::ONLY_GOOD_BRANCHES,
            names::ONLY_BAD_BRANCHES,
            names::POINTER,
            names::EVENT,
            names::HERO,
        ] {
            assert!(registry.contains(name), "{name} is not registered");
        }
        assert!(!registry.contains(names::FACT));
    }

    #[test]
    fn test_unknown_variant() {
        let registry = Registry::new();
        assert_eq!(
            registry.draft("Jump").map(|_| ()),
            Err(FactError::UnknownVariant("Jump".into()))
        );
    }

    #[test]
    fn test_register_custom_variant() {
        let mut registry = Registry::new();
        let root = Variant::root("Fact").build();
        let rumour = registry.register(
            Variant::derive("Rumour", &root)
                .required("text")
                .uid(UidRule::Derived(|a| {
                    Some(format!("#rumour<{}>", a.get("text")?.as_text()?))
                }))
                .build(),
        );

        assert_eq!(registry.names(), ["Rumour"]);
        let fact = Fact::draft(&rumour).with("text", "dragons").build().unwrap();
        assert_eq!(fact.uid(), "#rumour<dragons>");

        let decoded = Fact::deserialize(&fact.serialize(), &registry).unwrap();
        assert_eq!(decoded, fact);
        assert_eq!(decoded.get("text"), Some(&Value::from("dragons")));
    }
}
