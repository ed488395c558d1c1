//! Fact variants - per-variant attribute schemas and uid rules.
//!
//! A variant's schema is composed once, when the variant is declared: it
//! starts as a copy of the parent's schema and is extended with the
//! variant's own attributes. A redeclared attribute keeps its position and
//! takes the new default.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Value;

/// Attribute values of a fact, keyed by attribute name.
pub type Attributes = BTreeMap<String, Value>;

/// Formats a uid from a fact's attributes. `None` means a needed attribute
/// is missing or has the wrong shape.
pub type UidFormat = fn(&Attributes) -> Option<String>;

/// How a variant obtains its uid.
#[derive(Debug, Clone, Copy)]
pub enum UidRule {
    /// The `uid` attribute is supplied by whoever builds the fact.
    Supplied,
    /// Always the same uid; exactly one such fact exists at a time.
    Fixed(&'static str),
    /// Computed from reference attributes.
    Derived(UidFormat),
    /// The variant only exists to be derived from.
    Abstract,
}

/// One attribute of a variant's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub name: String,
    pub default: Value,
    pub required: bool,
}

/// A concrete fact type: name, lineage, schema and uid rule.
#[derive(Debug)]
pub struct Variant {
    name: String,
    /// Own name first, then ancestors up to the root.
    lineage: Vec<String>,
    attributes: Vec<AttributeSpec>,
    references: Vec<String>,
    serializable: Vec<String>,
    uid_rule: UidRule,
}

impl Variant {
    /// Start declaring a root variant with the base schema every fact carries.
    pub fn root(name: impl Into<String>) -> VariantBuilder {
        let name = name.into();
        let attributes = [
            ("uid", Value::None),
            ("tags", Value::List(Vec::new())),
            ("label", Value::None),
            ("description", Value::None),
            ("exceptions", Value::None),
            ("externals", Value::None),
        ]
        .into_iter()
        .map(|(name, default)| AttributeSpec {
            name: name.to_string(),
            default,
            required: false,
        })
        .collect();

        VariantBuilder {
            lineage: vec![name.clone()],
            name,
            attributes,
            references: Vec::new(),
            serializable: Vec::new(),
            uid_rule: UidRule::Supplied,
        }
    }

    /// Start declaring a variant that inherits everything from `parent`.
    pub fn derive(name: impl Into<String>, parent: &Variant) -> VariantBuilder {
        let name = name.into();
        let mut lineage = Vec::with_capacity(parent.lineage.len() + 1);
        lineage.push(name.clone());
        lineage.extend(parent.lineage.iter().cloned());

        VariantBuilder {
            name,
            lineage,
            attributes: parent.attributes.clone(),
            references: parent.references.clone(),
            serializable: parent.serializable.clone(),
            uid_rule: parent.uid_rule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// Check if this variant is `ancestor` or derives from it.
    pub fn is_a(&self, ancestor: &str) -> bool {
        self.lineage.iter().any(|name| name == ancestor)
    }

    /// The schema, in declaration order.
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|spec| spec.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.name.as_str())
    }

    /// Attributes holding uids of other facts or entities.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Check if an attribute holds a list of nested facts.
    pub fn is_serializable(&self, name: &str) -> bool {
        self.serializable.iter().any(|n| n == name)
    }

    pub fn serializable(&self) -> &[String] {
        &self.serializable
    }

    pub fn uid_rule(&self) -> UidRule {
        self.uid_rule
    }

    /// Apply the uid rule. Empty uids count as not computed.
    pub fn compute_uid(&self, attributes: &Attributes) -> Option<String> {
        let uid = match self.uid_rule {
            UidRule::Supplied => attributes.get("uid")?.as_text()?.to_string(),
            UidRule::Fixed(uid) => uid.to_string(),
            UidRule::Derived(format) => format(attributes)?,
            UidRule::Abstract => return None,
        };
        (!uid.is_empty()).then_some(uid)
    }
}

/// Declares a [`Variant`].
#[derive(Debug)]
pub struct VariantBuilder {
    name: String,
    lineage: Vec<String>,
    attributes: Vec<AttributeSpec>,
    references: Vec<String>,
    serializable: Vec<String>,
    uid_rule: UidRule,
}

impl VariantBuilder {
    /// Declare an optional attribute, or override an inherited default.
    pub fn attribute(mut self, name: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        match self.attributes.iter_mut().find(|spec| spec.name == name) {
            Some(spec) => spec.default = default,
            None => self.attributes.push(AttributeSpec {
                name: name.to_string(),
                default,
                required: false,
            }),
        }
        self
    }

    /// Declare an attribute that must be supplied at construction.
    pub fn required(mut self, name: &str) -> Self {
        match self.attributes.iter_mut().find(|spec| spec.name == name) {
            Some(spec) => spec.required = true,
            None => self.attributes.push(AttributeSpec {
                name: name.to_string(),
                default: Value::None,
                required: true,
            }),
        }
        self
    }

    /// Replace the reference set.
    pub fn references(mut self, names: &[&str]) -> Self {
        self.references = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Mark attributes as composites holding nested facts.
    pub fn serializable(mut self, names: &[&str]) -> Self {
        for name in names {
            if !self.serializable.iter().any(|n| n == name) {
                self.serializable.push(name.to_string());
            }
        }
        self
    }

    pub fn uid(mut self, rule: UidRule) -> Self {
        self.uid_rule = rule;
        self
    }

    pub fn build(self) -> Arc<Variant> {
        Arc::new(Variant {
            name: self.name,
            lineage: self.lineage,
            attributes: self.attributes,
            references: self.references,
            serializable: self.serializable,
            uid_rule: self.uid_rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_uid(attributes: &Attributes) -> Option<String> {
        let a = attributes.get("a")?.as_text()?;
        let b = attributes.get("b")?.as_text()?;
        Some(format!("#pair<{a}, {b}>"))
    }

    #[test]
    fn test_root_schema() {
        let root = Variant::root("Fact").build();
        let names: Vec<_> = root.attributes().iter().map(|s| s.name.as_str()).collect();

        assert_eq!(
            names,
            ["uid", "tags", "label", "description", "exceptions", "externals"]
        );
        assert_eq!(root.required().count(), 0);
        assert!(matches!(root.uid_rule(), UidRule::Supplied));
    }

    #[test]
    fn test_schema_composition() {
        let root = Variant::root("Fact").build();
        let parent = Variant::derive("Parent", &root)
            .attribute("colour", "red")
            .serializable(&["items"])
            .attribute("items", Value::Facts(Vec::new()))
            .build();
        let child = Variant::derive("Child", &parent)
            .attribute("colour", "blue")
            .required("size")
            .build();

        assert_eq!(child.lineage(), ["Child", "Parent", "Fact"]);
        assert!(child.is_a("Parent"));
        assert!(!parent.is_a("Child"));

        // overridden default keeps its position
        let colour = child.attribute("colour").unwrap();
        assert_eq!(colour.default, Value::from("blue"));
        assert_eq!(child.attributes()[6].name, "colour");
        assert_eq!(parent.attribute("colour").unwrap().default, Value::from("red"));

        assert!(child.is_serializable("items"));
        assert_eq!(child.required().collect::<Vec<_>>(), ["size"]);
    }

    #[test]
    fn test_compute_uid() {
        let root = Variant::root("Fact").build();
        let pair = Variant::derive("Pair", &root)
            .required("a")
            .required("b")
            .uid(UidRule::Derived(pair_uid))
            .build();

        let mut attributes = Attributes::new();
        attributes.insert("a".into(), Value::from("x"));
        assert_eq!(pair.compute_uid(&attributes), None);

        attributes.insert("b".into(), Value::from("y"));
        assert_eq!(pair.compute_uid(&attributes).as_deref(), Some("#pair<x, y>"));
    }

    #[test]
    fn test_supplied_and_abstract_uids() {
        let root = Variant::root("Fact").build();
        let abstract_variant = Variant::derive("Abstract", &root)
            .uid(UidRule::Abstract)
            .build();

        let mut attributes = Attributes::new();
        assert_eq!(root.compute_uid(&attributes), None);

        attributes.insert("uid".into(), Value::from(""));
        assert_eq!(root.compute_uid(&attributes), None);

        attributes.insert("uid".into(), Value::from("q1_start"));
        assert_eq!(root.compute_uid(&attributes).as_deref(), Some("q1_start"));
        assert_eq!(abstract_variant.compute_uid(&attributes), None);
    }
}
