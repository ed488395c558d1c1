//! Fact definitions - immutable, schema-typed records in the knowledge base.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Attributes, FactError, KnowledgeBase, Registry, Value, Variant};

/// A fact is one unit of narrative or world knowledge.
///
/// Facts are immutable: [`Fact::change`] returns a new fact. Two facts are
/// equal when they have the same variant and every schema attribute is
/// equal, the stored `uid` included.
#[derive(Debug, Clone)]
pub struct Fact {
    variant: Arc<Variant>,
    uid: String,
    /// Every schema attribute, defaults filled in.
    attributes: Attributes,
}

impl Fact {
    /// Construct a fact of `variant` from the supplied attributes.
    pub fn new<I, K>(variant: &Arc<Variant>, attributes: I) -> Result<Self, FactError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let supplied = attributes
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Self::construct(Arc::clone(variant), supplied)
    }

    /// Start a builder-style construction.
    pub fn draft(variant: &Arc<Variant>) -> FactDraft {
        FactDraft {
            variant: Arc::clone(variant),
            attributes: Attributes::new(),
        }
    }

    fn construct(variant: Arc<Variant>, mut supplied: Attributes) -> Result<Self, FactError> {
        if let Some(missing) = variant.required().find(|name| !supplied.contains_key(*name)) {
            return Err(FactError::RequiredAttribute {
                variant: variant.name().to_string(),
                attribute: missing.to_string(),
            });
        }
        if let Some(unknown) = supplied.keys().find(|name| !variant.has_attribute(name)) {
            return Err(FactError::WrongAttribute {
                variant: variant.name().to_string(),
                attribute: unknown.clone(),
            });
        }

        let mut attributes = Attributes::new();
        for spec in variant.attributes() {
            let value = match supplied.remove(&spec.name) {
                Some(value) => normalize(&variant, &spec.name, value)?,
                None => spec.default.clone(),
            };
            attributes.insert(spec.name.clone(), value);
        }

        Self::assemble(variant, attributes)
    }

    /// Compute the uid and store it in the attribute map.
    fn assemble(variant: Arc<Variant>, mut attributes: Attributes) -> Result<Self, FactError> {
        let uid = variant
            .compute_uid(&attributes)
            .ok_or_else(|| FactError::UidNotComputed {
                variant: variant.name().to_string(),
            })?;
        attributes.insert("uid".to_string(), Value::Text(uid.clone()));

        Ok(Self {
            variant,
            uid,
            attributes,
        })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn variant(&self) -> &Arc<Variant> {
        &self.variant
    }

    pub fn variant_name(&self) -> &str {
        self.variant.name()
    }

    /// Check if this fact's variant is `ancestor` or derives from it.
    pub fn is_a(&self, ancestor: &str) -> bool {
        self.variant.is_a(ancestor)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Text value of an attribute.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_text()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_number()
    }

    /// Nested facts of a composite attribute. Empty for anything else.
    pub fn facts(&self, name: &str) -> &[Fact] {
        self.get(name).and_then(Value::as_facts).unwrap_or(&[])
    }

    /// Text items of a list attribute.
    pub fn strings(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .and_then(Value::as_list)
            .map(|items| items.iter().filter_map(Value::as_text).collect())
            .unwrap_or_default()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.strings("tags")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    /// A copy of this fact with some attributes replaced and the uid
    /// recomputed. `self` is untouched.
    pub fn change<I, K>(&self, overrides: I) -> Result<Fact, FactError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut attributes = self.attributes.clone();
        for (name, value) in overrides {
            let name = name.into();
            if !self.variant.has_attribute(&name) {
                return Err(FactError::WrongChangeAttribute {
                    variant: self.variant.name().to_string(),
                    uid: self.uid.clone(),
                    attribute: name,
                });
            }
            let value = normalize(&self.variant, &name, value)?;
            attributes.insert(name, value);
        }

        Self::assemble(Arc::clone(&self.variant), attributes)
    }

    /// Replace this fact in `knowledge_base` with a changed copy.
    pub fn change_in<K, I, N>(&self, knowledge_base: &mut K, overrides: I) -> Result<Fact, FactError>
    where
        K: KnowledgeBase + ?Sized,
        I: IntoIterator<Item = (N, Value)>,
        N: Into<String>,
    {
        let changed = self.change(overrides)?;
        knowledge_base.remove(self);
        knowledge_base.add(changed.clone());
        Ok(changed)
    }

    /// Check if this fact's uid is present in `knowledge_base`.
    pub fn check<K: KnowledgeBase + ?Sized>(&self, knowledge_base: &K) -> bool {
        knowledge_base.contains(&self.uid)
    }

    /// Encode as a record, omitting attributes equal to their default.
    pub fn serialize(&self) -> FactRecord {
        let attributes = self
            .variant
            .attributes()
            .iter()
            .filter_map(|spec| {
                let value = self.attributes.get(&spec.name)?;
                (*value != spec.default).then(|| (spec.name.clone(), value.to_json()))
            })
            .collect();

        FactRecord {
            class: self.variant.name().to_string(),
            attributes,
        }
    }

    /// Rebuild a fact from a record, looking variants up in `registry`.
    pub fn deserialize(record: &FactRecord, registry: &Registry) -> Result<Fact, FactError> {
        let variant = registry.variant(&record.class)?;

        let mut attributes = Attributes::new();
        for (name, json) in &record.attributes {
            let value = if variant.is_serializable(name) {
                decode_composite(json, registry)?
            } else {
                Value::from_json(json)
            };
            attributes.insert(name.clone(), value);
        }

        Self::construct(Arc::clone(variant), attributes)
    }

    pub fn to_json(&self) -> Json {
        self.serialize().to_json()
    }

    pub fn from_json(json: &Json, registry: &Registry) -> Result<Fact, FactError> {
        let record = FactRecord::from_json(json)?;
        Self::deserialize(&record, registry)
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.variant.name() == other.variant.name() && self.attributes == other.attributes
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.variant.name())?;
        let mut first = true;
        for spec in self.variant.attributes() {
            let Some(value) = self.attributes.get(&spec.name) else {
                continue;
            };
            if *value == spec.default {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={}", spec.name, value)?;
        }
        write!(f, ")")
    }
}

/// Builder for a [`Fact`].
#[derive(Debug, Clone)]
pub struct FactDraft {
    variant: Arc<Variant>,
    attributes: Attributes,
}

impl FactDraft {
    /// Set an attribute.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Set the `tags` attribute.
    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with("tags", Value::texts(tags))
    }

    /// Validate and construct the fact.
    pub fn build(self) -> Result<Fact, FactError> {
        Fact::construct(self.variant, self.attributes)
    }
}

/// Serialized form of a fact: `{"class": ..., "attributes": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub class: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Json>,
}

impl FactRecord {
    pub fn to_json(&self) -> Json {
        json!({
            "class": self.class,
            "attributes": self.attributes,
        })
    }

    pub fn from_json(json: &Json) -> Result<Self, FactError> {
        Self::deserialize(json).map_err(|e| FactError::MalformedRecord(e.to_string()))
    }
}

/// Composite attributes must hold facts. An empty plain list is accepted as
/// an empty composite. Plain attributes must be representable in JSON.
fn normalize(variant: &Variant, name: &str, value: Value) -> Result<Value, FactError> {
    if !variant.is_serializable(name) {
        if !value.is_finite() {
            return Err(FactError::NonFiniteNumber {
                variant: variant.name().to_string(),
                attribute: name.to_string(),
            });
        }
        return Ok(value);
    }
    match value {
        Value::Facts(_) => Ok(value),
        Value::List(items) if items.is_empty() => Ok(Value::Facts(Vec::new())),
        _ => Err(FactError::InvalidComposite {
            variant: variant.name().to_string(),
            attribute: name.to_string(),
        }),
    }
}

fn decode_composite(json: &Json, registry: &Registry) -> Result<Value, FactError> {
    let items = json
        .as_array()
        .ok_or_else(|| FactError::MalformedRecord(format!("expected a list of facts, got {json}")))?;

    items
        .iter()
        .map(|item| Fact::from_json(item, registry))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Facts)
}
