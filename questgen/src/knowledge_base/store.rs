//! Knowledge base - the store quest facts are merged into.

use quest_world::{EntityKind, Roster};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::catalog::{self, names};
use super::{Fact, FactError, FactRecord, KnowledgeBaseError, Registry, Value};

/// What quest templates and facts need from a knowledge base.
pub trait KnowledgeBase {
    /// A prefix no earlier call returned.
    fn allocate_namespace(&mut self) -> String;

    /// Store a fact, replacing any fact with the same uid.
    fn add(&mut self, fact: Fact);

    /// Remove the fact with `fact`'s uid.
    fn remove(&mut self, fact: &Fact) -> Option<Fact>;

    /// Facts of `variant` or of any variant derived from it.
    fn filter(&self, variant: &str) -> Vec<&Fact>;

    fn contains(&self, uid: &str) -> bool;

    fn get(&self, uid: &str) -> Option<&Fact>;

    /// Hero actors currently known.
    fn heroes(&self) -> Vec<&Fact> {
        self.filter(names::HERO)
    }

    /// Add every fact in order.
    fn extend<I>(&mut self, facts: I)
    where
        I: IntoIterator<Item = Fact>,
        Self: Sized,
    {
        for fact in facts {
            self.add(fact);
        }
    }
}

/// Configuration for [`MemoryKnowledgeBase`].
#[derive(Debug, Clone)]
pub struct KnowledgeBaseConfig {
    /// Namespaces are `{namespace_prefix}{counter}_`.
    pub namespace_prefix: String,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: "q".to_string(),
        }
    }
}

/// An in-memory knowledge base.
///
/// Facts are kept by uid; iteration and `filter` results are ordered by uid.
#[derive(Debug, Clone, Default)]
pub struct MemoryKnowledgeBase {
    config: KnowledgeBaseConfig,

    /// All facts stored by uid.
    facts: BTreeMap<String, Fact>,

    /// Index: variant name (and every ancestor name) -> uids.
    by_variant: HashMap<String, BTreeSet<String>>,

    /// Namespaces handed out so far.
    namespaces: u64,
}

impl MemoryKnowledgeBase {
    /// Create a new empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KnowledgeBaseConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get the total number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Get all facts, ordered by uid.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Find facts matching a predicate.
    pub fn find_facts<F>(&self, predicate: F) -> Vec<&Fact>
    where
        F: Fn(&Fact) -> bool,
    {
        self.facts.values().filter(|f| predicate(f)).collect()
    }

    /// Serialize every fact.
    pub fn snapshot(&self) -> Vec<FactRecord> {
        self.facts.values().map(Fact::serialize).collect()
    }

    /// Rebuild a knowledge base from a snapshot.
    ///
    /// Any record that fails to decode fails the whole restore.
    pub fn restore(records: &[FactRecord], registry: &Registry) -> Result<Self, FactError> {
        let mut kb = Self::new();
        for record in records {
            kb.add(Fact::deserialize(record, registry)?);
        }
        Ok(kb)
    }

    fn unindex(&mut self, fact: &Fact) {
        for name in fact.variant().lineage() {
            if let Some(uids) = self.by_variant.get_mut(name) {
                uids.remove(fact.uid());
            }
        }
    }
}

impl KnowledgeBase for MemoryKnowledgeBase {
    fn allocate_namespace(&mut self) -> String {
        self.namespaces += 1;
        format!("{}{}_", self.config.namespace_prefix, self.namespaces)
    }

    fn add(&mut self, fact: Fact) {
        let uid = fact.uid().to_string();

        // a replacement may carry another variant under the same uid
        let replaced = match self.facts.remove(&uid) {
            Some(previous) => {
                self.unindex(&previous);
                true
            }
            None => false,
        };

        for name in fact.variant().lineage() {
            self.by_variant
                .entry(name.clone())
                .or_default()
                .insert(uid.clone());
        }
        self.facts.insert(uid.clone(), fact);

        tracing::debug!(uid = %uid, replaced, "fact added");
    }

    fn remove(&mut self, fact: &Fact) -> Option<Fact> {
        let removed = self.facts.remove(fact.uid())?;
        self.unindex(&removed);
        tracing::debug!(uid = %removed.uid(), "fact removed");
        Some(removed)
    }

    fn filter(&self, variant: &str) -> Vec<&Fact> {
        self.by_variant
            .get(variant)
            .map(|uids| uids.iter().filter_map(|uid| self.facts.get(uid)).collect())
            .unwrap_or_default()
    }

    fn contains(&self, uid: &str) -> bool {
        self.facts.contains_key(uid)
    }

    fn get(&self, uid: &str) -> Option<&Fact> {
        self.facts.get(uid)
    }
}

/// Move `object` to `new_place` by replacing its `LocatedIn` fact.
pub fn relocate<K>(knowledge_base: &mut K, object: &str, new_place: &str) -> Result<Fact, KnowledgeBaseError>
where
    K: KnowledgeBase + ?Sized,
{
    let location = knowledge_base
        .filter(names::LOCATED_IN)
        .into_iter()
        .find(|fact| fact.text("object") == Some(object))
        .cloned()
        .ok_or_else(|| KnowledgeBaseError::NotLocated {
            object: object.to_string(),
        })?;

    let moved = location.change_in(knowledge_base, [("place", Value::from(new_place))])?;
    Ok(moved)
}

/// Add an actor fact for every roster entity and a `LocatedIn` fact for
/// every located one.
pub fn populate<K>(knowledge_base: &mut K, roster: &Roster) -> Result<(), FactError>
where
    K: KnowledgeBase + ?Sized,
{
    let registry = Registry::standard();

    for entity in roster.all() {
        let variant = match entity.kind {
            EntityKind::Hero => names::HERO,
            EntityKind::Place => names::PLACE,
            EntityKind::Person => names::PERSON,
            EntityKind::Mob => names::MOB,
        };

        let mut draft = registry.draft(variant)?.with("uid", entity.uid.as_str());
        if let Some(name) = &entity.name {
            draft = draft.with("label", name);
        }
        if let Some(profession) = &entity.profession {
            draft = draft.with("profession", profession);
        }
        if !entity.terrains.is_empty() {
            draft = draft.with("terrains", Value::texts(entity.terrains.iter().cloned()));
        }
        knowledge_base.add(draft.build()?);

        if let Some(place) = &entity.place {
            knowledge_base.add(catalog::located_in(entity.uid.as_str(), place.as_str())?);
        }
    }

    tracing::debug!(entities = roster.len(), "knowledge base populated from roster");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_world::Entity;

    fn hero(uid: &str) -> Fact {
        Registry::standard()
            .draft(names::HERO)
            .unwrap()
            .with("uid", uid)
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_and_get_fact() {
        let mut kb = MemoryKnowledgeBase::new();
        let jump = catalog::jump("q1_a", "q1_b").unwrap();

        kb.add(jump.clone());

        assert!(kb.contains("#jump<q1_a, q1_b>"));
        assert_eq!(kb.get(jump.uid()), Some(&jump));
        assert!(jump.check(&kb));
    }

    #[test]
    fn test_add_replaces_same_uid() {
        let mut kb = MemoryKnowledgeBase::new();
        let message = catalog::message("intro").unwrap();
        let labelled = message.change([("label", Value::from("Intro"))]).unwrap();

        kb.add(message);
        kb.add(labelled.clone());

        assert_eq!(kb.len(), 1);
        assert_eq!(kb.get("#message<intro>"), Some(&labelled));
    }

    #[test]
    fn test_filter_includes_derived_variants() {
        let mut kb = MemoryKnowledgeBase::new();
        kb.add(catalog::jump("q1_a", "q1_b").unwrap());
        kb.add(catalog::option("q1_b", "q1_c").unwrap());
        kb.add(catalog::message("intro").unwrap());

        assert_eq!(kb.filter(names::JUMP).len(), 2);
        assert_eq!(kb.filter(names::OPTION).len(), 1);
        assert_eq!(kb.filter(names::ACTION).len(), 1);
        assert!(kb.filter(names::STATE).is_empty());
    }

    #[test]
    fn test_remove_fact() {
        let mut kb = MemoryKnowledgeBase::new();
        let option = catalog::option("q1_a", "q1_b").unwrap();
        kb.add(option.clone());

        let removed = kb.remove(&option);
        assert_eq!(removed, Some(option.clone()));
        assert!(!option.check(&kb));
        assert!(kb.filter(names::JUMP).is_empty());
        assert_eq!(kb.remove(&option), None);
    }

    #[test]
    fn test_replacement_with_other_variant_reindexes() {
        let mut kb = MemoryKnowledgeBase::new();
        let state = Registry::standard()
            .draft(names::STATE)
            .unwrap()
            .with("uid", "q1_x")
            .build()
            .unwrap();
        let event = catalog::event("q1_x", "same uid").unwrap();

        kb.add(state);
        kb.add(event);

        assert!(kb.filter(names::STATE).is_empty());
        assert_eq!(kb.filter(names::EVENT).len(), 1);
    }

    #[test]
    fn test_namespaces_are_unique() {
        let mut kb = MemoryKnowledgeBase::new();
        assert_eq!(kb.allocate_namespace(), "q1_");
        assert_eq!(kb.allocate_namespace(), "q2_");

        let mut custom = MemoryKnowledgeBase::with_config(KnowledgeBaseConfig {
            namespace_prefix: "ns".into(),
        });
        assert_eq!(custom.allocate_namespace(), "ns1_");
    }

    #[test]
    fn test_heroes() {
        let mut kb = MemoryKnowledgeBase::new();
        kb.add(hero("hero#1"));
        kb.add(catalog::message("intro").unwrap());

        let heroes = kb.heroes();
        assert_eq!(heroes.len(), 1);
        assert_eq!(heroes[0].uid(), "hero#1");
    }

    #[test]
    fn test_relocate() {
        let mut kb = MemoryKnowledgeBase::new();
        kb.add(catalog::located_in("hero#1", "place#1").unwrap());
        kb.add(catalog::located_in("person#1", "place#1").unwrap());

        let moved = relocate(&mut kb, "hero#1", "place#2").unwrap();

        assert_eq!(moved.uid(), "#located_in<hero#1, place#2>");
        assert!(!kb.contains("#located_in<hero#1, place#1>"));
        assert!(kb.contains("#located_in<person#1, place#1>"));
        assert_eq!(kb.len(), 2);

        assert_eq!(
            relocate(&mut kb, "hero#9", "place#2"),
            Err(KnowledgeBaseError::NotLocated {
                object: "hero#9".into()
            })
        );
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut kb = MemoryKnowledgeBase::new();
        kb.add(hero("hero#1"));
        kb.add(catalog::give_power("person#1", -1.0).unwrap());
        kb.add(catalog::options_link(&["#option<a, b>", "#option<c, b>"]).unwrap());

        let text = serde_json::to_string(&kb.snapshot()).unwrap();
        let records: Vec<FactRecord> = serde_json::from_str(&text).unwrap();
        let restored = MemoryKnowledgeBase::restore(&records, Registry::standard()).unwrap();

        assert_eq!(restored.len(), kb.len());
        for fact in kb.iter() {
            assert_eq!(restored.get(fact.uid()), Some(fact));
        }
    }

    #[test]
    fn test_populate_from_roster() {
        let roster = Roster::new()
            .with(Entity::with_uid("place#1", EntityKind::Place).with_terrain("coast"))
            .and_then(|r| r.with(Entity::with_uid("hero#1", EntityKind::Hero).located_in("place#1")))
            .and_then(|r| {
                r.with(
                    Entity::with_uid("person#1", EntityKind::Person)
                        .with_profession("smith")
                        .located_in("place#1"),
                )
            })
            .unwrap();

        let mut kb = MemoryKnowledgeBase::new();
        populate(&mut kb, &roster).unwrap();

        assert_eq!(kb.filter(names::ACTOR).len(), 3);
        assert_eq!(kb.heroes()[0].uid(), "hero#1");
        assert_eq!(kb.get("person#1").unwrap().text("profession"), Some("smith"));
        assert_eq!(kb.get("place#1").unwrap().strings("terrains"), ["coast"]);
        assert!(kb.contains("#located_in<hero#1, place#1>"));
        assert!(kb.contains("#located_in<person#1, place#1>"));
    }
}
