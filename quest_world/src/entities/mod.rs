//! Entity definitions for the quest world.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for all entities in the world.
///
/// Entity uids are plain strings so that facts can refer to them textually
/// (`"place#1"`, `"person#smith"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Mint a fresh random id for an entity of the given kind.
    pub fn new(kind: EntityKind) -> Self {
        Self(format!("{}#{}", kind.prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Types of entities in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hero,
    Place,
    Person,
    Mob,
}

impl EntityKind {
    /// Prefix used when minting uids for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Hero => "hero",
            EntityKind::Place => "place",
            EntityKind::Person => "person",
            EntityKind::Mob => "mob",
        }
    }
}

/// An entity known to the world roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub uid: EntityId,
    pub kind: EntityKind,

    /// Display name.
    pub name: Option<String>,

    /// Where the entity currently is. Places have none.
    pub place: Option<EntityId>,

    /// Profession, for persons.
    pub profession: Option<String>,

    /// Terrains a place consists of or a mob lives in.
    pub terrains: Vec<String>,
}

impl Entity {
    /// Create a new entity of the given kind with a minted uid.
    pub fn new(kind: EntityKind) -> Self {
        Self::with_uid(EntityId::new(kind), kind)
    }

    /// Create a new entity with an explicit uid.
    pub fn with_uid(uid: impl Into<EntityId>, kind: EntityKind) -> Self {
        Self {
            uid: uid.into(),
            kind,
            name: None,
            place: None,
            profession: None,
            terrains: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Put the entity into a place.
    pub fn located_in(mut self, place: impl Into<EntityId>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Set the profession.
    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = Some(profession.into());
        self
    }

    /// Add a terrain.
    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrains.push(terrain.into());
        self
    }

    /// Check if the entity is located in one of the given places.
    pub fn is_in_any(&self, places: &[&str]) -> bool {
        self.place
            .as_ref()
            .is_some_and(|place| places.contains(&place.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_uid_has_kind_prefix() {
        let place = Entity::new(EntityKind::Place);
        assert!(place.uid.as_str().starts_with("place#"));

        let other = Entity::new(EntityKind::Place);
        assert_ne!(place.uid, other.uid);
    }

    #[test]
    fn test_entity_builder() {
        let smith = Entity::with_uid("person#smith", EntityKind::Person)
            .with_name("Smith")
            .with_profession("blacksmith")
            .located_in("place#forge");

        assert_eq!(smith.uid.as_str(), "person#smith");
        assert_eq!(smith.profession.as_deref(), Some("blacksmith"));
        assert!(smith.is_in_any(&["place#mill", "place#forge"]));
        assert!(!smith.is_in_any(&["place#mill"]));
    }

    #[test]
    fn test_entity_id_display() {
        let id = EntityId::from("hero#1");
        assert_eq!(id.to_string(), "hero#1");
    }
}
