//! World roster - the set of entities quests can be populated with.
//!
//! A roster is declared in TOML:
//!
//! ```toml
//! [[places]]
//! uid = "place#harbor"
//! terrains = ["coast"]
//!
//! [[persons]]
//! uid = "person#smith"
//! place = "place#harbor"
//! profession = "blacksmith"
//!
//! [[heroes]]
//! uid = "hero#1"
//! place = "place#harbor"
//! ```
//!
//! Entries without a `uid` get one minted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::entities::{Entity, EntityId, EntityKind};

/// Errors raised while loading a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse roster: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate entity uid in roster: {0}")]
    DuplicateUid(EntityId),

    #[error("entity {entity} is located in unknown place {place}")]
    UnknownPlace { entity: EntityId, place: EntityId },
}

/// One roster entry as written in TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct EntryRecord {
    uid: Option<EntityId>,
    name: Option<String>,
    place: Option<EntityId>,
    profession: Option<String>,
    terrains: Vec<String>,
}

impl EntryRecord {
    fn into_entity(self, kind: EntityKind) -> Entity {
        let mut entity = match self.uid {
            Some(uid) => Entity::with_uid(uid, kind),
            None => Entity::new(kind),
        };
        entity.name = self.name;
        entity.place = self.place;
        entity.profession = self.profession;
        entity.terrains = self.terrains;
        entity
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RosterFile {
    places: Vec<EntryRecord>,
    persons: Vec<EntryRecord>,
    heroes: Vec<EntryRecord>,
    mobs: Vec<EntryRecord>,
}

/// The entities known to the world, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entities: Vec<Entity>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a roster from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, RosterError> {
        let file: RosterFile = toml::from_str(source)?;

        let mut roster = Roster::new();
        let groups = [
            (file.places, EntityKind::Place),
            (file.persons, EntityKind::Person),
            (file.heroes, EntityKind::Hero),
            (file.mobs, EntityKind::Mob),
        ];
        for (records, kind) in groups {
            for record in records {
                roster.insert(record.into_entity(kind))?;
            }
        }

        roster.check_places()?;
        tracing::debug!(entities = roster.len(), "roster loaded");
        Ok(roster)
    }

    /// Read and parse a roster file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Add an entity, rejecting duplicate uids.
    pub fn insert(&mut self, entity: Entity) -> Result<(), RosterError> {
        if self.get(entity.uid.as_str()).is_some() {
            return Err(RosterError::DuplicateUid(entity.uid));
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Builder-style variant of [`Roster::insert`].
    pub fn with(mut self, entity: Entity) -> Result<Self, RosterError> {
        self.insert(entity)?;
        Ok(self)
    }

    /// Get an entity by uid.
    pub fn get(&self, uid: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.uid.as_str() == uid)
    }

    /// All entities of a kind, in declaration order.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    pub fn places(&self) -> impl Iterator<Item = &Entity> {
        self.of_kind(EntityKind::Place)
    }

    pub fn persons(&self) -> impl Iterator<Item = &Entity> {
        self.of_kind(EntityKind::Person)
    }

    pub fn heroes(&self) -> impl Iterator<Item = &Entity> {
        self.of_kind(EntityKind::Hero)
    }

    /// Get all entities in the roster.
    pub fn all(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// The place an entity is located in. A place is its own location.
    pub fn location_of(&self, uid: &str) -> Option<&EntityId> {
        let entity = self.get(uid)?;
        match entity.kind {
            EntityKind::Place => Some(&entity.uid),
            _ => entity.place.as_ref(),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Every `place` reference must name a declared place.
    fn check_places(&self) -> Result<(), RosterError> {
        let places: HashSet<&str> = self.places().map(|p| p.uid.as_str()).collect();

        for entity in &self.entities {
            if let Some(place) = &entity.place {
                if !places.contains(place.as_str()) {
                    return Err(RosterError::UnknownPlace {
                        entity: entity.uid.clone(),
                        place: place.clone(),
                    });
                }
            }
            if entity.kind != EntityKind::Place && entity.place.is_none() {
                tracing::warn!(entity = %entity.uid, "roster entity has no place");
            }
        }
        Ok(())
    }
}
