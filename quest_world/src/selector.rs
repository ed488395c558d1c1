//! Entity selection - picks world entities to populate quest templates.

use std::collections::HashSet;

use crate::entities::{EntityId, EntityKind};
use crate::roster::Roster;

/// Errors raised when no entity satisfies a selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("no unused {0:?} left to select")]
    Exhausted(EntityKind),

    #[error("no unused person found in places {places:?}")]
    NoCandidate { places: Vec<String> },

    #[error("none of {objects:?} has a known place")]
    Unplaced { objects: Vec<String> },
}

/// Picks entities for quest templates.
///
/// Every method returns an entity uid. How candidates are chosen is up to
/// the implementation.
pub trait Selector {
    /// A place not used by this selector before.
    fn new_place(&mut self) -> Result<String, SelectorError>;

    /// A person not used by this selector before.
    fn new_person(&mut self) -> Result<String, SelectorError>;

    /// A person located in one of `places`.
    fn person_from(&mut self, places: &[&str]) -> Result<String, SelectorError>;

    /// The place where one of `objects` is located.
    fn place_for(&mut self, objects: &[&str]) -> Result<String, SelectorError>;
}

/// A selector drawing from a [`Roster`] in declaration order.
///
/// Places and persons handed out by `new_place`, `new_person` and
/// `person_from` are not handed out again.
#[derive(Debug, Clone)]
pub struct RosterSelector {
    roster: Roster,
    used: HashSet<EntityId>,
}

impl RosterSelector {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            used: HashSet::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Check if an entity was already handed out.
    pub fn is_used(&self, uid: &str) -> bool {
        self.used.contains(&EntityId::from(uid))
    }

    fn take_first<F>(&mut self, kind: EntityKind, predicate: F) -> Option<String>
    where
        F: Fn(&crate::entities::Entity) -> bool,
    {
        let uid = self
            .roster
            .of_kind(kind)
            .filter(|e| !self.used.contains(&e.uid))
            .find(|e| predicate(*e))
            .map(|e| e.uid.clone())?;

        tracing::debug!(entity = %uid, ?kind, "entity selected");
        self.used.insert(uid.clone());
        Some(uid.0)
    }
}

impl Selector for RosterSelector {
    fn new_place(&mut self) -> Result<String, SelectorError> {
        self.take_first(EntityKind::Place, |_| true)
            .ok_or(SelectorError::Exhausted(EntityKind::Place))
    }

    fn new_person(&mut self) -> Result<String, SelectorError> {
        self.take_first(EntityKind::Person, |_| true)
            .ok_or(SelectorError::Exhausted(EntityKind::Person))
    }

    fn person_from(&mut self, places: &[&str]) -> Result<String, SelectorError> {
        self.take_first(EntityKind::Person, |e| e.is_in_any(places))
            .ok_or_else(|| SelectorError::NoCandidate {
                places: places.iter().map(|p| p.to_string()).collect(),
            })
    }

    fn place_for(&mut self, objects: &[&str]) -> Result<String, SelectorError> {
        objects
            .iter()
            .find_map(|object| self.roster.location_of(object))
            .map(|place| place.0.clone())
            .ok_or_else(|| SelectorError::Unplaced {
                objects: objects.iter().map(|o| o.to_string()).collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;

    fn roster() -> Roster {
        Roster::new()
            .with(Entity::with_uid("place#1", EntityKind::Place))
            .and_then(|r| r.with(Entity::with_uid("place#2", EntityKind::Place)))
            .and_then(|r| r.with(Entity::with_uid("person#1", EntityKind::Person).located_in("place#1")))
            .and_then(|r| r.with(Entity::with_uid("person#2", EntityKind::Person).located_in("place#2")))
            .unwrap()
    }

    #[test]
    fn test_new_place_does_not_repeat() {
        let mut selector = RosterSelector::new(roster());

        assert_eq!(selector.new_place().unwrap(), "place#1");
        assert_eq!(selector.new_place().unwrap(), "place#2");
        assert_eq!(
            selector.new_place(),
            Err(SelectorError::Exhausted(EntityKind::Place))
        );
    }

    #[test]
    fn test_person_from_place() {
        let mut selector = RosterSelector::new(roster());

        assert_eq!(selector.person_from(&["place#2"]).unwrap(), "person#2");
        assert!(selector.is_used("person#2"));
        assert!(matches!(
            selector.person_from(&["place#2"]),
            Err(SelectorError::NoCandidate { .. })
        ));
    }

    #[test]
    fn test_new_person_skips_used() {
        let mut selector = RosterSelector::new(roster());

        selector.person_from(&["place#1"]).unwrap();
        assert_eq!(selector.new_person().unwrap(), "person#2");
    }

    #[test]
    fn test_place_for() {
        let mut selector = RosterSelector::new(roster());

        assert_eq!(selector.place_for(&["person#2"]).unwrap(), "place#2");
        assert_eq!(selector.place_for(&["place#1"]).unwrap(), "place#1");
        assert!(matches!(
            selector.place_for(&["person#404"]),
            Err(SelectorError::Unplaced { .. })
        ));
        // place_for does not consume anything
        assert!(!selector.is_used("place#2"));
    }
}
