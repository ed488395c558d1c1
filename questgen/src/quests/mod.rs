//! Quest templates - builders that emit the facts of one quest graph.
//!
//! Every template:
//! 1. takes a fresh namespace from the knowledge base and prefixes every
//!    state and event uid with it
//! 2. emits exactly one start and at least one finish
//! 3. connects only states it emitted itself
//! 4. attaches effects to states, never to edges

mod spying;

pub use spying::*;

use quest_world::{Selector, SelectorError};

use crate::knowledge_base::{Fact, FactError, KnowledgeBase};

/// Errors raised while constructing a quest.
#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    #[error("knowledge base has no hero")]
    NoHero,

    #[error(transparent)]
    Fact(#[from] FactError),

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Tags describing where a quest may appear in a quest chain.
pub mod tags {
    /// An ordinary quest.
    pub const NORMAL: &str = "normal";
    /// A special quest.
    pub const SPECIAL: &str = "special";
    /// May be the first quest of a chain.
    pub const CAN_START: &str = "can_start";
    /// May follow another quest.
    pub const CAN_CONTINUE: &str = "can_continue";
}

/// The entities a quest is built around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestRoles {
    pub initiator: String,
    pub initiator_position: String,
    pub receiver: String,
    pub receiver_position: String,
}

/// A quest template.
///
/// Only [`QuestTemplate::construct`] is template specific; the other entry
/// points pick the missing roles with the selector and delegate to it. They
/// fail with [`QuestError::NoHero`] before touching the selector.
pub trait QuestTemplate {
    /// Value of the start state's `quest_type`.
    const TYPE: &'static str;

    /// Chain placement tags, see [`tags`].
    const TAGS: &'static [&'static str];

    fn construct<K, S>(
        knowledge_base: &mut K,
        selector: &mut S,
        roles: &QuestRoles,
    ) -> Result<Vec<Fact>, QuestError>
    where
        K: KnowledgeBase + ?Sized,
        S: Selector + ?Sized;

    fn has_tag(tag: &str) -> bool {
        Self::TAGS.iter().any(|t| *t == tag)
    }

    fn construct_from_nothing<K, S>(
        knowledge_base: &mut K,
        selector: &mut S,
    ) -> Result<Vec<Fact>, QuestError>
    where
        K: KnowledgeBase + ?Sized,
        S: Selector + ?Sized,
    {
        hero_uid(knowledge_base)?;
        let start_place = selector.new_place()?;
        Self::construct_from_place(knowledge_base, selector, &start_place)
    }

    fn construct_from_place<K, S>(
        knowledge_base: &mut K,
        selector: &mut S,
        start_place: &str,
    ) -> Result<Vec<Fact>, QuestError>
    where
        K: KnowledgeBase + ?Sized,
        S: Selector + ?Sized,
    {
        hero_uid(knowledge_base)?;
        let initiator = selector.person_from(&[start_place])?;
        let receiver = selector.new_person()?;
        Self::construct_between_2(knowledge_base, selector, &initiator, &receiver)
    }

    fn construct_from_person<K, S>(
        knowledge_base: &mut K,
        selector: &mut S,
        initiator: &str,
    ) -> Result<Vec<Fact>, QuestError>
    where
        K: KnowledgeBase + ?Sized,
        S: Selector + ?Sized,
    {
        hero_uid(knowledge_base)?;
        let receiver = selector.new_person()?;
        Self::construct_between_2(knowledge_base, selector, initiator, &receiver)
    }

    fn construct_between_2<K, S>(
        knowledge_base: &mut K,
        selector: &mut S,
        initiator: &str,
        receiver: &str,
    ) -> Result<Vec<Fact>, QuestError>
    where
        K: KnowledgeBase + ?Sized,
        S: Selector + ?Sized,
    {
        hero_uid(knowledge_base)?;
        let roles = QuestRoles {
            initiator: initiator.to_string(),
            initiator_position: selector.place_for(&[initiator])?,
            receiver: receiver.to_string(),
            receiver_position: selector.place_for(&[receiver])?,
        };
        Self::construct(knowledge_base, selector, &roles)
    }
}

/// Uid of the hero the quest is for.
pub fn hero_uid<K: KnowledgeBase + ?Sized>(knowledge_base: &K) -> Result<String, QuestError> {
    knowledge_base
        .heroes()
        .first()
        .map(|hero| hero.uid().to_string())
        .ok_or(QuestError::NoHero)
}
