//! Built-in fact variants and shortcuts for building them.
//!
//! | category    | variants                                               |
//! |-------------|--------------------------------------------------------|
//! | actors      | Hero, Place, Person, Mob                               |
//! | states      | State, Start, Finish, Choice, Pointer                  |
//! | edges       | Jump, Option                                           |
//! | structural  | OptionsLink, ChoicePath, Event                         |
//! | conditions  | LocatedIn, LocatedNear, Preference*                    |
//! | actions     | Message, GivePower                                     |
//! | restrictions| OnlyGoodBranches, OnlyBadBranches                      |
//!
//! Uid rules only read reference attributes, never labels, tags or effects.

use super::{Attributes, Fact, FactError, Registry, UidRule, Value, Variant};

/// Names of the built-in variants.
pub mod names {
    pub const FACT: &str = "Fact";

    pub const ACTOR: &str = "Actor";
    pub const HERO: &str = "Hero";
    pub const PLACE: &str = "Place";
    pub const PERSON: &str = "Person";
    pub const MOB: &str = "Mob";

    pub const STATE: &str = "State";
    pub const START: &str = "Start";
    pub const FINISH: &str = "Finish";
    pub const CHOICE: &str = "Choice";
    pub const POINTER: &str = "Pointer";
    pub const EVENT: &str = "Event";

    pub const JUMP: &str = "Jump";
    pub const OPTION: &str = "Option";
    pub const OPTIONS_LINK: &str = "OptionsLink";
    pub const CHOICE_PATH: &str = "ChoicePath";

    pub const CONDITION: &str = "Condition";
    pub const LOCATED_IN: &str = "LocatedIn";
    pub const LOCATED_NEAR: &str = "LocatedNear";
    pub const PREFERENCE: &str = "Preference";
    pub const PREFERENCE_MOB: &str = "PreferenceMob";
    pub const PREFERENCE_HOMETOWN: &str = "PreferenceHometown";
    pub const PREFERENCE_FRIEND: &str = "PreferenceFriend";
    pub const PREFERENCE_ENEMY: &str = "PreferenceEnemy";
    pub const PREFERENCE_EQUIPMENT_SLOT: &str = "PreferenceEquipmentSlot";

    pub const ACTION: &str = "Action";
    pub const MESSAGE: &str = "Message";
    pub const GIVE_POWER: &str = "GivePower";

    pub const RESTRICTION: &str = "Restriction";
    pub const ONLY_GOOD_BRANCHES: &str = "OnlyGoodBranches";
    pub const ONLY_BAD_BRANCHES: &str = "OnlyBadBranches";
}

/// Uid of the single pointer fact.
pub const POINTER_UID: &str = "#pointer";

fn text<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a str> {
    attributes.get(name)?.as_text()
}

macro_rules! pair_uid {
    ($fn_name:ident, $tag:literal, $first:literal, $second:literal) => {
        fn $fn_name(a: &Attributes) -> Option<String> {
            Some(format!(
                concat!("#", $tag, "<{}, {}>"),
                text(a, $first)?,
                text(a, $second)?
            ))
        }
    };
}

pair_uid!(jump_uid, "jump", "state_from", "state_to");
pair_uid!(option_uid, "option", "state_from", "state_to");
pair_uid!(located_in_uid, "located_in", "object", "place");
pair_uid!(located_near_uid, "located_near", "object", "place");
pair_uid!(preference_mob_uid, "preference_mob", "object", "mob");
pair_uid!(preference_hometown_uid, "preference_place", "object", "place");
pair_uid!(preference_friend_uid, "preference_friend", "object", "person");
pair_uid!(preference_enemy_uid, "preference_enemy", "object", "person");
pair_uid!(
    preference_equipment_slot_uid,
    "preference_equipment_slot",
    "object",
    "equipment_slot"
);

fn options_link_uid(a: &Attributes) -> Option<String> {
    let options = a
        .get("options")?
        .as_list()?
        .iter()
        .map(Value::as_text)
        .collect::<Option<Vec<_>>>()?;
    if options.is_empty() {
        return None;
    }
    Some(format!("#options_link<{}>", options.join(",")))
}

fn choice_path_uid(a: &Attributes) -> Option<String> {
    Some(format!(
        "#choice_path<{}, {}, {}>",
        text(a, "choice")?,
        text(a, "option")?,
        a.get("default")?.uid_part()?
    ))
}

fn message_uid(a: &Attributes) -> Option<String> {
    Some(format!("#message<{}>", a.get("id")?.uid_part()?))
}

fn give_power_uid(a: &Attributes) -> Option<String> {
    Some(format!(
        "#give_power<{}, {:.6}>",
        text(a, "person")?,
        a.get("power")?.as_number()?
    ))
}

fn only_good_branches_uid(a: &Attributes) -> Option<String> {
    Some(format!("#only_good_branches<{}>", text(a, "person")?))
}

fn only_bad_branches_uid(a: &Attributes) -> Option<String> {
    Some(format!("#only_bad_branches<{}>", text(a, "person")?))
}

/// Declare and register every built-in variant.
pub(super) fn standard_registry() -> Registry {
    use names::*;

    let mut registry = Registry::new();
    let fact = Variant::root(FACT).build();

    let actor = registry.register(Variant::derive(ACTOR, &fact).build());
    registry.register(Variant::derive(HERO, &actor).build());
    registry.register(Variant::derive(PLACE, &actor).attribute("terrains", Value::None).build());
    registry.register(Variant::derive(PERSON, &actor).attribute("profession", Value::None).build());
    registry.register(Variant::derive(MOB, &actor).attribute("terrains", Value::None).build());

    let state = registry.register(
        Variant::derive(STATE, &fact)
            .attribute("require", Value::Facts(Vec::new()))
            .attribute("actions", Value::Facts(Vec::new()))
            .serializable(&["require", "actions"])
            .build(),
    );
    registry.register(Variant::derive(START, &state).required("quest_type").build());
    registry.register(Variant::derive(FINISH, &state).build());
    registry.register(Variant::derive(CHOICE, &state).build());

    // Same schema as a state, but not a node of the quest graph.
    registry.register(
        Variant::derive(POINTER, &fact)
            .attribute("uid", POINTER_UID)
            .attribute("require", Value::Facts(Vec::new()))
            .attribute("actions", Value::Facts(Vec::new()))
            .attribute("state", Value::None)
            .attribute("jump", Value::None)
            .serializable(&["require", "actions"])
            .references(&["state", "jump"])
            .uid(UidRule::Fixed(POINTER_UID))
            .build(),
    );
    registry.register(Variant::derive(EVENT, &fact).build());

    let jump = registry.register(
        Variant::derive(JUMP, &fact)
            .required("state_from")
            .required("state_to")
            .references(&["state_from", "state_to"])
            .uid(UidRule::Derived(jump_uid))
            .build(),
    );
    registry.register(
        Variant::derive(OPTION, &jump)
            .uid(UidRule::Derived(option_uid))
            .build(),
    );

    registry.register(
        Variant::derive(OPTIONS_LINK, &fact)
            .required("options")
            .references(&["options"])
            .uid(UidRule::Derived(options_link_uid))
            .build(),
    );
    registry.register(
        Variant::derive(CHOICE_PATH, &fact)
            .required("choice")
            .required("option")
            .required("default")
            .references(&["choice", "option"])
            .uid(UidRule::Derived(choice_path_uid))
            .build(),
    );

    let condition = registry.register(Variant::derive(CONDITION, &fact).build());
    registry.register(
        Variant::derive(LOCATED_IN, &condition)
            .required("object")
            .required("place")
            .references(&["object", "place"])
            .uid(UidRule::Derived(located_in_uid))
            .build(),
    );
    registry.register(
        Variant::derive(LOCATED_NEAR, &condition)
            .required("object")
            .required("place")
            .references(&["object", "place"])
            .uid(UidRule::Derived(located_near_uid))
            .build(),
    );

    let preference = registry.register(
        Variant::derive(PREFERENCE, &condition)
            .references(&["object"])
            .uid(UidRule::Abstract)
            .build(),
    );
    let preferences: [(&str, &str, fn(&Attributes) -> Option<String>); 5] = [
        (PREFERENCE_MOB, "mob", preference_mob_uid),
        (PREFERENCE_HOMETOWN, "place", preference_hometown_uid),
        (PREFERENCE_FRIEND, "person", preference_friend_uid),
        (PREFERENCE_ENEMY, "person", preference_enemy_uid),
        (
            PREFERENCE_EQUIPMENT_SLOT,
            "equipment_slot",
            preference_equipment_slot_uid,
        ),
    ];
    for (name, subject, uid) in preferences {
        let mut references = vec!["object"];
        // an equipment slot is a value, not a reference
        if subject != "equipment_slot" {
            references.push(subject);
        }
        registry.register(
            Variant::derive(name, &preference)
                .required("object")
                .required(subject)
                .references(&references)
                .uid(UidRule::Derived(uid))
                .build(),
        );
    }

    let action = registry.register(Variant::derive(ACTION, &fact).build());
    registry.register(
        Variant::derive(MESSAGE, &action)
            .required("id")
            .uid(UidRule::Derived(message_uid))
            .build(),
    );
    registry.register(
        Variant::derive(GIVE_POWER, &action)
            .required("person")
            .required("power")
            .references(&["person"])
            .uid(UidRule::Derived(give_power_uid))
            .build(),
    );

    let restriction = registry.register(Variant::derive(RESTRICTION, &fact).build());
    registry.register(
        Variant::derive(ONLY_GOOD_BRANCHES, &restriction)
            .required("person")
            .references(&["person"])
            .uid(UidRule::Derived(only_good_branches_uid))
            .build(),
    );
    registry.register(
        Variant::derive(ONLY_BAD_BRANCHES, &restriction)
            .required("person")
            .references(&["person"])
            .uid(UidRule::Derived(only_bad_branches_uid))
            .build(),
    );

    tracing::debug!(variants = registry.len(), "standard fact registry built");
    registry
}

fn standard(name: &str) -> Result<super::FactDraft, FactError> {
    Registry::standard().draft(name)
}

pub fn jump(state_from: &str, state_to: &str) -> Result<Fact, FactError> {
    standard(names::JUMP)?
        .with("state_from", state_from)
        .with("state_to", state_to)
        .build()
}

pub fn option(state_from: &str, state_to: &str) -> Result<Fact, FactError> {
    standard(names::OPTION)?
        .with("state_from", state_from)
        .with("state_to", state_to)
        .build()
}

/// Link options that lead to the same narrative consequence.
pub fn options_link(options: &[&str]) -> Result<Fact, FactError> {
    standard(names::OPTIONS_LINK)?
        .with("options", Value::texts(options.iter().copied()))
        .build()
}

pub fn choice_path(choice: &str, option: &str, default: impl Into<Value>) -> Result<Fact, FactError> {
    standard(names::CHOICE_PATH)?
        .with("choice", choice)
        .with("option", option)
        .with("default", default)
        .build()
}

pub fn located_in(object: &str, place: &str) -> Result<Fact, FactError> {
    standard(names::LOCATED_IN)?
        .with("object", object)
        .with("place", place)
        .build()
}

pub fn located_near(object: &str, place: &str) -> Result<Fact, FactError> {
    standard(names::LOCATED_NEAR)?
        .with("object", object)
        .with("place", place)
        .build()
}

pub fn message(id: &str) -> Result<Fact, FactError> {
    standard(names::MESSAGE)?.with("id", id).build()
}

/// Change `person`'s power by `power`.
pub fn give_power(person: &str, power: f64) -> Result<Fact, FactError> {
    standard(names::GIVE_POWER)?
        .with("person", person)
        .with("power", power)
        .build()
}

pub fn event(uid: &str, label: &str) -> Result<Fact, FactError> {
    standard(names::EVENT)?
        .with("uid", uid)
        .with("label", label)
        .build()
}
